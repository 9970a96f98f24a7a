//! HNX kernel debug syscalls
//!
//! The privileged half of the debugger interface: a process holding the
//! right handles can read and write another process's memory, read and
//! write its threads' registers, move handles between processes and drive
//! the kernel trace log.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

// ===== Object Model =====
pub mod object;     // Handles, rights and kernel objects
pub mod memory;     // Address spaces and bounded buffers
pub mod arch;       // Register state layouts
pub mod user;       // User/kernel copy primitives

// ===== Kernel Collaborators =====
pub mod console;    // Debug console
pub mod ktrace;     // Kernel trace log
pub mod config;     // Boot configuration
pub mod kernel;     // Kernel-lifetime context

pub mod syscall;    // Syscall entry points

pub use kernel::Kernel;
pub use object::ObjectError;
pub use syscall::{into_status, SyscallDispatcher, SyscallResult};
