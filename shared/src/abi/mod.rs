//! ABI definitions
//!
//! Everything in here is part of the syscall contract and must stay in sync
//! with the user-space bindings.

pub mod constants;
pub mod syscalls;
pub mod types;

pub use constants::*;
pub use syscalls::*;
pub use types::*;
