//! Memory Management Subsystem
//!
//! The debug syscall layer never creates mappings; it only needs to:
//! - **Address Space**: resolve a user virtual address to the region (and VMO)
//!   that backs it
//! - **Bounded buffers**: allocate caller-sized temporary kernel buffers
//!   without aborting on exhaustion

pub mod aspace;
pub mod buffer;

pub use aspace::{AddressSpace, Region};
pub use buffer::try_alloc_buffer;
