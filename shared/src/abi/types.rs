// Basic type definitions
#![allow(non_camel_case_types)]

pub type size_t = usize;
pub type ssize_t = isize;

// Handle type
pub type handle_t = u32;

// Error code type
pub type status_t = i32;

// Process / thread identifiers
pub type koid_t = u64;

/// 永远无效的句柄值
pub const HANDLE_INVALID: handle_t = 0;

// Status codes - Zircon numbering
pub const ZX_OK: status_t = 0;
pub const ZX_ERR_INTERNAL: status_t = -1;
pub const ZX_ERR_NOT_SUPPORTED: status_t = -2;
pub const ZX_ERR_NO_RESOURCES: status_t = -3;
pub const ZX_ERR_NO_MEMORY: status_t = -4;
pub const ZX_ERR_INVALID_ARGS: status_t = -10;
pub const ZX_ERR_BAD_HANDLE: status_t = -11;
pub const ZX_ERR_WRONG_TYPE: status_t = -12;
pub const ZX_ERR_BAD_SYSCALL: status_t = -13;
pub const ZX_ERR_OUT_OF_RANGE: status_t = -14;
pub const ZX_ERR_BUFFER_TOO_SMALL: status_t = -15;
pub const ZX_ERR_BAD_STATE: status_t = -20;
pub const ZX_ERR_NOT_FOUND: status_t = -25;
pub const ZX_ERR_ALREADY_EXISTS: status_t = -26;
pub const ZX_ERR_UNAVAILABLE: status_t = -28;
pub const ZX_ERR_ACCESS_DENIED: status_t = -30;

// Handle rights - mirrored by the kernel's ObjectRights bitflags
pub const ZX_RIGHT_NONE: u32 = 0;
pub const ZX_RIGHT_DUPLICATE: u32 = 1 << 0;
pub const ZX_RIGHT_TRANSFER: u32 = 1 << 1;
pub const ZX_RIGHT_READ: u32 = 1 << 2;
pub const ZX_RIGHT_WRITE: u32 = 1 << 3;
pub const ZX_RIGHT_EXECUTE: u32 = 1 << 4;
pub const ZX_RIGHT_MAP: u32 = 1 << 5;
pub const ZX_RIGHT_GET_PROPERTY: u32 = 1 << 6;
pub const ZX_RIGHT_SET_PROPERTY: u32 = 1 << 7;
pub const ZX_RIGHT_ENUMERATE: u32 = 1 << 8;
pub const ZX_RIGHT_DESTROY: u32 = 1 << 9;
pub const ZX_RIGHT_SAME_RIGHTS: u32 = 1 << 31;

// Object types
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    NONE = 0,
    PROCESS = 1,
    THREAD = 2,
    VMO = 3,
    RESOURCE = 15,
}
