// Debug console operations
pub const HNX_SYS_DEBUG_READ: u32 = 0x0401; // 1025
pub const HNX_SYS_DEBUG_WRITE: u32 = 0x0402; // 1026
pub const HNX_SYS_DEBUG_SEND_COMMAND: u32 = 0x0403; // 1027
pub const HNX_SYS_DEBUG_TRANSFER_HANDLE: u32 = 0x0404; // 1028

// Process operations
pub const HNX_SYS_PROCESS_READ_MEMORY: u32 = 0x0104; // 260
pub const HNX_SYS_PROCESS_WRITE_MEMORY: u32 = 0x0105; // 261

// Thread operations
pub const HNX_SYS_THREAD_READ_STATE: u32 = 0x0203; // 515
pub const HNX_SYS_THREAD_WRITE_STATE: u32 = 0x0204; // 516

// Kernel trace operations
pub const HNX_SYS_KTRACE_READ: u32 = 0x0501; // 1281
pub const HNX_SYS_KTRACE_CONTROL: u32 = 0x0502; // 1282
pub const HNX_SYS_KTRACE_WRITE: u32 = 0x0503; // 1283
