//! 调试系统调用的固定上限与编码

/// debug_write 单次最多输出的字节数，也是 debug_send_command 的命令上限
pub const MAX_DEBUG_WRITE_SIZE: usize = 256;
/// process_read_memory 单次最大读取块
pub const MAX_DEBUG_READ_BLOCK: usize = 64 * 1024 * 1024;
/// process_write_memory 单次最大写入块
pub const MAX_DEBUG_WRITE_BLOCK: usize = 64 * 1024 * 1024;
/// 线程寄存器状态缓冲区上限
pub const MAX_THREAD_STATE_SIZE: usize = 4096;
/// 对象/探针名称长度（含结尾 NUL）
pub const MAX_NAME_LEN: usize = 32;

// Thread state kinds
pub const THREAD_STATE_REGSET0: u32 = 0;
pub const THREAD_STATE_REGSET1: u32 = 1;
pub const THREAD_STATE_REGSET9: u32 = 9;
pub const THREAD_STATE_GENERAL_REGS: u32 = THREAD_STATE_REGSET0;
pub const THREAD_STATE_FP_REGS: u32 = THREAD_STATE_REGSET1;

// ktrace control actions
pub const KTRACE_ACTION_START: u32 = 1;
pub const KTRACE_ACTION_STOP: u32 = 2;
pub const KTRACE_ACTION_REWIND: u32 = 3;
pub const KTRACE_ACTION_NEW_PROBE: u32 = 4;

// ktrace groups
pub const KTRACE_GRP_ALL: u32 = 0xFFF;
pub const KTRACE_GRP_META: u32 = 0x001;
pub const KTRACE_GRP_LIFECYCLE: u32 = 0x002;
pub const KTRACE_GRP_SCHEDULER: u32 = 0x004;
pub const KTRACE_GRP_TASKS: u32 = 0x008;
pub const KTRACE_GRP_IPC: u32 = 0x010;
pub const KTRACE_GRP_IRQ: u32 = 0x020;
pub const KTRACE_GRP_PROBE: u32 = 0x040;
pub const KTRACE_GRP_ARCH: u32 = 0x080;

/// 用户探针事件号上限（11 位）
pub const KTRACE_MAX_PROBE_ID: u32 = 0x7FF;
/// 用户探针事件号在标签中附加的标志位
pub const KTRACE_PROBE_FLAG: u32 = 0x800;

/// ktrace 日志格式版本
pub const KTRACE_VERSION: u32 = 0x0002_0000;

/// 组合 ktrace 记录标签：事件(12位) | 组(12位) | 记录长度/8(4位)
pub const fn ktrace_tag(event: u32, group: u32, size: u32) -> u32 {
    ((event & 0xFFF) << 20) | ((group & 0xFFF) << 8) | ((size >> 3) & 0x0F)
}

/// 从标签中取出记录长度（字节）
pub const fn ktrace_len(tag: u32) -> u32 {
    (tag & 0x0F) << 3
}

/// 从标签中取出组
pub const fn ktrace_group(tag: u32) -> u32 {
    (tag >> 8) & 0xFFF
}

/// 从标签中取出事件号
pub const fn ktrace_event(tag: u32) -> u32 {
    (tag >> 20) & 0xFFF
}

pub const TAG_VERSION: u32 = ktrace_tag(0x000, KTRACE_GRP_META, 16);
pub const TAG_PROBE_NAME: u32 = ktrace_tag(0x001, KTRACE_GRP_META, 48);

/// 带两个 32 位参数的用户探针记录标签
pub const fn tag_probe_24(id: u32) -> u32 {
    ktrace_tag(id | KTRACE_PROBE_FLAG, KTRACE_GRP_PROBE, 24)
}
