//! ABI 常量测试
//!
//! 这些测试验证系统调用号、错误码和 ktrace 标签编码的约定。

use shared::abi::*;

/// 测试系统调用号分组
#[test]
fn test_syscall_numbers() {
    assert!(HNX_SYS_PROCESS_READ_MEMORY >= 0x0100 && HNX_SYS_PROCESS_READ_MEMORY < 0x0200,
            "process memory calls live in the process range");
    assert!(HNX_SYS_THREAD_READ_STATE >= 0x0200 && HNX_SYS_THREAD_READ_STATE < 0x0300,
            "thread state calls live in the thread range");
    assert_ne!(HNX_SYS_KTRACE_WRITE, HNX_SYS_DEBUG_WRITE);
}

/// 测试错误码定义
#[test]
fn test_error_codes() {
    assert_eq!(ZX_OK, 0);
    assert_eq!(ZX_ERR_INVALID_ARGS, -10);
    assert_eq!(ZX_ERR_BUFFER_TOO_SMALL, -15);
    assert_eq!(ZX_ERR_BAD_STATE, -20);
    assert_eq!(ZX_ERR_UNAVAILABLE, -28);
}

#[test]
fn test_limits() {
    assert_eq!(MAX_DEBUG_WRITE_SIZE, 256);
    assert_eq!(MAX_DEBUG_READ_BLOCK, 64 << 20);
    assert_eq!(KTRACE_MAX_PROBE_ID, 0x7FF);
}

/// 探针标签必须带上 0x800 标志、PROBE 组以及 24 字节长度
#[test]
fn test_probe_tag_encoding() {
    let tag = tag_probe_24(0x010);
    assert_eq!(ktrace_event(tag), 0x810);
    assert_eq!(ktrace_group(tag), KTRACE_GRP_PROBE);
    assert_eq!(ktrace_len(tag), 24);

    // 最大用户事件号仍然落在 12 位事件字段内
    assert_eq!(ktrace_event(tag_probe_24(KTRACE_MAX_PROBE_ID)), 0xFFF);
    assert_eq!(ktrace_len(TAG_PROBE_NAME), 48);
}
