//! 内核启动配置
//!
//! 配置来自引导命令行，形如 `log=debug ktrace.bufsize=131072 ktrace.grpmask=0x40`。
//! 未知的键被忽略；格式错误的值保留默认值。

use log::LevelFilter;
use shared::abi::KTRACE_GRP_ALL;

/// 日志级别
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// 追踪日志配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KtraceConfig {
    /// 缓冲区大小（字节）
    pub buffer_size: usize,
    /// 启动时启用的组，0 表示不记录
    pub group_mask: u32,
}

impl KtraceConfig {
    pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;
}

impl Default for KtraceConfig {
    fn default() -> Self {
        Self {
            buffer_size: Self::DEFAULT_BUFFER_SIZE,
            group_mask: KTRACE_GRP_ALL,
        }
    }
}

/// 内核配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelConfig {
    pub log_level: LogLevel,
    pub ktrace: KtraceConfig,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            ktrace: KtraceConfig::default(),
        }
    }
}

impl KernelConfig {
    /// 解析引导命令行
    pub fn parse_boot_params(cmdline: &str) -> Self {
        let mut config = Self::default();
        for param in cmdline.split_ascii_whitespace() {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            match key {
                "log" => {
                    if let Some(level) = LogLevel::parse(value) {
                        config.log_level = level;
                    }
                }
                "ktrace.bufsize" => {
                    if let Some(size) = parse_number(value) {
                        config.ktrace.buffer_size = size as usize;
                    }
                }
                "ktrace.grpmask" => {
                    if let Some(mask) = parse_number(value).and_then(|m| u32::try_from(m).ok()) {
                        config.ktrace.group_mask = mask & KTRACE_GRP_ALL;
                    }
                }
                _ => log::debug!("ignoring boot parameter {}", key),
            }
        }
        config
    }

    /// 对应的 `log` 过滤级别
    pub fn max_log_level(&self) -> LevelFilter {
        match self.log_level {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }
}

/// 十进制或 `0x` 前缀的十六进制
fn parse_number(s: &str) -> Option<u64> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KernelConfig::parse_boot_params("");
        assert_eq!(config, KernelConfig::default());
        assert_eq!(config.ktrace.buffer_size, 64 * 1024);
        assert_eq!(config.max_log_level(), LevelFilter::Info);
    }

    #[test]
    fn test_parse_all_keys() {
        let config =
            KernelConfig::parse_boot_params("console=ttyS0 log=trace ktrace.bufsize=4096 ktrace.grpmask=0x40");
        assert_eq!(config.log_level, LogLevel::Trace);
        assert_eq!(config.ktrace.buffer_size, 4096);
        assert_eq!(config.ktrace.group_mask, 0x40);
        assert_eq!(config.max_log_level(), LevelFilter::Trace);
    }

    #[test]
    fn test_malformed_values_keep_defaults() {
        let config = KernelConfig::parse_boot_params("log=loud ktrace.bufsize=big ktrace.grpmask");
        assert_eq!(config, KernelConfig::default());
    }
}
