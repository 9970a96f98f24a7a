use alloc::sync::Arc;
use spin::Once;

use crate::config::KernelConfig;
use crate::console::DebugConsole;
use crate::ktrace::{self, KtraceLog};

/// 内核生命周期内的全局协作者
///
/// 系统调用层通过它访问调试控制台和追踪日志。
pub struct Kernel {
    /// 调试控制台
    pub console: Arc<dyn DebugConsole>,
    /// 追踪日志
    pub ktrace: &'static KtraceLog,
}

impl Kernel {
    pub fn new(console: Arc<dyn DebugConsole>, ktrace: &'static KtraceLog) -> Self {
        Self { console, ktrace }
    }

    /// 按启动配置创建内核实例
    ///
    /// 设置日志级别并初始化全局追踪日志；追踪日志只会创建一次。
    pub fn boot(config: &KernelConfig, console: Arc<dyn DebugConsole>) -> Self {
        log::set_max_level(config.max_log_level());
        let ktrace = ktrace::init(&config.ktrace);
        log::info!("kernel: debug syscalls ready, ktrace {} bytes", ktrace.valid_len());
        Self::new(console, ktrace)
    }
}

/// 全局内核实例
static KERNEL: Once<Kernel> = Once::new();

/// 初始化全局内核实例（只在启动时调用一次）
pub fn init(cmdline: &str, console: Arc<dyn DebugConsole>) -> &'static Kernel {
    KERNEL.call_once(|| {
        let config = KernelConfig::parse_boot_params(cmdline);
        log::info!("Boot command line: {}", cmdline);
        Kernel::boot(&config, console)
    })
}

/// 获取全局内核实例
pub fn get_kernel() -> Option<&'static Kernel> {
    KERNEL.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::BufferedConsole;

    #[test]
    fn test_global_kernel_is_initialized_once() {
        let first = init("log=warn", Arc::new(BufferedConsole::new()));
        let second = init("log=trace", Arc::new(BufferedConsole::new()));
        assert!(core::ptr::eq(first, second));
        assert!(get_kernel().is_some());
        assert!(core::ptr::eq(first.ktrace, ktrace::get().unwrap()));
    }
}
