//! 内核调试控制台
//!
//! 系统调用层只通过 [`DebugConsole`] 与控制台交互：逐字节读取输入、
//! 逐字节输出，以及执行一条调试命令脚本。具体的串口驱动由内核在启动时
//! 提供；[`BufferedConsole`] 是一个纯内存实现，用于没有硬件的环境和测试。

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use spin::Mutex;

use shared::abi::*;

/// 控制台字节源/字节汇与命令执行器
pub trait DebugConsole: Send + Sync {
    /// 读取一个字符，没有可读数据时返回 None（不阻塞）
    fn getc(&self) -> Option<u8>;

    /// 输出一个字符
    fn putc(&self, c: u8);

    /// 执行一条命令脚本，`script` 以 NUL 结尾
    fn run_script(&self, script: &[u8]) -> status_t;

    /// 输出一串字节
    fn write_bytes(&self, bytes: &[u8]) {
        for &c in bytes {
            self.putc(c);
        }
    }
}

/// 命令执行器回调
pub type ScriptRunner = fn(&[u8]) -> status_t;

fn run_nothing(_script: &[u8]) -> status_t {
    ZX_ERR_NOT_SUPPORTED
}

/// 内存控制台
///
/// 输入来自预先填入的队列，输出累积到缓冲区，执行过的命令按顺序记录。
pub struct BufferedConsole {
    /// 控制台互斥锁
    console_lock: Mutex<()>,
    input: Mutex<VecDeque<u8>>,
    output: Mutex<Vec<u8>>,
    scripts: Mutex<Vec<Vec<u8>>>,
    runner: ScriptRunner,
}

impl BufferedConsole {
    pub fn new() -> Self {
        Self::with_runner(run_nothing)
    }

    /// 使用指定的命令执行器创建控制台
    pub fn with_runner(runner: ScriptRunner) -> Self {
        Self {
            console_lock: Mutex::new(()),
            input: Mutex::new(VecDeque::new()),
            output: Mutex::new(Vec::new()),
            scripts: Mutex::new(Vec::new()),
            runner,
        }
    }

    /// 向输入队列追加数据
    pub fn feed(&self, bytes: &[u8]) {
        self.input.lock().extend(bytes.iter().copied());
    }

    /// 取走目前为止的全部输出
    pub fn take_output(&self) -> Vec<u8> {
        core::mem::take(&mut *self.output.lock())
    }

    /// 已执行的命令（包含结尾的换行和 NUL）
    pub fn scripts(&self) -> Vec<Vec<u8>> {
        self.scripts.lock().clone()
    }

}

impl Default for BufferedConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugConsole for BufferedConsole {
    fn getc(&self) -> Option<u8> {
        self.input.lock().pop_front()
    }

    fn putc(&self, c: u8) {
        let _lock = self.console_lock.lock();
        self.output.lock().push(c);
    }

    fn run_script(&self, script: &[u8]) -> status_t {
        self.scripts.lock().push(script.to_vec());
        (self.runner)(script)
    }

    fn write_bytes(&self, bytes: &[u8]) {
        // 整段输出不与其他写者交错
        let _lock = self.console_lock.lock();
        self.output.lock().extend_from_slice(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_is_consumed_in_order() {
        let console = BufferedConsole::new();
        console.feed(b"ab");
        assert_eq!(console.getc(), Some(b'a'));
        assert_eq!(console.getc(), Some(b'b'));
        assert_eq!(console.getc(), None);
    }

    #[test]
    fn test_output_accumulates() {
        let console = BufferedConsole::new();
        console.putc(b'x');
        console.write_bytes(b"yz");
        assert_eq!(console.take_output(), b"xyz");
        assert!(console.take_output().is_empty());
    }

    #[test]
    fn test_run_script_uses_runner() {
        fn ok(_: &[u8]) -> status_t {
            ZX_OK
        }
        let console = BufferedConsole::with_runner(ok);
        assert_eq!(console.run_script(b"ps\n\0"), ZX_OK);
        assert_eq!(BufferedConsole::new().run_script(b"ps\n\0"), ZX_ERR_NOT_SUPPORTED);
        assert_eq!(console.scripts(), alloc::vec![b"ps\n\0".to_vec()]);
    }
}
