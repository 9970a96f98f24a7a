//! 线程对象
//!
//! 线程对象表示一个执行单元，包含：
//! - CPU上下文（寄存器状态）
//! - 调度状态
//!
//! 线程只持有所属进程的弱引用，进程持有线程的强引用。

use alloc::sync::{Arc, Weak};
use spin::Mutex;
use zerocopy::{AsBytes, FromBytes, FromZeroes};

use crate::arch::{FpRegs, GeneralRegs};
use crate::impl_kernel_object;
use crate::object::traits::*;
use crate::object::types::process::Process;
use shared::abi::*;

/// 线程对象
pub struct Thread {
    /// 对象ID
    id: KObjectId,
    /// 线程ID
    tid: u64,
    /// 所属进程
    process: Weak<Process>,
    /// 线程状态
    state: Mutex<ThreadState>,
    /// 通用寄存器
    general: Mutex<GeneralRegs>,
    /// 浮点寄存器
    fp: Mutex<FpRegs>,
}

/// 线程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    /// 线程已创建但未运行
    Created,
    /// 线程可运行（就绪）
    Ready,
    /// 线程已退出
    Exited,
}

/// 寄存器状态种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadStateKind {
    /// REGSET0
    General,
    /// REGSET1
    Fp,
}

impl ThreadStateKind {
    /// 该种类在用户态的字节大小
    pub fn size(&self) -> usize {
        match self {
            ThreadStateKind::General => GeneralRegs::SIZE,
            ThreadStateKind::Fp => FpRegs::SIZE,
        }
    }
}

impl TryFrom<u32> for ThreadStateKind {
    type Error = ObjectError;

    fn try_from(kind: u32) -> Result<Self, ObjectError> {
        match kind {
            THREAD_STATE_GENERAL_REGS => Ok(ThreadStateKind::General),
            THREAD_STATE_FP_REGS => Ok(ThreadStateKind::Fp),
            k if k <= THREAD_STATE_REGSET9 => Err(ObjectError::NotSupported),
            _ => Err(ObjectError::InvalidArgs),
        }
    }
}

impl Thread {
    /// 创建新线程并加入进程
    pub fn new(tid: u64, process: &Arc<Process>) -> Arc<Self> {
        let thread = Arc::new(Self {
            id: KObjectId::new(),
            tid,
            process: Arc::downgrade(process),
            state: Mutex::new(ThreadState::Created),
            general: Mutex::new(GeneralRegs::new_zeroed()),
            fp: Mutex::new(FpRegs::new_zeroed()),
        });

        // 将线程添加到进程
        process.add_thread(thread.clone());

        thread
    }

    /// 获取线程ID
    pub fn tid(&self) -> u64 {
        self.tid
    }

    /// 获取所属进程（进程已释放时为 None）
    pub fn process(&self) -> Option<Arc<Process>> {
        self.process.upgrade()
    }

    /// 获取线程状态
    pub fn state(&self) -> ThreadState {
        *self.state.lock()
    }

    pub fn is_exited(&self) -> bool {
        self.state() == ThreadState::Exited
    }

    /// 启动线程
    pub fn start(&self, entry: u64, sp: u64) -> Result<(), ObjectError> {
        let mut state = self.state.lock();
        if *state != ThreadState::Created {
            return Err(ObjectError::BadState);
        }
        {
            let mut regs = self.general.lock();
            regs.pc = entry;
            regs.sp = sp;
        }
        *state = ThreadState::Ready;
        Ok(())
    }

    /// 退出线程
    pub fn exit(&self, _code: i32) {
        self.kill();

        // 从进程中移除线程
        if let Some(process) = self.process.upgrade() {
            process.remove_thread(self.tid);
        }
    }

    /// 标记为已退出，不触碰进程的线程表
    pub(crate) fn kill(&self) {
        *self.state.lock() = ThreadState::Exited;
    }

    /// 读取寄存器状态到 `buf`，返回该种类的实际大小
    ///
    /// `buf` 小于所需大小时返回 `BufferTooSmall`，所需大小由
    /// [`ThreadStateKind::size`] 给出。
    pub fn read_state(&self, kind: ThreadStateKind, buf: &mut [u8]) -> Result<usize, ObjectError> {
        if self.is_exited() {
            return Err(ObjectError::BadState);
        }
        let size = kind.size();
        let dst = buf.get_mut(..size).ok_or(ObjectError::BufferTooSmall)?;
        match kind {
            ThreadStateKind::General => dst.copy_from_slice(self.general.lock().as_bytes()),
            ThreadStateKind::Fp => dst.copy_from_slice(self.fp.lock().as_bytes()),
        }
        Ok(size)
    }

    /// 写入寄存器状态，`buf` 必须恰好是该种类的大小
    ///
    /// `privileged == false` 时不允许修改特权位。
    pub fn write_state(
        &self,
        kind: ThreadStateKind,
        buf: &[u8],
        privileged: bool,
    ) -> Result<(), ObjectError> {
        if self.is_exited() {
            return Err(ObjectError::BadState);
        }
        match kind {
            ThreadStateKind::General => {
                let new = GeneralRegs::read_from(buf).ok_or(ObjectError::InvalidArgs)?;
                self.general.lock().merge_from(&new, privileged);
            }
            ThreadStateKind::Fp => {
                let new = FpRegs::read_from(buf).ok_or(ObjectError::InvalidArgs)?;
                *self.fp.lock() = new;
            }
        }
        Ok(())
    }

    /// 当前通用寄存器快照
    pub fn general_regs(&self) -> GeneralRegs {
        *self.general.lock()
    }
}

impl_kernel_object!(Thread, "Thread", ObjectType::THREAD);
