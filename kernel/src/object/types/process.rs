//! 进程对象
//!
//! 进程对象表示一个执行环境，包含：
//! - 地址空间（运行期间存在，销毁后为空）
//! - 句柄表
//! - 线程集合

use crate::impl_kernel_object;
use crate::memory::AddressSpace;
use crate::object::traits::*;
use crate::object::types::thread::Thread;
use crate::object::HandleTable;
use alloc::sync::Arc;
use alloc::vec::Vec;
use shared::abi::ObjectType;
use spin::Mutex;

/// 进程对象
pub struct Process {
    /// 对象ID
    id: KObjectId,
    /// 进程ID
    pid: u64,
    /// 进程句柄表
    handle_table: HandleTable,
    /// 地址空间，进程销毁后为 None
    aspace: Mutex<Option<Arc<AddressSpace>>>,
    /// 进程中的线程列表
    threads: Mutex<Vec<Arc<Thread>>>,
    /// 进程状态
    state: Mutex<ProcessState>,
    /// 退出代码（如果进程已退出）
    exit_code: Mutex<Option<i32>>,
}

/// 进程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// 进程正在运行
    Running,
    /// 进程已退出
    Exited,
}

impl Process {
    /// 创建新进程，附带一个空的地址空间
    pub fn new(pid: u64) -> Arc<Self> {
        Self::with_handle_table(pid, HandleTable::new(pid))
    }

    pub fn with_handle_table(pid: u64, handle_table: HandleTable) -> Arc<Self> {
        Arc::new(Self {
            id: KObjectId::new(),
            pid,
            handle_table,
            aspace: Mutex::new(Some(AddressSpace::new())),
            threads: Mutex::new(Vec::new()),
            state: Mutex::new(ProcessState::Running),
            exit_code: Mutex::new(None),
        })
    }

    /// 获取进程ID
    pub fn pid(&self) -> u64 {
        self.pid
    }

    /// 获取句柄表
    pub fn handle_table(&self) -> &HandleTable {
        &self.handle_table
    }

    /// 获取地址空间（进程已销毁时为 None）
    pub fn aspace(&self) -> Option<Arc<AddressSpace>> {
        self.aspace.lock().clone()
    }

    /// 添加线程到进程
    pub(crate) fn add_thread(&self, thread: Arc<Thread>) {
        self.threads.lock().push(thread);
    }

    /// 从进程移除线程
    pub(crate) fn remove_thread(&self, tid: u64) {
        let mut threads = self.threads.lock();
        if let Some(pos) = threads.iter().position(|t| t.tid() == tid) {
            threads.remove(pos);
        }
    }

    pub fn threads(&self) -> Vec<Arc<Thread>> {
        self.threads.lock().clone()
    }

    /// 退出进程
    ///
    /// 终止所有线程、关闭句柄并拆除地址空间。
    pub fn exit(&self, code: i32) {
        *self.state.lock() = ProcessState::Exited;
        *self.exit_code.lock() = Some(code);

        // 先取出线程列表，避免线程退出时重入 threads 锁
        let threads = core::mem::take(&mut *self.threads.lock());
        for thread in threads {
            thread.kill();
        }

        self.handle_table.clear();
        if let Some(aspace) = self.aspace.lock().take() {
            aspace.destroy();
        }
    }

    /// 获取进程状态
    pub fn state(&self) -> ProcessState {
        *self.state.lock()
    }

    /// 获取退出代码
    pub fn exit_code(&self) -> Option<i32> {
        *self.exit_code.lock()
    }
}

impl_kernel_object!(Process, "Process", ObjectType::PROCESS);
