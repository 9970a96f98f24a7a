//! 系统调用分发器
//!
//! 调试类系统调用的实现，遵循Zircon微内核设计。
//! 每个调用先通过句柄检查权限，再分派到具体的对象操作。
//! 用户指针在进入 `sys_*` 之前已经被包装成 [`crate::user`] 中的类型，
//! 所有拷贝失败都以 `InvalidArgs` 返回。

mod debug;
mod ktrace;
mod memory;
mod thread;

use alloc::sync::Arc;

use crate::kernel::Kernel;
use crate::object::traits::*;
use crate::object::types::Process;
use crate::object::HandleTable;
use crate::user::{UserInOutPtr, UserMutPtr, UserOutPtr, UserPtr};
use shared::abi::*;

/// 系统调用结果类型
pub type SyscallResult = Result<usize, ObjectError>;

/// 转换为系统调用返回值：成功为非负值，失败为负的状态码
pub fn into_status(result: SyscallResult) -> isize {
    match result {
        Ok(value) => value as isize,
        Err(err) => err.status() as isize,
    }
}

/// 系统调用分发器
///
/// 每次系统调用针对一个调用者（进程 + 线程）创建。
pub struct SyscallDispatcher<'k> {
    kernel: &'k Kernel,
    /// 调用者进程
    current: Arc<Process>,
    /// 调用者线程ID
    current_tid: u64,
}

impl<'k> SyscallDispatcher<'k> {
    pub fn new(kernel: &'k Kernel, current: Arc<Process>, current_tid: u64) -> Self {
        Self {
            kernel,
            current,
            current_tid,
        }
    }

    pub fn current(&self) -> &Arc<Process> {
        &self.current
    }

    fn handle_table(&self) -> &HandleTable {
        self.current.handle_table()
    }

    /// 检查句柄指向资源对象
    ///
    /// 只检查对象类型，不检查权限或资源种类。
    // TODO: 按资源种类区分调试控制台与 ktrace 的授权
    fn validate_resource_handle(&self, handle: handle_t) -> Result<(), ObjectError> {
        let handle = self.handle_table().get(handle)?;
        if handle.object().object_type() != ObjectType::RESOURCE {
            return Err(ObjectError::WrongType);
        }
        Ok(())
    }

    /// 根据系统调用号分派处理
    ///
    /// # Safety
    /// `args` 中的指针参数必须指向调用者地址空间中可访问的内存，
    /// 长度与对应参数一致；空指针用 0 表示。
    pub unsafe fn dispatch(&self, syscall: u32, args: &[usize; 6]) -> isize {
        let [a0, a1, a2, a3, a4, _] = *args;
        match syscall {
            // 调试控制台
            HNX_SYS_DEBUG_READ => into_status(self.sys_debug_read(
                a0 as handle_t,
                UserMutPtr::from_raw(a1, a2 as u32 as usize),
                a2 as u32 as usize,
            )),
            HNX_SYS_DEBUG_WRITE => {
                let len = a1 as u32 as usize;
                into_status(self.sys_debug_write(
                    UserPtr::from_raw(a0, len.min(MAX_DEBUG_WRITE_SIZE)),
                    len,
                ))
            }
            HNX_SYS_DEBUG_SEND_COMMAND => {
                let len = a2 as u32 as usize;
                match self.sys_debug_send_command(
                    a0 as handle_t,
                    UserPtr::from_raw(a1, len.min(MAX_DEBUG_WRITE_SIZE)),
                    len,
                ) {
                    Ok(status) => status as isize,
                    Err(err) => err.status() as isize,
                }
            }
            HNX_SYS_DEBUG_TRANSFER_HANDLE => {
                into_status(self.sys_debug_transfer_handle(a0 as handle_t, a1 as handle_t))
            }

            // 进程内存
            HNX_SYS_PROCESS_READ_MEMORY => into_status(self.sys_process_read_memory(
                a0 as handle_t,
                a1,
                UserMutPtr::from_raw(a2, a3.min(MAX_DEBUG_READ_BLOCK)),
                a3,
                UserOutPtr::from_raw(a4),
            )),
            HNX_SYS_PROCESS_WRITE_MEMORY => into_status(self.sys_process_write_memory(
                a0 as handle_t,
                a1,
                UserPtr::from_raw(a2, a3.min(MAX_DEBUG_WRITE_BLOCK)),
                a3,
                UserOutPtr::from_raw(a4),
            )),

            // 线程状态
            HNX_SYS_THREAD_READ_STATE => {
                let len = UserInOutPtr::<u32>::from_raw(a3);
                let capacity = len.copy_from_user().map_or(0, |len| len as usize);
                into_status(self.sys_thread_read_state(
                    a0 as handle_t,
                    a1 as u32,
                    UserMutPtr::from_raw(a2, capacity.min(MAX_THREAD_STATE_SIZE)),
                    len,
                ))
            }
            HNX_SYS_THREAD_WRITE_STATE => {
                let len = a3 as u32 as usize;
                into_status(self.sys_thread_write_state(
                    a0 as handle_t,
                    a1 as u32,
                    UserPtr::from_raw(a2, len.min(MAX_THREAD_STATE_SIZE)),
                    len,
                ))
            }

            // ktrace
            HNX_SYS_KTRACE_READ => into_status(self.sys_ktrace_read(
                a0 as handle_t,
                UserMutPtr::from_raw(a1, a3 as u32 as usize),
                a2 as u32,
                a3 as u32,
            )),
            HNX_SYS_KTRACE_CONTROL => into_status(self.sys_ktrace_control(
                a0 as handle_t,
                a1 as u32,
                a2 as u32,
                UserPtr::from_raw(a3, MAX_NAME_LEN - 1),
            )),
            HNX_SYS_KTRACE_WRITE => into_status(self.sys_ktrace_write(
                a0 as handle_t,
                a1 as u32,
                a2 as u32,
                a3 as u32,
            )),

            // 未知的系统调用
            _ => {
                log::debug!("unknown syscall {:#x}", syscall);
                ZX_ERR_BAD_SYSCALL as isize
            }
        }
    }
}
