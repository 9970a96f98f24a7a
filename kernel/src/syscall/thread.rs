//! 线程寄存器状态读写

use super::{SyscallDispatcher, SyscallResult};
use crate::memory::try_alloc_buffer;
use crate::object::traits::*;
use crate::object::types::{Thread, ThreadStateKind};
use crate::user::{UserInOutPtr, UserMutPtr, UserPtr};
use shared::abi::*;

impl SyscallDispatcher<'_> {
    /// 读取线程寄存器状态（HNX_SYS_THREAD_READ_STATE）
    ///
    /// `len` 传入用户缓冲区大小。成功或缓冲区不足时都写回所需大小，
    /// 只有成功时才拷贝寄存器内容。
    pub fn sys_thread_read_state(
        &self,
        handle: handle_t,
        kind: u32,
        mut buffer: UserMutPtr<'_>,
        mut len: UserInOutPtr<'_, u32>,
    ) -> SyscallResult {
        log::trace!("thread_read_state: handle={:#x}, kind={}", handle, kind);
        let thread = self
            .handle_table()
            .get_object::<Thread>(handle, ObjectRights::READ)?;

        let buffer_len = len.copy_from_user()? as usize;
        if buffer_len > MAX_THREAD_STATE_SIZE {
            return Err(ObjectError::InvalidArgs);
        }
        let kind = ThreadStateKind::try_from(kind)?;

        let mut bytes = try_alloc_buffer(buffer_len)?;
        match thread.read_state(kind, &mut bytes) {
            Ok(actual) => {
                len.copy_to_user(actual as u32)?;
                buffer.copy_array_to_user(&bytes[..actual])?;
                Ok(0)
            }
            Err(ObjectError::BufferTooSmall) => {
                len.copy_to_user(kind.size() as u32)?;
                Err(ObjectError::BufferTooSmall)
            }
            Err(err) => Err(err),
        }
    }

    /// 写入线程寄存器状态（HNX_SYS_THREAD_WRITE_STATE）
    ///
    /// 始终以非特权方式写入，用户态不能修改特权位。
    pub fn sys_thread_write_state(
        &self,
        handle: handle_t,
        kind: u32,
        buffer: UserPtr<'_>,
        len: usize,
    ) -> SyscallResult {
        log::trace!(
            "thread_write_state: handle={:#x}, kind={}, len={}",
            handle,
            kind,
            len
        );
        let thread = self
            .handle_table()
            .get_object::<Thread>(handle, ObjectRights::WRITE)?;

        if len > MAX_THREAD_STATE_SIZE {
            return Err(ObjectError::InvalidArgs);
        }
        let kind = ThreadStateKind::try_from(kind)?;

        let mut bytes = try_alloc_buffer(len)?;
        buffer.copy_array_from_user(&mut bytes)?;
        thread.write_state(kind, &bytes, false)?;
        Ok(0)
    }
}
