//! 调试控制台与句柄转移

use super::{SyscallDispatcher, SyscallResult};
use crate::object::traits::*;
use crate::object::types::Process;
use crate::user::{UserMutPtr, UserPtr};
use alloc::sync::Arc;
use shared::abi::*;

impl SyscallDispatcher<'_> {
    /// 从调试控制台读取（HNX_SYS_DEBUG_READ）
    ///
    /// 读到控制台没有数据或用户缓冲区写失败为止，`'\r'` 转换为 `'\n'`。
    /// 返回实际读取的字节数。
    pub fn sys_debug_read(
        &self,
        handle: handle_t,
        mut buffer: UserMutPtr<'_>,
        len: usize,
    ) -> SyscallResult {
        log::trace!("debug_read: handle={:#x}, len={}", handle, len);
        self.validate_resource_handle(handle)?;

        let mut count = 0;
        while count < len {
            let Some(mut c) = self.kernel.console.getc() else {
                break;
            };
            if c == b'\r' {
                c = b'\n';
            }
            if buffer.copy_u8_to_user(count, c).is_err() {
                break;
            }
            count += 1;
        }
        Ok(count)
    }

    /// 向调试控制台写入（HNX_SYS_DEBUG_WRITE）
    ///
    /// 超过 256 字节的部分被截断，返回实际输出的字节数。
    pub fn sys_debug_write(&self, buffer: UserPtr<'_>, len: usize) -> SyscallResult {
        log::trace!("debug_write: len={}", len);
        let len = len.min(MAX_DEBUG_WRITE_SIZE);

        let mut buf = [0u8; MAX_DEBUG_WRITE_SIZE];
        buffer.copy_array_from_user(&mut buf[..len])?;

        self.kernel.console.write_bytes(&buf[..len]);
        Ok(len)
    }

    /// 执行调试命令（HNX_SYS_DEBUG_SEND_COMMAND）
    ///
    /// 返回命令执行器的状态码。
    pub fn sys_debug_send_command(
        &self,
        handle: handle_t,
        buffer: UserPtr<'_>,
        len: usize,
    ) -> Result<status_t, ObjectError> {
        log::trace!("debug_send_command: handle={:#x}, len={}", handle, len);
        self.validate_resource_handle(handle)?;

        if len > MAX_DEBUG_WRITE_SIZE {
            return Err(ObjectError::InvalidArgs);
        }

        // 命令 + '\n' + NUL
        let mut buf = [0u8; MAX_DEBUG_WRITE_SIZE + 2];
        buffer.copy_array_from_user(&mut buf[..len])?;
        buf[len] = b'\n';
        buf[len + 1] = 0;
        Ok(self.kernel.console.run_script(&buf[..len + 2]))
    }

    /// 把调用者的句柄转移到另一个进程（HNX_SYS_DEBUG_TRANSFER_HANDLE）
    ///
    /// 返回句柄在目标进程中的值。目标句柄表插入失败时，句柄以原来的
    /// 句柄值放回调用者的句柄表。
    pub fn sys_debug_transfer_handle(&self, proc: handle_t, src: handle_t) -> SyscallResult {
        log::trace!("debug_transfer_handle: proc={:#x}, src={:#x}", proc, src);
        let target = self
            .handle_table()
            .get_object::<Process>(proc, ObjectRights::READ | ObjectRights::WRITE)?;

        // 不允许转移给自己
        if Arc::ptr_eq(&target, &self.current) {
            return Err(ObjectError::InvalidArgs);
        }

        let table = self.handle_table();
        let (handle, ticket) = table.take(src)?;
        match target.handle_table().insert(handle) {
            Ok(value) => {
                table.release(ticket);
                Ok(value as usize)
            }
            Err((err, handle)) => {
                let restored = table.restore(ticket, handle);
                log::warn!(
                    "debug_transfer_handle: insert into pid {} failed ({}), handle {:#x} restored",
                    target.pid(),
                    err,
                    restored
                );
                Err(err)
            }
        }
    }
}
