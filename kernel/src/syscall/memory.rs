//! 跨进程内存读写

use super::{SyscallDispatcher, SyscallResult};
use crate::object::traits::*;
use crate::object::types::{Process, Vmo};
use crate::user::{UserMutPtr, UserOutPtr, UserPtr};
use alloc::sync::Arc;
use shared::abi::*;

/// 把目标进程中的 `vaddr` 解析为 (VMO, VMO 内偏移, 裁剪后的长度)
///
/// 长度被裁剪到所在区域的剩余部分，VMO 读写时还会再按自身大小裁剪。
fn resolve(process: &Process, vaddr: usize, len: usize) -> Result<(Arc<Vmo>, u64, usize), ObjectError> {
    let aspace = process.aspace().ok_or(ObjectError::BadState)?;
    let region = aspace.find_region(vaddr).ok_or(ObjectError::NoMemory)?;
    let vmo = region.vmo().cloned().ok_or(ObjectError::NoMemory)?;
    let offset = region.offset_of(vaddr).ok_or(ObjectError::NoMemory)?;
    Ok((vmo, offset, len.min(region.remaining(vaddr))))
}

impl SyscallDispatcher<'_> {
    /// 读取目标进程内存（HNX_SYS_PROCESS_READ_MEMORY）
    ///
    /// 需要目标进程句柄同时具有 READ 和 WRITE 权限。实际读取的字节数只在
    /// 读取成功时写回 `actual`。
    pub fn sys_process_read_memory(
        &self,
        proc: handle_t,
        vaddr: usize,
        buffer: UserMutPtr<'_>,
        len: usize,
        mut actual: UserOutPtr<'_, usize>,
    ) -> SyscallResult {
        log::trace!(
            "process_read_memory: proc={:#x}, vaddr={:#x}, len={}",
            proc,
            vaddr,
            len
        );
        if buffer.is_null() || len == 0 || len > MAX_DEBUG_READ_BLOCK {
            return Err(ObjectError::InvalidArgs);
        }

        let process = self
            .handle_table()
            .get_object::<Process>(proc, ObjectRights::READ | ObjectRights::WRITE)?;
        let (vmo, offset, len) = resolve(&process, vaddr, len)?;

        let read = vmo.read_user(buffer, offset, len)?;
        actual.copy_to_user(read)?;
        Ok(0)
    }

    /// 写入目标进程内存（HNX_SYS_PROCESS_WRITE_MEMORY）
    pub fn sys_process_write_memory(
        &self,
        proc: handle_t,
        vaddr: usize,
        buffer: UserPtr<'_>,
        len: usize,
        mut actual: UserOutPtr<'_, usize>,
    ) -> SyscallResult {
        log::trace!(
            "process_write_memory: proc={:#x}, vaddr={:#x}, len={}",
            proc,
            vaddr,
            len
        );
        if buffer.is_null() || len == 0 || len > MAX_DEBUG_WRITE_BLOCK {
            return Err(ObjectError::InvalidArgs);
        }

        let process = self
            .handle_table()
            .get_object::<Process>(proc, ObjectRights::WRITE)?;
        let (vmo, offset, len) = resolve(&process, vaddr, len)?;

        let written = vmo.write_user(buffer, offset, len)?;
        actual.copy_to_user(written)?;
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KtraceConfig;
    use crate::console::BufferedConsole;
    use crate::kernel::Kernel;
    use crate::ktrace::KtraceLog;
    use alloc::boxed::Box;

    fn kernel() -> Kernel {
        let log = KtraceLog::new(&KtraceConfig::default()).unwrap();
        Kernel::new(Arc::new(BufferedConsole::new()), Box::leak(Box::new(log)))
    }

    #[test]
    fn test_read_requires_write_right() {
        let kernel = kernel();
        let caller = Process::new(1);
        let target = Process::new(2);
        target
            .aspace()
            .unwrap()
            .map(0x1000, 0x1000, Vmo::new(0x1000).unwrap(), 0)
            .unwrap();
        let read_only = caller.handle_table().add(target.clone(), ObjectRights::READ).unwrap();
        let write_only = caller.handle_table().add(target, ObjectRights::WRITE).unwrap();
        let sys = SyscallDispatcher::new(&kernel, caller, 1);

        let mut buf = [0u8; 4];
        let mut actual = 0usize;
        assert_eq!(
            sys.sys_process_read_memory(
                read_only,
                0x1000,
                UserMutPtr::new(&mut buf),
                4,
                UserOutPtr::new(&mut actual)
            )
            .unwrap_err(),
            ObjectError::PermissionDenied
        );
        assert!(sys
            .sys_process_write_memory(write_only, 0x1000, UserPtr::new(&buf), 4, UserOutPtr::new(&mut actual))
            .is_ok());
        assert_eq!(actual, 4);
    }

    #[test]
    fn test_length_limits() {
        let kernel = kernel();
        let caller = Process::new(1);
        let proc = caller
            .handle_table()
            .add(Process::new(2), ObjectRights::DEFAULT_PROCESS)
            .unwrap();
        let sys = SyscallDispatcher::new(&kernel, caller, 1);

        let mut buf = [0u8; 4];
        let mut actual = 0usize;
        for len in [0, MAX_DEBUG_READ_BLOCK + 1] {
            assert_eq!(
                sys.sys_process_read_memory(
                    proc,
                    0x1000,
                    UserMutPtr::new(&mut buf),
                    len,
                    UserOutPtr::new(&mut actual)
                )
                .unwrap_err(),
                ObjectError::InvalidArgs
            );
        }
        assert_eq!(
            sys.sys_process_read_memory(proc, 0x1000, UserMutPtr::null(), 4, UserOutPtr::new(&mut actual))
                .unwrap_err(),
            ObjectError::InvalidArgs
        );
    }

    #[test]
    fn test_transfer_clamped_to_region() {
        let kernel = kernel();
        let caller = Process::new(1);
        let target = Process::new(2);
        // 区域只有一页，后面的 VMO 数据不属于该区域
        let vmo = Vmo::new(0x2000).unwrap();
        target.aspace().unwrap().map(0x1000, 0x1000, vmo.clone(), 0).unwrap();
        let proc = caller
            .handle_table()
            .add(target, ObjectRights::DEFAULT_PROCESS)
            .unwrap();
        let sys = SyscallDispatcher::new(&kernel, caller, 1);

        let src = [0x11u8; 32];
        let mut actual = 0usize;
        sys.sys_process_write_memory(proc, 0x1FF0, UserPtr::new(&src), 32, UserOutPtr::new(&mut actual))
            .unwrap();
        assert_eq!(actual, 16);

        let mut tail = [0u8; 16];
        vmo.read(0x1000, &mut tail).unwrap();
        assert_eq!(tail, [0u8; 16]);
    }

    #[test]
    fn test_reserved_region_has_no_memory() {
        let kernel = kernel();
        let caller = Process::new(1);
        let target = Process::new(2);
        target.aspace().unwrap().reserve(0x8000, 0x1000).unwrap();
        let proc = caller
            .handle_table()
            .add(target, ObjectRights::DEFAULT_PROCESS)
            .unwrap();
        let sys = SyscallDispatcher::new(&kernel, caller, 1);

        let mut buf = [0u8; 4];
        let mut actual = 0usize;
        assert_eq!(
            sys.sys_process_read_memory(proc, 0x8000, UserMutPtr::new(&mut buf), 4, UserOutPtr::new(&mut actual))
                .unwrap_err(),
            ObjectError::NoMemory
        );
    }

    #[test]
    fn test_actual_untouched_on_failure() {
        let kernel = kernel();
        let caller = Process::new(1);
        let target = Process::new(2);
        target
            .aspace()
            .unwrap()
            .map(0x1000, 0x1000, Vmo::new(0x1000).unwrap(), 0)
            .unwrap();
        let proc = caller
            .handle_table()
            .add(target, ObjectRights::DEFAULT_PROCESS)
            .unwrap();
        let sys = SyscallDispatcher::new(&kernel, caller, 1);

        // 用户缓冲区比请求长度短，拷贝失败
        let mut small = [0u8; 2];
        let mut actual = 0xDEADusize;
        assert_eq!(
            sys.sys_process_read_memory(proc, 0x1000, UserMutPtr::new(&mut small), 8, UserOutPtr::new(&mut actual))
                .unwrap_err(),
            ObjectError::InvalidArgs
        );
        assert_eq!(actual, 0xDEAD);
    }
}
