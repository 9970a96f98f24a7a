//! ktrace 系统调用

use super::{SyscallDispatcher, SyscallResult};
use crate::object::ObjectError;
use crate::user::{UserMutPtr, UserPtr};
use shared::abi::*;

impl SyscallDispatcher<'_> {
    /// 读取追踪日志（HNX_SYS_KTRACE_READ）
    pub fn sys_ktrace_read(
        &self,
        handle: handle_t,
        buffer: UserMutPtr<'_>,
        offset: u32,
        len: u32,
    ) -> SyscallResult {
        log::trace!("ktrace_read: handle={:#x}, offset={}, len={}", handle, offset, len);
        self.validate_resource_handle(handle)?;
        self.kernel.ktrace.read(buffer, offset as usize, len as usize)
    }

    /// 控制追踪日志（HNX_SYS_KTRACE_CONTROL）
    ///
    /// `KTRACE_ACTION_NEW_PROBE` 从用户缓冲区拷贝 `MAX_NAME_LEN - 1` 字节的名称。
    pub fn sys_ktrace_control(
        &self,
        handle: handle_t,
        action: u32,
        options: u32,
        ptr: UserPtr<'_>,
    ) -> SyscallResult {
        log::trace!("ktrace_control: action={}, options={:#x}", action, options);
        self.validate_resource_handle(handle)?;

        match action {
            KTRACE_ACTION_NEW_PROBE => {
                let mut name = [0u8; MAX_NAME_LEN];
                ptr.copy_array_from_user(&mut name[..MAX_NAME_LEN - 1])?;
                self.kernel.ktrace.control(action, options, Some(&name[..]))
            }
            _ => self.kernel.ktrace.control(action, options, None),
        }
    }

    /// 写入用户探针（HNX_SYS_KTRACE_WRITE）
    ///
    /// 没有可用槽位（追踪停止或缓冲区已满）时返回 `Unavailable`。
    pub fn sys_ktrace_write(
        &self,
        handle: handle_t,
        event_id: u32,
        arg0: u32,
        arg1: u32,
    ) -> SyscallResult {
        log::trace!("ktrace_write: event={:#x}", event_id);
        self.validate_resource_handle(handle)?;

        if event_id > KTRACE_MAX_PROBE_ID {
            return Err(ObjectError::InvalidArgs);
        }
        let slot = self
            .kernel
            .ktrace
            .open_probe(event_id, self.current_tid as u32)
            .ok_or(ObjectError::Unavailable)?;
        slot.write(arg0, arg1);
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
    use crate::object::types::{Process, Resource};
    use crate::object::ObjectRights;
    use alloc::boxed::Box;
    use alloc::sync::Arc;

    fn setup(size: usize) -> (Kernel, Arc<Process>, handle_t) {
        let config = KtraceConfig {
            buffer_size: size,
            group_mask: KTRACE_GRP_ALL,
        };
        let log = KtraceLog::new(&config).unwrap();
        let kernel = Kernel::new(Arc::new(BufferedConsole::new()), Box::leak(Box::new(log)));
        let process = Process::new(1);
        let root = process
            .handle_table()
            .add(Resource::root(), ObjectRights::DEFAULT_RESOURCE)
            .unwrap();
        (kernel, process, root)
    }

    #[test]
    fn test_new_probe_copies_fixed_name() {
        let (kernel, process, root) = setup(4096);
        let sys = SyscallDispatcher::new(&kernel, process, 1);

        let mut name = [0u8; MAX_NAME_LEN - 1];
        name[..4].copy_from_slice(b"sync");
        let id = sys
            .sys_ktrace_control(root, KTRACE_ACTION_NEW_PROBE, 0, UserPtr::new(&name))
            .unwrap();
        assert_eq!(kernel.ktrace.probe_id(b"sync"), Some(id as u32));

        // 名称缓冲区不足 MAX_NAME_LEN - 1 字节
        assert_eq!(
            sys.sys_ktrace_control(root, KTRACE_ACTION_NEW_PROBE, 0, UserPtr::new(b"sync\0"))
                .unwrap_err(),
            ObjectError::InvalidArgs
        );
    }

    #[test]
    fn test_write_unavailable_when_stopped() {
        let (kernel, process, root) = setup(4096);
        let sys = SyscallDispatcher::new(&kernel, process, 1);

        sys.sys_ktrace_control(root, KTRACE_ACTION_STOP, 0, UserPtr::null())
            .unwrap();
        assert_eq!(
            sys.sys_ktrace_write(root, 1, 0, 0).unwrap_err(),
            ObjectError::Unavailable
        );
    }

    #[test]
    fn test_read_reports_valid_length() {
        let (kernel, process, root) = setup(4096);
        let sys = SyscallDispatcher::new(&kernel, process, 1);

        sys.sys_ktrace_write(root, 2, 3, 4).unwrap();
        let valid = sys.sys_ktrace_read(root, UserMutPtr::null(), 0, 0).unwrap();
        assert_eq!(valid, 16 + 24);

        let mut buf = [0u8; 64];
        assert_eq!(sys.sys_ktrace_read(root, UserMutPtr::new(&mut buf), 16, 64).unwrap(), 24);
        assert_eq!(sys.sys_ktrace_read(root, UserMutPtr::new(&mut buf), 100, 64).unwrap(), 0);
    }

    #[test]
    fn test_requires_resource_handle() {
        let (kernel, process, _) = setup(4096);
        let sys = SyscallDispatcher::new(&kernel, process, 1);
        assert_eq!(sys.sys_ktrace_write(42, 1, 0, 0).unwrap_err(), ObjectError::BadHandle);
    }
}
