//! 虚拟内存对象（VMO）
//!
//! 虚拟内存对象表示一片连续的字节存储，可以映射到一个或多个进程的地址空间。
//! VMO支持以下操作：
//! - 创建指定大小的VMO
//! - 在内核缓冲区或用户缓冲区与VMO之间读写
//!
//! 每次读写都在VMO锁内完成，调用者看到的是某个一致的状态；
//! 不同调用之间不保证顺序。

use alloc::sync::Arc;
use alloc::vec::Vec;
use spin::Mutex;

use crate::memory::try_alloc_buffer;
use crate::object::traits::*;
use crate::impl_kernel_object;
use crate::user::{UserMutPtr, UserPtr};
use shared::abi::ObjectType;

/// 虚拟内存对象
pub struct Vmo {
    /// 对象ID
    id: KObjectId,
    /// 内存大小（字节）
    size: usize,
    /// 内容
    data: Mutex<Vec<u8>>,
}

impl Vmo {
    /// VMO 大小上限（1GB）
    pub const MAX_SIZE: usize = 1024 * 1024 * 1024;

    /// 创建新的VMO
    pub fn new(size: usize) -> Result<Arc<Self>, ObjectError> {
        if size == 0 || size > Self::MAX_SIZE {
            return Err(ObjectError::InvalidArgs);
        }

        let data = try_alloc_buffer(size)?;
        Ok(Arc::new(Self {
            id: KObjectId::new(),
            size,
            data: Mutex::new(data),
        }))
    }

    /// 获取VMO大小
    pub fn size(&self) -> usize {
        self.size
    }

    /// 把 `[offset, offset + len)` 裁剪到VMO范围内
    fn trim(&self, offset: u64, len: usize) -> Result<core::ops::Range<usize>, ObjectError> {
        let offset = usize::try_from(offset).map_err(|_| ObjectError::OutOfRange)?;
        if offset > self.size {
            return Err(ObjectError::OutOfRange);
        }
        let len = len.min(self.size - offset);
        Ok(offset..offset + len)
    }

    /// 读取VMO数据到内核缓冲区，返回实际读取的字节数
    pub fn read(&self, offset: u64, buffer: &mut [u8]) -> Result<usize, ObjectError> {
        let range = self.trim(offset, buffer.len())?;
        let len = range.len();
        buffer[..len].copy_from_slice(&self.data.lock()[range]);
        Ok(len)
    }

    /// 从内核缓冲区写入VMO，返回实际写入的字节数
    pub fn write(&self, offset: u64, data: &[u8]) -> Result<usize, ObjectError> {
        let range = self.trim(offset, data.len())?;
        let len = range.len();
        self.data.lock()[range].copy_from_slice(&data[..len]);
        Ok(len)
    }

    /// 读取最多 `len` 字节到用户缓冲区
    ///
    /// 超出VMO末尾的部分被截断；用户缓冲区不足时返回 `InvalidArgs`。
    pub fn read_user(
        &self,
        mut buffer: UserMutPtr<'_>,
        offset: u64,
        len: usize,
    ) -> Result<usize, ObjectError> {
        let range = self.trim(offset, len)?;
        let read = range.len();
        let data = self.data.lock();
        buffer.copy_array_to_user(&data[range])?;
        Ok(read)
    }

    /// 从用户缓冲区写入最多 `len` 字节
    pub fn write_user(
        &self,
        buffer: UserPtr<'_>,
        offset: u64,
        len: usize,
    ) -> Result<usize, ObjectError> {
        let range = self.trim(offset, len)?;
        let written = range.len();
        let mut data = self.data.lock();
        buffer.copy_array_from_user(&mut data[range])?;
        Ok(written)
    }
}

impl_kernel_object!(Vmo, "Vmo", ObjectType::VMO);

impl core::fmt::Debug for Vmo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Vmo")
            .field("id", &self.id)
            .field("size", &self.size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_limits() {
        assert_eq!(Vmo::new(0).unwrap_err(), ObjectError::InvalidArgs);
        assert_eq!(Vmo::new(Vmo::MAX_SIZE + 1).unwrap_err(), ObjectError::InvalidArgs);
        assert_eq!(Vmo::new(4096).unwrap().size(), 4096);
    }

    #[test]
    fn test_short_read_at_end() {
        let vmo = Vmo::new(16).unwrap();
        assert_eq!(vmo.write(8, &[0x5A; 16]).unwrap(), 8);

        let mut buf = [0u8; 16];
        assert_eq!(vmo.read(12, &mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], &[0x5A; 4]);
        assert_eq!(vmo.read(16, &mut buf).unwrap(), 0);
        assert_eq!(vmo.read(17, &mut buf).unwrap_err(), ObjectError::OutOfRange);
    }

    #[test]
    fn test_user_copies() {
        let vmo = Vmo::new(32).unwrap();
        let src = [7u8; 8];
        assert_eq!(vmo.write_user(UserPtr::new(&src), 4, 8).unwrap(), 8);

        let mut out = [0u8; 8];
        assert_eq!(vmo.read_user(UserMutPtr::new(&mut out), 4, 8).unwrap(), 8);
        assert_eq!(out, src);

        // 用户缓冲区比请求长度短
        let mut small = [0u8; 2];
        assert_eq!(
            vmo.read_user(UserMutPtr::new(&mut small), 0, 8).unwrap_err(),
            ObjectError::InvalidArgs
        );
    }
}
