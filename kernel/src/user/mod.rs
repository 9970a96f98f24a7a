//! 用户态内存访问
//!
//! 系统调用从不直接解引用用户指针。所有跨越用户/内核边界的拷贝都通过
//! 这里的类型完成：地址无效或长度不足时拷贝返回错误，而不是触发内核异常。
//! 调用方统一把拷贝失败转换为 `InvalidArgs`。

use crate::object::ObjectError;

/// 只读用户缓冲区
#[derive(Clone, Copy, Default)]
pub struct UserPtr<'a> {
    bytes: Option<&'a [u8]>,
}

impl<'a> UserPtr<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes: Some(bytes) }
    }

    pub const fn null() -> Self {
        Self { bytes: None }
    }

    /// 从系统调用参数构造
    ///
    /// # Safety
    /// `addr..addr+len` 必须是当前进程已映射、可读的用户内存，并且在
    /// 返回值存活期间保持有效。`addr == 0` 表示空指针。
    pub unsafe fn from_raw(addr: usize, len: usize) -> Self {
        if addr == 0 {
            Self::null()
        } else {
            Self::new(core::slice::from_raw_parts(addr as *const u8, len))
        }
    }

    pub fn is_null(&self) -> bool {
        self.bytes.is_none()
    }

    /// 拷贝 `dst.len()` 个字节到内核缓冲区
    pub fn copy_array_from_user(&self, dst: &mut [u8]) -> Result<(), ObjectError> {
        self.copy_from_user_at(0, dst)
    }

    /// 从用户缓冲区的 `offset` 处拷贝
    pub fn copy_from_user_at(&self, offset: usize, dst: &mut [u8]) -> Result<(), ObjectError> {
        let src = self.bytes.ok_or(ObjectError::InvalidArgs)?;
        let end = offset.checked_add(dst.len()).ok_or(ObjectError::InvalidArgs)?;
        let src = src.get(offset..end).ok_or(ObjectError::InvalidArgs)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

/// 可写用户缓冲区
#[derive(Default)]
pub struct UserMutPtr<'a> {
    bytes: Option<&'a mut [u8]>,
}

impl<'a> UserMutPtr<'a> {
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes: Some(bytes) }
    }

    pub fn null() -> Self {
        Self { bytes: None }
    }

    /// 从系统调用参数构造
    ///
    /// # Safety
    /// `addr..addr+len` 必须是当前进程已映射、可写的用户内存，并且在
    /// 返回值存活期间没有其他引用。`addr == 0` 表示空指针。
    pub unsafe fn from_raw(addr: usize, len: usize) -> Self {
        if addr == 0 {
            Self::null()
        } else {
            Self::new(core::slice::from_raw_parts_mut(addr as *mut u8, len))
        }
    }

    pub fn is_null(&self) -> bool {
        self.bytes.is_none()
    }

    /// 拷贝整个内核缓冲区到用户缓冲区开头
    pub fn copy_array_to_user(&mut self, src: &[u8]) -> Result<(), ObjectError> {
        self.copy_to_user_at(0, src)
    }

    pub fn copy_to_user_at(&mut self, offset: usize, src: &[u8]) -> Result<(), ObjectError> {
        let dst = self.bytes.as_deref_mut().ok_or(ObjectError::InvalidArgs)?;
        let end = offset.checked_add(src.len()).ok_or(ObjectError::InvalidArgs)?;
        let dst = dst.get_mut(offset..end).ok_or(ObjectError::InvalidArgs)?;
        dst.copy_from_slice(src);
        Ok(())
    }

    /// 写入单个字节
    pub fn copy_u8_to_user(&mut self, offset: usize, value: u8) -> Result<(), ObjectError> {
        self.copy_to_user_at(offset, &[value])
    }
}

/// 用户态输出参数
pub struct UserOutPtr<'a, T: Copy> {
    slot: Option<&'a mut T>,
}

impl<'a, T: Copy> UserOutPtr<'a, T> {
    pub fn new(slot: &'a mut T) -> Self {
        Self { slot: Some(slot) }
    }

    pub fn null() -> Self {
        Self { slot: None }
    }

    /// # Safety
    /// `addr` 为 0 或指向当前进程中对齐、可写的 `T`。
    pub unsafe fn from_raw(addr: usize) -> Self {
        Self {
            slot: (addr as *mut T).as_mut(),
        }
    }

    pub fn copy_to_user(&mut self, value: T) -> Result<(), ObjectError> {
        let slot = self.slot.as_deref_mut().ok_or(ObjectError::InvalidArgs)?;
        *slot = value;
        Ok(())
    }
}

/// 用户态输入/输出参数
pub struct UserInOutPtr<'a, T: Copy> {
    slot: Option<&'a mut T>,
}

impl<'a, T: Copy> UserInOutPtr<'a, T> {
    pub fn new(slot: &'a mut T) -> Self {
        Self { slot: Some(slot) }
    }

    pub fn null() -> Self {
        Self { slot: None }
    }

    /// # Safety
    /// `addr` 为 0 或指向当前进程中对齐、可读写的 `T`。
    pub unsafe fn from_raw(addr: usize) -> Self {
        Self {
            slot: (addr as *mut T).as_mut(),
        }
    }

    pub fn copy_from_user(&self) -> Result<T, ObjectError> {
        self.slot.as_deref().copied().ok_or(ObjectError::InvalidArgs)
    }

    pub fn copy_to_user(&mut self, value: T) -> Result<(), ObjectError> {
        let slot = self.slot.as_deref_mut().ok_or(ObjectError::InvalidArgs)?;
        *slot = value;
        Ok(())
    }
}
