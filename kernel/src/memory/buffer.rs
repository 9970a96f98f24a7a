//! 可失败的临时缓冲区分配
//!
//! 由调用方控制大小的内核缓冲区一律走这里：分配失败返回 `NoMemory`，
//! 不会触发全局分配器的 abort。

use crate::object::ObjectError;
use alloc::vec::Vec;

/// 分配 `len` 字节、已清零的缓冲区
pub fn try_alloc_buffer(len: usize) -> Result<Vec<u8>, ObjectError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| ObjectError::NoMemory)?;
    buf.resize(len, 0);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_exact_len() {
        let buf = try_alloc_buffer(272).unwrap();
        assert_eq!(buf.len(), 272);
        assert!(buf.iter().all(|&b| b == 0));
        assert!(try_alloc_buffer(0).unwrap().is_empty());
    }

    #[test]
    fn test_alloc_failure_is_an_error() {
        assert_eq!(try_alloc_buffer(usize::MAX).unwrap_err(), ObjectError::NoMemory);
    }
}
