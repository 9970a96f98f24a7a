//! 资源对象
//!
//! 资源对象本身不携带数据，持有它的句柄就代表可以执行某一类特权操作
//! （调试控制台、ktrace 等）。

use alloc::sync::Arc;

use crate::impl_kernel_object;
use crate::object::traits::*;
use shared::abi::ObjectType;

/// 资源对象
#[derive(Debug)]
pub struct Resource {
    /// 对象ID
    id: KObjectId,
}

impl Resource {
    /// 根资源，授予所有特权操作
    pub fn root() -> Arc<Self> {
        Arc::new(Self {
            id: KObjectId::new(),
        })
    }
}

impl_kernel_object!(Resource, "Resource", ObjectType::RESOURCE);
