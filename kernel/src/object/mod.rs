//! 内核对象系统
//!
//! 基于能力的对象系统，参考Zircon微内核设计。
//! 核心概念：
//! - 一切皆对象：所有内核资源都表示为对象
//! - 基于句柄：用户态通过句柄引用对象
//! - 基于能力：句柄带有权限，实现最小权限原则
//! - 引用计数：对象生命周期由引用计数管理

pub mod handle;
pub mod table;
pub mod traits;
pub mod types;

pub use handle::Handle;
pub use table::{HandleTable, SlotTicket};
pub use traits::{
    DowncastArc, KObjectId, KernelObject, ObjectError, ObjectRights,
};

/// 简化对象实现的宏
#[macro_export]
macro_rules! impl_kernel_object {
    ($type:ty, $name:expr, $kind:expr) => {
        impl $crate::object::traits::KernelObject for $type {
            fn type_name(&self) -> &'static str {
                $name
            }

            fn object_type(&self) -> shared::abi::ObjectType {
                $kind
            }

            fn id(&self) -> $crate::object::traits::KObjectId {
                self.id
            }

            fn into_any_arc(
                self: alloc::sync::Arc<Self>,
            ) -> alloc::sync::Arc<dyn core::any::Any + Send + Sync> {
                self
            }
        }
    };
}
