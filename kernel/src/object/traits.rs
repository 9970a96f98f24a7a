// 基本内核特征
use alloc::sync::Arc;
use core::any::Any;
use core::sync::atomic::{AtomicU64, Ordering};
use shared::abi::*;

/// 内核对象ID类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KObjectId(u64);

impl KObjectId {
    pub fn new() -> KObjectId {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        KObjectId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> koid_t {
        self.0
    }
}

bitflags::bitflags! {
    /// 对象权限位
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ObjectRights: u32 {
        const DUPLICATE    = ZX_RIGHT_DUPLICATE;
        const TRANSFER     = ZX_RIGHT_TRANSFER;
        const READ         = ZX_RIGHT_READ;
        const WRITE        = ZX_RIGHT_WRITE;
        const EXECUTE      = ZX_RIGHT_EXECUTE;
        const MAP          = ZX_RIGHT_MAP;
        const GET_PROPERTY = ZX_RIGHT_GET_PROPERTY;
        const SET_PROPERTY = ZX_RIGHT_SET_PROPERTY;
        const ENUMERATE    = ZX_RIGHT_ENUMERATE;
        const DESTROY      = ZX_RIGHT_DESTROY;
        const SAME_RIGHTS  = ZX_RIGHT_SAME_RIGHTS; // 复制时保持相同权限

        const DEFAULT_PROCESS = Self::DUPLICATE.bits() | Self::TRANSFER.bits()
            | Self::READ.bits() | Self::WRITE.bits() | Self::DESTROY.bits();
        const DEFAULT_THREAD = Self::DEFAULT_PROCESS.bits();
        const DEFAULT_VMO = Self::DUPLICATE.bits() | Self::TRANSFER.bits()
            | Self::READ.bits() | Self::WRITE.bits() | Self::MAP.bits();
        const DEFAULT_RESOURCE = Self::DUPLICATE.bits() | Self::TRANSFER.bits()
            | Self::READ.bits() | Self::WRITE.bits();
    }
}

/// 所有内核对象必须实现的特性
pub trait KernelObject: Send + Sync + Any {
    /// 返回对象类型名
    fn type_name(&self) -> &'static str;

    /// 返回对象类型（ABI 可见）
    fn object_type(&self) -> ObjectType;

    /// 返回对象ID
    fn id(&self) -> KObjectId;

    /// 关闭对象时的清理操作
    fn on_close(&self) {}

    /// 将Arc<Self>转换为Arc<dyn Any>，以便按值向下转换
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// 为Arc<dyn KernelObject>提供向下转换方法
pub trait DowncastArc {
    /// 尝试将Arc<dyn KernelObject>向下转换为具体类型
    fn downcast_arc<T: KernelObject>(self) -> Result<Arc<T>, ObjectError>;
}

impl DowncastArc for Arc<dyn KernelObject> {
    fn downcast_arc<T: KernelObject>(self) -> Result<Arc<T>, ObjectError> {
        self.into_any_arc()
            .downcast::<T>()
            .map_err(|_| ObjectError::WrongType)
    }
}

/// 错误类型
///
/// 每个变体对应一个 ABI 状态码，见 [`ObjectError::status`]。
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ObjectError {
    #[error("invalid arguments")]
    InvalidArgs,
    #[error("bad handle")]
    BadHandle,
    #[error("object has the wrong type")]
    WrongType,
    #[error("handle lacks the required rights")]
    PermissionDenied,
    #[error("object is in the wrong state")]
    BadState,
    #[error("no memory")]
    NoMemory,
    #[error("buffer too small")]
    BufferTooSmall,
    #[error("resource temporarily unavailable")]
    Unavailable,
    #[error("offset out of range")]
    OutOfRange,
    #[error("operation not supported")]
    NotSupported,
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("internal error")]
    Internal,
}

impl ObjectError {
    /// 转换为 ABI 状态码
    pub fn status(&self) -> status_t {
        match self {
            ObjectError::InvalidArgs => ZX_ERR_INVALID_ARGS,
            ObjectError::BadHandle => ZX_ERR_BAD_HANDLE,
            ObjectError::WrongType => ZX_ERR_WRONG_TYPE,
            ObjectError::PermissionDenied => ZX_ERR_ACCESS_DENIED,
            ObjectError::BadState => ZX_ERR_BAD_STATE,
            ObjectError::NoMemory => ZX_ERR_NO_MEMORY,
            ObjectError::BufferTooSmall => ZX_ERR_BUFFER_TOO_SMALL,
            ObjectError::Unavailable => ZX_ERR_UNAVAILABLE,
            ObjectError::OutOfRange => ZX_ERR_OUT_OF_RANGE,
            ObjectError::NotSupported => ZX_ERR_NOT_SUPPORTED,
            ObjectError::NotFound => ZX_ERR_NOT_FOUND,
            ObjectError::AlreadyExists => ZX_ERR_ALREADY_EXISTS,
            ObjectError::Internal => ZX_ERR_INTERNAL,
        }
    }
}
