/// 内核对象句柄
///
/// 句柄是内核对象的引用，用于在进程之间传递对象引用。
/// 每个句柄都有一个权限位，用于控制对对象的访问。
use super::traits::{DowncastArc, KernelObject, ObjectError, ObjectRights};
use alloc::sync::Arc;

/// 内核对象句柄
#[derive(Clone)]
pub struct Handle {
    /// 指向内核对象的引用计数指针
    object: Arc<dyn KernelObject>,
    /// 该句柄拥有的权限
    rights: ObjectRights,
    /// 所属进程ID
    owner_pid: u64,
}

impl Handle {
    pub fn new(object: Arc<dyn KernelObject>, rights: ObjectRights, owner_pid: u64) -> Handle {
        Handle {
            object,
            rights: rights - ObjectRights::SAME_RIGHTS,
            owner_pid,
        }
    }

    pub fn object(&self) -> &Arc<dyn KernelObject> {
        &self.object
    }

    pub fn rights(&self) -> ObjectRights {
        self.rights
    }

    pub fn owner_pid(&self) -> u64 {
        self.owner_pid
    }

    /// 句柄被插入另一个进程的句柄表时更新所有者
    pub(super) fn set_owner(&mut self, pid: u64) {
        self.owner_pid = pid;
    }

    /// 检查是否拥有指定权限
    pub fn check_rights(&self, required: ObjectRights) -> Result<(), ObjectError> {
        if self.rights.contains(required) {
            Ok(())
        } else {
            Err(ObjectError::PermissionDenied)
        }
    }

    /// 取出具体类型的对象，先检查类型再检查权限
    pub fn object_as<T: KernelObject>(&self, required: ObjectRights) -> Result<Arc<T>, ObjectError> {
        let object = self.object.clone().downcast_arc::<T>()?;
        self.check_rights(required)?;
        Ok(object)
    }

    /// 复制句柄（只能降低权限）
    ///
    /// `SAME_RIGHTS` 保留原有权限；请求原句柄没有的权限返回 `InvalidArgs`。
    pub fn duplicate(&self, new_rights: ObjectRights) -> Result<Handle, ObjectError> {
        self.check_rights(ObjectRights::DUPLICATE)?;
        let rights = if new_rights.contains(ObjectRights::SAME_RIGHTS) {
            self.rights
        } else if self.rights.contains(new_rights) {
            new_rights
        } else {
            return Err(ObjectError::InvalidArgs);
        };
        Ok(Handle {
            object: self.object.clone(),
            rights,
            owner_pid: self.owner_pid,
        })
    }
}

impl core::fmt::Debug for Handle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Handle")
            .field("object", &self.object.type_name())
            .field("koid", &self.object.id())
            .field("rights", &self.rights)
            .field("owner_pid", &self.owner_pid)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::types::Vmo;

    fn vmo_handle(rights: ObjectRights) -> Handle {
        let vmo = Vmo::new(4096).unwrap();
        Handle::new(vmo, rights, 1)
    }

    #[test]
    fn test_check_rights() {
        let handle = vmo_handle(ObjectRights::READ);
        assert!(handle.check_rights(ObjectRights::READ).is_ok());
        assert_eq!(
            handle.check_rights(ObjectRights::READ | ObjectRights::WRITE),
            Err(ObjectError::PermissionDenied)
        );
    }

    #[test]
    fn test_duplicate_never_widens_rights() {
        let handle = vmo_handle(ObjectRights::DUPLICATE | ObjectRights::READ);

        let narrowed = handle.duplicate(ObjectRights::READ).unwrap();
        assert_eq!(narrowed.rights(), ObjectRights::READ);

        let same = handle.duplicate(ObjectRights::SAME_RIGHTS).unwrap();
        assert_eq!(same.rights(), handle.rights());

        assert_eq!(
            handle.duplicate(ObjectRights::READ | ObjectRights::WRITE).unwrap_err(),
            ObjectError::InvalidArgs
        );
    }

    #[test]
    fn test_duplicate_requires_duplicate_right() {
        let handle = vmo_handle(ObjectRights::READ);
        assert_eq!(
            handle.duplicate(ObjectRights::READ).unwrap_err(),
            ObjectError::PermissionDenied
        );
    }

    #[test]
    fn test_object_as_checks_type_before_rights() {
        use crate::object::types::Resource;
        let handle = vmo_handle(ObjectRights::empty());
        assert_eq!(
            handle.object_as::<Resource>(ObjectRights::READ).unwrap_err(),
            ObjectError::WrongType
        );
        assert_eq!(
            handle.object_as::<Vmo>(ObjectRights::READ).unwrap_err(),
            ObjectError::PermissionDenied
        );
    }
}
