// kernel/src/object/table.rs

use super::handle::Handle;
use super::traits::{KernelObject, ObjectError, ObjectRights};
use alloc::sync::Arc;
use alloc::vec::Vec;
use shared::abi::handle_t;
use spin::Mutex;

/// 句柄表槽位
#[derive(Clone)]
enum Slot {
    Free,
    /// 句柄已被取出但尚未提交（转移进行中），槽位不可复用
    Reserved,
    Used(Handle),
}

/// 被取出句柄所在槽位的凭据
///
/// 必须交还给 [`HandleTable::release`] 或 [`HandleTable::restore`]，
/// 否则槽位一直保持保留状态。
#[must_use]
#[derive(Debug)]
pub struct SlotTicket {
    index: usize,
}

/// 进程句柄表结构
pub struct HandleTable {
    /// 句柄到对象的映射
    handles: Mutex<Vec<Slot>>,
    /// 进程ID
    pid: u64,
}

/// 进程句柄表实现
impl HandleTable {
    /// 最大句柄数 （默认1024）
    pub const MAX_HANDLES: usize = 1024;

    pub fn new(pid: u64) -> Self {
        Self::with_capacity(pid, Self::MAX_HANDLES)
    }

    pub fn with_capacity(pid: u64, capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize(capacity, Slot::Free);
        Self {
            handles: Mutex::new(slots),
            pid,
        }
    }

    pub fn pid(&self) -> u64 {
        self.pid
    }

    // 句柄值从1开始，0永远无效
    fn value_of(index: usize) -> handle_t {
        (index + 1) as handle_t
    }

    fn index_of(value: handle_t) -> Option<usize> {
        (value as usize).checked_sub(1)
    }

    /// 添加句柄，返回句柄值
    pub fn add(
        &self,
        object: Arc<dyn KernelObject>,
        rights: ObjectRights,
    ) -> Result<handle_t, ObjectError> {
        self.insert(Handle::new(object, rights, self.pid))
            .map_err(|(err, _)| err)
    }

    /// 插入已有句柄（例如从其他进程转移而来），返回新句柄值
    ///
    /// 失败时把句柄原样交还给调用者，避免句柄被静默丢弃。
    pub fn insert(&self, mut handle: Handle) -> Result<handle_t, (ObjectError, Handle)> {
        let mut handles = self.handles.lock();
        // 寻找空闲槽位
        match handles.iter().position(|slot| matches!(slot, Slot::Free)) {
            Some(idx) => {
                handle.set_owner(self.pid);
                handles[idx] = Slot::Used(handle);
                Ok(Self::value_of(idx))
            }
            None => Err((ObjectError::NoMemory, handle)),
        }
    }

    /// 获取句柄（不取出）
    pub fn get(&self, handle_value: handle_t) -> Result<Handle, ObjectError> {
        let idx = Self::index_of(handle_value).ok_or(ObjectError::BadHandle)?;
        let handles = self.handles.lock();
        match handles.get(idx) {
            Some(Slot::Used(handle)) => Ok(handle.clone()),
            _ => Err(ObjectError::BadHandle),
        }
    }

    /// 按类型和权限取出对象
    pub fn get_object<T: KernelObject>(
        &self,
        handle_value: handle_t,
        rights: ObjectRights,
    ) -> Result<Arc<T>, ObjectError> {
        self.get(handle_value)?.object_as::<T>(rights)
    }

    /// 移除句柄（取出所有权）
    pub fn remove(&self, handle_value: handle_t) -> Result<Handle, ObjectError> {
        let (handle, ticket) = self.take(handle_value)?;
        self.release(ticket);
        Ok(handle)
    }

    /// 取出句柄并保留其槽位
    ///
    /// 取出后该句柄值在本表中立即失效；槽位在 `release`/`restore` 之前不会被复用。
    pub fn take(&self, handle_value: handle_t) -> Result<(Handle, SlotTicket), ObjectError> {
        let idx = Self::index_of(handle_value).ok_or(ObjectError::BadHandle)?;
        let mut handles = self.handles.lock();
        let slot = handles.get_mut(idx).ok_or(ObjectError::BadHandle)?;
        if !matches!(slot, Slot::Used(_)) {
            return Err(ObjectError::BadHandle);
        }
        match core::mem::replace(slot, Slot::Reserved) {
            Slot::Used(handle) => Ok((handle, SlotTicket { index: idx })),
            _ => Err(ObjectError::Internal),
        }
    }

    /// 释放保留的槽位
    pub fn release(&self, ticket: SlotTicket) {
        let mut handles = self.handles.lock();
        if let Some(slot) = handles.get_mut(ticket.index) {
            *slot = Slot::Free;
        }
    }

    /// 把句柄放回原槽位，句柄值保持不变
    pub fn restore(&self, ticket: SlotTicket, mut handle: Handle) -> handle_t {
        handle.set_owner(self.pid);
        let mut handles = self.handles.lock();
        if let Some(slot) = handles.get_mut(ticket.index) {
            *slot = Slot::Used(handle);
        }
        Self::value_of(ticket.index)
    }

    /// 当前有效句柄数
    pub fn len(&self) -> usize {
        self.handles
            .lock()
            .iter()
            .filter(|slot| matches!(slot, Slot::Used(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 关闭所有句柄（进程销毁时调用）
    pub fn clear(&self) {
        let mut handles = self.handles.lock();
        for slot in handles.iter_mut() {
            if let Slot::Used(handle) = core::mem::replace(slot, Slot::Free) {
                handle.object().on_close();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::types::{Resource, Vmo};

    fn vmo() -> Arc<Vmo> {
        Vmo::new(64).unwrap()
    }

    #[test]
    fn test_handle_values_start_at_one() {
        let table = HandleTable::new(7);
        let value = table.add(vmo(), ObjectRights::READ).unwrap();
        assert_eq!(value, 1);
        assert_eq!(table.get(0).unwrap_err(), ObjectError::BadHandle);
        assert_eq!(table.get(value).unwrap().owner_pid(), 7);
    }

    #[test]
    fn test_remove_invalidates_value() {
        let table = HandleTable::new(1);
        let value = table.add(vmo(), ObjectRights::READ).unwrap();
        assert!(table.remove(value).is_ok());
        assert_eq!(table.get(value).unwrap_err(), ObjectError::BadHandle);
        assert_eq!(table.remove(value).unwrap_err(), ObjectError::BadHandle);
        assert!(table.is_empty());
    }

    #[test]
    fn test_table_full_returns_handle() {
        let table = HandleTable::with_capacity(1, 1);
        table.add(vmo(), ObjectRights::READ).unwrap();

        let handle = Handle::new(vmo(), ObjectRights::WRITE, 2);
        let (err, returned) = table.insert(handle).unwrap_err();
        assert_eq!(err, ObjectError::NoMemory);
        assert_eq!(returned.rights(), ObjectRights::WRITE);
    }

    #[test]
    fn test_reserved_slot_is_not_reused() {
        let table = HandleTable::with_capacity(1, 1);
        let value = table.add(vmo(), ObjectRights::READ).unwrap();

        let (handle, ticket) = table.take(value).unwrap();
        assert_eq!(table.get(value).unwrap_err(), ObjectError::BadHandle);
        // 唯一的槽位处于保留状态
        assert!(table.add(vmo(), ObjectRights::READ).is_err());

        assert_eq!(table.restore(ticket, handle), value);
        assert!(table.get(value).is_ok());
    }

    #[test]
    fn test_get_object_checks_type_and_rights() {
        let table = HandleTable::new(1);
        let value = table.add(vmo(), ObjectRights::READ).unwrap();

        assert!(table.get_object::<Vmo>(value, ObjectRights::READ).is_ok());
        assert_eq!(
            table.get_object::<Resource>(value, ObjectRights::READ).unwrap_err(),
            ObjectError::WrongType
        );
        assert_eq!(
            table.get_object::<Vmo>(value, ObjectRights::WRITE).unwrap_err(),
            ObjectError::PermissionDenied
        );
    }

    #[test]
    fn test_insert_restamps_owner() {
        let table = HandleTable::new(9);
        let handle = Handle::new(vmo(), ObjectRights::READ, 3);
        let value = table.insert(handle).unwrap();
        assert_eq!(table.get(value).unwrap().owner_pid(), 9);
    }
}
