//! 进程地址空间
//!
//! 地址空间是一组互不重叠的映射区域，按基地址排序。每个区域把一段
//! 连续的虚拟地址映射到某个 VMO 的某个偏移处。区域与 VMO 之间只有
//! 区域到 VMO 的引用计数指针，VMO 不回指区域。

use core::ops::Range;

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use spin::Mutex;

use crate::arch::PAGE_SIZE;
use crate::object::types::Vmo;
use crate::object::ObjectError;

/// 映射区域
#[derive(Debug, Clone)]
pub struct Region {
    /// 虚拟地址范围
    range: Range<usize>,
    /// 区域起点在 VMO 中的偏移
    object_offset: u64,
    /// 后备 VMO（保留区域没有）
    vmo: Option<Arc<Vmo>>,
}

impl Region {
    pub fn base(&self) -> usize {
        self.range.start
    }

    /// 获取映射区域大小
    pub fn size(&self) -> usize {
        self.range.end - self.range.start
    }

    pub fn end(&self) -> usize {
        self.range.end
    }

    pub fn object_offset(&self) -> u64 {
        self.object_offset
    }

    pub fn vmo(&self) -> Option<&Arc<Vmo>> {
        self.vmo.as_ref()
    }

    /// 检查是否包含指定地址
    pub fn contains(&self, addr: usize) -> bool {
        self.range.contains(&addr)
    }

    /// 检查是否与另一个区域重叠
    pub fn overlaps(&self, other: &Range<usize>) -> bool {
        self.range.start < other.end && other.start < self.range.end
    }

    /// 地址对应的 VMO 偏移：`vaddr - base + object_offset`
    pub fn offset_of(&self, vaddr: usize) -> Option<u64> {
        if !self.contains(vaddr) {
            return None;
        }
        ((vaddr - self.range.start) as u64).checked_add(self.object_offset)
    }

    /// 从 `vaddr` 到区域末尾的剩余长度
    pub fn remaining(&self, vaddr: usize) -> usize {
        self.range.end.saturating_sub(vaddr)
    }
}

/// 地址空间
pub struct AddressSpace {
    /// 以基地址为键的区域表
    regions: Mutex<BTreeMap<usize, Arc<Region>>>,
}

impl AddressSpace {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            regions: Mutex::new(BTreeMap::new()),
        })
    }

    /// 映射 VMO 的 `[object_offset, object_offset + size)` 到 `base`
    pub fn map(
        &self,
        base: usize,
        size: usize,
        vmo: Arc<Vmo>,
        object_offset: u64,
    ) -> Result<Arc<Region>, ObjectError> {
        self.insert(base, size, Some(vmo), object_offset)
    }

    /// 保留一段没有后备对象的地址范围
    pub fn reserve(&self, base: usize, size: usize) -> Result<Arc<Region>, ObjectError> {
        self.insert(base, size, None, 0)
    }

    fn insert(
        &self,
        base: usize,
        size: usize,
        vmo: Option<Arc<Vmo>>,
        object_offset: u64,
    ) -> Result<Arc<Region>, ObjectError> {
        if size == 0 || base % PAGE_SIZE != 0 || size % PAGE_SIZE != 0 {
            return Err(ObjectError::InvalidArgs);
        }
        let end = base.checked_add(size).ok_or(ObjectError::InvalidArgs)?;
        let range = base..end;

        let mut regions = self.regions.lock();
        // 只需检查前一个区域和范围内起始的区域
        let prev_overlaps = regions
            .range(..base)
            .next_back()
            .map_or(false, |(_, r)| r.overlaps(&range));
        let next_overlaps = regions.range(base..end).next().is_some();
        if prev_overlaps || next_overlaps {
            return Err(ObjectError::AlreadyExists);
        }

        let region = Arc::new(Region {
            range,
            object_offset,
            vmo,
        });
        regions.insert(base, region.clone());
        Ok(region)
    }

    /// 解除以 `base` 为基地址的映射
    pub fn unmap(&self, base: usize) -> Result<Arc<Region>, ObjectError> {
        self.regions.lock().remove(&base).ok_or(ObjectError::NotFound)
    }

    /// 查找包含 `vaddr` 的区域
    pub fn find_region(&self, vaddr: usize) -> Option<Arc<Region>> {
        let regions = self.regions.lock();
        regions
            .range(..=vaddr)
            .next_back()
            .filter(|(_, r)| r.contains(vaddr))
            .map(|(_, r)| r.clone())
    }

    pub fn regions(&self) -> Vec<Arc<Region>> {
        self.regions.lock().values().cloned().collect()
    }

    /// 销毁地址空间时释放所有区域
    pub fn destroy(&self) {
        self.regions.lock().clear();
    }
}
