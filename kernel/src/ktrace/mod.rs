//! 内核追踪日志（ktrace）
//!
//! 整个内核只有一个追踪日志，启动时通过 [`init`] 创建，此后一直存在。
//! 日志是一段只追加的记录流，每条记录以 16 字节的 [`KtraceHeader`]
//! 开头，标签中编码了事件号、组和记录长度。日志开头总是一条版本记录。
//!
//! 所有修改都在同一把锁内完成：探针槽位的分配与填写不会与其他写者交错。

use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};
use spin::{Mutex, MutexGuard, Once};
use zerocopy::{AsBytes, FromBytes, FromZeroes};

use crate::config::KtraceConfig;
use crate::memory::try_alloc_buffer;
use crate::object::ObjectError;
use crate::user::UserMutPtr;
use shared::abi::*;

/// 记录头
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
pub struct KtraceHeader {
    pub tag: u32,
    pub tid: u32,
    pub ts: u64,
}

/// 带两个 32 位参数的探针记录
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
pub struct KtraceProbe24 {
    pub tag: u32,
    pub tid: u32,
    pub ts: u64,
    pub a: u32,
    pub b: u32,
}

/// 名称记录（探针注册时写入）
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
pub struct KtraceName {
    pub tag: u32,
    pub id: u32,
    pub arg: u32,
    pub name: [u8; 36],
}

const HEADER_SIZE: usize = core::mem::size_of::<KtraceHeader>();
const PROBE_SIZE: usize = core::mem::size_of::<KtraceProbe24>();

/// 已注册的探针
struct Probe {
    id: u32,
    name: Vec<u8>,
}

struct KtraceState {
    buffer: Vec<u8>,
    /// 有效数据的末尾
    offset: usize,
    /// 当前启用的组，0 表示已停止
    grpmask: u32,
    probes: Vec<Probe>,
    next_probe_id: u32,
}

impl KtraceState {
    /// 追加一条记录，空间不足时返回 None
    fn append(&mut self, bytes: &[u8]) -> Option<usize> {
        let start = self.offset;
        let end = start.checked_add(bytes.len())?;
        self.buffer.get_mut(start..end)?.copy_from_slice(bytes);
        self.offset = end;
        Some(start)
    }

    fn append_name(&mut self, id: u32, name: &[u8]) -> bool {
        let mut record = KtraceName {
            tag: TAG_PROBE_NAME,
            id: id | KTRACE_PROBE_FLAG,
            arg: 0,
            name: [0; 36],
        };
        let len = name.len().min(MAX_NAME_LEN - 1);
        record.name[..len].copy_from_slice(&name[..len]);
        self.append(record.as_bytes()).is_some()
    }

    /// 清空日志，只保留版本记录，然后重新写入已注册探针的名称
    fn rewind(&mut self) {
        self.offset = 0;
        let version = KtraceHeader {
            tag: TAG_VERSION,
            tid: KTRACE_VERSION,
            ts: 0,
        };
        if self.append(version.as_bytes()).is_none() {
            return;
        }
        let probes = core::mem::take(&mut self.probes);
        for probe in &probes {
            if !self.append_name(probe.id, &probe.name) {
                break;
            }
        }
        self.probes = probes;
    }
}

/// 追踪日志
pub struct KtraceLog {
    state: Mutex<KtraceState>,
    /// 单调时间戳
    clock: AtomicU64,
}

impl KtraceLog {
    /// 创建追踪日志，缓冲区按 8 字节对齐向下取整
    pub fn new(config: &KtraceConfig) -> Result<Self, ObjectError> {
        let size = config.buffer_size & !7;
        if size < HEADER_SIZE {
            return Err(ObjectError::InvalidArgs);
        }
        let buffer = try_alloc_buffer(size)?;
        let mut state = KtraceState {
            buffer,
            offset: 0,
            grpmask: config.group_mask & KTRACE_GRP_ALL,
            probes: Vec::new(),
            next_probe_id: 1,
        };
        state.rewind();
        log::info!(
            "ktrace: {} byte buffer, group mask {:#x}",
            size,
            state.grpmask
        );
        Ok(Self {
            state: Mutex::new(state),
            clock: AtomicU64::new(0),
        })
    }

    /// 没有缓冲区的日志：所有探针都拿不到槽位
    pub fn disabled() -> Self {
        Self {
            state: Mutex::new(KtraceState {
                buffer: Vec::new(),
                offset: 0,
                grpmask: 0,
                probes: Vec::new(),
                next_probe_id: 1,
            }),
            clock: AtomicU64::new(0),
        }
    }

    fn ticks(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// 日志中有效数据的字节数
    pub fn valid_len(&self) -> usize {
        self.state.lock().offset
    }

    /// 当前启用的组
    pub fn group_mask(&self) -> u32 {
        self.state.lock().grpmask
    }

    /// 按名称查找已注册的探针
    pub fn probe_id(&self, name: &[u8]) -> Option<u32> {
        self.state
            .lock()
            .probes
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.id)
    }

    /// 从 `offset` 处读取最多 `len` 字节到用户缓冲区
    ///
    /// 用户缓冲区为空指针时返回有效数据总长度；`offset` 超出有效数据时返回 0。
    pub fn read(
        &self,
        mut buffer: UserMutPtr<'_>,
        offset: usize,
        len: usize,
    ) -> Result<usize, ObjectError> {
        let state = self.state.lock();
        let valid = state.offset;
        if buffer.is_null() {
            return Ok(valid);
        }
        if offset > valid {
            return Ok(0);
        }
        let len = len.min(valid - offset);
        buffer.copy_array_to_user(&state.buffer[offset..offset + len])?;
        Ok(len)
    }

    /// 控制操作
    ///
    /// `name` 只在 `KTRACE_ACTION_NEW_PROBE` 时使用，按 NUL 截断。
    pub fn control(
        &self,
        action: u32,
        options: u32,
        name: Option<&[u8]>,
    ) -> Result<usize, ObjectError> {
        let mut state = self.state.lock();
        match action {
            KTRACE_ACTION_START => {
                let mask = if options == 0 {
                    KTRACE_GRP_ALL
                } else {
                    options & KTRACE_GRP_ALL
                };
                state.grpmask = mask;
                log::info!("ktrace: started, group mask {:#x}", mask);
                Ok(0)
            }
            KTRACE_ACTION_STOP => {
                state.grpmask = 0;
                log::info!("ktrace: stopped at {} bytes", state.offset);
                Ok(0)
            }
            KTRACE_ACTION_REWIND => {
                if state.grpmask != 0 {
                    return Err(ObjectError::BadState);
                }
                state.rewind();
                log::debug!("ktrace: rewound");
                Ok(0)
            }
            KTRACE_ACTION_NEW_PROBE => {
                let name = name.ok_or(ObjectError::InvalidArgs)?;
                let end = name.iter().position(|&c| c == 0).unwrap_or(name.len());
                let name = &name[..end];
                if name.is_empty() {
                    return Err(ObjectError::InvalidArgs);
                }
                if let Some(probe) = state.probes.iter().find(|p| p.name == name) {
                    return Ok(probe.id as usize);
                }
                if state.next_probe_id > KTRACE_MAX_PROBE_ID {
                    return Err(ObjectError::NoMemory);
                }
                let id = state.next_probe_id;
                let mut owned = Vec::new();
                owned
                    .try_reserve_exact(name.len())
                    .map_err(|_| ObjectError::NoMemory)?;
                owned.extend_from_slice(name);
                state
                    .probes
                    .try_reserve(1)
                    .map_err(|_| ObjectError::NoMemory)?;
                state.probes.push(Probe { id, name: owned });
                state.next_probe_id += 1;
                if state.grpmask & KTRACE_GRP_META != 0 && !state.append_name(id, name) {
                    log::warn!("ktrace: no room for name of probe {:#x}", id);
                }
                log::debug!("ktrace: new probe {:#x}", id);
                Ok(id as usize)
            }
            _ => Err(ObjectError::InvalidArgs),
        }
    }

    /// 为事件 `id` 打开一个 24 字节的探针槽位
    ///
    /// 探针组未启用或缓冲区已满时返回 None；缓冲区满时停止追踪。
    pub fn open_probe(&self, id: u32, tid: u32) -> Option<ProbeSlot<'_>> {
        let mut state = self.state.lock();
        if state.grpmask & KTRACE_GRP_PROBE == 0 {
            return None;
        }
        let header = KtraceProbe24 {
            tag: tag_probe_24(id),
            tid,
            ts: self.ticks(),
            a: 0,
            b: 0,
        };
        match state.append(header.as_bytes()) {
            Some(offset) => Some(ProbeSlot {
                state,
                offset,
                record: header,
            }),
            None => {
                log::warn!("ktrace: buffer full at {} bytes, stopping", state.offset);
                state.grpmask = 0;
                None
            }
        }
    }
}

/// 已分配的探针槽位
///
/// 持有日志锁，直到 [`ProbeSlot::write`] 或丢弃。未写入参数的槽位保留为
/// 参数为 0 的记录。
pub struct ProbeSlot<'a> {
    state: MutexGuard<'a, KtraceState>,
    offset: usize,
    record: KtraceProbe24,
}

impl ProbeSlot<'_> {
    pub fn write(mut self, arg0: u32, arg1: u32) {
        self.record.a = arg0;
        self.record.b = arg1;
        let range = self.offset..self.offset + PROBE_SIZE;
        if let Some(dst) = self.state.buffer.get_mut(range) {
            dst.copy_from_slice(self.record.as_bytes());
        }
    }
}

static KTRACE: Once<KtraceLog> = Once::new();

/// 创建全局追踪日志；重复调用返回已有的日志
///
/// 缓冲区分配失败时退化为不记录任何事件的日志。
pub fn init(config: &KtraceConfig) -> &'static KtraceLog {
    KTRACE.call_once(|| {
        KtraceLog::new(config).unwrap_or_else(|err| {
            log::warn!("ktrace: disabled ({})", err);
            KtraceLog::disabled()
        })
    })
}

/// 全局追踪日志（尚未初始化时为 None）
pub fn get() -> Option<&'static KtraceLog> {
    KTRACE.get()
}
