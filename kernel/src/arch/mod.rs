//! 内核架构抽象层
//!
//! 调试系统调用只需要架构相关的两样东西：页大小，以及线程寄存器
//! 状态在用户态可见的布局。当前只实现 AArch64。

pub mod regs;

pub use regs::{FpRegs, GeneralRegs};

/// 页大小
pub const PAGE_SIZE: usize = 4096;
