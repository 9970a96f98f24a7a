//! AArch64 线程寄存器状态
//!
//! 这些结构体就是 thread_read_state / thread_write_state 在用户态
//! 看到的字节布局，必须保持 `repr(C)` 且没有填充。

use zerocopy::{AsBytes, FromBytes, FromZeroes};

/// cpsr 中用户态可以修改的位（NZCV 条件标志）
pub const CPSR_USER_MASK: u64 = 0xF000_0000;

/// 通用寄存器组（REGSET0）
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
pub struct GeneralRegs {
    /// x0 - x29
    pub r: [u64; 30],
    /// 链接寄存器 x30
    pub lr: u64,
    /// 栈指针
    pub sp: u64,
    /// 程序计数器
    pub pc: u64,
    /// 处理器状态
    pub cpsr: u64,
}

impl GeneralRegs {
    pub const SIZE: usize = core::mem::size_of::<Self>();

    /// 合并用户提交的寄存器值
    ///
    /// 非特权写入时 cpsr 只接受条件标志，其余位保持原值。
    pub fn merge_from(&mut self, new: &GeneralRegs, privileged: bool) {
        let cpsr = if privileged {
            new.cpsr
        } else {
            (self.cpsr & !CPSR_USER_MASK) | (new.cpsr & CPSR_USER_MASK)
        };
        *self = *new;
        self.cpsr = cpsr;
    }
}

/// 浮点/SIMD 寄存器组（REGSET1）
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
pub struct FpRegs {
    /// v0 - v31，每个 128 位拆成两个 64 位字
    pub q: [u64; 64],
    pub fpcr: u32,
    pub fpsr: u32,
}

impl FpRegs {
    pub const SIZE: usize = core::mem::size_of::<Self>();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_sizes() {
        assert_eq!(GeneralRegs::SIZE, 34 * 8);
        assert_eq!(FpRegs::SIZE, 64 * 8 + 8);
        assert!(FpRegs::SIZE <= shared::abi::MAX_THREAD_STATE_SIZE);
    }

    #[test]
    fn test_unprivileged_merge_keeps_control_bits() {
        let mut current = GeneralRegs::new_zeroed();
        current.cpsr = 0x0000_03C5; // EL1h + DAIF 屏蔽
        let mut new = GeneralRegs::new_zeroed();
        new.pc = 0x4000;
        new.cpsr = 0xF000_0000 | 0x5; // 试图切换到 EL1

        current.merge_from(&new, false);
        assert_eq!(current.pc, 0x4000);
        assert_eq!(current.cpsr, 0xF000_03C5);

        current.merge_from(&new, true);
        assert_eq!(current.cpsr, 0xF000_0005);
    }
}
