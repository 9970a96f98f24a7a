//! # 用户态与内核共享的 ABI
//!
//! 系统调用号、状态码、句柄类型以及调试系统调用使用的固定上限。

#![no_std]

pub mod abi;
