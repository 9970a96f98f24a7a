//! 具体内核对象类型实现
//!
//! 调试系统调用涉及的对象：
//! - 内存对象（Vmo）
//! - 进程对象（Process、Thread）
//! - 资源对象（Resource），用于特权操作的能力检查

pub mod process;
pub mod resource;
pub mod thread;
pub mod vmo;

// 重新导出常用对象类型
pub use process::{Process, ProcessState};
pub use resource::Resource;
pub use thread::{Thread, ThreadState, ThreadStateKind};
pub use vmo::Vmo;
