//! 同步原语
//!
//! 向 VFS 及日志模块提供基本的锁原语。
//! 自旋锁以 RAII 方式获取，守卫离开作用域时在每条返回路径上释放。

#![no_std]

mod raw_spin_lock;
mod spin_lock;

pub use raw_spin_lock::*;
pub use spin_lock::*;
