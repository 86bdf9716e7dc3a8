//! 测试支持 crate
//!
//! 提供 VFS 协作者的 Mock 实现

#![no_std]

pub mod mock;
