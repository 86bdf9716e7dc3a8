//! Mock 实现模块
//!
//! 提供 VFS 协作者的 Mock 实现，用于测试

pub mod vfs;
