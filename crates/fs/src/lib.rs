//! # 文件系统模块 (FS)
//!
//! 具体的后端实现，通过实现 VFS 的 [`FileSystem`](vfs::FileSystem) trait 挂载到统一命名空间。
//!
//! ## 支持的文件系统
//!
//! - **[sysfs](sysfs)**: 内存中的设备信息伪文件系统

#![no_std]
#![doc = "文件系统实现"]

extern crate alloc;

pub mod sysfs;

pub use sysfs::{SYSFS_NAME, SysFs, SysfsAttr};
