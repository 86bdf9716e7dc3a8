//! 与 VFS 调用方共用的定义
//!
//! 包含打开标志、定位方式、文件状态记录和目录项类型等常量与类型，
//! 确保 VFS 核心、后端和外部调用方（shell、设备注册）之间的一致性

#![no_std]
// uapi 中包含大量与 Linux 兼容的常量/结构体字段定义；逐项补 `///` 噪声较大。
#![allow(missing_docs)]

pub mod fcntl;
pub mod fs;
pub mod time;

/// 路径字符串的最大长度（含结尾字节）
///
/// 挂载点路径和格式化目录项的调用方共用此上限。
pub const MAX_PATH: usize = 256;
