//! Sysfs 虚拟文件系统
//!
//! 纯内存的 sysfs：普通文件的内容是可增长的字节缓冲区，符号链接保存目标字符串，
//! 属性文件的内容在读写时交给回调。[`helpers`] 提供直接构造内容的便捷接口，
//! [`builders`] 按设备和总线描述生成 `devices`/`bus`/`class` 目录树。

pub mod builders;
pub mod helpers;

mod device_registry;
mod node;
#[allow(clippy::module_inception)]
mod sysfs;

pub use device_registry::DeviceInfo;
pub use node::{ShowFn, StoreFn, SysfsAttr};
pub use sysfs::{SYSFS_NAME, SysFs};
