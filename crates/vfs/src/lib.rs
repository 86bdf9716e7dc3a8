//! 嵌入式虚拟文件系统核心
//!
//! 此 crate 提供统一命名空间，不同的后端可以挂载到其中，通过同一组
//! 文件/目录接口访问：
//!
//! - [`NodeStore`] - 节点 arena，负责命名空间树的创建、链接与销毁
//! - [`FileSystem`] trait - 后端操作表，可选操作带默认实现
//! - [`MountTable`] - 挂载表，根挂载与嵌套挂载
//! - 路径解析引擎，跨挂载点继续解析
//! - [`FileHandle`] - 打开文件的游标与访问模式
//! - [`Vfs`] - 持有以上全部状态的上下文，一把自旋锁保护
//! - `vfs_*` 函数 - 全局实例的入口

#![no_std]

extern crate alloc;

pub mod error;
pub mod ops;

mod adapter;
mod api;
mod file;
mod file_system;
mod mount;
mod node;
mod path;
mod vfs;

// Re-export ops
pub use ops::{NullOps, VfsOps};

// Re-export error
pub use error::FsError;

// Re-export adapter
pub use adapter::{node_stat, node_type_to_d_type};

// Re-export node
pub use node::{DirEntry, FileMode, Node, NodeId, NodeMetadata, NodeStore, NodeType, SetAttr};

// Re-export file
pub use file::FileHandle;

// Re-export file_system
pub use file_system::FileSystem;

// Re-export mount
pub use mount::{MountId, MountInfo, MountPoint, MountTable};

// Re-export path
pub use path::{PathComponent, normalize_path, parse_path, resolve, resolve_parent, split_path};

// Re-export vfs
pub use vfs::Vfs;

// Re-export api
pub use api::{
    vfs, vfs_chmod, vfs_close, vfs_create, vfs_init, vfs_initialized, vfs_ioctl, vfs_lookup,
    vfs_lseek, vfs_mkdir, vfs_mount, vfs_open, vfs_read, vfs_readdir, vfs_readlink, vfs_register,
    vfs_rename, vfs_rmdir, vfs_set_ops, vfs_stat, vfs_symlink, vfs_umount, vfs_unlink,
    vfs_unregister, vfs_write,
};

// Re-export uapi types for convenience
pub use uapi::MAX_PATH;
pub use uapi::fcntl::{OpenFlags, SeekWhence};
pub use uapi::fs::Stat;
pub use uapi::time::TimeSpec;
