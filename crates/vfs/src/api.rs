//! 全局 VFS 入口
//!
//! 外部协作者（shell、设备注册）通过这组函数访问进程唯一的 [`Vfs`] 实例。
//! 必须先调用 [`vfs_init`]，否则所有操作返回 `NoDevice`。

use alloc::string::String;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};
use lazy_static::lazy_static;
use log::info;
use uapi::fcntl::{OpenFlags, SeekWhence};
use uapi::fs::Stat;

use crate::{DirEntry, FileHandle, FileMode, FileSystem, FsError, NodeId, Vfs, VfsOps};

lazy_static! {
    static ref GLOBAL_VFS: Vfs = Vfs::new();
}

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// 初始化全局 VFS，只有第一次调用生效
pub fn vfs_init() {
    if INITIALIZED
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_ok()
    {
        lazy_static::initialize(&GLOBAL_VFS);
        info!("vfs: initialized");
    }
}

/// 全局 VFS 是否已初始化
pub fn vfs_initialized() -> bool {
    INITIALIZED.load(Ordering::Acquire)
}

/// 获取全局 VFS
pub fn vfs() -> Result<&'static Vfs, FsError> {
    if !vfs_initialized() {
        return Err(FsError::NoDevice);
    }
    Ok(&*GLOBAL_VFS)
}

/// 为全局 VFS 注入时间源
pub fn vfs_set_ops(ops: Arc<dyn VfsOps>) -> Result<(), FsError> {
    vfs()?.set_ops(ops);
    Ok(())
}

/// 注册后端
pub fn vfs_register(backend: Arc<dyn FileSystem>) -> Result<(), FsError> {
    vfs()?.register_backend(backend)
}

/// 注销后端
pub fn vfs_unregister(name: &str) -> Result<(), FsError> {
    vfs()?.unregister_backend(name)
}

/// 挂载
pub fn vfs_mount(target: &str, fs_type: &str) -> Result<(), FsError> {
    vfs()?.mount(target, fs_type)
}

/// 卸载
pub fn vfs_umount(target: &str) -> Result<(), FsError> {
    vfs()?.unmount(target)
}

/// 解析路径
pub fn vfs_lookup(path: &str) -> Result<NodeId, FsError> {
    vfs()?.lookup(path)
}

/// 创建普通文件
pub fn vfs_create(path: &str, mode: FileMode) -> Result<NodeId, FsError> {
    vfs()?.create(path, mode)
}

/// 创建目录
pub fn vfs_mkdir(path: &str, mode: FileMode) -> Result<NodeId, FsError> {
    vfs()?.mkdir(path, mode)
}

/// 删除文件
pub fn vfs_unlink(path: &str) -> Result<(), FsError> {
    vfs()?.unlink(path)
}

/// 删除空目录
pub fn vfs_rmdir(path: &str) -> Result<(), FsError> {
    vfs()?.rmdir(path)
}

/// 重命名
pub fn vfs_rename(old_path: &str, new_path: &str) -> Result<(), FsError> {
    vfs()?.rename(old_path, new_path)
}

/// 创建符号链接
pub fn vfs_symlink(path: &str, target: &str) -> Result<NodeId, FsError> {
    vfs()?.symlink(path, target)
}

/// 读取符号链接
pub fn vfs_readlink(path: &str) -> Result<String, FsError> {
    vfs()?.readlink(path)
}

/// 打开文件
pub fn vfs_open(path: &str, flags: OpenFlags, mode: FileMode) -> Result<FileHandle, FsError> {
    vfs()?.open(path, flags, mode)
}

/// 关闭文件
pub fn vfs_close(handle: FileHandle) -> Result<(), FsError> {
    vfs()?.close(handle)
}

/// 读文件
pub fn vfs_read(handle: &mut FileHandle, buf: &mut [u8]) -> Result<usize, FsError> {
    vfs()?.read(handle, buf)
}

/// 写文件
pub fn vfs_write(handle: &mut FileHandle, buf: &[u8]) -> Result<usize, FsError> {
    vfs()?.write(handle, buf)
}

/// 移动游标
pub fn vfs_lseek(handle: &mut FileHandle, offset: i64, whence: SeekWhence) -> Result<usize, FsError> {
    vfs()?.lseek(handle, offset, whence)
}

/// 设备控制
pub fn vfs_ioctl(handle: &FileHandle, request: u32, arg: usize) -> Result<isize, FsError> {
    vfs()?.ioctl(handle, request, arg)
}

/// 读取下一个目录项
pub fn vfs_readdir(handle: &mut FileHandle) -> Result<Option<DirEntry>, FsError> {
    vfs()?.readdir(handle)
}

/// 文件状态
pub fn vfs_stat(path: &str) -> Result<Stat, FsError> {
    vfs()?.stat(path)
}

/// 修改权限
pub fn vfs_chmod(path: &str, mode: FileMode) -> Result<(), FsError> {
    vfs()?.chmod(path, mode)
}
