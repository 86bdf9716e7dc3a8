//! 后端操作表
//!
//! 每种后端实现一次 [`FileSystem`]，注册后被该类型的所有挂载共享。
//! 可选操作都有默认实现：目录结构类操作默认直接作用在 [`NodeStore`] 上，
//! 数据类操作默认返回 `NotSupported`。
//!
//! 钩子在 VFS 全局锁内调用，只能拿到节点存储，拿不到 [`Vfs`](crate::Vfs)，
//! 因此无法重入 VFS。钩子也不应长时间阻塞。

use alloc::string::String;
use uapi::fcntl::OpenFlags;
use uapi::fs::Stat;

use crate::adapter::node_stat;
use crate::{DirEntry, FileMode, FsError, NodeId, NodeStore, NodeType, SetAttr};

/// 后端操作表
pub trait FileSystem: Send + Sync {
    /// 后端类型名称，也是注册表中的键
    fn fs_type(&self) -> &'static str;

    /// 挂载时调用，`root` 为新分配的根目录
    fn mount(&self, _store: &mut NodeStore, _root: NodeId) -> Result<(), FsError> {
        Ok(())
    }

    /// 卸载前调用，返回错误时卸载中止
    fn umount(&self, _store: &mut NodeStore, _root: NodeId) -> Result<(), FsError> {
        Ok(())
    }

    /// 打开文件，失败时不会分配句柄
    fn open(&self, _store: &mut NodeStore, _node: NodeId, _flags: OpenFlags) -> Result<(), FsError> {
        Ok(())
    }

    /// 关闭文件
    fn close(&self, _store: &mut NodeStore, _node: NodeId) -> Result<(), FsError> {
        Ok(())
    }

    /// 从 `offset` 处读取，超过末尾返回 0
    fn read(
        &self,
        _store: &mut NodeStore,
        _node: NodeId,
        _offset: usize,
        _buf: &mut [u8],
    ) -> Result<usize, FsError> {
        Err(FsError::NotSupported)
    }

    /// 在 `offset` 处写入
    fn write(
        &self,
        _store: &mut NodeStore,
        _node: NodeId,
        _offset: usize,
        _buf: &[u8],
    ) -> Result<usize, FsError> {
        Err(FsError::NotSupported)
    }

    /// 定位提交之前调用，返回错误时游标不变
    fn lseek(&self, _store: &mut NodeStore, _node: NodeId, _pos: usize) -> Result<(), FsError> {
        Ok(())
    }

    /// 设备控制
    fn ioctl(
        &self,
        _store: &mut NodeStore,
        _node: NodeId,
        _request: u32,
        _arg: usize,
    ) -> Result<isize, FsError> {
        Err(FsError::NotSupported)
    }

    /// 在目录中查找
    fn lookup(&self, store: &NodeStore, dir: NodeId, name: &str) -> Result<NodeId, FsError> {
        store.lookup_child(dir, name)
    }

    /// 创建普通文件
    fn create(
        &self,
        store: &mut NodeStore,
        dir: NodeId,
        name: &str,
        mode: FileMode,
    ) -> Result<NodeId, FsError> {
        store.create_child(dir, name, NodeType::File, mode)
    }

    /// 创建目录
    fn mkdir(
        &self,
        store: &mut NodeStore,
        dir: NodeId,
        name: &str,
        mode: FileMode,
    ) -> Result<NodeId, FsError> {
        store.create_child(dir, name, NodeType::Directory, mode)
    }

    /// 创建符号链接
    fn symlink(
        &self,
        _store: &mut NodeStore,
        _dir: NodeId,
        _name: &str,
        _target: &str,
    ) -> Result<NodeId, FsError> {
        Err(FsError::NotSupported)
    }

    /// 读取符号链接目标
    fn readlink(&self, _store: &NodeStore, _node: NodeId) -> Result<String, FsError> {
        Err(FsError::NotSupported)
    }

    /// 删除非目录项
    fn unlink(&self, store: &mut NodeStore, dir: NodeId, name: &str) -> Result<(), FsError> {
        store.unlink_child(dir, name)
    }

    /// 删除空目录
    fn rmdir(&self, store: &mut NodeStore, dir: NodeId, name: &str) -> Result<(), FsError> {
        store.rmdir_child(dir, name)
    }

    /// 重命名，目标已存在时失败
    fn rename(
        &self,
        store: &mut NodeStore,
        old_dir: NodeId,
        old_name: &str,
        new_dir: NodeId,
        new_name: &str,
    ) -> Result<(), FsError> {
        store.rename(old_dir, old_name, new_dir, new_name)
    }

    /// 修改文件大小
    fn truncate(&self, _store: &mut NodeStore, _node: NodeId, _size: usize) -> Result<(), FsError> {
        Err(FsError::NotSupported)
    }

    /// 按序号读取目录项，`Ok(None)` 表示目录结束
    fn readdir(
        &self,
        store: &NodeStore,
        dir: NodeId,
        index: usize,
    ) -> Result<Option<DirEntry>, FsError> {
        store.readdir_nth(dir, index)
    }

    /// 转换为通用文件状态记录
    fn getattr(&self, store: &NodeStore, node: NodeId) -> Result<Stat, FsError> {
        node_stat(store, node)
    }

    /// 按请求修改属性，大小通过 [`FileSystem::truncate`] 修改
    fn setattr(&self, store: &mut NodeStore, node: NodeId, attr: &SetAttr) -> Result<(), FsError> {
        if let Some(size) = attr.size {
            match store.node(node)?.node_type() {
                NodeType::File => {}
                NodeType::Directory => return Err(FsError::IsDirectory),
                NodeType::Symlink => return Err(FsError::InvalidArgument),
            }
            self.truncate(store, node, size)?;
        }
        let now = store.now();
        let n = store.node_mut(node)?;
        if let Some(mode) = attr.mode {
            n.mode = mode.permissions();
        }
        if let Some(atime) = attr.atime {
            n.atime = atime;
        }
        if let Some(mtime) = attr.mtime {
            n.mtime = mtime;
        }
        n.ctime = now;
        Ok(())
    }
}
