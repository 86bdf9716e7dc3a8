//! VFS 上下文
//!
//! [`Vfs`] 拥有后端注册表、挂载表和节点存储。每个顶层操作只获取一次全局自旋锁，
//! 整个操作（包括路径解析和后端钩子）都在同一个临界区内完成，
//! 锁在守卫离开作用域时释放，错误返回路径也不例外。
//!
//! 多个 `Vfs` 实例互相独立，测试可以各自创建一个。

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use log::{debug, info, warn};
use sync::SpinLock;
use uapi::MAX_PATH;
use uapi::fcntl::{OpenFlags, SeekWhence};
use uapi::fs::Stat;

use crate::path::{self, normalize_path};
use crate::{
    DirEntry, FileHandle, FileMode, FileSystem, FsError, MountInfo, MountPoint, MountTable,
    NodeId, NodeMetadata, NodeStore, NodeType, NullOps, SetAttr, VfsOps,
};

/// 受全局锁保护的全部状态
struct VfsInner {
    store: NodeStore,
    mounts: MountTable,
    backends: BTreeMap<&'static str, Arc<dyn FileSystem>>,
}

impl VfsInner {
    fn resolve(&self, path: &str) -> Result<NodeId, FsError> {
        path::resolve(&self.store, &self.mounts, path)
    }

    fn resolve_parent(&self, path: &str) -> Result<(NodeId, String), FsError> {
        path::resolve_parent(&self.store, &self.mounts, path)
    }

    /// 节点所属挂载的后端
    fn backend_of(&self, node: NodeId) -> Result<Arc<dyn FileSystem>, FsError> {
        let mount = self.store.node(node)?.mount();
        let mount = self.mounts.get(mount).ok_or(FsError::NotFound)?;
        Ok(Arc::clone(&mount.backend))
    }

    /// 句柄指向的节点类型，节点已删除时返回 `BadFileDescriptor`
    fn handle_type(&self, handle: &FileHandle) -> Result<NodeType, FsError> {
        self.store
            .get(handle.node)
            .map(|n| n.node_type())
            .ok_or(FsError::BadFileDescriptor)
    }

    /// 目录项若被挂载覆盖则不可删除或移动
    fn check_not_covered(&self, dir: NodeId, name: &str) -> Result<NodeId, FsError> {
        let backend = self.backend_of(dir)?;
        let child = backend.lookup(&self.store, dir, name)?;
        if self.store.node(child)?.covered_by().is_some() {
            return Err(FsError::Busy);
        }
        Ok(child)
    }

    /// `node` 子树内（含自身）是否有被挂载覆盖的目录，有则返回 `Busy`
    fn check_no_mount_below(&self, node: NodeId) -> Result<(), FsError> {
        for (_, mount) in self.mounts.iter() {
            let mut cursor = mount.covered;
            while let Some(id) = cursor {
                if id == node {
                    return Err(FsError::Busy);
                }
                cursor = self.store.node(id)?.parent();
            }
        }
        Ok(())
    }

    fn mount(&mut self, target: &str, fs_type: &str) -> Result<(), FsError> {
        let backend = self
            .backends
            .get(fs_type)
            .cloned()
            .ok_or(FsError::NotFound)?;
        if !target.starts_with('/') {
            return Err(FsError::InvalidArgument);
        }
        let path = normalize_path(target);
        if path.len() >= MAX_PATH {
            return Err(FsError::NameTooLong);
        }

        let (covered, parent) = if path == "/" {
            if self.mounts.root_id().is_some() {
                return Err(FsError::AlreadyMounted);
            }
            (None, None)
        } else {
            if self.mounts.find_exact(&path).is_some() {
                return Err(FsError::AlreadyMounted);
            }
            let covered = self.resolve(&path)?;
            let node = self.store.node(covered)?;
            if !node.is_dir() {
                return Err(FsError::NotDirectory);
            }
            if node.covered_by().is_some() {
                return Err(FsError::AlreadyMounted);
            }
            (Some(covered), Some(node.mount()))
        };

        let id = self.mounts.next_id();
        let root = self.store.alloc_root(id, FileMode::DEFAULT_DIR)?;
        if let Err(e) = backend.mount(&mut self.store, root) {
            self.store.destroy_subtree(root);
            return Err(e);
        }
        if let Some(covered) = covered {
            self.store.set_covered_by(covered, Some(id))?;
        }
        self.mounts.insert(
            id,
            MountPoint {
                path,
                backend,
                root,
                covered,
                parent,
                children: Vec::new(),
            },
        );
        Ok(())
    }

    fn unmount(&mut self, target: &str) -> Result<(), FsError> {
        if !target.starts_with('/') {
            return Err(FsError::InvalidArgument);
        }
        let path = normalize_path(target);
        let id = self.mounts.find_exact(&path).ok_or(FsError::NotFound)?;
        let mount = self.mounts.get(id).ok_or(FsError::NotFound)?;
        if !mount.children.is_empty() {
            return Err(FsError::DirectoryNotEmpty);
        }
        let backend = Arc::clone(&mount.backend);
        let (root, covered) = (mount.root, mount.covered);

        backend.umount(&mut self.store, root)?;
        if let Some(covered) = covered {
            self.store.set_covered_by(covered, None)?;
        }
        self.store.destroy_subtree(root);
        self.mounts.remove(id);
        Ok(())
    }
}

/// VFS 上下文
pub struct Vfs {
    inner: SpinLock<VfsInner>,
}

impl Vfs {
    /// 创建空的 VFS，时间戳全部为零
    pub fn new() -> Self {
        Self::with_ops(Arc::new(NullOps))
    }

    /// 创建空的 VFS，时间戳取自 `ops`
    pub fn with_ops(ops: Arc<dyn VfsOps>) -> Self {
        Self {
            inner: SpinLock::new(VfsInner {
                store: NodeStore::new(ops),
                mounts: MountTable::new(),
                backends: BTreeMap::new(),
            }),
        }
    }

    /// 替换时间源，已有节点的时间戳不变
    pub fn set_ops(&self, ops: Arc<dyn VfsOps>) {
        self.inner.lock().store.set_clock(ops);
    }

    // ========== 注册与挂载 ==========

    /// 注册后端类型
    pub fn register_backend(&self, backend: Arc<dyn FileSystem>) -> Result<(), FsError> {
        let name = backend.fs_type();
        if name.is_empty() {
            return Err(FsError::InvalidArgument);
        }
        {
            let mut inner = self.inner.lock();
            if inner.backends.contains_key(name) {
                return Err(FsError::AlreadyExists);
            }
            inner.backends.insert(name, backend);
        }
        info!("vfs: registered filesystem {}", name);
        Ok(())
    }

    /// 注销后端类型，仍有挂载使用时返回 `Busy`
    pub fn unregister_backend(&self, name: &str) -> Result<(), FsError> {
        {
            let mut inner = self.inner.lock();
            if !inner.backends.contains_key(name) {
                return Err(FsError::NotFound);
            }
            if inner
                .mounts
                .iter()
                .any(|(_, m)| m.backend.fs_type() == name)
            {
                return Err(FsError::Busy);
            }
            inner.backends.remove(name);
        }
        info!("vfs: unregistered filesystem {}", name);
        Ok(())
    }

    /// 已注册的后端类型名
    pub fn backends(&self) -> Vec<&'static str> {
        self.inner.lock().backends.keys().copied().collect()
    }

    /// 把 `fs_type` 类型的新实例挂载到 `target`
    pub fn mount(&self, target: &str, fs_type: &str) -> Result<(), FsError> {
        let result = self.inner.lock().mount(target, fs_type);
        match result {
            Ok(()) => info!("vfs: mounted {} at {}", fs_type, target),
            Err(e) => warn!("vfs: mount {} at {} failed: {}", fs_type, target, e),
        }
        result
    }

    /// 卸载 `target` 上的挂载，并销毁其整棵节点树
    pub fn unmount(&self, target: &str) -> Result<(), FsError> {
        let result = self.inner.lock().unmount(target);
        match result {
            Ok(()) => info!("vfs: unmounted {}", target),
            Err(e) => warn!("vfs: unmount {} failed: {}", target, e),
        }
        result
    }

    /// 当前所有挂载
    pub fn mounts(&self) -> Vec<MountInfo> {
        self.inner
            .lock()
            .mounts
            .iter()
            .map(|(_, m)| m.info())
            .collect()
    }

    /// 拥有 `path` 的挂载（目标路径为最长前缀）
    pub fn find_owning_mount(&self, path: &str) -> Option<MountInfo> {
        if !path.starts_with('/') {
            return None;
        }
        let path = normalize_path(path);
        let inner = self.inner.lock();
        let id = inner.mounts.find_owning_mount(&path)?;
        inner.mounts.get(id).map(MountPoint::info)
    }

    // ========== 路径操作 ==========

    /// 解析路径
    pub fn lookup(&self, path: &str) -> Result<NodeId, FsError> {
        self.inner.lock().resolve(path)
    }

    /// 节点元数据快照
    pub fn metadata(&self, node: NodeId) -> Result<NodeMetadata, FsError> {
        self.inner.lock().store.metadata(node)
    }

    /// 存活节点总数（含所有挂载）
    pub fn node_count(&self) -> usize {
        self.inner.lock().store.len()
    }

    /// 通用文件状态
    pub fn stat(&self, path: &str) -> Result<Stat, FsError> {
        let inner = self.inner.lock();
        let node = inner.resolve(path)?;
        inner.backend_of(node)?.getattr(&inner.store, node)
    }

    /// 修改属性
    pub fn setattr(&self, path: &str, attr: &SetAttr) -> Result<(), FsError> {
        let mut inner = self.inner.lock();
        let node = inner.resolve(path)?;
        let backend = inner.backend_of(node)?;
        backend.setattr(&mut inner.store, node, attr)
    }

    /// 修改权限
    pub fn chmod(&self, path: &str, mode: FileMode) -> Result<(), FsError> {
        self.setattr(path, &SetAttr::new().with_mode(mode))
    }

    /// 创建普通文件
    pub fn create(&self, path: &str, mode: FileMode) -> Result<NodeId, FsError> {
        let mut inner = self.inner.lock();
        let (parent, name) = inner.resolve_parent(path)?;
        let backend = inner.backend_of(parent)?;
        let node = backend.create(&mut inner.store, parent, &name, mode)?;
        debug!("vfs: created {}", path);
        Ok(node)
    }

    /// 创建目录
    pub fn mkdir(&self, path: &str, mode: FileMode) -> Result<NodeId, FsError> {
        let mut inner = self.inner.lock();
        let (parent, name) = inner.resolve_parent(path)?;
        let backend = inner.backend_of(parent)?;
        let node = backend.mkdir(&mut inner.store, parent, &name, mode)?;
        debug!("vfs: mkdir {}", path);
        Ok(node)
    }

    /// 创建指向 `target` 的符号链接
    pub fn symlink(&self, path: &str, target: &str) -> Result<NodeId, FsError> {
        if target.is_empty() {
            return Err(FsError::InvalidArgument);
        }
        if target.len() >= MAX_PATH {
            return Err(FsError::NameTooLong);
        }
        let mut inner = self.inner.lock();
        let (parent, name) = inner.resolve_parent(path)?;
        let backend = inner.backend_of(parent)?;
        backend.symlink(&mut inner.store, parent, &name, target)
    }

    /// 读取符号链接目标
    pub fn readlink(&self, path: &str) -> Result<String, FsError> {
        let inner = self.inner.lock();
        let node = inner.resolve(path)?;
        if inner.store.node(node)?.node_type() != NodeType::Symlink {
            return Err(FsError::InvalidArgument);
        }
        inner.backend_of(node)?.readlink(&inner.store, node)
    }

    /// 通过后端专用的构造函数创建节点
    ///
    /// `f` 收到父目录所属的后端、节点存储、父目录和新名称。后端可借此
    /// 创建带私有数据的特殊节点（例如属性文件）。
    pub fn create_with<F>(&self, path: &str, f: F) -> Result<NodeId, FsError>
    where
        F: FnOnce(&dyn FileSystem, &mut NodeStore, NodeId, &str) -> Result<NodeId, FsError>,
    {
        let mut inner = self.inner.lock();
        let (parent, name) = inner.resolve_parent(path)?;
        let backend = inner.backend_of(parent)?;
        f(backend.as_ref(), &mut inner.store, parent, &name)
    }

    /// 删除非目录项
    pub fn unlink(&self, path: &str) -> Result<(), FsError> {
        let mut inner = self.inner.lock();
        let (parent, name) = inner.resolve_parent(path)?;
        inner.check_not_covered(parent, &name)?;
        let backend = inner.backend_of(parent)?;
        backend.unlink(&mut inner.store, parent, &name)
    }

    /// 删除空目录，挂载点返回 `Busy`
    pub fn rmdir(&self, path: &str) -> Result<(), FsError> {
        let mut inner = self.inner.lock();
        let (parent, name) = inner.resolve_parent(path)?;
        inner.check_not_covered(parent, &name)?;
        let backend = inner.backend_of(parent)?;
        backend.rmdir(&mut inner.store, parent, &name)
    }

    /// 重命名，不能跨挂载，被移动的子树内不能有挂载点
    pub fn rename(&self, old_path: &str, new_path: &str) -> Result<(), FsError> {
        let mut inner = self.inner.lock();
        let (old_dir, old_name) = inner.resolve_parent(old_path)?;
        let (new_dir, new_name) = inner.resolve_parent(new_path)?;
        if inner.store.node(old_dir)?.mount() != inner.store.node(new_dir)?.mount() {
            return Err(FsError::CrossDevice);
        }
        let moved = inner.check_not_covered(old_dir, &old_name)?;
        // 挂载表按路径记录挂载点，移动其祖先会让路径失效
        inner.check_no_mount_below(moved)?;
        let backend = inner.backend_of(old_dir)?;
        backend.rename(&mut inner.store, old_dir, &old_name, new_dir, &new_name)
    }

    // ========== 文件句柄 ==========

    /// 打开文件
    ///
    /// 带 `O_CREAT` 且文件不存在时先创建；`O_EXCL` 时文件已存在返回 `AlreadyExists`。
    /// 目录只能以只读方式加 `O_DIRECTORY` 打开，其余情况返回 `IsDirectory`。
    /// 后端 open 钩子失败时不分配句柄。
    pub fn open(&self, path: &str, flags: OpenFlags, mode: FileMode) -> Result<FileHandle, FsError> {
        let mut inner = self.inner.lock();
        let node = match inner.resolve(path) {
            Ok(node) => {
                if flags.contains(OpenFlags::O_CREAT | OpenFlags::O_EXCL) {
                    return Err(FsError::AlreadyExists);
                }
                node
            }
            Err(FsError::NotFound) if flags.contains(OpenFlags::O_CREAT) => {
                let (parent, name) = inner.resolve_parent(path)?;
                let backend = inner.backend_of(parent)?;
                backend.create(&mut inner.store, parent, &name, mode)?
            }
            Err(e) => return Err(e),
        };

        let node_type = inner.store.node(node)?.node_type();
        match node_type {
            NodeType::Directory => {
                if !flags.contains(OpenFlags::O_DIRECTORY) || flags.writable() {
                    return Err(FsError::IsDirectory);
                }
            }
            NodeType::Symlink => return Err(FsError::InvalidArgument),
            NodeType::File => {
                if flags.contains(OpenFlags::O_DIRECTORY) {
                    return Err(FsError::NotDirectory);
                }
            }
        }

        let backend = inner.backend_of(node)?;
        backend.open(&mut inner.store, node, flags)?;
        if node_type == NodeType::File && flags.contains(OpenFlags::O_TRUNC) && flags.writable() {
            if let Err(e) = backend.truncate(&mut inner.store, node, 0) {
                let _ = backend.close(&mut inner.store, node);
                return Err(e);
            }
        }
        Ok(FileHandle::new(node, flags))
    }

    /// 以目录方式打开
    pub fn opendir(&self, path: &str) -> Result<FileHandle, FsError> {
        self.open(
            path,
            OpenFlags::O_RDONLY | OpenFlags::O_DIRECTORY,
            FileMode::empty(),
        )
    }

    /// 从游标处读取，游标前移实际读取的字节数
    pub fn read(&self, handle: &mut FileHandle, buf: &mut [u8]) -> Result<usize, FsError> {
        if !handle.flags.readable() {
            return Err(FsError::PermissionDenied);
        }
        let mut inner = self.inner.lock();
        if inner.handle_type(handle)? == NodeType::Directory {
            return Err(FsError::IsDirectory);
        }
        let backend = inner.backend_of(handle.node)?;
        let n = backend.read(&mut inner.store, handle.node, handle.pos, buf)?;
        handle.pos += n;
        let now = inner.store.now();
        if let Some(node) = inner.store.get_mut(handle.node) {
            node.atime = now;
        }
        Ok(n)
    }

    /// 在游标处写入；`O_APPEND` 时先把游标移到末尾
    pub fn write(&self, handle: &mut FileHandle, buf: &[u8]) -> Result<usize, FsError> {
        if !handle.flags.writable() {
            return Err(FsError::PermissionDenied);
        }
        let mut inner = self.inner.lock();
        if inner.handle_type(handle)? == NodeType::Directory {
            return Err(FsError::IsDirectory);
        }
        if handle.flags.contains(OpenFlags::O_APPEND) {
            handle.pos = inner.store.node(handle.node)?.size;
        }
        let backend = inner.backend_of(handle.node)?;
        let n = backend.write(&mut inner.store, handle.node, handle.pos, buf)?;
        handle.pos += n;
        let now = inner.store.now();
        if let Some(node) = inner.store.get_mut(handle.node) {
            if handle.pos > node.size {
                node.size = handle.pos;
            }
            node.mtime = now;
        }
        Ok(n)
    }

    /// 移动游标
    ///
    /// `End` 以节点记录的大小为基准。结果为负或溢出时返回 `InvalidArgument`，游标不变。
    pub fn lseek(
        &self,
        handle: &mut FileHandle,
        offset: i64,
        whence: SeekWhence,
    ) -> Result<usize, FsError> {
        let mut inner = self.inner.lock();
        inner.handle_type(handle)?;
        let base = match whence {
            SeekWhence::Set => 0,
            SeekWhence::Cur => handle.pos,
            SeekWhence::End => inner.store.node(handle.node)?.size,
        };
        let base = i64::try_from(base).map_err(|_| FsError::InvalidArgument)?;
        let pos = base
            .checked_add(offset)
            .filter(|p| *p >= 0)
            .ok_or(FsError::InvalidArgument)?;
        let pos = usize::try_from(pos).map_err(|_| FsError::InvalidArgument)?;

        let backend = inner.backend_of(handle.node)?;
        backend.lseek(&mut inner.store, handle.node, pos)?;
        handle.pos = pos;
        Ok(pos)
    }

    /// 读取下一个目录项，`Ok(None)` 表示目录结束
    pub fn readdir(&self, handle: &mut FileHandle) -> Result<Option<DirEntry>, FsError> {
        let inner = self.inner.lock();
        if inner.handle_type(handle)? != NodeType::Directory {
            return Err(FsError::NotDirectory);
        }
        let backend = inner.backend_of(handle.node)?;
        let entry = backend.readdir(&inner.store, handle.node, handle.pos)?;
        if entry.is_some() {
            handle.pos += 1;
        }
        Ok(entry)
    }

    /// 设备控制
    pub fn ioctl(&self, handle: &FileHandle, request: u32, arg: usize) -> Result<isize, FsError> {
        let mut inner = self.inner.lock();
        inner.handle_type(handle)?;
        let backend = inner.backend_of(handle.node)?;
        backend.ioctl(&mut inner.store, handle.node, request, arg)
    }

    /// 关闭句柄
    ///
    /// 后端 close 钩子的错误会返回给调用方，但句柄无论如何都被释放。
    pub fn close(&self, handle: FileHandle) -> Result<(), FsError> {
        let mut inner = self.inner.lock();
        inner.handle_type(&handle)?;
        let backend = inner.backend_of(handle.node)?;
        backend.close(&mut inner.store, handle.node)
    }

    // ========== 便捷操作 ==========

    /// 列出目录的全部目录项
    pub fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        let mut handle = self.opendir(path)?;
        let mut entries = Vec::new();
        let result = loop {
            match self.readdir(&mut handle) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        self.close(handle)?;
        result.map(|()| entries)
    }

    /// 读取整个文件
    pub fn read_file(&self, path: &str) -> Result<Vec<u8>, FsError> {
        let mut handle = self.open(path, OpenFlags::O_RDONLY, FileMode::empty())?;
        let mut data = Vec::new();
        let mut chunk = [0u8; 256];
        let result = loop {
            match self.read(&mut handle, &mut chunk) {
                Ok(0) => break Ok(()),
                Ok(n) => {
                    if let Err(e) = data.try_reserve(n) {
                        break Err(FsError::from(e));
                    }
                    data.extend_from_slice(&chunk[..n]);
                }
                Err(e) => break Err(e),
            }
        };
        self.close(handle)?;
        result.map(|()| data)
    }

    /// 用 `data` 替换整个文件的内容，文件不存在时创建
    pub fn write_file(&self, path: &str, data: &[u8]) -> Result<usize, FsError> {
        let flags = OpenFlags::O_WRONLY | OpenFlags::O_CREAT | OpenFlags::O_TRUNC;
        let mut handle = self.open(path, flags, FileMode::DEFAULT_FILE)?;
        let mut written = 0;
        let result = loop {
            if written == data.len() {
                break Ok(written);
            }
            match self.write(&mut handle, &data[written..]) {
                Ok(0) => break Ok(written),
                Ok(n) => written += n,
                Err(e) => break Err(e),
            }
        };
        self.close(handle)?;
        result
    }
}

impl Default for Vfs {
    fn default() -> Self {
        Self::new()
    }
}
