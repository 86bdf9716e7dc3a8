//! 节点存储 - 命名空间树
//!
//! 所有文件、目录和符号链接节点存放在一个 arena 中，通过带代数的 [`NodeId`] 引用。
//! 节点被释放后槽位可以复用，但代数递增，旧的 `NodeId` 不会指向新节点。
//!
//! 目录的子节点以名称为键保存在有序容器中，因此同一目录下名称天然唯一，
//! readdir 按名称顺序返回。

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use uapi::MAX_PATH;
use uapi::time::TimeSpec;

use crate::{FsError, MountId, VfsOps};

/// 节点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// 普通文件
    File,
    /// 目录
    Directory,
    /// 符号链接
    Symlink,
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// 文件权限和类型（与 POSIX 兼容）
    ///
    /// 节点只保存权限位，类型位在 getattr 时由 [`NodeType`] 合成。
    pub struct FileMode: u32 {
        /// 文件类型掩码
        const S_IFMT   = 0o170000;
        /// 普通文件
        const S_IFREG  = 0o100000;
        /// 目录
        const S_IFDIR  = 0o040000;
        /// 符号链接
        const S_IFLNK  = 0o120000;

        /// 用户读
        const S_IRUSR  = 0o400;
        /// 用户写
        const S_IWUSR  = 0o200;
        /// 用户执行
        const S_IXUSR  = 0o100;
        /// 组读
        const S_IRGRP  = 0o040;
        /// 组写
        const S_IWGRP  = 0o020;
        /// 组执行
        const S_IXGRP  = 0o010;
        /// 其他读
        const S_IROTH  = 0o004;
        /// 其他写
        const S_IWOTH  = 0o002;
        /// 其他执行
        const S_IXOTH  = 0o001;

        /// Set UID
        const S_ISUID  = 0o4000;
        /// Set GID
        const S_ISGID  = 0o2000;
        /// Sticky bit
        const S_ISVTX  = 0o1000;
    }
}

impl FileMode {
    /// 新建文件的默认权限 (0644)
    pub const DEFAULT_FILE: FileMode = FileMode::S_IRUSR
        .union(FileMode::S_IWUSR)
        .union(FileMode::S_IRGRP)
        .union(FileMode::S_IROTH);

    /// 新建目录的默认权限 (0755)
    pub const DEFAULT_DIR: FileMode = FileMode::DEFAULT_FILE
        .union(FileMode::S_IXUSR)
        .union(FileMode::S_IXGRP)
        .union(FileMode::S_IXOTH);

    /// 从原始数值构造，只保留权限位
    pub fn from_perm(bits: u32) -> Self {
        FileMode::from_bits_truncate(bits).permissions()
    }

    /// 去掉类型位后的权限
    pub fn permissions(&self) -> Self {
        self.difference(FileMode::S_IFMT)
    }
}

/// 节点标识
///
/// `index` 定位 arena 槽位，`generation` 区分同一槽位上先后存在的节点。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// 会话内稳定的 inode 编号
    pub fn ino(&self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64 + 1)
    }
}

/// 命名空间节点
pub struct Node {
    name: String,
    node_type: NodeType,
    /// 权限位
    pub mode: FileMode,
    /// 记录的大小（字节），lseek 的 END 以此为准
    pub size: usize,
    /// 访问时间
    pub atime: TimeSpec,
    /// 修改时间
    pub mtime: TimeSpec,
    /// 状态改变时间
    pub ctime: TimeSpec,
    parent: Option<NodeId>,
    children: BTreeMap<String, NodeId>,
    mount: MountId,
    covered_by: Option<MountId>,
    private: Option<Box<dyn Any + Send>>,
}

impl Node {
    fn new(name: String, node_type: NodeType, mode: FileMode, mount: MountId, now: TimeSpec) -> Self {
        Self {
            name,
            node_type,
            mode: mode.permissions(),
            size: 0,
            atime: now,
            mtime: now,
            ctime: now,
            parent: None,
            children: BTreeMap::new(),
            mount,
            covered_by: None,
            private: None,
        }
    }

    /// 节点名称（挂载根为 "/"）
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 节点类型
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// 是否为目录
    pub fn is_dir(&self) -> bool {
        self.node_type == NodeType::Directory
    }

    /// 父节点，挂载根没有父节点
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// 节点所属的挂载
    pub fn mount(&self) -> MountId {
        self.mount
    }

    /// 覆盖在此目录上的挂载
    pub fn covered_by(&self) -> Option<MountId> {
        self.covered_by
    }

    /// 子节点数量
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// 按名称顺序遍历子节点
    pub fn children(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.children.iter().map(|(name, id)| (name.as_str(), *id))
    }
}

/// 轻量级目录项（readdir 返回）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// 文件名
    pub name: String,
    /// inode 编号
    pub ino: u64,
    /// 文件类型
    pub node_type: NodeType,
}

/// 节点元数据快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeMetadata {
    /// inode 编号
    pub ino: u64,
    /// 文件类型
    pub node_type: NodeType,
    /// 权限位
    pub mode: FileMode,
    /// 大小（字节）
    pub size: usize,
    /// 子节点数量（非目录为 0）
    pub nchildren: usize,
    /// 访问时间
    pub atime: TimeSpec,
    /// 修改时间
    pub mtime: TimeSpec,
    /// 状态改变时间
    pub ctime: TimeSpec,
}

/// setattr 的请求，未设置的字段保持不变
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetAttr {
    /// 新权限
    pub mode: Option<FileMode>,
    /// 新大小，通过后端 truncate 实现
    pub size: Option<usize>,
    /// 新访问时间
    pub atime: Option<TimeSpec>,
    /// 新修改时间
    pub mtime: Option<TimeSpec>,
}

impl SetAttr {
    /// 空请求
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置权限
    pub fn with_mode(mut self, mode: FileMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// 设置大小
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// 设置访问时间
    pub fn with_atime(mut self, atime: TimeSpec) -> Self {
        self.atime = Some(atime);
        self
    }

    /// 设置修改时间
    pub fn with_mtime(mut self, mtime: TimeSpec) -> Self {
        self.mtime = Some(mtime);
        self
    }
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// 节点 arena
pub struct NodeStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    clock: Arc<dyn VfsOps>,
}

impl NodeStore {
    /// 创建空的节点存储，时间戳取自 `clock`
    pub fn new(clock: Arc<dyn VfsOps>) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            clock,
        }
    }

    /// 当前时间
    pub fn now(&self) -> TimeSpec {
        self.clock.timespec_now()
    }

    pub(crate) fn set_clock(&mut self, clock: Arc<dyn VfsOps>) {
        self.clock = clock;
    }

    /// 存活节点数
    pub fn len(&self) -> usize {
        self.live
    }

    /// 是否没有任何节点
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// 获取节点，`id` 已失效时返回 None
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    /// 获取节点的可变引用
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// 获取节点，失效时返回 `NotFound`
    pub fn node(&self, id: NodeId) -> Result<&Node, FsError> {
        self.get(id).ok_or(FsError::NotFound)
    }

    /// 获取节点的可变引用，失效时返回 `NotFound`
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, FsError> {
        self.get_mut(id).ok_or(FsError::NotFound)
    }

    fn alloc(&mut self, node: Node) -> Result<NodeId, FsError> {
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = u32::try_from(self.slots.len()).map_err(|_| FsError::OutOfMemory)?;
                self.slots.try_reserve(1)?;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        };
        self.live += 1;
        Ok(id)
    }

    fn release(&mut self, id: NodeId) -> Option<Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(node)
    }

    /// 为挂载分配根目录
    pub(crate) fn alloc_root(&mut self, mount: MountId, mode: FileMode) -> Result<NodeId, FsError> {
        let now = self.now();
        self.alloc(Node::new(
            String::from("/"),
            NodeType::Directory,
            mode,
            mount,
            now,
        ))
    }

    pub(crate) fn set_covered_by(&mut self, id: NodeId, mount: Option<MountId>) -> Result<(), FsError> {
        self.node_mut(id)?.covered_by = mount;
        Ok(())
    }

    /// 在目录中按名称查找子节点
    ///
    /// 非目录节点没有子节点，查找总是 `NotFound`。
    pub fn lookup_child(&self, dir: NodeId, name: &str) -> Result<NodeId, FsError> {
        self.node(dir)?
            .children
            .get(name)
            .copied()
            .ok_or(FsError::NotFound)
    }

    /// 在目录下创建子节点，新节点继承父目录的挂载
    pub fn create_child(
        &mut self,
        dir: NodeId,
        name: &str,
        node_type: NodeType,
        mode: FileMode,
    ) -> Result<NodeId, FsError> {
        check_name(name)?;
        let parent = self.node(dir)?;
        if !parent.is_dir() {
            return Err(FsError::NotDirectory);
        }
        if parent.children.contains_key(name) {
            return Err(FsError::AlreadyExists);
        }
        let mount = parent.mount;

        let mut owned = String::new();
        owned.try_reserve_exact(name.len())?;
        owned.push_str(name);
        let key = owned.clone();

        let now = self.now();
        let mut node = Node::new(owned, node_type, mode, mount, now);
        node.parent = Some(dir);
        let id = self.alloc(node)?;

        let parent = self.node_mut(dir)?;
        parent.children.insert(key, id);
        parent.mtime = now;
        parent.ctime = now;
        Ok(id)
    }

    /// 删除目录中的非目录子节点
    pub fn unlink_child(&mut self, dir: NodeId, name: &str) -> Result<(), FsError> {
        let id = self.lookup_child(dir, name)?;
        if self.node(id)?.is_dir() {
            return Err(FsError::IsDirectory);
        }
        self.destroy_subtree(id);
        Ok(())
    }

    /// 删除空的子目录
    pub fn rmdir_child(&mut self, dir: NodeId, name: &str) -> Result<(), FsError> {
        let id = self.lookup_child(dir, name)?;
        let node = self.node(id)?;
        if !node.is_dir() {
            return Err(FsError::NotDirectory);
        }
        if node.covered_by.is_some() {
            return Err(FsError::Busy);
        }
        if !node.children.is_empty() {
            return Err(FsError::DirectoryNotEmpty);
        }
        self.destroy_subtree(id);
        Ok(())
    }

    /// 从父目录摘下并递归释放整棵子树，不检查目录是否为空
    ///
    /// 仅用于整棵树的清理（卸载）以及已确认可删除的单个节点。
    pub fn destroy_subtree(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        if let Some(parent) = node.parent {
            let now = self.now();
            let name = node.name.clone();
            if let Some(p) = self.get_mut(parent) {
                p.children.remove(&name);
                p.mtime = now;
                p.ctime = now;
            }
        }

        let mut stack = Vec::new();
        stack.push(id);
        while let Some(next) = stack.pop() {
            if let Some(node) = self.release(next) {
                stack.extend(node.children.into_values());
            }
        }
    }

    /// 将子节点从一个目录移到另一个目录（可同时改名）
    ///
    /// 目标名已被其它节点占用时失败。新名称在摘下旧目录项之前分配，
    /// 失败时节点仍留在原位置。
    pub fn rename(
        &mut self,
        old_dir: NodeId,
        old_name: &str,
        new_dir: NodeId,
        new_name: &str,
    ) -> Result<(), FsError> {
        check_name(new_name)?;
        let id = self.lookup_child(old_dir, old_name)?;
        if old_dir == new_dir && old_name == new_name {
            return Ok(());
        }

        let target = self.node(new_dir)?;
        if !target.is_dir() {
            return Err(FsError::NotDirectory);
        }
        if target.children.contains_key(new_name) {
            return Err(FsError::AlreadyExists);
        }
        if self.node(id)?.covered_by.is_some() {
            return Err(FsError::Busy);
        }
        // 目录不能移到自己的子树里
        let mut cursor = Some(new_dir);
        while let Some(c) = cursor {
            if c == id {
                return Err(FsError::InvalidArgument);
            }
            cursor = self.node(c)?.parent;
        }

        let mut owned = String::new();
        owned.try_reserve_exact(new_name.len())?;
        owned.push_str(new_name);
        let key = owned.clone();

        let now = self.now();
        if let Some(p) = self.get_mut(old_dir) {
            p.children.remove(old_name);
            p.mtime = now;
        }
        let p = self.node_mut(new_dir)?;
        p.children.insert(key, id);
        p.mtime = now;
        let node = self.node_mut(id)?;
        node.name = owned;
        node.parent = Some(new_dir);
        node.ctime = now;
        Ok(())
    }

    /// 默认 readdir：把 `index` 当作子节点序号
    pub fn readdir_nth(&self, dir: NodeId, index: usize) -> Result<Option<DirEntry>, FsError> {
        let node = self.node(dir)?;
        if !node.is_dir() {
            return Err(FsError::NotDirectory);
        }
        let Some((name, id)) = node.children.iter().nth(index) else {
            return Ok(None);
        };
        let child = self.node(*id)?;
        Ok(Some(DirEntry {
            name: name.clone(),
            ino: id.ino(),
            node_type: child.node_type,
        }))
    }

    /// 节点元数据快照
    pub fn metadata(&self, id: NodeId) -> Result<NodeMetadata, FsError> {
        let node = self.node(id)?;
        Ok(NodeMetadata {
            ino: id.ino(),
            node_type: node.node_type,
            mode: node.mode,
            size: node.size,
            nchildren: node.children.len(),
            atime: node.atime,
            mtime: node.mtime,
            ctime: node.ctime,
        })
    }

    /// 设置后端私有数据，替换已有的数据
    pub fn set_private(&mut self, id: NodeId, data: Box<dyn Any + Send>) -> Result<(), FsError> {
        self.node_mut(id)?.private = Some(data);
        Ok(())
    }

    /// 按类型借用后端私有数据
    pub fn private<T: Any>(&self, id: NodeId) -> Option<&T> {
        self.get(id)?.private.as_ref()?.downcast_ref::<T>()
    }

    /// 按类型可变借用后端私有数据
    pub fn private_mut<T: Any>(&mut self, id: NodeId) -> Option<&mut T> {
        self.get_mut(id)?.private.as_mut()?.downcast_mut::<T>()
    }
}

fn check_name(name: &str) -> Result<(), FsError> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(FsError::InvalidArgument);
    }
    if name.len() >= MAX_PATH {
        return Err(FsError::NameTooLong);
    }
    Ok(())
}
