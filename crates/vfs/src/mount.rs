//! 挂载表
//!
//! 记录每个挂载的目标路径、后端实例、命名空间根节点以及父子挂载关系。
//! 至多一个挂载拥有 "/"；非根挂载覆盖在已有目录节点之上。

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::{FileSystem, NodeId};

/// 挂载标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MountId(u32);

impl MountId {
    pub(crate) const fn new(raw: u32) -> Self {
        MountId(raw)
    }

    /// 原始编号，getattr 中作为设备号
    pub fn raw(&self) -> u32 {
        self.0
    }
}

/// 挂载点
pub struct MountPoint {
    /// 规范化后的目标路径
    pub path: String,
    /// 后端实例
    pub backend: Arc<dyn FileSystem>,
    /// 此挂载的根目录节点
    pub root: NodeId,
    /// 被覆盖的目录节点，根挂载为 None
    pub covered: Option<NodeId>,
    /// 父挂载
    pub parent: Option<MountId>,
    /// 子挂载
    pub children: Vec<MountId>,
}

/// 对外展示的挂载信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfo {
    /// 目标路径
    pub path: String,
    /// 后端类型名
    pub fs_type: &'static str,
}

impl MountPoint {
    /// 挂载信息快照
    pub fn info(&self) -> MountInfo {
        MountInfo {
            path: self.path.clone(),
            fs_type: self.backend.fs_type(),
        }
    }
}

/// 挂载表
pub struct MountTable {
    mounts: BTreeMap<MountId, MountPoint>,
    root: Option<MountId>,
    next_id: u32,
}

impl MountTable {
    /// 创建空挂载表
    pub fn new() -> Self {
        Self {
            mounts: BTreeMap::new(),
            root: None,
            next_id: 0,
        }
    }

    /// 根挂载
    pub fn root(&self) -> Option<&MountPoint> {
        self.root.and_then(|id| self.mounts.get(&id))
    }

    /// 根挂载标识
    pub fn root_id(&self) -> Option<MountId> {
        self.root
    }

    /// 按标识获取挂载
    pub fn get(&self, id: MountId) -> Option<&MountPoint> {
        self.mounts.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: MountId) -> Option<&mut MountPoint> {
        self.mounts.get_mut(&id)
    }

    /// 挂载数量
    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    /// 是否没有挂载
    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }

    /// 遍历所有挂载
    pub fn iter(&self) -> impl Iterator<Item = (MountId, &MountPoint)> {
        self.mounts.iter().map(|(id, m)| (*id, m))
    }

    /// 预留下一个挂载标识
    pub(crate) fn next_id(&mut self) -> MountId {
        let id = MountId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// 登记挂载，并把它挂到父挂载的子列表
    pub(crate) fn insert(&mut self, id: MountId, mount: MountPoint) {
        if let Some(parent) = mount.parent.and_then(|p| self.mounts.get_mut(&p)) {
            parent.children.push(id);
        } else if mount.covered.is_none() {
            self.root = Some(id);
        }
        self.mounts.insert(id, mount);
    }

    /// 移除挂载，并从父挂载的子列表中摘除
    pub(crate) fn remove(&mut self, id: MountId) -> Option<MountPoint> {
        let mount = self.mounts.remove(&id)?;
        if let Some(parent) = mount.parent.and_then(|p| self.mounts.get_mut(&p)) {
            parent.children.retain(|c| *c != id);
        }
        if self.root == Some(id) {
            self.root = None;
        }
        Some(mount)
    }

    /// 按路径精确查找（`path` 需已规范化）
    pub fn find_exact(&self, path: &str) -> Option<MountId> {
        self.mounts
            .iter()
            .find(|(_, m)| m.path == path)
            .map(|(id, _)| *id)
    }

    /// 查找拥有 `path` 的挂载：目标路径是 `path` 的最长前缀（按路径分量边界）
    ///
    /// `path` 需已规范化。
    pub fn find_owning_mount(&self, path: &str) -> Option<MountId> {
        self.mounts
            .iter()
            .filter(|(_, m)| is_path_prefix(&m.path, path))
            .max_by_key(|(_, m)| m.path.len())
            .map(|(id, _)| *id)
    }
}

impl Default for MountTable {
    fn default() -> Self {
        Self::new()
    }
}

/// `prefix` 是否按分量边界覆盖 `path`："/mnt" 覆盖 "/mnt/a"，不覆盖 "/mnta"
pub(crate) fn is_path_prefix(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return path.starts_with('/');
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
