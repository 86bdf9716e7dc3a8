//! 集成测试共用的后端和辅助函数

#![allow(dead_code)]

use std::sync::Arc;

use vfs::{FileMode, FileSystem, FsError, NodeId, NodeStore, Vfs};

/// 只提供类型名的后端，其余全部使用默认实现
pub struct BareFs;

impl FileSystem for BareFs {
    fn fs_type(&self) -> &'static str {
        "bare"
    }
}

/// 内容保存在节点私有数据中的最小内存后端
pub struct MemFs;

impl MemFs {
    fn data(store: &mut NodeStore, node: NodeId) -> Result<&mut Vec<u8>, FsError> {
        if store.private::<Vec<u8>>(node).is_none() {
            store.set_private(node, Box::new(Vec::<u8>::new()))?;
        }
        store.private_mut::<Vec<u8>>(node).ok_or(FsError::NotFound)
    }
}

impl FileSystem for MemFs {
    fn fs_type(&self) -> &'static str {
        "memfs"
    }

    fn read(
        &self,
        store: &mut NodeStore,
        node: NodeId,
        offset: usize,
        buf: &mut [u8],
    ) -> Result<usize, FsError> {
        let data = Self::data(store, node)?;
        if offset >= data.len() {
            return Ok(0);
        }
        let n = buf.len().min(data.len() - offset);
        buf[..n].copy_from_slice(&data[offset..offset + n]);
        Ok(n)
    }

    fn write(
        &self,
        store: &mut NodeStore,
        node: NodeId,
        offset: usize,
        buf: &[u8],
    ) -> Result<usize, FsError> {
        let data = Self::data(store, node)?;
        let end = offset + buf.len();
        if end > data.len() {
            data.resize(end, 0);
        }
        data[offset..end].copy_from_slice(buf);
        let len = data.len();
        store.node_mut(node)?.size = len;
        Ok(buf.len())
    }

    fn truncate(&self, store: &mut NodeStore, node: NodeId, size: usize) -> Result<(), FsError> {
        Self::data(store, node)?.resize(size, 0);
        store.node_mut(node)?.size = size;
        Ok(())
    }
}

/// 注册了 memfs/bare 并把 memfs 挂在根上的 VFS
pub fn memfs_root() -> Vfs {
    let vfs = Vfs::new();
    vfs.register_backend(Arc::new(MemFs)).unwrap();
    vfs.register_backend(Arc::new(BareFs)).unwrap();
    vfs.mount("/", "memfs").unwrap();
    vfs
}

pub fn dir_names(vfs: &Vfs, path: &str) -> Vec<String> {
    vfs.read_dir(path)
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect()
}

pub const FILE: FileMode = FileMode::DEFAULT_FILE;
pub const DIR: FileMode = FileMode::DEFAULT_DIR;
