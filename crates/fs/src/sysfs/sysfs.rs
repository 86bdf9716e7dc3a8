//! sysfs 后端
//!
//! 命名空间操作（lookup/mkdir/rmdir/unlink/rename/readdir/getattr/setattr）
//! 直接使用节点存储提供的默认实现；此处补充文件内容、符号链接和属性文件。

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use log::debug;
use vfs::{FileMode, FileSystem, FsError, NodeId, NodeStore, NodeType};

use super::node::{SysfsData, data, data_mut};

/// 后端类型名
pub const SYSFS_NAME: &str = "sysfs";

/// 内存中的 sysfs
///
/// 后端本身无状态，所有内容都挂在节点上，同一实例可以挂载多次。
#[derive(Debug, Default)]
pub struct SysFs;

impl SysFs {
    /// 创建后端实例
    pub fn new() -> Self {
        Self
    }

    /// 在 `pos` 处写入，缓冲区按需扩展到恰好 `pos + buf.len()`，空洞补零
    fn write_at(data: &mut Vec<u8>, pos: usize, buf: &[u8]) -> Result<usize, FsError> {
        let end = pos.checked_add(buf.len()).ok_or(FsError::InvalidArgument)?;
        if end > data.len() {
            data.try_reserve_exact(end - data.len())?;
            data.resize(end, 0);
        }
        data[pos..end].copy_from_slice(buf);
        Ok(data.len())
    }
}

fn copy_out(src: &[u8], offset: usize, buf: &mut [u8]) -> usize {
    if offset >= src.len() {
        return 0;
    }
    let n = buf.len().min(src.len() - offset);
    buf[..n].copy_from_slice(&src[offset..offset + n]);
    n
}

impl FileSystem for SysFs {
    fn fs_type(&self) -> &'static str {
        SYSFS_NAME
    }

    fn mount(&self, store: &mut NodeStore, root: NodeId) -> Result<(), FsError> {
        debug!("sysfs: new instance, root ino {}", root.ino());
        store.node(root).map(|_| ())
    }

    fn read(
        &self,
        store: &mut NodeStore,
        node: NodeId,
        offset: usize,
        buf: &mut [u8],
    ) -> Result<usize, FsError> {
        match data(store, node) {
            Some(SysfsData::File(content)) => Ok(copy_out(content, offset, buf)),
            Some(SysfsData::Attr(attr)) => {
                let text = (attr.show)()?;
                Ok(copy_out(text.as_bytes(), offset, buf))
            }
            Some(SysfsData::Symlink(_)) => Err(FsError::InvalidArgument),
            None => Ok(0),
        }
    }

    fn write(
        &self,
        store: &mut NodeStore,
        node: NodeId,
        offset: usize,
        buf: &[u8],
    ) -> Result<usize, FsError> {
        if data(store, node).is_none() {
            store.set_private(node, Box::new(SysfsData::File(Vec::new())))?;
        }
        let size = match data_mut(store, node) {
            Some(SysfsData::File(content)) => Self::write_at(content, offset, buf)?,
            Some(SysfsData::Attr(attr)) => {
                let store_fn = attr.store.as_ref().ok_or(FsError::PermissionDenied)?;
                store_fn(buf)?;
                return Ok(buf.len());
            }
            Some(SysfsData::Symlink(_)) | None => return Err(FsError::InvalidArgument),
        };
        store.node_mut(node)?.size = size;
        Ok(buf.len())
    }

    fn truncate(&self, store: &mut NodeStore, node: NodeId, size: usize) -> Result<(), FsError> {
        match data_mut(store, node) {
            Some(SysfsData::File(content)) => {
                if size > content.len() {
                    content.try_reserve_exact(size - content.len())?;
                }
                content.resize(size, 0);
            }
            // 属性内容由回调决定，截断没有效果
            Some(SysfsData::Attr(_)) => return Ok(()),
            Some(SysfsData::Symlink(_)) => return Err(FsError::InvalidArgument),
            None => {
                if store.node(node)?.node_type() != NodeType::File {
                    return Err(FsError::IsDirectory);
                }
                let mut content = Vec::new();
                content.try_reserve_exact(size)?;
                content.resize(size, 0);
                store.set_private(node, Box::new(SysfsData::File(content)))?;
            }
        }
        store.node_mut(node)?.size = size;
        Ok(())
    }

    fn create(
        &self,
        store: &mut NodeStore,
        dir: NodeId,
        name: &str,
        mode: FileMode,
    ) -> Result<NodeId, FsError> {
        let node = store.create_child(dir, name, NodeType::File, mode)?;
        store.set_private(node, Box::new(SysfsData::File(Vec::new())))?;
        Ok(node)
    }

    fn symlink(
        &self,
        store: &mut NodeStore,
        dir: NodeId,
        name: &str,
        target: &str,
    ) -> Result<NodeId, FsError> {
        let mut owned = String::new();
        owned.try_reserve_exact(target.len())?;
        owned.push_str(target);

        let node = store.create_child(dir, name, NodeType::Symlink, FileMode::from_perm(0o777))?;
        store.node_mut(node)?.size = owned.len();
        store.set_private(node, Box::new(SysfsData::Symlink(owned)))?;
        Ok(node)
    }

    fn readlink(&self, store: &NodeStore, node: NodeId) -> Result<String, FsError> {
        match data(store, node) {
            Some(SysfsData::Symlink(target)) => {
                let mut out = String::new();
                out.try_reserve_exact(target.len())?;
                out.push_str(target);
                Ok(out)
            }
            _ => Err(FsError::InvalidArgument),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_at_zero_fills_gap() {
        let mut data = Vec::new();
        assert_eq!(SysFs::write_at(&mut data, 0, b"ab"), Ok(2));
        assert_eq!(SysFs::write_at(&mut data, 3, b"c"), Ok(4));
        assert_eq!(data, b"ab\0c");
        // 覆盖写不改变长度
        assert_eq!(SysFs::write_at(&mut data, 1, b"X"), Ok(4));
        assert_eq!(data, b"aX\0c");
    }

    #[test]
    fn test_copy_out_past_end() {
        let mut buf = [0u8; 4];
        assert_eq!(copy_out(b"abc", 3, &mut buf), 0);
        assert_eq!(copy_out(b"abc", 10, &mut buf), 0);
        assert_eq!(copy_out(b"abc", 1, &mut buf), 2);
        assert_eq!(&buf[..2], b"bc");
    }
}
