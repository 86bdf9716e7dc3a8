//! sysfs 节点的私有数据
//!
//! 每个 sysfs 节点在 [`NodeStore`] 中挂一份 [`SysfsData`]：普通文件保存字节缓冲区，
//! 符号链接保存目标路径，属性文件保存 show/store 回调。

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use vfs::{FileMode, FsError, NodeId, NodeStore};

/// 属性读回调，每次读取时生成完整内容
pub type ShowFn = Arc<dyn Fn() -> Result<String, FsError> + Send + Sync>;

/// 属性写回调，收到一次写入的全部字节
pub type StoreFn = Arc<dyn Fn(&[u8]) -> Result<(), FsError> + Send + Sync>;

/// sysfs 属性文件
#[derive(Clone)]
pub struct SysfsAttr {
    /// 文件名
    pub name: String,
    /// 权限位
    pub mode: FileMode,
    /// 读回调
    pub show: ShowFn,
    /// 写回调，为 None 时属性只读
    pub store: Option<StoreFn>,
}

impl SysfsAttr {
    /// 内容固定的只读属性
    pub fn read_only(name: &str, value: String) -> Self {
        Self {
            name: String::from(name),
            mode: FileMode::from_perm(0o444),
            show: Arc::new(move || Ok(value.clone())),
            store: None,
        }
    }
}

impl fmt::Debug for SysfsAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SysfsAttr")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("writable", &self.store.is_some())
            .finish()
    }
}

/// 节点私有数据
pub(crate) enum SysfsData {
    File(Vec<u8>),
    Symlink(String),
    Attr(SysfsAttr),
}

pub(crate) fn data(store: &NodeStore, node: NodeId) -> Option<&SysfsData> {
    store.private::<SysfsData>(node)
}

pub(crate) fn data_mut(store: &mut NodeStore, node: NodeId) -> Option<&mut SysfsData> {
    store.private_mut::<SysfsData>(node)
}

/// 复制一份字节，分配失败返回 `OutOfMemory`
pub(crate) fn copy_bytes(bytes: &[u8]) -> Result<Vec<u8>, FsError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(bytes.len())?;
    buf.extend_from_slice(bytes);
    Ok(buf)
}
