//! 文件句柄
//!
//! 一次 open 的状态：目标节点、打开标志和字节游标。句柄不在任务之间共享，
//! 如需共享由调用方自行串行化。

use uapi::fcntl::OpenFlags;

use crate::NodeId;

/// 打开的文件
///
/// 由 [`Vfs::open`](crate::Vfs::open) 创建，[`Vfs::close`](crate::Vfs::close) 消耗。
/// 节点在句柄存活期间被删除时，后续操作返回 `BadFileDescriptor`。
#[derive(Debug)]
pub struct FileHandle {
    pub(crate) node: NodeId,
    pub(crate) flags: OpenFlags,
    pub(crate) pos: usize,
}

impl FileHandle {
    pub(crate) fn new(node: NodeId, flags: OpenFlags) -> Self {
        Self { node, flags, pos: 0 }
    }

    /// 目标节点
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// 打开标志
    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    /// 当前游标（普通文件为字节偏移，目录为目录项序号）
    pub fn pos(&self) -> usize {
        self.pos
    }
}
