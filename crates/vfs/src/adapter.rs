//! 节点属性与通用文件状态记录之间的转换

use uapi::fs::{DT_DIR, DT_LNK, DT_REG, S_IFDIR, S_IFLNK, S_IFREG, Stat};

use crate::{FsError, NodeId, NodeStore, NodeType};

/// 节点类型转换为目录项类型 (d_type)
pub fn node_type_to_d_type(node_type: NodeType) -> u8 {
    match node_type {
        NodeType::File => DT_REG,
        NodeType::Directory => DT_DIR,
        NodeType::Symlink => DT_LNK,
    }
}

fn type_bits(node_type: NodeType) -> u32 {
    match node_type {
        NodeType::File => S_IFREG,
        NodeType::Directory => S_IFDIR,
        NodeType::Symlink => S_IFLNK,
    }
}

/// 由节点生成文件状态记录，类型位由节点类型合成
pub fn node_stat(store: &NodeStore, id: NodeId) -> Result<Stat, FsError> {
    let node = store.node(id)?;
    Ok(Stat {
        st_dev: node.mount().raw() as u64,
        st_ino: id.ino(),
        st_mode: type_bits(node.node_type()) | node.mode.bits(),
        st_nlink: if node.is_dir() { 2 } else { 1 },
        st_uid: 0,
        st_gid: 0,
        st_rdev: 0,
        st_size: i64::try_from(node.size).unwrap_or(i64::MAX),
        st_atime: node.atime,
        st_mtime: node.mtime,
        st_ctime: node.ctime,
    })
}
