//! 路径解析引擎
//!
//! 将绝对路径字符串解析为节点：
//!
//! - 只接受以 `/` 开头的绝对路径，空路径和相对路径是 `InvalidArgument`
//! - 连续或结尾的 `/` 产生的空分量被跳过
//! - `.` 跳过；`..` 回到父目录，不越过根；在挂载根上 `..` 回到被覆盖目录的父目录
//! - 每个分量通过节点所属挂载的后端 `lookup` 查找
//! - 进入被挂载覆盖的目录时，继续从该挂载的根节点解析
//! - 中途遇到非目录节点不立即报错，下一个分量查找失败时返回 `NotFound`
//! - 不跟随符号链接

use alloc::string::String;
use alloc::vec::Vec;

use crate::{FsError, MountTable, NodeId, NodeStore};

/// 路径组件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathComponent {
    /// 根目录 "/"
    Root,
    /// 当前目录 "."
    Current,
    /// 父目录 ".."
    Parent,
    /// 正常的文件名
    Normal(String),
}

/// 将路径字符串解析为组件列表
pub fn parse_path(path: &str) -> Vec<PathComponent> {
    let mut components = Vec::new();

    if path.starts_with('/') {
        components.push(PathComponent::Root);
    }

    for part in path.split('/').filter(|s| !s.is_empty()) {
        let component = match part {
            "." => PathComponent::Current,
            ".." => PathComponent::Parent,
            name => PathComponent::Normal(String::from(name)),
        };
        components.push(component);
    }

    components
}

/// 规范化路径（处理 ".." 和 "."）
pub fn normalize_path(path: &str) -> String {
    let mut stack: Vec<String> = Vec::new();
    let mut is_absolute = false;

    for component in parse_path(path) {
        match component {
            PathComponent::Root => is_absolute = true,
            PathComponent::Current => {}
            PathComponent::Parent => {
                if is_absolute {
                    // 不能越过根目录
                    stack.pop();
                } else if stack.last().is_some_and(|last| last != "..") {
                    stack.pop();
                } else {
                    stack.push(String::from(".."));
                }
            }
            PathComponent::Normal(name) => stack.push(name),
        }
    }

    if stack.is_empty() {
        if is_absolute {
            String::from("/")
        } else {
            String::from(".")
        }
    } else if is_absolute {
        String::from("/") + &stack.join("/")
    } else {
        stack.join("/")
    }
}

/// 将路径分割为目录部分和文件名部分
pub fn split_path(path: &str) -> Result<(String, String), FsError> {
    // 以斜杠结尾说明是目录而非文件
    if path.ends_with('/') && path.len() > 1 {
        return Err(FsError::InvalidArgument);
    }

    let normalized = normalize_path(path);

    if let Some(pos) = normalized.rfind('/') {
        let dir = if pos == 0 {
            String::from("/")
        } else {
            String::from(&normalized[..pos])
        };
        let filename = String::from(&normalized[pos + 1..]);

        if filename.is_empty() {
            return Err(FsError::InvalidArgument);
        }

        Ok((dir, filename))
    } else {
        Ok((String::from("."), normalized))
    }
}

fn check_absolute(path: &str) -> Result<(), FsError> {
    if !path.starts_with('/') {
        return Err(FsError::InvalidArgument);
    }
    Ok(())
}

/// 越过挂载覆盖：进入被覆盖目录时换成挂载根，可能连续多层
fn cross_mounts(store: &NodeStore, mounts: &MountTable, mut id: NodeId) -> Result<NodeId, FsError> {
    while let Some(mount) = store.node(id)?.covered_by() {
        id = mounts.get(mount).ok_or(FsError::NotFound)?.root;
    }
    Ok(id)
}

fn parent_of(store: &NodeStore, mounts: &MountTable, id: NodeId) -> Result<NodeId, FsError> {
    let node = store.node(id)?;
    if let Some(parent) = node.parent() {
        return Ok(parent);
    }
    // 挂载根：回到被覆盖目录，再取其父目录；全局根的父目录是自己
    let mount = mounts.get(node.mount()).ok_or(FsError::NotFound)?;
    match mount.covered {
        Some(covered) => parent_of(store, mounts, covered),
        None => Ok(id),
    }
}

/// 将绝对路径解析为节点
pub fn resolve(store: &NodeStore, mounts: &MountTable, path: &str) -> Result<NodeId, FsError> {
    check_absolute(path)?;
    let root = mounts.root().ok_or(FsError::NotFound)?.root;
    let mut current = cross_mounts(store, mounts, root)?;

    for component in parse_path(path) {
        current = match component {
            PathComponent::Root | PathComponent::Current => current,
            PathComponent::Parent => {
                let parent = parent_of(store, mounts, current)?;
                cross_mounts(store, mounts, parent)?
            }
            PathComponent::Normal(name) => {
                let mount = store.node(current)?.mount();
                let backend = &mounts.get(mount).ok_or(FsError::NotFound)?.backend;
                let child = backend.lookup(store, current, &name)?;
                cross_mounts(store, mounts, child)?
            }
        };
    }

    Ok(current)
}

/// 解析路径的父目录，返回父目录节点和最后一个分量
pub fn resolve_parent(
    store: &NodeStore,
    mounts: &MountTable,
    path: &str,
) -> Result<(NodeId, String), FsError> {
    check_absolute(path)?;
    // "/d/" 与 "/d" 指同一个目录项
    let trimmed = path.trim_end_matches('/');
    let (dir, name) = split_path(trimmed)?;
    let parent = resolve(store, mounts, &dir)?;
    Ok((parent, name))
}
