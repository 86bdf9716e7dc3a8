//! sysfs 便捷接口
//!
//! 设备注册等内核代码通过这些函数直接构造 sysfs 内容，所有操作都经过 [`Vfs`]，
//! 因此与普通文件操作共享同一把锁和同一套路径解析。

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use log::{error, info};
use vfs::{FileHandle, FileMode, FileSystem, FsError, NodeId, NodeType, OpenFlags, Vfs};

use super::node::{SysfsData, copy_bytes};
use super::{SYSFS_NAME, SysFs, SysfsAttr};

/// 拼接目录与名称
pub fn join(dir: &str, name: &str) -> String {
    let mut path = String::from(dir.trim_end_matches('/'));
    path.push('/');
    path.push_str(name);
    path
}

fn check_sysfs(fs: &dyn FileSystem) -> Result<(), FsError> {
    if fs.fs_type() != SYSFS_NAME {
        return Err(FsError::NotSupported);
    }
    Ok(())
}

/// 向 `vfs` 注册 sysfs 后端
pub fn register(vfs: &Vfs) -> Result<(), FsError> {
    vfs.register_backend(Arc::new(SysFs::new()))
}

/// 把一个新的 sysfs 实例挂载到 `path`
pub fn mount(vfs: &Vfs, path: &str) -> Result<(), FsError> {
    vfs.mount(path, SYSFS_NAME).inspect_err(|e| {
        error!("sysfs: failed to mount at '{}': {}", path, e);
    })?;
    info!("sysfs: mounted at '{}'", path);
    Ok(())
}

/// 卸载 `path` 上的 sysfs
pub fn umount(vfs: &Vfs, path: &str) -> Result<(), FsError> {
    vfs.unmount(path).inspect_err(|e| {
        error!("sysfs: failed to unmount '{}': {}", path, e);
    })?;
    info!("sysfs: unmounted '{}'", path);
    Ok(())
}

/// 创建目录
pub fn mkdir(vfs: &Vfs, path: &str, mode: FileMode) -> Result<NodeId, FsError> {
    vfs.mkdir(path, mode)
}

/// 创建内容为 `data` 的文件
///
/// 内容在节点创建之前复制，分配失败时命名空间保持不变。
pub fn create_file(vfs: &Vfs, path: &str, mode: FileMode, data: &[u8]) -> Result<NodeId, FsError> {
    vfs.create_with(path, |fs, store, parent, name| {
        check_sysfs(fs)?;
        let content = copy_bytes(data)?;
        let node = store.create_child(parent, name, NodeType::File, mode)?;
        store.node_mut(node)?.size = content.len();
        store.set_private(node, Box::new(SysfsData::File(content)))?;
        Ok(node)
    })
}

/// 创建符号链接
pub fn create_symlink(vfs: &Vfs, path: &str, target: &str) -> Result<NodeId, FsError> {
    vfs.symlink(path, target)
}

/// 在目录 `dir` 下创建属性文件，文件名取自 `attr.name`
pub fn create_attr(vfs: &Vfs, dir: &str, attr: SysfsAttr) -> Result<NodeId, FsError> {
    let path = join(dir, &attr.name);
    vfs.create_with(&path, move |fs, store, parent, name| {
        check_sysfs(fs)?;
        let node = store.create_child(parent, name, NodeType::File, attr.mode)?;
        store.set_private(node, Box::new(SysfsData::Attr(attr)))?;
        Ok(node)
    })
}

/// 删除文件、符号链接或空目录
pub fn remove(vfs: &Vfs, path: &str) -> Result<(), FsError> {
    let node = vfs.lookup(path)?;
    if vfs.metadata(node)?.node_type == NodeType::Directory {
        vfs.rmdir(path)
    } else {
        vfs.unlink(path)
    }
}

/// 递归删除目录及其全部内容，非目录直接删除
pub fn remove_tree(vfs: &Vfs, path: &str) -> Result<(), FsError> {
    let node = vfs.lookup(path)?;
    if vfs.metadata(node)?.node_type != NodeType::Directory {
        return vfs.unlink(path);
    }
    for entry in vfs.read_dir(path)? {
        remove_tree(vfs, &join(path, &entry.name))?;
    }
    vfs.rmdir(path)
}

/// 读取节点的全部内容：文件数据、属性的 show 输出或链接目标
pub fn get_data(vfs: &Vfs, path: &str) -> Result<Vec<u8>, FsError> {
    let node = vfs.lookup(path)?;
    match vfs.metadata(node)?.node_type {
        NodeType::Directory => Err(FsError::IsDirectory),
        NodeType::Symlink => Ok(vfs.readlink(path)?.into_bytes()),
        NodeType::File => vfs.read_file(path),
    }
}

/// 用 `data` 替换已有文件的内容；属性文件把 `data` 交给 store 回调
pub fn set_data(vfs: &Vfs, path: &str, data: &[u8]) -> Result<(), FsError> {
    let mut handle = vfs.open(
        path,
        OpenFlags::O_WRONLY | OpenFlags::O_TRUNC,
        FileMode::empty(),
    )?;
    let result = write_all(vfs, &mut handle, data);
    vfs.close(handle)?;
    result
}

fn write_all(vfs: &Vfs, handle: &mut FileHandle, mut data: &[u8]) -> Result<(), FsError> {
    while !data.is_empty() {
        let n = vfs.write(handle, data)?;
        if n == 0 {
            return Err(FsError::InvalidArgument);
        }
        data = &data[n..];
    }
    Ok(())
}
