//! 设备类链接

use alloc::format;

use vfs::{FsError, Vfs};

use super::ensure_dir;
use crate::sysfs::helpers::{self, join};

/// 在 `class/<class>/` 下创建指向设备目录的链接，设备类目录按需创建
pub fn link_class_device(vfs: &Vfs, root: &str, class: &str, device: &str) -> Result<(), FsError> {
    let class_dir = join(&join(root, "class"), class);
    ensure_dir(vfs, &class_dir)?;
    let target = format!("../../devices/{}", device);
    helpers::create_symlink(vfs, &join(&class_dir, device), &target)?;
    Ok(())
}

/// 删除设备类链接，设备类目录保留
pub fn unlink_class_device(vfs: &Vfs, root: &str, class: &str, device: &str) -> Result<(), FsError> {
    let class_dir = join(&join(root, "class"), class);
    vfs.unlink(&join(&class_dir, device))
}
