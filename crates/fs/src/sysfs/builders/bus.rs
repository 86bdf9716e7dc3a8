//! /sys/bus/ 构建器

use alloc::string::String;
use log::{info, warn};
use vfs::{FileMode, FsError, Vfs};

use crate::sysfs::helpers::{self, join};

fn bus_dir(root: &str, bus: &str) -> String {
    join(&join(root, "bus"), bus)
}

/// 注册总线：创建 `bus/<bus>/devices` 和 `bus/<bus>/drivers`
///
/// 总线已存在时返回 `AlreadyExists`。
pub fn register_bus(vfs: &Vfs, root: &str, bus: &str) -> Result<(), FsError> {
    let dir = bus_dir(root, bus);
    vfs.mkdir(&dir, FileMode::DEFAULT_DIR)?;
    for sub in ["devices", "drivers"] {
        if let Err(e) = vfs.mkdir(&join(&dir, sub), FileMode::DEFAULT_DIR) {
            if let Err(re) = helpers::remove_tree(vfs, &dir) {
                warn!("sysfs: rollback of bus {} failed: {}", bus, re);
            }
            return Err(e);
        }
    }
    info!("sysfs: registered bus {}", bus);
    Ok(())
}

/// 注销总线，仍有设备挂在总线上时返回 `DirectoryNotEmpty`
pub fn unregister_bus(vfs: &Vfs, root: &str, bus: &str) -> Result<(), FsError> {
    let dir = bus_dir(root, bus);
    if !vfs.read_dir(&join(&dir, "devices"))?.is_empty() {
        return Err(FsError::DirectoryNotEmpty);
    }
    helpers::remove_tree(vfs, &dir)?;
    info!("sysfs: unregistered bus {}", bus);
    Ok(())
}
