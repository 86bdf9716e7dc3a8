//! sysfs 目录树构建器
//!
//! 顶层目录布局：
//!
//! ```text
//! <root>/devices/<dev>            设备目录和属性
//! <root>/bus/<bus>/devices/<dev>  -> ../../../devices/<dev>
//! <root>/class/<class>/<dev>      -> ../../devices/<dev>
//! ```

mod bus;
mod class;
mod devices;

pub use bus::{register_bus, unregister_bus};
pub use class::{link_class_device, unlink_class_device};
pub use devices::{register_device, unregister_device};

use vfs::{FileMode, FsError, Vfs};

use super::helpers::join;

/// 顶层目录
pub const TOP_LEVEL_DIRS: [&str; 3] = ["devices", "bus", "class"];

/// 在 sysfs 挂载点 `root` 下创建顶层目录，已存在的跳过
pub fn build_skeleton(vfs: &Vfs, root: &str) -> Result<(), FsError> {
    for dir in TOP_LEVEL_DIRS {
        ensure_dir(vfs, &join(root, dir))?;
    }
    Ok(())
}

pub(crate) fn ensure_dir(vfs: &Vfs, path: &str) -> Result<(), FsError> {
    match vfs.mkdir(path, FileMode::DEFAULT_DIR) {
        Ok(_) | Err(FsError::AlreadyExists) => Ok(()),
        Err(e) => Err(e),
    }
}
