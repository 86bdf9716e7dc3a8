//! /sys/devices/ 设备层次结构构建器

use alloc::format;
use alloc::string::String;
use log::{info, warn};
use vfs::{FileMode, FsError, Vfs};

use super::class::{link_class_device, unlink_class_device};
use crate::sysfs::device_registry::DeviceInfo;
use crate::sysfs::helpers::{self, join};
use crate::sysfs::SysfsAttr;

fn device_dir(root: &str, name: &str) -> String {
    join(&join(root, "devices"), name)
}

fn bus_link(root: &str, bus: &str, name: &str) -> String {
    join(&join(&join(&join(root, "bus"), bus), "devices"), name)
}

/// 本次注册实际建立的链接，失败时只撤销这些
#[derive(Default)]
struct Created {
    bus_link: bool,
    class_link: bool,
}

/// 注册设备
///
/// 创建 `devices/<name>`、`uevent` 和描述中的属性；设备在总线上时
/// 在 `bus/<bus>/devices/` 下建立链接并在设备目录下建立 `subsystem` 链接，
/// 总线必须已经注册。任一步失败时只撤销本次创建的内容，已有的同名链接保持不动。
pub fn register_device(vfs: &Vfs, root: &str, dev: &DeviceInfo) -> Result<(), FsError> {
    let dir = device_dir(root, &dev.name);
    vfs.mkdir(&dir, FileMode::DEFAULT_DIR)?;
    let mut created = Created::default();
    if let Err(e) = populate(vfs, root, &dir, dev, &mut created) {
        rollback(vfs, root, &dir, dev, &created);
        return Err(e);
    }
    info!("sysfs: registered device {}", dev.name);
    Ok(())
}

fn populate(
    vfs: &Vfs,
    root: &str,
    dir: &str,
    dev: &DeviceInfo,
    created: &mut Created,
) -> Result<(), FsError> {
    helpers::create_attr(vfs, dir, SysfsAttr::read_only("uevent", dev.uevent()))?;
    for attr in &dev.attrs {
        helpers::create_attr(vfs, dir, attr.clone())?;
    }
    if let Some(bus) = &dev.bus {
        let target = format!("../../../devices/{}", dev.name);
        helpers::create_symlink(vfs, &bus_link(root, bus, &dev.name), &target)?;
        created.bus_link = true;
        let subsystem = format!("../../bus/{}", bus);
        helpers::create_symlink(vfs, &join(dir, "subsystem"), &subsystem)?;
    }
    if let Some(class) = &dev.class {
        link_class_device(vfs, root, class, &dev.name)?;
        created.class_link = true;
    }
    Ok(())
}

fn rollback(vfs: &Vfs, root: &str, dir: &str, dev: &DeviceInfo, created: &Created) {
    if let (true, Some(bus)) = (created.bus_link, &dev.bus) {
        if let Err(e) = vfs.unlink(&bus_link(root, bus, &dev.name)) {
            warn!("sysfs: rollback of bus link for {} failed: {}", dev.name, e);
        }
    }
    if let (true, Some(class)) = (created.class_link, &dev.class) {
        if let Err(e) = unlink_class_device(vfs, root, class, &dev.name) {
            warn!("sysfs: rollback of class link for {} failed: {}", dev.name, e);
        }
    }
    if let Err(e) = helpers::remove_tree(vfs, dir) {
        warn!("sysfs: rollback of {} failed: {}", dir, e);
    }
}

/// 注销设备：删除总线和设备类中的链接以及整个设备目录
pub fn unregister_device(vfs: &Vfs, root: &str, dev: &DeviceInfo) -> Result<(), FsError> {
    if let Some(bus) = &dev.bus {
        match vfs.unlink(&bus_link(root, bus, &dev.name)) {
            Ok(()) | Err(FsError::NotFound) => {}
            Err(e) => return Err(e),
        }
    }
    if let Some(class) = &dev.class {
        match unlink_class_device(vfs, root, class, &dev.name) {
            Ok(()) | Err(FsError::NotFound) => {}
            Err(e) => return Err(e),
        }
    }
    helpers::remove_tree(vfs, &device_dir(root, &dev.name))?;
    info!("sysfs: unregistered device {}", dev.name);
    Ok(())
}
