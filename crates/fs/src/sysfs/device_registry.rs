//! 设备与总线的注册描述
//!
//! 调用方（设备驱动、总线驱动）用这些描述告诉 sysfs 要生成哪些目录、
//! 属性和链接，具体的树由 [`builders`](super::builders) 构建。

use alloc::string::String;
use alloc::vec::Vec;

use super::SysfsAttr;

/// 设备描述
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// 设备名，对应 `devices/<name>`
    pub name: String,
    /// 所属总线
    pub bus: Option<String>,
    /// 所属设备类
    pub class: Option<String>,
    /// 设备目录下的属性文件
    pub attrs: Vec<SysfsAttr>,
}

impl DeviceInfo {
    /// 不属于任何总线和设备类的设备
    pub fn new(name: &str) -> Self {
        Self {
            name: String::from(name),
            bus: None,
            class: None,
            attrs: Vec::new(),
        }
    }

    /// 挂到总线上
    pub fn on_bus(mut self, bus: &str) -> Self {
        self.bus = Some(String::from(bus));
        self
    }

    /// 归入设备类
    pub fn in_class(mut self, class: &str) -> Self {
        self.class = Some(String::from(class));
        self
    }

    /// 增加属性文件
    pub fn with_attr(mut self, attr: SysfsAttr) -> Self {
        self.attrs.push(attr);
        self
    }

    /// uevent 属性的内容
    pub(crate) fn uevent(&self) -> String {
        let mut text = String::new();
        if let Some(bus) = &self.bus {
            text.push_str("SUBSYSTEM=");
            text.push_str(bus);
            text.push('\n');
        }
        text.push_str("DEVNAME=");
        text.push_str(&self.name);
        text.push('\n');
        text
    }
}
