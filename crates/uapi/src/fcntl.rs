//! 打开标志与定位方式

use bitflags::bitflags;

bitflags! {
    /// `open` 的标志位，数值与 Linux 兼容
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        const O_RDONLY = 0;
        const O_WRONLY = 0o1;
        const O_RDWR = 0o2;
        const O_ACCMODE = 0o3;
        const O_CREAT = 0o100;
        const O_EXCL = 0o200;
        const O_TRUNC = 0o1000;
        const O_APPEND = 0o2000;
        const O_DIRECTORY = 0o200000;
    }
}

impl OpenFlags {
    /// 访问模式位 (O_RDONLY / O_WRONLY / O_RDWR)
    pub fn access_mode(&self) -> u32 {
        self.bits() & Self::O_ACCMODE.bits()
    }

    /// 是否允许读
    pub fn readable(&self) -> bool {
        let mode = self.access_mode();
        mode == Self::O_RDONLY.bits() || mode == Self::O_RDWR.bits()
    }

    /// 是否允许写
    pub fn writable(&self) -> bool {
        let mode = self.access_mode();
        mode == Self::O_WRONLY.bits() || mode == Self::O_RDWR.bits()
    }
}

/// `lseek` 的定位方式
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekWhence {
    /// 相对文件开头
    Set = 0,
    /// 相对当前位置
    Cur = 1,
    /// 相对文件末尾（以节点记录的大小为准）
    End = 2,
}

impl SeekWhence {
    /// 从原始数值转换，非法值返回 None
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(SeekWhence::Set),
            1 => Some(SeekWhence::Cur),
            2 => Some(SeekWhence::End),
            _ => None,
        }
    }
}
