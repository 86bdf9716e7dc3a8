//! 文件状态与目录项类型

use crate::time::TimeSpec;

// st_mode 的类型位
pub const S_IFMT: u32 = 0o170000;
pub const S_IFLNK: u32 = 0o120000;
pub const S_IFREG: u32 = 0o100000;
pub const S_IFDIR: u32 = 0o040000;

// 目录项类型 (d_type)
pub const DT_UNKNOWN: u8 = 0;
pub const DT_DIR: u8 = 4;
pub const DT_REG: u8 = 8;
pub const DT_LNK: u8 = 10;

/// 通用文件状态记录
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stat {
    pub st_dev: u64,
    pub st_ino: u64,
    pub st_mode: u32,
    pub st_nlink: u32,
    pub st_uid: u32,
    pub st_gid: u32,
    pub st_rdev: u64,
    pub st_size: i64,
    pub st_atime: TimeSpec,
    pub st_mtime: TimeSpec,
    pub st_ctime: TimeSpec,
}

impl Stat {
    /// 权限位（去掉类型位）
    pub fn permissions(&self) -> u32 {
        self.st_mode & !S_IFMT
    }

    pub fn is_dir(&self) -> bool {
        self.st_mode & S_IFMT == S_IFDIR
    }

    pub fn is_file(&self) -> bool {
        self.st_mode & S_IFMT == S_IFREG
    }

    pub fn is_symlink(&self) -> bool {
        self.st_mode & S_IFMT == S_IFLNK
    }
}
