//! VFS 错误类型
//!
//! 定义了与 POSIX 兼容的文件系统错误码，可通过 [`FsError::to_errno()`] 转换为调用方打印的错误码。

use alloc::collections::TryReserveError;
use core::fmt;

/// VFS 错误类型
///
/// 各错误码对应标准 POSIX errno 值。任何一次失败都不会使 VFS 进入不可用状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    // 文件/目录相关
    /// 文件、后端或挂载点不存在 (-ENOENT)
    NotFound,
    /// 名称冲突 (-EEXIST)
    AlreadyExists,
    /// 不是目录 (-ENOTDIR)
    NotDirectory,
    /// 是目录 (-EISDIR)
    IsDirectory,
    /// 目录非空，或挂载点仍有子挂载 (-ENOTEMPTY)
    DirectoryNotEmpty,

    // 权限相关
    /// 访问模式不匹配 (-EACCES)
    PermissionDenied,

    // 文件句柄相关
    /// 句柄指向的节点已被删除 (-EBADF)
    BadFileDescriptor,

    // 参数相关
    /// 无效参数 (-EINVAL)
    InvalidArgument,
    /// 文件名或路径过长 (-ENAMETOOLONG)
    NameTooLong,

    // 资源相关
    /// 内存不足 (-ENOMEM)
    OutOfMemory,
    /// VFS 尚未初始化 (-ENODEV)
    NoDevice,

    // 挂载相关
    /// 目标已被挂载 (-EBUSY)
    AlreadyMounted,
    /// 挂载点或后端正在使用 (-EBUSY)
    Busy,
    /// 跨挂载点重命名 (-EXDEV)
    CrossDevice,

    // 其他
    /// 后端未提供该操作 (-ENOTSUP)
    NotSupported,
}

impl FsError {
    /// 转换为错误码（负数）
    pub fn to_errno(&self) -> isize {
        match self {
            FsError::NotFound => -2,
            FsError::BadFileDescriptor => -9,
            FsError::OutOfMemory => -12,
            FsError::PermissionDenied => -13,
            FsError::AlreadyMounted | FsError::Busy => -16,
            FsError::AlreadyExists => -17,
            FsError::CrossDevice => -18,
            FsError::NoDevice => -19,
            FsError::NotDirectory => -20,
            FsError::IsDirectory => -21,
            FsError::InvalidArgument => -22,
            FsError::NameTooLong => -36,
            FsError::DirectoryNotEmpty => -39,
            FsError::NotSupported => -95,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            FsError::NotFound => "no such file or directory",
            FsError::AlreadyExists => "file exists",
            FsError::NotDirectory => "not a directory",
            FsError::IsDirectory => "is a directory",
            FsError::DirectoryNotEmpty => "directory not empty",
            FsError::PermissionDenied => "permission denied",
            FsError::BadFileDescriptor => "bad file handle",
            FsError::InvalidArgument => "invalid argument",
            FsError::NameTooLong => "name too long",
            FsError::OutOfMemory => "out of memory",
            FsError::NoDevice => "vfs not initialized",
            FsError::AlreadyMounted => "already mounted",
            FsError::Busy => "resource busy",
            FsError::CrossDevice => "cross-device link",
            FsError::NotSupported => "operation not supported",
        }
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TryReserveError> for FsError {
    fn from(_: TryReserveError) -> Self {
        FsError::OutOfMemory
    }
}
