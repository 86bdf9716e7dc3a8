//! VFS 运行时依赖
//!
//! VFS 需要的外部协作者通过 trait 注入，而不是硬编码。目前只有时间源。

use uapi::time::TimeSpec;

/// VFS 运行时操作
pub trait VfsOps: Send + Sync {
    /// 获取当前时间，用于节点时间戳
    fn timespec_now(&self) -> TimeSpec;
}

/// 没有时钟时使用的默认实现，所有时间戳为零
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOps;

impl VfsOps for NullOps {
    fn timespec_now(&self) -> TimeSpec {
        TimeSpec::zero()
    }
}

#[cfg(test)]
impl VfsOps for test_support::mock::vfs::MockClock {
    fn timespec_now(&self) -> TimeSpec {
        self.now()
    }
}
