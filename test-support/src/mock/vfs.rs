//! VFS 协作者的 Mock 实现
//!
//! 注意：这里不直接依赖 `vfs` crate（避免循环依赖）。
//! `vfs` crate 在 `cfg(test)` 下为这些类型实现其 trait（例如 `VfsOps`），
//! 集成测试则用新类型包装后实现。

use core::sync::atomic::{AtomicI64, Ordering};
use uapi::time::TimeSpec;

/// 可手动拨动的时钟
///
/// 只有秒数会变化，纳秒固定为 0。
pub struct MockClock {
    secs: AtomicI64,
}

impl MockClock {
    pub const fn new(start: i64) -> Self {
        Self {
            secs: AtomicI64::new(start),
        }
    }

    /// 当前时间
    pub fn now(&self) -> TimeSpec {
        TimeSpec::new(self.secs.load(Ordering::Acquire), 0)
    }

    /// 设置为指定秒数
    pub fn set(&self, secs: i64) {
        self.secs.store(secs, Ordering::Release);
    }

    /// 前进若干秒
    pub fn advance(&self, secs: i64) {
        self.secs.fetch_add(secs, Ordering::AcqRel);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new(0)
    }
}

/// 全局 Mock 时钟实例
pub static MOCK_CLOCK: MockClock = MockClock::new(1_000);
