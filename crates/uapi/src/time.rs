//! 时间相关定义

/// 秒 + 纳秒的时间值
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeSpec {
    pub tv_sec: i64,
    pub tv_nsec: i64,
}

impl TimeSpec {
    pub const fn new(tv_sec: i64, tv_nsec: i64) -> Self {
        Self { tv_sec, tv_nsec }
    }

    /// 零时间，时钟未注入时使用
    pub const fn zero() -> Self {
        Self::new(0, 0)
    }
}
