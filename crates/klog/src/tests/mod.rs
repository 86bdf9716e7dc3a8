// 每个测试使用独立的 `LogCore`，不碰全局实例

extern crate alloc;

use crate::LogLevel;
use crate::log_core::LogCore;

fn fresh() -> LogCore {
    LogCore::new(LogLevel::Debug, LogLevel::Warning)
}

mod filter;
mod overflow;
mod peek;
