//! `log` 门面的后端
//!
//! 其它 crate 通过 `log::info!` 等宏记录日志，安装 [`KernelLogger`] 后
//! 这些记录会进入全局环形缓冲区。

use crate::level::LogLevel;

/// 把 `log` 记录转发到全局 [`LogCore`](crate::log_core::LogCore)
pub struct KernelLogger;

static LOGGER: KernelLogger = KernelLogger;

impl log::Log for KernelLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        crate::is_level_enabled(LogLevel::from(metadata.level()))
    }

    fn log(&self, record: &log::Record) {
        let level = LogLevel::from(record.level());
        if crate::is_level_enabled(level) {
            crate::log_impl(
                level,
                format_args!("{}: {}", record.target(), record.args()),
            );
        }
    }

    fn flush(&self) {}
}

/// 安装 `log` 后端
///
/// 全局只能安装一次，重复调用返回 `SetLoggerError`。
pub fn init() -> Result<(), log::SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}
