//! 内核日志子系统
//!
//! 定长环形缓冲区、两级过滤、控制台即时输出和 `pr_*!` 宏，
//! 另外通过 [`KernelLogger`] 接住 `log` 门面的记录，VFS 各 crate 的日志都落到这里。
//!
//! 缓冲级别（默认 Info）决定日志是否进入缓冲区，控制台级别（默认 Warning）
//! 决定是否同时打印到已注册的 [`LogOutput`]。CPU/任务/时间戳由已注册的
//! [`LogContextProvider`] 提供，未注册时全部为 0。

#![no_std]

extern crate alloc;

mod buffer;
mod config;
mod entry;
mod level;
mod log_core;
mod logger;
pub mod macros;

pub use config::{
    DEFAULT_CONSOLE_LEVEL, DEFAULT_LOG_LEVEL, GLOBAL_LOG_BUFFER_SIZE, MAX_LOG_MESSAGE_LENGTH,
};
pub use entry::LogEntry;
pub use level::LogLevel;
pub use log_core::{LogCore, format_log_entry};
pub use logger::{KernelLogger, init};

use sync::SpinLock;

/// 日志上下文提供者
pub trait LogContextProvider: Send + Sync {
    /// 当前 CPU ID
    fn cpu_id(&self) -> usize;
    /// 当前任务 ID，没有任务时为 0
    fn task_id(&self) -> u32;
    /// 当前时间戳
    fn timestamp(&self) -> usize;
}

/// 控制台输出
pub trait LogOutput: Send + Sync {
    /// 输出字符串
    fn write_str(&self, s: &str);
}

static CONTEXT_PROVIDER: SpinLock<Option<&'static dyn LogContextProvider>> = SpinLock::new(None);
static LOG_OUTPUT: SpinLock<Option<&'static dyn LogOutput>> = SpinLock::new(None);

/// 全局实例，日志宏和下面的函数都委托给它
static GLOBAL_LOG: LogCore = LogCore::with_defaults();

/// 注册上下文提供者，后注册的覆盖先注册的
pub fn register_context_provider(provider: &'static dyn LogContextProvider) {
    *CONTEXT_PROVIDER.lock() = Some(provider);
}

/// 注册控制台输出，后注册的覆盖先注册的
pub fn register_log_output(output: &'static dyn LogOutput) {
    *LOG_OUTPUT.lock() = Some(output);
}

pub(crate) fn context_provider() -> Option<&'static dyn LogContextProvider> {
    *CONTEXT_PROVIDER.lock()
}

pub(crate) fn log_output() -> Option<&'static dyn LogOutput> {
    *LOG_OUTPUT.lock()
}

#[doc(hidden)]
pub fn log_impl(level: LogLevel, args: core::fmt::Arguments) {
    GLOBAL_LOG.log(level, args);
}

#[doc(hidden)]
pub fn is_level_enabled(level: LogLevel) -> bool {
    GLOBAL_LOG.enabled(level)
}

/// 取出最旧的日志
pub fn read_log() -> Option<LogEntry> {
    GLOBAL_LOG.read()
}

/// 查看第 `offset` 条未读日志（0 为最旧），不取出
pub fn peek_log(offset: usize) -> Option<LogEntry> {
    GLOBAL_LOG.peek(offset)
}

/// 未读日志数量
pub fn log_len() -> usize {
    GLOBAL_LOG.len()
}

/// 被覆盖丢弃的日志数量
pub fn log_dropped_count() -> usize {
    GLOBAL_LOG.dropped()
}

/// 设置缓冲级别
pub fn set_global_level(level: LogLevel) {
    GLOBAL_LOG.set_level(level);
}

/// 当前缓冲级别
pub fn get_global_level() -> LogLevel {
    GLOBAL_LOG.level()
}

/// 设置控制台级别
pub fn set_console_level(level: LogLevel) {
    GLOBAL_LOG.set_console_level(level);
}

/// 当前控制台级别
pub fn get_console_level() -> LogLevel {
    GLOBAL_LOG.console_level()
}

#[cfg(test)]
mod tests;
