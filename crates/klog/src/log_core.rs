//! 日志系统核心实现
//!
//! 缓冲区和两个级别阈值封装在 [`LogCore`] 中，测试可以各自创建实例。

use crate::buffer::LogRing;
use crate::config::{DEFAULT_CONSOLE_LEVEL, DEFAULT_LOG_LEVEL};
use crate::entry::LogEntry;
use crate::level::LogLevel;
use core::fmt::{self, Write};
use core::sync::atomic::{AtomicU8, Ordering};

/// 核心日志系统
pub struct LogCore {
    ring: LogRing,
    /// 高于此级别的日志直接丢弃
    level: AtomicU8,
    /// 不高于此级别的日志同时打印到控制台
    console_level: AtomicU8,
}

impl LogCore {
    /// 使用默认级别创建，可用于 static 初始化
    pub const fn with_defaults() -> Self {
        Self::new(DEFAULT_LOG_LEVEL, DEFAULT_CONSOLE_LEVEL)
    }

    /// 使用指定级别创建
    pub const fn new(level: LogLevel, console_level: LogLevel) -> Self {
        Self {
            ring: LogRing::new(),
            level: AtomicU8::new(level as u8),
            console_level: AtomicU8::new(console_level as u8),
        }
    }

    /// 记录一条日志
    pub fn log(&self, level: LogLevel, args: fmt::Arguments) {
        if !self.enabled(level) {
            return;
        }

        let (cpu_id, task_id, timestamp) = crate::context_provider()
            .map(|p| (p.cpu_id(), p.task_id(), p.timestamp()))
            .unwrap_or_default();

        let entry = LogEntry::from_args(level, cpu_id, task_id, timestamp, args);
        self.ring.push(&entry);

        if level as u8 <= self.console_level.load(Ordering::Acquire) {
            if let Some(output) = crate::log_output() {
                let _ = write_formatted(&mut Console(output), &entry);
                output.write_str("\n");
            }
        }
    }

    /// 取出最旧的日志
    pub fn read(&self) -> Option<LogEntry> {
        self.ring.pop()
    }

    /// 查看第 `offset` 条未读日志（0 为最旧），不取出
    pub fn peek(&self, offset: usize) -> Option<LogEntry> {
        self.ring.peek(offset)
    }

    /// 未读日志数量
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// 是否没有未读日志
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 被覆盖丢弃的日志数量
    pub fn dropped(&self) -> usize {
        self.ring.dropped()
    }

    /// 设置缓冲级别阈值
    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level as u8, Ordering::Release);
    }

    /// 当前缓冲级别阈值
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::Acquire))
    }

    /// 设置控制台级别阈值
    pub fn set_console_level(&self, level: LogLevel) {
        self.console_level.store(level as u8, Ordering::Release);
    }

    /// 当前控制台级别阈值
    pub fn console_level(&self) -> LogLevel {
        LogLevel::from_u8(self.console_level.load(Ordering::Acquire))
    }

    /// `level` 的日志是否会被记录
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level as u8 <= self.level.load(Ordering::Acquire)
    }
}

struct Console(&'static dyn crate::LogOutput);

impl Write for Console {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_str(s);
        Ok(())
    }
}

fn write_formatted(out: &mut dyn Write, entry: &LogEntry) -> fmt::Result {
    write!(
        out,
        "{}{} [{:12}] [CPU{}/T{:3}] {}{}",
        entry.level().color_code(),
        entry.level().as_str(),
        entry.timestamp(),
        entry.cpu_id(),
        entry.task_id(),
        entry.message(),
        entry.level().reset_color_code()
    )
}

/// 格式化日志条目，与控制台输出的格式相同
///
/// ```text
/// <color>[LEVEL] [timestamp] [CPU<id>/T<tid>] message<reset>
/// ```
pub fn format_log_entry(entry: &LogEntry) -> alloc::string::String {
    let mut s = alloc::string::String::new();
    let _ = write_formatted(&mut s, entry);
    s
}
