//! 日志条目结构

use crate::config::MAX_LOG_MESSAGE_LENGTH;
use crate::level::LogLevel;
use core::fmt::{self, Write};

/// 单条日志记录
///
/// 消息保存在定长数组中，构造时不做堆分配。
#[derive(Clone, Copy)]
pub struct LogEntry {
    level: LogLevel,
    cpu_id: usize,
    task_id: u32,
    timestamp: usize,
    len: usize,
    message: [u8; MAX_LOG_MESSAGE_LENGTH],
}

/// 写满后静默截断的格式化目标，截断点落在字符边界上
struct TruncatingWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl Write for TruncatingWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.buf.len() - self.len;
        let mut take = s.len().min(room);
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

impl LogEntry {
    /// 空条目，用于初始化缓冲区槽位
    pub const fn empty() -> Self {
        Self {
            level: LogLevel::Debug,
            cpu_id: 0,
            task_id: 0,
            timestamp: 0,
            len: 0,
            message: [0; MAX_LOG_MESSAGE_LENGTH],
        }
    }

    /// 由 `format_args!` 构造条目
    pub fn from_args(
        level: LogLevel,
        cpu_id: usize,
        task_id: u32,
        timestamp: usize,
        args: fmt::Arguments,
    ) -> Self {
        let mut entry = Self {
            level,
            cpu_id,
            task_id,
            timestamp,
            ..Self::empty()
        };
        let mut writer = TruncatingWriter {
            buf: &mut entry.message,
            len: 0,
        };
        // TruncatingWriter 从不返回错误
        let _ = writer.write_fmt(args);
        entry.len = writer.len;
        entry
    }

    /// 日志级别
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// 记录时的 CPU ID
    pub fn cpu_id(&self) -> usize {
        self.cpu_id
    }

    /// 记录时的任务 ID
    pub fn task_id(&self) -> u32 {
        self.task_id
    }

    /// 记录时的时间戳
    pub fn timestamp(&self) -> usize {
        self.timestamp
    }

    /// 消息文本
    pub fn message(&self) -> &str {
        // 截断只发生在字符边界，内容始终是合法 UTF-8
        core::str::from_utf8(&self.message[..self.len]).unwrap_or("")
    }
}

impl fmt::Debug for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogEntry")
            .field("level", &self.level)
            .field("timestamp", &self.timestamp)
            .field("message", &self.message())
            .finish()
    }
}
