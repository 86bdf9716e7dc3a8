//! 日志环形缓冲区
//!
//! 定长槽位，`head` 指向最旧的未读条目。缓冲区满时覆盖最旧的条目并计入丢弃数。

use crate::config::GLOBAL_LOG_BUFFER_SIZE;
use crate::entry::LogEntry;
use sync::SpinLock;

struct Ring {
    slots: [LogEntry; GLOBAL_LOG_BUFFER_SIZE],
    head: usize,
    len: usize,
    dropped: usize,
}

impl Ring {
    fn slot(&self, offset: usize) -> usize {
        (self.head + offset) % GLOBAL_LOG_BUFFER_SIZE
    }
}

/// 日志缓冲区
pub struct LogRing {
    ring: SpinLock<Ring>,
}

impl LogRing {
    /// 创建空缓冲区
    pub const fn new() -> Self {
        Self {
            ring: SpinLock::new(Ring {
                slots: [LogEntry::empty(); GLOBAL_LOG_BUFFER_SIZE],
                head: 0,
                len: 0,
                dropped: 0,
            }),
        }
    }

    /// 追加一条日志，满时挤掉最旧的一条
    pub fn push(&self, entry: &LogEntry) {
        let mut ring = self.ring.lock();
        if ring.len == GLOBAL_LOG_BUFFER_SIZE {
            ring.head = ring.slot(1);
            ring.len -= 1;
            ring.dropped += 1;
        }
        let tail = ring.slot(ring.len);
        ring.slots[tail] = *entry;
        ring.len += 1;
    }

    /// 取出最旧的条目
    pub fn pop(&self) -> Option<LogEntry> {
        let mut ring = self.ring.lock();
        if ring.len == 0 {
            return None;
        }
        let entry = ring.slots[ring.head];
        ring.head = ring.slot(1);
        ring.len -= 1;
        Some(entry)
    }

    /// 查看第 `offset` 条未读条目（0 为最旧），不取出
    pub fn peek(&self, offset: usize) -> Option<LogEntry> {
        let ring = self.ring.lock();
        (offset < ring.len).then(|| ring.slots[ring.slot(offset)])
    }

    /// 未读条目数
    pub fn len(&self) -> usize {
        self.ring.lock().len
    }

    /// 因覆盖而丢弃的条目数
    pub fn dropped(&self) -> usize {
        self.ring.lock().dropped
    }
}
