/// How a notice should be surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// User-visible, non-fatal message (failed save, sensor timeout, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Monotonic per bus.
    pub seq: u64,
    pub level: NoticeLevel,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct EventBus {
    next_seq: u64,
    notices: Vec<Notice>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, level: NoticeLevel, kind: &'static str, message: impl Into<String>) {
        self.notices.push(Notice {
            seq: self.next_seq,
            level,
            kind,
            message: message.into(),
        });
        self.next_seq += 1;
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
