//! User-facing run log.
//!
//! This is the history the dashboard shows to the user, not diagnostics
//! (those go through `tracing`). One sink is created per process and handed
//! to whatever needs it as `Arc<dyn LogSink>`.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl LogEntry {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            message: message.into(),
        }
    }
}

/// `[HH:MM:SS] message`
impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Append-only ordered log. Implementations must keep entries in append order.
pub trait LogSink: Send + Sync {
    fn append(&self, message: &str) -> LogEntry;
    fn entries(&self) -> Vec<LogEntry>;

    fn last(&self) -> Option<LogEntry> {
        self.entries().pop()
    }
}

/// In-memory sink for the lifetime of the process. Unbounded.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<dyn LogSink> {
        Arc::new(Self::new())
    }
}

impl LogSink for MemoryLog {
    fn append(&self, message: &str) -> LogEntry {
        let entry = LogEntry::now(message);
        tracing::debug!(entry = message, "log entry appended");
        // A poisoned lock still holds a valid Vec; keep logging.
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push(entry.clone());
        entry
    }

    fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn last(&self) -> Option<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }
}
