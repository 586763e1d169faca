// Recent event log for the dashboard log viewer
use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEFAULT_LOG_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogCategory {
    Push,
    Pull,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub category: LogCategory,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn record(
        &mut self,
        category: LogCategory,
        level: LogLevel,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) {
        self.entries.push_back(LogEntry {
            timestamp,
            category,
            level,
            message: message.into(),
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_most_recent_entries() {
        let mut log = EventLog::new(2);
        let now = Utc::now();
        log.record(LogCategory::Push, LogLevel::Info, "one", now);
        log.record(LogCategory::Pull, LogLevel::Warning, "two", now);
        log.record(LogCategory::System, LogLevel::Error, "three", now);

        let messages: Vec<String> = log.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["two", "three"]);
    }

    #[test]
    fn test_entry_serialization() {
        let mut log = EventLog::default();
        log.record(LogCategory::Pull, LogLevel::Warning, "timeout", Utc::now());
        let json = serde_json::to_value(&log.entries()[0]).unwrap();
        assert_eq!(json["category"], "PULL");
        assert_eq!(json["level"], "warning");
    }
}
