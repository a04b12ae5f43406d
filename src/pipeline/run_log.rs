use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// One timestamped line of the run log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%Y-%m-%d %H:%M:%S"), self.message)
    }
}

/// Append-only operator log kept for the lifetime of a pipeline instance.
///
/// Entries are never removed; a fresh log only comes with a fresh pipeline. Every entry is
/// mirrored to `tracing` so the structured log sinks see the same sequence.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RunLog {
    entries: Vec<LogEntry>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an informational entry
    pub fn info(&mut self, message: impl Into<String>) -> &LogEntry {
        let message = message.into();
        info!("{}", message);
        self.push(message)
    }

    /// Append an entry describing a failure
    pub fn warn(&mut self, message: impl Into<String>) -> &LogEntry {
        let message = message.into();
        warn!("{}", message);
        self.push(message)
    }

    fn push(&mut self, message: String) -> &LogEntry {
        self.entries.push(LogEntry {
            timestamp: Local::now(),
            message,
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rendered lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    /// Whether any entry's message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|e| e.message.contains(needle))
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.message.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_keep_insertion_order() {
        let mut log = RunLog::new();
        log.info("first");
        log.warn("second");
        log.info("third");
        let messages: Vec<&str> = log.messages().collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
        assert!(log.entries()[0].timestamp <= log.entries()[2].timestamp);
    }

    #[test]
    fn test_rendered_line_format() {
        let mut log = RunLog::new();
        let line = log.info("Starting extraction from sample...").to_string();
        // "[YYYY-MM-DD HH:MM:SS] " prefix is 22 chars
        assert_eq!(&line[..1], "[");
        assert_eq!(&line[20..22], "] ");
        assert_eq!(&line[22..], "Starting extraction from sample...");
    }

    #[test]
    fn test_contains_and_len() {
        let mut log = RunLog::new();
        assert!(log.is_empty());
        log.warn("Unknown source type: ftp");
        assert_eq!(log.len(), 1);
        assert!(log.contains("Unknown source type"));
        assert!(!log.contains("Extracted"));
    }
}
