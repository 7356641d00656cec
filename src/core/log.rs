//! Player-facing activity log.
//!
//! Every board mutation, rejection, and turn transition appends a line here
//! so both clients can render the same history. The log keeps only the most
//! recent [`LOG_CAPACITY`] entries; older lines are trimmed on append.

use im::Vector;
use serde::{Deserialize, Serialize};

/// Maximum retained log entries.
pub const LOG_CAPACITY: usize = 50;

/// Bounded append-only activity log.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    entries: Vector<String>,
}

impl ActivityLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, trimming the oldest entries past capacity.
    pub fn push(&mut self, message: impl Into<String>) {
        self.entries.push_back(message.into());
        if self.entries.len() > LOG_CAPACITY {
            self.entries = self.entries.skip(self.entries.len() - LOG_CAPACITY);
        }
    }

    /// Iterate entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.entries.iter()
    }

    /// The most recent entry.
    #[must_use]
    pub fn latest(&self) -> Option<&String> {
        self.entries.back()
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been logged yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy all entries out, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    /// Rebuild a log from snapshot entries.
    #[must_use]
    pub fn from_entries(entries: Vec<String>) -> Self {
        let mut log = Self::new();
        for entry in entries {
            log.push(entry);
        }
        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_latest() {
        let mut log = ActivityLog::new();
        assert!(log.is_empty());

        log.push("first");
        log.push("second");

        assert_eq!(log.len(), 2);
        assert_eq!(log.latest().map(String::as_str), Some("second"));
    }

    #[test]
    fn test_capacity_trimming() {
        let mut log = ActivityLog::new();
        for i in 0..LOG_CAPACITY + 10 {
            log.push(format!("entry {i}"));
        }

        assert_eq!(log.len(), LOG_CAPACITY);
        assert_eq!(
            log.iter().next().map(String::as_str),
            Some("entry 10"),
            "oldest entries are trimmed"
        );
        assert_eq!(
            log.latest().map(String::as_str),
            Some(format!("entry {}", LOG_CAPACITY + 9).as_str())
        );
    }

    #[test]
    fn test_round_trip() {
        let mut log = ActivityLog::new();
        log.push("a");
        log.push("b");

        let rebuilt = ActivityLog::from_entries(log.to_vec());
        assert_eq!(rebuilt, log);
    }
}
