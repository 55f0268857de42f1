//! In-memory audit log with optional file persistence
//!
//! The log is the default [`AuditSink`]: a bounded in-memory buffer under a
//! single mutex, safe for concurrent appenders. Readers take the same mutex
//! and get defensive copies, newest first.
//!
//! File persistence is best-effort append-mode JSONL (one entry per line);
//! write errors are logged and swallowed, they never reach callers. Bulk
//! export produces a pretty-printed JSON array.
//!
//! Observers are notified synchronously after each successful append. An
//! observer that panics is caught and reported as a `SystemAlert` entry;
//! it cannot corrupt the log or its caller.

use std::collections::VecDeque;
use std::io::Write;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::warn;

use crate::audit::types::{AuditEntry, AuditEventType};
use crate::audit::{AuditSink, CoordinatorObserver};

/// Audit log configuration
#[derive(Debug, Clone)]
pub struct AuditLogConfig {
    /// In-memory bound; the oldest entries are dropped past this
    pub max_in_memory_entries: usize,

    /// Append-mode JSONL file, if persistence is wanted
    pub file_path: Option<PathBuf>,
}

impl Default for AuditLogConfig {
    fn default() -> Self {
        Self {
            max_in_memory_entries: 1000,
            file_path: None,
        }
    }
}

/// Bounded, thread-safe audit log
///
/// # Example
/// ```
/// use relief_coordinator_core_rs::audit::{
///     AuditEntry, AuditEventType, AuditLog, AuditLogConfig, AuditSink,
/// };
///
/// let log = AuditLog::new(AuditLogConfig::default());
/// log.record(AuditEntry::new(AuditEventType::UserAction, "first"));
/// log.record(AuditEntry::new(AuditEventType::UserAction, "second"));
///
/// let recent = log.recent(1);
/// assert_eq!(recent[0].message, "second"); // newest first
/// ```
pub struct AuditLog {
    config: AuditLogConfig,
    entries: Mutex<VecDeque<AuditEntry>>,
    observers: Mutex<Vec<Arc<dyn CoordinatorObserver>>>,
}

impl AuditLog {
    pub fn new(config: AuditLogConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(VecDeque::new()),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe an observer to `on_log_added` notifications
    pub fn add_observer(&self, observer: Arc<dyn CoordinatorObserver>) {
        self.observers.lock().push(observer);
    }

    /// Number of entries currently buffered
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// The `n` newest entries, newest first
    pub fn recent(&self, n: usize) -> Vec<AuditEntry> {
        self.entries.lock().iter().rev().take(n).cloned().collect()
    }

    /// All buffered entries of one kind, newest first
    pub fn of_type(&self, event_type: AuditEventType) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .iter()
            .rev()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }

    /// All buffered entries with `from <= timestamp <= to`, newest first
    pub fn in_range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .iter()
            .rev()
            .filter(|e| e.timestamp >= from && e.timestamp <= to)
            .cloned()
            .collect()
    }

    /// Bulk export of the buffer as a pretty-printed JSON array
    pub fn export_json(&self) -> serde_json::Result<String> {
        let entries: Vec<AuditEntry> = self.entries.lock().iter().cloned().collect();
        serde_json::to_string_pretty(&entries)
    }

    /// Append an entry: buffer it, persist it, then notify observers
    fn append(&self, entry: AuditEntry, notify: bool) {
        {
            let mut entries = self.entries.lock();
            entries.push_back(entry.clone());
            while entries.len() > self.config.max_in_memory_entries {
                entries.pop_front();
            }
        }

        if let Some(path) = &self.config.file_path {
            if let Err(error) = append_jsonl(path, &entry) {
                // Persistence is best-effort; the log must never take its
                // callers down with it
                warn!(%error, path = %path.display(), "audit file append failed");
            }
        }

        if notify {
            let observers: Vec<Arc<dyn CoordinatorObserver>> = self.observers.lock().clone();
            for observer in observers {
                let outcome = catch_unwind(AssertUnwindSafe(|| observer.on_log_added(&entry)));
                if outcome.is_err() {
                    // Report the misbehaving observer without re-notifying,
                    // which would recurse into the same panic
                    self.append(
                        AuditEntry::new(
                            AuditEventType::SystemAlert,
                            "audit observer panicked in on_log_added",
                        ),
                        false,
                    );
                }
            }
        }
    }
}

impl AuditSink for AuditLog {
    fn record(&self, entry: AuditEntry) {
        self.append(entry, true);
    }
}

/// One JSON object per line, append mode
fn append_jsonl(path: &PathBuf, entry: &AuditEntry) -> std::io::Result<()> {
    let line = serde_json::to_string(entry)?;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{line}")
}
