//! Audit trail
//!
//! The engine and dashboard report what they did through the narrow
//! [`AuditSink`] interface; [`AuditLog`] is the bundled implementation
//! (bounded in-memory buffer, optional JSONL file). Hosts that need a
//! different backend implement `AuditSink` themselves.

use crate::dashboard::PanicNeed;

pub mod log;
pub mod types;

// Re-exports
pub use log::{AuditLog, AuditLogConfig};
pub use types::{AuditEntry, AuditEventType, MetadataValue};

/// Receives structured audit entries
///
/// Implementations must be safe for concurrent appenders and must never
/// propagate I/O failures to callers.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: AuditEntry);
}

/// Synchronous notifications about coordinator activity
///
/// Both methods default to no-ops so observers implement only what they
/// care about. Observers run on the caller's thread and must not block
/// indefinitely; a panicking observer is caught and reported, never
/// propagated.
pub trait CoordinatorObserver: Send + Sync {
    /// Fired after each successful audit append
    fn on_log_added(&self, _entry: &AuditEntry) {}

    /// Fired once per dashboard snapshot whose panic set is non-empty
    fn on_panic_mode_triggered(&self, _needs: &[PanicNeed]) {}
}
