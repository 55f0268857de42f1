//! Relief Coordinator Core - Rust Engine
//!
//! In-memory matching and prioritization engine for disaster-relief
//! logistics: allocates scarce supplies to outstanding needs under evolving
//! urgency and reports system-wide health, including a panic signal for
//! starved critical requests.
//!
//! # Architecture
//!
//! - **models**: Domain types (Need, Supply, Shipment, Location, ReliefState)
//! - **priority**: Effective-priority scoring with time-based aging
//! - **matching**: Transactional allocation passes with full rollback
//! - **audit**: Structured audit trail with sink and observer interfaces
//! - **dashboard**: Snapshot aggregation and panic detection
//!
//! # Critical Invariants
//!
//! 1. All quantities are u32 whole units; `0 <= reserved <= available` and
//!    `0 <= fulfilled <= required` hold at every observable state
//! 2. A failed matching pass leaves every touched entity exactly as it was
//! 3. The clock is always passed in explicitly; nothing here reads wall
//!    time during scoring or matching

// Module declarations
pub mod audit;
pub mod dashboard;
pub mod matching;
pub mod models;
pub mod priority;

// Re-exports for convenience
pub use audit::{
    AuditEntry, AuditEventType, AuditLog, AuditLogConfig, AuditSink, CoordinatorObserver,
    MetadataValue,
};
pub use dashboard::{Dashboard, DashboardConfig, DashboardSnapshot, PanicNeed};
pub use matching::{MatchingConfig, MatchingEngine, MatchingError, MatchingResult};
pub use models::{
    Allocation, Location, Need, PriorityLevel, ReliefState, Shipment, ShipmentStatus, Supply,
    SupplyAllocation,
};
pub use priority::{AgingConfig, PriorityManager};
