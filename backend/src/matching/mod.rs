//! Supply-to-need matching
//!
//! One matching pass walks unfulfilled needs in effective-priority order,
//! ranks eligible supplies per need by a multi-factor match score, and
//! applies allocation slices transactionally: either the whole pass commits
//! or every touched quantity is restored.

pub mod engine;
pub mod ledger;
pub mod score;

// Re-exports
pub use engine::{MatchingConfig, MatchingEngine, MatchingError, MatchingResult};
pub use ledger::MatchLedger;
pub use score::{categories_related, category_score, match_score};
