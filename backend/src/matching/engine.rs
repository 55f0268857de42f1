//! Matching engine
//!
//! Executes one atomic matching pass over the shared state: walk unfulfilled
//! needs in effective-priority order, score the eligible supplies for each,
//! and carve allocation slices from the best candidates until the need is
//! covered or candidates run out.
//!
//! # Transactional semantics
//!
//! Every quantity change is applied through the entity mutators and recorded
//! in a [`MatchLedger`] before the pass moves on. Any error reverses all
//! recorded changes before the failed result is returned; on success the
//! ledger commits and the recorded deltas stand as the record of the pass.
//! Commit is irrevocable.
//!
//! # Ordering guarantees
//!
//! Needs are visited most-urgent-first with ties broken by creation time;
//! for one need, supplies are consumed in descending match-score order with
//! ties keeping candidate insertion order (stable sort).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::audit::{AuditEntry, AuditEventType, AuditSink, MetadataValue};
use crate::matching::ledger::MatchLedger;
use crate::matching::score::match_score;
use crate::models::allocation::{Allocation, SupplyAllocation};
use crate::models::state::ReliefState;
use crate::priority::PriorityManager;

/// Tunables of a matching pass
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingConfig {
    /// Distances beyond this contribute no proximity score (km)
    pub max_proximity_distance_km: f64,

    /// Multiplier on the proximity sub-score
    pub proximity_weight: f64,

    /// Multiplier on the category sub-score
    pub category_match_weight: f64,

    /// Whether a need may be covered by several supplies across passes
    pub allow_partial_fulfillment: bool,

    /// A first slice below this percentage of the required quantity is
    /// rejected (avoids scattering token amounts)
    pub min_partial_fulfillment_percent: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            max_proximity_distance_km: 100.0,
            proximity_weight: 0.3,
            category_match_weight: 0.5,
            allow_partial_fulfillment: true,
            min_partial_fulfillment_percent: 10.0,
        }
    }
}

/// Errors that abort a matching pass (and trigger rollback)
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MatchingError {
    #[error("reservation of {quantity} rejected by supply {supply_id}")]
    ReservationRejected { supply_id: Uuid, quantity: u32 },

    #[error("stock deduction of {quantity} rejected by supply {supply_id}")]
    DeductionRejected { supply_id: Uuid, quantity: u32 },

    #[error("fulfillment update of {quantity} rejected by need {need_id}")]
    FulfillmentRejected { need_id: Uuid, quantity: u32 },

    #[error("matching pass aborted: {0}")]
    Aborted(String),
}

/// Outcome of one matching pass
#[derive(Debug, Clone)]
pub struct MatchingResult {
    pub success: bool,
    pub message: String,
    pub error: Option<MatchingError>,
    pub allocations: Vec<Allocation>,
}

impl MatchingResult {
    fn succeeded(message: impl Into<String>, allocations: Vec<Allocation>) -> Self {
        Self {
            success: true,
            message: message.into(),
            error: None,
            allocations,
        }
    }

    fn failed(error: MatchingError) -> Self {
        Self {
            success: false,
            message: format!("matching pass rolled back: {error}"),
            error: Some(error),
            allocations: Vec::new(),
        }
    }

    /// Total units allocated across all needs
    pub fn total_allocated(&self) -> u32 {
        self.allocations.iter().map(|a| a.total_quantity()).sum()
    }

    /// Needs the pass left completely met
    pub fn fully_fulfilled_count(&self) -> usize {
        self.allocations.iter().filter(|a| a.fully_fulfilled()).count()
    }

    /// Needs the pass advanced but did not finish
    pub fn partially_fulfilled_count(&self) -> usize {
        self.allocations.iter().filter(|a| !a.fully_fulfilled()).count()
    }
}

/// One-shot allocator over a [`ReliefState`]
///
/// # Example
/// ```
/// use chrono::Utc;
/// use relief_coordinator_core_rs::matching::{MatchingConfig, MatchingEngine};
/// use relief_coordinator_core_rs::models::{Location, Need, PriorityLevel, ReliefState, Supply};
///
/// let mut state = ReliefState::new();
/// let need = Need::new(
///     "Water for Camp East", "Water", PriorityLevel::High,
///     10, "liters", Location::unknown("Camp East"),
/// );
/// let need_id = need.id();
/// state.add_need(need);
/// state.add_supply(Supply::new(
///     "Bottled water", "Water", 20, "liters", Location::unknown("Depot 4"),
/// ));
///
/// let engine = MatchingEngine::new(MatchingConfig::default());
/// let result = engine.run(&mut state, Utc::now());
///
/// assert!(result.success);
/// assert_eq!(result.total_allocated(), 10);
/// assert!(state.get_need(&need_id).unwrap().is_fulfilled());
/// ```
pub struct MatchingEngine {
    config: MatchingConfig,
    priority: PriorityManager,
    sink: Option<Arc<dyn AuditSink>>,

    /// Abort the pass after this many needs, to exercise rollback
    #[cfg(test)]
    fail_after_needs: Option<usize>,
}

impl MatchingEngine {
    pub fn new(config: MatchingConfig) -> Self {
        Self {
            config,
            priority: PriorityManager::default(),
            sink: None,
            #[cfg(test)]
            fail_after_needs: None,
        }
    }

    /// Use a non-default priority manager (builder pattern)
    pub fn with_priority_manager(mut self, priority: PriorityManager) -> Self {
        self.priority = priority;
        self
    }

    /// Emit audit events through this sink (builder pattern)
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Execute one atomic matching pass
    ///
    /// On success the returned allocations describe committed mutations of
    /// `state`. On failure every touched entity has been restored to its
    /// pre-pass quantities and `result.error` names the cause.
    pub fn run(&self, state: &mut ReliefState, now: DateTime<Utc>) -> MatchingResult {
        let ordered: Vec<Uuid> = self
            .priority
            .prioritize(state.needs().values(), now)
            .into_iter()
            .map(|n| n.id())
            .collect();

        if ordered.is_empty() {
            debug!("matching pass skipped: no unfulfilled needs");
            return MatchingResult::succeeded("no unfulfilled needs to match", Vec::new());
        }

        debug!(needs = ordered.len(), "starting matching pass");

        let mut ledger = MatchLedger::new();
        let mut allocations: Vec<Allocation> = Vec::new();

        for (visited, need_id) in ordered.iter().enumerate() {
            #[cfg(test)]
            if let Some(limit) = self.fail_after_needs {
                if visited >= limit {
                    let error = MatchingError::Aborted("injected fault".to_string());
                    ledger.roll_back(state);
                    self.emit_failure(&error);
                    return MatchingResult::failed(error);
                }
            }
            #[cfg(not(test))]
            let _ = visited;

            match self.allocate_for_need(state, *need_id, now, &mut ledger) {
                Ok(Some(allocation)) => allocations.push(allocation),
                Ok(None) => {}
                Err(error) => {
                    warn!(%error, "matching pass failed, rolling back");
                    ledger.roll_back(state);
                    self.emit_failure(&error);
                    return MatchingResult::failed(error);
                }
            }
        }

        ledger.commit();
        self.emit_commit_events(&allocations);

        let total: u32 = allocations.iter().map(|a| a.total_quantity()).sum();
        let message = format!(
            "allocated {} units across {} of {} prioritized needs",
            total,
            allocations.len(),
            ordered.len()
        );
        debug!(%message, "matching pass committed");
        MatchingResult::succeeded(message, allocations)
    }

    /// Allocate slices for one need; `Ok(None)` when nothing was eligible
    fn allocate_for_need(
        &self,
        state: &mut ReliefState,
        need_id: Uuid,
        now: DateTime<Utc>,
        ledger: &mut MatchLedger,
    ) -> Result<Option<Allocation>, MatchingError> {
        // Scoring phase: immutable view of the need and all candidate supplies
        let (required, remaining, need_title, candidates) = {
            let Some(need) = state.get_need(&need_id) else {
                return Ok(None);
            };
            if need.is_deleted() || need.is_fulfilled() {
                return Ok(None);
            }

            let mut candidates: Vec<(Uuid, f64)> = state
                .supplies()
                .values()
                .filter(|s| !s.is_deleted() && !s.is_expired(now) && s.allocatable() > 0)
                .filter_map(|s| {
                    let score = match_score(need, s, &self.config, now);
                    (score > 0.0).then_some((s.id(), score))
                })
                .collect();

            // Stable: equal scores keep candidate insertion order
            candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

            (
                need.quantity_required(),
                need.remaining(),
                need.title().to_string(),
                candidates,
            )
        };

        // Consumption phase: carve slices off the ranked candidates
        let mut slices: Vec<SupplyAllocation> = Vec::new();
        let mut accumulated: u32 = 0;

        for (supply_id, score) in candidates {
            if accumulated >= remaining {
                break;
            }
            let outstanding = remaining - accumulated;

            let Some(supply) = state.get_supply_mut(&supply_id) else {
                continue;
            };
            let allocatable = supply.allocatable();
            if allocatable == 0 {
                continue;
            }

            let slice = allocatable.min(outstanding);

            // First-slice gate
            if slices.is_empty() {
                if self.config.allow_partial_fulfillment {
                    let min_first =
                        f64::from(required) * self.config.min_partial_fulfillment_percent / 100.0;
                    if f64::from(slice) < min_first {
                        continue;
                    }
                } else if allocatable < outstanding {
                    // Partials disabled: only the top-ranked candidate is
                    // considered, and it must cover everything alone; leave
                    // the need for a later run
                    break;
                }
            }

            if !supply.reserve(slice) {
                return Err(MatchingError::ReservationRejected { supply_id, quantity: slice });
            }
            if !supply.deduct_stock(slice) {
                let _ = supply.release_reservation(slice);
                return Err(MatchingError::DeductionRejected { supply_id, quantity: slice });
            }
            let supply_name = supply.name().to_string();
            let supply_depleted = supply.allocatable() == 0;
            ledger.record_supply_deduction(supply_id, slice);

            let Some(need) = state.get_need_mut(&need_id) else {
                return Err(MatchingError::Aborted(format!("need {need_id} vanished mid-pass")));
            };
            if !need.add_fulfilled_quantity(slice) {
                return Err(MatchingError::FulfillmentRejected { need_id, quantity: slice });
            }
            ledger.record_need_fulfillment(need_id, slice);

            slices.push(SupplyAllocation {
                supply_id,
                supply_name,
                quantity: slice,
                match_score: score,
                supply_depleted,
            });
            accumulated += slice;
        }

        if slices.is_empty() {
            return Ok(None);
        }

        let fulfillment_percent_after = state
            .get_need(&need_id)
            .map(|n| n.fulfillment_percent())
            .unwrap_or(0.0);

        Ok(Some(Allocation {
            need_id,
            need_title,
            slices,
            allocated_at: now,
            fulfillment_percent_after,
        }))
    }

    /// Audit trail for a committed pass
    fn emit_commit_events(&self, allocations: &[Allocation]) {
        let Some(sink) = &self.sink else {
            return;
        };

        for allocation in allocations {
            sink.record(
                AuditEntry::new(
                    AuditEventType::MatchMade,
                    format!(
                        "allocated {} units to '{}' from {} supplies",
                        allocation.total_quantity(),
                        allocation.need_title,
                        allocation.slices.len()
                    ),
                )
                .with_entity(allocation.need_id, "Need")
                .with_metadata(
                    "total_allocated",
                    MetadataValue::Integer(i64::from(allocation.total_quantity())),
                )
                .with_metadata(
                    "fulfillment_percent",
                    MetadataValue::Float(allocation.fulfillment_percent_after),
                ),
            );

            for slice in &allocation.slices {
                if slice.supply_depleted {
                    sink.record(
                        AuditEntry::new(
                            AuditEventType::SupplyDepleted,
                            format!("supply '{}' exhausted by allocation", slice.supply_name),
                        )
                        .with_entity(slice.supply_id, "Supply"),
                    );
                }
            }

            if allocation.fully_fulfilled() {
                sink.record(
                    AuditEntry::new(
                        AuditEventType::NeedFulfilled,
                        format!("need '{}' completely fulfilled", allocation.need_title),
                    )
                    .with_entity(allocation.need_id, "Need"),
                );
            }
        }
    }

    fn emit_failure(&self, error: &MatchingError) {
        if let Some(sink) = &self.sink {
            sink.record(AuditEntry::new(
                AuditEventType::MatchFailed,
                format!("matching pass rolled back: {error}"),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::location::Location;
    use crate::models::need::{Need, PriorityLevel};
    use crate::models::supply::Supply;
    use chrono::Duration;

    fn need(category: &str, required: u32, priority: PriorityLevel) -> Need {
        Need::new("n", category, priority, required, "units", Location::unknown("camp"))
    }

    fn supply(category: &str, available: u32) -> Supply {
        Supply::new("s", category, available, "units", Location::unknown("depot"))
    }

    /// A failure injected mid-pass must leave every touched entity exactly
    /// as it was before the pass started.
    #[test]
    fn test_injected_fault_rolls_back_first_allocation() {
        let now = Utc::now();
        let mut state = ReliefState::new();

        // Visited first: older and more urgent
        let first = need("Food", 10, PriorityLevel::High)
            .with_created_at(now - Duration::hours(2));
        let first_id = first.id();
        state.add_need(first);

        let second = need("Food", 10, PriorityLevel::Medium)
            .with_created_at(now - Duration::hours(1));
        state.add_need(second);

        let s = supply("Food", 30);
        let supply_id = s.id();
        state.add_supply(s);

        let mut engine = MatchingEngine::new(MatchingConfig::default());
        engine.fail_after_needs = Some(1); // allocate first, fail on second

        let result = engine.run(&mut state, now);

        assert!(!result.success);
        assert!(matches!(result.error, Some(MatchingError::Aborted(_))));
        assert!(result.allocations.is_empty());

        let s = state.get_supply(&supply_id).unwrap();
        assert_eq!(s.available(), 30);
        assert_eq!(s.reserved(), 0);
        assert_eq!(state.get_need(&first_id).unwrap().quantity_fulfilled(), 0);
    }

    #[test]
    fn test_fault_before_any_allocation_is_clean_failure() {
        let now = Utc::now();
        let mut state = ReliefState::new();
        state.add_need(need("Food", 10, PriorityLevel::High));
        state.add_supply(supply("Food", 30));

        let mut engine = MatchingEngine::new(MatchingConfig::default());
        engine.fail_after_needs = Some(0);

        let result = engine.run(&mut state, now);
        assert!(!result.success);
        assert_eq!(result.total_allocated(), 0);
    }
}
