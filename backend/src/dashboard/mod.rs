//! Dashboard snapshot and panic detector
//!
//! Aggregates the whole system into one immutable [`DashboardSnapshot`]:
//! need/supply/shipment counters, the top critical missing items,
//! per-category breakdowns, and the panic list. Rendering the snapshot is
//! the consumer's job; this module only computes.
//!
//! # Panic detection
//!
//! A need panics when it is live, unmet, *effectively* Critical (after
//! aging), has waited at least the configured threshold, and is either
//! completely unserved or has waited past twice the threshold. Detection is
//! level-triggered: every snapshot taken while the condition holds emits a
//! `PanicModeTriggered` audit event and notifies observers again. Snapshots
//! keep no state between calls; rate limiting belongs to the caller.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::{AuditEntry, AuditEventType, AuditSink, CoordinatorObserver, MetadataValue};
use crate::models::need::PriorityLevel;
use crate::models::shipment::ShipmentStatus;
use crate::models::state::ReliefState;
use crate::priority::PriorityManager;

/// Dashboard configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Hours an effectively-Critical need may starve before panicking
    pub panic_threshold_hours: f64,

    /// Size of the "top critical missing items" list
    pub top_critical_count: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            panic_threshold_hours: 1.0,
            top_critical_count: 5,
        }
    }
}

/// Need counters over the live (non-deleted) population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedStats {
    pub total: usize,
    pub fulfilled: usize,

    /// Strictly between 0% and 100% met
    pub partially_fulfilled: usize,

    /// Exactly 0% met
    pub unfulfilled: usize,

    /// Aggregate fulfilled/required across all live needs, as a percentage
    pub percent_met: f64,
}

/// Supply counters over the live (non-deleted) population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyStats {
    pub total: usize,

    /// Nothing left to allocate
    pub depleted: usize,

    /// Below the reorder threshold but not yet depleted
    pub low_stock: usize,
}

/// Shipment counters over the live (non-deleted) population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentStats {
    /// Not yet in a terminal state
    pub active: usize,

    /// Pending or Approved
    pub pending: usize,

    /// InTransit, AtDistributionCenter, or OutForDelivery
    pub in_transit: usize,

    /// Delivered with an actual-delivery date of today (UTC)
    pub delivered_today: usize,
}

/// One row of the "top critical missing items" list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalNeed {
    pub need_id: Uuid,
    pub title: String,
    pub category: String,
    pub effective_score: f64,
    pub hours_waiting: f64,
    pub remaining: u32,
}

/// One starving need in the panic list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanicNeed {
    pub need_id: Uuid,
    pub title: String,
    pub base_priority: PriorityLevel,
    pub hours_waiting: f64,
    pub fulfillment_percent: f64,
}

/// Immutable aggregate view of the whole system at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,

    pub needs: NeedStats,
    pub supplies: SupplyStats,
    pub shipments: ShipmentStats,

    /// Unserved needs ranked most-urgent-first, longest-waiting breaking ties
    pub critical_missing: Vec<CriticalNeed>,

    /// Percentage met per category, over live needs
    pub category_fulfillment: BTreeMap<String, f64>,

    /// Allocatable units per category, over live supplies
    pub category_allocatable: BTreeMap<String, u32>,

    /// Starving effectively-Critical needs, worst first
    pub panic_needs: Vec<PanicNeed>,
}

impl DashboardSnapshot {
    /// Whether this snapshot caught the system in panic mode
    pub fn panic_active(&self) -> bool {
        !self.panic_needs.is_empty()
    }
}

/// Computes snapshots and raises the panic signal
///
/// # Example
/// ```
/// use chrono::Utc;
/// use relief_coordinator_core_rs::dashboard::{Dashboard, DashboardConfig};
/// use relief_coordinator_core_rs::models::ReliefState;
///
/// let dashboard = Dashboard::new(DashboardConfig::default());
/// let snapshot = dashboard.snapshot(&ReliefState::new(), Utc::now());
///
/// assert_eq!(snapshot.needs.total, 0);
/// assert!(!snapshot.panic_active());
/// ```
pub struct Dashboard {
    config: DashboardConfig,
    priority: PriorityManager,
    sink: Option<Arc<dyn AuditSink>>,
    observers: Vec<Arc<dyn CoordinatorObserver>>,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            priority: PriorityManager::default(),
            sink: None,
            observers: Vec::new(),
        }
    }

    /// Use a non-default priority manager (builder pattern)
    ///
    /// Must match the manager the matching engine uses, or panic gating and
    /// matching order will disagree about effective levels.
    pub fn with_priority_manager(mut self, priority: PriorityManager) -> Self {
        self.priority = priority;
        self
    }

    /// Emit `PanicModeTriggered` events through this sink (builder pattern)
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Subscribe an observer to panic notifications
    pub fn add_observer(&mut self, observer: Arc<dyn CoordinatorObserver>) {
        self.observers.push(observer);
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Compute a snapshot; fires the panic signal when the list is non-empty
    pub fn snapshot(&self, state: &ReliefState, now: DateTime<Utc>) -> DashboardSnapshot {
        let needs = self.need_stats(state);
        let supplies = self.supply_stats(state);
        let shipments = self.shipment_stats(state, now);
        let critical_missing = self.critical_missing(state, now);
        let (category_fulfillment, category_allocatable) = self.category_breakdown(state);
        let panic_needs = self.detect_panic(state, now);

        if !panic_needs.is_empty() {
            self.fire_panic(&panic_needs);
        }

        DashboardSnapshot {
            generated_at: now,
            needs,
            supplies,
            shipments,
            critical_missing,
            category_fulfillment,
            category_allocatable,
            panic_needs,
        }
    }

    fn need_stats(&self, state: &ReliefState) -> NeedStats {
        let mut stats = NeedStats {
            total: 0,
            fulfilled: 0,
            partially_fulfilled: 0,
            unfulfilled: 0,
            percent_met: 100.0,
        };
        let mut total_required: u64 = 0;
        let mut total_fulfilled: u64 = 0;

        for need in state.needs().values().filter(|n| !n.is_deleted()) {
            stats.total += 1;
            let pct = need.fulfillment_percent();
            if pct >= 100.0 {
                stats.fulfilled += 1;
            } else if pct > 0.0 {
                stats.partially_fulfilled += 1;
            } else {
                stats.unfulfilled += 1;
            }
            total_required += u64::from(need.quantity_required());
            total_fulfilled += u64::from(need.quantity_fulfilled());
        }

        if total_required > 0 {
            stats.percent_met = total_fulfilled as f64 / total_required as f64 * 100.0;
        }
        stats
    }

    fn supply_stats(&self, state: &ReliefState) -> SupplyStats {
        let mut stats = SupplyStats {
            total: 0,
            depleted: 0,
            low_stock: 0,
        };

        for supply in state.supplies().values().filter(|s| !s.is_deleted()) {
            stats.total += 1;
            if supply.allocatable() == 0 {
                stats.depleted += 1;
            } else if supply.is_below_minimum() {
                stats.low_stock += 1;
            }
        }
        stats
    }

    fn shipment_stats(&self, state: &ReliefState, now: DateTime<Utc>) -> ShipmentStats {
        let mut stats = ShipmentStats {
            active: 0,
            pending: 0,
            in_transit: 0,
            delivered_today: 0,
        };

        for shipment in state.shipments().values().filter(|s| !s.is_deleted()) {
            if shipment.is_active() {
                stats.active += 1;
            }
            match shipment.status() {
                ShipmentStatus::Pending | ShipmentStatus::Approved => stats.pending += 1,
                ShipmentStatus::InTransit
                | ShipmentStatus::AtDistributionCenter
                | ShipmentStatus::OutForDelivery => stats.in_transit += 1,
                ShipmentStatus::Delivered => {
                    if shipment
                        .actual_delivery()
                        .is_some_and(|at| at.date_naive() == now.date_naive())
                    {
                        stats.delivered_today += 1;
                    }
                }
                ShipmentStatus::Cancelled | ShipmentStatus::Failed => {}
            }
        }
        stats
    }

    /// Completely unserved needs, most urgent first, longest wait on ties
    fn critical_missing(&self, state: &ReliefState, now: DateTime<Utc>) -> Vec<CriticalNeed> {
        let mut rows: Vec<CriticalNeed> = state
            .needs()
            .values()
            .filter(|n| !n.is_deleted() && n.fulfillment_percent() == 0.0)
            .map(|n| CriticalNeed {
                need_id: n.id(),
                title: n.title().to_string(),
                category: n.category().to_string(),
                effective_score: self.priority.effective_score(n, now),
                hours_waiting: n.hours_waiting(now),
                remaining: n.remaining(),
            })
            .collect();

        rows.sort_by(|a, b| {
            a.effective_score
                .partial_cmp(&b.effective_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    b.hours_waiting
                        .partial_cmp(&a.hours_waiting)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
        });
        rows.truncate(self.config.top_critical_count);
        rows
    }

    fn category_breakdown(
        &self,
        state: &ReliefState,
    ) -> (BTreeMap<String, f64>, BTreeMap<String, u32>) {
        let mut required: BTreeMap<String, u64> = BTreeMap::new();
        let mut fulfilled: BTreeMap<String, u64> = BTreeMap::new();

        for need in state.needs().values().filter(|n| !n.is_deleted()) {
            let key = need.category().to_string();
            *required.entry(key.clone()).or_default() += u64::from(need.quantity_required());
            *fulfilled.entry(key).or_default() += u64::from(need.quantity_fulfilled());
        }

        let category_fulfillment = required
            .into_iter()
            .map(|(category, req)| {
                let done = fulfilled.get(&category).copied().unwrap_or(0);
                let pct = if req > 0 {
                    done as f64 / req as f64 * 100.0
                } else {
                    100.0
                };
                (category, pct)
            })
            .collect();

        let mut category_allocatable: BTreeMap<String, u32> = BTreeMap::new();
        for supply in state.supplies().values().filter(|s| !s.is_deleted()) {
            *category_allocatable
                .entry(supply.category().to_string())
                .or_default() += supply.allocatable();
        }

        (category_fulfillment, category_allocatable)
    }

    /// The panic predicate, applied per need; output sorted worst-first
    fn detect_panic(&self, state: &ReliefState, now: DateTime<Utc>) -> Vec<PanicNeed> {
        let threshold = self.config.panic_threshold_hours;

        let mut panicking: Vec<PanicNeed> = state
            .needs()
            .values()
            .filter(|n| !n.is_deleted() && !n.is_fulfilled())
            .filter(|n| self.priority.effective_level(n, now) == PriorityLevel::Critical)
            .filter(|n| {
                let waited = n.hours_waiting(now);
                waited >= threshold
                    && (n.fulfillment_percent() == 0.0 || waited > 2.0 * threshold)
            })
            .map(|n| PanicNeed {
                need_id: n.id(),
                title: n.title().to_string(),
                base_priority: n.priority(),
                hours_waiting: n.hours_waiting(now),
                fulfillment_percent: n.fulfillment_percent(),
            })
            .collect();

        // Descending (waited - threshold); threshold is constant, so this is
        // descending wait time
        panicking.sort_by(|a, b| {
            b.hours_waiting
                .partial_cmp(&a.hours_waiting)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        panicking
    }

    /// Emit the audit event and notify observers, once per snapshot
    fn fire_panic(&self, panic_needs: &[PanicNeed]) {
        if let Some(sink) = &self.sink {
            let worst = &panic_needs[0];
            sink.record(
                AuditEntry::new(
                    AuditEventType::PanicModeTriggered,
                    format!(
                        "{} critical need(s) starving; worst has waited {:.1}h",
                        panic_needs.len(),
                        worst.hours_waiting
                    ),
                )
                .with_entity(worst.need_id, "Need")
                .with_priority(PriorityLevel::Critical)
                .with_metadata(
                    "panic_count",
                    MetadataValue::Integer(panic_needs.len() as i64),
                ),
            );
        }

        for observer in &self.observers {
            let outcome =
                catch_unwind(AssertUnwindSafe(|| observer.on_panic_mode_triggered(panic_needs)));
            if outcome.is_err() {
                if let Some(sink) = &self.sink {
                    sink.record(AuditEntry::new(
                        AuditEventType::SystemAlert,
                        "observer panicked in on_panic_mode_triggered",
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::location::Location;
    use crate::models::need::Need;
    use crate::models::supply::Supply;
    use chrono::Duration;

    #[test]
    fn test_empty_state_snapshot() {
        let dashboard = Dashboard::new(DashboardConfig::default());
        let snapshot = dashboard.snapshot(&ReliefState::new(), Utc::now());

        assert_eq!(snapshot.needs.total, 0);
        assert_eq!(snapshot.needs.percent_met, 100.0);
        assert!(snapshot.critical_missing.is_empty());
        assert!(!snapshot.panic_active());
    }

    #[test]
    fn test_supply_counters_split_depleted_and_low() {
        let now = Utc::now();
        let mut state = ReliefState::new();

        let mut depleted = Supply::new("a", "Food", 5, "u", Location::unknown("d"));
        depleted.reserve(5);
        state.add_supply(depleted);

        let low = Supply::new("b", "Food", 3, "u", Location::unknown("d")).with_minimum_stock(10);
        state.add_supply(low);

        state.add_supply(Supply::new("c", "Food", 50, "u", Location::unknown("d")));

        let dashboard = Dashboard::new(DashboardConfig::default());
        let snapshot = dashboard.snapshot(&state, now);

        assert_eq!(snapshot.supplies.total, 3);
        assert_eq!(snapshot.supplies.depleted, 1);
        assert_eq!(snapshot.supplies.low_stock, 1);
    }

    #[test]
    fn test_partially_served_need_panics_only_past_double_threshold() {
        let now = Utc::now();
        let dashboard = Dashboard::new(DashboardConfig::default());

        // Critical, 30% served, waited 1.5h: inside [threshold, 2x], no panic
        let mut inside = Need::new(
            "n",
            "Medical",
            PriorityLevel::Critical,
            10,
            "u",
            Location::unknown("x"),
        )
        .with_created_at(now - Duration::minutes(90));
        inside.add_fulfilled_quantity(3);

        let mut state = ReliefState::new();
        state.add_need(inside);
        assert!(!dashboard.snapshot(&state, now).panic_active());

        // Same shape but waited 2.5h: past double threshold, panics
        let mut past = Need::new(
            "n",
            "Medical",
            PriorityLevel::Critical,
            10,
            "u",
            Location::unknown("x"),
        )
        .with_created_at(now - Duration::minutes(150));
        past.add_fulfilled_quantity(3);

        let mut state = ReliefState::new();
        state.add_need(past);
        assert!(dashboard.snapshot(&state, now).panic_active());
    }

    #[test]
    fn test_panic_sorted_worst_first() {
        let now = Utc::now();
        let dashboard = Dashboard::new(DashboardConfig::default());
        let mut state = ReliefState::new();

        let newer = Need::new(
            "newer",
            "Medical",
            PriorityLevel::Critical,
            10,
            "u",
            Location::unknown("x"),
        )
        .with_created_at(now - Duration::hours(2));
        let older = Need::new(
            "older",
            "Medical",
            PriorityLevel::Critical,
            10,
            "u",
            Location::unknown("x"),
        )
        .with_created_at(now - Duration::hours(8));

        state.add_need(newer);
        state.add_need(older);

        let snapshot = dashboard.snapshot(&state, now);
        assert_eq!(snapshot.panic_needs.len(), 2);
        assert_eq!(snapshot.panic_needs[0].title, "older");
    }
}
