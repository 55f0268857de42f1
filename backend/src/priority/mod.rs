//! Effective-priority scoring
//!
//! Maps each need to a continuous urgency score in `[0.0, 3.0]` where
//! **lower means more urgent**, then derives a discrete level for display
//! and gating. The score combines:
//!
//! - the base priority level (Critical=0 .. Low=3)
//! - a logarithmic **aging bonus** once the need has waited past a
//!   per-level threshold (smooth, bounded escalation)
//! - a **deadline bonus** as the deadline approaches or passes
//! - a **near-completion bonus** for needs that are almost done
//!
//! Bonuses are subtracted from the base, so a request can only become more
//! urgent as it waits. Escalation is capped so a level never overshoots
//! Critical.
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use relief_coordinator_core_rs::models::{Location, Need, PriorityLevel};
//! use relief_coordinator_core_rs::priority::PriorityManager;
//!
//! let manager = PriorityManager::default();
//! let now = Utc::now();
//!
//! // A Low-priority request that has waited 200 hours outranks its base level
//! let old = Need::new("tents", "Shelter", PriorityLevel::Low, 40, "pieces",
//!                     Location::unknown("camp"))
//!     .with_created_at(now - Duration::hours(200));
//!
//! assert_eq!(manager.effective_level(&old, now), PriorityLevel::Critical);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::need::{Need, PriorityLevel};

/// Hours a need may wait at each base level before escalation starts
///
/// Each threshold names the first promotion it drives; the full escalation
/// is bounded so Low can climb at most to Critical.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgingConfig {
    /// Hours before a Low need starts escalating
    pub low_to_medium_hours: f64,

    /// Hours before a Medium need starts escalating
    pub medium_to_high_hours: f64,

    /// Hours before a High need starts escalating
    pub high_to_critical_hours: f64,
}

impl Default for AgingConfig {
    fn default() -> Self {
        Self {
            low_to_medium_hours: 24.0,
            medium_to_high_hours: 12.0,
            high_to_critical_hours: 6.0,
        }
    }
}

impl AgingConfig {
    /// Tightened thresholds for active-disaster operation
    pub fn emergency() -> Self {
        Self {
            low_to_medium_hours: 6.0,
            medium_to_high_hours: 3.0,
            high_to_critical_hours: 1.0,
        }
    }
}

/// Computes effective urgency scores and priority-ordered views of needs
#[derive(Debug, Clone, Default)]
pub struct PriorityManager {
    aging: AgingConfig,
}

impl PriorityManager {
    pub fn new(aging: AgingConfig) -> Self {
        Self { aging }
    }

    pub fn aging(&self) -> &AgingConfig {
        &self.aging
    }

    /// Continuous urgency score in `[0.0, 3.0]`; lower = more urgent
    ///
    /// A need with zero wait, no deadline pressure, and no completion bonus
    /// scores exactly its base level's numeric value.
    pub fn effective_score(&self, need: &Need, now: DateTime<Utc>) -> f64 {
        let base = need.priority().numeric();
        let waited = need.hours_waiting(now);

        let aging = self.aging_bonus(need.priority(), waited);
        let deadline = deadline_bonus(need, now);
        let completion = completion_bonus(need);

        (base - aging - deadline - completion).clamp(0.0, 3.0)
    }

    /// Discrete level derived from the continuous score
    pub fn effective_level(&self, need: &Need, now: DateTime<Utc>) -> PriorityLevel {
        level_for_score(self.effective_score(need, now))
    }

    /// Needs in ascending score order (most urgent first)
    ///
    /// Soft-deleted and fulfilled needs are excluded. Ties are broken by
    /// creation timestamp, older first; the sort is stable so equal
    /// (score, created_at) pairs keep their input order.
    pub fn prioritize<'a, I>(&self, needs: I, now: DateTime<Utc>) -> Vec<&'a Need>
    where
        I: IntoIterator<Item = &'a Need>,
    {
        let mut scored: Vec<(f64, &Need)> = needs
            .into_iter()
            .filter(|n| !n.is_deleted() && !n.is_fulfilled())
            .map(|n| (self.effective_score(n, now), n))
            .collect();

        scored.sort_by(|(score_a, need_a), (score_b, need_b)| {
            score_a
                .partial_cmp(score_b)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| need_a.created_at().cmp(&need_b.created_at()))
        });

        scored.into_iter().map(|(_, n)| n).collect()
    }

    /// Logarithmic escalation past the per-level wait threshold
    ///
    /// Critical has nowhere to climb; the other levels are capped so they
    /// cannot escalate past Critical.
    fn aging_bonus(&self, base: PriorityLevel, waited_hours: f64) -> f64 {
        let (threshold, limit) = match base {
            PriorityLevel::Critical => return 0.0,
            PriorityLevel::High => (self.aging.high_to_critical_hours, 1.0),
            PriorityLevel::Medium => (self.aging.medium_to_high_hours, 2.0),
            PriorityLevel::Low => (self.aging.low_to_medium_hours, 3.0),
        };

        if waited_hours <= threshold {
            return 0.0;
        }
        (waited_hours / threshold + 1.0).log2().min(limit)
    }
}

/// Deadline pressure: 2.0 once passed (h <= 0), 1.0 within 6h, 0.5 within 24h
fn deadline_bonus(need: &Need, now: DateTime<Utc>) -> f64 {
    let Some(deadline) = need.deadline() else {
        return 0.0;
    };
    let hours_left = (deadline - now).num_milliseconds() as f64 / 3_600_000.0;

    if hours_left <= 0.0 {
        2.0
    } else if hours_left <= 6.0 {
        1.0
    } else if hours_left <= 24.0 {
        0.5
    } else {
        0.0
    }
}

/// Almost-done requests get a nudge so the last slice ships
fn completion_bonus(need: &Need) -> f64 {
    if need.fulfillment_percent() >= 80.0 && !need.is_fulfilled() {
        0.5
    } else {
        0.0
    }
}

/// Score-to-level mapping shared by display and panic gating
fn level_for_score(score: f64) -> PriorityLevel {
    if score < 0.5 {
        PriorityLevel::Critical
    } else if score < 1.5 {
        PriorityLevel::High
    } else if score < 2.5 {
        PriorityLevel::Medium
    } else {
        PriorityLevel::Low
    }
}
