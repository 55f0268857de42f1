//! Allocation records
//!
//! The output of a matching pass: which supplies fed which needs, in what
//! quantities, and at what match score. These are ledger entries describing
//! mutations that have already been committed; they hold ids and copied
//! display fields, never references into the state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One slice taken from one supply during a matching pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyAllocation {
    pub supply_id: Uuid,

    /// Supply name at allocation time, for display without a state lookup
    pub supply_name: String,

    /// Units taken from this supply
    pub quantity: u32,

    /// Match score the slice was selected at
    pub match_score: f64,

    /// Whether this slice exhausted the supply (`allocatable` hit 0)
    pub supply_depleted: bool,
}

/// Everything allocated to a single need during one matching pass
///
/// # Example
/// ```
/// use chrono::Utc;
/// use uuid::Uuid;
/// use relief_coordinator_core_rs::models::{Allocation, SupplyAllocation};
///
/// let allocation = Allocation {
///     need_id: Uuid::new_v4(),
///     need_title: "Drinking water".to_string(),
///     slices: vec![SupplyAllocation {
///         supply_id: Uuid::new_v4(),
///         supply_name: "Bottled water".to_string(),
///         quantity: 120,
///         match_score: 0.7,
///         supply_depleted: false,
///     }],
///     allocated_at: Utc::now(),
///     fulfillment_percent_after: 40.0,
/// };
///
/// assert_eq!(allocation.total_quantity(), 120);
/// assert!(!allocation.fully_fulfilled());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub need_id: Uuid,

    /// Need title at allocation time, for display without a state lookup
    pub need_title: String,

    /// Supply slices in consumption order (descending match score)
    pub slices: Vec<SupplyAllocation>,

    pub allocated_at: DateTime<Utc>,

    /// The need's fulfillment percentage once the pass committed
    pub fulfillment_percent_after: f64,
}

impl Allocation {
    /// Total units allocated to this need across all slices
    pub fn total_quantity(&self) -> u32 {
        self.slices.iter().map(|s| s.quantity).sum()
    }

    /// Whether the pass left the need completely met
    pub fn fully_fulfilled(&self) -> bool {
        self.fulfillment_percent_after >= 100.0
    }
}
