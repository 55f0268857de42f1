//! Need model
//!
//! Represents an outstanding request for supplies at a location.
//! Each need has:
//! - Title, description, free-text category
//! - Base priority level (Critical/High/Medium/Low)
//! - Required and fulfilled quantities (u32, whole units)
//! - Requester contact details and an optional hard deadline
//!
//! # Critical Invariants
//!
//! 1. `0 <= quantity_fulfilled <= quantity_required` at every observable state
//! 2. `quantity_required` is positive and immutable after construction

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::entity::EntityMeta;
use crate::models::location::Location;

/// Base urgency classification of a need or shipment
///
/// Ordering is by urgency: `Critical < High < Medium < Low`, matching the
/// numeric scale used by effective-priority scoring (lower = more urgent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriorityLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl PriorityLevel {
    /// Numeric base score: Critical=0.0, High=1.0, Medium=2.0, Low=3.0
    pub fn numeric(&self) -> f64 {
        match self {
            PriorityLevel::Critical => 0.0,
            PriorityLevel::High => 1.0,
            PriorityLevel::Medium => 2.0,
            PriorityLevel::Low => 3.0,
        }
    }
}

impl std::fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PriorityLevel::Critical => "Critical",
            PriorityLevel::High => "High",
            PriorityLevel::Medium => "Medium",
            PriorityLevel::Low => "Low",
        };
        write!(f, "{name}")
    }
}

/// An outstanding request for relief supplies
///
/// # Example
/// ```
/// use relief_coordinator_core_rs::models::{Location, Need, PriorityLevel};
///
/// let mut need = Need::new(
///     "Drinking water for Camp East",
///     "Water",
///     PriorityLevel::High,
///     300,
///     "liters",
///     Location::new(39.93, 32.85, "Camp East"),
/// );
///
/// assert_eq!(need.remaining(), 300);
/// assert!(need.add_fulfilled_quantity(120));
/// assert_eq!(need.remaining(), 180);
/// assert_eq!(need.fulfillment_percent(), 40.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Need {
    meta: EntityMeta,

    title: String,
    description: String,

    /// Free-text category (e.g. "Water", "Medical"); matched case-insensitively
    category: String,

    /// Base priority assigned by the requester; aging can only escalate it
    priority: PriorityLevel,

    /// Total units requested (positive)
    quantity_required: u32,

    /// Units delivered so far; clamped to `quantity_required`
    quantity_fulfilled: u32,

    unit: String,
    location: Location,

    requested_by: String,
    contact: String,

    /// Hard deadline, if the request has one
    deadline: Option<DateTime<Utc>>,

    notes: String,
}

impl Need {
    /// Create a new need
    ///
    /// # Panics
    /// Panics if `quantity_required` is zero.
    pub fn new(
        title: impl Into<String>,
        category: impl Into<String>,
        priority: PriorityLevel,
        quantity_required: u32,
        unit: impl Into<String>,
        location: Location,
    ) -> Self {
        assert!(quantity_required > 0, "quantity_required must be positive");

        Self {
            meta: EntityMeta::new(),
            title: title.into(),
            description: String::new(),
            category: category.into(),
            priority,
            quantity_required,
            quantity_fulfilled: 0,
            unit: unit.into(),
            location,
            requested_by: String::new(),
            contact: String::new(),
            deadline: None,
            notes: String::new(),
        }
    }

    /// Set the description (builder pattern)
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the deadline (builder pattern)
    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set requester name and contact details (builder pattern)
    pub fn with_requester(
        mut self,
        requested_by: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        self.requested_by = requested_by.into();
        self.contact = contact.into();
        self
    }

    /// Set free-text notes (builder pattern)
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Override the creation timestamp (builder pattern)
    ///
    /// For hosts restoring records from storage; also how tests model a
    /// request that has been waiting for some time.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.meta.set_created_at(created_at);
        self
    }

    pub fn id(&self) -> Uuid {
        self.meta.id()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.meta.created_at()
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.meta.updated_at()
    }

    pub fn is_deleted(&self) -> bool {
        self.meta.is_deleted()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn priority(&self) -> PriorityLevel {
        self.priority
    }

    pub fn quantity_required(&self) -> u32 {
        self.quantity_required
    }

    pub fn quantity_fulfilled(&self) -> u32 {
        self.quantity_fulfilled
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn requested_by(&self) -> &str {
        &self.requested_by
    }

    pub fn contact(&self) -> &str {
        &self.contact
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Units still outstanding
    pub fn remaining(&self) -> u32 {
        self.quantity_required.saturating_sub(self.quantity_fulfilled)
    }

    /// Whether the request has been completely met
    pub fn is_fulfilled(&self) -> bool {
        self.quantity_fulfilled >= self.quantity_required
    }

    /// Fulfillment as a percentage, capped at 100
    pub fn fulfillment_percent(&self) -> f64 {
        let pct = f64::from(self.quantity_fulfilled) / f64::from(self.quantity_required) * 100.0;
        pct.min(100.0)
    }

    /// Hours elapsed since the request was created
    ///
    /// Negative when `now` predates creation (clock skew at the host).
    pub fn hours_waiting(&self, now: DateTime<Utc>) -> f64 {
        (now - self.created_at()).num_milliseconds() as f64 / 3_600_000.0
    }

    /// Record delivered units, clamping at the required quantity
    ///
    /// Returns `false` (no-op) when `quantity` is zero; never panics.
    pub fn add_fulfilled_quantity(&mut self, quantity: u32) -> bool {
        if quantity == 0 {
            return false;
        }
        self.quantity_fulfilled = self
            .quantity_fulfilled
            .saturating_add(quantity)
            .min(self.quantity_required);
        self.meta.touch();
        true
    }

    /// Reverse previously recorded fulfillment, flooring at zero
    ///
    /// The rollback counterpart of [`add_fulfilled_quantity`]; a matching
    /// pass uses it to restore pre-pass state when the pass fails.
    ///
    /// [`add_fulfilled_quantity`]: Need::add_fulfilled_quantity
    pub fn revert_fulfilled(&mut self, quantity: u32) -> bool {
        if quantity == 0 {
            return false;
        }
        self.quantity_fulfilled = self.quantity_fulfilled.saturating_sub(quantity);
        self.meta.touch();
        true
    }

    /// Soft-delete this need (idempotent)
    pub fn mark_deleted(&mut self) {
        self.meta.mark_deleted();
    }
}
