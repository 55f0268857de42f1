//! Shipment model
//!
//! A shipment moves allocated supply toward a need. Its lifecycle is a
//! small state machine:
//!
//! ```text
//! Pending -> Approved -> InTransit -> AtDistributionCenter -> OutForDelivery -> Delivered
//!                            |                                      ^
//!                            +--------------------------------------+--> Delivered
//! any non-terminal state -> Cancelled | Failed
//! ```
//!
//! Terminal states (`Delivered`, `Cancelled`, `Failed`) have no exits.
//! Illegal transitions are rejected (`false`, state unchanged); legal ones
//! bump the update timestamp and apply their timestamp side effects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::entity::EntityMeta;
use crate::models::location::Location;
use crate::models::need::PriorityLevel;

/// Lifecycle status of a shipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipmentStatus {
    Pending,
    Approved,
    InTransit,
    AtDistributionCenter,
    OutForDelivery,
    Delivered,
    Cancelled,
    Failed,
}

impl ShipmentStatus {
    /// Whether the status is terminal (no outgoing transitions)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ShipmentStatus::Delivered | ShipmentStatus::Cancelled | ShipmentStatus::Failed
        )
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ShipmentStatus::Pending => "Pending",
            ShipmentStatus::Approved => "Approved",
            ShipmentStatus::InTransit => "InTransit",
            ShipmentStatus::AtDistributionCenter => "AtDistributionCenter",
            ShipmentStatus::OutForDelivery => "OutForDelivery",
            ShipmentStatus::Delivered => "Delivered",
            ShipmentStatus::Cancelled => "Cancelled",
            ShipmentStatus::Failed => "Failed",
        };
        write!(f, "{name}")
    }
}

/// A dispatch of supplies from an origin to a destination
///
/// # Example
/// ```
/// use chrono::Utc;
/// use relief_coordinator_core_rs::models::{Location, PriorityLevel, Shipment, ShipmentStatus};
///
/// let mut shipment = Shipment::new(
///     Location::new(41.0, 29.0, "Depot 4"),
///     Location::new(39.9, 32.8, "Camp East"),
///     120,
///     PriorityLevel::High,
/// );
/// assert!(shipment.tracking_code().starts_with("DL-"));
///
/// let now = Utc::now();
/// assert!(shipment.transition_to(ShipmentStatus::Approved, now));
/// assert!(shipment.transition_to(ShipmentStatus::InTransit, now));
/// assert!(shipment.actual_dispatch().is_some());
///
/// // Skipping straight back to Pending is rejected
/// assert!(!shipment.transition_to(ShipmentStatus::Pending, now));
/// assert_eq!(shipment.status(), ShipmentStatus::InTransit);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    meta: EntityMeta,

    /// Human-readable display code; NOT a uniqueness key (the entity id is)
    tracking_code: String,

    status: ShipmentStatus,
    priority: PriorityLevel,

    /// Need this shipment serves, when known
    need_id: Option<Uuid>,

    /// Supply this shipment draws from, when known
    supply_id: Option<Uuid>,

    origin: Location,
    destination: Location,

    /// Units on board (positive)
    quantity: u32,

    scheduled_dispatch: Option<DateTime<Utc>>,
    actual_dispatch: Option<DateTime<Utc>>,
    estimated_arrival: Option<DateTime<Utc>>,
    actual_delivery: Option<DateTime<Utc>>,

    carrier: String,
    vehicle: String,
    driver: String,
    recipient: String,

    notes: String,
    proof_of_delivery: String,
}

impl Shipment {
    /// Create a new shipment in `Pending` state
    ///
    /// # Panics
    /// Panics if `quantity` is zero.
    pub fn new(
        origin: Location,
        destination: Location,
        quantity: u32,
        priority: PriorityLevel,
    ) -> Self {
        assert!(quantity > 0, "quantity must be positive");

        let meta = EntityMeta::new();
        let tracking_code = generate_tracking_code(meta.created_at());

        Self {
            meta,
            tracking_code,
            status: ShipmentStatus::Pending,
            priority,
            need_id: None,
            supply_id: None,
            origin,
            destination,
            quantity,
            scheduled_dispatch: None,
            actual_dispatch: None,
            estimated_arrival: None,
            actual_delivery: None,
            carrier: String::new(),
            vehicle: String::new(),
            driver: String::new(),
            recipient: String::new(),
            notes: String::new(),
            proof_of_delivery: String::new(),
        }
    }

    /// Link the need being served (builder pattern)
    pub fn for_need(mut self, need_id: Uuid) -> Self {
        self.need_id = Some(need_id);
        self
    }

    /// Link the source supply (builder pattern)
    pub fn from_supply(mut self, supply_id: Uuid) -> Self {
        self.supply_id = Some(supply_id);
        self
    }

    /// Set the planned dispatch time (builder pattern)
    pub fn with_scheduled_dispatch(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_dispatch = Some(at);
        self
    }

    /// Set the estimated arrival time (builder pattern)
    pub fn with_estimated_arrival(mut self, at: DateTime<Utc>) -> Self {
        self.estimated_arrival = Some(at);
        self
    }

    /// Set carrier metadata (builder pattern)
    pub fn with_carrier(
        mut self,
        carrier: impl Into<String>,
        vehicle: impl Into<String>,
        driver: impl Into<String>,
    ) -> Self {
        self.carrier = carrier.into();
        self.vehicle = vehicle.into();
        self.driver = driver.into();
        self
    }

    /// Set the receiving party (builder pattern)
    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = recipient.into();
        self
    }

    /// Set free-text notes (builder pattern)
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
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

    pub fn tracking_code(&self) -> &str {
        &self.tracking_code
    }

    pub fn status(&self) -> ShipmentStatus {
        self.status
    }

    pub fn priority(&self) -> PriorityLevel {
        self.priority
    }

    pub fn need_id(&self) -> Option<Uuid> {
        self.need_id
    }

    pub fn supply_id(&self) -> Option<Uuid> {
        self.supply_id
    }

    pub fn origin(&self) -> &Location {
        &self.origin
    }

    pub fn destination(&self) -> &Location {
        &self.destination
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn scheduled_dispatch(&self) -> Option<DateTime<Utc>> {
        self.scheduled_dispatch
    }

    pub fn actual_dispatch(&self) -> Option<DateTime<Utc>> {
        self.actual_dispatch
    }

    pub fn estimated_arrival(&self) -> Option<DateTime<Utc>> {
        self.estimated_arrival
    }

    pub fn actual_delivery(&self) -> Option<DateTime<Utc>> {
        self.actual_delivery
    }

    pub fn carrier(&self) -> &str {
        &self.carrier
    }

    pub fn vehicle(&self) -> &str {
        &self.vehicle
    }

    pub fn driver(&self) -> &str {
        &self.driver
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn proof_of_delivery(&self) -> &str {
        &self.proof_of_delivery
    }

    /// Record proof of delivery (signature reference, photo id, ...)
    pub fn set_proof_of_delivery(&mut self, proof: impl Into<String>) {
        self.proof_of_delivery = proof.into();
        self.meta.touch();
    }

    /// Whether the shipment is still moving through the pipeline
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Whether an active shipment has blown past its estimated arrival
    pub fn is_delayed(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && matches!(self.estimated_arrival, Some(eta) if eta < now)
    }

    /// Attempt a status transition
    ///
    /// Returns `false` and leaves the state unchanged when the transition is
    /// not permitted. On success:
    /// - entering `InTransit` sets `actual_dispatch` if unset (first entry wins)
    /// - entering `Delivered` always sets `actual_delivery` to `now`
    /// - the update timestamp is bumped
    pub fn transition_to(&mut self, next: ShipmentStatus, now: DateTime<Utc>) -> bool {
        if !permits(self.status, next) {
            return false;
        }

        self.status = next;
        match next {
            ShipmentStatus::InTransit => {
                if self.actual_dispatch.is_none() {
                    self.actual_dispatch = Some(now);
                }
            }
            ShipmentStatus::Delivered => {
                self.actual_delivery = Some(now);
            }
            _ => {}
        }
        self.meta.touch();
        true
    }

    /// Soft-delete this shipment (idempotent)
    pub fn mark_deleted(&mut self) {
        self.meta.mark_deleted();
    }
}

/// The transition table
fn permits(from: ShipmentStatus, to: ShipmentStatus) -> bool {
    use ShipmentStatus::*;
    match (from, to) {
        (Pending, Approved) => true,
        (Approved, InTransit) => true,
        (InTransit, AtDistributionCenter | OutForDelivery | Delivered) => true,
        (AtDistributionCenter, OutForDelivery) => true,
        (OutForDelivery, Delivered) => true,
        (from, Cancelled | Failed) => !from.is_terminal(),
        _ => false,
    }
}

/// Display code: `DL-<UTC yyyyMMddHHmmss>-<6 uppercase hex>`
///
/// The suffix is the first 6 hex digits of a fresh v4 UUID. Collisions are
/// tolerated; uniqueness lives in the entity id.
fn generate_tracking_code(at: DateTime<Utc>) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("DL-{}-{}", at.format("%Y%m%d%H%M%S"), hex[..6].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipment() -> Shipment {
        Shipment::new(
            Location::unknown("depot"),
            Location::unknown("camp"),
            10,
            PriorityLevel::Medium,
        )
    }

    #[test]
    fn test_tracking_code_format() {
        let s = shipment();
        let code = s.tracking_code();
        let parts: Vec<&str> = code.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "DL");
        assert_eq!(parts[1].len(), 14);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn test_cancel_allowed_from_any_live_state() {
        let now = Utc::now();
        for target in [ShipmentStatus::Cancelled, ShipmentStatus::Failed] {
            let mut s = shipment();
            s.transition_to(ShipmentStatus::Approved, now);
            s.transition_to(ShipmentStatus::InTransit, now);
            assert!(s.transition_to(target, now));
            assert_eq!(s.status(), target);
        }
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        let now = Utc::now();
        let mut s = shipment();
        assert!(s.transition_to(ShipmentStatus::Cancelled, now));
        assert!(!s.transition_to(ShipmentStatus::Failed, now));
        assert!(!s.transition_to(ShipmentStatus::Approved, now));
        assert_eq!(s.status(), ShipmentStatus::Cancelled);
    }

    #[test]
    fn test_dispatch_timestamp_first_entry_wins() {
        let now = Utc::now();
        let mut s = shipment();
        s.transition_to(ShipmentStatus::Approved, now);
        assert!(s.transition_to(ShipmentStatus::InTransit, now));
        let first = s.actual_dispatch();
        assert!(first.is_some());

        // Delivery from InTransit stamps actual_delivery, not dispatch
        let later = now + chrono::Duration::hours(5);
        assert!(s.transition_to(ShipmentStatus::Delivered, later));
        assert_eq!(s.actual_dispatch(), first);
        assert_eq!(s.actual_delivery(), Some(later));
    }
}
