//! Coordinator state
//!
//! `ReliefState` owns every domain entity in the system: needs, supplies,
//! and shipments, each indexed by id. The matching engine and dashboard
//! borrow this container; ownership never transfers.
//!
//! # Critical Invariants
//!
//! 1. **Id uniqueness**: each entity id appears exactly once per collection
//! 2. **Deterministic iteration**: BTreeMap keys give a stable visit order
//! 3. Soft-deleted entities stay in the maps (retrievable by id) and are
//!    filtered by consumers, not by this container

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::models::need::Need;
use crate::models::shipment::Shipment;
use crate::models::supply::Supply;

/// In-memory owner of all needs, supplies, and shipments
///
/// # Example
/// ```
/// use relief_coordinator_core_rs::models::{Location, Need, PriorityLevel, ReliefState, Supply};
///
/// let mut state = ReliefState::new();
///
/// let need = Need::new(
///     "Water for Camp East", "Water", PriorityLevel::High,
///     300, "liters", Location::unknown("Camp East"),
/// );
/// let need_id = need.id();
/// state.add_need(need);
///
/// state.add_supply(Supply::new(
///     "Bottled water", "Water", 500, "liters", Location::unknown("Depot 4"),
/// ));
///
/// assert_eq!(state.num_needs(), 1);
/// assert_eq!(state.num_supplies(), 1);
/// assert!(state.get_need(&need_id).is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReliefState {
    needs: BTreeMap<Uuid, Need>,
    supplies: BTreeMap<Uuid, Supply>,
    shipments: BTreeMap<Uuid, Shipment>,
}

impl ReliefState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a need
    ///
    /// # Panics
    /// Panics if a need with the same id already exists (caller bug).
    pub fn add_need(&mut self, need: Need) {
        let id = need.id();
        assert!(!self.needs.contains_key(&id), "need id {} already exists", id);
        self.needs.insert(id, need);
    }

    /// Add a supply
    ///
    /// # Panics
    /// Panics if a supply with the same id already exists (caller bug).
    pub fn add_supply(&mut self, supply: Supply) {
        let id = supply.id();
        assert!(
            !self.supplies.contains_key(&id),
            "supply id {} already exists",
            id
        );
        self.supplies.insert(id, supply);
    }

    /// Add a shipment
    ///
    /// # Panics
    /// Panics if a shipment with the same id already exists (caller bug).
    pub fn add_shipment(&mut self, shipment: Shipment) {
        let id = shipment.id();
        assert!(
            !self.shipments.contains_key(&id),
            "shipment id {} already exists",
            id
        );
        self.shipments.insert(id, shipment);
    }

    pub fn get_need(&self, id: &Uuid) -> Option<&Need> {
        self.needs.get(id)
    }

    pub fn get_need_mut(&mut self, id: &Uuid) -> Option<&mut Need> {
        self.needs.get_mut(id)
    }

    pub fn get_supply(&self, id: &Uuid) -> Option<&Supply> {
        self.supplies.get(id)
    }

    pub fn get_supply_mut(&mut self, id: &Uuid) -> Option<&mut Supply> {
        self.supplies.get_mut(id)
    }

    pub fn get_shipment(&self, id: &Uuid) -> Option<&Shipment> {
        self.shipments.get(id)
    }

    pub fn get_shipment_mut(&mut self, id: &Uuid) -> Option<&mut Shipment> {
        self.shipments.get_mut(id)
    }

    pub fn needs(&self) -> &BTreeMap<Uuid, Need> {
        &self.needs
    }

    pub fn supplies(&self) -> &BTreeMap<Uuid, Supply> {
        &self.supplies
    }

    pub fn shipments(&self) -> &BTreeMap<Uuid, Shipment> {
        &self.shipments
    }

    pub fn num_needs(&self) -> usize {
        self.needs.len()
    }

    pub fn num_supplies(&self) -> usize {
        self.supplies.len()
    }

    pub fn num_shipments(&self) -> usize {
        self.shipments.len()
    }

    /// Units still outstanding across all live, unfulfilled needs
    pub fn total_outstanding_quantity(&self) -> u64 {
        self.needs
            .values()
            .filter(|n| !n.is_deleted() && !n.is_fulfilled())
            .map(|n| u64::from(n.remaining()))
            .sum()
    }

    /// Units currently allocatable across all live supplies
    pub fn total_allocatable_quantity(&self) -> u64 {
        self.supplies
            .values()
            .filter(|s| !s.is_deleted())
            .map(|s| u64::from(s.allocatable()))
            .sum()
    }
}
