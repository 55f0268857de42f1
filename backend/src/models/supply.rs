//! Supply model
//!
//! Represents inventory held at a storage location. Quantity state is the
//! pair `available` / `reserved`; everything a matching pass may hand out is
//! `allocatable = available - reserved`.
//!
//! All quantity mutators follow the same contract: they return `false` and
//! change nothing when their precondition fails, and they never panic.
//!
//! # Critical Invariants
//!
//! 1. `0 <= reserved <= available` at every observable state
//! 2. Every successful mutator bumps the update timestamp

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::entity::EntityMeta;
use crate::models::location::Location;

/// Days before expiration at which stock counts as "expiring soon"
const EXPIRING_SOON_DAYS: i64 = 7;

/// Inventory of one item at one storage location
///
/// # Example
/// ```
/// use relief_coordinator_core_rs::models::{Location, Supply};
///
/// let mut supply = Supply::new(
///     "Bottled water 1L",
///     "Water",
///     500,
///     "liters",
///     Location::new(41.0, 29.0, "Depot 4"),
/// );
///
/// assert_eq!(supply.allocatable(), 500);
/// assert!(supply.reserve(200));
/// assert_eq!(supply.allocatable(), 300);
/// assert!(supply.deduct_stock(200));
/// assert_eq!(supply.available(), 300);
/// assert_eq!(supply.reserved(), 0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supply {
    meta: EntityMeta,

    name: String,

    /// Free-text category; matched case-insensitively against need categories
    category: String,

    /// Units physically on hand
    available: u32,

    /// Units promised to allocations but not yet deducted
    reserved: u32,

    unit: String,
    storage_location: Location,
    supplier: String,

    /// Expiration date for perishable stock
    expiration: Option<DateTime<Utc>>,

    /// Reorder threshold for the low-stock report
    minimum_stock: u32,

    sku: String,
    condition: String,
}

impl Supply {
    /// Create a new supply record
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        available: u32,
        unit: impl Into<String>,
        storage_location: Location,
    ) -> Self {
        Self {
            meta: EntityMeta::new(),
            name: name.into(),
            category: category.into(),
            available,
            reserved: 0,
            unit: unit.into(),
            storage_location,
            supplier: String::new(),
            expiration: None,
            minimum_stock: 0,
            sku: String::new(),
            condition: String::new(),
        }
    }

    /// Set the supplier (builder pattern)
    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = supplier.into();
        self
    }

    /// Set the expiration date (builder pattern)
    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// Set the minimum-stock threshold (builder pattern)
    pub fn with_minimum_stock(mut self, minimum_stock: u32) -> Self {
        self.minimum_stock = minimum_stock;
        self
    }

    /// Set the SKU (builder pattern)
    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = sku.into();
        self
    }

    /// Set the condition note (builder pattern)
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }

    /// Override the creation timestamp (builder pattern); see
    /// [`Need::with_created_at`](crate::models::Need::with_created_at)
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

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn available(&self) -> u32 {
        self.available
    }

    pub fn reserved(&self) -> u32 {
        self.reserved
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn storage_location(&self) -> &Location {
        &self.storage_location
    }

    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.expiration
    }

    pub fn minimum_stock(&self) -> u32 {
        self.minimum_stock
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// Units a matching pass may still hand out
    pub fn allocatable(&self) -> u32 {
        self.available.saturating_sub(self.reserved)
    }

    /// Whether the stock is past its expiration date
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expiration, Some(exp) if exp < now)
    }

    /// Whether the stock expires within the next seven days
    pub fn is_expiring_soon(&self, now: DateTime<Utc>) -> bool {
        match self.expiration {
            Some(exp) => exp >= now && exp <= now + Duration::days(EXPIRING_SOON_DAYS),
            None => false,
        }
    }

    /// Whether allocatable stock has fallen under the reorder threshold
    pub fn is_below_minimum(&self) -> bool {
        self.allocatable() < self.minimum_stock
    }

    /// Reserve units for a pending allocation
    ///
    /// Precondition: `0 < quantity <= allocatable`.
    pub fn reserve(&mut self, quantity: u32) -> bool {
        if quantity == 0 || quantity > self.allocatable() {
            return false;
        }
        self.reserved += quantity;
        self.meta.touch();
        true
    }

    /// Release a reservation without consuming stock
    ///
    /// Precondition: `0 < quantity <= reserved`.
    pub fn release_reservation(&mut self, quantity: u32) -> bool {
        if quantity == 0 || quantity > self.reserved {
            return false;
        }
        self.reserved -= quantity;
        self.meta.touch();
        true
    }

    /// Consume stock, retiring a matching reservation when one exists
    ///
    /// Precondition: `0 < quantity <= available`. `reserved` is decremented
    /// only when `reserved >= quantity`; a deduction without a prior
    /// reservation leaves `reserved` untouched (and is then clamped so it can
    /// never exceed what remains available).
    pub fn deduct_stock(&mut self, quantity: u32) -> bool {
        if quantity == 0 || quantity > self.available {
            return false;
        }
        self.available -= quantity;
        if self.reserved >= quantity {
            self.reserved -= quantity;
        }
        self.reserved = self.reserved.min(self.available);
        self.meta.touch();
        true
    }

    /// Add stock, leaving reservations alone
    ///
    /// Precondition: `quantity > 0`.
    pub fn add_stock(&mut self, quantity: u32) -> bool {
        if quantity == 0 {
            return false;
        }
        self.available = self.available.saturating_add(quantity);
        self.meta.touch();
        true
    }

    /// Restock after a delivery, clearing all reservations
    ///
    /// Precondition: `quantity > 0`.
    pub fn resupply(&mut self, quantity: u32) -> bool {
        if quantity == 0 {
            return false;
        }
        self.available = self.available.saturating_add(quantity);
        self.reserved = 0;
        self.meta.touch();
        true
    }

    /// Soft-delete this supply (idempotent)
    pub fn mark_deleted(&mut self) {
        self.meta.mark_deleted();
    }
}
