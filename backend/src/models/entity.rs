//! Shared entity record
//!
//! Every domain entity (need, supply, shipment) embeds an `EntityMeta`
//! carrying its identity and lifecycle fields. This is deliberate
//! composition, not a trait hierarchy: no dispatch depends on it.
//!
//! # Critical Invariants
//!
//! 1. `id` and `created_at` are immutable after construction
//! 2. Every mutation of the owning entity bumps `updated_at`
//! 3. Soft deletion is idempotent and bumps `updated_at`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity, timestamps, and soft-delete flag shared by all entities
///
/// # Example
/// ```
/// use relief_coordinator_core_rs::models::entity::EntityMeta;
///
/// let mut meta = EntityMeta::new();
/// assert!(!meta.is_deleted());
///
/// meta.mark_deleted();
/// assert!(meta.is_deleted());
///
/// // Idempotent: a second call leaves the flag set
/// meta.mark_deleted();
/// assert!(meta.is_deleted());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMeta {
    /// Stable opaque identifier (v4 UUID)
    id: Uuid,

    /// Creation timestamp (UTC), immutable after construction
    created_at: DateTime<Utc>,

    /// Last mutation timestamp (UTC)
    updated_at: DateTime<Utc>,

    /// Soft-delete flag; deleted entities stay retrievable by id
    is_deleted: bool,
}

impl EntityMeta {
    /// Create a fresh record stamped with the current wall-clock time
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            is_deleted: false,
        }
    }

    /// Get the entity identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Get the last-update timestamp
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Check the soft-delete flag
    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    /// Bump the update timestamp; called by every mutator of the owner
    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Soft-delete the entity (idempotent)
    pub fn mark_deleted(&mut self) {
        self.is_deleted = true;
        self.touch();
    }

    /// Override both timestamps, for hosts rehydrating records whose
    /// creation time predates this process
    pub(crate) fn set_created_at(&mut self, created_at: DateTime<Utc>) {
        self.created_at = created_at;
        self.updated_at = created_at;
    }
}

impl Default for EntityMeta {
    fn default() -> Self {
        Self::new()
    }
}
