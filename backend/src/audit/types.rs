//! Audit entry types
//!
//! Structured events describing every significant state change in the
//! coordinator. Entries are append-only records: once handed to a sink
//! they are never mutated. Enum values serialize as their variant names so
//! exported logs stay greppable.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::need::PriorityLevel;

/// Kind of event an audit entry describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditEventType {
    NeedCreated,
    NeedUpdated,
    NeedFulfilled,
    SupplyCreated,
    SupplyUpdated,
    SupplyDepleted,
    MatchMade,
    MatchFailed,
    ShipmentCreated,
    ShipmentDispatched,
    ShipmentDelivered,
    ShipmentCancelled,
    PanicModeTriggered,
    SystemAlert,
    UserAction,
}

impl std::fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Value of one metadata field
///
/// A closed sum: sinks accept exactly these shapes and nothing else.
/// Serialized untagged, so `{"count": 3, "source": "cli"}` round-trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Id(Uuid),
    Text(String),
}

/// One structured audit record
///
/// # Example
/// ```
/// use relief_coordinator_core_rs::audit::{AuditEntry, AuditEventType, MetadataValue};
/// use uuid::Uuid;
///
/// let entity = Uuid::new_v4();
/// let entry = AuditEntry::new(AuditEventType::MatchMade, "allocated 120 units")
///     .with_entity(entity, "Need")
///     .with_user("dispatcher-7")
///     .with_metadata("total_allocated", MetadataValue::Integer(120));
///
/// assert_eq!(entry.event_type, AuditEventType::MatchMade);
/// assert_eq!(entry.entity_id, Some(entity));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event_type: AuditEventType,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<PriorityLevel>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, MetadataValue>,
}

impl AuditEntry {
    /// Create an entry stamped with the current time
    pub fn new(event_type: AuditEventType, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event_type,
            message: message.into(),
            entity_id: None,
            entity_type: None,
            user_id: None,
            priority: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Attach the entity the event is about (builder pattern)
    pub fn with_entity(mut self, entity_id: Uuid, entity_type: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id);
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Attach the acting user (builder pattern)
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Attach a priority level (builder pattern)
    pub fn with_priority(mut self, priority: PriorityLevel) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Attach one metadata field (builder pattern)
    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Override the timestamp (builder pattern), for replay and tests
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
