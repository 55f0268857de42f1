//! Domain models for the relief coordinator

pub mod allocation;
pub mod entity;
pub mod location;
pub mod need;
pub mod shipment;
pub mod state;
pub mod supply;

// Re-exports
pub use allocation::{Allocation, SupplyAllocation};
pub use entity::EntityMeta;
pub use location::Location;
pub use need::{Need, PriorityLevel};
pub use shipment::{Shipment, ShipmentStatus};
pub use state::ReliefState;
pub use supply::Supply;
