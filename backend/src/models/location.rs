//! Location value type
//!
//! An immutable coordinate + address pair used by needs, supplies, and
//! shipments. The coordinate pair (0.0, 0.0) is reserved as "unknown":
//! distance computations treat it as absent rather than as a point in the
//! Gulf of Guinea.
//!
//! Equality compares latitude, longitude, and address only; two locations
//! equal under this relation are interchangeable for scoring.

use serde::{Deserialize, Serialize};

/// Mean earth radius in kilometres, used by the Haversine formula
const EARTH_RADIUS_KM: f64 = 6371.0;

/// An immutable geographic location
///
/// # Example
/// ```
/// use relief_coordinator_core_rs::models::location::Location;
///
/// let warehouse = Location::new(41.0082, 28.9784, "Depot 4, Istanbul");
/// let camp = Location::new(39.9334, 32.8597, "Camp East, Ankara");
///
/// let km = warehouse.distance_km(&camp).unwrap();
/// assert!(km > 300.0 && km < 500.0);
///
/// // (0, 0) means "coordinates unknown", not Null Island
/// let unknown = Location::new(0.0, 0.0, "somewhere");
/// assert!(warehouse.distance_km(&unknown).is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    latitude: f64,
    longitude: f64,
    address: String,
    city: String,
    region: String,
}

impl Location {
    /// Create a location from coordinates and a free-text address
    pub fn new(latitude: f64, longitude: f64, address: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            address: address.into(),
            city: String::new(),
            region: String::new(),
        }
    }

    /// Create a location with no known coordinates
    pub fn unknown(address: impl Into<String>) -> Self {
        Self::new(0.0, 0.0, address)
    }

    /// Set the city (builder pattern)
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    /// Set the region (builder pattern)
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Whether this location carries usable coordinates
    ///
    /// The exact pair (0.0, 0.0) is the "unknown" sentinel.
    pub fn has_coordinates(&self) -> bool {
        !(self.latitude == 0.0 && self.longitude == 0.0)
    }

    /// Great-circle distance to another location in kilometres
    ///
    /// Returns `None` when either side has unknown coordinates, so callers
    /// can distinguish "far away" from "position not known".
    pub fn distance_km(&self, other: &Location) -> Option<f64> {
        if !self.has_coordinates() || !other.has_coordinates() {
            return None;
        }

        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

        Some(2.0 * EARTH_RADIUS_KM * a.sqrt().asin())
    }
}

impl PartialEq for Location {
    /// Latitude, longitude, and address participate; city/region are
    /// display-only and do not affect interchangeability.
    fn eq(&self, other: &Self) -> bool {
        self.latitude == other.latitude
            && self.longitude == other.longitude
            && self.address == other.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_zero_for_same_point() {
        let a = Location::new(50.0, 10.0, "a");
        let b = Location::new(50.0, 10.0, "b");
        let d = a.distance_km(&b).unwrap();
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn test_distance_known_pair() {
        // Paris <-> London is roughly 344 km
        let paris = Location::new(48.8566, 2.3522, "Paris");
        let london = Location::new(51.5074, -0.1278, "London");
        let d = paris.distance_km(&london).unwrap();
        assert!((d - 344.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn test_unknown_coordinates_yield_no_distance() {
        let known = Location::new(48.8566, 2.3522, "Paris");
        let unknown = Location::unknown("field report, no GPS");

        assert!(known.distance_km(&unknown).is_none());
        assert!(unknown.distance_km(&known).is_none());
        assert!(unknown.distance_km(&unknown).is_none());
    }

    #[test]
    fn test_equality_ignores_city_and_region() {
        let a = Location::new(1.0, 2.0, "same addr").with_city("X");
        let b = Location::new(1.0, 2.0, "same addr").with_city("Y").with_region("Z");
        assert_eq!(a, b);

        let c = Location::new(1.0, 2.1, "same addr");
        assert_ne!(a, c);
    }
}
