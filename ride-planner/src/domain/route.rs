//! Route record type.

use super::LocationKey;

/// A point along a route geometry, as `(longitude, latitude)`.
///
/// The axis order follows GeoJSON, which is what the routing provider
/// returns and what the route cache file stores.
pub type LonLat = (f64, f64);

/// A directed driving route between two locations.
///
/// `geometry` is the provider-supplied polyline. It may be empty (a
/// zero-length route) but is always present on a constructed record;
/// "present" is what makes a persisted route entry complete.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRecord {
    /// Key of the starting location.
    pub start: LocationKey,

    /// Key of the destination location.
    pub end: LocationKey,

    /// Travel time in whole seconds.
    pub duration_secs: u32,

    /// Travel distance in meters.
    pub distance_m: f64,

    /// Polyline of the route as `(lon, lat)` pairs.
    pub geometry: Vec<LonLat>,
}

impl RouteRecord {
    /// The zero-length route from a location to itself.
    pub fn zero(start: LocationKey, end: LocationKey) -> Self {
        Self {
            start,
            end,
            duration_secs: 0,
            distance_m: 0.0,
            geometry: Vec::new(),
        }
    }

    /// Travel time in minutes.
    pub fn duration_mins(&self) -> f64 {
        f64::from(self.duration_secs) / 60.0
    }

    /// Travel distance in kilometers.
    pub fn distance_km(&self) -> f64 {
        self.distance_m / 1000.0
    }
}
