//! Geocoding and routing provider capabilities.
//!
//! The facade consumes providers only through the two capability traits
//! below. Concrete adapters own wire-level request construction, pacing
//! between calls, and converting provider faults into absent results; no
//! provider error ever crosses the trait boundary.

mod error;
mod nominatim;
mod openroute;

pub use error::ProviderError;
pub use nominatim::{NominatimConfig, NominatimGeocoder};
pub use openroute::{OrsConfig, OrsRouter};

use crate::domain::{Coordinate, LocationKey, RouteRecord};

/// Capability to resolve a location key to a coordinate.
///
/// This abstraction lets the facade be tested with mock providers.
#[allow(async_fn_in_trait)]
pub trait Geocoder {
    /// Resolve `key` to a coordinate.
    ///
    /// Returns `None` both when the provider has no answer for the key and
    /// when the call fails outright; the distinction is the adapter's to
    /// log, not the caller's to handle.
    async fn geocode(&self, key: &LocationKey) -> Option<Coordinate>;
}

/// Capability to compute a driving route between two coordinates.
#[allow(async_fn_in_trait)]
pub trait RoutePlanner {
    /// Compute the route from `start` to `end`.
    ///
    /// The location keys are carried through so the returned record knows
    /// which cache slot it belongs to. Returns `None` when no route was
    /// found or the call failed.
    async fn route(
        &self,
        start: Coordinate,
        end: Coordinate,
        start_key: &LocationKey,
        end_key: &LocationKey,
    ) -> Option<RouteRecord>;
}
