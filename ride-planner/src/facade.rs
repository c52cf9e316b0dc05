//! Cache-first lookup facade.
//!
//! Single entry point for coordinate and route resolution. Both operations
//! consult the persistent caches before touching a provider and write
//! provider results back, so each unique lookup goes over the network at
//! most once per cache lifetime (best-effort under concurrent callers: a
//! race on the same key may duplicate a provider call, never corrupt the
//! cache).

use tracing::{debug, warn};

use crate::cache::{CacheError, Caches};
use crate::domain::{Coordinate, LocationKey, RouteRecord};
use crate::providers::{Geocoder, RoutePlanner};

/// Cache-first facade over the geocoding and routing providers.
///
/// Provider faults are degraded to absent results by the adapters; the only
/// errors surfaced here are cache persistence failures from
/// [`save_caches`](Self::save_caches).
pub struct ExternalLookup<G, R> {
    caches: Caches,
    geocoder: G,
    planner: R,
}

impl<G: Geocoder, R: RoutePlanner> ExternalLookup<G, R> {
    /// Create a facade over the given caches and providers.
    pub fn new(caches: Caches, geocoder: G, planner: R) -> Self {
        Self {
            caches,
            geocoder,
            planner,
        }
    }

    /// Resolve a location key to a coordinate, consulting the cache first.
    ///
    /// Negative answers are cached too: once the provider reports a key as
    /// unknown, later calls return `None` without going back to it. A key
    /// either geocodes or it structurally does not, so the negative entry
    /// is a stable fact.
    pub async fn resolve_coordinate(&self, key: &LocationKey) -> Option<Coordinate> {
        if let Some(cached) = self.caches.coordinates.get(key).await {
            debug!(key = %key, found = cached.is_some(), "coordinate cache hit");
            return cached;
        }

        let resolved = self.geocoder.geocode(key).await;
        self.caches.coordinates.set(key.clone(), resolved).await;
        resolved
    }

    /// Resolve the driving route between two location keys.
    ///
    /// A route from a key to itself is answered locally with a zero-length
    /// record, touching neither cache nor provider. On a cache miss both
    /// endpoints are resolved through [`resolve_coordinate`]; if either is
    /// missing the route is unresolvable and the planner is never invoked.
    ///
    /// Failed route computations are not cached: unlike a key that does not
    /// geocode, a routing failure is usually transient (outage, rate limit)
    /// and worth retrying on the next call.
    ///
    /// [`resolve_coordinate`]: Self::resolve_coordinate
    pub async fn resolve_route(
        &self,
        start: &LocationKey,
        end: &LocationKey,
    ) -> Option<RouteRecord> {
        if start == end {
            return Some(RouteRecord::zero(start.clone(), end.clone()));
        }

        if let Some(cached) = self.caches.routes.get(start, end).await {
            debug!(start = %start, end = %end, "route cache hit");
            return Some(cached);
        }

        let start_coord = self.resolve_coordinate(start).await;
        let end_coord = self.resolve_coordinate(end).await;
        let (Some(start_coord), Some(end_coord)) = (start_coord, end_coord) else {
            warn!(start = %start, end = %end, "route unresolvable: missing endpoint coordinates");
            return None;
        };

        let record = self.planner.route(start_coord, end_coord, start, end).await?;
        self.caches.routes.set(&record).await;
        Some(record)
    }

    /// Flush both caches to disk.
    pub async fn save_caches(&self) -> Result<(), CacheError> {
        self.caches.save_all().await
    }

    /// Access the underlying caches.
    pub fn caches(&self) -> &Caches {
        &self.caches
    }
}
