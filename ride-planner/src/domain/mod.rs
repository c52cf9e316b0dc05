//! Domain types for the ride-share planner.
//!
//! Core value types with their invariants enforced at construction:
//! location keys are normalized and never contain the route-key separator,
//! coordinates are finite and within range.

mod coordinate;
mod location;
mod route;

pub use coordinate::{Coordinate, InvalidCoordinate};
pub use location::{InvalidLocationKey, LocationKey};
pub use route::{LonLat, RouteRecord};
