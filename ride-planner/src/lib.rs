//! Ride-share route planning core.
//!
//! Resolves geographic coordinates and driving routes between named
//! locations, going to the rate-limited external providers at most once
//! per unique lookup. The disk-backed stores in [`cache`] front the
//! provider adapters in [`providers`], coordinated by the cache-first
//! [`facade::ExternalLookup`].

pub mod cache;
pub mod config;
pub mod domain;
pub mod facade;
pub mod providers;
pub mod roster;
