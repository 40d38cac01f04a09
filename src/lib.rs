//! Proximity clustering for field-service sites.
//!
//! Two independent pieces live here:
//!
//! - [`cluster`] groups entities into spatially coherent work clusters with
//!   DBSCAN over haversine distance, with explicit handling for entities that
//!   have no position, for runs that find no cluster and for clusterer failure.
//! - [`matrix`] wraps an external travel-time matrix service behind a
//!   time-expiring cache and derives per-leg travel metrics for a route.

pub mod cluster;
pub mod config;
pub mod logging;
pub mod matrix;

/// Log target for clustering
pub const TARGET_CLUSTER: &str = "cluster";
/// Log target for matrix lookups and cache activity
pub const TARGET_MATRIX: &str = "matrix";
