//! Package cluster implements DBScan clustering on (lat, lon) with haversine
//! distance, plus the labelling and fallback policy around it
pub mod dbscan;
pub mod distance;
pub mod orchestrator;
pub mod point;
pub mod summary;

#[cfg(test)]
mod summary_test;

pub use dbscan::{ClusterError, DEFAULT_MIN_POINTS, Dbscan, PointClusterer, db_scan, region_query};
pub use distance::{DEGREE_RAD, EARTH_R, haversine};
pub use orchestrator::{
    ClusterCounts, ClusterOutcome, ClusterResult, ClusterStrategy, EntityCluster,
    cluster_entities, cluster_entities_with,
};
pub use point::{Cluster, Entity, Point, PointList, Site, centroid};
pub use summary::{Summary, UNKNOWN_AREA, area_label, summarize};
