use super::point::{Cluster, Point};
use bitvec::prelude::*;
use thiserror::Error;

// DBSCAN algorithm pseudocode (from <http://en.wikipedia.org/wiki/DBSCAN>):
//
// DBSCAN(D, eps, MinPts)
//    C = 0
//    for each unvisited point P in dataset D
//       mark P as visited
//       NeighborPts = regionQuery(P, eps)
//       if sizeof(NeighborPts) < MinPts
//          mark P as NOISE
//       else
//          C = next cluster
//          expandCluster(P, NeighborPts, C, eps, MinPts)
//
// expandCluster(P, NeighborPts, C, eps, MinPts)
//    add P to cluster C
//    for each point P' in NeighborPts
//       if P' is not visited
//          mark P' as visited
//          NeighborPts' = regionQuery(P', eps)
//          if sizeof(NeighborPts') >= MinPts
//             NeighborPts = NeighborPts joined with NeighborPts'
//       if P' is not yet member of any cluster
//          add P' to cluster C
//
// regionQuery(P, eps)
//    return all points within P's eps-neighborhood (including P)

/// Default density threshold: a point plus at least one neighbour
pub const DEFAULT_MIN_POINTS: usize = 2;

/// Reasons the density clusterer refuses to run
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusterError {
    #[error("epsilon must be a finite, non-negative distance, got {0}")]
    InvalidEpsilon(f64),
    #[error("min_points must be at least 1")]
    InvalidMinPoints,
    #[error("point {index} has non-finite coordinates")]
    NonFinitePoint { index: usize },
    #[error("clusterer failed: {0}")]
    Internal(String),
}

/// Anything that can split a point list into density clusters.
///
/// The orchestrator talks to this trait rather than to [`db_scan`] directly.
pub trait PointClusterer {
    fn cluster(
        &self,
        points: &[Point],
        eps: f64,
        min_points: usize,
    ) -> Result<Vec<Cluster>, ClusterError>;
}

/// DBSCAN with haversine neighbourhoods and a linear region query
#[derive(Debug, Clone, Copy, Default)]
pub struct Dbscan;

impl PointClusterer for Dbscan {
    fn cluster(
        &self,
        points: &[Point],
        eps: f64,
        min_points: usize,
    ) -> Result<Vec<Cluster>, ClusterError> {
        db_scan(points, eps, min_points)
    }
}

/// Clusters incoming points using DBSCAN algorithm
///
/// Neighbourhoods are found with a linear scan, so the whole run is O(n²)
/// distance evaluations. That is fine for a few thousand points; beyond that a
/// spatial index is needed.
///
/// # Arguments
///
/// * `points` - List of points to cluster, all with finite coordinates
/// * `eps` - Clustering radius in kilometers; 0 links only coincident points
/// * `min_points` - Minimum number of points in eps-neighbourhood, including the point itself
///
/// # Returns
///
/// Clusters in discovery order. Points that end up in no cluster are noise and
/// are simply absent from the result. A border point belongs to the first
/// cluster that reaches it.
pub fn db_scan(points: &[Point], eps: f64, min_points: usize) -> Result<Vec<Cluster>, ClusterError> {
    if !eps.is_finite() || eps < 0.0 {
        return Err(ClusterError::InvalidEpsilon(eps));
    }
    if min_points == 0 {
        return Err(ClusterError::InvalidMinPoints);
    }
    if let Some(index) = points.iter().position(|p| !p.is_finite()) {
        return Err(ClusterError::NonFinitePoint { index });
    }

    let mut visited = bitvec![0; points.len()];
    let mut members = bitvec![0; points.len()];
    let mut neighbor_unique = bitvec![0; points.len()];
    let mut clusters = Vec::new();
    let mut c = 0;

    for i in 0..points.len() {
        if visited[i] {
            continue;
        }
        visited.set(i, true);

        let neighbor_pts = region_query(points, &points[i], eps);
        if neighbor_pts.len() < min_points {
            // Provisional noise: a later core point may still claim it
            continue;
        }

        let mut cluster = Cluster { c, points: vec![i] };
        members.set(i, true);
        c += 1;

        neighbor_unique.fill(false);
        for &j in &neighbor_pts {
            neighbor_unique.set(j, true);
        }

        let mut neighbor_pts = neighbor_pts;
        let mut j = 0;
        // neighbor_pts grows while we walk it
        while j < neighbor_pts.len() {
            let k = neighbor_pts[j];
            if !visited[k] {
                visited.set(k, true);
                let more_neighbors = region_query(points, &points[k], eps);
                if more_neighbors.len() >= min_points {
                    for p in more_neighbors {
                        if !neighbor_unique[p] {
                            neighbor_pts.push(p);
                            neighbor_unique.set(p, true);
                        }
                    }
                }
            }

            if !members[k] {
                cluster.points.push(k);
                members.set(k, true);
            }
            j += 1;
        }
        clusters.push(cluster);
    }

    Ok(clusters)
}

/// Simple O(N) way to find points in neighbourhood
///
/// Returns indices of every point within `eps` kilometers of `p`, in input
/// order. If `p` is itself in `points` it is included.
pub fn region_query(points: &[Point], p: &Point, eps: f64) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, point)| point.dist_km(p) <= eps)
        .map(|(i, _)| i)
        .collect()
}
