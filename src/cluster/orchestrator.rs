//! Top-level clustering entry point.
//!
//! Splits entities by coordinate validity, runs the density clusterer over the
//! ones that have a position and turns whatever comes back into an ordered,
//! labelled [`ClusterResult`]. Two situations never reach the caller as bare
//! output of the algorithm:
//!
//! - the clusterer fails: entities are grouped by area tag instead;
//! - the clusterer finds nothing: all positioned entities form one bucket, so
//!   there is always at least one actionable group when any position exists.

use bitvec::prelude::*;
use tracing::{debug, warn};

use super::dbscan::{ClusterError, DEFAULT_MIN_POINTS, Dbscan, PointClusterer};
use super::point::{Cluster, Entity, Point, centroid};
use super::summary::{UNKNOWN_AREA, dominant_area, summarize};
use crate::TARGET_CLUSTER;

/// A labelled group of entities
#[derive(Debug, Clone)]
pub struct EntityCluster<'a, E> {
    pub members: Vec<&'a E>,
    pub centroid: Point,
    pub radius_km: f64,
    pub area_label: String,
}

/// Counts reported alongside a clustering result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterCounts {
    pub total_count: usize,
    pub cluster_count: usize,
    pub noise_count: usize,
}

/// How the clusters of a result were produced
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterStrategy {
    /// No entity had usable coordinates
    Empty,
    /// Clusters came straight from the density algorithm
    Density,
    /// Density found no cluster, everything positioned was put in one bucket
    SingleBucket,
    /// Density clustering failed, entities were grouped by area tag
    AreaFallback { reason: ClusterError },
}

#[derive(Debug, Clone)]
pub struct ClusterResult<'a, E> {
    /// Sorted by member count, largest first
    pub clusters: Vec<EntityCluster<'a, E>>,
    pub noise: Vec<&'a E>,
    pub summary: ClusterCounts,
    pub strategy: ClusterStrategy,
}

/// Index clusters over the positioned entities, tagged with where they came from
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterOutcome {
    Density(Vec<Cluster>),
    Fallback {
        clusters: Vec<Cluster>,
        reason: ClusterError,
    },
}

/// Clusters `entities` with DBSCAN at radius `eps_km` and `min_points = 2`
pub fn cluster_entities<E: Entity>(entities: &[E], eps_km: f64) -> ClusterResult<'_, E> {
    cluster_entities_with(entities, eps_km, &Dbscan)
}

/// Same as [`cluster_entities`] with a caller-supplied clusterer
pub fn cluster_entities_with<'a, E, K>(
    entities: &'a [E],
    eps_km: f64,
    clusterer: &K,
) -> ClusterResult<'a, E>
where
    E: Entity,
    K: PointClusterer + ?Sized,
{
    let mut with_coords: Vec<&'a E> = Vec::new();
    let mut points = Vec::new();
    let mut without_coords: Vec<&'a E> = Vec::new();
    for entity in entities {
        match entity.point() {
            Some(p) => {
                with_coords.push(entity);
                points.push(p);
            }
            None => without_coords.push(entity),
        }
    }

    debug!(
        target: TARGET_CLUSTER,
        "Clustering {} entities ({} positioned) with eps={:.3} km",
        entities.len(),
        with_coords.len(),
        eps_km
    );

    if with_coords.is_empty() {
        return finish(entities.len(), Vec::new(), without_coords, ClusterStrategy::Empty);
    }

    let (clusters, noise, strategy) = match run_density(&with_coords, &points, eps_km, clusterer) {
        ClusterOutcome::Density(found) if found.is_empty() => {
            debug!(
                target: TARGET_CLUSTER,
                "No density cluster at eps={:.3} km, using a single bucket", eps_km
            );
            let bucket = flat_cluster(with_coords);
            (vec![bucket], without_coords, ClusterStrategy::SingleBucket)
        }
        ClusterOutcome::Density(found) => {
            let mut claimed = bitvec![0; with_coords.len()];
            let mut clusters = Vec::with_capacity(found.len());
            for cluster in &found {
                for &i in &cluster.points {
                    claimed.set(i, true);
                }
                let members: Vec<&'a E> = cluster.points.iter().map(|&i| with_coords[i]).collect();
                clusters.extend(summarized_cluster(members));
            }

            let mut noise: Vec<&'a E> = with_coords
                .iter()
                .enumerate()
                .filter(|(i, _)| !claimed[*i])
                .map(|(_, e)| *e)
                .collect();
            noise.extend(without_coords);
            (clusters, noise, ClusterStrategy::Density)
        }
        ClusterOutcome::Fallback { clusters: groups, reason } => {
            warn!(
                target: TARGET_CLUSTER,
                "Density clustering failed ({}), grouping {} entities by area", reason, with_coords.len()
            );
            let clusters = groups
                .iter()
                .map(|group| {
                    let members = group.points.iter().map(|&i| with_coords[i]).collect();
                    flat_cluster(members)
                })
                .collect();
            (clusters, without_coords, ClusterStrategy::AreaFallback { reason })
        }
    };

    finish(entities.len(), clusters, noise, strategy)
}

/// Runs the clusterer and converts a failure, or output that is out of range or
/// overlapping, into area groups
pub fn run_density<E, K>(
    with_coords: &[&E],
    points: &[Point],
    eps_km: f64,
    clusterer: &K,
) -> ClusterOutcome
where
    E: Entity,
    K: PointClusterer + ?Sized,
{
    let found = clusterer
        .cluster(points, eps_km, DEFAULT_MIN_POINTS)
        .and_then(|clusters| check_disjoint(clusters, points.len()));
    match found {
        Ok(clusters) => ClusterOutcome::Density(clusters),
        Err(reason) => ClusterOutcome::Fallback {
            clusters: group_by_area(with_coords),
            reason,
        },
    }
}

/// Rejects clusterer output that points past the input or claims a point twice
fn check_disjoint(clusters: Vec<Cluster>, len: usize) -> Result<Vec<Cluster>, ClusterError> {
    let mut claimed = bitvec![0; len];
    for cluster in &clusters {
        for &i in &cluster.points {
            if i >= len {
                return Err(ClusterError::Internal(format!(
                    "cluster {} references point {} of {}",
                    cluster.c, i, len
                )));
            }
            if claimed[i] {
                return Err(ClusterError::Internal(format!(
                    "point {} assigned to more than one cluster",
                    i
                )));
            }
            claimed.set(i, true);
        }
    }
    Ok(clusters)
}

/// One index cluster per distinct area tag, largest first.
///
/// Groups of equal size keep the order in which their tag was first seen.
pub fn group_by_area<E: Entity>(members: &[&E]) -> Vec<Cluster> {
    let mut tags: Vec<&str> = Vec::new();
    let mut groups: Vec<Cluster> = Vec::new();
    for (i, member) in members.iter().enumerate() {
        let tag = member.area().unwrap_or(UNKNOWN_AREA);
        match tags.iter().position(|t| *t == tag) {
            Some(g) => groups[g].points.push(i),
            None => {
                tags.push(tag);
                groups.push(Cluster {
                    c: groups.len(),
                    points: vec![i],
                });
            }
        }
    }
    groups.sort_by(|a, b| b.points.len().cmp(&a.points.len()));
    groups
}

fn summarized_cluster<E: Entity>(members: Vec<&E>) -> Option<EntityCluster<'_, E>> {
    let summary = summarize(&members)?;
    Some(EntityCluster {
        members,
        centroid: summary.centroid,
        radius_km: summary.radius_km,
        area_label: summary.area_label,
    })
}

/// Zero-radius cluster labelled with its dominant area tag, for groups that
/// were not formed by distance
fn flat_cluster<E: Entity>(members: Vec<&E>) -> EntityCluster<'_, E> {
    let points: Vec<Point> = members.iter().filter_map(|e| e.point()).collect();
    EntityCluster {
        centroid: centroid(&points).unwrap_or(Point([0.0, 0.0])),
        radius_km: 0.0,
        area_label: dominant_area(&members),
        members,
    }
}

fn finish<'a, E>(
    total_count: usize,
    mut clusters: Vec<EntityCluster<'a, E>>,
    noise: Vec<&'a E>,
    strategy: ClusterStrategy,
) -> ClusterResult<'a, E> {
    // Stable: equal sizes stay in discovery order
    clusters.sort_by(|a, b| b.members.len().cmp(&a.members.len()));
    let summary = ClusterCounts {
        total_count,
        cluster_count: clusters.len(),
        noise_count: noise.len(),
    };
    ClusterResult {
        clusters,
        noise,
        summary,
        strategy,
    }
}
