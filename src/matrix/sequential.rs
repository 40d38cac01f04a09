use super::cache::MatrixCache;
use super::clock::Clock;
use super::provider::MatrixProvider;
use super::types::{LegTime, MatrixOptions};
use crate::cluster::Point;

/// Travel time and distance for every consecutive pair of an ordered route,
/// using the default (driving) options.
///
/// Empty when the route has fewer than two stops or the matrix is unavailable.
pub async fn sequential_times<P, C>(cache: &MatrixCache<P, C>, ordered: &[Point]) -> Vec<LegTime>
where
    P: MatrixProvider,
    C: Clock,
{
    sequential_times_with(cache, ordered, &MatrixOptions::default()).await
}

pub async fn sequential_times_with<P, C>(
    cache: &MatrixCache<P, C>,
    ordered: &[Point],
    options: &MatrixOptions,
) -> Vec<LegTime>
where
    P: MatrixProvider,
    C: Clock,
{
    if ordered.len() < 2 {
        return Vec::new();
    }
    let Some(matrix) = cache.get_matrix(ordered, options).await else {
        return Vec::new();
    };

    // Cells the provider left out (no route, or past the coordinate limit) count as 0
    (0..ordered.len() - 1)
        .map(|i| LegTime {
            duration_sec: matrix.duration(i, i + 1).unwrap_or(0.0),
            distance_m: matrix.distance(i, i + 1).unwrap_or(0.0),
        })
        .collect()
}
