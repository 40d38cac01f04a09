//! Time-expiring cache in front of a [`MatrixProvider`].
//!
//! Keys are built from coordinates rounded to four decimal places (about 11 m)
//! plus the serialized query options, so near-identical lookups such as the
//! ones fired while dragging a stop around share one provider call.
//!
//! Expiry is checked lazily on every read. [`MatrixCache::sweep_expired`] drops
//! stale entries in bulk and [`MatrixCache::spawn_sweeper`] runs it on a timer.
//!
//! Concurrent misses on the same key are not coalesced: each one reaches the
//! provider and the last response wins.

use dashmap::DashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};
use super::provider::MatrixProvider;
use super::types::{MatrixOptions, TravelMatrix};
use crate::TARGET_MATRIX;
use crate::cluster::Point;

/// Largest coordinate list the provider accepts in one request
pub const MAX_COORDINATES: usize = 25;

/// Lifetime of a cached matrix
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

const KEY_SCALE: f64 = 10_000.0;

/// One cached provider answer
#[derive(Debug, Clone)]
pub struct MatrixCacheEntry {
    pub matrix: Arc<TravelMatrix>,
    pub inserted_at: Instant,
    pub ttl: Duration,
}

impl MatrixCacheEntry {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= self.ttl
    }
}

pub struct MatrixCache<P, C = SystemClock> {
    provider: P,
    clock: C,
    ttl: Duration,
    entries: DashMap<String, MatrixCacheEntry>,
}

impl<P: MatrixProvider> MatrixCache<P, SystemClock> {
    pub fn new(provider: P) -> Self {
        Self::with_clock(provider, SystemClock, DEFAULT_TTL)
    }
}

impl<P: MatrixProvider, C: Clock> MatrixCache<P, C> {
    pub fn with_clock(provider: P, clock: C, ttl: Duration) -> Self {
        MatrixCache {
            provider,
            clock,
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Travel matrix for `coords`, from cache when a fresh entry exists.
    ///
    /// Returns `None` for fewer than two coordinates and whenever the provider
    /// fails; failures are not cached. Lists longer than [`MAX_COORDINATES`]
    /// are cut down to the first [`MAX_COORDINATES`] entries.
    pub async fn get_matrix(
        &self,
        coords: &[Point],
        options: &MatrixOptions,
    ) -> Option<Arc<TravelMatrix>> {
        if coords.len() < 2 {
            return None;
        }

        let coords = if coords.len() > MAX_COORDINATES {
            warn!(
                target: TARGET_MATRIX,
                "Matrix request has {} coordinates, truncating to the first {}",
                coords.len(),
                MAX_COORDINATES
            );
            &coords[..MAX_COORDINATES]
        } else {
            coords
        };

        let key = cache_key(coords, options);
        if let Some(matrix) = self.lookup(&key, self.clock.now()) {
            debug!(target: TARGET_MATRIX, "Matrix cache hit for {} coordinates", coords.len());
            return Some(matrix);
        }

        debug!(target: TARGET_MATRIX, "Matrix cache miss for {} coordinates", coords.len());
        match self.provider.fetch(coords, options).await {
            Ok(matrix) => {
                let matrix = Arc::new(matrix);
                self.entries.insert(
                    key,
                    MatrixCacheEntry {
                        matrix: Arc::clone(&matrix),
                        inserted_at: self.clock.now(),
                        ttl: self.ttl,
                    },
                );
                Some(matrix)
            }
            Err(e) => {
                warn!(target: TARGET_MATRIX, "Matrix lookup failed: {}", e);
                None
            }
        }
    }

    /// Drops every entry immediately
    pub fn clear_cache(&self) {
        self.entries.clear();
    }

    /// Removes stale entries and returns how many were dropped
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, stale ones included until read or swept
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, key: &str, now: Instant) -> Option<Arc<TravelMatrix>> {
        let entry = self.entries.get(key)?;
        if !entry.is_expired(now) {
            return Some(Arc::clone(&entry.matrix));
        }
        // The read guard must be released before removing from the same shard
        drop(entry);
        self.entries.remove_if(key, |_, e| e.is_expired(now));
        debug!(target: TARGET_MATRIX, "Matrix cache entry expired");
        None
    }
}

impl<P, C> MatrixCache<P, C>
where
    P: MatrixProvider + 'static,
    C: Clock + 'static,
{
    /// Sweeps expired entries every `every` until the cache is dropped
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let cache: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let removed = cache.sweep_expired();
                if removed > 0 {
                    debug!(target: TARGET_MATRIX, "Swept {} expired matrix entries", removed);
                }
            }
        })
    }
}

/// Cache key for a coordinate list and its options
pub fn cache_key(coords: &[Point], options: &MatrixOptions) -> String {
    let coords: Vec<String> = coords
        .iter()
        .map(|p| format!("{:.4},{:.4}", round_coord(p.lng()), round_coord(p.lat())))
        .collect();
    let options = serde_json::to_string(options).unwrap_or_else(|_| format!("{:?}", options));
    format!("{}|{}", coords.join(";"), options)
}

fn round_coord(v: f64) -> f64 {
    // Adding 0.0 folds -0.0 into 0.0 so both print the same
    (v * KEY_SCALE).round() / KEY_SCALE + 0.0
}
