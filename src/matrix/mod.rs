//! Travel-time matrix lookups behind a deduplicating, expiring cache
pub mod cache;
pub mod clock;
pub mod provider;
pub mod sequential;
pub mod types;

#[cfg(test)]
mod cache_test;
#[cfg(test)]
mod test_support;

pub use cache::{DEFAULT_TTL, MAX_COORDINATES, MatrixCache, MatrixCacheEntry, cache_key};
pub use clock::{Clock, ManualClock, SystemClock};
pub use provider::{DEFAULT_BASE_URL, MapboxMatrixProvider, MatrixError, MatrixProvider, decode_response};
pub use sequential::{sequential_times, sequential_times_with};
pub use types::{LegTime, MatrixOptions, Profile, TravelMatrix};
