//! Fake matrix provider shared by the matrix tests

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::provider::{MatrixError, MatrixProvider};
use super::types::{MatrixOptions, TravelMatrix};
use crate::cluster::Point;

/// Answers with `durations[i][j] = 100*i + j` seconds and
/// `distances[i][j] = 1000*i + j` meters, and records every request.
#[derive(Default)]
pub struct CountingProvider {
    calls: AtomicUsize,
    failing: AtomicBool,
    holes: AtomicBool,
    requests: Mutex<Vec<Vec<Point>>>,
}

impl CountingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Leave the superdiagonal empty, as if no route existed
    pub fn set_holes(&self, holes: bool) {
        self.holes.store(holes, Ordering::SeqCst);
    }

    pub fn last_request(&self) -> Option<Vec<Point>> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl MatrixProvider for CountingProvider {
    async fn fetch(
        &self,
        coords: &[Point],
        _options: &MatrixOptions,
    ) -> Result<TravelMatrix, MatrixError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(coords.to_vec());
        if self.failing.load(Ordering::SeqCst) {
            return Err(MatrixError::Malformed("provider down".to_string()));
        }

        let holes = self.holes.load(Ordering::SeqCst);
        let n = coords.len();
        let cell = |i: usize, j: usize, scale: f64| {
            if holes && j == i + 1 {
                None
            } else {
                Some(scale * i as f64 + j as f64)
            }
        };
        Ok(TravelMatrix {
            durations: (0..n).map(|i| (0..n).map(|j| cell(i, j, 100.0)).collect()).collect(),
            distances: (0..n).map(|i| (0..n).map(|j| cell(i, j, 1000.0)).collect()).collect(),
        })
    }
}

/// `n` distinct points spaced along a meridian
pub fn route(n: usize) -> Vec<Point> {
    (0..n)
        .map(|i| Point::new(59.90 + i as f64 * 0.01, 30.30))
        .collect()
}
