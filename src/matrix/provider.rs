//! External travel-time matrix service

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::types::{MatrixOptions, TravelMatrix};
use crate::TARGET_MATRIX;
use crate::cluster::Point;

pub const DEFAULT_BASE_URL: &str = "https://api.mapbox.com";

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("matrix request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("matrix provider returned status {0}")]
    Status(StatusCode),
    #[error("matrix provider answered {code}: {message}")]
    Api { code: String, message: String },
    #[error("malformed matrix response: {0}")]
    Malformed(String),
    #[error("invalid matrix request: {0}")]
    InvalidRequest(String),
}

/// Source of travel-time matrices.
///
/// `coords` are in request order; the returned matrix is indexed the same way.
#[async_trait]
pub trait MatrixProvider: Send + Sync {
    async fn fetch(
        &self,
        coords: &[Point],
        options: &MatrixOptions,
    ) -> Result<TravelMatrix, MatrixError>;
}

/// Mapbox Directions Matrix API client
#[derive(Debug, Clone)]
pub struct MapboxMatrixProvider {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl MapboxMatrixProvider {
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MatrixError> {
        let client = reqwest::Client::builder().timeout(timeout).gzip(true).build()?;
        Ok(MapboxMatrixProvider {
            client,
            base_url: base_url.into(),
            access_token: access_token.into(),
        })
    }

    /// Full request URL for `coords` and `options`
    pub fn request_url(&self, coords: &[Point], options: &MatrixOptions) -> Result<Url, MatrixError> {
        let path: Vec<String> = coords
            .iter()
            .map(|p| format!("{},{}", p.lng(), p.lat()))
            .collect();
        let endpoint = format!(
            "{}/directions-matrix/v1/mapbox/{}/{}",
            self.base_url.trim_end_matches('/'),
            options.profile.as_str(),
            path.join(";")
        );

        let mut params = vec![("annotations", "duration,distance".to_string())];
        if let Some(sources) = &options.sources {
            params.push(("sources", join_indices(sources)));
        }
        if let Some(destinations) = &options.destinations {
            params.push(("destinations", join_indices(destinations)));
        }
        if let Some(depart_at) = &options.depart_at {
            params.push(("depart_at", depart_at.clone()));
        }
        params.push(("access_token", self.access_token.clone()));

        Url::parse_with_params(&endpoint, &params)
            .map_err(|e| MatrixError::InvalidRequest(e.to_string()))
    }
}

#[async_trait]
impl MatrixProvider for MapboxMatrixProvider {
    async fn fetch(
        &self,
        coords: &[Point],
        options: &MatrixOptions,
    ) -> Result<TravelMatrix, MatrixError> {
        let url = self.request_url(coords, options)?;
        debug!(target: TARGET_MATRIX, "Requesting {} profile matrix for {} coordinates", options.profile.as_str(), coords.len());

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MatrixError::Status(status));
        }
        let body = response.text().await?;

        let rows = options.sources.as_ref().map_or(coords.len(), Vec::len);
        let cols = options.destinations.as_ref().map_or(coords.len(), Vec::len);
        decode_response(&body, rows, cols)
    }
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    durations: Option<Vec<Vec<Option<f64>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<Option<f64>>>>,
}

/// Parses a matrix response body and checks it is `rows` x `cols`
pub fn decode_response(body: &str, rows: usize, cols: usize) -> Result<TravelMatrix, MatrixError> {
    let response: MatrixResponse =
        serde_json::from_str(body).map_err(|e| MatrixError::Malformed(e.to_string()))?;

    if response.code != "Ok" {
        return Err(MatrixError::Api {
            message: response.message.unwrap_or_default(),
            code: response.code,
        });
    }

    let durations = response
        .durations
        .ok_or_else(|| MatrixError::Malformed("missing durations".to_string()))?;
    let distances = response
        .distances
        .ok_or_else(|| MatrixError::Malformed("missing distances".to_string()))?;
    check_shape("durations", &durations, rows, cols)?;
    check_shape("distances", &distances, rows, cols)?;

    Ok(TravelMatrix {
        durations,
        distances,
    })
}

fn check_shape(
    name: &str,
    matrix: &[Vec<Option<f64>>],
    rows: usize,
    cols: usize,
) -> Result<(), MatrixError> {
    if matrix.len() != rows || matrix.iter().any(|row| row.len() != cols) {
        return Err(MatrixError::Malformed(format!(
            "{} is not {}x{}",
            name, rows, cols
        )));
    }
    Ok(())
}

fn join_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(";")
}
