//! Settings file for the clustering radius and the matrix provider.
//!
//! The file is JSON and every field is optional:
//!
//! ```json
//! { "epsilon_km": 10.0, "matrix": { "profile": "walking", "ttl_secs": 120 } }
//! ```
//!
//! The provider access token is read from `MAPBOX_ACCESS_TOKEN`, never from
//! the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::matrix::{DEFAULT_BASE_URL, DEFAULT_TTL, Profile};

/// Clustering radius used when none is configured
pub const DEFAULT_EPSILON_KM: f64 = 15.0;

pub const ACCESS_TOKEN_ENV: &str = "MAPBOX_ACCESS_TOKEN";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub epsilon_km: f64,
    pub matrix: MatrixSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatrixSettings {
    pub base_url: String,
    pub profile: Profile,
    pub ttl_secs: u64,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            epsilon_km: DEFAULT_EPSILON_KM,
            matrix: MatrixSettings::default(),
        }
    }
}

impl Default for MatrixSettings {
    fn default() -> Self {
        MatrixSettings {
            base_url: DEFAULT_BASE_URL.to_string(),
            profile: Profile::default(),
            ttl_secs: DEFAULT_TTL.as_secs(),
            timeout_secs: 10,
        }
    }
}

impl MatrixSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Settings {
    /// Reads settings from `path`, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(raw)?;
        if !settings.epsilon_km.is_finite() || settings.epsilon_km < 0.0 {
            anyhow::bail!("epsilon_km must be a non-negative number, got {}", settings.epsilon_km);
        }
        Ok(settings)
    }
}
