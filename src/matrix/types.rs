use serde::{Deserialize, Serialize};

/// Travel mode understood by the matrix provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Driving,
    Walking,
    Cycling,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Driving => "driving",
            Profile::Walking => "walking",
            Profile::Cycling => "cycling",
        }
    }
}

/// Query options for one matrix lookup.
///
/// The serialized form is part of the cache key, so two lookups share an entry
/// only when every option matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatrixOptions {
    pub profile: Profile,
    /// Row subset, as indices into the coordinate list
    pub sources: Option<Vec<usize>>,
    /// Column subset, as indices into the coordinate list
    pub destinations: Option<Vec<usize>>,
    /// Departure time passed through to the provider (ISO 8601)
    pub depart_at: Option<String>,
}

impl MatrixOptions {
    pub fn with_profile(profile: Profile) -> Self {
        MatrixOptions {
            profile,
            ..Default::default()
        }
    }
}

/// Travel durations (seconds) and distances (meters) between coordinates.
///
/// `durations[i][j]` is the trip from row `i` to column `j`. A `None` cell means
/// the provider found no route.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelMatrix {
    pub durations: Vec<Vec<Option<f64>>>,
    pub distances: Vec<Vec<Option<f64>>>,
}

impl TravelMatrix {
    pub fn duration(&self, i: usize, j: usize) -> Option<f64> {
        self.durations.get(i)?.get(j).copied().flatten()
    }

    pub fn distance(&self, i: usize, j: usize) -> Option<f64> {
        self.distances.get(i)?.get(j).copied().flatten()
    }
}

/// Travel cost of one leg of an ordered route
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LegTime {
    pub duration_sec: f64,
    pub distance_m: f64,
}
