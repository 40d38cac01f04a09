//! Points, raw index clusters and the entity contract the clusterer works over

/// Point represents a geographic coordinate (longitude, latitude)
///
/// The point is stored as [longitude, latitude] where:
/// - `[0]` is longitude
/// - `[1]` is latitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point(pub [f64; 2]);

/// PointList is a collection of Points
pub type PointList = Vec<Point>;

/// Cluster represents a result of DBScan clustering work
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Cluster ID (discovery order)
    pub c: usize,
    /// Indices of points belonging to this cluster
    pub points: Vec<usize>,
}

impl Point {
    /// Builds a point from latitude and longitude in degrees
    pub fn new(lat: f64, lng: f64) -> Self {
        Point([lng, lat])
    }

    pub fn lat(&self) -> f64 {
        self.0[1]
    }

    pub fn lng(&self) -> f64 {
        self.0[0]
    }

    /// Both components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.0[0].is_finite() && self.0[1].is_finite()
    }

    /// Great-circle distance to `b` in kilometers
    pub fn dist_km(&self, b: &Point) -> f64 {
        super::distance::haversine(self, b)
    }
}

/// Anything that can be placed on the map.
///
/// Coordinates are optional: records without a usable position are routed to
/// noise rather than rejected. `area` is a categorical tag (postal area,
/// district) used only for labelling clusters, never for distance math.
pub trait Entity {
    fn id(&self) -> &str;

    fn lat(&self) -> Option<f64>;

    fn lng(&self) -> Option<f64>;

    fn area(&self) -> Option<&str> {
        None
    }

    /// Position of the entity when both coordinates are present and finite
    fn point(&self) -> Option<Point> {
        match (self.lat(), self.lng()) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Some(Point::new(lat, lng))
            }
            _ => None,
        }
    }
}

/// Site is a plain owned entity, as read from CSV input
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub id: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub area: Option<String>,
}

impl Site {
    pub fn new(id: impl Into<String>, lat: f64, lng: f64, area: impl Into<String>) -> Self {
        Site {
            id: id.into(),
            lat: Some(lat),
            lng: Some(lng),
            area: Some(area.into()),
        }
    }
}

impl Entity for Site {
    fn id(&self) -> &str {
        &self.id
    }

    fn lat(&self) -> Option<f64> {
        self.lat
    }

    fn lng(&self) -> Option<f64> {
        self.lng
    }

    fn area(&self) -> Option<&str> {
        self.area.as_deref()
    }
}

/// Arithmetic mean of the given points (planar approximation)
///
/// Returns `None` for an empty list.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }

    let mut center = Point([0.0, 0.0]);
    for pt in points {
        for j in 0..2 {
            center.0[j] += pt.0[j];
        }
    }

    for j in 0..2 {
        center.0[j] /= points.len() as f64;
    }

    Some(center)
}
