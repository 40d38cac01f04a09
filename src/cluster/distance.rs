use std::f64::consts::PI;

/// Coefficient to translate from degrees to radians
pub const DEGREE_RAD: f64 = PI / 180.0;

/// Earth radius in kilometers
pub const EARTH_R: f64 = 6371.0;

use super::point::Point;

/// Calculates great-circle distance between two points with the haversine formula
///
/// # Returns
///
/// Distance in kilometers. Non-finite input yields NaN; callers filter
/// coordinates before they get here.
pub fn haversine(p1: &Point, p2: &Point) -> f64 {
    let lat1 = p1.lat() * DEGREE_RAD;
    let lat2 = p2.lat() * DEGREE_RAD;
    let d_lat = (p2.lat() - p1.lat()) * DEGREE_RAD;
    let d_lng = (p2.lng() - p1.lng()) * DEGREE_RAD;

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points
    let a = if a > 1.0 { 1.0 } else { a };
    let c = 2.0 * a.sqrt().asin();

    EARTH_R * c
}
