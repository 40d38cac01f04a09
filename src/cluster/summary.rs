//! Centroid, radius and human-readable area label for a group of entities

use super::point::{Entity, Point, centroid};

/// Label used for entities that carry no area tag
pub const UNKNOWN_AREA: &str = "Unknown";

/// Derived geometry and label of one cluster
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub centroid: Point,
    pub radius_km: f64,
    pub area_label: String,
}

/// Summarizes a non-empty group of entities with valid coordinates.
///
/// Returns `None` when no member has a usable position.
pub fn summarize<E: Entity>(members: &[&E]) -> Option<Summary> {
    let points: Vec<Point> = members.iter().filter_map(|e| e.point()).collect();
    let center = centroid(&points)?;
    let radius_km = points
        .iter()
        .map(|p| center.dist_km(p))
        .fold(0.0, f64::max);

    Some(Summary {
        centroid: center,
        radius_km,
        area_label: area_label(members),
    })
}

/// Distinct area tags with their counts, most frequent first.
///
/// Ties keep the order in which tags were first seen.
pub fn area_counts<E: Entity>(members: &[&E]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for member in members {
        let tag = member.area().unwrap_or(UNKNOWN_AREA);
        match counts.iter_mut().find(|(t, _)| t == tag) {
            Some((_, n)) => *n += 1,
            None => counts.push((tag.to_string(), 1)),
        }
    }
    // sort_by is stable, so first-seen order survives among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Most frequent area tag among `members`
pub fn dominant_area<E: Entity>(members: &[&E]) -> String {
    area_counts(members)
        .into_iter()
        .next()
        .map(|(tag, _)| tag)
        .unwrap_or_else(|| UNKNOWN_AREA.to_string())
}

/// Builds the display label from the distribution of area tags:
/// - one tag: `"A"`
/// - two tags: `"A / B"`
/// - three or more: `"A-area (N places)"`
pub fn area_label<E: Entity>(members: &[&E]) -> String {
    let counts = area_counts(members);
    match counts.as_slice() {
        [] => UNKNOWN_AREA.to_string(),
        [(only, _)] => only.clone(),
        [(first, _), (second, _)] => format!("{} / {}", first, second),
        [(first, _), ..] => format!("{}-area ({} places)", first, counts.len()),
    }
}
