#[cfg(test)]
mod tests {
    use crate::cluster::summary::{area_counts, dominant_area};
    use crate::cluster::{Point, Site, UNKNOWN_AREA, area_label, haversine, summarize};

    fn sites(areas: &[&str]) -> Vec<Site> {
        areas
            .iter()
            .enumerate()
            .map(|(i, area)| Site::new(format!("s{}", i), 59.95 + i as f64 * 0.001, 30.3, *area))
            .collect()
    }

    fn refs(sites: &[Site]) -> Vec<&Site> {
        sites.iter().collect()
    }

    #[test]
    fn test_single_area_label() {
        let s = sites(&["Vyborgsky", "Vyborgsky"]);
        assert_eq!(area_label(&refs(&s)), "Vyborgsky");
    }

    #[test]
    fn test_two_area_label() {
        let s = sites(&["Primorsky", "Vyborgsky", "Vyborgsky"]);
        assert_eq!(area_label(&refs(&s)), "Vyborgsky / Primorsky");
    }

    #[test]
    fn test_many_area_label() {
        let s = sites(&["Kalininsky", "Primorsky", "Vyborgsky", "Primorsky"]);
        assert_eq!(area_label(&refs(&s)), "Primorsky-area (3 places)");
    }

    #[test]
    fn test_area_ties_keep_first_seen_order() {
        let s = sites(&["Kalininsky", "Primorsky", "Primorsky", "Kalininsky"]);
        assert_eq!(
            area_counts(&refs(&s)),
            vec![("Kalininsky".to_string(), 2), ("Primorsky".to_string(), 2)]
        );
        assert_eq!(dominant_area(&refs(&s)), "Kalininsky");
    }

    #[test]
    fn test_untagged_members() {
        let mut s = sites(&["Primorsky", "Primorsky"]);
        s[1].area = None;
        assert_eq!(area_label(&refs(&s)), format!("Primorsky / {}", UNKNOWN_AREA));

        let empty: Vec<&Site> = Vec::new();
        assert_eq!(area_label(&empty), UNKNOWN_AREA);
    }

    #[test]
    fn test_summarize_geometry() {
        let s = vec![
            Site::new("a", 59.9500, 30.3000, "X"),
            Site::new("b", 59.9600, 30.3000, "X"),
            Site::new("c", 59.9550, 30.3200, "X"),
        ];
        let summary = summarize(&refs(&s)).unwrap();

        let expected_center = Point::new(59.955, 30.306666666666665);
        assert!((summary.centroid.lat() - expected_center.lat()).abs() < 1e-9);
        assert!((summary.centroid.lng() - expected_center.lng()).abs() < 1e-9);

        let farthest = s
            .iter()
            .map(|site| haversine(&summary.centroid, &Point::new(site.lat.unwrap(), site.lng.unwrap())))
            .fold(0.0, f64::max);
        assert!((summary.radius_km - farthest).abs() < 1e-9);
        assert_eq!(summary.area_label, "X");
    }

    #[test]
    fn test_summarize_single_member() {
        let s = sites(&["X"]);
        let summary = summarize(&refs(&s)).unwrap();
        assert_eq!(summary.radius_km, 0.0);
        assert_eq!(summary.centroid, Point::new(59.95, 30.3));
    }
}
