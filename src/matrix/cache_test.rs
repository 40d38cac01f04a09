#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::cluster::Point;
    use crate::matrix::test_support::{CountingProvider, route};
    use crate::matrix::{
        DEFAULT_TTL, MAX_COORDINATES, ManualClock, MatrixCache, MatrixOptions, Profile, cache_key,
    };

    fn cache() -> (MatrixCache<CountingProvider, Arc<ManualClock>>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = MatrixCache::with_clock(CountingProvider::new(), Arc::clone(&clock), DEFAULT_TTL);
        (cache, clock)
    }

    #[tokio::test]
    async fn test_too_few_coordinates_skip_provider() {
        let (cache, _) = cache();
        let options = MatrixOptions::default();

        assert!(cache.get_matrix(&[], &options).await.is_none());
        assert!(cache.get_matrix(&route(1), &options).await.is_none());
        assert_eq!(cache.provider().calls(), 0);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_identical_lookup_hits_cache() {
        let (cache, _) = cache();
        let coords = route(3);
        let options = MatrixOptions::default();

        let first = cache.get_matrix(&coords, &options).await.unwrap();
        let second = cache.get_matrix(&coords, &options).await.unwrap();

        assert_eq!(cache.provider().calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.duration(0, 1), Some(1.0));
        assert_eq!(first.distance(1, 2), Some(1002.0));
    }

    #[tokio::test]
    async fn test_rounding_coalesces_nearby_coordinates() {
        let (cache, _) = cache();
        let options = MatrixOptions::default();
        let a = vec![Point::new(59.93861, 30.31412), Point::new(59.95001, 30.31649)];
        // Differences below the fourth decimal place
        let b = vec![Point::new(59.93862, 30.31414), Point::new(59.95003, 30.31648)];
        // A difference in the third decimal place
        let c = vec![Point::new(59.93961, 30.31412), Point::new(59.95001, 30.31649)];

        cache.get_matrix(&a, &options).await.unwrap();
        cache.get_matrix(&b, &options).await.unwrap();
        assert_eq!(cache.provider().calls(), 1);

        cache.get_matrix(&c, &options).await.unwrap();
        assert_eq!(cache.provider().calls(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_options_are_part_of_the_key() {
        let (cache, _) = cache();
        let coords = route(2);

        cache.get_matrix(&coords, &MatrixOptions::default()).await.unwrap();
        cache
            .get_matrix(&coords, &MatrixOptions::with_profile(Profile::Walking))
            .await
            .unwrap();
        let departing = MatrixOptions {
            depart_at: Some("2024-05-01T08:00".to_string()),
            ..Default::default()
        };
        cache.get_matrix(&coords, &departing).await.unwrap();

        assert_eq!(cache.provider().calls(), 3);
        assert_ne!(
            cache_key(&coords, &MatrixOptions::default()),
            cache_key(&coords, &departing)
        );
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let (cache, clock) = cache();
        let coords = route(3);
        let options = MatrixOptions::default();

        cache.get_matrix(&coords, &options).await.unwrap();
        clock.advance(DEFAULT_TTL - Duration::from_secs(1));
        cache.get_matrix(&coords, &options).await.unwrap();
        assert_eq!(cache.provider().calls(), 1);

        clock.advance(Duration::from_secs(1));
        cache.get_matrix(&coords, &options).await.unwrap();
        assert_eq!(cache.provider().calls(), 2);

        // The refreshed entry is good for another full TTL
        clock.advance(Duration::from_secs(60));
        cache.get_matrix(&coords, &options).await.unwrap();
        assert_eq!(cache.provider().calls(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let (cache, _) = cache();
        let coords = route(3);
        let options = MatrixOptions::default();

        cache.provider().set_failing(true);
        assert!(cache.get_matrix(&coords, &options).await.is_none());
        assert!(cache.is_empty());

        cache.provider().set_failing(false);
        assert!(cache.get_matrix(&coords, &options).await.is_some());
        assert_eq!(cache.provider().calls(), 2);
    }

    #[tokio::test]
    async fn test_long_lists_are_truncated() {
        let (cache, _) = cache();
        let coords = route(MAX_COORDINATES + 5);
        let options = MatrixOptions::default();

        let matrix = cache.get_matrix(&coords, &options).await.unwrap();
        assert_eq!(matrix.durations.len(), MAX_COORDINATES);
        assert_eq!(
            cache.provider().last_request().unwrap(),
            coords[..MAX_COORDINATES].to_vec()
        );

        // Same key as asking for the first 25 directly
        cache
            .get_matrix(&coords[..MAX_COORDINATES], &options)
            .await
            .unwrap();
        assert_eq!(cache.provider().calls(), 1);
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let (cache, _) = cache();
        let coords = route(2);
        let options = MatrixOptions::default();

        cache.get_matrix(&coords, &options).await.unwrap();
        cache.clear_cache();
        assert!(cache.is_empty());

        cache.get_matrix(&coords, &options).await.unwrap();
        assert_eq!(cache.provider().calls(), 2);
    }

    #[tokio::test]
    async fn test_sweep_expired() {
        let (cache, clock) = cache();
        let options = MatrixOptions::default();

        cache.get_matrix(&route(2), &options).await.unwrap();
        clock.advance(Duration::from_secs(200));
        cache.get_matrix(&route(3), &options).await.unwrap();
        assert_eq!(cache.sweep_expired(), 0);

        clock.advance(Duration::from_secs(100));
        assert_eq!(cache.sweep_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_task_removes_stale_entries() {
        let (cache, clock) = cache();
        let cache = Arc::new(cache);
        cache
            .get_matrix(&route(2), &MatrixOptions::default())
            .await
            .unwrap();

        let handle = cache.spawn_sweeper(Duration::from_secs(30));
        // Two clocks: expiry reads the manual clock, the sweeper ticks on paused
        // tokio time. Age the entry first, then let tokio fire the ticks.
        clock.advance(DEFAULT_TTL);
        tokio::time::sleep(Duration::from_secs(61)).await;

        assert!(cache.is_empty());
        handle.abort();
    }

    #[test]
    fn test_cache_key_normalizes_negative_zero() {
        let options = MatrixOptions::default();
        let a = [Point::new(-0.00001, 0.0), Point::new(1.0, 1.0)];
        let b = [Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        assert_eq!(cache_key(&a, &options), cache_key(&b, &options));
    }
}
