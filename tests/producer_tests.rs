use std::sync::Arc;
use std::thread;
use tilelet::prelude::*;

/// Production on real schedulers: tokio tasks and plain threads
#[cfg(test)]
mod producer_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_runtime_producer_resolves_tile() {
        let producer = TileProducer::with_config(ProductionConfig::fixed(10));
        let key = TileKey::new(0, 0, 3);

        assert!(producer.request_tile(key).is_none());
        assert_eq!(producer.state(&key), TileState::Pending);

        let image = tokio::time::timeout(Duration::from_secs(5), producer.produce(key))
            .await
            .expect("tile produced in time");
        assert_eq!(image.get_pixel(0, 0), &image::Rgba([0, 255, 0, 255]));

        assert!(producer.request_tile(key).is_some());
        assert_eq!(producer.wait_ready(Duration::from_secs(5)), Some(key));
        assert_eq!(producer.scheduled_count(), 1);
        assert_eq!(producer.completed_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_runtime_producer_many_keys() {
        let producer = TileProducer::with_config(ProductionConfig {
            min_delay_ms: 1,
            max_delay_ms: 20,
        });
        let keys: Vec<TileKey> = (0..20).map(|col| TileKey::new(0, col, 1)).collect();

        for &key in &keys {
            assert!(producer.request_tile(key).is_none());
        }
        assert_eq!(producer.pending_count(), 20);

        let mut ready = HashSet::default();
        while ready.len() < keys.len() {
            let key = producer
                .wait_ready(Duration::from_secs(5))
                .expect("every scheduled tile completes");
            assert!(ready.insert(key), "duplicate notification for {key}");
        }

        assert!(keys.iter().all(|key| ready.contains(key)));
        assert_eq!(producer.pending_count(), 0);
        assert_eq!(producer.ready_count(), 20);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_surface_from_json_config() {
        let config = TilingConfig::from_json_str(
            r#"{ "surface_size": { "width": 800.0, "height": 800.0 },
                 "production": { "min_delay_ms": 0, "max_delay_ms": 0 } }"#,
        )
        .unwrap();
        let mut surface = TiledSurface::from_config(&config);
        let mut ctx = RenderContext::new(config.surface_size);

        let outcome = surface.redraw(&Bounds::from_coords(0.0, 0.0, 400.0, 400.0), 1.0, &mut ctx);
        assert_eq!(outcome.stalled_at, Some(TileKey::new(0, 0, 0)));

        let key = surface.producer().wait_ready(Duration::from_secs(5));
        assert_eq!(key, Some(TileKey::new(0, 0, 0)));
        let invalidated = surface.on_tile_ready(TileKey::new(0, 0, 0), &mut ctx);
        assert_eq!(invalidated, Some(Bounds::from_origin_size(0.0, 0.0, 400.0, 400.0)));

        let pass = display_pass(&mut ctx, &mut surface, 1.0);
        assert_eq!(pass.tiles_drawn, 1);
    }

    #[test]
    fn test_concurrent_requests_schedule_once() {
        let producer = Arc::new(TileProducer::with_scheduler(
            Arc::new(ThreadScheduler),
            ProductionConfig::fixed(20),
        ));
        let key = TileKey::new(5, 5, 0);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let producer = Arc::clone(&producer);
                thread::spawn(move || {
                    for _ in 0..100 {
                        producer.request_tile(key);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(producer.scheduled_count(), 1);
        assert_eq!(producer.wait_ready(Duration::from_secs(5)), Some(key));
        assert_eq!(producer.wait_ready(Duration::from_millis(100)), None);
        assert_eq!(producer.completed_count(), 1);
    }

    #[test]
    fn test_listener_fires_once_per_key() {
        let scheduler = ManualScheduler::new();
        let producer = TileProducer::with_scheduler(
            Arc::new(scheduler.clone()),
            ProductionConfig::immediate(),
        );
        let a = TileKey::new(0, 0, 0);
        let b = TileKey::new(1, 0, 0);

        for _ in 0..3 {
            producer.request_tile(a);
            producer.request_tile(b);
        }
        scheduler.run_all();
        for _ in 0..3 {
            producer.request_tile(a);
        }

        let mut fired = Vec::new();
        assert_eq!(producer.dispatch_ready(&mut |key: TileKey| fired.push(key)), 2);
        assert_eq!(fired, vec![a, b]);
        assert_eq!(producer.dispatch_ready(&mut |key: TileKey| fired.push(key)), 0);
    }
}
