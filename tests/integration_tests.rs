use std::sync::Arc;
use tilelet::prelude::*;

/// End-to-end scenarios: a surface, a deterministic producer and an in-crate host
#[cfg(test)]
mod integration_tests {
    use super::*;
    use image::Rgba;

    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const BROWN: Rgba<u8> = Rgba([153, 102, 51, 255]);

    fn surface_with(scheduler: &ManualScheduler, size: f64) -> TiledSurface {
        let producer = TileProducer::with_scheduler(
            Arc::new(scheduler.clone()),
            ProductionConfig::immediate(),
        );
        let mut surface = TiledSurface::new(producer, Size::square(400.0));
        surface.set_bounds(Bounds::from_size(Size::square(size)));
        surface
    }

    /// Invalidate `rect` once, then run display passes until nothing is in
    /// production, completing jobs between passes. Returns the keys of a
    /// final full redraw of `rect`, which must find every tile ready.
    fn pump<H: SurfaceHost>(
        host: &mut H,
        surface: &mut TiledSurface,
        scheduler: &ManualScheduler,
        rect: Bounds,
        scale: f64,
    ) -> Vec<TileKey> {
        host.invalidate(rect);

        for _ in 0..1000 {
            display_pass(host, surface, scale);
            if surface.awaiting_count() == 0 {
                let mut check = RenderContext::new(surface.bounds().size());
                let outcome = surface.redraw(&rect, scale, &mut check);
                assert!(outcome.is_complete(), "tile {:?} never requested", outcome.stalled_at);
                return outcome.drawn;
            }
            scheduler.run_all();
            surface.process_ready_tiles(host);
        }
        panic!("surface never finished drawing {:?}", rect);
    }

    #[test]
    fn test_scale_one_draws_four_tiles_row_major() {
        println!("🧪 [TEST] scale 1 over (0,0)-(800,800)");
        let scheduler = ManualScheduler::new();
        let mut surface = surface_with(&scheduler, 2000.0);
        let mut ctx = RenderContext::new(Size::square(2000.0));

        let window = Bounds::from_coords(0.0, 0.0, 800.0, 800.0);
        let order = pump(&mut ctx, &mut surface, &scheduler, window, 1.0);

        assert_eq!(
            order,
            vec![
                TileKey::new(0, 0, 0),
                TileKey::new(0, 1, 0),
                TileKey::new(1, 0, 0),
                TileKey::new(1, 1, 0),
            ]
        );
        assert_eq!(surface.producer().scheduled_count(), 4);
        assert_eq!(surface.producer().completed_count(), 4);
        println!("✅ [TEST] four LOD 0 tiles drawn in order");
    }

    #[test]
    fn test_scale_four_draws_sixty_four_tiles() {
        let scheduler = ManualScheduler::new();
        let mut surface = surface_with(&scheduler, 2000.0);
        let mut ctx = RenderContext::new(Size::square(2000.0));

        let window = Bounds::from_coords(0.0, 0.0, 800.0, 800.0);
        let order = pump(&mut ctx, &mut surface, &scheduler, window, 4.0);

        assert_eq!(order.len(), 64);
        assert!(order.iter().all(|key| key.lod == 2));
        assert_eq!(order[63], TileKey::new(7, 7, 2));
        // Each tile scheduled exactly once however many passes it took
        assert_eq!(surface.producer().scheduled_count(), 64);
    }

    #[test]
    fn test_single_invalidation_covers_window() {
        println!("🧪 [TEST] one window invalidation on the pixel canvas");
        let scheduler = ManualScheduler::new();
        let mut surface = surface_with(&scheduler, 800.0);
        let mut canvas = PixelCanvas::new(800, 800);

        canvas.invalidate(Bounds::from_coords(0.0, 0.0, 800.0, 800.0));
        let pass = display_pass(&mut canvas, &mut surface, 1.0);
        assert_eq!(pass.redrawn.len(), 4);
        assert_eq!(pass.stalled, 4);
        assert_eq!(surface.producer().scheduled_count(), 4);

        scheduler.run_all();
        assert_eq!(surface.process_ready_tiles(&mut canvas), 4);
        let pass = display_pass(&mut canvas, &mut surface, 1.0);

        assert_eq!(pass.tiles_drawn, 4);
        assert_eq!(pass.stalled, 0);
        assert_eq!(canvas.count_pixels(BLUE), 640_000);
        assert!(canvas.pending_dirty().is_empty());
        assert_eq!(surface.awaiting_count(), 0);
        assert_eq!(surface.producer().scheduled_count(), 4);
        println!("✅ [TEST] window filled without a second invalidation");
    }

    #[test]
    fn test_ready_invalidation_is_exactly_the_tile() {
        let scheduler = ManualScheduler::new();
        let mut surface = surface_with(&scheduler, 2000.0);
        let mut ctx = RenderContext::new(Size::square(2000.0));

        ctx.invalidate(Bounds::from_origin_size(600.0, 400.0, 200.0, 200.0));
        let pass = display_pass(&mut ctx, &mut surface, 2.0);
        assert_eq!(pass.stalled, 1);
        assert_eq!(surface.producer().state(&TileKey::new(2, 3, 1)), TileState::Pending);

        scheduler.run_all();
        let before = ctx.invalidations().len();
        surface.process_ready_tiles(&mut ctx);

        assert_eq!(
            &ctx.invalidations()[before..],
            &[Bounds::from_origin_size(600.0, 400.0, 200.0, 200.0)]
        );
    }

    #[test]
    fn test_redraw_after_ready_stays_inside_invalidation() {
        println!("🧪 [TEST] narrow redraw on the recording host");
        let scheduler = ManualScheduler::new();
        let mut surface = surface_with(&scheduler, 2000.0);
        let mut ctx = RenderContext::new(Size::square(2000.0));

        // Whole window requested at 2x; only the first tile arrives
        ctx.invalidate(Bounds::from_coords(0.0, 0.0, 600.0, 400.0));
        let pass = display_pass(&mut ctx, &mut surface, 2.0);
        assert_eq!(pass.stalled, 6);
        assert!(scheduler.run_next());
        assert_eq!(surface.process_ready_tiles(&mut ctx), 1);

        ctx.begin_frame();
        let pass = display_pass(&mut ctx, &mut surface, 2.0);

        let tile = Bounds::from_origin_size(0.0, 0.0, 200.0, 200.0);
        assert_eq!(pass.redrawn, vec![tile]);
        assert_eq!(ctx.redraws(), &[tile]);
        assert_eq!(ctx.drawn_keys(), vec![TileKey::new(0, 0, 1)]);
        assert!(ctx
            .drawing_queue()
            .iter()
            .all(|command| tile.contains_bounds(command.bounds())));
        println!("✅ [TEST] only the invalidated tile was redrawn");
    }

    #[test]
    fn test_pixel_canvas_redraw_touches_only_invalidated_pixels() {
        let scheduler = ManualScheduler::new();
        let mut surface = surface_with(&scheduler, 800.0);
        let mut canvas = PixelCanvas::new(800, 800);
        let whole = Bounds::from_coords(0.0, 0.0, 800.0, 800.0);

        // Fill the canvas at LOD 0
        pump(&mut canvas, &mut surface, &scheduler, whole, 1.0);
        assert_eq!(canvas.count_pixels(BLUE), 640_000);

        // Zoom to 2x and let a single LOD 1 tile arrive
        canvas.invalidate(Bounds::from_origin_size(600.0, 400.0, 200.0, 200.0));
        display_pass(&mut canvas, &mut surface, 2.0);
        scheduler.run_all();
        assert_eq!(surface.process_ready_tiles(&mut canvas), 1);

        canvas.reset_stats();
        let pass = display_pass(&mut canvas, &mut surface, 2.0);

        assert_eq!(pass.tiles_drawn, 1);
        assert_eq!(canvas.pixels_written(), 40_000);
        assert_eq!(canvas.count_pixels(BROWN), 40_000);
        assert_eq!(canvas.count_pixels(BLUE), 600_000);
        assert_eq!(canvas.pixel(600, 400), Some(BROWN));
        assert_eq!(canvas.pixel(799, 599), Some(BROWN));
        assert_eq!(canvas.pixel(599, 400), Some(BLUE));
        assert_eq!(canvas.pixel(600, 600), Some(BLUE));
    }

    #[test]
    fn test_tiles_at_surface_edge_are_clipped() {
        let scheduler = ManualScheduler::new();
        let mut surface = surface_with(&scheduler, 500.0);
        let mut canvas = PixelCanvas::new(600, 600);

        let window = Bounds::from_coords(0.0, 0.0, 500.0, 500.0);
        pump(&mut canvas, &mut surface, &scheduler, window, 1.0);

        assert_eq!(canvas.count_pixels(BLUE), 250_000);
        assert_eq!(canvas.pixel(499, 499), Some(BLUE));
        assert_eq!(canvas.pixel(500, 499), Some(PixelCanvas::BACKGROUND));
    }

    #[test]
    fn test_visible_region_matches_redraw() {
        let scheduler = ManualScheduler::new();
        let mut surface = surface_with(&scheduler, 2000.0);
        let mut ctx = RenderContext::new(Size::square(2000.0));
        let region = VisibleRegion::for_window(400.0, 400.0, Size::new(1200.0, 800.0), 4.0);

        let expected = surface.visible_keys(&region);
        let order = pump(&mut ctx, &mut surface, &scheduler, region.rect, region.scale);

        assert_eq!(order, expected);
        assert_eq!(expected.len(), 6);
        assert_eq!(expected[0], TileKey::new(4, 4, 2));
    }
}
