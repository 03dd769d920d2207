use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tilelet::{
    display_pass, Bounds, Invalidator, PixelCanvas, Size, TiledSurface, TilingConfig, TilingProfile,
    VisibleRegion,
};

/// Window size in device pixels
const WINDOW: Size = Size {
    width: 1200.0,
    height: 800.0,
};

/// Zoom scales visited by the demo, in order
const ZOOM_SEQUENCE: [f64; 3] = [1.0, 2.0, 4.0];

/// Headless demo: zooms a tiled surface in and reports what each step cost.
///
/// Usage: `tilelet-app [config.json] [output.png]`
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => TilingConfig::from_json_file(&path)
            .map_err(|e| anyhow::anyhow!(e))
            .with_context(|| format!("loading config {}", path))?,
        None => TilingProfile::default().resolve(),
    };
    let output = args.next().map(PathBuf::from);

    // The drawing context is a single dedicated thread; production runs on the runtime
    tokio::task::spawn_blocking(move || run(config, output))
        .await
        .context("drawing thread panicked")?
}

fn run(config: TilingConfig, output: Option<PathBuf>) -> Result<()> {
    let mut surface = TiledSurface::from_config(&config);
    let bounds = surface.bounds();
    let mut canvas =
        PixelCanvas::new(bounds.width().ceil() as u32, bounds.height().ceil() as u32);

    log::info!(
        "surface {}x{}, base tile {}x{}, production delay {}..={} ms",
        bounds.width(),
        bounds.height(),
        config.tile_size.width,
        config.tile_size.height,
        config.production.min_delay_ms,
        config.production.max_delay_ms
    );

    for scale in ZOOM_SEQUENCE {
        let region = VisibleRegion::for_window(0.0, 0.0, WINDOW, scale);
        let Some(visible) = region.rect.intersection(&bounds) else {
            log::warn!("window at {}x lies outside the surface, skipping", scale);
            continue;
        };
        zoom_step(&mut surface, &mut canvas, &config, &region, visible)?;
    }

    log::info!(
        "done: {} tile(s) produced, {} still pending",
        surface.producer().completed_count(),
        surface.producer().pending_count()
    );

    if let Some(path) = output {
        canvas
            .save_png(&path)
            .map_err(|e| anyhow::anyhow!(e))
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

/// Invalidate the window once, then pump display passes and ready
/// notifications until no requested tile is still in production
fn zoom_step(
    surface: &mut TiledSurface,
    canvas: &mut PixelCanvas,
    config: &TilingConfig,
    region: &VisibleRegion,
    visible: Bounds,
) -> Result<()> {
    let started = Instant::now();
    let keys = surface.visible_keys(region);
    let timeout = Duration::from_millis(config.production.max_delay_ms) + Duration::from_secs(5);

    canvas.reset_stats();
    canvas.invalidate(visible);

    let mut passes = 0usize;
    let mut tiles_drawn = 0usize;
    loop {
        let pass = display_pass(canvas, surface, region.scale);
        passes += 1;
        tiles_drawn += pass.tiles_drawn;

        if surface.awaiting_count() == 0 {
            break;
        }

        match surface.producer().wait_ready(timeout) {
            Some(key) => {
                surface.on_tile_ready(key, canvas);
                surface.process_ready_tiles(canvas);
            }
            None => bail!(
                "timed out after {:?} waiting for tiles at {}x",
                timeout,
                region.scale
            ),
        }
    }

    let missing = keys.iter().filter(|key| !surface.producer().is_ready(key)).count();
    if missing > 0 {
        log::warn!("zoom {}x finished with {} tile(s) missing", region.scale, missing);
    }

    log::info!(
        "zoom {}x: lod {}, {} visible tile(s), {} pass(es), {} tile draw(s), \
         {} pixel(s) written in {:?}",
        region.scale,
        region.lod(),
        keys.len(),
        passes,
        tiles_drawn,
        canvas.pixels_written(),
        started.elapsed()
    );
    Ok(())
}
