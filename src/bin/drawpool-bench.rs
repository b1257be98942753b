use std::{
    collections::HashMap,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Context as _;
use clap::Parser;
use drawpool::{
    DrawMode, DrawPoolManager, DrawPoolSettings, DrawStats, GeometryBuffer, Light, LightView,
    Painter, Point, PoolType, Rect, RenderState, RenderTarget, Size, Texture, TexturePtr,
};
use serde_json::json;

#[derive(Parser, Debug)]
#[command(name = "drawpool-bench", version)]
/// Simulates frames of a tile map and reports batching statistics.
struct Args {
    /// Number of frames to simulate.
    #[arg(long, default_value_t = 120)]
    frames: u32,

    /// Visible width in tiles.
    #[arg(long, default_value_t = 18)]
    width: i32,

    /// Visible height in tiles.
    #[arg(long, default_value_t = 14)]
    height: i32,

    /// Tile size in pixels.
    #[arg(long, default_value_t = 32)]
    tile_size: u8,

    /// Populate linked pools on worker threads.
    #[arg(long)]
    multi_thread: bool,

    /// Worker thread count.
    #[arg(long)]
    threads: Option<usize>,

    /// Scroll the map every frame, defeating the framed cache.
    #[arg(long)]
    animate: bool,

    /// Render at night so the light pass runs.
    #[arg(long)]
    dark: bool,

    /// Settings JSON, applied before environment and flag overrides.
    #[arg(long)]
    settings: Option<PathBuf>,
}

/// Painter that only counts what it would have submitted.
#[derive(Debug, Default)]
struct CountingPainter {
    state_changes: u64,
    draw_calls: u64,
    vertices: u64,
    target_binds: u64,
    composites: u64,
}

impl Painter for CountingPainter {
    fn execute_state(&mut self, _state: &RenderState) {
        self.state_changes += 1;
    }

    fn set_texture(&mut self, _texture: Option<&Texture>) {}

    fn draw_coords(&mut self, coords: &GeometryBuffer, _mode: DrawMode) {
        self.draw_calls += 1;
        self.vertices += coords.vertex_count() as u64;
    }

    fn save_and_reset_state(&mut self) {}

    fn restore_saved_state(&mut self) {}

    fn sync_target(&mut self, _target: &RenderTarget) {}

    fn bind_target(&mut self, _target: &RenderTarget) {
        self.target_binds += 1;
    }

    fn release_target(&mut self, _target: &RenderTarget) {}

    fn draw_target(&mut self, _target: &RenderTarget, _dest: Rect, _src: Rect) {
        self.composites += 1;
    }
}

struct Tileset {
    ground: TexturePtr,
    wall: TexturePtr,
    glyphs: TexturePtr,
    lighting: HashMap<String, TexturePtr>,
}

impl Tileset {
    fn new(tile: i32) -> Self {
        let texture = |w, h| Texture::new(Size::new(w, h)).into_ptr();
        Self {
            ground: Texture::new(Size::square(tile))
                .superimposable(true)
                .into_ptr(),
            wall: Texture::new(Size::square(tile)).opaque(true).into_ptr(),
            glyphs: texture(256, 256),
            lighting: HashMap::from([
                (drawpool::LIGHT_TEXTURE.to_string(), texture(64, 64)),
                (drawpool::SHADE_TEXTURE.to_string(), texture(tile, tile)),
            ]),
        }
    }
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.width <= 0 || args.height <= 0 {
        anyhow::bail!("--width/--height must be > 0");
    }
    if args.tile_size == 0 {
        anyhow::bail!("--tile-size must be > 0");
    }

    let settings = load_settings(&args)?;
    let mut manager = DrawPoolManager::new(settings.clone())?;

    let tile = i32::from(args.tile_size);
    let grid = Size::new(args.width, args.height);
    let viewport = Rect::from_point_size(Point::default(), grid * tile);
    let tiles = Tileset::new(tile);

    manager.create_framed_pool(PoolType::Map);
    manager.create_pool(PoolType::CreatureInformation);
    manager.create_framed_pool(PoolType::Light);
    manager.create_pool(PoolType::Text);
    manager.create_pool(PoolType::Foreground);
    manager
        .framed_mut(PoolType::Map)
        .context("map pool is framed")?
        .resize(viewport.size());

    let mut light = LightView::new(&tiles.lighting)?;
    light.resize(&mut manager, grid, args.tile_size)?;
    light.set_global_light(if args.dark {
        Light::new(40, 215)
    } else {
        Light::new(u8::MAX, 215)
    });

    let glyphs = tiles.glyphs.clone();
    manager.link(PoolType::Foreground, move |ctx| {
        for i in 0..8 {
            ctx.add_textured_rect_src(
                Rect::new(4 + i * 7, 4, 7, 12),
                &glyphs,
                Rect::new(i * 7, 0, 7, 12),
            );
        }
    })?;

    eprintln!(
        "bench: {frames} frames, {w}x{h} tiles @ {tile}px, multi_thread={mt}, threads={threads}, animate={animate}, dark={dark}",
        frames = args.frames,
        w = args.width,
        h = args.height,
        mt = settings.multi_thread,
        threads = settings
            .threads
            .map(|n| n.to_string())
            .unwrap_or_else(|| "auto".to_string()),
        animate = args.animate,
        dark = args.dark,
    );

    let mut painter = CountingPainter::default();
    let mut totals = DrawStats::default();
    let mut elapsed = Duration::ZERO;

    for frame in 0..args.frames {
        let start = Instant::now();
        let scroll = if args.animate {
            (frame as i32) % tile
        } else {
            0
        };

        manager.use_pool(PoolType::Map, |ctx| {
            ctx.use_frame(viewport, viewport, drawpool::Color::BLACK);
            for y in 0..grid.height {
                for x in 0..grid.width {
                    let origin = Point::new(x, y);
                    let dest = Rect::new(x * tile - scroll, y * tile, tile, tile);
                    let src = Rect::from_point_size(Point::default(), Size::square(tile));
                    ctx.add_textured_rect_at(dest, &tiles.ground, src, origin);
                    if (x + y) % 7 == 0 {
                        ctx.add_textured_rect_at(dest, &tiles.wall, src, origin);
                    }
                    if (x * 3 + y) % 11 == 0 {
                        let center = Point::new(x * tile + tile / 2, y * tile + tile / 2);
                        light.add_light_source(ctx, center, Light::new(2, 215));
                    }
                }
            }
        })?;

        manager.use_pool(PoolType::CreatureInformation, |ctx| {
            ctx.set_color(drawpool::Color::rgba(0, 192, 0, 255));
            for i in 0..4 {
                let bar = Rect::new(i * tile * 3, tile, tile, 4);
                ctx.add_filled_rect(bar);
                ctx.add_bounding_rect(Rect::new(bar.x - 1, bar.y - 1, bar.width + 2, 6), 1);
            }
        })?;

        manager.use_pool(LightView::POOL, |ctx| light.draw(ctx, viewport, viewport))?;

        totals += manager.draw(&mut painter);
        elapsed += start.elapsed();
    }

    manager.terminate();

    let report = json!({
        "frames": args.frames,
        "multi_thread": settings.multi_thread,
        "elapsed_ms": elapsed.as_secs_f64() * 1000.0,
        "stats": totals,
        "painter": {
            "state_changes": painter.state_changes,
            "draw_calls": painter.draw_calls,
            "vertices": painter.vertices,
            "target_binds": painter.target_binds,
            "composites": painter.composites,
        },
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn load_settings(args: &Args) -> anyhow::Result<DrawPoolSettings> {
    let mut settings = match &args.settings {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("read settings '{}'", path.display()))?;
            DrawPoolSettings::from_json_str(&raw)
                .with_context(|| format!("parse settings '{}'", path.display()))?
        }
        None => DrawPoolSettings::default(),
    }
    .with_env_overrides()?;

    if args.multi_thread {
        settings.multi_thread = true;
    }
    if args.threads.is_some() {
        settings.threads = args.threads;
    }
    settings.validate()?;
    Ok(settings)
}
