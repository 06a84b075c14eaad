//! First-person software raycaster.
//!
//! ```bash
//! cargo run --release -- [walls.txt] [--floor f.txt] [--ceiling c.txt]
//! ```

use std::{
    f32::consts::PI,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Context;
use clap::Parser;
use glam::{Vec2, vec2};
use minifb::{Key, Window, WindowOptions};
use tracing_subscriber::EnvFilter;

use raycast_rs::{
    config::RenderConfig,
    engine::{Engine, FlatSource},
    map::{demo_grid, load_grid},
    renderer::Software,
    sim::TicRunner,
    world::{
        Animation, Behavior, Camera, DirectionalViews, Layer, Palette, SpriteFlags, SpriteRecord,
        SpriteVisual, TILE_SIZE, TRANSPARENT, Texture, TextureBank, TextureId, TileGrid,
        TileTextures,
    },
};

const MOVE_SPEED: f32 = 3.0; // cells / second
const TURN_RATE: f32 = PI; // rad / second
const TILT_RATE: f32 = 300.0; // px / second
const EYE_RATE: f32 = 1.0; // eye units / second
const PLAYER_RADIUS: f32 = 0.2;

#[derive(Parser, Debug)]
#[command(about = "First-person grid raycaster (software renderer)")]
struct Args {
    /// Wall grid; the built-in demo level when omitted.
    map: Option<PathBuf>,
    /// Floor tile grid, same shape as the wall grid.
    #[arg(long)]
    floor: Option<PathBuf>,
    /// Ceiling tile grid, same shape as the wall grid.
    #[arg(long)]
    ceiling: Option<PathBuf>,
    #[arg(long, default_value_t = 640)]
    width: usize,
    #[arg(long, default_value_t = 400)]
    height: usize,
    /// Cast every N-th column.
    #[arg(long, default_value_t = 1)]
    resolution: usize,
    /// Horizontal field of view in degrees.
    #[arg(long, default_value_t = 90.0)]
    fov: f32,
    #[arg(long, default_value_t = TILE_SIZE)]
    tile_size: f32,
    /// Paint the floor with one map-wide atlas instead of per-tile textures.
    #[arg(long)]
    atlas: bool,
    /// Keep floor and ceiling on the render thread.
    #[arg(long)]
    sequential: bool,
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let grid = match &args.map {
        Some(walls) => load_grid(walls, args.floor.as_ref(), args.ceiling.as_ref(), args.tile_size)
            .with_context(|| format!("loading {}", walls.display()))?,
        None => demo_grid()?,
    };

    let cfg = RenderConfig {
        width: args.width,
        height: args.height,
        resolution: args.resolution,
        fov_deg: args.fov,
        parallel_planes: !args.sequential,
        ..RenderConfig::default()
    };

    let (bank, tiles, demo) = build_textures()?;
    let floor = if args.atlas {
        FlatSource::Atlas {
            tex: demo.atlas,
            pixels_per_cell: 32.0,
        }
    } else if grid.has_layer(Layer::Floor) {
        FlatSource::PerTile { layer: Layer::Floor }
    } else {
        FlatSource::Uniform(demo.floor)
    };
    let ceiling = if grid.has_layer(Layer::Ceiling) {
        FlatSource::PerTile {
            layer: Layer::Ceiling,
        }
    } else {
        FlatSource::Uniform(demo.ceiling)
    };

    let start = find_start(&grid).context("map has no empty cell to start in")?;
    let mut sim = TicRunner::new();
    spawn_sprites(&mut sim, &grid, &demo);

    let mut engine = Engine::new(Software::default(), grid, tiles, bank, cfg)?;
    engine.set_planes(Some(floor), Some(ceiling));

    let mut camera = Camera::new(start, 0.0, cfg.fov());

    let mut win = Window::new(
        "Raycaster Software Render",
        cfg.width,
        cfg.height,
        WindowOptions::default(),
    )?;
    win.set_target_fps(60);

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();
    let mut last_frame = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let dt = last_frame.elapsed().as_secs_f32().min(0.1);
        last_frame = Instant::now();

        handle_input(&win, &mut camera, &engine.grid, dt);
        sim.pump();

        let t0 = Instant::now();
        let mut shown = Ok(());
        {
            let mut sprites = sim.sprites();
            engine.render_frame(&camera, sprites.iter().map(|(_, s)| s), |fb, w, h| {
                acc_time += t0.elapsed();
                acc_frames += 1;
                shown = win.update_with_buffer(fb, w, h);
            });
        }
        shown?;

        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames.max(1) as f64;
            let fps = 1000.0 / avg_ms;
            tracing::info!("avg render: {:.2} ms  ({:.1} FPS)", avg_ms, fps);
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/* ---------------------------------------------------------------------- */
/*                                 input                                   */
/* ---------------------------------------------------------------------- */

fn handle_input(win: &Window, cam: &mut Camera, grid: &TileGrid, dt: f32) {
    let key = |k| win.is_key_down(k);

    let mut forward = 0.0;
    let mut strafe = 0.0;
    if key(Key::Up) || key(Key::W) {
        forward += 1.0;
    }
    if key(Key::Down) || key(Key::S) {
        forward -= 1.0;
    }
    if key(Key::A) {
        strafe -= 1.0;
    }
    if key(Key::D) {
        strafe += 1.0;
    }
    if key(Key::Left) {
        cam.turn(-TURN_RATE * dt);
    }
    if key(Key::Right) {
        cam.turn(TURN_RATE * dt);
    }
    if key(Key::PageUp) {
        cam.tilt -= TILT_RATE * dt;
    }
    if key(Key::PageDown) {
        cam.tilt += TILT_RATE * dt;
    }
    if key(Key::Home) {
        cam.tilt = 0.0;
    }
    if key(Key::Q) {
        cam.set_eye_height(cam.eye_height() + EYE_RATE * dt);
    }
    if key(Key::E) {
        cam.set_eye_height(cam.eye_height() - EYE_RATE * dt);
    }

    let speed = (if key(Key::LeftShift) { 2.0 } else { 1.0 }) * MOVE_SPEED * dt;
    let wish = cam.forward() * forward + cam.forward().perp() * strafe;
    let step = wish.normalize_or_zero() * speed;

    // slide along walls: try each axis on its own
    let free = |p: Vec2| {
        let r = PLAYER_RADIUS;
        [vec2(-r, -r), vec2(r, -r), vec2(-r, r), vec2(r, r)]
            .iter()
            .all(|o| !grid.is_wall((p + *o).floor().as_ivec2()))
    };
    let try_x = cam.pos + vec2(step.x, 0.0);
    if free(try_x) {
        cam.pos = try_x;
    }
    let try_y = cam.pos + vec2(0.0, step.y);
    if free(try_y) {
        cam.pos = try_y;
    }
}

fn find_start(grid: &TileGrid) -> Option<Vec2> {
    grid.cells(Layer::Walls)
        .find(|&(_, t)| t == 0)
        .map(|(c, _)| c.as_vec2() + Vec2::splat(0.5))
}

/* ---------------------------------------------------------------------- */
/*                         procedural assets                               */
/* ---------------------------------------------------------------------- */

/// Texture ids the demo refers to outside the tile table.
struct DemoTextures {
    floor: TextureId,
    ceiling: TextureId,
    atlas: TextureId,
    barrel: TextureId,
    orb: TextureId,
    flame: Vec<TextureId>,
    statue: Vec<TextureId>,
}

/// rrrgggbb palette index.
const fn rgb(r: u8, g: u8, b: u8) -> u8 {
    (r << 5) | (g << 2) | b
}

fn build_textures() -> anyhow::Result<(TextureBank, TileTextures, DemoTextures)> {
    let mut bank = TextureBank::default_with_checker();
    bank.set_palette(Palette::rgb332());
    let mut tiles = TileTextures::default();

    let brick = bank.insert("BRICK", bricks("BRICK", rgb(5, 1, 0), rgb(4, 4, 2))?)?;
    let stone = bank.insert("STONE", blocks("STONE", rgb(4, 4, 2), rgb(3, 3, 1), 16)?)?;
    let wood = bank.insert("WOOD", planks("WOOD", rgb(5, 3, 0), rgb(3, 2, 0))?)?;
    let tile = bank.insert("TILE", blocks("TILE", rgb(1, 3, 3), rgb(0, 2, 2), 8)?)?;
    let floor = bank.insert("FLOOR", blocks("FLOOR", rgb(3, 3, 1), rgb(2, 2, 1), 32)?)?;
    let rug = bank.insert("RUG", blocks("RUG", rgb(5, 0, 1), rgb(6, 5, 0), 4)?)?;
    let ceiling = bank.insert("CEIL", blocks("CEIL", rgb(2, 2, 2), rgb(1, 1, 1), 64)?)?;
    let atlas = bank.insert("ATLAS", swirl("ATLAS", 256)?)?;

    for (id, tex) in [(1, brick), (2, stone), (3, wood), (4, tile), (5, floor), (6, rug), (7, ceiling)] {
        tiles.bind(id, tex);
    }

    let barrel = bank.insert("BARREL", disc("BARREL", rgb(2, 4, 0), None)?)?;
    let orb = bank.insert("ORB", disc("ORB", rgb(7, 7, 1), None)?)?;
    let mut flame = Vec::new();
    for (i, c) in [rgb(7, 2, 0), rgb(7, 4, 0), rgb(7, 6, 0)].into_iter().enumerate() {
        let name = format!("FLAME{i}");
        flame.push(bank.insert(name.clone(), disc(&name, c, None)?)?);
    }
    let mut statue = Vec::new();
    for i in 0..8 {
        let name = format!("STATUE{i}");
        statue.push(bank.insert(name.clone(), disc(&name, rgb(4, 4, 3), Some(i))?)?);
    }

    tracing::info!(textures = bank.len(), "procedural textures ready");
    Ok((
        bank,
        tiles,
        DemoTextures {
            floor,
            ceiling,
            atlas,
            barrel,
            orb,
            flame,
            statue,
        },
    ))
}

fn bricks(name: &str, brick: u8, mortar: u8) -> anyhow::Result<Texture> {
    const N: usize = 64;
    let mut px = vec![brick; N * N];
    for y in 0..N {
        let shift = if (y / 16) % 2 == 0 { 0 } else { 16 };
        for x in 0..N {
            if y % 16 == 0 || (x + shift) % 32 == 0 {
                px[y * N + x] = mortar;
            }
        }
    }
    Ok(Texture::new(name, N, N, px)?)
}

fn blocks(name: &str, a: u8, b: u8, cell: usize) -> anyhow::Result<Texture> {
    const N: usize = 64;
    let mut px = vec![a; N * N];
    for y in 0..N {
        for x in 0..N {
            if ((x / cell) + (y / cell)) % 2 == 1 {
                px[y * N + x] = b;
            }
        }
    }
    Ok(Texture::new(name, N, N, px)?)
}

fn planks(name: &str, light: u8, dark: u8) -> anyhow::Result<Texture> {
    const N: usize = 64;
    let mut px = vec![light; N * N];
    for y in 0..N {
        for x in 0..N {
            if x % 16 == 0 || (x % 16 == 8 && y % 24 < 2) {
                px[y * N + x] = dark;
            }
        }
    }
    Ok(Texture::new(name, N, N, px)?)
}

fn swirl(name: &str, n: usize) -> anyhow::Result<Texture> {
    let mut px = vec![0u8; n * n];
    let c = n as f32 * 0.5;
    for y in 0..n {
        for x in 0..n {
            let d = vec2(x as f32 - c, y as f32 - c);
            let ring = ((d.length() / 12.0 + d.to_angle() * 2.0) as i32).rem_euclid(4) as u8;
            px[y * n + x] = rgb(1 + ring, 1, 3 - ring.min(3));
        }
    }
    Ok(Texture::new(name, n, n, px)?)
}

/// Round sprite on a transparent background; `notch` marks one of eight
/// directions so directional views are told apart.
fn disc(name: &str, colour: u8, notch: Option<usize>) -> anyhow::Result<Texture> {
    const N: usize = 32;
    let mut px = vec![TRANSPARENT; N * N];
    let c = N as f32 * 0.5;
    for y in 0..N {
        for x in 0..N {
            let d = vec2(x as f32 + 0.5 - c, y as f32 + 0.5 - c);
            if d.length() < c - 1.0 {
                px[y * N + x] = colour;
            }
        }
    }
    if let Some(k) = notch {
        let x0 = 2 + k * 3;
        for y in 4..N - 4 {
            for x in x0..x0 + 3 {
                if px[y * N + x] != TRANSPARENT {
                    px[y * N + x] = rgb(0, 0, 3);
                }
            }
        }
    }
    Ok(Texture::new(name, N, N, px)?)
}

fn spawn_sprites(sim: &mut TicRunner, grid: &TileGrid, demo: &DemoTextures) {
    let mut free = grid
        .cells(Layer::Walls)
        .filter(|&(_, t)| t == 0)
        .map(|(c, _)| c.as_vec2() + Vec2::splat(0.5))
        .skip(3)
        .step_by(7);

    if let Some(p) = free.next() {
        sim.spawn_sprite(SpriteRecord::still(p, demo.barrel).with_scale(1.5, 1.5));
    }
    if let Some(p) = free.next() {
        sim.spawn_sprite(
            SpriteRecord::still(p, demo.orb)
                .with_scale(3.0, 3.0)
                .with_flags(SpriteFlags::FULLBRIGHT)
                .with_behavior(Behavior::Oscillating {
                    base_z: 0.5,
                    amplitude: 0.2,
                    period: 2.0,
                }),
        );
    }
    if let Some(p) = free.next() {
        let anim = Animation::with_fps(&demo.flame, 8.0, true);
        sim.spawn_sprite(
            SpriteRecord::new(p, SpriteVisual::Animated(anim))
                .with_scale(2.0, 1.5)
                .with_flags(SpriteFlags::FULLBRIGHT),
        );
    }
    if let Some(p) = free.next() {
        let views = DirectionalViews::evenly_spaced(0.0, &demo.statue);
        sim.spawn_sprite(SpriteRecord::new(p, SpriteVisual::Directional(views)).with_facing(90.0));
    }
    for p in free.take(6) {
        sim.spawn_sprite(SpriteRecord::still(p, demo.barrel).with_scale(1.5, 1.5));
    }
    tracing::info!(sprites = sim.len(), "sprites spawned");
}
