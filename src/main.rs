//! Top-down grid viewer: walls, the camera and its fan of cast rays.
//!
//! ```bash
//! cargo run --release --bin raycast_rs -- [walls.txt] [--rays 64]
//! ```

use std::{f32::consts::PI, path::PathBuf, time::Instant};

use anyhow::Context;
use clap::Parser;
use glam::{Vec2, vec2};
use minifb::{Key, Window, WindowOptions};
use tracing_subscriber::EnvFilter;

use raycast_rs::{
    engine::{WallSide, cast},
    map::{demo_grid, load_grid},
    world::{Camera, EMPTY, Layer, TILE_SIZE, TileGrid},
};

const WIDTH: usize = 1024;
const HEIGHT: usize = 768;

const BACKGROUND: u32 = 0x00_101010;
const GRID_LINE: u32 = 0x00_303030;
const RAY_VERTICAL: u32 = 0x00_E0C040;
const RAY_HORIZONTAL: u32 = 0x00_A08020;
const CAMERA: u32 = 0x00_40FF40;

#[derive(Parser, Debug)]
#[command(about = "Top-down view of a grid map and its cast rays")]
struct Args {
    /// Wall grid; the built-in demo level when omitted.
    map: Option<PathBuf>,
    /// Number of rays in the fan.
    #[arg(long, default_value_t = 64)]
    rays: usize,
    /// Horizontal field of view in degrees.
    #[arg(long, default_value_t = 90.0)]
    fov: f32,
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let default = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();

    // ─────────── load map ───────
    let grid = match &args.map {
        Some(walls) => load_grid(walls, None, None, TILE_SIZE)
            .with_context(|| format!("loading {}", walls.display()))?,
        None => demo_grid()?,
    };
    let start = grid
        .cells(Layer::Walls)
        .find(|&(_, t)| t == EMPTY)
        .map(|(c, _)| c.as_vec2() + Vec2::splat(0.5))
        .context("map has no empty cell")?;
    let mut camera = Camera::new(start, 0.0, args.fov.to_radians());

    // ─────────── grid‑space → screen‑space transform ────────────
    let scale = (WIDTH as f32 / grid.width() as f32).min(HEIGHT as f32 / grid.height() as f32) * 0.95;
    let offset = vec2(
        (WIDTH as f32 - grid.width() as f32 * scale) / 2.0,
        (HEIGHT as f32 - grid.height() as f32 * scale) / 2.0,
    );
    let to_screen = |p: Vec2| -> (i32, i32) {
        let s = p * scale + offset;
        (s.x as i32, s.y as i32)
    };

    let mut buffer = vec![0u32; WIDTH * HEIGHT];
    let mut window = Window::new("Raycaster map", WIDTH, HEIGHT, WindowOptions::default())?;
    window.set_target_fps(60);
    let mut last = Instant::now();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let dt = last.elapsed().as_secs_f32().min(0.1);
        last = Instant::now();
        steer(&window, &mut camera, &grid, dt);

        buffer.fill(BACKGROUND);
        draw_cells(&mut buffer, &grid, scale, offset);

        // ─────────── ray fan ────────────
        let origin = to_screen(camera.pos);
        let n = args.rays.max(1);
        let mut hits = 0;
        for i in 0..n {
            let ray = camera.column_ray(i * WIDTH / n, WIDTH);
            let (end, colour) = match cast(&grid, camera.pos, ray) {
                Some(hit) => {
                    hits += 1;
                    let colour = match hit.side {
                        WallSide::Vertical => RAY_VERTICAL,
                        WallSide::Horizontal => RAY_HORIZONTAL,
                    };
                    (camera.pos + ray * hit.distance, colour)
                }
                // ran off the grid: draw to the map edge
                None => (camera.pos + ray.normalize_or_zero() * (grid.width() + grid.height()) as f32, GRID_LINE),
            };
            let (x1, y1) = to_screen(end);
            draw_line(&mut buffer, WIDTH, HEIGHT, origin.0, origin.1, x1, y1, colour);
        }
        tracing::trace!(hits, rays = n, "fan cast");

        // ─────────── camera marker ────────────
        let nose = to_screen(camera.pos + camera.forward() * 0.6);
        draw_line(&mut buffer, WIDTH, HEIGHT, origin.0, origin.1, nose.0, nose.1, CAMERA);
        fill_rect(&mut buffer, origin.0 - 3, origin.1 - 3, 7, 7, CAMERA);

        window.update_with_buffer(&buffer, WIDTH, HEIGHT)?;
    }
    Ok(())
}

fn steer(win: &Window, cam: &mut Camera, grid: &TileGrid, dt: f32) {
    let mut forward = 0.0;
    if win.is_key_down(Key::Up) || win.is_key_down(Key::W) {
        forward += 1.0;
    }
    if win.is_key_down(Key::Down) || win.is_key_down(Key::S) {
        forward -= 1.0;
    }
    if win.is_key_down(Key::Left) || win.is_key_down(Key::A) {
        cam.turn(-PI * dt);
    }
    if win.is_key_down(Key::Right) || win.is_key_down(Key::D) {
        cam.turn(PI * dt);
    }
    let next = cam.pos + cam.forward() * forward * 3.0 * dt;
    if !grid.is_wall(next.floor().as_ivec2()) {
        cam.pos = next;
    }
}

/// Wall cells in a colour derived from their tile id, empty cells outlined.
fn draw_cells(buf: &mut [u32], grid: &TileGrid, scale: f32, offset: Vec2) {
    let size = scale.ceil() as i32;
    for (cell, tile) in grid.cells(Layer::Walls) {
        let p = cell.as_vec2() * scale + offset;
        let (x, y) = (p.x as i32, p.y as i32);
        if tile == EMPTY {
            draw_line(buf, WIDTH, HEIGHT, x, y, x + size, y, GRID_LINE);
            draw_line(buf, WIDTH, HEIGHT, x, y, x, y + size, GRID_LINE);
        } else {
            fill_rect(buf, x, y, size, size, tile_colour(tile));
        }
    }
}

fn tile_colour(tile: u16) -> u32 {
    // spread ids over the hue wheel
    let h = (tile as u32).wrapping_mul(97) % 360;
    let (r, g, b) = match h / 120 {
        0 => (255 - h * 2, h * 2, 60),
        1 => (60, 255 - (h - 120) * 2, (h - 120) * 2),
        _ => ((h - 240) * 2, 60, 255 - (h - 240) * 2),
    };
    (r << 16) | (g << 8) | b
}

fn fill_rect(buf: &mut [u32], x: i32, y: i32, w: i32, h: i32, colour: u32) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(WIDTH as i32);
    let y1 = (y + h).min(HEIGHT as i32);
    for yy in y0..y1 {
        let row = yy as usize * WIDTH;
        for xx in x0..x1 {
            buf[row + xx as usize] = colour;
        }
    }
}

/// Integer Bresenham line‑drawing algorithm.
#[allow(clippy::too_many_arguments)]
fn draw_line(
    buf: &mut [u32],
    w: usize,
    h: usize,
    mut x0: i32,
    mut y0: i32,
    x1: i32,
    y1: i32,
    colour: u32,
) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if (0..w as i32).contains(&x0) && (0..h as i32).contains(&y0) {
            buf[y0 as usize * w + x0 as usize] = colour;
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            if x0 == x1 {
                break;
            }
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            if y0 == y1 {
                break;
            }
            err += dx;
            y0 += sy;
        }
    }
}
