//! DDA grid traversal.
//!
//! Rays are cast in grid-local units.  `cast` reports distances along the
//! ray's own parametrisation: for a per-column ray `dir + plane * cx` that
//! is the perpendicular distance to the camera plane, which keeps walls
//! free of fisheye bending.

use glam::{IVec2, Vec2, ivec2};

use crate::{
    engine::types::WallSide,
    world::{TileGrid, TileId},
};

/// First wall a ray runs into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Ray parameter at the hit, in multiples of `|dir|`.
    pub distance: f32,
    pub side: WallSide,
    /// Fractional position along the wall face, `0..1`, mirrored on the
    /// west- and north-looking faces so texture columns grow with screen x.
    pub wall_frac: f32,
    pub tile: TileId,
    pub cell: IVec2,
}

impl RayHit {
    /// Texture column for a texture `w` texels wide.
    #[inline]
    pub fn texture_column(&self, w: usize) -> usize {
        ((self.wall_frac * w as f32) as usize).min(w.saturating_sub(1))
    }
}

/// Walk `grid` from `origin` along `dir` until a non-empty cell is entered.
///
/// * A zero component gets an infinite step, so that axis is never taken.
/// * When both axes reach the next boundary together, the Y axis steps.
/// * `None` when the ray leaves the grid or `dir` is the zero vector.
pub fn cast(grid: &TileGrid, origin: Vec2, dir: Vec2) -> Option<RayHit> {
    if dir == Vec2::ZERO || !dir.is_finite() || !origin.is_finite() {
        return None;
    }

    let mut map = origin.floor().as_ivec2();

    let delta = Vec2::new(inv_abs(dir.x), inv_abs(dir.y));
    let step = ivec2(sign(dir.x), sign(dir.y));

    // ray length to the first X / Y boundary
    let mut side_dist = Vec2::new(
        first_boundary(origin.x, map.x, dir.x, delta.x),
        first_boundary(origin.y, map.y, dir.y, delta.y),
    );

    // an origin inside a wall hits at distance zero
    if let Some(tile) = grid.wall(map).filter(|&t| t != 0) {
        return Some(hit(origin, dir, map, step, WallSide::Vertical, tile));
    }

    loop {
        let side = if side_dist.x < side_dist.y {
            side_dist.x += delta.x;
            map.x += step.x;
            WallSide::Vertical
        } else {
            if side_dist.y == f32::INFINITY {
                return None;
            }
            side_dist.y += delta.y;
            map.y += step.y;
            WallSide::Horizontal
        };

        match grid.wall(map) {
            None => return None,
            Some(0) => {}
            Some(tile) => return Some(hit(origin, dir, map, step, side, tile)),
        }
    }
}

#[inline]
fn inv_abs(v: f32) -> f32 {
    if v == 0.0 { f32::INFINITY } else { (1.0 / v).abs() }
}

#[inline]
fn sign(v: f32) -> i32 {
    if v < 0.0 { -1 } else { 1 }
}

#[inline]
fn first_boundary(o: f32, map: i32, d: f32, delta: f32) -> f32 {
    if d == 0.0 {
        f32::INFINITY
    } else if d < 0.0 {
        (o - map as f32) * delta
    } else {
        (map as f32 + 1.0 - o) * delta
    }
}

fn hit(origin: Vec2, dir: Vec2, map: IVec2, step: IVec2, side: WallSide, tile: TileId) -> RayHit {
    let (distance, along) = match side {
        WallSide::Vertical if dir.x != 0.0 => {
            let d = (map.x as f32 - origin.x + (1 - step.x) as f32 * 0.5) / dir.x;
            (d, origin.y + d * dir.y)
        }
        WallSide::Horizontal if dir.y != 0.0 => {
            let d = (map.y as f32 - origin.y + (1 - step.y) as f32 * 0.5) / dir.y;
            (d, origin.x + d * dir.x)
        }
        // origin already inside the wall
        _ => (0.0, origin.y),
    };
    let distance = distance.max(0.0);

    let mut wall_frac = along - along.floor();
    let mirror = match side {
        WallSide::Vertical => dir.x < 0.0,
        WallSide::Horizontal => dir.y > 0.0,
    };
    if mirror {
        wall_frac = 1.0 - wall_frac;
    }
    // 1 - 0 lands exactly on the next texel edge
    if wall_frac >= 1.0 {
        wall_frac = 0.0;
    }

    RayHit {
        distance,
        side,
        wall_frac,
        tile,
        cell: map,
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
