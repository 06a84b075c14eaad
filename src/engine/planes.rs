//! Floor and ceiling casting, one horizontal scanline at a time.
//!
//! Every row below (above) the horizon sees the floor (ceiling) at a single
//! distance, so the world position is stepped across the row with a
//! constant increment and no per-pixel division.

use glam::Vec2;

use crate::{
    config::RenderConfig,
    engine::types::{Screen, distance_shade},
    world::{
        Camera, Colormap, Layer, NO_TEXTURE, Texture, TextureBank, TextureId, TileGrid,
        TileTextures,
    },
};

/// Where floor or ceiling texels come from.  Picked once when the level is
/// set up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FlatSource {
    /// One texture repeated in every cell.
    Uniform(TextureId),
    /// Texture chosen per cell from a grid layer; cells outside the grid or
    /// without a layer fall back to the missing texture.
    PerTile { layer: Layer },
    /// One large texture painted across the whole map, `pixels_per_cell`
    /// texels per grid cell.  Wraps at the atlas's own size.
    Atlas {
        tex: TextureId,
        pixels_per_cell: f32,
    },
}

impl FlatSource {
    #[inline]
    pub fn is_per_tile(&self) -> bool {
        matches!(self, FlatSource::PerTile { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaneKind {
    Floor,
    Ceiling,
}

/// Shaded palette indices for one band of screen rows.
#[derive(Clone, Debug)]
pub struct PlaneBuffer {
    pub kind: PlaneKind,
    /// First screen row covered.
    pub y0: usize,
    pub width: usize,
    pub rows: usize,
    pub pixels: Vec<u8>, // row-major, `width * rows`
}

impl PlaneBuffer {
    pub fn new(kind: PlaneKind) -> Self {
        Self {
            kind,
            y0: 0,
            width: 0,
            rows: 0,
            pixels: Vec::new(),
        }
    }

    fn reset(&mut self, y0: usize, width: usize, rows: usize) {
        self.y0 = y0;
        self.width = width;
        self.rows = rows;
        self.pixels.clear();
        self.pixels.resize(width * rows, 0);
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[u8] {
        &self.pixels[i * self.width..(i + 1) * self.width]
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Drop all rows; an empty buffer draws nothing.
    pub fn clear(&mut self) {
        self.rows = 0;
        self.pixels.clear();
    }
}

/// Screen rows a plane covers for a given horizon.  Row `y` belongs to the
/// floor when its centre lies below the horizon, to the ceiling when above.
pub fn plane_rows(kind: PlaneKind, horizon: f32, screen_h: usize) -> (usize, usize) {
    let h = screen_h as f32;
    match kind {
        // y + 0.5 > horizon
        PlaneKind::Floor => (((horizon - 0.5).floor() + 1.0).clamp(0.0, h) as usize, screen_h),
        // y + 0.5 < horizon
        PlaneKind::Ceiling => (0, (horizon - 0.5).ceil().clamp(0.0, h) as usize),
    }
}

pub struct FloorCeilingMapper<'a> {
    grid: &'a TileGrid,
    tiles: &'a TileTextures,
    bank: &'a TextureBank,
    cfg: &'a RenderConfig,
    screen: Screen,
}

impl<'a> FloorCeilingMapper<'a> {
    pub fn new(
        grid: &'a TileGrid,
        tiles: &'a TileTextures,
        bank: &'a TextureBank,
        cfg: &'a RenderConfig,
    ) -> Self {
        Self {
            grid,
            tiles,
            bank,
            cfg,
            screen: Screen::from(cfg),
        }
    }

    /// Distance to the plane seen through a row `p` pixels from the horizon.
    #[inline]
    pub fn row_distance(&self, eye_term: f32, p: f32) -> f32 {
        self.cfg.walls_ratio * self.screen.h as f32 * eye_term / (2.0 * p)
    }

    /// Fill `out` with the floor or ceiling band for `cam`.
    pub fn map(&self, cam: &Camera, kind: PlaneKind, src: &FlatSource, out: &mut PlaneBuffer) {
        let w = self.screen.w;
        let horizon = self.screen.horizon(cam.tilt);
        let (first, last) = plane_rows(kind, horizon, self.screen.h);
        out.kind = kind;
        out.reset(first, w, last - first);

        let eye_term = match kind {
            PlaneKind::Floor => cam.eye_height(),
            PlaneKind::Ceiling => 2.0 - cam.eye_height(),
        };
        // eye resting on this plane: nothing to see
        if !(eye_term > 0.0) {
            return;
        }

        let ray0 = cam.forward() - cam.plane();
        let ray1 = cam.forward() + cam.plane();
        let fixed = match *src {
            FlatSource::Uniform(tex) => Some(self.bank.texture_or_missing(tex)),
            FlatSource::Atlas { tex, .. } => Some(self.bank.texture_or_missing(tex)),
            FlatSource::PerTile { .. } => None,
        };

        for (i, row) in out.pixels.chunks_exact_mut(w.max(1)).enumerate() {
            let y = first + i;
            let p = match kind {
                PlaneKind::Floor => y as f32 + 0.5 - horizon,
                PlaneKind::Ceiling => horizon - (y as f32 + 0.5),
            };
            let dist = self.row_distance(eye_term, p);
            let level = Colormap::level_for_shade(distance_shade(dist, self.cfg.shade_falloff, 0.0));

            let step = dist * (ray1 - ray0) / w as f32;
            let mut world = cam.pos + dist * ray0;

            for px in row.iter_mut() {
                let texel = match (*src, fixed) {
                    (FlatSource::Atlas { pixels_per_cell, .. }, Some(t)) => {
                        sample_atlas(t, world, pixels_per_cell)
                    }
                    (FlatSource::PerTile { layer }, _) => {
                        let cell = world.floor().as_ivec2();
                        let tex = self
                            .grid
                            .get(layer, cell)
                            .map_or(NO_TEXTURE, |tile| self.tiles.resolve(tile));
                        sample_cell(self.bank.texture_or_missing(tex), world)
                    }
                    (_, Some(t)) => sample_cell(t, world),
                    (_, None) => 0,
                };
                *px = self.bank.shade_index(level, texel);
                world += step;
            }
        }
    }
}

/// Texel of a per-cell texture at the fractional part of `world`.
#[inline]
fn sample_cell(tex: &Texture, world: Vec2) -> u8 {
    let f = world - world.floor();
    let u = ((f.x * tex.w as f32) as usize).min(tex.w - 1);
    let v = ((f.y * tex.h as f32) as usize).min(tex.h - 1);
    tex.texel(u, v)
}

/// Texel of a map-wide atlas, wrapping at the atlas's dimensions.
#[inline]
fn sample_atlas(tex: &Texture, world: Vec2, pixels_per_cell: f32) -> u8 {
    let p = (world * pixels_per_cell).floor();
    let u = (p.x as i64).rem_euclid(tex.w as i64) as usize;
    let v = (p.y as i64).rem_euclid(tex.h as i64) as usize;
    tex.texel(u, v)
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{map::grid_from_str, world::TILE_SIZE};
    use glam::vec2;

    fn cfg() -> RenderConfig {
        RenderConfig {
            width: 40,
            height: 20,
            shade_falloff: 0.0,
            ..RenderConfig::default()
        }
    }

    /// Texture whose every texel is `idx`.
    fn solid(bank: &mut TextureBank, name: &str, idx: u8) -> TextureId {
        let tex = Texture::new(name, 4, 4, vec![idx; 16]).unwrap();
        bank.insert(name, tex).unwrap()
    }

    #[test]
    fn rows_split_at_horizon() {
        assert_eq!(plane_rows(PlaneKind::Floor, 10.0, 20), (10, 20));
        assert_eq!(plane_rows(PlaneKind::Ceiling, 10.0, 20), (0, 10));
        // horizon far below the screen: all ceiling
        assert_eq!(plane_rows(PlaneKind::Floor, 50.0, 20), (20, 20));
        assert_eq!(plane_rows(PlaneKind::Ceiling, 50.0, 20), (0, 20));
        assert_eq!(plane_rows(PlaneKind::Floor, -5.0, 20), (0, 20));
    }

    #[test]
    fn row_distance_matches_wall_bottom() {
        let grid = grid_from_str("0", None, None, TILE_SIZE).unwrap();
        let bank = TextureBank::default_with_checker();
        let tiles = TileTextures::default();
        let cfg = cfg();
        let m = FloorCeilingMapper::new(&grid, &tiles, &bank, &cfg);
        // a wall at d has its foot eye * H / (2d) px below the horizon
        for d in [1.0_f32, 2.0, 7.5] {
            let p = 1.0 * cfg.height as f32 / (2.0 * d);
            assert!((m.row_distance(1.0, p) - d).abs() < 1e-5);
        }
    }

    #[test]
    fn per_tile_floor_uses_cell_textures() {
        let grid = grid_from_str("00\n00", Some("1 2\n1 2"), None, TILE_SIZE).unwrap();
        let mut bank = TextureBank::default_with_checker();
        let a = solid(&mut bank, "A", 40);
        let b = solid(&mut bank, "B", 90);
        let mut tiles = TileTextures::default();
        tiles.bind(1, a);
        tiles.bind(2, b);
        let cfg = cfg();
        let m = FloorCeilingMapper::new(&grid, &tiles, &bank, &cfg);

        // looking south from the west/east border: left half of the screen
        // sees column x=1 (tile 2), right half column x=0 (tile 1)
        let cam = Camera::new(vec2(1.0, 0.2), std::f32::consts::FRAC_PI_2, cfg.fov());
        let mut out = PlaneBuffer::new(PlaneKind::Floor);
        m.map(&cam, PlaneKind::Floor, &FlatSource::PerTile { layer: Layer::Floor }, &mut out);

        assert_eq!((out.y0, out.rows, out.width), (10, 10, 40));
        let near = out.row(out.rows - 1);
        assert_eq!(near[5], bank.shade_index(0, 90));
        assert_eq!(near[35], bank.shade_index(0, 40));
    }

    #[test]
    fn missing_layer_falls_back() {
        let grid = grid_from_str("0", None, None, TILE_SIZE).unwrap();
        let bank = TextureBank::default_with_checker();
        let tiles = TileTextures::default();
        let cfg = cfg();
        let m = FloorCeilingMapper::new(&grid, &tiles, &bank, &cfg);
        let cam = Camera::new(vec2(0.5, 0.5), 0.0, cfg.fov());
        let mut out = PlaneBuffer::new(PlaneKind::Ceiling);
        m.map(&cam, PlaneKind::Ceiling, &FlatSource::PerTile { layer: Layer::Ceiling }, &mut out);
        assert_eq!(out.rows, 10);
        let allowed: Vec<u8> = bank
            .texture_or_missing(NO_TEXTURE)
            .pixels
            .iter()
            .map(|&t| bank.shade_index(0, t))
            .collect();
        assert!(out.pixels.iter().all(|p| allowed.contains(p)));
    }

    #[test]
    fn atlas_wraps_on_its_own_period() {
        // 3 × 1 atlas: 10, 20, 30
        let tex = Texture::new("ATLAS", 3, 1, vec![10, 20, 30]).unwrap();
        let p = vec2(0.0, 0.0);
        assert_eq!(sample_atlas(&tex, p, 2.0), 10);
        assert_eq!(sample_atlas(&tex, vec2(1.0, 0.0), 2.0), 30);
        assert_eq!(sample_atlas(&tex, vec2(1.5, 7.0), 2.0), 10);
        assert_eq!(sample_atlas(&tex, vec2(-0.5, 0.0), 2.0), 30);
    }

    #[test]
    fn atlas_floor_spans_the_map() {
        // no floor layer: the atlas alone decides, one texel per cell
        let grid = grid_from_str("0", None, None, TILE_SIZE).unwrap();
        let mut bank = TextureBank::default_with_checker();
        let atlas = bank
            .insert("ATLAS", Texture::new("ATLAS", 2, 1, vec![40, 90]).unwrap())
            .unwrap();
        let tiles = TileTextures::default();
        let cfg = cfg();
        let m = FloorCeilingMapper::new(&grid, &tiles, &bank, &cfg);

        // same view as the per-tile case: x falls from ~2.05 to ~0 across the row
        let cam = Camera::new(vec2(1.0, 0.2), std::f32::consts::FRAC_PI_2, cfg.fov());
        let src = FlatSource::Atlas {
            tex: atlas,
            pixels_per_cell: 1.0,
        };
        let mut out = PlaneBuffer::new(PlaneKind::Floor);
        m.map(&cam, PlaneKind::Floor, &src, &mut out);

        assert_eq!((out.y0, out.rows, out.width), (10, 10, 40));
        let near = out.row(out.rows - 1);
        assert_eq!(near[5], bank.shade_index(0, 90));
        assert_eq!(near[35], bank.shade_index(0, 40));
        // x = 2.05 wraps back to the atlas's first column
        assert_eq!(near[0], bank.shade_index(0, 40));
    }

    #[test]
    fn eye_on_floor_sees_no_floor() {
        let grid = grid_from_str("0", None, None, TILE_SIZE).unwrap();
        let mut bank = TextureBank::default_with_checker();
        let a = solid(&mut bank, "A", 77);
        let tiles = TileTextures::default();
        let cfg = cfg();
        let m = FloorCeilingMapper::new(&grid, &tiles, &bank, &cfg);
        let mut cam = Camera::new(vec2(0.5, 0.5), 0.0, cfg.fov());
        cam.set_eye_height(0.0);
        let mut out = PlaneBuffer::new(PlaneKind::Floor);
        m.map(&cam, PlaneKind::Floor, &FlatSource::Uniform(a), &mut out);
        assert!(out.pixels.iter().all(|&p| p == 0));
        m.map(&cam, PlaneKind::Ceiling, &FlatSource::Uniform(a), &mut out);
        assert!(out.pixels.iter().all(|&p| p == bank.shade_index(0, 77)));
    }
}
