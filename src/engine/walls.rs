use crate::{
    config::RenderConfig,
    engine::{
        depth::DepthBuffer,
        raycast::{RayHit, cast},
        types::{Screen, VSlice, WallSide, distance_shade},
    },
    world::{Camera, TextureBank, TextureId, TileGrid, TileId, TileTextures},
};

/// One resolved wall slice, ready to blit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallColumn {
    /// First screen column and how many columns the slice covers.
    pub x: usize,
    pub width: usize,
    pub tex: TextureId,
    pub tex_col: usize,
    /// Visible texel rows and the screen rows they paint.
    pub slice: VSlice,
    /// Full projected height before clipping to the screen.
    pub line_height: f32,
    pub shade: u8,
    pub distance: f32,
    pub side: WallSide,
    pub tile: TileId,
}

/// Projected wall height for a hit at `distance`.
#[inline]
pub fn projected_height(walls_ratio: f32, screen_h: usize, distance: f32) -> f32 {
    walls_ratio * screen_h as f32 / distance
}

/// Wall pass: one DDA ray per sampled column.
pub struct ColumnProjector<'a> {
    grid: &'a TileGrid,
    tiles: &'a TileTextures,
    bank: &'a TextureBank,
    cfg: &'a RenderConfig,
    screen: Screen,
}

impl<'a> ColumnProjector<'a> {
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

    /// Cast every `resolution`-th column, fill `depth` and append the
    /// drawable slices to `out`.  Returns the number of columns that hit.
    ///
    /// Columns whose ray leaves the grid get an infinite depth; a camera
    /// standing inside a wall gets zero depth and no slice.
    pub fn run(&self, cam: &Camera, depth: &mut DepthBuffer, out: &mut Vec<WallColumn>) -> usize {
        let stride = self.cfg.resolution.max(1);
        let mut hits = 0;

        for x in (0..self.screen.w).step_by(stride) {
            let ray = cam.column_ray(x, self.screen.w);
            match cast(self.grid, cam.pos, ray) {
                Some(hit) if hit.distance > 0.0 => {
                    hits += 1;
                    depth.set_span(x, stride, hit.distance);
                    if let Some(col) = self.project(cam, x, &hit) {
                        out.push(col);
                    }
                }
                Some(_) => depth.set_span(x, stride, 0.0),
                None => depth.set_span(x, stride, f32::INFINITY),
            }
        }
        hits
    }

    /// Turn a hit into a screen slice.  `None` when nothing lands on screen.
    pub fn project(&self, cam: &Camera, x: usize, hit: &RayHit) -> Option<WallColumn> {
        if !(hit.distance > 0.0) {
            return None;
        }
        let h = self.screen.h;
        let line_height = projected_height(self.cfg.walls_ratio, h, hit.distance);
        let top = -(2.0 - cam.eye_height()) * line_height * 0.5 + self.screen.horizon(cam.tilt);

        let tex = self.tiles.resolve(hit.tile);
        let texture = self.bank.texture_or_missing(tex);
        let slice = VSlice::clip(top, line_height, texture.h, h)?;

        let dim = match hit.side {
            WallSide::Vertical => 0.0,
            WallSide::Horizontal => self.cfg.side_dim,
        };

        Some(WallColumn {
            x,
            width: self.cfg.resolution.max(1).min(self.screen.w.saturating_sub(x)),
            tex,
            tex_col: hit.texture_column(texture.w),
            slice,
            line_height,
            shade: distance_shade(hit.distance, self.cfg.shade_falloff, dim),
            distance: hit.distance,
            side: hit.side,
            tile: hit.tile,
        })
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{map::walls_from_str, world::Texture};
    use glam::vec2;

    fn setup() -> (TileGrid, TileTextures, TextureBank) {
        let grid = walls_from_str(
            "11111\n\
             10001\n\
             10001\n\
             10001\n\
             11111",
        )
        .unwrap();
        let mut bank = TextureBank::default_with_checker();
        let stone = bank
            .insert("STONE", Texture::checker("STONE", 64, 64, 200, 100).unwrap())
            .unwrap();
        let mut tiles = TileTextures::default();
        tiles.bind(1, stone);
        (grid, tiles, bank)
    }

    #[test]
    fn height_round_trips_to_distance() {
        let h = 400;
        for &d in &[0.3_f32, 1.0, 2.5, 17.0] {
            let line = projected_height(1.0, h, d);
            let back = h as f32 / line * 1.0;
            assert!((back - d).abs() < 1e-4 * d, "{d} → {back}");
        }
    }

    #[test]
    fn height_decreases_with_distance() {
        let mut last = f32::INFINITY;
        for i in 1..50 {
            let line = projected_height(1.0, 400, i as f32 * 0.25);
            assert!(line < last);
            last = line;
        }
    }

    #[test]
    fn pass_fills_every_column() {
        let (grid, tiles, bank) = setup();
        let cfg = RenderConfig {
            width: 64,
            height: 40,
            resolution: 3,
            ..RenderConfig::default()
        };
        let cam = Camera::new(vec2(2.5, 2.5), 0.0, cfg.fov());
        let mut depth = DepthBuffer::new(cfg.width);
        let mut out = Vec::new();

        let hits = ColumnProjector::new(&grid, &tiles, &bank, &cfg).run(&cam, &mut depth, &mut out);

        // closed room: every sampled column hits
        assert_eq!(hits, 64usize.div_ceil(3));
        assert!(depth.as_slice().iter().all(|&d| d > 0.0 && d.is_finite()));
        assert_eq!(out.iter().map(|c| c.width).sum::<usize>(), 64);
        // centre column looks straight at the east wall
        let mid = out.iter().find(|c| c.x <= 32 && 32 < c.x + c.width).unwrap();
        assert!((mid.distance - 1.5).abs() < 1e-4);
        assert_eq!(mid.tex, 1);
    }

    #[test]
    fn texture_columns_grow_left_to_right() {
        let (grid, tiles, bank) = setup();
        let cfg = RenderConfig {
            width: 16,
            height: 16,
            ..RenderConfig::default()
        };
        // half a cell from the east wall: the view spans y ∈ [2, 3), one cell
        let cam = Camera::new(vec2(3.5, 2.5), 0.0, cfg.fov());
        let mut depth = DepthBuffer::new(cfg.width);
        let mut out = Vec::new();
        ColumnProjector::new(&grid, &tiles, &bank, &cfg).run(&cam, &mut depth, &mut out);

        assert_eq!(out.len(), 16);
        assert!(out.iter().all(|c| c.side == WallSide::Vertical));
        // column 0 sits on the cell edge, skip it
        let cols: Vec<_> = out[1..].iter().map(|c| c.tex_col).collect();
        assert!(cols.windows(2).all(|w| w[0] < w[1]), "{cols:?}");
    }

    #[test]
    fn eye_height_moves_wall_on_screen() {
        let (grid, tiles, bank) = setup();
        let cfg = RenderConfig {
            width: 32,
            height: 200,
            ..RenderConfig::default()
        };
        let proj = ColumnProjector::new(&grid, &tiles, &bank, &cfg);
        let mut cam = Camera::new(vec2(1.5, 2.5), 0.0, cfg.fov());
        let hit = cast(&grid, cam.pos, cam.column_ray(16, 32)).unwrap();

        // d = 2.5, line = 80 px, centred on row 100
        let centred = proj.project(&cam, 16, &hit).unwrap();
        assert_eq!((centred.slice.y, centred.slice.h), (60, 80));

        // eye on the floor: the wall's bottom sits on the horizon
        cam.set_eye_height(0.0);
        let low = proj.project(&cam, 16, &hit).unwrap();
        assert_eq!(low.slice.y + low.slice.h, 100);

        cam.tilt = 20.0;
        let tilted = proj.project(&cam, 16, &hit).unwrap();
        assert_eq!(tilted.slice.y, low.slice.y + 20);
    }

    #[test]
    fn horizontal_side_is_darker() {
        let (grid, tiles, bank) = setup();
        let cfg = RenderConfig::default();
        let proj = ColumnProjector::new(&grid, &tiles, &bank, &cfg);
        let cam = Camera::new(vec2(2.5, 2.5), 0.0, cfg.fov());
        let east = cast(&grid, cam.pos, glam::Vec2::X).unwrap();
        let south = cast(&grid, cam.pos, glam::Vec2::Y).unwrap();
        let e = proj.project(&cam, 0, &east).unwrap();
        let s = proj.project(&cam, 0, &south).unwrap();
        assert_eq!(e.distance, s.distance);
        assert!(s.shade < e.shade);
    }

    #[test]
    fn open_columns_get_infinite_depth() {
        let grid = walls_from_str("000\n000\n000").unwrap();
        let (_, tiles, bank) = setup();
        let cfg = RenderConfig {
            width: 16,
            height: 16,
            ..RenderConfig::default()
        };
        let cam = Camera::new(vec2(1.5, 1.5), 0.0, cfg.fov());
        let mut depth = DepthBuffer::new(16);
        let mut out = Vec::new();
        let hits = ColumnProjector::new(&grid, &tiles, &bank, &cfg).run(&cam, &mut depth, &mut out);
        assert_eq!(hits, 0);
        assert!(out.is_empty());
        assert!(depth.as_slice().iter().all(|d| d.is_infinite()));
    }
}
