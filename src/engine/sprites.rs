//! Billboard projection and depth-buffer clipping.

use std::ops::Range;

use glam::Vec2;
use smallvec::SmallVec;

use crate::{
    config::RenderConfig,
    engine::{
        depth::DepthBuffer,
        types::{Screen, VSlice, distance_shade},
    },
    world::{Camera, SpriteFlags, SpriteRecord, TextureBank, TextureId},
};

/// Screen rectangle of one projected sprite, before occlusion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Billboard {
    pub centre_x: f32,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    /// Camera-space depth (`transformY`).
    pub depth: f32,
}

impl Billboard {
    /// Screen columns the rectangle overlaps, clipped to `0..w`.
    pub fn columns(&self, w: usize) -> Range<i32> {
        let x0 = self.left.floor().max(0.0) as i32;
        let x1 = (self.left + self.width).ceil().min(w as f32).max(0.0) as i32;
        x0..x1.max(x0)
    }
}

/// A run of visible sprite columns and the texture columns behind them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteSpan {
    /// Screen columns `x0..x1`.
    pub x0: i32,
    pub x1: i32,
    pub tex: TextureId,
    /// Texture column at the centre of `x0` and texels per screen column.
    pub u0: f32,
    pub du: f32,
    pub slice: VSlice,
    pub shade: u8,
    pub depth: f32,
}

impl SpriteSpan {
    /// Texture column drawn at screen column `x`, clamped to `tex_w`.
    #[inline]
    pub fn tex_column(&self, x: i32, tex_w: usize) -> usize {
        let u = self.u0 + (x - self.x0) as f32 * self.du;
        (u.max(0.0) as usize).min(tex_w.saturating_sub(1))
    }

    /// Source texture columns this span reads.
    pub fn src_columns(&self, tex_w: usize) -> Range<usize> {
        if self.x1 <= self.x0 {
            return 0..0;
        }
        self.tex_column(self.x0, tex_w)..self.tex_column(self.x1 - 1, tex_w) + 1
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }
}

/// Inline room for the usual one or two spans a sprite splits into.
pub type Spans = SmallVec<[SpriteSpan; 4]>;

/// Sort sprites far to near by squared distance from `viewer`.  Equal
/// distances keep their input order.
pub fn sort_back_to_front<T>(items: &mut [T], viewer: Vec2, pos: impl Fn(&T) -> Vec2) {
    items.sort_by(|a, b| {
        let da = pos(a).distance_squared(viewer);
        let db = pos(b).distance_squared(viewer);
        db.total_cmp(&da)
    });
}

pub struct BillboardProjector<'a> {
    bank: &'a TextureBank,
    cfg: &'a RenderConfig,
    screen: Screen,
}

impl<'a> BillboardProjector<'a> {
    pub fn new(bank: &'a TextureBank, cfg: &'a RenderConfig) -> Self {
        Self {
            bank,
            cfg,
            screen: Screen::from(cfg),
        }
    }

    /// Project a sprite.  `None` when it sits on or behind the camera plane
    /// or the camera matrix is singular.
    pub fn project(&self, cam: &Camera, rec: &SpriteRecord) -> Option<Billboard> {
        let t = cam.to_cam(rec.pos)?;
        if !(t.y > 0.0) || !t.is_finite() {
            return None;
        }
        if rec.scale.x <= 0.0 || rec.scale.y <= 0.0 {
            return None;
        }

        let centre_x = self.screen.half_w * (1.0 + t.x / t.y);
        let cell_px = (self.cfg.walls_ratio * self.screen.h as f32 / t.y).abs();
        let width = cell_px / rec.scale.x;
        let height = cell_px / rec.scale.y;

        let bottom = self.screen.horizon(cam.tilt) + cam.eye_height() * cell_px * 0.5
            - rec.z_offset * cell_px;

        Some(Billboard {
            centre_x,
            left: centre_x - width * 0.5,
            top: bottom - height,
            width,
            height,
            depth: t.y,
        })
    }

    /// Project `rec`, test every column against `depth` and append the
    /// visible runs to `out`.  Returns the number of spans added.
    pub fn emit(
        &self,
        cam: &Camera,
        rec: &SpriteRecord,
        depth: &DepthBuffer,
        out: &mut Spans,
    ) -> usize {
        if rec.flags.contains(SpriteFlags::HIDDEN) {
            return 0;
        }
        let Some(bb) = self.project(cam, rec) else {
            return 0;
        };

        let tex = rec.texture_for(cam.pos);
        let texture = self.bank.texture_or_missing(tex);
        let Some(slice) = VSlice::clip(bb.top, bb.height, texture.h, self.screen.h) else {
            return 0;
        };

        let shade = if rec.flags.contains(SpriteFlags::FULLBRIGHT) {
            u8::MAX
        } else {
            distance_shade(bb.depth, self.cfg.shade_falloff, 0.0)
        };
        let du = texture.w as f32 / bb.width;

        let before = out.len();
        let mut run: Option<i32> = None;
        let cols = bb.columns(self.screen.w);
        let end = cols.end;

        let close = |x0: i32, x1: i32, out: &mut Spans| {
            out.push(SpriteSpan {
                x0,
                x1,
                tex,
                u0: (x0 as f32 + 0.5 - bb.left) * du,
                du,
                slice,
                shade,
                depth: bb.depth,
            });
        };

        for col in cols {
            match (depth.is_visible(col, bb.depth), run) {
                (true, None) => run = Some(col),
                (false, Some(x0)) => {
                    close(x0, col, out);
                    run = None;
                }
                _ => {}
            }
        }
        if let Some(x0) = run {
            close(x0, end, out);
        }
        out.len() - before
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Texture;
    use glam::vec2;

    fn setup() -> (TextureBank, RenderConfig, TextureId) {
        let mut bank = TextureBank::default_with_checker();
        let tex = bank
            .insert("BALL", Texture::checker("BALL", 16, 16, 5, 9).unwrap())
            .unwrap();
        let cfg = RenderConfig {
            width: 100,
            height: 100,
            ..RenderConfig::default()
        };
        (bank, cfg, tex)
    }

    fn cam() -> Camera {
        Camera::new(Vec2::ZERO, 0.0, std::f32::consts::FRAC_PI_2)
    }

    fn wall_at(d: f32) -> DepthBuffer {
        let mut db = DepthBuffer::new(100);
        db.set_span(0, 100, d);
        db
    }

    #[test]
    fn projects_centred_sprite() {
        let (bank, cfg, tex) = setup();
        let p = BillboardProjector::new(&bank, &cfg);
        let bb = p.project(&cam(), &SpriteRecord::still(vec2(2.0, 0.0), tex)).unwrap();
        assert!((bb.centre_x - 50.0).abs() < 1e-4);
        assert!((bb.width - 50.0).abs() < 1e-4);
        assert!((bb.depth - 2.0).abs() < 1e-6);
        // feet on the floor line of a wall at the same depth
        assert!((bb.top + bb.height - 75.0).abs() < 1e-4);
    }

    #[test]
    fn behind_camera_is_skipped() {
        let (bank, cfg, tex) = setup();
        let p = BillboardProjector::new(&bank, &cfg);
        assert!(p.project(&cam(), &SpriteRecord::still(vec2(-2.0, 0.0), tex)).is_none());
        assert!(p.project(&cam(), &SpriteRecord::still(vec2(0.0, 3.0), tex)).is_none());
    }

    #[test]
    fn sprite_behind_wall_is_invisible() {
        let (bank, cfg, tex) = setup();
        let p = BillboardProjector::new(&bank, &cfg);
        let mut out = Spans::new();
        let n = p.emit(&cam(), &SpriteRecord::still(vec2(3.0, 0.0), tex), &wall_at(2.0), &mut out);
        assert_eq!(n, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn sprite_in_front_is_fully_visible() {
        let (bank, cfg, tex) = setup();
        let p = BillboardProjector::new(&bank, &cfg);
        let rec = SpriteRecord::still(vec2(2.0, 0.0), tex);
        let bb = p.project(&cam(), &rec).unwrap();
        let mut out = Spans::new();
        assert_eq!(p.emit(&cam(), &rec, &wall_at(5.0), &mut out), 1);
        let span = out[0];
        assert_eq!(span.x0..span.x1, bb.columns(100));
        assert_eq!(span.width(), 50);
        assert_eq!(span.src_columns(16), 0..16);
    }

    #[test]
    fn unwritten_depth_occludes_everything() {
        let (bank, cfg, tex) = setup();
        let p = BillboardProjector::new(&bank, &cfg);
        let mut out = Spans::new();
        let db = DepthBuffer::new(100);
        assert_eq!(p.emit(&cam(), &SpriteRecord::still(vec2(0.5, 0.0), tex), &db, &mut out), 0);
    }

    #[test]
    fn partial_occlusion_splits_spans() {
        let (bank, cfg, tex) = setup();
        let p = BillboardProjector::new(&bank, &cfg);
        // pillar in front of the middle of the sprite
        let mut db = wall_at(10.0);
        db.set_span(45, 10, 1.0);
        let mut out = Spans::new();
        assert_eq!(p.emit(&cam(), &SpriteRecord::still(vec2(2.0, 0.0), tex), &db, &mut out), 2);
        assert_eq!((out[0].x0, out[0].x1), (25, 45));
        assert_eq!((out[1].x0, out[1].x1), (55, 75));
        // the right span continues the texture where the pillar cut it
        assert!(out[1].tex_column(55, 16) > out[0].tex_column(44, 16));
    }

    #[test]
    fn sprite_touching_the_camera_plane_fills_the_screen() {
        let (bank, cfg, tex) = setup();
        let p = BillboardProjector::new(&bank, &cfg);
        let mut cam = cam();
        cam.set_eye_height(1.3);
        let mut out = Spans::new();
        let rec = SpriteRecord::still(vec2(1e-11, 0.0), tex);
        assert_eq!(p.emit(&cam, &rec, &wall_at(5.0), &mut out), 1);
        let span = out[0];
        assert_eq!((span.x0, span.x1), (0, 100));
        assert!(span.slice.y <= 0);
        assert!(span.slice.y + span.slice.h >= 100);
    }

    #[test]
    fn hidden_and_scaled() {
        let (bank, cfg, tex) = setup();
        let p = BillboardProjector::new(&bank, &cfg);
        let mut out = Spans::new();
        let hidden = SpriteRecord::still(vec2(2.0, 0.0), tex).with_flags(SpriteFlags::HIDDEN);
        assert_eq!(p.emit(&cam(), &hidden, &wall_at(5.0), &mut out), 0);

        let half = SpriteRecord::still(vec2(2.0, 0.0), tex).with_scale(2.0, 2.0);
        let bb = p.project(&cam(), &half).unwrap();
        assert!((bb.width - 25.0).abs() < 1e-4);
        // still standing on the floor
        assert!((bb.top + bb.height - 75.0).abs() < 1e-4);
    }

    #[test]
    fn fullbright_ignores_distance() {
        let (bank, cfg, tex) = setup();
        let p = BillboardProjector::new(&bank, &cfg);
        let mut out = Spans::new();
        let far = SpriteRecord::still(vec2(8.0, 0.0), tex);
        p.emit(&cam(), &far, &wall_at(50.0), &mut out);
        p.emit(&cam(), &far.clone().with_flags(SpriteFlags::FULLBRIGHT), &wall_at(50.0), &mut out);
        assert!(out[0].shade < 255);
        assert_eq!(out[1].shade, 255);
    }

    #[test]
    fn draw_order_is_far_to_near() {
        let viewer = Vec2::ZERO;
        let mut ds = vec![10.0_f32, 5.0, 20.0];
        sort_back_to_front(&mut ds, viewer, |&d| vec2(d, 0.0));
        assert_eq!(ds, vec![20.0, 10.0, 5.0]);
    }
}
