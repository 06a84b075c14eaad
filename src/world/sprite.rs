use bitflags::bitflags;
use glam::Vec2;

use crate::world::{animation::Animation, texture::TextureId};

bitflags! {
    /// Per-sprite rendering switches.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct SpriteFlags: u8 {
        /// Ignore distance shading.
        const FULLBRIGHT = 0x01;
        /// Skip this sprite entirely.
        const HIDDEN     = 0x02;
    }
}

/// What a sprite shows.  Chosen once at load time; the projector only
/// matches on the variant.
#[derive(Clone, Debug, PartialEq)]
pub enum SpriteVisual {
    Still(TextureId),
    Animated(Animation),
    /// Viewing-angle dependent: one animation per key angle (degrees).
    Directional(DirectionalViews),
}

/// How the sim moves a sprite between frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Behavior {
    Static,
    /// Vertical bob around `base_z` with the given amplitude and period (s).
    Oscillating {
        base_z: f32,
        amplitude: f32,
        period: f32,
    },
}

/// Plain data the renderer needs about one billboard.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteRecord {
    /// Grid-local position.
    pub pos: Vec2,
    /// Height of the sprite's feet above the floor, in wall heights.
    pub z_offset: f32,
    /// Horizontal / vertical shrink factors (2 = half size).
    pub scale: Vec2,
    /// Where the sprite looks, degrees, same convention as `Vec2::angle`.
    pub facing: f32,
    pub visual: SpriteVisual,
    pub behavior: Behavior,
    pub flags: SpriteFlags,
    /// Sim-owned clock used by the oscillation system.
    pub age: f32,
}

impl SpriteRecord {
    pub fn new(pos: Vec2, visual: SpriteVisual) -> Self {
        Self {
            pos,
            z_offset: 0.0,
            scale: Vec2::ONE,
            facing: 0.0,
            visual,
            behavior: Behavior::Static,
            flags: SpriteFlags::empty(),
            age: 0.0,
        }
    }

    pub fn still(pos: Vec2, tex: TextureId) -> Self {
        Self::new(pos, SpriteVisual::Still(tex))
    }

    pub fn with_scale(mut self, u: f32, v: f32) -> Self {
        self.scale = Vec2::new(u, v);
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_flags(mut self, flags: SpriteFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_facing(mut self, deg: f32) -> Self {
        self.facing = deg;
        self
    }

    /// Texture to draw this frame when seen from `viewer`.
    pub fn texture_for(&self, viewer: Vec2) -> TextureId {
        match &self.visual {
            SpriteVisual::Still(tex) => *tex,
            SpriteVisual::Animated(anim) => anim.current(),
            SpriteVisual::Directional(views) => {
                let bearing = (self.pos - viewer).to_angle().to_degrees();
                views.closest((bearing - self.facing).rem_euclid(360.0)).current()
            }
        }
    }

    /// Every animation this sprite owns, for the sim to advance.
    pub fn animations_mut(&mut self) -> impl Iterator<Item = &mut Animation> {
        let (single, many) = match &mut self.visual {
            SpriteVisual::Still(_) => (None, None),
            SpriteVisual::Animated(a) => (Some(a), None),
            SpriteVisual::Directional(v) => (None, Some(v.views.iter_mut().map(|(_, a)| a))),
        };
        single.into_iter().chain(many.into_iter().flatten())
    }
}

/*──────────────────────── directional views ──────────────────────────*/

/// Small set of `(angle°, animation)` buckets, e.g. eight at 45° spacing.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectionalViews {
    views: Vec<(f32, Animation)>,
}

impl DirectionalViews {
    /// At least one view is required; an empty list yields the fallback.
    pub fn new(views: Vec<(f32, Animation)>) -> Self {
        if views.is_empty() {
            return Self {
                views: vec![(0.0, Animation::still(crate::world::texture::NO_TEXTURE))],
            };
        }
        Self { views }
    }

    /// `n` evenly spaced buckets starting at `start`° built from `textures`.
    pub fn evenly_spaced(start: f32, textures: &[TextureId]) -> Self {
        let step = 360.0 / textures.len().max(1) as f32;
        Self::new(
            textures
                .iter()
                .enumerate()
                .map(|(i, &t)| ((start + step * i as f32).rem_euclid(360.0), Animation::still(t)))
                .collect(),
        )
    }

    /// Linear scan for the key nearest to `angle` on the circle; the first
    /// key found wins ties.
    pub fn closest(&self, angle: f32) -> &Animation {
        let mut best = &self.views[0].1;
        let mut best_d = f32::INFINITY;
        for (key, anim) in &self.views {
            let d = angular_distance(*key, angle);
            if d < best_d {
                best = anim;
                best_d = d;
            }
        }
        best
    }
}

/// Shortest distance between two angles in degrees, in `[0, 180]`.
#[inline]
pub fn angular_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;

    #[test]
    fn angular_distance_wraps() {
        assert_eq!(angular_distance(0.0, 359.0), 1.0);
        assert_eq!(angular_distance(10.0, 350.0), 20.0);
        assert_eq!(angular_distance(90.0, 270.0), 180.0);
    }

    #[test]
    fn closest_prefers_first_on_tie() {
        let views = DirectionalViews::new(vec![
            (0.0, Animation::still(1)),
            (90.0, Animation::still(2)),
        ]);
        assert_eq!(views.closest(45.0).current(), 1);
        assert_eq!(views.closest(46.0).current(), 2);
        assert_eq!(views.closest(359.0).current(), 1);
    }

    #[test]
    fn directional_texture_follows_viewer() {
        // eight views: key k*45° shows texture 10+k
        let views = DirectionalViews::evenly_spaced(0.0, &[10, 11, 12, 13, 14, 15, 16, 17]);
        let spr = SpriteRecord::new(vec2(5.0, 5.0), SpriteVisual::Directional(views));
        // viewer west of the sprite: bearing viewer→sprite = 0°
        assert_eq!(spr.texture_for(vec2(1.0, 5.0)), 10);
        // viewer north (y-down map): bearing = 90°
        assert_eq!(spr.texture_for(vec2(5.0, 1.0)), 12);
        // facing shifts the bucket
        let turned = spr.clone().with_facing(90.0);
        assert_eq!(turned.texture_for(vec2(5.0, 1.0)), 10);
    }

    #[test]
    fn animations_are_reachable() {
        let mut spr = SpriteRecord::new(
            Vec2::ZERO,
            SpriteVisual::Animated(Animation::with_fps(&[1, 2], 1.0, true)),
        );
        assert_eq!(spr.animations_mut().count(), 1);
        let mut still = SpriteRecord::still(Vec2::ZERO, 3);
        assert_eq!(still.animations_mut().count(), 0);
        assert_eq!(still.texture_for(Vec2::ONE), 3);
    }
}
