use std::f32::consts::TAU;

use hecs::World;

use crate::world::{Behavior, SpriteRecord};

/* ── Animation system ─────────────────────────────────────────────── */
pub fn animation(world: &mut World, dt: f32) {
    for (_, rec) in world.query_mut::<&mut SpriteRecord>() {
        for anim in rec.animations_mut() {
            anim.advance(dt);
        }
    }
}

/* ── Behaviour system ─────────────────────────────────────────────── */
/// Age every sprite and apply its movement tag.
pub fn behavior(world: &mut World, dt: f32) {
    for (_, rec) in world.query_mut::<&mut SpriteRecord>() {
        rec.age += dt;
        match rec.behavior {
            Behavior::Static => {}
            Behavior::Oscillating {
                base_z,
                amplitude,
                period,
            } => {
                let phase = if period > 0.0 { TAU * rec.age / period } else { 0.0 };
                rec.z_offset = base_z + amplitude * phase.sin();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Animation, SpriteVisual};
    use glam::Vec2;

    #[test]
    fn oscillation_follows_sine() {
        let mut world = World::new();
        let e = world.spawn((SpriteRecord::still(Vec2::ZERO, 1).with_behavior(
            Behavior::Oscillating {
                base_z: 0.5,
                amplitude: 0.25,
                period: 2.0,
            },
        ),));
        // quarter period: top of the swing
        behavior(&mut world, 0.5);
        let z = world.get::<&SpriteRecord>(e).unwrap().z_offset;
        assert!((z - 0.75).abs() < 1e-5);
        behavior(&mut world, 1.0);
        let z = world.get::<&SpriteRecord>(e).unwrap().z_offset;
        assert!((z - 0.25).abs() < 1e-5);
    }

    #[test]
    fn static_sprites_stay_put() {
        let mut world = World::new();
        let mut rec = SpriteRecord::still(Vec2::ZERO, 1);
        rec.z_offset = 0.3;
        let e = world.spawn((rec,));
        behavior(&mut world, 10.0);
        let rec = world.get::<&SpriteRecord>(e).unwrap();
        assert_eq!(rec.z_offset, 0.3);
        assert_eq!(rec.age, 10.0);
    }

    #[test]
    fn animations_advance() {
        let mut world = World::new();
        let anim = Animation::with_fps(&[3, 4], 10.0, true);
        let e = world.spawn((SpriteRecord::new(Vec2::ZERO, SpriteVisual::Animated(anim)),));
        animation(&mut world, 0.1);
        let rec = world.get::<&SpriteRecord>(e).unwrap();
        assert_eq!(rec.texture_for(Vec2::ONE), 4);
    }
}
