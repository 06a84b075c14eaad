use super::systems;
use crate::world::SpriteRecord;
use hecs::{Entity, QueryBorrow, World};
use std::time::{Duration, Instant};

pub const SIM_FPS: u32 = 35;
pub const DT: f32 = 1.0 / SIM_FPS as f32;
const TIC: Duration = Duration::from_micros(1_000_000 / SIM_FPS as u64);

/// Owns the live sprite registry and drives the sprite systems at a fixed
/// rate.  The renderer only reads the registry.
pub struct TicRunner {
    world: World,
    last: Instant,
    tics: u64,
}

impl Default for TicRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TicRunner {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            last: Instant::now(),
            tics: 0,
        }
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Add a sprite to the registry and return its handle.
    pub fn spawn_sprite(&mut self, rec: SpriteRecord) -> Entity {
        self.world.spawn((rec,))
    }

    /// Remove a sprite; `false` if the handle was already gone.
    pub fn despawn(&mut self, e: Entity) -> bool {
        self.world.despawn(e).is_ok()
    }

    /// Borrow every live sprite; iterate with `.iter()`.
    pub fn sprites(&self) -> QueryBorrow<'_, &SpriteRecord> {
        self.world.query::<&SpriteRecord>()
    }

    pub fn len(&self) -> u32 {
        self.world.len()
    }

    pub fn is_empty(&self) -> bool {
        self.world.is_empty()
    }

    /// Tics run since creation.
    pub fn tics(&self) -> u64 {
        self.tics
    }

    /// Advance enough tics to synchronise simulation with real time.
    /// Returns how many ran.
    pub fn pump(&mut self) -> u32 {
        let mut n = 0;
        while self.last.elapsed() >= TIC {
            self.tick();
            self.last += TIC;
            n += 1;
        }
        n
    }

    /// Run `n` tics regardless of the clock.
    pub fn run_tics(&mut self, n: u32) {
        for _ in 0..n {
            self.tick();
        }
    }

    /* ---------------------------------------------------------------- */
    /* internal: run one fixed‑rate tic                                  */
    /* ---------------------------------------------------------------- */
    fn tick(&mut self) {
        systems::animation(&mut self.world, DT);
        systems::behavior(&mut self.world, DT);
        self.tics += 1;
    }
}
