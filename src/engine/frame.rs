//! Per-frame orchestration: planes, then walls, then sprites.
//!
//! The wall pass completes the depth buffer before any sprite is tested
//! against it.  Floor and ceiling may run on two scoped worker threads
//! while the calling thread does walls and sprites; each worker owns one
//! plane buffer, and every thread is joined before `compose` returns.

use std::thread;

use crate::{
    config::{ConfigError, RenderConfig},
    engine::{
        depth::DepthBuffer,
        planes::{FlatSource, FloorCeilingMapper, PlaneBuffer, PlaneKind},
        sprites::{BillboardProjector, SpriteSpan, Spans, sort_back_to_front},
        walls::{ColumnProjector, WallColumn},
    },
    renderer::DrawCall,
    world::{Camera, SpriteFlags, SpriteRecord, TextureBank, TileGrid, TileTextures},
};

/// Read-only level data a frame is rendered from.
#[derive(Clone, Copy)]
pub struct Scene<'a> {
    pub grid: &'a TileGrid,
    pub tiles: &'a TileTextures,
    pub bank: &'a TextureBank,
}

/// Counters of the last composed frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub columns_hit: usize,
    pub sprites_drawn: usize,
    pub spans: usize,
    pub threaded: bool,
}

/// Everything one frame draws, in paint order.
pub struct Frame {
    ceiling: PlaneBuffer,
    floor: PlaneBuffer,
    walls: Vec<WallColumn>,
    sprites: Vec<SpriteSpan>,
    stats: FrameStats,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            ceiling: PlaneBuffer::new(PlaneKind::Ceiling),
            floor: PlaneBuffer::new(PlaneKind::Floor),
            walls: Vec::new(),
            sprites: Vec::new(),
            stats: FrameStats::default(),
        }
    }
}

impl Frame {
    /// Draw calls in paint order: planes, walls, sprites far to near.
    /// Restartable; the frame is not consumed.
    pub fn calls(&self) -> impl Iterator<Item = DrawCall<'_>> {
        [&self.ceiling, &self.floor]
            .into_iter()
            .filter(|p| !p.is_empty())
            .map(DrawCall::Plane)
            .chain(self.walls.iter().map(DrawCall::Wall))
            .chain(self.sprites.iter().map(DrawCall::Sprite))
    }

    pub fn walls(&self) -> &[WallColumn] {
        &self.walls
    }

    pub fn sprites(&self) -> &[SpriteSpan] {
        &self.sprites
    }

    pub fn floor(&self) -> &PlaneBuffer {
        &self.floor
    }

    pub fn ceiling(&self) -> &PlaneBuffer {
        &self.ceiling
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }
}

pub struct FrameCompositor {
    cfg: RenderConfig,
    floor_src: Option<FlatSource>,
    ceiling_src: Option<FlatSource>,
    depth: DepthBuffer,
    frame: Frame,
}

impl FrameCompositor {
    pub fn new(cfg: RenderConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            floor_src: None,
            ceiling_src: None,
            depth: DepthBuffer::new(cfg.width),
            frame: Frame::default(),
        })
    }

    #[inline]
    pub fn config(&self) -> &RenderConfig {
        &self.cfg
    }

    /// Choose floor and ceiling sources; `None` leaves that band undrawn.
    pub fn set_planes(&mut self, floor: Option<FlatSource>, ceiling: Option<FlatSource>) {
        self.floor_src = floor;
        self.ceiling_src = ceiling;
        tracing::debug!(
            ?floor,
            ?ceiling,
            threaded = self.threaded(),
            "plane sources set"
        );
    }

    /// Planes go to worker threads only when enabled and both are per-tile.
    pub fn threaded(&self) -> bool {
        self.cfg.parallel_planes
            && self.floor_src.is_some_and(|f| f.is_per_tile())
            && self.ceiling_src.is_some_and(|c| c.is_per_tile())
    }

    /// Depth buffer as left by the last wall pass.
    pub fn depth(&self) -> &DepthBuffer {
        &self.depth
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Render one frame's draw list.
    pub fn compose<'s, I>(&mut self, scene: Scene<'_>, cam: &Camera, sprites: I) -> &Frame
    where
        I: IntoIterator<Item = &'s SpriteRecord>,
    {
        let threaded = self.threaded();
        let Self {
            cfg,
            floor_src,
            ceiling_src,
            depth,
            frame,
        } = &mut *self;
        let Frame {
            ceiling,
            floor,
            walls,
            sprites: spans,
            stats,
        } = frame;

        walls.clear();
        spans.clear();
        depth.clear();

        let mapper = FloorCeilingMapper::new(scene.grid, scene.tiles, scene.bank, cfg);
        let (fsrc, csrc) = (*floor_src, *ceiling_src);

        *stats = if threaded {
            let m = &mapper;
            thread::scope(|s| {
                if let Some(src) = fsrc {
                    s.spawn(move || m.map(cam, PlaneKind::Floor, &src, floor));
                }
                if let Some(src) = csrc {
                    s.spawn(move || m.map(cam, PlaneKind::Ceiling, &src, ceiling));
                }
                walls_then_sprites(cfg, scene, cam, depth, walls, spans, sprites)
            })
        } else {
            plane(&mapper, cam, PlaneKind::Floor, fsrc.as_ref(), floor);
            plane(&mapper, cam, PlaneKind::Ceiling, csrc.as_ref(), ceiling);
            walls_then_sprites(cfg, scene, cam, depth, walls, spans, sprites)
        };
        stats.threaded = threaded;

        tracing::trace!(
            columns_hit = stats.columns_hit,
            sprites = stats.sprites_drawn,
            spans = stats.spans,
            threaded,
            "frame composed"
        );
        &self.frame
    }
}

fn plane(
    mapper: &FloorCeilingMapper<'_>,
    cam: &Camera,
    kind: PlaneKind,
    src: Option<&FlatSource>,
    out: &mut PlaneBuffer,
) {
    match src {
        Some(src) => mapper.map(cam, kind, src, out),
        None => out.clear(),
    }
}

fn walls_then_sprites<'s>(
    cfg: &RenderConfig,
    scene: Scene<'_>,
    cam: &Camera,
    depth: &mut DepthBuffer,
    walls: &mut Vec<WallColumn>,
    out: &mut Vec<SpriteSpan>,
    sprites: impl IntoIterator<Item = &'s SpriteRecord>,
) -> FrameStats {
    let columns_hit =
        ColumnProjector::new(scene.grid, scene.tiles, scene.bank, cfg).run(cam, depth, walls);

    let mut order: Vec<&SpriteRecord> = sprites
        .into_iter()
        .filter(|r| !r.flags.contains(SpriteFlags::HIDDEN))
        .collect();
    sort_back_to_front(&mut order, cam.pos, |r| r.pos);

    let proj = BillboardProjector::new(scene.bank, cfg);
    let mut spans = Spans::new();
    let mut sprites_drawn = 0;
    for rec in order {
        spans.clear();
        if proj.emit(cam, rec, depth, &mut spans) > 0 {
            sprites_drawn += 1;
            out.extend(spans.drain(..));
        }
    }

    FrameStats {
        columns_hit,
        sprites_drawn,
        spans: out.len(),
        threaded: false,
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
