use crate::{
    config::{ConfigError, RenderConfig},
    engine::{
        frame::{FrameCompositor, FrameStats, Scene},
        planes::FlatSource,
    },
    renderer::{Renderer, RendererExt, Rgba},
    world::{Camera, SpriteRecord, TextureBank, TileGrid, TileTextures},
};

/// Owns the level data, the compositor and a backend, and turns a camera
/// plus the live sprites into a presented frame.
pub struct Engine<R: Renderer> {
    pub renderer: R,
    pub grid: TileGrid,
    pub tiles: TileTextures,
    pub texture_bank: TextureBank,
    compositor: FrameCompositor,
}

impl<R: Renderer> Engine<R> {
    pub fn new(
        renderer: R,
        grid: TileGrid,
        tiles: TileTextures,
        texture_bank: TextureBank,
        cfg: RenderConfig,
    ) -> Result<Self, ConfigError> {
        tracing::info!(
            width = cfg.width,
            height = cfg.height,
            resolution = cfg.resolution,
            fov = cfg.fov_deg,
            "engine ready"
        );
        Ok(Self {
            renderer,
            grid,
            tiles,
            texture_bank,
            compositor: FrameCompositor::new(cfg)?,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        self.compositor.config()
    }

    pub fn set_planes(&mut self, floor: Option<FlatSource>, ceiling: Option<FlatSource>) {
        self.compositor.set_planes(floor, ceiling);
    }

    /// Swap in a new level; textures and tile bindings stay.
    pub fn set_grid(&mut self, grid: TileGrid) {
        tracing::info!(width = grid.width(), height = grid.height(), "level swapped");
        self.grid = grid;
    }

    pub fn compositor(&self) -> &FrameCompositor {
        &self.compositor
    }

    /// Compose and draw one frame, then loan the pixels to `submit`.
    pub fn render_frame<'s, I, F>(&mut self, cam: &Camera, sprites: I, submit: F) -> FrameStats
    where
        I: IntoIterator<Item = &'s SpriteRecord>,
        F: FnOnce(&[Rgba], usize, usize),
    {
        let (w, h) = (self.config().width, self.config().height);
        let scene = Scene {
            grid: &self.grid,
            tiles: &self.tiles,
            bank: &self.texture_bank,
        };
        let frame = self.compositor.compose(scene, cam, sprites);
        self.renderer
            .draw_frame(w, h, frame, &self.texture_bank, submit);
        frame.stats()
    }
}
