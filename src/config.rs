//! Render parameters shared by every pass.
//!
//! Binaries fill this from the command line; tests use `Default`.

/// Largest accepted screen edge, in pixels.
pub const MAX_SCREEN_EDGE: usize = 8192;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    /// Cast every `resolution`-th column and stretch it sideways.
    pub resolution: usize,
    /// Horizontal field of view in degrees.
    pub fov_deg: f32,
    /// Wall height multiplier (1 = one cell tall wall fills `height` at d=1).
    pub walls_ratio: f32,
    /// Brightness lost per grid unit of distance (`255 - d * k`).
    pub shade_falloff: f32,
    /// Fraction of brightness removed from horizontal-side hits.
    pub side_dim: f32,
    /// Run floor and ceiling on worker threads when both are per-tile.
    pub parallel_planes: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 400,
            resolution: 1,
            fov_deg: 90.0,
            walls_ratio: 1.0,
            shade_falloff: 27.2,
            side_dim: 0.25,
            parallel_planes: true,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("screen size {0}x{1} out of range")]
    BadScreen(usize, usize),

    #[error("column resolution must be at least 1")]
    ZeroResolution,

    #[error("walls ratio must be positive, got {0}")]
    BadWallsRatio(f32),

    #[error("field of view must lie in (0, 180) degrees, got {0}")]
    BadFov(f32),

    #[error("side dim must lie in [0, 1], got {0}")]
    BadSideDim(f32),
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0
            || self.height == 0
            || self.width > MAX_SCREEN_EDGE
            || self.height > MAX_SCREEN_EDGE
        {
            return Err(ConfigError::BadScreen(self.width, self.height));
        }
        if self.resolution == 0 {
            return Err(ConfigError::ZeroResolution);
        }
        if !(self.walls_ratio > 0.0 && self.walls_ratio.is_finite()) {
            return Err(ConfigError::BadWallsRatio(self.walls_ratio));
        }
        if !(self.fov_deg > 0.0 && self.fov_deg < 180.0) {
            return Err(ConfigError::BadFov(self.fov_deg));
        }
        if !(0.0..=1.0).contains(&self.side_dim) {
            return Err(ConfigError::BadSideDim(self.side_dim));
        }
        Ok(())
    }

    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov_deg.to_radians()
    }
}
