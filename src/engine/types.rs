use crate::config::RenderConfig;

/// Constants that depend on the *frame-buffer*, not on the map.
#[derive(Clone, Copy, Debug)]
pub struct Screen {
    pub w: usize,
    pub h: usize,
    pub half_h: f32, // pre-derived for speed
    pub half_w: f32, // pre-derived for speed
}

impl Screen {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            half_w: w as f32 * 0.5,
            half_h: h as f32 * 0.5,
        }
    }

    /// Screen row of the horizon for a given pixel tilt.
    #[inline]
    pub fn horizon(&self, tilt: f32) -> f32 {
        self.half_h + tilt
    }
}

impl From<&RenderConfig> for Screen {
    fn from(cfg: &RenderConfig) -> Self {
        Screen::new(cfg.width, cfg.height)
    }
}

/// Which grid line a ray crossed when it hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WallSide {
    /// Stepped along X: the wall face is a vertical grid line (east/west).
    Vertical,
    /// Stepped along Y: the wall face is a horizontal grid line (north/south).
    Horizontal,
}

/// Screen rows beyond this are clamped before converting to `i32`; f32
/// holds every integer up to here exactly.
const ROW_LIMIT: f32 = 16_777_216.0;

/// Visible part of one projected column: the texel rows to sample and the
/// screen rows they cover.  `y` may be negative when the first visible
/// texel starts above the screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VSlice {
    pub tex_row: usize,
    pub tex_rows: usize,
    pub y: i32,
    pub h: i32,
}

impl VSlice {
    /// Cut the texture rows that land on screen out of a projected column
    /// spanning `top .. top + full_h`.
    ///
    /// `None` when nothing of the column is on screen.
    pub fn clip(top: f32, full_h: f32, tex_h: usize, screen_h: usize) -> Option<Self> {
        if !(full_h > 0.0) || tex_h == 0 {
            return None;
        }
        let y_start = top.max(0.0);
        let y_stop = (top + full_h).min(screen_h as f32);
        if y_stop <= y_start {
            return None;
        }

        let px_per_texel = full_h / tex_h as f32;
        let row0 = (((y_start - top) / px_per_texel).floor() as usize).min(tex_h - 1);
        let row_end = (((y_stop - top) / px_per_texel).ceil() as usize).clamp(row0 + 1, tex_h);
        let tex_rows = row_end - row0;

        let y0 = top + row0 as f32 * px_per_texel;
        let y1 = y0 + tex_rows as f32 * px_per_texel;
        let y = y0.clamp(-ROW_LIMIT, ROW_LIMIT).round() as i32;
        let h = (y1.clamp(-ROW_LIMIT, ROW_LIMIT).round() as i32 - y).max(1);

        Some(Self {
            tex_row: row0,
            tex_rows,
            y,
            h,
        })
    }

    /// Texel row drawn at screen row `py` (inside `y .. y + h`).
    #[inline]
    pub fn texel_row(&self, py: i32) -> usize {
        let off = (py - self.y).clamp(0, self.h - 1) as usize;
        self.tex_row + off * self.tex_rows / self.h as usize
    }
}

/// `255 - d*k`, dimmed for one wall side, floored at 1.
#[inline]
pub fn distance_shade(distance: f32, falloff: f32, dim: f32) -> u8 {
    let lit = (255.0 - distance * falloff) * (1.0 - dim);
    lit.clamp(1.0, 255.0) as u8
}
