/// One nearest-wall distance per screen column.
///
/// A fresh (or [`clear`](Self::clear)ed) buffer holds `0.0` in every
/// column, which occludes every sprite until the wall pass has run.
#[derive(Clone, Debug, Default)]
pub struct DepthBuffer {
    depth: Vec<f32>,
}

impl DepthBuffer {
    pub fn new(width: usize) -> Self {
        Self {
            depth: vec![0.0; width],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.depth.len()
    }

    /// Reset every column to "never written".
    pub fn clear(&mut self) {
        self.depth.fill(0.0);
    }

    pub fn resize(&mut self, width: usize) {
        self.depth.clear();
        self.depth.resize(width, 0.0);
    }

    /// Distance at `col`; `None` outside the screen.
    #[inline]
    pub fn get(&self, col: i32) -> Option<f32> {
        if col < 0 {
            return None;
        }
        self.depth.get(col as usize).copied()
    }

    /// Write `d` into the `stride` columns starting at `x`, clipped to the
    /// screen.  Columns sharing a stride share one value.
    #[inline]
    pub fn set_span(&mut self, x: usize, stride: usize, d: f32) {
        let end = (x + stride).min(self.depth.len());
        if x < end {
            self.depth[x..end].fill(d);
        }
    }

    /// True when something drawn at depth `d` in column `col` would be in
    /// front of the wall there.
    #[inline]
    pub fn is_visible(&self, col: i32, d: f32) -> bool {
        self.get(col).is_some_and(|wall| wall > d)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.depth
    }
}
