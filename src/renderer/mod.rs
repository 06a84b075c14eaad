//! Rendering abstraction layer.
//!
//! *The rest of the engine never touches a pixel buffer directly.*
//! The compositor produces a [`Frame`] whose draw calls come out in paint
//! order (planes, walls, sprites far to near) and hands them to a type that
//! implements [`Renderer`].
//!
//! * Walls and sprites are `(screen rect, texture rect, shade)` triples.
//! * Floor and ceiling arrive as ready-shaded palette-index bands.
//! * A helper blanket‐impl [`RendererExt`] adds `draw_frame` so call-sites
//!   stay short.

use crate::{
    engine::{Frame, PlaneBuffer, SpriteSpan, WallColumn},
    world::TextureBank,
};

/// Pixel format of the software frame-buffer (0x00RRGGBB).
pub type Rgba = u32;

/// One resolved draw command.  Borrowed from the [`Frame`] that made it.
#[derive(Clone, Copy, Debug)]
pub enum DrawCall<'a> {
    Plane(&'a PlaneBuffer),
    Wall(&'a WallColumn),
    Sprite(&'a SpriteSpan),
}

/// A renderer that owns an internal scratch buffer for the whole frame.
///
/// `end_frame` hands the finished buffer to a user-supplied closure.
/// Software callers typically forward it to their window-manager.
pub trait Renderer {
    /// (Re)allocate internal scratch for the requested resolution and clear it.
    fn begin_frame(&mut self, width: usize, height: usize);

    /// Copy one floor or ceiling band into the internal buffer.
    fn draw_plane(&mut self, plane: &PlaneBuffer, bank: &TextureBank);

    /// Rasterise one textured wall slice.
    fn draw_wall(&mut self, wall: &WallColumn, bank: &TextureBank);

    /// Rasterise one visible sprite span; transparent texels are skipped.
    fn draw_sprite(&mut self, span: &SpriteSpan, bank: &TextureBank);

    /// Finish the frame and **loan** the finished buffer to `submit`.
    ///
    /// * `submit(&[Rgba], w, h)` is run exactly once per frame.
    /// * Software caller passes `|fb, w, h| window.update_with_buffer(fb, w, h)`.
    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize);
}

/// Convenience blanket-impl with a one-liner `draw_frame` adaptor.
pub trait RendererExt: Renderer {
    fn draw_frame<F>(
        &mut self,
        width: usize,
        height: usize,
        frame: &Frame,
        bank: &TextureBank,
        submit: F,
    ) where
        F: FnOnce(&[Rgba], usize, usize),
    {
        self.begin_frame(width, height);
        for call in frame.calls() {
            match call {
                DrawCall::Plane(p) => self.draw_plane(p, bank),
                DrawCall::Wall(w) => self.draw_wall(w, bank),
                DrawCall::Sprite(s) => self.draw_sprite(s, bank),
            }
        }
        self.end_frame(submit);
    }
}
impl<T: Renderer + ?Sized> RendererExt for T {}

pub mod software;

pub use software::Software;
