//! ---------------------------------------------------------------------------
//! Software (CPU) column renderer
//!
//! * Fills a `Vec<u32>` frame-buffer in **0x00RRGGBB** format.
//! * Relies on the compositor to feed draw calls in paint order, so later
//!   calls simply overwrite earlier ones.
//! * Every texel goes through the bank's light table before the palette.
//! ---------------------------------------------------------------------------

use crate::{
    engine::{PlaneBuffer, SpriteSpan, VSlice, WallColumn},
    renderer::{Renderer, Rgba},
    world::{Colormap, TRANSPARENT, Texture, TextureBank},
};

/// Background shown where neither plane nor wall was drawn.
const CLEAR: Rgba = 0x00_202020;

/*───────────────────────────────────────────────────────────────────────*/
/*                              Backend                                 */
/*───────────────────────────────────────────────────────────────────────*/

#[derive(Default)]
pub struct Software {
    scratch: Vec<Rgba>,
    width: usize,
    height: usize,
}

/*──────────────────────── Renderer trait impl ────────────────────────*/
impl Renderer for Software {
    fn begin_frame(&mut self, w: usize, h: usize) {
        // (re)allocate if resolution changed
        if w != self.width || h != self.height {
            self.width = w;
            self.height = h;
            self.scratch.resize(w * h, 0);
        }
        self.scratch.fill(CLEAR);
    }

    fn draw_plane(&mut self, plane: &PlaneBuffer, bank: &TextureBank) {
        let palette = bank.palette();
        let w = plane.width.min(self.width);
        for i in 0..plane.rows {
            let y = plane.y0 + i;
            if y >= self.height {
                break;
            }
            let dst = &mut self.scratch[y * self.width..y * self.width + w];
            for (px, &idx) in dst.iter_mut().zip(plane.row(i)) {
                *px = palette[idx as usize];
            }
        }
    }

    fn draw_wall(&mut self, wall: &WallColumn, bank: &TextureBank) {
        let tex = bank.texture_or_missing(wall.tex);
        let level = Colormap::level_for_shade(wall.shade);
        let x_end = (wall.x + wall.width).min(self.width);
        if wall.x >= x_end {
            return;
        }
        self.column_run(wall.x..x_end, &wall.slice, |_, v| {
            Some(bank.get_color(level, tex.texel(wall.tex_col, v)))
        });
    }

    fn draw_sprite(&mut self, span: &SpriteSpan, bank: &TextureBank) {
        let tex: &Texture = bank.texture_or_missing(span.tex);
        let level = Colormap::level_for_shade(span.shade);
        let x0 = span.x0.max(0) as usize;
        let x1 = (span.x1.max(0) as usize).min(self.width);
        if x0 >= x1 {
            return;
        }
        self.column_run(x0..x1, &span.slice, |x, v| {
            let texel = tex.texel(span.tex_column(x as i32, tex.w), v);
            (texel != TRANSPARENT).then(|| bank.get_color(level, texel))
        });
    }

    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        submit(&self.scratch, self.width, self.height);
    }
}

/*──────────────────────── column rendering ───────────────────────────*/

impl Software {
    /// Paint the rows of `slice` in every column of `xs`.  `shade(x, v)`
    /// returns the colour for texel row `v`, or `None` to leave the pixel.
    fn column_run(
        &mut self,
        xs: std::ops::Range<usize>,
        slice: &VSlice,
        shade: impl Fn(usize, usize) -> Option<Rgba>,
    ) {
        let y0 = slice.y.max(0);
        let y1 = (slice.y + slice.h).min(self.height as i32);
        for y in y0..y1 {
            let v = slice.texel_row(y);
            let row = y as usize * self.width;
            for x in xs.clone() {
                if let Some(c) = shade(x, v) {
                    self.scratch[row + x] = c;
                }
            }
        }
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::{PlaneKind, WallSide},
        world::Palette,
    };

    /* tiny helpers ---------------------------------------------------*/
    fn tiny_bank() -> TextureBank {
        let mut bank = TextureBank::default_with_checker();
        // 2 × 2: transparent top row, opaque bottom row
        bank.insert("SPR", Texture::new("SPR", 2, 2, vec![0, 0, 200, 200]).unwrap())
            .unwrap();
        bank.insert("BLUE", Texture::new("BLUE", 4, 4, vec![50; 16]).unwrap())
            .unwrap();
        bank
    }

    fn full_slice(y: i32, h: i32, rows: usize) -> VSlice {
        VSlice {
            tex_row: 0,
            tex_rows: rows,
            y,
            h,
        }
    }

    #[test]
    fn wall_fills_its_rect_only() {
        let bank = tiny_bank();
        let mut sw = Software::default();
        sw.begin_frame(8, 8);
        let wall = WallColumn {
            x: 2,
            width: 2,
            tex: 2,
            tex_col: 0,
            slice: full_slice(1, 4, 4),
            line_height: 4.0,
            shade: 255,
            distance: 1.0,
            side: WallSide::Vertical,
            tile: 1,
        };
        sw.draw_wall(&wall, &bank);
        let blue = bank.get_color(0, 50);
        let mut out = Vec::new();
        sw.end_frame(|fb, _, _| out = fb.to_vec());
        assert_eq!(out[8 + 2], blue);
        assert_eq!(out[4 * 8 + 3], blue);
        assert_eq!(out[5 * 8 + 2], CLEAR);
        assert_eq!(out[8 + 4], CLEAR);
    }

    #[test]
    fn sprite_skips_transparent_texels() {
        let bank = tiny_bank();
        let mut sw = Software::default();
        sw.begin_frame(4, 4);
        let span = SpriteSpan {
            x0: 0,
            x1: 2,
            tex: 1,
            u0: 0.25,
            du: 1.0,
            slice: full_slice(0, 2, 2),
            shade: 255,
            depth: 1.0,
        };
        sw.draw_sprite(&span, &bank);
        let mut out = Vec::new();
        sw.end_frame(|fb, _, _| out = fb.to_vec());
        assert_eq!(out[0], CLEAR);
        assert_eq!(out[1], CLEAR);
        assert_eq!(out[4], bank.get_color(0, 200));
        assert_eq!(out[5], bank.get_color(0, 200));
    }

    #[test]
    fn planes_go_through_the_palette() {
        let mut bank = tiny_bank();
        let mut pal = Palette::greyscale();
        pal.0[7] = 0x00_FF0000;
        bank.set_palette(pal);
        let mut sw = Software::default();
        sw.begin_frame(3, 4);
        let plane = PlaneBuffer {
            kind: PlaneKind::Floor,
            y0: 2,
            width: 3,
            rows: 2,
            pixels: vec![7; 6],
        };
        sw.draw_plane(&plane, &bank);
        let mut out = Vec::new();
        sw.end_frame(|fb, w, h| {
            assert_eq!((w, h), (3, 4));
            out = fb.to_vec();
        });
        assert!(out[..6].iter().all(|&c| c == CLEAR));
        assert!(out[6..].iter().all(|&c| c == 0x00_FF0000));
    }

    #[test]
    fn off_screen_rows_are_clipped() {
        let bank = tiny_bank();
        let mut sw = Software::default();
        sw.begin_frame(4, 4);
        let wall = WallColumn {
            x: 3,
            width: 5,
            tex: 2,
            tex_col: 3,
            slice: full_slice(-10, 30, 4),
            line_height: 30.0,
            shade: 1,
            distance: 9.0,
            side: WallSide::Horizontal,
            tile: 1,
        };
        sw.draw_wall(&wall, &bank);
        let mut count = 0;
        sw.end_frame(|fb, _, _| count = fb.iter().filter(|&&c| c != CLEAR).count());
        assert_eq!(count, 4);
    }
}
