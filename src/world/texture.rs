// Format-agnostic repository of indexed textures handed over by the asset
// collaborator. The renderer and world logic interact through `TextureId` only.

use std::collections::HashMap;

use std::ops::{Index, IndexMut};

use crate::world::grid::TileId;

/// Runtime handle for a texture in this bank.
///
/// *Guaranteed* to remain stable for the lifetime of the bank.
pub type TextureId = u16;

/// `TextureId` whose pixels are the checkerboard fallback.
/// Always = 0 because `TextureBank::new()` inserts it first.
pub const NO_TEXTURE: TextureId = 0;

/// Palette index treated as "see-through" when drawing sprites.
pub const TRANSPARENT: u8 = 0;

/// Number of rows in the light table; row 0 is full bright.
pub const LIGHT_LEVELS: usize = 32;

/// CPU-side storage: one **palette index** per texel in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub name: String,
    pub w: usize,
    pub h: usize,
    pub pixels: Vec<u8>,
}

/// Convenience checkerboard 8×8 (two palette entries).
impl Default for Texture {
    fn default() -> Self {
        Texture {
            name: "CHECKER".into(),
            w: 8,
            h: 8,
            pixels: checker_pixels(8, 8, 8, 16),
        }
    }
}

impl Texture {
    /// Build a texture after checking that `pixels` covers `w × h`.
    pub fn new<S: Into<String>>(
        name: S,
        w: usize,
        h: usize,
        pixels: Vec<u8>,
    ) -> Result<Self, TextureError> {
        let tex = Self {
            name: name.into(),
            w,
            h,
            pixels,
        };
        tex.validate()?;
        Ok(tex)
    }

    /// One-texel checkerboard alternating between `light` and `dark`.
    pub fn checker<S: Into<String>>(
        name: S,
        w: usize,
        h: usize,
        light: u8,
        dark: u8,
    ) -> Result<Self, TextureError> {
        Self::new(name, w, h, checker_pixels(w, h, light, dark))
    }

    /// Non-empty, and `pixels` covers exactly `w × h`.
    pub fn validate(&self) -> Result<(), TextureError> {
        if self.w == 0 || self.h == 0 || self.pixels.len() != self.w * self.h {
            return Err(TextureError::BadDimensions {
                name: self.name.clone(),
                w: self.w,
                h: self.h,
                len: self.pixels.len(),
            });
        }
        Ok(())
    }

    /// Texel at (`u`, `v`); callers keep coordinates in range.
    #[inline(always)]
    pub fn texel(&self, u: usize, v: usize) -> u8 {
        self.pixels[v * self.w + u]
    }
}

fn checker_pixels(w: usize, h: usize, light: u8, dark: u8) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(w * h);
    for y in 0..h {
        for x in 0..w {
            pixels.push(if (x ^ y) & 1 == 0 { light } else { dark });
        }
    }
    pixels
}

/// Things that can go wrong when using the bank.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextureError {
    /// Attempted to insert a second texture with an existing name.
    #[error("texture name `{0}` already present in bank")]
    Duplicate(String),

    /// Requested ID is outside `0 .. bank.len()`.
    #[error("texture id {0} out of range")]
    BadId(TextureId),

    /// Pixel vector does not match the declared size.
    #[error("texture `{name}`: {len} texels do not fill {w}x{h}")]
    BadDimensions {
        name: String,
        w: usize,
        h: usize,
        len: usize,
    },
}

/// 256-entry colour table, 0x00RRGGBB.
#[derive(Clone)]
pub struct Palette(pub [u32; 256]);
impl Default for Palette {
    fn default() -> Self {
        Palette([0u32; 256])
    }
}
impl Index<usize> for Palette {
    type Output = u32;
    fn index(&self, idx: usize) -> &u32 {
        &self.0[idx]
    }
}
impl IndexMut<usize> for Palette {
    fn index_mut(&mut self, idx: usize) -> &mut u32 {
        &mut self.0[idx]
    }
}

impl Palette {
    /// Grey ramp: index `i` maps to `(i, i, i)`.
    pub fn greyscale() -> Self {
        let mut pal = Palette::default();
        for i in 0..256u32 {
            pal[i as usize] = (i << 16) | (i << 8) | i;
        }
        pal
    }

    /// 3-3-2 colour cube: bits `rrrgggbb` of the index pick the channels.
    pub fn rgb332() -> Self {
        let mut pal = Palette::default();
        for i in 0..256u32 {
            let r = ((i >> 5) & 7) * 255 / 7;
            let g = ((i >> 2) & 7) * 255 / 7;
            let b = (i & 3) * 255 / 3;
            pal[i as usize] = (r << 16) | (g << 8) | b;
        }
        pal
    }

    /// Index of the entry closest (squared RGB distance) to `rgb`.
    pub fn nearest(&self, rgb: u32) -> u8 {
        let (r, g, b) = split_rgb(rgb);
        let mut best = 0usize;
        let mut best_d = i32::MAX;
        for (i, &c) in self.0.iter().enumerate() {
            let (pr, pg, pb) = split_rgb(c);
            let d = (r - pr).pow(2) + (g - pg).pow(2) + (b - pb).pow(2);
            if d < best_d {
                best = i;
                best_d = d;
                if d == 0 {
                    break;
                }
            }
        }
        best as u8
    }
}

#[inline]
fn split_rgb(c: u32) -> (i32, i32, i32) {
    (
        ((c >> 16) & 0xFF) as i32,
        ((c >> 8) & 0xFF) as i32,
        (c & 0xFF) as i32,
    )
}

/// Light table: `colormap[level][index]` is the palette index that best
/// represents `index` darkened to `level`.
#[derive(Clone)]
pub struct Colormap(pub [[u8; 256]; LIGHT_LEVELS]);
impl Default for Colormap {
    fn default() -> Self {
        let mut rows = [[0u8; 256]; LIGHT_LEVELS];
        for row in rows.iter_mut() {
            for (i, v) in row.iter_mut().enumerate() {
                *v = i as u8;
            }
        }
        Colormap(rows)
    }
}
impl Index<usize> for Colormap {
    type Output = [u8; 256];
    fn index(&self, idx: usize) -> &Self::Output {
        &self.0[idx]
    }
}
impl IndexMut<usize> for Colormap {
    fn index_mut(&mut self, idx: usize) -> &mut [u8; 256] {
        &mut self.0[idx]
    }
}

impl Colormap {
    /// Darken every palette entry linearly towards black and snap the
    /// result back onto the palette.
    pub fn from_palette(palette: &Palette) -> Self {
        let mut map = Colormap::default();
        for level in 0..LIGHT_LEVELS {
            let keep = (LIGHT_LEVELS - level) as i32;
            for idx in 0..256 {
                let (r, g, b) = split_rgb(palette[idx]);
                let dim = |c: i32| (c * keep / LIGHT_LEVELS as i32) as u32;
                let rgb = (dim(r) << 16) | (dim(g) << 8) | dim(b);
                map[level][idx] = palette.nearest(rgb);
            }
        }
        // the transparent index must survive every light level
        for row in map.0.iter_mut() {
            row[TRANSPARENT as usize] = TRANSPARENT;
        }
        map
    }

    /// Light row for a shade value in `1..=255` (255 = full bright).
    #[inline]
    pub fn level_for_shade(shade: u8) -> usize {
        let dark = 255 - shade.max(1) as usize;
        dark * (LIGHT_LEVELS - 1) / 254
    }
}

/// A palette-agnostic, format-agnostic cache of textures.
///
/// * Does **not** know about PNG or any file format; that is the loader’s job.
/// * Stores exactly one copy of every name.
/// * ID **0** is always the “missing” checkerboard.
///
/// Immutable during a frame, so the floor and ceiling workers can share
/// a `&TextureBank`.
pub struct TextureBank {
    by_name: HashMap<String, TextureId>,
    data: Vec<Texture>,
    palette: Palette,
    colormap: Colormap,
}

impl TextureBank {
    // ---------------------------------------------------------------------
    // Constructors
    // ---------------------------------------------------------------------

    /// Create an empty bank with a mandatory *missing* texture used as
    /// fallback.  The texture is inserted under the fixed name `"MISSING"`
    /// and obtains the handle **0**.
    /// A degenerate `missing_tex` is replaced by the default checkerboard.
    pub fn new(missing_tex: Texture) -> Self {
        let missing_tex = match missing_tex.validate() {
            Ok(()) => missing_tex,
            Err(err) => {
                tracing::warn!(%err, "unusable fallback texture, using checkerboard");
                Texture::default()
            }
        };
        let mut by_name = HashMap::new();
        by_name.insert("MISSING".into(), NO_TEXTURE);
        let palette = Palette::greyscale();
        let colormap = Colormap::from_palette(&palette);
        Self {
            by_name,
            data: vec![missing_tex],
            palette,
            colormap,
        }
    }

    /// Replace the palette and rebuild the light table from it.
    pub fn set_palette(&mut self, palette: Palette) {
        self.colormap = Colormap::from_palette(&palette);
        self.palette = palette;
    }

    pub fn set_colormap(&mut self, colormap: Colormap) {
        self.colormap = colormap;
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Palette index of `texel` darkened to `shade_idx`.
    #[inline]
    pub fn shade_index(&self, shade_idx: usize, texel: u8) -> u8 {
        self.colormap[shade_idx.min(LIGHT_LEVELS - 1)][texel as usize]
    }

    /// Final colour of `texel` at light row `shade_idx`.
    #[inline]
    pub fn get_color(&self, shade_idx: usize, texel: u8) -> u32 {
        self.palette[self.shade_index(shade_idx, texel) as usize]
    }

    pub fn default_with_checker() -> Self {
        Self::new(Texture::default())
    }

    // ---------------------------------------------------------------------
    // Query helpers
    // ---------------------------------------------------------------------

    /// Number of textures stored (including the “missing” one).
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.len() == 1
    } // only checker

    /// Obtain the id for a *loaded* texture by name.
    /// Returns `None` if the name is unknown.
    pub fn id(&self, name: &str) -> Option<TextureId> {
        self.by_name.get(name).copied()
    }

    /// Fallback-safe query: unknown names resolve to the checkerboard id.
    pub fn id_or_missing(&self, name: &str) -> TextureId {
        self.id(name).unwrap_or(NO_TEXTURE)
    }

    /// Borrow a texture by id, with bounds-checking.
    pub fn texture(&self, id: TextureId) -> Result<&Texture, TextureError> {
        self.data.get(id as usize).ok_or(TextureError::BadId(id))
    }

    /// Borrow a texture, substituting the checkerboard for bad ids.
    #[inline]
    pub fn texture_or_missing(&self, id: TextureId) -> &Texture {
        self.data.get(id as usize).unwrap_or(&self.data[0])
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Insert a texture under `name`.
    ///
    /// * Returns the newly assigned `TextureId`.
    /// * Fails if the name already exists (`Duplicate`).
    pub fn insert<S: Into<String>>(
        &mut self,
        name: S,
        tex: Texture,
    ) -> Result<TextureId, TextureError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(TextureError::Duplicate(name));
        }
        tex.validate()?;
        let id = self.data.len() as TextureId;
        tracing::debug!(%name, id, w = tex.w, h = tex.h, "texture registered");
        self.data.push(tex);
        self.by_name.insert(name, id);
        Ok(id)
    }
}

/*======================================================================*/
/*                     Tile id → texture lookup                         */
/*======================================================================*/

/// Maps grid tile identifiers to bank textures.  Built once at load time
/// by the asset collaborator; identifiers with no entry fall back to
/// [`NO_TEXTURE`].
#[derive(Clone, Debug, Default)]
pub struct TileTextures {
    ids: Vec<TextureId>,
}

impl TileTextures {
    pub fn new(ids: Vec<TextureId>) -> Self {
        Self { ids }
    }

    /// Bind `tile` to `tex`, growing the table as needed.
    pub fn bind(&mut self, tile: TileId, tex: TextureId) {
        let idx = tile as usize;
        if idx >= self.ids.len() {
            self.ids.resize(idx + 1, NO_TEXTURE);
        }
        self.ids[idx] = tex;
    }

    #[inline]
    pub fn resolve(&self, tile: TileId) -> TextureId {
        self.ids.get(tile as usize).copied().unwrap_or(NO_TEXTURE)
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_tex(color: u8) -> Texture {
        Texture {
            name: "Dummy".to_string(),
            w: 2,
            h: 2,
            pixels: vec![color; 4],
        }
    }

    #[test]
    fn insert_and_lookup() {
        let mut bank = TextureBank::default_with_checker();
        let red = bank.insert("RED", dummy_tex(0x00)).unwrap();
        let blue = bank.insert("BLUE", dummy_tex(0xFF)).unwrap();

        assert_ne!(red, NO_TEXTURE);
        assert_ne!(blue, red);
        assert_eq!(bank.id("RED"), Some(red));
        assert_eq!(bank.id("BLUE"), Some(blue));
        assert_eq!(bank.id("NOPE"), None);

        assert_eq!(bank.texture(red).unwrap().pixels[0], 0x00);
        assert_eq!(bank.texture(blue).unwrap().pixels[0], 0xFF);
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut bank = TextureBank::default_with_checker();
        bank.insert("WOOD", dummy_tex(1)).unwrap();
        let err = bank.insert("WOOD", dummy_tex(2)).unwrap_err();
        assert_eq!(err, TextureError::Duplicate("WOOD".into()));
        // texture count still 2 (checker + first WOOD)
        assert_eq!(bank.len(), 2);
    }

    #[test]
    fn bad_id_guard() {
        let bank = TextureBank::default_with_checker();
        let bad = TextureId::MAX;
        assert_eq!(bank.texture(bad).unwrap_err(), TextureError::BadId(bad));
        assert_eq!(bank.texture_or_missing(bad).name, "CHECKER");
    }

    #[test]
    fn texture_new_checks_size() {
        assert!(Texture::new("OK", 2, 2, vec![1; 4]).is_ok());
        assert!(matches!(
            Texture::new("BAD", 2, 2, vec![1; 3]),
            Err(TextureError::BadDimensions { len: 3, .. })
        ));
    }

    #[test]
    fn empty_textures_are_rejected() {
        assert!(matches!(
            Texture::checker("FLAT", 0, 4, 1, 2),
            Err(TextureError::BadDimensions { w: 0, h: 4, .. })
        ));
        let chk = Texture::checker("CHK", 3, 2, 1, 2).unwrap();
        assert_eq!(chk.pixels, vec![1, 2, 1, 2, 1, 2]);

        let mut bank = TextureBank::default_with_checker();
        let hollow = Texture {
            name: "HOLLOW".into(),
            w: 0,
            h: 0,
            pixels: Vec::new(),
        };
        assert!(bank.insert("HOLLOW", hollow.clone()).is_err());
        assert_eq!(bank.len(), 1);
        assert_eq!(TextureBank::new(hollow).texture_or_missing(NO_TEXTURE).name, "CHECKER");
    }

    #[test]
    fn greyscale_light_table_darkens() {
        let bank = TextureBank::default_with_checker();
        // full bright leaves the index untouched
        assert_eq!(bank.shade_index(0, 200), 200);
        // deepest row is much darker but keeps transparency
        assert!(bank.shade_index(LIGHT_LEVELS - 1, 200) < 20);
        assert_eq!(bank.shade_index(LIGHT_LEVELS - 1, TRANSPARENT), TRANSPARENT);
    }

    #[test]
    fn rgb332_corners() {
        let pal = Palette::rgb332();
        assert_eq!(pal[0], 0x00_000000);
        assert_eq!(pal[0b111_000_00], 0x00_FF0000);
        assert_eq!(pal[0b000_111_00], 0x00_00FF00);
        assert_eq!(pal[0b000_000_11], 0x00_0000FF);
        assert_eq!(pal[255], 0x00_FFFFFF);
    }

    #[test]
    fn shade_to_level_bounds() {
        assert_eq!(Colormap::level_for_shade(255), 0);
        assert_eq!(Colormap::level_for_shade(1), LIGHT_LEVELS - 1);
        assert_eq!(Colormap::level_for_shade(0), LIGHT_LEVELS - 1);
    }

    #[test]
    fn tile_textures_fallback() {
        let mut tiles = TileTextures::default();
        tiles.bind(3, 7);
        assert_eq!(tiles.resolve(3), 7);
        assert_eq!(tiles.resolve(2), NO_TEXTURE);
        assert_eq!(tiles.resolve(99), NO_TEXTURE);
    }
}
