use once_cell::sync::Lazy;
use regex::Regex;

use crate::world::{Layer, TileId};

/*=======================================================================*/
/*                                Errors                                 */
/*=======================================================================*/

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} grid is empty")]
    Empty(&'static str),

    #[error("row {row}: expected {expected} tiles, found {found}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}, column {column}: `{token}` is not a tile id")]
    BadToken {
        row: usize,
        column: usize,
        token: String,
    },

    #[error("{layer} grid is {found:?}, wall grid is {expected:?}")]
    ShapeMismatch {
        layer: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("tile size must be a positive finite number, got {0}")]
    BadTileSize(f32),
}

/*=======================================================================*/
/*                          Parsed text grid                             */
/*=======================================================================*/

/// Rectangular, validated grid of tile ids straight out of a text file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawGrid {
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<TileId>, // row-major
}

impl RawGrid {
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

/// Parse one grid.  Two row styles are accepted and may be mixed:
///
/// * compact: every character is one digit: `10001`
/// * separated: integers split by whitespace and/or commas: `12, 0, 7`
///
/// Blank lines and lines starting with `#` are skipped.  Ragged rows are an
/// error; nothing is padded or truncated.
pub fn parse_grid(text: &str, layer: Layer) -> Result<RawGrid, MapError> {
    static SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s,]+").unwrap());

    let mut tiles = Vec::new();
    let mut width = None;
    let mut height = 0usize;

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line_no + 1;

        let before = tiles.len();
        if SEP.is_match(line) {
            for (column, token) in SEP.split(line).filter(|t| !t.is_empty()).enumerate() {
                let id = token.parse::<TileId>().map_err(|_| MapError::BadToken {
                    row,
                    column: column + 1,
                    token: token.to_owned(),
                })?;
                tiles.push(id);
            }
        } else {
            for (column, ch) in line.chars().enumerate() {
                let id = ch.to_digit(10).ok_or_else(|| MapError::BadToken {
                    row,
                    column: column + 1,
                    token: ch.to_string(),
                })?;
                tiles.push(id as TileId);
            }
        }
        let found = tiles.len() - before;

        match width {
            None => width = Some(found),
            Some(expected) if expected != found => {
                return Err(MapError::Ragged {
                    row,
                    expected,
                    found,
                });
            }
            Some(_) => {}
        }
        height += 1;
    }

    match width {
        Some(width) if width > 0 => Ok(RawGrid {
            width,
            height,
            tiles,
        }),
        _ => Err(MapError::Empty(layer.name())),
    }
}

/// Fail unless `other` has the wall grid's shape.
pub fn check_shape(walls: &RawGrid, other: &RawGrid, layer: Layer) -> Result<(), MapError> {
    if walls.shape() != other.shape() {
        return Err(MapError::ShapeMismatch {
            layer: layer.name(),
            expected: walls.shape(),
            found: other.shape(),
        });
    }
    Ok(())
}

/*=======================================================================*/
/*                                Tests                                  */
/*=======================================================================*/
