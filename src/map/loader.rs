// ──────────────────────────────────────────────────────────────────────────
// map/loader.rs
//
//  *   wall grid text       ──╮
//  *   floor grid text  (opt) │   --->  world::TileGrid
//  *   ceiling grid text(opt) │
//                            ╯
// ──────────────────────────────────────────────────────────────────────────

use std::{fs, path::Path};

use crate::{
    map::level::{MapError, RawGrid, check_shape, parse_grid},
    world::{Layer, TILE_SIZE, TileGrid},
};

/*====================================================================*/
/*                       Public API                                   */
/*====================================================================*/

/// Build a grid from in-memory texts.  Floor and ceiling must match the
/// wall grid's shape exactly.
pub fn grid_from_str(
    walls: &str,
    floor: Option<&str>,
    ceiling: Option<&str>,
    tile_size: f32,
) -> Result<TileGrid, MapError> {
    if !(tile_size.is_finite() && tile_size > 0.0) {
        return Err(MapError::BadTileSize(tile_size));
    }

    let walls = parse_grid(walls, Layer::Walls)?;
    let floor = parse_layer(&walls, floor, Layer::Floor)?;
    let ceiling = parse_layer(&walls, ceiling, Layer::Ceiling)?;

    tracing::info!(
        width = walls.width,
        height = walls.height,
        floor = floor.is_some(),
        ceiling = ceiling.is_some(),
        "map parsed"
    );

    Ok(TileGrid::from_parts(
        walls.width,
        walls.height,
        tile_size,
        walls.tiles,
        floor,
        ceiling,
    ))
}

/// Convenience for tests and demos: wall grid only, default tile size.
pub fn walls_from_str(walls: &str) -> Result<TileGrid, MapError> {
    grid_from_str(walls, None, None, TILE_SIZE)
}

/// Load the wall grid at `walls` plus optional companion grids.
pub fn load_grid<P: AsRef<Path>>(
    walls: P,
    floor: Option<P>,
    ceiling: Option<P>,
    tile_size: f32,
) -> Result<TileGrid, MapError> {
    let walls_path = walls.as_ref();
    tracing::info!(path = %walls_path.display(), "loading map");

    let walls_text = fs::read_to_string(walls_path)?;
    let floor_text = floor.map(fs::read_to_string).transpose()?;
    let ceiling_text = ceiling.map(fs::read_to_string).transpose()?;

    grid_from_str(
        &walls_text,
        floor_text.as_deref(),
        ceiling_text.as_deref(),
        tile_size,
    )
}

fn parse_layer(
    walls: &RawGrid,
    text: Option<&str>,
    layer: Layer,
) -> Result<Option<Vec<crate::world::TileId>>, MapError> {
    let Some(text) = text else {
        return Ok(None);
    };
    let grid = parse_grid(text, layer)?;
    check_shape(walls, &grid, layer)?;
    Ok(Some(grid.tiles))
}

/*====================================================================*/
/*                                Tests                               */
/*====================================================================*/
