//! Built-in level used when no map file is given.

use crate::{
    map::{MapError, grid_from_str},
    world::{TILE_SIZE, TileGrid},
};

pub const DEMO_WALLS: &str = "\
# 1 brick, 2 stone, 3 wood, 4 tiles
1111111111111111
1000000000000001
1022200000033301
1020000000000301
1020000400000301
1000000400000001
1000000000000001
1000044444400001
1000000000000001
1030000000000201
1030000100000201
1033300100022201
1000000000000001
1111111111111111
";

pub const DEMO_FLOOR: &str = "\
5555555555555555
5555555555555555
5555555555555555
5555566666655555
5555566666655555
5555566666655555
5555566666655555
5555555555555555
5555555555555555
5555555555555555
5555555555555555
5555555555555555
5555555555555555
5555555555555555
";

pub const DEMO_CEILING: &str = "\
7777777777777777
7777777777777777
7777777777777777
7777777777777777
7777777777777777
7777777777777777
7777777777777777
7777777777777777
7777777777777777
7777777777777777
7777777777777777
7777777777777777
7777777777777777
7777777777777777
";

/// The demo level with floor and ceiling layers.
pub fn demo_grid() -> Result<TileGrid, MapError> {
    grid_from_str(DEMO_WALLS, Some(DEMO_FLOOR), Some(DEMO_CEILING), TILE_SIZE)
}
