use glam::{IVec2, Vec2};

/// Integer tile identifier.  `0` is "empty" in the wall layer.
pub type TileId = u16;

/// Empty cell marker for the wall layer.
pub const EMPTY: TileId = 0;

/// Default edge length of one cell in world units.
pub const TILE_SIZE: f32 = 50.0;

/// Which of the three parallel layers to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    Walls,
    Floor,
    Ceiling,
}

impl Layer {
    pub fn name(self) -> &'static str {
        match self {
            Layer::Walls => "walls",
            Layer::Floor => "floor",
            Layer::Ceiling => "ceiling",
        }
    }
}

/// Axis-aligned world-space rectangle of one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellRect {
    pub min: Vec2,
    pub size: f32,
}

/// Static map of one level (immutable after load).
///
/// All layers are row-major `width × height`; the loader guarantees equal
/// shapes, so every accessor can share one index computation.
#[derive(Clone, Debug)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tile_size: f32,
    walls: Vec<TileId>,
    floor: Option<Vec<TileId>>,
    ceiling: Option<Vec<TileId>>,
}

impl TileGrid {
    /// Build a grid from already-validated parts.  Shape checks live in
    /// [`crate::map`]; this only asserts the invariant in debug builds.
    pub(crate) fn from_parts(
        width: usize,
        height: usize,
        tile_size: f32,
        walls: Vec<TileId>,
        floor: Option<Vec<TileId>>,
        ceiling: Option<Vec<TileId>>,
    ) -> Self {
        debug_assert_eq!(walls.len(), width * height);
        debug_assert!(floor.as_ref().is_none_or(|f| f.len() == walls.len()));
        debug_assert!(ceiling.as_ref().is_none_or(|c| c.len() == walls.len()));
        Self {
            width,
            height,
            tile_size,
            walls,
            floor,
            ceiling,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn has_layer(&self, layer: Layer) -> bool {
        match layer {
            Layer::Walls => true,
            Layer::Floor => self.floor.is_some(),
            Layer::Ceiling => self.ceiling.is_some(),
        }
    }

    #[inline]
    fn index(&self, cell: IVec2) -> Option<usize> {
        if cell.x < 0 || cell.y < 0 {
            return None;
        }
        let (x, y) = (cell.x as usize, cell.y as usize);
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    #[inline]
    pub fn contains(&self, cell: IVec2) -> bool {
        self.index(cell).is_some()
    }

    /// Tile id of `layer` at `cell`; `None` outside the grid or when the
    /// layer is absent.
    #[inline]
    pub fn get(&self, layer: Layer, cell: IVec2) -> Option<TileId> {
        let idx = self.index(cell)?;
        match layer {
            Layer::Walls => Some(self.walls[idx]),
            Layer::Floor => self.floor.as_ref().map(|f| f[idx]),
            Layer::Ceiling => self.ceiling.as_ref().map(|c| c[idx]),
        }
    }

    /// Wall id at `cell`, `None` outside the grid.
    #[inline]
    pub fn wall(&self, cell: IVec2) -> Option<TileId> {
        self.index(cell).map(|i| self.walls[i])
    }

    /// True for in-grid non-empty cells.
    #[inline]
    pub fn is_wall(&self, cell: IVec2) -> bool {
        self.wall(cell).is_some_and(|t| t != EMPTY)
    }

    /// Iterate `(cell, id)` over one layer in row-major order.
    pub fn cells(&self, layer: Layer) -> impl Iterator<Item = (IVec2, TileId)> + '_ {
        let data = match layer {
            Layer::Walls => Some(&self.walls),
            Layer::Floor => self.floor.as_ref(),
            Layer::Ceiling => self.ceiling.as_ref(),
        };
        let w = self.width;
        data.into_iter().flat_map(move |d| {
            d.iter()
                .enumerate()
                .map(move |(i, &t)| (IVec2::new((i % w) as i32, (i / w) as i32), t))
        })
    }

    /*──────────────────────── coordinate spaces ─────────────────────*/

    /// World units → grid units.
    #[inline]
    pub fn to_local(&self, world: Vec2) -> Vec2 {
        world / self.tile_size
    }

    /// Grid units → world units.
    #[inline]
    pub fn to_global(&self, local: Vec2) -> Vec2 {
        local * self.tile_size
    }

    /// Wall tile under a world-space point together with the cell's
    /// world rectangle.  `None` outside the grid.
    pub fn tile_at_global(&self, world: Vec2) -> Option<(TileId, CellRect)> {
        let cell = self.to_local(world).floor().as_ivec2();
        let id = self.wall(cell)?;
        Some((
            id,
            CellRect {
                min: cell.as_vec2() * self.tile_size,
                size: self.tile_size,
            },
        ))
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
