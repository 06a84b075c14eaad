//! Text map loading: wall grid plus optional floor/ceiling companions.

mod demo;
mod level;
mod loader;

pub use demo::{DEMO_CEILING, DEMO_FLOOR, DEMO_WALLS, demo_grid};
pub use level::{MapError, RawGrid, check_shape, parse_grid};
pub use loader::{grid_from_str, load_grid, walls_from_str};
