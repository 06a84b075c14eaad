mod animation;
mod camera;
mod grid;
mod sprite;
mod texture;

pub use animation::{Animation, Frame};

pub use camera::{Camera, DEFAULT_EYE_HEIGHT, MAX_EYE_HEIGHT};

pub use grid::{CellRect, EMPTY, Layer, TILE_SIZE, TileGrid, TileId};

pub use sprite::{Behavior, DirectionalViews, SpriteFlags, SpriteRecord, SpriteVisual, angular_distance};

pub use texture::{
    Colormap, LIGHT_LEVELS, NO_TEXTURE, Palette, TRANSPARENT, Texture, TextureBank, TextureError,
    TextureId, TileTextures,
};
