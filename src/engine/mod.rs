pub mod depth;
#[allow(clippy::module_inception)]
pub mod engine;
pub mod frame;
pub mod planes;
pub mod raycast;
pub mod sprites;
pub mod types;
pub mod walls;

pub use depth::DepthBuffer;
pub use engine::Engine;
pub use frame::{Frame, FrameCompositor, FrameStats, Scene};
pub use planes::{FlatSource, FloorCeilingMapper, PlaneBuffer, PlaneKind};
pub use raycast::{RayHit, cast};
pub use sprites::{Billboard, BillboardProjector, SpriteSpan, Spans, sort_back_to_front};
pub use types::{Screen, VSlice, WallSide};
pub use walls::{ColumnProjector, WallColumn, projected_height};
