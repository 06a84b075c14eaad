mod systems;
mod tic;

pub use systems::{animation, behavior};
pub use tic::{DT, SIM_FPS, TicRunner};
