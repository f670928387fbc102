pub mod constants;
pub mod geometry;
pub mod types;

pub use constants::*;
pub use types::*;

pub use glam::DVec2;
