//! `maze_shared`
//!
//! Shared libraries used by the game state machine and its driver.
//!
//! Design goals:
//! - Deterministic given a seed.
//! - No rendering API: only the data a renderer samples each frame.
//! - No `unsafe`.

pub mod config;
pub mod console;
pub mod event;
pub mod math;
pub mod maze;
pub mod render;

pub mod prelude {
    //! Commonly used exports.

    pub use crate::config::*;
    pub use crate::event::*;
    pub use crate::math::*;
    pub use crate::maze::*;
    pub use crate::render::*;
}
