//! `maze_game`
//!
//! Game-side systems:
//! - Session state machine (`Initializing -> FadingIn -> Playing`)
//! - Smoothed camera and light tracking
//! - Input queue draining, once per tick
//! - Tick driver with console and renderer wiring

pub mod driver;
pub mod game;

pub use driver::GameDriver;
pub use game::{GameState, GameStateMachine};
