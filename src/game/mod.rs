//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! Randomness is always injected, so every operation can be driven deterministically.

pub mod action;
pub mod config;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use action::{Direction, set_direction};
pub use config::GameConfig;
pub use engine::{
    GameEngine, INITIAL_LENGTH, TickOutcome, death_cause, initialize, is_dead, random_cell,
    relocate_food, step,
};
pub use state::{DeathCause, GameState, Phase, Position, Snake};
