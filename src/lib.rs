//! Wormy - a terminal snake game
//!
//! This library provides:
//! - Core game logic with injectable randomness (game module)
//! - Keyboard input mapping (input module)
//! - TUI rendering (render module)
//! - Session statistics (metrics module)
//! - The interactive game loop (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
