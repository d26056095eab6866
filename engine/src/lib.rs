//! Bubble-pop simulation core.
//!
//! This module exposes the engine components for use in tests and binaries.

pub mod autoplayer;
pub mod bubble;
pub mod cli;
pub mod config;
pub mod field;
pub mod game_loop;
pub mod leaderboard;
pub mod placement;
pub mod protocol;
pub mod scheduler;
pub mod scoring;
pub mod session;
pub mod stdio;

pub use bubblepop_shared::category;
pub use bubblepop_shared::vec2;
