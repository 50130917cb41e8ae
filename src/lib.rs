//! Pseudo Racer - a pseudo-3D terminal racer against a learning opponent
//!
//! This library provides:
//! - Track, projection, vehicle physics and lap logic (game module)
//! - The tabular Q-learning opponent (rl module)
//! - Software road rendering and the TUI layout (render module)
//! - Keyboard handling, stores and execution modes (race, train, leaderboard, params)

pub mod assets;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;
pub mod settings;
pub mod store;
