//! Core race simulation
//!
//! This module contains the track, projection, vehicle physics and lap logic
//! without any terminal or rendering dependencies. It is driven both by the
//! interactive race mode and by headless training.

pub mod action;
pub mod config;
pub mod engine;
pub mod lap;
pub mod physics;
pub mod segment;
pub mod state;
pub mod track;

// Re-export commonly used types
pub use action::{DriveCommand, DriveInput, Facing};
pub use config::{GameConfig, VehicleParams};
pub use engine::{RaceEngine, StepResult};
pub use lap::LapTracker;
pub use physics::VehicleState;
pub use segment::{Camera, Decoration, Projection, Rgb, RoadSegment, SegmentColors, Viewport};
pub use state::RaceState;
pub use track::{wrap_position, Track};
