use super::action::Facing;
use super::config::GameConfig;
use super::lap::LapTracker;
use super::physics::VehicleState;
use crate::rl::QLearningAgent;

/// Width of one background tile in offset units. The renderer maps this
/// span onto the terminal width.
pub const BACKGROUND_SPAN: f64 = 1024.0;

/// Everything a single race owns.
///
/// Starting a new race means building a new `RaceState`; nothing here is
/// reset in place.
#[derive(Debug, Clone)]
pub struct RaceState {
    /// Player position along the loop, in `[0, track_length)`
    pub position: f64,
    /// Lateral offset from the road centre, in world units
    pub player_x: f64,
    pub camera_height: f64,
    pub facing: Facing,

    pub vehicle: VehicleState,
    pub laps: LapTracker,
    pub ai: QLearningAgent,

    pub score: f64,
    /// Last whole segment of travelled distance that earned score
    pub previous_segment: u64,

    /// Horizontal scroll of the background, in `[0, BACKGROUND_SPAN)`
    pub background_offset: f64,
    /// Seconds left on the lap-complete banner
    pub lap_flash: f64,

    pub ticks: u64,
    /// Simulated seconds since the race started
    pub elapsed: f64,
}

impl RaceState {
    pub fn new(config: &GameConfig, ai: QLearningAgent) -> Self {
        Self {
            position: 0.0,
            player_x: 0.0,
            camera_height: config.camera_height,
            facing: Facing::Front,
            vehicle: VehicleState::new(config.vehicle.clone()),
            laps: LapTracker::new(
                config.lap_trigger_segments as f64 * config.segment_length,
                config.min_lap_time,
            ),
            ai,
            score: 0.0,
            previous_segment: 0,
            background_offset: 0.0,
            lap_flash: 0.0,
            ticks: 0,
            elapsed: 0.0,
        }
    }

    /// Text of the lap banner while it is showing
    pub fn lap_banner(&self) -> Option<String> {
        if self.lap_flash > 0.0 {
            Some(format!("LAP {} COMPLETE!", self.laps.lap_count))
        } else {
            None
        }
    }
}
