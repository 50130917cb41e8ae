use std::collections::HashMap;

use super::{
    action::DriveInput,
    config::GameConfig,
    state::{RaceState, BACKGROUND_SPAN},
    track::{wrap_position, Track},
};
use crate::assets::Sprite;
use crate::rl::{QLearningAgent, QLearningConfig, QTable};

/// Result of a race step
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepResult {
    /// A lap was completed this tick
    pub lap_completed: bool,
    /// Signed distance the player moved along the track
    pub advance: f64,
    /// Distance the opponent moved
    pub ai_forward: f64,
    /// Score earned this tick
    pub score_gained: f64,
}

/// Owns the track and advances races on it
pub struct RaceEngine {
    config: GameConfig,
    agent_config: QLearningConfig,
    track: Track,
    vehicle_overrides: HashMap<String, f64>,
}

impl RaceEngine {
    /// Build the track once; it is reused by every race
    pub fn new(config: GameConfig, agent_config: QLearningConfig, decorations: &[Sprite]) -> Self {
        let track = Track::build(&config, decorations);
        let agent_config = agent_config.for_road(config.road_half_width());
        Self {
            config,
            agent_config,
            track,
            vehicle_overrides: HashMap::new(),
        }
    }

    /// Tuning values applied to the vehicle at the start of every race
    pub fn with_vehicle_overrides(mut self, overrides: HashMap<String, f64>) -> Self {
        self.vehicle_overrides = overrides;
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn agent_config(&self) -> &QLearningConfig {
        &self.agent_config
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    /// Mutable track access for the projection pass
    pub fn track_mut(&mut self) -> &mut Track {
        &mut self.track
    }

    /// Start a race with a fresh vehicle, lap clock and opponent.
    ///
    /// `q_table` carries learned values into the new opponent.
    pub fn new_race(&self, q_table: Option<QTable>) -> RaceState {
        let track_length = self.track.length();
        let start = track_length * self.config.ai_start_fraction;
        let agent = match q_table {
            Some(table) => {
                QLearningAgent::with_q_table(self.agent_config.clone(), track_length, start, table)
            }
            None => QLearningAgent::new(self.agent_config.clone(), track_length, start),
        };

        let mut state = RaceState::new(&self.config, agent);
        state.vehicle.apply_vehicle_params(&self.vehicle_overrides);
        state
    }

    /// Advance the race by `dt` seconds with the given held keys.
    ///
    /// Order: physics, player position, steering, camera, background, lap
    /// clock, opponent, score.
    pub fn step(&self, state: &mut RaceState, input: &DriveInput, dt: f64) -> StepResult {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let config = &self.config;
        let segment_length = self.track.segment_length();

        let command = input.command(segment_length, config.speed_multiplier, config.throttle_boost);
        state.vehicle.tire_wear += command.tire_wear;
        state.facing = command.facing;

        state
            .vehicle
            .update(dt, command.moving, command.boost, command.braking);

        state.position = wrap_position(state.position + command.advance, self.track.length());

        let road_half_width = config.road_half_width();
        state.player_x = (state.player_x + command.steer * config.steer_step)
            .clamp(-road_half_width, road_half_width);

        let segment = self.track.segment_at(state.position);
        state.camera_height = (segment.y + config.camera_height).max(config.min_camera_height);

        if command.advance > 0.0 {
            state.background_offset -= segment.curve * 2.0;
        } else if command.advance < 0.0 {
            state.background_offset += segment.curve * 2.0;
        }
        state.background_offset = wrap_position(state.background_offset, BACKGROUND_SPAN);

        let lap_completed = state.laps.update(dt, state.position);

        let ai_forward = state.ai.update(state.position, road_half_width);

        let mut score_gained = 0.0;
        let current_segment = (state.vehicle.total_distance / segment_length).max(0.0) as u64;
        if current_segment != state.previous_segment && state.vehicle.velocity.abs() > 0.1 {
            score_gained = segment_length * state.vehicle.velocity;
            state.score += score_gained;
            state.previous_segment = current_segment;
        }

        state.lap_flash = (state.lap_flash - dt).max(0.0);
        if lap_completed {
            state.lap_flash = config.lap_flash_secs;
        }

        state.ticks += 1;
        state.elapsed += dt;

        StepResult {
            lap_completed,
            advance: command.advance,
            ai_forward,
            score_gained,
        }
    }
}
