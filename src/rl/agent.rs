//! Live-learning opponent
//!
//! The agent learns during the race with tabular Q-learning over a tiny
//! discretised state and drives a kinematic car: speed and lane change in
//! fixed steps and the car always moves forward.

use rand::{rngs::StdRng, Rng, SeedableRng};

use super::action::{AiAction, ACTION_COUNT};
use super::config::QLearningConfig;
use super::observation::{compute_reward, make_state, DiscreteState};
use super::qtable::QTable;
use crate::game::track::wrap_position;

/// Tabular Q-learning driver for the opponent car
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    config: QLearningConfig,
    track_length: f64,

    /// Position along the loop, in `[0, track_length)`
    pub position: f64,
    /// Lateral offset from the road centre
    pub lane: f64,
    pub speed: f64,
    pub epsilon: f64,

    q_table: QTable,
    previous: Option<(DiscreteState, AiAction)>,
    rng: StdRng,

    // HUD statistics
    pub total_reward: f64,
    pub last_reward: f64,
    pub last_action: AiAction,
    pub explore_pct: f64,
    pub ticks: u64,
}

impl QLearningAgent {
    /// Create an agent starting `start_offset` units along the loop
    pub fn new(config: QLearningConfig, track_length: f64, start_offset: f64) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            position: wrap_position(start_offset, track_length),
            lane: 0.0,
            speed: config.base_forward,
            epsilon: config.epsilon_start,
            q_table: QTable::new(),
            previous: None,
            rng,
            total_reward: 0.0,
            last_reward: 0.0,
            last_action: AiAction::Coast,
            explore_pct: config.epsilon_start * 100.0,
            ticks: 0,
            config,
            track_length,
        }
    }

    /// Same as [`QLearningAgent::new`] but starting from learned values
    pub fn with_q_table(
        config: QLearningConfig,
        track_length: f64,
        start_offset: f64,
        q_table: QTable,
    ) -> Self {
        let mut agent = Self::new(config, track_length, start_offset);
        agent.q_table = q_table;
        agent
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    pub fn track_length(&self) -> f64 {
        self.track_length
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    /// Continue the decay schedule from a saved exploration rate,
    /// kept within `[epsilon_min, epsilon_start]`
    pub fn resume_exploration(&mut self, epsilon: f64) {
        if !epsilon.is_finite() {
            return;
        }
        let floor = self.config.epsilon_min.min(self.config.epsilon_start);
        self.epsilon = epsilon.clamp(floor, self.config.epsilon_start);
        self.explore_pct = self.epsilon * 100.0;
    }

    /// Advance the opponent one tick.
    ///
    /// `road_half_width` bounds the on-road check and the lane clamp.
    /// Returns the forward distance covered this tick.
    pub fn update(&mut self, player_pos: f64, road_half_width: f64) -> f64 {
        let road_half_width = if road_half_width.is_finite() {
            road_half_width.abs()
        } else {
            self.config.road_half_width
        };
        let on_road = self.lane.abs() < road_half_width;

        let state = make_state(
            &self.config,
            self.track_length,
            self.speed,
            self.lane,
            player_pos,
            self.position,
        );

        let reward = compute_reward(
            &self.config,
            self.track_length,
            self.speed,
            self.lane,
            player_pos,
            self.position,
            on_road,
        );
        self.total_reward += reward;
        self.last_reward = reward;

        // The reward for arriving here is credited to the previous choice
        if let Some((previous_state, previous_action)) = self.previous {
            self.q_table.update(
                previous_state,
                previous_action,
                reward,
                state,
                self.config.alpha,
                self.config.gamma,
            );
        }

        let action = self.select_action(state);
        self.explore_pct = self.epsilon * 100.0;
        self.last_action = action;

        self.apply_action(action, road_half_width);

        let forward = self.config.base_forward + (self.speed * self.config.speed_forward_factor).max(0.0);
        self.position = wrap_position(self.position + forward, self.track_length);

        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
        self.previous = Some((state, action));
        self.ticks += 1;

        forward
    }

    /// Epsilon-greedy choice over the current state's action values
    pub fn select_action(&mut self, state: DiscreteState) -> AiAction {
        if self.rng.gen::<f64>() < self.epsilon {
            AiAction::from_index(self.rng.gen_range(0..ACTION_COUNT))
        } else {
            self.q_table.best_action(state)
        }
    }

    fn apply_action(&mut self, action: AiAction, road_half_width: f64) {
        let config = &self.config;
        match action {
            AiAction::Accelerate => {
                self.speed = (self.speed + config.accel_step).min(config.max_speed);
            }
            AiAction::Brake => {
                self.speed = (self.speed - config.accel_step * config.brake_factor).max(0.0);
            }
            AiAction::SteerLeft => self.lane -= config.steer_step,
            AiAction::SteerRight => self.lane += config.steer_step,
            AiAction::Coast => {}
        }
        self.lane = self.lane.clamp(-road_half_width, road_half_width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACK: f64 = 640_000.0;

    fn seeded(seed: u64) -> QLearningConfig {
        QLearningConfig {
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_resume_exploration() {
        let mut agent = QLearningAgent::new(seeded(1), TRACK, 0.0);
        agent.resume_exploration(0.3);
        assert_eq!(agent.epsilon, 0.3);
        assert_eq!(agent.explore_pct, 30.0);

        agent.resume_exploration(0.01);
        assert_eq!(agent.epsilon, 0.05);
        agent.resume_exploration(f64::NAN);
        assert_eq!(agent.epsilon, 0.05);
    }

    #[test]
    fn test_initial_state() {
        let agent = QLearningAgent::new(seeded(1), TRACK, TRACK * 0.05);
        assert_eq!(agent.position, 32_000.0);
        assert_eq!(agent.lane, 0.0);
        assert_eq!(agent.speed, 240.0);
        assert_eq!(agent.epsilon, 1.0);
        assert!(agent.q_table().is_empty());
    }

    #[test]
    fn test_epsilon_after_one_tick() {
        let mut agent = QLearningAgent::new(seeded(2), TRACK, 0.0);
        agent.update(0.0, 4500.0);
        assert!((agent.epsilon - 0.9995).abs() < 1e-12);
        assert!((agent.explore_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_epsilon_floor_never_breached() {
        let mut agent = QLearningAgent::new(seeded(3), TRACK, 0.0);
        let mut player = 0.0;
        for _ in 0..20_000 {
            player = wrap_position(player + 300.0, TRACK);
            agent.update(player, 4500.0);
            assert!(agent.epsilon >= 0.05);
        }
        assert_eq!(agent.epsilon, 0.05);
    }

    #[test]
    fn test_always_moves_forward_and_wraps() {
        let mut agent = QLearningAgent::new(seeded(4), TRACK, TRACK - 100.0);
        let forward = agent.update(0.0, 4500.0);
        assert!(forward >= 240.0);
        assert!(agent.position >= 0.0 && agent.position < TRACK);
        assert!(agent.position < forward);

        for _ in 0..5000 {
            let forward = agent.update(0.0, 4500.0);
            assert!(forward >= 240.0);
            assert!(agent.position >= 0.0 && agent.position < TRACK);
            assert!(agent.speed >= 0.0 && agent.speed <= 600.0);
        }
    }

    #[test]
    fn test_lane_clamped_to_passed_width() {
        let mut agent = QLearningAgent::new(seeded(5), TRACK, 0.0);
        for _ in 0..5000 {
            agent.update(0.0, 100.0);
            assert!(agent.lane.abs() <= 100.0);
        }
    }

    #[test]
    fn test_states_bounded_by_bucket_grid() {
        let mut agent = QLearningAgent::new(seeded(6), TRACK, 0.0);
        let mut player = 0.0;
        for _ in 0..10_000 {
            player = wrap_position(player + 500.0, TRACK);
            agent.update(player, 4500.0);
        }
        assert!(agent.q_table().len() <= 125);
        assert!(!agent.q_table().is_empty());
    }

    #[test]
    fn test_seeded_agents_are_reproducible() {
        let mut a = QLearningAgent::new(seeded(7), TRACK, 0.0);
        let mut b = QLearningAgent::new(seeded(7), TRACK, 0.0);
        for i in 0..1000 {
            let player = i as f64 * 400.0;
            assert_eq!(a.update(player, 4500.0), b.update(player, 4500.0));
        }
        assert_eq!(a.position, b.position);
        assert_eq!(a.q_table(), b.q_table());
    }

    #[test]
    fn test_greedy_agent_follows_table() {
        let config = QLearningConfig {
            epsilon_start: 0.0,
            epsilon_min: 0.0,
            ..seeded(8)
        };
        let mut agent = QLearningAgent::new(config, TRACK, 0.0);
        let state = make_state(agent.config(), TRACK, agent.speed, agent.lane, 0.0, agent.position);

        let mut table = QTable::new();
        table.values_mut(state)[AiAction::Accelerate.index()] = 5.0;
        agent.q_table = table;

        agent.update(0.0, 4500.0);
        assert_eq!(agent.last_action, AiAction::Accelerate);
        assert_eq!(agent.speed, 440.0);
    }

    #[test]
    fn test_first_update_does_not_learn() {
        let mut agent = QLearningAgent::new(seeded(9), TRACK, 0.0);
        agent.update(1000.0, 4500.0);
        // Only the current state is touched by action selection, with no update
        assert!(agent
            .q_table()
            .to_entries()
            .iter()
            .all(|entry| entry.values == [0.0; ACTION_COUNT]));
        assert!(agent.total_reward != 0.0);
    }
}
