//! Q-learning hyperparameters and opponent kinematics

use serde::{Deserialize, Serialize};

/// Configuration for the live-learning opponent
///
/// Holds the learning hyperparameters together with the step sizes of the
/// simple kinematic model the agent drives. Defaults are tuned for a
/// segment length of 400 and a road width of 9000.
///
/// # Example
///
/// ```rust
/// use pseudo_racer::rl::QLearningConfig;
///
/// let config = QLearningConfig {
///     alpha: 0.3,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    /// Learning rate
    ///
    /// Default: 0.15
    pub alpha: f64,

    /// Discount factor for the best next-state value
    ///
    /// Default: 0.92
    pub gamma: f64,

    /// Exploration rate at the start of a race
    ///
    /// Default: 1.0
    pub epsilon_start: f64,

    /// Exploration never drops below this
    ///
    /// Default: 0.05
    pub epsilon_min: f64,

    /// Multiplicative decay applied to epsilon every tick
    ///
    /// Default: 0.9995
    pub epsilon_decay: f64,

    /// Bins per state dimension
    ///
    /// Default: 5
    pub buckets: usize,

    /// Upper bound of the speed range, matches the player's velocity cap
    pub max_speed: f64,

    /// Road half-width used for lane bucketing and the centring reward.
    /// Races and training runs replace it with the track's own value.
    pub road_half_width: f64,

    /// Lateral movement per steering action
    pub steer_step: f64,

    /// Speed gained per accelerate action; braking removes 0.8× this
    pub accel_step: f64,

    /// Fraction of `accel_step` removed by a brake action
    pub brake_factor: f64,

    /// Forward motion applied every tick regardless of speed
    pub base_forward: f64,

    /// Fraction of current speed added to forward motion
    pub speed_forward_factor: f64,

    /// Fixed RNG seed; `None` seeds from system entropy
    pub seed: Option<u64>,
}

impl QLearningConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the kinematic step sizes from a segment length
    pub fn for_segment_length(segment_length: f64) -> Self {
        Self {
            accel_step: segment_length * 0.5,
            base_forward: segment_length * 0.6,
            ..Self::default()
        }
    }

    /// Check that all parameters are in valid ranges
    /// Match the lane range to the road the agent drives on
    pub fn for_road(mut self, road_half_width: f64) -> Self {
        if road_half_width.is_finite() && road_half_width > 0.0 {
            self.road_half_width = road_half_width;
        }
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(format!("alpha must be in (0, 1], got {}", self.alpha));
        }

        if !(0.0..1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1), got {}", self.gamma));
        }

        if !(0.0..=1.0).contains(&self.epsilon_start) {
            return Err(format!(
                "epsilon_start must be in [0, 1], got {}",
                self.epsilon_start
            ));
        }

        if !(0.0..=1.0).contains(&self.epsilon_min) {
            return Err(format!(
                "epsilon_min must be in [0, 1], got {}",
                self.epsilon_min
            ));
        }

        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(format!(
                "epsilon_decay must be in (0, 1], got {}",
                self.epsilon_decay
            ));
        }

        if self.buckets == 0 || self.buckets > u8::MAX as usize {
            return Err(format!("buckets must be in 1..=255, got {}", self.buckets));
        }

        if self.max_speed <= 0.0 {
            return Err(format!("max_speed must be positive, got {}", self.max_speed));
        }

        if self.road_half_width <= 0.0 {
            return Err(format!(
                "road_half_width must be positive, got {}",
                self.road_half_width
            ));
        }

        if self.base_forward < 0.0 || self.accel_step < 0.0 || self.steer_step < 0.0 {
            return Err("step sizes must be non-negative".to_string());
        }

        Ok(())
    }
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            alpha: 0.15,
            gamma: 0.92,
            epsilon_start: 1.0,
            epsilon_min: 0.05,
            epsilon_decay: 0.9995,
            buckets: 5,
            max_speed: 600.0,
            road_half_width: 4500.0,
            steer_step: 40.0,
            accel_step: 200.0,
            brake_factor: 0.8,
            base_forward: 240.0,
            speed_forward_factor: 0.1,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QLearningConfig::default();
        assert_eq!(config.alpha, 0.15);
        assert_eq!(config.gamma, 0.92);
        assert_eq!(config.epsilon_start, 1.0);
        assert_eq!(config.epsilon_min, 0.05);
        assert_eq!(config.epsilon_decay, 0.9995);
        assert_eq!(config.buckets, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_segment_length_steps() {
        let config = QLearningConfig::for_segment_length(400.0);
        assert_eq!(config.accel_step, 200.0);
        assert_eq!(config.base_forward, 240.0);
        assert_eq!(config, QLearningConfig::default());
    }

    #[test]
    fn test_for_road() {
        assert_eq!(QLearningConfig::default().for_road(3000.0).road_half_width, 3000.0);
        assert_eq!(QLearningConfig::default().for_road(0.0).road_half_width, 4500.0);
        assert_eq!(QLearningConfig::default().for_road(f64::NAN).road_half_width, 4500.0);
    }

    #[test]
    fn test_validation_alpha() {
        let mut config = QLearningConfig::default();
        config.alpha = 0.0;
        assert!(config.validate().is_err());
        config.alpha = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_gamma() {
        let mut config = QLearningConfig::default();
        config.gamma = 1.0;
        assert!(config.validate().is_err());
        config.gamma = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_epsilon() {
        let mut config = QLearningConfig::default();
        config.epsilon_decay = 0.0;
        assert!(config.validate().is_err());

        config.epsilon_decay = 0.9995;
        config.epsilon_min = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_buckets() {
        let mut config = QLearningConfig::default();
        config.buckets = 0;
        assert!(config.validate().is_err());
        config.buckets = 300;
        assert!(config.validate().is_err());
    }
}
