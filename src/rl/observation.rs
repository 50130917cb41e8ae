//! State discretisation and reward shaping for the opponent
//!
//! The continuous world (speed, lateral offset, distance to the player) is
//! reduced to three small integer buckets so a tabular learner can cover
//! the whole space.

use serde::{Deserialize, Serialize};

use super::config::QLearningConfig;

/// Discretised world state seen by the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiscreteState {
    pub speed: u8,
    pub lane: u8,
    pub gap: u8,
}

/// Map `value` in `[min, max]` into one of `n` equal-width bins.
///
/// Values outside the range land in the first or last bin. NaN lands in
/// the first bin.
pub fn bucket(value: f64, min: f64, max: f64, n: usize) -> u8 {
    if n == 0 {
        return 0;
    }
    let span = max - min;
    if span <= 0.0 || !span.is_finite() {
        return 0;
    }
    let ratio = (value - min) / span;
    // Saturating float-to-int cast: NaN -> 0, +inf -> i64::MAX
    let index = (ratio * n as f64).floor() as i64;
    index.clamp(0, n as i64 - 1) as u8
}

/// Signed distance from the AI to the player along the loop.
///
/// Positive means the player is ahead of the AI, negative means the AI is
/// ahead. The result lies in `(-track_length / 2, track_length / 2]`.
pub fn signed_gap(player_pos: f64, ai_pos: f64, track_length: f64) -> f64 {
    if track_length <= 0.0 {
        return 0.0;
    }
    let raw = (player_pos - ai_pos).rem_euclid(track_length);
    if !raw.is_finite() {
        return 0.0;
    }
    if raw > track_length / 2.0 {
        raw - track_length
    } else {
        raw
    }
}

/// Bucket the agent's kinematic state relative to the player
pub fn make_state(
    config: &QLearningConfig,
    track_length: f64,
    speed: f64,
    lane: f64,
    player_pos: f64,
    ai_pos: f64,
) -> DiscreteState {
    let n = config.buckets;
    let half = track_length / 2.0;
    let gap = signed_gap(player_pos, ai_pos, track_length);

    DiscreteState {
        speed: bucket(speed, 0.0, config.max_speed, n),
        lane: bucket(lane, -config.road_half_width, config.road_half_width, n),
        gap: bucket(gap, -half, half, n),
    }
}

/// Reward for the agent's current situation.
///
/// Speed is rewarded, leaving the road is punished hard, staying near the
/// centre earns a small bonus, and the gap term rewards sitting just
/// behind the player while punishing falling far behind.
pub fn compute_reward(
    config: &QLearningConfig,
    track_length: f64,
    speed: f64,
    lane: f64,
    player_pos: f64,
    ai_pos: f64,
    on_road: bool,
) -> f64 {
    let mut reward = speed / config.max_speed * 2.0;

    if !on_road {
        reward -= 3.0;
    }

    if lane.abs() < config.road_half_width * 0.6 {
        reward += 0.3;
    } else {
        reward -= 0.5;
    }

    let gap = signed_gap(player_pos, ai_pos, track_length);
    if gap > 0.0 && gap < track_length * 0.1 {
        reward += 1.0;
    } else if gap > track_length * 0.3 {
        reward -= 1.0;
    }

    if reward.is_finite() {
        reward
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACK: f64 = 640_000.0;

    #[test]
    fn test_bucket_bounds() {
        assert_eq!(bucket(0.0, 0.0, 600.0, 5), 0);
        assert_eq!(bucket(119.9, 0.0, 600.0, 5), 0);
        assert_eq!(bucket(120.0, 0.0, 600.0, 5), 1);
        assert_eq!(bucket(599.0, 0.0, 600.0, 5), 4);
        // Upper edge clamps into the last bin
        assert_eq!(bucket(600.0, 0.0, 600.0, 5), 4);
        assert_eq!(bucket(1e9, 0.0, 600.0, 5), 4);
        assert_eq!(bucket(-50.0, 0.0, 600.0, 5), 0);
    }

    #[test]
    fn test_bucket_non_finite() {
        assert_eq!(bucket(f64::NAN, 0.0, 600.0, 5), 0);
        assert_eq!(bucket(f64::INFINITY, 0.0, 600.0, 5), 4);
        assert_eq!(bucket(f64::NEG_INFINITY, 0.0, 600.0, 5), 0);
        assert_eq!(bucket(10.0, 5.0, 5.0, 5), 0);
    }

    #[test]
    fn test_gap_player_just_past_start() {
        // Player at 100, AI 50 short of the line: player is 150 ahead
        let gap = signed_gap(100.0, TRACK - 50.0, TRACK);
        assert!((gap - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_gap_wrap_correction() {
        // AI ahead of the player by 1000
        let gap = signed_gap(1000.0, 2000.0, TRACK);
        assert!((gap + 1000.0).abs() < 1e-9);

        // Exactly half the track stays positive
        assert_eq!(signed_gap(TRACK / 2.0, 0.0, TRACK), TRACK / 2.0);
    }

    #[test]
    fn test_make_state() {
        let config = QLearningConfig::default();
        let state = make_state(&config, TRACK, 240.0, 0.0, 100.0, TRACK - 50.0);
        assert_eq!(state.speed, 2);
        assert_eq!(state.lane, 2);
        // Gap of 150 sits in the middle bin
        assert_eq!(state.gap, 2);

        let state = make_state(&config, TRACK, 600.0, -4500.0, 0.0, 0.0);
        assert_eq!(state.speed, 4);
        assert_eq!(state.lane, 0);
    }

    #[test]
    fn test_reward_terms() {
        let config = QLearningConfig::default();

        // Full speed, centred, just behind the player
        let best = compute_reward(&config, TRACK, 600.0, 0.0, 1000.0, 0.0, true);
        assert!((best - (2.0 + 0.3 + 1.0)).abs() < 1e-9);

        // Stopped, off-road, far to the side, far behind
        let worst = compute_reward(&config, TRACK, 0.0, 4000.0, TRACK * 0.4, 0.0, false);
        assert!((worst - (-3.0 - 0.5 - 1.0)).abs() < 1e-9);

        // AI ahead: no gap term
        let ahead = compute_reward(&config, TRACK, 0.0, 0.0, 0.0, 1000.0, true);
        assert!((ahead - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_reward_centre_threshold() {
        let config = QLearningConfig::default();
        let inside = compute_reward(&config, TRACK, 0.0, 2699.0, 0.0, 0.0, true);
        let outside = compute_reward(&config, TRACK, 0.0, 2700.0, 0.0, 0.0, true);
        assert!((inside - 0.3).abs() < 1e-9);
        assert!((outside + 0.5).abs() < 1e-9);
    }
}
