//! Training statistics for the Q-learning opponent
//!
//! Tracks per-tick rewards and forward distance in rolling windows, plus the
//! agent's exploration rate and how many discrete states it has visited.

use std::collections::VecDeque;

/// Training statistics tracker with rolling averages
///
/// # Example
///
/// ```rust
/// use pseudo_racer::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(100);
///
/// stats.record_tick(0.4, 260.0);
/// stats.record_agent(0.95, 12);
///
/// println!("Mean reward: {}", stats.mean_reward());
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Per-tick rewards (rolling window)
    rewards: VecDeque<f64>,

    /// Per-tick forward distance (rolling window)
    distances: VecDeque<f64>,

    /// Total number of ticks recorded
    total_ticks: u64,

    /// Sum of every reward ever recorded
    total_reward: f64,

    /// Opponent laps completed
    laps: u32,

    /// Latest exploration rate
    epsilon: f64,

    /// Latest number of visited states
    states: usize,

    window_size: usize,
}

impl TrainingStats {
    /// Create a new tracker keeping the last `window_size` ticks
    ///
    /// # Example
    ///
    /// ```rust
    /// use pseudo_racer::metrics::TrainingStats;
    ///
    /// let stats = TrainingStats::new(500);
    /// assert_eq!(stats.total_ticks(), 0);
    /// ```
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            rewards: VecDeque::with_capacity(window_size),
            distances: VecDeque::with_capacity(window_size),
            total_ticks: 0,
            total_reward: 0.0,
            laps: 0,
            epsilon: 1.0,
            states: 0,
            window_size,
        }
    }

    /// Record one opponent tick
    ///
    /// # Arguments
    ///
    /// * `reward` - Reward returned by the agent's update
    /// * `distance` - Distance the opponent moved this tick
    pub fn record_tick(&mut self, reward: f64, distance: f64) {
        Self::push_deque(&mut self.rewards, reward, self.window_size);
        Self::push_deque(&mut self.distances, distance, self.window_size);
        self.total_ticks += 1;
        self.total_reward += reward;
    }

    /// Record the agent's current exploration rate and table size
    pub fn record_agent(&mut self, epsilon: f64, states: usize) {
        self.epsilon = epsilon;
        self.states = states;
    }

    pub fn record_lap(&mut self) {
        self.laps += 1;
    }

    /// Mean reward over the rolling window, 0.0 when empty
    pub fn mean_reward(&self) -> f64 {
        Self::mean(&self.rewards)
    }

    /// Mean forward distance per tick over the rolling window
    pub fn mean_distance(&self) -> f64 {
        Self::mean(&self.distances)
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }

    pub fn laps(&self) -> u32 {
        self.laps
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn states(&self) -> usize {
        self.states
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Format a one-line summary for progress output
    ///
    /// # Example
    ///
    /// ```rust
    /// use pseudo_racer::metrics::TrainingStats;
    ///
    /// let mut stats = TrainingStats::new(100);
    /// stats.record_tick(0.5, 240.0);
    /// stats.record_agent(0.9995, 1);
    ///
    /// assert!(stats.format_summary().starts_with("Ticks: 1"));
    /// ```
    pub fn format_summary(&self) -> String {
        format!(
            "Ticks: {} | Laps: {} | Reward: {:.3} | Total: {:.1} | Fwd: {:.1} | Eps: {:.4} | States: {}",
            self.total_ticks,
            self.laps,
            self.mean_reward(),
            self.total_reward,
            self.mean_distance(),
            self.epsilon,
            self.states,
        )
    }

    fn mean(deque: &VecDeque<f64>) -> f64 {
        if deque.is_empty() {
            0.0
        } else {
            deque.iter().sum::<f64>() / deque.len() as f64
        }
    }

    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let stats = TrainingStats::new(100);
        assert_eq!(stats.window_size(), 100);
        assert_eq!(stats.total_ticks(), 0);
        assert_eq!(stats.epsilon(), 1.0);
        assert_eq!(stats.mean_reward(), 0.0);
        assert_eq!(stats.mean_distance(), 0.0);
    }

    #[test]
    fn test_zero_window_keeps_one_value() {
        let mut stats = TrainingStats::new(0);
        stats.record_tick(1.0, 1.0);
        stats.record_tick(3.0, 1.0);
        assert_eq!(stats.mean_reward(), 3.0);
    }

    #[test]
    fn test_rolling_average() {
        let mut stats = TrainingStats::new(3);

        stats.record_tick(1.0, 240.0);
        stats.record_tick(2.0, 240.0);
        stats.record_tick(3.0, 240.0);
        assert!((stats.mean_reward() - 2.0).abs() < 1e-9);

        // The first tick falls out of the window
        stats.record_tick(4.0, 300.0);
        assert_eq!(stats.total_ticks(), 4);
        assert!((stats.mean_reward() - 3.0).abs() < 1e-9);
        assert!((stats.mean_distance() - 260.0).abs() < 1e-9);
        assert!((stats.total_reward() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_format_summary() {
        let mut stats = TrainingStats::new(100);
        stats.record_tick(0.25, 250.0);
        stats.record_agent(0.5, 17);
        stats.record_lap();

        let summary = stats.format_summary();
        assert!(summary.contains("Ticks: 1"));
        assert!(summary.contains("Laps: 1"));
        assert!(summary.contains("Reward: 0.250"));
        assert!(summary.contains("Fwd: 250.0"));
        assert!(summary.contains("Eps: 0.5000"));
        assert!(summary.contains("States: 17"));
    }
}
