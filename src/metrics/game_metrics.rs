use std::time::{Duration, Instant};

/// Session-level race bookkeeping shown in the header
pub struct GameMetrics {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    pub high_score: f64,
    pub races_played: u32,
    pub laps_completed: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            high_score: 0.0,
            races_played: 0,
            laps_completed: 0,
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.start_time.elapsed();
    }

    pub fn on_race_start(&mut self) {
        self.start_time = Instant::now();
        self.elapsed_time = Duration::ZERO;
    }

    pub fn on_lap(&mut self) {
        self.laps_completed += 1;
    }

    /// Close out a race and keep its score if it is the best so far
    pub fn on_race_end(&mut self, final_score: f64) {
        self.races_played += 1;
        self.record_score(final_score);
    }

    /// Non-finite scores never become the best
    pub fn record_score(&mut self, score: f64) {
        if score.is_finite() && score > self.high_score {
            self.high_score = score;
        }
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
