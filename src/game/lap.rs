/// Counts laps by watching the player enter the zone just past the start line.
///
/// The zone flag is edge-triggered: a lap is only counted on the tick the
/// player moves from outside the zone to inside it, and only once the
/// current lap has run longer than the minimum lap time.
#[derive(Debug, Clone, PartialEq)]
pub struct LapTracker {
    pub lap_count: u32,
    /// Seconds elapsed in the current lap
    pub lap_time: f64,
    pub best_lap: Option<f64>,
    near_start: bool,
    trigger_distance: f64,
    min_lap_time: f64,
}

impl LapTracker {
    /// `trigger_distance` is the length of the zone `[0, trigger_distance)`
    pub fn new(trigger_distance: f64, min_lap_time: f64) -> Self {
        Self {
            lap_count: 0,
            lap_time: 0.0,
            best_lap: None,
            near_start: false,
            trigger_distance,
            min_lap_time,
        }
    }

    /// Advance the lap clock and check the start line.
    /// Returns `true` on the tick a lap completes.
    pub fn update(&mut self, dt: f64, track_position: f64) -> bool {
        if dt.is_finite() && dt > 0.0 {
            self.lap_time += dt;
        }

        let near = track_position < self.trigger_distance;
        let entered = near && !self.near_start;
        self.near_start = near;

        if entered && self.lap_time > self.min_lap_time {
            self.lap_count += 1;
            if self.best_lap.map_or(true, |best| self.lap_time < best) {
                self.best_lap = Some(self.lap_time);
            }
            self.lap_time = 0.0;
            return true;
        }

        false
    }

    pub fn is_near_start(&self) -> bool {
        self.near_start
    }
}
