use serde::{Deserialize, Serialize};

/// Physical constants and tuning values for the player vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleParams {
    pub gravity: f64,
    pub air_density: f64,
    /// Vehicle mass in kg
    pub mass: f64,
    /// Frontal area in m²
    pub frontal_area: f64,
    pub drag_coefficient: f64,
    pub rolling_resistance_coeff: f64,
    /// Base engine force in N
    pub engine_force: f64,
    /// Force removed from the engine while braking
    pub brake_deduction: f64,
    pub max_velocity: f64,
    pub min_velocity: f64,
    /// Display clamp for acceleration (integration uses the raw value)
    pub max_acceleration: f64,
    pub min_acceleration: f64,
    /// Fixed road slope in degrees
    pub road_slope_deg: f64,
    pub engine_efficiency: f64,
    /// Divisor applied to the fuel rate
    pub fuel_divisor: f64,
    pub gear_ratios: Vec<f64>,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            air_density: 1.225,
            mass: 1500.0,
            frontal_area: 2.2,
            drag_coefficient: 0.3,
            rolling_resistance_coeff: 0.015,
            engine_force: 4000.0,
            brake_deduction: 1500.0,
            max_velocity: 600.0,
            min_velocity: 0.0,
            max_acceleration: 60.0,
            min_acceleration: -60.0,
            road_slope_deg: 1.0,
            engine_efficiency: 0.5,
            fuel_divisor: 3.0,
            gear_ratios: vec![3.5, 2.1, 1.6, 1.3, 1.1],
        }
    }
}

/// Configuration for the track, camera and player controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of segments in the closed loop
    pub total_segments: usize,
    /// Length of one segment in world units
    pub segment_length: f64,
    /// Full road width in world units
    pub road_width: f64,
    pub camera_depth: f64,
    /// Camera height above the road surface
    pub camera_height: f64,
    pub min_camera_height: f64,
    /// Number of segments projected ahead of the camera
    pub render_distance: usize,

    /// Lateral movement of the player per tick while steering
    pub steer_step: f64,
    /// Extra engine force per boost source (throttle, Tab)
    pub throttle_boost: f64,
    /// Scales throttle advance, derived from the parameter store
    pub speed_multiplier: f64,

    /// Lap trigger zone length, in segments from the start line
    pub lap_trigger_segments: usize,
    /// Minimum lap time (seconds) before a crossing counts
    pub min_lap_time: f64,
    /// How long the lap banner stays up
    pub lap_flash_secs: f64,

    /// Fraction of the track the opponent starts ahead of the player
    pub ai_start_fraction: f64,

    /// Simulation ticks per second
    pub tick_rate_hz: u32,

    pub vehicle: VehicleParams,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            total_segments: 1600,
            segment_length: 400.0,
            road_width: 9000.0,
            camera_depth: 0.84,
            camera_height: 10_000.0,
            min_camera_height: 500.0,
            render_distance: 600,
            steer_step: 60.0,
            throttle_boost: 500.0,
            speed_multiplier: 1.0,
            lap_trigger_segments: 3,
            min_lap_time: 2.0,
            lap_flash_secs: 2.5,
            ai_start_fraction: 0.05,
            tick_rate_hz: 60,
            vehicle: VehicleParams::default(),
        }
    }
}

impl GameConfig {
    /// Total physical length of the loop
    pub fn track_length(&self) -> f64 {
        self.total_segments as f64 * self.segment_length
    }

    /// Half of the road width in world units
    pub fn road_half_width(&self) -> f64 {
        self.road_width / 2.0
    }

    /// Create a short track for tests and quick runs
    pub fn small() -> Self {
        Self {
            total_segments: 200,
            render_distance: 100,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.total_segments < 2 {
            return Err(format!(
                "total_segments must be at least 2, got {}",
                self.total_segments
            ));
        }
        if self.segment_length <= 0.0 {
            return Err(format!(
                "segment_length must be positive, got {}",
                self.segment_length
            ));
        }
        if self.road_width <= 0.0 {
            return Err(format!("road_width must be positive, got {}", self.road_width));
        }
        if self.camera_depth <= 0.0 {
            return Err(format!(
                "camera_depth must be positive, got {}",
                self.camera_depth
            ));
        }
        if self.render_distance == 0 || self.render_distance > self.total_segments {
            return Err(format!(
                "render_distance must be in 1..={}, got {}",
                self.total_segments, self.render_distance
            ));
        }
        if self.tick_rate_hz == 0 {
            return Err("tick_rate_hz must be at least 1".to_string());
        }
        if !(0.0..1.0).contains(&self.ai_start_fraction) {
            return Err(format!(
                "ai_start_fraction must be in [0, 1), got {}",
                self.ai_start_fraction
            ));
        }
        if self.vehicle.mass <= 0.0 {
            return Err(format!("vehicle.mass must be positive, got {}", self.vehicle.mass));
        }
        if self.vehicle.min_velocity > self.vehicle.max_velocity {
            return Err("vehicle.min_velocity cannot exceed vehicle.max_velocity".to_string());
        }
        if self.vehicle.engine_efficiency <= 0.0 || self.vehicle.fuel_divisor <= 0.0 {
            return Err("vehicle efficiency and fuel divisor must be positive".to_string());
        }
        Ok(())
    }
}
