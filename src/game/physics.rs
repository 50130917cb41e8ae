//! Longitudinal vehicle dynamics for the player car
//!
//! The model is deliberately loose: velocity only takes half of each
//! acceleration step, and rolling resistance is scaled by air resistance.
//! Both are tuning choices that shape how the car feels and are kept as-is.

use std::collections::HashMap;

use super::config::VehicleParams;

/// Parameter keys honoured by [`VehicleState::apply_vehicle_params`]
pub const PARAM_MASS: &str = "vehicle_mass";
pub const PARAM_DRAG: &str = "drag_coefficient";
pub const PARAM_DRAG_LABEL: &str = "Modify Drag Coefficient";
pub const PARAM_ENGINE_FORCE: &str = "engine_force";

/// Mutable physics state of the player vehicle.
///
/// A new race gets a new instance; nothing is reset in place.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleState {
    /// m/s
    pub velocity: f64,
    /// Distance integrated along the track, in metres
    pub position: f64,
    /// Last computed acceleration, used for integration
    pub acceleration: f64,
    /// Acceleration clamped for display
    pub acceleration_clamped: f64,

    pub air_resistance: f64,
    pub rolling_resistance: f64,
    pub drag_losses: f64,
    pub rr_losses: f64,
    pub fuel_consumption_rate: f64,
    pub engine_force_current: f64,

    pub total_distance: f64,
    /// Percent, accumulated from driver input
    pub tire_wear: f64,

    pub engine_temperature: f64,
    pub brake_temperature: f64,
    pub nitro_level: f64,
    pub engine_rpm: u32,
    pub current_gear: usize,
    /// gravity × mass, cached
    pub gf_force: f64,

    params: VehicleParams,
}

impl VehicleState {
    pub fn new(params: VehicleParams) -> Self {
        let gf_force = params.gravity * params.mass;
        Self {
            velocity: 0.0,
            position: 0.0,
            acceleration: 0.0,
            acceleration_clamped: 0.0,
            air_resistance: 0.0,
            rolling_resistance: 0.0,
            drag_losses: 0.0,
            rr_losses: 0.0,
            fuel_consumption_rate: 0.0,
            engine_force_current: 0.0,
            total_distance: 0.0,
            tire_wear: 0.0,
            engine_temperature: 90.0,
            brake_temperature: 30.0,
            nitro_level: 100.0,
            engine_rpm: 0,
            current_gear: 3,
            gf_force,
            params,
        }
    }

    pub fn params(&self) -> &VehicleParams {
        &self.params
    }

    /// Advance the vehicle by `dt` seconds.
    ///
    /// Without drive input the state is frozen: no forces are evaluated and
    /// velocity, position and every derived metric keep their values.
    pub fn update(&mut self, dt: f64, moving: bool, throttle_boost: f64, braking: bool) {
        if !moving {
            return;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let p = &self.params;

        let slope = p.road_slope_deg.to_radians();
        let (slope_sin, slope_cos) = slope.sin_cos();
        let slope_influence = p.gravity * slope_sin;

        let engine_force = if braking {
            p.engine_force - p.brake_deduction
        } else {
            p.engine_force + throttle_boost
        };

        let air_resistance =
            0.5 * p.air_density * p.frontal_area * p.drag_coefficient * self.velocity.powi(2);
        let rolling_resistance =
            p.rolling_resistance_coeff * p.mass * p.gravity * slope_cos * air_resistance / 10_000.0;

        let net_force =
            engine_force - air_resistance - rolling_resistance + slope_influence * p.mass;
        let acceleration = finite_or(net_force / p.mass, 0.0);

        self.air_resistance = finite_or(air_resistance, self.air_resistance);
        self.rolling_resistance = finite_or(rolling_resistance, self.rolling_resistance);
        self.acceleration = acceleration;
        self.acceleration_clamped = acceleration.clamp(p.min_acceleration, p.max_acceleration);
        self.engine_force_current = engine_force;

        // Half-step on velocity, full kinematic step on position
        let velocity = self.velocity + acceleration * dt / 2.0;
        let position = self.position + velocity * dt + 0.5 * acceleration * dt * dt;
        self.position = finite_or(position, self.position);
        self.velocity = finite_or(velocity, self.velocity).clamp(p.min_velocity, p.max_velocity);

        self.drag_losses =
            0.5 * p.air_density * self.velocity * p.frontal_area * p.drag_coefficient * dt;
        self.rr_losses = p.rolling_resistance_coeff * p.mass * p.gravity * (self.velocity * 0.001);

        self.fuel_consumption_rate = ((engine_force + self.velocity) / p.engine_efficiency
            + self.drag_losses
            + self.rr_losses)
            / p.fuel_divisor;

        self.total_distance += self.velocity * dt;
    }

    /// Overwrite tuning values from a flat parameter map.
    ///
    /// Recognised keys: `vehicle_mass`, `drag_coefficient` (or the
    /// customisation label `Modify Drag Coefficient`), `engine_force`.
    /// Non-finite values and non-positive masses are ignored.
    pub fn apply_vehicle_params(&mut self, params: &HashMap<String, f64>) {
        if let Some(&mass) = params.get(PARAM_MASS) {
            if mass.is_finite() && mass > 0.0 {
                self.params.mass = mass;
                self.gf_force = self.params.gravity * mass;
            }
        }

        let drag = params
            .get(PARAM_DRAG)
            .or_else(|| params.get(PARAM_DRAG_LABEL))
            .copied();
        if let Some(drag) = drag.filter(|d| d.is_finite()) {
            self.params.drag_coefficient = drag;
        }

        if let Some(&force) = params.get(PARAM_ENGINE_FORCE) {
            if force.is_finite() {
                self.params.engine_force = force;
            }
        }
    }
}

impl Default for VehicleState {
    fn default() -> Self {
        Self::new(VehicleParams::default())
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_updates_change_nothing() {
        let mut vehicle = VehicleState::default();
        vehicle.update(0.1, true, 500.0, false);
        let snapshot = vehicle.clone();

        for dt in [0.0, 0.016, 1.0, 100.0] {
            vehicle.update(dt, false, 500.0, false);
            vehicle.update(dt, false, 0.0, true);
        }

        assert_eq!(vehicle, snapshot);
    }

    #[test]
    fn test_first_tick_from_rest() {
        let mut vehicle = VehicleState::default();
        vehicle.update(0.1, true, 0.0, false);

        // At rest there is no drag, so only engine and slope act
        let slope_term = 9.81 * 1f64.to_radians().sin() * 1500.0;
        let accel = (4000.0 + slope_term) / 1500.0;

        assert!((vehicle.acceleration - accel).abs() < 1e-12);
        // Half-step velocity update
        assert!((vehicle.velocity - accel * 0.1 / 2.0).abs() < 1e-12);
        let expected_position = (accel * 0.05) * 0.1 + 0.5 * accel * 0.01;
        assert!((vehicle.position - expected_position).abs() < 1e-12);
        assert!((vehicle.total_distance - vehicle.velocity * 0.1).abs() < 1e-12);
        assert_eq!(vehicle.engine_force_current, 4000.0);
    }

    #[test]
    fn test_rolling_resistance_scales_with_air_resistance() {
        let mut vehicle = VehicleState::default();
        vehicle.velocity = 100.0;
        vehicle.update(0.01, true, 0.0, false);

        let air = 0.5 * 1.225 * 2.2 * 0.3 * 100.0f64.powi(2);
        let rolling = 0.015 * 1500.0 * 9.81 * 1f64.to_radians().cos() * air / 10_000.0;

        assert!((vehicle.air_resistance - air).abs() < 1e-9);
        assert!((vehicle.rolling_resistance - rolling).abs() < 1e-9);
    }

    #[test]
    fn test_braking_reduces_engine_force() {
        let mut vehicle = VehicleState::default();
        vehicle.update(0.1, true, 500.0, true);
        assert_eq!(vehicle.engine_force_current, 2500.0);
    }

    #[test]
    fn test_fuel_rate_formula() {
        let mut vehicle = VehicleState::default();
        vehicle.update(0.5, true, 0.0, false);

        let v = vehicle.velocity;
        let drag_losses = 0.5 * 1.225 * v * 2.2 * 0.3 * 0.5;
        let rr_losses = 0.015 * 1500.0 * 9.81 * v * 0.001;
        let expected = ((4000.0 + v) / 0.5 + drag_losses + rr_losses) / 3.0;

        assert!((vehicle.fuel_consumption_rate - expected).abs() < 1e-9);
    }

    #[test]
    fn test_velocity_never_exceeds_max() {
        let mut vehicle = VehicleState::default();
        let mut params = HashMap::new();
        params.insert(PARAM_ENGINE_FORCE.to_string(), 1e12);
        vehicle.apply_vehicle_params(&params);

        for _ in 0..1000 {
            vehicle.update(0.016, true, 1e9, false);
            assert!(vehicle.velocity <= 600.0);
        }
        assert_eq!(vehicle.velocity, 600.0);
    }

    #[test]
    fn test_velocity_never_below_min_when_braking() {
        let mut vehicle = VehicleState::default();
        let mut params = HashMap::new();
        params.insert(PARAM_ENGINE_FORCE.to_string(), 0.0);
        vehicle.apply_vehicle_params(&params);

        for _ in 0..100 {
            vehicle.update(0.1, true, 0.0, true);
            assert!(vehicle.velocity >= 0.0);
        }
    }

    #[test]
    fn test_display_acceleration_is_clamped() {
        let mut vehicle = VehicleState::default();
        let mut params = HashMap::new();
        params.insert(PARAM_ENGINE_FORCE.to_string(), 1e7);
        vehicle.apply_vehicle_params(&params);
        vehicle.update(0.01, true, 0.0, false);

        assert_eq!(vehicle.acceleration_clamped, 60.0);
        assert!(vehicle.acceleration > 60.0);
    }

    #[test]
    fn test_apply_params_recomputes_gravity_force() {
        let mut vehicle = VehicleState::default();
        assert!((vehicle.gf_force - 9.81 * 1500.0).abs() < 1e-9);

        let mut params = HashMap::new();
        params.insert(PARAM_MASS.to_string(), 1000.0);
        params.insert(PARAM_DRAG_LABEL.to_string(), 0.5);
        vehicle.apply_vehicle_params(&params);

        assert_eq!(vehicle.params().mass, 1000.0);
        assert!((vehicle.gf_force - 9810.0).abs() < 1e-9);
        assert_eq!(vehicle.params().drag_coefficient, 0.5);
    }

    #[test]
    fn test_apply_params_prefers_plain_drag_key() {
        let mut vehicle = VehicleState::default();
        let mut params = HashMap::new();
        params.insert(PARAM_DRAG.to_string(), 0.25);
        params.insert(PARAM_DRAG_LABEL.to_string(), 0.9);
        vehicle.apply_vehicle_params(&params);
        assert_eq!(vehicle.params().drag_coefficient, 0.25);
    }

    #[test]
    fn test_apply_params_ignores_invalid_values() {
        let mut vehicle = VehicleState::default();
        let mut params = HashMap::new();
        params.insert(PARAM_MASS.to_string(), -5.0);
        params.insert(PARAM_ENGINE_FORCE.to_string(), f64::NAN);
        vehicle.apply_vehicle_params(&params);

        assert_eq!(vehicle.params().mass, 1500.0);
        assert_eq!(vehicle.params().engine_force, 4000.0);
    }

    #[test]
    fn test_non_finite_dt_does_not_poison_state() {
        let mut vehicle = VehicleState::default();
        vehicle.update(f64::INFINITY, true, 0.0, false);
        assert!(vehicle.velocity.is_finite());
        assert!(vehicle.position.is_finite());
        assert!(vehicle.total_distance.is_finite());
    }
}
