//! Per-wheel state tracking.
//!
//! A `Wheel` holds the last raw encoder sample and the derived angular
//! position/velocity, plus the pending velocity setpoint written by the
//! controller. Position is always recomputed from the latest encoder
//! sample, never written by command logic.

use std::f64::consts::TAU;

/// State holder for one wheel.
#[derive(Debug, Clone)]
pub struct Wheel {
    name: String,
    ticks_per_rev: u32,
    ticks: i64,
    position: f64,
    velocity: f64,
    command: f64,
}

impl Wheel {
    /// Create a wheel with its name and encoder resolution.
    ///
    /// `ticks_per_rev` must be validated > 0 by the caller before
    /// construction (see `HardwareParams`).
    pub fn new(name: impl Into<String>, ticks_per_rev: u32) -> Self {
        Self {
            name: name.into(),
            ticks_per_rev,
            ticks: 0,
            position: 0.0,
            velocity: 0.0,
            command: 0.0,
        }
    }

    /// Wheel name (joint identifier).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Latest raw encoder sample.
    pub fn ticks(&self) -> i64 {
        self.ticks
    }

    /// Angular position in radians (cumulative, one revolution = 2π).
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Angular velocity in rad/s.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Pending velocity setpoint in rad/s.
    pub fn command(&self) -> f64 {
        self.command
    }

    /// Set the velocity setpoint (written by the controller runtime).
    pub fn set_command(&mut self, command: f64) {
        self.command = command;
    }

    /// Convert a raw tick count to an angle in radians.
    pub fn angle_from_ticks(&self, ticks: i64) -> f64 {
        ticks as f64 / self.ticks_per_rev as f64 * TAU
    }

    /// Fold a new encoder sample into position and velocity.
    ///
    /// Velocity is the position delta over `dt` seconds. When `dt` is not
    /// strictly positive the previous velocity is retained - dividing by
    /// zero must never leak NaN/Inf into exported state. Position is
    /// refreshed either way.
    pub fn update_from_sample(&mut self, ticks: i64, dt: f64) {
        self.ticks = ticks;
        let prev = self.position;
        self.position = self.angle_from_ticks(ticks);
        if dt > 0.0 {
            self.velocity = (self.position - prev) / dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn full_revolution_is_two_pi() {
        let mut wheel = Wheel::new("left_wheel", 100);
        wheel.update_from_sample(0, 1.0);
        let p0 = wheel.position();
        wheel.update_from_sample(100, 1.0);
        assert_close(wheel.position() - p0, TAU);
    }

    #[test]
    fn velocity_is_position_delta_over_dt() {
        // 25/100 of a revolution in half a second: pos = π/2, vel = π
        let mut wheel = Wheel::new("left_wheel", 100);
        wheel.update_from_sample(0, 1.0);
        wheel.update_from_sample(25, 0.5);
        assert_close(wheel.position(), TAU / 4.0);
        assert_close(wheel.velocity(), TAU / 2.0);
    }

    #[test]
    fn reverse_motion_gives_negative_velocity() {
        let mut wheel = Wheel::new("right_wheel", 100);
        wheel.update_from_sample(0, 1.0);
        wheel.update_from_sample(-50, 1.0);
        assert_close(wheel.position(), -TAU / 2.0);
        assert_close(wheel.velocity(), -TAU / 2.0);
    }

    #[test]
    fn zero_dt_retains_previous_velocity() {
        let mut wheel = Wheel::new("left_wheel", 100);
        wheel.update_from_sample(25, 1.0);
        let vel = wheel.velocity();
        assert!(vel > 0.0);

        wheel.update_from_sample(50, 0.0);
        assert!(wheel.velocity().is_finite());
        assert_close(wheel.velocity(), vel);
        // Position is still refreshed from the sample
        assert_close(wheel.position(), TAU / 2.0);
    }

    #[test]
    fn negative_dt_retains_previous_velocity() {
        let mut wheel = Wheel::new("left_wheel", 100);
        wheel.update_from_sample(25, 1.0);
        let vel = wheel.velocity();
        wheel.update_from_sample(50, -0.1);
        assert_close(wheel.velocity(), vel);
    }

    #[test]
    fn command_round_trip() {
        let mut wheel = Wheel::new("left_wheel", 20);
        assert_eq!(wheel.command(), 0.0);
        wheel.set_command(1.5);
        assert_eq!(wheel.command(), 1.5);
        // Commands never touch position/velocity
        assert_eq!(wheel.position(), 0.0);
        assert_eq!(wheel.velocity(), 0.0);
    }
}
