//! Simulated GPIO daemon.
//!
//! In-memory `GpioDaemon` implementation for development and testing
//! without physical hardware. Encoder counts can be scripted directly or
//! advanced by the built-in motor model, every actuation output is
//! recorded, and individual operations can be made to fail to exercise
//! error paths.
//!
//! The daemon state lives behind an `Arc<Mutex<..>>` so a test (or the
//! demo binary) can keep a clone for scripting while the hardware
//! component owns the boxed session.

use super::{DaemonError, GpioDaemon, PinMode};
use crate::motor::{Direction, MotorDrive, PWM_DUTY_MAX};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Encoder tick rate at full duty, ticks per second.
const SIM_FULL_DUTY_TICK_RATE: f64 = 2000.0;

#[derive(Debug, Default)]
struct SimState {
    handle: i32,
    connected: bool,
    pin_modes: HashMap<u32, PinMode>,
    encoders: HashMap<u32, f64>,
    last_drive: HashMap<u32, MotorDrive>,
    drive_log: Vec<(u32, MotorDrive)>,
    fail_set_mode: bool,
    fail_drive: bool,
    fail_read_encoder: bool,
}

/// Simulated GPIO daemon session.
///
/// Cloning yields another reference to the same session state.
#[derive(Debug, Clone, Default)]
pub struct SimDaemon {
    state: Arc<Mutex<SimState>>,
}

impl SimDaemon {
    /// Open a simulated session (always succeeds, handle 0).
    pub fn connect() -> Self {
        let daemon = Self::default();
        {
            let mut state = daemon.lock();
            state.handle = 0;
            state.connected = true;
        }
        debug!("Simulated daemon session opened");
        daemon
    }

    /// A session whose connection failed (negative handle).
    pub fn disconnected() -> Self {
        let daemon = Self::default();
        daemon.lock().handle = -1;
        daemon
    }

    /// Make subsequent `set_mode` calls fail.
    pub fn fail_set_mode(&self, fail: bool) {
        self.lock().fail_set_mode = fail;
    }

    /// Make subsequent `drive_motor` calls fail.
    pub fn fail_drive(&self, fail: bool) {
        self.lock().fail_drive = fail;
    }

    /// Make subsequent `read_encoder` calls fail.
    pub fn fail_read_encoder(&self, fail: bool) {
        self.lock().fail_read_encoder = fail;
    }

    /// Script the encoder count for a wheel channel.
    pub fn set_encoder(&self, pin: u32, ticks: i64) {
        self.lock().encoders.insert(pin, ticks as f64);
    }

    /// Whether the session is still open.
    pub fn is_connected(&self) -> bool {
        self.lock().connected
    }

    /// Mode last set for a pin, if any.
    pub fn pin_mode(&self, pin: u32) -> Option<PinMode> {
        self.lock().pin_modes.get(&pin).copied()
    }

    /// All actuation outputs issued so far, in order.
    pub fn drive_log(&self) -> Vec<(u32, MotorDrive)> {
        self.lock().drive_log.clone()
    }

    /// Advance the motor model by `dt` seconds.
    ///
    /// Each pin's encoder count moves at a rate proportional to the last
    /// commanded duty, signed by its direction. Lets the demo loop close
    /// the command -> actuation -> encoder path without hardware.
    pub fn step(&self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        let mut state = self.lock();
        let drives: Vec<(u32, MotorDrive)> =
            state.last_drive.iter().map(|(p, d)| (*p, *d)).collect();
        for (pin, drive) in drives {
            let sign = match drive.direction {
                Direction::Forward => 1.0,
                Direction::Reverse => -1.0,
                Direction::Stop => 0.0,
            };
            let rate = sign * drive.duty as f64 / PWM_DUTY_MAX as f64 * SIM_FULL_DUTY_TICK_RATE;
            *state.encoders.entry(pin).or_insert(0.0) += rate * dt;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimState> {
        self.state.lock().expect("sim daemon lock poisoned")
    }
}

impl GpioDaemon for SimDaemon {
    fn handle(&self) -> i32 {
        self.lock().handle
    }

    fn set_mode(&mut self, pin: u32, mode: PinMode) -> Result<(), DaemonError> {
        let mut state = self.lock();
        if !state.connected {
            return Err(DaemonError::Closed);
        }
        if state.fail_set_mode {
            return Err(DaemonError::PinMode { pin, status: -1 });
        }
        state.pin_modes.insert(pin, mode);
        Ok(())
    }

    fn drive_motor(&mut self, pin: u32, drive: MotorDrive) -> Result<(), DaemonError> {
        let mut state = self.lock();
        if !state.connected {
            return Err(DaemonError::Closed);
        }
        if state.fail_drive {
            return Err(DaemonError::MotorOutput { pin, status: -1 });
        }
        state.last_drive.insert(pin, drive);
        state.drive_log.push((pin, drive));
        Ok(())
    }

    fn read_encoder(&mut self, pin: u32) -> Result<i64, DaemonError> {
        let state = self.lock();
        if !state.connected {
            return Err(DaemonError::Closed);
        }
        if state.fail_read_encoder {
            return Err(DaemonError::EncoderRead { pin });
        }
        Ok(state.encoders.get(&pin).copied().unwrap_or(0.0) as i64)
    }

    fn stop(&mut self) -> Result<(), DaemonError> {
        let mut state = self.lock();
        if state.connected {
            state.connected = false;
            debug!("Simulated daemon session closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_gives_valid_handle() {
        let daemon = SimDaemon::connect();
        assert!(daemon.handle() >= 0);
        assert!(daemon.is_connected());
    }

    #[test]
    fn disconnected_gives_negative_handle() {
        let daemon = SimDaemon::disconnected();
        assert!(daemon.handle() < 0);
        assert!(!daemon.is_connected());
    }

    #[test]
    fn stop_is_idempotent() {
        let mut daemon = SimDaemon::connect();
        assert!(daemon.stop().is_ok());
        assert!(daemon.stop().is_ok());
        assert!(!daemon.is_connected());
    }

    #[test]
    fn operations_fail_after_stop() {
        let mut daemon = SimDaemon::connect();
        daemon.stop().unwrap();
        assert!(matches!(
            daemon.set_mode(17, PinMode::Output),
            Err(DaemonError::Closed)
        ));
        assert!(matches!(daemon.read_encoder(17), Err(DaemonError::Closed)));
    }

    #[test]
    fn injected_encoder_read_failure() {
        let mut daemon = SimDaemon::connect();
        daemon.set_encoder(17, 10);
        daemon.fail_read_encoder(true);
        assert!(matches!(
            daemon.read_encoder(17),
            Err(DaemonError::EncoderRead { pin: 17 })
        ));

        // Clearing the fault exposes the count again.
        daemon.fail_read_encoder(false);
        assert_eq!(daemon.read_encoder(17).unwrap(), 10);
    }

    #[test]
    fn injected_pin_mode_failure() {
        let mut daemon = SimDaemon::connect();
        daemon.fail_set_mode(true);
        assert!(matches!(
            daemon.set_mode(17, PinMode::Output),
            Err(DaemonError::PinMode { pin: 17, .. })
        ));
    }

    #[test]
    fn drive_log_records_outputs_in_order() {
        let mut daemon = SimDaemon::connect();
        let drive = MotorDrive {
            direction: Direction::Forward,
            duty: 100,
        };
        daemon.drive_motor(17, drive).unwrap();
        daemon.drive_motor(27, MotorDrive::STOP).unwrap();

        let log = daemon.drive_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0], (17, drive));
        assert_eq!(log[1], (27, MotorDrive::STOP));
    }

    #[test]
    fn step_advances_encoder_with_duty() {
        let mut daemon = SimDaemon::connect();
        daemon
            .drive_motor(
                17,
                MotorDrive {
                    direction: Direction::Forward,
                    duty: PWM_DUTY_MAX,
                },
            )
            .unwrap();

        daemon.step(1.0);
        let ticks = daemon.read_encoder(17).unwrap();
        assert_eq!(ticks, SIM_FULL_DUTY_TICK_RATE as i64);

        // Reverse at full duty for half a second winds back half a step
        daemon
            .drive_motor(
                17,
                MotorDrive {
                    direction: Direction::Reverse,
                    duty: PWM_DUTY_MAX,
                },
            )
            .unwrap();
        daemon.step(0.5);
        let ticks = daemon.read_encoder(17).unwrap();
        assert_eq!(ticks, (SIM_FULL_DUTY_TICK_RATE * 0.5) as i64);
    }

    #[test]
    fn step_with_zero_dt_is_a_no_op() {
        let mut daemon = SimDaemon::connect();
        daemon.set_encoder(17, 42);
        daemon
            .drive_motor(
                17,
                MotorDrive {
                    direction: Direction::Forward,
                    duty: PWM_DUTY_MAX,
                },
            )
            .unwrap();
        daemon.step(0.0);
        assert_eq!(daemon.read_encoder(17).unwrap(), 42);
    }
}
