//! DiffBot hardware interface component.
//!
//! `DiffBotSystem` owns the two wheel states, the parsed hardware
//! parameters, and the GPIO daemon session, and walks the managed
//! component lifecycle:
//!
//! ```text
//! Unconfigured --on_init--> Inactive --on_activate--> Active
//!       ^                      |                        |
//!       '---(configure fail)---'     on_deactivate <----'
//!                  any state --on_shutdown--> Finalized
//! ```
//!
//! `read`/`write` are invoked once per control period by an external
//! scheduler; both are non-blocking and bounded-time. A failed actuation
//! write is a per-cycle recoverable error (logged, cycle continues), all
//! lifecycle failures surface synchronously as `HalError`.

use crate::config::{HardwareInfo, HardwareParams};
use crate::daemon::{DaemonError, GpioDaemon, PinMode};
use crate::error::HalError;
use crate::interface::{CommandHandle, StateHandle, StateKind, WheelSide};
use crate::joint::validate_joints;
use crate::motor::drive_from_command;
use crate::wheel::Wheel;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Managed component lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed, not yet initialized
    Unconfigured,
    /// Initialized and configured, commands not flowing
    Inactive,
    /// Read/write cycling, commands flowing
    Active,
    /// Shut down, daemon session released
    Finalized,
}

/// Hardware interface component for a differential-drive robot.
pub struct DiffBotSystem {
    daemon: Box<dyn GpioDaemon>,
    params: Option<HardwareParams>,
    wheels: Vec<Wheel>,
    state: LifecycleState,
}

impl DiffBotSystem {
    /// Create the component around an opened daemon client.
    ///
    /// The client is injected rather than looked up globally; whether its
    /// connection actually succeeded is checked in [`on_init`].
    ///
    /// [`on_init`]: DiffBotSystem::on_init
    pub fn new(daemon: Box<dyn GpioDaemon>) -> Self {
        Self {
            daemon,
            params: None,
            wheels: Vec::new(),
            state: LifecycleState::Unconfigured,
        }
    }

    /// Current lifecycle state.
    pub fn lifecycle_state(&self) -> LifecycleState {
        self.state
    }

    /// Initialize the component from the supplied hardware info.
    ///
    /// Verifies the daemon connection handle, parses the string
    /// parameters, sets up both wheel states, and validates every
    /// declared joint against the wheel interface contract. Any failure
    /// is fatal: the component stays `Unconfigured` and exports nothing.
    pub fn on_init(&mut self, info: &HardwareInfo) -> Result<(), HalError> {
        self.expect_state(LifecycleState::Unconfigured, "on_init")?;

        let handle = self.daemon.handle();
        info!("Daemon connection handle: {}", handle);
        if handle < 0 {
            error!("Failed to connect to GPIO daemon (handle {})", handle);
            return Err(HalError::Daemon(DaemonError::ConnectFailed(handle)));
        }

        let params = HardwareParams::from_info(info)?;

        let violations = validate_joints(&info.joints);
        if !violations.is_empty() {
            for violation in &violations {
                error!("{}", violation);
            }
            return Err(HalError::Contract(violations));
        }

        self.wheels = vec![
            Wheel::new(&params.left_wheel_name, params.enc_counts_per_rev),
            Wheel::new(&params.right_wheel_name, params.enc_counts_per_rev),
        ];
        info!(
            "Initialized wheels '{}' (pin {}) and '{}' (pin {}), {} ticks/rev",
            params.left_wheel_name,
            params.left_wheel_pin,
            params.right_wheel_name,
            params.right_wheel_pin,
            params.enc_counts_per_rev
        );

        self.params = Some(params);
        self.state = LifecycleState::Inactive;
        Ok(())
    }

    /// Export the four state interface handles, left wheel first, the
    /// position interface before the velocity interface.
    ///
    /// Pure and idempotent; returns an empty vector before a successful
    /// `on_init`.
    pub fn export_state_interfaces(&self) -> Vec<StateHandle> {
        let mut handles = Vec::with_capacity(self.wheels.len() * 2);
        for side in WheelSide::BOTH {
            if let Some(wheel) = self.wheels.get(side.index()) {
                handles.push(StateHandle::new(wheel.name(), side, StateKind::Position));
                handles.push(StateHandle::new(wheel.name(), side, StateKind::Velocity));
            }
        }
        handles
    }

    /// Export the two velocity command handles, left wheel first.
    pub fn export_command_interfaces(&self) -> Vec<CommandHandle> {
        WheelSide::BOTH
            .iter()
            .filter_map(|side| {
                self.wheels
                    .get(side.index())
                    .map(|wheel| CommandHandle::new(wheel.name(), *side))
            })
            .collect()
    }

    /// Read the state field a handle is bound to.
    pub fn state_value(&self, handle: &StateHandle) -> f64 {
        let wheel = &self.wheels[handle.side().index()];
        match handle.kind() {
            StateKind::Position => wheel.position(),
            StateKind::Velocity => wheel.velocity(),
        }
    }

    /// Write a velocity setpoint through a command handle.
    pub fn set_command(&mut self, handle: &CommandHandle, velocity: f64) {
        self.wheels[handle.side().index()].set_command(velocity);
    }

    /// Read back the pending setpoint behind a command handle.
    pub fn command_value(&self, handle: &CommandHandle) -> f64 {
        self.wheels[handle.side().index()].command()
    }

    /// Configure the motor pins for output.
    ///
    /// If either pin-mode call fails the daemon session is closed before
    /// returning, so a half-configured GPIO mode never outlives the
    /// failed transition. The component drops back to `Unconfigured`.
    pub fn on_configure(&mut self) -> Result<(), HalError> {
        self.expect_state(LifecycleState::Inactive, "on_configure")?;
        info!("Configuring motor pins...");

        let (left_pin, right_pin) = {
            let params = self.params.as_ref().expect("params set in on_init");
            (params.left_wheel_pin, params.right_wheel_pin)
        };

        for pin in [left_pin, right_pin] {
            if let Err(e) = self.daemon.set_mode(pin, PinMode::Output) {
                error!("Configuration of motor pin {} failed: {}", pin, e);
                if let Err(stop_err) = self.daemon.stop() {
                    warn!("Daemon stop after failed configure: {}", stop_err);
                }
                self.state = LifecycleState::Unconfigured;
                return Err(HalError::Daemon(e));
            }
        }

        info!("Successfully configured");
        Ok(())
    }

    /// Activate command flow.
    pub fn on_activate(&mut self) -> Result<(), HalError> {
        self.expect_state(LifecycleState::Inactive, "on_activate")?;
        info!("Activating...");
        self.state = LifecycleState::Active;
        info!("Successfully activated");
        Ok(())
    }

    /// Deactivate command flow.
    pub fn on_deactivate(&mut self) -> Result<(), HalError> {
        self.expect_state(LifecycleState::Active, "on_deactivate")?;
        info!("Deactivating...");
        self.state = LifecycleState::Inactive;
        info!("Successfully deactivated");
        Ok(())
    }

    /// Close the daemon session and finalize.
    ///
    /// Unconditional and idempotent: safe to call from any state, after a
    /// failed configure, or repeatedly - the session is released exactly
    /// once (the daemon's `stop` tolerates re-closing).
    pub fn on_shutdown(&mut self) -> Result<(), HalError> {
        info!("Terminating daemon session...");
        if let Err(e) = self.daemon.stop() {
            warn!("Daemon stop during shutdown: {}", e);
        }
        self.state = LifecycleState::Finalized;
        info!("Shutdown complete");
        Ok(())
    }

    /// Sample both encoders and refresh position/velocity state.
    ///
    /// `period` is the elapsed time since the previous read, supplied by
    /// the external scheduler. A failed encoder read leaves that wheel's
    /// state untouched for the cycle and is logged, not propagated; a
    /// stale sample is preferable to halting the control loop.
    pub fn read(&mut self, period: Duration) -> Result<(), HalError> {
        let dt = period.as_secs_f64();
        let (left_pin, right_pin) = self.motor_pins()?;

        for (idx, pin) in [left_pin, right_pin].into_iter().enumerate() {
            match self.daemon.read_encoder(pin) {
                Ok(ticks) => self.wheels[idx].update_from_sample(ticks, dt),
                Err(e) => warn!(
                    "Encoder read for '{}' (keeping sample {}): {}",
                    self.wheels[idx].name(),
                    self.wheels[idx].ticks(),
                    e
                ),
            }
        }
        Ok(())
    }

    /// Push the pending velocity commands out to the motor pins.
    ///
    /// Only meaningful while `Active`; otherwise a no-op. A failed write
    /// leaves that wheel's actuation unset for the cycle and is logged at
    /// warn level - a single actuation failure must never halt the loop.
    pub fn write(&mut self) -> Result<(), HalError> {
        if self.state != LifecycleState::Active {
            debug!("write() skipped in state {:?}", self.state);
            return Ok(());
        }

        let (left_pin, right_pin) = self.motor_pins()?;
        let max_velocity = self
            .params
            .as_ref()
            .expect("params set in on_init")
            .max_velocity_rad_s;

        for (idx, pin) in [left_pin, right_pin].into_iter().enumerate() {
            let drive = drive_from_command(self.wheels[idx].command(), max_velocity);
            if let Err(e) = self.daemon.drive_motor(pin, drive) {
                warn!("Motor output for '{}': {}", self.wheels[idx].name(), e);
            }
        }
        Ok(())
    }

    fn motor_pins(&self) -> Result<(u32, u32), HalError> {
        self.params
            .as_ref()
            .map(|p| (p.left_wheel_pin, p.right_wheel_pin))
            .ok_or_else(|| {
                HalError::InvalidTransition("component is not initialized".to_string())
            })
    }

    fn expect_state(&self, expected: LifecycleState, op: &str) -> Result<(), HalError> {
        if self.state != expected {
            return Err(HalError::InvalidTransition(format!(
                "{op} called in state {:?}, {expected:?} expected",
                self.state
            )));
        }
        Ok(())
    }
}
