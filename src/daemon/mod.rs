//! GPIO daemon client abstraction.
//!
//! The hardware component talks to the GPIO subsystem through a daemon
//! process. This module defines:
//! - `GpioDaemon` trait - the driver-level client interface
//! - `DaemonError` enum - error types for daemon operations
//! - `PinMode` - pin direction/mode
//!
//! A session is opened when the concrete client is constructed; the
//! resulting connection handle is non-negative while the session is live
//! and negative if the connection failed. `stop()` closes the session and
//! is idempotent - a second call is a no-op.

pub mod sim;

use crate::motor::MotorDrive;
use thiserror::Error;

pub use sim::SimDaemon;

/// Error types for GPIO daemon operations.
#[derive(Debug, Clone, Error)]
pub enum DaemonError {
    /// Connection to the daemon could not be established
    #[error("Daemon connection failed (handle {0})")]
    ConnectFailed(i32),

    /// Pin mode change rejected by the daemon
    #[error("Setting mode for pin {pin} failed (status {status})")]
    PinMode {
        /// GPIO pin number
        pin: u32,
        /// Daemon status code
        status: i32,
    },

    /// Actuation output rejected by the daemon
    #[error("Motor output on pin {pin} failed (status {status})")]
    MotorOutput {
        /// GPIO pin number
        pin: u32,
        /// Daemon status code
        status: i32,
    },

    /// Encoder sample could not be read
    #[error("Encoder read on pin {pin} failed")]
    EncoderRead {
        /// GPIO pin number
        pin: u32,
    },

    /// Operation attempted on a closed session
    #[error("Daemon session is closed")]
    Closed,
}

/// Pin direction/mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// Input pin (encoder channels)
    Input,
    /// Output pin (motor PWM/direction)
    Output,
}

/// Driver-level interface to the GPIO daemon.
///
/// One session is exclusively owned by the hardware component for its
/// whole Inactive/Active lifetime. All operations are non-blocking and
/// bounded-time; `read_encoder` in particular runs on the hard real-time
/// read cadence and must stay cheap.
pub trait GpioDaemon: Send {
    /// Connection handle. Negative means the connection failed.
    fn handle(&self) -> i32;

    /// Set the direction/mode of a pin.
    fn set_mode(&mut self, pin: u32, mode: PinMode) -> Result<(), DaemonError>;

    /// Issue an actuation output (direction + duty) on a motor pin.
    fn drive_motor(&mut self, pin: u32, drive: MotorDrive) -> Result<(), DaemonError>;

    /// Sample the accumulated encoder tick count for a wheel channel.
    ///
    /// The count is signed and cumulative - it does not wrap per
    /// revolution, reverse motion decrements it.
    fn read_encoder(&mut self, pin: u32) -> Result<i64, DaemonError>;

    /// Close the daemon session. Idempotent: closing an already-closed
    /// session succeeds without effect.
    fn stop(&mut self) -> Result<(), DaemonError>;
}
