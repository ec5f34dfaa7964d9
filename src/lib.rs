//! # DiffBot HAL Library
//!
//! Hardware abstraction layer for a two-wheeled differential-drive robot.
//!
//! This crate converts per-wheel velocity commands into motor actuation
//! signals and raw quadrature-encoder counts into position/velocity state,
//! on a fixed read/write cadence driven by an external control loop. The
//! GPIO electrical work happens in a separate daemon process reached
//! through the `GpioDaemon` client trait.
//!
//! # Module Structure
//!
//! - [`system`] - DiffBotSystem component, lifecycle state machine, read/write
//! - [`wheel`] - per-wheel encoder/velocity/command state
//! - [`interface`] - exported state/command interface handles
//! - [`joint`] - joint descriptors and interface-contract validation
//! - [`config`] - hardware parameters and TOML configuration
//! - [`daemon`] - GPIO daemon client trait and simulation backend
//! - [`motor`] - velocity command to direction/duty translation
//! - [`error`] - error types
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                  controller runtime (external)             │
//! │        state/command handles        read()/write() @ rate  │
//! └───────────────┬────────────────────────────┬───────────────┘
//!                 ▼                            ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │  DiffBotSystem                                             │
//! │  ┌───────────┐  ┌───────────┐   lifecycle:                 │
//! │  │ Wheel (L) │  │ Wheel (R) │   init→configure→activate    │
//! │  └───────────┘  └───────────┘   →deactivate→shutdown       │
//! └───────────────────────┬────────────────────────────────────┘
//!                         ▼
//!               ┌──────────────────┐
//!               │  GpioDaemon      │ (trait object)
//!               │  trait           │
//!               └──────────────────┘
//! ```

#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;
pub mod daemon;
pub mod error;
pub mod interface;
pub mod joint;
pub mod motor;
pub mod system;
pub mod wheel;

// Re-export key types for convenience
pub use crate::config::{BotConfig, HardwareInfo, HardwareParams};
pub use crate::daemon::{DaemonError, GpioDaemon, PinMode, SimDaemon};
pub use crate::error::HalError;
pub use crate::interface::{CommandHandle, StateHandle, StateKind, WheelSide};
pub use crate::joint::JointDescriptor;
pub use crate::system::{DiffBotSystem, LifecycleState};
pub use crate::wheel::Wheel;
