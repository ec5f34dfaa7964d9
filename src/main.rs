//! # DiffBot HAL Binary
//!
//! Demo runner for the differential-drive hardware layer: loads a TOML
//! configuration, wires the component to the simulated GPIO daemon, and
//! drives the read/write pair at the configured cycle rate until Ctrl-C
//! (or a fixed cycle budget).
//!
//! # Usage
//!
//! ```bash
//! # Run against config/diffbot.toml at the configured rate
//! diffbot_hal --config config/diffbot.toml
//!
//! # Command both wheels and stop after 500 cycles
//! diffbot_hal -c config/diffbot.toml --left-velocity 2.0 --right-velocity 2.0 --cycles 500
//!
//! # Verbose JSON logs
//! diffbot_hal -c config/diffbot.toml -v --json
//! ```

#![deny(warnings)]

use clap::Parser;
use diffbot_hal::{BotConfig, DiffBotSystem, SimDaemon};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// DiffBot HAL - differential-drive hardware layer demo runner
#[derive(Parser, Debug)]
#[command(name = "diffbot_hal")]
#[command(version)]
#[command(about = "Differential-drive robot hardware abstraction layer")]
#[command(long_about = None)]
struct Args {
    /// Path to the robot configuration file (diffbot.toml)
    #[arg(short, long, default_value = "/etc/diffbot/diffbot.toml")]
    config: PathBuf,

    /// Left wheel velocity setpoint in rad/s
    #[arg(long, default_value_t = 0.0)]
    left_velocity: f64,

    /// Right wheel velocity setpoint in rad/s
    #[arg(long, default_value_t = 0.0)]
    right_velocity: f64,

    /// Stop after this many control cycles (default: run until Ctrl-C)
    #[arg(long)]
    cycles: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

/// Timing statistics for control loop monitoring.
#[derive(Debug, Default)]
struct TimingStats {
    cycle_count: u64,
    timing_violations: u64,
    max_cycle_time_us: u64,
    total_cycle_time_us: u64,
}

impl TimingStats {
    /// Fold one cycle measurement in. All counters only ever grow.
    ///
    /// Returns true when the cycle exceeded its budget.
    fn record_cycle(&mut self, cycle_time_us: u64, budget_us: u64) -> bool {
        self.cycle_count += 1;
        self.total_cycle_time_us += cycle_time_us;
        if cycle_time_us > self.max_cycle_time_us {
            self.max_cycle_time_us = cycle_time_us;
        }
        if cycle_time_us > budget_us {
            self.timing_violations += 1;
            return true;
        }
        false
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("DiffBot HAL failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_tracing(&args);

    info!("DiffBot HAL v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = BotConfig::load(&args.config)?;
    let cycle_time = Duration::from_micros(config.cycle_time_us as u64);
    info!("Control cycle time: {}us", config.cycle_time_us);

    let daemon = SimDaemon::connect();
    let mut system = DiffBotSystem::new(Box::new(daemon.clone()));

    // Lifecycle: init -> configure -> activate
    system.on_init(&config.hardware_info())?;
    let state_handles = system.export_state_interfaces();
    let command_handles = system.export_command_interfaces();
    info!(
        "Exported {} state and {} command interfaces",
        state_handles.len(),
        command_handles.len()
    );
    for handle in &state_handles {
        debug!("  state: {}", handle.name());
    }

    system.on_configure()?;
    system.on_activate()?;

    // Apply the CLI setpoints through the command interfaces, the same
    // path an upstream controller would use.
    system.set_command(&command_handles[0], args.left_velocity);
    system.set_command(&command_handles[1], args.right_velocity);
    info!(
        "Wheel setpoints: left={} rad/s, right={} rad/s",
        args.left_velocity, args.right_velocity
    );

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        flag.store(false, Ordering::SeqCst);
    })?;

    if detect_rt_mode() {
        info!("Running in real-time scheduler mode");
    } else {
        info!("Running in standard (non-RT) mode");
    }

    let mut stats = TimingStats::default();
    let mut last_cycle = Instant::now();

    while running.load(Ordering::SeqCst) {
        let cycle_start = Instant::now();
        let dt = cycle_start.duration_since(last_cycle);
        last_cycle = cycle_start;

        // Advance the simulated motors, then run the hardware cycle.
        daemon.step(dt.as_secs_f64());
        if let Err(e) = system.read(dt) {
            error!("Read cycle failed: {}", e);
            break;
        }
        if let Err(e) = system.write() {
            error!("Write cycle failed: {}", e);
            break;
        }

        let cycle_time_us = cycle_start.elapsed().as_micros() as u64;
        let violated = stats.record_cycle(cycle_time_us, config.cycle_time_us as u64);
        if violated && (stats.timing_violations <= 10 || stats.timing_violations % 1000 == 0) {
            warn!(
                "Timing violation #{}: cycle took {}us (target {}us)",
                stats.timing_violations, cycle_time_us, config.cycle_time_us
            );
        }

        if stats.cycle_count % 100 == 0 {
            let left_pos = system.state_value(&state_handles[0]);
            let left_vel = system.state_value(&state_handles[1]);
            let right_pos = system.state_value(&state_handles[2]);
            let right_vel = system.state_value(&state_handles[3]);
            debug!(
                "cycle {}: left pos={:.3} vel={:.3}, right pos={:.3} vel={:.3}",
                stats.cycle_count, left_pos, left_vel, right_pos, right_vel
            );
        }

        if let Some(budget) = args.cycles {
            if stats.cycle_count >= budget {
                info!("Cycle budget of {} reached", budget);
                break;
            }
        }

        let elapsed = cycle_start.elapsed();
        if elapsed < cycle_time {
            std::thread::sleep(cycle_time - elapsed);
        }
    }

    let avg_cycle_time_us = if stats.cycle_count > 0 {
        stats.total_cycle_time_us / stats.cycle_count
    } else {
        0
    };
    info!(
        "Control loop stopped after {} cycles (avg {}us, max {}us, violations: {})",
        stats.cycle_count, avg_cycle_time_us, stats.max_cycle_time_us, stats.timing_violations
    );

    // Lifecycle: deactivate -> shutdown
    system.on_deactivate()?;
    system.on_shutdown()?;

    info!("DiffBot HAL shutdown complete");
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Detect if running under a real-time scheduler policy.
fn detect_rt_mode() -> bool {
    #[cfg(target_os = "linux")]
    {
        use libc::{sched_getscheduler, SCHED_FIFO, SCHED_RR};
        unsafe {
            let policy = sched_getscheduler(0);
            policy == SCHED_FIFO || policy == SCHED_RR
        }
    }
    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::TimingStats;

    #[test]
    fn timing_stats_counters_are_monotonic() {
        let mut stats = TimingStats::default();
        let mut prev = (0u64, 0u64, 0u64);

        // Mixed in-budget and over-budget cycles, in no particular order.
        for &cycle_us in &[100u64, 50, 20_000, 30, 10_001, 5] {
            stats.record_cycle(cycle_us, 10_000);
            let cur = (
                stats.cycle_count,
                stats.timing_violations,
                stats.max_cycle_time_us,
            );
            assert!(cur.0 > prev.0, "cycle_count must grow every cycle");
            assert!(cur.1 >= prev.1, "timing_violations must never decrease");
            assert!(cur.2 >= prev.2, "max_cycle_time_us must never decrease");
            prev = cur;
        }

        assert_eq!(stats.cycle_count, 6);
        assert_eq!(stats.timing_violations, 2);
        assert_eq!(stats.max_cycle_time_us, 20_000);
        assert_eq!(stats.total_cycle_time_us, 100 + 50 + 20_000 + 30 + 10_001 + 5);
    }

    #[test]
    fn record_cycle_reports_budget_violation() {
        let mut stats = TimingStats::default();
        assert!(!stats.record_cycle(5_000, 10_000));
        assert!(!stats.record_cycle(10_000, 10_000)); // exactly on budget is fine
        assert!(stats.record_cycle(10_001, 10_000));
        assert_eq!(stats.timing_violations, 1);
    }
}
