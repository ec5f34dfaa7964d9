//! Command-to-actuation translation.
//!
//! Converts a signed wheel velocity setpoint (rad/s) into the
//! direction + duty-cycle pair the GPIO daemon expects. The magnitude is
//! normalized against the configured maximum wheel velocity and clamped,
//! so an out-of-range command saturates instead of overflowing the duty
//! range.

/// Full-scale PWM duty value (8-bit daemon duty range).
pub const PWM_DUTY_MAX: u8 = 255;

/// Motor rotation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Positive wheel velocity
    Forward,
    /// Negative wheel velocity
    Reverse,
    /// Zero command - motor output released
    #[default]
    Stop,
}

/// One actuation output: direction plus PWM duty cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotorDrive {
    /// Rotation direction derived from the command sign
    pub direction: Direction,
    /// Duty cycle, 0..=PWM_DUTY_MAX
    pub duty: u8,
}

impl MotorDrive {
    /// A released motor output (no direction, zero duty).
    pub const STOP: MotorDrive = MotorDrive {
        direction: Direction::Stop,
        duty: 0,
    };
}

/// Translate a velocity command into a motor drive signal.
///
/// `duty = clamp(|command| / max_velocity, 0, 1) * PWM_DUTY_MAX`, direction
/// from the command sign. Non-finite commands and a non-positive
/// `max_velocity` both map to [`MotorDrive::STOP`] - a broken setpoint must
/// never reach the motor pins.
pub fn drive_from_command(command: f64, max_velocity: f64) -> MotorDrive {
    if !command.is_finite() || max_velocity <= 0.0 || command == 0.0 {
        return MotorDrive::STOP;
    }

    let direction = if command > 0.0 {
        Direction::Forward
    } else {
        Direction::Reverse
    };

    let normalized = (command.abs() / max_velocity).clamp(0.0, 1.0);
    let duty = (normalized * PWM_DUTY_MAX as f64).round() as u8;

    MotorDrive { direction, duty }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_command_scales_to_duty() {
        let drive = drive_from_command(5.0, 10.0);
        assert_eq!(drive.direction, Direction::Forward);
        assert_eq!(drive.duty, 128); // 0.5 * 255 rounded
    }

    #[test]
    fn reverse_command_uses_magnitude() {
        let drive = drive_from_command(-10.0, 10.0);
        assert_eq!(drive.direction, Direction::Reverse);
        assert_eq!(drive.duty, PWM_DUTY_MAX);
    }

    #[test]
    fn over_range_command_saturates() {
        let drive = drive_from_command(100.0, 10.0);
        assert_eq!(drive.duty, PWM_DUTY_MAX);

        let drive = drive_from_command(-100.0, 10.0);
        assert_eq!(drive.direction, Direction::Reverse);
        assert_eq!(drive.duty, PWM_DUTY_MAX);
    }

    #[test]
    fn zero_command_stops() {
        assert_eq!(drive_from_command(0.0, 10.0), MotorDrive::STOP);
    }

    #[test]
    fn non_finite_command_stops() {
        assert_eq!(drive_from_command(f64::NAN, 10.0), MotorDrive::STOP);
        assert_eq!(drive_from_command(f64::INFINITY, 10.0), MotorDrive::STOP);
    }

    #[test]
    fn invalid_max_velocity_stops() {
        assert_eq!(drive_from_command(1.0, 0.0), MotorDrive::STOP);
        assert_eq!(drive_from_command(1.0, -1.0), MotorDrive::STOP);
    }
}
