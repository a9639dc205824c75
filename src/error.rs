use thiserror::Error;

/// Rejected [`DriveConfig`](crate::DriveConfig) values.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("default max speed must be within (0, 100], got {0}")]
    SpeedOutOfRange(f64),

    #[error("{0} must be a nonzero duration")]
    ZeroPeriod(&'static str),
}

/// Failures reported by a [`Drivetrain`](crate::Drivetrain) or
/// [`MotorGroup`](crate::MotorGroup) binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DriveError {
    #[error("device disconnected")]
    Disconnected,

    #[error("device error: {0}")]
    Device(&'static str),
}
