//! Seams between the motion code and the hardware it drives.

use core::{future::Future, time::Duration};

use crate::error::DriveError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];
}

/// A command for one side of the drivetrain, in percent of full scale (-100 to 100).
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Output {
    /// Percent of the maximum motor voltage.
    Voltage(f64),
    /// Percent of the motor's free speed, held by the motor's internal velocity loop.
    Velocity(f64),
}

impl Output {
    pub fn percent(&self) -> f64 {
        match *self {
            Output::Voltage(p) | Output::Velocity(p) => p,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BrakeMode {
    #[default]
    Coast,
    Brake,
    Hold,
}

/// The actuator and sensor binding of a two-sided drivetrain.
///
/// Positions are cumulative rotation ticks (motor degrees) averaged over each side's motors and
/// are resettable. Heading support is optional; the defaults describe a drivetrain without a
/// heading sensor.
pub trait Drivetrain {
    fn set_output(&mut self, side: Side, output: Output) -> Result<(), DriveError>;

    /// Stops one side using the current brake mode.
    fn stop(&mut self, side: Side) -> Result<(), DriveError>;

    fn set_brake_mode(&mut self, mode: BrakeMode) -> Result<(), DriveError>;

    fn reset_position(&mut self, side: Side) -> Result<(), DriveError>;

    fn position(&self, side: Side) -> Result<f64, DriveError>;

    /// Clockwise heading in degrees, or `None` if no heading sensor is fitted.
    fn heading(&self) -> Option<Result<f64, DriveError>> {
        None
    }

    fn reset_heading(&mut self) -> Result<(), DriveError> {
        Ok(())
    }

    /// Starts calibrating the heading sensor.
    fn calibrate(&mut self) -> Result<(), DriveError> {
        Ok(())
    }

    fn is_calibrating(&self) -> bool {
        false
    }
}

/// A group of motors driven as one mechanism (an intake, a lift).
pub trait MotorGroup {
    fn set_voltage(&mut self, millivolts: f64) -> Result<(), DriveError>;

    /// Averaged position in degrees.
    fn position(&self) -> Result<f64, DriveError>;

    fn stop(&mut self) -> Result<(), DriveError>;
}

/// Time source and cooperative sleep of the executor the motion code runs on.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}
