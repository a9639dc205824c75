//! Motion control for a differential drivetrain.
//!
//! A [`Chassis`] owns the drivetrain and a small block of shared control state. Its
//! [`control_loop`](Chassis::control_loop) future runs the closed-loop straight/turn controller
//! every control period and must be spawned once on the executor. Everything else
//! (synchronous and asynchronous moves, open-loop drives, arcs, S-curves, manual passthrough)
//! is called from the foreground task.
//!
//! ```ignore
//! let chassis = Chassis::new(drivetrain, clock, DriveConfig::default())?;
//! vexide::task::spawn(chassis.clone().control_loop()).detach();
//!
//! chassis.drive(2.0, 100.0).await; // two tiles forward
//! chassis.turn(90.0, 80.0).await; // quarter turn counterclockwise
//! chassis.s_left(50, 200, 50, 60.0).await;
//! ```
#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod autonomous;
mod chassis;
pub mod config;
mod driver_control;
pub mod error;
pub mod hal;
pub mod mechanism;
pub mod motion_controller;
pub mod pid;
pub mod settle;
pub mod slew;
pub mod state;

#[cfg(test)]
mod sim;

pub use chassis::Chassis;
pub use config::DriveConfig;
pub use error::{ConfigError, DriveError};
pub use hal::{BrakeMode, Clock, Drivetrain, MotorGroup, Output, Side};
pub use motion_controller::ArcProfile;
pub use state::{Mode, MotionState};
