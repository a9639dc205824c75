use alloc::vec::Vec;
use core::time::Duration;

use hurricane_drive::{ArcProfile, BrakeMode};
use log::{info, warn};
use vexide::prelude::*;

use crate::Robot;

/// Which side is on the inside of the first curve.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Bend {
    Left,
    Right,
}

pub enum Action {
    Drive(f64, f64),
    DriveAsync(f64, f64),
    Turn(f64, f64),
    TurnAsync(f64, f64),
    Settle,
    FastDrive(f64, f64),
    TimeDrive(Duration, f64, f64),
    VelocityDrive(Duration, f64),
    Arc {
        bend: Bend,
        length: i32,
        radius: f64,
        max: f64,
        profile: ArcProfile,
    },
    SCurve {
        bend: Bend,
        arc1: i32,
        mid: u32,
        arc2: i32,
        max: f64,
    },
    Brake(BrakeMode),
    Reset,
    SetSpeed(f64),
    /// Intake velocity in percent.
    Intake(f64),
    /// Intake position in degrees.
    IntakeTo(f64),
    Wait(Duration),
}

impl Robot {
    pub async fn run_plan(&mut self, plan: Vec<Action>) {
        info!("running {} actions", plan.len());
        for action in plan {
            match action {
                Action::Drive(tiles, speed) => self.chassis.drive(tiles, speed).await,
                Action::DriveAsync(tiles, speed) => self.chassis.drive_async(tiles, speed),
                Action::Turn(degrees, speed) => self.chassis.turn(degrees, speed).await,
                Action::TurnAsync(degrees, speed) => self.chassis.turn_async(degrees, speed),
                Action::Settle => self.chassis.wait_until_settled().await,
                Action::FastDrive(tiles, speed) => self.chassis.fast_drive(tiles, speed).await,
                Action::TimeDrive(duration, left, right) => {
                    self.chassis.time_drive(duration, left, right).await;
                }
                Action::VelocityDrive(duration, speed) => {
                    self.chassis.velocity_drive(duration, speed).await;
                }
                Action::Arc {
                    bend,
                    length,
                    radius,
                    max,
                    profile,
                } => match bend {
                    Bend::Left => self.chassis.arc_left(length, radius, max, profile).await,
                    Bend::Right => self.chassis.arc_right(length, radius, max, profile).await,
                },
                Action::SCurve {
                    bend,
                    arc1,
                    mid,
                    arc2,
                    max,
                } => match bend {
                    Bend::Left => self.chassis.s_left(arc1, mid, arc2, max).await,
                    Bend::Right => self.chassis.s_right(arc1, mid, arc2, max).await,
                },
                Action::Brake(mode) => self.chassis.set_brake_mode(mode),
                Action::Reset => self.chassis.reset(),
                Action::SetSpeed(speed) => self.chassis.set_speed(speed),
                Action::Intake(percent) => self.spin_intake(percent),
                Action::IntakeTo(degrees) => {
                    if let Err(e) = self.intake.spin_to(degrees, self.chassis.clock()).await {
                        warn!("intake move to {degrees} failed: {e}");
                    }
                }
                Action::Wait(duration) => sleep(duration).await,
            }
        }
    }
}
