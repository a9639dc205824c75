#![no_main]
#![no_std]
extern crate alloc;
use alloc::vec::Vec;
use core::time::Duration;

use hurricane_drive::{Chassis, DriveConfig, MotorGroup, mechanism::PositionController};
use log::{LevelFilter, info, warn};
use vexide::{competition, devices::smart::imu::InertialSensor, fs, prelude::*};

use crate::{
    drivetrain::{VexClock, VexDrivetrain, VexMotorGroup},
    plan::Action,
};

mod drivetrain;
mod logger;
mod plan;
mod routines;

const AUTON_SAVE_PATH: &str = "auton.txt";
const DRIVER_PERIOD: Duration = Duration::from_millis(20);

#[vexide::main]
async fn main(peripherals: Peripherals) {
    if let Err(e) = logger::init(LevelFilter::Info) {
        println!("logger: {e}");
    }
    let mut dynamic_peripherals = DynamicPeripherals::new(peripherals);
    let robot = Robot::new(&mut dynamic_peripherals).await;
    robot.compete().await;
}

pub struct Robot {
    chassis: Chassis<VexDrivetrain<2, 2>, VexClock>,
    intake: PositionController<VexMotorGroup<2>>,
    controller: Controller,
}

impl Robot {
    async fn new(peripherals: &mut DynamicPeripherals) -> Self {
        let left_motors = [
            Motor::new(
                peripherals.take_smart_port(1).expect("smart port 1"),
                Gearset::Green,
                Direction::Forward,
            ),
            Motor::new(
                peripherals.take_smart_port(2).expect("smart port 2"),
                Gearset::Green,
                Direction::Forward,
            ),
        ];
        let right_motors = [
            Motor::new(
                peripherals.take_smart_port(3).expect("smart port 3"),
                Gearset::Green,
                Direction::Reverse,
            ),
            Motor::new(
                peripherals.take_smart_port(4).expect("smart port 4"),
                Gearset::Green,
                Direction::Reverse,
            ),
        ];
        let intake_motors = [
            Motor::new(
                peripherals.take_smart_port(5).expect("smart port 5"),
                Gearset::Green,
                Direction::Forward,
            ),
            Motor::new(
                peripherals.take_smart_port(6).expect("smart port 6"),
                Gearset::Green,
                Direction::Reverse,
            ),
        ];
        let mut imu = InertialSensor::new(peripherals.take_smart_port(7).expect("smart port 7"));
        let imu = match imu.calibrate().await {
            Ok(_) => {
                info!("IMU calibration successful");
                Some(imu)
            }
            Err(e) => {
                warn!("IMU calibration failed, turning on encoders only: {e:?}");
                None
            }
        };

        let config = DriveConfig {
            use_heading_sensor: imu.is_some(),
            ..Default::default()
        };
        let drivetrain = VexDrivetrain::new(left_motors, right_motors, imu);
        let chassis = Chassis::new(drivetrain, VexClock::new(), config).expect("drive config");
        chassis.reset();
        vexide::task::spawn(chassis.clone().control_loop()).detach();

        let intake =
            PositionController::new(VexMotorGroup::new(intake_motors, BrakeMode::Hold), 0.1);

        Robot {
            chassis,
            intake,
            controller: peripherals.take_primary_controller().expect("primary controller"),
        }
    }

    /// Intake velocity in percent of free speed.
    fn spin_intake(&mut self, percent: f64) {
        if let Err(e) = self.intake.group_mut().set_velocity_percent(percent) {
            warn!("intake: {e}");
        }
    }

    fn stop_intake(&mut self) {
        if let Err(e) = self.intake.group_mut().stop() {
            warn!("intake: {e}");
        }
    }
}

/// The routine named in `auton.txt`, or by index, else the first one built in.
fn selected_routine() -> Option<(alloc::string::String, Vec<Action>)> {
    let mut routines = routines::load_all();
    if routines.is_empty() {
        warn!("no routines built in");
        return None;
    }
    let saved = fs::read_to_string(AUTON_SAVE_PATH).ok();
    let index = saved
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| {
            // prefer name match, else treat as index
            routines
                .iter()
                .position(|(name, _)| name.eq_ignore_ascii_case(s))
                .or_else(|| s.parse::<usize>().ok())
        })
        .filter(|&i| i < routines.len())
        .unwrap_or(0);
    Some(routines.swap_remove(index))
}

impl Compete for Robot {
    async fn autonomous(&mut self) {
        let Some((name, plan)) = selected_routine() else {
            return;
        };
        info!("autonomous: {name} ({} routines available)", routines::list_names().len());
        self.run_plan(plan).await;
    }

    async fn driver(&mut self) {
        loop {
            let c_state = self.controller.state().unwrap_or_default();
            self.chassis
                .tank(c_state.left_stick.y() * 100.0, c_state.right_stick.y() * 100.0);

            if c_state.button_r1.is_pressed() {
                self.spin_intake(100.0);
            } else if c_state.button_r2.is_pressed() {
                self.spin_intake(-50.0);
            } else {
                self.stop_intake();
            }

            // bench testing only, never under field control or a competition switch
            if c_state.button_left.is_pressed() && !competition::is_connected() {
                if let Some((name, plan)) = selected_routine() {
                    info!("running {name} from driver control");
                    self.run_plan(plan).await;
                }
            }

            sleep(DRIVER_PERIOD).await;
        }
    }
}
