//! vexide bindings for the drive, the intake and the clock.

use core::{future::Future, time::Duration};

use hurricane_drive::{BrakeMode, Clock, DriveError, Drivetrain, MotorGroup, Output, Side};
use vexide::{
    devices::smart::imu::InertialSensor,
    prelude::{BrakeMode as MotorBrake, Gearset, Motor, sleep},
    time::Instant,
};

const MOTOR: DriveError = DriveError::Device("drive motor");
const IMU: DriveError = DriveError::Device("inertial sensor");

fn free_rpm(motors: &[Motor]) -> f64 {
    match motors.first().map(|m| m.gearset()) {
        Some(Ok(Gearset::Blue)) => 600.0,
        Some(Ok(Gearset::Green)) => 200.0,
        Some(Ok(Gearset::Red)) => 100.0,
        _ => 600.0,
    }
}

pub struct VexDrivetrain<const L: usize, const R: usize> {
    left_motors: [Motor; L],
    right_motors: [Motor; R],
    imu: Option<InertialSensor>,
    brake: MotorBrake,
    motor_free_rpm: f64,
}

impl<const L: usize, const R: usize> VexDrivetrain<L, R> {
    /// The inertial sensor, if any, is expected to be calibrated already.
    pub fn new(
        left_motors: [Motor; L],
        right_motors: [Motor; R],
        imu: Option<InertialSensor>,
    ) -> Self {
        let motor_free_rpm = free_rpm(&left_motors);
        Self {
            left_motors,
            right_motors,
            imu,
            brake: MotorBrake::Coast,
            motor_free_rpm,
        }
    }

    fn motors(&self, side: Side) -> &[Motor] {
        match side {
            Side::Left => &self.left_motors,
            Side::Right => &self.right_motors,
        }
    }

    fn motors_mut(&mut self, side: Side) -> &mut [Motor] {
        match side {
            Side::Left => &mut self.left_motors,
            Side::Right => &mut self.right_motors,
        }
    }
}

impl<const L: usize, const R: usize> Drivetrain for VexDrivetrain<L, R> {
    fn set_output(&mut self, side: Side, output: Output) -> Result<(), DriveError> {
        let free_rpm = self.motor_free_rpm;
        let mut result = Ok(());
        for m in self.motors_mut(side) {
            let written = match output {
                // 100% is 12 V
                Output::Voltage(percent) => m.set_voltage(percent * 0.12),
                Output::Velocity(percent) => m.set_velocity((percent / 100.0 * free_rpm) as i32),
            };
            if written.is_err() {
                result = Err(MOTOR);
            }
        }
        result
    }

    fn stop(&mut self, side: Side) -> Result<(), DriveError> {
        let brake = self.brake;
        let mut result = Ok(());
        for m in self.motors_mut(side) {
            if m.brake(brake).is_err() {
                result = Err(MOTOR);
            }
        }
        result
    }

    fn set_brake_mode(&mut self, mode: BrakeMode) -> Result<(), DriveError> {
        self.brake = match mode {
            BrakeMode::Coast => MotorBrake::Coast,
            BrakeMode::Brake => MotorBrake::Brake,
            BrakeMode::Hold => MotorBrake::Hold,
        };
        Ok(())
    }

    fn reset_position(&mut self, side: Side) -> Result<(), DriveError> {
        let mut result = Ok(());
        for m in self.motors_mut(side) {
            if m.reset_position().is_err() {
                result = Err(MOTOR);
            }
        }
        result
    }

    fn position(&self, side: Side) -> Result<f64, DriveError> {
        let motors = self.motors(side);
        let mut total = 0.0;
        for m in motors {
            total += m.position().map_err(|_| MOTOR)?.as_degrees();
        }
        Ok(total / motors.len() as f64)
    }

    fn heading(&self) -> Option<Result<f64, DriveError>> {
        self.imu
            .as_ref()
            .map(|imu| imu.rotation().map_err(|_| IMU))
    }

    fn reset_heading(&mut self) -> Result<(), DriveError> {
        match self.imu.as_mut() {
            Some(imu) => imu.reset_rotation().map_err(|_| IMU),
            None => Ok(()),
        }
    }

    fn is_calibrating(&self) -> bool {
        self.imu
            .as_ref()
            .is_some_and(|imu| imu.is_calibrating().unwrap_or(false))
    }
}

pub struct VexMotorGroup<const N: usize> {
    motors: [Motor; N],
    brake: MotorBrake,
    free_rpm: f64,
}

impl<const N: usize> VexMotorGroup<N> {
    /// `brake` is applied whenever the group is stopped.
    pub fn new(motors: [Motor; N], brake: MotorBrake) -> Self {
        let free_rpm = free_rpm(&motors);
        Self {
            motors,
            brake,
            free_rpm,
        }
    }

    /// Runs every motor at a percentage of its free speed.
    pub fn set_velocity_percent(&mut self, percent: f64) -> Result<(), DriveError> {
        let rpm = (percent.clamp(-100.0, 100.0) / 100.0 * self.free_rpm) as i32;
        let mut result = Ok(());
        for m in self.motors.iter_mut() {
            if m.set_velocity(rpm).is_err() {
                result = Err(DriveError::Device("intake motor"));
            }
        }
        result
    }
}

impl<const N: usize> MotorGroup for VexMotorGroup<N> {
    fn set_voltage(&mut self, millivolts: f64) -> Result<(), DriveError> {
        let mut result = Ok(());
        for m in self.motors.iter_mut() {
            if m.set_voltage(millivolts / 1000.0).is_err() {
                result = Err(DriveError::Device("intake motor"));
            }
        }
        result
    }

    fn position(&self) -> Result<f64, DriveError> {
        let mut total = 0.0;
        for m in self.motors.iter() {
            total += m
                .position()
                .map_err(|_| DriveError::Device("intake motor"))?
                .as_degrees();
        }
        Ok(total / N as f64)
    }

    fn stop(&mut self) -> Result<(), DriveError> {
        let mut result = Ok(());
        for m in self.motors.iter_mut() {
            if m.brake(self.brake).is_err() {
                result = Err(DriveError::Device("intake motor"));
            }
        }
        result
    }
}

pub struct VexClock {
    start: Instant,
}

impl VexClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for VexClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        sleep(duration)
    }
}
