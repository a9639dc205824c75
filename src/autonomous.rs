use core::time::Duration;

#[cfg(not(test))]
use num_traits::Float;

use log::{debug, info};

use crate::{
    chassis::Chassis,
    hal::{Clock, Drivetrain, Output},
    state::{Mode, MotionState, clamp_speed},
};

impl<D: Drivetrain, C: Clock> Chassis<D, C> {
    /// Starts a closed-loop straight move of `distance` tiles and returns immediately.
    pub fn drive_async(&self, distance: f64, max_speed: f64) {
        self.reset();
        let target_ticks = self.config().distance_to_ticks(distance);
        debug!("drive {distance} tiles ({target_ticks} ticks) at {max_speed}");
        self.command(MotionState {
            mode: Mode::Straight,
            target_ticks,
            max_speed: clamp_speed(max_speed),
        });
    }

    /// Starts a closed-loop turn of `angle` degrees (counterclockwise positive) and returns
    /// immediately.
    pub fn turn_async(&self, angle: f64, max_speed: f64) {
        self.reset();
        let target_ticks = self.config().angle_to_ticks(angle);
        debug!("turn {angle} deg ({target_ticks} ticks) at {max_speed}");
        self.command(MotionState {
            mode: Mode::Turn,
            target_ticks,
            max_speed: clamp_speed(max_speed),
        });
    }

    pub async fn drive(&self, distance: f64, max_speed: f64) {
        self.drive_async(distance, max_speed);
        self.settle_after_preroll().await;
    }

    pub async fn turn(&self, angle: f64, max_speed: f64) {
        self.turn_async(angle, max_speed);
        self.settle_after_preroll().await;
    }

    async fn settle_after_preroll(&self) {
        self.clock().sleep(self.config().settle_preroll).await;
        self.wait_until_settled().await;
    }

    /// Drives open loop at `speed` until the left side has passed `distance` tiles.
    ///
    /// Counters are not reset and the motors keep running at the end, so the next command starts
    /// from full speed.
    pub async fn fast_drive(&self, distance: f64, speed: f64) {
        let target = self.config().distance_to_ticks(distance);
        let forward = distance >= 0.0;
        let speed = if forward {
            clamp_speed(speed.abs())
        } else {
            -clamp_speed(speed.abs())
        };

        self.seize();
        self.prime_slew(speed);
        self.write_both(Output::Voltage(speed), Output::Voltage(speed));

        let start = self.clock().now();
        loop {
            let position = self.drive_pos();
            let reached = if forward {
                position >= target
            } else {
                position <= target
            };
            if reached {
                break;
            }
            self.clock().sleep(self.config().control_period).await;
        }
        info!(
            "fast drive to {target} ticks took {} ms",
            (self.clock().now() - start).as_millis()
        );
    }

    /// Applies a fixed voltage percent to each side for `duration`, then stops.
    pub async fn time_drive(&self, duration: Duration, left: f64, right: f64) {
        self.seize();
        self.write_both(Output::Voltage(left), Output::Voltage(right));
        self.clock().sleep(duration).await;
        self.stop_both();
    }

    /// Holds both sides at a velocity percent for `duration` and leaves them running.
    pub async fn velocity_drive(&self, duration: Duration, speed: f64) {
        self.seize();
        self.prime_slew(speed);
        self.write_both(Output::Velocity(speed), Output::Velocity(speed));
        self.clock().sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::{Instant, sleep};

    use crate::{
        DriveConfig,
        hal::{Output, Side},
        sim::{self, Event},
        state::{Mode, MotionState},
    };

    fn assert_command(motion: MotionState, mode: Mode, target_ticks: f64, max_speed: f64) {
        assert_eq!(motion.mode, mode);
        assert!(
            (motion.target_ticks - target_ticks).abs() < 1e-9,
            "target {}",
            motion.target_ticks
        );
        assert_eq!(motion.max_speed, max_speed);
    }

    #[tokio::test(start_paused = true)]
    async fn drive_async_writes_whole_command() {
        let (chassis, sim) = sim::chassis(DriveConfig::default());
        sim.push(Side::Left, 80.0);
        chassis.drive_async(1.5, 250.0);
        assert_command(chassis.motion_state(), Mode::Straight, 817.5, 100.0);
        assert_eq!(chassis.drive_pos(), 0.0);

        chassis.turn_async(-90.0, 60.0);
        assert_command(chassis.motion_state(), Mode::Turn, -207.0, 60.0);
    }

    #[tokio::test(start_paused = true)]
    async fn drive_reaches_target_and_settles() {
        let (chassis, sim) = sim::chassis(DriveConfig::default());
        let started = Instant::now();
        sim::with_control_loop(&chassis, chassis.drive(1.0, 100.0)).await;

        assert!(started.elapsed() >= Duration::from_millis(550));
        let position = sim.read(Side::Left);
        assert!((position - 545.0).abs() < 545.0 * 0.15, "stopped at {position}");
        assert!(!chassis.is_driving());
    }

    #[tokio::test(start_paused = true)]
    async fn reverse_drive_goes_backwards() {
        let (chassis, sim) = sim::chassis(DriveConfig::default());
        sim::with_control_loop(&chassis, chassis.drive(-0.5, 100.0)).await;
        assert!(sim.read(Side::Left) < -200.0);
        assert!(sim.read(Side::Right) < -200.0);
    }

    #[tokio::test(start_paused = true)]
    async fn turn_spins_counterclockwise() {
        let (chassis, sim) = sim::chassis(DriveConfig::default());
        sim::with_control_loop(&chassis, chassis.turn(90.0, 100.0)).await;
        let left = sim.read(Side::Left);
        let right = sim.read(Side::Right);
        assert!(left < -100.0, "left at {left}");
        assert!(right > 100.0, "right at {right}");
    }

    #[tokio::test(start_paused = true)]
    async fn fast_drive_stops_at_first_sample_past_target() {
        let (chassis, sim) = sim::chassis(DriveConfig::default());
        chassis.fast_drive(2.0, 100.0).await;
        let position = chassis.drive_pos();
        // 100% covers 24 ticks per 20 ms poll
        assert!((1090.0..1090.0 + 24.0 + 1e-6).contains(&position), "{position}");
        assert_eq!(chassis.motion_state().mode, Mode::Manual);
        assert_eq!(chassis.slew_speed(), 100.0);
        // left running
        assert_eq!(sim.command(Side::Left), 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn fast_drive_reverse_uses_negative_speed() {
        let (chassis, sim) = sim::chassis(DriveConfig::default());
        chassis.fast_drive(-2.0, 100.0).await;
        let position = chassis.drive_pos();
        assert!((-1090.0 - 24.0 - 1e-6..=-1090.0).contains(&position), "{position}");
        assert_eq!(sim.command(Side::Right), -100.0);
        assert_eq!(chassis.slew_speed(), -100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn fast_drive_keeps_counters() {
        let (chassis, sim) = sim::chassis(DriveConfig::default());
        sim.push(Side::Left, 500.0);
        let started = Instant::now();
        chassis.fast_drive(1.0, 50.0).await;
        // 45 ticks left at 0.6 ticks per ms
        assert!(started.elapsed() <= Duration::from_millis(80));
    }

    #[tokio::test(start_paused = true)]
    async fn time_drive_holds_then_stops() {
        let (chassis, sim) = sim::chassis(DriveConfig::default());
        chassis
            .time_drive(Duration::from_millis(500), 50.0, -30.0)
            .await;
        assert!((sim.read(Side::Left) - 300.0).abs() < 1e-6);
        assert!((sim.read(Side::Right) + 180.0).abs() < 1e-6);
        let events: Vec<Event> = sim.records().into_iter().map(|r| r.event).collect();
        assert_eq!(
            events,
            [
                Event::Output(Side::Left, Output::Voltage(50.0)),
                Event::Output(Side::Right, Output::Voltage(-30.0)),
                Event::Stop(Side::Left),
                Event::Stop(Side::Right),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn velocity_drive_leaves_motors_running() {
        let (chassis, sim) = sim::chassis(DriveConfig::default());
        chassis
            .velocity_drive(Duration::from_millis(200), 60.0)
            .await;
        assert_eq!(
            sim.outputs(Side::Left),
            [(Duration::ZERO, Output::Velocity(60.0))]
        );
        assert_eq!(sim.command(Side::Right), 60.0);
        assert_eq!(chassis.slew_speed(), 60.0);
    }

    #[tokio::test(start_paused = true)]
    async fn later_command_wins_during_wait() {
        let (chassis, _sim) = sim::chassis(DriveConfig::default());
        let interrupter = chassis.clone();
        sim::with_control_loop(&chassis, async {
            let wait = chassis.drive(2.0, 100.0);
            let interrupt = async {
                sleep(Duration::from_millis(200)).await;
                interrupter.turn_async(45.0, 70.0);
            };
            tokio::join!(wait, interrupt);
        })
        .await;
        assert_command(chassis.motion_state(), Mode::Turn, 103.5, 70.0);
    }
}
