//! Simulated drivetrain and clock on tokio's paused test clock.
//!
//! Encoder positions integrate the last commanded output of each side over virtual time, so a
//! side commanded at 100% travels [`TICKS_PER_MS`] ticks every millisecond.

use std::{cell::RefCell, future::Future, rc::Rc, time::Duration};

use tokio::{task::LocalSet, time::Instant};

use crate::{
    Chassis, DriveConfig,
    error::DriveError,
    hal::{BrakeMode, Clock, Drivetrain, MotorGroup, Output, Side},
};

pub const TICKS_PER_MS: f64 = 1.2;

pub struct SimClock {
    start: Instant,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for SimClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        tokio::time::sleep(duration)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Event {
    Output(Side, Output),
    Stop(Side),
    Brake(BrakeMode),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Record {
    pub at: Duration,
    pub event: Event,
}

struct World {
    start: Instant,
    last_update: Instant,
    travel: [f64; 2],
    zero: [f64; 2],
    command: [f64; 2],
    stalled: bool,
    heading_sensor: bool,
    heading_zero: f64,
    calibrating_until: Option<Instant>,
    failing: bool,
    records: Vec<Record>,
}

impl World {
    fn advance(&mut self) {
        let now = Instant::now();
        let ms = (now - self.last_update).as_secs_f64() * 1000.0;
        if !self.stalled {
            for i in 0..2 {
                self.travel[i] += self.command[i] / 100.0 * TICKS_PER_MS * ms;
            }
        }
        self.last_update = now;
    }

    fn record(&mut self, event: Event) {
        let at = Instant::now() - self.start;
        self.records.push(Record { at, event });
    }

    fn raw_heading(&self) -> f64 {
        let config = DriveConfig::default();
        (self.travel[0] - self.travel[1]) / 2.0 / config.degree_ticks_per_unit
    }
}

fn index(side: Side) -> usize {
    match side {
        Side::Left => 0,
        Side::Right => 1,
    }
}

#[derive(Clone)]
pub struct SimDrivetrain(Rc<RefCell<World>>);

impl SimDrivetrain {
    pub fn new() -> Self {
        let now = Instant::now();
        Self(Rc::new(RefCell::new(World {
            start: now,
            last_update: now,
            travel: [0.0; 2],
            zero: [0.0; 2],
            command: [0.0; 2],
            stalled: false,
            heading_sensor: false,
            heading_zero: 0.0,
            calibrating_until: None,
            failing: false,
            records: Vec::new(),
        })))
    }

    pub fn with_heading_sensor() -> Self {
        let sim = Self::new();
        sim.0.borrow_mut().heading_sensor = true;
        sim
    }

    pub fn set_stalled(&self, stalled: bool) {
        let mut world = self.0.borrow_mut();
        world.advance();
        world.stalled = stalled;
    }

    pub fn set_failing(&self, failing: bool) {
        self.0.borrow_mut().failing = failing;
    }

    /// Moves a side's encoder as if the robot had been pushed.
    pub fn push(&self, side: Side, ticks: f64) {
        let mut world = self.0.borrow_mut();
        world.advance();
        world.travel[index(side)] += ticks;
    }

    pub fn read(&self, side: Side) -> f64 {
        let mut world = self.0.borrow_mut();
        world.advance();
        world.travel[index(side)] - world.zero[index(side)]
    }

    pub fn command(&self, side: Side) -> f64 {
        self.0.borrow().command[index(side)]
    }

    pub fn records(&self) -> Vec<Record> {
        self.0.borrow().records.clone()
    }

    pub fn outputs(&self, side: Side) -> Vec<(Duration, Output)> {
        self.records()
            .into_iter()
            .filter_map(|r| match r.event {
                Event::Output(s, output) if s == side => Some((r.at, output)),
                _ => None,
            })
            .collect()
    }

    pub fn clear_records(&self) {
        self.0.borrow_mut().records.clear();
    }
}

impl Drivetrain for SimDrivetrain {
    fn set_output(&mut self, side: Side, output: Output) -> Result<(), DriveError> {
        let mut world = self.0.borrow_mut();
        if world.failing {
            return Err(DriveError::Disconnected);
        }
        world.advance();
        world.command[index(side)] = output.percent();
        world.record(Event::Output(side, output));
        Ok(())
    }

    fn stop(&mut self, side: Side) -> Result<(), DriveError> {
        let mut world = self.0.borrow_mut();
        world.advance();
        world.command[index(side)] = 0.0;
        world.record(Event::Stop(side));
        Ok(())
    }

    fn set_brake_mode(&mut self, mode: BrakeMode) -> Result<(), DriveError> {
        self.0.borrow_mut().record(Event::Brake(mode));
        Ok(())
    }

    fn reset_position(&mut self, side: Side) -> Result<(), DriveError> {
        let mut world = self.0.borrow_mut();
        world.advance();
        world.zero[index(side)] = world.travel[index(side)];
        Ok(())
    }

    fn position(&self, side: Side) -> Result<f64, DriveError> {
        if self.0.borrow().failing {
            return Err(DriveError::Disconnected);
        }
        Ok(self.read(side))
    }

    fn heading(&self) -> Option<Result<f64, DriveError>> {
        let mut world = self.0.borrow_mut();
        if !world.heading_sensor {
            return None;
        }
        world.advance();
        Some(Ok(world.raw_heading() - world.heading_zero))
    }

    fn reset_heading(&mut self) -> Result<(), DriveError> {
        let mut world = self.0.borrow_mut();
        world.advance();
        world.heading_zero = world.raw_heading();
        Ok(())
    }

    fn calibrate(&mut self) -> Result<(), DriveError> {
        self.0.borrow_mut().calibrating_until = Some(Instant::now() + Duration::from_millis(100));
        Ok(())
    }

    fn is_calibrating(&self) -> bool {
        self.0
            .borrow()
            .calibrating_until
            .is_some_and(|until| Instant::now() < until)
    }
}

/// A single motor mechanism whose position follows the applied voltage.
#[derive(Clone)]
pub struct SimMotorGroup(Rc<RefCell<SimMotor>>);

struct SimMotor {
    last_update: Instant,
    millivolts: f64,
    position: f64,
    stopped: bool,
}

impl SimMotorGroup {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(SimMotor {
            last_update: Instant::now(),
            millivolts: 0.0,
            position: 0.0,
            stopped: false,
        })))
    }

    pub fn millivolts(&self) -> f64 {
        self.0.borrow().millivolts
    }

    pub fn stopped(&self) -> bool {
        self.0.borrow().stopped
    }

    fn advance(motor: &mut SimMotor) {
        let now = Instant::now();
        let ms = (now - motor.last_update).as_secs_f64() * 1000.0;
        // 12 V spins at 1.2 degrees per millisecond
        motor.position += motor.millivolts / 12_000.0 * TICKS_PER_MS * ms;
        motor.last_update = now;
    }
}

impl MotorGroup for SimMotorGroup {
    fn set_voltage(&mut self, millivolts: f64) -> Result<(), DriveError> {
        let mut motor = self.0.borrow_mut();
        Self::advance(&mut motor);
        motor.millivolts = millivolts;
        motor.stopped = false;
        Ok(())
    }

    fn position(&self) -> Result<f64, DriveError> {
        let mut motor = self.0.borrow_mut();
        Self::advance(&mut motor);
        Ok(motor.position)
    }

    fn stop(&mut self) -> Result<(), DriveError> {
        let mut motor = self.0.borrow_mut();
        Self::advance(&mut motor);
        motor.millivolts = 0.0;
        motor.stopped = true;
        Ok(())
    }
}

pub type SimChassis = Chassis<SimDrivetrain, SimClock>;

pub fn chassis(config: DriveConfig) -> (SimChassis, SimDrivetrain) {
    let sim = SimDrivetrain::new();
    let chassis = Chassis::new(sim.clone(), SimClock::new(), config).expect("valid config");
    (chassis, sim)
}

pub fn chassis_with(sim: SimDrivetrain, config: DriveConfig) -> SimChassis {
    Chassis::new(sim, SimClock::new(), config).expect("valid config")
}

/// Runs `body` with the chassis control loop spawned alongside it.
pub async fn with_control_loop<F: Future>(chassis: &SimChassis, body: F) -> F::Output {
    LocalSet::new()
        .run_until(async {
            let control = tokio::task::spawn_local(chassis.clone().control_loop());
            let out = body.await;
            control.abort();
            out
        })
        .await
}
