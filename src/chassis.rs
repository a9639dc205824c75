use alloc::{rc::Rc, vec::Vec};
use core::{
    cell::RefCell,
    future::poll_fn,
    task::{Poll, Waker},
};

use log::{debug, info, warn};

use crate::{
    config::DriveConfig,
    error::ConfigError,
    hal::{BrakeMode, Clock, Drivetrain, Output, Side},
    slew::SlewProfile,
    state::{ControlState, Mode, MotionState, clamp_speed},
};

/// Handle to a differential drivetrain under closed-loop control.
///
/// Clones share the same drivetrain and control state. All state transitions happen inside
/// short, non-suspending borrows, so on a single-threaded executor a command is never observed
/// half-written by the control loop.
pub struct Chassis<D, C> {
    shared: Rc<Shared<D, C>>,
}

struct Shared<D, C> {
    config: DriveConfig,
    clock: C,
    drivetrain: RefCell<D>,
    state: RefCell<ControlState>,
    settle_waiters: RefCell<Vec<Waker>>,
}

impl<D, C> Clone for Chassis<D, C> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<D: Drivetrain, C: Clock> Chassis<D, C> {
    pub fn new(drivetrain: D, clock: C, config: DriveConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            shared: Rc::new(Shared {
                state: RefCell::new(ControlState::new(&config)),
                config,
                clock,
                drivetrain: RefCell::new(drivetrain),
                settle_waiters: RefCell::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &DriveConfig {
        &self.shared.config
    }

    pub fn clock(&self) -> &C {
        &self.shared.clock
    }

    pub fn motion_state(&self) -> MotionState {
        self.shared.state.borrow().motion
    }

    /// The slew limiter's last commanded speed.
    pub fn slew_speed(&self) -> f64 {
        self.shared.state.borrow().slew.last()
    }

    /// Runs the straight/turn controller forever, one tick per control period.
    ///
    /// Spawn this once, next to whatever task issues commands.
    pub async fn control_loop(self) {
        info!("control loop started");
        loop {
            self.shared.clock.sleep(self.shared.config.control_period).await;
            self.tick();
        }
    }

    pub(crate) fn tick(&self) {
        let motion = self.motion_state();
        let position = self.read(Side::Left);
        let settled = {
            let mut state = self.shared.state.borrow_mut();
            state.settled = state.settle.check_settled(position, motion.target_ticks);
            state.settled
        };
        if settled {
            self.wake_settle_waiters();
        }

        let (sensor, gains) = match motion.mode {
            Mode::Straight => (
                (self.read(Side::Left) + self.read(Side::Right)) / 2.0,
                self.shared.config.straight,
            ),
            Mode::Turn => (self.turn_sensor(), self.shared.config.turn),
            Mode::Idle | Mode::Manual => return,
        };

        let commanded = {
            let mut state = self.shared.state.borrow_mut();
            let raw = state
                .pid
                .next(motion.target_ticks - sensor, gains, motion.max_speed);
            state.slew.limit(raw, SlewProfile::Move)
        };
        let left = match motion.mode {
            Mode::Turn => -commanded,
            _ => commanded,
        };
        self.write(Side::Left, Output::Voltage(left));
        self.write(Side::Right, Output::Voltage(commanded));
    }

    /// Heading in ticks, counterclockwise positive.
    fn turn_sensor(&self) -> f64 {
        if self.shared.config.use_heading_sensor {
            let heading = {
                let drivetrain = self.shared.drivetrain.borrow();
                if drivetrain.is_calibrating() {
                    None
                } else {
                    drivetrain.heading()
                }
            };
            match heading {
                Some(Ok(degrees)) => return -self.shared.config.angle_to_ticks(degrees),
                Some(Err(e)) => warn!("heading read failed, using encoders: {e}"),
                None => {}
            }
        }
        (self.read(Side::Right) - self.read(Side::Left)) / 2.0
    }

    pub(crate) fn read(&self, side: Side) -> f64 {
        self.shared
            .drivetrain
            .borrow()
            .position(side)
            .unwrap_or_else(|e| {
                warn!("{side:?} position read failed: {e}");
                0.0
            })
    }

    pub(crate) fn write(&self, side: Side, output: Output) {
        if let Err(e) = self.shared.drivetrain.borrow_mut().set_output(side, output) {
            warn!("{side:?} output {output:?} failed: {e}");
        }
    }

    pub(crate) fn write_both(&self, left: Output, right: Output) {
        self.write(Side::Left, left);
        self.write(Side::Right, right);
    }

    pub(crate) fn stop_both(&self) {
        let mut drivetrain = self.shared.drivetrain.borrow_mut();
        for side in Side::BOTH {
            if let Err(e) = drivetrain.stop(side) {
                warn!("{side:?} stop failed: {e}");
            }
        }
    }

    /// Replaces the whole command register.
    pub(crate) fn command(&self, motion: MotionState) {
        self.shared.state.borrow_mut().motion = motion;
    }

    /// Takes the motors away from the control loop.
    pub(crate) fn seize(&self) {
        self.shared.state.borrow_mut().seize();
    }

    pub(crate) fn prime_slew(&self, speed: f64) {
        self.shared.state.borrow_mut().slew.prime(speed);
    }

    pub(crate) fn slew_arc(&self, desired: f64) -> f64 {
        self.shared
            .state
            .borrow_mut()
            .slew
            .limit(desired, SlewProfile::Arc)
    }

    fn wake_settle_waiters(&self) {
        let waiters: Vec<Waker> = self.shared.settle_waiters.borrow_mut().drain(..).collect();
        for waker in waiters {
            waker.wake();
        }
    }

    /// Restarts the settle window, so the next report covers only samples taken from now on.
    pub(crate) fn arm_settle(&self) {
        let mut state = self.shared.state.borrow_mut();
        state.settle.reset();
        state.settled = false;
    }

    /// Whether the robot has moved within the last settle window, as of the last control tick.
    pub fn is_driving(&self) -> bool {
        !self.shared.state.borrow().settled
    }

    /// Waits for a fresh settle window: the robot must stay still for the configured number of
    /// consecutive control ticks, counted from this call.
    pub async fn wait_until_settled(&self) {
        self.arm_settle();
        let start = self.shared.clock.now();
        poll_fn(|cx| {
            if self.shared.state.borrow().settled {
                Poll::Ready(())
            } else {
                let mut waiters = self.shared.settle_waiters.borrow_mut();
                if !waiters.iter().any(|w| w.will_wake(cx.waker())) {
                    waiters.push(cx.waker().clone());
                }
                Poll::Pending
            }
        })
        .await;
        info!(
            "settled at {} ticks after {} ms",
            self.drive_pos(),
            (self.shared.clock.now() - start).as_millis()
        );
    }

    pub fn set_speed(&self, max_speed: f64) {
        let mut state = self.shared.state.borrow_mut();
        state.motion = MotionState {
            max_speed: clamp_speed(max_speed),
            ..state.motion
        };
    }

    /// Sets the brake mode of both sides and stops them.
    pub fn set_brake_mode(&self, mode: BrakeMode) {
        if let Err(e) = self.shared.drivetrain.borrow_mut().set_brake_mode(mode) {
            warn!("brake mode {mode:?} failed: {e}");
        }
        self.stop_both();
    }

    /// Zeroes both sides' position counters and the heading sensor.
    pub fn reset(&self) {
        let mut drivetrain = self.shared.drivetrain.borrow_mut();
        for side in Side::BOTH {
            if let Err(e) = drivetrain.reset_position(side) {
                warn!("{side:?} position reset failed: {e}");
            }
        }
        if let Err(e) = drivetrain.reset_heading() {
            warn!("heading reset failed: {e}");
        }
    }

    /// Left side position in ticks since the last reset.
    pub fn drive_pos(&self) -> f64 {
        self.read(Side::Left)
    }

    /// Calibrates the heading sensor, returning once it reports done.
    pub async fn calibrate_heading(&self) {
        if let Err(e) = self.shared.drivetrain.borrow_mut().calibrate() {
            warn!("heading calibration failed to start: {e}");
            return;
        }
        let start = self.shared.clock.now();
        while self.shared.drivetrain.borrow().is_calibrating() {
            self.shared.clock.sleep(self.shared.config.control_period).await;
        }
        debug!(
            "heading calibrated in {} ms",
            (self.shared.clock.now() - start).as_millis()
        );
    }
}
