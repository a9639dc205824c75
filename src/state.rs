use crate::{config::DriveConfig, pid::Pid, settle::SettlingDetector, slew::SlewLimiter};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Nothing commanded yet; the control loop leaves the motors alone.
    #[default]
    Idle,
    Straight,
    Turn,
    /// A foreground routine owns the motors; the control loop leaves them alone.
    Manual,
}

impl Mode {
    pub fn is_closed_loop(self) -> bool {
        matches!(self, Mode::Straight | Mode::Turn)
    }
}

/// The command register read by the control loop every tick.
///
/// Always written as a whole value, so the last command issued wins completely.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MotionState {
    pub mode: Mode,
    pub target_ticks: f64,
    pub max_speed: f64,
}

/// Everything shared between the control loop and foreground commands.
#[derive(Debug)]
pub(crate) struct ControlState {
    pub motion: MotionState,
    pub pid: Pid,
    pub slew: SlewLimiter,
    pub settle: SettlingDetector,
    pub settled: bool,
}

impl ControlState {
    pub fn new(config: &DriveConfig) -> Self {
        Self {
            motion: MotionState {
                mode: Mode::Idle,
                target_ticks: 0.0,
                max_speed: config.default_max_speed,
            },
            pid: Pid::new(),
            slew: SlewLimiter::new(config),
            settle: SettlingDetector::new(config),
            settled: false,
        }
    }

    /// Hands the motors to a foreground routine.
    pub fn seize(&mut self) {
        self.motion = MotionState {
            mode: Mode::Manual,
            ..self.motion
        };
    }
}

/// Limits a speed cap to 0..=100; NaN becomes 0.
pub(crate) fn clamp_speed(speed: f64) -> f64 {
    if speed.is_nan() { 0.0 } else { speed.clamp(0.0, 100.0) }
}

/// Limits a signed command to -100..=100; NaN becomes 0.
pub(crate) fn clamp_command(speed: f64) -> f64 {
    if speed.is_nan() { 0.0 } else { speed.clamp(-100.0, 100.0) }
}
