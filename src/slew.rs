#[cfg(not(test))]
use num_traits::Float;

use crate::config::DriveConfig;

/// Which acceleration limit applies to a slewed command.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SlewProfile {
    /// Closed-loop straight and turn moves.
    Move,
    /// Arc and S-curve profiles.
    Arc,
}

/// Bounds the change of the commanded speed per invocation.
///
/// Moving away from zero is acceleration and uses the profile's step; moving toward zero uses
/// the deceleration step. The last output persists between unrelated commands.
#[derive(Copy, Clone, Debug)]
pub struct SlewLimiter {
    accel_step: f64,
    decel_step: f64,
    arc_step: f64,
    last: f64,
}

impl SlewLimiter {
    pub fn new(config: &DriveConfig) -> Self {
        Self {
            accel_step: config.accel_step,
            decel_step: config.decel_step,
            arc_step: config.arc_step,
            last: 0.0,
        }
    }

    pub fn last(&self) -> f64 {
        self.last
    }

    /// Overwrites the last commanded speed, for commands that bypass the limiter.
    pub fn prime(&mut self, speed: f64) {
        self.last = speed;
    }

    pub fn step(&self, desired: f64, profile: SlewProfile) -> f64 {
        if desired.abs() > self.last.abs() {
            match profile {
                SlewProfile::Move => self.accel_step,
                SlewProfile::Arc => self.arc_step,
            }
        } else {
            self.decel_step
        }
    }

    pub fn limit(&mut self, desired: f64, profile: SlewProfile) -> f64 {
        let step = self.step(desired, profile);
        let commanded = if desired > self.last + step {
            self.last + step
        } else if desired < self.last - step {
            self.last - step
        } else {
            desired
        };
        self.last = commanded;
        commanded
    }
}
