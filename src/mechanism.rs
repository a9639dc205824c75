//! Position hold for auxiliary mechanisms such as intakes and lifts.

use core::time::Duration;

#[cfg(not(test))]
use num_traits::Float;

use log::debug;

use crate::{
    error::DriveError,
    hal::{Clock, MotorGroup},
};

const MAX_MILLIVOLTS: f64 = 12_000.0;
const SPIN_PERIOD: Duration = Duration::from_millis(20);

/// Proportional controller with a static-friction feedforward, in motor degrees and millivolts.
pub struct PositionController<M> {
    group: M,
    kp: f64,
    kf: f64,
    margin: f64,
}

impl<M: MotorGroup> PositionController<M> {
    pub fn new(group: M, kp: f64) -> Self {
        Self {
            group,
            kp,
            kf: 15.0,
            margin: 10.0,
        }
    }

    pub fn with_feedforward(mut self, kf: f64) -> Self {
        self.kf = kf;
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn group(&self) -> &M {
        &self.group
    }

    pub fn group_mut(&mut self) -> &mut M {
        &mut self.group
    }

    pub fn output(&self, target: f64) -> Result<f64, DriveError> {
        let error = target - self.group.position()?;
        let mut millivolts = error * self.kp * 120.0;
        if millivolts > 0.0 {
            millivolts += self.kf;
        } else {
            millivolts -= self.kf;
        }
        Ok(millivolts.clamp(-MAX_MILLIVOLTS, MAX_MILLIVOLTS))
    }

    pub fn spin(&mut self, target: f64) -> Result<(), DriveError> {
        let millivolts = self.output(target)?;
        self.group.set_voltage(millivolts)
    }

    /// Drives toward `target` until within the margin, then stops the group.
    pub async fn spin_to<C: Clock>(&mut self, target: f64, clock: &C) -> Result<(), DriveError> {
        let start = clock.now();
        while (self.group.position()? - target).abs() > self.margin {
            self.spin(target)?;
            clock.sleep(SPIN_PERIOD).await;
        }
        self.group.stop()?;
        debug!(
            "mechanism reached {target} in {} ms",
            (clock.now() - start).as_millis()
        );
        Ok(())
    }
}
