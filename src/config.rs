use core::time::Duration;

use crate::{error::ConfigError, pid::Gains};

/// Tunables for a [`Chassis`](crate::Chassis).
///
/// Distances are in field tiles and angles in degrees; both are converted to encoder ticks
/// with the two `*_ticks_per_unit` factors. Speeds are percent (0 to 100).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DriveConfig {
    pub distance_ticks_per_unit: f64,
    pub degree_ticks_per_unit: f64,

    pub straight: Gains,
    pub turn: Gains,
    /// Speed per remaining profile tick of a trapezoidal arc.
    pub arc_kp: f64,

    pub accel_step: f64,
    /// Large enough to make braking effectively immediate.
    pub decel_step: f64,
    pub arc_step: f64,

    pub default_max_speed: f64,
    pub use_heading_sensor: bool,

    pub control_period: Duration,
    /// Length of one arc/S-curve profile tick.
    pub profile_period: Duration,
    pub settle_preroll: Duration,
    pub stable_threshold: f64,
    /// Settled once more than this many consecutive samples were stable.
    pub stable_samples: u32,

    /// Speed at which S-curve arc lengths are used unscaled.
    pub scurve_baseline_speed: f64,
    /// Profile ticks added to the final arc of an S-curve.
    pub scurve_final_offset: i32,
    /// Keep running an arc past its length until the robot stops moving.
    pub arc_settle_gate: bool,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            distance_ticks_per_unit: 545.0,
            degree_ticks_per_unit: 2.3,
            straight: Gains { kp: 0.3, kd: 0.5 },
            turn: Gains { kp: 0.8, kd: 3.0 },
            arc_kp: 2.0,
            accel_step: 8.0,
            decel_step: 200.0,
            arc_step: 2.0,
            default_max_speed: 100.0,
            use_heading_sensor: false,
            control_period: Duration::from_millis(20),
            profile_period: Duration::from_millis(10),
            settle_preroll: Duration::from_millis(450),
            stable_threshold: 3.0,
            stable_samples: 4,
            scurve_baseline_speed: 40.0,
            scurve_final_offset: 0,
            arc_settle_gate: false,
        }
    }
}

impl DriveConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("distance_ticks_per_unit", self.distance_ticks_per_unit),
            ("degree_ticks_per_unit", self.degree_ticks_per_unit),
            ("straight.kp", self.straight.kp),
            ("straight.kd", self.straight.kd),
            ("turn.kp", self.turn.kp),
            ("turn.kd", self.turn.kd),
            ("arc_kp", self.arc_kp),
            ("accel_step", self.accel_step),
            ("decel_step", self.decel_step),
            ("arc_step", self.arc_step),
            ("stable_threshold", self.stable_threshold),
            ("scurve_baseline_speed", self.scurve_baseline_speed),
        ];
        for (field, value) in positive {
            // also rejects NaN
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if !(self.default_max_speed > 0.0 && self.default_max_speed <= 100.0) {
            return Err(ConfigError::SpeedOutOfRange(self.default_max_speed));
        }
        let periods = [
            ("control_period", self.control_period),
            ("profile_period", self.profile_period),
        ];
        for (field, period) in periods {
            if period.is_zero() {
                return Err(ConfigError::ZeroPeriod(field));
            }
        }
        Ok(())
    }

    pub(crate) fn distance_to_ticks(&self, distance: f64) -> f64 {
        distance * self.distance_ticks_per_unit
    }

    pub(crate) fn angle_to_ticks(&self, angle: f64) -> f64 {
        angle * self.degree_ticks_per_unit
    }
}
