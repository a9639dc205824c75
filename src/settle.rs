#[cfg(not(test))]
use num_traits::Float;

use crate::config::DriveConfig;

/// Declares a move finished once the robot has stopped moving for several samples in a row.
///
/// A stall looks the same as an arrival.
#[derive(Copy, Clone, Debug)]
pub struct SettlingDetector {
    threshold: f64,
    samples: u32,
    last_position: f64,
    last_target: f64,
    stable_count: u32,
}

impl SettlingDetector {
    pub fn new(config: &DriveConfig) -> Self {
        Self {
            threshold: config.stable_threshold,
            samples: config.stable_samples,
            last_position: 0.0,
            last_target: 0.0,
            stable_count: 0,
        }
    }

    pub fn stable_count(&self) -> u32 {
        self.stable_count
    }

    pub fn reset(&mut self) {
        self.stable_count = 0;
    }

    pub fn check_settled(&mut self, position: f64, target: f64) -> bool {
        if (position - self.last_position).abs() < self.threshold {
            self.stable_count += 1;
        } else {
            self.stable_count = 0;
        }
        if target != self.last_target {
            self.stable_count = 0;
        }
        self.last_position = position;
        self.last_target = target;
        self.stable_count > self.samples
    }
}
