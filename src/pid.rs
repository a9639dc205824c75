#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Gains {
    pub kp: f64,
    pub kd: f64,
}

/// Proportional-derivative law over a fixed sample period.
///
/// The derivative is the raw error difference between consecutive samples, so the gains are
/// tuned per control period rather than per second. One `Pid` is shared by every closed-loop
/// mode, and switching modes keeps the last error: the first sample of a new move
/// differentiates against the previous move's final error.
#[derive(Copy, Clone, Debug, Default)]
pub struct Pid {
    prev_error: f64,
}

impl Pid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prev_error(&self) -> f64 {
        self.prev_error
    }

    /// Raw output for `error`, limited to `±max`.
    pub fn next(&mut self, error: f64, gains: Gains, max: f64) -> f64 {
        let derivative = error - self.prev_error;
        self.prev_error = error;
        (error * gains.kp + derivative * gains.kd).clamp(-max, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAINS: Gains = Gains { kp: 0.3, kd: 0.5 };

    fn expected(target: f64, sensor: f64, prev: f64, gains: Gains, max: f64) -> f64 {
        let error = target - sensor;
        (error * gains.kp + (error - prev) * gains.kd).clamp(-max, max)
    }

    #[test]
    fn matches_pd_law_across_inputs() {
        let targets = [-1090.0, -40.0, 0.0, 12.5, 545.0];
        let sensors = [-300.0, 0.0, 7.0, 544.0];
        let prevs = [-20.0, 0.0, 3.0, 600.0];
        let maxes = [0.0, 35.0, 100.0];
        let gain_sets = [GAINS, Gains { kp: 0.8, kd: 3.0 }];
        for &target in &targets {
            for &sensor in &sensors {
                for &prev in &prevs {
                    for &max in &maxes {
                        for gains in gain_sets {
                            let mut pid = Pid { prev_error: prev };
                            let out = pid.next(target - sensor, gains, max);
                            assert_eq!(out, expected(target, sensor, prev, gains, max));
                            assert_eq!(pid.prev_error(), target - sensor);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn first_sample_differentiates_against_zero() {
        let mut pid = Pid::new();
        // 10*0.3 + 10*0.5
        assert_eq!(pid.next(10.0, GAINS, 100.0), 8.0);
        // 10*0.3 + 0
        assert_eq!(pid.next(10.0, GAINS, 100.0), 3.0);
    }

    #[test]
    fn stale_error_carries_into_next_move() {
        let mut pid = Pid::new();
        pid.next(-30.0, GAINS, 100.0);
        let out = pid.next(200.0, Gains { kp: 0.8, kd: 3.0 }, 100.0);
        // 200*0.8 + 230*3 saturates
        assert_eq!(out, 100.0);
    }
}
