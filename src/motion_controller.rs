#[cfg(not(test))]
use num_traits::Float;

use log::{debug, warn};

use crate::{
    chassis::Chassis,
    hal::{Clock, Drivetrain, Output},
    state::clamp_speed,
};

/// Speed shape of an arc over its profile ticks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArcProfile {
    /// Outer side at the cap, falling off proportionally to the ticks left; inner side at a fixed
    /// ratio of the outer.
    Trapezoidal,
    /// Outer side at the cap; inner side grows from zero. Entry segment of an S-curve.
    RampUp,
    /// Outer side at the cap; inner side shrinks to zero. Exit segment of an S-curve.
    RampDown,
}

impl ArcProfile {
    /// Outer side speed before slewing, for tick `t` of `n`.
    pub fn outer_target(self, t: u32, n: u32, arc_kp: f64, max: f64) -> f64 {
        match self {
            ArcProfile::Trapezoidal => {
                let remaining = (f64::from(n) - f64::from(t)) * arc_kp;
                remaining.min(max).max(0.0)
            }
            ArcProfile::RampUp | ArcProfile::RampDown => max,
        }
    }

    /// Inner side speed as a fraction of the outer side.
    pub fn inner_scale(self, t: u32, n: u32, radius_ratio: f64) -> f64 {
        let progress = if n == 0 {
            1.0
        } else {
            (f64::from(t) / f64::from(n)).clamp(0.0, 1.0)
        };
        match self {
            ArcProfile::Trapezoidal => radius_ratio,
            ArcProfile::RampUp => radius_ratio * progress,
            ArcProfile::RampDown => radius_ratio * (1.0 - progress),
        }
    }

    /// Whether the motors are left running for a following segment.
    pub fn continues(self) -> bool {
        self == ArcProfile::RampUp
    }
}

impl<D: Drivetrain, C: Clock> Chassis<D, C> {
    /// Arcs with the left side on the inside of the curve.
    ///
    /// `length` counts profile ticks; negative lengths drive the arc backwards.
    pub async fn arc_left(
        &self,
        length: i32,
        radius_ratio: f64,
        max_speed: f64,
        profile: ArcProfile,
    ) {
        self.arc(false, length, radius_ratio, max_speed, profile).await;
    }

    /// Arcs with the right side on the inside of the curve.
    pub async fn arc_right(
        &self,
        length: i32,
        radius_ratio: f64,
        max_speed: f64,
        profile: ArcProfile,
    ) {
        self.arc(true, length, radius_ratio, max_speed, profile).await;
    }

    async fn arc(
        &self,
        mirror: bool,
        length: i32,
        radius_ratio: f64,
        max_speed: f64,
        profile: ArcProfile,
    ) {
        let reversed = length < 0;
        let n = length.unsigned_abs();
        let max_speed = clamp_speed(max_speed);
        let gated = self.config().arc_settle_gate && profile == ArcProfile::Trapezoidal;
        debug!("arc {profile:?} over {length} ticks at {max_speed}, mirror {mirror}");

        self.seize();
        if gated {
            self.arm_settle();
        }

        let mut t = 0;
        while t < n || (gated && self.is_driving()) {
            let target = profile.outer_target(t, n, self.config().arc_kp, max_speed);
            let mut outer = self.slew_arc(target);
            let mut inner = outer * profile.inner_scale(t, n, radius_ratio);
            if reversed {
                outer = -outer;
                inner = -inner;
            }
            let (left, right) = if mirror { (outer, inner) } else { (inner, outer) };
            self.write_both(Output::Voltage(left), Output::Voltage(right));

            self.clock().sleep(self.config().profile_period).await;
            t += 1;
        }

        if !profile.continues() {
            self.stop_both();
        }
    }

    /// S-curve that bends left first, then right.
    pub async fn s_left(&self, arc1: i32, mid: u32, arc2: i32, max_speed: f64) {
        self.s_curve(false, arc1, mid, arc2, max_speed).await;
    }

    /// S-curve that bends right first, then left.
    pub async fn s_right(&self, arc1: i32, mid: u32, arc2: i32, max_speed: f64) {
        self.s_curve(true, arc1, mid, arc2, max_speed).await;
    }

    /// Ramp-up arc, straight hold at `max_speed` for `mid` profile ticks, then a ramp-down arc
    /// the other way.
    ///
    /// Arc lengths are tuned at the baseline speed and scaled down for faster runs so the swept
    /// angle stays roughly the same.
    async fn s_curve(&self, mirror: bool, arc1: i32, mid: u32, arc2: i32, max_speed: f64) {
        if !(max_speed > 0.0) {
            warn!("s-curve ignored, max speed {max_speed} is not positive");
            return;
        }
        let max_speed = clamp_speed(max_speed);
        let scale = self.config().scurve_baseline_speed / max_speed;
        let first = scale_ticks(arc1, scale);
        let offset = if arc2 < 0 {
            -self.config().scurve_final_offset
        } else {
            self.config().scurve_final_offset
        };
        let last = scale_ticks(arc2, scale) + offset;
        debug!("s-curve {first} / {mid} / {last} ticks at {max_speed}");

        self.arc(mirror, first, 1.0, max_speed, ArcProfile::RampUp)
            .await;
        let hold = if arc1 < 0 { -max_speed } else { max_speed };
        self.velocity_drive(self.config().profile_period * mid, hold)
            .await;
        self.arc(!mirror, last, 1.0, max_speed, ArcProfile::RampDown)
            .await;
    }
}

fn scale_ticks(length: i32, scale: f64) -> i32 {
    (f64::from(length) * scale).round() as i32
}
