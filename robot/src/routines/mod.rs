use alloc::{string::String, vec::Vec};
use core::time::Duration;

use hurricane_drive::{ArcProfile, BrakeMode};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::plan::{Action, Bend};

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
enum IRArcProfile {
    Trapezoidal,
    RampUp,
    RampDown,
}
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
enum IRBrake {
    Coast,
    Brake,
    Hold,
}
#[derive(Serialize, Deserialize, Debug, Clone)]
enum IRAction {
    Drive(f64, f64),
    DriveAsync(f64, f64),
    Turn(f64, f64),
    TurnAsync(f64, f64),
    Settle,
    FastDrive(f64, f64),
    TimeDrive(u64, f64, f64),
    VelocityDrive(u64, f64),
    Arc(bool, i32, f64, f64, IRArcProfile),
    SCurve(bool, i32, u32, i32, f64),
    Brake(IRBrake),
    Reset,
    SetSpeed(f64),
    Intake(f64),
    IntakeTo(f64),
    Wait(u64),
}
#[derive(Serialize, Deserialize, Debug, Clone)]
struct IRRoutine {
    name: String,
    actions: Vec<IRAction>,
}

include!(concat!(env!("OUT_DIR"), "/routines_index.rs"));

fn map_bend(right_inside: bool) -> Bend {
    if right_inside { Bend::Right } else { Bend::Left }
}

fn map_profile(p: IRArcProfile) -> ArcProfile {
    match p {
        IRArcProfile::Trapezoidal => ArcProfile::Trapezoidal,
        IRArcProfile::RampUp => ArcProfile::RampUp,
        IRArcProfile::RampDown => ArcProfile::RampDown,
    }
}

fn map_action(a: IRAction) -> Action {
    match a {
        IRAction::Drive(d, s) => Action::Drive(d, s),
        IRAction::DriveAsync(d, s) => Action::DriveAsync(d, s),
        IRAction::Turn(a, s) => Action::Turn(a, s),
        IRAction::TurnAsync(a, s) => Action::TurnAsync(a, s),
        IRAction::Settle => Action::Settle,
        IRAction::FastDrive(d, s) => Action::FastDrive(d, s),
        IRAction::TimeDrive(ms, l, r) => Action::TimeDrive(Duration::from_millis(ms), l, r),
        IRAction::VelocityDrive(ms, s) => Action::VelocityDrive(Duration::from_millis(ms), s),
        IRAction::Arc(side, length, radius, max, profile) => Action::Arc {
            bend: map_bend(side),
            length,
            radius,
            max,
            profile: map_profile(profile),
        },
        IRAction::SCurve(side, arc1, mid, arc2, max) => Action::SCurve {
            bend: map_bend(side),
            arc1,
            mid,
            arc2,
            max,
        },
        IRAction::Brake(b) => Action::Brake(match b {
            IRBrake::Coast => BrakeMode::Coast,
            IRBrake::Brake => BrakeMode::Brake,
            IRBrake::Hold => BrakeMode::Hold,
        }),
        IRAction::Reset => Action::Reset,
        IRAction::SetSpeed(s) => Action::SetSpeed(s),
        IRAction::Intake(p) => Action::Intake(p),
        IRAction::IntakeTo(deg) => Action::IntakeTo(deg),
        IRAction::Wait(ms) => Action::Wait(Duration::from_millis(ms)),
    }
}

pub fn load_all() -> Vec<(String, Vec<Action>)> {
    let mut out = Vec::new();
    for (name, bytes) in ROUTINE_BLOBS {
        match postcard::from_bytes::<IRRoutine>(bytes) {
            Ok(ir) => {
                let actions = ir.actions.into_iter().map(map_action).collect::<Vec<_>>();
                out.push((String::from(*name), actions));
            }
            Err(e) => warn!("routine {name} is corrupt: {e:?}"),
        }
    }
    out
}

pub fn list_names() -> Vec<String> {
    ROUTINE_BLOBS
        .iter()
        .map(|(name, _)| String::from(*name))
        .collect()
}
