use crate::{
    chassis::Chassis,
    hal::{Clock, Drivetrain, Output},
    state::clamp_command,
};

impl<D: Drivetrain, C: Clock> Chassis<D, C> {
    /// Passes stick values straight to each side, in percent.
    pub fn tank(&self, left: f64, right: f64) {
        self.seize();
        self.write_both(
            Output::Voltage(clamp_command(left)),
            Output::Voltage(clamp_command(right)),
        );
    }

    /// Single-stick mixing: positive `turn` swings the robot clockwise.
    pub fn arcade(&self, forward: f64, turn: f64) {
        let forward = clamp_command(forward);
        let turn = clamp_command(turn);
        self.tank(forward + turn, forward - turn);
    }
}
