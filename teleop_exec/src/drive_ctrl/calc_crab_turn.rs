//! Crab turn (turn on the spot) calculations.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::state::DriveCtrl;
use comms_if::eqpt::WheelCmd;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveCtrl {
    /// Calculate the wheel demands for a crab turn.
    ///
    /// Both wheels run at the fixed crab turn speed with opposite signs so
    /// that the vehicle rotates on the spot. Hat deflection to the left
    /// turns left (left wheel backwards), deflection to the right turns
    /// right. Trigger, boost and steering inputs are ignored while the hat
    /// is deflected.
    pub(super) fn calc_crab_turn(&mut self, hat_x: i8) -> WheelCmd {
        let speed_rpm = self.params.crab_turn_speed_rpm;

        if hat_x < 0 {
            WheelCmd::new(-speed_rpm, speed_rpm)
        } else {
            WheelCmd::new(speed_rpm, -speed_rpm)
        }
    }
}
