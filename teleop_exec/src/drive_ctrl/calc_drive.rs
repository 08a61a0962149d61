//! Normal drive policy calculations.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::state::DriveCtrl;
use comms_if::{eqpt::WheelCmd, input::InputFrame};
use util::maths::{apply_deadzone, lin_map};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveCtrl {
    /// Calculate the wheel demands for the normal drive policy.
    ///
    /// Demands are produced in the straight-ahead convention, positive
    /// meaning forward on both sides. The polarity fix-up into the wire
    /// convention happens later in `enforce_limits`.
    pub(super) fn calc_drive(&mut self, frame: &InputFrame) -> WheelCmd {
        let input_map = self.params.input_map;

        // Triggers rest at -1.0, normalise into [0, 1] and scale into the
        // configured speed range
        let forward_rpm = self.trigger_to_rpm(frame.axis(input_map.forward_axis));
        let reverse_rpm = self.trigger_to_rpm(frame.axis(input_map.reverse_axis));

        // Direction arbitration, the stronger pull wins. Forward must be
        // strictly greater, a tie resolves to reverse.
        let mut total_rpm = if forward_rpm > reverse_rpm {
            forward_rpm
        } else {
            self.report.reverse_commanded = true;
            -reverse_rpm
        };

        if frame.button(input_map.boost_button) {
            total_rpm *= self.params.boost_multiplier;
        }

        // Steering slows the wheel on the deflected side down, pivoting the
        // vehicle towards that side. The other wheel keeps the full demand.
        let steering = apply_deadzone(
            frame.axis(input_map.steering_axis),
            self.params.steering_deadzone,
        );
        let damped_rpm = total_rpm * (1.0 - steering.abs() * self.params.turn_damping_coeff);

        if steering < 0.0 {
            WheelCmd::new(damped_rpm, total_rpm)
        } else if steering > 0.0 {
            WheelCmd::new(total_rpm, damped_rpm)
        } else {
            WheelCmd::new(total_rpm, total_rpm)
        }
    }

    /// Map a raw trigger value in [-1, 1] to a speed demand in RPM.
    fn trigger_to_rpm(&self, raw: f64) -> f64 {
        let normalised = (raw + 1.0) / 2.0;

        lin_map(
            (0.0, 1.0),
            (self.params.min_speed_rpm, self.params.max_speed_rpm),
            normalised,
        )
    }
}
