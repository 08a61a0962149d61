//! Drive control state and top level processing.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::trace;
use serde::Serialize;

// Internal imports
use super::{DriveCtrlError, Params};
use comms_if::{eqpt::WheelCmd, input::InputFrame};
use util::{
    archive::{Archived, ArchiveError, Archiver},
    maths::clamp,
    module::State,
    params,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state.
#[derive(Default)]
pub struct DriveCtrl {
    pub params: Params,

    pub(super) report: StatusReport,

    pub(super) output: WheelCmd,

    arch_output: Archiver,
}

/// Report on the status of the last processing cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusReport {
    /// True if the left wheel demand was limited this cycle.
    pub left_clamped: bool,

    /// True if the right wheel demand was limited this cycle.
    pub right_clamped: bool,

    /// True if a crab turn override was active this cycle.
    pub crab_active: bool,

    /// True if the direction arbitration resolved to reverse this cycle.
    pub reverse_commanded: bool,
}

/// Flat record of one cycle's output, written to the session archive.
#[derive(Serialize)]
struct OutputRecord {
    time_s: f64,
    left_rpm: f64,
    right_rpm: f64,
    crab_active: bool,
    reverse_commanded: bool,
    left_clamped: bool,
    right_clamped: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for DriveCtrl {
    type InitData = &'static str;
    type InitError = DriveCtrlError;

    type InputData = InputFrame;
    type OutputData = WheelCmd;
    type StatusReport = StatusReport;
    type ProcError = DriveCtrlError;

    /// Initialise the drive control module.
    ///
    /// Expects the path to the module's parameter file relative to the
    /// software parameters directory.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), DriveCtrlError> {
        self.params = params::load(init_data)?;
        self.params.validate()?;

        self.arch_output = Archiver::from_path(session, "drive_ctrl_output.csv")?;

        Ok(())
    }

    /// Perform one cycle of drive control processing.
    ///
    /// Total over all input frames: every call produces a finite wheel
    /// command within the configured speed limit.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(WheelCmd, StatusReport), DriveCtrlError> {
        self.report = StatusReport::default();

        // The crab turn hat overrides the normal drive policy entirely
        let (crab_hat_x, _) = input_data.hat(self.params.input_map.crab_hat);

        let mut cmd = if crab_hat_x != 0 {
            self.report.crab_active = true;
            self.calc_crab_turn(crab_hat_x)
        } else {
            self.calc_drive(input_data)
        };

        self.enforce_limits(&mut cmd);

        trace!(
            "DriveCtrl output: L {:.2} rpm, R {:.2} rpm",
            cmd.left_rpm,
            cmd.right_rpm
        );

        self.output = cmd;

        Ok((cmd, self.report))
    }
}

impl DriveCtrl {
    /// Apply the motor polarity fix-up and the speed limit.
    ///
    /// The right channel's wiring inverts its sense of rotation, so the
    /// right demand is negated here, after all policy logic, to put the
    /// command into the wire convention. Both channels are then limited to
    /// the boosted maximum speed, and any non-finite demand is replaced with
    /// a stop on that channel.
    fn enforce_limits(&mut self, cmd: &mut WheelCmd) {
        cmd.right_rpm = -cmd.right_rpm;

        let limit_rpm = self.params.max_speed_rpm * self.params.boost_multiplier;

        if !cmd.left_rpm.is_finite() {
            cmd.left_rpm = 0.0;
            self.report.left_clamped = true;
        }
        if !cmd.right_rpm.is_finite() {
            cmd.right_rpm = 0.0;
            self.report.right_clamped = true;
        }

        let left_rpm = clamp(&cmd.left_rpm, &-limit_rpm, &limit_rpm);
        if left_rpm != cmd.left_rpm {
            self.report.left_clamped = true;
        }
        cmd.left_rpm = left_rpm;

        let right_rpm = clamp(&cmd.right_rpm, &-limit_rpm, &limit_rpm);
        if right_rpm != cmd.right_rpm {
            self.report.right_clamped = true;
        }
        cmd.right_rpm = right_rpm;
    }
}

impl Archived for DriveCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_output.serialise(OutputRecord {
            time_s: session::get_elapsed_seconds(),
            left_rpm: self.output.left_rpm,
            right_rpm: self.output.right_rpm,
            crab_active: self.report.crab_active,
            reverse_commanded: self.report.reverse_commanded,
            left_clamped: self.report.left_clamped,
            right_clamped: self.report.right_clamped,
        })
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// A drive control instance with default parameters and no archiver,
    /// processing does not touch the archive.
    fn drive_ctrl() -> DriveCtrl {
        DriveCtrl::default()
    }

    /// A frame with both triggers released, stick centred, nothing pressed.
    fn neutral_frame() -> InputFrame {
        InputFrame {
            axes: vec![0.0, 0.0, -1.0, 0.0, 0.0, -1.0],
            buttons: vec![false; 11],
            hats: vec![(0, 0)],
        }
    }

    #[test]
    fn test_neutral_frame_is_stop() {
        let mut dc = drive_ctrl();
        let (cmd, report) = dc.proc(&neutral_frame()).unwrap();

        // Released triggers demand min_speed_rpm = 0 on both sides
        assert_eq!(cmd, WheelCmd::stop());
        assert!(!report.crab_active);
    }

    #[test]
    fn test_full_forward() {
        let mut dc = drive_ctrl();

        let mut frame = neutral_frame();
        frame.axes[5] = 1.0;

        let (cmd, report) = dc.proc(&frame).unwrap();

        // Full forward trigger demands max speed on both wheels, the right
        // channel negated into the wire convention
        assert!((cmd.left_rpm - 60.0).abs() < 1e-9);
        assert!((cmd.right_rpm + 60.0).abs() < 1e-9);
        assert!(!report.reverse_commanded);
    }

    #[test]
    fn test_half_forward_is_linear() {
        let mut dc = drive_ctrl();

        let mut frame = neutral_frame();
        frame.axes[5] = 0.0;

        let (cmd, _) = dc.proc(&frame).unwrap();

        // Half pulled trigger (raw 0.0, normalised 0.5) maps to half speed
        assert!((cmd.left_rpm - 30.0).abs() < 1e-9);
        assert!((cmd.right_rpm + 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_reverse_wins_ties() {
        let mut dc = drive_ctrl();

        // Both triggers pulled to exactly the same level
        let mut frame = neutral_frame();
        frame.axes[5] = 0.5;
        frame.axes[2] = 0.5;

        let (cmd, report) = dc.proc(&frame).unwrap();

        assert!(report.reverse_commanded);
        assert!(cmd.left_rpm < 0.0);
        assert!(cmd.right_rpm > 0.0);
    }

    #[test]
    fn test_stronger_forward_wins() {
        let mut dc = drive_ctrl();

        let mut frame = neutral_frame();
        frame.axes[5] = 0.6;
        frame.axes[2] = 0.5;

        let (cmd, report) = dc.proc(&frame).unwrap();

        assert!(!report.reverse_commanded);
        assert!(cmd.left_rpm > 0.0);
    }

    #[test]
    fn test_steering_damps_deflected_side_only() {
        let mut dc = drive_ctrl();

        // Full forward with the stick half deflected right
        let mut frame = neutral_frame();
        frame.axes[5] = 1.0;
        frame.axes[0] = 0.5;

        let (cmd, _) = dc.proc(&frame).unwrap();

        // Right deflection damps the right wheel, damped = 60 * (1 - 0.5*0.5)
        assert!((cmd.left_rpm - 60.0).abs() < 1e-9);
        assert!((cmd.right_rpm + 45.0).abs() < 1e-9);

        // Mirror: left deflection damps the left wheel
        frame.axes[0] = -0.5;
        let (cmd, _) = dc.proc(&frame).unwrap();
        assert!((cmd.left_rpm - 45.0).abs() < 1e-9);
        assert!((cmd.right_rpm + 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_steering_deadzone_gives_straight_drive() {
        let mut dc = drive_ctrl();

        // Stick drift inside the deadzone (|0.05| <= 0.1)
        let mut frame = neutral_frame();
        frame.axes[5] = 1.0;
        frame.axes[0] = 0.05;

        let (cmd, _) = dc.proc(&frame).unwrap();

        assert_eq!(cmd.left_rpm, -cmd.right_rpm);
        assert!((cmd.left_rpm - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_boost_scales_speed() {
        let mut dc = drive_ctrl();

        let mut frame = neutral_frame();
        frame.axes[5] = 0.0;
        frame.buttons[0] = true;

        let (cmd, _) = dc.proc(&frame).unwrap();

        // Half speed (30 rpm) boosted by 1.5
        assert!((cmd.left_rpm - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_boosted_full_speed_within_limit() {
        let mut dc = drive_ctrl();

        let mut frame = neutral_frame();
        frame.axes[5] = 1.0;
        frame.buttons[0] = true;

        let (cmd, report) = dc.proc(&frame).unwrap();

        // The limit is max * boost, so a boosted full pull sits exactly on
        // it and is not flagged as clamped
        assert!((cmd.left_rpm - 90.0).abs() < 1e-9);
        assert!(!report.left_clamped);
        assert!(!report.right_clamped);
    }

    #[test]
    fn test_boost_at_zero_speed_is_zero() {
        let mut dc = drive_ctrl();

        // Released triggers demand zero, boost must not conjure speed
        let mut frame = neutral_frame();
        frame.buttons[0] = true;

        let (cmd, _) = dc.proc(&frame).unwrap();
        assert_eq!(cmd, WheelCmd::stop());
    }

    #[test]
    fn test_over_limit_crab_speed_is_clamped() {
        let mut dc = drive_ctrl();
        dc.params.crab_turn_speed_rpm = 200.0;

        let mut frame = neutral_frame();
        frame.hats[0] = (1, 0);

        let (cmd, report) = dc.proc(&frame).unwrap();

        // Limit is max_speed_rpm * boost_multiplier = 90
        assert!((cmd.left_rpm - 90.0).abs() < 1e-9);
        assert!((cmd.right_rpm - 90.0).abs() < 1e-9);
        assert!(report.left_clamped);
        assert!(report.right_clamped);
    }

    #[test]
    fn test_crab_turn_overrides_drive() {
        let mut dc = drive_ctrl();

        // Full forward and boost held, but the hat wins
        let mut frame = neutral_frame();
        frame.axes[5] = 1.0;
        frame.buttons[0] = true;
        frame.hats[0] = (1, 0);

        let (cmd, report) = dc.proc(&frame).unwrap();
        assert!(report.crab_active);

        // Counter-rotation at the fixed crab speed. In the wire convention
        // the negated right channel makes both fields equal.
        assert!((cmd.left_rpm - 30.0).abs() < 1e-9);
        assert!((cmd.right_rpm - 30.0).abs() < 1e-9);

        // Mirror for the opposite hat direction
        frame.hats[0] = (-1, 0);
        let (cmd, _) = dc.proc(&frame).unwrap();
        assert!((cmd.left_rpm + 30.0).abs() < 1e-9);
        assert!((cmd.right_rpm + 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_output_always_finite() {
        let mut dc = drive_ctrl();

        // A malformed frame with non-finite axes must still produce a
        // usable command
        let frame = InputFrame {
            axes: vec![f64::NAN, 0.0, f64::INFINITY, 0.0, 0.0, f64::NEG_INFINITY],
            buttons: vec![true; 11],
            hats: vec![(0, 0)],
        };

        let (cmd, _) = dc.proc(&frame).unwrap();
        assert!(cmd.is_finite());
    }

    #[test]
    fn test_empty_frame_is_processed() {
        let mut dc = drive_ctrl();

        // A frame from a device with no channels at all reads as neutral
        let (cmd, _) = dc.proc(&InputFrame::default()).unwrap();

        // Neutral axis 0.0 on the forward trigger normalises to a half pull
        assert!(cmd.is_finite());
        assert!((cmd.left_rpm - 30.0).abs() < 1e-9);
    }
}
