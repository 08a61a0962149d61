//! # Data Store
//!
//! Central data store for the teleoperation executable. All data is passed
//! between modules through here, avoiding direct links between modules.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use crate::drive_ctrl;
use comms_if::{eqpt::WheelCmd, input::InputFrame};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the teleoperation executable.
#[derive(Default)]
pub struct DataStore {
    // -----------------------------------------------------------------------
    // CYCLE MANAGEMENT
    // -----------------------------------------------------------------------
    /// Number of cycles already executed
    pub num_cycles: u64,

    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of consecutive command send failures
    pub num_consec_send_errors: u64,

    // -----------------------------------------------------------------------
    // DRIVE CONTROL
    // -----------------------------------------------------------------------
    pub drive_ctrl: drive_ctrl::DriveCtrl,
    pub drive_ctrl_input: InputFrame,
    pub drive_ctrl_output: WheelCmd,
    pub drive_ctrl_status_rpt: drive_ctrl::StatusReport,
}
