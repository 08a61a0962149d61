//! # Drive Control Module
//!
//! The drive control module (`drive_ctrl`) converts gamepad input frames into
//! wheel speed commands for the vehicle. The control policy is:
//!
//! 1. Right and left analogue triggers demand forward and reverse speed
//!    respectively, the stronger pull winning the arbitration.
//! 2. The boost button scales the demanded speed up.
//! 3. Left stick deflection slows the wheel on the deflected side down,
//!    turning the vehicle towards that side.
//! 4. D-pad left/right overrides everything with a fixed-rate turn on the
//!    spot ("crab turn").
//!
//! The module follows the standard `init`/`proc` pattern defined by
//! [`util::module::State`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_crab_turn;
mod calc_drive;
mod params;
mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use params::Params;
pub use state::{DriveCtrl, StatusReport};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur in the drive control module.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("Could not load the drive control parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Drive control parameters are malformed: {0}")]
    MalformedParams(String),

    #[error("Could not initialise the output archiver: {0}")]
    ArchInitError(#[from] util::archive::ArchiveError),
}
