//! # Communications interface crate.
//!
//! Provides the common interface types which cross process boundaries: the
//! wheel command sent to the vehicle and the raw input device state read from
//! the operator's controller.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command definitions for equipment (the vehicle's drive motors)
pub mod eqpt;

/// Input device frames and named input mappings
pub mod input;
