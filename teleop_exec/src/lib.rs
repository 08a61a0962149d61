//! # Teleoperation Library
//!
//! Library providing the modules used by the teleoperation executable. These
//! are exposed as a library so that the simulation executable can reuse the
//! drive control chain without going over a serial link.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod data_store;
pub mod drive_ctrl;
pub mod gamepad_client;
pub mod serial_client;
