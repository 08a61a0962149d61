//! # Drive Equipment Commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demand sent to the vehicle's motor controller once per cycle.
///
/// Speeds are signed revolutions per minute in the wire convention expected
/// by the vehicle: the right channel's sign is inverted by the wiring, so the
/// mapper negates that channel before emitting the command (see
/// `drive_ctrl`). Speeds are always finite.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct WheelCmd {
    /// Demanded left wheel speed.
    ///
    /// Units: revolutions/minute
    pub left_rpm: f64,

    /// Demanded right wheel speed.
    ///
    /// Units: revolutions/minute
    pub right_rpm: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible errors when parsing a wheel command from its wire format.
#[derive(Debug, Error)]
pub enum WheelCmdParseError {
    #[error("Expected a STEP command, found {0:?}")]
    NotAStepCommand(String),

    #[error("STEP command is missing the {0} speed field")]
    MissingField(&'static str),

    #[error("STEP command contains an invalid speed: {0}")]
    InvalidSpeed(std::num::ParseFloatError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl WheelCmd {
    pub fn new(left_rpm: f64, right_rpm: f64) -> Self {
        Self {
            left_rpm,
            right_rpm,
        }
    }

    /// A command which brings both wheels to rest.
    pub fn stop() -> Self {
        Self::new(0.0, 0.0)
    }

    /// True if both speeds are finite (no NaN or infinity).
    pub fn is_finite(&self) -> bool {
        self.left_rpm.is_finite() && self.right_rpm.is_finite()
    }

    /// Format this command as the line sent over the serial link.
    ///
    /// The vehicle expects one newline-terminated ASCII command per cycle of
    /// the form `STEP R<right> L<left>\n`, speeds to two decimal places.
    pub fn to_step_line(&self) -> String {
        format!("STEP R{:.2} L{:.2}\n", self.right_rpm, self.left_rpm)
    }

    /// Parse a command from its wire format.
    ///
    /// Provided for the mock vehicle used in tests, the vehicle firmware
    /// itself is not part of this software.
    pub fn from_step_line(line: &str) -> Result<Self, WheelCmdParseError> {
        let mut parts = line.trim_end().split_whitespace();

        match parts.next() {
            Some("STEP") => (),
            _ => return Err(WheelCmdParseError::NotAStepCommand(line.to_string())),
        }

        let right_rpm = parse_speed_field(parts.next(), "R", "right")?;
        let left_rpm = parse_speed_field(parts.next(), "L", "left")?;

        Ok(Self {
            left_rpm,
            right_rpm,
        })
    }
}

impl Default for WheelCmd {
    fn default() -> Self {
        Self::stop()
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn parse_speed_field(
    field: Option<&str>,
    prefix: &str,
    name: &'static str,
) -> Result<f64, WheelCmdParseError> {
    let raw = field
        .and_then(|f| f.strip_prefix(prefix))
        .ok_or(WheelCmdParseError::MissingField(name))?;

    raw.parse().map_err(WheelCmdParseError::InvalidSpeed)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_step_line_format() {
        // Two decimal places, right before left, newline terminated
        let cmd = WheelCmd::new(12.345, -6.0);
        assert_eq!(cmd.to_step_line(), "STEP R-6.00 L12.35\n");

        assert_eq!(WheelCmd::stop().to_step_line(), "STEP R0.00 L0.00\n");
    }

    #[test]
    fn test_step_line_parse() {
        let cmd = WheelCmd::from_step_line("STEP R-6.00 L12.35\n").unwrap();
        assert_eq!(cmd.right_rpm, -6.0);
        assert_eq!(cmd.left_rpm, 12.35);
    }

    #[test]
    fn test_step_line_parse_errors() {
        assert!(matches!(
            WheelCmd::from_step_line("PING\n"),
            Err(WheelCmdParseError::NotAStepCommand(_))
        ));
        assert!(matches!(
            WheelCmd::from_step_line("STEP R1.00\n"),
            Err(WheelCmdParseError::MissingField("left"))
        ));
        assert!(matches!(
            WheelCmd::from_step_line("STEP Rfast L0.00\n"),
            Err(WheelCmdParseError::InvalidSpeed(_))
        ));
    }
}
