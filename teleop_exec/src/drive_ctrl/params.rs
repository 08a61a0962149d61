//! Parameters for the drive control module.
//!
//! Loaded from `drive_ctrl.toml` in the software parameters directory.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::input::InputMap;
use serde::Deserialize;

use super::DriveCtrlError;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    // -----------------------------------------------------------------------
    // SPEED POLICY
    // -----------------------------------------------------------------------
    /// Wheel speed demanded by a fully released trigger, in RPM.
    pub min_speed_rpm: f64,

    /// Wheel speed demanded by a fully pulled trigger, in RPM.
    pub max_speed_rpm: f64,

    /// Half-width of the steering stick deadzone, in normalised stick units.
    pub steering_deadzone: f64,

    /// Fraction of total speed removed from the inner wheel at full stick
    /// deflection.
    pub turn_damping_coeff: f64,

    /// Speed multiplier applied while the boost button is held.
    pub boost_multiplier: f64,

    /// Fixed wheel speed magnitude used during a crab turn, in RPM.
    pub crab_turn_speed_rpm: f64,

    // -----------------------------------------------------------------------
    // INPUT MAPPING
    // -----------------------------------------------------------------------
    /// Mapping from control functions to gamepad channel indices.
    pub input_map: InputMap,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check the loaded parameters for consistency.
    pub fn validate(&self) -> Result<(), DriveCtrlError> {
        let finite = [
            self.min_speed_rpm,
            self.max_speed_rpm,
            self.steering_deadzone,
            self.turn_damping_coeff,
            self.boost_multiplier,
            self.crab_turn_speed_rpm,
        ]
        .iter()
        .all(|p| p.is_finite());

        if !finite {
            return Err(DriveCtrlError::MalformedParams(String::from(
                "all parameters must be finite",
            )));
        }

        if self.min_speed_rpm > self.max_speed_rpm {
            return Err(DriveCtrlError::MalformedParams(format!(
                "min_speed_rpm ({}) is greater than max_speed_rpm ({})",
                self.min_speed_rpm, self.max_speed_rpm
            )));
        }

        if self.steering_deadzone < 0.0 || self.steering_deadzone >= 1.0 {
            return Err(DriveCtrlError::MalformedParams(format!(
                "steering_deadzone ({}) must be in [0, 1)",
                self.steering_deadzone
            )));
        }

        if self.turn_damping_coeff < 0.0 || self.turn_damping_coeff > 1.0 {
            return Err(DriveCtrlError::MalformedParams(format!(
                "turn_damping_coeff ({}) must be in [0, 1]",
                self.turn_damping_coeff
            )));
        }

        if self.boost_multiplier < 1.0 {
            return Err(DriveCtrlError::MalformedParams(format!(
                "boost_multiplier ({}) must be at least 1",
                self.boost_multiplier
            )));
        }

        if self.crab_turn_speed_rpm < 0.0 {
            return Err(DriveCtrlError::MalformedParams(format!(
                "crab_turn_speed_rpm ({}) must not be negative",
                self.crab_turn_speed_rpm
            )));
        }

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            min_speed_rpm: 0.0,
            max_speed_rpm: 60.0,
            steering_deadzone: 0.1,
            turn_damping_coeff: 0.5,
            boost_multiplier: 1.5,
            crab_turn_speed_rpm: 30.0,
            input_map: InputMap::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_valid() {
        Params::default()
            .validate()
            .expect("Default parameters shall be valid");
    }

    #[test]
    fn test_shipped_param_files_valid() {
        // Teleoperation drives the real vehicle over 0-60 RPM, the
        // simulation uses the wider 0-100 RPM range
        for &(file, max_speed_rpm) in &[("drive_ctrl.toml", 60.0), ("drive_ctrl_sim.toml", 100.0)]
        {
            let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
                .join("../params")
                .join(file);
            let params: Params =
                toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

            params.validate().unwrap();
            assert_eq!(params.max_speed_rpm, max_speed_rpm, "{}", file);
        }
    }

    #[test]
    fn test_inverted_speed_range_rejected() {
        let params = Params {
            min_speed_rpm: 10.0,
            max_speed_rpm: 5.0,
            ..Default::default()
        };

        assert!(matches!(
            params.validate(),
            Err(DriveCtrlError::MalformedParams(_))
        ));
    }

    #[test]
    fn test_non_finite_params_rejected() {
        let params = Params {
            turn_damping_coeff: f64::NAN,
            ..Default::default()
        };

        assert!(matches!(
            params.validate(),
            Err(DriveCtrlError::MalformedParams(_))
        ));
    }
}
