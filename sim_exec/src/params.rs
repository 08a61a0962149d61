//! Parameters for the simulation executable.
//!
//! Loaded from `sim_exec.toml` in the software parameters directory.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SimParams {
    // -----------------------------------------------------------------------
    // VEHICLE GEOMETRY
    // -----------------------------------------------------------------------
    /// Distance between the wheel contact points.
    ///
    /// Units: meters
    pub track_width_m: f64,

    /// Radius of each wheel.
    ///
    /// Units: meters
    pub wheel_radius_m: f64,

    // -----------------------------------------------------------------------
    // INTEGRATION
    // -----------------------------------------------------------------------
    /// Simulation timestep.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// Number of timesteps to run before stopping.
    pub num_steps: u64,

    /// Number of timesteps between trajectory outputs.
    pub output_decimation: u64,

    /// Time subtracted from each real-time sleep to cover loop overheads.
    ///
    /// Units: seconds
    pub overhead_budget_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur in the simulation executable.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Could not load the simulation parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Simulation parameters are malformed: {0}")]
    MalformedParams(String),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load and validate the simulation parameters.
pub fn load() -> Result<SimParams, SimError> {
    let params: SimParams = util::params::load("sim_exec.toml")?;
    params.validate()?;

    Ok(params)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimParams {
    /// Check the loaded parameters for consistency.
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.track_width_m.is_finite() && self.track_width_m > 0.0) {
            return Err(SimError::MalformedParams(format!(
                "track_width_m ({}) must be positive and finite",
                self.track_width_m
            )));
        }

        if !(self.wheel_radius_m.is_finite() && self.wheel_radius_m > 0.0) {
            return Err(SimError::MalformedParams(format!(
                "wheel_radius_m ({}) must be positive and finite",
                self.wheel_radius_m
            )));
        }

        if !(self.dt_s.is_finite() && self.dt_s > 0.0) {
            return Err(SimError::MalformedParams(format!(
                "dt_s ({}) must be positive and finite",
                self.dt_s
            )));
        }

        if self.num_steps == 0 {
            return Err(SimError::MalformedParams(String::from(
                "num_steps must be at least 1",
            )));
        }

        if self.output_decimation == 0 {
            return Err(SimError::MalformedParams(String::from(
                "output_decimation must be at least 1",
            )));
        }

        if !(self.overhead_budget_s.is_finite() && self.overhead_budget_s >= 0.0) {
            return Err(SimError::MalformedParams(format!(
                "overhead_budget_s ({}) must not be negative",
                self.overhead_budget_s
            )));
        }

        Ok(())
    }
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            track_width_m: 0.508,
            wheel_radius_m: 0.1034,
            dt_s: 0.01,
            num_steps: 6000,
            output_decimation: 10,
            overhead_budget_s: 0.006,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_params_valid() {
        SimParams::default()
            .validate()
            .expect("Default parameters shall be valid");
    }

    #[test]
    fn test_zero_timestep_rejected() {
        let params = SimParams {
            dt_s: 0.0,
            ..Default::default()
        };

        assert!(matches!(
            params.validate(),
            Err(SimError::MalformedParams(_))
        ));
    }

    #[test]
    fn test_zero_decimation_rejected() {
        let params = SimParams {
            output_decimation: 0,
            ..Default::default()
        };

        assert!(matches!(
            params.validate(),
            Err(SimError::MalformedParams(_))
        ));
    }
}
