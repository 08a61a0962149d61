//! # Input Device Frames
//!
//! An `InputFrame` is the snapshot of the operator's controller taken once
//! per cycle, and an `InputMap` names which element of the frame drives which
//! control function. Keeping the mapping in parameters rather than in code
//! means a different controller layout only needs a parameter change.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Snapshot of the raw input device state at one sampling instant.
///
/// Produced fresh each cycle by the gamepad client and consumed by the drive
/// control module in the same cycle.
#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    /// Axis values, each in [-1.0, 1.0]. Trigger axes rest at -1.0.
    pub axes: Vec<f64>,

    /// Button states, true while held.
    pub buttons: Vec<bool>,

    /// Hat (d-pad) states, each component in {-1, 0, 1}.
    pub hats: Vec<(i8, i8)>,
}

/// Named assignment of device axes/buttons/hats to control functions.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct InputMap {
    /// Index of the trigger axis commanding forward speed
    pub forward_axis: usize,

    /// Index of the trigger axis commanding reverse speed
    pub reverse_axis: usize,

    /// Index of the lateral steering axis
    pub steering_axis: usize,

    /// Index of the boost button
    pub boost_button: usize,

    /// Index of the hat used for crab turns
    pub crab_hat: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl InputFrame {
    /// Axis value at the given index.
    ///
    /// Reads are total: an unmapped index reads as the neutral value `0.0`,
    /// so a frame from a smaller controller never aborts processing.
    pub fn axis(&self, idx: usize) -> f64 {
        self.axes.get(idx).copied().unwrap_or(0.0)
    }

    /// Button state at the given index, `false` if unmapped.
    pub fn button(&self, idx: usize) -> bool {
        self.buttons.get(idx).copied().unwrap_or(false)
    }

    /// Hat state at the given index, centred if unmapped.
    pub fn hat(&self, idx: usize) -> (i8, i8) {
        self.hats.get(idx).copied().unwrap_or((0, 0))
    }
}

impl Default for InputMap {
    /// Layout of the reference controller (Linux `js` numbering): left stick
    /// X steering, left trigger reverse, right trigger forward, south button
    /// boost, d-pad crab.
    fn default() -> Self {
        Self {
            forward_axis: 5,
            reverse_axis: 2,
            steering_axis: 0,
            boost_button: 0,
            crab_hat: 0,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_total_accessors() {
        let frame = InputFrame {
            axes: vec![0.25, -1.0],
            buttons: vec![true],
            hats: vec![(-1, 0)],
        };

        assert_eq!(frame.axis(0), 0.25);
        assert_eq!(frame.button(0), true);
        assert_eq!(frame.hat(0), (-1, 0));

        // Out of range reads are neutral, never a panic
        assert_eq!(frame.axis(100), 0.0);
        assert_eq!(frame.button(100), false);
        assert_eq!(frame.hat(100), (0, 0));
    }
}
