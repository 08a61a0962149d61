//! # Gamepad Client
//!
//! Wraps the `gilrs` gamepad backend and flattens its event stream into the
//! indexed [`InputFrame`] snapshots consumed by drive control. The client
//! keeps the last seen value of every channel so that a frame is available
//! every cycle regardless of whether any event arrived.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use gilrs::{Axis, Button, Event, EventType, GamepadId, Gilrs};
use log::{info, warn};
use thiserror::Error;

// Internal imports
use comms_if::input::InputFrame;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of axis channels exposed in a frame.
const NUM_AXES: usize = 6;

/// Number of button channels exposed in a frame.
const NUM_BUTTONS: usize = 11;

/// Number of hat channels exposed in a frame.
const NUM_HATS: usize = 1;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Client maintaining the state of the operator's gamepad.
pub struct GamepadClient {
    gilrs: Gilrs,

    /// Id of the gamepad being followed, events from other devices are
    /// dropped.
    gamepad_id: GamepadId,

    axes: [f64; NUM_AXES],
    buttons: [bool; NUM_BUTTONS],
    hats: [(i8, i8); NUM_HATS],
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur in the gamepad client.
#[derive(Debug, Error)]
pub enum GamepadClientError {
    #[error("Could not initialise the gamepad backend: {0}")]
    BackendInitError(String),

    #[error("No gamepad detected, is the controller connected?")]
    NoGamepadDetected,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GamepadClient {
    /// Acquire the first connected gamepad.
    pub fn new() -> Result<Self, GamepadClientError> {
        let gilrs =
            Gilrs::new().map_err(|e| GamepadClientError::BackendInitError(e.to_string()))?;

        let gamepad_id = gilrs
            .gamepads()
            .next()
            .map(|(id, _)| id)
            .ok_or(GamepadClientError::NoGamepadDetected)?;

        info!("Using gamepad: {}", gilrs.gamepad(gamepad_id).name());

        let mut axes = [0.0; NUM_AXES];

        // Trigger axes rest at the released position
        axes[2] = -1.0;
        axes[5] = -1.0;

        Ok(Self {
            gilrs,
            gamepad_id,
            axes,
            buttons: [false; NUM_BUTTONS],
            hats: [(0, 0); NUM_HATS],
        })
    }

    /// Drain pending gamepad events and return a snapshot of the device
    /// state.
    pub fn poll(&mut self) -> InputFrame {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            if id != self.gamepad_id {
                continue;
            }

            match event {
                EventType::AxisChanged(axis, value, _) => self.set_axis(axis, value),
                EventType::ButtonChanged(button, value, _) => {
                    // Analogue triggers arrive as button value changes in
                    // [0, 1], store them on their axis in the raw [-1, 1]
                    // domain
                    match button {
                        Button::LeftTrigger2 => self.axes[2] = sanitise(value) * 2.0 - 1.0,
                        Button::RightTrigger2 => self.axes[5] = sanitise(value) * 2.0 - 1.0,
                        _ => (),
                    }
                }
                EventType::ButtonPressed(button, _) => self.set_button(button, true),
                EventType::ButtonReleased(button, _) => self.set_button(button, false),
                EventType::Disconnected => warn!("Gamepad disconnected"),
                _ => (),
            }
        }

        InputFrame {
            axes: self.axes.to_vec(),
            buttons: self.buttons.to_vec(),
            hats: self.hats.to_vec(),
        }
    }

    fn set_axis(&mut self, axis: Axis, value: f32) {
        match axis {
            // Some backends report the d-pad as a pair of axes
            Axis::DPadX => self.hats[0].0 = digitise(value),
            Axis::DPadY => self.hats[0].1 = digitise(value),
            _ => {
                if let Some(index) = axis_index(axis) {
                    self.axes[index] = sanitise(value);
                }
            }
        }
    }

    fn set_button(&mut self, button: Button, pressed: bool) {
        match button {
            Button::DPadLeft => self.hats[0].0 = if pressed { -1 } else { 0 },
            Button::DPadRight => self.hats[0].0 = if pressed { 1 } else { 0 },
            Button::DPadDown => self.hats[0].1 = if pressed { -1 } else { 0 },
            Button::DPadUp => self.hats[0].1 = if pressed { 1 } else { 0 },
            _ => {
                if let Some(index) = button_index(button) {
                    self.buttons[index] = pressed;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Frame index of a `gilrs` axis, following the Linux `js` numbering.
fn axis_index(axis: Axis) -> Option<usize> {
    match axis {
        Axis::LeftStickX => Some(0),
        Axis::LeftStickY => Some(1),
        Axis::LeftZ => Some(2),
        Axis::RightStickX => Some(3),
        Axis::RightStickY => Some(4),
        Axis::RightZ => Some(5),
        _ => None,
    }
}

/// Frame index of a `gilrs` button.
fn button_index(button: Button) -> Option<usize> {
    match button {
        Button::South => Some(0),
        Button::East => Some(1),
        Button::North => Some(2),
        Button::West => Some(3),
        Button::LeftTrigger => Some(4),
        Button::RightTrigger => Some(5),
        Button::Select => Some(6),
        Button::Start => Some(7),
        Button::Mode => Some(8),
        Button::LeftThumb => Some(9),
        Button::RightThumb => Some(10),
        _ => None,
    }
}

/// Limit a raw device value into [-1, 1], mapping non-finite values to
/// neutral. Some backends report values slightly outside the nominal range.
fn sanitise(value: f32) -> f64 {
    let value = value as f64;

    if value.is_finite() {
        clamp(&value, &-1.0, &1.0)
    } else {
        0.0
    }
}

/// Convert an analogue d-pad axis value into a hat component in {-1, 0, 1}.
fn digitise(value: f32) -> i8 {
    if value > 0.5 {
        1
    } else if value < -0.5 {
        -1
    } else {
        0
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_axis_indices_within_frame() {
        for axis in &[
            Axis::LeftStickX,
            Axis::LeftStickY,
            Axis::LeftZ,
            Axis::RightStickX,
            Axis::RightStickY,
            Axis::RightZ,
        ] {
            let index = axis_index(*axis).unwrap();
            assert!(index < NUM_AXES);
        }

        assert_eq!(axis_index(Axis::Unknown), None);
    }

    #[test]
    fn test_sanitise() {
        assert_eq!(sanitise(0.5), 0.5);
        assert_eq!(sanitise(1.5), 1.0);
        assert_eq!(sanitise(-1.5), -1.0);
        assert_eq!(sanitise(f32::NAN), 0.0);
    }

    #[test]
    fn test_digitise() {
        assert_eq!(digitise(1.0), 1);
        assert_eq!(digitise(-1.0), -1);
        assert_eq!(digitise(0.2), 0);
    }
}
