//! # Wheel speed script interpreter
//!
//! This module provides an interpreter for wheel speed scripts, allowing the
//! simulation to be driven by a pre-written command sequence instead of a
//! gamepad.
//!
//! A script is a plain text file in which each line has the form
//!
//! ```text
//! <time_s>: {"left_rpm": <f64>, "right_rpm": <f64>};
//! ```
//!
//! where `<time_s>` is the simulated time at which the command takes effect.
//! The last command issued remains in effect until the next one is due.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use comms_if::eqpt::WheelCmd;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
struct Command {
    /// The simulated time the command is supposed to execute at
    exec_time_s: f64,

    /// The wheel command to issue
    cmd: WheelCmd,
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use
/// `.get_pending_cmds` with the current simulated time to acquire the
/// commands that are now due.
pub struct ScriptInterpreter {
    _script_path: PathBuf,
    cmds: VecDeque<Command>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)"
    )]
    InvalidTimestamp(String),

    #[error("Script contains an invalid wheel command at {0} s: {1}")]
    InvalidCmd(f64, serde_json::Error),
}

pub enum PendingCmds {
    None,
    Some(Vec<WheelCmd>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());

        // Check that the script file exists.
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(
                path.to_string_lossy().to_string(),
            ));
        }

        // Load the script into a string
        let script = fs::read_to_string(&path).map_err(ScriptError::ScriptLoadError)?;

        // Empty queue of commands
        let mut cmd_queue: VecDeque<Command> = VecDeque::new();

        // Each line is `<timestamp>: <json payload>;`
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .unwrap();

        for cap in re.captures_iter(&script) {
            // Parse the exec time
            let exec_time_s: f64 = match cap.get(1).unwrap().as_str().parse() {
                Ok(t) => t,
                Err(e) => return Err(ScriptError::InvalidTimestamp(format!("{}", e))),
            };

            // Parse the wheel command from the JSON payload
            let cmd: WheelCmd = match serde_json::from_str(cap.get(3).unwrap().as_str()) {
                Ok(c) => c,
                Err(e) => return Err(ScriptError::InvalidCmd(exec_time_s, e)),
            };

            cmd_queue.push_back(Command { exec_time_s, cmd });
        }

        if cmd_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(ScriptInterpreter {
            _script_path: path,
            cmds: cmd_queue,
        })
    }

    /// Return the commands due at the given simulated time, or `None` if no
    /// command needs executing yet.
    ///
    /// Using simulated rather than wall-clock time keeps script replays
    /// deterministic regardless of how well the pacer holds real time.
    pub fn get_pending_cmds(&mut self, current_time_s: f64) -> PendingCmds {
        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.cmds.is_empty() {
            return PendingCmds::EndOfScript;
        }

        let mut cmd_vec: Vec<WheelCmd> = vec![];

        // Pop items from the head of the queue until the head's exec time is
        // in the future.
        while self
            .cmds
            .front()
            .map(|c| c.exec_time_s <= current_time_s)
            .unwrap_or(false)
        {
            cmd_vec.push(self.cmds.pop_front().unwrap().cmd);
        }

        if !cmd_vec.is_empty() {
            PendingCmds::Some(cmd_vec)
        } else {
            PendingCmds::None
        }
    }

    /// Get the number of commands remaining in the script
    pub fn get_num_cmds(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    fn write_script(name: &str, content: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_and_replay() {
        let path = write_script(
            "script_interp_test_nominal.dds",
            "0.0: {\"left_rpm\": 30.0, \"right_rpm\": 30.0};\n\
             1.5: {\"left_rpm\": 0.0, \"right_rpm\": 45.0};\n",
        );

        let mut si = ScriptInterpreter::new(&path).unwrap();
        assert_eq!(si.get_num_cmds(), 2);
        assert_eq!(si.get_duration(), 1.5);

        // First command due immediately
        match si.get_pending_cmds(0.0) {
            PendingCmds::Some(cmds) => {
                assert_eq!(cmds.len(), 1);
                assert_eq!(cmds[0].left_rpm, 30.0);
            }
            _ => panic!("Expected a pending command at t = 0"),
        }

        // Nothing due before the second command's exec time
        assert!(matches!(si.get_pending_cmds(1.0), PendingCmds::None));

        // Second command due, then end of script
        assert!(matches!(si.get_pending_cmds(2.0), PendingCmds::Some(_)));
        assert!(matches!(
            si.get_pending_cmds(3.0),
            PendingCmds::EndOfScript
        ));
    }

    #[test]
    fn test_empty_script_rejected() {
        let path = write_script("script_interp_test_empty.dds", "not a script\n");
        assert!(matches!(
            ScriptInterpreter::new(&path),
            Err(ScriptError::ScriptEmpty)
        ));
    }

    #[test]
    fn test_missing_script_rejected() {
        assert!(matches!(
            ScriptInterpreter::new("/nonexistent/script.dds"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }
}
