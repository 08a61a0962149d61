//! # Serial Client
//!
//! Sends wheel commands to the vehicle motor controller over a serial
//! device. The device is expected to already be configured (baud rate etc.)
//! by the host, the client simply writes newline-terminated command lines to
//! it and flushes after every command.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::trace;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal imports
use comms_if::eqpt::WheelCmd;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Client side of the command link to the vehicle.
pub struct SerialClient {
    writer: Box<dyn Write + Send>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur in the serial client.
#[derive(Debug, Error)]
pub enum SerialClientError {
    #[error("Cannot open the serial device {0:?}: {1}")]
    CannotOpenDevice(PathBuf, std::io::Error),

    #[error("Cannot send the command: {0}")]
    SendError(std::io::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SerialClient {
    /// Open the serial device at the given path.
    pub fn new<P: AsRef<Path>>(device: P) -> Result<Self, SerialClientError> {
        let device = device.as_ref();

        let file = OpenOptions::new()
            .write(true)
            .open(device)
            .map_err(|e| SerialClientError::CannotOpenDevice(device.to_path_buf(), e))?;

        Ok(Self::from_writer(Box::new(file)))
    }

    /// Build a client over an arbitrary writer, used by tests and the mock
    /// vehicle.
    pub fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        Self { writer }
    }

    /// Send a wheel command, flushing so that the line leaves the host
    /// before the cycle's sleep.
    pub fn send_cmd(&mut self, cmd: &WheelCmd) -> Result<(), SerialClientError> {
        let line = cmd.to_step_line();

        trace!("Serial send: {:?}", line);

        self.writer
            .write_all(line.as_bytes())
            .map_err(SerialClientError::SendError)?;
        self.writer.flush().map_err(SerialClientError::SendError)?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Writer which appends into a shared buffer.
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_send_cmd_writes_step_line() {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let mut client = SerialClient::from_writer(Box::new(SharedBuffer(buffer.clone())));

        client.send_cmd(&WheelCmd::new(12.0, -3.5)).unwrap();
        client.send_cmd(&WheelCmd::stop()).unwrap();

        let sent = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert_eq!(sent, "STEP R-3.50 L12.00\nSTEP R0.00 L0.00\n");
    }

    #[test]
    fn test_missing_device_is_an_error() {
        assert!(matches!(
            SerialClient::new("/nonexistent/device"),
            Err(SerialClientError::CannotOpenDevice(_, _))
        ));
    }
}
