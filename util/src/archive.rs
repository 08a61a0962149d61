//! Struct archiving functionality
//!
//! Archives are timestamped CSV files written into the session's `arch`
//! directory, one record per processing cycle. To add archiving to a struct
//! implement the `Archived` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::WriterBuilder;
pub use csv::Writer;
use std::fs::{File, OpenOptions};
use std::path::Path;
use thiserror::Error;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with archiving.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot create the archive file: {0}")]
    CannotCreateFile(std::io::Error),

    #[error("Cannot serialise the record: {0}")]
    SerialiseError(csv::Error),

    #[error("Cannot flush the archive file: {0}")]
    FlushError(std::io::Error),

    #[error("The archiver has not been initialised")]
    NotInitialised,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A trait which enables a struct to be archived as a timestamped csv.
///
/// Implementers shall hold an `Archiver` member, set up during the struct's
/// `init` or `new` function, and serialise their records into it during
/// `write`.
pub trait Archived {
    /// Write the archives for this struct
    fn write(&mut self) -> Result<(), ArchiveError>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a particular path relative to the session's
    /// archive root.
    pub fn from_path<P: AsRef<Path>>(
        session: &Session,
        path: P,
    ) -> Result<Self, ArchiveError> {
        let mut arch_path = session.arch_root.clone();
        arch_path.push(path);

        // Create the file if it does not exist
        File::create(arch_path.clone()).map_err(ArchiveError::CannotCreateFile)?;

        // Open the file in append mode
        let file = OpenOptions::new()
            .append(true)
            .open(arch_path)
            .map_err(ArchiveError::CannotCreateFile)?;

        let writer = WriterBuilder::new().has_headers(true).from_writer(file);

        Ok(Self {
            writer: Some(writer),
        })
    }

    /// Serialise a record into the archive.
    ///
    /// Records shall be flat structs of scalars so that the CSV writer can
    /// derive a header line from the field names.
    pub fn serialise<T: serde::Serialize>(&mut self, record: T) -> Result<(), ArchiveError> {
        match self.writer {
            Some(ref mut w) => {
                w.serialize(record).map_err(ArchiveError::SerialiseError)?;
                w.flush().map_err(ArchiveError::FlushError)?;
                Ok(())
            }
            None => Err(ArchiveError::NotInitialised),
        }
    }
}
