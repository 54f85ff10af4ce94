//! Error handling for PCBDrill
//!
//! Provides the error types for every stage of the drill pipeline:
//! - Directory scan errors (invalid scan target)
//! - Gerber decode errors (per layer file)
//! - Excellon errors (malformed drill files)
//! - I/O errors (unreadable input, unwritable output)
//!
//! All error types use `thiserror` for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

/// Excellon drill file error type
///
/// Represents a drill file that is not well-formed Excellon. Line numbers are 1-based.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExcellonError {
    /// Tool definition without a usable diameter
    #[error("Malformed tool definition at line {line_number}: {text}")]
    MalformedToolDefinition {
        /// The line number of the definition.
        line_number: usize,
        /// The offending line.
        text: String,
    },

    /// A tool was selected that the file never defines
    #[error("Undefined tool T{tool} referenced at line {line_number}")]
    UndefinedTool {
        /// The line number of the reference.
        line_number: usize,
        /// The tool number.
        tool: u32,
    },

    /// A hit appeared before any tool was selected
    #[error("Hit at line {line_number} has no tool selected")]
    NoToolSelected {
        /// The line number of the hit.
        line_number: usize,
    },

    /// Coordinate word without digits
    #[error("Truncated coordinate at line {line_number}: {text}")]
    TruncatedCoordinate {
        /// The line number of the coordinate.
        line_number: usize,
        /// The offending line.
        text: String,
    },

    /// A numeric field could not be parsed
    #[error("Invalid number '{value}' at line {line_number}")]
    InvalidNumber {
        /// The line number of the field.
        line_number: usize,
        /// The raw field value.
        value: String,
    },
}

/// Main error type for PCBDrill
///
/// A unified error type that can represent any error from the scan, parse,
/// and export stages. This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Scan target is missing, unreadable, or not a directory
    #[error("Not a readable directory: {}", path.display())]
    NotADirectory {
        /// The rejected scan target.
        path: PathBuf,
    },

    /// A Gerber layer could not be decoded
    #[error("Failed to decode Gerber file {}: {reason}", path.display())]
    Decode {
        /// The layer file.
        path: PathBuf,
        /// The decoder's description of the failure.
        reason: String,
    },

    /// A drill file is not well-formed Excellon
    #[error("Excellon parse error: {0}")]
    Parse(#[from] ExcellonError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a decode error for a layer file
    pub fn decode(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::Decode {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a Gerber decode error
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }

    /// Check if this is an Excellon parse error
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::Parse(_))
    }

    /// Check if this is an I/O error
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
