//! Driver error types

use std::path::PathBuf;

use g67_transport::TransportError;
use thiserror::Error;

use crate::session::SessionState;

/// Static configuration problems, all detected before streaming starts
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Key {key} maps to slot {slot}, outside 0..{slot_count}")]
    SlotOutOfRange {
        key: String,
        slot: usize,
        slot_count: usize,
    },

    #[error("Slot {slot} is mapped by both {first} and {second}")]
    DuplicateSlot {
        slot: usize,
        first: String,
        second: String,
    },

    #[error("Grid position ({column}, {row}) is used by both {first} and {second}")]
    DuplicatePosition {
        column: u16,
        row: u16,
        first: String,
        second: String,
    },

    #[error("Key name {0} appears more than once")]
    DuplicateName(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid driver config: {0}")]
    InvalidConfig(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Errors from a lighting session
#[derive(Error, Debug)]
pub enum DriverError {
    /// Transport layer error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Configuration mismatch
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The host did not supply a color for a mapped key
    #[error("No color supplied for key {key} at ({column}, {row})")]
    MissingColor { key: String, column: u16, row: u16 },

    /// Operation not allowed in the current session state
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
}
