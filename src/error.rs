//! # Error Types
//!
//! Custom error types for the PXX encoder using `thiserror`.
//!
//! Frame construction itself cannot fail; these cover configuration and the
//! hand-off of finished frames to the serial port.

use thiserror::Error;

/// Main error type for the PXX encoder
#[derive(Debug, Error)]
pub enum PxxError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Serial port errors
    #[error("Serial port error: {0}")]
    Serial(String),

    /// No serial device could be opened
    #[error("No serial device found (tried: {0})")]
    SerialPortNotFound(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the PXX encoder
pub type Result<T> = std::result::Result<T, PxxError>;
