//! Error types for the daemon

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Daemon error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error on the actuator link
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Camera yielded no frame
    #[error("Capture failed: {0}")]
    Capture(String),

    /// Command argument failed validation
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Actuator link write failed even after reconnecting
    #[error("Actuator link failed: {0}")]
    LinkFailed(String),

    /// Transport not available on this platform
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Shutdown was requested while waiting
    #[error("Interrupted")]
    Interrupted,

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
