use thiserror::Error;

/// orderpulse error types
#[derive(Error, Debug)]
pub enum OrderPulseError {
    /// A single upstream fetch failed
    #[error("transport error: {0}")]
    Transport(String),

    /// Every service fetch failed, nothing to aggregate
    #[error("all service fetches failed")]
    AllSourcesFailed,

    /// Failed to parse an upstream payload
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for orderpulse
pub type Result<T> = std::result::Result<T, OrderPulseError>;
