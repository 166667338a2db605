use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScratchpadError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Dimension mismatch: expected {expected} components, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Component index {index} out of range for a {len}-dimensional state")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Page capture failed: {0}")]
    Capture(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),
}

pub type Result<T> = std::result::Result<T, ScratchpadError>;
