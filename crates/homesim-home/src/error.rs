/*!
 * Error types for the homesim home crate.
 */
use thiserror::Error;

/// Error type for home operations
#[derive(Error, Debug)]
pub enum Error {
    /// Device error
    #[error("Device error: {0}")]
    Device(#[from] homesim_devices::DeviceError),

    /// A device with this id is already in the home
    #[error("Duplicate device id: {0}")]
    DuplicateDevice(String),

    /// The document does not have the expected shape
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] homesim_core::error::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for home operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new invalid document error
    pub fn invalid_document<S: AsRef<str>>(msg: S) -> Self {
        Error::InvalidDocument(msg.as_ref().to_string())
    }

    /// Create a new not found error
    pub fn not_found<S: AsRef<str>>(msg: S) -> Self {
        Error::NotFound(msg.as_ref().to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
