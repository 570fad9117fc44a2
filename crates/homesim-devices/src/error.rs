/*!
 * Error types for the homesim devices crate.
 */
use thiserror::Error;

use homesim_core::error::Error as CoreError;

/// Error type for device operations
#[derive(Error, Debug)]
pub enum DeviceError {
    /// The factory has no constructor for the tag
    #[error("Unknown device type: {0}")]
    UnknownDeviceType(String),

    /// The device has no field with this name
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// The field exists but cannot be set
    #[error("Field {0} is read-only")]
    NotSettable(String),

    /// The value has the wrong JSON type for the field
    #[error("Invalid value type for field {field}: expected {expected}, got {found}")]
    InvalidType {
        /// The field name
        field: String,
        /// The expected kind of value
        expected: &'static str,
        /// The value that was supplied
        found: String,
    },

    /// The value is outside the field's legal domain
    #[error("Rejected value for field {field}: {value}")]
    Rejected {
        /// The field name
        field: String,
        /// The value that was supplied
        value: String,
    },

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

/// Result type for device operations
pub type Result<T> = std::result::Result<T, DeviceError>;

impl DeviceError {
    /// Create a new type mismatch error
    pub fn invalid_type<S: AsRef<str>>(field: S, expected: &'static str, found: &serde_json::Value) -> Self {
        DeviceError::InvalidType {
            field: field.as_ref().to_string(),
            expected,
            found: found.to_string(),
        }
    }

    /// Create a new rejected value error
    pub fn rejected<S: AsRef<str>, V: ToString>(field: S, value: V) -> Self {
        DeviceError::Rejected {
            field: field.as_ref().to_string(),
            value: value.to_string(),
        }
    }

    /// Whether this error is a domain rejection the setter already logged
    pub fn is_rejection(&self) -> bool {
        matches!(self, DeviceError::Rejected { .. })
    }
}
