/*!
 * Prelude module for homesim Core.
 *
 * This module re-exports commonly used types and functions from the homesim Core crate
 * to make them easier to import.
 */

// Re-export error types
pub use crate::error::{Error, Result};

// Re-export core types
pub use crate::types::{values_match, Document, Id, Value};

// Re-export unit conversions
pub use crate::units::{
    celsius_to_fahrenheit, celsius_to_kelvin, fahrenheit_to_celsius, kelvin_to_celsius,
    TemperatureScale,
};

// Re-export config types
pub use crate::config::{Config, ConfigBuilder, LockPolicy, SharedConfig};

// Re-export logging types and macros
pub use crate::log_to;
pub use crate::logging::{LogBuffer, Logger};
pub use tracing::{debug, error, info, trace, warn};

// Re-export core initialization
pub use crate::init;
