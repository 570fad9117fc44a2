/*!
 * homesim Home
 *
 * This crate provides the home aggregate: an owned, ordered collection of
 * devices with address metadata, queries over it, and its persistence as a
 * JSON document.
 */

#![warn(missing_docs)]

// Re-export core types
pub use homesim_core::prelude;

// Re-export types from homesim_core for convenience
pub use homesim_core::types::{Document, Id, Value};

pub mod document;
pub mod error;
pub mod home;

// Re-export main types for convenience
pub use document::{read_document, write_document};
pub use error::{Error, Result};
pub use home::{Home, Query};

/// homesim home crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the home crate
pub fn init() -> Result<()> {
    tracing::info!("homesim home {} initialized", VERSION);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(init().is_ok());
        assert!(!VERSION.is_empty());
    }
}
