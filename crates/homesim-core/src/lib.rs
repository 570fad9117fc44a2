/*!
 * homesim Core
 *
 * This crate provides the shared foundation of the homesim workspace:
 * configuration, logging, errors, identifiers, documents and temperature
 * unit conversions.
 */

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod types;
pub mod units;
pub mod utils;

/// Re-export of dependencies that are part of the public API
pub mod deps {
    pub use chrono;
    pub use serde;
    pub use serde_json;
    pub use tracing;
}

/// homesim core crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library initialization
pub fn init() -> Result<(), error::Error> {
    logging::init()?;
    tracing::info!("homesim core {} initialized", VERSION);
    Ok(())
}
