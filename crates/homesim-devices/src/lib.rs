/*!
 * homesim Devices
 *
 * This crate provides the simulated device model: the shared device
 * contract, the field tables that drive snapshots and hydration, the
 * concrete device types and the factory that builds them from type tags.
 */

#![warn(missing_docs)]

// Re-export core types
pub use homesim_core::prelude;

pub mod device;
pub mod devices;
pub mod error;
pub mod field;
pub mod registry;

// Re-export device trait and basic implementations
pub use device::{Device, DeviceBase, Schema};
pub use devices::{Light, Refrigerator, SmartPlug, Thermostat, WaterHeater};
pub use error::{DeviceError, Result};
pub use registry::DeviceFactory;

/// homesim devices crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the device system
pub fn init() -> std::result::Result<(), homesim_core::error::Error> {
    tracing::info!(
        "homesim devices {} initialized with {} device types",
        VERSION,
        registry::REGISTRY.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert!(init().is_ok());
        assert!(!VERSION.is_empty());
    }
}
