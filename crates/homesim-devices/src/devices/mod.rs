/*!
 * Device implementations for homesim.
 *
 * This module contains the concrete simulated device types.
 */

pub mod light;
pub mod plug;
pub mod refrigerator;
pub mod thermostat;
pub mod water_heater;

// Re-export specific device implementations for convenience
pub use light::{Light, Rgb};
pub use plug::{LoadProfile, SmartPlug};
pub use refrigerator::Refrigerator;
pub use thermostat::{HvacMode, Setpoint, Thermostat};
pub use water_heater::{HeaterMode, TankReading, WaterHeater};
