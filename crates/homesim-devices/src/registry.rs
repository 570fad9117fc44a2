/*!
 * Device registry for homesim.
 *
 * The registry is a closed table mapping type tags to constructors. The
 * [`DeviceFactory`] looks tags up in it and hydrates the new device from an
 * optional document.
 */
use tracing::debug;

use homesim_core::config::{Config, DeviceDefaults};
use homesim_core::log_to;
use homesim_core::logging::Logger;
use homesim_core::types::Document;

use crate::device::{Device, Schema};
use crate::devices::{Light, Refrigerator, SmartPlug, Thermostat, WaterHeater};
use crate::error::{DeviceError, Result};

/// Builds a boxed device of one concrete type
pub type Constructor = fn(Logger, &DeviceDefaults) -> Box<dyn Device>;

/// One registered device type
#[derive(Debug, Clone, Copy)]
pub struct RegistryEntry {
    /// The class name written to documents
    pub class_name: &'static str,
    /// The device type tag
    pub device_type: &'static str,
    /// Constructor for the type
    pub construct: Constructor,
}

impl RegistryEntry {
    /// Whether `tag` names this entry, by class name or device type
    pub fn matches(&self, tag: &str) -> bool {
        self.class_name == tag || self.device_type == tag
    }
}

/// Every constructible device type
pub static REGISTRY: &[RegistryEntry] = &[
    RegistryEntry {
        class_name: Thermostat::CLASS_NAME,
        device_type: "Thermostat",
        construct: |logger, defaults| {
            Box::new(Thermostat::new(logger).with_lock_policy(defaults.lock_policy))
        },
    },
    RegistryEntry {
        class_name: Light::CLASS_NAME,
        device_type: "Light",
        construct: |logger, _| Box::new(Light::new(logger)),
    },
    RegistryEntry {
        class_name: SmartPlug::CLASS_NAME,
        device_type: "Plug",
        construct: |logger, _| Box::new(SmartPlug::new(logger)),
    },
    RegistryEntry {
        class_name: Refrigerator::CLASS_NAME,
        device_type: "Refrigerator",
        construct: |logger, _| Box::new(Refrigerator::new(logger)),
    },
    RegistryEntry {
        class_name: WaterHeater::CLASS_NAME,
        device_type: "WaterHeater",
        construct: |logger, _| Box::new(WaterHeater::new(logger)),
    },
];

/// Find the registry entry for a tag
pub fn lookup(tag: &str) -> Option<&'static RegistryEntry> {
    REGISTRY.iter().find(|entry| entry.matches(tag))
}

/// Creates devices from type tags
#[derive(Debug, Clone, Default)]
pub struct DeviceFactory {
    logger: Logger,
    defaults: DeviceDefaults,
}

impl DeviceFactory {
    /// Create a factory handing `logger` to every device it builds
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            defaults: DeviceDefaults::default(),
        }
    }

    /// Create a factory from configuration
    pub fn from_config(config: &Config, logger: Logger) -> Self {
        Self {
            logger,
            defaults: config.devices.clone(),
        }
    }

    /// Builder-style defaults override
    pub fn with_defaults(mut self, defaults: DeviceDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// The logger handed to new devices
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// The settings applied to new devices
    pub fn defaults(&self) -> &DeviceDefaults {
        &self.defaults
    }

    /// Build a device from a class name or device type tag.
    ///
    /// When `config` is given it is applied with [`Device::from_json`]
    /// before the device is returned.
    pub fn construct(&self, tag: &str, config: Option<&Document>) -> Result<Box<dyn Device>> {
        let entry = lookup(tag).ok_or_else(|| {
            log_to!(self.logger, warn, tag, "unknown device type");
            DeviceError::UnknownDeviceType(tag.to_string())
        })?;

        let mut device = (entry.construct)(self.logger.clone(), &self.defaults);
        if let Some(config) = config {
            device.from_json(config);
        }

        log_to!(
            self.logger,
            debug,
            device = %device.device_id(),
            class = entry.class_name,
            "constructed device"
        );
        Ok(device)
    }

    /// Class names of every constructible type
    pub fn supported_types(&self) -> Vec<&'static str> {
        supported_types()
    }
}

/// Class names of every constructible type
pub fn supported_types() -> Vec<&'static str> {
    debug!("listing {} registered device types", REGISTRY.len());
    REGISTRY.iter().map(|entry| entry.class_name).collect()
}
