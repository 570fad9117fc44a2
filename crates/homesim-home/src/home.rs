/*!
 * The home aggregate.
 *
 * A [`Home`] owns an ordered collection of devices plus a little address
 * metadata. It answers lookups by id, by type tag and by field values, and
 * converts itself to and from the JSON document it is persisted as.
 */
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use homesim_core::config::Config;
use homesim_core::log_to;
use homesim_core::logging::Logger;
use homesim_core::types::{values_match, Document, Id, Value};
use homesim_core::utils::value_to_text;
use homesim_devices::{Device, DeviceFactory};

use crate::document::{read_document, render_document, write_document};
use crate::error::{Error, Result};

/// Type tag written to log lines about the aggregate itself
pub const HOME_TYPE: &str = "Home";

/// Placeholder for address metadata that was never set
pub const UNSET: &str = "None";

/// Document key holding the device entries
pub const DEVICES_KEY: &str = "devices";

/// Device entry key naming the concrete class
pub const CLASS_KEY: &str = "class";

/// Metadata keys in document order
pub const HOME_FIELDS: &[&str] = &[
    "location_id",
    "name",
    "street_address",
    "city",
    "state",
    "country",
    "zipcode",
];

/// A device lookup
#[derive(Debug, Clone, Copy)]
pub enum Query<'a> {
    /// The device with exactly this id
    Id(&'a str),
    /// Every device whose device type or class name is this tag
    Type(&'a str),
    /// Every device where all the given fields equal the given values
    Fields(&'a Document),
}

impl Query<'_> {
    /// Whether `device` satisfies the query
    pub fn matches(&self, device: &dyn Device) -> bool {
        match self {
            Query::Id(id) => device.device_id() == id,
            Query::Type(tag) => device.device_type() == *tag || device.class_name() == *tag,
            Query::Fields(fields) => fields.iter().all(|(name, expected)| {
                device
                    .field(name)
                    .map_or(false, |actual| values_match(&actual, expected))
            }),
        }
    }
}

/// A location holding a collection of devices
pub struct Home {
    location_id: Id,
    name: String,
    street_address: String,
    city: String,
    state: String,
    country: String,
    zipcode: String,
    devices: Vec<Box<dyn Device>>,
    logger: Logger,
    factory: DeviceFactory,
}

impl Home {
    /// Create an empty home logging through `logger`
    pub fn new(logger: Logger) -> Self {
        Self::with_factory(DeviceFactory::new(logger))
    }

    /// Create an empty home that builds devices with `factory`.
    ///
    /// The home logs through the factory's logger.
    pub fn with_factory(factory: DeviceFactory) -> Self {
        Self {
            location_id: Id::generate(),
            name: UNSET.to_string(),
            street_address: UNSET.to_string(),
            city: UNSET.to_string(),
            state: UNSET.to_string(),
            country: UNSET.to_string(),
            zipcode: UNSET.to_string(),
            devices: Vec::new(),
            logger: factory.logger().clone(),
            factory,
        }
    }

    /// Load a home from a document file
    pub fn load<P: AsRef<Path>>(path: P, factory: DeviceFactory) -> Result<Self> {
        let document = read_document(path)?;
        let mut home = Self::with_factory(factory);
        home.from_document(&document)?;
        Ok(home)
    }

    /// Load the home document named by the configuration
    pub fn open(config: &Config, logger: Logger) -> Result<Self> {
        Self::load(
            &config.home.document,
            DeviceFactory::from_config(config, logger),
        )
    }

    /// Save the home to a document file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_document(path, &self.to_document())
    }

    /// The location identifier
    pub fn location_id(&self) -> &Id {
        &self.location_id
    }

    /// Set the location identifier
    pub fn set_location_id<I: Into<Id>>(&mut self, id: I) {
        self.location_id = id.into();
        self.log_set("location_id", self.location_id.as_str());
    }

    /// The home's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the home's name
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
        self.log_set("name", &self.name);
    }

    /// Street address
    pub fn street_address(&self) -> &str {
        &self.street_address
    }

    /// Set the street address
    pub fn set_street_address<S: Into<String>>(&mut self, street_address: S) {
        self.street_address = street_address.into();
        self.log_set("street_address", &self.street_address);
    }

    /// City
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Set the city
    pub fn set_city<S: Into<String>>(&mut self, city: S) {
        self.city = city.into();
        self.log_set("city", &self.city);
    }

    /// State or region
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Set the state or region
    pub fn set_state<S: Into<String>>(&mut self, state: S) {
        self.state = state.into();
        self.log_set("state", &self.state);
    }

    /// Country
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Set the country
    pub fn set_country<S: Into<String>>(&mut self, country: S) {
        self.country = country.into();
        self.log_set("country", &self.country);
    }

    /// Postal code
    pub fn zipcode(&self) -> &str {
        &self.zipcode
    }

    /// Set the postal code
    pub fn set_zipcode<S: Into<String>>(&mut self, zipcode: S) {
        self.zipcode = zipcode.into();
        self.log_set("zipcode", &self.zipcode);
    }

    /// The home's logger
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// The factory used to rebuild devices from documents
    pub fn factory(&self) -> &DeviceFactory {
        &self.factory
    }

    fn log_set(&self, field: &str, value: &str) {
        log_to!(self.logger, info, home = %self.location_id, field, value, "set");
    }

    /// Read one metadata field by document key
    pub fn metadata(&self, key: &str) -> Option<&str> {
        let value = match key {
            "location_id" => self.location_id.as_str(),
            "name" => &self.name,
            "street_address" => &self.street_address,
            "city" => &self.city,
            "state" => &self.state,
            "country" => &self.country,
            "zipcode" => &self.zipcode,
            _ => return None,
        };
        Some(value)
    }

    /// Write one metadata field by document key.
    ///
    /// Strings are stored as given and numbers by their decimal rendering.
    /// Unknown keys and other value kinds are skipped with a warning; the
    /// return value reports whether the field was written.
    pub fn set_metadata(&mut self, key: &str, value: &Value) -> bool {
        if !HOME_FIELDS.contains(&key) {
            log_to!(
                self.logger,
                warn,
                home = %self.location_id,
                field = key,
                "abort set -- 'set_{}' not in {}",
                key,
                HOME_TYPE
            );
            return false;
        }
        let Some(text) = value_to_text(value) else {
            log_to!(
                self.logger,
                warn,
                home = %self.location_id,
                field = key,
                %value,
                "abort set {} -- expected a string",
                key
            );
            return false;
        };
        match key {
            "location_id" => self.set_location_id(text),
            "name" => self.set_name(text),
            "street_address" => self.set_street_address(text),
            "city" => self.set_city(text),
            "state" => self.set_state(text),
            "country" => self.set_country(text),
            _ => self.set_zipcode(text),
        }
        true
    }

    /// Number of devices
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether the home has no devices
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Devices in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Device> {
        self.devices.iter().map(|device| device.as_ref())
    }

    /// Devices in insertion order, mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Device>> {
        self.devices.iter_mut()
    }

    /// The device at `index`
    pub fn get_index(&self, index: usize) -> Option<&dyn Device> {
        self.devices.get(index).map(|device| device.as_ref())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.devices.iter().position(|device| device.device_id() == id)
    }

    fn adopt(&self, device: &mut Box<dyn Device>) {
        device.set_logger(self.logger.clone());
    }

    /// Add a device to the end of the collection.
    ///
    /// The home takes ownership and hands the device its logger. A device
    /// whose id is already present is refused.
    pub fn append(&mut self, mut device: Box<dyn Device>) -> Result<()> {
        let id = device.device_id().to_string();
        if self.position(&id).is_some() {
            log_to!(self.logger, warn, home = %self.location_id, device = %id, "duplicate device id");
            return Err(Error::DuplicateDevice(id));
        }
        self.adopt(&mut device);
        log_to!(
            self.logger,
            info,
            home = %self.location_id,
            device = %id,
            class = device.class_name(),
            "appended device"
        );
        self.devices.push(device);
        Ok(())
    }

    /// Replace the device at `index`, returning the old one
    pub fn replace(&mut self, index: usize, mut device: Box<dyn Device>) -> Result<Box<dyn Device>> {
        if index >= self.devices.len() {
            return Err(Error::not_found(format!("device index {}", index)));
        }
        let id = device.device_id().to_string();
        if self.position(&id).map_or(false, |found| found != index) {
            return Err(Error::DuplicateDevice(id));
        }
        self.adopt(&mut device);
        Ok(std::mem::replace(&mut self.devices[index], device))
    }

    /// Remove and return the device with `id`
    pub fn remove(&mut self, id: &str) -> Option<Box<dyn Device>> {
        let index = self.position(id)?;
        log_to!(self.logger, info, home = %self.location_id, device = id, "removed device");
        Some(self.devices.remove(index))
    }

    /// Every device matching `query`, in collection order
    pub fn get(&self, query: Query<'_>) -> Vec<&dyn Device> {
        self.iter().filter(|device| query.matches(*device)).collect()
    }

    /// The device with `id`
    pub fn by_id(&self, id: &str) -> Option<&dyn Device> {
        self.iter().find(|device| device.device_id() == id)
    }

    /// The device with `id`, mutably
    pub fn by_id_mut(&mut self, id: &str) -> Option<&mut Box<dyn Device>> {
        self.devices.iter_mut().find(|device| device.device_id() == id)
    }

    /// Every device of a type, by device type or class name
    pub fn by_type(&self, tag: &str) -> Vec<&dyn Device> {
        self.get(Query::Type(tag))
    }

    /// Every device whose fields equal all the values in `fields`
    pub fn matching(&self, fields: &Document) -> Vec<&dyn Device> {
        self.get(Query::Fields(fields))
    }

    /// Serialize the home and every device's persisted properties
    pub fn to_document(&self) -> Document {
        let mut document: Document = HOME_FIELDS
            .iter()
            .filter_map(|key| {
                self.metadata(key)
                    .map(|value| (key.to_string(), Value::String(value.to_string())))
            })
            .collect();

        let devices: Document = self
            .devices
            .iter()
            .enumerate()
            .map(|(i, device)| {
                let mut entry = Document::new();
                entry.insert(
                    CLASS_KEY.to_string(),
                    Value::String(device.class_name().to_string()),
                );
                entry.extend(device.to_properties());
                (format!("device{}", i + 1), Value::Object(entry))
            })
            .collect();

        document.insert(DEVICES_KEY.to_string(), Value::Object(devices));
        document
    }

    /// Hydrate the home from a document.
    ///
    /// Every device entry is built and checked before any is appended, so a
    /// malformed entry, an unknown class or a duplicate id leaves the home
    /// unchanged. Remaining top-level keys then go through the metadata
    /// setters.
    #[allow(clippy::wrong_self_convention)]
    pub fn from_document(&mut self, document: &Document) -> Result<()> {
        let entries: Vec<&Value> = match document.get(DEVICES_KEY) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(map)) => map.values().collect(),
            Some(Value::Array(list)) => list.iter().collect(),
            Some(other) => {
                return Err(Error::invalid_document(format!(
                    "'{}' must be an object or an array, found {}",
                    DEVICES_KEY, other
                )))
            }
        };

        let mut built = Vec::with_capacity(entries.len());
        let mut seen: HashSet<String> = self
            .devices
            .iter()
            .map(|device| device.device_id().to_string())
            .collect();
        for entry in entries {
            let device = self.build_device(entry)?;
            let id = device.device_id().to_string();
            if !seen.insert(id.clone()) {
                return Err(Error::DuplicateDevice(id));
            }
            built.push(device);
        }

        for device in built {
            self.append(device)?;
        }

        for (key, value) in document {
            if key != DEVICES_KEY {
                self.set_metadata(key, value);
            }
        }
        Ok(())
    }

    fn build_device(&self, entry: &Value) -> Result<Box<dyn Device>> {
        let Value::Object(entry) = entry else {
            return Err(Error::invalid_document(format!(
                "device entry must be an object, found {}",
                entry
            )));
        };
        let class = match entry.get(CLASS_KEY) {
            Some(Value::String(class)) => class.as_str(),
            _ => {
                return Err(Error::invalid_document(format!(
                    "device entry has no '{}' string",
                    CLASS_KEY
                )))
            }
        };
        let mut config = entry.clone();
        config.remove(CLASS_KEY);
        Ok(self.factory.construct(class, Some(&config))?)
    }
}

impl Default for Home {
    fn default() -> Self {
        Self::new(Logger::global())
    }
}

impl fmt::Debug for Home {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Home")
            .field("location_id", &self.location_id)
            .field("name", &self.name)
            .field("devices", &self.devices.len())
            .finish()
    }
}

impl fmt::Display for Home {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = render_document(&self.to_document()).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homesim_devices::device::Schema;
    use homesim_devices::{DeviceError, Light, SmartPlug, Thermostat};
    use serde_json::json;
    use tempfile::tempdir;
    use test_log::test;
    use tracing::Level;

    fn logger() -> Logger {
        Logger::ambient()
    }

    fn thermostat(id: &str) -> Box<dyn Device> {
        Box::new(Thermostat::new(logger()).with_id(id))
    }

    fn light(id: &str) -> Box<dyn Device> {
        Box::new(Light::new(logger()).with_id(id))
    }

    fn sample_home() -> Home {
        let mut home = Home::new(logger());
        home.set_name("Cabin");
        home.set_city("Bergen");
        home.append(thermostat("1234")).unwrap();
        home.append(thermostat("2345")).unwrap();
        home.append(light("3456")).unwrap();
        home
    }

    fn object(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {}", other),
        }
    }

    #[test]
    fn test_new_home_defaults() {
        let home = Home::new(logger());
        assert!(home.is_empty());
        assert_eq!(home.location_id().as_str().len(), 16);
        for key in &HOME_FIELDS[1..] {
            assert_eq!(home.metadata(key), Some(UNSET));
        }
    }

    #[test]
    fn test_round_trip() {
        let home = sample_home();
        let document = home.to_document();

        let mut restored = Home::new(logger());
        restored.from_document(&document).unwrap();

        assert_eq!(restored.len(), 3);
        assert_eq!(restored.by_type("Thermostat").len(), 2);
        assert_eq!(restored.by_type("Light").len(), 1);
        assert_eq!(restored.name(), "Cabin");
        assert_eq!(restored.location_id(), home.location_id());
        assert_eq!(restored.to_document(), document);
    }

    #[test]
    fn test_document_layout() {
        let document = sample_home().to_document();
        let keys: Vec<&str> = document.keys().map(String::as_str).collect();
        assert_eq!(&keys[..7], HOME_FIELDS);
        assert_eq!(keys[7], DEVICES_KEY);

        let devices = document[DEVICES_KEY].as_object().unwrap();
        assert_eq!(
            devices.keys().collect::<Vec<_>>(),
            vec!["device1", "device2", "device3"]
        );
        assert_eq!(devices["device1"][CLASS_KEY], json!("NestThermostat"));
        assert_eq!(devices["device3"][CLASS_KEY], json!("PhilipsHueLamp"));
        assert_eq!(devices["device3"]["device_id"], json!("3456"));
    }

    #[test]
    fn test_multi_field_query() {
        let mut home = Home::new(logger());
        home.append(Box::new(
            Thermostat::new(logger()).with_id("1").with_location("Upstairs"),
        ))
        .unwrap();
        home.append(Box::new(
            Thermostat::new(logger()).with_id("2").with_location("Downstairs"),
        ))
        .unwrap();
        home.append(Box::new(Light::new(logger()).with_id("3").with_location("Upstairs")))
            .unwrap();
        home.append(Box::new(
            SmartPlug::new(logger()).with_id("4").with_location("Upstairs"),
        ))
        .unwrap();

        let query = object(json!({ "device_type": "Thermostat", "location": "Upstairs" }));
        let found = home.matching(&query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].device_id().as_str(), "1");

        let upstairs = object(json!({ "location": "Upstairs" }));
        assert_eq!(home.matching(&upstairs).len(), 3);

        let nothing = object(json!({ "location": "Upstairs", "no_such_field": 1 }));
        assert!(home.matching(&nothing).is_empty());
    }

    #[test]
    fn test_numeric_query() {
        let mut home = Home::new(logger());
        let mut lamp = Light::new(logger()).with_id("lamp");
        assert!(lamp.set_brightness(1.0));
        home.append(Box::new(lamp)).unwrap();
        home.append(light("other")).unwrap();
        home.by_id_mut("other")
            .unwrap()
            .from_json(&object(json!({ "brightness": 0.25 })));

        let found = home.matching(&object(json!({ "brightness": 1 })));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].device_id().as_str(), "lamp");
    }

    #[test]
    fn test_get_by_id_and_type() {
        let home = sample_home();
        let found = home.get(Query::Id("2345"));
        assert_eq!(found.len(), 1);
        assert!(found[0].is::<Thermostat>());
        assert!(home.get(Query::Id("9999")).is_empty());
        assert!(home.by_id("9999").is_none());

        assert_eq!(home.get(Query::Type("NestThermostat")).len(), 2);
        assert_eq!(home.get(Query::Type("PhilipsHueLamp")).len(), 1);
        assert!(home.get(Query::Type("Plug")).is_empty());
    }

    #[test]
    fn test_duplicate_append_rejected() {
        let mut home = sample_home();
        let err = home.append(light("1234")).unwrap_err();
        assert!(matches!(err, Error::DuplicateDevice(ref id) if id == "1234"));
        assert_eq!(home.len(), 3);
    }

    #[test]
    fn test_duplicate_in_document_leaves_home_unchanged() {
        let document = object(json!({
            "name": "Twin",
            "devices": [
                { "class": "PhilipsHueLamp", "device_id": "a" },
                { "class": "SmartPlug", "device_id": "a" },
            ]
        }));
        let mut home = Home::new(logger());
        let err = home.from_document(&document).unwrap_err();
        assert!(matches!(err, Error::DuplicateDevice(_)));
        assert!(home.is_empty());
        assert_eq!(home.name(), UNSET);
    }

    #[test]
    fn test_document_device_clashing_with_existing() {
        let mut home = sample_home();
        let document = object(json!({
            "devices": { "device1": { "class": "Light", "device_id": "3456" } }
        }));
        assert!(matches!(
            home.from_document(&document),
            Err(Error::DuplicateDevice(_))
        ));
        assert_eq!(home.len(), 3);
    }

    #[test]
    fn test_devices_as_array() {
        let document = object(json!({
            "city": "Oslo",
            "devices": [
                { "class": "Thermostat", "device_id": "t1", "location": "Hall" },
                { "class": "Refrigerator", "device_id": "r1" },
                { "class": "WaterHeater", "device_id": "w1", "heater_mode": "hot" },
            ]
        }));
        let mut home = Home::new(logger());
        home.from_document(&document).unwrap();

        assert_eq!(home.len(), 3);
        assert_eq!(home.city(), "Oslo");
        assert_eq!(home.by_id("t1").unwrap().location(), "Hall");
        assert_eq!(home.get_index(1).unwrap().class_name(), "Refrigerator");
        assert_eq!(home.get_index(2).unwrap().device_type(), "WaterHeater");
    }

    #[test]
    fn test_unknown_class_is_device_error() {
        let document = object(json!({
            "devices": { "device1": { "class": "Toaster" } }
        }));
        let mut home = Home::new(logger());
        let err = home.from_document(&document).unwrap_err();
        assert!(matches!(
            err,
            Error::Device(DeviceError::UnknownDeviceType(ref tag)) if tag == "Toaster"
        ));
    }

    #[test]
    fn test_malformed_entries() {
        let mut home = Home::new(logger());
        for document in [
            json!({ "devices": "everything" }),
            json!({ "devices": [42] }),
            json!({ "devices": [{ "device_id": "x" }] }),
            json!({ "devices": [{ "class": 7 }] }),
        ] {
            let err = home.from_document(&object(document)).unwrap_err();
            assert!(matches!(err, Error::InvalidDocument(_)), "{}", err);
        }
        assert!(home.is_empty());
    }

    #[test]
    fn test_unknown_key_warns() {
        let (logger, buffer) = Logger::capture(Level::WARN);
        let mut home = Home::new(logger);
        home.from_document(&object(json!({ "garage": true, "zipcode": 5003 })))
            .unwrap();

        assert_eq!(home.zipcode(), "5003");
        assert!(buffer
            .contents()
            .contains("abort set -- 'set_garage' not in Home"));
    }

    #[test]
    fn test_non_text_metadata_rejected() {
        let (logger, buffer) = Logger::capture(Level::WARN);
        let mut home = Home::new(logger);
        assert!(!home.set_metadata("city", &json!(["Oslo"])));
        assert_eq!(home.city(), UNSET);
        assert!(buffer.contents().contains("abort set city"));
    }

    #[test]
    fn test_append_adopts_logger() {
        let (logger, buffer) = Logger::capture(Level::WARN);
        let mut home = Home::new(logger);
        home.append(light("lamp")).unwrap();

        let lamp = home.by_id_mut("lamp").unwrap();
        assert!(!lamp.set_status("bogus"));
        assert_eq!(lamp.status(), "off");
        assert!(buffer.contents().contains("bogus"));
    }

    #[test]
    fn test_replace_and_remove() {
        let mut home = sample_home();
        let old = home.replace(2, light("4567")).unwrap();
        assert_eq!(old.device_id().as_str(), "3456");
        assert_eq!(home.get_index(2).unwrap().device_id().as_str(), "4567");

        // Replacing a device with itself is not a duplicate
        assert!(home.replace(0, thermostat("1234")).is_ok());
        assert!(matches!(
            home.replace(0, thermostat("2345")),
            Err(Error::DuplicateDevice(_))
        ));
        assert!(matches!(home.replace(9, light("x")), Err(Error::NotFound(_))));

        let removed = home.remove("2345").unwrap();
        assert!(removed.is::<Thermostat>());
        assert_eq!(home.len(), 2);
        assert!(home.remove("2345").is_none());
    }

    #[test]
    fn test_iter_mut_reaches_devices() {
        let mut home = sample_home();
        for device in home.iter_mut() {
            device.base_mut().set_location("Attic");
        }
        assert!(home.iter().all(|device| device.location() == "Attic"));
    }

    #[test]
    fn test_save_and_load() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("home.json");
        let home = sample_home();
        home.save(&path)?;

        let loaded = Home::load(&path, DeviceFactory::new(logger()))?;
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.to_document(), home.to_document());
        Ok(())
    }

    #[test]
    fn test_open_from_config() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("cabin.json");
        sample_home().save(&path)?;

        let mut config = Config::default();
        config.home.document = path.to_string_lossy().to_string();
        let home = Home::open(&config, logger())?;
        assert_eq!(home.name(), "Cabin");
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = Home::load(dir.path().join("absent.json"), DeviceFactory::default())
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Home::load(&path, DeviceFactory::default()).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_display_is_pretty_document() {
        let home = sample_home();
        let text = home.to_string();
        assert!(text.starts_with("{\n"));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, Value::Object(home.to_document()));
    }
}
