/*!
 * Device trait and core device abstractions.
 *
 * This module defines the state shared by every simulated device
 * ([`DeviceBase`]), the [`Schema`] trait a concrete device implements to
 * publish its field table, and the object-safe [`Device`] trait the rest of
 * the workspace works with.
 */
use std::any::Any;
use std::fmt::{self, Debug};

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;

use homesim_core::log_to;
use homesim_core::logging::Logger;
use homesim_core::types::{Document, Id, Value};
use homesim_core::utils::{format_timestamp, format_version, now, parse_timestamp, parse_version};

use crate::error::{DeviceError, Result};
use crate::field::{accepted, expect_bool, expect_str, ApplyOrder, FieldTable, FieldTableBuilder};

/// Statuses every device accepts unless its type narrows the set
pub const DEFAULT_STATUSES: &[&str] = &["on", "off", "timer"];

/// Software version stamped on new devices
pub const DEFAULT_SOFTWARE_VERSION: &str = "2021.07.28";

/// Parameters every device exposes through [`Device::to_api`]
pub const BASE_EXPOSED: &[&str] = &[
    "device_type",
    "name",
    "device_id",
    "software_version",
    "is_online",
    "last_connected",
];

/// State common to all devices
#[derive(Clone)]
pub struct DeviceBase {
    device_id: Id,
    device_type: &'static str,
    name: String,
    location: String,
    status: String,
    statuses: &'static [&'static str],
    is_online: bool,
    last_connected: DateTime<Utc>,
    software_version: NaiveDate,
    logger: Logger,
}

impl DeviceBase {
    /// Create the shared state for a device of the given type
    pub fn new(device_type: &'static str, statuses: &'static [&'static str], logger: Logger) -> Self {
        let base = Self {
            device_id: Id::generate(),
            device_type,
            name: "unnamed".to_string(),
            location: "none".to_string(),
            status: "off".to_string(),
            statuses,
            is_online: true,
            last_connected: now(),
            software_version: parse_version(DEFAULT_SOFTWARE_VERSION).unwrap_or_default(),
            logger,
        };
        log_to!(
            base.logger,
            debug,
            device = %base.device_id,
            device_type,
            "create device"
        );
        base
    }

    /// The unique identifier
    pub fn device_id(&self) -> &Id {
        &self.device_id
    }

    /// Replace the identifier
    pub fn set_device_id(&mut self, id: Id) {
        self.log_set("device_id", &id);
        self.device_id = id;
    }

    /// The fixed type tag
    pub fn device_type(&self) -> &'static str {
        self.device_type
    }

    /// The user-facing name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the user-facing name
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
        self.log_set("name", &self.name);
    }

    /// Where the device is installed
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Set where the device is installed
    pub fn set_location<S: Into<String>>(&mut self, location: S) {
        self.location = location.into();
        self.log_set("location", &self.location);
    }

    /// Name, type and location in one string
    pub fn name_long(&self) -> String {
        format!("{} {} ({})", self.name, self.device_type, self.location)
    }

    /// The current status
    pub fn status(&self) -> &str {
        &self.status
    }

    /// The statuses this device accepts
    pub fn statuses(&self) -> &'static [&'static str] {
        self.statuses
    }

    /// Set the status.
    ///
    /// Returns `false`, logs a warning and keeps the current status when
    /// `status` is not one of [`DeviceBase::statuses`].
    pub fn set_status(&mut self, status: &str) -> bool {
        if !self.statuses.iter().any(|s| *s == status) {
            log_to!(
                self.logger,
                warn,
                device = %self.device_id,
                field = "status",
                value = status,
                "abort set status -- not in {:?}",
                self.statuses
            );
            return false;
        }
        self.status = status.to_string();
        self.log_set("status", status);
        true
    }

    /// Whether the device is reachable
    pub fn is_online(&self) -> bool {
        self.is_online
    }

    /// Mark the device reachable or not
    pub fn set_is_online(&mut self, online: bool) {
        self.is_online = online;
        self.log_set("is_online", &online);
    }

    /// When the device was last reported on
    pub fn last_connected(&self) -> &DateTime<Utc> {
        &self.last_connected
    }

    /// Set when the device was last reported on
    pub fn set_last_connected(&mut self, timestamp: DateTime<Utc>) {
        self.last_connected = timestamp;
        self.log_set("last_connected", &format_timestamp(&timestamp));
    }

    /// Refresh the last connection time to now
    pub fn touch(&mut self) {
        self.last_connected = now();
    }

    /// The software version date
    pub fn software_version(&self) -> &NaiveDate {
        &self.software_version
    }

    /// Set the software version from its `%Y.%m.%d` form.
    ///
    /// Returns `false` and logs a warning when the text does not parse.
    pub fn set_software_version(&mut self, version: &str) -> bool {
        match parse_version(version) {
            Some(parsed) => {
                self.software_version = parsed;
                self.log_set("software_version", version);
                true
            }
            None => {
                log_to!(
                    self.logger,
                    warn,
                    device = %self.device_id,
                    field = "software_version",
                    value = version,
                    "abort set software_version -- expected %Y.%m.%d"
                );
                false
            }
        }
    }

    /// The logger events are routed through
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Route future events through another logger
    pub fn set_logger(&mut self, logger: Logger) {
        self.logger = logger;
        log_to!(self.logger, debug, device = %self.device_id, "set logger");
    }

    /// Log an accepted field change
    pub fn log_set<V: fmt::Display + ?Sized>(&self, field: &str, value: &V) {
        log_to!(
            self.logger,
            info,
            device = %self.device_id,
            field,
            value = %value,
            "set"
        );
    }

    /// Log a rejected field change
    pub fn log_rejected<V: fmt::Display + ?Sized>(&self, field: &str, value: &V, reason: &str) {
        log_to!(
            self.logger,
            warn,
            device = %self.device_id,
            field,
            value = %value,
            "abort set {} -- {}",
            field,
            reason
        );
    }
}

impl Debug for DeviceBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceBase")
            .field("device_id", &self.device_id)
            .field("device_type", &self.device_type)
            .field("name", &self.name)
            .field("location", &self.location)
            .field("status", &self.status)
            .finish()
    }
}

/// Static description of a concrete device type.
///
/// Implementing this trait is all a concrete device needs to do: [`Device`]
/// is provided for every `Schema` type.
pub trait Schema: Sized + Debug + Send + 'static {
    /// The class name written to documents and accepted by the factory
    const CLASS_NAME: &'static str;

    /// The type's resolved field table
    fn field_table() -> &'static FieldTable<Self>;

    /// The shared device state
    fn device_base(&self) -> &DeviceBase;

    /// The shared device state, mutably
    fn device_base_mut(&mut self) -> &mut DeviceBase;

    /// Builder-style identifier override
    fn with_id<I: Into<Id>>(mut self, id: I) -> Self {
        self.device_base_mut().set_device_id(id.into());
        self
    }

    /// Builder-style name override
    fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.device_base_mut().set_name(name);
        self
    }

    /// Builder-style location override
    fn with_location<S: Into<String>>(mut self, location: S) -> Self {
        self.device_base_mut().set_location(location);
        self
    }
}

/// The field descriptors shared by every device type.
///
/// Concrete types start their tables from this builder.
pub fn base_fields<D: Schema>() -> FieldTableBuilder<D> {
    FieldTable::builder()
        .read_write(
            "device_id",
            |d: &D| json!(d.device_base().device_id().as_str()),
            |d: &mut D, v: &Value| {
                let id = expect_str("device_id", v)?;
                d.device_base_mut().set_device_id(Id::from(id));
                Ok(())
            },
        )
        .read_only("device_type", |d: &D| json!(d.device_base().device_type()))
        .read_write(
            "name",
            |d: &D| json!(d.device_base().name()),
            |d: &mut D, v: &Value| {
                let name = expect_str("name", v)?;
                d.device_base_mut().set_name(name);
                Ok(())
            },
        )
        .read_only("name_long", |d: &D| json!(d.device_base().name_long()))
        .read_write(
            "location",
            |d: &D| json!(d.device_base().location()),
            |d: &mut D, v: &Value| {
                let location = expect_str("location", v)?;
                d.device_base_mut().set_location(location);
                Ok(())
            },
        )
        .read_write(
            "status",
            |d: &D| json!(d.device_base().status()),
            |d: &mut D, v: &Value| {
                let status = expect_str("status", v)?;
                let ok = d.device_base_mut().set_status(status);
                accepted("status", ok, v)
            },
        )
        .read_write(
            "is_online",
            |d: &D| json!(d.device_base().is_online()),
            |d: &mut D, v: &Value| {
                let online = expect_bool("is_online", v)?;
                d.device_base_mut().set_is_online(online);
                Ok(())
            },
        )
        .read_write(
            "last_connected",
            |d: &D| json!(format_timestamp(d.device_base().last_connected())),
            |d: &mut D, v: &Value| {
                let text = expect_str("last_connected", v)?;
                match parse_timestamp(text) {
                    Some(timestamp) => {
                        d.device_base_mut().set_last_connected(timestamp);
                        Ok(())
                    }
                    None => {
                        d.device_base().log_rejected("last_connected", text, "not an RFC 3339 timestamp");
                        Err(DeviceError::rejected("last_connected", text))
                    }
                }
            },
        )
        .read_write(
            "software_version",
            |d: &D| json!(format_version(d.device_base().software_version())),
            |d: &mut D, v: &Value| {
                let version = expect_str("software_version", v)?;
                let ok = d.device_base_mut().set_software_version(version);
                accepted("software_version", ok, v)
            },
        )
        .expose(BASE_EXPOSED)
}

/// The device interface used by factories and homes
pub trait Device: Debug + Send + 'static {
    /// The shared device state
    fn base(&self) -> &DeviceBase;

    /// The shared device state, mutably
    fn base_mut(&mut self) -> &mut DeviceBase;

    /// The concrete class name
    fn class_name(&self) -> &'static str;

    /// The ordered names [`Device::to_api`] returns
    fn exposed_parameters(&self) -> &'static [&'static str];

    /// Every field name the device knows
    fn field_names(&self) -> Vec<&'static str>;

    /// Read a field by name
    fn field(&self, name: &str) -> Option<Value>;

    /// Write a field by name
    fn set_field(&mut self, name: &str, value: &Value) -> Result<()>;

    /// Refresh `last_connected` and return the exposed parameters in order
    fn to_api(&mut self) -> Document;

    /// Every persisted, settable field, suitable for rebuilding the device
    fn to_properties(&self) -> Document;

    /// Apply every key of `doc` through its setter.
    ///
    /// Unknown and read-only keys are skipped with a warning. Values the
    /// setter refuses leave the field unchanged.
    fn from_json(&mut self, doc: &Document);

    /// Upcast for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete type
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// The unique identifier
    fn device_id(&self) -> &Id {
        self.base().device_id()
    }

    /// The fixed type tag
    fn device_type(&self) -> &'static str {
        self.base().device_type()
    }

    /// The user-facing name
    fn name(&self) -> &str {
        self.base().name()
    }

    /// Where the device is installed
    fn location(&self) -> &str {
        self.base().location()
    }

    /// The current status
    fn status(&self) -> &str {
        self.base().status()
    }

    /// Set the status; see [`DeviceBase::set_status`]
    fn set_status(&mut self, status: &str) -> bool {
        self.base_mut().set_status(status)
    }

    /// The logger events are routed through
    fn logger(&self) -> &Logger {
        self.base().logger()
    }

    /// Route future events through another logger
    fn set_logger(&mut self, logger: Logger) {
        self.base_mut().set_logger(logger)
    }
}

impl<T: Schema> Device for T {
    fn base(&self) -> &DeviceBase {
        self.device_base()
    }

    fn base_mut(&mut self) -> &mut DeviceBase {
        self.device_base_mut()
    }

    fn class_name(&self) -> &'static str {
        T::CLASS_NAME
    }

    fn exposed_parameters(&self) -> &'static [&'static str] {
        T::field_table().exposed()
    }

    fn field_names(&self) -> Vec<&'static str> {
        T::field_table().names()
    }

    fn field(&self, name: &str) -> Option<Value> {
        T::field_table().get(name).map(|field| field.read(self))
    }

    fn set_field(&mut self, name: &str, value: &Value) -> Result<()> {
        match T::field_table().get(name) {
            Some(field) => field.write(self, value),
            None => Err(DeviceError::UnknownField(name.to_string())),
        }
    }

    fn to_api(&mut self) -> Document {
        self.device_base_mut().touch();
        let this: &T = self;
        let table = T::field_table();
        table
            .exposed()
            .iter()
            .filter_map(|name| {
                table
                    .get(name)
                    .map(|field| (name.to_string(), field.read(this)))
            })
            .collect()
    }

    fn to_properties(&self) -> Document {
        T::field_table()
            .iter()
            .filter(|field| field.is_persisted())
            .map(|field| (field.name().to_string(), field.read(self)))
            .collect()
    }

    fn from_json(&mut self, doc: &Document) {
        let table = T::field_table();
        let mut entries: Vec<(&String, &Value)> = doc.iter().collect();
        entries.sort_by_key(|(key, _)| {
            table
                .get(key)
                .map(|field| field.order())
                .unwrap_or(ApplyOrder::Normal)
        });

        for (key, value) in entries {
            let result = match table.get(key) {
                Some(field) if field.is_settable() => field.write(self, value),
                _ => {
                    log_to!(
                        self.device_base().logger(),
                        warn,
                        device = %self.device_base().device_id(),
                        field = key.as_str(),
                        "abort set -- 'set_{}' not in {}",
                        key,
                        self.device_base().device_type()
                    );
                    continue;
                }
            };

            if let Err(e) = result {
                // Domain rejections were already logged by the setter
                if e.is_rejection() {
                    log_to!(self.device_base().logger(), debug, field = key.as_str(), "{}", e);
                } else {
                    log_to!(
                        self.device_base().logger(),
                        warn,
                        device = %self.device_base().device_id(),
                        field = key.as_str(),
                        "abort set -- {}",
                        e
                    );
                }
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn Device {
    /// Borrow the device as its concrete type
    pub fn downcast_ref<T: Device + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow the device as its concrete type
    pub fn downcast_mut<T: Device + 'static>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Whether the device is of concrete type `T`
    pub fn is<T: Device + 'static>(&self) -> bool {
        self.as_any().is::<T>()
    }
}
