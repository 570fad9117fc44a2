/*!
 * Smart plug device implementation.
 *
 * A plug powers one simulated appliance, picked at random when the plug is
 * created. Power readings are sampled from that appliance's range while the
 * plug is on.
 */
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;

use homesim_core::logging::Logger;
use homesim_core::types::Value;
use homesim_core::utils::{format_timestamp, now, parse_timestamp, timestamp_value};

use crate::device::{base_fields, DeviceBase, Schema, DEFAULT_STATUSES};
use crate::error::{DeviceError, Result};
use crate::field::{accepted, expect_bool, expect_str, ApplyOrder, FieldTable, Setter};

/// Parameters a plug adds to the base exposed list
pub const PLUG_EXPOSED: &[&str] = &[
    "status",
    "is_on",
    "power_draw",
    "last_on_time",
    "last_off_time",
];

/// The appliance behind a plug
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadProfile {
    /// Desk or ceiling fan
    #[serde(rename = "fan")]
    Fan,
    /// Television
    #[serde(rename = "tv")]
    Television,
    /// Sound system
    #[serde(rename = "sound_system")]
    SoundSystem,
    /// Pressing iron
    #[serde(rename = "pressing_iron")]
    Iron,
    /// Table lamp
    #[serde(rename = "lamp")]
    Lamp,
}

impl LoadProfile {
    /// Every profile
    pub const ALL: [LoadProfile; 5] = [
        LoadProfile::Fan,
        LoadProfile::Television,
        LoadProfile::SoundSystem,
        LoadProfile::Iron,
        LoadProfile::Lamp,
    ];

    /// Pick a profile at random
    pub fn random() -> Self {
        *Self::ALL
            .choose(&mut rand::thread_rng())
            .unwrap_or(&LoadProfile::Lamp)
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadProfile::Fan => "fan",
            LoadProfile::Television => "tv",
            LoadProfile::SoundSystem => "sound_system",
            LoadProfile::Iron => "pressing_iron",
            LoadProfile::Lamp => "lamp",
        }
    }

    /// Instantaneous draw while running, in watts
    pub fn watts(&self) -> RangeInclusive<f64> {
        match self {
            LoadProfile::Fan => 55.0..=75.0,
            LoadProfile::Television => 100.0..=150.0,
            LoadProfile::SoundSystem => 80.0..=120.0,
            LoadProfile::Iron => 90.0..=110.0,
            LoadProfile::Lamp => 40.0..=60.0,
        }
    }

    /// Typical hours of use per day
    pub fn daily_hours(&self) -> RangeInclusive<u32> {
        match self {
            LoadProfile::Fan => 18..=24,
            LoadProfile::Television | LoadProfile::SoundSystem => 22..=24,
            LoadProfile::Iron => 8..=10,
            LoadProfile::Lamp => 16..=18,
        }
    }

    /// Rated power, in watts
    pub fn rating(&self) -> f64 {
        *self.watts().end()
    }
}

impl fmt::Display for LoadProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadProfile {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        LoadProfile::ALL
            .iter()
            .copied()
            .find(|profile| profile.as_str() == s)
            .ok_or_else(|| format!("not in {:?}", LoadProfile::ALL.map(|p| p.as_str())))
    }
}

/// Switchable outlet with a simulated load
#[derive(Debug)]
pub struct SmartPlug {
    base: DeviceBase,
    load_profile: LoadProfile,
    is_on: bool,
    last_on_time: Option<DateTime<Utc>>,
    last_off_time: Option<DateTime<Utc>>,
}

impl SmartPlug {
    /// Create a new plug, switched off, with a random load
    pub fn new(logger: Logger) -> Self {
        Self {
            base: DeviceBase::new("Plug", DEFAULT_STATUSES, logger),
            load_profile: LoadProfile::random(),
            is_on: false,
            last_on_time: None,
            last_off_time: None,
        }
    }

    /// Builder-style load override
    pub fn with_load_profile(mut self, profile: LoadProfile) -> Self {
        self.load_profile = profile;
        self
    }

    /// The appliance behind the plug
    pub fn load_profile(&self) -> LoadProfile {
        self.load_profile
    }

    /// Replace the appliance behind the plug
    pub fn set_load_profile(&mut self, profile: LoadProfile) {
        self.load_profile = profile;
        self.base.log_set("load_profile", &profile);
    }

    /// Whether the plug is switched on
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Switch the plug; a change of state stamps the matching timestamp
    pub fn set_is_on(&mut self, on: bool) {
        if on != self.is_on {
            let stamp = Some(now());
            if on {
                self.last_on_time = stamp;
            } else {
                self.last_off_time = stamp;
            }
        }
        self.is_on = on;
        self.base.log_set("is_on", &on);
    }

    /// A fresh power reading in watts; zero while off
    pub fn power_draw(&self) -> f64 {
        if !self.is_on {
            return 0.0;
        }
        rand::thread_rng().gen_range(self.load_profile.watts())
    }

    /// A sampled day's energy use in watt-hours
    pub fn daily_energy_use(&self) -> f64 {
        let hours = rand::thread_rng().gen_range(self.load_profile.daily_hours());
        self.load_profile.rating() * f64::from(hours)
    }

    /// When the plug was last switched on
    pub fn last_on_time(&self) -> Option<&DateTime<Utc>> {
        self.last_on_time.as_ref()
    }

    /// When the plug was last switched off
    pub fn last_off_time(&self) -> Option<&DateTime<Utc>> {
        self.last_off_time.as_ref()
    }

    /// Overwrite a switching timestamp
    fn set_timestamp(&mut self, field: &'static str, value: &Value) -> Result<()> {
        let stamp = if value.is_null() {
            None
        } else {
            let text = expect_str(field, value)?;
            match parse_timestamp(text) {
                Some(timestamp) => Some(timestamp),
                None => {
                    self.base
                        .log_rejected(field, text, "not an RFC 3339 timestamp");
                    return Err(DeviceError::rejected(field, text));
                }
            }
        };

        let shown = stamp.as_ref().map(format_timestamp).unwrap_or_default();
        match field {
            "last_on_time" => self.last_on_time = stamp,
            _ => self.last_off_time = stamp,
        }
        self.base.log_set(field, &shown);
        Ok(())
    }
}

impl Default for SmartPlug {
    fn default() -> Self {
        Self::new(Logger::global())
    }
}

fn plug_fields() -> FieldTable<SmartPlug> {
    let set_last_on: Setter<SmartPlug> = |p, v| p.set_timestamp("last_on_time", v);
    let set_last_off: Setter<SmartPlug> = |p, v| p.set_timestamp("last_off_time", v);

    base_fields::<SmartPlug>()
        .read_write(
            "load_profile",
            |p: &SmartPlug| json!(p.load_profile.as_str()),
            |p: &mut SmartPlug, v: &Value| {
                let text = expect_str("load_profile", v)?;
                match text.parse::<LoadProfile>() {
                    Ok(profile) => {
                        p.set_load_profile(profile);
                        Ok(())
                    }
                    Err(reason) => {
                        p.base.log_rejected("load_profile", text, &reason);
                        accepted("load_profile", false, v)
                    }
                }
            },
        )
        .read_write(
            "is_on",
            |p: &SmartPlug| json!(p.is_on),
            |p: &mut SmartPlug, v: &Value| {
                let on = expect_bool("is_on", v)?;
                p.set_is_on(on);
                Ok(())
            },
        )
        .read_only("power_draw", |p: &SmartPlug| json!(p.power_draw()))
        .read_only("daily_energy_use", |p: &SmartPlug| json!(p.daily_energy_use()))
        // Switching stamps these, so stored values are restored afterwards
        .ordered(
            "last_on_time",
            |p: &SmartPlug| timestamp_value(p.last_on_time.as_ref()),
            set_last_on,
            ApplyOrder::Last,
        )
        .ordered(
            "last_off_time",
            |p: &SmartPlug| timestamp_value(p.last_off_time.as_ref()),
            set_last_off,
            ApplyOrder::Last,
        )
        .expose(PLUG_EXPOSED)
        .build()
}

impl Schema for SmartPlug {
    const CLASS_NAME: &'static str = "SmartPlug";

    fn field_table() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<SmartPlug>> = OnceLock::new();
        TABLE.get_or_init(plug_fields)
    }

    fn device_base(&self) -> &DeviceBase {
        &self.base
    }

    fn device_base_mut(&mut self) -> &mut DeviceBase {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Device, BASE_EXPOSED};

    fn plug() -> SmartPlug {
        SmartPlug::new(Logger::ambient())
    }

    #[test]
    fn test_defaults() {
        let plug = plug();
        assert_eq!(plug.device_type(), "Plug");
        assert_eq!(plug.class_name(), "SmartPlug");
        assert!(!plug.is_on());
        assert!(plug.last_on_time().is_none());
        assert!(plug.last_off_time().is_none());
        assert_eq!(plug.power_draw(), 0.0);
    }

    #[test]
    fn test_power_draw_within_profile() {
        for profile in LoadProfile::ALL {
            let mut plug = plug().with_load_profile(profile);
            plug.set_is_on(true);
            for _ in 0..20 {
                assert!(profile.watts().contains(&plug.power_draw()));
            }
        }
    }

    #[test]
    fn test_daily_energy_use() {
        let plug = plug().with_load_profile(LoadProfile::Iron);
        let energy = plug.daily_energy_use();
        assert!((880.0..=1100.0).contains(&energy), "{}", energy);
    }

    #[test]
    fn test_toggling_stamps_times() {
        let mut plug = plug();
        plug.set_is_on(true);
        let on_time = *plug.last_on_time().unwrap();
        assert!(plug.last_off_time().is_none());

        // Setting the same state again does not restamp
        plug.set_is_on(true);
        assert_eq!(plug.last_on_time(), Some(&on_time));

        plug.set_is_on(false);
        assert!(plug.last_off_time().unwrap() >= &on_time);
    }

    #[test]
    fn test_exposed_parameters() {
        let plug = plug();
        let exposed = plug.exposed_parameters();
        assert_eq!(&exposed[..BASE_EXPOSED.len()], BASE_EXPOSED);
        assert_eq!(&exposed[BASE_EXPOSED.len()..], PLUG_EXPOSED);
    }

    #[test]
    fn test_null_timestamps_serialize_as_null() {
        let props = plug().to_properties();
        assert_eq!(props["last_on_time"], Value::Null);
        assert_eq!(props["last_off_time"], Value::Null);
        assert!(!props.contains_key("power_draw"));
    }

    #[test]
    fn test_properties_round_trip_keeps_load_and_times() {
        let mut original = plug().with_load_profile(LoadProfile::Television);
        original.set_is_on(true);
        original.set_is_on(false);

        let mut copy = plug().with_load_profile(LoadProfile::Fan);
        copy.from_json(&original.to_properties());
        assert_eq!(copy.load_profile(), LoadProfile::Television);
        assert_eq!(copy.to_properties(), original.to_properties());
    }

    #[test]
    fn test_invalid_timestamp_is_rejected() {
        let mut plug = plug();
        let err = plug
            .set_field("last_on_time", &json!("yesterday"))
            .unwrap_err();
        assert!(err.is_rejection());
        assert!(plug.last_on_time().is_none());
    }

    #[test]
    fn test_profile_parsing() {
        assert_eq!("tv".parse::<LoadProfile>(), Ok(LoadProfile::Television));
        assert!("toaster".parse::<LoadProfile>().is_err());
    }
}
