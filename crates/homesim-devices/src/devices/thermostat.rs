/*!
 * Thermostat device implementation.
 *
 * A simulated Nest-style thermostat. Temperatures are stored in Kelvin and
 * converted at the accessor boundary according to the selected
 * [`TemperatureScale`]. The HVAC mode selects which setpoint the derived
 * target temperature reports.
 */
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use homesim_core::config::LockPolicy;
use homesim_core::logging::Logger;
use homesim_core::types::Value;
use homesim_core::units::{kelvin_to_celsius, kelvin_to_fahrenheit, TemperatureScale};
use homesim_core::utils::{
    duration_to_minutes, format_timestamp, minutes_to_duration, now, parse_timestamp,
};

use crate::device::{base_fields, DeviceBase, Schema, DEFAULT_STATUSES};
use crate::error::DeviceError;
use crate::field::{accepted, expect_bool, expect_f64, expect_str, ApplyOrder, FieldTable};

/// Parameters a thermostat adds to the base exposed list
pub const THERMOSTAT_EXPOSED: &[&str] = &[
    "status",
    "humidity",
    "ambient_temperature",
    "target_temperature",
    "temperature_scale",
    "hvac_mode",
    "fan_timer_timeout",
];

/// Default fan timer length, in minutes
pub const DEFAULT_FAN_TIMER_MINUTES: f64 = 5.0;

/// Thermostat operating modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HvacMode {
    /// Heat to the high setpoint
    Heat,
    /// Cool to the low setpoint
    Cool,
    /// Heat or cool, whichever the ambient temperature calls for
    HeatCool,
    /// Energy saving band
    Eco,
    /// Off
    #[default]
    Off,
}

impl HvacMode {
    /// Every mode, in wire order
    pub const ALL: [HvacMode; 5] = [
        HvacMode::Heat,
        HvacMode::Cool,
        HvacMode::HeatCool,
        HvacMode::Eco,
        HvacMode::Off,
    ];

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            HvacMode::Heat => "heat",
            HvacMode::Cool => "cool",
            HvacMode::HeatCool => "heat-cool",
            HvacMode::Eco => "eco",
            HvacMode::Off => "off",
        }
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HvacMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        HvacMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| format!("not in {:?}", HvacMode::ALL.map(|m| m.as_str())))
    }
}

/// The temperature-bearing fields of a thermostat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setpoint {
    /// Temperature measured at the device
    Ambient,
    /// Upper setpoint
    TargetHigh,
    /// Lower setpoint
    TargetLow,
    /// Upper eco setpoint
    EcoHigh,
    /// Lower eco setpoint
    EcoLow,
    /// Upper bound of the locked range
    LockedMax,
    /// Lower bound of the locked range
    LockedMin,
}

impl Setpoint {
    /// The field name
    pub fn name(&self) -> &'static str {
        match self {
            Setpoint::Ambient => "ambient_temperature",
            Setpoint::TargetHigh => "target_temperature_high",
            Setpoint::TargetLow => "target_temperature_low",
            Setpoint::EcoHigh => "eco_temperature_high",
            Setpoint::EcoLow => "eco_temperature_low",
            Setpoint::LockedMax => "locked_temp_max",
            Setpoint::LockedMin => "locked_temp_min",
        }
    }

    /// Whether the locked range applies to this setpoint
    fn is_guarded(&self) -> bool {
        matches!(
            self,
            Setpoint::TargetHigh | Setpoint::TargetLow | Setpoint::EcoHigh | Setpoint::EcoLow
        )
    }
}

/// Thermostat device implementation
#[derive(Debug)]
pub struct Thermostat {
    base: DeviceBase,
    temperature_scale: TemperatureScale,
    ambient_temperature: f64,
    target_temperature_high: f64,
    target_temperature_low: f64,
    eco_temperature_high: f64,
    eco_temperature_low: f64,
    locked_temp_max: f64,
    locked_temp_min: f64,
    is_locked: bool,
    lock_policy: LockPolicy,
    hvac_mode: HvacMode,
    previous_hvac_mode: Option<HvacMode>,
    fan_timer_duration: Duration,
    fan_timer_timeout: DateTime<Utc>,
    has_fan: bool,
    humidity: f64,
    sunlight_correction_enabled: bool,
    sunlight_correction_active: bool,
}

impl Thermostat {
    /// Create a new thermostat that logs through `logger`
    pub fn new(logger: Logger) -> Self {
        let fan_timer_duration = minutes_to_duration(DEFAULT_FAN_TIMER_MINUTES);
        Self {
            base: DeviceBase::new("Thermostat", DEFAULT_STATUSES, logger),
            temperature_scale: TemperatureScale::Kelvin,
            ambient_temperature: 0.0,
            target_temperature_high: 0.0,
            target_temperature_low: 0.0,
            eco_temperature_high: 0.0,
            eco_temperature_low: 0.0,
            locked_temp_max: 0.0,
            locked_temp_min: 0.0,
            is_locked: false,
            lock_policy: LockPolicy::default(),
            hvac_mode: HvacMode::Off,
            previous_hvac_mode: None,
            fan_timer_duration,
            fan_timer_timeout: now() + fan_timer_duration,
            has_fan: true,
            humidity: 0.0,
            sunlight_correction_enabled: false,
            sunlight_correction_active: false,
        }
    }

    /// Builder-style lock policy override
    pub fn with_lock_policy(mut self, policy: LockPolicy) -> Self {
        self.lock_policy = policy;
        self
    }

    /// The scale numeric temperatures are read and written in
    pub fn temperature_scale(&self) -> TemperatureScale {
        self.temperature_scale
    }

    /// Set the scale from its one-letter form.
    ///
    /// Stored temperatures are unaffected; only how they are read and
    /// written changes.
    pub fn set_temperature_scale(&mut self, scale: &str) -> bool {
        match scale.parse::<TemperatureScale>() {
            Ok(parsed) => {
                self.temperature_scale = parsed;
                self.base.log_set("temperature_scale", scale);
                true
            }
            Err(reason) => {
                self.base.log_rejected("temperature_scale", scale, &reason);
                false
            }
        }
    }

    /// The stored Kelvin value of a setpoint
    pub fn kelvin(&self, setpoint: Setpoint) -> f64 {
        match setpoint {
            Setpoint::Ambient => self.ambient_temperature,
            Setpoint::TargetHigh => self.target_temperature_high,
            Setpoint::TargetLow => self.target_temperature_low,
            Setpoint::EcoHigh => self.eco_temperature_high,
            Setpoint::EcoLow => self.eco_temperature_low,
            Setpoint::LockedMax => self.locked_temp_max,
            Setpoint::LockedMin => self.locked_temp_min,
        }
    }

    fn kelvin_mut(&mut self, setpoint: Setpoint) -> &mut f64 {
        match setpoint {
            Setpoint::Ambient => &mut self.ambient_temperature,
            Setpoint::TargetHigh => &mut self.target_temperature_high,
            Setpoint::TargetLow => &mut self.target_temperature_low,
            Setpoint::EcoHigh => &mut self.eco_temperature_high,
            Setpoint::EcoLow => &mut self.eco_temperature_low,
            Setpoint::LockedMax => &mut self.locked_temp_max,
            Setpoint::LockedMin => &mut self.locked_temp_min,
        }
    }

    /// A setpoint in the current scale
    pub fn temperature(&self, setpoint: Setpoint) -> f64 {
        self.temperature_scale.from_kelvin(self.kelvin(setpoint))
    }

    /// A setpoint in Celsius
    pub fn temperature_c(&self, setpoint: Setpoint) -> f64 {
        kelvin_to_celsius(self.kelvin(setpoint))
    }

    /// A setpoint in Fahrenheit
    pub fn temperature_f(&self, setpoint: Setpoint) -> f64 {
        kelvin_to_fahrenheit(self.kelvin(setpoint))
    }

    /// Set a setpoint from a value in the current scale.
    ///
    /// While the thermostat is locked, target and eco setpoints are held to
    /// the locked range according to the [`LockPolicy`].
    pub fn set_temperature(&mut self, setpoint: Setpoint, value: f64) -> bool {
        let name = setpoint.name();
        if !value.is_finite() {
            self.base.log_rejected(name, &value, "not a finite number");
            return false;
        }

        let mut kelvin = self.temperature_scale.to_kelvin(value);
        if let Some((min, max)) = self.enforced_range(setpoint) {
            match self.lock_policy {
                LockPolicy::Clamp => kelvin = kelvin.clamp(min, max),
                LockPolicy::Reject if kelvin < min || kelvin > max => {
                    self.base
                        .log_rejected(name, &value, "outside the locked temperature range");
                    return false;
                }
                _ => {}
            }
        }

        *self.kelvin_mut(setpoint) = kelvin;
        self.base.log_set(name, &value);
        true
    }

    /// The locked range in Kelvin, if it currently constrains `setpoint`
    fn enforced_range(&self, setpoint: Setpoint) -> Option<(f64, f64)> {
        let enforced = setpoint.is_guarded()
            && self.is_locked
            && self.lock_policy != LockPolicy::Track
            && self.locked_temp_min <= self.locked_temp_max;
        enforced.then_some((self.locked_temp_min, self.locked_temp_max))
    }

    /// The setpoint the current mode is driving toward, in Kelvin
    fn target_kelvin(&self) -> f64 {
        match self.hvac_mode {
            HvacMode::Cool => self.target_temperature_low,
            HvacMode::Heat => self.target_temperature_high,
            HvacMode::HeatCool => {
                self.band_target(self.target_temperature_low, self.target_temperature_high)
            }
            HvacMode::Eco => self.band_target(self.eco_temperature_low, self.eco_temperature_high),
            HvacMode::Off => self.ambient_temperature,
        }
    }

    /// Pick the low setpoint when ambient sits in the upper half of the band
    fn band_target(&self, low: f64, high: f64) -> f64 {
        if self.ambient_temperature >= (low + high) / 2.0 {
            low
        } else {
            high
        }
    }

    /// The derived target temperature in the current scale
    pub fn target_temperature(&self) -> f64 {
        self.temperature_scale.from_kelvin(self.target_kelvin())
    }

    /// The derived target temperature in Celsius
    pub fn target_temperature_c(&self) -> f64 {
        kelvin_to_celsius(self.target_kelvin())
    }

    /// The derived target temperature in Fahrenheit
    pub fn target_temperature_f(&self) -> f64 {
        kelvin_to_fahrenheit(self.target_kelvin())
    }

    /// The current HVAC mode
    pub fn hvac_mode(&self) -> HvacMode {
        self.hvac_mode
    }

    /// The mode held before the last successful transition
    pub fn previous_hvac_mode(&self) -> Option<HvacMode> {
        self.previous_hvac_mode
    }

    /// Transition to a new HVAC mode.
    ///
    /// On success the old mode becomes the previous mode. An unknown mode
    /// changes neither.
    pub fn set_hvac_mode(&mut self, mode: &str) -> bool {
        match mode.parse::<HvacMode>() {
            Ok(parsed) => {
                self.previous_hvac_mode = Some(self.hvac_mode);
                self.hvac_mode = parsed;
                self.base.log_set("hvac_mode", mode);
                true
            }
            Err(reason) => {
                self.base.log_rejected("hvac_mode", mode, &reason);
                false
            }
        }
    }

    /// Overwrite the previous mode; an empty string clears it
    pub fn set_previous_hvac_mode(&mut self, mode: &str) -> bool {
        if mode.is_empty() {
            self.previous_hvac_mode = None;
            self.base.log_set("previous_hvac_mode", mode);
            return true;
        }
        match mode.parse::<HvacMode>() {
            Ok(parsed) => {
                self.previous_hvac_mode = Some(parsed);
                self.base.log_set("previous_hvac_mode", mode);
                true
            }
            Err(reason) => {
                self.base.log_rejected("previous_hvac_mode", mode, &reason);
                false
            }
        }
    }

    /// Whether the thermostat is in its energy saving mode
    pub fn has_leaf(&self) -> bool {
        self.hvac_mode == HvacMode::Eco
    }

    /// Whether the system is currently heating
    pub fn is_heating(&self) -> bool {
        self.ambient_temperature < self.target_kelvin()
            && self.can_heat()
            && matches!(self.hvac_mode, HvacMode::Heat | HvacMode::HeatCool)
    }

    /// Whether the system is currently cooling
    pub fn is_cooling(&self) -> bool {
        self.ambient_temperature > self.target_kelvin()
            && self.can_cool()
            && matches!(self.hvac_mode, HvacMode::Cool | HvacMode::HeatCool)
    }

    /// Simulated systems can always heat
    pub fn can_heat(&self) -> bool {
        true
    }

    /// Simulated systems can always cool
    pub fn can_cool(&self) -> bool {
        true
    }

    /// Whether the locked range is active
    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    /// Lock or unlock the setpoint range
    pub fn set_is_locked(&mut self, locked: bool) {
        self.is_locked = locked;
        self.base.log_set("is_locked", &locked);
    }

    /// How the locked range is enforced
    pub fn lock_policy(&self) -> LockPolicy {
        self.lock_policy
    }

    /// Change how the locked range is enforced
    pub fn set_lock_policy(&mut self, policy: LockPolicy) {
        self.lock_policy = policy;
        self.base.log_set("lock_policy", &format!("{:?}", policy));
    }

    /// Length of the fan timer, in minutes
    pub fn fan_timer_duration(&self) -> f64 {
        duration_to_minutes(&self.fan_timer_duration)
    }

    /// Set the fan timer length; negative lengths are rejected
    pub fn set_fan_timer_duration(&mut self, minutes: f64) -> bool {
        if !minutes.is_finite() || minutes < 0.0 {
            self.base
                .log_rejected("fan_timer_duration", &minutes, "must be a non-negative number of minutes");
            return false;
        }
        self.fan_timer_duration = minutes_to_duration(minutes);
        self.base.log_set("fan_timer_duration", &minutes);
        true
    }

    /// When the fan timer runs out
    pub fn fan_timer_timeout(&self) -> &DateTime<Utc> {
        &self.fan_timer_timeout
    }

    /// Pin the fan timer to run out at `timeout`
    pub fn set_fan_timer_timeout(&mut self, timeout: DateTime<Utc>) {
        self.fan_timer_timeout = timeout;
        self.base
            .log_set("fan_timer_timeout", &format_timestamp(&timeout));
    }

    /// Restart the fan timer from now
    pub fn start_fan_timer(&mut self) {
        self.set_fan_timer_timeout(now() + self.fan_timer_duration);
    }

    /// Whether the fan timer is still running
    pub fn fan_timer_active(&self) -> bool {
        self.fan_timer_timeout > now()
    }

    /// Whether the system has a fan
    pub fn has_fan(&self) -> bool {
        self.has_fan
    }

    /// Humidity as a whole percentage
    pub fn humidity(&self) -> i64 {
        (self.humidity * 100.0).round() as i64
    }

    /// Set the humidity from a percentage in `0..=100`
    pub fn set_humidity(&mut self, percent: f64) -> bool {
        if !(0.0..=100.0).contains(&percent) {
            self.base
                .log_rejected("humidity", &percent, "must be between 0 and 100");
            return false;
        }
        self.humidity = percent / 100.0;
        self.base.log_set("humidity", &percent);
        true
    }

    fn set_flag(&mut self, field: &'static str, value: bool) {
        match field {
            "has_fan" => self.has_fan = value,
            "sunlight_correction_enabled" => self.sunlight_correction_enabled = value,
            "sunlight_correction_active" => self.sunlight_correction_active = value,
            _ => return,
        }
        self.base.log_set(field, &value);
    }
}

macro_rules! setpoint_accessors {
    ($($setpoint:ident => $get:ident, $get_c:ident, $get_f:ident, $set:ident;)+) => {
        impl Thermostat {
            $(
                #[doc = concat!("`", stringify!($get), "` in the current scale")]
                pub fn $get(&self) -> f64 {
                    self.temperature(Setpoint::$setpoint)
                }

                #[doc = concat!("`", stringify!($get), "` in Celsius")]
                pub fn $get_c(&self) -> f64 {
                    self.temperature_c(Setpoint::$setpoint)
                }

                #[doc = concat!("`", stringify!($get), "` in Fahrenheit")]
                pub fn $get_f(&self) -> f64 {
                    self.temperature_f(Setpoint::$setpoint)
                }

                #[doc = concat!("Set `", stringify!($get), "` from a value in the current scale")]
                pub fn $set(&mut self, value: f64) -> bool {
                    self.set_temperature(Setpoint::$setpoint, value)
                }
            )+
        }
    };
}

setpoint_accessors! {
    Ambient => ambient_temperature, ambient_temperature_c, ambient_temperature_f, set_ambient_temperature;
    TargetHigh => target_temperature_high, target_temperature_high_c, target_temperature_high_f, set_target_temperature_high;
    TargetLow => target_temperature_low, target_temperature_low_c, target_temperature_low_f, set_target_temperature_low;
    EcoHigh => eco_temperature_high, eco_temperature_high_c, eco_temperature_high_f, set_eco_temperature_high;
    EcoLow => eco_temperature_low, eco_temperature_low_c, eco_temperature_low_f, set_eco_temperature_low;
    LockedMax => locked_temp_max, locked_temp_max_c, locked_temp_max_f, set_locked_temp_max;
    LockedMin => locked_temp_min, locked_temp_min_c, locked_temp_min_f, set_locked_temp_min;
}

impl Default for Thermostat {
    fn default() -> Self {
        Self::new(Logger::global())
    }
}

/// A settable, persisted temperature field plus its read-only `_c` and `_f`
/// aliases
macro_rules! setpoint_fields {
    ($builder:expr, $($name:literal => $setpoint:expr),+ $(,)?) => {
        $builder
        $(
            .read_write(
                $name,
                |t: &Thermostat| json!(t.temperature($setpoint)),
                |t: &mut Thermostat, v: &Value| {
                    let value = expect_f64($name, v)?;
                    let ok = t.set_temperature($setpoint, value);
                    accepted($name, ok, v)
                },
            )
            .read_only(concat!($name, "_c"), |t: &Thermostat| json!(t.temperature_c($setpoint)))
            .read_only(concat!($name, "_f"), |t: &Thermostat| json!(t.temperature_f($setpoint)))
        )+
    };
}

/// A settable, persisted boolean field
macro_rules! flag_field {
    ($builder:expr, $name:literal, $get:expr) => {
        $builder.read_write($name, $get, |t: &mut Thermostat, v: &Value| {
            let value = expect_bool($name, v)?;
            t.set_flag($name, value);
            Ok(())
        })
    };
}

fn thermostat_fields() -> FieldTable<Thermostat> {
    let builder = base_fields::<Thermostat>()
        .ordered(
            "temperature_scale",
            |t: &Thermostat| json!(t.temperature_scale.as_str()),
            |t: &mut Thermostat, v: &Value| {
                let scale = expect_str("temperature_scale", v)?;
                let ok = t.set_temperature_scale(scale);
                accepted("temperature_scale", ok, v)
            },
            ApplyOrder::First,
        );

    let builder = setpoint_fields!(
        builder,
        "ambient_temperature" => Setpoint::Ambient,
        "target_temperature_high" => Setpoint::TargetHigh,
        "target_temperature_low" => Setpoint::TargetLow,
        "eco_temperature_high" => Setpoint::EcoHigh,
        "eco_temperature_low" => Setpoint::EcoLow,
        "locked_temp_max" => Setpoint::LockedMax,
        "locked_temp_min" => Setpoint::LockedMin,
    );

    let builder = builder
        .read_only("target_temperature", |t: &Thermostat| json!(t.target_temperature()))
        .read_only("target_temperature_c", |t: &Thermostat| json!(t.target_temperature_c()))
        .read_only("target_temperature_f", |t: &Thermostat| json!(t.target_temperature_f()))
        .read_write(
            "is_locked",
            |t: &Thermostat| json!(t.is_locked),
            |t: &mut Thermostat, v: &Value| {
                let locked = expect_bool("is_locked", v)?;
                t.set_is_locked(locked);
                Ok(())
            },
        )
        .read_write(
            "lock_policy",
            |t: &Thermostat| serde_json::to_value(t.lock_policy).unwrap_or(Value::Null),
            |t: &mut Thermostat, v: &Value| {
                let text = expect_str("lock_policy", v)?;
                match serde_json::from_value::<LockPolicy>(v.clone()) {
                    Ok(policy) => {
                        t.set_lock_policy(policy);
                        Ok(())
                    }
                    Err(_) => {
                        t.base
                            .log_rejected("lock_policy", text, "not in [\"track\", \"clamp\", \"reject\"]");
                        Err(DeviceError::rejected("lock_policy", text))
                    }
                }
            },
        )
        .read_write(
            "hvac_mode",
            |t: &Thermostat| json!(t.hvac_mode.as_str()),
            |t: &mut Thermostat, v: &Value| {
                let mode = expect_str("hvac_mode", v)?;
                let ok = t.set_hvac_mode(mode);
                accepted("hvac_mode", ok, v)
            },
        )
        // hvac_mode overwrites the previous mode, so restore it afterwards
        .ordered(
            "previous_hvac_mode",
            |t: &Thermostat| match t.previous_hvac_mode {
                Some(mode) => json!(mode.as_str()),
                None => Value::Null,
            },
            |t: &mut Thermostat, v: &Value| {
                let mode = if v.is_null() {
                    ""
                } else {
                    expect_str("previous_hvac_mode", v)?
                };
                let ok = t.set_previous_hvac_mode(mode);
                accepted("previous_hvac_mode", ok, v)
            },
            ApplyOrder::Last,
        )
        .read_only("has_leaf", |t: &Thermostat| json!(t.has_leaf()))
        .read_only("is_heating", |t: &Thermostat| json!(t.is_heating()))
        .read_only("is_cooling", |t: &Thermostat| json!(t.is_cooling()))
        .read_only("can_heat", |t: &Thermostat| json!(t.can_heat()))
        .read_only("can_cool", |t: &Thermostat| json!(t.can_cool()))
        .read_only("is_using_emergency_heat", |_| json!(false))
        .read_only("time_to_target", |_| json!("~0"))
        .read_write(
            "fan_timer_duration",
            |t: &Thermostat| json!(t.fan_timer_duration()),
            |t: &mut Thermostat, v: &Value| {
                let minutes = expect_f64("fan_timer_duration", v)?;
                let ok = t.set_fan_timer_duration(minutes);
                accepted("fan_timer_duration", ok, v)
            },
        )
        .read_write(
            "fan_timer_timeout",
            |t: &Thermostat| json!(format_timestamp(&t.fan_timer_timeout)),
            |t: &mut Thermostat, v: &Value| {
                if v.is_null() {
                    t.start_fan_timer();
                    return Ok(());
                }
                let text = expect_str("fan_timer_timeout", v)?;
                match parse_timestamp(text) {
                    Some(timeout) => {
                        t.set_fan_timer_timeout(timeout);
                        Ok(())
                    }
                    None => {
                        t.base
                            .log_rejected("fan_timer_timeout", text, "not an RFC 3339 timestamp");
                        Err(DeviceError::rejected("fan_timer_timeout", text))
                    }
                }
            },
        )
        .read_only("fan_timer_active", |t: &Thermostat| json!(t.fan_timer_active()))
        .read_write(
            "humidity",
            |t: &Thermostat| json!(t.humidity()),
            |t: &mut Thermostat, v: &Value| {
                let percent = expect_f64("humidity", v)?;
                let ok = t.set_humidity(percent);
                accepted("humidity", ok, v)
            },
        )
        .transient(
            "label",
            |t: &Thermostat| json!(t.base.name()),
            |t: &mut Thermostat, v: &Value| {
                let label = expect_str("label", v)?;
                t.base.set_name(label);
                Ok(())
            },
        );

    let builder = flag_field!(builder, "has_fan", |t: &Thermostat| json!(t.has_fan));
    let builder = flag_field!(
        builder,
        "sunlight_correction_enabled",
        |t: &Thermostat| json!(t.sunlight_correction_enabled)
    );
    let builder = flag_field!(
        builder,
        "sunlight_correction_active",
        |t: &Thermostat| json!(t.sunlight_correction_active)
    );

    builder.expose(THERMOSTAT_EXPOSED).build()
}

impl Schema for Thermostat {
    const CLASS_NAME: &'static str = "NestThermostat";

    fn field_table() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<Thermostat>> = OnceLock::new();
        TABLE.get_or_init(thermostat_fields)
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
    use tracing::Level;

    fn thermostat() -> Thermostat {
        Thermostat::new(Logger::ambient())
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} within {} of {}",
            actual,
            tolerance,
            expected
        );
    }

    #[test]
    fn test_defaults() {
        let t = thermostat();
        assert_eq!(t.device_type(), "Thermostat");
        assert_eq!(t.class_name(), "NestThermostat");
        assert_eq!(t.temperature_scale(), TemperatureScale::Kelvin);
        assert_eq!(t.hvac_mode(), HvacMode::Off);
        assert_eq!(t.previous_hvac_mode(), None);
        assert_eq!(t.fan_timer_duration(), DEFAULT_FAN_TIMER_MINUTES);
        assert!(t.fan_timer_active());
        assert!(t.has_fan());
        assert_eq!(t.lock_policy(), LockPolicy::Track);
    }

    #[test]
    fn test_fahrenheit_setpoint() {
        let mut t = thermostat();
        assert!(t.set_temperature_scale("F"));
        assert!(t.set_target_temperature_high(90.0));

        assert_close(t.target_temperature_high_f(), 90.0, 0.1);
        assert_close(t.target_temperature_high_c(), 32.2, 0.1);
        assert_close(t.target_temperature_high(), 90.0, 1e-9);
    }

    #[test]
    fn test_celsius_setpoint_is_stored_in_kelvin() {
        let mut t = thermostat();
        t.set_temperature_scale("C");
        t.set_eco_temperature_low(20.0);
        assert_close(t.kelvin(Setpoint::EcoLow), 293.15, 1e-9);
        assert_close(t.eco_temperature_low_f(), 68.0, 1e-9);
    }

    #[test]
    fn test_scale_change_does_not_touch_storage() {
        let mut t = thermostat();
        t.set_ambient_temperature(295.0);
        t.set_temperature_scale("F");
        t.set_temperature_scale("C");
        assert_close(t.kelvin(Setpoint::Ambient), 295.0, 1e-12);
        assert_close(t.ambient_temperature(), 21.85, 1e-9);
    }

    #[test]
    fn test_invalid_scale_is_rejected() {
        let (logger, buffer) = Logger::capture(Level::WARN);
        let mut t = Thermostat::new(logger);
        assert!(!t.set_temperature_scale("R"));
        assert_eq!(t.temperature_scale(), TemperatureScale::Kelvin);
        assert!(buffer.contents().contains("abort set temperature_scale"));
    }

    #[test]
    fn test_previous_hvac_mode_tracks_transitions() {
        let mut t = thermostat();
        let sequence = ["heat", "cool", "heat-cool", "eco", "off", "heat"];
        for (i, mode) in sequence.iter().enumerate() {
            assert!(t.set_hvac_mode(mode));
            if i > 0 {
                assert_eq!(t.previous_hvac_mode().map(|m| m.as_str()), Some(sequence[i - 1]));
            }
        }

        assert!(!t.set_hvac_mode("turbo"));
        assert_eq!(t.hvac_mode(), HvacMode::Heat);
        assert_eq!(t.previous_hvac_mode(), Some(HvacMode::Off));
    }

    #[test]
    fn test_target_temperature_by_mode() {
        let mut t = thermostat();
        t.set_target_temperature_low(290.0);
        t.set_target_temperature_high(300.0);
        t.set_eco_temperature_low(285.0);
        t.set_eco_temperature_high(305.0);
        t.set_ambient_temperature(292.0);

        assert_eq!(t.target_temperature(), 292.0);

        t.set_hvac_mode("cool");
        assert_eq!(t.target_temperature(), 290.0);

        t.set_hvac_mode("heat");
        assert_eq!(t.target_temperature(), 300.0);

        t.set_hvac_mode("heat-cool");
        assert_eq!(t.target_temperature(), 300.0);
        t.set_ambient_temperature(296.0);
        assert_eq!(t.target_temperature(), 290.0);

        t.set_hvac_mode("eco");
        assert_eq!(t.target_temperature(), 285.0);
        t.set_ambient_temperature(290.0);
        assert_eq!(t.target_temperature(), 305.0);
        assert!(t.has_leaf());
    }

    #[test]
    fn test_heating_and_cooling() {
        let mut t = thermostat();
        t.set_target_temperature_low(290.0);
        t.set_target_temperature_high(300.0);
        t.set_ambient_temperature(280.0);

        t.set_hvac_mode("heat");
        assert!(t.is_heating());
        assert!(!t.is_cooling());

        t.set_ambient_temperature(295.0);
        t.set_hvac_mode("cool");
        assert!(t.is_cooling());
        assert!(!t.is_heating());

        t.set_hvac_mode("off");
        assert!(!t.is_cooling());
        assert!(!t.is_heating());
    }

    #[test]
    fn test_humidity_percentage() {
        let mut t = thermostat();
        assert!(t.set_humidity(45.0));
        assert_eq!(t.humidity(), 45);
        assert_eq!(t.field("humidity"), Some(json!(45)));
        assert!(!t.set_humidity(140.0));
        assert_eq!(t.humidity(), 45);
    }

    #[test]
    fn test_lock_range_is_tracked_by_default() {
        let mut t = thermostat();
        t.set_locked_temp_min(290.0);
        t.set_locked_temp_max(295.0);
        t.set_is_locked(true);
        assert!(t.set_target_temperature_high(310.0));
        assert_eq!(t.target_temperature_high(), 310.0);
    }

    #[test]
    fn test_lock_range_clamps() {
        let mut t = thermostat().with_lock_policy(LockPolicy::Clamp);
        t.set_locked_temp_min(290.0);
        t.set_locked_temp_max(295.0);

        assert!(t.set_target_temperature_high(310.0));
        assert_eq!(t.target_temperature_high(), 310.0);

        t.set_is_locked(true);
        assert!(t.set_target_temperature_high(310.0));
        assert_eq!(t.target_temperature_high(), 295.0);
        assert!(t.set_eco_temperature_low(250.0));
        assert_eq!(t.eco_temperature_low(), 290.0);

        // The ambient reading is never constrained
        assert!(t.set_ambient_temperature(250.0));
        assert_eq!(t.ambient_temperature(), 250.0);
    }

    #[test]
    fn test_lock_range_rejects() {
        let (logger, buffer) = Logger::capture(Level::WARN);
        let mut t = Thermostat::new(logger).with_lock_policy(LockPolicy::Reject);
        t.set_locked_temp_min(290.0);
        t.set_locked_temp_max(295.0);
        t.set_is_locked(true);
        t.set_target_temperature_low(292.0);

        assert!(!t.set_target_temperature_low(280.0));
        assert_eq!(t.target_temperature_low(), 292.0);
        assert!(buffer.contents().contains("locked temperature range"));
    }

    #[test]
    fn test_fan_timer() {
        let mut t = thermostat();
        assert!(t.set_fan_timer_duration(10.0));
        t.start_fan_timer();
        let remaining = *t.fan_timer_timeout() - now();
        assert!(remaining > Duration::minutes(9));
        assert!(t.fan_timer_active());

        t.set_field("fan_timer_timeout", &json!("2020-01-01T00:00:00+00:00"))
            .unwrap();
        assert!(!t.fan_timer_active());

        t.set_field("fan_timer_timeout", &Value::Null).unwrap();
        assert!(t.fan_timer_active());

        assert!(!t.set_fan_timer_duration(-1.0));
        assert_eq!(t.fan_timer_duration(), 10.0);
    }

    #[test]
    fn test_label_aliases_name() {
        let mut t = thermostat();
        t.set_field("label", &json!("Hallway")).unwrap();
        assert_eq!(t.name(), "Hallway");
        assert_eq!(t.field("label"), Some(json!("Hallway")));
        assert!(!t.to_properties().contains_key("label"));
    }

    #[test]
    fn test_exposed_parameters() {
        let t = thermostat();
        let exposed = t.exposed_parameters();
        assert_eq!(&exposed[..BASE_EXPOSED.len()], BASE_EXPOSED);
        assert_eq!(&exposed[BASE_EXPOSED.len()..], THERMOSTAT_EXPOSED);
    }

    #[test]
    fn test_to_api_is_idempotent_apart_from_last_connected() {
        let mut t = thermostat();
        let mut first = t.to_api();
        let mut second = t.to_api();
        first.remove("last_connected");
        second.remove("last_connected");
        assert_eq!(first, second);
        assert!(first.contains_key("fan_timer_timeout"));
    }

    #[test]
    fn test_properties_exclude_aliases_and_derived_values() {
        let props = thermostat().to_properties();
        for key in props.keys() {
            assert!(!key.ends_with("_c") && !key.ends_with("_f"), "{}", key);
        }
        assert!(props.contains_key("temperature_scale"));
        assert!(props.contains_key("previous_hvac_mode"));
        assert!(!props.contains_key("target_temperature"));
        assert!(!props.contains_key("is_heating"));
    }

    #[test]
    fn test_from_json_applies_scale_first() {
        let mut t = thermostat();
        let doc = json!({
            "target_temperature_high": 90.0,
            "temperature_scale": "F",
        });
        t.from_json(doc.as_object().unwrap());
        assert_eq!(t.temperature_scale(), TemperatureScale::Fahrenheit);
        assert_close(t.target_temperature_high_f(), 90.0, 1e-9);
    }

    #[test]
    fn test_from_json_rejected_mode_keeps_state() {
        let (logger, buffer) = Logger::capture(Level::WARN);
        let mut t = Thermostat::new(logger);
        t.set_hvac_mode("heat");
        t.from_json(json!({ "hvac_mode": "blast" }).as_object().unwrap());

        assert_eq!(t.hvac_mode(), HvacMode::Heat);
        assert_eq!(t.previous_hvac_mode(), Some(HvacMode::Off));
        assert!(buffer.contents().contains("abort set hvac_mode"));
    }

    #[test]
    fn test_properties_round_trip() {
        let mut original = thermostat().with_id("1234").with_name("Hall");
        original.set_target_temperature_low(291.5);
        original.set_target_temperature_high(297.0);
        original.set_hvac_mode("cool");
        original.set_humidity(40.0);
        original.set_is_locked(true);

        let mut copy = thermostat();
        copy.from_json(&original.to_properties());
        assert_eq!(copy.to_properties(), original.to_properties());
        assert_eq!(copy.previous_hvac_mode(), Some(HvacMode::Off));
    }

    #[test]
    fn test_fresh_round_trip_keeps_empty_previous_mode() {
        let original = thermostat();
        let mut copy = thermostat();
        copy.from_json(&original.to_properties());
        assert_eq!(copy.previous_hvac_mode(), None);
        assert_eq!(copy.to_properties(), original.to_properties());
    }

    #[test]
    fn test_fahrenheit_round_trip_within_tolerance() {
        let mut original = thermostat();
        original.set_temperature_scale("F");
        original.set_target_temperature_high(72.5);

        let mut copy = thermostat();
        copy.from_json(&original.to_properties());
        assert_eq!(copy.temperature_scale(), TemperatureScale::Fahrenheit);
        assert_close(
            copy.kelvin(Setpoint::TargetHigh),
            original.kelvin(Setpoint::TargetHigh),
            1e-9,
        );
    }

    #[test]
    fn test_lock_policy_field() {
        let mut t = thermostat();
        t.set_field("lock_policy", &json!("clamp")).unwrap();
        assert_eq!(t.lock_policy(), LockPolicy::Clamp);
        assert_eq!(t.field("lock_policy"), Some(json!("clamp")));
        assert!(t.set_field("lock_policy", &json!("strict")).unwrap_err().is_rejection());
    }
}
