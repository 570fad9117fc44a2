/*!
 * Water heater device implementation.
 *
 * Tank temperatures are stored in Kelvin and read and written in the selected
 * [`TemperatureScale`], like the thermostat. [`WaterHeater::tick`] advances
 * the simulated tank temperature.
 */
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::json;

use homesim_core::logging::Logger;
use homesim_core::types::Value;
use homesim_core::units::{fahrenheit_to_kelvin, kelvin_to_celsius, kelvin_to_fahrenheit, TemperatureScale};

use crate::device::{base_fields, DeviceBase, Schema};
use crate::field::{accepted, expect_f64, expect_str, ApplyOrder, FieldTable};

/// Statuses a water heater accepts
pub const WATER_HEATER_STATUSES: &[&str] = &["on", "off"];

/// Parameters a water heater adds to the base exposed list
pub const WATER_HEATER_EXPOSED: &[&str] = &[
    "status",
    "water_temperature",
    "target_temperature",
    "temperature_scale",
    "heater_mode",
];

/// Specific heat of water, Wh/(kg·°C)
pub const SPECIFIC_HEAT_WH: f64 = 1.163;

/// Fraction of input energy that reaches the water
pub const PERFORMANCE_RATIO: f64 = 0.9;

/// Default tank size in litres
pub const DEFAULT_TANK_CAPACITY: f64 = 150.0;

/// Kelvin gained per minute while heating
const HEATING_RATE: f64 = 1.0;

/// Kelvin lost per minute while idle
const COOLING_RATE: f64 = 0.1;

/// What the heater is doing with the tank
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaterMode {
    /// Heat toward the target temperature
    Hot,
    /// Let the tank settle to the inlet temperature
    Cold,
    /// Idle
    #[default]
    Off,
}

impl HeaterMode {
    /// Every mode
    pub const ALL: [HeaterMode; 3] = [HeaterMode::Hot, HeaterMode::Cold, HeaterMode::Off];

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaterMode::Hot => "hot",
            HeaterMode::Cold => "cold",
            HeaterMode::Off => "off",
        }
    }
}

impl fmt::Display for HeaterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeaterMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        HeaterMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| format!("not in {:?}", HeaterMode::ALL.map(|m| m.as_str())))
    }
}

/// The temperature-bearing fields of a water heater
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TankReading {
    /// Water in the tank
    Water,
    /// Temperature the heater aims for
    Target,
    /// Cold supply feeding the tank
    Inlet,
}

impl TankReading {
    /// The field name
    pub fn name(&self) -> &'static str {
        match self {
            TankReading::Water => "water_temperature",
            TankReading::Target => "target_temperature",
            TankReading::Inlet => "inlet_temperature",
        }
    }
}

/// Storage water heater
#[derive(Debug)]
pub struct WaterHeater {
    base: DeviceBase,
    temperature_scale: TemperatureScale,
    water_temperature: f64,
    target_temperature: f64,
    inlet_temperature: f64,
    heater_mode: HeaterMode,
    tank_capacity: f64,
}

impl WaterHeater {
    /// Create a new water heater with a cold tank
    pub fn new(logger: Logger) -> Self {
        Self {
            base: DeviceBase::new("WaterHeater", WATER_HEATER_STATUSES, logger),
            temperature_scale: TemperatureScale::Kelvin,
            water_temperature: fahrenheit_to_kelvin(60.0),
            target_temperature: fahrenheit_to_kelvin(140.0),
            inlet_temperature: fahrenheit_to_kelvin(60.0),
            heater_mode: HeaterMode::Off,
            tank_capacity: DEFAULT_TANK_CAPACITY,
        }
    }

    /// The scale numeric temperatures are read and written in
    pub fn temperature_scale(&self) -> TemperatureScale {
        self.temperature_scale
    }

    /// Set the scale from its one-letter form
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

    /// The stored Kelvin value of a reading
    pub fn kelvin(&self, reading: TankReading) -> f64 {
        match reading {
            TankReading::Water => self.water_temperature,
            TankReading::Target => self.target_temperature,
            TankReading::Inlet => self.inlet_temperature,
        }
    }

    /// A reading in the current scale
    pub fn temperature(&self, reading: TankReading) -> f64 {
        self.temperature_scale.from_kelvin(self.kelvin(reading))
    }

    /// A reading in Celsius
    pub fn temperature_c(&self, reading: TankReading) -> f64 {
        kelvin_to_celsius(self.kelvin(reading))
    }

    /// A reading in Fahrenheit
    pub fn temperature_f(&self, reading: TankReading) -> f64 {
        kelvin_to_fahrenheit(self.kelvin(reading))
    }

    /// Set a reading from a value in the current scale
    pub fn set_temperature(&mut self, reading: TankReading, value: f64) -> bool {
        let kelvin = self.temperature_scale.to_kelvin(value);
        if !kelvin.is_finite() || kelvin < 0.0 {
            self.base
                .log_rejected(reading.name(), &value, "below absolute zero");
            return false;
        }
        match reading {
            TankReading::Water => self.water_temperature = kelvin,
            TankReading::Target => self.target_temperature = kelvin,
            TankReading::Inlet => self.inlet_temperature = kelvin,
        }
        self.base.log_set(reading.name(), &value);
        true
    }

    /// What the heater is doing
    pub fn heater_mode(&self) -> HeaterMode {
        self.heater_mode
    }

    /// Change the heater mode; unknown modes are rejected
    pub fn set_heater_mode(&mut self, mode: &str) -> bool {
        match mode.parse::<HeaterMode>() {
            Ok(parsed) => {
                self.heater_mode = parsed;
                self.base.log_set("heater_mode", mode);
                true
            }
            Err(reason) => {
                self.base.log_rejected("heater_mode", mode, &reason);
                false
            }
        }
    }

    /// Tank size in litres
    pub fn tank_capacity(&self) -> f64 {
        self.tank_capacity
    }

    /// Set the tank size; it must be positive
    pub fn set_tank_capacity(&mut self, litres: f64) -> bool {
        if !litres.is_finite() || litres <= 0.0 {
            self.base
                .log_rejected("tank_capacity", &litres, "must be a positive volume");
            return false;
        }
        self.tank_capacity = litres;
        self.base.log_set("tank_capacity", &litres);
        true
    }

    /// Energy in kWh needed to bring the tank up to the target temperature
    pub fn energy_to_heat(&self) -> f64 {
        let delta = (self.target_temperature - self.water_temperature).max(0.0);
        SPECIFIC_HEAT_WH * self.tank_capacity * delta / PERFORMANCE_RATIO / 1000.0
    }

    /// Whether the heater element is running
    pub fn is_heating(&self) -> bool {
        self.base.status() == "on"
            && self.heater_mode == HeaterMode::Hot
            && self.water_temperature < self.target_temperature
    }

    /// Advance the simulation by `minutes`.
    ///
    /// The tank heats toward the target while the heater is on in hot mode,
    /// and otherwise drifts toward the inlet temperature.
    pub fn tick(&mut self, minutes: f64) {
        if minutes <= 0.0 {
            return;
        }
        if self.is_heating() {
            self.water_temperature =
                (self.water_temperature + HEATING_RATE * minutes).min(self.target_temperature);
        } else if self.water_temperature > self.inlet_temperature {
            self.water_temperature =
                (self.water_temperature - COOLING_RATE * minutes).max(self.inlet_temperature);
        } else {
            self.water_temperature =
                (self.water_temperature + COOLING_RATE * minutes).min(self.inlet_temperature);
        }
    }
}

impl Default for WaterHeater {
    fn default() -> Self {
        Self::new(Logger::global())
    }
}

macro_rules! tank_fields {
    ($builder:expr, $($name:literal => $reading:expr),+ $(,)?) => {
        $builder
        $(
            .read_write(
                $name,
                |w: &WaterHeater| json!(w.temperature($reading)),
                |w: &mut WaterHeater, v: &Value| {
                    let value = expect_f64($name, v)?;
                    let ok = w.set_temperature($reading, value);
                    accepted($name, ok, v)
                },
            )
            .read_only(concat!($name, "_c"), |w: &WaterHeater| json!(w.temperature_c($reading)))
            .read_only(concat!($name, "_f"), |w: &WaterHeater| json!(w.temperature_f($reading)))
        )+
    };
}

fn water_heater_fields() -> FieldTable<WaterHeater> {
    let builder = base_fields::<WaterHeater>().ordered(
        "temperature_scale",
        |w: &WaterHeater| json!(w.temperature_scale.as_str()),
        |w: &mut WaterHeater, v: &Value| {
            let scale = expect_str("temperature_scale", v)?;
            let ok = w.set_temperature_scale(scale);
            accepted("temperature_scale", ok, v)
        },
        ApplyOrder::First,
    );

    let builder = tank_fields!(
        builder,
        "water_temperature" => TankReading::Water,
        "target_temperature" => TankReading::Target,
        "inlet_temperature" => TankReading::Inlet,
    );

    builder
        .read_write(
            "heater_mode",
            |w: &WaterHeater| json!(w.heater_mode.as_str()),
            |w: &mut WaterHeater, v: &Value| {
                let mode = expect_str("heater_mode", v)?;
                let ok = w.set_heater_mode(mode);
                accepted("heater_mode", ok, v)
            },
        )
        .read_write(
            "tank_capacity",
            |w: &WaterHeater| json!(w.tank_capacity),
            |w: &mut WaterHeater, v: &Value| {
                let litres = expect_f64("tank_capacity", v)?;
                let ok = w.set_tank_capacity(litres);
                accepted("tank_capacity", ok, v)
            },
        )
        .read_only("energy_to_heat", |w: &WaterHeater| json!(w.energy_to_heat()))
        .read_only("is_heating", |w: &WaterHeater| json!(w.is_heating()))
        .expose(WATER_HEATER_EXPOSED)
        .build()
}

impl Schema for WaterHeater {
    const CLASS_NAME: &'static str = "WaterHeater";

    fn field_table() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<WaterHeater>> = OnceLock::new();
        TABLE.get_or_init(water_heater_fields)
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

    fn heater() -> WaterHeater {
        WaterHeater::new(Logger::ambient())
    }

    #[test]
    fn test_defaults() {
        let heater = heater();
        assert_eq!(heater.device_type(), "WaterHeater");
        assert_eq!(heater.status(), "off");
        assert_eq!(heater.heater_mode(), HeaterMode::Off);
        assert!((heater.temperature_f(TankReading::Water) - 60.0).abs() < 1e-9);
        assert!((heater.temperature_f(TankReading::Target) - 140.0).abs() < 1e-9);
    }

    #[test]
    fn test_timer_status_is_not_allowed() {
        let mut heater = heater();
        assert!(!heater.set_status("timer"));
        assert!(heater.set_status("on"));
        assert_eq!(heater.status(), "on");
    }

    #[test]
    fn test_energy_to_heat() {
        let mut heater = heater();
        heater.set_temperature_scale("C");
        heater.set_temperature(TankReading::Water, 20.0);
        heater.set_temperature(TankReading::Target, 60.0);
        assert!(heater.set_tank_capacity(100.0));

        // 1.163 * 100 * 40 / 0.9 / 1000
        let expected = 5.168_888_888_888_889;
        assert!((heater.energy_to_heat() - expected).abs() < 1e-6);

        heater.set_temperature(TankReading::Water, 70.0);
        assert_eq!(heater.energy_to_heat(), 0.0);
    }

    #[test]
    fn test_tick_heats_only_when_on_and_hot() {
        let mut heater = heater();
        let start = heater.kelvin(TankReading::Water);

        heater.set_heater_mode("hot");
        heater.tick(10.0);
        assert_eq!(heater.kelvin(TankReading::Water), start);

        heater.set_status("on");
        heater.tick(10.0);
        assert!((heater.kelvin(TankReading::Water) - (start + 10.0)).abs() < 1e-9);

        heater.tick(10_000.0);
        assert_eq!(
            heater.kelvin(TankReading::Water),
            heater.kelvin(TankReading::Target)
        );
    }

    #[test]
    fn test_tick_cools_toward_inlet() {
        let mut heater = heater();
        let inlet = heater.kelvin(TankReading::Inlet);
        heater.set_temperature(TankReading::Water, inlet + 5.0);
        heater.tick(10.0);
        assert!((heater.kelvin(TankReading::Water) - (inlet + 4.0)).abs() < 1e-9);
        heater.tick(1_000.0);
        assert_eq!(heater.kelvin(TankReading::Water), inlet);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut heater = heater();
        assert!(!heater.set_heater_mode("boiling"));
        assert!(!heater.set_tank_capacity(0.0));
        assert!(!heater.set_temperature(TankReading::Target, -10.0));
        assert_eq!(heater.heater_mode(), HeaterMode::Off);
        assert_eq!(heater.tank_capacity(), DEFAULT_TANK_CAPACITY);
    }

    #[test]
    fn test_exposed_parameters() {
        let heater = heater();
        let exposed = heater.exposed_parameters();
        assert_eq!(&exposed[..BASE_EXPOSED.len()], BASE_EXPOSED);
        assert_eq!(&exposed[BASE_EXPOSED.len()..], WATER_HEATER_EXPOSED);
    }

    #[test]
    fn test_properties_round_trip() {
        let mut original = heater();
        original.set_heater_mode("hot");
        original.set_status("on");
        original.set_tank_capacity(200.0);

        let mut copy = heater();
        copy.from_json(&original.to_properties());
        assert_eq!(copy.to_properties(), original.to_properties());
    }
}
