/*!
 * Temperature unit conversions.
 *
 * Devices store every temperature in Kelvin and convert only when a value
 * crosses the API boundary. [`TemperatureScale`] carries the scale a device
 * currently reports in.
 */
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Offset between the Kelvin and Celsius scales
pub const KELVIN_OFFSET: f64 = 273.15;

/// Convert a Kelvin value to Celsius
pub fn kelvin_to_celsius(value: f64) -> f64 {
    value - KELVIN_OFFSET
}

/// Convert a Celsius value to Kelvin
pub fn celsius_to_kelvin(value: f64) -> f64 {
    value + KELVIN_OFFSET
}

/// Convert a Celsius value to Fahrenheit
pub fn celsius_to_fahrenheit(value: f64) -> f64 {
    value * (9.0 / 5.0) + 32.0
}

/// Convert a Fahrenheit value to Celsius
pub fn fahrenheit_to_celsius(value: f64) -> f64 {
    (value - 32.0) * (5.0 / 9.0)
}

/// Convert a Kelvin value to Fahrenheit
pub fn kelvin_to_fahrenheit(value: f64) -> f64 {
    celsius_to_fahrenheit(kelvin_to_celsius(value))
}

/// Convert a Fahrenheit value to Kelvin
pub fn fahrenheit_to_kelvin(value: f64) -> f64 {
    celsius_to_kelvin(fahrenheit_to_celsius(value))
}

/// Temperature scale a device reports and accepts values in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemperatureScale {
    /// Kelvin, the canonical storage unit
    #[default]
    #[serde(rename = "K")]
    Kelvin,
    /// Degrees Celsius
    #[serde(rename = "C")]
    Celsius,
    /// Degrees Fahrenheit
    #[serde(rename = "F")]
    Fahrenheit,
}

impl TemperatureScale {
    /// All supported scales, in their wire order
    pub const ALL: [TemperatureScale; 3] = [
        TemperatureScale::Kelvin,
        TemperatureScale::Celsius,
        TemperatureScale::Fahrenheit,
    ];

    /// The single-letter wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureScale::Kelvin => "K",
            TemperatureScale::Celsius => "C",
            TemperatureScale::Fahrenheit => "F",
        }
    }

    /// Interpret `value`, expressed in this scale, as Kelvin
    pub fn to_kelvin(&self, value: f64) -> f64 {
        match self {
            TemperatureScale::Kelvin => value,
            TemperatureScale::Celsius => celsius_to_kelvin(value),
            TemperatureScale::Fahrenheit => fahrenheit_to_kelvin(value),
        }
    }

    /// Express a Kelvin value in this scale
    pub fn from_kelvin(&self, kelvin: f64) -> f64 {
        match self {
            TemperatureScale::Kelvin => kelvin,
            TemperatureScale::Celsius => kelvin_to_celsius(kelvin),
            TemperatureScale::Fahrenheit => kelvin_to_fahrenheit(kelvin),
        }
    }
}

impl fmt::Display for TemperatureScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemperatureScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "K" => Ok(TemperatureScale::Kelvin),
            "C" => Ok(TemperatureScale::Celsius),
            "F" => Ok(TemperatureScale::Fahrenheit),
            other => Err(format!("unknown temperature scale: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;
    const SAMPLES: [f64; 7] = [-459.67, -40.0, -17.5, 0.0, 21.25, 100.0, 5778.0];

    #[test]
    fn test_celsius_kelvin_inverse() {
        for x in SAMPLES {
            assert!((kelvin_to_celsius(celsius_to_kelvin(x)) - x).abs() < TOLERANCE);
            assert!((celsius_to_kelvin(kelvin_to_celsius(x)) - x).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_celsius_fahrenheit_inverse() {
        for x in SAMPLES {
            assert!((fahrenheit_to_celsius(celsius_to_fahrenheit(x)) - x).abs() < TOLERANCE);
            assert!((celsius_to_fahrenheit(fahrenheit_to_celsius(x)) - x).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_kelvin_fahrenheit_inverse() {
        for x in SAMPLES {
            assert!((fahrenheit_to_kelvin(kelvin_to_fahrenheit(x)) - x).abs() < TOLERANCE);
            assert!((kelvin_to_fahrenheit(fahrenheit_to_kelvin(x)) - x).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_known_points() {
        assert!((celsius_to_fahrenheit(100.0) - 212.0).abs() < TOLERANCE);
        assert!((fahrenheit_to_celsius(-40.0) + 40.0).abs() < TOLERANCE);
        assert!((celsius_to_kelvin(0.0) - 273.15).abs() < TOLERANCE);
    }

    #[test]
    fn test_scale_round_trip() {
        for scale in TemperatureScale::ALL {
            for x in SAMPLES {
                assert!((scale.from_kelvin(scale.to_kelvin(x)) - x).abs() < TOLERANCE);
            }
        }
    }

    #[test]
    fn test_scale_parsing() {
        assert_eq!("F".parse::<TemperatureScale>(), Ok(TemperatureScale::Fahrenheit));
        assert_eq!("K".parse::<TemperatureScale>(), Ok(TemperatureScale::Kelvin));
        assert!("X".parse::<TemperatureScale>().is_err());
        assert!("c".parse::<TemperatureScale>().is_err());
        assert_eq!(TemperatureScale::Celsius.to_string(), "C");
    }
}
