/*!
 * Light device implementation.
 */
use std::sync::OnceLock;

use serde_json::json;

use homesim_core::logging::Logger;
use homesim_core::types::Value;

use crate::device::{base_fields, DeviceBase, Schema, DEFAULT_STATUSES};
use crate::error::DeviceError;
use crate::field::{accepted, expect_f64, FieldTable};

/// Parameters a light adds to the base exposed list
pub const LIGHT_EXPOSED: &[&str] = &["brightness", "rgb_color"];

/// A colour as red, green and blue channels
pub type Rgb = [u8; 3];

/// Dimmable colour lamp modelled on the Philips Hue
#[derive(Debug)]
pub struct Light {
    base: DeviceBase,
    brightness: f64,
    rgb_color: Rgb,
}

impl Light {
    /// Create a new light at full white brightness
    pub fn new(logger: Logger) -> Self {
        Self {
            base: DeviceBase::new("Light", DEFAULT_STATUSES, logger),
            brightness: 1.0,
            rgb_color: [255, 255, 255],
        }
    }

    /// Brightness as a fraction of maximum
    pub fn brightness(&self) -> f64 {
        self.brightness
    }

    /// Set the brightness; values outside `0.0..=1.0` are rejected
    pub fn set_brightness(&mut self, brightness: f64) -> bool {
        if !(0.0..=1.0).contains(&brightness) {
            self.base
                .log_rejected("brightness", &brightness, "must be between 0 and 1");
            return false;
        }
        self.brightness = brightness;
        self.base.log_set("brightness", &brightness);
        true
    }

    /// The current colour
    pub fn rgb_color(&self) -> Rgb {
        self.rgb_color
    }

    /// Set the colour
    pub fn set_rgb_color(&mut self, color: Rgb) {
        self.rgb_color = color;
        self.base.log_set("rgb_color", &format!("{:?}", color));
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new(Logger::global())
    }
}

/// Parse a three-element array of channel values
fn parse_rgb(value: &Value) -> Option<Rgb> {
    let channels = value.as_array().filter(|a| a.len() == 3)?;
    let mut color = [0u8; 3];
    for (slot, channel) in color.iter_mut().zip(channels) {
        *slot = u8::try_from(channel.as_u64()?).ok()?;
    }
    Some(color)
}

fn light_fields() -> FieldTable<Light> {
    base_fields::<Light>()
        .read_write(
            "brightness",
            |l: &Light| json!(l.brightness),
            |l: &mut Light, v: &Value| {
                let brightness = expect_f64("brightness", v)?;
                let ok = l.set_brightness(brightness);
                accepted("brightness", ok, v)
            },
        )
        .read_write(
            "rgb_color",
            |l: &Light| json!(l.rgb_color),
            |l: &mut Light, v: &Value| {
                if !v.is_array() {
                    return Err(DeviceError::invalid_type("rgb_color", "array", v));
                }
                match parse_rgb(v) {
                    Some(color) => {
                        l.set_rgb_color(color);
                        Ok(())
                    }
                    None => {
                        l.base
                            .log_rejected("rgb_color", v, "expected three integers between 0 and 255");
                        Err(DeviceError::rejected("rgb_color", v))
                    }
                }
            },
        )
        .expose(LIGHT_EXPOSED)
        .build()
}

impl Schema for Light {
    const CLASS_NAME: &'static str = "PhilipsHueLamp";

    fn field_table() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<Light>> = OnceLock::new();
        TABLE.get_or_init(light_fields)
    }

    fn device_base(&self) -> &DeviceBase {
        &self.base
    }

    fn device_base_mut(&mut self) -> &mut DeviceBase {
        &mut self.base
    }
}
