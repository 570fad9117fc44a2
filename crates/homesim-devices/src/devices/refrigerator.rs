/*!
 * Refrigerator device implementation.
 *
 * Readings are not stored: every read draws a new sample, in Fahrenheit for
 * temperatures and watts for energy use.
 */
use std::ops::Range;
use std::sync::OnceLock;

use rand::Rng;
use serde_json::json;

use homesim_core::logging::Logger;

use crate::device::{base_fields, DeviceBase, Schema, DEFAULT_STATUSES};
use crate::field::FieldTable;

/// Parameters a refrigerator adds to the base exposed list
pub const REFRIGERATOR_EXPOSED: &[&str] = &[
    "status",
    "current_fridge_temperature",
    "target_fridge_temperature",
    "current_freezer_temperature",
    "target_freezer_temperature",
    "energy_use",
];

const CURRENT_FRIDGE: Range<i64> = 30..35;
const TARGET_FRIDGE: Range<i64> = 35..40;
const CURRENT_FREEZER: Range<i64> = 5..10;
const TARGET_FREEZER: Range<i64> = 0..4;
const ENERGY_USE: Range<i64> = 100..400;

/// Fridge-freezer with sampled readings
#[derive(Debug)]
pub struct Refrigerator {
    base: DeviceBase,
}

fn sample(range: Range<i64>) -> i64 {
    rand::thread_rng().gen_range(range)
}

impl Refrigerator {
    /// Create a new refrigerator
    pub fn new(logger: Logger) -> Self {
        Self {
            base: DeviceBase::new("Refrigerator", DEFAULT_STATUSES, logger),
        }
    }

    /// Sampled fridge compartment temperature
    pub fn current_fridge_temperature(&self) -> i64 {
        sample(CURRENT_FRIDGE)
    }

    /// Sampled fridge compartment setpoint
    pub fn target_fridge_temperature(&self) -> i64 {
        sample(TARGET_FRIDGE)
    }

    /// Sampled freezer compartment temperature
    pub fn current_freezer_temperature(&self) -> i64 {
        sample(CURRENT_FREEZER)
    }

    /// Sampled freezer compartment setpoint
    pub fn target_freezer_temperature(&self) -> i64 {
        sample(TARGET_FREEZER)
    }

    /// Sampled power draw in watts
    pub fn energy_use(&self) -> i64 {
        sample(ENERGY_USE)
    }
}

impl Default for Refrigerator {
    fn default() -> Self {
        Self::new(Logger::global())
    }
}

fn refrigerator_fields() -> FieldTable<Refrigerator> {
    base_fields::<Refrigerator>()
        .read_only("current_fridge_temperature", |r: &Refrigerator| {
            json!(r.current_fridge_temperature())
        })
        .read_only("target_fridge_temperature", |r: &Refrigerator| {
            json!(r.target_fridge_temperature())
        })
        .read_only("current_freezer_temperature", |r: &Refrigerator| {
            json!(r.current_freezer_temperature())
        })
        .read_only("target_freezer_temperature", |r: &Refrigerator| {
            json!(r.target_freezer_temperature())
        })
        .read_only("energy_use", |r: &Refrigerator| json!(r.energy_use()))
        .expose(REFRIGERATOR_EXPOSED)
        .build()
}

impl Schema for Refrigerator {
    const CLASS_NAME: &'static str = "Refrigerator";

    fn field_table() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<Refrigerator>> = OnceLock::new();
        TABLE.get_or_init(refrigerator_fields)
    }

    fn device_base(&self) -> &DeviceBase {
        &self.base
    }

    fn device_base_mut(&mut self) -> &mut DeviceBase {
        &mut self.base
    }
}
