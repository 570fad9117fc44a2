/*!
 * Field descriptor tables.
 *
 * Each concrete device type declares a static table mapping field names to
 * getter and setter functions. The table drives the generic snapshot and
 * hydrate operations, and it carries the ordered list of exposed parameters.
 * Tables are composed: a concrete type starts from its parent's builder and
 * appends its own descriptors.
 */
use homesim_core::types::Value;

use crate::error::{DeviceError, Result};

/// Reads a field from a device
pub type Getter<D> = fn(&D) -> Value;

/// Writes a field on a device from a document value
pub type Setter<D> = fn(&mut D, &Value) -> Result<()>;

/// Whether a field belongs in a persisted snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// Stored in documents
    Persisted,
    /// Settable but not stored, e.g. an alias of another field
    Transient,
}

/// When a field is applied during hydration, relative to the others
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ApplyOrder {
    /// Before every other key; used by keys that change how others are read
    First,
    /// In document order
    Normal,
    /// After every other key; used by keys that other setters overwrite
    Last,
}

/// A single field descriptor
pub struct Field<D> {
    name: &'static str,
    get: Getter<D>,
    set: Option<Setter<D>>,
    persistence: Persistence,
    order: ApplyOrder,
}

impl<D> Field<D> {
    /// The field name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Read the field
    pub fn read(&self, device: &D) -> Value {
        (self.get)(device)
    }

    /// Write the field, if it is settable
    pub fn write(&self, device: &mut D, value: &Value) -> Result<()> {
        match self.set {
            Some(set) => set(device, value),
            None => Err(DeviceError::NotSettable(self.name.to_string())),
        }
    }

    /// Whether the field has a setter
    pub fn is_settable(&self) -> bool {
        self.set.is_some()
    }

    /// Whether the field appears in persisted snapshots
    pub fn is_persisted(&self) -> bool {
        self.set.is_some() && self.persistence == Persistence::Persisted
    }

    /// The field's hydration order
    pub fn order(&self) -> ApplyOrder {
        self.order
    }
}

/// The complete, resolved field table of a device type
pub struct FieldTable<D> {
    fields: Vec<Field<D>>,
    exposed: Vec<&'static str>,
}

impl<D> FieldTable<D> {
    /// Start an empty table
    pub fn builder() -> FieldTableBuilder<D> {
        FieldTableBuilder {
            fields: Vec::new(),
            exposed: Vec::new(),
        }
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&Field<D>> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All fields, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Field<D>> {
        self.fields.iter()
    }

    /// The ordered exposed parameter names
    pub fn exposed(&self) -> &[&'static str] {
        &self.exposed
    }

    /// All field names, in declaration order
    pub fn names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }
}

/// Builder used to compose a [`FieldTable`]
pub struct FieldTableBuilder<D> {
    fields: Vec<Field<D>>,
    exposed: Vec<&'static str>,
}

impl<D> FieldTableBuilder<D> {
    /// Add a read-only field
    pub fn read_only(self, name: &'static str, get: Getter<D>) -> Self {
        self.push(name, get, None, Persistence::Persisted, ApplyOrder::Normal)
    }

    /// Add a settable, persisted field
    pub fn read_write(self, name: &'static str, get: Getter<D>, set: Setter<D>) -> Self {
        self.push(name, get, Some(set), Persistence::Persisted, ApplyOrder::Normal)
    }

    /// Add a settable field that is left out of persisted snapshots
    pub fn transient(self, name: &'static str, get: Getter<D>, set: Setter<D>) -> Self {
        self.push(name, get, Some(set), Persistence::Transient, ApplyOrder::Normal)
    }

    /// Add a settable, persisted field with an explicit hydration order
    pub fn ordered(
        self,
        name: &'static str,
        get: Getter<D>,
        set: Setter<D>,
        order: ApplyOrder,
    ) -> Self {
        self.push(name, get, Some(set), Persistence::Persisted, order)
    }

    /// Append names to the exposed parameter list, skipping duplicates
    pub fn expose(mut self, names: &[&'static str]) -> Self {
        for name in names {
            if !self.exposed.contains(name) {
                self.exposed.push(name);
            }
        }
        self
    }

    /// Resolve the table
    ///
    /// # Panics
    ///
    /// Panics if an exposed name has no field; tables are static, so this
    /// is a programming error caught by the first use in tests.
    pub fn build(self) -> FieldTable<D> {
        for name in &self.exposed {
            assert!(
                self.fields.iter().any(|f| f.name == *name),
                "exposed parameter {} has no field descriptor",
                name
            );
        }
        FieldTable {
            fields: self.fields,
            exposed: self.exposed,
        }
    }

    fn push(
        mut self,
        name: &'static str,
        get: Getter<D>,
        set: Option<Setter<D>>,
        persistence: Persistence,
        order: ApplyOrder,
    ) -> Self {
        // A later descriptor overrides an inherited one with the same name
        self.fields.retain(|f| f.name != name);
        self.fields.push(Field {
            name,
            get,
            set,
            persistence,
            order,
        });
        self
    }
}

/// Read a number from a document value
pub fn expect_f64(field: &str, value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| DeviceError::invalid_type(field, "number", value))
}

/// Read a string from a document value
pub fn expect_str<'a>(field: &str, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| DeviceError::invalid_type(field, "string", value))
}

/// Read a boolean from a document value
pub fn expect_bool(field: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| DeviceError::invalid_type(field, "boolean", value))
}

/// Turn a setter's accept/reject outcome into a result
pub fn accepted(field: &str, ok: bool, value: &Value) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(DeviceError::rejected(field, value))
    }
}
