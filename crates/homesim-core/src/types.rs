/*!
 * Core data types for homesim.
 *
 * This module defines the identifier and document types shared by devices
 * and the home aggregate.
 */
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A JSON value as it appears in device snapshots and home documents
pub use serde_json::Value;

/// An ordered key/value document.
///
/// Key order is preserved, so snapshots list fields in the order a device
/// declares them.
pub type Document = serde_json::Map<String, Value>;

/// An identifier for devices and locations
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Generate an ID from a hash of the current timestamp.
    ///
    /// The result is 16 upper-case hex digits. Two IDs generated within the
    /// same clock tick collide; callers that need uniqueness must check for
    /// it.
    pub fn generate() -> Self {
        let now = Utc::now();
        let mut hasher = DefaultHasher::new();
        now.timestamp().hash(&mut hasher);
        now.timestamp_subsec_nanos().hash(&mut hasher);
        Self(format!("{:016X}", hasher.finish()))
    }

    /// Create an ID from a string
    pub fn from_string<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_string())
    }

    /// Get the string representation of the ID
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::generate()
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Compare two document values for query matching.
///
/// Numbers compare by numeric value, so `1` matches `1.0`; every other kind
/// uses structural equality.
pub fn values_match(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        _ => left == right,
    }
}
