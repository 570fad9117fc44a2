/*!
 * Document file I/O.
 *
 * A home is persisted as a single pretty-printed JSON object. Reads and
 * writes are one blocking call each; a write replaces the file in place.
 */
use std::fs;
use std::path::Path;

use tracing::debug;

use homesim_core::types::{Document, Value};

use crate::error::{Error, Result};

/// Read a JSON object from `path`
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    debug!("Reading document from {}", path.display());
    let text = fs::read_to_string(path)?;
    parse_document(&text)
}

/// Parse a JSON object from text
pub fn parse_document(text: &str) -> Result<Document> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(document) => Ok(document),
        other => Err(Error::invalid_document(format!(
            "expected a JSON object at the top level, found {}",
            kind(&other)
        ))),
    }
}

/// Write `document` to `path` as pretty-printed JSON
pub fn write_document<P: AsRef<Path>>(path: P, document: &Document) -> Result<()> {
    let path = path.as_ref();
    debug!("Writing document to {}", path.display());
    fs::write(path, render_document(document)?)?;
    Ok(())
}

/// Render `document` as pretty-printed JSON
pub fn render_document(document: &Document) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
