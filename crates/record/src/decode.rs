//! JSON decoding of archive entries.
//!
//! Documents use camelCase field names:
//!
//! ```json
//! {"recordKey": "...", "recordValue": "...", "schemaName": "...", "schemaVersion": "..."}
//! ```
//!
//! Key, schema name and schema version accept any JSON scalar (numbers and
//! booleans are rendered as text). The value accepts any non-null JSON value;
//! strings are taken verbatim and anything else is re-serialized compactly.

use crate::error::{MalformedRecordError, Result};
use crate::Record;
use serde_json::Value;

/// Decode one entry payload into a [`Record`].
///
/// Pure and stateless. Either every required field is present and the full
/// record is returned, or the entry fails as a whole.
pub fn decode(raw: &[u8]) -> Result<Record> {
    let text = std::str::from_utf8(raw)?;
    let mut fields = match serde_json::from_str::<Value>(text)? {
        Value::Object(fields) => fields,
        other => return Err(MalformedRecordError::NotAnObject(kind_of(&other))),
    };

    Ok(Record {
        key: scalar_text("recordKey", fields.remove("recordKey"))?,
        value: payload_text(fields.remove("recordValue"))?,
        schema_name: scalar_text("schemaName", fields.remove("schemaName"))?,
        schema_version: scalar_text("schemaVersion", fields.remove("schemaVersion"))?,
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn scalar_text(field: &'static str, value: Option<Value>) -> Result<String> {
    match value {
        None | Some(Value::Null) => Err(MalformedRecordError::MissingField(field)),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(MalformedRecordError::InvalidField {
            field,
            kind: kind_of(&other),
        }),
    }
}

fn payload_text(value: Option<Value>) -> Result<String> {
    match value {
        None | Some(Value::Null) => Err(MalformedRecordError::MissingField("recordValue")),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Ok(other.to_string()),
    }
}
