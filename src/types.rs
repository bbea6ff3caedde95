//! Core types shared by the API layer, validator and local store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One video's metadata, keyed by field name.
///
/// Which keys are allowed and what they must hold is decided by
/// [`Requirements`](crate::Requirements), not by this type.
pub type VideoRecord = Map<String, Value>;

/// Video is published.
pub const STATE_LIVE: i64 = 1;
/// Video is a draft and not publicly listed.
pub const STATE_DRAFT: i64 = 2;

/// Keys that may appear on a record without being declared as requirements.
///
/// Records pulled from the server or written back after a push carry them.
pub const PASSTHROUGH_FIELDS: &[&str] = &["id", "updated"];

/// Server-managed keys removed before a record is sent as an update.
pub const SERVER_MANAGED_FIELDS: &[&str] = &["resource_uri", "added"];

/// A named grouping of videos, e.g. a conference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Display name, unique per server.
    pub title: String,
    /// Identifier assigned by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Everything else the server sent.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of a paginated collection listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
}

/// Drop the [`SERVER_MANAGED_FIELDS`] from a record so it can be sent back.
pub fn strip_server_fields(record: &mut VideoRecord) {
    for field in SERVER_MANAGED_FIELDS {
        record.remove(*field);
    }
}

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Whether a JSON value counts as "empty" for the field checks.
///
/// Null, `false`, zero, and empty strings, arrays and objects are all empty.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
