//! Field requirements: which keys a video record may carry and what they
//! must hold.
//!
//! Requirements are a JSON array of descriptors, derived from the richard
//! video model:
//!
//! ```json
//! [
//!   {"name": "state", "type": "IntegerField", "null": false,
//!    "has_default": true, "empty_strings": false, "choices": [1, 2]}
//! ]
//! ```
//!
//! A default set for richard's video API is compiled in and available from
//! [`Requirements::bundled`]. Load once, then pass by reference to the
//! validator.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RequirementsError;

const BUNDLED: &str = include_str!("video_reqs.json");

/// Declared type of a field.
///
/// Only integer, text, text-array and boolean fields get type checks; the
/// rest are accepted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "IntegerField")]
    Integer,
    #[serde(rename = "TextField")]
    Text,
    #[serde(rename = "TextArrayField")]
    TextArray,
    #[serde(rename = "BooleanField")]
    Boolean,
    #[serde(rename = "DateField")]
    Date,
    #[serde(rename = "DateTimeField")]
    DateTime,
    /// Any other model field type (char, URL, slug, foreign key, ...).
    #[serde(other)]
    Other,
}

/// Describes one permitted video record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRequirement {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether `null` is an acceptable value.
    #[serde(default)]
    pub null: bool,
    /// Whether the server fills in a value when the field is left out.
    #[serde(default)]
    pub has_default: bool,
    /// Whether empty strings are acceptable.
    #[serde(default)]
    pub empty_strings: bool,
    /// Allowed values for integer fields. `None` or empty means any integer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<i64>>,
}

impl FieldRequirement {
    /// A field must be present when it can't be null, has no server default,
    /// and doesn't allow empty strings.
    pub fn is_required(&self) -> bool {
        !(self.null || self.has_default || self.empty_strings)
    }

    /// The non-empty choice set, if one is declared.
    pub fn choices(&self) -> Option<&[i64]> {
        self.choices.as_deref().filter(|c| !c.is_empty())
    }
}

/// The full, ordered list of field requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Requirements(Vec<FieldRequirement>);

impl Requirements {
    pub fn new(fields: Vec<FieldRequirement>) -> Self {
        Self(fields)
    }

    /// The compiled-in requirements for richard's video API.
    pub fn bundled() -> Result<Self, RequirementsError> {
        Self::from_json_str(BUNDLED)
    }

    /// Load requirements from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `RequirementsError::InvalidJson` if the string isn't a valid
    /// requirements array.
    pub fn from_json_str(content: &str) -> Result<Self, RequirementsError> {
        serde_json::from_str(content).map_err(|source| RequirementsError::InvalidJson { source })
    }

    /// Load requirements from a file path.
    ///
    /// # Errors
    ///
    /// Returns `RequirementsError::FileNotFound` if the file doesn't exist,
    /// `ReadError` if it can't be read, or `InvalidJson` if it doesn't parse.
    pub fn from_file(path: &Path) -> Result<Self, RequirementsError> {
        if !path.exists() {
            return Err(RequirementsError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content =
            std::fs::read_to_string(path).map_err(|source| RequirementsError::ReadError {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_json_str(&content)
    }

    pub fn get(&self, name: &str) -> Option<&FieldRequirement> {
        self.0.iter().find(|req| req.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldRequirement> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Requirements {
    type Item = &'a FieldRequirement;
    type IntoIter = std::slice::Iter<'a, FieldRequirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
