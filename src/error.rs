//! Error types for the REST client, richard API operations and local files.

use std::path::PathBuf;

use thiserror::Error;

use crate::restapi::RestResponse;

/// Errors from the HTTP resource client.
///
/// The status-mapped variants carry the full response so callers can show
/// whatever the server said.
#[derive(Debug, Error)]
pub enum RestError {
    // Transport errors (exit code 3)
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    // Status errors (exit code 4)
    #[error("HTTP {}: {method} {url}", response.status())]
    Client {
        method: String,
        url: String,
        response: Box<RestResponse>,
    },

    #[error("HTTP {}: {method} {url}", response.status())]
    Server {
        method: String,
        url: String,
        response: Box<RestResponse>,
    },

    #[error("unknown response: {}", response.status())]
    UnknownResponse { response: Box<RestResponse> },

    // Parse errors (exit code 2)
    #[error("invalid JSON body for {url}: {source}")]
    InvalidBody {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RestError {
    /// The response attached to a status error, if any.
    pub fn response(&self) -> Option<&RestResponse> {
        match self {
            Self::Client { response, .. }
            | Self::Server { response, .. }
            | Self::UnknownResponse { response } => Some(response),
            Self::Transport(_) | Self::InvalidBody { .. } => None,
        }
    }

    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Transport(_) => 3,
            Self::Client { .. } | Self::Server { .. } | Self::UnknownResponse { .. } => 4,
            Self::InvalidBody { .. } => 2,
        }
    }
}

/// Errors from the richard API operations.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Rest(#[from] RestError),

    #[error("{kind} \"{name}\" does not exist")]
    DoesNotExist { kind: &'static str, name: String },

    #[error("video data has errors: {}", join_errors(errors))]
    MissingRequiredData { errors: Vec<FieldError> },

    #[error("next page link has no page parameter: {url}")]
    Pagination { url: String },

    #[error("could not parse video id from {url}")]
    InvalidVideoUrl { url: String },
}

impl ApiError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Rest(e) => e.exit_code(),
            Self::MissingRequiredData { .. } => 1,
            _ => 2,
        }
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// One problem found in a video record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    /// Name of the offending field.
    pub field: String,
    /// Human-readable description, phrased to follow the quoted field name.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\" {}", self.field, self.message)
    }
}

/// Errors loading a field requirements file.
#[derive(Debug, Error)]
pub enum RequirementsError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid requirements JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

impl RequirementsError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } | Self::ReadError { .. } => 3,
            Self::InvalidJson { .. } => 2,
        }
    }
}

/// Errors loading the project configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{file_name} could not be found in {dir} or its parent")]
    NotFound { file_name: &'static str, dir: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("\"{key}\" must be defined in {file_name} file.")]
    MissingKey {
        key: &'static str,
        file_name: &'static str,
    },
}

impl ConfigError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } | Self::ReadError { .. } => 3,
            Self::Parse { .. } | Self::MissingKey { .. } => 2,
        }
    }
}

/// Errors reading or writing the local JSON files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} does not hold a JSON object")]
    NotAnObject { path: PathBuf },

    #[error("invalid filename \"{name}\": must not contain a path separator")]
    InvalidFilename { name: String },
}

impl StoreError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ReadError { .. } | Self::WriteError { .. } => 3,
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_display() {
        let err = FieldError::new("title", "field is required");
        assert_eq!(err.to_string(), "\"title\" field is required");
    }

    #[test]
    fn missing_required_data_lists_every_error() {
        let err = ApiError::MissingRequiredData {
            errors: vec![
                FieldError::new("title", "field is required"),
                FieldError::new("language", "field is required"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "video data has errors: \"title\" field is required; \"language\" field is required"
        );
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn does_not_exist_message() {
        let err = ApiError::DoesNotExist {
            kind: "category",
            name: "PyCon 2099".into(),
        };
        assert_eq!(err.to_string(), "category \"PyCon 2099\" does not exist");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn config_error_exit_codes() {
        let err = ConfigError::MissingKey {
            key: "api_url",
            file_name: "steve.toml",
        };
        assert_eq!(err.to_string(), "\"api_url\" must be defined in steve.toml file.");
        assert_eq!(err.exit_code(), 2);

        let err = ConfigError::NotFound {
            file_name: "steve.toml",
            dir: PathBuf::from("/tmp/project"),
        };
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn store_error_exit_codes() {
        let err = StoreError::InvalidFilename { name: "a/b.json".into() };
        assert_eq!(err.exit_code(), 2);

        let err = StoreError::NotAnObject {
            path: PathBuf::from("json/0001.json"),
        };
        assert_eq!(err.to_string(), "json/0001.json does not hold a JSON object");
    }
}
