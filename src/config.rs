//! Project configuration from `steve.toml`.
//!
//! ```toml
//! [project]
//! # The name of this group of videos, e.g. "EuroPython 2011".
//! category = "EuroPython 2011"
//! # Where all the videos are listed.
//! url = "http://www.youtube.com/user/PythonItalia/videos"
//! # The richard instance api.
//! api_url = "http://example.com/api/v1/"
//! username = "willkg"
//! api_key = "OU812"
//! # Defaults to <project dir>/json
//! jsonpath = "json"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// Name of the project config file.
pub const CONFIG_FILE_NAME: &str = "steve.toml";

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    project: ProjectSection,
}

#[derive(Debug, Default, Deserialize)]
struct ProjectSection {
    category: Option<String>,
    url: Option<String>,
    api_url: Option<String>,
    username: Option<String>,
    api_key: Option<String>,
    jsonpath: Option<PathBuf>,
}

/// Resolved project configuration.
///
/// Empty values in the file are treated as unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Directory holding `steve.toml`.
    pub project_path: PathBuf,
    /// Category shared by every video in the project.
    pub category: Option<String>,
    /// Where the videos are listed on the source site. Kept with the project
    /// for reference; no command fetches from it.
    pub url: Option<String>,
    pub api_url: Option<String>,
    /// Owner of `api_key` on the richard instance. Part of the file format
    /// only; the API authenticates with the key alone.
    pub username: Option<String>,
    pub api_key: Option<String>,
    /// Directory holding the video JSON files.
    pub json_path: PathBuf,
}

impl ProjectConfig {
    /// Find `steve.toml` in `dir` or its parent and load it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if neither directory has one.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let candidates = std::iter::once(dir).chain(dir.parent());
        for candidate in candidates {
            let path = candidate.join(CONFIG_FILE_NAME);
            if path.is_file() {
                debug!(path = %path.display(), "loading project config");
                return Self::from_file(&path);
            }
        }
        Err(ConfigError::NotFound {
            file_name: CONFIG_FILE_NAME,
            dir: dir.to_path_buf(),
        })
    }

    /// Load a specific config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let project_path = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_toml_str(&content, project_path).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse config text for a project rooted at `project_path`.
    pub fn from_toml_str(content: &str, project_path: PathBuf) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(content)?;
        let section = file.project;

        let json_path = match section.jsonpath.filter(|p| !p.as_os_str().is_empty()) {
            Some(p) if p.is_absolute() => p,
            Some(p) => project_path.join(p),
            None => project_path.join("json"),
        };

        Ok(Self {
            category: non_empty(section.category),
            url: non_empty(section.url),
            api_url: non_empty(section.api_url),
            username: non_empty(section.username),
            api_key: non_empty(section.api_key),
            json_path,
            project_path,
        })
    }

    /// The API URL, or an error naming the missing key.
    pub fn require_api_url(&self) -> Result<&str, ConfigError> {
        require(self.api_url.as_deref(), "api_url")
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        require(self.api_key.as_deref(), "api_key")
    }
}

fn require<'a>(value: Option<&'a str>, key: &'static str) -> Result<&'a str, ConfigError> {
    value.ok_or(ConfigError::MissingKey {
        key,
        file_name: CONFIG_FILE_NAME,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
