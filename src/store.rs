//! Local JSON files, one per video.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::StoreError;
use crate::types::VideoRecord;

/// Load every `*.json` file in `json_path`, sorted by filename.
///
/// A missing directory yields no records.
///
/// # Errors
///
/// Fails on the first file that can't be read, isn't valid JSON, or doesn't
/// hold a JSON object.
pub fn load_records(json_path: &Path) -> Result<Vec<(String, VideoRecord)>, StoreError> {
    if !json_path.is_dir() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(json_path).map_err(|source| StoreError::ReadError {
        path: json_path.to_path_buf(),
        source,
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StoreError::ReadError {
            path: json_path.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".json") && entry.path().is_file() {
            names.push(name);
        }
    }
    names.sort();

    names
        .into_iter()
        .map(|name| {
            let record = load_record(&json_path.join(&name))?;
            Ok((name, record))
        })
        .collect()
}

/// Load a single record file.
pub fn load_record(path: &Path) -> Result<VideoRecord, StoreError> {
    let content = std::fs::read_to_string(path).map_err(|source| StoreError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|source| StoreError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Object(record) => Ok(record),
        _ => Err(StoreError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

/// Write `record` to `json_path/filename` as indented JSON with sorted keys,
/// creating the directory if needed.
///
/// # Errors
///
/// Returns `StoreError::InvalidFilename` if `filename` contains a path
/// separator.
pub fn save_record(json_path: &Path, filename: &str, record: &VideoRecord) -> Result<(), StoreError> {
    if filename.contains(std::path::is_separator) || filename.is_empty() {
        return Err(StoreError::InvalidFilename {
            name: filename.to_string(),
        });
    }

    std::fs::create_dir_all(json_path).map_err(|source| StoreError::WriteError {
        path: json_path.to_path_buf(),
        source,
    })?;

    let path = json_path.join(filename);
    let sorted: BTreeMap<&String, &Value> = record.iter().collect();
    let mut content = serde_json::to_string_pretty(&sorted).map_err(|source| {
        StoreError::InvalidJson {
            path: path.clone(),
            source,
        }
    })?;
    content.push('\n');

    std::fs::write(&path, content).map_err(|source| StoreError::WriteError {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), "saved record");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn record(value: Value) -> VideoRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let records = load_records(&dir.path().join("json")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn loads_json_files_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("0002_b.json"), r#"{"title": "B"}"#).unwrap();
        fs::write(dir.path().join("0001_a.json"), r#"{"title": "A"}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "not json").unwrap();

        let records = load_records(dir.path()).unwrap();
        let names: Vec<&str> = records.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["0001_a.json", "0002_b.json"]);
        assert_eq!(records[0].1["title"], "A");
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.json"), "{").unwrap();
        assert!(matches!(
            load_records(dir.path()),
            Err(StoreError::InvalidJson { .. })
        ));
    }

    #[test]
    fn array_file_is_not_a_record() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("list.json"), "[1, 2]").unwrap();
        assert!(matches!(
            load_records(dir.path()),
            Err(StoreError::NotAnObject { .. })
        ));
    }

    #[test]
    fn save_sorts_keys_and_creates_directory() {
        let dir = TempDir::new().unwrap();
        let json_path = dir.path().join("json");
        let data = record(json!({"title": "Foo", "category": "Bar", "id": 3}));

        save_record(&json_path, "0001_foo.json", &data).unwrap();

        let content = fs::read_to_string(json_path.join("0001_foo.json")).unwrap();
        assert_eq!(
            content,
            "{\n  \"category\": \"Bar\",\n  \"id\": 3,\n  \"title\": \"Foo\"\n}\n"
        );

        let loaded = load_records(&json_path).unwrap();
        assert_eq!(loaded[0].1, data);
    }

    #[test]
    fn save_rejects_paths() {
        let dir = TempDir::new().unwrap();
        let data = VideoRecord::new();
        assert!(matches!(
            save_record(dir.path(), "../escape.json", &data),
            Err(StoreError::InvalidFilename { .. })
        ));
    }
}
