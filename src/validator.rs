//! Video record validation against field requirements.

use serde_json::Value;

use crate::error::FieldError;
use crate::requirements::{FieldRequirement, FieldType, Requirements};
use crate::types::{is_falsy, json_type_name, VideoRecord, PASSTHROUGH_FIELDS};

/// Check one video record against the field requirements.
///
/// `category` is the project-wide category from the project config, if any.
/// With a project category, every record must either omit `category` or
/// carry the same value; without one, every record must carry its own.
///
/// Returns every problem found, in requirement order followed by unexpected
/// keys in record order. An empty list means the record is valid.
pub fn verify_video_data(
    data: &VideoRecord,
    category: Option<&str>,
    requirements: &Requirements,
) -> Vec<FieldError> {
    let category = category.filter(|c| !c.is_empty());
    let mut errors = Vec::new();

    for req in requirements {
        let key = req.name.as_str();

        if key == "category" {
            check_category(data.get(key), category, &mut errors);
            continue;
        }

        match data.get(key) {
            // Title is required for API clients even though the model
            // allows it to be blank.
            None if req.is_required() || key == "title" => {
                errors.push(FieldError::new(key, "field is required"));
            }
            None => {}
            Some(value) => {
                if let Some(error) = check_value(req, value) {
                    errors.push(error);
                }
            }
        }
    }

    for key in data.keys() {
        if PASSTHROUGH_FIELDS.contains(&key.as_str()) {
            continue;
        }
        if !requirements.contains(key) {
            errors.push(FieldError::new(key.as_str(), "field shouldn't be there."));
        }
    }

    errors
}

/// Verify a batch of `(filename, record)` pairs, keeping their order.
pub fn verify_records<'a, I>(
    records: I,
    category: Option<&str>,
    requirements: &Requirements,
) -> Vec<(String, Vec<FieldError>)>
where
    I: IntoIterator<Item = &'a (String, VideoRecord)>,
{
    records
        .into_iter()
        .map(|(name, data)| (name.clone(), verify_video_data(data, category, requirements)))
        .collect()
}

fn check_category(value: Option<&Value>, configured: Option<&str>, errors: &mut Vec<FieldError>) {
    match (value, configured) {
        (None, None) => errors.push(FieldError::new(
            "category",
            "must be in either project config or data file",
        )),
        (Some(value), Some(configured)) if value.as_str() != Some(configured) => {
            errors.push(FieldError::new(
                "category",
                "field does not match configured category",
            ))
        }
        _ => {}
    }
}

fn check_value(req: &FieldRequirement, value: &Value) -> Option<FieldError> {
    let key = req.name.as_str();

    match req.field_type {
        FieldType::Integer => {
            if !(value.is_i64() || value.is_u64()) {
                // A null on an optional field means "not set".
                if value.is_null() && !req.is_required() {
                    return None;
                }
                return Some(FieldError::new(key, "field must be an int"));
            }
            // Values past i64::MAX can't be in the choice list.
            match req.choices() {
                Some(choices) if value.as_i64().map_or(true, |n| !choices.contains(&n)) => {
                    Some(FieldError::new(
                        key,
                        format!("field must be one of {choices:?}"),
                    ))
                }
                _ => None,
            }
        }
        FieldType::Text => {
            if !req.empty_strings && is_falsy(value) {
                Some(FieldError::new(key, "field can't be an empty string"))
            } else {
                None
            }
        }
        FieldType::TextArray => match value {
            Value::Null => None,
            Value::Array(items) => items
                .iter()
                .any(is_falsy)
                .then(|| FieldError::new(key, "field has empty strings in it")),
            other => Some(FieldError::new(
                key,
                format!("field must be a list, got {}", json_type_name(other)),
            )),
        },
        FieldType::Boolean => {
            if value.is_boolean() {
                None
            } else {
                Some(FieldError::new(key, "field has non-boolean value"))
            }
        }
        FieldType::Date | FieldType::DateTime | FieldType::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn record(value: Value) -> VideoRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    fn minimal() -> VideoRecord {
        record(json!({
            "title": "Foo",
            "category": "Test Category",
            "language": "English"
        }))
    }

    fn bundled() -> Requirements {
        Requirements::bundled().unwrap()
    }

    fn count(data: &VideoRecord, category: Option<&str>) -> usize {
        verify_video_data(data, category, &bundled()).len()
    }

    #[test]
    fn minimal_record_is_valid() {
        assert!(verify_video_data(&minimal(), None, &bundled()).is_empty());
    }

    #[test]
    fn each_required_field_is_reported() {
        for key in ["title", "category", "language"] {
            let mut data = minimal();
            data.remove(key);
            assert_eq!(count(&data, None), 1, "removing {key}");
        }
    }

    #[test]
    fn empty_record_has_three_errors() {
        let errors = verify_video_data(&VideoRecord::new(), None, &bundled());
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            [
                "\"category\" must be in either project config or data file",
                "\"title\" field is required",
                "\"language\" field is required",
            ]
        );
    }

    #[test]
    fn three_field_schema_on_empty_record() {
        let reqs = Requirements::from_json_str(
            r#"[
                {"name": "title", "type": "TextField", "empty_strings": true},
                {"name": "category", "type": "ForeignKey"},
                {"name": "language", "type": "TextField"}
            ]"#,
        )
        .unwrap();
        assert_eq!(verify_video_data(&VideoRecord::new(), None, &reqs).len(), 3);
    }

    #[test]
    fn category_from_config_or_data() {
        let mut data = minimal();
        data.remove("category");
        assert_eq!(count(&data, None), 1);
        assert_eq!(count(&data, Some("Test Category")), 0);

        let data = minimal();
        assert_eq!(count(&data, None), 0);
        assert_eq!(count(&data, Some("Test Category")), 0);
        assert_eq!(count(&data, Some("Test Categoryabc")), 1);
    }

    #[test]
    fn empty_configured_category_counts_as_unset() {
        let mut data = minimal();
        data.remove("category");
        assert_eq!(count(&data, Some("")), 1);
    }

    #[test]
    fn category_mismatch_message() {
        let errors = verify_video_data(&minimal(), Some("Other"), &bundled());
        assert_eq!(
            errors,
            vec![FieldError::new(
                "category",
                "field does not match configured category"
            )]
        );
    }

    #[test]
    fn speakers_text_array() {
        let mut data = minimal();

        data.insert("speakers".into(), json!([]));
        assert_eq!(count(&data, None), 0);

        data.insert("speakers".into(), json!([""]));
        assert_eq!(count(&data, None), 1);

        data.insert("speakers".into(), json!(["Jimmy Discotheque"]));
        assert_eq!(count(&data, None), 0);
    }

    #[test]
    fn text_array_reports_once() {
        let mut data = minimal();
        data.insert("tags".into(), json!(["", "ok", ""]));
        assert_eq!(count(&data, None), 1);
    }

    #[test]
    fn text_array_rejects_non_list() {
        let mut data = minimal();
        data.insert("tags".into(), json!("python"));
        let errors = verify_video_data(&data, None, &bundled());
        assert_eq!(errors[0].message, "field must be a list, got string");
    }

    #[test]
    fn state_choices() {
        let mut data = minimal();
        for (state, expected) in [(0, 1), (1, 0), (2, 0), (3, 1)] {
            data.insert("state".into(), json!(state));
            assert_eq!(count(&data, None), expected, "state {state}");
        }
    }

    #[test]
    fn state_choice_message() {
        let mut data = minimal();
        data.insert("state".into(), json!(3));
        let errors = verify_video_data(&data, None, &bundled());
        assert_eq!(errors[0].to_string(), "\"state\" field must be one of [1, 2]");
    }

    #[test]
    fn integer_type_checks() {
        let mut data = minimal();

        data.insert("duration".into(), json!("120"));
        assert_eq!(count(&data, None), 1);

        data.insert("duration".into(), json!(12.5));
        assert_eq!(count(&data, None), 1);

        data.insert("duration".into(), json!(120));
        assert_eq!(count(&data, None), 0);

        // Nullable, so null is fine
        data.insert("duration".into(), Value::Null);
        assert_eq!(count(&data, None), 0);
    }

    #[test]
    fn integer_above_i64_range() {
        let mut data = minimal();
        data.insert("duration".into(), json!(u64::MAX));
        assert_eq!(count(&data, None), 0);

        // Too big for any choice
        data.insert("state".into(), json!(u64::MAX));
        let errors = verify_video_data(&data, None, &bundled());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "field must be one of [1, 2]");
    }

    #[test]
    fn required_integer_rejects_null() {
        let reqs = Requirements::from_json_str(
            r#"[{"name": "title", "type": "TextField", "empty_strings": true},
                {"name": "count", "type": "IntegerField"}]"#,
        )
        .unwrap();
        let data = record(json!({"title": "x", "count": null}));
        let errors = verify_video_data(&data, Some("c"), &reqs);
        assert_eq!(errors, vec![FieldError::new("count", "field must be an int")]);
    }

    #[test]
    fn integer_without_choices_accepts_anything() {
        let reqs = Requirements::from_json_str(
            r#"[{"name": "n", "type": "IntegerField", "choices": []}]"#,
        )
        .unwrap();
        let data = record(json!({"n": 42}));
        assert!(verify_video_data(&data, Some("c"), &reqs).is_empty());
    }

    #[test]
    fn boolean_field() {
        let mut data = minimal();

        data.insert("video_ogv_download_only".into(), json!(true));
        assert_eq!(count(&data, None), 0);

        data.insert("video_ogv_download_only".into(), json!(false));
        assert_eq!(count(&data, None), 0);

        data.insert("video_ogv_download_only".into(), json!("True"));
        assert_eq!(count(&data, None), 1);

        data.insert("video_ogv_download_only".into(), json!(1));
        assert_eq!(count(&data, None), 1);
    }

    #[test]
    fn text_field_empty_strings() {
        let reqs = Requirements::from_json_str(
            r#"[{"name": "title", "type": "TextField", "empty_strings": true},
                {"name": "language", "type": "TextField", "empty_strings": false}]"#,
        )
        .unwrap();

        let data = record(json!({"title": "", "language": "English"}));
        assert!(verify_video_data(&data, Some("c"), &reqs).is_empty());

        let data = record(json!({"title": "x", "language": ""}));
        let errors = verify_video_data(&data, Some("c"), &reqs);
        assert_eq!(
            errors,
            vec![FieldError::new("language", "field can't be an empty string")]
        );
    }

    #[test]
    fn unknown_fields_rejected_in_record_order() {
        let mut data = minimal();
        data.insert("bogus".into(), json!(1));
        data.insert("also_bogus".into(), json!(2));
        let errors = verify_video_data(&data, None, &bundled());
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["bogus", "also_bogus"]);
        assert_eq!(errors[0].to_string(), "\"bogus\" field shouldn't be there.");
    }

    #[test]
    fn id_and_updated_pass_through() {
        let mut data = minimal();
        data.insert("id".into(), json!(1101));
        data.insert("updated".into(), json!("2014-03-01T12:00:00"));
        assert_eq!(count(&data, None), 0);
    }

    #[test]
    fn verify_records_keeps_order() {
        let mut bad = minimal();
        bad.remove("title");
        let records = vec![
            ("0002_b.json".to_string(), bad),
            ("0001_a.json".to_string(), minimal()),
        ];
        let results = verify_records(&records, None, &bundled());
        assert_eq!(results[0].0, "0002_b.json");
        assert_eq!(results[0].1.len(), 1);
        assert_eq!(results[1].0, "0001_a.json");
        assert!(results[1].1.is_empty());
    }
}
