//! steve
//!
//! Tools for collecting video metadata into local JSON files, checking it
//! against the richard video model, and pushing it to a richard video index.
//!
//! # Example
//!
//! ```
//! use steve::{verify_video_data, Requirements};
//! use serde_json::json;
//!
//! let requirements = Requirements::bundled().unwrap();
//! let video = json!({
//!     "title": "Test video title",
//!     "speakers": ["Jimmy Discotheque"],
//!     "language": "English"
//! });
//! let video = video.as_object().unwrap();
//!
//! // No category in the record and none configured for the project
//! let errors = verify_video_data(video, None, &requirements);
//! assert_eq!(errors.len(), 1);
//!
//! // The project config supplies it
//! let errors = verify_video_data(video, Some("PyCon 2014"), &requirements);
//! assert!(errors.is_empty());
//! ```
//!
//! # Validation Rules
//!
//! | Field type | Check |
//! |------------|-------|
//! | `IntegerField` | an integer, and one of `choices` when declared |
//! | `TextField` | non-empty unless `empty_strings` is allowed |
//! | `TextArrayField` | a list with no empty entries |
//! | `BooleanField` | exactly `true` or `false` |
//!
//! A field is required when it isn't nullable, has no server default and
//! doesn't allow empty strings. `title` is always required. Keys other than
//! the declared fields, `id` and `updated` are rejected.

mod config;
mod error;
mod requirements;
mod restapi;
mod richardapi;
mod store;
mod types;
mod urls;
mod validator;

pub use config::{ProjectConfig, CONFIG_FILE_NAME};
pub use error::{ApiError, ConfigError, FieldError, RequirementsError, RestError, StoreError};
pub use requirements::{FieldRequirement, FieldType, Requirements};
pub use restapi::{session, Api, Resource, RestResponse, REDIRECT_STATUSES};
pub use richardapi::{
    create_video, get_all_categories, get_category, get_video, get_video_id, update_video,
};
pub use store::{load_record, load_records, save_record};
pub use types::{
    is_falsy, json_type_name, strip_server_fields, Category, Page, VideoRecord,
    PASSTHROUGH_FIELDS, SERVER_MANAGED_FIELDS, STATE_DRAFT, STATE_LIVE,
};
pub use urls::{join, with_trailing_slash};
pub use validator::{verify_records, verify_video_data};
