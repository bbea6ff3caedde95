//! Operations against a richard video index API.
//!
//! Every function takes the API root URL (e.g. `http://pyvideo.org/api/v1/`)
//! and builds its own [`Api`]. Writes validate the record first, and nothing
//! is sent when validation fails.

use tracing::{debug, info};

use crate::error::ApiError;
use crate::requirements::Requirements;
use crate::restapi::Api;
use crate::types::{strip_server_fields, Category, Page, VideoRecord};
use crate::validator::verify_video_data;

/// Fetch every category, following `next` links until the last page.
///
/// # Errors
///
/// Returns `ApiError::Rest` for HTTP failures and `ApiError::Pagination` when
/// a `next` link carries no `page` parameter.
pub fn get_all_categories(api_url: &str) -> Result<Vec<Category>, ApiError> {
    let categories = Api::new(api_url)?.resource("category");

    let mut page: Page<Category> = categories.get(None, &[])?.json()?;
    let mut all = std::mem::take(&mut page.results);

    while let Some(next) = page.next.take() {
        let number = page_param(&next).ok_or(ApiError::Pagination { url: next })?;
        debug!(page = %number, fetched = all.len(), "fetching category page");
        page = categories.get(None, &[("page", number.as_str())])?.json()?;
        all.append(&mut page.results);
    }

    Ok(all)
}

fn page_param(next: &str) -> Option<String> {
    let (_, query) = next.split_once('?')?;
    let query = query.split_once('#').map_or(query, |(query, _)| query);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.into_owned())
}

/// Look up a category by exact title.
///
/// # Errors
///
/// Returns `ApiError::DoesNotExist` if no category has that title.
pub fn get_category(api_url: &str, title: &str) -> Result<Category, ApiError> {
    get_all_categories(api_url)?
        .into_iter()
        .find(|cat| cat.title == title)
        .ok_or_else(|| ApiError::DoesNotExist {
            kind: "category",
            name: title.to_string(),
        })
}

/// Fetch one video.
///
/// # Errors
///
/// A missing video surfaces as `RestError::Client` with status 404.
pub fn get_video(
    api_url: &str,
    auth_token: Option<&str>,
    video_id: u64,
) -> Result<VideoRecord, ApiError> {
    let api = Api::new(api_url)?;
    let video = api
        .resource("video")
        .member(video_id)
        .get(auth_token, &[])?
        .json()?;
    Ok(video)
}

/// Create a video and return the server's copy, including its new id.
///
/// This doesn't check whether the video already exists.
///
/// # Errors
///
/// Returns `ApiError::MissingRequiredData` with every validation error, before
/// any request is made, when `video_data` doesn't satisfy `requirements`.
pub fn create_video(
    api_url: &str,
    auth_token: &str,
    video_data: &VideoRecord,
    requirements: &Requirements,
) -> Result<VideoRecord, ApiError> {
    ensure_valid(video_data, requirements)?;

    let api = Api::new(api_url)?;
    let created: VideoRecord = api
        .resource("video")
        .post(video_data, Some(auth_token), &[])?
        .json()?;
    info!(id = ?created.get("id"), "created video");
    Ok(created)
}

/// Replace an existing video's data and return the server's copy.
///
/// `resource_uri` and `added` are dropped from `video_data` first; they come
/// back from the server after a create but can't be sent.
///
/// This overwrites whatever is stored under `video_id`, so make sure the id
/// belongs to the video you mean.
///
/// # Errors
///
/// Returns `ApiError::MissingRequiredData` before any request when the data
/// is invalid, and the server's 404 as `RestError::Client` when the video
/// doesn't exist.
pub fn update_video(
    api_url: &str,
    auth_token: &str,
    video_id: u64,
    mut video_data: VideoRecord,
    requirements: &Requirements,
) -> Result<VideoRecord, ApiError> {
    strip_server_fields(&mut video_data);
    ensure_valid(&video_data, requirements)?;

    let api = Api::new(api_url)?;
    let video = api.resource("video").member(video_id);

    // 404 here means there's nothing to update
    video.get(Some(auth_token), &[])?;

    let updated: VideoRecord = video.put(&video_data, Some(auth_token), &[])?.json()?;
    info!(id = video_id, "updated video");
    Ok(updated)
}

fn ensure_valid(video_data: &VideoRecord, requirements: &Requirements) -> Result<(), ApiError> {
    let errors = verify_video_data(video_data, None, requirements);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::MissingRequiredData { errors })
    }
}

/// Parse the video id out of a richard video URL.
///
/// ```
/// use steve::get_video_id;
///
/// assert_eq!(get_video_id("http://pyvideo.org/video/2822/make-api-calls").unwrap(), 2822);
/// assert!(get_video_id("http://pyvideo.org/").is_err());
/// ```
pub fn get_video_id(richard_url: &str) -> Result<u64, ApiError> {
    richard_url
        .split_once("/video/")
        .and_then(|(_, rest)| rest.split('/').next())
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| ApiError::InvalidVideoUrl {
            url: richard_url.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_id_from_urls() {
        for (url, expected) in [
            ("http://pyvideo.org/video/2822", 2822),
            ("http://pyvideo.org/video/2822/", 2822),
            ("http://pyvideo.org/video/2822/foo-bar-baz", 2822),
            ("https://pyvideo.org/video/2822/foo-bar-baz", 2822),
            ("https://richard.example.com/video/2822/foo-bar-baz", 2822),
        ] {
            assert_eq!(get_video_id(url).unwrap(), expected, "{url}");
        }
    }

    #[test]
    fn video_id_invalid_urls() {
        for url in ["", "foo", "http://pyvideo.org/", "http://pyvideo.org/video/foo"] {
            assert!(
                matches!(get_video_id(url), Err(ApiError::InvalidVideoUrl { .. })),
                "{url}"
            );
        }
    }

    #[test]
    fn page_param_extraction() {
        assert_eq!(
            page_param("http://h/api/v1/category/?page=3").as_deref(),
            Some("3")
        );
        assert_eq!(
            page_param("http://h/api/v1/category/?format=json&page=12").as_deref(),
            Some("12")
        );
        assert_eq!(page_param("http://h/api/v1/category/?offset=50"), None);
        assert_eq!(page_param("/relative?page=2#x").as_deref(), Some("2"));
        assert_eq!(page_param("http://h/api/v1/category/"), None);
    }
}
