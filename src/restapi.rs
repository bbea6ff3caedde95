//! A slim REST client over `reqwest`'s blocking API.
//!
//! [`Api`] hands out a [`Resource`] per collection name, and a `Resource`
//! can be narrowed to one member with [`Resource::member`]:
//!
//! ```no_run
//! use steve::Api;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), steve::RestError> {
//! let api = Api::new("http://pyvideo.org/api/v1/")?;
//!
//! // All videos
//! let videos = api.resource("video").get(None, &[])?;
//!
//! // One video
//! let video = api.resource("video").member(1).get(None, &[])?;
//!
//! // Create a video; a redirect to the new resource is followed
//! let created = api
//!     .resource("video")
//!     .post(&json!({"title": "Test video"}), Some("ou812"), &[])?;
//! # Ok(())
//! # }
//! ```
//!
//! Requests always carry `Content-Type` and `Accept` set to
//! `application/json`. Status codes 400-499 become [`RestError::Client`] and
//! 500-599 become [`RestError::Server`]; both keep the response.

use std::fmt::Display;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, CONTENT_TYPE, LOCATION};
use reqwest::redirect::Policy;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::RestError;
use crate::urls::{join, with_trailing_slash};

/// Status codes after a write that point at the written resource.
pub const REDIRECT_STATUSES: &[u16] = &[201, 301, 302, 303, 307];

const USER_AGENT: &str = concat!("steve/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP session used by [`Api`] and [`Resource`].
///
/// Redirects are not followed automatically; [`Resource::post`] and
/// [`Resource::put`] handle the one redirect they care about.
pub fn session() -> Result<Client, RestError> {
    Client::builder()
        .redirect(Policy::none())
        .user_agent(USER_AGENT)
        .build()
        .map_err(RestError::from)
}

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct RestResponse {
    status: u16,
    url: String,
    headers: HeaderMap,
    body: String,
}

impl RestResponse {
    fn read(response: reqwest::blocking::Response) -> Result<Self, RestError> {
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response.text()?;
        Ok(Self {
            status,
            url,
            headers,
            body,
        })
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// URL the response came from.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Value of a header, if present and valid UTF-8.
    pub fn header(&self, name: impl reqwest::header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Raw response body.
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `RestError::InvalidBody` if the body isn't valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RestError> {
        serde_json::from_str(&self.body).map_err(|source| RestError::InvalidBody {
            url: self.url.clone(),
            source,
        })
    }

    /// The body as JSON, or as a JSON string holding the raw text when it
    /// doesn't parse.
    pub fn content(&self) -> Value {
        match serde_json::from_str(&self.body) {
            Ok(value) => value,
            Err(e) => {
                warn!(url = %self.url, error = %e, "response body is not JSON");
                Value::String(self.body.clone())
            }
        }
    }
}

/// One REST collection, or one member of a collection.
///
/// The URL always ends with `/`. Cloning is cheap: the HTTP session is
/// reference counted.
#[derive(Debug, Clone)]
pub struct Resource {
    url: String,
    session: Client,
}

impl Resource {
    /// Resource at `url` with a session of its own.
    pub fn new(url: &str) -> Result<Self, RestError> {
        Ok(Self::with_session(url, session()?))
    }

    /// Resource at `url` sharing an existing session.
    pub fn with_session(url: &str, session: Client) -> Self {
        Self {
            url: with_trailing_slash(url),
            session,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// A new resource for member `id` of this collection.
    ///
    /// An empty id yields a copy of this resource.
    pub fn member(&self, id: impl Display) -> Self {
        let id = id.to_string();
        if id.is_empty() {
            return self.clone();
        }
        Self::with_session(&join(&self.url, [id]), self.session.clone())
    }

    /// HTTP GET.
    ///
    /// # Errors
    ///
    /// `Client`/`Server` for 4xx/5xx, `UnknownResponse` for anything else
    /// outside 2xx, `Transport` when the request never completes.
    pub fn get(
        &self,
        auth_token: Option<&str>,
        params: &[(&str, &str)],
    ) -> Result<RestResponse, RestError> {
        let response = self.send(Method::GET, &self.url, None, auth_token, params)?;
        expect_success(response)
    }

    /// HTTP POST of `data` as JSON.
    ///
    /// A 201 or redirect status with a `Location` header is answered with a
    /// single GET of that location, whose response is returned instead.
    pub fn post<T: Serialize + ?Sized>(
        &self,
        data: &T,
        auth_token: Option<&str>,
        params: &[(&str, &str)],
    ) -> Result<RestResponse, RestError> {
        let body = self.encode(data)?;
        let response = self.send(Method::POST, &self.url, Some(body), auth_token, params)?;

        if REDIRECT_STATUSES.contains(&response.status()) {
            return self.follow_location(response, auth_token, params);
        }
        expect_success(response)
    }

    /// HTTP PUT of `data` as JSON.
    ///
    /// Redirects are handled as in [`post`](Self::post). A 2xx reply without
    /// a JSON body (e.g. 204) is replaced by a GET of this resource.
    pub fn put<T: Serialize + ?Sized>(
        &self,
        data: &T,
        auth_token: Option<&str>,
        params: &[(&str, &str)],
    ) -> Result<RestResponse, RestError> {
        let body = self.encode(data)?;
        let response = self.send(Method::PUT, &self.url, Some(body), auth_token, params)?;

        if REDIRECT_STATUSES.contains(&response.status()) {
            return self.follow_location(response, auth_token, params);
        }
        let response = expect_success(response)?;

        if serde_json::from_str::<Value>(response.text()).is_err() {
            debug!(url = %self.url, status = response.status(), "PUT reply has no JSON body, fetching resource");
            return self.get(auth_token, params);
        }
        Ok(response)
    }

    /// HTTP DELETE.
    pub fn delete(
        &self,
        auth_token: Option<&str>,
        params: &[(&str, &str)],
    ) -> Result<RestResponse, RestError> {
        let response = self.send(Method::DELETE, &self.url, None, auth_token, params)?;
        expect_success(response)
    }

    fn encode<T: Serialize + ?Sized>(&self, data: &T) -> Result<String, RestError> {
        serde_json::to_string(data).map_err(|source| RestError::InvalidBody {
            url: self.url.clone(),
            source,
        })
    }

    fn follow_location(
        &self,
        response: RestResponse,
        auth_token: Option<&str>,
        params: &[(&str, &str)],
    ) -> Result<RestResponse, RestError> {
        let Some(location) = response.header(LOCATION).map(str::to_owned) else {
            return Ok(response);
        };
        let location = resolve_location(&self.url, &location);
        debug!(status = response.status(), %location, "following location");
        self.send(Method::GET, &location, None, auth_token, params)
    }

    fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
        auth_token: Option<&str>,
        params: &[(&str, &str)],
    ) -> Result<RestResponse, RestError> {
        let mut request: RequestBuilder = self
            .session
            .request(method.clone(), url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(token) = auth_token {
            request = request.header(AUTHORIZATION, format!("Token {token}"));
        }
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = RestResponse::read(request.send()?)?;
        debug!(%method, url, status = response.status(), "request");

        match response.status() {
            400..=499 => Err(RestError::Client {
                method: method.to_string(),
                url: url.to_string(),
                response: Box::new(response),
            }),
            500..=599 => Err(RestError::Server {
                method: method.to_string(),
                url: url.to_string(),
                response: Box::new(response),
            }),
            _ => Ok(response),
        }
    }
}

fn expect_success(response: RestResponse) -> Result<RestResponse, RestError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(RestError::UnknownResponse {
            response: Box::new(response),
        })
    }
}

/// Resolve a possibly relative `Location` against the request URL.
fn resolve_location(base: &str, location: &str) -> String {
    match url::Url::parse(base).and_then(|base| base.join(location)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => location.to_string(),
    }
}

/// Entry point for a REST API rooted at a base URL.
///
/// Every call to [`resource`](Self::resource) builds a new [`Resource`];
/// nothing is cached.
#[derive(Debug, Clone)]
pub struct Api {
    base_url: String,
    session: Client,
}

impl Api {
    pub fn new(base_url: impl Into<String>) -> Result<Self, RestError> {
        Ok(Self::with_session(base_url, session()?))
    }

    pub fn with_session(base_url: impl Into<String>, session: Client) -> Self {
        Self {
            base_url: base_url.into(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The collection called `name` under the base URL.
    pub fn resource(&self, name: &str) -> Resource {
        Resource::with_session(&join(&self.base_url, [name]), self.session.clone())
    }
}
