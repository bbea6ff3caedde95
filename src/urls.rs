//! URL composition for REST resources.
//!
//! Paths are joined segment by segment without percent decoding or
//! re-encoding, so whatever the caller passes ends up on the wire verbatim.

use std::fmt::Display;

/// A URL split into its five components, borrowing from the source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UrlParts<'a> {
    scheme: Option<&'a str>,
    netloc: Option<&'a str>,
    path: &'a str,
    query: Option<&'a str>,
    fragment: Option<&'a str>,
}

impl<'a> UrlParts<'a> {
    fn split(url: &'a str) -> Self {
        let (rest, fragment) = match url.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (url, None),
        };
        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, Some(query)),
            None => (rest, None),
        };

        let (scheme, rest) = match rest.split_once(':') {
            Some((scheme, rest)) if is_scheme(scheme) => (Some(scheme), rest),
            _ => (None, rest),
        };

        let (netloc, path) = match rest.strip_prefix("//") {
            Some(after) => match after.find('/') {
                Some(idx) => (Some(&after[..idx]), &after[idx..]),
                None => (Some(after), ""),
            },
            None => (None, rest),
        };

        Self {
            scheme,
            netloc,
            path,
            query,
            fragment,
        }
    }

    fn assemble(&self, path: &str) -> String {
        let mut out = String::new();
        if let Some(scheme) = self.scheme {
            out.push_str(scheme);
            out.push(':');
        }
        if let Some(netloc) = self.netloc {
            out.push_str("//");
            out.push_str(netloc);
            if !path.is_empty() && !path.starts_with('/') {
                out.push('/');
            }
        }
        out.push_str(path);
        if let Some(query) = self.query.filter(|q| !q.is_empty()) {
            out.push('?');
            out.push_str(query);
        }
        if let Some(fragment) = self.fragment.filter(|f| !f.is_empty()) {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }
}

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Append path segments to `base`, keeping its scheme, host, query and
/// fragment untouched.
///
/// Empty segments already in the base path are dropped. Segments passed in
/// are appended as-is; one containing `/` simply becomes several path parts.
///
/// ```
/// use steve::join;
///
/// assert_eq!(join("http://localhost?foo=bar", ["path1"]), "http://localhost/path1?foo=bar");
/// assert_eq!(join("http://localhost/api/v1/", ["video", "5"]), "http://localhost/api/v1/video/5");
/// ```
pub fn join<I>(base: &str, segments: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    let parts = UrlParts::split(base);
    let mut path: Vec<String> = parts
        .path
        .split('/')
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    path.extend(segments.into_iter().map(|s| s.to_string()));
    parts.assemble(&path.join("/"))
}

/// Make sure the path component of `url` ends with `/`.
pub fn with_trailing_slash(url: &str) -> String {
    let parts = UrlParts::split(url);
    if parts.path.ends_with('/') {
        return url.to_string();
    }
    let path = format!("{}/", parts.path);
    parts.assemble(&path)
}
