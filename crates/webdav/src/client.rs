//! WebDAV client and remote URL construction.

use crate::credential::Credential;
use crate::error::WebDavError;
use reqwest::{Method, RequestBuilder, Url};
use std::time::Duration;

/// Default timeout for a single WebDAV request, upload included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Split a slash-delimited remote directory into its non-empty segments.
///
/// `"/a//b/c/"` → `["a", "b", "c"]`.
pub fn split_remote_dir(remote_dir: &str) -> Vec<&str> {
    remote_dir.split('/').filter(|s| !s.is_empty()).collect()
}

/// HTTP client bound to one WebDAV root and one credential.
#[derive(Debug, Clone)]
pub struct WebDavClient {
    http: reqwest::Client,
    base: Url,
    credential: Credential,
    mkcol: Method,
}

impl WebDavClient {
    pub fn new(
        base_url: &str,
        credential: Credential,
        timeout: Duration,
    ) -> Result<Self, WebDavError> {
        let base = Url::parse(base_url).map_err(|e| WebDavError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(WebDavError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "expected an http:// or https:// URL".to_string(),
            });
        }

        let mkcol = Method::from_bytes(b"MKCOL").map_err(|e| WebDavError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(WebDavError::Client)?;

        Ok(Self {
            http,
            base,
            credential,
            mkcol,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// URL of a path below the base, each segment percent-encoded.
    pub fn url_for(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Fully-qualified URL of `filename` inside `remote_dir`.
    pub fn file_url(&self, remote_dir: &str, filename: &str) -> Url {
        let mut segments = split_remote_dir(remote_dir);
        segments.push(filename);
        self.url_for(&segments)
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(self.credential.identity(), Some(self.credential.secret()))
    }

    pub(crate) fn mkcol_method(&self) -> Method {
        self.mkcol.clone()
    }
}
