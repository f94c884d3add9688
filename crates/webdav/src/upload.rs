//! Streaming file upload via PUT.

use crate::client::WebDavClient;
use crate::error::WebDavError;
use crate::outcome::{classify, StatusOutcome};
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Body, Method, StatusCode, Url};
use std::path::Path;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

/// Chunk size used when streaming the local file (1MB).
pub const UPLOAD_BUFFER_SIZE: usize = 1024 * 1024;

/// Raw answer to an upload. Interpreting it is up to the caller.
#[derive(Debug, Clone)]
pub struct UploadResponse {
    pub url: Url,
    pub status: StatusCode,
    pub body: String,
}

impl UploadResponse {
    pub fn outcome(&self) -> StatusOutcome {
        classify(self.status)
    }
}

impl WebDavClient {
    /// PUT the file at `local_path` to `remote_url`, replacing any existing
    /// file there.
    ///
    /// The body is streamed from the open file handle in
    /// [`UPLOAD_BUFFER_SIZE`] chunks; the handle is released when the request
    /// finishes, whatever its outcome.
    ///
    /// The client timeout bounds the whole request, body transfer included.
    pub async fn upload_file(
        &self,
        local_path: &Path,
        remote_url: &Url,
    ) -> Result<UploadResponse, WebDavError> {
        let local_error = |source| WebDavError::LocalFile {
            path: local_path.to_path_buf(),
            source,
        };

        let file = tokio::fs::File::open(local_path)
            .await
            .map_err(local_error)?;
        let length = file.metadata().await.map_err(local_error)?.len();

        info!(
            "Uploading {} ({} bytes) -> {}",
            local_path.display(),
            length,
            remote_url
        );

        let body = Body::wrap_stream(ReaderStream::with_capacity(file, UPLOAD_BUFFER_SIZE));
        let transport_error = |source| WebDavError::Transport {
            url: remote_url.to_string(),
            source,
        };

        let response = self
            .request(Method::PUT, remote_url.clone())
            .header(CONTENT_LENGTH, length)
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        // The status already says whether the file was stored; a body lost
        // after a 2xx does not undo that
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                warn!("PUT {} -> status {}, but reading the response body failed: {e}", remote_url, status);
                String::new()
            }
            Err(e) => return Err(transport_error(e)),
        };
        debug!("PUT {} -> status {}", remote_url, status);

        Ok(UploadResponse {
            url: remote_url.clone(),
            status,
            body,
        })
    }
}
