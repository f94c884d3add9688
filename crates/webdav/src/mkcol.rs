//! Remote directory materialization via MKCOL.

use crate::client::{split_remote_dir, WebDavClient};
use crate::outcome::{classify, StatusOutcome};
use reqwest::StatusCode;
use tracing::{debug, info, warn};

/// Result of one MKCOL attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirOutcome {
    /// The server answered with this status.
    Status {
        status: StatusCode,
        outcome: StatusOutcome,
    },
    /// The request never produced a response.
    Transport(String),
}

/// One accumulated path prefix and what happened when creating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirReport {
    pub path: String,
    pub outcome: DirOutcome,
}

impl WebDavClient {
    /// Make sure every ancestor collection of `remote_dir` exists.
    ///
    /// Issues one MKCOL per accumulated prefix, strictly left to right
    /// (`a`, `a/b`, `a/b/c`). No outcome stops the sequence and nothing is
    /// returned as an error: the upload that follows is the authoritative
    /// signal. Failures are logged as warnings and reported back.
    pub async fn ensure_dir(&self, remote_dir: &str) -> Vec<DirReport> {
        let segments = split_remote_dir(remote_dir);
        let mut reports = Vec::with_capacity(segments.len());

        for depth in 1..=segments.len() {
            let prefix = &segments[..depth];
            let path = prefix.join("/");
            let url = self.url_for(prefix);

            let outcome = match self.request(self.mkcol_method(), url.clone()).send().await {
                Ok(response) => {
                    let status = response.status();
                    let outcome = classify(status);
                    match outcome {
                        StatusOutcome::Created => info!("Created remote directory {path}"),
                        StatusOutcome::AlreadyExists | StatusOutcome::Succeeded => {
                            debug!("Remote directory {path} present (status {status})")
                        }
                        StatusOutcome::AncestorMissing => warn!(
                            "MKCOL {url} -> status {status}: parent directory missing, continuing"
                        ),
                        StatusOutcome::OtherFailure => {
                            warn!("MKCOL {url} -> status {status}")
                        }
                    }
                    DirOutcome::Status { status, outcome }
                }
                Err(e) => {
                    warn!("Could not perform MKCOL {url}: {e}");
                    DirOutcome::Transport(e.to_string())
                }
            };

            reports.push(DirReport { path, outcome });
        }

        reports
    }
}
