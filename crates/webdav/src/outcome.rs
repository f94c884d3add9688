//! HTTP status classification shared by MKCOL and PUT handling.

use reqwest::StatusCode;
use std::fmt;

/// What a WebDAV response status means for the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutcome {
    /// 201: the collection or file was created.
    Created,
    /// Any other 2xx (e.g. 204 when a PUT replaced an existing file).
    Succeeded,
    /// 405 on MKCOL: the collection most likely exists already.
    AlreadyExists,
    /// 409: an ancestor collection is missing.
    AncestorMissing,
    /// Anything else.
    OtherFailure,
}

impl StatusOutcome {
    /// True for the 2xx outcomes.
    pub fn is_success(&self) -> bool {
        matches!(self, StatusOutcome::Created | StatusOutcome::Succeeded)
    }
}

impl fmt::Display for StatusOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusOutcome::Created => "created",
            StatusOutcome::Succeeded => "succeeded",
            StatusOutcome::AlreadyExists => "already exists",
            StatusOutcome::AncestorMissing => "ancestor missing",
            StatusOutcome::OtherFailure => "failed",
        };
        f.write_str(s)
    }
}

/// Classify a response status.
pub fn classify(status: StatusCode) -> StatusOutcome {
    match status {
        StatusCode::CREATED => StatusOutcome::Created,
        StatusCode::METHOD_NOT_ALLOWED => StatusOutcome::AlreadyExists,
        StatusCode::CONFLICT => StatusOutcome::AncestorMissing,
        s if s.is_success() => StatusOutcome::Succeeded,
        _ => StatusOutcome::OtherFailure,
    }
}
