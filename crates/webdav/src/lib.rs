//! WebDAV publishing for pg-dav-export
//!
//! - [`classify`] maps HTTP statuses to [`StatusOutcome`] for both directory
//!   creation and upload interpretation
//! - [`WebDavClient::ensure_dir`] creates every ancestor collection with MKCOL,
//!   left to right, never failing the caller
//! - [`WebDavClient::upload_file`] PUTs a local file with a streamed body
//!
//! Every request carries HTTP basic auth built from a [`Credential`].
//!
//! # Example
//!
//! ```ignore
//! use pg_dav_export_webdav::{Credential, WebDavClient};
//!
//! let client = WebDavClient::new("https://webdav.yandex.ru", credential, timeout)?;
//! client.ensure_dir("Backups/sql_results").await;
//! let url = client.file_url("Backups/sql_results", "users.csv");
//! let response = client.upload_file(&local_path, &url).await?;
//! ```

mod client;
mod credential;
mod error;
mod mkcol;
mod outcome;
mod upload;

pub use client::{split_remote_dir, WebDavClient, DEFAULT_TIMEOUT};
pub use credential::Credential;
pub use error::WebDavError;
pub use mkcol::{DirOutcome, DirReport};
pub use outcome::{classify, StatusOutcome};
pub use reqwest::{StatusCode, Url};
pub use upload::{UploadResponse, UPLOAD_BUFFER_SIZE};
