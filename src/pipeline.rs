//! Export orchestration.
//!
//! One [`Exporter`] run drives a single local artifact through
//! `INIT -> QUERYING -> DIR_ENSURING -> UPLOADING -> DONE | FAILED`. The
//! artifact is cleaned up on every exit path.

use crate::artifact::LocalArtifact;
use crate::config::ExportConfig;
use crate::error::ExportError;
use export_core::{RowSource, RowStream};
use pg_dav_export_csv::{export_to_file, ExportMetrics};
use pg_dav_export_webdav::{DirReport, StatusCode, Url, WebDavClient};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Querying,
    DirEnsuring,
    Uploading,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "INIT",
            Stage::Querying => "QUERYING",
            Stage::DirEnsuring => "DIR_ENSURING",
            Stage::Uploading => "UPLOADING",
            Stage::Done => "DONE",
            Stage::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub remote_name: String,
    pub remote_url: Url,
    pub status: StatusCode,
    pub metrics: ExportMetrics,
    pub directories: Vec<DirReport>,
    /// Set when the caller asked to keep the local file
    pub kept_local_path: Option<PathBuf>,
}

pub struct Exporter<S: RowSource> {
    config: ExportConfig,
    source: S,
    client: WebDavClient,
    temp_dir: PathBuf,
    stage: Stage,
}

impl<S: RowSource> Exporter<S> {
    /// Build the WebDAV client up front; no I/O happens here.
    pub fn new(config: ExportConfig, source: S) -> Result<Self, ExportError> {
        let client = WebDavClient::new(
            &config.webdav_url,
            config.credential.clone(),
            config.http_timeout,
        )?;
        Ok(Self {
            config,
            source,
            client,
            temp_dir: std::env::temp_dir(),
            stage: Stage::Init,
        })
    }

    /// Directory for the temporary artifact; the system temp dir by default.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, next: Stage) {
        info!("Export stage {} -> {}", self.stage, next);
        self.stage = next;
    }

    /// Run every stage once. The local artifact is removed afterwards unless
    /// a persistent path was configured.
    pub async fn run(&mut self) -> Result<ExportReport, ExportError> {
        let requested = self.config.local_path.as_deref();
        let artifact = match LocalArtifact::create(requested, &self.temp_dir) {
            Ok(artifact) => artifact,
            Err(e) => {
                self.enter(Stage::Failed);
                return Err(ExportError::Artifact(e));
            }
        };

        let result = self.run_stages(artifact.path()).await;
        match &result {
            Ok(report) => {
                self.enter(Stage::Done);
                info!(
                    "Uploaded {} rows to {} ({})",
                    report.metrics.rows_written, report.remote_url, report.status
                );
            }
            Err(e) => {
                error!("Export failed during {}: {e}", self.stage);
                self.enter(Stage::Failed);
            }
        }

        artifact.cleanup();
        result
    }

    async fn run_stages(&mut self, local_path: &Path) -> Result<ExportReport, ExportError> {
        self.enter(Stage::Querying);
        let cursor = self
            .source
            .open(&self.config.query)
            .await
            .map_err(ExportError::Source)?;
        let stream = RowStream::new(cursor, self.config.fetch_size);
        let metrics = export_to_file(stream, local_path).await?;

        self.enter(Stage::DirEnsuring);
        let directories = self.client.ensure_dir(&self.config.remote_dir).await;

        self.enter(Stage::Uploading);
        let remote_url = self
            .client
            .file_url(&self.config.remote_dir, &self.config.remote_name);
        let response = self.client.upload_file(local_path, &remote_url).await?;

        if !response.outcome().is_success() {
            return Err(ExportError::UploadRejected {
                url: response.url,
                status: response.status,
                body: response.body,
            });
        }

        Ok(ExportReport {
            remote_name: self.config.remote_name.clone(),
            remote_url: response.url,
            status: response.status,
            metrics,
            directories,
            kept_local_path: self.config.local_path.clone(),
        })
    }
}
