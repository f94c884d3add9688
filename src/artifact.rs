//! Local CSV file owned by one export run.

use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, info, warn};

/// The local export file.
///
/// A temporary artifact is removed by [`LocalArtifact::cleanup`] (or on drop,
/// should the run unwind); a persistent one was asked for by the caller and
/// is left in place.
#[derive(Debug)]
pub enum LocalArtifact {
    Temporary(TempPath),
    Persistent(PathBuf),
}

impl LocalArtifact {
    /// Use `requested` when given, otherwise create an empty temp file in
    /// `temp_dir`.
    pub fn create(requested: Option<&Path>, temp_dir: &Path) -> std::io::Result<Self> {
        match requested {
            Some(path) => Ok(LocalArtifact::Persistent(path.to_path_buf())),
            None => {
                let temp = tempfile::Builder::new()
                    .prefix("pg_query_")
                    .suffix(".csv")
                    .tempfile_in(temp_dir)?;
                Ok(LocalArtifact::Temporary(temp.into_temp_path()))
            }
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            LocalArtifact::Temporary(temp) => temp,
            LocalArtifact::Persistent(path) => path,
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, LocalArtifact::Temporary(_))
    }

    /// Remove a temporary artifact. Failures are logged, never raised.
    pub fn cleanup(self) {
        match self {
            LocalArtifact::Temporary(temp) => {
                let path = temp.to_path_buf();
                match temp.close() {
                    Ok(()) => debug!("Removed temporary file {}", path.display()),
                    Err(e) => warn!("Failed to remove temporary file {}: {e}", path.display()),
                }
            }
            LocalArtifact::Persistent(path) => {
                info!("Keeping local file {}", path.display())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_temporary_artifact_is_removed() {
        let temp_dir = TempDir::new().unwrap();
        let artifact = LocalArtifact::create(None, temp_dir.path()).unwrap();
        let path = artifact.path().to_path_buf();
        assert!(artifact.is_temporary());
        assert!(path.exists());
        assert!(path.to_string_lossy().ends_with(".csv"));

        assert_eq!(path.parent(), Some(temp_dir.path()));

        artifact.cleanup();
        assert!(!path.exists());
    }

    #[test]
    fn test_cleanup_tolerates_already_missing_file() {
        let artifact = LocalArtifact::create(None, &std::env::temp_dir()).unwrap();
        std::fs::remove_file(artifact.path()).unwrap();
        artifact.cleanup();
    }

    #[test]
    fn test_persistent_artifact_is_kept() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("keep.csv");
        std::fs::write(&path, "a\n").unwrap();

        let artifact = LocalArtifact::create(Some(&path), temp_dir.path()).unwrap();
        assert!(!artifact.is_temporary());
        assert_eq!(artifact.path(), path.as_path());
        artifact.cleanup();
        assert!(path.exists());
    }

    #[test]
    fn test_drop_removes_temporary_file() {
        let artifact = LocalArtifact::create(None, &std::env::temp_dir()).unwrap();
        let path = artifact.path().to_path_buf();
        drop(artifact);
        assert!(!path.exists());
    }
}
