//! Application service: shared runner archive provisioning.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;

use crate::application::ports::{ArtifactStore, LocalFs, ProgressReporter};
use crate::domain::ArtifactError;

/// How `ensure_artifact` satisfied the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactStatus {
    /// A valid archive was already on disk.
    Cached,
    /// The archive was (re)downloaded and validated.
    Downloaded,
}

/// Make sure a valid runner archive exists at `target`.
///
/// A present and valid archive is reused. A missing or invalid one is
/// deleted and downloaded from `url`; a download that still fails
/// validation is deleted too, so an invalid archive never stays on disk.
///
/// # Errors
///
/// Returns an [`ArtifactError`] if the download fails, the downloaded file
/// is not a valid archive, or a corrupt file cannot be removed.
pub async fn ensure_artifact(
    target: &Path,
    url: &str,
    expected_sha256: Option<&str>,
    fs: &impl LocalFs,
    artifacts: &impl ArtifactStore,
    reporter: &impl ProgressReporter,
) -> Result<ArtifactStatus, ArtifactError> {
    if fs.exists(target) {
        match artifacts.validate(target, expected_sha256) {
            Ok(()) => {
                reporter.success(&format!("using cached runner archive {}", target.display()));
                return Ok(ArtifactStatus::Cached);
            }
            Err(e) => {
                reporter.warn(&format!("{e}; downloading it again"));
                remove(fs, target)?;
            }
        }
    }

    reporter.step(&format!("downloading {url}..."));
    artifacts.download(url, target).await?;

    if let Err(e) = artifacts.validate(target, expected_sha256) {
        remove(fs, target)?;
        return Err(e);
    }
    reporter.success(&format!("runner archive saved to {}", target.display()));
    Ok(ArtifactStatus::Downloaded)
}

fn remove(fs: &impl LocalFs, path: &Path) -> Result<(), ArtifactError> {
    fs.remove_file(path).map_err(|e| ArtifactError::Cleanup {
        path: path.to_path_buf(),
        reason: format!("{e:#}"),
    })
}
