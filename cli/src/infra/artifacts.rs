//! Runner archive infrastructure: implements `ArtifactStore` for `.tar.gz`
//! release archives.
//!
//! Downloads stream into a temporary file next to the destination and are
//! persisted only once the transfer completes, so an interrupted download
//! never leaves a half-written archive under the final name.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};

use crate::application::ports::ArtifactStore;
use crate::domain::ArtifactError;

const USER_AGENT: &str = concat!("runner-fleet/", env!("CARGO_PKG_VERSION"));

/// Production `ArtifactStore` for gzip-compressed tar archives.
pub struct TarGzArtifacts {
    show_progress: bool,
}

impl TarGzArtifacts {
    /// `show_progress` draws a byte progress bar during downloads.
    #[must_use]
    pub fn new(show_progress: bool) -> Self {
        Self { show_progress }
    }
}

impl ArtifactStore for TarGzArtifacts {
    async fn download(&self, url: &str, dest: &Path) -> Result<(), ArtifactError> {
        let url_owned = url.to_string();
        let dest = dest.to_path_buf();
        let quiet = !self.show_progress;
        tokio::task::spawn_blocking(move || download_blocking(&url_owned, &dest, quiet))
            .await
            .map_err(|e| ArtifactError::Download {
                url: url.to_string(),
                reason: format!("download task failed: {e}"),
            })?
    }

    fn validate(&self, path: &Path, expected_sha256: Option<&str>) -> Result<(), ArtifactError> {
        let invalid = |reason: String| ArtifactError::Invalid {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(expected) = expected_sha256 {
            let actual = sha256_file(path).map_err(|e| invalid(e.to_string()))?;
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(invalid(format!(
                    "SHA-256 mismatch (expected {expected}, got {actual})"
                )));
            }
        }

        let file = File::open(path).map_err(|e| invalid(e.to_string()))?;
        let mut archive = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
        let mut entries = 0usize;
        for entry in archive.entries().map_err(|e| invalid(e.to_string()))? {
            let mut entry = entry.map_err(|e| invalid(format!("unreadable entry: {e}")))?;
            io::copy(&mut entry, &mut io::sink())
                .map_err(|e| invalid(format!("truncated entry: {e}")))?;
            entries += 1;
        }
        if entries == 0 {
            return Err(invalid("archive has no entries".to_string()));
        }
        // Read through to the gzip trailer so a bad CRC or cut-off stream fails.
        let mut decoder = archive.into_inner();
        io::copy(&mut decoder, &mut io::sink())
            .map_err(|e| invalid(format!("corrupt gzip stream: {e}")))?;
        Ok(())
    }

    fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ArtifactError> {
        let extract_err = |reason: String| ArtifactError::Extract {
            path: archive.to_path_buf(),
            reason,
        };
        let file = File::open(archive).map_err(|e| extract_err(e.to_string()))?;
        let mut tar = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
        tar.set_preserve_permissions(true);
        tar.unpack(dest)
            .map_err(|e| extract_err(format!("into {}: {e}", dest.display())))
    }
}

fn download_blocking(url: &str, dest: &Path, quiet: bool) -> Result<(), ArtifactError> {
    let fail = |reason: String| ArtifactError::Download {
        url: url.to_string(),
        reason,
    };

    let parent = dest
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    std::fs::create_dir_all(&parent)
        .map_err(|e| fail(format!("creating {}: {e}", parent.display())))?;

    let response = match ureq::get(url).set("User-Agent", USER_AGENT).call() {
        Ok(r) => r,
        Err(ureq::Error::Status(code, _)) => return Err(fail(format!("HTTP {code}"))),
        Err(ureq::Error::Transport(t)) => return Err(fail(t.to_string())),
    };
    let total = response
        .header("Content-Length")
        .and_then(|v| v.parse::<u64>().ok());

    let mut tmp = tempfile::NamedTempFile::new_in(&parent)
        .map_err(|e| fail(format!("creating temporary file: {e}")))?;
    let pb = make_progress_bar(quiet, total);

    let mut reader = response.into_reader();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = reader
            .read(&mut buf)
            .map_err(|e| fail(format!("download interrupted: {e}")))?;
        if n == 0 {
            break;
        }
        tmp.write_all(&buf[..n])
            .map_err(|e| fail(format!("writing temporary file: {e}")))?;
        pb.inc(n as u64);
    }
    pb.finish_and_clear();

    tmp.as_file()
        .sync_all()
        .map_err(|e| fail(format!("flushing temporary file: {e}")))?;
    tmp.persist(dest)
        .map_err(|e| fail(format!("saving to {}: {}", dest.display(), e.error)))?;
    Ok(())
}

fn make_progress_bar(quiet: bool, total: Option<u64>) -> indicatif::ProgressBar {
    if quiet {
        return indicatif::ProgressBar::hidden();
    }
    if let Some(t) = total {
        let pb = indicatif::ProgressBar::new(t);
        pb.set_style(
            indicatif::ProgressStyle::default_bar()
                .template("    {bar:40.cyan/dim} {percent}%  {bytes}/{total_bytes}")
                .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
                .progress_chars("━━─"),
        );
        pb
    } else {
        indicatif::ProgressBar::new_spinner()
    }
}

/// Lowercase hex SHA-256 of the file at `path`.
fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}
