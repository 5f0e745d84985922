//! Tests for `ensure_artifact`: cache hits, re-downloads, and checksums.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use runner_fleet::application::services::artifact::{ArtifactStatus, ensure_artifact};
use runner_fleet::domain::ArtifactError;
use runner_fleet::infra::fs::HostFs;
use sha2::{Digest, Sha256};

use crate::helpers::{GARBAGE, archive_of, runner_archive};
use crate::mocks::{FakeArtifacts, RecordingReporter};

const URL: &str = "https://github.com/actions/runner/releases/download/v2.321.0/runner.tar.gz";

#[tokio::test]
async fn test_ensure_artifact_twice_downloads_once() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("runner.tar.gz");
    let artifacts = FakeArtifacts::serving(runner_archive());
    let reporter = RecordingReporter::default();

    let first = ensure_artifact(&target, URL, None, &HostFs, &artifacts, &reporter)
        .await
        .unwrap();
    let second = ensure_artifact(&target, URL, None, &HostFs, &artifacts, &reporter)
        .await
        .unwrap();

    assert_eq!(first, ArtifactStatus::Downloaded);
    assert_eq!(second, ArtifactStatus::Cached);
    assert_eq!(artifacts.downloads.get(), 1);
}

#[tokio::test]
async fn test_ensure_artifact_checksum_mismatch_triggers_redownload() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("runner.tar.gz");
    let good = runner_archive();
    let digest = format!("{:x}", Sha256::digest(&good));
    // Structurally valid, but an older release.
    std::fs::write(&target, archive_of(&[("config.sh", b"old".as_slice())])).unwrap();

    let artifacts = FakeArtifacts::serving(good.clone());
    let reporter = RecordingReporter::default();
    let status = ensure_artifact(&target, URL, Some(&digest), &HostFs, &artifacts, &reporter)
        .await
        .unwrap();

    assert_eq!(status, ArtifactStatus::Downloaded);
    assert_eq!(artifacts.downloads.get(), 1);
    assert_eq!(std::fs::read(&target).unwrap(), good);
}

#[tokio::test]
async fn test_ensure_artifact_garbage_cache_is_replaced() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("runner.tar.gz");
    std::fs::write(&target, GARBAGE).unwrap();
    let artifacts = FakeArtifacts::serving(runner_archive());
    let reporter = RecordingReporter::default();

    let status = ensure_artifact(&target, URL, None, &HostFs, &artifacts, &reporter)
        .await
        .unwrap();

    assert_eq!(status, ArtifactStatus::Downloaded);
    assert_eq!(reporter.count("warn"), 1);
}

#[tokio::test]
async fn test_ensure_artifact_download_with_wrong_checksum_is_removed() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("runner.tar.gz");
    let artifacts = FakeArtifacts::serving(runner_archive());
    let reporter = RecordingReporter::default();

    let err = ensure_artifact(
        &target,
        URL,
        Some(&"ab".repeat(32)),
        &HostFs,
        &artifacts,
        &reporter,
    )
    .await
    .expect_err("digest mismatch");

    assert!(matches!(err, ArtifactError::Invalid { .. }));
    assert!(!target.exists());
}
