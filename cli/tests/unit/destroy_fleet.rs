//! Tests for the `destroy` use-case: best-effort teardown with a removal
//! token fallback that runs only when the service manager path errors.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::Path;

use runner_fleet::application::services::fleet::destroy_fleet;
use runner_fleet::domain::{FleetError, TokenError, UnitStatus};

use crate::helpers::{fleet_config, runner_archive};
use crate::mocks::{Harness, ServiceMode};

fn make_unit_dirs(base: &Path, names: &[&str]) {
    for name in names {
        std::fs::create_dir_all(base.join(name).join("bin")).unwrap();
        std::fs::write(base.join(name).join(".runner"), "{}").unwrap();
    }
}

#[tokio::test]
async fn test_destroy_missing_base_dir_is_fatal_without_unit_work() {
    let tmp = tempfile::tempdir().unwrap();
    let config = fleet_config(&tmp.path().join("absent"), 3);
    let h = Harness::new(runner_archive(), ServiceMode::Present { running: true });

    let err = destroy_fleet(&config, &h.ports()).await.expect_err("no base dir");

    assert!(matches!(
        err.downcast_ref::<FleetError>(),
        Some(FleetError::BaseDirMissing(_))
    ));
    assert!(h.services.calls.borrow().is_empty());
    assert_eq!(h.tokens.removal_calls.get(), 0);
    assert!(h.agent.removed.borrow().is_empty());
}

#[tokio::test]
async fn test_destroy_skips_units_without_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let config = fleet_config(tmp.path(), 2);
    make_unit_dirs(tmp.path(), &["runner-1"]);
    let h = Harness::new(runner_archive(), ServiceMode::Present { running: true });

    let summary = destroy_fleet(&config, &h.ports()).await.unwrap();

    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.skipped(), 1);
    assert_eq!(summary.reports[1].status, UnitStatus::Skipped);
    let finds = h.services.calls_starting_with("find");
    assert_eq!(finds, vec!["actions.runner.*.runner-1.service"]);
}

#[tokio::test]
async fn test_destroy_stops_running_service_then_deletes_it() {
    let tmp = tempfile::tempdir().unwrap();
    let config = fleet_config(tmp.path(), 1);
    make_unit_dirs(tmp.path(), &["runner-1"]);
    let h = Harness::new(runner_archive(), ServiceMode::Present { running: true });

    let summary = destroy_fleet(&config, &h.ports()).await.unwrap();

    assert_eq!(summary.succeeded(), 1);
    let calls = h.services.calls.borrow().clone();
    let stop = calls.iter().position(|c| c.starts_with("stop:")).unwrap();
    let delete = calls.iter().position(|c| c.starts_with("delete:")).unwrap();
    assert!(stop < delete);
    assert_eq!(h.tokens.removal_calls.get(), 0);
    assert!(!tmp.path().join("runner-1").exists());
}

#[tokio::test]
async fn test_destroy_stopped_service_is_deleted_without_stop() {
    let tmp = tempfile::tempdir().unwrap();
    let config = fleet_config(tmp.path(), 1);
    make_unit_dirs(tmp.path(), &["runner-1"]);
    let h = Harness::new(runner_archive(), ServiceMode::Present { running: false });

    destroy_fleet(&config, &h.ports()).await.unwrap();

    assert!(h.services.calls_starting_with("stop").is_empty());
    assert_eq!(h.services.calls_starting_with("delete").len(), 1);
}

#[tokio::test]
async fn test_destroy_service_not_found_does_not_fall_back() {
    let tmp = tempfile::tempdir().unwrap();
    let config = fleet_config(tmp.path(), 1);
    make_unit_dirs(tmp.path(), &["runner-1"]);
    let h = Harness::new(runner_archive(), ServiceMode::Absent);

    let summary = destroy_fleet(&config, &h.ports()).await.unwrap();

    assert_eq!(summary.warned(), 1);
    assert_eq!(h.tokens.removal_calls.get(), 0);
    assert!(h.agent.removed.borrow().is_empty());
    assert!(!tmp.path().join("runner-1").exists());
}

#[tokio::test]
async fn test_destroy_lookup_error_falls_back_to_removal_token() {
    let tmp = tempfile::tempdir().unwrap();
    let config = fleet_config(tmp.path(), 2);
    make_unit_dirs(tmp.path(), &["runner-1", "runner-2"]);
    let h = Harness::new(runner_archive(), ServiceMode::FindFails);

    let summary = destroy_fleet(&config, &h.ports()).await.unwrap();

    assert_eq!(summary.succeeded(), 2);
    assert_eq!(h.tokens.removal_calls.get(), 2);
    let removed = h.agent.removed.borrow();
    assert_eq!(removed.len(), 2);
    assert_eq!(removed[0].0, tmp.path().join("runner-1"));
    assert_eq!(removed[0].1, "RM-TOKEN");
    assert!(!tmp.path().join("runner-1").exists());
    assert!(!tmp.path().join("runner-2").exists());
}

#[tokio::test]
async fn test_destroy_delete_error_falls_back_to_removal_token() {
    let tmp = tempfile::tempdir().unwrap();
    let config = fleet_config(tmp.path(), 1);
    make_unit_dirs(tmp.path(), &["runner-1"]);
    let h = Harness::new(runner_archive(), ServiceMode::DeleteFails);

    destroy_fleet(&config, &h.ports()).await.unwrap();

    assert_eq!(h.tokens.removal_calls.get(), 1);
    assert_eq!(h.agent.removed.borrow().len(), 1);
}

#[tokio::test]
async fn test_destroy_failed_fallback_still_deletes_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let config = fleet_config(tmp.path(), 2);
    make_unit_dirs(tmp.path(), &["runner-1", "runner-2"]);
    let mut h = Harness::new(runner_archive(), ServiceMode::FindFails);
    h.tokens.removal_error = Some(|| TokenError::Transient("HTTP 502".to_string()));

    let summary = destroy_fleet(&config, &h.ports()).await.unwrap();

    assert_eq!(summary.failed(), 2);
    assert!(h.agent.removed.borrow().is_empty());
    assert!(!tmp.path().join("runner-1").exists());
    assert!(!tmp.path().join("runner-2").exists());
    assert!(matches!(
        &summary.reports[0].status,
        UnitStatus::Failed(reason) if reason.contains("HTTP 502")
    ));
}

#[tokio::test]
async fn test_destroy_failed_agent_remove_is_recorded() {
    let tmp = tempfile::tempdir().unwrap();
    let config = fleet_config(tmp.path(), 1);
    make_unit_dirs(tmp.path(), &["runner-1"]);
    let mut h = Harness::new(runner_archive(), ServiceMode::FindFails);
    h.agent.remove_exit = 1;

    let summary = destroy_fleet(&config, &h.ports()).await.unwrap();

    assert_eq!(summary.failed(), 1);
    assert!(!tmp.path().join("runner-1").exists());
}

#[tokio::test]
async fn test_destroy_stops_service_stuck_activating_before_delete() {
    let tmp = tempfile::tempdir().unwrap();
    let config = fleet_config(tmp.path(), 1);
    make_unit_dirs(tmp.path(), &["runner-1"]);
    let h = Harness::new(runner_archive(), ServiceMode::Activating);

    let summary = destroy_fleet(&config, &h.ports()).await.unwrap();

    assert_eq!(summary.succeeded(), 1);
    let calls = h.services.calls.borrow().clone();
    let stop = calls
        .iter()
        .position(|c| c.starts_with("stop:"))
        .expect("activating service must be stopped");
    let delete = calls.iter().position(|c| c.starts_with("delete:")).unwrap();
    assert!(stop < delete);
    assert_eq!(h.tokens.removal_calls.get(), 0);
}

#[tokio::test]
async fn test_destroy_directory_delete_failure_is_recorded_and_loop_continues() {
    let tmp = tempfile::tempdir().unwrap();
    let config = fleet_config(tmp.path(), 2);
    make_unit_dirs(tmp.path(), &["runner-1", "runner-2"]);
    let mut h = Harness::new(runner_archive(), ServiceMode::Present { running: true });
    h.fs.fail_remove_dir_for = Some("runner-1".to_string());

    let summary = destroy_fleet(&config, &h.ports()).await.unwrap();

    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.succeeded(), 1);
    assert!(matches!(
        &summary.reports[0].status,
        UnitStatus::Failed(reason) if reason.contains("runner-1: cannot delete")
            && reason.contains("resource busy")
    ));
    assert_eq!(summary.reports[1].status, UnitStatus::Succeeded);
    assert!(tmp.path().join("runner-1").exists());
    assert!(!tmp.path().join("runner-2").exists());
    assert_eq!(h.services.calls_starting_with("delete").len(), 2);
}
