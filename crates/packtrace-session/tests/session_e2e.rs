//! End-to-end observation session tests.

use packtrace_session::{ObservationCoordinator, SessionConfig, SessionError};
use packtrace_types::ChangeKind;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::time::sleep;

fn config_for(temp: &TempDir, duration_secs: u64) -> SessionConfig {
    SessionConfig {
        roots: vec![temp.path().join("watched")],
        registry_targets: Vec::new(),
        duration_secs,
        report_path: temp.path().join("report.json"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn captures_file_creation_and_exports_report() {
    let temp = TempDir::new().unwrap();
    let watched = temp.path().join("watched");
    std::fs::create_dir(&watched).unwrap();

    let config = config_for(&temp, 3600);
    let report_path = config.report_path.clone();
    let coordinator = ObservationCoordinator::new(config);
    let stop = coordinator.stop_signal();

    let session = tokio::spawn(coordinator.run());

    // Give the watcher time to subscribe, then perform the "installation".
    sleep(Duration::from_millis(200)).await;
    std::fs::write(watched.join("x.txt"), b"installed").unwrap();
    sleep(Duration::from_millis(400)).await;

    stop.trigger();
    let snapshot = session.await.unwrap().unwrap();

    let created: Vec<_> = snapshot
        .files
        .iter()
        .filter(|r| r.kind == ChangeKind::Created && r.detail.ends_with("x.txt"))
        .collect();
    assert_eq!(created.len(), 1, "files: {:?}", snapshot.files);

    let report: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&report_path).unwrap()).unwrap();
    let files = report["files"].as_array().unwrap();
    let created_entries: Vec<_> = files
        .iter()
        .filter(|entry| {
            entry["event_type"] == "File Created"
                && entry["details"].as_str().unwrap().ends_with("x.txt")
        })
        .collect();
    assert_eq!(created_entries.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn stop_signal_ends_session_promptly() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join("watched")).unwrap();

    // Window far longer than the test; only the stop signal can end it.
    let coordinator = ObservationCoordinator::new(config_for(&temp, 3600));
    let stop = coordinator.stop_signal();
    let session = tokio::spawn(coordinator.run());

    sleep(Duration::from_millis(100)).await;
    let begin = Instant::now();
    stop.trigger();
    session.await.unwrap().unwrap();

    // Every watcher must acknowledge within one polling interval.
    assert!(
        begin.elapsed() < Duration::from_secs(2),
        "stop took {:?}",
        begin.elapsed()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn window_elapse_ends_session_without_a_signal() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join("watched")).unwrap();

    let coordinator = ObservationCoordinator::new(config_for(&temp, 1));
    let snapshot = coordinator.run().await.unwrap();
    assert_eq!(snapshot.registry.len(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn unwritable_report_destination_fails_the_session() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join("watched")).unwrap();

    let mut config = config_for(&temp, 1);
    config.report_path = temp.path().join("no-such-dir").join("report.json");

    let err = ObservationCoordinator::new(config).run().await.unwrap_err();
    assert!(matches!(err, SessionError::Export(_)));
}
