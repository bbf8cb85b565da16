//! Event-driven filesystem watcher.

use crate::WatchError;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use packtrace_ledger::ChangeLedger;
use packtrace_types::{ChangeCategory, ChangeKind, ChangeRecord, ProcessInfo};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

const EVENT_BUFFER: usize = 1024;

/// Watches a set of root paths recursively for create/modify/delete events.
///
/// Events are delivered by the OS notification facility (no polling); the
/// notify callback normalizes them into change records and forwards them over
/// a channel to a recording task. Roots that do not exist at subscription
/// time are skipped with a warning and do not prevent watching of the
/// remaining roots.
pub struct FsWatcher {
    // Dropping the watcher unsubscribes and closes the event channel.
    watcher: notify::RecommendedWatcher,
    recorder: JoinHandle<()>,
    watched_roots: usize,
}

impl FsWatcher {
    /// Subscribe to all existing roots and start the recording task.
    ///
    /// All valid roots are subscribed before this returns. Fails only if the
    /// OS notification facility itself cannot be initialized.
    pub fn start(
        roots: &[PathBuf],
        ledger: Arc<ChangeLedger>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<Self, WatchError> {
        let observer = ProcessInfo::current();
        let (tx, mut rx) = mpsc::channel::<ChangeRecord>(EVENT_BUFFER);

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, _>| match res {
            Ok(event) => {
                if let Some(record) = normalize(&event, &observer) {
                    // Recording task gone means we are shutting down; events
                    // racing with stop are allowed to drop.
                    let _ = tx.blocking_send(record);
                }
            }
            Err(error) => warn!(%error, "filesystem notification error"),
        })?;

        let mut watched_roots = 0;
        for root in roots {
            if !root.exists() {
                warn!(path = %root.display(), "path does not exist, not watching");
                continue;
            }
            match watcher.watch(root, RecursiveMode::Recursive) {
                Ok(()) => {
                    info!(path = %root.display(), "watching filesystem root");
                    watched_roots += 1;
                }
                Err(error) => {
                    warn!(path = %root.display(), %error, "cannot watch filesystem root");
                }
            }
        }

        let recorder = tokio::spawn(async move {
            loop {
                tokio::select! {
                    received = rx.recv() => match received {
                        Some(record) => ledger.record(record),
                        None => break,
                    },
                    _ = shutdown.recv() => break,
                }
            }
        });

        Ok(Self {
            watcher,
            recorder,
            watched_roots,
        })
    }

    /// Number of roots actually subscribed.
    pub fn watched_roots(&self) -> usize {
        self.watched_roots
    }

    /// Unsubscribe and wait for the recording task to finish.
    pub async fn stop(self) {
        drop(self.watcher);
        let _ = self.recorder.await;
    }
}

/// Map a raw notification to a change record, if it is one we report.
fn normalize(event: &Event, observer: &ProcessInfo) -> Option<ChangeRecord> {
    let path = event.paths.first()?;
    let kind = match &event.kind {
        EventKind::Create(_) => ChangeKind::Created,
        EventKind::Modify(_) => ChangeKind::Modified,
        EventKind::Remove(_) => ChangeKind::Deleted,
        _ => return None,
    };
    Some(ChangeRecord::new(
        ChangeCategory::Filesystem,
        kind,
        path.display().to_string(),
        observer.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::time::{sleep, Duration};

    fn shutdown_pair() -> (broadcast::Sender<()>, broadcast::Receiver<()>) {
        broadcast::channel(1)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn records_file_creation_under_valid_root() {
        let temp = TempDir::new().unwrap();
        let ledger = Arc::new(ChangeLedger::new());
        let (_stop_tx, stop_rx) = shutdown_pair();

        let missing = temp.path().join("does-not-exist");
        let roots = vec![temp.path().to_path_buf(), missing];
        let watcher = FsWatcher::start(&roots, Arc::clone(&ledger), stop_rx).unwrap();
        assert_eq!(watcher.watched_roots(), 1);

        // Let the subscription settle before generating events.
        sleep(Duration::from_millis(100)).await;
        std::fs::write(temp.path().join("x.txt"), b"payload").unwrap();
        sleep(Duration::from_millis(400)).await;

        watcher.stop().await;

        let snapshot = ledger.snapshot();
        let created: Vec<_> = snapshot
            .files
            .iter()
            .filter(|r| r.kind == ChangeKind::Created && r.detail.ends_with("x.txt"))
            .collect();
        assert_eq!(created.len(), 1, "files: {:?}", snapshot.files);
        assert_eq!(created[0].event_type(), "File Created");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn starts_with_no_valid_roots_without_crashing() {
        let ledger = Arc::new(ChangeLedger::new());
        let (_stop_tx, stop_rx) = shutdown_pair();
        let roots = vec![PathBuf::from("/definitely/not/a/real/path")];
        let watcher = FsWatcher::start(&roots, Arc::clone(&ledger), stop_rx).unwrap();
        assert_eq!(watcher.watched_roots(), 0);
        watcher.stop().await;
        assert_eq!(ledger.total(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stop_signal_ends_recording_task() {
        let temp = TempDir::new().unwrap();
        let ledger = Arc::new(ChangeLedger::new());
        let (stop_tx, stop_rx) = shutdown_pair();

        let watcher =
            FsWatcher::start(&[temp.path().to_path_buf()], Arc::clone(&ledger), stop_rx).unwrap();
        stop_tx.send(()).unwrap();
        // The recorder observes the broadcast and exits promptly.
        tokio::time::timeout(Duration::from_secs(1), watcher.recorder)
            .await
            .expect("recorder did not stop")
            .unwrap();
    }
}
