//! Timestamp-diff polling registry watcher.

use packtrace_ledger::ChangeLedger;
use packtrace_types::RegistryTarget;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

#[cfg(windows)]
use packtrace_types::{ChangeCategory, ChangeKind, ChangeRecord, ProcessInfo};

/// Polls configured registry subtrees for last-write timestamp changes.
///
/// On entry to polling the watcher snapshots each accessible subtree's
/// current last-write timestamp; every interval it re-reads them and emits a
/// `Registry Modified` record for each subtree whose timestamp advanced.
/// Subtrees inaccessible at the initial snapshot stay untracked for the
/// session. Constructed no-op on platforms without a registry.
pub struct RegistryWatcher {
    #[cfg_attr(not(windows), allow(dead_code))]
    targets: Vec<RegistryTarget>,
}

impl RegistryWatcher {
    /// Time between polls; the stop signal is observed within one interval.
    pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

    /// Create a watcher for the given targets.
    pub fn new(targets: Vec<RegistryTarget>) -> Self {
        Self { targets }
    }

    /// Spawn the polling task.
    pub fn spawn(
        self,
        ledger: Arc<ChangeLedger>,
        shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run(ledger, shutdown))
    }

    #[cfg(not(windows))]
    async fn run(self, _ledger: Arc<ChangeLedger>, _shutdown: broadcast::Receiver<()>) {
        tracing::warn!("registry watching is only supported on Windows, watcher disabled");
    }

    #[cfg(windows)]
    async fn run(self, ledger: Arc<ChangeLedger>, mut shutdown: broadcast::Receiver<()>) {
        use tracing::{debug, error, info};

        let observer = ProcessInfo::current();
        let mut state: HashMap<String, u64> = HashMap::new();
        for target in &self.targets {
            match read_last_write(target) {
                Some(timestamp) => {
                    info!(target = %target, "tracking registry key");
                    state.insert(target.subtree.clone(), timestamp);
                }
                None => {
                    error!(target = %target, "cannot access registry key, it will not be tracked");
                }
            }
        }

        let mut ticker = tokio::time::interval(Self::POLL_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await; // first tick completes immediately

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    for target in &self.targets {
                        let Some(current) = read_last_write(target) else {
                            debug!(target = %target, "registry key unavailable this cycle");
                            continue;
                        };
                        if timestamp_advanced(&mut state, &target.subtree, current) {
                            ledger.record(ChangeRecord::new(
                                ChangeCategory::Registry,
                                ChangeKind::Modified,
                                format!("{} modified", target.subtree),
                                observer.clone(),
                            ));
                        }
                    }
                }
                _ = shutdown.recv() => break,
            }
        }
    }
}

/// Compare `current` to the tracked timestamp for `subtree`, updating it.
///
/// Returns true only when the subtree is tracked and its timestamp changed.
/// Untracked subtrees are ignored; they were inaccessible at session start.
#[cfg_attr(not(windows), allow(dead_code))]
fn timestamp_advanced(state: &mut HashMap<String, u64>, subtree: &str, current: u64) -> bool {
    match state.get_mut(subtree) {
        Some(previous) if *previous != current => {
            *previous = current;
            true
        }
        _ => false,
    }
}

/// Read a key's last-write timestamp as a raw FILETIME value.
#[cfg(windows)]
fn read_last_write(target: &RegistryTarget) -> Option<u64> {
    use winreg::enums::KEY_READ;

    let key = winreg::RegKey::predef(hive_key(target.hive))
        .open_subkey_with_flags(&target.subtree, KEY_READ)
        .ok()?;
    let info = key.query_info().ok()?;
    let filetime = info.last_write_time;
    Some(((filetime.dwHighDateTime as u64) << 32) | filetime.dwLowDateTime as u64)
}

#[cfg(windows)]
fn hive_key(hive: packtrace_types::RegistryHive) -> winreg::HKEY {
    use packtrace_types::RegistryHive;
    use winreg::enums::{
        HKEY_CLASSES_ROOT, HKEY_CURRENT_CONFIG, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, HKEY_USERS,
    };

    match hive {
        RegistryHive::ClassesRoot => HKEY_CLASSES_ROOT,
        RegistryHive::CurrentUser => HKEY_CURRENT_USER,
        RegistryHive::LocalMachine => HKEY_LOCAL_MACHINE,
        RegistryHive::Users => HKEY_USERS,
        RegistryHive::CurrentConfig => HKEY_CURRENT_CONFIG,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_timestamp_emits_nothing() {
        let mut state = HashMap::from([("SOFTWARE".to_string(), 100u64)]);
        assert!(!timestamp_advanced(&mut state, "SOFTWARE", 100));
        assert_eq!(state["SOFTWARE"], 100);
    }

    #[test]
    fn changed_timestamp_emits_once_and_updates_state() {
        let mut state = HashMap::from([("SOFTWARE".to_string(), 100u64)]);
        assert!(timestamp_advanced(&mut state, "SOFTWARE", 250));
        assert_eq!(state["SOFTWARE"], 250);
        // Same value next poll: quiescent again.
        assert!(!timestamp_advanced(&mut state, "SOFTWARE", 250));
    }

    #[test]
    fn untracked_subtrees_are_ignored() {
        let mut state = HashMap::new();
        assert!(!timestamp_advanced(&mut state, "SOFTWARE", 42));
        assert!(state.is_empty());
    }

    #[cfg(not(windows))]
    #[tokio::test]
    async fn no_op_on_unsupported_platform() {
        let ledger = Arc::new(ChangeLedger::new());
        let (_tx, rx) = broadcast::channel(1);
        let watcher = RegistryWatcher::new(vec![RegistryTarget::new(
            packtrace_types::RegistryHive::LocalMachine,
            "SOFTWARE",
        )]);
        // Task returns immediately without touching the ledger.
        watcher.spawn(Arc::clone(&ledger), rx).await.unwrap();
        assert_eq!(ledger.total(), 0);
    }
}
