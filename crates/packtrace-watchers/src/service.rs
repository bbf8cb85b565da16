//! Snapshot-diff polling service-table watcher.

use packtrace_ledger::ChangeLedger;
use packtrace_types::ChangeKind;
#[cfg(windows)]
use packtrace_types::{ChangeCategory, ChangeRecord, ProcessInfo};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::warn;

/// Fields of a service entry that matter for change detection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Binary path (`ImagePath`).
    pub binary_path: String,
    /// Display name.
    pub display_name: String,
    /// Start type.
    pub start_type: u32,
    /// Service type.
    pub service_type: u32,
}

/// Point-in-time capture of the service table, name to descriptor.
///
/// Used only for diffing against the next capture; never persisted.
pub type ServiceSnapshot = HashMap<String, ServiceDescriptor>;

/// Polls the OS service table and diffs successive snapshots.
///
/// Every interval the new snapshot is three-way diffed against the previous
/// one (created, modified, deleted) and then fully replaces it as the
/// baseline. A service that disappears and reappears between polls therefore
/// produces a Deleted and a later Created record, never a merged "replace".
/// Constructed no-op on platforms without a service table.
pub struct ServiceWatcher;

impl ServiceWatcher {
    /// Time between polls; the stop signal is observed within one interval.
    pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

    /// Create a service-table watcher.
    pub fn new() -> Self {
        Self
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
        warn!("service table watching is only supported on Windows, watcher disabled");
    }

    #[cfg(windows)]
    async fn run(self, ledger: Arc<ChangeLedger>, mut shutdown: broadcast::Receiver<()>) {
        use tracing::error;

        let observer = ProcessInfo::current();
        let mut baseline = match snapshot_services() {
            Ok(snapshot) => Some(snapshot),
            Err(error) => {
                error!(%error, "initial service table snapshot failed");
                None
            }
        };

        let mut ticker = tokio::time::interval(Self::POLL_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await; // first tick completes immediately

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match snapshot_services() {
                        Ok(current) => {
                            if let Some(previous) = &baseline {
                                for (kind, detail) in diff_snapshots(previous, &current) {
                                    ledger.record(ChangeRecord::new(
                                        ChangeCategory::Service,
                                        kind,
                                        detail,
                                        observer.clone(),
                                    ));
                                }
                            }
                            baseline = Some(current);
                        }
                        Err(error) => {
                            warn!(%error, "service table snapshot failed, skipping cycle");
                        }
                    }
                }
                _ = shutdown.recv() => break,
            }
        }
    }
}

impl Default for ServiceWatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Three-way diff of two service snapshots.
///
/// Deleted entries omit the binary path; it may no longer be resolvable.
#[cfg_attr(not(windows), allow(dead_code))]
fn diff_snapshots(old: &ServiceSnapshot, new: &ServiceSnapshot) -> Vec<(ChangeKind, String)> {
    let mut changes = Vec::new();
    for (name, descriptor) in new {
        match old.get(name) {
            None => changes.push((
                ChangeKind::Created,
                format!("Service: {}, Path: {}", name, descriptor.binary_path),
            )),
            Some(previous) if previous != descriptor => changes.push((
                ChangeKind::Modified,
                format!("Service: {}, Path: {}", name, descriptor.binary_path),
            )),
            Some(_) => {}
        }
    }
    for name in old.keys() {
        if !new.contains_key(name) {
            changes.push((ChangeKind::Deleted, format!("Service: {name}")));
        }
    }
    changes
}

/// Capture the service table from the SCM database in the registry.
#[cfg(windows)]
fn snapshot_services() -> std::io::Result<ServiceSnapshot> {
    use winreg::enums::{HKEY_LOCAL_MACHINE, KEY_READ};

    let services = winreg::RegKey::predef(HKEY_LOCAL_MACHINE)
        .open_subkey_with_flags(r"SYSTEM\CurrentControlSet\Services", KEY_READ)?;
    let mut snapshot = ServiceSnapshot::new();
    for name in services.enum_keys().filter_map(Result::ok) {
        let Ok(key) = services.open_subkey_with_flags(&name, KEY_READ) else {
            continue;
        };
        let descriptor = ServiceDescriptor {
            binary_path: key.get_value("ImagePath").unwrap_or_default(),
            display_name: key.get_value("DisplayName").unwrap_or_default(),
            start_type: key.get_value("Start").unwrap_or_default(),
            service_type: key.get_value("Type").unwrap_or_default(),
        };
        snapshot.insert(name, descriptor);
    }
    Ok(snapshot)
}
