//! The observation coordinator.

use crate::{SessionConfig, StopSignal};
use packtrace_export::{ExportError, ReportExporter};
use packtrace_ledger::{ChangeLedger, LedgerSnapshot};
use packtrace_watchers::{FsWatcher, RegistryWatcher, ServiceWatcher};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Owns the ledger and the lifecycle of all watchers for one session.
///
/// Failure to start any single watcher logs and continues with the rest;
/// partial observation is preferred over total failure. Only export failure
/// surfaces as a session-level error.
pub struct ObservationCoordinator {
    config: SessionConfig,
    ledger: Arc<ChangeLedger>,
    stop: StopSignal,
}

impl ObservationCoordinator {
    /// Create a coordinator for the given configuration.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            ledger: Arc::new(ChangeLedger::new()),
            stop: StopSignal::new(),
        }
    }

    /// Handle for requesting an early stop (e.g. from an interrupt handler).
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Shared handle to the session ledger.
    pub fn ledger(&self) -> Arc<ChangeLedger> {
        Arc::clone(&self.ledger)
    }

    /// Run the full session: start watchers, observe, stop, export.
    ///
    /// Blocks until the observation window elapses or the stop signal fires,
    /// whichever comes first; then stops every watcher, waits for each to
    /// acknowledge, and exports the ledger exactly once.
    pub async fn run(self) -> Result<LedgerSnapshot, SessionError> {
        let fs_watcher =
            match FsWatcher::start(&self.config.roots, self.ledger(), self.stop.subscribe()) {
                Ok(watcher) => {
                    info!(roots = watcher.watched_roots(), "filesystem watcher started");
                    Some(watcher)
                }
                Err(err) => {
                    error!(error = %err, "filesystem watcher failed to start, continuing without it");
                    None
                }
            };

        let registry = RegistryWatcher::new(self.config.registry_targets.clone())
            .spawn(self.ledger(), self.stop.subscribe());
        let services = ServiceWatcher::new().spawn(self.ledger(), self.stop.subscribe());

        let mut external_stop = self.stop.subscribe();
        tokio::select! {
            _ = tokio::time::sleep(self.config.window()) => {
                info!(secs = self.config.duration_secs, "observation window elapsed");
            }
            _ = external_stop.recv() => {
                info!("stop requested");
            }
        }

        // Stop everything and wait for acknowledgement before exporting.
        self.stop.trigger();
        if let Some(watcher) = fs_watcher {
            watcher.stop().await;
        }
        if let Err(err) = registry.await {
            error!(error = %err, "registry watcher task failed");
        }
        if let Err(err) = services.await {
            error!(error = %err, "service watcher task failed");
        }

        let snapshot = self.ledger.snapshot();
        ReportExporter::export(&snapshot, &self.config.report_path)?;
        Ok(snapshot)
    }
}

/// Session-level failures.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The final report could not be written.
    #[error("report export failed: {0}")]
    Export(#[from] ExportError),
}
