//! Change watchers for Packtrace.
//!
//! Each watcher is an independent task that detects changes in one category
//! of system resource and appends normalized records to the shared
//! [`packtrace_ledger::ChangeLedger`]:
//!
//! - [`FsWatcher`]: event-driven, backed by OS file change notifications.
//! - [`RegistryWatcher`]: 1 s timestamp-diff polling of registry subtrees.
//! - [`ServiceWatcher`]: 5 s snapshot-diff polling of the service table.
//!
//! The polling watchers are constructed no-ops on platforms without the
//! corresponding OS facility, so coordinator logic stays uniform.

mod fs;
mod registry;
mod service;

pub use fs::FsWatcher;
pub use registry::RegistryWatcher;
pub use service::{ServiceDescriptor, ServiceSnapshot, ServiceWatcher};

use thiserror::Error;

/// Watcher startup errors.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The OS notification facility could not be initialized at all.
    #[error("filesystem watcher initialization failed: {0}")]
    Init(#[from] notify::Error),
}
