//! The shared append-only change store.

use packtrace_types::{ChangeCategory, ChangeKind, ChangeRecord, ProcessInfo};
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tracing::debug;

/// Thread-safe, append-only store of change records, partitioned by category.
///
/// Each category holds its records in insertion order, which is the
/// observation order of the watcher feeding it. Insertion takes one write
/// lock on the record's own partition; categories never lock each other, so
/// no cross-category ordering is implied.
#[derive(Debug, Default)]
pub struct ChangeLedger {
    files: RwLock<Vec<ChangeRecord>>,
    registry: RwLock<Vec<ChangeRecord>>,
    services: RwLock<Vec<ChangeRecord>>,
    processes: RwLock<Vec<ChangeRecord>>,
}

impl ChangeLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn partition(&self, category: ChangeCategory) -> &RwLock<Vec<ChangeRecord>> {
        match category {
            ChangeCategory::Filesystem => &self.files,
            ChangeCategory::Registry => &self.registry,
            ChangeCategory::Service => &self.services,
            ChangeCategory::Process => &self.processes,
        }
    }

    /// Append a record to its category's sequence.
    ///
    /// Records are immutable once inserted and are never removed during a
    /// session; the ledger only grows.
    pub fn record(&self, record: ChangeRecord) {
        debug!(
            category = %record.category,
            event = %record.event_type(),
            detail = %record.detail,
            "change recorded"
        );
        self.partition(record.category)
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    /// Append a record given a textual category.
    ///
    /// This is the boundary where untyped category names enter the ledger;
    /// an unrecognized name is a contract violation surfaced as
    /// [`LedgerError::InvalidCategory`].
    pub fn record_raw(
        &self,
        category: &str,
        kind: ChangeKind,
        detail: impl Into<String>,
        observer: ProcessInfo,
    ) -> Result<(), LedgerError> {
        let category = ChangeCategory::from_str(category)
            .map_err(|_| LedgerError::InvalidCategory(category.to_string()))?;
        self.record(ChangeRecord::new(category, kind, detail, observer));
        Ok(())
    }

    /// Number of records in one category.
    pub fn count(&self, category: ChangeCategory) -> usize {
        self.partition(category)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of records across all categories.
    pub fn total(&self) -> usize {
        ChangeCategory::all().map(|c| self.count(c)).sum()
    }

    /// A consistent point-in-time copy of every category's sequence.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let copy = |lock: &RwLock<Vec<ChangeRecord>>| {
            lock.read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        };
        LedgerSnapshot {
            files: copy(&self.files),
            registry: copy(&self.registry),
            services: copy(&self.services),
            processes: copy(&self.processes),
        }
    }
}

/// An owned point-in-time view of the ledger, used for export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerSnapshot {
    /// Filesystem changes in observation order.
    pub files: Vec<ChangeRecord>,
    /// Registry changes in observation order.
    pub registry: Vec<ChangeRecord>,
    /// Service table changes in observation order.
    pub services: Vec<ChangeRecord>,
    /// Process changes in observation order.
    pub processes: Vec<ChangeRecord>,
}

impl LedgerSnapshot {
    /// Records of one category, in insertion order.
    pub fn records(&self, category: ChangeCategory) -> &[ChangeRecord] {
        match category {
            ChangeCategory::Filesystem => &self.files,
            ChangeCategory::Registry => &self.registry,
            ChangeCategory::Service => &self.services,
            ChangeCategory::Process => &self.processes,
        }
    }

    /// Total number of records across all categories.
    pub fn total(&self) -> usize {
        self.files.len() + self.registry.len() + self.services.len() + self.processes.len()
    }
}

/// Ledger contract violations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The textual category does not name a known partition.
    #[error("unrecognized change category: {0}")]
    InvalidCategory(String),
}
