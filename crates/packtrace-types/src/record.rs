//! Core change record type.

use crate::{ChangeCategory, ChangeKind, ProcessInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single observed system-state change.
///
/// Records are immutable once created and are never removed from the ledger
/// during a session. The timestamp is the observation time; for the polling
/// watchers it is accurate only to poll granularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// When the change was observed.
    pub timestamp: DateTime<Utc>,
    /// Which resource class changed.
    pub category: ChangeCategory,
    /// What happened to it.
    pub kind: ChangeKind,
    /// Human-readable description of the changed entity.
    pub detail: String,
    /// Identity of the observing process (not the causing process).
    pub observer: ProcessInfo,
}

impl ChangeRecord {
    /// Create a record timestamped now.
    pub fn new(
        category: ChangeCategory,
        kind: ChangeKind,
        detail: impl Into<String>,
        observer: ProcessInfo,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            category,
            kind,
            detail: detail.into(),
            observer,
        }
    }

    /// Create a record attributed to the current process.
    pub fn observed(category: ChangeCategory, kind: ChangeKind, detail: impl Into<String>) -> Self {
        Self::new(category, kind, detail, ProcessInfo::current())
    }

    /// Report label combining category and kind, e.g. "File Created".
    pub fn event_type(&self) -> String {
        format!("{} {}", self.category.label(), self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_combines_label_and_kind() {
        let record = ChangeRecord::observed(
            ChangeCategory::Filesystem,
            ChangeKind::Created,
            "/tmp/x.txt",
        );
        assert_eq!(record.event_type(), "File Created");

        let record =
            ChangeRecord::observed(ChangeCategory::Registry, ChangeKind::Modified, "SOFTWARE");
        assert_eq!(record.event_type(), "Registry Modified");
    }

    #[test]
    fn records_carry_observation_time() {
        let before = Utc::now();
        let record = ChangeRecord::observed(ChangeCategory::Service, ChangeKind::Deleted, "svc");
        assert!(record.timestamp >= before);
        assert!(record.timestamp <= Utc::now());
    }
}
