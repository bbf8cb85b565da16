//! Report document types and the exporter.

use packtrace_ledger::LedgerSnapshot;
use packtrace_types::{ChangeRecord, ProcessInfo};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// One entry of the exported report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Observation time, RFC 3339.
    pub timestamp: String,
    /// Combined category/kind label, e.g. "File Created".
    pub event_type: String,
    /// Description of the changed entity.
    pub details: String,
    /// Observer identity or an error object.
    pub process_info: ProcessInfo,
}

impl From<&ChangeRecord> for ReportEntry {
    fn from(record: &ChangeRecord) -> Self {
        Self {
            timestamp: record.timestamp.to_rfc3339(),
            event_type: record.event_type(),
            details: record.detail.clone(),
            process_info: record.observer.clone(),
        }
    }
}

/// The full report document: four named per-category sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeReport {
    pub files: Vec<ReportEntry>,
    pub registry: Vec<ReportEntry>,
    pub services: Vec<ReportEntry>,
    pub processes: Vec<ReportEntry>,
}

impl ChangeReport {
    /// Build the document from a ledger snapshot, preserving order.
    pub fn from_snapshot(snapshot: &LedgerSnapshot) -> Self {
        let entries = |records: &[ChangeRecord]| records.iter().map(ReportEntry::from).collect();
        Self {
            files: entries(&snapshot.files),
            registry: entries(&snapshot.registry),
            services: entries(&snapshot.services),
            processes: entries(&snapshot.processes),
        }
    }
}

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The destination could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The report could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Serializes ledger snapshots to durable JSON reports.
pub struct ReportExporter;

impl ReportExporter {
    /// Write the snapshot as pretty JSON to `destination`, overwriting any
    /// existing file. Failures are surfaced to the caller, never retried.
    pub fn export(snapshot: &LedgerSnapshot, destination: &Path) -> Result<(), ExportError> {
        let bytes = Self::render(snapshot)?;
        std::fs::write(destination, bytes)?;
        info!(
            path = %destination.display(),
            records = snapshot.total(),
            "change report exported"
        );
        Ok(())
    }

    /// Render the snapshot to its serialized form (4-space indent, stable
    /// for a given snapshot).
    pub fn render(snapshot: &LedgerSnapshot) -> Result<Vec<u8>, ExportError> {
        let report = ChangeReport::from_snapshot(snapshot);
        let mut bytes = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
        report.serialize(&mut serializer)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packtrace_ledger::ChangeLedger;
    use packtrace_types::{ChangeCategory, ChangeKind};
    use tempfile::TempDir;

    fn populated_snapshot() -> LedgerSnapshot {
        let ledger = ChangeLedger::new();
        ledger.record(ChangeRecord::new(
            ChangeCategory::Filesystem,
            ChangeKind::Created,
            "/opt/app/x.txt",
            ProcessInfo::Known {
                pid: 7,
                name: "packtrace".to_string(),
                exe: "/usr/bin/packtrace".to_string(),
            },
        ));
        ledger.record(ChangeRecord::new(
            ChangeCategory::Registry,
            ChangeKind::Modified,
            "SOFTWARE modified",
            ProcessInfo::Unavailable {
                error: "denied".to_string(),
            },
        ));
        ledger.snapshot()
    }

    #[test]
    fn report_has_four_named_sequences_with_expected_fields() {
        let bytes = ReportExporter::render(&populated_snapshot()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        for key in ["files", "registry", "services", "processes"] {
            assert!(value[key].is_array(), "missing sequence {key}");
        }
        let file = &value["files"][0];
        assert_eq!(file["event_type"], "File Created");
        assert_eq!(file["details"], "/opt/app/x.txt");
        assert_eq!(file["process_info"]["pid"], 7);
        assert!(file["timestamp"].is_string());

        let registry = &value["registry"][0];
        assert_eq!(registry["event_type"], "Registry Modified");
        assert_eq!(registry["process_info"]["error"], "denied");
    }

    #[test]
    fn same_snapshot_exports_identical_bytes() {
        let temp = TempDir::new().unwrap();
        let snapshot = populated_snapshot();
        let first = temp.path().join("first.json");
        let second = temp.path().join("second.json");

        ReportExporter::export(&snapshot, &first).unwrap();
        ReportExporter::export(&snapshot, &second).unwrap();

        assert_eq!(
            std::fs::read(&first).unwrap(),
            std::fs::read(&second).unwrap()
        );
    }

    #[test]
    fn export_overwrites_existing_file() {
        let temp = TempDir::new().unwrap();
        let destination = temp.path().join("report.json");
        std::fs::write(&destination, b"stale contents").unwrap();

        ReportExporter::export(&populated_snapshot(), &destination).unwrap();

        let value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&destination).unwrap()).unwrap();
        assert_eq!(value["files"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn unwritable_destination_is_an_io_error() {
        let temp = TempDir::new().unwrap();
        let destination = temp.path().join("missing-dir").join("report.json");
        let err = ReportExporter::export(&populated_snapshot(), &destination).unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
    }

    #[test]
    fn empty_snapshot_exports_empty_sequences() {
        let bytes = ReportExporter::render(&LedgerSnapshot::default()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["files"], serde_json::json!([]));
        assert_eq!(value["processes"], serde_json::json!([]));
    }
}
