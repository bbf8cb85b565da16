//! Change report export for Packtrace.

mod export;

pub use export::{ChangeReport, ExportError, ReportEntry, ReportExporter};
