//! Change record categories.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The system resource class a change record belongs to.
///
/// Each category is an independent, independently ordered stream in the
/// ledger and maps to one of the four top-level sequences of the exported
/// report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumIter, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChangeCategory {
    /// File and directory changes under the watched roots.
    Filesystem,
    /// Registry key modifications under the watched subtrees.
    Registry,
    /// Service table additions, modifications and removals.
    Service,
    /// Process lifecycle events.
    Process,
}

impl ChangeCategory {
    /// Get all categories.
    pub fn all() -> impl Iterator<Item = Self> {
        use strum::IntoEnumIterator;
        Self::iter()
    }

    /// Human-readable noun used in `event_type` labels ("File Created").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Filesystem => "File",
            Self::Registry => "Registry",
            Self::Service => "Service",
            Self::Process => "Process",
        }
    }

    /// Key of this category's sequence in the exported report.
    pub fn report_key(&self) -> &'static str {
        match self {
            Self::Filesystem => "files",
            Self::Registry => "registry",
            Self::Service => "services",
            Self::Process => "processes",
        }
    }
}
