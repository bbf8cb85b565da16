//! Category-specific change sub-types.

use serde::{Deserialize, Serialize};
use strum::Display;

/// What happened to the changed entity.
///
/// Filesystem and service changes use all three variants; registry changes
/// only ever observe `Modified` (timestamp-diff polling cannot distinguish
/// creation from mutation of values below a watched subtree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_capitalized() {
        assert_eq!(ChangeKind::Created.to_string(), "Created");
        assert_eq!(ChangeKind::Deleted.to_string(), "Deleted");
    }
}
