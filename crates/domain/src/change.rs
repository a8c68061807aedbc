//! Change classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of content change observed at one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    /// Path is tracked now but was not before.
    Added,
    /// Path was tracked before but is not now.
    Removed,
    /// Path is tracked in both and its content identity differs.
    Modified,
}

impl ChangeKind {
    /// Stable lowercase tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
