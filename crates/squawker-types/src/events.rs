use serde::{Deserialize, Serialize};

/// Signals that stored data changed. Carries no data: receivers re-read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChangeEvent {
    /// Squawks were inserted or removed.
    SquawksChanged,

    /// A follow preference was written.
    FollowingChanged,
}
