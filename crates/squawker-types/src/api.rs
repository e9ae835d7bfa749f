use serde::{Deserialize, Serialize};

use crate::models::Squawk;

/// Data payload of a push message announcing a new squawk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquawkPayload {
    pub author: String,
    #[serde(rename = "authorKey")]
    pub author_key: String,
    pub message: String,
    /// Seconds since the epoch. Missing means "now".
    #[serde(default)]
    pub date: Option<i64>,
}

impl SquawkPayload {
    pub fn from_json(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }

    pub fn into_squawk(self, now_secs: i64) -> Squawk {
        Squawk {
            author: self.author,
            author_key: self.author_key,
            message: self.message,
            date: self.date.unwrap_or(now_secs),
        }
    }
}
