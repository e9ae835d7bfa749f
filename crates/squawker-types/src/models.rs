use serde::{Deserialize, Serialize};

/// A stored squawk. `date` is seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Squawk {
    pub author: String,
    #[serde(rename = "authorKey")]
    pub author_key: String,
    pub message: String,
    pub date: i64,
}

impl Squawk {
    pub fn date_millis(&self) -> i64 {
        self.date.saturating_mul(1000)
    }
}

/// One rendered list row. Built fresh on every refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowViewModel {
    pub author: String,
    pub message: String,
    pub date_label: String,
    pub avatar: String,
}
