//! Database row types. These map directly to SQLite rows and stay
//! separate from the squawker-types models so the schema can move on its own.

use squawker_types::Squawk;

pub struct SquawkRow {
    pub author: String,
    pub message: String,
    pub date: i64,
    pub author_key: String,
}

impl From<SquawkRow> for Squawk {
    fn from(row: SquawkRow) -> Self {
        Squawk {
            author: row.author,
            author_key: row.author_key,
            message: row.message,
            date: row.date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceRow {
    pub key: String,
    pub value: bool,
}
