//! Schema of the local squawk store and the follow filter built against it.

use std::collections::HashMap;
use std::fmt;

use crate::authors::{KnownAuthor, TEST_ACCOUNT_KEY};

pub const TABLE_MESSAGES: &str = "messages";

pub const COLUMN_AUTHOR: &str = "author";
pub const COLUMN_AUTHOR_KEY: &str = "authorKey";
pub const COLUMN_MESSAGE: &str = "message";
/// Seconds since the Unix epoch.
pub const COLUMN_DATE: &str = "date";

/// Columns read for the list, in this order.
pub const MESSAGES_PROJECTION: [&str; 4] =
    [COLUMN_AUTHOR, COLUMN_MESSAGE, COLUMN_DATE, COLUMN_AUTHOR_KEY];

pub const COL_NUM_AUTHOR: usize = 0;
pub const COL_NUM_MESSAGE: usize = 1;
pub const COL_NUM_DATE: usize = 2;
pub const COL_NUM_AUTHOR_KEY: usize = 3;

/// Newest first.
pub const ORDER_BY_DATE_DESC: &str = "date DESC";

/// Snapshot of which authors the user follows. Authors missing from the
/// map are not followed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowPreferences {
    flags: HashMap<KnownAuthor, bool>,
}

impl FollowPreferences {
    /// Reads every known author's flag through `lookup`, keyed by
    /// [`KnownAuthor::key`].
    pub fn from_lookup(mut lookup: impl FnMut(&str) -> bool) -> Self {
        let flags = KnownAuthor::ALL
            .into_iter()
            .map(|author| (author, lookup(author.key())))
            .collect();
        Self { flags }
    }

    pub fn set(&mut self, author: KnownAuthor, following: bool) -> &mut Self {
        self.flags.insert(author, following);
        self
    }

    pub fn with(mut self, author: KnownAuthor, following: bool) -> Self {
        self.set(author, following);
        self
    }

    pub fn is_following(&self, author: KnownAuthor) -> bool {
        self.flags.get(&author).copied().unwrap_or(false)
    }

    /// Builds the selection for "the test account plus every followed
    /// author". Members follow [`KnownAuthor::ALL`] order regardless of
    /// how the flags were inserted.
    pub fn selection(&self) -> FollowSelection {
        let mut keys = vec![TEST_ACCOUNT_KEY];
        keys.extend(
            KnownAuthor::ALL
                .into_iter()
                .filter(|author| self.is_following(*author))
                .map(KnownAuthor::key),
        );
        FollowSelection { keys }
    }
}

/// `authorKey IN (...)` predicate for the squawk query. Never empty: the
/// test account key is always the first member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FollowSelection {
    keys: Vec<&'static str>,
}

impl FollowSelection {
    pub fn keys(&self) -> &[&'static str] {
        &self.keys
    }

    pub fn contains(&self, author_key: &str) -> bool {
        self.keys.iter().any(|key| *key == author_key)
    }

    /// SQL text usable as a WHERE clause. Members are static author keys,
    /// so quoting them inline is safe.
    pub fn to_sql(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FollowSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{COLUMN_AUTHOR_KEY} IN (")?;
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "'{key}'")?;
        }
        f.write_str(")")
    }
}
