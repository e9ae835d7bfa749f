use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Author key of the permanent test account. Its squawks are always shown.
pub const TEST_ACCOUNT_KEY: &str = "key_test";

/// Avatar used for the test account and any author we don't recognise.
pub const DEFAULT_AVATAR: &str = "test";

/// The authors a user can follow. Declaration order is the enumeration
/// order used when building the follow filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnownAuthor {
    Asser,
    Cezanne,
    Jlin,
    Lyla,
    Nikita,
}

impl KnownAuthor {
    pub const ALL: [KnownAuthor; 5] = [
        KnownAuthor::Asser,
        KnownAuthor::Cezanne,
        KnownAuthor::Jlin,
        KnownAuthor::Lyla,
        KnownAuthor::Nikita,
    ];

    /// Key as stored in the `authorKey` column and used as the preference key.
    pub fn key(self) -> &'static str {
        match self {
            Self::Asser => "key_asser",
            Self::Cezanne => "key_cezanne",
            Self::Jlin => "key_jlin",
            Self::Lyla => "key_lyla",
            Self::Nikita => "key_nikita",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Asser => "Asser Samak",
            Self::Cezanne => "Cezanne Camacho",
            Self::Jlin => "Jessica Lin",
            Self::Lyla => "Lyla Fujiwara",
            Self::Nikita => "Nikita Zhuravlev",
        }
    }

    pub fn avatar(self) -> &'static str {
        match self {
            Self::Asser => "asser",
            Self::Cezanne => "cezanne",
            Self::Jlin => "jlin",
            Self::Lyla => "lyla",
            Self::Nikita => "nikita",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|author| author.key() == key)
    }

    /// Avatar asset for an `authorKey` column value, falling back to
    /// [`DEFAULT_AVATAR`].
    pub fn avatar_for_key(key: &str) -> &'static str {
        Self::from_key(key).map_or(DEFAULT_AVATAR, Self::avatar)
    }
}

impl fmt::Display for KnownAuthor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown author '{0}' (expected one of: asser, cezanne, jlin, lyla, nikita)")]
pub struct ParseAuthorError(pub String);

/// Accepts either the short name (`lyla`) or the full key (`key_lyla`).
impl FromStr for KnownAuthor {
    type Err = ParseAuthorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|author| author.key() == needle || author.avatar() == needle)
            .ok_or_else(|| ParseAuthorError(s.to_string()))
    }
}
