//! Collaborators the list controller reads from: the squawk query layer and
//! the preference store.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};

use anyhow::Result;
use tracing::warn;

use squawker_db::Database;
use squawker_types::{FollowPreferences, FollowSelection, Squawk};

/// Open result set handed out by a [`SquawkSource`].
///
/// Released by [`SquawkCursor::close`] or on drop. `close` consumes the
/// cursor, so a released cursor can't be read.
pub struct SquawkCursor {
    rows: Vec<Squawk>,
    on_release: Option<Box<dyn FnOnce() + Send>>,
}

impl SquawkCursor {
    pub fn new(rows: Vec<Squawk>) -> Self {
        Self {
            rows,
            on_release: None,
        }
    }

    /// Runs `hook` exactly once when the cursor is released.
    pub fn with_release_hook(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_release = Some(Box::new(hook));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Squawk> {
        self.rows.iter()
    }

    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(hook) = self.on_release.take() {
            hook();
        }
    }
}

impl Drop for SquawkCursor {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for SquawkCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SquawkCursor")
            .field("rows", &self.rows.len())
            .field("open", &self.on_release.is_some())
            .finish()
    }
}

/// Query layer for stored squawks. Implementations may block.
pub trait SquawkSource: Send + Sync + 'static {
    /// Rows matching `selection`, sorted by `order_by`. `Ok(None)` means the
    /// underlying store isn't available yet.
    fn query(&self, selection: &FollowSelection, order_by: &str) -> Result<Option<SquawkCursor>>;
}

impl SquawkSource for Database {
    fn query(&self, selection: &FollowSelection, order_by: &str) -> Result<Option<SquawkCursor>> {
        let rows = self.query_squawks(selection, order_by)?;
        Ok(Some(SquawkCursor::new(rows)))
    }
}

impl<S: SquawkSource + ?Sized> SquawkSource for Arc<S> {
    fn query(&self, selection: &FollowSelection, order_by: &str) -> Result<Option<SquawkCursor>> {
        (**self).query(selection, order_by)
    }
}

/// A store that is opened after the list is already on screen.
impl<S: SquawkSource> SquawkSource for OnceLock<S> {
    fn query(&self, selection: &FollowSelection, order_by: &str) -> Result<Option<SquawkCursor>> {
        match self.get() {
            Some(source) => source.query(selection, order_by),
            None => Ok(None),
        }
    }
}

/// Read-only view of the user's settings.
pub trait PreferenceStore: Send + Sync + 'static {
    fn get_bool(&self, key: &str, default: bool) -> bool;
}

impl PreferenceStore for Database {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get_preference(key) {
            Ok(value) => value.unwrap_or(default),
            Err(e) => {
                warn!("Failed to read preference '{}': {}", key, e);
                default
            }
        }
    }
}

impl<P: PreferenceStore + ?Sized> PreferenceStore for Arc<P> {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        (**self).get_bool(key, default)
    }
}

impl<P: PreferenceStore> PreferenceStore for OnceLock<P> {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get().map_or(default, |store| store.get_bool(key, default))
    }
}

/// In-memory preferences, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: RwLock<HashMap<String, bool>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: &str, value: bool) {
        let mut values = match self.values.write() {
            Ok(values) => values,
            Err(poisoned) => poisoned.into_inner(),
        };
        values.insert(key.to_string(), value);
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        let values = match self.values.read() {
            Ok(values) => values,
            Err(poisoned) => poisoned.into_inner(),
        };
        values.get(key).copied().unwrap_or(default)
    }
}

/// Fresh snapshot of the follow flags; unset flags read as not followed.
pub fn load_follow_preferences(store: &dyn PreferenceStore) -> FollowPreferences {
    FollowPreferences::from_lookup(|key| store.get_bool(key, false))
}
