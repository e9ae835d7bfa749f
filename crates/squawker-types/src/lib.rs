//! Squawker shared types
//!
//! The message model, the schema contract of the local store, the fixed set
//! of followable authors and the change events that drive list refreshes.
//! Nothing in here touches I/O.

pub mod api;
pub mod authors;
pub mod contract;
pub mod events;
pub mod models;

pub use authors::{KnownAuthor, ParseAuthorError};
pub use contract::{FollowPreferences, FollowSelection};
pub use events::ChangeEvent;
pub use models::{RowViewModel, Squawk};
