//! Squawk list client: turns stored squawks into a live, follow-filtered
//! list and keeps it current as the store changes.

pub mod controller;
pub mod error;
pub mod notifier;
pub mod poller;
pub mod source;
pub mod time_format;
pub mod view;

pub use controller::{ControllerHandle, MessageListController, RefreshState};
pub use error::ClientError;
pub use notifier::{ChangeNotifier, Subscription};
pub use source::{MemoryPreferences, PreferenceStore, SquawkCursor, SquawkSource};
pub use time_format::{Clock, RelativeTimeFormatter, SystemClock};
pub use view::SquawkView;
