use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use squawker_types::KnownAuthor;

#[derive(Debug, Parser)]
#[command(name = "squawker", version, about = "Read the squawks of the people you follow")]
pub struct Cli {
    /// SQLite file holding squawks and follow settings
    #[arg(long, env = "SQUAWKER_DB_PATH", default_value = "squawker.db", global = true)]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the followed squawks once, newest first
    List,

    /// Keep the list on screen and redraw it whenever the store changes
    Watch {
        /// How often to check for squawks written by other processes
        #[arg(long, env = "SQUAWKER_POLL_MS", default_value_t = 500)]
        poll_ms: u64,
    },

    /// Store one squawk, as the push service would
    Post {
        /// Author key, e.g. key_lyla or key_test
        #[arg(long)]
        author_key: String,

        /// Display name; defaults to the known name for the key
        #[arg(long)]
        author: Option<String>,

        /// Seconds since the epoch; defaults to now
        #[arg(long)]
        date: Option<i64>,

        message: String,
    },

    /// Store push payloads read from stdin, one JSON object per line
    Ingest,

    /// Follow (or with --off, unfollow) an author
    Follow {
        /// asser, cezanne, jlin, lyla or nikita
        author: KnownAuthor,

        #[arg(long)]
        off: bool,
    },

    /// Show the followable authors and which ones you follow
    Authors,
}

impl Command {
    pub fn poll_interval(poll_ms: u64) -> Duration {
        Duration::from_millis(poll_ms.max(10))
    }
}
