use std::path::Path;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use squawker_client::poller::ChangePoller;
use squawker_client::source::load_follow_preferences;
use squawker_client::{ChangeNotifier, MessageListController};
use squawker_db::Database;
use squawker_types::api::SquawkPayload;
use squawker_types::authors::TEST_ACCOUNT_KEY;
use squawker_types::{ChangeEvent, KnownAuthor, Squawk};

use crate::terminal::TerminalView;

pub async fn list(db_path: &Path) -> Result<()> {
    let db = Arc::new(open(db_path).await?);
    let mut list = MessageListController::new(db.clone(), db, TerminalView::once());
    list.refresh().await;
    Ok(())
}

pub async fn watch(db_path: &Path, poll_interval: Duration) -> Result<()> {
    let notifier = ChangeNotifier::new();

    // The list goes up before the store is open and starts out empty
    let store: Arc<OnceLock<Arc<Database>>> = Arc::new(OnceLock::new());
    let handle = MessageListController::new(store.clone(), store.clone(), TerminalView::live())
        .attach(&notifier);

    let db = Arc::new(open(db_path).await?);
    // Baseline first: anything committed after it is announced by the poller
    let poller = ChangePoller::start(db.clone()).await?;
    let _ = store.set(db);
    notifier.notify(ChangeEvent::SquawksChanged);

    let poller = tokio::spawn(poller.run(notifier.clone(), poll_interval));

    crate::shutdown_signal().await;

    poller.abort();
    let list = handle.detach().await?;
    info!("Stopped watching after {} refreshes", list.refresh_count());
    Ok(())
}

pub async fn post(
    db_path: &Path,
    author_key: String,
    author: Option<String>,
    date: Option<i64>,
    message: String,
) -> Result<()> {
    let db = open(db_path).await?;
    let squawk = Squawk {
        author: author.unwrap_or_else(|| default_author_name(&author_key)),
        author_key,
        message,
        date: date.unwrap_or_else(now_secs),
    };

    let id = db.insert_squawk(&squawk)?;
    info!("Stored squawk {} from {}", id, squawk.author_key);
    Ok(())
}

pub async fn ingest(db_path: &Path) -> Result<()> {
    let db = open(db_path).await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut batch = Vec::new();
    let mut line_no = 0usize;
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        match parse_payload(&line, now_secs()) {
            Ok(squawk) => batch.push(squawk),
            Err(e) => warn!("Skipping line {}: {}", line_no, e),
        }
    }

    let stored = db.insert_squawks(&batch)?;
    info!("Ingested {} squawks", stored);
    Ok(())
}

pub async fn follow(db_path: &Path, author: KnownAuthor, following: bool) -> Result<()> {
    let db = open(db_path).await?;
    db.set_preference(author.key(), following)?;

    if following {
        println!("Following {}", author.display_name());
    } else {
        println!("No longer following {}", author.display_name());
    }
    Ok(())
}

pub async fn authors(db_path: &Path) -> Result<()> {
    let db = open(db_path).await?;
    let prefs = load_follow_preferences(&db);

    for author in KnownAuthor::ALL {
        let mark = if prefs.is_following(author) { 'x' } else { ' ' };
        println!("[{}] {:<8} {}", mark, author.avatar(), author.display_name());
    }
    Ok(())
}

async fn open(db_path: &Path) -> Result<Database> {
    let path = db_path.to_path_buf();
    tokio::task::spawn_blocking(move || Database::open(&path))
        .await?
        .with_context(|| format!("opening {}", db_path.display()))
}

fn parse_payload(line: &str, now_secs: i64) -> Result<Squawk> {
    let payload = SquawkPayload::from_json(line)?;
    Ok(payload.into_squawk(now_secs))
}

fn default_author_name(author_key: &str) -> String {
    match KnownAuthor::from_key(author_key) {
        Some(author) => author.display_name().to_string(),
        None if author_key == TEST_ACCOUNT_KEY => "TestAccount".to_string(),
        None => author_key.to_string(),
    }
}

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use squawker_types::contract::ORDER_BY_DATE_DESC;

    #[test]
    fn default_names() {
        assert_eq!(default_author_name("key_cezanne"), "Cezanne Camacho");
        assert_eq!(default_author_name("key_test"), "TestAccount");
        assert_eq!(default_author_name("key_other"), "key_other");
    }

    #[test]
    fn bad_payload_lines_are_errors() {
        assert!(parse_payload("not json", 0).is_err());
        let line = r#"{"author":"A","authorKey":"key_test","message":"m"}"#;
        let squawk = parse_payload(line, 7).unwrap();
        assert_eq!(squawk.date, 7);
    }

    #[tokio::test]
    async fn post_then_follow_shows_up_in_the_filtered_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("squawker.db");

        post(&path, "key_jlin".into(), None, Some(100), "hidden until followed".into())
            .await
            .unwrap();
        post(&path, "key_test".into(), None, Some(50), "always visible".into())
            .await
            .unwrap();

        let db = Database::open(&path).unwrap();
        let rows = db
            .query_squawks(&load_follow_preferences(&db).selection(), ORDER_BY_DATE_DESC)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].author, "TestAccount");

        follow(&path, KnownAuthor::Jlin, true).await.unwrap();
        let prefs = load_follow_preferences(&db);
        assert!(prefs.is_following(KnownAuthor::Jlin));
        assert!(!prefs.is_following(KnownAuthor::Lyla));

        let rows = db.query_squawks(&prefs.selection(), ORDER_BY_DATE_DESC).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].author, "Jessica Lin");
    }
}
