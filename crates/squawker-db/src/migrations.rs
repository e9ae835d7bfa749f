use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (messages + preferences)");
        conn.execute_batch(
            "
            CREATE TABLE messages (
                _id         INTEGER PRIMARY KEY ON CONFLICT REPLACE AUTOINCREMENT,
                author      TEXT NOT NULL,
                authorKey   TEXT NOT NULL,
                message     TEXT NOT NULL,
                date        INTEGER NOT NULL
            );

            CREATE INDEX idx_messages_author_date
                ON messages(authorKey, date);

            CREATE TABLE preferences (
                key         TEXT PRIMARY KEY,
                value       INTEGER NOT NULL
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    Ok(())
}
