use crate::models::{PreferenceRow, SquawkRow};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};
use squawker_types::contract::{
    COL_NUM_AUTHOR, COL_NUM_AUTHOR_KEY, COL_NUM_DATE, COL_NUM_MESSAGE, MESSAGES_PROJECTION,
    TABLE_MESSAGES,
};
use squawker_types::{FollowSelection, Squawk};

impl Database {
    // -- Squawks --

    pub fn insert_squawk(&self, squawk: &Squawk) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (author, authorKey, message, date) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![squawk.author, squawk.author_key, squawk.message, squawk.date],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Inserts all squawks in one transaction.
    pub fn insert_squawks(&self, squawks: &[Squawk]) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO messages (author, authorKey, message, date) VALUES (?1, ?2, ?3, ?4)",
                )?;
                for squawk in squawks {
                    stmt.execute(rusqlite::params![
                        squawk.author,
                        squawk.author_key,
                        squawk.message,
                        squawk.date
                    ])?;
                }
            }
            tx.commit()?;
            Ok(squawks.len())
        })
    }

    /// Squawks matching `selection`, ordered by `order_by`.
    ///
    /// `order_by` is spliced into the SQL as-is; pass one of the
    /// `squawker_types::contract` constants.
    pub fn query_squawks(
        &self,
        selection: &FollowSelection,
        order_by: &str,
    ) -> Result<Vec<Squawk>> {
        self.with_conn(|conn| query_squawks(conn, selection, order_by))
    }

    pub fn count_squawks(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM messages", [], |r| r.get(0))?;
            Ok(count as usize)
        })
    }

    /// Row count and highest id of the messages table. Any insert or delete
    /// moves at least one of the two.
    pub fn squawk_watermark(&self) -> Result<(i64, i64)> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*), COALESCE(MAX(_id), 0) FROM messages", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })?)
        })
    }

    // -- Preferences --

    pub fn get_preference(&self, key: &str) -> Result<Option<bool>> {
        self.with_conn(|conn| {
            let value = conn
                .query_row("SELECT value FROM preferences WHERE key = ?1", [key], |row| {
                    row.get::<_, bool>(0)
                })
                .optional()?;
            Ok(value)
        })
    }

    pub fn set_preference(&self, key: &str, value: bool) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO preferences (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                rusqlite::params![key, value],
            )?;
            Ok(())
        })
    }

    pub fn list_preferences(&self) -> Result<Vec<PreferenceRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT key, value FROM preferences ORDER BY key")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(PreferenceRow {
                        key: row.get(0)?,
                        value: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Change detection --

    /// SQLite's `data_version`: changes whenever another connection commits
    /// to the database file. Writes made through this connection leave it
    /// unchanged.
    pub fn data_version(&self) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.pragma_query_value(None, "data_version", |row| row.get(0))?)
        })
    }
}

fn query_squawks(
    conn: &Connection,
    selection: &FollowSelection,
    order_by: &str,
) -> Result<Vec<Squawk>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE {} ORDER BY {}",
        MESSAGES_PROJECTION.join(", "),
        TABLE_MESSAGES,
        selection.to_sql(),
        order_by
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(SquawkRow {
                author: row.get(COL_NUM_AUTHOR)?,
                message: row.get(COL_NUM_MESSAGE)?,
                date: row.get(COL_NUM_DATE)?,
                author_key: row.get(COL_NUM_AUTHOR_KEY)?,
            })
        })?
        .map(|row| row.map(Squawk::from))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}
