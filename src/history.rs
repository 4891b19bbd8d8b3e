// Durable per-user log of quotes shown
use rusqlite::params;

use crate::db::models::HistoryEntry;
use crate::db::StoreError;
use crate::state::DbPool;

/// Most entries `list` will return.
pub const HISTORY_LIMIT: usize = 50;

/// Append `text` to the user's history. Every call stores a new quote row,
/// even when the same text was recorded before.
pub fn record(pool: &DbPool, user_id: &str, text: &str) -> Result<(), StoreError> {
    let conn = pool.get()?;
    let id = uuid::Uuid::now_v7().to_string();
    conn.execute(
        "INSERT INTO quotes (id, user_id, text) VALUES (?1, ?2, ?3)",
        params![id, user_id, text],
    )?;
    tracing::debug!(%user_id, quote_id = %id, "Recorded quote in history");
    Ok(())
}

/// The user's most recent entries, newest first.
pub fn list(pool: &DbPool, user_id: &str) -> Result<Vec<HistoryEntry>, StoreError> {
    let conn = pool.get()?;
    // rowid breaks ties between rows written within the same millisecond
    let mut stmt = conn.prepare(
        "SELECT text, created_at FROM quotes
         WHERE user_id = ?1
         ORDER BY created_at DESC, rowid DESC
         LIMIT ?2",
    )?;
    let entries = stmt
        .query_map(params![user_id, HISTORY_LIMIT as i64], |row| {
            Ok(HistoryEntry {
                text: row.get(0)?,
                timestamp: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}
