use rusqlite::{params, OptionalExtension, Transaction, TransactionBehavior};

use crate::db::models::{Quote, Vote, VoteKind, VoteTally};
use crate::db::StoreError;
use crate::state::DbPool;

/// Find the quote with exactly this text, creating one owned by `user_id`
/// when none exists. The oldest matching row wins.
fn resolve_quote(tx: &Transaction<'_>, user_id: &str, text: &str) -> rusqlite::Result<Quote> {
    let existing = tx
        .query_row(
            "SELECT id, user_id, text, created_at FROM quotes
             WHERE text = ?1
             ORDER BY rowid ASC
             LIMIT 1",
            params![text],
            |row| {
                Ok(Quote {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    text: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        )
        .optional()?;

    if let Some(quote) = existing {
        return Ok(quote);
    }

    let id = uuid::Uuid::now_v7().to_string();
    let created_at: String = tx.query_row(
        "INSERT INTO quotes (id, user_id, text) VALUES (?1, ?2, ?3) RETURNING created_at",
        params![id, user_id, text],
        |row| row.get(0),
    )?;
    tracing::debug!(quote_id = %id, "Created quote for vote");

    Ok(Quote {
        id,
        user_id: user_id.to_string(),
        text: text.to_string(),
        created_at,
    })
}

/// Record a like or dislike. Votes are not de-duplicated: the same user may
/// vote on the same quote any number of times.
pub fn vote(pool: &DbPool, user_id: &str, text: &str, kind: VoteKind) -> Result<Vote, StoreError> {
    let mut conn = pool.get()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let quote = resolve_quote(&tx, user_id, text)?;

    let id = uuid::Uuid::now_v7().to_string();
    let created_at: String = tx.query_row(
        "INSERT INTO votes (id, user_id, quote_id, kind) VALUES (?1, ?2, ?3, ?4) RETURNING created_at",
        params![id, user_id, quote.id, kind.as_str()],
        |row| row.get(0),
    )?;
    tx.commit()?;

    tracing::info!(%user_id, quote_id = %quote.id, %kind, "Recorded vote");
    Ok(Vote {
        id,
        user_id: user_id.to_string(),
        quote_id: quote.id,
        kind,
        created_at,
    })
}

/// Like/dislike counts across every quote row with exactly this text.
pub fn tally(pool: &DbPool, text: &str) -> Result<VoteTally, StoreError> {
    let conn = pool.get()?;
    let tally = conn.query_row(
        "SELECT
            COALESCE(SUM(v.kind = 'like'), 0),
            COALESCE(SUM(v.kind = 'dislike'), 0)
         FROM votes v
         JOIN quotes q ON q.id = v.quote_id
         WHERE q.text = ?1",
        params![text],
        |row| {
            Ok(VoteTally {
                likes: row.get(0)?,
                dislikes: row.get(1)?,
            })
        },
    )?;
    Ok(tally)
}
