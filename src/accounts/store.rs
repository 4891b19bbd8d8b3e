use std::sync::LazyLock;

use rusqlite::{params, ErrorCode, OptionalExtension, TransactionBehavior};

use super::validation::{validate, Registration};
use super::AccountError;
use crate::db::models::User;
use crate::db::StoreError;
use crate::state::DbPool;

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";

// Verified against when the username is unknown, so both failures cost a bcrypt round
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| bcrypt::hash("quotarium-dummy", bcrypt::DEFAULT_COST).unwrap_or_default());

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation
    )
}

/// Validate and persist a new user. Returns the new user id.
///
/// The existence check and insert share one IMMEDIATE transaction, and the
/// UNIQUE constraints on `username`/`email` back it up, so concurrent
/// registrations of the same identity produce exactly one row.
pub fn register(pool: &DbPool, reg: &Registration, bcrypt_cost: u32) -> Result<String, AccountError> {
    let problems = validate(reg);
    if !problems.is_empty() {
        return Err(AccountError::Validation(problems));
    }

    // Hash outside the write lock
    let password_hash = bcrypt::hash(&reg.password, bcrypt_cost)?;
    let id = uuid::Uuid::now_v7().to_string();

    let mut conn = pool.get()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let exists: bool = tx.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE username = ?1 OR email = ?2",
        params![reg.username, reg.email],
        |row| row.get(0),
    )?;
    if exists {
        return Err(AccountError::Conflict);
    }

    match tx.execute(
        "INSERT INTO users (id, username, email, password_hash) VALUES (?1, ?2, ?3, ?4)",
        params![id, reg.username, reg.email, password_hash],
    ) {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => return Err(AccountError::Conflict),
        Err(e) => return Err(e.into()),
    }
    tx.commit()?;

    tracing::info!(user_id = %id, username = %reg.username, "Registered user");
    Ok(id)
}

/// Check a username/password pair. Unknown users and wrong passwords fail
/// with the same error.
pub fn authenticate(pool: &DbPool, username: &str, password: &str) -> Result<User, AccountError> {
    let conn = pool.get()?;
    let user = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS),
            params![username],
            user_from_row,
        )
        .optional()?;

    let hash = user
        .as_ref()
        .map_or(DUMMY_HASH.as_str(), |u| u.password_hash.as_str());
    let verified = bcrypt::verify(password, hash).unwrap_or(false);

    match user {
        Some(user) if verified => Ok(user),
        _ => {
            tracing::debug!("Rejected login attempt");
            Err(AccountError::InvalidCredentials)
        }
    }
}

pub fn find_by_id(pool: &DbPool, id: &str) -> Result<Option<User>, StoreError> {
    let conn = pool.get()?;
    let user = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
            params![id],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}
