pub mod store;
pub mod validation;

pub use store::{authenticate, find_by_id, register};
pub use validation::Registration;

use thiserror::Error;

use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Invalid registration: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("A user with that username or email already exists")]
    Conflict,

    /// Deliberately the same for unknown users and wrong passwords.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<rusqlite::Error> for AccountError {
    fn from(e: rusqlite::Error) -> Self {
        AccountError::Store(e.into())
    }
}

impl From<r2d2::Error> for AccountError {
    fn from(e: r2d2::Error) -> Self {
        AccountError::Store(e.into())
    }
}
