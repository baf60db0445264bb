//! Persistence gateway.
//!
//! Handlers never talk to `sqlx` directly; they receive a [`Database`] through an
//! axum `Extension` and go through the [`Store`] trait. When the database could
//! not be configured or reached at startup the handle is
//! [`Database::Unavailable`] and every data operation fails with
//! [`StoreError::Unavailable`].

pub mod memory;
pub mod mysql;

pub use self::memory::MemoryStore;
pub use self::mysql::MySqlStore;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// A registered account as stored in `users`.
#[derive(sqlx::FromRow, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub email: String,
    /// Argon2 PHC string, never the plaintext.
    pub password: String,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// A row of `contact_messages`.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection not available")]
    Unavailable,
    #[error("duplicate key")]
    Duplicate,
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    /// Classify a `sqlx` error, separating unique-constraint violations.
    #[must_use]
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            Self::Duplicate
        } else {
            Self::Database(err)
        }
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a new account. Fails with [`StoreError::Duplicate`] when the email
    /// is already registered.
    async fn insert_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<(), StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn insert_contact_message(
        &self,
        name: &str,
        email: &str,
        message: &str,
    ) -> Result<(), StoreError>;

    /// Round trip to the backend, used by `/health`.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Shared handle injected into every handler.
#[derive(Clone)]
pub enum Database {
    Connected(Arc<dyn Store>),
    Unavailable,
}

impl Database {
    pub fn new(store: impl Store + 'static) -> Self {
        Self::Connected(Arc::new(store))
    }

    /// Borrow the store, or report that the database is down.
    ///
    /// # Errors
    /// Returns [`StoreError::Unavailable`] in degraded mode.
    pub fn store(&self) -> Result<&dyn Store, StoreError> {
        match self {
            Self::Connected(store) => Ok(store.as_ref()),
            Self::Unavailable => Err(StoreError::Unavailable),
        }
    }

    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Connected(_))
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected(_) => f.write_str("Database::Connected"),
            Self::Unavailable => f.write_str("Database::Unavailable"),
        }
    }
}
