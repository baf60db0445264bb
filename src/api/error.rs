//! Errors a handler can end with, and how each one is shown to the user.

use super::session::{Level, Session};
use crate::db::StoreError;
use axum::{
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error, warn};

pub const MSG_FIELDS_REQUIRED: &str = "All fields are required.";
pub const MSG_LOGIN_FIELDS_REQUIRED: &str = "Email and Password are required.";
pub const MSG_DUPLICATE_EMAIL: &str = "An account with that email already exists.";
pub const MSG_DATA_ACCESS: &str = "Something went wrong, please try again later.";
pub const MSG_UNAVAILABLE: &str = "Database connection not available.";
pub const MSG_INVALID_CREDENTIALS: &str = "Invalid Email or Password";

#[derive(Debug, Error)]
pub enum AppError {
    /// The database was not configured or could not be reached at startup.
    #[error("database connection not available")]
    Unavailable,
    /// A required form field is missing; carries the message to show.
    #[error("validation failed: {0}")]
    Validation(&'static str),
    #[error("email already registered")]
    DuplicateKey,
    /// Any other failure below the handler. The detail is logged only.
    #[error("data access failed: {0}")]
    DataAccess(String),
    #[error("authentication failed")]
    Authentication,
}

impl AppError {
    /// Severity and fixed text of the flash shown for this error.
    #[must_use]
    pub fn flash(&self) -> (Level, &'static str) {
        match self {
            Self::Unavailable => (Level::Danger, MSG_UNAVAILABLE),
            Self::Validation(message) => (Level::Warning, *message),
            Self::DuplicateKey => (Level::Danger, MSG_DUPLICATE_EMAIL),
            Self::DataAccess(_) => (Level::Danger, MSG_DATA_ACCESS),
            Self::Authentication => (Level::Danger, MSG_INVALID_CREDENTIALS),
        }
    }

    /// Log the error, queue its flash and send the browser back to `to`.
    pub fn respond(self, mut session: Session, to: &'static str) -> Response {
        match &self {
            Self::Unavailable => warn!("Rejected request: {self}"),
            Self::DataAccess(detail) => error!("Data access error: {detail}"),
            Self::Validation(_) | Self::DuplicateKey | Self::Authentication => {
                debug!("Rejected request: {self}");
            }
        }

        let (level, text) = self.flash();
        session.flash(level, text);
        found(session, to)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable => Self::Unavailable,
            StoreError::Duplicate => Self::DuplicateKey,
            StoreError::Database(e) => Self::DataAccess(e.to_string()),
        }
    }
}

/// `302 Found` to `to`, writing the session cookie if it changed.
pub fn found(session: Session, to: &'static str) -> Response {
    (StatusCode::FOUND, session, [(LOCATION, to)]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_taxonomy() {
        assert!(matches!(
            AppError::from(StoreError::Unavailable),
            AppError::Unavailable
        ));
        assert!(matches!(
            AppError::from(StoreError::Duplicate),
            AppError::DuplicateKey
        ));
        assert!(matches!(
            AppError::from(StoreError::Database(sqlx::Error::PoolTimedOut)),
            AppError::DataAccess(_)
        ));
    }

    #[test]
    fn flashes_never_leak_details() {
        let err = AppError::DataAccess("Duplicate entry 'x' for key 'users_email_key'".to_string());
        assert_eq!(err.flash(), (Level::Danger, MSG_DATA_ACCESS));
    }

    #[test]
    fn validation_is_a_warning() {
        assert_eq!(
            AppError::Validation(MSG_LOGIN_FIELDS_REQUIRED).flash(),
            (Level::Warning, MSG_LOGIN_FIELDS_REQUIRED)
        );
        assert_eq!(AppError::Unavailable.flash().0, Level::Danger);
        assert_eq!(AppError::DuplicateKey.flash().0, Level::Danger);
        assert_eq!(
            AppError::Authentication.flash(),
            (Level::Danger, MSG_INVALID_CREDENTIALS)
        );
    }
}
