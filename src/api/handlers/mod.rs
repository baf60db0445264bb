pub mod contact;
pub use self::contact::contact;

pub mod health;
pub use self::health::health;

pub mod home;
pub use self::home::home;

pub mod logout;
pub use self::logout::logout;

pub mod user_login;
pub use self::user_login::{login, login_form};

pub mod user_register;
pub use self::user_register::{register, register_form};

// common functions for the handlers
use super::{
    error::MSG_UNAVAILABLE,
    session::{Flash, Level, Session},
    views::{self, Page},
};
use crate::db::Database;
use axum::response::{IntoResponse, Response};

/// Trimmed value of a required field, `None` when blank.
pub(crate) fn required(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Like [`required`] but keeps the value as typed; passwords are not trimmed.
pub(crate) fn required_secret(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}

/// Render `page`, draining the session's flashes. In degraded mode the page
/// also carries the "database unavailable" notice.
pub(crate) fn render(mut session: Session, database: &Database, page: Page) -> Response {
    let mut flashes = session.take_flashes();
    if !database.is_available() && !flashes.iter().any(|f| f.text == MSG_UNAVAILABLE) {
        flashes.push(Flash {
            level: Level::Danger,
            text: MSG_UNAVAILABLE.to_string(),
        });
    }

    let html = views::render(page, session.current_user(), &flashes);
    (session, html).into_response()
}
