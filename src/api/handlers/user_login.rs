use super::{render, required, required_secret};
use crate::{
    api::{
        error::{AppError, MSG_LOGIN_FIELDS_REQUIRED, found},
        session::{Level, Session},
        views::Page,
    },
    credentials,
    db::Database,
};
use axum::{extract::Extension, response::Response, Form};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Default)]
#[serde(default)]
pub struct UserLogin {
    email: String,
    password: String,
}

impl std::fmt::Debug for UserLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserLogin")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

struct LoginAttempt {
    email: String,
    password: String,
}

impl UserLogin {
    fn validate(self) -> Result<LoginAttempt, AppError> {
        match (required(&self.email), required_secret(&self.password)) {
            (Some(email), Some(password)) => Ok(LoginAttempt { email, password }),
            _ => Err(AppError::Validation(MSG_LOGIN_FIELDS_REQUIRED)),
        }
    }
}

#[utoipa::path(
    get,
    path= "/login",
    responses (
        (status = 200, description = "Login form", body = String, content_type = "text/html"),
    ),
    tag= "auth"
)]
#[instrument(skip_all)]
pub async fn login_form(database: Extension<Database>, session: Session) -> Response {
    render(session, &database, Page::Login)
}

#[utoipa::path(
    post,
    path= "/login",
    request_body(content = UserLogin, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 302, description = "Redirect to / on success, back to /login otherwise"),
    ),
    tag= "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    database: Extension<Database>,
    mut session: Session,
    payload: Option<Form<UserLogin>>,
) -> Response {
    let form = payload.map(|Form(form)| form).unwrap_or_default();

    match authenticate(&database, form).await {
        Ok(username) => {
            info!("User {username} logged in");
            session.flash(Level::Success, format!("Welcome back, {username}!"));
            session.login(username);
            found(session, "/")
        }
        Err(e) => {
            // a failed attempt never leaves a previous identity behind
            session.logout();
            e.respond(session, "/login")
        }
    }
}

/// Resolve the username for valid credentials. Unknown email and wrong
/// password both end in [`AppError::Authentication`] after one verification.
async fn authenticate(database: &Database, form: UserLogin) -> Result<String, AppError> {
    let store = database.store()?;
    let attempt = form.validate()?;

    let user = store.find_user_by_email(&attempt.email).await?;

    let password = attempt.password;
    let verified = tokio::task::spawn_blocking(move || match user {
        Some(user) => credentials::verify(&password, &user.password).then_some(user.username),
        None => {
            credentials::verify_dummy(&password);
            None
        }
    })
    .await
    .map_err(|e| AppError::DataAccess(format!("verification task failed: {e}")))?;

    verified.ok_or_else(|| {
        debug!("Authentication failed for {}", attempt.email);
        AppError::Authentication
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_login_message() {
        let form = UserLogin {
            email: "a@x.com".to_string(),
            password: String::new(),
        };
        assert!(matches!(
            form.validate(),
            Err(AppError::Validation(MSG_LOGIN_FIELDS_REQUIRED))
        ));
        assert!(matches!(
            UserLogin::default().validate(),
            Err(AppError::Validation(MSG_LOGIN_FIELDS_REQUIRED))
        ));
    }

    #[test]
    fn debug_redacts_password() {
        let form = UserLogin {
            email: "a@x.com".to_string(),
            password: "secret1".to_string(),
        };
        let rendered = format!("{form:?}");
        assert!(rendered.contains("a@x.com"));
        assert!(!rendered.contains("secret1"));
    }
}
