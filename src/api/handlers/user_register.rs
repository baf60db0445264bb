use super::{render, required, required_secret};
use crate::{
    api::{
        error::{AppError, MSG_FIELDS_REQUIRED, found},
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

pub const MSG_REGISTERED: &str = "Registration successful, please log in.";

#[derive(ToSchema, Deserialize, Default)]
#[serde(default)]
pub struct UserRegister {
    username: String,
    email: String,
    password: String,
}

impl std::fmt::Debug for UserRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRegister")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

struct NewUser {
    username: String,
    email: String,
    password: String,
}

impl UserRegister {
    fn validate(self) -> Result<NewUser, AppError> {
        match (
            required(&self.username),
            required(&self.email),
            required_secret(&self.password),
        ) {
            (Some(username), Some(email), Some(password)) => Ok(NewUser {
                username,
                email,
                password,
            }),
            _ => Err(AppError::Validation(MSG_FIELDS_REQUIRED)),
        }
    }
}

#[utoipa::path(
    get,
    path= "/register",
    responses (
        (status = 200, description = "Registration form", body = String, content_type = "text/html"),
    ),
    tag= "auth"
)]
#[instrument(skip_all)]
pub async fn register_form(database: Extension<Database>, session: Session) -> Response {
    render(session, &database, Page::Register)
}

#[utoipa::path(
    post,
    path= "/register",
    request_body(content = UserRegister, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 302, description = "Redirect to /login on success, back to /register otherwise"),
    ),
    tag= "auth"
)]
#[instrument(skip_all)]
pub async fn register(
    database: Extension<Database>,
    mut session: Session,
    payload: Option<Form<UserRegister>>,
) -> Response {
    let form = payload.map(|Form(form)| form).unwrap_or_default();

    match create_user(&database, form).await {
        Ok(username) => {
            info!("Registered user {username}");
            session.flash(Level::Success, MSG_REGISTERED);
            found(session, "/login")
        }
        Err(e) => e.respond(session, "/register"),
    }
}

async fn create_user(database: &Database, form: UserRegister) -> Result<String, AppError> {
    let store = database.store()?;
    let user = form.validate()?;

    debug!("Hashing password for {}", user.email);
    let password = user.password;
    let password_hash = tokio::task::spawn_blocking(move || credentials::hash(&password))
        .await
        .map_err(|e| AppError::DataAccess(format!("hashing task failed: {e}")))?
        .map_err(|e| AppError::DataAccess(e.to_string()))?;

    store
        .insert_user(&user.username, &user.email, &password_hash)
        .await?;

    Ok(user.username)
}
