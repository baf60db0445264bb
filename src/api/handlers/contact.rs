use super::required;
use crate::{
    api::{
        error::{AppError, MSG_FIELDS_REQUIRED, found},
        session::{Level, Session},
    },
    db::Database,
};
use axum::{extract::Extension, response::Response, Form};
use serde::Deserialize;
use tracing::{debug, instrument};
use utoipa::ToSchema;

pub const MSG_SENT: &str = "Thanks for your message!";

#[derive(ToSchema, Deserialize, Debug, Default)]
#[serde(default)]
pub struct ContactForm {
    name: String,
    email: String,
    message: String,
}

struct NewContactMessage {
    name: String,
    email: String,
    message: String,
}

impl ContactForm {
    fn validate(self) -> Result<NewContactMessage, AppError> {
        match (
            required(&self.name),
            required(&self.email),
            required(&self.message),
        ) {
            (Some(name), Some(email), Some(message)) => Ok(NewContactMessage {
                name,
                email,
                message,
            }),
            _ => Err(AppError::Validation(MSG_FIELDS_REQUIRED)),
        }
    }
}

#[utoipa::path(
    post,
    path= "/contact",
    request_body(content = ContactForm, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 302, description = "Redirect to / with a flash message"),
    ),
    tag= "contact"
)]
#[instrument(skip_all)]
pub async fn contact(
    database: Extension<Database>,
    mut session: Session,
    payload: Option<Form<ContactForm>>,
) -> Response {
    let form = payload.map(|Form(form)| form).unwrap_or_default();

    match submit(&database, form).await {
        Ok(()) => {
            session.flash(Level::Success, MSG_SENT);
            found(session, "/")
        }
        Err(e) => e.respond(session, "/"),
    }
}

async fn submit(database: &Database, form: ContactForm) -> Result<(), AppError> {
    let store = database.store()?;
    let contact = form.validate()?;

    debug!("Storing contact message from {}", contact.email);
    store
        .insert_contact_message(&contact.name, &contact.email, &contact.message)
        .await?;

    Ok(())
}
