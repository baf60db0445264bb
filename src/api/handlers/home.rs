use super::render;
use crate::{
    api::{session::Session, views::Page},
    db::Database,
};
use axum::{extract::Extension, response::Response};
use tracing::instrument;

#[utoipa::path(
    get,
    path= "/",
    responses (
        (status = 200, description = "Home page with the contact form", body = String, content_type = "text/html"),
    ),
    tag= "pages"
)]
#[instrument(skip_all)]
pub async fn home(database: Extension<Database>, session: Session) -> Response {
    render(session, &database, Page::Home)
}
