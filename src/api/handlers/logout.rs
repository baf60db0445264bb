use crate::api::{error::found, session::Session};
use axum::response::Response;
use tracing::{debug, instrument};

#[utoipa::path(
    get,
    path= "/logout",
    responses (
        (status = 302, description = "Session cleared, redirect to /"),
    ),
    tag= "auth"
)]
#[instrument(skip_all)]
pub async fn logout(mut session: Session) -> Response {
    if let Some(user) = session.current_user() {
        debug!("Logging out {user}");
    }
    session.logout();

    found(session, "/")
}
