use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{error, info};

use super::{see_other, wants_json};
use crate::api::AppState;

#[utoipa::path(
    post,
    path = "/{realm}/logout",
    params(("realm" = String, Path, description = "Realm name, `backend` by default")),
    responses(
        (status = 204, description = "Signed out (JSON clients)"),
        (status = 303, description = "Signed out; redirect to the login form")
    ),
    tag = "auth"
)]
pub async fn logout(Extension(state): Extension<Arc<AppState>>, headers: HeaderMap) -> Response {
    // Only this realm's identity goes away; the cookie stays for other realms.
    if let Some(session) = state.existing_session(&headers) {
        match session.terminate(state.realm().as_str()).await {
            Ok(()) => info!(realm = %state.realm(), "Admin signed out"),
            Err(err) => error!("Failed to terminate session: {err}"),
        }
    }

    if wants_json(&headers) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        see_other(&format!("{}/login", state.realm().prefix()))
    }
}
