//! Route guards for the realm's login and protected pages.

use axum::{
    extract::{Extension, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use super::{see_other, wants_json};
use crate::api::AppState;

/// Subject id of the signed-in user, set by [`require_auth`].
#[derive(Clone, Debug)]
pub struct CurrentSubject(pub String);

/// Send users already signed in to this realm to its home page.
pub async fn guest(
    Extension(state): Extension<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(session) = state.existing_session(request.headers()) {
        match session.is_authenticated(state.realm().as_str()).await {
            Ok(true) => return see_other(&format!("{}/", state.realm().prefix())),
            Ok(false) => {}
            Err(err) => error!("Failed to read session: {err}"),
        }
    }
    next.run(request).await
}

/// Let signed-in users through; send everyone else to the login form.
pub async fn require_auth(
    Extension(state): Extension<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let subject = match state.existing_session(request.headers()) {
        Some(session) => match session.subject(state.realm().as_str()).await {
            Ok(subject) => subject,
            Err(err) => {
                error!("Failed to read session: {err}");
                return StatusCode::SERVICE_UNAVAILABLE.into_response();
            }
        },
        None => None,
    };

    if let Some(subject) = subject {
        request.extensions_mut().insert(CurrentSubject(subject));
        return next.run(request).await;
    }

    if wants_json(request.headers()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Unauthenticated." })),
        )
            .into_response();
    }

    let intended = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_string(), ToString::to_string);
    let encoded: String = url::form_urlencoded::byte_serialize(intended.as_bytes()).collect();
    see_other(&format!("{}/login?next={encoded}", state.realm().prefix()))
}
