//! Login form and submission.
//!
//! Flow Overview:
//! 1) Validate the form (required fields, email shape).
//! 2) Resolve the origin and the caller's session, then run the gate.
//! 3) On success rotate the session id, set the cookie and redirect.
//! 4) Otherwise map the outcome to a status code and re-render the form, or
//!    return JSON when the client asked for it.

use axum::{
    extract::{ConnectInfo, Extension, Query},
    http::{
        header::{RETRY_AFTER, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{Html, IntoResponse, Json, Response},
    Form,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tracing::{error, info, instrument};
use utoipa::ToSchema;

use super::{
    cookies::session_cookie, origin::request_origin, safe_next, see_other, views, wants_json,
};
use crate::api::AppState;
use crate::gate::{validation::validate_login, FieldErrors, LoginOutcome};

#[derive(Deserialize, ToSchema)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
    /// Local path to continue to after login.
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    #[schema(value_type = Object)]
    pub errors: FieldErrors,
}

#[utoipa::path(
    get,
    path = "/{realm}/login",
    params(("realm" = String, Path, description = "Realm name, `backend` by default")),
    responses(
        (status = 200, description = "Login form", content_type = "text/html"),
        (status = 303, description = "Already signed in to this realm")
    ),
    tag = "auth"
)]
pub async fn show_login_form(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<LoginQuery>,
) -> Html<String> {
    let next = query.next.as_deref().and_then(safe_next);
    Html(views::login_page(
        state.realm(),
        "",
        next,
        &FieldErrors::new(),
    ))
}

#[utoipa::path(
    post,
    path = "/{realm}/login",
    params(("realm" = String, Path, description = "Realm name, `backend` by default")),
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Signed in; redirect to the intended page"),
        (status = 422, description = "Invalid input or credentials", body = ErrorBody),
        (status = 429, description = "Locked out; see Retry-After", body = ErrorBody),
        (status = 503, description = "Credential or attempt store unavailable", body = ErrorBody)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let json = wants_json(&headers);
    let next = form.next.as_deref().and_then(safe_next).map(str::to_string);
    let email = form.email.clone().unwrap_or_default();

    if let Err(errors) = validate_login(form.email.as_deref(), form.password.as_deref()) {
        return rejection(
            &state,
            &LoginOutcome::InvalidInput(errors),
            &email,
            next.as_deref(),
            json,
        );
    }

    let origin = request_origin(
        &headers,
        connect_info.map(|ConnectInfo(addr)| addr),
        state.config().trust_proxy_headers(),
    );

    let mut session = match state.session_or_new(&headers) {
        Ok(session) => session,
        Err(err) => {
            error!("Failed to start session: {err}");
            return rejection(
                &state,
                &LoginOutcome::TransientFailure,
                &email,
                next.as_deref(),
                json,
            );
        }
    };

    let secret = SecretString::from(form.password.unwrap_or_default());
    let outcome = state
        .gate()
        .attempt_login(&session, email.trim(), &secret, &origin)
        .await;

    let LoginOutcome::Authenticated(subject_id) = outcome else {
        return rejection(&state, &outcome, &email, next.as_deref(), json);
    };

    info!(realm = %state.realm(), subject_id, "Admin signed in");

    if let Err(err) = session.rotate().await {
        error!("Failed to rotate session id: {err}");
    }

    let target = next.unwrap_or_else(|| format!("{}/", state.realm().prefix()));
    let mut response = see_other(&target);
    match session_cookie(
        session.session_id(),
        state.config().session_ttl_seconds(),
        state.config().secure_cookie(),
    ) {
        Ok(cookie) => {
            response.headers_mut().insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build session cookie: {err}"),
    }
    response
}

/// Status code for a login outcome that did not sign the user in.
#[must_use]
pub fn outcome_status(outcome: &LoginOutcome) -> StatusCode {
    match outcome {
        LoginOutcome::Authenticated(_) => StatusCode::OK,
        LoginOutcome::InvalidInput(_) | LoginOutcome::InvalidCredentials => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        LoginOutcome::LockedOut { .. } => StatusCode::TOO_MANY_REQUESTS,
        LoginOutcome::TransientFailure => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn rejection(
    state: &AppState,
    outcome: &LoginOutcome,
    email: &str,
    next: Option<&str>,
    json: bool,
) -> Response {
    let status = outcome_status(outcome);
    let errors = outcome.field_errors();

    let mut response = if json {
        let message = match outcome {
            LoginOutcome::InvalidInput(_) => "The given data was invalid.".to_string(),
            _ => errors.get("email").first().cloned().unwrap_or_default(),
        };
        (status, Json(ErrorBody { message, errors })).into_response()
    } else {
        let page = views::login_page(state.realm(), email, next, &errors);
        (status, Html(page)).into_response()
    };

    if let LoginOutcome::LockedOut { remaining_seconds } = outcome {
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(*remaining_seconds));
    }
    response
}
