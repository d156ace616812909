use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{Html, IntoResponse, Json, Response},
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::{middleware::CurrentSubject, views, wants_json};
use crate::api::AppState;

#[derive(Serialize, ToSchema)]
pub struct Home {
    realm: String,
    subject_id: String,
}

#[utoipa::path(
    get,
    path = "/{realm}/",
    params(("realm" = String, Path, description = "Realm name, `backend` by default")),
    responses(
        (status = 200, description = "Signed-in home page", body = Home),
        (status = 303, description = "Not signed in; redirect to the login form"),
        (status = 401, description = "Not signed in (JSON clients)")
    ),
    tag = "auth"
)]
pub async fn home(
    Extension(state): Extension<Arc<AppState>>,
    Extension(CurrentSubject(subject_id)): Extension<CurrentSubject>,
    headers: HeaderMap,
) -> Response {
    if wants_json(&headers) {
        return Json(Home {
            realm: state.realm().to_string(),
            subject_id,
        })
        .into_response();
    }
    Html(views::home_page(state.realm(), &subject_id)).into_response()
}
