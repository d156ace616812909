use utoipa::openapi::{License, OpenApi as OpenApiDoc, Tag};
use utoipa::OpenApi;

use super::handlers::{health, home, login, logout};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        login::show_login_form,
        login::login,
        logout::logout,
        home::home
    ),
    components(schemas(health::Health, home::Home, login::LoginForm, login::ErrorBody))
)]
struct ApiDoc;

/// `OpenAPI` document with info taken from the Cargo metadata.
#[must_use]
pub fn openapi() -> OpenApiDoc {
    let mut doc = ApiDoc::openapi();
    doc.info.title = env!("CARGO_PKG_NAME").to_string();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc.info.description = optional_str(env!("CARGO_PKG_DESCRIPTION")).map(str::to_string);
    doc.info.license = optional_str(env!("CARGO_PKG_LICENSE")).map(|identifier| {
        let mut license = License::new(identifier);
        license.identifier = Some(identifier.to_string());
        license
    });

    let mut auth_tag = Tag::new("auth");
    auth_tag.description = Some("Realm login, logout and home".to_string());
    let mut health_tag = Tag::new("health");
    health_tag.description = Some("Liveness and storage status".to_string());
    doc.tags = Some(vec![auth_tag, health_tag]);

    doc
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
