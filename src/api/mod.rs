//! HTTP surface of the login gate.

pub mod handlers;
mod openapi;
mod state;

pub use self::openapi::openapi;
pub use self::state::{AppState, HttpConfig};

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Extension, MatchedPath},
    http::{HeaderName, HeaderValue, Request},
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{debug, error, info, info_span, Span};
use ulid::Ulid;

use self::handlers::{health, home, login, logout, middleware as guards};

/// Build the application router for the state's realm.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    let prefix = state.realm().prefix();

    let guest_routes = Router::new()
        .route(
            &format!("{prefix}/login"),
            get(login::show_login_form).post(login::login),
        )
        .route_layer(middleware::from_fn(guards::guest));

    let protected_routes = Router::new()
        .route(&format!("{prefix}/"), get(home::home))
        .route(&prefix, get(home::home))
        .route_layer(middleware::from_fn(guards::require_auth));

    Router::new()
        .merge(guest_routes)
        .merge(protected_routes)
        .route(&format!("{prefix}/logout"), post(logout::logout))
        .route("/health", get(health::health).options(health::health))
        .route("/openapi.json", get(|| async { Json(openapi()) }))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(state)),
        )
}

/// Serve on `[::]:port` until Ctrl-C or SIGTERM.
///
/// # Errors
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(port: u16, state: Arc<AppState>, prune_interval: Duration) -> Result<()> {
    let pruner = tokio::spawn(prune_loop(state.clone(), prune_interval));

    let app = router(state);
    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    pruner.abort();
    info!("Gracefully shutdown");

    Ok(served?)
}

async fn prune_loop(state: Arc<AppState>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    // the first tick completes immediately
    interval.tick().await;
    loop {
        interval.tick().await;
        match state.gate().tracker().prune().await {
            Ok(0) => {}
            Ok(removed) => debug!("Pruned {removed} expired login attempt record(s)"),
            Err(err) => error!("Failed to prune login attempts: {err}"),
        }
        match state.sessions().prune().await {
            Ok(0) => {}
            Ok(removed) => debug!("Pruned {removed} expired session(s)"),
            Err(err) => error!("Failed to prune sessions: {err}"),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = route,
        request_id
    )
}
