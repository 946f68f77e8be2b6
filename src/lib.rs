use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};

use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod views;

// Module for routing segregation (Public, Auth, Admin).
pub mod routes;
use auth::Session;
use routes::{admin, auth as auth_routes, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the application entry point (main.rs).
pub use auth::SessionManager;
pub use config::AppConfig;
pub use repository::{RepositoryState, SqliteRepository};

/// AppState
///
/// The single, thread-safe, immutable container holding all essential
/// application services and configuration, shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: the credential and content stores behind one trait.
    pub repo: RepositoryState,
    /// Session Manager: issues, validates and revokes session tokens.
    pub sessions: SessionManager,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These implementations allow extractors and middleware to selectively pull
// components from the shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for SessionManager {
    fn from_ref(app_state: &AppState) -> SessionManager {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// require_auth
///
/// The authorization gate for the admin area. Resolves the current session via
/// the infallible `Session` extractor; anonymous requests are redirected to the
/// login entry point before the wrapped handler can run, so no admin side
/// effects execute without a validated session. The gate is applied exactly
/// once — on the nested `/admin` router in `create_router` — rather than
/// per-handler.
async fn require_auth(session: Session, request: Request, next: Next) -> Response {
    if !session.authenticated {
        return Redirect::to("/login").into_response();
    }
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and
/// scoped middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 1. Base Router Assembly
    let base_router = Router::new()
        // Public Routes: no middleware applied.
        .merge(public::public_routes())
        // Login/Logout: session entry points, necessarily outside the gate.
        .merge(auth_routes::auth_routes())
        // Admin Routes: nested under '/admin' and wrapped by the gate. The
        // route_layer only runs for matched admin routes, so unknown paths
        // still produce a plain 404 instead of a login redirect.
        .nest(
            "/admin",
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_auth,
            )),
        )
        // Apply the unified state to all routes.
        .with_state(state);

    // 2. Observability and Correlation Layers (applied outermost)
    base_router.layer(
        ServiceBuilder::new()
            // 2a. Request ID Generation: a unique UUID for every incoming request.
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            // 2b. Request Tracing: wraps the request/response lifecycle in a span
            // carrying the generated request ID.
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            // 2c. Request ID Propagation: returns the x-request-id header to the
            // client.
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// trace_span_logger
///
/// Helper used by `TraceLayer` to customize span creation: the `x-request-id`
/// header (if present) is included in the structured logging metadata alongside
/// the HTTP method and URI, correlating every log line of a single request.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
