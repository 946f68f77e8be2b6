use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client.
/// These are the server-rendered content pages; nothing here mutates the
/// content store.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load
        // balancer checks. Returns "ok" immediately.
        .route("/health", get(handlers::health))
        // GET /
        // Start page with a teaser of the most recent posts.
        .route("/", get(handlers::home))
        // GET /news
        // Full post listing, most recent first.
        .route("/news", get(handlers::news))
        // GET /news/{slug}
        // Single post detail, looked up by the public slug key. Unknown slugs
        // render the 404 page.
        .route("/news/{slug}", get(handlers::post_detail))
        // GET|POST /kontakt
        // Contact form; the POST only re-renders with a confirmation.
        .route(
            "/kontakt",
            get(handlers::contact_form).post(handlers::submit_contact),
        )
}
