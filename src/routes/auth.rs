use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Auth Router Module
///
/// The session entry and exit points. These routes are deliberately outside
/// the authorization gate: the login form must be reachable anonymously, and
/// logout must work even for a half-expired session.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        // GET|POST /login
        // Renders the form / attempts authentication. A failed attempt
        // redirects back to /login?error=1 with no session state change.
        .route("/login", get(handlers::login_form).post(handlers::login))
        // GET /logout
        // Invalidates the session token immediately and expires the cookie.
        .route("/logout", get(handlers::logout))
}
