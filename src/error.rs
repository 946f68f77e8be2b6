use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::views;

/// AppError
///
/// The application-wide error taxonomy. Store-level failures are converted into
/// one of these variants at the repository boundary and surfaced to the handler,
/// which either maps them itself (e.g. redisplaying a form on `DuplicateSlug`)
/// or lets the `IntoResponse` impl below produce the user-visible state.
#[derive(Debug, Error)]
pub enum AppError {
    /// A requested user or post does not exist.
    #[error("not found")]
    NotFound,

    /// A create or update would collide with another post's slug.
    #[error("slug already in use")]
    DuplicateSlug,

    /// Credentials did not match a stored user.
    #[error("invalid username or password")]
    AuthFailed,

    /// The request carried no valid authenticated session.
    #[error("authentication required")]
    Unauthenticated,

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing or token signing failure. Effectively unreachable in
    /// normal operation; kept distinct so it is never mistaken for bad input.
    #[error("credential processing failed: {0}")]
    Hashing(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => {
                (StatusCode::NOT_FOUND, Html(views::not_found_page())).into_response()
            }
            // Handlers normally redisplay the offending form instead; this is the
            // fallback when a collision propagates unhandled.
            AppError::DuplicateSlug => {
                (StatusCode::CONFLICT, Html(views::conflict_page())).into_response()
            }
            // Mirrors the login form's own failure flow.
            AppError::AuthFailed => Redirect::to("/login?error=1").into_response(),
            AppError::Unauthenticated => Redirect::to("/login").into_response(),
            AppError::Database(e) => {
                tracing::error!("database error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(views::server_error_page()),
                )
                    .into_response()
            }
            AppError::Hashing(e) => {
                tracing::error!("credential processing failed: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(views::server_error_page()),
                )
                    .into_response()
            }
        }
    }
}
