use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Admin Router Module
///
/// Defines the routes for content management, nested under `/admin`.
///
/// Access Control:
/// This entire router is wrapped by the `require_auth` middleware in
/// `create_router`. Every route below therefore sees only authenticated
/// sessions; anonymous requests are redirected to `/login` before any handler
/// side effects can execute. Adding a route here gates it automatically.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin
        // Dashboard with content counters.
        .route("/", get(handlers::admin_dashboard))
        // GET /admin/posts
        // Post management table with edit/delete actions.
        .route("/posts", get(handlers::admin_posts))
        // GET|POST /admin/posts/new
        // Create flow. A slug collision redisplays the form with an error
        // banner instead of overwriting the existing post.
        .route(
            "/posts/new",
            get(handlers::new_post_form).post(handlers::create_post),
        )
        // GET|POST /admin/posts/edit/{id}
        // Edit flow for an existing post; unknown ids render the 404 page.
        .route(
            "/posts/edit/{id}",
            get(handlers::edit_post_form).post(handlers::update_post),
        )
        // POST /admin/posts/delete/{id}
        // Deletion. A missing id is reported as 404, not silently ignored.
        .route("/posts/delete/{id}", post(handlers::delete_post))
}
