use crate::{
    AppState, auth,
    auth::Session,
    error::AppError,
    models::{ContactForm, DashboardStats, LoginForm, PostForm},
    views,
};
use axum::{
    extract::{Form, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

// --- Query Structs ---

/// LoginQuery
///
/// The login form signals a failed attempt by redirecting to `/login?error=1`;
/// this captures that indicator for redisplay.
#[derive(Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

// --- Public Handlers ---

/// home
///
/// [Public Route] Renders the start page with a teaser of the most recent posts.
pub async fn home(session: Session, State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let recent = state.repo.list_recent_posts(3).await?;
    Ok(Html(views::home_page(&recent, session.authenticated)))
}

/// news
///
/// [Public Route] Renders the full post listing, most recent first.
pub async fn news(session: Session, State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let posts = state.repo.list_posts().await?;
    Ok(Html(views::news_page(&posts, session.authenticated)))
}

/// post_detail
///
/// [Public Route] Renders a single post looked up by its slug.
/// An unknown slug surfaces as the 404 page.
pub async fn post_detail(
    session: Session,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, AppError> {
    let post = state.repo.get_post_by_slug(&slug).await?;
    Ok(Html(views::post_page(&post, session.authenticated)))
}

/// contact_form
///
/// [Public Route] Renders the contact form.
pub async fn contact_form(session: Session) -> Html<String> {
    Html(views::contact_page(false, session.authenticated))
}

/// submit_contact
///
/// [Public Route] Accepts a contact submission and re-renders the form with a
/// confirmation. Delivery is out of scope; the submission is only logged.
pub async fn submit_contact(session: Session, Form(form): Form<ContactForm>) -> Html<String> {
    tracing::info!(name = %form.name, email = %form.email, len = form.message.len(), "contact form received");
    Html(views::contact_page(true, session.authenticated))
}

// --- Login / Logout Handlers ---

/// login_form
///
/// [Public Route] Renders the login form, with a failure notice when the
/// `error` query indicator is present.
pub async fn login_form(Query(query): Query<LoginQuery>) -> Html<String> {
    Html(views::login_page(query.error.is_some()))
}

/// login
///
/// [Public Route] Attempts authentication. Success installs the session cookie
/// and lands on the dashboard; bad credentials bounce back to the form with the
/// error indicator. No session state changes on failure.
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match state
        .sessions
        .login(&state.repo, &form.username, &form.password)
        .await
    {
        Ok(token) => {
            let mut headers = HeaderMap::new();
            headers.insert(header::SET_COOKIE, auth::set_session_cookie(&token));
            (headers, Redirect::to("/admin")).into_response()
        }
        Err(AppError::AuthFailed) => Redirect::to("/login?error=1").into_response(),
        Err(e) => e.into_response(),
    }
}

/// logout
///
/// [Public Route] Invalidates the current session (immediately — a replayed
/// token is dead) and expires the cookie. Safe to call anonymously.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = auth::parse_cookie(&headers, auth::SESSION_COOKIE);
    state.sessions.logout(token.as_deref()).await;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::SET_COOKIE, auth::clear_session_cookie());
    (response_headers, Redirect::to("/")).into_response()
}

// --- Admin Handlers (gated) ---

/// admin_dashboard
///
/// [Admin Route] Renders the dashboard with content counters.
pub async fn admin_dashboard(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let stats = DashboardStats {
        total_posts: state.repo.count_posts().await?,
    };
    Ok(Html(views::admin_dashboard_page(&stats)))
}

/// admin_posts
///
/// [Admin Route] Renders the post management table.
pub async fn admin_posts(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let posts = state.repo.list_posts().await?;
    Ok(Html(views::admin_posts_page(&posts)))
}

/// new_post_form
///
/// [Admin Route] Renders an empty post form.
pub async fn new_post_form() -> Html<String> {
    Html(views::post_form_page(
        "Neuer Beitrag",
        "/admin/posts/new",
        &PostForm::default(),
        None,
    ))
}

/// create_post
///
/// [Admin Route] Creates a post from the submitted form. A slug collision
/// redisplays the still-populated form with an error banner (409) instead of
/// silently overwriting; success returns to the post table.
pub async fn create_post(State(state): State<AppState>, Form(form): Form<PostForm>) -> Response {
    match state.repo.create_post(form.clone()).await {
        Ok(_) => Redirect::to("/admin/posts").into_response(),
        Err(AppError::DuplicateSlug) => (
            StatusCode::CONFLICT,
            Html(views::post_form_page(
                "Neuer Beitrag",
                "/admin/posts/new",
                &form,
                Some("Der Slug wird bereits verwendet."),
            )),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// edit_post_form
///
/// [Admin Route] Renders the form pre-populated with an existing post.
/// An unknown id surfaces as the 404 page.
pub async fn edit_post_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let post = state.repo.get_post_by_id(id).await?;
    Ok(Html(views::post_form_page(
        "Beitrag bearbeiten",
        &format!("/admin/posts/edit/{id}"),
        &PostForm::from(post),
        None,
    )))
}

/// update_post
///
/// [Admin Route] Applies the submitted form to an existing post. `NotFound`
/// maps to 404; a slug collision with a different post redisplays the form.
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<PostForm>,
) -> Response {
    match state.repo.update_post(id, form.clone()).await {
        Ok(_) => Redirect::to("/admin/posts").into_response(),
        Err(AppError::DuplicateSlug) => (
            StatusCode::CONFLICT,
            Html(views::post_form_page(
                "Beitrag bearbeiten",
                &format!("/admin/posts/edit/{id}"),
                &form,
                Some("Der Slug wird bereits verwendet."),
            )),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// delete_post
///
/// [Admin Route] Deletes a post. Deleting an id that no longer exists surfaces
/// the 404 page rather than pretending success.
pub async fn delete_post(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.repo.delete_post(id).await {
        Ok(()) => Redirect::to("/admin/posts").into_response(),
        Err(e) => e.into_response(),
    }
}

/// health
///
/// [Public Route] Liveness probe for monitoring and load balancer checks.
pub async fn health() -> &'static str {
    "ok"
}
