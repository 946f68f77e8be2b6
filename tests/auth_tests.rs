use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, Method, Request, Uri, header, request::Parts},
};
use esemos::{
    AppState, SessionManager,
    auth::{self, Claims, Session},
    config::AppConfig,
    error::AppError,
    models::{BlogPost, PostForm, User},
    repository::{Repository, RepositoryState},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use uuid::Uuid;

// --- Mock Repository for Auth Logic ---

/// Serves a single configurable credential record; content-store methods are
/// inert since the session manager never touches them.
#[derive(Default)]
struct MockAuthRepo {
    user_to_return: Option<User>,
}

#[async_trait]
impl Repository for MockAuthRepo {
    async fn find_user_by_username(&self, _username: &str) -> Result<User, AppError> {
        self.user_to_return.clone().ok_or(AppError::NotFound)
    }

    async fn create_post(&self, _form: PostForm) -> Result<BlogPost, AppError> {
        Err(AppError::NotFound)
    }
    async fn get_post_by_slug(&self, _slug: &str) -> Result<BlogPost, AppError> {
        Err(AppError::NotFound)
    }
    async fn get_post_by_id(&self, _id: i64) -> Result<BlogPost, AppError> {
        Err(AppError::NotFound)
    }
    async fn list_posts(&self) -> Result<Vec<BlogPost>, AppError> {
        Ok(vec![])
    }
    async fn list_recent_posts(&self, _limit: i64) -> Result<Vec<BlogPost>, AppError> {
        Ok(vec![])
    }
    async fn update_post(&self, _id: i64, _form: PostForm) -> Result<BlogPost, AppError> {
        Err(AppError::NotFound)
    }
    async fn delete_post(&self, _id: i64) -> Result<(), AppError> {
        Err(AppError::NotFound)
    }
    async fn count_posts(&self) -> Result<i64, AppError> {
        Ok(0)
    }
}

// --- Helper Functions ---

const TEST_SECRET: &str = "test-secret-value-1234567890";
const TEST_PASSWORD: &str = "correct horse battery staple";

fn repo_with_admin() -> RepositoryState {
    let hash = auth::hash_password(TEST_PASSWORD).expect("hash failed");
    Arc::new(MockAuthRepo {
        user_to_return: Some(User {
            id: 1,
            username: "admin".to_string(),
            password_hash: hash,
        }),
    })
}

/// Signs a token with an arbitrary secret, bypassing the manager. Used to prove
/// that foreign-signed and unregistered tokens are rejected.
fn forge_token(secret: &str, username: &str, exp_offset: i64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: username.to_string(),
        sid: Uuid::new_v4(),
        iat: now as usize,
        exp: (now + exp_offset) as usize,
    };
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

/// Helper to get the Parts struct from a generated Request.
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

// --- Password Hashing ---

#[tokio::test]
async fn test_password_hash_roundtrip() {
    let hash = auth::hash_password("s3cret").expect("hash failed");
    assert_ne!(hash, "s3cret");
    assert!(auth::verify_password(&hash, "s3cret"));
    assert!(!auth::verify_password(&hash, "S3cret"));
}

#[tokio::test]
async fn test_malformed_stored_hash_never_verifies() {
    assert!(!auth::verify_password("not-a-phc-string", "anything"));
    assert!(!auth::verify_password("", ""));
}

// --- Login Matrix ---

#[tokio::test]
async fn test_login_with_valid_credentials_yields_authenticated_session() {
    let sessions = SessionManager::new(TEST_SECRET);
    let repo = repo_with_admin();

    let token = sessions
        .login(&repo, "admin", TEST_PASSWORD)
        .await
        .expect("login should succeed");

    let session = sessions.authenticate(Some(&token)).await;
    assert!(session.authenticated);
    assert_eq!(session.username.as_deref(), Some("admin"));
}

#[tokio::test]
async fn test_login_with_wrong_password_fails() {
    let sessions = SessionManager::new(TEST_SECRET);
    let repo = repo_with_admin();

    let result = sessions.login(&repo, "admin", "wrong").await;
    assert!(matches!(result, Err(AppError::AuthFailed)));
}

#[tokio::test]
async fn test_login_with_unknown_user_fails_identically() {
    let sessions = SessionManager::new(TEST_SECRET);
    let repo: RepositoryState = Arc::new(MockAuthRepo::default());

    // Unknown user and wrong password are indistinguishable to the caller.
    let result = sessions.login(&repo, "ghost", TEST_PASSWORD).await;
    assert!(matches!(result, Err(AppError::AuthFailed)));
}

// --- Token Validation ---

#[tokio::test]
async fn test_missing_token_is_anonymous() {
    let sessions = SessionManager::new(TEST_SECRET);
    let session = sessions.authenticate(None).await;
    assert!(!session.authenticated);
    assert!(session.username.is_none());
}

#[tokio::test]
async fn test_garbage_token_is_anonymous() {
    let sessions = SessionManager::new(TEST_SECRET);
    let session = sessions.authenticate(Some("not.a.jwt")).await;
    assert!(!session.authenticated);
}

#[tokio::test]
async fn test_foreign_signed_token_is_rejected() {
    let sessions = SessionManager::new(TEST_SECRET);

    // Signed with a different secret: the signature check must fail before any
    // claim content is trusted.
    let forged = forge_token("attacker-secret", "admin", 3600);
    let session = sessions.authenticate(Some(&forged)).await;
    assert!(!session.authenticated);
}

#[tokio::test]
async fn test_unregistered_token_with_valid_signature_is_rejected() {
    let sessions = SessionManager::new(TEST_SECRET);

    // Correctly signed but never issued by this manager (e.g. minted before a
    // restart): its session id is not in the live registry.
    let stray = forge_token(TEST_SECRET, "admin", 3600);
    let session = sessions.authenticate(Some(&stray)).await;
    assert!(!session.authenticated);
}

#[tokio::test]
async fn test_expired_token_is_anonymous() {
    let sessions = SessionManager::new(TEST_SECRET);

    let expired = forge_token(TEST_SECRET, "admin", -3600);
    let session = sessions.authenticate(Some(&expired)).await;
    assert!(!session.authenticated);
}

// --- Logout ---

#[tokio::test]
async fn test_logout_revokes_token_immediately() {
    let sessions = SessionManager::new(TEST_SECRET);
    let repo = repo_with_admin();

    let token = sessions
        .login(&repo, "admin", TEST_PASSWORD)
        .await
        .expect("login");
    assert!(sessions.authenticate(Some(&token)).await.authenticated);

    sessions.logout(Some(&token)).await;

    // The replayed token must resolve unauthenticated on every subsequent check.
    assert!(!sessions.authenticate(Some(&token)).await.authenticated);
    assert!(!sessions.authenticate(Some(&token)).await.authenticated);
}

#[tokio::test]
async fn test_logout_does_not_affect_other_sessions() {
    let sessions = SessionManager::new(TEST_SECRET);
    let repo = repo_with_admin();

    let first = sessions.login(&repo, "admin", TEST_PASSWORD).await.unwrap();
    let second = sessions.login(&repo, "admin", TEST_PASSWORD).await.unwrap();

    sessions.logout(Some(&first)).await;

    assert!(!sessions.authenticate(Some(&first)).await.authenticated);
    assert!(sessions.authenticate(Some(&second)).await.authenticated);
}

#[tokio::test]
async fn test_logout_with_garbage_token_is_a_noop() {
    let sessions = SessionManager::new(TEST_SECRET);
    sessions.logout(Some("garbage")).await;
    sessions.logout(None).await;
}

// --- Cookie Parsing ---

#[tokio::test]
async fn test_parse_cookie_finds_named_value_among_many() {
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::COOKIE,
        HeaderValue::from_static("theme=dark; esemos_session=tok123; lang=de"),
    );

    assert_eq!(
        auth::parse_cookie(&parts.headers, auth::SESSION_COOKIE).as_deref(),
        Some("tok123")
    );
    assert_eq!(auth::parse_cookie(&parts.headers, "theme").as_deref(), Some("dark"));
    assert!(auth::parse_cookie(&parts.headers, "missing").is_none());
}

#[tokio::test]
async fn test_parse_cookie_tolerates_missing_header() {
    let parts = get_request_parts(Method::GET, "/".parse().unwrap());
    assert!(auth::parse_cookie(&parts.headers, auth::SESSION_COOKIE).is_none());
}

// --- Session Extractor ---

fn create_app_state(sessions: SessionManager) -> AppState {
    AppState {
        repo: Arc::new(MockAuthRepo::default()),
        sessions,
        config: AppConfig::default(),
    }
}

#[tokio::test]
async fn test_extractor_resolves_cookie_to_authenticated_session() {
    let sessions = SessionManager::new(TEST_SECRET);
    let repo = repo_with_admin();
    let token = sessions.login(&repo, "admin", TEST_PASSWORD).await.unwrap();

    let state = create_app_state(sessions);

    let mut parts = get_request_parts(Method::GET, "/admin".parse().unwrap());
    parts.headers.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!("esemos_session={token}")).unwrap(),
    );

    let session = Session::from_request_parts(&mut parts, &state)
        .await
        .expect("extractor is infallible");
    assert!(session.authenticated);
    assert_eq!(session.username.as_deref(), Some("admin"));
}

#[tokio::test]
async fn test_extractor_without_cookie_is_anonymous_not_an_error() {
    let state = create_app_state(SessionManager::new(TEST_SECRET));

    let mut parts = get_request_parts(Method::GET, "/admin".parse().unwrap());
    let session = Session::from_request_parts(&mut parts, &state)
        .await
        .expect("extractor is infallible");
    assert!(!session.authenticated);
}
