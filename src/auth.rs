use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, HeaderValue, header, request::Parts},
};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use password_hash::{PasswordHash, SaltString};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    convert::Infallible,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{error::AppError, repository::RepositoryState};

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "esemos_session";

/// Sessions expire a day after login even without an explicit logout.
const SESSION_TTL_SECS: u64 = 86_400;

// --- Password Hashing (Credential Store capability) ---

/// hash_password
///
/// Produces a salted argon2 PHC string for storage. One-way; the plaintext is
/// dropped after hashing and never logged.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| AppError::Hashing(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AppError::Hashing(e.to_string()))?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Hashing(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// verify_password
///
/// Constant-style verification of a candidate against a stored PHC string.
/// A malformed stored hash verifies as false rather than erroring.
pub fn verify_password(stored_hash: &str, candidate: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// --- Session Token ---

/// Claims
///
/// Payload of the signed session token carried in the cookie. Signed by the
/// server's secret and validated on every request that reads the session.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the username the session was issued for.
    pub sub: String,
    /// Session id: random per login, checked against the live-session registry
    /// so logout revokes the token immediately.
    pub sid: Uuid,
    /// Expiration time. Tokens are rejected after this regardless of registry state.
    pub exp: usize,
    /// Issued at.
    pub iat: usize,
}

/// Session
///
/// The resolved authentication state of a request. Always obtainable: a missing,
/// malformed, tampered, expired or revoked token yields the anonymous session
/// rather than an error.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub authenticated: bool,
    pub username: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }
}

fn unix_now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or(0)
}

/// SessionManager
///
/// Issues, reads and invalidates session tokens. A token is an HS256-signed
/// claims blob (tamper-proof) whose session id must additionally be present in
/// the in-process live registry; removing the id at logout kills the token
/// immediately, which a purely stateless signature could not do.
#[derive(Clone)]
pub struct SessionManager {
    secret: String,
    live: Arc<RwLock<HashSet<Uuid>>>,
}

impl SessionManager {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
            live: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// login
    ///
    /// Delegates the credential check to the credential store; on success issues
    /// a fresh signed token and registers its session id as live. Unknown users
    /// and wrong passwords are indistinguishable to the caller (`AuthFailed`).
    pub async fn login(
        &self,
        repo: &RepositoryState,
        username: &str,
        password: &str,
    ) -> Result<String, AppError> {
        let user = repo
            .find_user_by_username(username)
            .await
            .map_err(|e| match e {
                AppError::NotFound => AppError::AuthFailed,
                other => other,
            })?;

        if !verify_password(&user.password_hash, password) {
            return Err(AppError::AuthFailed);
        }

        let sid = Uuid::new_v4();
        let now = unix_now();
        let claims = Claims {
            sub: user.username,
            sid,
            iat: now,
            exp: now + SESSION_TTL_SECS as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Hashing(e.to_string()))?;

        self.live.write().await.insert(sid);
        Ok(token)
    }

    /// authenticate
    ///
    /// Resolves a token (or its absence) into a `Session`. Never fails: every
    /// rejection path collapses to the anonymous session. The signature check
    /// runs before the registry lookup, so a tampered token cannot probe
    /// registry state.
    pub async fn authenticate(&self, token: Option<&str>) -> Session {
        let Some(token) = token else {
            return Session::anonymous();
        };

        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            Ok(data) => data,
            Err(e) => {
                // An expired token is routine; anything else is logged for the
                // operator since it may indicate tampering.
                if !matches!(e.kind(), ErrorKind::ExpiredSignature) {
                    tracing::debug!("rejected session token: {e}");
                }
                return Session::anonymous();
            }
        };

        if !self.live.read().await.contains(&token_data.claims.sid) {
            // Valid signature but revoked (or issued before a restart).
            return Session::anonymous();
        }

        Session {
            authenticated: true,
            username: Some(token_data.claims.sub),
        }
    }

    /// logout
    ///
    /// Removes the token's session id from the live registry. Effective
    /// immediately: a replayed copy of the token resolves to anonymous on the
    /// very next check. Absent or invalid tokens are a no-op.
    pub async fn logout(&self, token: Option<&str>) {
        let Some(token) = token else { return };

        // Expiry is irrelevant here; an expired token's sid is worth clearing too.
        let mut validation = Validation::default();
        validation.validate_exp = false;

        if let Ok(data) = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            self.live.write().await.remove(&data.claims.sid);
        }
    }
}

// --- Cookie Plumbing ---

/// parse_cookie
///
/// Extracts a named cookie value from the request headers. Tolerates missing or
/// malformed headers by returning `None`.
pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in raw.split(';') {
        if let Some((k, v)) = part.trim().split_once('=') {
            if k == name {
                return Some(v.to_string());
            }
        }
    }
    None
}

/// Builds the `Set-Cookie` value installing the session token.
/// HttpOnly keeps it away from scripts; Lax still sends it on the top-level
/// redirects the login flow relies on.
pub fn set_session_cookie(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/"
    ))
    .unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// Builds the `Set-Cookie` value expiring the session cookie.
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static(
        "esemos_session=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax; Path=/",
    )
}

// --- Session Extractor ---

/// Session Extractor Implementation
///
/// Makes `Session` usable as a handler argument. Unlike a rejecting auth
/// extractor, this one is infallible: anonymous requests get an anonymous
/// session, and it is the authorization gate's job (not the extractor's) to
/// decide what anonymous users may reach.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionManager: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = SessionManager::from_ref(state);
        let token = parse_cookie(&parts.headers, SESSION_COOKIE);
        Ok(sessions.authenticate(token.as_deref()).await)
    }
}
