use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The administrator's canonical identity record stored in the `users` table.
/// There is exactly one row in-scope, seeded at first boot.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Salted one-way hash (argon2 PHC string). Never serialized, never logged.
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// BlogPost
///
/// Represents a post record from the `posts` table. The `slug` is the unique
/// public lookup key used in `/news/{slug}` URLs in place of the numeric id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub summary: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// PostForm
///
/// Input payload for both the "new post" and "edit post" admin forms.
/// Every field is required; validation beyond presence is left to the store's
/// constraints (slug uniqueness).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PostForm {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub summary: String,
    pub author: String,
}

impl From<BlogPost> for PostForm {
    /// Pre-populates the edit form from an existing post.
    fn from(post: BlogPost) -> Self {
        Self {
            title: post.title,
            slug: post.slug,
            content: post.content,
            summary: post.summary,
            author: post.author,
        }
    }
}

/// LoginForm
///
/// Input payload for the login form. The password is passed to the credential
/// check and dropped; it is never persisted or logged.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// ContactForm
///
/// Input payload for the public contact form. The submission is rendered back
/// as a confirmation only; delivery is out of scope.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

// --- Dashboard Schemas (Output) ---

/// DashboardStats
///
/// View data for the admin dashboard (GET /admin).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DashboardStats {
    pub total_posts: i64,
}
