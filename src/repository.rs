use crate::{
    auth,
    config::{AppConfig, DEFAULT_ADMIN_PASSWORD},
    error::AppError,
    models::{BlogPost, PostForm, User},
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations: the credential
/// store (user lookup) and the content store (post lifecycle). Handlers interact
/// with the data layer through this trait only, so tests can substitute a mock.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across the async task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Credential Store ---
    // Lookup used by the session manager during login. `NotFound` for unknown names.
    async fn find_user_by_username(&self, username: &str) -> Result<User, AppError>;

    // --- Content Store ---
    // Fails with `DuplicateSlug` if the slug is already taken.
    async fn create_post(&self, form: PostForm) -> Result<BlogPost, AppError>;
    async fn get_post_by_slug(&self, slug: &str) -> Result<BlogPost, AppError>;
    async fn get_post_by_id(&self, id: i64) -> Result<BlogPost, AppError>;
    // Most-recent-first by creation time; id is the stable tie-break.
    async fn list_posts(&self) -> Result<Vec<BlogPost>, AppError>;
    async fn list_recent_posts(&self, limit: i64) -> Result<Vec<BlogPost>, AppError>;
    // `NotFound` if the id is absent, `DuplicateSlug` if the new slug collides
    // with a different post. `updated_at` is refreshed on success.
    async fn update_post(&self, id: i64, form: PostForm) -> Result<BlogPost, AppError>;
    // `NotFound` if the row is already gone; the caller decides whether that
    // counts as already-done.
    async fn delete_post(&self, id: i64) -> Result<(), AppError>;
    async fn count_posts(&self) -> Result<i64, AppError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// SqliteRepository
///
/// The concrete implementation of the `Repository` trait, backed by sqlite.
pub struct SqliteRepository {
    pool: SqlitePool,
}

const POST_COLUMNS: &str = "id, title, slug, content, summary, author, created_at, updated_at";

/// Maps a sqlx error to the application taxonomy: UNIQUE violations become
/// `DuplicateSlug`, missing rows become `NotFound`, the rest stay `Database`.
fn map_post_error(e: sqlx::Error) -> AppError {
    if matches!(e, sqlx::Error::RowNotFound) {
        return AppError::NotFound;
    }
    if e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
    {
        return AppError::DuplicateSlug;
    }
    AppError::Database(e)
}

impl SqliteRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// init_schema
    ///
    /// Creates the `users` and `posts` tables if they do not exist. Idempotent,
    /// run once at startup; failure here is fatal to the process.
    pub async fn init_schema(&self) -> Result<(), AppError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                content TEXT NOT NULL,
                summary TEXT NOT NULL,
                author TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// seed_admin
    ///
    /// First-boot side effect: if the users table is empty, inserts one
    /// administrator with the configured credentials (hashed). Subsequent boots
    /// are no-ops. Seeding with the well-known fallback password is legal but
    /// warned about; production deployments must rotate it.
    pub async fn seed_admin(&self, config: &AppConfig) -> Result<(), AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(());
        }

        let hash = auth::hash_password(&config.admin_password)?;
        sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(&config.admin_username)
            .bind(&hash)
            .execute(&self.pool)
            .await?;

        if config.admin_password == DEFAULT_ADMIN_PASSWORD {
            tracing::warn!(
                username = %config.admin_username,
                "seeded administrator with the default password; set ADMIN_PASSWORD and rotate this credential"
            );
        } else {
            tracing::info!(username = %config.admin_username, "seeded administrator account");
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    /// find_user_by_username
    ///
    /// Retrieves the credential record needed for the login check.
    async fn find_user_by_username(&self, username: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound)
    }

    /// create_post
    ///
    /// Inserts a new post. Slug uniqueness is enforced by the UNIQUE constraint,
    /// so two racing creates on the same slug resolve to exactly one success and
    /// one `DuplicateSlug` without application-level locking.
    async fn create_post(&self, form: PostForm) -> Result<BlogPost, AppError> {
        let now = Utc::now();
        sqlx::query_as::<_, BlogPost>(&format!(
            "INSERT INTO posts (title, slug, content, summary, author, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {POST_COLUMNS}"
        ))
        .bind(&form.title)
        .bind(&form.slug)
        .bind(&form.content)
        .bind(&form.summary)
        .bind(&form.author)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_error)
    }

    /// get_post_by_slug
    ///
    /// Public lookup key: used by the news detail page.
    async fn get_post_by_slug(&self, slug: &str) -> Result<BlogPost, AppError> {
        sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE slug = ?"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound)
    }

    /// get_post_by_id
    ///
    /// Internal lookup key: used by the admin edit/delete flows.
    async fn get_post_by_id(&self, id: i64) -> Result<BlogPost, AppError> {
        sqlx::query_as::<_, BlogPost>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// list_posts
    ///
    /// Full listing for the news page and the admin posts table.
    /// Ordering is most-recent-first with the id as a stable tie-break.
    async fn list_posts(&self) -> Result<Vec<BlogPost>, AppError> {
        sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)
    }

    /// list_recent_posts
    ///
    /// Bounded listing for the home page teaser section.
    async fn list_recent_posts(&self, limit: i64) -> Result<Vec<BlogPost>, AppError> {
        sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)
    }

    /// update_post
    ///
    /// Rewrites all editable fields and refreshes `updated_at`. The UNIQUE
    /// constraint rejects a slug that belongs to a different post; updating a
    /// post onto its own slug is a no-op collision-wise.
    async fn update_post(&self, id: i64, form: PostForm) -> Result<BlogPost, AppError> {
        sqlx::query_as::<_, BlogPost>(&format!(
            "UPDATE posts SET title = ?, slug = ?, content = ?, summary = ?, author = ?, \
             updated_at = ? WHERE id = ? RETURNING {POST_COLUMNS}"
        ))
        .bind(&form.title)
        .bind(&form.slug)
        .bind(&form.content)
        .bind(&form.summary)
        .bind(&form.author)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_error)?
        .ok_or(AppError::NotFound)
    }

    /// delete_post
    ///
    /// Deleting an absent row surfaces `NotFound` rather than silently
    /// succeeding; callers that treat a second delete as already-done can match
    /// on the variant.
    async fn delete_post(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /// count_posts
    ///
    /// Dashboard counter.
    async fn count_posts(&self) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)
    }
}
