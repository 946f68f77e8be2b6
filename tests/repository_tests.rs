use esemos::{
    config::AppConfig,
    error::AppError,
    models::PostForm,
    repository::{Repository, SqliteRepository},
};
use sqlx::sqlite::SqlitePoolOptions;

// --- Test Context and Setup ---

/// Builds a repository over a fresh in-memory database with the schema applied.
/// A single pooled connection keeps every query on the same in-memory instance.
async fn setup_repo() -> SqliteRepository {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory sqlite");

    let repo = SqliteRepository::new(pool);
    repo.init_schema().await.expect("Failed to init schema");
    repo
}

// --- Test Data Helpers ---

fn post_form(title: &str, slug: &str) -> PostForm {
    PostForm {
        title: title.to_string(),
        slug: slug.to_string(),
        content: format!("{title} content"),
        summary: format!("{title} summary"),
        author: "Test Author".to_string(),
    }
}

// --- Credential Store / Seeding ---

#[tokio::test]
async fn test_first_boot_seeds_default_admin() {
    let repo = setup_repo().await;
    let config = AppConfig::default();

    repo.seed_admin(&config).await.expect("seed failed");

    let user = repo
        .find_user_by_username("admin")
        .await
        .expect("seeded admin missing");
    assert_eq!(user.username, "admin");
    // The stored value is a salted hash, never the plaintext.
    assert_ne!(user.password_hash, "admin123");
    assert!(esemos::auth::verify_password(&user.password_hash, "admin123"));
    assert!(!esemos::auth::verify_password(&user.password_hash, "wrong"));
}

#[tokio::test]
async fn test_seed_admin_is_idempotent() {
    let repo = setup_repo().await;
    let config = AppConfig::default();

    repo.seed_admin(&config).await.expect("first seed failed");
    // Second boot: the store is no longer empty, so seeding is a no-op.
    repo.seed_admin(&config).await.expect("second seed failed");

    assert!(repo.find_user_by_username("admin").await.is_ok());
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let repo = setup_repo().await;

    let result = repo.find_user_by_username("nobody").await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

// --- Content Store: Create / Read ---

#[tokio::test]
async fn test_create_and_get_post() {
    let repo = setup_repo().await;

    let created = repo
        .create_post(post_form("First", "first"))
        .await
        .expect("create failed");
    assert_eq!(created.slug, "first");
    assert_eq!(created.created_at, created.updated_at);

    let by_slug = repo.get_post_by_slug("first").await.expect("slug lookup");
    assert_eq!(by_slug.id, created.id);

    let by_id = repo.get_post_by_id(created.id).await.expect("id lookup");
    assert_eq!(by_id.title, "First");
}

#[tokio::test]
async fn test_duplicate_slug_create_fails_and_keeps_one_post() {
    let repo = setup_repo().await;

    repo.create_post(post_form("A", "a")).await.expect("first create");
    let second = repo.create_post(post_form("B", "a")).await;
    assert!(matches!(second, Err(AppError::DuplicateSlug)));

    // Exactly one post survives under the contested slug.
    let all = repo.list_posts().await.expect("list");
    let with_slug: Vec<_> = all.iter().filter(|p| p.slug == "a").collect();
    assert_eq!(with_slug.len(), 1);
    assert_eq!(with_slug[0].title, "A");
}

#[tokio::test]
async fn test_get_missing_post_is_not_found() {
    let repo = setup_repo().await;

    assert!(matches!(
        repo.get_post_by_slug("ghost").await,
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        repo.get_post_by_id(4711).await,
        Err(AppError::NotFound)
    ));
}

// --- Content Store: Listing ---

#[tokio::test]
async fn test_list_posts_is_most_recent_first() {
    let repo = setup_repo().await;

    let a = repo.create_post(post_form("Oldest", "oldest")).await.unwrap();
    let b = repo.create_post(post_form("Middle", "middle")).await.unwrap();
    let c = repo.create_post(post_form("Newest", "newest")).await.unwrap();

    let all = repo.list_posts().await.expect("list");
    assert_eq!(all.len(), 3);
    // Creation-time descending; the id tie-break keeps same-instant inserts stable.
    assert_eq!(all[0].id, c.id);
    assert_eq!(all[1].id, b.id);
    assert_eq!(all[2].id, a.id);
}

#[tokio::test]
async fn test_list_recent_posts_honours_limit() {
    let repo = setup_repo().await;

    for i in 0..5 {
        repo.create_post(post_form(&format!("Post {i}"), &format!("post-{i}")))
            .await
            .unwrap();
    }

    let recent = repo.list_recent_posts(3).await.expect("list recent");
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].slug, "post-4");

    assert_eq!(repo.count_posts().await.expect("count"), 5);
}

// --- Content Store: Update ---

#[tokio::test]
async fn test_update_post_rewrites_fields_and_timestamps() {
    let repo = setup_repo().await;

    let created = repo.create_post(post_form("Draft", "draft")).await.unwrap();

    let mut form = post_form("Final", "final");
    form.author = "Editor".to_string();
    let updated = repo.update_post(created.id, form).await.expect("update");

    assert_eq!(updated.title, "Final");
    assert_eq!(updated.slug, "final");
    assert_eq!(updated.author, "Editor");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    // The old slug no longer resolves.
    assert!(matches!(
        repo.get_post_by_slug("draft").await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn test_update_to_own_slug_is_not_a_collision() {
    let repo = setup_repo().await;

    let created = repo.create_post(post_form("Keep", "keep")).await.unwrap();
    let result = repo.update_post(created.id, post_form("Keep II", "keep")).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_update_to_foreign_slug_is_duplicate() {
    let repo = setup_repo().await;

    repo.create_post(post_form("A", "a")).await.unwrap();
    let b = repo.create_post(post_form("B", "b")).await.unwrap();

    let result = repo.update_post(b.id, post_form("B", "a")).await;
    assert!(matches!(result, Err(AppError::DuplicateSlug)));

    // The collision must not have clobbered either post.
    assert_eq!(repo.get_post_by_slug("a").await.unwrap().title, "A");
    assert_eq!(repo.get_post_by_slug("b").await.unwrap().title, "B");
}

#[tokio::test]
async fn test_update_missing_post_is_not_found() {
    let repo = setup_repo().await;

    let result = repo.update_post(999, post_form("X", "x")).await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

// --- Content Store: Delete ---

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let repo = setup_repo().await;

    let created = repo.create_post(post_form("Gone", "gone")).await.unwrap();
    repo.delete_post(created.id).await.expect("delete");

    assert!(matches!(
        repo.get_post_by_id(created.id).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn test_double_delete_surfaces_not_found() {
    let repo = setup_repo().await;

    let created = repo.create_post(post_form("Once", "once")).await.unwrap();
    repo.delete_post(created.id).await.expect("first delete");

    // The second delete finds no row; the caller may treat this as already-done,
    // but the store reports it honestly.
    let second = repo.delete_post(created.id).await;
    assert!(matches!(second, Err(AppError::NotFound)));
}
