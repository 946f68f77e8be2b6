use esemos::{
    AppState, SessionManager,
    config::{AppConfig, Env},
    repository::{RepositoryState, SqliteRepository},
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// The asynchronous entry point for the application, responsible for
/// initializing all core components: Configuration, Logging, Database, Session
/// Manager, and the HTTP Server. Failures during initialization terminate the
/// process; per-request failures never do.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    // Loads .env file settings before configuration can be read.
    dotenv::dotenv().ok();
    // AppConfig::load() aborts on missing production secrets.
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // Prioritizes RUST_LOG, falling back to sensible defaults for development.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "esemos=debug,tower_http=info,axum=trace".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            // LOCAL: pretty output for human readability.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON output for ingestion by centralized log aggregators.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Database Initialization (sqlite)
    // Opens (or creates) the database file and builds the connection pool.
    let options = SqliteConnectOptions::new()
        .filename(&config.db_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .expect("FATAL: Failed to open sqlite database. Check DATABASE_PATH.");

    // 5. Schema & Seeding (Fail-Fast)
    // Tables are created idempotently; the administrator account is seeded on
    // first boot only.
    let repo = SqliteRepository::new(pool);
    repo.init_schema()
        .await
        .expect("FATAL: Failed to initialize database schema.");
    repo.seed_admin(&config)
        .await
        .expect("FATAL: Failed to seed administrator account.");
    let repo = Arc::new(repo) as RepositoryState;

    // 6. Unified State Assembly
    let sessions = SessionManager::new(&config.session_secret);
    let app_state = AppState {
        repo,
        sessions,
        config: config.clone(),
    };

    // 7. Router and Server Startup
    let app = esemos::create_router(app_state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("FATAL: Failed to bind listener.");

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on {addr}");

    // The long-running Axum server process.
    axum::serve(listener, app)
        .await
        .expect("FATAL: Server terminated unexpectedly.");
}
