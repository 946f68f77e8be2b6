use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state. The struct is immutable once
/// loaded and shared across all services through the application state, so every
/// handler and store sees the same values for the lifetime of the process.
#[derive(Clone)]
pub struct AppConfig {
    // Path of the sqlite database file (created on first boot if absent).
    pub db_path: String,
    // TCP port the HTTP server binds to.
    pub port: u16,
    // Runtime environment marker. Controls log format and secret fallbacks.
    pub env: Env,
    // Secret key used to sign and validate session tokens.
    pub session_secret: String,
    // Username seeded for the administrator account on first boot.
    pub admin_username: String,
    // Password seeded (hashed) for the administrator account on first boot.
    pub admin_password: String,
}

/// Env
///
/// Defines the runtime context, used to switch between development conveniences
/// (pretty logs, fallback secrets) and hardened production behaviour.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// Fallback credentials seeded when no override is configured. Matches the
/// historical default; operators are warned at seed time to rotate it.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

const LOCAL_SESSION_SECRET: &str = "esemos-local-dev-session-secret";

impl Default for AppConfig {
    /// default
    ///
    /// Provides a safe, non-panicking AppConfig instance primarily used for test setup.
    /// This allows tests to build application state without touching the process
    /// environment.
    fn default() -> Self {
        Self {
            db_path: ":memory:".to_string(),
            port: 8080,
            env: Env::Local,
            session_secret: LOCAL_SESSION_SECRET.to_string(),
            admin_username: DEFAULT_ADMIN_USERNAME.to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// The canonical function for initializing the application configuration at startup.
    /// It reads all parameters from environment variables and implements the fail-fast
    /// principle.
    ///
    /// # Panics
    /// Panics if a critical environment variable required for the current runtime
    /// environment (especially Production) is not found. This prevents the application
    /// from starting with an incomplete or insecure configuration.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        // Session Secret Resolution
        // The production secret is mandatory and must be explicitly set; a predictable
        // signing key would let anyone forge an authenticated session cookie.
        let session_secret = match env {
            Env::Production => env::var("SESSION_SECRET")
                .expect("FATAL: SESSION_SECRET must be set in production."),
            _ => {
                env::var("SESSION_SECRET").unwrap_or_else(|_| LOCAL_SESSION_SECRET.to_string())
            }
        };

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        Self {
            env,
            db_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "esemos.db".to_string()),
            port,
            session_secret,
            admin_username: env::var("ADMIN_USERNAME")
                .unwrap_or_else(|_| DEFAULT_ADMIN_USERNAME.to_string()),
            admin_password: env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string()),
        }
    }
}
