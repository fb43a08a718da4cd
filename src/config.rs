use std::env;

pub const DEFAULT_SESSION_TTL_SECS: i64 = 24 * 60 * 60;
pub const MAX_SESSION_TTL_SECS: i64 = 365 * 24 * 60 * 60;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
/// How often revoked and expired sessions are deleted.
pub const SESSION_PURGE_INTERVAL_SECS: u64 = 60 * 60;
const LOCAL_JWT_SECRET: &str = "learnhub-local-development-secret";

/// AppConfig
///
/// Immutable runtime configuration, loaded once at startup and pulled into
/// handlers and extractors through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Postgres connection string. `None` selects the in-memory repository (local only).
    pub db_url: Option<String>,
    pub env: Env,
    // HMAC secret used to sign and validate session tokens.
    pub jwt_secret: String,
    // Lifetime of a login session, in seconds.
    pub session_ttl_secs: i64,
    pub bind_addr: String,
}

/// Env
///
/// Runtime context. Production refuses to start without real secrets.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Test-safe configuration that needs no environment variables.
    fn default() -> Self {
        Self {
            db_url: None,
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in `Env::Production` when `DATABASE_URL` or `JWT_SECRET` is missing,
    /// and whenever `SESSION_TTL_SECS` is set but not in `1..=MAX_SESSION_TTL_SECS`.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let session_ttl_secs = match env::var("SESSION_TTL_SECS") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|ttl| (1..=MAX_SESSION_TTL_SECS).contains(ttl))
                .expect("FATAL: SESSION_TTL_SECS must be a positive integer of at most one year"),
            Err(_) => DEFAULT_SESSION_TTL_SECS,
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        match env {
            Env::Local => Self {
                env: Env::Local,
                db_url: env::var("DATABASE_URL").ok(),
                jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
                session_ttl_secs,
                bind_addr,
            },
            Env::Production => Self {
                env: Env::Production,
                db_url: Some(
                    env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod"),
                ),
                jwt_secret: env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production."),
                session_ttl_secs,
                bind_addr,
            },
        }
    }
}
