use learnhub::{
    AppState,
    config::{AppConfig, Env, SESSION_PURGE_INTERVAL_SECS},
    create_router,
    repository::{
        DEMO_ACCOUNTS, InMemoryRepository, PostgresRepository, RepositoryState,
        spawn_session_purger,
    },
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, installs logging, picks the repository backend and
/// serves the router.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise debug for this crate, info for tower_http.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "learnhub=debug,tower_http=info".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            // LOCAL: Pretty print output for human readability.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON lines for the log aggregator.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("LearnHub starting in {:?} mode", config.env);

    // 4. Repository Initialization
    // Postgres when DATABASE_URL is set, otherwise the seeded in-memory store.
    let repo = match &config.db_url {
        Some(db_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(db_url)
                .await
                .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("FATAL: Failed to apply database migrations.");

            Arc::new(PostgresRepository::new(pool)) as RepositoryState
        }
        None => {
            // Only reachable in Env::Local; production requires DATABASE_URL.
            let repo = InMemoryRepository::seeded(DEMO_ACCOUNTS)
                .expect("FATAL: Failed to hash demo account passwords.");
            for account in DEMO_ACCOUNTS {
                tracing::info!(email = account.email, role = %account.role, "demo account available");
            }
            Arc::new(repo) as RepositoryState
        }
    };

    // 5. Session Housekeeping
    spawn_session_purger(repo.clone(), Duration::from_secs(SESSION_PURGE_INTERVAL_SECS));

    // 6. Router and Server Startup
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState { repo, config });

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind listener. Check BIND_ADDR.");

    tracing::info!("Listening on {bind_addr}");
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server terminated");
    }
}
