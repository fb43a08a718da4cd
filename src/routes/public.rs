use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that work with or without a session.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /api/auth/login
        // Credential check; returns token plus the role's landing path.
        .route("/api/auth/login", post(handlers::login))
        // POST /api/auth/signup
        // Creates a Learner account and logs it in.
        .route("/api/auth/signup", post(handlers::signup))
        // GET /api/session
        // Current role for views; anonymous callers get `authenticated: false`.
        .route("/api/session", get(handlers::get_session))
}
