use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Endpoints that need a live session. The router is wrapped in the auth
/// middleware in `create_router`, and each handler also takes `AuthUser`, so
/// an anonymous request never reaches handler logic.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /api/auth/logout
        // Revokes the session record backing the caller's token.
        .route("/api/auth/logout", post(handlers::logout))
        // GET /api/auth/me
        // Profile of the logged-in user.
        .route("/api/auth/me", get(handlers::get_me))
}
