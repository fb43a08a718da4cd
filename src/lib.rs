use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod navigation;
pub mod password;
pub mod repository;
pub mod session;
pub mod validation;

pub mod routes;
use auth::AuthUser;
use routes::{authenticated, pages, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::AppError;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use session::Session;

/// ApiDoc
///
/// OpenAPI document for the auth and session API, served at
/// `/api-docs/openapi.json`. Page routes return `ViewResponse` or a redirect
/// and are described by the route table rather than listed here.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::signup, handlers::logout,
        handlers::get_me, handlers::get_session
    ),
    components(
        schemas(
            models::Role, models::LoginRequest, models::SignupRequest, models::UserProfile,
            models::AuthResponse, models::LogoutResponse, models::SessionResponse,
            models::ViewResponse, models::NavLink, models::FieldError, models::ErrorResponse,
        )
    ),
    tags(
        (name = "learnhub", description = "LearnHub navigation and auth API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, cheaply clonable application state. Holds no session data: the
/// session of a request is always derived from its token and the repository.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub config: AppConfig,
}

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Rejects requests without a live session before they reach the
/// authenticated routes. The `AuthUser` extractor does the work; its rejection
/// (401) short-circuits the request.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles pages, public API, authenticated API, docs and the observability
/// layers into one router.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name used for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Swagger UI over the generated OpenAPI document.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Pages: access is decided per request by the route table, not by a layer.
        .merge(pages::page_routes())
        .merge(public::public_routes())
        // Authenticated API: `auth_middleware` rejects anonymous callers with 401.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .fallback(handlers::fallback)
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a UUID per incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: one span per request, tagged with its ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echo x-request-id on the response.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer (outermost)
        .layer(cors)
}

/// trace_span_logger
///
/// Request span carrying method, URI and the `x-request-id` set by the layer
/// above, so every log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
