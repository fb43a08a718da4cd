use crate::{
    AppState,
    auth::{self, AuthUser},
    error::AppError,
    models::{
        AuthResponse, ErrorResponse, LoginRequest, LogoutResponse, NewUser, Role,
        SessionResponse, SignupRequest, UserProfile,
    },
    navigation::{self, Decision},
    password,
    session::Session,
    validation,
};
use axum::{
    Json,
    extract::{OriginalUri, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

// --- Pages ---

/// render_page
///
/// [Page Route] Runs the navigation decision for the requested path. Rendered
/// views come back as a `ViewResponse`; denied views as a 303 to the guard's
/// fallback path.
pub async fn render_page(OriginalUri(uri): OriginalUri, session: Session) -> Response {
    let path = uri.path();
    let role = session.role();
    let first_name = session.identity().map(|identity| identity.first_name.as_str());

    match navigation::resolve(path, role) {
        Some(Decision::Render(view)) => {
            tracing::debug!(path, role = ?role, view = view.kind().name(), "render");
            Json(view.to_response(path, role, first_name)).into_response()
        }
        Some(Decision::Redirect { to, reason }) => {
            tracing::info!(path, role = ?role, reason = ?reason, redirect_to = to, "navigation denied");
            Redirect::to(to).into_response()
        }
        None => not_found(path),
    }
}

/// fallback
///
/// Paths outside the route table.
pub async fn fallback(OriginalUri(uri): OriginalUri) -> Response {
    not_found(uri.path())
}

fn not_found(path: &str) -> Response {
    tracing::debug!(path, "no route");
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("No view for path {path}"),
            fields: Vec::new(),
        }),
    )
        .into_response()
}

// --- Auth API ---

/// login
///
/// [Public Route] Verifies credentials, opens a session and returns the token
/// together with the role's landing path. Unknown email and wrong password
/// produce the same 401.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    validation::validate_login(&payload).map_err(AppError::Validation)?;

    let email = validation::normalize_email(&payload.email);
    let user = state.repo.find_user_by_email(&email).await?;
    // Unknown email and wrong password both pay for one argon2 verification.
    let verified = match &user {
        Some(user) => password::verify(&payload.password, &user.password_hash),
        None => {
            password::verify_decoy(&payload.password);
            false
        }
    };
    let user = user.filter(|_| verified).ok_or_else(|| {
        tracing::info!(email = %email, "login rejected");
        AppError::InvalidCredentials
    })?;

    let (transition, token) = auth::start_session(state.repo.as_ref(), &state.config, &user).await?;

    Ok(Json(AuthResponse {
        token,
        user: user.profile(),
        redirect_to: transition.navigate_to.to_string(),
    }))
}

/// signup
///
/// [Public Route] Registers a new Learner account and logs it in. Signup never
/// grants Instructor or Admin.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    validation::validate_signup(&payload).map_err(AppError::Validation)?;

    let new_user = NewUser {
        first_name: payload.first_name.trim().to_string(),
        last_name: payload.last_name.trim().to_string(),
        email: validation::normalize_email(&payload.email),
        role: Role::Learner,
        password_hash: password::hash(&payload.password)?,
    };
    let user = state.repo.create_user(new_user).await?;
    tracing::info!(user_id = %user.id, "account created");

    let (transition, token) = auth::start_session(state.repo.as_ref(), &state.config, &user).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.profile(),
            redirect_to: transition.navigate_to.to_string(),
        }),
    ))
}

/// logout
///
/// [Authenticated Route] Revokes the caller's session record. The token stops
/// resolving to a role immediately, so no view can show the old role.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = LogoutResponse),
        (status = 401, description = "No active session", body = ErrorResponse)
    )
)]
pub async fn logout(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<LogoutResponse>, AppError> {
    state.repo.revoke_session(identity.session_id).await?;
    tracing::info!(user_id = %identity.user_id, session_id = %identity.session_id, "session revoked");

    let transition = Session::Authenticated(identity).logout();
    Ok(Json(LogoutResponse {
        redirect_to: transition.navigate_to.to_string(),
    }))
}

/// get_me
///
/// [Authenticated Route] The caller's profile.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, description = "No active session", body = ErrorResponse)
    )
)]
pub async fn get_me(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, AppError> {
    let user = state
        .repo
        .get_user(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(user.profile()))
}

/// get_session
///
/// [Public Route] The current session role as views see it.
#[utoipa::path(
    get,
    path = "/api/session",
    responses((status = 200, description = "Current session", body = SessionResponse))
)]
pub async fn get_session(session: Session) -> Json<SessionResponse> {
    Json(SessionResponse {
        authenticated: session.is_authenticated(),
        role: session.role(),
        display_role: session.display_role(),
    })
}
