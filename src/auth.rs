use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::AppError,
    models::{Role, SessionRecord, User},
    repository::{Repository, RepositoryState},
    session::{Session, SessionIdentity, Transition},
};

/// Claims
///
/// Payload of a LearnHub session token. The token only points at a session
/// record (`sid`); the role it grants is always re-read from that record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject: the user's id.
    pub sub: Uuid,
    /// Session record id.
    pub sid: Uuid,
    /// Role at login time, for clients. Not trusted server-side.
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, AppError> {
    let key = EncodingKey::from_secret(secret.as_bytes());
    Ok(encode(&Header::default(), claims, &key)?)
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<Claims>(token, &key, &validation).map(|data| data.claims)
}

/// start_session
///
/// Persists a new session record for `user`, applies the login transition and
/// signs the token handed back to the client.
pub async fn start_session(
    repo: &dyn Repository,
    config: &AppConfig,
    user: &User,
) -> Result<(Transition, String), AppError> {
    let now = Utc::now();
    let expires_at = Duration::try_seconds(config.session_ttl_secs)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or(AppError::SessionTtl(config.session_ttl_secs))?;
    let record = SessionRecord {
        id: Uuid::new_v4(),
        user_id: user.id,
        first_name: user.first_name.clone(),
        role: user.role,
        created_at: now,
        expires_at,
        revoked: false,
    };
    repo.create_session(record.clone()).await?;

    let claims = Claims {
        sub: record.user_id,
        sid: record.id,
        role: record.role,
        iat: now.timestamp() as usize,
        exp: record.expires_at.timestamp() as usize,
    };
    let token = issue_token(&claims, &config.jwt_secret)?;

    let transition = Session::Anonymous.login(SessionIdentity::from(&record));
    tracing::info!(
        user_id = %record.user_id,
        session_id = %record.id,
        role = %record.role,
        navigate_to = transition.navigate_to,
        "session started"
    );
    Ok((transition, token))
}

/// resolve_session
///
/// Maps validated claims to the session they point at. Anything short of an
/// active record belonging to `claims.sub` is `Anonymous`.
pub async fn resolve_session(
    repo: &dyn Repository,
    claims: &Claims,
    now: DateTime<Utc>,
) -> Result<Session, AppError> {
    let Some(record) = repo.get_session(claims.sid).await? else {
        return Ok(Session::Anonymous);
    };
    if record.user_id != claims.sub || !record.is_active(now) {
        tracing::debug!(session_id = %record.id, "session inactive or mismatched");
        return Ok(Session::Anonymous);
    }
    Ok(Session::Authenticated(SessionIdentity::from(&record)))
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Session Extractor Implementation
///
/// Every request gets a session: no token, a bad token or a dead session all
/// resolve to `Session::Anonymous`. Only repository failures reject.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // 1. Bearer Token Extraction
        let Some(token) = bearer_token(parts) else {
            return Ok(Session::Anonymous);
        };

        // 2. Token Validation (signature and exp)
        let config = AppConfig::from_ref(state);
        let claims = match decode_token(token, &config.jwt_secret) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring invalid session token");
                return Ok(Session::Anonymous);
            }
        };

        // 3. Session Record Lookup: the role comes from the record, never the token.
        let repo = RepositoryState::from_ref(state);
        resolve_session(repo.as_ref(), &claims, Utc::now()).await
    }
}

/// AuthUser
///
/// Extractor for endpoints that require a live session. Rejects anonymous
/// requests with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionIdentity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Session::from_request_parts(parts, state).await? {
            Session::Authenticated(identity) => Ok(AuthUser(identity)),
            Session::Anonymous => Err(AppError::Unauthorized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    fn claims(exp_offset: i64) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: Uuid::new_v4(),
            sid: Uuid::new_v4(),
            role: Role::Instructor,
            iat: now as usize,
            exp: (now + exp_offset) as usize,
        }
    }

    #[test]
    fn token_round_trips_claims() {
        let claims = claims(3600);
        let token = issue_token(&claims, SECRET).unwrap();
        assert_eq!(decode_token(&token, SECRET).unwrap(), claims);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(&claims(3600), SECRET).unwrap();
        assert!(decode_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Beyond the default 60s leeway.
        let token = issue_token(&claims(-600), SECRET).unwrap();
        assert!(decode_token(&token, SECRET).is_err());
    }
}
