use crate::models::{NewUser, Role, SessionRecord, User};
use crate::password;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::{sync::RwLock, task::JoinHandle};
use uuid::Uuid;

/// RepoError
///
/// Persistence failures. `EmailTaken` is the only one a client can cause.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("email already registered")]
    EmailTaken,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Repository Trait
///
/// Abstract contract for account and session persistence. Handlers and the
/// session extractor only ever see `Arc<dyn Repository>`, so the Postgres and
/// in-memory backends are interchangeable.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    /// Looks a user up by normalized (trimmed, lowercased) email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, RepoError>;
    /// Fails with `RepoError::EmailTaken` when the email is already registered.
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError>;

    // --- Sessions ---
    async fn create_session(&self, session: SessionRecord) -> Result<(), RepoError>;
    /// Returns the record regardless of state; callers check `is_active`.
    async fn get_session(&self, id: Uuid) -> Result<Option<SessionRecord>, RepoError>;
    /// Returns true if an unrevoked session was revoked by this call.
    async fn revoke_session(&self, id: Uuid) -> Result<bool, RepoError>;
    /// Deletes every session that is revoked or expired at `now`. Returns the count removed.
    async fn purge_sessions(&self, now: DateTime<Utc>) -> Result<u64, RepoError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

fn parse_role(raw: &str) -> Result<Role, RepoError> {
    raw.parse::<Role>()
        .map_err(|e| RepoError::Corrupt(e.to_string()))
}

fn user_from_row(row: &PgRow) -> Result<User, RepoError> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        role: parse_role(&role)?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}

fn session_from_row(row: &PgRow) -> Result<SessionRecord, RepoError> {
    let role: String = row.try_get("role")?;
    Ok(SessionRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        first_name: row.try_get("first_name")?,
        role: parse_role(&role)?,
        created_at: row.try_get("created_at")?,
        expires_at: row.try_get("expires_at")?,
        revoked: row.try_get("revoked")?,
    })
}

/// PostgresRepository
///
/// `Repository` backed by PostgreSQL. Schema lives in `migrations/`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, first_name, last_name, email, role, password_hash, created_at";

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    /// create_user
    ///
    /// A unique-constraint violation on `users.email` maps to `EmailTaken`, so
    /// concurrent signups for the same address cannot both succeed.
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError> {
        let result = sqlx::query(&format!(
            "INSERT INTO users (id, first_name, last_name, email, role, password_hash, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW()) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => user_from_row(&row),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(RepoError::EmailTaken),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_session(&self, session: SessionRecord) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO sessions (id, user_id, first_name, role, created_at, expires_at, revoked) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(&session.first_name)
        .bind(session.role.as_str())
        .bind(session.created_at)
        .bind(session.expires_at)
        .bind(session.revoked)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<SessionRecord>, RepoError> {
        let row = sqlx::query(
            "SELECT id, user_id, first_name, role, created_at, expires_at, revoked \
             FROM sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(session_from_row).transpose()
    }

    async fn revoke_session(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("UPDATE sessions SET revoked = true WHERE id = $1 AND revoked = false")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge_sessions(&self, now: DateTime<Utc>) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM sessions WHERE revoked OR expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// spawn_session_purger
///
/// Background task that deletes dead sessions every `period`. Failures are
/// logged and retried on the next tick.
pub fn spawn_session_purger(repo: RepositoryState, period: std::time::Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            match repo.purge_sessions(Utc::now()).await {
                Ok(0) => {}
                Ok(purged) => tracing::debug!(purged, "purged dead sessions"),
                Err(e) => tracing::warn!(error = %e, "session purge failed"),
            }
        }
    })
}

/// DemoAccount
///
/// Seed credentials for local development without a database.
pub struct DemoAccount {
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub email: &'static str,
    pub password: &'static str,
    pub role: Role,
}

pub const DEMO_ACCOUNTS: &[DemoAccount] = &[
    DemoAccount {
        first_name: "Lena",
        last_name: "Learner",
        email: "learner@learnhub.dev",
        password: "learner-pass",
        role: Role::Learner,
    },
    DemoAccount {
        first_name: "Ivan",
        last_name: "Instructor",
        email: "instructor@learnhub.dev",
        password: "instructor-pass",
        role: Role::Instructor,
    },
    DemoAccount {
        first_name: "Ada",
        last_name: "Admin",
        email: "admin@learnhub.dev",
        password: "admin-pass",
        role: Role::Admin,
    },
];

/// InMemoryRepository
///
/// Process-local `Repository` used for local development and tests. Contents
/// are lost on restart.
#[derive(Default)]
pub struct InMemoryRepository {
    users: RwLock<HashMap<Uuid, User>>,
    sessions: RwLock<HashMap<Uuid, SessionRecord>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository pre-populated with `accounts`, hashing each password.
    pub fn seeded(accounts: &[DemoAccount]) -> Result<Self, argon2::password_hash::Error> {
        let mut users = HashMap::with_capacity(accounts.len());
        for account in accounts {
            let user = User {
                id: Uuid::new_v4(),
                first_name: account.first_name.to_string(),
                last_name: account.last_name.to_string(),
                email: account.email.to_string(),
                role: account.role,
                password_hash: password::hash(account.password)?,
                created_at: Utc::now(),
            };
            users.insert(user.id, user);
        }
        Ok(Self {
            users: RwLock::new(users),
            sessions: RwLock::default(),
        })
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(RepoError::EmailTaken);
        }
        let created = User {
            id: Uuid::new_v4(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn create_session(&self, session: SessionRecord) -> Result<(), RepoError> {
        self.sessions.write().await.insert(session.id, session);
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<SessionRecord>, RepoError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn revoke_session(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(session) if !session.revoked => {
                session.revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn purge_sessions(&self, now: DateTime<Utc>) -> Result<u64, RepoError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.is_active(now));
        Ok((before - sessions.len()) as u64)
    }
}
