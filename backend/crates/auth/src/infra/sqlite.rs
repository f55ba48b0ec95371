//! SQLite Repository Implementations

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::domain::entity::{user::User, user_session::UserSession};
use crate::domain::repository::{UserRepository, UserSessionRepository};
use crate::domain::value_object::{email::Email, user_id::UserId, user_password::UserPassword};
use crate::error::{AuthError, AuthResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_digest TEXT NOT NULL,
    first_name TEXT,
    last_name TEXT,
    session_id TEXT,
    reset_token TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_sessions (
    session_id TEXT PRIMARY KEY NOT NULL,
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_user_sessions_created_at ON user_sessions (created_at);
"#;

/// SQLite-backed auth repository
#[derive(Clone)]
pub struct SqliteAuthRepository {
    pool: SqlitePool,
}

impl SqliteAuthRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to `url`, creating the database file if needed
    ///
    /// An in-memory database lives in a single pinned connection.
    pub async fn connect(url: &str) -> AuthResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        Ok(Self::new(pool))
    }

    /// Create tables if absent
    pub async fn init_schema(&self) -> AuthResult<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        tracing::info!("Auth schema ready");
        Ok(())
    }

    /// Close the pool; later calls fail
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn map_unique_violation(err: sqlx::Error) -> AuthError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AuthError::EmailTaken,
        _ => AuthError::Database(err),
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for SqliteAuthRepository {
    async fn save(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id,
                email,
                password_digest,
                first_name,
                last_name,
                session_id,
                reset_token,
                created_at,
                updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                email = excluded.email,
                password_digest = excluded.password_digest,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                session_id = excluded.session_id,
                reset_token = excluded.reset_token,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user.id.to_string())
        .bind(user.email.as_str())
        .bind(user.password.as_str())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.session_id)
        .bind(&user.reset_token)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_digest, first_name, last_name,
                   session_id, reset_token, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn search_by_email(&self, email: &Email) -> AuthResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_digest, first_name, last_name,
                   session_id, reset_token, created_at, updated_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_user()).collect()
    }

    async fn all(&self) -> AuthResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_digest, first_name, last_name,
                   session_id, reset_token, created_at, updated_at
            FROM users
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_user()).collect()
    }

    async fn count(&self) -> AuthResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn remove(&self, user_id: &UserId) -> AuthResult<bool> {
        let deleted = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }
}

// ============================================================================
// User Session Repository Implementation
// ============================================================================

impl UserSessionRepository for SqliteAuthRepository {
    async fn save(&self, session: &UserSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_sessions (session_id, user_id, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&session.session_id)
        .bind(session.user_id.to_string())
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn search_by_session_id(&self, session_id: &str) -> AuthResult<Vec<UserSession>> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT session_id, user_id, created_at
            FROM user_sessions
            WHERE session_id = ?
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_session()).collect()
    }

    async fn remove(&self, session_id: &str) -> AuthResult<bool> {
        let deleted = sqlx::query("DELETE FROM user_sessions WHERE session_id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }

    async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM user_sessions WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Purged expired user sessions");
        Ok(deleted)
    }
}

// ============================================================================
// Row Types
// ============================================================================

fn parse_user_id(raw: &str) -> AuthResult<UserId> {
    UserId::from_str(raw).map_err(|e| AuthError::Internal(format!("Invalid user id: {}", e)))
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_digest: String,
    first_name: Option<String>,
    last_name: Option<String>,
    session_id: Option<String>,
    reset_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        Ok(User {
            id: parse_user_id(&self.id)?,
            email: Email::from_db(self.email),
            password: UserPassword::from_db(self.password_digest)?,
            first_name: self.first_name,
            last_name: self.last_name,
            session_id: self.session_id,
            reset_token: self.reset_token,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: String,
    user_id: String,
    created_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> AuthResult<UserSession> {
        Ok(UserSession::new_at(
            self.session_id,
            parse_user_id(&self.user_id)?,
            self.created_at,
        ))
    }
}
