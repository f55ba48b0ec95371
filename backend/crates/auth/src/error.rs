//! Auth Error Types
//!
//! Every internal step of the engine returns [`AuthResult`]. Public
//! authenticator operations collapse these into `None` / `false` (see
//! [`AuthError::log_rejection`]); HTTP handlers render them through the
//! unified `kernel::error::AppError`.

use axum::http::StatusCode;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::PasswordHashError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Neither an Authorization header nor a session cookie was sent
    #[error("Unauthorized")]
    MissingCredentials,

    /// Authorization header present but not `Basic <base64>`
    #[error("Malformed Authorization header")]
    MalformedHeader,

    /// Decoded Basic payload is not `email:password`
    #[error("Malformed credentials")]
    MalformedCredentials,

    /// No user for the given email or id
    #[error("no user found for this email")]
    UserNotFound,

    /// Password does not match the stored digest
    #[error("wrong password")]
    InvalidCredentials,

    /// Session id unknown to the store
    #[error("Session not found")]
    SessionNotFound,

    /// Session found but past its lifetime
    #[error("Session expired")]
    SessionExpired,

    /// Active authenticator has no session support
    #[error("Sessions are not supported by this authenticator")]
    SessionsUnsupported,

    /// Email already registered
    #[error("email already registered")]
    EmailTaken,

    /// Unknown email or stale token on password reset
    #[error("Forbidden")]
    ResetRefused,

    /// Required request field missing or empty
    #[error("{0} missing")]
    MissingField(&'static str),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Password hashing failure
    #[error("Password hashing error: {0}")]
    Password(#[from] PasswordHashError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store file could not be read or written
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Store file content could not be (de)serialized
    #[error("Storage format error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingCredentials | AuthError::InvalidCredentials => {
                ErrorKind::Unauthorized
            }
            AuthError::MalformedHeader
            | AuthError::MalformedCredentials
            | AuthError::SessionNotFound
            | AuthError::SessionExpired
            | AuthError::ResetRefused => ErrorKind::Forbidden,
            AuthError::UserNotFound | AuthError::SessionsUnsupported => ErrorKind::NotFound,
            AuthError::EmailTaken | AuthError::MissingField(_) => ErrorKind::BadRequest,
            AuthError::Database(sqlx::Error::PoolTimedOut) => ErrorKind::ServiceUnavailable,
            AuthError::Config(_)
            | AuthError::Password(_)
            | AuthError::Database(_)
            | AuthError::Io(_)
            | AuthError::Serialization(_)
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Whether the error comes from the backing store rather than the caller
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            AuthError::Database(_) | AuthError::Io(_) | AuthError::Serialization(_)
        )
    }

    /// Convert to AppError
    ///
    /// Server-side details stay in the logs; the client sees the reason phrase.
    pub fn to_app_error(&self) -> AppError {
        let kind = self.kind();
        if kind.is_server_error() {
            AppError::from_kind(kind)
        } else {
            AppError::new(kind, self.to_string())
        }
    }

    /// Record why a request could not be authenticated
    ///
    /// Callers only ever learn "no user"; the reason lives here.
    pub fn log_rejection(&self) {
        if self.is_storage_failure() {
            tracing::warn!(error = %self, "Auth store failure treated as unauthenticated");
        } else {
            tracing::debug!(reason = %self, "Request not authenticated");
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Io(e) => {
                tracing::error!(error = %e, "Auth store I/O error");
            }
            AuthError::Internal(msg) | AuthError::Config(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        err.log();
        let app = err.to_app_error();
        if app.is_server_error() {
            app.with_source(err)
        } else {
            app
        }
    }
}
