//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Configuration, authenticators, use cases
//! - `infra/` - Session table, JSON file store, SQLite store
//! - `presentation/` - Request filter, HTTP handlers, DTOs, router
//!
//! ## Authenticators
//! Selected once at startup from `AUTH_TYPE`:
//! - `auth` - path exclusion only, never resolves a user
//! - `basic_auth` - `Authorization: Basic` email/password
//! - `session_auth` - session cookie, in-memory table
//! - `session_exp_auth` - same, with `SESSION_DURATION`
//! - `session_db_auth` - session cookie, persisted sessions
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, never stored or logged in clear
//! - Session ids are UUID v4 tokens
//! - Every failed authentication looks the same to the caller

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::authenticator::{AnyAuthenticator, Authenticator};
pub use application::config::{AuthConfig, AuthType, StoreKind};
pub use error::{AuthError, AuthResult};
pub use infra::{FileAuthRepository, SqliteAuthRepository};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

#[cfg(test)]
mod tests;
