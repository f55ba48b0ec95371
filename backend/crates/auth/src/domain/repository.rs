//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};

use crate::domain::entity::{user::User, user_session::UserSession};
use crate::domain::value_object::{email::Email, user_id::UserId};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert or update a user
    ///
    /// Fails with `EmailTaken` when another user already owns the email.
    async fn save(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Users with this email (zero or one)
    async fn search_by_email(&self, email: &Email) -> AuthResult<Vec<User>>;

    /// All users
    async fn all(&self) -> AuthResult<Vec<User>>;

    /// Number of users
    async fn count(&self) -> AuthResult<u64>;

    /// Delete a user, returns whether it existed
    async fn remove(&self, user_id: &UserId) -> AuthResult<bool>;
}

/// User session repository trait
#[trait_variant::make(UserSessionRepository: Send)]
pub trait LocalUserSessionRepository {
    /// Persist a new session
    async fn save(&self, session: &UserSession) -> AuthResult<()>;

    /// Sessions with this id (zero or one)
    async fn search_by_session_id(&self, session_id: &str) -> AuthResult<Vec<UserSession>>;

    /// Delete a session, returns whether it existed
    async fn remove(&self, session_id: &str) -> AuthResult<bool>;

    /// Delete sessions created before `cutoff`
    async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> AuthResult<u64>;
}

/// Everything the HTTP layer needs from a store
pub trait AuthStore: UserRepository + UserSessionRepository + Send + Sync + 'static {}

impl<T> AuthStore for T where T: UserRepository + UserSessionRepository + Send + Sync + 'static {}
