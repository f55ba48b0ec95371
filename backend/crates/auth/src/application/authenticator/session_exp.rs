//! Session authentication with a lifetime
//!
//! Same table as [`SessionAuth`]; lookups reject sessions older than the
//! configured duration.

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};

use super::session::load_user;
use super::{AuthBase, Authenticator, SessionAuth, accept};
use crate::domain::entity::{user::User, user_session::ExpirationPolicy};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Expiring in-memory session authenticator
pub struct SessionExpAuth<U> {
    inner: SessionAuth<U>,
    policy: ExpirationPolicy,
}

impl<U> SessionExpAuth<U>
where
    U: UserRepository + Send + Sync,
{
    pub fn new(inner: SessionAuth<U>, policy: ExpirationPolicy) -> Self {
        Self { inner, policy }
    }

    /// See [`SessionAuth::create_session_at`]
    pub fn create_session_at(&self, user_id: &UserId, now: DateTime<Utc>) -> String {
        self.inner.create_session_at(user_id, now)
    }

    fn live_user_id(&self, session_id: &str, now: DateTime<Utc>) -> AuthResult<UserId> {
        let session = self.inner.find_session(session_id)?;
        if session.is_expired_at(self.policy, now) {
            return Err(AuthError::SessionExpired);
        }
        Ok(session.user_id)
    }

    /// Owner of `session_id` if still alive at `now`
    pub fn user_id_for_session_id_at(&self, session_id: &str, now: DateTime<Utc>) -> Option<UserId> {
        accept(self.live_user_id(session_id, now))
    }

    async fn resolve(&self, headers: &HeaderMap) -> AuthResult<User> {
        let session_id = self
            .base()
            .session_cookie(headers)
            .ok_or(AuthError::MissingCredentials)?;
        let user_id = self.live_user_id(&session_id, Utc::now())?;

        load_user(self.inner.users(), &user_id).await
    }
}

impl<U> Authenticator for SessionExpAuth<U>
where
    U: UserRepository + Send + Sync,
{
    fn base(&self) -> &AuthBase {
        self.inner.base()
    }

    fn supports_sessions(&self) -> bool {
        true
    }

    async fn current_user(&self, headers: &HeaderMap) -> Option<User> {
        accept(self.resolve(headers).await)
    }

    async fn create_session(&self, user_id: &UserId) -> Option<String> {
        Some(self.create_session_at(user_id, Utc::now()))
    }

    async fn user_id_for_session_id(&self, session_id: &str) -> Option<UserId> {
        self.user_id_for_session_id_at(session_id, Utc::now())
    }

    async fn destroy_session(&self, headers: &HeaderMap) -> bool {
        self.inner.destroy(headers)
    }

    async fn revoke_session(&self, session_id: &str) -> bool {
        self.inner.revoke(session_id)
    }
}
