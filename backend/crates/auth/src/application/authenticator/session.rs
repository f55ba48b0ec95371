//! Session authentication (in memory)
//!
//! Session cookie -> user id through a process-local table. Sessions never
//! expire here; see `SessionExpAuth` for a lifetime.

use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use platform::crypto::generate_session_token;

use super::{AuthBase, Authenticator, accept};
use crate::domain::entity::{user::User, user_session::UserSession};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};
use crate::infra::memory::MemorySessionStore;

/// Load the user a session points at
pub(crate) async fn load_user<U>(users: &U, user_id: &UserId) -> AuthResult<User>
where
    U: UserRepository + Sync,
{
    users
        .find_by_id(user_id)
        .await?
        .ok_or(AuthError::UserNotFound)
}

/// In-memory session authenticator
pub struct SessionAuth<U> {
    base: AuthBase,
    users: Arc<U>,
    sessions: Arc<MemorySessionStore>,
}

impl<U> SessionAuth<U>
where
    U: UserRepository + Send + Sync,
{
    pub fn new(base: AuthBase, users: Arc<U>, sessions: Arc<MemorySessionStore>) -> Self {
        Self {
            base,
            users,
            sessions,
        }
    }

    /// Fresh unpredictable session id
    pub fn generate_session_id() -> String {
        generate_session_token()
    }

    pub fn users(&self) -> &U {
        &self.users
    }

    /// Open a session created at `now`
    pub fn create_session_at(&self, user_id: &UserId, now: DateTime<Utc>) -> String {
        let session_id = Self::generate_session_id();
        self.sessions
            .insert(UserSession::new_at(session_id.clone(), *user_id, now));

        tracing::debug!(
            user_id = %user_id,
            active_sessions = self.sessions.len(),
            "Session created"
        );
        session_id
    }

    /// Stored session, regardless of age
    pub fn find_session(&self, session_id: &str) -> AuthResult<UserSession> {
        self.sessions
            .get(session_id)
            .ok_or(AuthError::SessionNotFound)
    }

    fn remove_session(&self, session_id: &str) -> AuthResult<()> {
        if !self.sessions.remove(session_id) {
            return Err(AuthError::SessionNotFound);
        }
        Ok(())
    }

    async fn resolve(&self, headers: &HeaderMap) -> AuthResult<User> {
        let session_id = self
            .base
            .session_cookie(headers)
            .ok_or(AuthError::MissingCredentials)?;
        let session = self.find_session(&session_id)?;

        load_user(self.users.as_ref(), &session.user_id).await
    }

    /// Remove the session named by the request's cookie
    pub(crate) fn destroy(&self, headers: &HeaderMap) -> bool {
        let removed = self
            .base
            .session_cookie(headers)
            .ok_or(AuthError::MissingCredentials)
            .and_then(|session_id| self.remove_session(&session_id));
        accept(removed).is_some()
    }

    pub(crate) fn revoke(&self, session_id: &str) -> bool {
        accept(self.remove_session(session_id)).is_some()
    }
}

impl<U> Authenticator for SessionAuth<U>
where
    U: UserRepository + Send + Sync,
{
    fn base(&self) -> &AuthBase {
        &self.base
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
        accept(self.find_session(session_id)).map(|session| session.user_id)
    }

    async fn destroy_session(&self, headers: &HeaderMap) -> bool {
        self.destroy(headers)
    }

    async fn revoke_session(&self, session_id: &str) -> bool {
        self.revoke(session_id)
    }
}
