//! Session authentication backed by a persisted session store
//!
//! Tokens come from the same generator as [`SessionAuth`]; records live in a
//! [`UserSessionRepository`] and expire by their stored `created_at`. Store
//! failures read as "no session".

use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};

use super::session::load_user;
use super::{AuthBase, Authenticator, SessionAuth, accept};
use crate::domain::entity::{
    user::User,
    user_session::{ExpirationPolicy, UserSession},
};
use crate::domain::repository::{UserRepository, UserSessionRepository};
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Persisted-session authenticator
pub struct SessionDbAuth<R> {
    base: AuthBase,
    repo: Arc<R>,
    policy: ExpirationPolicy,
}

impl<R> SessionDbAuth<R>
where
    R: UserRepository + UserSessionRepository + Send + Sync,
{
    pub fn new(base: AuthBase, repo: Arc<R>, policy: ExpirationPolicy) -> Self {
        Self { base, repo, policy }
    }

    async fn persist_session(&self, user_id: &UserId, now: DateTime<Utc>) -> AuthResult<String> {
        let session_id = SessionAuth::<R>::generate_session_id();
        let session = UserSession::new_at(session_id.clone(), *user_id, now);
        UserSessionRepository::save(self.repo.as_ref(), &session).await?;

        tracing::debug!(user_id = %user_id, "Persisted session created");
        Ok(session_id)
    }

    /// Open a session created at `now`
    pub async fn create_session_at(&self, user_id: &UserId, now: DateTime<Utc>) -> Option<String> {
        accept(self.persist_session(user_id, now).await)
    }

    async fn first_session(&self, session_id: &str) -> AuthResult<UserSession> {
        self.repo
            .search_by_session_id(session_id)
            .await?
            .into_iter()
            .next()
            .ok_or(AuthError::SessionNotFound)
    }

    async fn live_user_id(&self, session_id: &str, now: DateTime<Utc>) -> AuthResult<UserId> {
        let session = self.first_session(session_id).await?;
        if session.is_expired_at(self.policy, now) {
            return Err(AuthError::SessionExpired);
        }
        Ok(session.user_id)
    }

    /// Owner of `session_id` if still alive at `now`
    pub async fn user_id_for_session_id_at(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Option<UserId> {
        accept(self.live_user_id(session_id, now).await)
    }

    async fn resolve(&self, headers: &HeaderMap) -> AuthResult<User> {
        let session_id = self
            .base
            .session_cookie(headers)
            .ok_or(AuthError::MissingCredentials)?;
        let user_id = self.live_user_id(&session_id, Utc::now()).await?;

        load_user(self.repo.as_ref(), &user_id).await
    }

    async fn remove_session(&self, session_id: &str) -> AuthResult<()> {
        let session = self.first_session(session_id).await?;

        if !UserSessionRepository::remove(self.repo.as_ref(), &session.session_id).await? {
            return Err(AuthError::SessionNotFound);
        }
        Ok(())
    }

    /// Drop persisted sessions that can no longer be used
    ///
    /// No-op when sessions never expire.
    pub async fn purge_expired(&self) -> AuthResult<u64> {
        let Some(cutoff) = self.policy.cutoff(Utc::now()) else {
            return Ok(0);
        };
        self.repo.purge_created_before(cutoff).await
    }
}

impl<R> Authenticator for SessionDbAuth<R>
where
    R: UserRepository + UserSessionRepository + Send + Sync,
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
        self.create_session_at(user_id, Utc::now()).await
    }

    async fn user_id_for_session_id(&self, session_id: &str) -> Option<UserId> {
        self.user_id_for_session_id_at(session_id, Utc::now()).await
    }

    async fn destroy_session(&self, headers: &HeaderMap) -> bool {
        let Some(session_id) = self.base.session_cookie(headers) else {
            AuthError::MissingCredentials.log_rejection();
            return false;
        };
        accept(self.remove_session(&session_id).await).is_some()
    }

    async fn revoke_session(&self, session_id: &str) -> bool {
        accept(self.remove_session(session_id).await).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::file::FileAuthRepository;
    use crate::infra::sqlite::SqliteAuthRepository;
    use axum::http::{HeaderValue, header};
    use chrono::Duration;

    fn cookie_headers(session_id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let value = format!("_my_session_id={session_id}");
        headers.insert(header::COOKIE, HeaderValue::from_str(&value).unwrap());
        headers
    }

    async fn file_auth(duration_secs: i64) -> (tempfile::TempDir, SessionDbAuth<FileAuthRepository>) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(FileAuthRepository::open(dir.path()).await.unwrap());
        let auth = SessionDbAuth::new(
            AuthBase::new(vec![], "_my_session_id"),
            repo,
            ExpirationPolicy::from_secs(duration_secs),
        );
        (dir, auth)
    }

    #[tokio::test]
    async fn test_create_then_lookup() {
        let (_dir, auth) = file_auth(60).await;
        let user_id = UserId::new();
        let token = auth.create_session(&user_id).await.unwrap();

        assert_eq!(auth.user_id_for_session_id(&token).await, Some(user_id));
        assert_eq!(auth.user_id_for_session_id("unknown").await, None);
    }

    #[tokio::test]
    async fn test_expiry_uses_stored_created_at() {
        let (_dir, auth) = file_auth(1).await;
        let user_id = UserId::new();
        let t = Utc::now();
        let token = auth.create_session_at(&user_id, t).await.unwrap();

        assert_eq!(auth.user_id_for_session_id_at(&token, t).await, Some(user_id));
        assert_eq!(
            auth.user_id_for_session_id_at(&token, t + Duration::seconds(2)).await,
            None
        );
    }

    #[tokio::test]
    async fn test_zero_duration_never_expires() {
        let (_dir, auth) = file_auth(0).await;
        let user_id = UserId::new();
        let t = Utc::now();
        let token = auth.create_session_at(&user_id, t).await.unwrap();

        let later = t + Duration::days(365 * 50);
        assert_eq!(auth.user_id_for_session_id_at(&token, later).await, Some(user_id));
    }

    #[tokio::test]
    async fn test_destroy_session() {
        let (_dir, auth) = file_auth(60).await;
        let token = auth.create_session(&UserId::new()).await.unwrap();

        assert!(!auth.destroy_session(&HeaderMap::new()).await);
        assert!(!auth.destroy_session(&cookie_headers("unknown")).await);
        assert!(auth.destroy_session(&cookie_headers(&token)).await);
        assert_eq!(auth.user_id_for_session_id(&token).await, None);
        assert!(!auth.destroy_session(&cookie_headers(&token)).await);

        let other = auth.create_session(&UserId::new()).await.unwrap();
        assert!(auth.revoke_session(&other).await);
        assert_eq!(auth.user_id_for_session_id(&other).await, None);
        assert!(!auth.revoke_session(&other).await);
    }

    #[tokio::test]
    async fn test_sessions_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let user_id = UserId::new();
        let token = {
            let repo = Arc::new(FileAuthRepository::open(dir.path()).await.unwrap());
            let auth = SessionDbAuth::new(
                AuthBase::new(vec![], "_my_session_id"),
                repo,
                ExpirationPolicy::NEVER,
            );
            auth.create_session(&user_id).await.unwrap()
        };

        let repo = Arc::new(FileAuthRepository::open(dir.path()).await.unwrap());
        let auth = SessionDbAuth::new(
            AuthBase::new(vec![], "_my_session_id"),
            repo,
            ExpirationPolicy::NEVER,
        );
        assert_eq!(auth.user_id_for_session_id(&token).await, Some(user_id));
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let (_dir, auth) = file_auth(60).await;
        let now = Utc::now();
        let old = auth
            .create_session_at(&UserId::new(), now - Duration::seconds(3600))
            .await
            .unwrap();
        let fresh = auth.create_session_at(&UserId::new(), now).await.unwrap();

        assert_eq!(auth.purge_expired().await.unwrap(), 1);
        assert!(auth.user_id_for_session_id(&old).await.is_none());
        assert!(auth.user_id_for_session_id(&fresh).await.is_some());
    }

    #[tokio::test]
    async fn test_store_failure_reads_as_no_session() {
        let repo = Arc::new(SqliteAuthRepository::connect("sqlite::memory:").await.unwrap());
        repo.init_schema().await.unwrap();
        let auth = SessionDbAuth::new(
            AuthBase::new(vec![], "_my_session_id"),
            repo.clone(),
            ExpirationPolicy::NEVER,
        );
        let token = auth.create_session(&UserId::new()).await.unwrap();

        repo.close().await;
        assert_eq!(auth.user_id_for_session_id(&token).await, None);
        assert!(!auth.destroy_session(&cookie_headers(&token)).await);
        assert!(auth.create_session(&UserId::new()).await.is_none());
    }
}
