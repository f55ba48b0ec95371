//! Authenticators
//!
//! One capability, five variants built by composition:
//!
//! | Variant          | Credentials          | Session table                 |
//! |------------------|----------------------|-------------------------------|
//! | `AuthBase`       | none                 | none                          |
//! | `BasicAuth`      | `Authorization` hdr  | none                          |
//! | `SessionAuth`    | session cookie       | in memory                     |
//! | `SessionExpAuth` | session cookie       | in memory, with expiry        |
//! | `SessionDbAuth`  | session cookie       | `UserSessionRepository`       |
//!
//! Internally each step returns `AuthResult`; the trait methods turn
//! failures into `None` / `false` and log the reason.

pub mod base;
pub mod basic;
pub mod capability;
pub mod session;
pub mod session_db;
pub mod session_exp;

use std::sync::Arc;

use axum::http::HeaderMap;
use platform::password::CredentialVerifier;

use crate::application::config::{AuthConfig, AuthType};
use crate::domain::entity::user::User;
use crate::domain::repository::{UserRepository, UserSessionRepository};
use crate::domain::value_object::user_id::UserId;
use crate::error::AuthResult;
use crate::infra::memory::MemorySessionStore;

pub use base::AuthBase;
pub use basic::BasicAuth;
pub use capability::Authenticator;
pub use session::SessionAuth;
pub use session_db::SessionDbAuth;
pub use session_exp::SessionExpAuth;

/// Collapse an internal result at the public boundary
pub(crate) fn accept<T>(result: AuthResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            e.log_rejection();
            None
        }
    }
}

/// Authenticator chosen once at startup
pub enum AnyAuthenticator<R> {
    Base(AuthBase),
    Basic(BasicAuth<R>),
    Session(SessionAuth<R>),
    SessionExp(SessionExpAuth<R>),
    SessionDb(SessionDbAuth<R>),
}

impl<R> AnyAuthenticator<R>
where
    R: UserRepository + UserSessionRepository + Send + Sync + 'static,
{
    /// Build the variant named by `config.auth_type`
    ///
    /// `None` when no authenticator is configured.
    pub fn from_config(
        config: &AuthConfig,
        repo: Arc<R>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Option<Self> {
        let auth_type = config.auth_type?;
        let base = AuthBase::from_config(config);
        let policy = config.expiration_policy();

        let authenticator = match auth_type {
            AuthType::Base => Self::Base(base),
            AuthType::Basic => Self::Basic(BasicAuth::new(base, repo, verifier)),
            AuthType::Session => Self::Session(SessionAuth::new(
                base,
                repo,
                Arc::new(MemorySessionStore::new()),
            )),
            AuthType::SessionExp => Self::SessionExp(SessionExpAuth::new(
                SessionAuth::new(base, repo, Arc::new(MemorySessionStore::new())),
                policy,
            )),
            AuthType::SessionDb => Self::SessionDb(SessionDbAuth::new(base, repo, policy)),
        };

        tracing::info!(
            auth_type = %auth_type,
            session_duration = policy.duration_secs(),
            "Authenticator configured"
        );
        Some(authenticator)
    }

    pub fn auth_type(&self) -> AuthType {
        match self {
            Self::Base(_) => AuthType::Base,
            Self::Basic(_) => AuthType::Basic,
            Self::Session(_) => AuthType::Session,
            Self::SessionExp(_) => AuthType::SessionExp,
            Self::SessionDb(_) => AuthType::SessionDb,
        }
    }
}

impl<R> Authenticator for AnyAuthenticator<R>
where
    R: UserRepository + UserSessionRepository + Send + Sync + 'static,
{
    fn base(&self) -> &AuthBase {
        match self {
            Self::Base(a) => a,
            Self::Basic(a) => a.base(),
            Self::Session(a) => a.base(),
            Self::SessionExp(a) => a.base(),
            Self::SessionDb(a) => a.base(),
        }
    }

    fn supports_sessions(&self) -> bool {
        self.auth_type().supports_sessions()
    }

    async fn current_user(&self, headers: &HeaderMap) -> Option<User> {
        match self {
            Self::Base(a) => a.current_user(headers).await,
            Self::Basic(a) => a.current_user(headers).await,
            Self::Session(a) => a.current_user(headers).await,
            Self::SessionExp(a) => a.current_user(headers).await,
            Self::SessionDb(a) => a.current_user(headers).await,
        }
    }

    async fn create_session(&self, user_id: &UserId) -> Option<String> {
        match self {
            Self::Base(a) => a.create_session(user_id).await,
            Self::Basic(a) => a.create_session(user_id).await,
            Self::Session(a) => a.create_session(user_id).await,
            Self::SessionExp(a) => a.create_session(user_id).await,
            Self::SessionDb(a) => a.create_session(user_id).await,
        }
    }

    async fn user_id_for_session_id(&self, session_id: &str) -> Option<UserId> {
        match self {
            Self::Base(a) => a.user_id_for_session_id(session_id).await,
            Self::Basic(a) => a.user_id_for_session_id(session_id).await,
            Self::Session(a) => a.user_id_for_session_id(session_id).await,
            Self::SessionExp(a) => a.user_id_for_session_id(session_id).await,
            Self::SessionDb(a) => a.user_id_for_session_id(session_id).await,
        }
    }

    async fn destroy_session(&self, headers: &HeaderMap) -> bool {
        match self {
            Self::Base(a) => a.destroy_session(headers).await,
            Self::Basic(a) => a.destroy_session(headers).await,
            Self::Session(a) => a.destroy_session(headers).await,
            Self::SessionExp(a) => a.destroy_session(headers).await,
            Self::SessionDb(a) => a.destroy_session(headers).await,
        }
    }

    async fn revoke_session(&self, session_id: &str) -> bool {
        match self {
            Self::Base(a) => a.revoke_session(session_id).await,
            Self::Basic(a) => a.revoke_session(session_id).await,
            Self::Session(a) => a.revoke_session(session_id).await,
            Self::SessionExp(a) => a.revoke_session(session_id).await,
            Self::SessionDb(a) => a.revoke_session(session_id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::file::FileAuthRepository;
    use platform::password::Argon2Verifier;

    #[tokio::test]
    async fn test_factory_selects_variant() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(FileAuthRepository::open(dir.path()).await.unwrap());
        let verifier: Arc<dyn CredentialVerifier> = Arc::new(Argon2Verifier::default());

        let none = AnyAuthenticator::from_config(&AuthConfig::default(), repo.clone(), verifier.clone());
        assert!(none.is_none());

        for ty in [
            AuthType::Base,
            AuthType::Basic,
            AuthType::Session,
            AuthType::SessionExp,
            AuthType::SessionDb,
        ] {
            let config = AuthConfig {
                auth_type: Some(ty),
                ..AuthConfig::default()
            };
            let auth = AnyAuthenticator::from_config(&config, repo.clone(), verifier.clone()).unwrap();
            assert_eq!(auth.auth_type(), ty);
            assert_eq!(auth.supports_sessions(), ty.supports_sessions());
            assert!(!auth.require_auth("/api/v1/status"));
            assert!(auth.require_auth("/api/v1/users"));
        }
    }

    #[tokio::test]
    async fn test_session_methods_unsupported_on_basic() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(FileAuthRepository::open(dir.path()).await.unwrap());
        let config = AuthConfig {
            auth_type: Some(AuthType::Basic),
            ..AuthConfig::default()
        };
        let auth =
            AnyAuthenticator::from_config(&config, repo, Arc::new(Argon2Verifier::default())).unwrap();

        assert!(auth.create_session(&UserId::new()).await.is_none());
        assert!(!auth.destroy_session(&HeaderMap::new()).await);
        assert!(!auth.revoke_session("abc").await);
    }
}
