//! Sign Out Use Case
//!
//! Destroys the session named by the request's cookie.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::application::authenticator::Authenticator;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

/// Sign out use case
pub struct SignOutUseCase<U, A>
where
    U: UserRepository,
    A: Authenticator,
{
    user_repo: Arc<U>,
    authenticator: Arc<A>,
}

impl<U, A> SignOutUseCase<U, A>
where
    U: UserRepository + Sync,
    A: Authenticator + Sync,
{
    pub fn new(user_repo: Arc<U>, authenticator: Arc<A>) -> Self {
        Self {
            user_repo,
            authenticator,
        }
    }

    /// `SessionNotFound` when there was nothing to destroy
    pub async fn execute(&self, headers: &HeaderMap) -> AuthResult<()> {
        // Resolve the owner first, the session is gone afterwards
        let user = self.authenticator.current_user(headers).await;

        if !self.authenticator.destroy_session(headers).await {
            return Err(AuthError::SessionNotFound);
        }

        if let Some(mut user) = user {
            let cookie = self.authenticator.session_cookie(headers);
            if user.session_id.is_some() && user.session_id == cookie {
                user.assign_session(None);
                self.user_repo.save(&user).await?;
            }
            tracing::info!(user_id = %user.id, "User signed out");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::authenticator::{AuthBase, SessionDbAuth};
    use crate::domain::entity::user::User;
    use crate::domain::entity::user_session::ExpirationPolicy;
    use crate::domain::value_object::{email::Email, user_password::UserPassword};
    use crate::infra::file::FileAuthRepository;
    use axum::http::{HeaderValue, header};
    use platform::password::{Argon2Verifier, ClearTextPassword};

    #[tokio::test]
    async fn test_sign_out_clears_session() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(FileAuthRepository::open(dir.path()).await.unwrap());
        let verifier = Argon2Verifier::default().with_cost(1024, 1).unwrap();
        let password = UserPassword::from_raw(&ClearTextPassword::new("secret"), &verifier).unwrap();
        let mut user = User::new(Email::new("a@b.com").unwrap(), password);

        let auth = Arc::new(SessionDbAuth::new(
            AuthBase::new(vec![], "_my_session_id"),
            repo.clone(),
            ExpirationPolicy::NEVER,
        ));
        let token = auth.create_session(&user.id).await.unwrap();
        user.assign_session(Some(token.clone()));
        repo.save(&user).await.unwrap();

        let mut headers = HeaderMap::new();
        let cookie = format!("_my_session_id={token}");
        headers.insert(header::COOKIE, HeaderValue::from_str(&cookie).unwrap());

        let use_case = SignOutUseCase::new(repo.clone(), auth.clone());
        use_case.execute(&headers).await.unwrap();

        assert_eq!(auth.user_id_for_session_id(&token).await, None);
        let stored = repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.session_id, None);

        assert!(matches!(
            use_case.execute(&headers).await,
            Err(AuthError::SessionNotFound)
        ));
        assert!(matches!(
            use_case.execute(&HeaderMap::new()).await,
            Err(AuthError::SessionNotFound)
        ));
    }
}
