//! Sign In Use Case
//!
//! Email + password login that opens a server-side session.

use std::sync::Arc;

use platform::password::{ClearTextPassword, CredentialVerifier};

use crate::application::authenticator::Authenticator;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Sign in input
#[derive(Debug, Default)]
pub struct SignInInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    pub user: User,
    /// Value for the session cookie
    pub session_id: String,
}

/// Sign in use case
pub struct SignInUseCase<U, A>
where
    U: UserRepository,
    A: Authenticator,
{
    user_repo: Arc<U>,
    authenticator: Arc<A>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl<U, A> SignInUseCase<U, A>
where
    U: UserRepository + Sync,
    A: Authenticator + Sync,
{
    pub fn new(user_repo: Arc<U>, authenticator: Arc<A>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            user_repo,
            authenticator,
            verifier,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let email = input
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or(AuthError::MissingField("email"))?;
        let password = input
            .password
            .filter(|p| !p.is_empty())
            .map(ClearTextPassword::new)
            .ok_or(AuthError::MissingField("password"))?;

        let email = Email::new(email).map_err(|_| AuthError::UserNotFound)?;
        let mut user = self
            .user_repo
            .search_by_email(&email)
            .await?
            .into_iter()
            .next()
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_valid_password(&password, self.verifier.as_ref()) {
            tracing::warn!(user_id = %user.id, "Sign in with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !self.authenticator.supports_sessions() {
            return Err(AuthError::SessionsUnsupported);
        }
        let session_id = self
            .authenticator
            .create_session(&user.id)
            .await
            .ok_or_else(|| AuthError::Internal("session could not be opened".to_string()))?;

        user.assign_session(Some(session_id.clone()));
        if let Err(e) = self.user_repo.save(&user).await {
            // Do not leave a session behind for a failed sign in
            self.authenticator.revoke_session(&session_id).await;
            return Err(e);
        }

        tracing::info!(user_id = %user.id, name = %user.display_name(), "User signed in");
        Ok(SignInOutput { user, session_id })
    }
}
