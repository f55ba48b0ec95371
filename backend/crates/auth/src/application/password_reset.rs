//! Password Reset Use Case
//!
//! Two steps: issue a one-time token for an email, then trade the token for
//! a new password.

use std::sync::Arc;

use platform::crypto::generate_session_token;
use platform::password::{ClearTextPassword, CredentialVerifier};

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_password::UserPassword};
use crate::error::{AuthError, AuthResult};

/// Password update input
#[derive(Debug, Default)]
pub struct UpdatePasswordInput {
    pub email: Option<String>,
    pub reset_token: Option<String>,
    pub new_password: Option<String>,
}

/// Password reset use case
pub struct PasswordResetUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl<U> PasswordResetUseCase<U>
where
    U: UserRepository + Sync,
{
    pub fn new(user_repo: Arc<U>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            user_repo,
            verifier,
        }
    }

    async fn find_user(&self, email: &str) -> AuthResult<User> {
        let email = Email::new(email).map_err(|_| AuthError::ResetRefused)?;
        self.user_repo
            .search_by_email(&email)
            .await?
            .into_iter()
            .next()
            .ok_or(AuthError::ResetRefused)
    }

    /// Issue a reset token, replacing any pending one
    pub async fn request_token(&self, email: Option<String>) -> AuthResult<(User, String)> {
        let email = email
            .filter(|e| !e.trim().is_empty())
            .ok_or(AuthError::MissingField("email"))?;
        let mut user = self.find_user(&email).await?;

        let token = generate_session_token();
        user.set_reset_token(Some(token.clone()));
        self.user_repo.save(&user).await?;

        tracing::info!(user_id = %user.id, "Password reset token issued");
        Ok((user, token))
    }

    /// Replace the password of the user holding `reset_token`
    pub async fn update_password(&self, input: UpdatePasswordInput) -> AuthResult<User> {
        let email = input
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or(AuthError::MissingField("email"))?;
        let token = input
            .reset_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingField("reset_token"))?;
        let new_password = input
            .new_password
            .filter(|p| !p.is_empty())
            .map(ClearTextPassword::new)
            .ok_or(AuthError::MissingField("new_password"))?;

        let mut user = self.find_user(&email).await?;
        if !user.has_reset_token(&token) {
            return Err(AuthError::ResetRefused);
        }

        user.set_password(UserPassword::from_raw(&new_password, self.verifier.as_ref())?);
        user.set_reset_token(None);
        self.user_repo.save(&user).await?;

        tracing::info!(user_id = %user.id, "Password updated");
        Ok(user)
    }
}
