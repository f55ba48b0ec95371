//! Sign Up Use Case
//!
//! Registers a new user with email + password.

use std::sync::Arc;

use platform::password::{ClearTextPassword, CredentialVerifier};

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_password::UserPassword};
use crate::error::{AuthError, AuthResult};

/// Sign up input
#[derive(Debug, Default)]
pub struct SignUpInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Sign up use case
pub struct SignUpUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl<U> SignUpUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            user_repo,
            verifier,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<User> {
        let email = input
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or(AuthError::MissingField("email"))?;
        let password = input
            .password
            .filter(|p| !p.is_empty())
            .map(ClearTextPassword::new)
            .ok_or(AuthError::MissingField("password"))?;

        let email = Email::new(email)?;
        if !self.user_repo.search_by_email(&email).await?.is_empty() {
            return Err(AuthError::EmailTaken);
        }

        let password = UserPassword::from_raw(&password, self.verifier.as_ref())?;
        let mut user = User::new(email, password);
        if input.first_name.is_some() || input.last_name.is_some() {
            user.set_name(input.first_name, input.last_name);
        }

        // The store re-checks uniqueness for concurrent sign ups
        self.user_repo.save(&user).await?;

        tracing::info!(user_id = %user.id, name = %user.display_name(), "User signed up");
        Ok(user)
    }
}
