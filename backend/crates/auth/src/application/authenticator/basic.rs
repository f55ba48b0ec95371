//! HTTP Basic authentication
//!
//! `Authorization: Basic base64(email:password)` resolved against the user
//! store. Every failure reads as "no user" to the caller.

use std::sync::Arc;

use axum::http::HeaderMap;
use platform::crypto::decode_base64_utf8;
use platform::password::{ClearTextPassword, CredentialVerifier};

use super::{AuthBase, Authenticator, accept};
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_id::UserId};
use crate::error::{AuthError, AuthResult};

const BASIC_PREFIX: &str = "Basic ";

/// Part of the header after `"Basic "`, not decoded
pub fn extract_base64_authorization_header(header: &str) -> Option<&str> {
    header.strip_prefix(BASIC_PREFIX)
}

/// Base64 payload as UTF-8 text, `None` when undecodable
pub fn decode_base64_authorization_header(b64: &str) -> Option<String> {
    decode_base64_utf8(b64)
}

/// Split `email:password`
///
/// The decoded text must hold exactly one `:`; either side may be empty.
pub fn extract_user_credentials(decoded: &str) -> Option<(&str, &str)> {
    if decoded.matches(':').count() != 1 {
        return None;
    }
    decoded.split_once(':')
}

/// Basic-auth authenticator
pub struct BasicAuth<U> {
    base: AuthBase,
    users: Arc<U>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl<U> BasicAuth<U>
where
    U: UserRepository + Send + Sync,
{
    pub fn new(base: AuthBase, users: Arc<U>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            base,
            users,
            verifier,
        }
    }

    /// User owning `email` if `password` matches its digest
    pub async fn user_object_from_credentials(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Option<User> {
        accept(self.verify_credentials(email, password).await)
    }

    async fn verify_credentials(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> AuthResult<User> {
        let (Some(email), Some(password)) = (email, password) else {
            return Err(AuthError::MissingCredentials);
        };

        // A blank email matches nobody
        let email = Email::new(email).map_err(|_| AuthError::UserNotFound)?;
        let user = self
            .users
            .search_by_email(&email)
            .await?
            .into_iter()
            .next()
            .ok_or(AuthError::UserNotFound)?;

        let password = ClearTextPassword::new(password);
        if !user.is_valid_password(&password, self.verifier.as_ref()) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    async fn resolve(&self, headers: &HeaderMap) -> AuthResult<User> {
        let header = self
            .base
            .authorization_header(headers)
            .ok_or(AuthError::MissingCredentials)?;
        let b64 = extract_base64_authorization_header(&header).ok_or(AuthError::MalformedHeader)?;
        let decoded =
            decode_base64_authorization_header(b64).ok_or(AuthError::MalformedCredentials)?;
        let (email, password) =
            extract_user_credentials(&decoded).ok_or(AuthError::MalformedCredentials)?;

        self.verify_credentials(Some(email), Some(password)).await
    }
}

impl<U> Authenticator for BasicAuth<U>
where
    U: UserRepository + Send + Sync,
{
    fn base(&self) -> &AuthBase {
        &self.base
    }

    async fn current_user(&self, headers: &HeaderMap) -> Option<User> {
        accept(self.resolve(headers).await)
    }

    async fn create_session(&self, _user_id: &UserId) -> Option<String> {
        AuthError::SessionsUnsupported.log_rejection();
        None
    }

    async fn user_id_for_session_id(&self, _session_id: &str) -> Option<UserId> {
        None
    }

    async fn destroy_session(&self, _headers: &HeaderMap) -> bool {
        false
    }

    async fn revoke_session(&self, _session_id: &str) -> bool {
        false
    }
}
