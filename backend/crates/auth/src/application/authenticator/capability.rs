//! Authentication capability

use axum::http::HeaderMap;

use super::AuthBase;
use crate::domain::entity::user::User;
use crate::domain::value_object::user_id::UserId;

/// Authentication capability
///
/// Variants without sessions answer `None` / `false` to the session methods.
#[trait_variant::make(Authenticator: Send)]
pub trait LocalAuthenticator {
    /// Shared path / header / cookie handling
    fn base(&self) -> &AuthBase;

    /// Whether `path` needs authentication
    fn require_auth(&self, path: &str) -> bool {
        self.base().require_auth(path)
    }

    fn authorization_header(&self, headers: &HeaderMap) -> Option<String> {
        self.base().authorization_header(headers)
    }

    fn session_cookie(&self, headers: &HeaderMap) -> Option<String> {
        self.base().session_cookie(headers)
    }

    /// Whether `create_session` can ever succeed
    fn supports_sessions(&self) -> bool {
        false
    }

    /// Resolve the request's credentials to a user
    async fn current_user(&self, headers: &HeaderMap) -> Option<User>;

    /// Open a session for `user_id`, returns the token
    async fn create_session(&self, user_id: &UserId) -> Option<String>;

    /// User owning a live session
    async fn user_id_for_session_id(&self, session_id: &str) -> Option<UserId>;

    /// Close the session named by the request's cookie
    async fn destroy_session(&self, headers: &HeaderMap) -> bool;

    /// Close a session by id
    async fn revoke_session(&self, session_id: &str) -> bool;
}
