//! Base authenticator: path exclusion and credential extraction
//!
//! Every variant embeds an [`AuthBase`]; on its own it never resolves a user.

use axum::http::{HeaderMap, header};
use platform::cookie::extract_cookie;

use super::Authenticator;
use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::value_object::user_id::UserId;
use crate::error::AuthError;

/// Whether `path` needs authentication given `excluded_paths`
///
/// Patterns are trimmed. A trailing `*` or `/` is dropped and the rest must
/// be a prefix of `path`, so `/api/v1/status/` excludes `/api/v1/status`,
/// `/api/v1/status/` and also `/api/v1/status/anything`.
pub fn require_auth(path: &str, excluded_paths: &[String]) -> bool {
    if path.is_empty() || excluded_paths.is_empty() {
        return true;
    }

    !excluded_paths
        .iter()
        .map(|pattern| pattern.trim())
        .filter(|pattern| !pattern.is_empty())
        .any(|pattern| path.starts_with(exclusion_prefix(pattern)))
}

fn exclusion_prefix(pattern: &str) -> &str {
    pattern
        .strip_suffix('*')
        .or_else(|| pattern.strip_suffix('/'))
        .unwrap_or(pattern)
}

/// Shared authentication contract
#[derive(Debug, Clone)]
pub struct AuthBase {
    excluded_paths: Vec<String>,
    cookie_name: String,
}

impl AuthBase {
    pub fn new(excluded_paths: Vec<String>, cookie_name: impl Into<String>) -> Self {
        Self {
            excluded_paths,
            cookie_name: cookie_name.into(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.excluded_paths.clone(), config.session_cookie_name.clone())
    }

    /// See [`require_auth`]
    pub fn require_auth(&self, path: &str) -> bool {
        require_auth(path, &self.excluded_paths)
    }

    /// Raw `Authorization` header value
    pub fn authorization_header(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(String::from)
    }

    /// Value of the configured session cookie
    pub fn session_cookie(&self, headers: &HeaderMap) -> Option<String> {
        extract_cookie(headers, &self.cookie_name)
    }
}

impl Authenticator for AuthBase {
    fn base(&self) -> &AuthBase {
        self
    }

    async fn current_user(&self, _headers: &HeaderMap) -> Option<User> {
        None
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
