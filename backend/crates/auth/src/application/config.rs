//! Application Configuration
//!
//! Read once at process start. `from_lookup` takes any key lookup so tests
//! never touch the process environment.

use std::path::PathBuf;
use std::str::FromStr;

use derive_more::Display;
use platform::cookie::CookieConfig;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

use crate::domain::entity::user_session::ExpirationPolicy;
use crate::error::{AuthError, AuthResult};

/// Default session cookie name
pub const DEFAULT_SESSION_NAME: &str = "_my_session_id";

/// Paths reachable without credentials
pub const DEFAULT_EXCLUDED_PATHS: [&str; 5] = [
    "/api/v1/status/",
    "/api/v1/unauthorized/",
    "/api/v1/forbidden/",
    "/api/v1/auth_session/login/",
    "/api/v1/reset_password/",
];

/// Authenticator variant selected at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AuthType {
    #[display("auth")]
    Base,
    #[display("basic_auth")]
    Basic,
    #[display("session_auth")]
    Session,
    #[display("session_exp_auth")]
    SessionExp,
    #[display("session_db_auth")]
    SessionDb,
}

impl AuthType {
    /// Whether the variant keeps server-side sessions
    pub fn supports_sessions(&self) -> bool {
        matches!(
            self,
            AuthType::Session | AuthType::SessionExp | AuthType::SessionDb
        )
    }
}

impl FromStr for AuthType {
    type Err = AuthError;

    fn from_str(s: &str) -> AuthResult<Self> {
        match s.trim() {
            "auth" => Ok(AuthType::Base),
            "basic_auth" => Ok(AuthType::Basic),
            "session_auth" => Ok(AuthType::Session),
            "session_exp_auth" => Ok(AuthType::SessionExp),
            "session_db_auth" => Ok(AuthType::SessionDb),
            other => Err(AuthError::Config(format!("unknown AUTH_TYPE: {other}"))),
        }
    }
}

/// Backing store for users and persisted sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum StoreKind {
    /// JSON files in `data_dir`
    #[default]
    #[display("file")]
    File,
    /// SQLite database at `database_url`
    #[display("sqlite")]
    Sqlite,
}

impl FromStr for StoreKind {
    type Err = AuthError;

    fn from_str(s: &str) -> AuthResult<Self> {
        match s.trim() {
            "file" => Ok(StoreKind::File),
            "sqlite" => Ok(StoreKind::Sqlite),
            other => Err(AuthError::Config(format!("unknown AUTH_STORE: {other}"))),
        }
    }
}

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Active authenticator; `None` disables the request filter
    pub auth_type: Option<AuthType>,
    /// Session cookie name
    pub session_cookie_name: String,
    /// Session lifetime in seconds, `<= 0` means no expiry
    pub session_duration_secs: i64,
    /// Exclusion patterns for `require_auth`
    pub excluded_paths: Vec<String>,
    pub store: StoreKind,
    /// Directory holding the JSON store files
    pub data_dir: PathBuf,
    pub database_url: String,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            auth_type: None,
            session_cookie_name: DEFAULT_SESSION_NAME.to_string(),
            session_duration_secs: 0,
            excluded_paths: DEFAULT_EXCLUDED_PATHS.iter().map(|p| p.to_string()).collect(),
            store: StoreKind::File,
            data_dir: PathBuf::from("."),
            database_url: "sqlite://auth.db?mode=rwc".to_string(),
            cookie_secure: false,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Load from the process environment
    pub fn from_env() -> AuthResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    ///
    /// Unknown `AUTH_TYPE` / `AUTH_STORE` values are rejected. An unparsable
    /// `SESSION_DURATION` falls back to 0 (no expiry).
    pub fn from_lookup<F>(lookup: F) -> AuthResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let auth_type = get("AUTH_TYPE").map(|v| v.parse()).transpose()?;
        let store = get("AUTH_STORE")
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(defaults.store);

        let session_duration_secs = match get("SESSION_DURATION") {
            Some(raw) => raw.trim().parse::<i64>().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid SESSION_DURATION, sessions will not expire");
                0
            }),
            None => 0,
        };

        let excluded_paths = match get("AUTH_EXCLUDED_PATHS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect(),
            None => defaults.excluded_paths,
        };

        let cookie_secure = get("COOKIE_SECURE")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.cookie_secure);

        Ok(Self {
            auth_type,
            session_cookie_name: get("SESSION_NAME").unwrap_or(defaults.session_cookie_name),
            session_duration_secs,
            excluded_paths,
            store,
            data_dir: get("AUTH_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            cookie_secure,
            cookie_same_site: defaults.cookie_same_site,
            password_pepper: get("PASSWORD_PEPPER").map(String::into_bytes),
        })
    }

    /// Session lifetime as a policy
    pub fn expiration_policy(&self) -> ExpirationPolicy {
        ExpirationPolicy::from_secs(self.session_duration_secs)
    }

    /// Cookie settings for issuing / clearing the session cookie
    pub fn cookie_config(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            same_site: self.cookie_same_site,
            ..CookieConfig::default()
        }
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AuthResult<AuthConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AuthConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.auth_type, None);
        assert_eq!(config.session_cookie_name, "_my_session_id");
        assert_eq!(config.session_duration_secs, 0);
        assert!(!config.expiration_policy().is_enabled());
        assert_eq!(config.excluded_paths.len(), 5);
        assert_eq!(config.store, StoreKind::File);
        assert!(config.pepper().is_none());
    }

    #[test]
    fn test_reads_variables() {
        let config = config(&[
            ("AUTH_TYPE", "session_db_auth"),
            ("SESSION_NAME", "sid"),
            ("SESSION_DURATION", "60"),
            ("AUTH_EXCLUDED_PATHS", "/a/, /b/*,"),
            ("AUTH_STORE", "sqlite"),
            ("COOKIE_SECURE", "true"),
        ])
        .unwrap();

        assert_eq!(config.auth_type, Some(AuthType::SessionDb));
        assert_eq!(config.session_cookie_name, "sid");
        assert_eq!(config.expiration_policy(), ExpirationPolicy::from_secs(60));
        assert_eq!(config.excluded_paths, vec!["/a/", "/b/*"]);
        assert_eq!(config.store, StoreKind::Sqlite);
        assert_eq!(config.cookie_config().name, "sid");
        assert!(config.cookie_config().secure);
    }

    #[test]
    fn test_invalid_duration_means_no_expiry() {
        let config = config(&[("SESSION_DURATION", "soon")]).unwrap();
        assert_eq!(config.session_duration_secs, 0);
    }

    #[test]
    fn test_unknown_auth_type_rejected() {
        assert!(matches!(
            config(&[("AUTH_TYPE", "oauth")]),
            Err(AuthError::Config(_))
        ));
    }

    #[test]
    fn test_auth_type_display_roundtrip() {
        for ty in [
            AuthType::Base,
            AuthType::Basic,
            AuthType::Session,
            AuthType::SessionExp,
            AuthType::SessionDb,
        ] {
            assert_eq!(ty.to_string().parse::<AuthType>().unwrap(), ty);
        }
        assert!(!AuthType::Basic.supports_sessions());
        assert!(AuthType::SessionExp.supports_sessions());
    }
}
