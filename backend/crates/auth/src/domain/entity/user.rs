//! User Entity

use chrono::{DateTime, Utc};
use platform::password::{ClearTextPassword, CredentialVerifier};

use crate::domain::value_object::{email::Email, user_id::UserId, user_password::UserPassword};

/// User entity
///
/// `email` is unique across the store; `password` only ever holds a digest.
#[derive(Debug, Clone)]
pub struct User {
    /// Stable identifier (UUID v4)
    pub id: UserId,
    /// Login identifier, unique
    pub email: Email,
    /// Password digest
    pub password: UserPassword,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Legacy single-session pointer
    pub session_id: Option<String>,
    /// Pending password reset token
    pub reset_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user
    pub fn new(email: Email, password: UserPassword) -> Self {
        let now = Utc::now();

        Self {
            id: UserId::new(),
            email,
            password,
            first_name: None,
            last_name: None,
            session_id: None,
            reset_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check a clear text password against the stored digest
    pub fn is_valid_password(
        &self,
        password: &ClearTextPassword,
        verifier: &dyn CredentialVerifier,
    ) -> bool {
        self.password.verify(password, verifier)
    }

    /// Replace the password digest
    pub fn set_password(&mut self, password: UserPassword) {
        self.password = password;
        self.updated_at = Utc::now();
    }

    /// Update personal info
    pub fn set_name(&mut self, first: Option<String>, last: Option<String>) {
        self.first_name = first;
        self.last_name = last;
        self.updated_at = Utc::now();
    }

    /// Point the legacy session slot at `session_id` (or clear it)
    pub fn assign_session(&mut self, session_id: Option<String>) {
        self.session_id = session_id;
        self.updated_at = Utc::now();
    }

    /// Store (or clear) the pending password reset token
    pub fn set_reset_token(&mut self, token: Option<String>) {
        self.reset_token = token;
        self.updated_at = Utc::now();
    }

    /// Whether `token` is the pending reset token
    pub fn has_reset_token(&self, token: &str) -> bool {
        self.reset_token.as_deref().is_some_and(|t| !t.is_empty() && t == token)
    }

    /// Human readable name
    ///
    /// Falls back to the email when no name is set.
    pub fn display_name(&self) -> String {
        let first = self.first_name.as_deref().filter(|s| !s.is_empty());
        let last = self.last_name.as_deref().filter(|s| !s.is_empty());

        match (first, last) {
            (None, None) => self.email.as_str().to_string(),
            (Some(first), None) => first.to_string(),
            (None, Some(last)) => last.to_string(),
            (Some(first), Some(last)) => format!("{first} {last}"),
        }
    }
}
