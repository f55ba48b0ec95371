//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::user::User;

// ============================================================================
// Status
// ============================================================================

/// GET /api/v1/status
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// GET /api/v1/stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub users: u64,
}

/// Empty JSON object
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmptyResponse {}

// ============================================================================
// Users
// ============================================================================

/// Public view of a user; never carries the digest
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_str().to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// POST /api/v1/users
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// PUT /api/v1/users/{user_id}
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

// ============================================================================
// Session
// ============================================================================

/// POST /api/v1/auth_session/login (form)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

// ============================================================================
// Password Reset
// ============================================================================

/// POST /api/v1/reset_password (form)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetTokenForm {
    pub email: Option<String>,
}

/// Issued reset token
#[derive(Debug, Clone, Serialize)]
pub struct ResetTokenResponse {
    pub email: String,
    pub reset_token: String,
}

/// PUT /api/v1/reset_password (form)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePasswordForm {
    pub email: Option<String>,
    pub reset_token: Option<String>,
    pub new_password: Option<String>,
}

/// Password changed
#[derive(Debug, Clone, Serialize)]
pub struct PasswordUpdatedResponse {
    pub email: String,
    pub message: &'static str,
}
