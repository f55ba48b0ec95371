//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations for the auth layer:
//! - Base64 and session token helpers
//! - Password hashing behind the [`password::CredentialVerifier`] capability
//! - Cookie parsing and `Set-Cookie` building

pub mod cookie;
pub mod crypto;
pub mod password;
