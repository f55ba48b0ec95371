//! Password Hashing and Verification
//!
//! The auth layer treats hashing as an opaque capability:
//! [`CredentialVerifier`] turns a clear text password into a digest and
//! checks a password against a stored digest. [`Argon2Verifier`] is the
//! production implementation.
//!
//! ## Security Features
//! - Argon2id hashing (memory-hard, recommended by OWASP)
//! - Zeroization of clear text passwords on drop
//! - Unicode NFKC normalization before hashing
//! - Optional pepper (application-wide secret)

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Error Types
// ============================================================================

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Invalid hash format
    #[error("Invalid password hash format")]
    InvalidHashFormat,

    /// Rejected Argon2 cost parameters
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// No policy is applied here: Basic credentials must be checkable even when
/// empty, and registration decides on its own what it accepts.
///
/// ## Security
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone` to prevent accidental copies
/// - Debug output is redacted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Wrap a password, normalizing it with NFKC
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().nfkc().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn peppered(&self, pepper: Option<&[u8]>) -> Vec<u8> {
        let mut bytes = self.0.as_bytes().to_vec();
        if let Some(p) = pepper {
            bytes.extend_from_slice(p);
        }
        bytes
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Hashed password in PHC string format
///
/// The PHC string embeds algorithm, version, parameters and salt, so a
/// digest stays verifiable after the cost parameters change.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Create from PHC string (e.g., from the store)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();

        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;

        Ok(Self { hash })
    }

    /// Get the PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Credential Verifier capability
// ============================================================================

/// Opaque `hash(password) -> digest` / `verify(digest, password) -> bool`
pub trait CredentialVerifier: Send + Sync {
    /// Produce a storable digest for `password`
    fn hash(&self, password: &ClearTextPassword) -> Result<HashedPassword, PasswordHashError>;

    /// Check `password` against `digest`
    ///
    /// Any failure (malformed digest included) is a mismatch.
    fn verify(&self, digest: &HashedPassword, password: &ClearTextPassword) -> bool;
}

/// Argon2id implementation of [`CredentialVerifier`]
#[derive(Clone)]
pub struct Argon2Verifier {
    params: Params,
    pepper: Option<Vec<u8>>,
}

impl Argon2Verifier {
    /// OWASP recommended parameters: m=19456 (19 MiB), t=2, p=1
    pub fn new(pepper: Option<Vec<u8>>) -> Self {
        Self {
            params: Params::default(),
            pepper,
        }
    }

    /// Override the memory (KiB) and iteration costs
    ///
    /// Verification always uses the parameters embedded in the digest.
    pub fn with_cost(mut self, m_cost_kib: u32, t_cost: u32) -> Result<Self, PasswordHashError> {
        self.params = Params::new(m_cost_kib, t_cost, 1, None)
            .map_err(|e| PasswordHashError::InvalidParams(e.to_string()))?;
        Ok(self)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Verifier {
    fn default() -> Self {
        Self::new(None)
    }
}

impl fmt::Debug for Argon2Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argon2Verifier")
            .field("params", &self.params)
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl CredentialVerifier for Argon2Verifier {
    fn hash(&self, password: &ClearTextPassword) -> Result<HashedPassword, PasswordHashError> {
        let mut bytes = password.peppered(self.pepper.as_deref());
        let salt = SaltString::generate(OsRng);

        let result = self
            .argon2()
            .hash_password(&bytes, &salt)
            .map(|hash| HashedPassword {
                hash: hash.to_string(),
            })
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()));

        bytes.zeroize();
        result
    }

    fn verify(&self, digest: &HashedPassword, password: &ClearTextPassword) -> bool {
        let Ok(parsed) = PasswordHash::new(&digest.hash) else {
            return false;
        };

        let mut bytes = password.peppered(self.pepper.as_deref());
        let ok = self.argon2().verify_password(&bytes, &parsed).is_ok();
        bytes.zeroize();
        ok
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap(pepper: Option<Vec<u8>>) -> Argon2Verifier {
        Argon2Verifier::new(pepper).with_cost(1024, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let verifier = cheap(None);
        let password = ClearTextPassword::new("secret");
        let hashed = verifier.hash(&password).unwrap();

        assert!(verifier.verify(&hashed, &password));
        assert!(!verifier.verify(&hashed, &ClearTextPassword::new("wrong")));
    }

    #[test]
    fn test_digest_is_not_plaintext() {
        let verifier = cheap(None);
        let hashed = verifier.hash(&ClearTextPassword::new("secret")).unwrap();
        assert!(hashed.as_phc_string().starts_with("$argon2id$"));
        assert!(!hashed.as_phc_string().contains("secret"));
    }

    #[test]
    fn test_hash_with_pepper() {
        let pepper = b"my_secret_pepper".to_vec();
        let peppered = cheap(Some(pepper));
        let plain = cheap(None);
        let password = ClearTextPassword::new("TestPassword123!");
        let hashed = peppered.hash(&password).unwrap();

        assert!(peppered.verify(&hashed, &password));
        assert!(!plain.verify(&hashed, &password));
        assert!(!cheap(Some(b"wrong_pepper".to_vec())).verify(&hashed, &password));
    }

    #[test]
    fn test_verify_uses_embedded_params() {
        let password = ClearTextPassword::new("secret");
        let hashed = cheap(None).hash(&password).unwrap();
        assert!(Argon2Verifier::default().verify(&hashed, &password));
    }

    #[test]
    fn test_empty_password_hashes_and_only_matches_itself() {
        let verifier = cheap(None);
        let empty = ClearTextPassword::new("");
        assert!(empty.is_empty());
        let hashed = verifier.hash(&empty).unwrap();
        assert!(verifier.verify(&hashed, &empty));
        assert!(!verifier.verify(&hashed, &ClearTextPassword::new(" ")));
    }

    #[test]
    fn test_phc_string_roundtrip() {
        let verifier = cheap(None);
        let password = ClearTextPassword::new("TestPassword123!");
        let hashed = verifier.hash(&password).unwrap();

        let restored = HashedPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(verifier.verify(&restored, &password));
    }

    #[test]
    fn test_invalid_phc_string() {
        assert!(HashedPassword::from_phc_string("not_a_valid_hash").is_err());
    }

    #[test]
    fn test_unicode_normalization() {
        let verifier = cheap(None);
        // U+FB01 (ligature) normalizes to "fi" under NFKC
        let hashed = verifier.hash(&ClearTextPassword::new("\u{FB01}sh")).unwrap();
        assert!(verifier.verify(&hashed, &ClearTextPassword::new("fish")));
    }

    #[test]
    fn test_debug_redaction() {
        let password = ClearTextPassword::new("secret");
        let debug_output = format!("{:?}", password);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("secret"));

        let verifier = Argon2Verifier::new(Some(b"pepper".to_vec()));
        let debug_output = format!("{:?}", verifier);
        assert!(debug_output.contains("[REDACTED]"));
    }
}
