//! User Password Value Object
//!
//! Stored password digest of a user. Hashing and verification are delegated
//! to a `platform::password::CredentialVerifier`; this type only guarantees
//! that what a `User` holds is a digest, never the plaintext.

use platform::password::{ClearTextPassword, CredentialVerifier, HashedPassword};
use std::fmt;

use crate::error::AuthResult;

/// Hashed user password (PHC string)
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash a clear text password
    pub fn from_raw(raw: &ClearTextPassword, verifier: &dyn CredentialVerifier) -> AuthResult<Self> {
        Ok(Self(verifier.hash(raw)?))
    }

    /// Restore from a stored PHC string
    pub fn from_db(hash: impl Into<String>) -> AuthResult<Self> {
        Ok(Self(HashedPassword::from_phc_string(hash)?))
    }

    /// Check a candidate password against this digest
    pub fn verify(&self, raw: &ClearTextPassword, verifier: &dyn CredentialVerifier) -> bool {
        verifier.verify(&self.0, raw)
    }

    /// PHC string for storage
    pub fn as_str(&self) -> &str {
        self.0.as_phc_string()
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserPassword").field(&"[HASH]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::Argon2Verifier;

    #[test]
    fn test_from_raw_and_verify() {
        let verifier = Argon2Verifier::default().with_cost(1024, 1).unwrap();
        let password = UserPassword::from_raw(&ClearTextPassword::new("secret"), &verifier).unwrap();

        assert!(password.verify(&ClearTextPassword::new("secret"), &verifier));
        assert!(!password.verify(&ClearTextPassword::new("Secret"), &verifier));
    }

    #[test]
    fn test_from_db_rejects_plaintext() {
        assert!(UserPassword::from_db("secret").is_err());
    }

    #[test]
    fn test_debug_hides_digest() {
        let verifier = Argon2Verifier::default().with_cost(1024, 1).unwrap();
        let password = UserPassword::from_raw(&ClearTextPassword::new("secret"), &verifier).unwrap();
        assert_eq!(format!("{password:?}"), "UserPassword(\"[HASH]\")");
    }
}
