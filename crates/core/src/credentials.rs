//! Member credential hashing with Argon2id.
//!
//! Members register with a password; only its PHC-format hash is stored.

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Errors that can occur while handling member credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Password is shorter than [`MIN_PASSWORD_LEN`].
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    TooShort,

    /// Hashing failed inside the Argon2 implementation.
    #[error("failed to hash password: {0}")]
    Hash(String),

    /// Stored hash is not a valid PHC string.
    #[error("invalid password hash format")]
    InvalidHash,
}

/// Hashes a member's password for storage.
///
/// # Errors
///
/// Returns `CredentialError::TooShort` for passwords below the minimum length
/// and `CredentialError::Hash` if Argon2 fails.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CredentialError::TooShort);
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hash(e.to_string()))
}

/// Checks a password against a stored hash.
///
/// # Errors
///
/// Returns `CredentialError::InvalidHash` if `hash` cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, CredentialError> {
    let parsed = PasswordHash::new(hash).map_err(|_| CredentialError::InvalidHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CredentialError::Hash(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_argon2id_phc() {
        let hash = hash_password("stokvel-secret").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("stokvel-secret", &hash).unwrap());
        assert!(!verify_password("stokvel-wrong", &hash).unwrap());
    }

    #[test]
    fn test_salted_hashes_differ() {
        let first = hash_password("testpass123").unwrap();
        let second = hash_password("testpass123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(hash_password("short"), Err(CredentialError::TooShort)));
    }

    #[test]
    fn test_invalid_hash_format() {
        let result = verify_password("testpass123", "not-a-phc-string");
        assert!(matches!(result, Err(CredentialError::InvalidHash)));
    }
}
