//! Password hashing (Argon2id) and strength rules

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use market_core::DomainError;

use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Hash a password using Argon2id with a fresh salt
///
/// # Errors
/// Returns an error if hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {e}")))
}

/// Verify a password against a stored PHC string
///
/// # Errors
/// Returns an error if the stored hash cannot be parsed
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Check that a password is at least 8 characters with an uppercase letter,
/// a lowercase letter and a digit. Every unmet rule is reported.
///
/// # Errors
/// Returns [`DomainError::WeakPassword`] listing the unmet rules
pub fn validate_password_strength(password: &str) -> Result<(), AppError> {
    let rules: [(bool, &str); 4] = [
        (
            password.chars().count() >= MIN_PASSWORD_LEN,
            "at least 8 characters",
        ),
        (password.chars().any(char::is_uppercase), "an uppercase letter"),
        (password.chars().any(char::is_lowercase), "a lowercase letter"),
        (password.chars().any(|c| c.is_ascii_digit()), "a digit"),
    ];

    let missing: Vec<&str> = rules
        .iter()
        .filter(|(ok, _)| !ok)
        .map(|(_, rule)| *rule)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DomainError::WeakPassword(format!("needs {}", missing.join(", "))).into())
    }
}

/// Password operations behind one handle, so callers can hold it in a context
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordService;

impl PasswordService {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validate strength, then hash
    ///
    /// # Errors
    /// Returns a weak-password error or a hashing failure
    pub fn hash_new(&self, password: &str) -> Result<String, AppError> {
        validate_password_strength(password)?;
        hash_password(password)
    }

    /// # Errors
    /// Returns `AppError::InvalidCredentials` if the password doesn't match
    pub fn verify_or_error(&self, password: &str, hash: &str) -> Result<(), AppError> {
        if verify_password(password, hash)? {
            Ok(())
        } else {
            Err(AppError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Marketplace1").unwrap();
        assert!(hash.starts_with("$argon2id"));
        assert_ne!(hash, hash_password("Marketplace1").unwrap());

        assert!(verify_password("Marketplace1", &hash).unwrap());
        assert!(!verify_password("marketplace1", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("whatever", "not-a-phc-string"),
            Err(AppError::Internal(_))
        ));
    }

    #[test]
    fn test_strength_lists_every_missing_rule() {
        assert!(validate_password_strength("Str0ngPass").is_ok());

        let err = validate_password_strength("short").unwrap_err();
        let AppError::Domain(DomainError::WeakPassword(msg)) = err else {
            panic!("unexpected error: {err:?}");
        };
        assert!(msg.contains("8 characters"));
        assert!(msg.contains("uppercase"));
        assert!(msg.contains("digit"));
        assert!(!msg.contains("lowercase"));
    }

    #[test]
    fn test_service_verify_or_error() {
        let service = PasswordService::new();
        let hash = service.hash_new("Abcdefg1").unwrap();
        assert!(service.verify_or_error("Abcdefg1", &hash).is_ok());
        assert!(matches!(
            service.verify_or_error("Abcdefg2", &hash),
            Err(AppError::InvalidCredentials)
        ));
        assert!(service.hash_new("abc").is_err());
    }
}
