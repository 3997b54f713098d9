//! Password hashing and verification.
//!
//! This module provides Argon2id-based credential hashing for user
//! passwords. Verification is a pure comparison: a wrong password is a
//! normal negative outcome (`Ok(false)`), never an error — the caller
//! decides whether to raise `InvalidCredentials`.
//!
//! # Security
//!
//! - Hashing uses Argon2id (hybrid mode) with default parameters
//! - Salts are generated with OsRng (cryptographically secure RNG)
//! - Hashes are stored in PHC string format
//!
//! # Example
//!
//! ```
//! use clinica_auth::password::{hash_password, verify_password};
//!
//! let hash = hash_password("Secret123").unwrap();
//! assert!(hash.starts_with("$argon2id$"));
//! assert!(verify_password("Secret123", &hash).unwrap());
//! assert!(!verify_password("wrong", &hash).unwrap());
//! ```

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::AuthError;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Hash a password for secure storage using Argon2id.
///
/// # Arguments
///
/// * `password` - The plaintext password to hash
///
/// # Returns
///
/// PHC-formatted hash string suitable for database storage.
///
/// # Errors
///
/// Returns `AuthError::Validation` if the password is shorter than
/// [`MIN_PASSWORD_LENGTH`], or `AuthError::Internal` if hashing itself
/// fails (rare).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AuthError::internal("Failed to hash password"))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash.
///
/// # Arguments
///
/// * `password` - The plaintext password to verify
/// * `hash` - The PHC-formatted Argon2 hash from storage
///
/// # Returns
///
/// `Ok(true)` if the password matches, `Ok(false)` if it does not.
///
/// # Errors
///
/// Returns `AuthError::Internal` only if the stored hash is not a valid
/// PHC string. The argon2 error type never crosses this boundary.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|_| AuthError::internal("Stored password hash has invalid format"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
