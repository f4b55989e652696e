//! Password hashing and verification.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{CoreError, CoreResult};

/// Hash a password with Argon2id and a random salt.
pub fn hash_password(password: &str) -> CoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::InternalError(format!("hash password: {}", e)))
}

/// Verify a password against a stored PHC hash string. Parameters are read
/// from the hash itself.
pub fn verify_password(password: &str, hash: &str) -> CoreResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| CoreError::InternalError(format!("parse hash: {}", e)))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}
