//! Administrator credentials
//!
//! Stored values are argon2id PHC strings. A stored value that does not parse
//! is a store error, never a failed login.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use super::StoreError;

/// PHC string for `plain` under a fresh salt
pub(crate) fn hash_password(plain: &str) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    let phc = Argon2::default().hash_password(plain.as_bytes(), &salt)?;
    Ok(phc.to_string())
}

/// `Ok(false)` only for a wrong password; anything else the verifier
/// rejects is passed on.
pub(crate) fn verify_password(plain: &str, stored: &str) -> Result<bool, StoreError> {
    let phc = PasswordHash::new(stored)?;
    match Argon2::default().verify_password(plain.as_bytes(), &phc) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
