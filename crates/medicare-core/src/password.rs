//! # Password Hashing
//!
//! Argon2 PHC-string hashes for employee credentials. CPU only, no I/O.
//!
//! A login for an unknown username still runs one full verify, against
//! [`dummy_hash`], so both rejections cost the same.

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};

use crate::error::{CoreError, CoreResult};

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str) -> CoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CoreError::PasswordHash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verifies a password against a stored hash.
///
/// A malformed stored hash verifies as `false`.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// A hash of a throwaway secret, computed once with the same parameters as
/// [`hash_password`]. No employee password verifies against it.
///
/// Returns `None` only if the hasher itself failed.
pub fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();

    DUMMY
        .get_or_init(|| {
            let salt = SaltString::generate(&mut OsRng);
            let secret = salt.as_str().to_string();
            hash_password(&secret).ok()
        })
        .as_deref()
}
