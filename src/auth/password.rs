//! Salted password hashing with Argon2id.
//!
//! [`hash`] draws a fresh 16 byte salt from the OS for every call and returns
//! a PHC string (`$argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>`), so the salt
//! and parameters travel with the hash in the `password_hash` column.
//! [`verify`] re-derives the hash from that string and compares in constant
//! time.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::app::AppError;

pub fn hash(plaintext: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            log::error!("failed to hash password: {}", err);
            AppError::Internal
        })
}

/// A stored hash that cannot be parsed never verifies.
pub fn verify(plaintext: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            log::warn!("stored password hash is malformed: {}", err);
            false
        }
    }
}
