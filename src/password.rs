use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::Rng;
use std::sync::LazyLock;

// Hash of a password no account has. Built with the same parameters as real hashes.
static DECOY: LazyLock<Option<String>> = LazyLock::new(|| hash("learnhub-decoy-password").ok());

fn salt() -> Result<SaltString, argon2::password_hash::Error> {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    SaltString::encode_b64(&bytes)
}

/// Hashes `password` into a PHC string.
pub fn hash(password: &str) -> Result<String, argon2::password_hash::Error> {
    Argon2::default()
        .hash_password(password.as_bytes(), &salt()?)
        .map(|h| h.to_string())
}

/// False for a wrong password and for a malformed stored hash alike.
pub fn verify(password: &str, hashword: &str) -> bool {
    PasswordHash::new(hashword)
        .map(|hash| {
            Argon2::default()
                .verify_password(password.as_bytes(), &hash)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Runs one full verification against the decoy hash, for lookups that found
/// no account. The result is discarded: a missing account never verifies.
pub fn verify_decoy(password: &str) {
    if let Some(decoy) = DECOY.as_deref() {
        let _ = verify(password, decoy);
    }
}
