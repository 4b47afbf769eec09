use std::sync::Arc;

use anyhow::Context;
use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

/// Hashing seam held in `AppState`.
pub trait PasswordService: Send + Sync {
    fn hash(&self, plain: &str) -> anyhow::Result<String>;
    /// `Ok(false)` on mismatch; `Err` only when `hash` is not a PHC string.
    fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool>;
}

/// Argon2id with the crate defaults and a fresh OS-random salt per hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Passwords;

impl PasswordService for Argon2Passwords {
    fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| anyhow::anyhow!("argon2 hash failed: {e}"))
    }

    fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| anyhow::anyhow!("stored password is not a PHC string: {e}"))?;
        match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow::anyhow!("argon2 verify failed: {e}")),
        }
    }
}

// Argon2 is CPU-bound; keep it off the async workers.

pub async fn hash_password_blocking(
    passwords: Arc<dyn PasswordService>,
    plain: String,
) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || passwords.hash(&plain))
        .await
        .context("hash task failed")?
}

pub async fn verify_password_blocking(
    passwords: Arc<dyn PasswordService>,
    plain: String,
    hash: String,
) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || passwords.verify(&plain, &hash))
        .await
        .context("verify task failed")?
}
