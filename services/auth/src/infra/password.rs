use anyhow::{Context as _, anyhow};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher as _, PasswordVerifier as _};

use crate::domain::repository::PasswordHasher;
use crate::error::AuthServiceError;

/// Argon2id with a random salt, encoded as a PHC string.
///
/// Hashing is CPU-bound and runs on the blocking pool.
#[derive(Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

fn hash_blocking(password: &str) -> Result<String, AuthServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("hash password: {e}"))?;
    Ok(hash.to_string())
}

/// Check `password` against a PHC hash produced by [`Argon2PasswordHasher`].
///
/// For credential store implementations; an unparsable hash never verifies.
pub fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, AuthServiceError> {
        let password = password.to_owned();
        let hash = tokio::task::spawn_blocking(move || hash_blocking(&password))
            .await
            .context("password hashing task")??;
        Ok(hash)
    }
}
