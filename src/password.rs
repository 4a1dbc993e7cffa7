//! One-way hashing for passwords and one-time codes.
//!
//! Argon2id with a fresh random salt per call; output is a PHC string that
//! embeds the salt and parameters. Comparison fails closed: a malformed
//! stored hash yields `Ok(false)` rather than an error, so a corrupted row
//! can never authenticate anyone.
//!
//! Hashing pins a CPU for tens of milliseconds, so both operations run on
//! the blocking thread pool instead of a runtime worker.

use anyhow::{Result, anyhow};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, Version};
use tokio::task;

fn argon2() -> Result<Argon2<'static>> {
    let params = Params::new(
        32_768, // 32 MB
        3,      // iterations
        1,      // parallelism
        None,
    )
    .map_err(|e| anyhow!("failed to create argon2 params: {e}"))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a plaintext secret with a per-call random salt.
///
/// # Errors
/// Returns an error if hashing fails internally or the blocking task is
/// cancelled.
pub async fn hash(plaintext: &str) -> Result<String> {
    let plaintext = plaintext.to_string();
    task::spawn_blocking(move || hash_blocking(&plaintext)).await?
}

/// Constant-time comparison of a plaintext secret against a stored hash.
///
/// A malformed stored hash returns `Ok(false)`.
///
/// # Errors
/// Returns an error only for unexpected internal verifier failures or a
/// cancelled blocking task.
pub async fn verify(plaintext: &str, stored_hash: &str) -> Result<bool> {
    let plaintext = plaintext.to_string();
    let stored_hash = stored_hash.to_string();
    task::spawn_blocking(move || verify_blocking(&plaintext, &stored_hash)).await?
}

fn hash_blocking(plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2()?
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| anyhow!("failed to hash secret: {e}"))?
        .to_string();

    Ok(hash)
}

fn verify_blocking(plaintext: &str, stored_hash: &str) -> Result<bool> {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return Ok(false);
    };

    match argon2()?.verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("secret verification failed: {e}")),
    }
}
