//! Argon2 credential hashing. Both operations run on the blocking pool so a
//! login burst does not stall the request workers.
use anyhow::{anyhow, Context};
use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

/// Salted PHC string for `plain`, using Argon2's fixed default cost.
pub async fn hash_password(plain: &str) -> anyhow::Result<String> {
    let plain = plain.to_owned();
    tokio::task::spawn_blocking(move || hash_now(&plain))
        .await
        .context("password hashing task")?
}

/// `Ok(false)` for a wrong password; `Err` only when `stored` is not a usable hash.
pub async fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let plain = plain.to_owned();
    let stored = stored.to_owned();
    tokio::task::spawn_blocking(move || verify_now(&plain, &stored))
        .await
        .context("password verification task")?
}

fn hash_now(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("hash password: {e}"))
}

fn verify_now(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(stored).map_err(|e| anyhow!("stored hash is not a PHC string: {e}"))?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("verify password: {e}")),
    }
}
