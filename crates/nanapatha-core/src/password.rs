//! Credentials for newly provisioned accounts.
//!
//! Accounts created by accepting a registration request start with a random
//! temporary password. Only the bcrypt hash is persisted; the plaintext is
//! handed back to the caller exactly once.

use anyhow::anyhow;
use bcrypt::{DEFAULT_COST, hash, verify};
use rand::{Rng, distributions::Alphanumeric, thread_rng};

use crate::errors::AppError;

/// Length of generated temporary passwords.
pub const TEMP_PASSWORD_LEN: usize = 12;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::internal(anyhow!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::internal(anyhow!("Failed to verify password: {}", e)))
}

/// Generates an alphanumeric placeholder credential.
pub fn generate_temporary_password() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TEMP_PASSWORD_LEN)
        .map(char::from)
        .collect()
}
