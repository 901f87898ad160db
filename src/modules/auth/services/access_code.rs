use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};

use crate::core::{AppError, Result};

/// Registration gate: only the Argon2 hash of the configured code is kept
#[derive(Debug, Clone)]
pub struct AccessCodeVerifier {
    hash: String,
}

impl AccessCodeVerifier {
    pub fn new(access_code: &str) -> Result<Self> {
        if access_code.trim().is_empty() {
            return Err(AppError::Configuration("ACCESS_CODE must not be empty".to_string()));
        }

        Ok(Self {
            hash: hash_secret(access_code)?,
        })
    }

    pub fn verify(&self, candidate: &str) -> Result<bool> {
        verify_secret(candidate.trim(), &self.hash)
    }
}

/// Hash a secret using Argon2 with a random salt
pub fn hash_secret(secret: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(secret.trim().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(format!("Failed to hash secret: {}", e)))
}

pub fn verify_secret(secret: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::internal(format!("Invalid hash format: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed_hash)
        .is_ok())
}
