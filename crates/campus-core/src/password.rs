//! Password hashing and verification.
//!
//! Hashes are bcrypt digests. The work factor comes from configuration
//! (`BCRYPT_COST`) so tests can run with the minimum cost while production
//! keeps the bcrypt default.

use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::AuthError;

/// bcrypt hasher with a fixed cost factor.
///
/// Cloning is cheap; the async helpers move a clone onto tokio's blocking
/// pool so hashing never stalls the request executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    /// Lowest cost bcrypt accepts.
    pub const MIN_COST: u32 = 4;
    /// Highest cost bcrypt accepts.
    pub const MAX_COST: u32 = 31;

    /// Creates a hasher, clamping `cost` into bcrypt's accepted range.
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(Self::MIN_COST, Self::MAX_COST),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        hash(password, self.cost)
            .map_err(|e| AuthError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Returns `Ok(false)` on mismatch and `Err` only when `hash` is not a
    /// bcrypt digest.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        verify(password, hash)
            .map_err(|e| AuthError::Internal(format!("Failed to verify password: {}", e)))
    }

    pub async fn hash_blocking(&self, password: &str) -> Result<String, AuthError> {
        let hasher = *self;
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("Hashing task failed: {}", e)))?
    }

    pub async fn verify_blocking(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = *self;
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("Verification task failed: {}", e)))?
    }
}
