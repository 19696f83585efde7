//! Password hashing and verification using Argon2id
//!
//! Credentials are stored as self-describing PHC strings
//! (`$argon2id$v=19$m=19456,t=2,p=1$<salt>$<digest>`), so verification
//! reads the algorithm, cost parameters and salt back out of the stored
//! artifact and never needs configuration of its own.
//!
//! # Security Considerations
//!
//! - Argon2id (hybrid mode), memory-hard
//! - Fixed, versioned cost parameters that callers cannot tune at runtime
//! - Random 16-byte salt per hash from the OS RNG
//! - Constant-time digest comparison
//!
//! # Example
//!
//! ```rust
//! use chitrapost::auth::password::PasswordHasher;
//!
//! # fn example() -> anyhow::Result<()> {
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("correct-horse")?;
//!
//! assert!(hasher.verify("correct-horse", &hash)?);
//! assert!(!hasher.verify("wrong-horse", &hash)?);
//! # Ok(())
//! # }
//! ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

/// Password hashing errors
///
/// A wrong password is never an error; see [`PasswordHasher::verify`].
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),

    /// Verification could not run to completion
    #[error("Failed to verify password: {0}")]
    VerificationFailed(String),

    /// Stored credential is not a valid PHC string
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),

    /// Invalid parameters for Argon2
    #[error("Invalid Argon2 parameters: {0}")]
    InvalidParams(String),
}

/// Argon2id cost parameters
///
/// # Defaults
///
/// [`PasswordHashConfig::V1`] follows the OWASP minimum for server-side
/// hashing:
/// - Memory cost: 19456 KiB (~19 MB)
/// - Iterations: 2
/// - Parallelism: 1
/// - Output length: 32 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashConfig {
    /// Memory cost in KiB
    pub memory_cost: u32,

    /// Number of iterations
    pub iterations: u32,

    /// Degree of parallelism
    pub parallelism: u32,

    /// Output hash length in bytes
    pub output_length: usize,
}

impl PasswordHashConfig {
    /// Parameter set used for every credential issued today
    pub const V1: Self = Self {
        memory_cost: 19456,
        iterations: 2,
        parallelism: 1,
        output_length: 32,
    };

    fn params(&self) -> Result<Params, PasswordError> {
        Params::new(
            self.memory_cost,
            self.iterations,
            self.parallelism,
            Some(self.output_length),
        )
        .map_err(|e| PasswordError::InvalidParams(e.to_string()))
    }
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self::V1
    }
}

/// Well-formed V1 artifact matching no password, see
/// [`PasswordHasher::verify_decoy_async`]
const DECOY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$cZBnZQa3hdWAFZNhsYDqpw$ToFxWj2xF4fnMNL1YBDeALnN48lkygD5LTOfzOKtrfQ";

/// Argon2id password hasher
///
/// Cheap to clone; holds only the cost parameters.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher {
    config: PasswordHashConfig,
}

impl PasswordHasher {
    /// Create a hasher using [`PasswordHashConfig::V1`]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for non-default parameters
    ///
    /// Intended for tests that want cheap hashes; production code should use
    /// [`PasswordHasher::new`].
    #[must_use]
    pub fn builder() -> PasswordHasherBuilder {
        PasswordHasherBuilder::default()
    }

    /// Hash a password into a PHC string
    ///
    /// # Errors
    ///
    /// Returns [`PasswordError::HashingFailed`] only when Argon2 itself fails
    /// (allocation failure and similar).
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.config.params()?);

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        Ok(password_hash.to_string())
    }

    /// Verify a password against a stored PHC string
    ///
    /// Returns `Ok(false)` on mismatch.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordError::InvalidHash`] when `hash` cannot be parsed,
    /// and [`PasswordError::VerificationFailed`] for any other Argon2 failure.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

        // Parameters come from the PHC string, not from `self.config`.
        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::VerificationFailed(e.to_string())),
        }
    }

    /// [`PasswordHasher::hash`] on the blocking thread pool
    ///
    /// # Errors
    ///
    /// Same as [`PasswordHasher::hash`]; a panicked worker is reported as
    /// [`PasswordError::HashingFailed`].
    pub async fn hash_async(&self, password: String) -> Result<String, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?
    }

    /// [`PasswordHasher::verify`] on the blocking thread pool
    ///
    /// # Errors
    ///
    /// Same as [`PasswordHasher::verify`].
    pub async fn verify_async(&self, password: String, hash: String) -> Result<bool, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| PasswordError::VerificationFailed(e.to_string()))?
    }

    /// Spend one [`PasswordHashConfig::V1`] verification on a decoy artifact
    ///
    /// Used when there is no stored credential to check, so that a missing
    /// account costs the same as a wrong password.
    ///
    /// # Errors
    ///
    /// Same as [`PasswordHasher::verify_async`].
    pub async fn verify_decoy_async(&self, password: String) -> Result<(), PasswordError> {
        self.verify_async(password, DECOY_HASH.to_string())
            .await
            .map(|_| ())
    }

    /// Get the current configuration
    #[must_use]
    pub const fn config(&self) -> &PasswordHashConfig {
        &self.config
    }
}

/// Builder for [`PasswordHasher`]
#[derive(Debug, Default)]
pub struct PasswordHasherBuilder {
    config: PasswordHashConfig,
}

impl PasswordHasherBuilder {
    /// Set memory cost in KiB
    #[must_use]
    pub const fn memory_cost(mut self, cost: u32) -> Self {
        self.config.memory_cost = cost;
        self
    }

    /// Set number of iterations
    #[must_use]
    pub const fn iterations(mut self, iterations: u32) -> Self {
        self.config.iterations = iterations;
        self
    }

    /// Set degree of parallelism
    #[must_use]
    pub const fn parallelism(mut self, parallelism: u32) -> Self {
        self.config.parallelism = parallelism;
        self
    }

    /// Build the hasher, rejecting parameters Argon2 would refuse
    ///
    /// # Errors
    ///
    /// Returns [`PasswordError::InvalidParams`] for out-of-range parameters.
    pub fn build(self) -> Result<PasswordHasher, PasswordError> {
        self.config.params()?;
        Ok(PasswordHasher {
            config: self.config,
        })
    }
}
