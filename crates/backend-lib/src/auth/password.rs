// ============================
// crates/backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use std::fmt;

use anyhow::anyhow;
use scrypt::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Params, Scrypt,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

const BLOCK_SIZE: u32 = 8;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

/// A salted scrypt hash in PHC string format (`$scrypt$ln=..,r=..,p=..$salt$hash`).
///
/// The only useful thing to do with one is hand it back to [`PasswordHasher::verify`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Wrap a PHC string read back from storage. Not validated here; a corrupt
    /// value simply never verifies.
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword(..)")
    }
}

/// One-way salted password hashing with a tunable cost factor
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    /// scrypt's recommended parameters
    fn default() -> Self {
        Self {
            params: Params::recommended(),
        }
    }
}

impl PasswordHasher {
    /// Create a hasher with cost `N = 2^log_n`
    pub fn new(log_n: u8) -> anyhow::Result<Self> {
        if log_n == 0 {
            return Err(anyhow!("scrypt cost factor must be at least 1"));
        }
        let params = Params::new(log_n, BLOCK_SIZE, PARALLELISM, OUTPUT_LEN)
            .map_err(|e| anyhow!("invalid scrypt parameters: {e}"))?;
        Ok(Self { params })
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, plain: &str) -> anyhow::Result<HashedPassword> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Scrypt
            .hash_password_customized(plain.as_bytes(), None, None, self.params, &salt)
            .map_err(|e| anyhow!("password hashing failed: {e}"))?
            .to_string();
        Ok(HashedPassword(hash))
    }

    /// Verify a password against a hash. Corrupt hashes verify as `false`.
    ///
    /// The cost parameters are read from the hash itself, so hashes made under
    /// an older cost factor keep verifying.
    pub fn verify(&self, hashed: &HashedPassword, plain: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hashed.as_str()) {
            Ok(h) => h,
            Err(_) => return false,
        };
        Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
    }

    /// [`hash`](Self::hash) on the blocking thread pool
    pub async fn hash_blocking(&self, plain: String) -> anyhow::Result<HashedPassword> {
        let plain = Zeroizing::new(plain);
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&plain)).await?
    }

    /// [`verify`](Self::verify) on the blocking thread pool
    pub async fn verify_blocking(&self, hashed: HashedPassword, plain: String) -> bool {
        let plain = Zeroizing::new(plain);
        let hasher = *self;
        match tokio::task::spawn_blocking(move || hasher.verify(&hashed, &plain)).await {
            Ok(matched) => matched,
            Err(err) => {
                tracing::error!(error = %err, "password verification task failed");
                false
            },
        }
    }

    /// Always `false`, after the same scrypt work a real verification costs.
    ///
    /// Used when there is no stored hash to check, so an unknown account
    /// answers no faster than a wrong password.
    pub async fn reject_blocking(&self, plain: String) -> bool {
        let plain = Zeroizing::new(plain);
        let hasher = *self;
        if let Err(err) = tokio::task::spawn_blocking(move || hasher.hash(&plain)).await {
            tracing::error!(error = %err, "password verification task failed");
        }
        false
    }
}
