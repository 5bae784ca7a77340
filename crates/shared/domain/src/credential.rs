//! Credential codec - salted one-way hashing of account secrets.
//!
//! A credential is always the pair (digest, salt). Both halves are produced
//! together by [`CredentialCodec::issue`] or imported together through
//! [`StoredCredential::import`]; nothing in this crate can change one half
//! without the other.

use argon2::{
    password_hash::{
        rand_core::{OsRng, RngCore},
        Output,
    },
    Algorithm, Argon2, Params, Version,
};
use serde::Deserialize;

use crate::constants::{DIGEST_BYTES, DIGEST_LEN, MIN_SALT_LEN, SALT_BYTES};
use crate::error::{DomainError, DomainResult};

/// Plaintext secret supplied by a caller.
///
/// This is the only way a plaintext password enters the system. Every
/// `Secret` handed to the codec is hashed; there is no "already hashed"
/// guess based on its length.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(plain_text: impl Into<String>) -> Self {
        Self(plain_text.into())
    }

    /// Borrow the plaintext.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

// Don't expose the secret in debug output
impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Secret").field(&"[REDACTED]").finish()
    }
}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Secret {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Digest and salt as persisted for one account.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct StoredCredential {
    digest: String,
    salt: String,
}

impl std::fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredCredential")
            .field("digest", &"[REDACTED]")
            .field("salt", &"[REDACTED]")
            .finish()
    }
}

impl StoredCredential {
    /// Rebuild a credential read back from storage.
    pub fn from_parts(digest: String, salt: String) -> Self {
        Self { digest, salt }
    }

    /// Import a digest/salt pair computed elsewhere (e.g. account migration).
    ///
    /// # Errors
    /// Returns a validation error unless the digest is `DIGEST_LEN` lowercase
    /// hex characters and the salt is at least `MIN_SALT_LEN` bytes.
    pub fn import(digest: impl Into<String>, salt: impl Into<String>) -> DomainResult<Self> {
        let digest = digest.into();
        let salt = salt.into();

        let is_hex = digest
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if digest.len() != DIGEST_LEN || !is_hex {
            return Err(DomainError::validation(format!(
                "Imported digest must be {} lowercase hex characters",
                DIGEST_LEN
            )));
        }
        if salt.len() < MIN_SALT_LEN {
            return Err(DomainError::validation(format!(
                "Imported salt must be at least {} bytes",
                MIN_SALT_LEN
            )));
        }

        Ok(Self { digest, salt })
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// Consume and return `(digest, salt)` for storage.
    pub fn into_parts(self) -> (String, String) {
        (self.digest, self.salt)
    }
}

/// Credential carried by a create or update request.
#[derive(Debug, Clone)]
pub enum NewCredential {
    /// Plaintext secret, hashed under a fresh salt
    Plain(Secret),
    /// Pre-computed pair, stored unchanged
    Hashed(StoredCredential),
}

impl From<Secret> for NewCredential {
    fn from(secret: Secret) -> Self {
        NewCredential::Plain(secret)
    }
}

/// Generate a fresh random salt: `SALT_BYTES` from the OS RNG, hex encoded.
///
/// # Errors
/// `RandomnessUnavailable` if the OS randomness source fails.
pub fn generate_salt() -> DomainResult<String> {
    let mut bytes = [0u8; SALT_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| DomainError::RandomnessUnavailable(e.to_string()))?;
    Ok(hex::encode(bytes))
}

/// Argon2id hasher with fixed cost parameters.
///
/// Digests are only comparable between codecs built with the same
/// parameters.
#[derive(Clone)]
pub struct CredentialCodec {
    argon2: Argon2<'static>,
}

impl std::fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params = self.argon2.params();
        f.debug_struct("CredentialCodec")
            .field("memory_kib", &params.m_cost())
            .field("iterations", &params.t_cost())
            .field("parallelism", &params.p_cost())
            .finish()
    }
}

impl Default for CredentialCodec {
    fn default() -> Self {
        Self::from_params(Params::default())
    }
}

impl CredentialCodec {
    /// Build a codec with explicit Argon2 cost parameters.
    ///
    /// # Errors
    /// Returns a validation error if Argon2 rejects the parameters
    /// (e.g. memory below 8 KiB per lane).
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> DomainResult<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, Some(DIGEST_BYTES))
            .map_err(|e| DomainError::validation(format!("Invalid hashing parameters: {}", e)))?;
        Ok(Self::from_params(params))
    }

    fn from_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hash a plaintext secret with the given salt.
    ///
    /// Deterministic: the same `(plain_text, salt)` always yields the same
    /// `DIGEST_LEN`-character hex digest.
    pub fn hash(&self, plain_text: &str, salt: &str) -> DomainResult<String> {
        let raw = self.raw_digest(plain_text, salt)?;
        Ok(hex::encode(raw))
    }

    /// Check a plaintext secret against a stored digest and salt.
    ///
    /// The digest comparison is constant-time. Malformed stored values never
    /// match.
    pub fn matches(&self, plain_text: &str, salt: &str, stored_digest: &str) -> bool {
        let Ok(expected) = hex::decode(stored_digest) else {
            return false;
        };
        let Ok(computed) = self.raw_digest(plain_text, salt) else {
            return false;
        };

        match (Output::new(&computed), Output::new(&expected)) {
            (Ok(computed), Ok(expected)) => computed == expected,
            _ => false,
        }
    }

    /// Check a secret against a stored credential.
    pub fn verify(&self, secret: &Secret, credential: &StoredCredential) -> bool {
        self.matches(secret.expose(), credential.salt(), credential.digest())
    }

    /// Hash a secret under a freshly generated salt.
    pub fn issue(&self, secret: &Secret) -> DomainResult<StoredCredential> {
        let salt = generate_salt()?;
        let digest = self.hash(secret.expose(), &salt)?;
        Ok(StoredCredential { digest, salt })
    }

    /// Turn a requested credential into the pair that gets stored.
    pub fn resolve(&self, credential: NewCredential) -> DomainResult<StoredCredential> {
        match credential {
            NewCredential::Plain(secret) => self.issue(&secret),
            NewCredential::Hashed(stored) => Ok(stored),
        }
    }

    fn raw_digest(&self, plain_text: &str, salt: &str) -> DomainResult<[u8; DIGEST_BYTES]> {
        let mut out = [0u8; DIGEST_BYTES];
        self.argon2
            .hash_password_into(plain_text.as_bytes(), salt.as_bytes(), &mut out)
            .map_err(|e| DomainError::internal(format!("Password hash failed: {}", e)))?;
        Ok(out)
    }
}
