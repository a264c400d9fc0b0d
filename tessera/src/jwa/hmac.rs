//! HMAC signing algorithms

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error, jws, Key};

/// HMAC signing algorithms
///
/// The same secret is used to sign and to verify. Secrets shorter than the
/// hash output are rejected.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[allow(clippy::upper_case_acronyms)]
#[non_exhaustive]
pub enum SigningAlgorithm {
    /// HMAC using SHA-256
    HS256,
    /// HMAC using SHA-384
    HS384,
    /// HMAC using SHA-512
    HS512,
}

impl SigningAlgorithm {
    pub(crate) const ALL: [Self; 3] = [Self::HS256, Self::HS384, Self::HS512];

    /// Minimum key size in bytes for an HMAC secret
    #[must_use]
    pub fn minimum_key_size(self) -> usize {
        self.signature_size()
    }

    /// The size in bytes of an HMAC signature
    #[must_use]
    pub fn signature_size(self) -> usize {
        match self {
            Self::HS256 => 256 / 8,
            Self::HS384 => 384 / 8,
            Self::HS512 => 512 / 8,
        }
    }

    fn into_ring_algorithm(self) -> ring::hmac::Algorithm {
        match self {
            SigningAlgorithm::HS256 => ring::hmac::HMAC_SHA256,
            SigningAlgorithm::HS384 => ring::hmac::HMAC_SHA384,
            SigningAlgorithm::HS512 => ring::hmac::HMAC_SHA512,
        }
    }

    fn key(self, key: &Key) -> Result<ring::hmac::Key, error::InvalidKeyProvided> {
        let secret = key.contents();
        if secret.is_empty() {
            return Err(error::invalid_key("key cannot be empty"));
        }

        if secret.len() < self.minimum_key_size() {
            return Err(error::invalid_key(format!(
                "key is too short: expected at least {} bits, got {}",
                self.minimum_key_size() * 8,
                secret.len() * 8
            )));
        }

        Ok(ring::hmac::Key::new(self.into_ring_algorithm(), secret))
    }
}

impl From<SigningAlgorithm> for jws::Algorithm {
    fn from(alg: SigningAlgorithm) -> Self {
        Self::Hmac(alg)
    }
}

impl jws::Signer for SigningAlgorithm {
    fn algorithm_id(&self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
        }
    }

    fn sign(&self, payload: &[u8], key: &Key) -> Result<Vec<u8>, error::SigningError> {
        let key = self.key(key)?;
        let digest = ring::hmac::sign(&key, payload);
        Ok(digest.as_ref().to_owned())
    }

    fn verify(
        &self,
        payload: &[u8],
        signature: &[u8],
        key: &Key,
    ) -> Result<bool, error::InvalidKeyProvided> {
        let key = self.key(key)?;
        Ok(ring::hmac::verify(&key, payload, signature).is_ok())
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(jws::Signer::algorithm_id(self))
    }
}
