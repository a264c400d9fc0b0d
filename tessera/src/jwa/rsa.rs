//! RSA signing algorithms
//!
//! Keys are parsed by `openssl`, which accepts PEM (optionally encrypted
//! with the key's passphrase) or DER. Signing and verification are done by
//! `ring`.

use std::fmt;

use openssl::pkey::Id;
use ring::signature::{RsaKeyPair, RsaPublicKeyComponents};
use serde::{Deserialize, Serialize};

use super::pkey;
use crate::{error, jws, Key};

/// The smallest modulus accepted, in bits
pub const MINIMUM_KEY_LENGTH: u32 = 2048;

/// RSA signing algorithms
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[allow(clippy::upper_case_acronyms)]
#[non_exhaustive]
pub enum SigningAlgorithm {
    /// RSA using SHA-256
    RS256,
    /// RSA using SHA-384
    RS384,
    /// RSA using SHA-512
    RS512,
    /// RSA PSS using SHA-256
    PS256,
    /// RSA PSS using SHA-384
    PS384,
    /// RSA PSS using SHA-512
    PS512,
}

impl SigningAlgorithm {
    pub(crate) const ALL: [Self; 6] = [
        Self::RS256,
        Self::RS384,
        Self::RS512,
        Self::PS256,
        Self::PS384,
        Self::PS512,
    ];

    fn into_verification_params(self) -> &'static ring::signature::RsaParameters {
        match self {
            SigningAlgorithm::RS256 => &ring::signature::RSA_PKCS1_2048_8192_SHA256,
            SigningAlgorithm::RS384 => &ring::signature::RSA_PKCS1_2048_8192_SHA384,
            SigningAlgorithm::RS512 => &ring::signature::RSA_PKCS1_2048_8192_SHA512,
            SigningAlgorithm::PS256 => &ring::signature::RSA_PSS_2048_8192_SHA256,
            SigningAlgorithm::PS384 => &ring::signature::RSA_PSS_2048_8192_SHA384,
            SigningAlgorithm::PS512 => &ring::signature::RSA_PSS_2048_8192_SHA512,
        }
    }

    fn into_signing_params(self) -> &'static dyn ring::signature::RsaEncoding {
        match self {
            SigningAlgorithm::RS256 => &ring::signature::RSA_PKCS1_SHA256,
            SigningAlgorithm::RS384 => &ring::signature::RSA_PKCS1_SHA384,
            SigningAlgorithm::RS512 => &ring::signature::RSA_PKCS1_SHA512,
            SigningAlgorithm::PS256 => &ring::signature::RSA_PSS_SHA256,
            SigningAlgorithm::PS384 => &ring::signature::RSA_PSS_SHA384,
            SigningAlgorithm::PS512 => &ring::signature::RSA_PSS_SHA512,
        }
    }
}

fn require_length(bits: u32) -> Result<(), error::InvalidKeyProvided> {
    if bits < MINIMUM_KEY_LENGTH {
        return Err(error::invalid_key(format!(
            "key length is too short: expected at least {} bits, got {}",
            MINIMUM_KEY_LENGTH, bits
        )));
    }

    Ok(())
}

impl From<SigningAlgorithm> for jws::Algorithm {
    fn from(alg: SigningAlgorithm) -> Self {
        Self::Rsa(alg)
    }
}

impl jws::Signer for SigningAlgorithm {
    fn algorithm_id(&self) -> &'static str {
        match self {
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
            Self::RS512 => "RS512",
            Self::PS256 => "PS256",
            Self::PS384 => "PS384",
            Self::PS512 => "PS512",
        }
    }

    fn sign(&self, payload: &[u8], key: &Key) -> Result<Vec<u8>, error::SigningError> {
        let pkey = pkey::private_key(key)?;
        pkey::require_type(&pkey, Id::RSA)?;
        require_length(pkey.bits())?;

        let der = pkey
            .rsa()
            .and_then(|rsa| rsa.private_key_to_der())
            .map_err(|e| error::key_rejected("unable to read RSA private key", e))?;

        let key_pair = RsaKeyPair::from_der(&der)
            .map_err(|e| error::key_rejected("RSA private key rejected", e.to_string()))?;

        let mut buf = vec![0; key_pair.public().modulus_len()];
        key_pair
            .sign(
                self.into_signing_params(),
                &ring::rand::SystemRandom::new(),
                payload,
                &mut buf,
            )
            .map_err(|e| error::unexpected(e.to_string()))?;

        Ok(buf)
    }

    fn verify(
        &self,
        payload: &[u8],
        signature: &[u8],
        key: &Key,
    ) -> Result<bool, error::InvalidKeyProvided> {
        let pkey = pkey::public_key(key)?;
        pkey::require_type(&pkey, Id::RSA)?;
        require_length(pkey.bits())?;

        let rsa = pkey
            .rsa()
            .map_err(|e| error::key_rejected("unable to read RSA public key", e))?;

        let pk = RsaPublicKeyComponents {
            n: rsa.n().to_vec(),
            e: rsa.e().to_vec(),
        };

        Ok(pk
            .verify(self.into_verification_params(), payload, signature)
            .is_ok())
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(jws::Signer::algorithm_id(self))
    }
}
