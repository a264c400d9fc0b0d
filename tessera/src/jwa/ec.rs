//! Elliptic curve signing algorithms
//!
//! Signatures travel as fixed-length `r‖s` values and are converted to and
//! from DER around the `openssl` primitive. See [`conversion`].

use std::fmt;

use openssl::{
    error::ErrorStack,
    hash::MessageDigest,
    nid::Nid,
    pkey::{Id, PKeyRef},
    sign::{Signer as OpensslSigner, Verifier},
};
use serde::{Deserialize, Serialize};

use super::pkey;
use crate::{error, jws, Key};

pub mod conversion;

/// A named curve
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Curve {
    /// The P-256 curve (prime256v1/secp256r1)
    #[serde(rename = "P-256")]
    P256,

    /// The P-384 curve (secp384r1)
    #[serde(rename = "P-384")]
    P384,

    /// The P-521 curve (secp521r1)
    #[serde(rename = "P-521")]
    P521,
}

impl Curve {
    /// The size in bytes of a single coordinate on this curve
    #[must_use]
    pub fn coordinate_len(self) -> usize {
        match self {
            Curve::P256 => 32,
            Curve::P384 => 48,
            Curve::P521 => 66,
        }
    }

    fn nid(self) -> Nid {
        match self {
            Curve::P256 => Nid::X9_62_PRIME256V1,
            Curve::P384 => Nid::SECP384R1,
            Curve::P521 => Nid::SECP521R1,
        }
    }

    fn from_nid(nid: Nid) -> Option<Self> {
        if nid == Nid::X9_62_PRIME256V1 {
            Some(Curve::P256)
        } else if nid == Nid::SECP384R1 {
            Some(Curve::P384)
        } else if nid == Nid::SECP521R1 {
            Some(Curve::P521)
        } else {
            None
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Curve::P256 => "P-256",
            Curve::P384 => "P-384",
            Curve::P521 => "P-521",
        })
    }
}

/// Elliptic curve signing algorithms
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[allow(clippy::upper_case_acronyms)]
#[non_exhaustive]
pub enum SigningAlgorithm {
    /// Elliptic curve cryptography using P-256 and SHA-256
    ES256,
    /// Elliptic curve cryptography using P-384 and SHA-384
    ES384,
    /// Elliptic curve cryptography using P-521 and SHA-512
    ES512,
}

impl SigningAlgorithm {
    pub(crate) const ALL: [Self; 3] = [Self::ES256, Self::ES384, Self::ES512];

    /// The curve keys for this algorithm must be on
    #[must_use]
    pub fn curve(self) -> Curve {
        match self {
            Self::ES256 => Curve::P256,
            Self::ES384 => Curve::P384,
            Self::ES512 => Curve::P521,
        }
    }

    /// The size in bytes of a fixed-length signature
    #[must_use]
    pub fn signature_size(self) -> usize {
        self.curve().coordinate_len() * 2
    }

    fn digest(self) -> MessageDigest {
        match self {
            Self::ES256 => MessageDigest::sha256(),
            Self::ES384 => MessageDigest::sha384(),
            Self::ES512 => MessageDigest::sha512(),
        }
    }

    fn check_key<T>(self, pkey: &PKeyRef<T>) -> Result<(), error::InvalidKeyProvided>
    where
        T: openssl::pkey::HasParams,
    {
        pkey::require_type(pkey, Id::EC)?;

        let ec = pkey
            .ec_key()
            .map_err(|e| error::key_rejected("unable to read EC key", e))?;
        let actual = ec.group().curve_name().and_then(Curve::from_nid);

        if actual == Some(self.curve()) {
            Ok(())
        } else {
            let actual = actual.map_or_else(|| "unknown".to_owned(), |c| c.to_string());
            tracing::debug!(expected = %self.curve(), %actual, "curve mismatch");
            Err(error::invalid_key(format!(
                "curve mismatch: expected \"{}\", got \"{}\"",
                self.curve(),
                actual
            )))
        }
    }
}

impl From<SigningAlgorithm> for jws::Algorithm {
    fn from(alg: SigningAlgorithm) -> Self {
        Self::EllipticCurve(alg)
    }
}

impl jws::Signer for SigningAlgorithm {
    fn algorithm_id(&self) -> &'static str {
        match self {
            Self::ES256 => "ES256",
            Self::ES384 => "ES384",
            Self::ES512 => "ES512",
        }
    }

    fn sign(&self, payload: &[u8], key: &Key) -> Result<Vec<u8>, error::SigningError> {
        let pkey = pkey::private_key(key)?;
        self.check_key(&pkey)?;

        let der = OpensslSigner::new(self.digest(), &pkey)
            .and_then(|mut signer| {
                signer.update(payload)?;
                signer.sign_to_vec()
            })
            .map_err(error::unexpected)?;

        let fixed = conversion::der_to_fixed(&der, self.curve().coordinate_len())
            .map_err(error::unexpected)?;

        Ok(fixed)
    }

    fn verify(
        &self,
        payload: &[u8],
        signature: &[u8],
        key: &Key,
    ) -> Result<bool, error::InvalidKeyProvided> {
        let pkey = pkey::public_key(key)?;
        self.check_key(&pkey)?;

        if signature.len() != self.signature_size() {
            tracing::trace!(
                expected = self.signature_size(),
                actual = signature.len(),
                "signature has the wrong length"
            );
            return Ok(false);
        }

        let der = match conversion::fixed_to_der(signature, self.curve().coordinate_len()) {
            Ok(der) => der,
            Err(_) => return Ok(false),
        };

        let mut verifier = Verifier::new(self.digest(), &pkey)
            .map_err(|e| error::key_rejected("unable to verify with EC key", e))?;
        verifier
            .update(payload)
            .map_err(|e| error::key_rejected("unable to verify with EC key", e))?;

        Ok(signature_matched(verifier.verify(&der)))
    }
}

/// A signature the primitive cannot check at all is reported as a mismatch
fn signature_matched(outcome: Result<bool, ErrorStack>) -> bool {
    outcome.unwrap_or_else(|error| {
        tracing::debug!(%error, "ECDSA signature could not be checked");
        false
    })
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(jws::Signer::algorithm_id(self))
    }
}
