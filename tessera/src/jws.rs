//! Signing and verification of token sections
//!
//! Every algorithm family implements [`Signer`]. The [`Algorithm`] enum
//! wraps each family's algorithms so that a signer can be chosen by its
//! `alg` identifier at runtime.

use std::{collections::HashMap, fmt, str::FromStr, sync::Arc};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{error, jwa, Key};

/// A signing algorithm
///
/// Implementations interpret the [`Key`] they are given and must reject key
/// material of the wrong family with [`InvalidKeyProvided`][error::InvalidKeyProvided]
/// before invoking any cryptographic primitive.
pub trait Signer: Send + Sync {
    /// The identifier written into the `alg` header
    fn algorithm_id(&self) -> &'static str;

    /// Signs `payload` with `key`
    ///
    /// # Errors
    ///
    /// The key is unusable for this algorithm, or the primitive failed.
    fn sign(&self, payload: &[u8], key: &Key) -> Result<Vec<u8>, error::SigningError>;

    /// Checks `signature` over `payload` against `key`
    ///
    /// A signature that does not match is `Ok(false)`.
    ///
    /// # Errors
    ///
    /// The key is unusable for this algorithm.
    fn verify(
        &self,
        payload: &[u8],
        signature: &[u8],
        key: &Key,
    ) -> Result<bool, error::InvalidKeyProvided>;
}

impl<T: Signer + ?Sized> Signer for &T {
    #[inline]
    fn algorithm_id(&self) -> &'static str {
        T::algorithm_id(self)
    }

    #[inline]
    fn sign(&self, payload: &[u8], key: &Key) -> Result<Vec<u8>, error::SigningError> {
        T::sign(self, payload, key)
    }

    #[inline]
    fn verify(
        &self,
        payload: &[u8],
        signature: &[u8],
        key: &Key,
    ) -> Result<bool, error::InvalidKeyProvided> {
        T::verify(self, payload, signature, key)
    }
}

impl<T: Signer + ?Sized> Signer for Box<T> {
    #[inline]
    fn algorithm_id(&self) -> &'static str {
        T::algorithm_id(self)
    }

    #[inline]
    fn sign(&self, payload: &[u8], key: &Key) -> Result<Vec<u8>, error::SigningError> {
        T::sign(self, payload, key)
    }

    #[inline]
    fn verify(
        &self,
        payload: &[u8],
        signature: &[u8],
        key: &Key,
    ) -> Result<bool, error::InvalidKeyProvided> {
        T::verify(self, payload, signature, key)
    }
}

impl<T: Signer + ?Sized> Signer for Arc<T> {
    #[inline]
    fn algorithm_id(&self) -> &'static str {
        T::algorithm_id(self)
    }

    #[inline]
    fn sign(&self, payload: &[u8], key: &Key) -> Result<Vec<u8>, error::SigningError> {
        T::sign(self, payload, key)
    }

    #[inline]
    fn verify(
        &self,
        payload: &[u8],
        signature: &[u8],
        key: &Key,
    ) -> Result<bool, error::InvalidKeyProvided> {
        T::verify(self, payload, signature, key)
    }
}

/// Signing algorithms
///
/// There is no variant for unsecured tokens.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
#[non_exhaustive]
pub enum Algorithm {
    /// HMAC symmetric
    #[cfg(feature = "hmac")]
    #[cfg_attr(docsrs, doc(cfg(feature = "hmac")))]
    Hmac(jwa::hmac::SigningAlgorithm),

    /// RSA public/private key pair
    #[cfg(feature = "rsa")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
    Rsa(jwa::rsa::SigningAlgorithm),

    /// Elliptic curve cryptography
    #[cfg(feature = "ec")]
    #[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
    EllipticCurve(jwa::ec::SigningAlgorithm),

    /// Edwards-curve signatures
    #[cfg(feature = "eddsa")]
    #[cfg_attr(docsrs, doc(cfg(feature = "eddsa")))]
    EdDsa(jwa::eddsa::SigningAlgorithm),
}

#[cfg(feature = "hmac")]
#[cfg_attr(docsrs, doc(cfg(feature = "hmac")))]
impl Algorithm {
    /// The HS256 signing algorithm
    pub const HS256: Algorithm = Self::Hmac(jwa::hmac::SigningAlgorithm::HS256);
    /// The HS384 signing algorithm
    pub const HS384: Algorithm = Self::Hmac(jwa::hmac::SigningAlgorithm::HS384);
    /// The HS512 signing algorithm
    pub const HS512: Algorithm = Self::Hmac(jwa::hmac::SigningAlgorithm::HS512);
}

#[cfg(feature = "rsa")]
#[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
impl Algorithm {
    /// The RS256 signing algorithm
    pub const RS256: Algorithm = Self::Rsa(jwa::rsa::SigningAlgorithm::RS256);
    /// The RS384 signing algorithm
    pub const RS384: Algorithm = Self::Rsa(jwa::rsa::SigningAlgorithm::RS384);
    /// The RS512 signing algorithm
    pub const RS512: Algorithm = Self::Rsa(jwa::rsa::SigningAlgorithm::RS512);
    /// The PS256 signing algorithm
    pub const PS256: Algorithm = Self::Rsa(jwa::rsa::SigningAlgorithm::PS256);
    /// The PS384 signing algorithm
    pub const PS384: Algorithm = Self::Rsa(jwa::rsa::SigningAlgorithm::PS384);
    /// The PS512 signing algorithm
    pub const PS512: Algorithm = Self::Rsa(jwa::rsa::SigningAlgorithm::PS512);
}

#[cfg(feature = "ec")]
#[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
impl Algorithm {
    /// The ES256 signing algorithm
    pub const ES256: Algorithm = Self::EllipticCurve(jwa::ec::SigningAlgorithm::ES256);
    /// The ES384 signing algorithm
    pub const ES384: Algorithm = Self::EllipticCurve(jwa::ec::SigningAlgorithm::ES384);
    /// The ES512 signing algorithm
    pub const ES512: Algorithm = Self::EllipticCurve(jwa::ec::SigningAlgorithm::ES512);
}

#[cfg(feature = "eddsa")]
#[cfg_attr(docsrs, doc(cfg(feature = "eddsa")))]
impl Algorithm {
    /// The EdDSA signing algorithm over Ed25519
    pub const EDDSA: Algorithm = Self::EdDsa(jwa::eddsa::SigningAlgorithm::EdDSA);
}

impl Algorithm {
    /// Every algorithm enabled in this build
    #[must_use]
    pub fn all() -> Vec<Algorithm> {
        #[allow(unused_mut)]
        let mut algs = Vec::new();

        #[cfg(feature = "hmac")]
        algs.extend(jwa::hmac::SigningAlgorithm::ALL.iter().copied().map(Self::Hmac));

        #[cfg(feature = "rsa")]
        algs.extend(jwa::rsa::SigningAlgorithm::ALL.iter().copied().map(Self::Rsa));

        #[cfg(feature = "ec")]
        algs.extend(
            jwa::ec::SigningAlgorithm::ALL
                .iter()
                .copied()
                .map(Self::EllipticCurve),
        );

        #[cfg(feature = "eddsa")]
        algs.extend(jwa::eddsa::SigningAlgorithm::ALL.iter().copied().map(Self::EdDsa));

        algs
    }

    /// Looks up an algorithm by its `alg` identifier
    #[must_use]
    pub fn by_id(id: &str) -> Option<Self> {
        REGISTRY.get(id).copied()
    }
}

static REGISTRY: Lazy<HashMap<&'static str, Algorithm>> = Lazy::new(|| {
    Algorithm::all()
        .into_iter()
        .map(|alg| (alg.algorithm_id(), alg))
        .collect()
});

impl FromStr for Algorithm {
    type Err = error::UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::by_id(s).ok_or_else(|| error::unknown_algorithm(s))
    }
}

impl Signer for Algorithm {
    fn algorithm_id(&self) -> &'static str {
        match self {
            #[cfg(feature = "hmac")]
            Self::Hmac(alg) => alg.algorithm_id(),

            #[cfg(feature = "rsa")]
            Self::Rsa(alg) => alg.algorithm_id(),

            #[cfg(feature = "ec")]
            Self::EllipticCurve(alg) => alg.algorithm_id(),

            #[cfg(feature = "eddsa")]
            Self::EdDsa(alg) => alg.algorithm_id(),

            #[cfg(not(any(feature = "hmac", feature = "rsa", feature = "ec", feature = "eddsa")))]
            _ => unreachable!(),
        }
    }

    fn sign(&self, payload: &[u8], key: &Key) -> Result<Vec<u8>, error::SigningError> {
        match self {
            #[cfg(feature = "hmac")]
            Self::Hmac(alg) => alg.sign(payload, key),

            #[cfg(feature = "rsa")]
            Self::Rsa(alg) => alg.sign(payload, key),

            #[cfg(feature = "ec")]
            Self::EllipticCurve(alg) => alg.sign(payload, key),

            #[cfg(feature = "eddsa")]
            Self::EdDsa(alg) => alg.sign(payload, key),

            #[cfg(not(any(feature = "hmac", feature = "rsa", feature = "ec", feature = "eddsa")))]
            _ => unreachable!(),
        }
    }

    fn verify(
        &self,
        payload: &[u8],
        signature: &[u8],
        key: &Key,
    ) -> Result<bool, error::InvalidKeyProvided> {
        match self {
            #[cfg(feature = "hmac")]
            Self::Hmac(alg) => alg.verify(payload, signature, key),

            #[cfg(feature = "rsa")]
            Self::Rsa(alg) => alg.verify(payload, signature, key),

            #[cfg(feature = "ec")]
            Self::EllipticCurve(alg) => alg.verify(payload, signature, key),

            #[cfg(feature = "eddsa")]
            Self::EdDsa(alg) => alg.verify(payload, signature, key),

            #[cfg(not(any(feature = "hmac", feature = "rsa", feature = "ec", feature = "eddsa")))]
            _ => unreachable!(),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.algorithm_id())
    }
}
