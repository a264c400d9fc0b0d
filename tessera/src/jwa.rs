//! Signing algorithm families
//!
//! Each family exposes a `SigningAlgorithm` enum implementing
//! [`Signer`][crate::jws::Signer]. Asymmetric families parse their keys with
//! `openssl` and check the declared key type before doing any
//! cryptographic work.

#[cfg(feature = "ec")]
#[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
pub mod ec;
#[cfg(feature = "eddsa")]
#[cfg_attr(docsrs, doc(cfg(feature = "eddsa")))]
pub mod eddsa;
#[cfg(feature = "hmac")]
#[cfg_attr(docsrs, doc(cfg(feature = "hmac")))]
pub mod hmac;
#[cfg(feature = "rsa")]
#[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
pub mod rsa;

#[cfg(any(feature = "rsa", feature = "ec", feature = "eddsa"))]
mod pkey;
