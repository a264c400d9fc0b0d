//! This crate issues and verifies signed, claim-bearing tokens in the compact
//! serialization of the JSON Web Signature (JWS) standards:
//!
//! * JSON Web Signature (JWS): [RFC7515][]
//! * JSON Web Algorithms (JWA): [RFC7518][]
//! * JSON Web Token (JWT): [RFC7519][]
//!
//! Encrypted tokens (JWE) are not supported.
//!
//! [RFC7515]: https://tools.ietf.org/html/rfc7515
//! [RFC7518]: https://tools.ietf.org/html/rfc7518
//! [RFC7519]: https://tools.ietf.org/html/rfc7519
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use tessera::{jwa, validation, Configuration, Constraint, Key};
//! use tessera_clock::{Clock, System};
//!
//! let config = Configuration::for_symmetric_signer(
//!     jwa::hmac::SigningAlgorithm::HS256,
//!     Key::inline("a-string-secret-at-least-256-bits-long"),
//! );
//!
//! let now = System.now();
//! let token = config
//!     .builder()
//!     .issued_by("https://api.abc.com")
//!     .permitted_for("https://client.abc.com")
//!     .issued_at(now)
//!     .expires_at(now.saturating_add(Duration::from_secs(300)))
//!     .get_token(config.signer(), config.signing_key())
//!     .unwrap();
//!
//! let compact = token.to_jwt();
//! let parsed = config.parser().parse(compact.as_str()).unwrap();
//!
//! let signed_with = config.signed_with();
//! let issuer = validation::IssuedBy::new(["https://api.abc.com"]);
//! let audience = validation::PermittedFor::new("https://client.abc.com");
//! let timing = validation::LooseValidAt::new(System, Duration::from_secs(30));
//! let constraints: [&dyn Constraint; 4] = [&signed_with, &issuer, &audience, &timing];
//!
//! assert!(config.validator().validate(&parsed, &constraints).unwrap());
//! assert!(parsed.has_been_issued_by(&["https://api.abc.com"]));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

pub mod codec;
mod config;
pub mod error;
pub mod jwa;
pub mod jws;
pub mod jwt;
mod key;
pub mod validation;

#[cfg(test)]
pub(crate) mod test;

#[doc(inline)]
pub use config::Configuration;
#[doc(inline)]
pub use jws::Signer;
#[doc(inline)]
pub use jwt::{Builder, Jwt, JwtRef, Parser, Token};
#[doc(inline)]
pub use key::{Key, KeySource};
#[doc(inline)]
pub use validation::{Constraint, Validator};
