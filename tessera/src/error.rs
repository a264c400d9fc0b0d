//! Common errors

#![allow(missing_copy_implementations)]

use std::{error::Error as StdError, fmt};

use thiserror::Error;

/// The provided name could not be matched with supported algorithms
#[derive(Debug, Error)]
#[error("'{alg}' does not match supported algorithms")]
pub struct UnknownAlgorithm {
    alg: String,
}

impl UnknownAlgorithm {
    /// The algorithm identifier that was requested
    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.alg
    }
}

#[inline]
pub(crate) fn unknown_algorithm(alg: impl Into<String>) -> UnknownAlgorithm {
    UnknownAlgorithm { alg: alg.into() }
}

/// The key cannot be used with the requested algorithm
///
/// Raised when key material cannot be parsed at all, when it belongs to the
/// wrong key family, when its size does not fit the algorithm, or when a
/// symmetric key is empty.
#[derive(Debug, Error)]
#[error("invalid key provided: {reason}")]
pub struct InvalidKeyProvided {
    reason: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl InvalidKeyProvided {
    /// A human-readable reason for the rejection
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

pub(crate) fn invalid_key(reason: impl Into<String>) -> InvalidKeyProvided {
    InvalidKeyProvided {
        reason: reason.into(),
        source: None,
    }
}

pub(crate) fn key_rejected(
    reason: impl Into<String>,
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> InvalidKeyProvided {
    InvalidKeyProvided {
        reason: reason.into(),
        source: Some(source.into()),
    }
}

pub(crate) fn key_type_mismatch(expected: &str, actual: &str) -> InvalidKeyProvided {
    invalid_key(format!(
        "key type mismatch: expected \"{}\", got \"{}\"",
        expected, actual
    ))
}

/// Unexpected error (possibly a bug)
#[derive(Debug, Error)]
#[error("unexpected error")]
pub struct Unexpected {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn unexpected(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> Unexpected {
    Unexpected {
        source: source.into(),
    }
}

/// An error occurring while creating a signature
#[derive(Debug, Error)]
pub enum SigningError {
    /// The key cannot be used for signing with this algorithm
    #[error(transparent)]
    InvalidKey(#[from] InvalidKeyProvided),

    /// An unexpected error from the cryptographic primitive
    #[error(transparent)]
    Unexpected(#[from] Unexpected),
}

impl SigningError {
    /// Whether the error is due to unusable key material
    #[must_use]
    pub fn is_invalid_key(&self) -> bool {
        matches!(self, Self::InvalidKey(_))
    }
}

/// The token is not split into the expected header, claims, and signature
/// sections
#[derive(Clone, Debug, Error)]
#[error("malformed token: {reason}")]
pub struct MalformedToken {
    reason: &'static str,
}

pub(crate) fn malformed_token(reason: &'static str) -> MalformedToken {
    MalformedToken { reason }
}

/// The token header section is malformed
#[derive(Debug, Error)]
#[error("malformed token header")]
pub struct MalformedHeader {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn malformed_header(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> MalformedHeader {
    MalformedHeader {
        source: source.into(),
    }
}

/// The token claims section is malformed
#[derive(Debug, Error)]
#[error("malformed token claims")]
pub struct MalformedClaims {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn malformed_claims(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> MalformedClaims {
    MalformedClaims {
        source: source.into(),
    }
}

/// The token signature section is malformed
#[derive(Debug, Error)]
#[error("malformed token signature")]
pub struct MalformedSignature {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn malformed_signature(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> MalformedSignature {
    MalformedSignature {
        source: source.into(),
    }
}

/// A claim value does not have the shape its name requires
#[derive(Clone, Debug, Error)]
#[error("invalid value for claim '{claim}': {reason}")]
pub struct InvalidClaimValue {
    claim: String,
    reason: String,
}

pub(crate) fn invalid_claim_value(
    claim: impl Into<String>,
    reason: impl Into<String>,
) -> InvalidClaimValue {
    InvalidClaimValue {
        claim: claim.into(),
        reason: reason.into(),
    }
}

/// An ECDSA signature could not be converted between its DER and
/// fixed-length forms
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("malformed ECDSA signature: {reason}")]
pub struct MalformedEcdsaSignature {
    reason: &'static str,
}

pub(crate) const fn malformed_ecdsa_signature(reason: &'static str) -> MalformedEcdsaSignature {
    MalformedEcdsaSignature { reason }
}

/// The token header carries a parameter that this crate does not support
#[derive(Clone, Debug, Error)]
#[error("unsupported header found: '{header}'")]
pub struct UnsupportedHeader {
    header: String,
}

pub(crate) fn unsupported_header(header: impl Into<String>) -> UnsupportedHeader {
    UnsupportedHeader {
        header: header.into(),
    }
}

/// A structural failure while parsing a compact token
///
/// These are never reported as a failed validation.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The token does not have a discernible header, claims, and signature
    #[error(transparent)]
    MalformedToken(#[from] MalformedToken),

    /// The token header is malformed
    #[error(transparent)]
    MalformedHeader(#[from] MalformedHeader),

    /// The token claims are malformed
    #[error(transparent)]
    MalformedClaims(#[from] MalformedClaims),

    /// The token signature is malformed
    #[error(transparent)]
    MalformedSignature(#[from] MalformedSignature),

    /// The token requests a feature that is not supported
    #[error(transparent)]
    UnsupportedHeader(#[from] UnsupportedHeader),
}

/// A registered claim was set through the generic claim setter
#[derive(Clone, Debug, Error)]
#[error("registered claim '{name}' must be set through its dedicated builder method")]
pub struct RegisteredClaimGiven {
    name: String,
}

pub(crate) fn registered_claim_given(name: impl Into<String>) -> RegisteredClaimGiven {
    RegisteredClaimGiven { name: name.into() }
}

/// A generic claim constraint was asked to check a registered claim
#[derive(Clone, Debug, Error)]
#[error("registered claim '{name}' must be validated by its dedicated constraint")]
pub struct CannotValidateARegisteredClaim {
    name: String,
}

pub(crate) fn cannot_validate_registered_claim(
    name: impl Into<String>,
) -> CannotValidateARegisteredClaim {
    CannotValidateARegisteredClaim { name: name.into() }
}

/// A single failed constraint
///
/// Violations are collected by the validator and never returned on their own.
#[derive(Debug, Error)]
#[error("{constraint}: {message}")]
pub struct ConstraintViolation {
    constraint: &'static str,
    message: String,
    #[source]
    cause: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl ConstraintViolation {
    /// Creates a violation reported by the named constraint
    pub fn new(constraint: &'static str, message: impl Into<String>) -> Self {
        Self {
            constraint,
            message: message.into(),
            cause: None,
        }
    }

    /// Attaches the underlying cause of the violation
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// The name of the constraint that failed
    #[must_use]
    pub fn constraint(&self) -> &'static str {
        self.constraint
    }

    /// The failure message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The underlying cause, when the constraint recorded one
    #[must_use]
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

/// One or more required constraints were not satisfied
#[derive(Debug, Error)]
pub struct RequiredConstraintsViolated {
    violations: Vec<ConstraintViolation>,
}

impl RequiredConstraintsViolated {
    /// The individual violations, in evaluation order
    #[must_use]
    pub fn violations(&self) -> &[ConstraintViolation] {
        &self.violations
    }

    /// Extracts the individual violations
    #[must_use]
    pub fn into_violations(self) -> Vec<ConstraintViolation> {
        self.violations
    }
}

impl fmt::Display for RequiredConstraintsViolated {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("the token violates some mandatory constraints, details:")?;
        for violation in &self.violations {
            write!(f, "\n- {}", violation)?;
        }
        Ok(())
    }
}

pub(crate) fn required_constraints_violated(
    violations: Vec<ConstraintViolation>,
) -> RequiredConstraintsViolated {
    RequiredConstraintsViolated { violations }
}

/// An error produced by a single constraint
#[derive(Debug, Error)]
pub enum ConstraintError {
    /// The token does not satisfy the constraint
    #[error(transparent)]
    Violated(#[from] ConstraintViolation),

    /// The constraint was configured with unusable key material
    #[error(transparent)]
    InvalidKey(#[from] InvalidKeyProvided),
}

/// An error occurring while validating a token
#[derive(Debug, Error)]
pub enum ValidationError {
    /// One or more constraints were violated
    #[error(transparent)]
    ConstraintsViolated(#[from] RequiredConstraintsViolated),

    /// A constraint was configured with unusable key material
    #[error(transparent)]
    InvalidKey(#[from] InvalidKeyProvided),

    /// Validation was requested without any constraints
    #[error("no constraint given")]
    NoConstraintsGiven,
}

impl ValidationError {
    /// Whether the token itself failed one or more constraints
    #[must_use]
    pub fn is_violation(&self) -> bool {
        matches!(self, Self::ConstraintsViolated(_))
    }

    /// The collected violations, if the token failed validation
    #[must_use]
    pub fn violations(&self) -> &[ConstraintViolation] {
        match self {
            Self::ConstraintsViolated(v) => v.violations(),
            _ => &[],
        }
    }
}
