//! Constraint-based token validation
//!
//! A [`Validator`] checks a parsed [`Token`] against a list of
//! [`Constraint`]s. Each constraint is configured when it is constructed and
//! never modifies the token.
//!
//! ```
//! use std::time::Duration;
//!
//! use tessera::{jwa, jwt, validation, Constraint, Key, Validator};
//! use tessera_clock::{System, UnixTime};
//!
//! let key = Key::inline("a-string-secret-at-least-256-bits-long");
//! let alg = jwa::hmac::SigningAlgorithm::HS256;
//!
//! let token = jwt::Builder::new()
//!     .issued_by("https://api.abc.com")
//!     .issued_at(UnixTime::from_secs(1_516_239_022))
//!     .get_token(&alg, &key)
//!     .unwrap();
//!
//! let constraints: Vec<Box<dyn Constraint>> = vec![
//!     Box::new(validation::SignedWith::new(alg, key)),
//!     Box::new(validation::IssuedBy::new(["https://api.abc.com"])),
//!     Box::new(validation::LooseValidAt::new(System, Duration::from_secs(30))),
//! ];
//!
//! Validator::new().assert(&token, &constraints).unwrap();
//! ```

use std::sync::Arc;

use crate::{error, jwt::Token};

mod claims;
mod signed_with;
mod timing;

pub use claims::{
    HasClaim, HasClaimWithValue, IdentifiedBy, IssuedBy, PermittedFor, RelatedTo,
    RelatedToMatching,
};
pub use signed_with::SignedWith;
pub use timing::{LooseValidAt, StrictValidAt};

/// A single predicate over a token
pub trait Constraint: Send + Sync {
    /// Checks the token against this constraint
    ///
    /// # Errors
    ///
    /// The token does not satisfy the constraint, or the constraint itself
    /// holds unusable key material.
    fn assert(&self, token: &Token) -> Result<(), error::ConstraintError>;
}

impl<T: Constraint + ?Sized> Constraint for &T {
    #[inline]
    fn assert(&self, token: &Token) -> Result<(), error::ConstraintError> {
        T::assert(self, token)
    }
}

impl<T: Constraint + ?Sized> Constraint for Box<T> {
    #[inline]
    fn assert(&self, token: &Token) -> Result<(), error::ConstraintError> {
        T::assert(self, token)
    }
}

impl<T: Constraint + ?Sized> Constraint for Arc<T> {
    #[inline]
    fn assert(&self, token: &Token) -> Result<(), error::ConstraintError> {
        T::assert(self, token)
    }
}

/// Checks tokens against constraints
#[derive(Clone, Copy, Debug, Default)]
pub struct Validator;

impl Validator {
    /// Creates a validator
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Whether the token satisfies every constraint
    ///
    /// Constraints are checked in order and checking stops at the first
    /// violation.
    ///
    /// # Errors
    ///
    /// No constraints were given, or a constraint holds unusable key
    /// material. A violated constraint is never an error here.
    pub fn validate<C: Constraint>(
        &self,
        token: &Token,
        constraints: &[C],
    ) -> Result<bool, error::ValidationError> {
        if constraints.is_empty() {
            return Err(error::ValidationError::NoConstraintsGiven);
        }

        for constraint in constraints {
            match constraint.assert(token) {
                Ok(()) => {}
                Err(error::ConstraintError::Violated(violation)) => {
                    tracing::debug!(%violation, "token failed validation");
                    return Ok(false);
                }
                Err(error::ConstraintError::InvalidKey(err)) => return Err(err.into()),
            }
        }

        tracing::trace!("token is valid");
        Ok(true)
    }

    /// Checks every constraint, reporting all violations together
    ///
    /// # Errors
    ///
    /// One or more constraints were violated, no constraints were given, or a
    /// constraint holds unusable key material. Unusable key material is
    /// reported as soon as it is found.
    pub fn assert<C: Constraint>(
        &self,
        token: &Token,
        constraints: &[C],
    ) -> Result<(), error::ValidationError> {
        if constraints.is_empty() {
            return Err(error::ValidationError::NoConstraintsGiven);
        }

        let mut violations = Vec::new();
        for constraint in constraints {
            match constraint.assert(token) {
                Ok(()) => {}
                Err(error::ConstraintError::Violated(violation)) => violations.push(violation),
                Err(error::ConstraintError::InvalidKey(err)) => return Err(err.into()),
            }
        }

        if violations.is_empty() {
            tracing::trace!("token is valid");
            Ok(())
        } else {
            tracing::debug!(violations = violations.len(), "token failed validation");
            Err(error::required_constraints_violated(violations).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use color_eyre::Result;
    use tessera_clock::{TestClock, UnixTime};
    use tracing_test::traced_test;

    use super::*;
    use crate::{jwa, jwt::Builder, test, Key};

    fn secret() -> Key {
        Key::inline(test::hmac::SECRET)
    }

    fn token() -> Result<Token> {
        Ok(Builder::new()
            .issued_by("https://api.abc.com")
            .related_to("user-1")
            .permitted_for("https://client.abc.com")
            .expires_at(UnixTime::from_secs(2_000))
            .get_token(&jwa::hmac::SigningAlgorithm::HS256, &secret())?)
    }

    fn signed_with() -> SignedWith<jwa::hmac::SigningAlgorithm> {
        SignedWith::new(jwa::hmac::SigningAlgorithm::HS256, secret())
    }

    #[test]
    fn no_constraints_is_an_error() -> Result<()> {
        let none: &[&dyn Constraint] = &[];
        assert!(matches!(
            Validator::new().validate(&token()?, none),
            Err(error::ValidationError::NoConstraintsGiven)
        ));
        assert!(matches!(
            Validator::new().assert(&token()?, none),
            Err(error::ValidationError::NoConstraintsGiven)
        ));
        Ok(())
    }

    #[test]
    fn valid_token_passes() -> Result<()> {
        let signed = signed_with();
        let issuer = IssuedBy::new(["https://api.abc.com"]);
        let timing = LooseValidAt::new(TestClock::new(UnixTime::from_secs(1_000)), Duration::ZERO);
        let constraints: [&dyn Constraint; 3] = [&signed, &issuer, &timing];

        assert!(Validator::new().validate(&token()?, &constraints)?);
        Validator::new().assert(&token()?, &constraints)?;
        Ok(())
    }

    #[test]
    #[traced_test]
    fn validate_stops_at_first_violation() -> Result<()> {
        let audience = PermittedFor::new("https://other.abc.com");
        let subject = RelatedTo::new("user-2");
        let constraints: [&dyn Constraint; 2] = [&audience, &subject];

        assert!(!Validator::new().validate(&token()?, &constraints)?);
        assert!(logs_contain("PermittedFor"));
        assert!(!logs_contain("RelatedTo:"));
        Ok(())
    }

    #[test]
    fn assert_collects_every_violation() -> Result<()> {
        let audience = PermittedFor::new("https://other.abc.com");
        let signed = signed_with();
        let subject = RelatedTo::new("user-2");
        let constraints: [&dyn Constraint; 3] = [&audience, &signed, &subject];

        let err = Validator::new()
            .assert(&token()?, &constraints)
            .unwrap_err();
        assert!(err.is_violation());

        let names: Vec<_> = err.violations().iter().map(|v| v.constraint()).collect();
        assert_eq!(names, ["PermittedFor", "RelatedTo"]);

        let message = err.to_string();
        assert!(message.starts_with("the token violates some mandatory constraints, details:\n- "));
        assert_eq!(message.lines().count(), 3);
        Ok(())
    }

    #[test]
    fn invalid_key_is_an_error_not_a_violation() -> Result<()> {
        let signed = SignedWith::new(jwa::hmac::SigningAlgorithm::HS256, Key::inline(Vec::new()));
        let subject = RelatedTo::new("user-2");
        let constraints: [&dyn Constraint; 2] = [&subject, &signed];

        let err = Validator::new()
            .validate(&token()?, &[&signed])
            .unwrap_err();
        assert!(matches!(err, error::ValidationError::InvalidKey(_)));

        let err = Validator::new()
            .assert(&token()?, &constraints)
            .unwrap_err();
        assert!(matches!(err, error::ValidationError::InvalidKey(_)));
        Ok(())
    }

    #[test]
    fn accepts_shared_constraints() -> Result<()> {
        let constraints: Vec<Arc<dyn Constraint>> = vec![
            Arc::new(signed_with()),
            Arc::new(PermittedFor::new("https://client.abc.com")),
        ];

        assert!(Validator::new().validate(&token()?, &constraints)?);
        Ok(())
    }
}
