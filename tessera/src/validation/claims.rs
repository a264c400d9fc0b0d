use regex::Regex;

use super::Constraint;
use crate::{
    error,
    jwt::{claims, Token},
};

fn violated(constraint: &'static str, message: impl Into<String>) -> error::ConstraintError {
    error::ConstraintViolation::new(constraint, message).into()
}

/// Requires the `iss` claim to be one of the trusted issuers
#[derive(Clone, Debug)]
pub struct IssuedBy {
    issuers: Vec<String>,
}

impl IssuedBy {
    const NAME: &'static str = "IssuedBy";

    /// Trusts each of `issuers`
    pub fn new<I, S>(issuers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            issuers: issuers.into_iter().map(Into::into).collect(),
        }
    }
}

impl Constraint for IssuedBy {
    fn assert(&self, token: &Token) -> Result<(), error::ConstraintError> {
        if token.issuer().is_none() {
            return Err(violated(Self::NAME, "token has no issuer"));
        }

        if !token.has_been_issued_by(self.issuers.as_slice()) {
            return Err(violated(Self::NAME, "token was not issued by a trusted issuer"));
        }

        Ok(())
    }
}

/// Requires the `aud` claim to include an audience
#[derive(Clone, Debug)]
pub struct PermittedFor {
    audience: String,
}

impl PermittedFor {
    const NAME: &'static str = "PermittedFor";

    /// Requires `audience` to be listed
    pub fn new(audience: impl Into<String>) -> Self {
        Self {
            audience: audience.into(),
        }
    }
}

impl Constraint for PermittedFor {
    fn assert(&self, token: &Token) -> Result<(), error::ConstraintError> {
        if token.audiences().is_empty() {
            return Err(violated(Self::NAME, "token has no audience"));
        }

        if !token.is_permitted_for(&self.audience) {
            return Err(violated(
                Self::NAME,
                format!("token is not allowed to be used by '{}'", self.audience),
            ));
        }

        Ok(())
    }
}

/// Requires the `sub` claim to equal a subject
#[derive(Clone, Debug)]
pub struct RelatedTo {
    subject: String,
}

impl RelatedTo {
    const NAME: &'static str = "RelatedTo";

    /// Requires the subject to be `subject`
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }
}

impl Constraint for RelatedTo {
    fn assert(&self, token: &Token) -> Result<(), error::ConstraintError> {
        if token.subject().is_none() {
            return Err(violated(Self::NAME, "token has no subject"));
        }

        if !token.is_related_to(&self.subject) {
            return Err(violated(
                Self::NAME,
                format!("token is not related to '{}'", self.subject),
            ));
        }

        Ok(())
    }
}

/// Requires the `sub` claim to match a pattern
#[derive(Clone, Debug)]
pub struct RelatedToMatching {
    pattern: Regex,
}

impl RelatedToMatching {
    const NAME: &'static str = "RelatedToMatching";

    /// Requires the subject to match `pattern`
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }
}

impl Constraint for RelatedToMatching {
    fn assert(&self, token: &Token) -> Result<(), error::ConstraintError> {
        let subject = token
            .subject()
            .ok_or_else(|| violated(Self::NAME, "token has no subject"))?;

        if !self.pattern.is_match(subject.as_str()) {
            return Err(violated(
                Self::NAME,
                format!("subject does not match `{}`", self.pattern),
            ));
        }

        Ok(())
    }
}

/// Requires the `jti` claim to equal an identifier
#[derive(Clone, Debug)]
pub struct IdentifiedBy {
    id: String,
}

impl IdentifiedBy {
    const NAME: &'static str = "IdentifiedBy";

    /// Requires the token identifier to be `id`
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Constraint for IdentifiedBy {
    fn assert(&self, token: &Token) -> Result<(), error::ConstraintError> {
        if token.token_id().is_none() {
            return Err(violated(Self::NAME, "token has no identifier"));
        }

        if !token.is_identified_by(&self.id) {
            return Err(violated(
                Self::NAME,
                format!("token is not identified by '{}'", self.id),
            ));
        }

        Ok(())
    }
}

/// Requires a custom claim to be present
#[derive(Clone, Debug)]
pub struct HasClaim {
    name: String,
}

impl HasClaim {
    const NAME: &'static str = "HasClaim";

    /// Requires the claim `name`
    ///
    /// # Errors
    ///
    /// `name` is a registered claim, which has its own constraint.
    pub fn new(name: impl Into<String>) -> Result<Self, error::CannotValidateARegisteredClaim> {
        let name = name.into();
        if claims::is_registered(&name) {
            return Err(error::cannot_validate_registered_claim(name));
        }

        Ok(Self { name })
    }
}

impl Constraint for HasClaim {
    fn assert(&self, token: &Token) -> Result<(), error::ConstraintError> {
        if token.claims().has(&self.name) {
            Ok(())
        } else {
            Err(violated(
                Self::NAME,
                format!("the token does not have the claim '{}'", self.name),
            ))
        }
    }
}

/// Requires a custom claim to hold a specific value
#[derive(Clone, Debug)]
pub struct HasClaimWithValue {
    name: String,
    value: serde_json::Value,
}

impl HasClaimWithValue {
    const NAME: &'static str = "HasClaimWithValue";

    /// Requires the claim `name` to equal `value`
    ///
    /// # Errors
    ///
    /// `name` is a registered claim, which has its own constraint.
    pub fn new(
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Result<Self, error::CannotValidateARegisteredClaim> {
        let name = name.into();
        if claims::is_registered(&name) {
            return Err(error::cannot_validate_registered_claim(name));
        }

        Ok(Self {
            name,
            value: value.into(),
        })
    }
}

impl Constraint for HasClaimWithValue {
    fn assert(&self, token: &Token) -> Result<(), error::ConstraintError> {
        let value = token.claims().get(&self.name).ok_or_else(|| {
            violated(
                Self::NAME,
                format!("the token does not have the claim '{}'", self.name),
            )
        })?;

        if value.as_json() != Some(&self.value) {
            return Err(violated(
                Self::NAME,
                format!("the value of the claim '{}' is not the expected one", self.name),
            ));
        }

        Ok(())
    }
}
