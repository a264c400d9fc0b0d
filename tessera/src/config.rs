//! A signer and its keys, bundled for issuing and verifying tokens

use std::{fmt, sync::Arc};

use crate::{
    error,
    jws::{self, Signer},
    jwt::{Builder, Parser},
    validation::{Constraint, SignedWith, Validator},
    Key,
};

/// A signer, its keys, and the default validation constraints
///
/// A configuration is built once and is read-only afterwards. It can be
/// shared freely across threads.
///
/// ```
/// use tessera::{jwa, validation::IssuedBy, Configuration, Constraint, Key};
/// use std::sync::Arc;
///
/// let config = Configuration::for_symmetric_signer(
///     jwa::hmac::SigningAlgorithm::HS256,
///     Key::inline("a-string-secret-at-least-256-bits-long"),
/// )
/// .with_validation_constraints(vec![
///     Arc::new(IssuedBy::new(["https://api.abc.com"])) as Arc<dyn Constraint>,
/// ]);
///
/// let token = config
///     .builder()
///     .issued_by("https://api.abc.com")
///     .get_token(config.signer(), config.signing_key())
///     .unwrap();
///
/// let parsed = config.parser().parse(token.to_jwt().as_str()).unwrap();
///
/// assert!(config.validator().validate(&parsed, &[config.signed_with()]).unwrap());
/// config.validator().assert(&parsed, config.validation_constraints()).unwrap();
/// ```
#[derive(Clone)]
pub struct Configuration {
    signer: Arc<dyn Signer>,
    signing_key: Key,
    verification_key: Key,
    constraints: Vec<Arc<dyn Constraint>>,
}

impl Configuration {
    /// Uses the same key to sign and to verify
    pub fn for_symmetric_signer(signer: impl Signer + 'static, key: Key) -> Self {
        Self::for_asymmetric_signer(signer, key.clone(), key)
    }

    /// Uses separate keys to sign and to verify
    pub fn for_asymmetric_signer(
        signer: impl Signer + 'static,
        signing_key: Key,
        verification_key: Key,
    ) -> Self {
        tracing::trace!(alg = signer.algorithm_id(), "configured signer");
        Self {
            signer: Arc::new(signer),
            signing_key,
            verification_key,
            constraints: Vec::new(),
        }
    }

    /// Looks up the signer by its `alg` identifier
    ///
    /// For symmetric algorithms pass the same key twice.
    ///
    /// # Errors
    ///
    /// The identifier does not name a supported algorithm.
    pub fn for_algorithm_id(
        id: &str,
        signing_key: Key,
        verification_key: Key,
    ) -> Result<Self, error::UnknownAlgorithm> {
        let alg: jws::Algorithm = id.parse()?;
        Ok(Self::for_asymmetric_signer(alg, signing_key, verification_key))
    }

    /// Sets the constraints tokens are checked against by default
    #[must_use]
    pub fn with_validation_constraints<I>(mut self, constraints: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Constraint>>,
    {
        self.constraints = constraints.into_iter().collect();
        self
    }

    /// A fresh token builder
    pub fn builder(&self) -> Builder {
        Builder::new()
    }

    /// The token parser
    #[must_use]
    pub fn parser(&self) -> Parser {
        Parser::new()
    }

    /// The token validator
    #[must_use]
    pub fn validator(&self) -> Validator {
        Validator::new()
    }

    /// The configured signer
    #[must_use]
    pub fn signer(&self) -> &dyn Signer {
        &*self.signer
    }

    /// The key used to sign tokens
    pub fn signing_key(&self) -> &Key {
        &self.signing_key
    }

    /// The key used to verify tokens
    pub fn verification_key(&self) -> &Key {
        &self.verification_key
    }

    /// The default validation constraints
    #[must_use]
    pub fn validation_constraints(&self) -> &[Arc<dyn Constraint>] {
        &self.constraints
    }

    /// A constraint requiring a valid signature from the configured signer
    pub fn signed_with(&self) -> SignedWith<Arc<dyn Signer>> {
        SignedWith::new(Arc::clone(&self.signer), self.verification_key.clone())
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("algorithm", &self.signer.algorithm_id())
            .field("signing_key", &self.signing_key)
            .field("verification_key", &self.verification_key)
            .field("constraints", &self.constraints.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use color_eyre::Result;
    use tessera_clock::{TestClock, UnixTime};

    use super::*;
    use crate::{
        jwa,
        test,
        validation::{IssuedBy, PermittedFor, StrictValidAt},
    };

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn shareable_across_threads() {
        assert_send_sync::<Configuration>();
    }

    #[test]
    fn issue_and_validate_symmetric() -> Result<()> {
        let now = UnixTime::from_secs(1_600_000_000);
        let constraints: Vec<Arc<dyn Constraint>> = vec![
            Arc::new(IssuedBy::new(["https://api.abc.com"])),
            Arc::new(PermittedFor::new("https://client.abc.com")),
            Arc::new(StrictValidAt::new(TestClock::new(now), Duration::from_secs(5))),
        ];
        let config = Configuration::for_symmetric_signer(
            jwa::hmac::SigningAlgorithm::HS256,
            Key::inline(test::hmac::SECRET),
        )
        .with_validation_constraints(constraints);

        let token = config
            .builder()
            .issued_by("https://api.abc.com")
            .permitted_for("https://client.abc.com")
            .issued_at(now)
            .can_only_be_used_after(now)
            .expires_at(now.saturating_add(Duration::from_secs(60)))
            .get_token(config.signer(), config.signing_key())?;

        let parsed = config.parser().parse(token.to_jwt().as_str())?;
        config.validator().assert(&parsed, config.validation_constraints())?;
        assert!(config
            .validator()
            .validate(&parsed, &[config.signed_with()])?);
        Ok(())
    }

    #[test]
    #[cfg(feature = "rsa")]
    fn asymmetric_keys_are_kept_apart() -> Result<()> {
        let config = Configuration::for_asymmetric_signer(
            jwa::rsa::SigningAlgorithm::RS256,
            Key::inline(test::rsa::PRIVATE),
            Key::inline(test::rsa::PUBLIC),
        );

        let token = config
            .builder()
            .related_to("user-1")
            .get_token(config.signer(), config.signing_key())?;
        assert!(config.validator().validate(&token, &[config.signed_with()])?);

        let other = Configuration::for_asymmetric_signer(
            jwa::rsa::SigningAlgorithm::RS256,
            Key::inline(test::rsa::ALT_PRIVATE),
            Key::inline(test::rsa::ALT_PUBLIC),
        );
        assert!(!other.validator().validate(&token, &[other.signed_with()])?);
        Ok(())
    }

    #[test]
    #[cfg(feature = "ec")]
    fn signer_by_algorithm_id() -> Result<()> {
        let config = Configuration::for_algorithm_id(
            "ES256",
            Key::inline(test::ec::P256_PRIVATE),
            Key::inline(test::ec::P256_PUBLIC),
        )?;
        assert_eq!(config.signer().algorithm_id(), "ES256");

        let parsed = config.parser().parse(test::ec::ES256_TOKEN)?;
        assert!(config.validator().validate(&parsed, &[config.signed_with()])?);
        Ok(())
    }

    #[test]
    fn unknown_algorithm_id() {
        let err = Configuration::for_algorithm_id("none", Key::inline("a"), Key::inline("a"))
            .unwrap_err();
        assert_eq!(err.to_string(), "'none' does not match supported algorithms");
    }

    #[test]
    fn debug_hides_keys() {
        let config = Configuration::for_symmetric_signer(
            jwa::hmac::SigningAlgorithm::HS512,
            Key::inline(test::hmac::SECRET),
        );
        let debug = format!("{:?}", config);
        assert!(debug.contains("HS512"));
        assert!(!debug.contains(test::hmac::SECRET));
    }
}
