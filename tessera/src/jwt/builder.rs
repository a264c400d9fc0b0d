use indexmap::IndexMap;
use tessera_clock::UnixTime;

use super::{claims, headers, DataSet, Signature, Token, Value};
use crate::{codec, error, jws::Signer, Key};

/// Assembles the headers and claims of a new token
///
/// Registered claims are set through their dedicated methods. The `typ`
/// header defaults to `JWT` and `alg` is always taken from the signer.
///
/// ```
/// use tessera::{jwa, jwt::Builder, Key};
/// use tessera_clock::UnixTime;
///
/// let token = Builder::new()
///     .issued_by("https://api.abc.com")
///     .related_to("user-1")
///     .permitted_for("https://client.abc.com")
///     .expires_at(UnixTime::from_secs(1_700_000_000))
///     .with_claim("scope", "read")
///     .unwrap()
///     .get_token(
///         &jwa::hmac::SigningAlgorithm::HS256,
///         &Key::inline("a-string-secret-at-least-256-bits-long"),
///     )
///     .unwrap();
///
/// assert_eq!(token.algorithm_id(), Some("HS256"));
/// assert!(token.is_permitted_for("https://client.abc.com"));
/// ```
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct Builder {
    headers: IndexMap<String, Value>,
    claims: IndexMap<String, Value>,
}

impl Builder {
    /// Creates a builder with no claims
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a header parameter
    ///
    /// Any `alg` given here is replaced by the signer's identifier.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.headers.insert(name.into(), Value::Json(value.into()));
        self
    }

    /// Sets a custom claim
    ///
    /// A [`Time`][Value::Time] is stored as its numeric seconds, the same
    /// JSON the parser reads back for an unregistered claim.
    ///
    /// # Errors
    ///
    /// `name` is one of the registered claims, which must be set through
    /// their dedicated methods.
    pub fn with_claim(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Self, error::RegisteredClaimGiven> {
        let name = name.into();
        if claims::is_registered(&name) {
            return Err(error::registered_claim_given(name));
        }

        let value = match value.into() {
            Value::Time(t) => Value::Json(codec::time_to_json(t)),
            value => value,
        };

        self.claims.insert(name, value);
        Ok(self)
    }

    /// Sets the `iss` claim
    pub fn issued_by(self, issuer: impl Into<String>) -> Self {
        self.set(claims::ISSUER, issuer.into())
    }

    /// Sets the `sub` claim
    pub fn related_to(self, subject: impl Into<String>) -> Self {
        self.set(claims::SUBJECT, subject.into())
    }

    /// Adds an audience to the `aud` claim
    ///
    /// The claim is always written as a list. Audiences already present are
    /// not added again.
    pub fn permitted_for(mut self, audience: impl Into<String>) -> Self {
        let audience = serde_json::Value::String(audience.into());
        let entry = self
            .claims
            .entry(claims::AUDIENCE.to_owned())
            .or_insert_with(|| Value::Json(serde_json::Value::Array(Vec::new())));

        if let Value::Json(serde_json::Value::Array(list)) = entry {
            if !list.contains(&audience) {
                list.push(audience);
            }
        }

        self
    }

    /// Sets the `jti` claim
    pub fn identified_by(self, id: impl Into<String>) -> Self {
        self.set(claims::ID, id.into())
    }

    /// Sets the `exp` claim
    pub fn expires_at(self, time: UnixTime) -> Self {
        self.set(claims::EXPIRATION_TIME, time)
    }

    /// Sets the `nbf` claim
    pub fn can_only_be_used_after(self, time: UnixTime) -> Self {
        self.set(claims::NOT_BEFORE, time)
    }

    /// Sets the `iat` claim
    pub fn issued_at(self, time: UnixTime) -> Self {
        self.set(claims::ISSUED_AT, time)
    }

    /// Encodes and signs the token
    ///
    /// # Errors
    ///
    /// Errors from the signer are returned unchanged.
    pub fn get_token<S>(&self, signer: &S, key: &Key) -> Result<Token, error::SigningError>
    where
        S: Signer + ?Sized,
    {
        let alg = signer.algorithm_id();
        let (headers, claims) = self.encode(alg).map_err(error::unexpected)?;

        let signing_input = format!("{}.{}", headers.encoded(), claims.encoded());
        let signature = signer.sign(signing_input.as_bytes(), key)?;

        tracing::trace!(alg, "token signed");
        Ok(Token::new(headers, claims, Some(Signature::new(signature))))
    }

    /// Encodes the token without a signature, declaring `alg` as `none`
    ///
    /// Such a token never satisfies a [`SignedWith`][crate::validation::SignedWith]
    /// constraint.
    ///
    /// # Errors
    ///
    /// The headers or claims could not be serialized.
    pub fn get_unsecured_token(&self) -> Result<Token, error::Unexpected> {
        let (headers, claims) = self
            .encode(headers::UNSECURED_ALGORITHM)
            .map_err(error::unexpected)?;

        Ok(Token::new(headers, claims, None))
    }

    fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.claims.insert(name.to_owned(), value.into());
        self
    }

    fn header_set(&self, alg: &str) -> IndexMap<String, Value> {
        let mut set = IndexMap::with_capacity(self.headers.len() + 2);

        let typ = self
            .headers
            .get(headers::TYPE)
            .cloned()
            .unwrap_or_else(|| headers::TOKEN_TYPE.into());
        set.insert(headers::TYPE.to_owned(), typ);
        set.insert(headers::ALGORITHM.to_owned(), alg.into());

        for (name, value) in &self.headers {
            if name != headers::TYPE && name != headers::ALGORITHM {
                set.insert(name.clone(), value.clone());
            }
        }

        set
    }

    fn encode(
        &self,
        alg: &str,
    ) -> Result<(DataSet, DataSet), Box<dyn std::error::Error + Send + Sync + 'static>> {
        let header_set = self.header_set(alg);
        let encoded_headers = codec::encode_section(&header_set, &[])?;
        let encoded_claims = codec::encode_section(&self.claims, codec::ENCODE_FORMATTERS)?;

        Ok((
            DataSet::new(header_set, encoded_headers),
            DataSet::new(self.claims.clone(), encoded_claims),
        ))
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;
    use serde_json::json;

    use super::*;
    use crate::{
        codec, jwa,
        jwt::Parser,
        validation::{Constraint, HasClaimWithValue},
    };

    fn section_json(encoded: &str) -> Result<String> {
        Ok(String::from_utf8(codec::base64url_decode(encoded)?)?)
    }

    fn hs256() -> jwa::hmac::SigningAlgorithm {
        jwa::hmac::SigningAlgorithm::HS256
    }

    fn secret() -> Key {
        Key::inline(crate::test::hmac::SECRET)
    }

    #[test]
    fn header_starts_with_type_and_algorithm() -> Result<()> {
        let token = Builder::new()
            .with_header("kid", "key-1")
            .get_token(&hs256(), &secret())?;

        assert_eq!(
            section_json(token.headers().encoded())?,
            r#"{"typ":"JWT","alg":"HS256","kid":"key-1"}"#
        );
        Ok(())
    }

    #[test]
    fn algorithm_header_cannot_be_overridden() -> Result<()> {
        let token = Builder::new()
            .with_header("alg", "none")
            .get_token(&hs256(), &secret())?;

        assert_eq!(token.algorithm_id(), Some("HS256"));
        Ok(())
    }

    #[test]
    fn audiences_are_appended_once() -> Result<()> {
        let token = Builder::new()
            .permitted_for("a")
            .permitted_for("b")
            .permitted_for("a")
            .get_token(&hs256(), &secret())?;

        assert_eq!(
            section_json(token.claims().encoded())?,
            r#"{"aud":["a","b"]}"#
        );
        Ok(())
    }

    #[test]
    fn registered_claims_need_dedicated_methods() {
        for name in &claims::ALL {
            let err = Builder::new().with_claim(*name, "x").unwrap_err();
            assert!(err.to_string().contains(name));
        }
    }

    #[test]
    fn claims_keep_insertion_order() -> Result<()> {
        let token = Builder::new()
            .related_to("user-1")
            .with_claim("roles", json!(["admin"]))?
            .issued_at(UnixTime::from_secs(1_516_239_022))
            .issued_by("https://api.abc.com")
            .get_token(&hs256(), &secret())?;

        assert_eq!(
            section_json(token.claims().encoded())?,
            r#"{"sub":"user-1","roles":["admin"],"iat":1516239022,"iss":"https://api.abc.com"}"#
        );
        Ok(())
    }

    #[test]
    fn recreates_reference_token() -> Result<()> {
        let parsed = Parser::new().parse(crate::test::hmac::HS256_TOKEN)?;
        let rebuilt = Builder::new()
            .related_to("1234567890")
            .issued_at(UnixTime::from_secs(1_516_239_022))
            .permitted_for("single")
            .get_token(&hs256(), &secret())?;

        assert_eq!(rebuilt.claims(), parsed.claims());
        assert_eq!(rebuilt.headers(), parsed.headers());
        Ok(())
    }

    #[test]
    fn round_trips_through_the_parser() -> Result<()> {
        let token = Builder::new()
            .issued_by("https://api.abc.com")
            .permitted_for("https://client.abc.com")
            .identified_by("token-1")
            .expires_at(UnixTime::from_micros(1_700_000_000_123_456))
            .can_only_be_used_after(UnixTime::from_secs(1_600_000_000))
            .with_claim("admin", true)?
            .get_token(&hs256(), &secret())?;

        let parsed = Parser::new().parse(token.to_jwt().as_str())?;
        assert_eq!(parsed, token);
        assert_eq!(parsed.signing_input(), token.signing_input());
        assert_eq!(
            parsed.expires_at(),
            Some(UnixTime::from_micros(1_700_000_000_123_456))
        );
        Ok(())
    }

    #[test]
    fn custom_time_claims_round_trip() -> Result<()> {
        let token = Builder::new()
            .with_claim("auth_time", UnixTime::from_secs(1_600_000_000))?
            .with_claim("refreshed_at", UnixTime::from_micros(1_600_000_000_250_000))?
            .get_token(&hs256(), &secret())?;

        assert_eq!(
            section_json(token.claims().encoded())?,
            r#"{"auth_time":1600000000,"refreshed_at":1600000000.25}"#
        );

        let parsed = Parser::new().parse(token.to_jwt().as_str())?;
        assert_eq!(parsed, token);

        HasClaimWithValue::new("auth_time", 1_600_000_000)?.assert(&token)?;
        HasClaimWithValue::new("auth_time", 1_600_000_000)?.assert(&parsed)?;
        Ok(())
    }

    #[test]
    fn every_registered_claim_survives_parsing() -> Result<()> {
        let token = Builder::new()
            .issued_by("https://api.abc.com")
            .permitted_for("https://client.abc.com")
            .permitted_for("https://admin.abc.com")
            .identified_by("1")
            .get_token(&hs256(), &secret())?;

        let parsed = Parser::new().parse(token.to_jwt().as_str())?;
        assert_eq!(parsed, token);
        assert_eq!(parsed.issuer().map(|i| i.as_str()), Some("https://api.abc.com"));
        assert_eq!(parsed.token_id().map(|i| i.as_str()), Some("1"));
        assert!(parsed.is_identified_by("1"));

        let audiences: Vec<&str> = parsed.audiences().into_iter().map(|a| a.as_str()).collect();
        assert_eq!(audiences, ["https://client.abc.com", "https://admin.abc.com"]);
        Ok(())
    }

    #[test]
    fn unsecured_token_declares_none() -> Result<()> {
        let token = Builder::new().related_to("someone").get_unsecured_token()?;
        assert!(!token.is_signed());
        assert_eq!(token.algorithm_id(), Some("none"));

        let compact = token.to_jwt();
        assert_eq!(compact.as_str().split('.').count(), 2);
        assert_eq!(Parser::new().parse(compact.as_str())?, token);
        Ok(())
    }

    #[test]
    fn signing_errors_propagate() {
        let err = Builder::new()
            .get_token(&hs256(), &Key::inline(Vec::new()))
            .unwrap_err();
        assert!(err.is_invalid_key());
    }
}
