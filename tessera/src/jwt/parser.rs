use super::{headers, DataSet, Signature, Token};
use crate::{codec, error};

/// Decodes compact tokens
///
/// Parsing only checks structure. Nothing about the signature or the claims
/// is validated here.
#[derive(Clone, Copy, Debug, Default)]
pub struct Parser;

impl Parser {
    /// Creates a parser
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decodes a compact token
    ///
    /// A token with two sections is only accepted when its header declares
    /// `alg` as `none`. An unsecured token may also be given with an empty
    /// third section.
    ///
    /// # Errors
    ///
    /// The token is structurally invalid, or it is encrypted.
    pub fn parse(&self, compact: &str) -> Result<Token, error::ParseError> {
        let result = parse_compact(compact);
        if let Err(error) = &result {
            tracing::debug!(%error, "unable to parse token");
        }
        result
    }
}

fn parse_compact(compact: &str) -> Result<Token, error::ParseError> {
    let mut sections = compact.split('.');
    let (encoded_headers, encoded_claims, encoded_signature) =
        match (sections.next(), sections.next(), sections.next(), sections.next()) {
            (Some(h), Some(c), s, None) => (h, c, s),
            _ => {
                return Err(error::malformed_token("expected two or three sections").into());
            }
        };

    let header_set =
        codec::decode_section(encoded_headers, &[]).map_err(error::malformed_header)?;

    if header_set.contains_key(headers::ENCRYPTION) {
        return Err(error::unsupported_header(headers::ENCRYPTION).into());
    }

    let alg = header_set
        .get(headers::ALGORITHM)
        .ok_or_else(|| error::malformed_header("missing 'alg' header"))?
        .as_str()
        .ok_or_else(|| error::malformed_header("'alg' header must be a string"))?;
    let unsecured = alg == headers::UNSECURED_ALGORITHM;

    let claim_set = codec::decode_section(encoded_claims, codec::DECODE_FORMATTERS)
        .map_err(error::malformed_claims)?;

    let signature = match encoded_signature {
        None if unsecured => None,
        None => {
            return Err(error::malformed_token("signed token is missing its signature").into());
        }
        Some("") if unsecured => None,
        Some(_) if unsecured => {
            return Err(error::malformed_signature("unsecured token carries a signature").into());
        }
        Some("") => return Err(error::malformed_signature("signature is empty").into()),
        Some(encoded) => {
            let raw = codec::base64url_decode(encoded).map_err(error::malformed_signature)?;
            Some(Signature::new(raw))
        }
    };

    Ok(Token::new(
        DataSet::new(header_set, encoded_headers.to_owned()),
        DataSet::new(claim_set, encoded_claims.to_owned()),
        signature,
    ))
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;
    use tessera_clock::UnixTime;
    use tracing_test::traced_test;

    use super::*;
    use crate::{error::ParseError, test};

    fn encode(json: &str) -> String {
        codec::base64url_encode(json.as_bytes())
    }

    fn compact(header: &str, claims: &str, signature: Option<&str>) -> String {
        let mut token = format!("{}.{}", encode(header), encode(claims));
        if let Some(signature) = signature {
            token.push('.');
            token.push_str(signature);
        }
        token
    }

    #[test]
    fn parses_reference_token() -> Result<()> {
        let token = Parser::new().parse(test::hmac::HS256_TOKEN)?;

        assert_eq!(token.algorithm_id(), Some("HS256"));
        assert_eq!(token.subject().map(|s| s.as_str()), Some("1234567890"));
        assert_eq!(token.issued_at(), Some(UnixTime::from_secs(1_516_239_022)));
        assert!(token.is_permitted_for("single"));
        assert_eq!(token.signature().map(|s| s.as_bytes().len()), Some(32));
        assert_eq!(token.to_jwt().as_str(), test::hmac::HS256_TOKEN);
        Ok(())
    }

    #[test]
    fn signing_input_is_the_transmitted_text() -> Result<()> {
        // Unusual whitespace in the JSON must survive verbatim
        let header = encode(r#"{ "alg" : "HS256" }"#);
        let claims = encode(r#"{"b":1,  "a":2}"#);
        let token = Parser::new().parse(&format!("{}.{}.AAAA", header, claims))?;
        assert_eq!(token.signing_input(), format!("{}.{}", header, claims));
        Ok(())
    }

    #[test]
    fn padded_sections_are_accepted() -> Result<()> {
        let token = Parser::new().parse(&compact(r#"{"alg":"HS256"}"#, "{}", Some("AAA")))?;
        let padded = format!("{}=", token.signature().map(|s| s.encoded()).unwrap_or_default());
        let reparsed = Parser::new().parse(&format!("{}.{}", token.signing_input(), padded))?;
        assert_eq!(reparsed.signature(), token.signature());
        Ok(())
    }

    #[test]
    fn wrong_section_counts_are_malformed() {
        for input in &["", "abc", "a.b.c.d", "a.b.c.d.e"] {
            let err = Parser::new().parse(input).unwrap_err();
            assert!(
                matches!(err, ParseError::MalformedToken(_)),
                "{:?} gave {:?}",
                input,
                err
            );
        }
    }

    #[test]
    fn two_sections_need_an_unsecured_header() {
        let err = Parser::new()
            .parse(&compact(r#"{"alg":"HS256"}"#, "{}", None))
            .unwrap_err();
        assert!(matches!(err, ParseError::MalformedToken(_)));
    }

    #[test]
    fn unsecured_tokens_are_accepted() -> Result<()> {
        let two = Parser::new().parse(&compact(r#"{"alg":"none"}"#, r#"{"sub":"x"}"#, None))?;
        let three = Parser::new().parse(&compact(r#"{"alg":"none"}"#, r#"{"sub":"x"}"#, Some("")))?;
        assert!(!two.is_signed());
        assert_eq!(two, three);
        Ok(())
    }

    #[test]
    fn unsecured_token_with_signature_is_rejected() {
        let err = Parser::new()
            .parse(&compact(r#"{"alg":"none"}"#, "{}", Some("AAAA")))
            .unwrap_err();
        assert!(matches!(err, ParseError::MalformedSignature(_)));
    }

    #[test]
    fn empty_signature_is_rejected() {
        let err = Parser::new()
            .parse(&compact(r#"{"alg":"HS256"}"#, "{}", Some("")))
            .unwrap_err();
        assert!(matches!(err, ParseError::MalformedSignature(_)));
    }

    #[test]
    fn invalid_sections_are_reported_by_position() {
        let cases = [
            (compact("not json", "{}", Some("AAAA")), "header"),
            (compact("[]", "{}", Some("AAAA")), "header"),
            (compact("{}", "{}", Some("AAAA")), "header"),
            (compact(r#"{"alg":5}"#, "{}", Some("AAAA")), "header"),
            (compact(r#"{"alg":"HS256"}"#, "oops", Some("AAAA")), "claims"),
            (compact(r#"{"alg":"HS256"}"#, r#"{"exp":"soon"}"#, Some("AAAA")), "claims"),
            (compact(r#"{"alg":"HS256"}"#, "{}", Some("!!!")), "signature"),
        ];

        for (input, section) in &cases {
            let err = Parser::new().parse(input).unwrap_err();
            let matched = match &err {
                ParseError::MalformedHeader(_) => "header",
                ParseError::MalformedClaims(_) => "claims",
                ParseError::MalformedSignature(_) => "signature",
                _ => "other",
            };
            assert_eq!(matched, *section, "{}", err);
        }
    }

    #[test]
    fn encrypted_tokens_are_unsupported() {
        let err = Parser::new()
            .parse(&compact(r#"{"alg":"RSA-OAEP","enc":"A256GCM"}"#, "{}", Some("AAAA")))
            .unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedHeader(_)));
        assert_eq!(err.to_string(), "unsupported header found: 'enc'");
    }

    #[test]
    #[traced_test]
    fn failures_are_logged() {
        assert!(Parser::new().parse("garbage").is_err());
        assert!(logs_contain("unable to parse token"));
    }
}
