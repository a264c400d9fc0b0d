//! Signed, claim-bearing tokens in compact serialization
//!
//! A compact token appears as base64url-encoded sections joined by `.`:
//!
//! ```text
//! eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9.eyJzdWIiOiIxMjM0NTY3ODkwIn0.<signature>
//! ```
//!
//! The first section is the header in JSON format, naming the algorithm
//! (`alg`) and type (`typ`) of the token. The second section holds the
//! claims. The third section is the binary signature over the first two
//! sections exactly as they were transmitted. An explicitly unsecured token
//! has only the first two sections and an `alg` of `none`.
//!
//! Nothing in the claims should be trusted before the token has been run
//! through a [`Validator`][crate::Validator] with a
//! [`SignedWith`][crate::validation::SignedWith] constraint.
//!
//! ```
//! use tessera::{jwa, jwt, Key, Validator};
//! use tessera::validation::{PermittedFor, SignedWith};
//!
//! let key = Key::inline(&b"a-string-secret-at-least-256-bits-long"[..]);
//!
//! let token = jwt::Builder::new()
//!     .issued_by("https://api.abc.com")
//!     .permitted_for("https://client.abc.com")
//!     .get_token(&jwa::hmac::SigningAlgorithm::HS256, &key)
//!     .unwrap();
//!
//! let parsed = jwt::Parser::new().parse(token.to_jwt().as_str()).unwrap();
//! assert_eq!(parsed, token);
//!
//! let signed = SignedWith::new(jwa::hmac::SigningAlgorithm::HS256, key);
//! let audience = PermittedFor::new("https://client.abc.com");
//! let constraints: [&dyn tessera::Constraint; 2] = [&signed, &audience];
//! assert!(Validator::new().validate(&parsed, &constraints).unwrap());
//! ```

use std::fmt;

use aliri_braid::braid;
use indexmap::IndexMap;
use tessera_clock::UnixTime;

use crate::codec;

mod builder;
mod parser;

pub use builder::Builder;
pub use parser::Parser;

/// Names of the registered claims
pub mod claims {
    /// Issuer (`iss`)
    pub const ISSUER: &str = "iss";
    /// Subject (`sub`)
    pub const SUBJECT: &str = "sub";
    /// Audience (`aud`)
    pub const AUDIENCE: &str = "aud";
    /// Expiration time (`exp`)
    pub const EXPIRATION_TIME: &str = "exp";
    /// Not before (`nbf`)
    pub const NOT_BEFORE: &str = "nbf";
    /// Issued at (`iat`)
    pub const ISSUED_AT: &str = "iat";
    /// Token identifier (`jti`)
    pub const ID: &str = "jti";

    /// Every registered claim name
    pub const ALL: [&str; 7] = [
        ISSUER,
        SUBJECT,
        AUDIENCE,
        EXPIRATION_TIME,
        NOT_BEFORE,
        ISSUED_AT,
        ID,
    ];

    /// Registered claims holding timestamps
    pub const DATES: [&str; 3] = [EXPIRATION_TIME, NOT_BEFORE, ISSUED_AT];

    /// Whether `name` is a registered claim
    #[must_use]
    pub fn is_registered(name: &str) -> bool {
        ALL.contains(&name)
    }
}

/// Names of the header parameters set by this crate
pub mod headers {
    /// Signing algorithm (`alg`)
    pub const ALGORITHM: &str = "alg";
    /// Token type (`typ`)
    pub const TYPE: &str = "typ";
    /// Content encryption (`enc`), only present on encrypted tokens
    pub const ENCRYPTION: &str = "enc";

    /// The `alg` value of an unsecured token
    pub const UNSECURED_ALGORITHM: &str = "none";
    /// The `typ` value written by the builder
    pub const TOKEN_TYPE: &str = "JWT";
}

/// A header or claim value
///
/// Registered date claims are held as [`Time`][Value::Time] with
/// microsecond precision. Every other value is kept as JSON.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A point in time
    Time(UnixTime),

    /// Any other JSON value
    Json(serde_json::Value),
}

impl Value {
    /// The value as a string, if it is one
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Json(serde_json::Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// The value as a point in time, if it is one
    #[must_use]
    pub fn as_time(&self) -> Option<UnixTime> {
        match self {
            Self::Time(t) => Some(*t),
            Self::Json(_) => None,
        }
    }

    /// The value as a JSON list, if it is one
    #[must_use]
    pub fn as_array(&self) -> Option<&[serde_json::Value]> {
        match self {
            Self::Json(serde_json::Value::Array(a)) => Some(a),
            _ => None,
        }
    }

    /// The value as JSON, if it is not a point in time
    #[must_use]
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            Self::Time(_) => None,
        }
    }

    /// The JSON rendering of this value
    ///
    /// Points in time become numeric seconds since the epoch, with a
    /// fractional part only when the time is not on a whole second.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Json(v) => v.clone(),
            Self::Time(t) => codec::time_to_json(*t),
        }
    }

    pub(crate) fn into_json(self) -> serde_json::Value {
        match self {
            Self::Json(v) => v,
            Self::Time(t) => codec::time_to_json(t),
        }
    }
}

impl From<UnixTime> for Value {
    fn from(t: UnixTime) -> Self {
        Self::Time(t)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl From<&'_ str> for Value {
    fn from(v: &str) -> Self {
        Self::Json(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Json(v.into())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Json(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Json(v.into())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::Json(v.into())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Json(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Json(v.into())
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Self::Json(v.into())
    }
}

/// An ordered set of named values, used for both headers and claims
///
/// The set remembers the exact base64url text it was encoded to or decoded
/// from. Equality only considers the values.
#[derive(Clone, Debug)]
#[must_use]
pub struct DataSet {
    data: IndexMap<String, Value>,
    encoded: String,
}

impl DataSet {
    pub(crate) fn new(data: IndexMap<String, Value>, encoded: String) -> Self {
        Self { data, encoded }
    }

    /// Looks up a value by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Whether a value with this name is present
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    /// Iterates over the values in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The number of values in the set
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the set holds no values
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The base64url text of this section
    #[must_use]
    pub fn encoded(&self) -> &str {
        &self.encoded
    }
}

impl PartialEq for DataSet {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

/// A token signature
#[derive(Clone, PartialEq, Eq)]
#[must_use]
pub struct Signature {
    raw: Vec<u8>,
    encoded: String,
}

impl Signature {
    pub(crate) fn new(raw: Vec<u8>) -> Self {
        let encoded = codec::base64url_encode(&raw);
        Self { raw, encoded }
    }

    /// The raw signature bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// The canonical base64url encoding of the signature
    #[must_use]
    pub fn encoded(&self) -> &str {
        &self.encoded
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Signature")
            .field("len", &self.raw.len())
            .finish()
    }
}

/// A decoded token
///
/// Tokens are immutable. Signed tokens come from [`Builder::get_token()`] or
/// from parsing a three-section string. Unsecured tokens are only produced
/// by [`Builder::get_unsecured_token()`] or by parsing a string whose header
/// explicitly declares `alg` as `none`.
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct Token {
    headers: DataSet,
    claims: DataSet,
    signature: Option<Signature>,
}

impl Token {
    pub(crate) fn new(headers: DataSet, claims: DataSet, signature: Option<Signature>) -> Self {
        Self {
            headers,
            claims,
            signature,
        }
    }

    /// The token headers
    pub fn headers(&self) -> &DataSet {
        &self.headers
    }

    /// The token claims
    pub fn claims(&self) -> &DataSet {
        &self.claims
    }

    /// The token signature, absent on unsecured tokens
    #[must_use]
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// Whether the token carries a signature
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// The bytes covered by the signature
    ///
    /// Always rebuilt from the encoded header and claims sections, so that
    /// verification checks exactly what was transmitted.
    #[must_use]
    pub fn signing_input(&self) -> String {
        format!("{}.{}", self.headers.encoded(), self.claims.encoded())
    }

    /// The `alg` header
    #[must_use]
    pub fn algorithm_id(&self) -> Option<&str> {
        self.headers.get(headers::ALGORITHM).and_then(Value::as_str)
    }

    /// The compact serialization of this token
    pub fn to_jwt(&self) -> Jwt {
        let mut compact = self.signing_input();
        if let Some(signature) = &self.signature {
            compact.push('.');
            compact.push_str(signature.encoded());
        }
        Jwt::new(compact)
    }

    /// The `iss` claim
    #[must_use]
    pub fn issuer(&self) -> Option<&IssuerRef> {
        self.claim_str(claims::ISSUER).map(IssuerRef::from_str)
    }

    /// The `sub` claim
    #[must_use]
    pub fn subject(&self) -> Option<&SubjectRef> {
        self.claim_str(claims::SUBJECT).map(SubjectRef::from_str)
    }

    /// The `jti` claim
    #[must_use]
    pub fn token_id(&self) -> Option<&TokenIdRef> {
        self.claim_str(claims::ID).map(TokenIdRef::from_str)
    }

    /// The `aud` claim, always as a list
    #[must_use]
    pub fn audiences(&self) -> Vec<&AudienceRef> {
        match self.claims.get(claims::AUDIENCE) {
            Some(aud) => match aud.as_array() {
                Some(list) => list
                    .iter()
                    .filter_map(serde_json::Value::as_str)
                    .map(AudienceRef::from_str)
                    .collect(),
                None => aud.as_str().map(AudienceRef::from_str).into_iter().collect(),
            },
            None => Vec::new(),
        }
    }

    /// The `exp` claim
    #[must_use]
    pub fn expires_at(&self) -> Option<UnixTime> {
        self.claim_time(claims::EXPIRATION_TIME)
    }

    /// The `nbf` claim
    #[must_use]
    pub fn not_before(&self) -> Option<UnixTime> {
        self.claim_time(claims::NOT_BEFORE)
    }

    /// The `iat` claim
    #[must_use]
    pub fn issued_at(&self) -> Option<UnixTime> {
        self.claim_time(claims::ISSUED_AT)
    }

    /// Whether `audience` is listed in the `aud` claim
    #[must_use]
    pub fn is_permitted_for(&self, audience: &str) -> bool {
        self.audiences().iter().any(|a| a.as_str() == audience)
    }

    /// Whether the `jti` claim equals `id`
    #[must_use]
    pub fn is_identified_by(&self, id: &str) -> bool {
        self.token_id().map_or(false, |t| t.as_str() == id)
    }

    /// Whether the `sub` claim equals `subject`
    #[must_use]
    pub fn is_related_to(&self, subject: &str) -> bool {
        self.subject().map_or(false, |s| s.as_str() == subject)
    }

    /// Whether the `iss` claim is one of `issuers`
    #[must_use]
    pub fn has_been_issued_by<I: AsRef<str>>(&self, issuers: &[I]) -> bool {
        self.issuer()
            .map_or(false, |iss| issuers.iter().any(|i| i.as_ref() == iss.as_str()))
    }

    /// Whether the token was issued at or before `now`
    ///
    /// A token without an `iat` claim is considered issued.
    #[must_use]
    pub fn has_been_issued_before(&self, now: UnixTime) -> bool {
        self.issued_at().map_or(true, |iat| now >= iat)
    }

    /// Whether the token may be used at `now` according to its `nbf` claim
    ///
    /// A token without an `nbf` claim may always be used.
    #[must_use]
    pub fn is_minimum_time_before(&self, now: UnixTime) -> bool {
        self.not_before().map_or(true, |nbf| now >= nbf)
    }

    /// Whether the token has expired at `now`
    ///
    /// A token is expired from the instant named in its `exp` claim onward.
    /// A token without an `exp` claim never expires.
    #[must_use]
    pub fn is_expired(&self, now: UnixTime) -> bool {
        self.expires_at().map_or(false, |exp| now >= exp)
    }

    fn claim_str(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }

    fn claim_time(&self, name: &str) -> Option<UnixTime> {
        self.claims.get(name).and_then(Value::as_time)
    }
}

/// An audience
#[braid(serde, ref_doc = "A borrowed reference to an [`Audience`]")]
pub struct Audience;

/// An issuer of tokens
#[braid(serde, ref_doc = "A borrowed reference to an [`Issuer`]")]
pub struct Issuer;

/// The subject of a token
#[braid(serde, ref_doc = "A borrowed reference to a [`Subject`]")]
pub struct Subject;

/// The unique identifier of a token
#[braid(serde, ref_doc = "A borrowed reference to a [`TokenId`]")]
pub struct TokenId;

/// A token in compact serialization
///
/// Formatting a token with `{}` or `{:?}` prints a placeholder. The
/// alternate forms print the token, with the signature cut to the given
/// width. See [`Display`][JwtRef#impl-Display] and [`Debug`][JwtRef#impl-Debug].
#[braid(
    serde,
    debug = "owned",
    display = "owned",
    ord = "omit",
    ref_doc = "\
    A borrowed compact token ([`Jwt`])\n\
    \n\
    Formatting a token with `{}` or `{:?}` prints a placeholder. The \
    alternate forms print the token, with the signature cut to the given \
    width. See [`Display`][Self#impl-Display] and [`Debug`][Self#impl-Debug].
    "
)]
#[must_use]
pub struct Jwt;

const REDACTED: &str = "***JWT***";

impl JwtRef {
    /// The signing input with its trailing `.`, and the signature after it
    ///
    /// A token without any `.` is all signature.
    fn split_signature(&self) -> (&str, &str) {
        let token = self.as_str();
        token.split_at(token.rfind('.').map_or(0, |dot| dot + 1))
    }
}

/// Prints `***JWT***`, or with `{:#?}` the quoted token without its
/// signature. A width, as in `{:#25?}`, shows that many characters of the
/// signature, counting the trailing `…`.
///
/// # Example
///
/// ```
/// # use tessera::jwt::JwtRef;
/// #
/// let token = JwtRef::from_str(concat!(
///     "eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9.",
///     "eyJzdWIiOiIxMjM0NTY3ODkwIiwiaWF0IjoxNTE2MjM5MDIyLCJhdWQiOiJzaW5nbGUifQ.",
///     "snv1el4gvj_gOpFB1riTYb4ZuD8AXs4AUmvv8ggf3jE"
/// ));
///
/// assert_eq!(format!("{:?}", token), "***JWT***");
/// assert_eq!(format!("{:#?}", token), concat!(
///     "\"eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9.",
///     "eyJzdWIiOiIxMjM0NTY3ODkwIiwiaWF0IjoxNTE2MjM5MDIyLCJhdWQiOiJzaW5nbGUifQ.",
///     "…\""
/// ));
/// assert_eq!(format!("{:#5?}", token), concat!(
///     "\"eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9.",
///     "eyJzdWIiOiIxMjM0NTY3ODkwIiwiaWF0IjoxNTE2MjM5MDIyLCJhdWQiOiJzaW5nbGUifQ.",
///     "snv1…\""
/// ));
/// ```
impl fmt::Debug for JwtRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !f.alternate() {
            return f.write_str(REDACTED);
        }

        let (signed, signature) = self.split_signature();
        let signature = Truncated::new(signature, f.width().unwrap_or(0));
        write!(f, "\"{}{}\"", signed, signature)
    }
}

/// Prints `***JWT***`, or with `{:#}` the whole token. A width, as in
/// `{:#10}`, cuts the signature the same way as the alternate `Debug` form.
///
/// # Example
///
/// ```
/// # use tessera::jwt::JwtRef;
/// #
/// let token = JwtRef::from_str(concat!(
///     "eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9.",
///     "eyJzdWIiOiIxMjM0NTY3ODkwIiwiaWF0IjoxNTE2MjM5MDIyLCJhdWQiOiJzaW5nbGUifQ.",
///     "snv1el4gvj_gOpFB1riTYb4ZuD8AXs4AUmvv8ggf3jE"
/// ));
///
/// assert_eq!(format!("{}", token), "***JWT***");
/// assert_eq!(format!("{:#}", token), token.as_str());
/// assert_eq!(format!("{:#5}", token), concat!(
///     "eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9.",
///     "eyJzdWIiOiIxMjM0NTY3ODkwIiwiaWF0IjoxNTE2MjM5MDIyLCJhdWQiOiJzaW5nbGUifQ.",
///     "snv1…"
/// ));
/// ```
impl fmt::Display for JwtRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !f.alternate() {
            return f.write_str(REDACTED);
        }

        match f.width() {
            Some(width) => {
                let (signed, signature) = self.split_signature();
                write!(f, "{}{}", signed, Truncated::new(signature, width))
            }
            None => f.write_str(self.as_str()),
        }
    }
}

/// At most `width` characters of `text`, the last shown as `…` when the
/// text is cut
#[derive(Clone, Copy)]
struct Truncated<'a> {
    text: &'a str,
    width: usize,
}

impl<'a> Truncated<'a> {
    fn new(text: &'a str, width: usize) -> Self {
        Self { text, width }
    }
}

impl fmt::Display for Truncated<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.width <= 1 {
            return f.write_str("…");
        }

        match self.text.char_indices().nth(self.width - 1) {
            Some((cut, _)) => {
                f.write_str(&self.text[..cut])?;
                f.write_str("…")
            }
            None => f.write_str(self.text),
        }
    }
}
