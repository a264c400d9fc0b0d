//! URL-safe base64 buffers for the segments of a compact token
//!
//! The [`Base64Url`][] type holds raw bytes and only pays the cost of
//! encoding when it is displayed or serialized. Decoding accepts input with
//! or without trailing `=` padding, while encoding never emits padding, as
//! required by the compact serialization of signed tokens.
//!
//! [`Debug`][std::fmt::Debug] output is fenced in backticks so that encoded
//! values stand out in logs and test failures.
//!
//! The underlying encoding/decoding mechanism is provided by the [`base64`][]
//! crate.
//!
//!   [`base64`]: https://docs.rs/base64
//!
//! # Example
//!
//! ```
//! use tessera_base64::Base64Url;
//!
//! let data = Base64Url::from_raw("hello, world!".as_bytes());
//! assert_eq!(data.to_string(), "aGVsbG8sIHdvcmxkIQ");
//!
//! let padded = Base64Url::from_encoded("aGVsbG8sIHdvcmxkIQ==").unwrap();
//! assert_eq!(padded, data);
//! ```
//!
//! # Serde
//!
//! With the `serde` feature enabled, the buffer serializes as its base64
//! string and deserializes from one.

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
    unused_must_use
)]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

use std::{error::Error, fmt};

use base64::{
    alphabet,
    engine::{general_purpose::GeneralPurpose, DecodePaddingMode, GeneralPurposeConfig},
    Engine,
};

/// URL-safe alphabet, never pads on encode, tolerates padding on decode
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// An error while decoding a value which is not properly formatted
/// base64 data
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvalidBase64Data {
    source: base64::DecodeError,
}

impl From<base64::DecodeError> for InvalidBase64Data {
    fn from(err: base64::DecodeError) -> Self {
        Self { source: err }
    }
}

impl fmt::Display for InvalidBase64Data {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid base64 data")
    }
}

impl Error for InvalidBase64Data {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Owned data to be encoded as URL-safe base64 (no padding)
///
/// Encoding alphabet: `A`–`Z`, `a`–`z`, `0`–`9`, `-`, `_`
///
/// Data is held in memory in its raw form. Implementations of the [`From`]
/// trait assume that the underlying structure is in raw form.
#[derive(Clone, Default, Eq, PartialEq, Hash)]
#[must_use]
pub struct Base64Url(Vec<u8>);

impl Base64Url {
    /// Creates an empty buffer
    #[inline]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Creates a new buffer from an owned value
    ///
    /// To decode a base64-encoded buffer, use [`from_encoded()`][Self::from_encoded()].
    #[inline]
    pub fn from_raw<T: Into<Vec<u8>>>(raw: T) -> Self {
        Self(raw.into())
    }

    /// Decodes a base64-encoded value into a new owned buffer
    ///
    /// Trailing padding is accepted but not required.
    pub fn from_encoded<T: AsRef<[u8]>>(enc: T) -> Result<Self, InvalidBase64Data> {
        let data = URL_SAFE_LENIENT.decode(enc)?;
        Ok(Self(data))
    }

    /// Unwraps the underlying buffer
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    /// Provides access to the underlying slice
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Encodes the buffer as an unpadded base64 string
    #[inline]
    #[must_use]
    pub fn encode(&self) -> String {
        URL_SAFE_LENIENT.encode(&self.0)
    }

    /// Calculates the expected length of the unpadded encoding for a buffer of size `len`
    #[inline]
    #[must_use]
    pub const fn calc_encoded_len(len: usize) -> usize {
        let d = len / 3 * 4;
        let m = len % 3;
        if m > 0 {
            d + m + 1
        } else {
            d
        }
    }

    /// Calculates the expected length of the encoding of this buffer
    #[inline]
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        Self::calc_encoded_len(self.0.len())
    }
}

impl From<Vec<u8>> for Base64Url {
    #[inline]
    fn from(buf: Vec<u8>) -> Self {
        Self(buf)
    }
}

impl From<&'_ [u8]> for Base64Url {
    #[inline]
    fn from(slice: &[u8]) -> Self {
        Self::from_raw(slice)
    }
}

impl From<Base64Url> for Vec<u8> {
    #[inline]
    fn from(val: Base64Url) -> Self {
        val.0
    }
}

impl AsRef<[u8]> for Base64Url {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Base64Url {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Base64Url {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "`{}`", self.encode())
    }
}

/// Serialize the underlying byte array as a base64 string
#[cfg(any(feature = "serde", docsrs))]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl serde::Serialize for Base64Url {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

/// Deserialize a base64 string and decode it into a byte array
#[cfg(any(feature = "serde", docsrs))]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl<'de> serde::Deserialize<'de> for Base64Url {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_encoded(raw).map_err(serde::de::Error::custom)
    }
}


#[cfg(doctest)]
#[doc(hidden)]
mod doctests {
    /// Verifies that `serde` serialization round-trips
    ///
    /// ```
    /// use serde::{Serialize, Deserialize};
    /// use tessera_base64::Base64Url;
    ///
    /// #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    /// struct MyData {
    ///     data: Base64Url,
    /// }
    ///
    /// let data = MyData {
    ///     data: Base64Url::from_raw("hello, world!".to_string().into_bytes()),
    /// };
    ///
    /// let serialized = serde_json::to_string(&data).unwrap();
    ///
    /// assert_eq!(serialized, r#"{"data":"aGVsbG8sIHdvcmxkIQ"}"#);
    ///
    /// let deserialized: MyData = serde_json::from_str(&serialized).unwrap();
    ///
    /// assert_eq!(data, deserialized);
    /// ```
    #[cfg(feature = "serde")]
    fn base64_round_trips_through_serde() -> ! {
        loop {}
    }
}
