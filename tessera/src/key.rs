//! Opaque key material
//!
//! A [`Key`] carries raw bytes along with where they came from and an
//! optional passphrase. It never interprets its contents; deciding whether
//! the bytes are an RSA, EC, or Ed25519 key is left to the signer that
//! consumes it.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use tessera_base64::Base64Url;

use crate::error;

/// Where the key material originated
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum KeySource {
    /// Provided directly in memory
    Inline,

    /// Read from the file at the given path
    File(PathBuf),
}

/// Key material for signing or verification
///
/// The contents and passphrase are redacted from [`Debug`][fmt::Debug]
/// output. Keys are not comparable.
///
/// ```
/// use tessera::{Key, KeySource};
///
/// let key = Key::inline(&b"a-string-secret-at-least-256-bits-long"[..]);
/// assert_eq!(key.source(), &KeySource::Inline);
/// assert_eq!(format!("{:?}", key), "Key { source: Inline, contents: <redacted>, passphrase: None }");
/// ```
#[derive(Clone)]
#[must_use]
pub struct Key {
    contents: Vec<u8>,
    source: KeySource,
    passphrase: Option<Vec<u8>>,
}

impl Key {
    /// Wraps key material held in memory
    pub fn inline(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: contents.into(),
            source: KeySource::Inline,
            passphrase: None,
        }
    }

    /// Decodes base64 key material
    ///
    /// Both the URL-safe and the standard alphabets are accepted, with or
    /// without padding.
    ///
    /// # Errors
    ///
    /// The value is not valid base64.
    pub fn base64_encoded(encoded: &str) -> Result<Self, error::InvalidKeyProvided> {
        let normalized: String = encoded
            .trim()
            .chars()
            .map(|c| match c {
                '+' => '-',
                '/' => '_',
                c => c,
            })
            .collect();

        let contents = Base64Url::from_encoded(normalized)
            .map_err(|e| error::key_rejected("key is not valid base64", e))?;

        Ok(Self::inline(contents.into_inner()))
    }

    /// Reads key material from a file
    ///
    /// # Errors
    ///
    /// The file cannot be read.
    pub fn file(path: impl AsRef<Path>) -> Result<Self, error::InvalidKeyProvided> {
        let path = path.as_ref();
        let contents = std::fs::read(path).map_err(|e| {
            error::key_rejected(format!("unable to read key file {}", path.display()), e)
        })?;

        Ok(Self {
            contents,
            source: KeySource::File(path.to_owned()),
            passphrase: None,
        })
    }

    /// Attaches the passphrase used to decrypt an encrypted private key
    pub fn with_passphrase(mut self, passphrase: impl Into<Vec<u8>>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    /// The raw key material
    #[inline]
    #[must_use]
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Where the key material came from
    #[inline]
    #[must_use]
    pub fn source(&self) -> &KeySource {
        &self.source
    }

    /// The passphrase, if one was provided
    #[inline]
    #[must_use]
    pub fn passphrase(&self) -> Option<&[u8]> {
        self.passphrase.as_deref()
    }

    /// Whether the key carries no material at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    #[cfg(any(feature = "rsa", feature = "ec", feature = "eddsa"))]
    pub(crate) fn is_pem(&self) -> bool {
        let trimmed = self
            .contents
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .map_or(&[][..], |start| &self.contents[start..]);

        trimmed.starts_with(b"-----BEGIN ")
    }
}

struct Redacted;

impl fmt::Debug for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Key")
            .field("source", &self.source)
            .field("contents", &Redacted)
            .field("passphrase", &self.passphrase.as_ref().map(|_| Redacted))
            .finish()
    }
}
