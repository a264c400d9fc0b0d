//! Edwards-curve signing algorithms

use std::fmt;

use openssl::pkey::Id;
use ring::signature::{Ed25519KeyPair, UnparsedPublicKey, ED25519};
use serde::{Deserialize, Serialize};

use super::pkey;
use crate::{error, jws, Key};

const SEED_LEN: usize = 32;
const PUBLIC_KEY_LEN: usize = 32;
const SIGNATURE_LEN: usize = 64;

/// Edwards-curve signing algorithms
///
/// Signing keys may be given as a raw 32-byte seed, the 32-byte seed
/// followed by the 32-byte public key, PKCS#8 DER, or PEM. Verification
/// keys may be a raw 32-byte public key or PEM.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SigningAlgorithm {
    /// EdDSA over Ed25519
    EdDSA,
}

impl SigningAlgorithm {
    pub(crate) const ALL: [Self; 1] = [Self::EdDSA];

    /// The size in bytes of a signature
    #[must_use]
    pub fn signature_size(self) -> usize {
        SIGNATURE_LEN
    }

    fn key_pair(self, key: &Key) -> Result<Ed25519KeyPair, error::InvalidKeyProvided> {
        if key.is_pem() {
            let pkey = pkey::private_key(key)?;
            pkey::require_type(&pkey, Id::ED25519)?;
            let seed = pkey
                .raw_private_key()
                .map_err(|e| error::key_rejected("unable to read Ed25519 private key", e))?;
            return Ed25519KeyPair::from_seed_unchecked(&seed)
                .map_err(|e| error::key_rejected("Ed25519 private key rejected", e.to_string()));
        }

        let contents = key.contents();
        let parsed = match contents.len() {
            0 => return Err(error::invalid_key("key cannot be empty")),
            SEED_LEN => Ed25519KeyPair::from_seed_unchecked(contents),
            len if len == SEED_LEN + PUBLIC_KEY_LEN => {
                let (seed, public) = contents.split_at(SEED_LEN);
                Ed25519KeyPair::from_seed_and_public_key(seed, public)
            }
            _ => Ed25519KeyPair::from_pkcs8_maybe_unchecked(contents),
        };

        parsed.map_err(|e| error::key_rejected("Ed25519 private key rejected", e.to_string()))
    }

    fn public_key(self, key: &Key) -> Result<Vec<u8>, error::InvalidKeyProvided> {
        if key.is_pem() {
            let pkey = pkey::public_key(key)?;
            pkey::require_type(&pkey, Id::ED25519)?;
            return pkey
                .raw_public_key()
                .map_err(|e| error::key_rejected("unable to read Ed25519 public key", e));
        }

        let contents = key.contents();
        if contents.len() == PUBLIC_KEY_LEN {
            Ok(contents.to_vec())
        } else {
            Err(error::invalid_key(format!(
                "key length is invalid: expected {} bytes, got {}",
                PUBLIC_KEY_LEN,
                contents.len()
            )))
        }
    }
}

impl From<SigningAlgorithm> for jws::Algorithm {
    fn from(alg: SigningAlgorithm) -> Self {
        Self::EdDsa(alg)
    }
}

impl jws::Signer for SigningAlgorithm {
    fn algorithm_id(&self) -> &'static str {
        match self {
            Self::EdDSA => "EdDSA",
        }
    }

    fn sign(&self, payload: &[u8], key: &Key) -> Result<Vec<u8>, error::SigningError> {
        let key_pair = self.key_pair(key)?;
        Ok(key_pair.sign(payload).as_ref().to_owned())
    }

    fn verify(
        &self,
        payload: &[u8],
        signature: &[u8],
        key: &Key,
    ) -> Result<bool, error::InvalidKeyProvided> {
        let public = self.public_key(key)?;
        let public = UnparsedPublicKey::new(&ED25519, public);
        Ok(public.verify(payload, signature).is_ok())
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(jws::Signer::algorithm_id(self))
    }
}
