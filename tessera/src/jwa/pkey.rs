//! Key parsing shared by the asymmetric families
//!
//! PEM input may be a private key (optionally encrypted), a public key, or
//! an X.509 certificate. Anything else is treated as DER.

use openssl::{
    pkey::{Id, PKey, PKeyRef, Private, Public},
    x509::X509,
};

use crate::{error, Key};

/// The name of a key type as it appears in error messages
pub(crate) fn type_name(id: Id) -> &'static str {
    if id == Id::RSA {
        "RSA"
    } else if id == Id::EC {
        "EC"
    } else if id == Id::ED25519 {
        "Ed25519"
    } else if id == Id::DSA {
        "DSA"
    } else {
        "unknown"
    }
}

/// Rejects keys whose declared type is not `expected`
pub(crate) fn require_type<T>(pkey: &PKeyRef<T>, expected: Id) -> Result<(), error::InvalidKeyProvided> {
    let actual = pkey.id();
    if actual == expected {
        Ok(())
    } else {
        tracing::debug!(
            expected = type_name(expected),
            actual = type_name(actual),
            "key type mismatch"
        );
        Err(error::key_type_mismatch(type_name(expected), type_name(actual)))
    }
}

pub(crate) fn private_key(key: &Key) -> Result<PKey<Private>, error::InvalidKeyProvided> {
    let contents = key.contents();

    let parsed = if key.is_pem() {
        match key.passphrase() {
            Some(passphrase) => PKey::private_key_from_pem_passphrase(contents, passphrase),
            // An empty passphrase keeps openssl from prompting on a terminal
            None => PKey::private_key_from_pem_callback(contents, |_| Ok(0)),
        }
    } else {
        PKey::private_key_from_der(contents)
    };

    parsed.map_err(|e| error::key_rejected("unable to parse private key", e))
}

pub(crate) fn public_key(key: &Key) -> Result<PKey<Public>, error::InvalidKeyProvided> {
    let contents = key.contents();

    if !key.is_pem() {
        return PKey::public_key_from_der(contents)
            .map_err(|e| error::key_rejected("unable to parse public key", e));
    }

    if let Ok(pkey) = PKey::public_key_from_pem(contents) {
        return Ok(pkey);
    }

    if let Ok(cert) = X509::from_pem(contents) {
        return cert
            .public_key()
            .map_err(|e| error::key_rejected("unable to read certificate public key", e));
    }

    let private = private_key(key)
        .map_err(|_| error::invalid_key("unable to parse public key"))?;
    let der = private
        .public_key_to_der()
        .map_err(|e| error::key_rejected("unable to derive public key", e))?;

    PKey::public_key_from_der(&der).map_err(|e| error::key_rejected("unable to parse public key", e))
}
