use std::fmt;

use super::Constraint;
use crate::{error, jws, jwt::Token, Key};

const NAME: &str = "SignedWith";

fn violation(message: impl Into<String>) -> error::ConstraintViolation {
    error::ConstraintViolation::new(NAME, message)
}

/// Requires the token to carry a valid signature from a specific signer
///
/// Unsecured tokens never satisfy this constraint, and neither do tokens
/// whose `alg` header names a different algorithm.
pub struct SignedWith<S = jws::Algorithm> {
    signer: S,
    key: Key,
}

impl<S: jws::Signer> SignedWith<S> {
    /// Verifies signatures using `signer` with `key`
    pub fn new(signer: S, key: Key) -> Self {
        Self { signer, key }
    }

    /// The expected signer
    pub fn signer(&self) -> &S {
        &self.signer
    }

    /// The verification key
    pub fn key(&self) -> &Key {
        &self.key
    }
}

impl<S: jws::Signer> Constraint for SignedWith<S> {
    fn assert(&self, token: &Token) -> Result<(), error::ConstraintError> {
        let signature = token
            .signature()
            .ok_or_else(|| violation("token is not signed"))?;

        let expected = self.signer.algorithm_id();
        match token.algorithm_id() {
            Some(alg) if alg == expected => {}
            Some(alg) => {
                let mismatch = violation(format!(
                    "token is signed with \"{}\", expected \"{}\"",
                    alg, expected
                ));
                let mismatch = match alg.parse::<jws::Algorithm>() {
                    Ok(_) => mismatch,
                    Err(unknown) => mismatch.with_cause(unknown),
                };
                return Err(mismatch.into());
            }
            None => return Err(violation("token does not declare an algorithm").into()),
        }

        let verified = self.signer.verify(
            token.signing_input().as_bytes(),
            signature.as_bytes(),
            &self.key,
        )?;

        if verified {
            Ok(())
        } else {
            Err(violation("token signature does not match").into())
        }
    }
}

impl<S: jws::Signer> fmt::Debug for SignedWith<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SignedWith")
            .field("algorithm", &self.signer.algorithm_id())
            .field("key", &self.key)
            .finish()
    }
}
