//! Token verification.
//!
//! Verification recomputes the signature chain from the root key, checks
//! every first-party predicate, and for every third-party caveat finds a
//! discharge token, recovers its root key from the verification id and
//! verifies it recursively.
//!
//! Every token is walked to the end and its signature compared before any
//! other failure is reported.

use crate::crypto::{bind_signature, hmac_sha256, open_verification_id};
use crate::error::{MacaroonError, Result};
use crate::macaroon::Macaroon;
use crate::types::{MacaroonSignature, RootKey};

impl Macaroon {
    /// Verify this root token against `root_key`.
    ///
    /// `discharges` must already be bound to this token. `checker` decides
    /// every first-party predicate, on the root and on the discharges alike.
    /// Each discharge satisfies at most one caveat: the first unused
    /// discharge carrying the caveat identifier is the one checked, and a
    /// failing discharge is not replaced by a later one. Every token is
    /// therefore verified at most once.
    pub fn verify<F>(&self, root_key: &RootKey, discharges: &[Macaroon], checker: F) -> Result<()>
    where
        F: Fn(&[u8]) -> bool,
    {
        let mut used = vec![false; discharges.len()];
        let ctx = Context {
            root_signature: &self.signature,
            discharges,
            checker: &checker,
        };
        ctx.verify_token(self, root_key, true, &mut used)
    }
}

struct Context<'a> {
    root_signature: &'a MacaroonSignature,
    discharges: &'a [Macaroon],
    checker: &'a dyn Fn(&[u8]) -> bool,
}

impl Context<'_> {
    fn verify_token(
        &self,
        token: &Macaroon,
        key: &RootKey,
        is_root: bool,
        used: &mut [bool],
    ) -> Result<()> {
        let mut signature = hmac_sha256(key.as_bytes(), &token.identifier);
        let mut failure = None;

        for caveat in &token.caveats {
            let outcome = match &caveat.verification_id {
                None => {
                    if (self.checker)(&caveat.identifier) {
                        Ok(())
                    } else {
                        Err(MacaroonError::CaveatNotSatisfied(
                            String::from_utf8_lossy(&caveat.identifier).into_owned(),
                        ))
                    }
                }
                Some(vid) => {
                    let location = caveat.location.as_deref().unwrap_or_default();
                    open_verification_id(&signature, vid).and_then(|caveat_key| {
                        self.verify_discharge_for(&caveat.identifier, location, &caveat_key, used)
                    })
                }
            };
            if let Err(e) = outcome {
                failure.get_or_insert(e);
            }
            signature = hmac_sha256(signature.as_bytes(), &caveat.identifier);
        }

        let expected = if is_root {
            signature
        } else {
            bind_signature(self.root_signature, &signature)
        };

        if !expected.ct_eq(&token.signature) {
            return Err(MacaroonError::SignatureMismatch);
        }
        failure.map_or(Ok(()), Err)
    }

    /// Verify the first unused discharge for `identifier` under `key`.
    fn verify_discharge_for(
        &self,
        identifier: &[u8],
        location: &str,
        key: &RootKey,
        used: &mut [bool],
    ) -> Result<()> {
        let index = self
            .discharges
            .iter()
            .enumerate()
            .position(|(i, d)| !used[i] && d.identifier == identifier)
            .ok_or_else(|| MacaroonError::MissingDischarge(location.to_string()))?;

        used[index] = true;
        self.verify_token(&self.discharges[index], key, false, used)
    }
}
