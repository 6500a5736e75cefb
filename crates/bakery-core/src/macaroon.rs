//! The token itself: location, identifier, ordered caveats, chained signature.
//!
//! A [`Macaroon`] is immutable. Every builder method returns a new value and
//! leaves the receiver untouched.

use serde::{Deserialize, Serialize};

use crate::crypto::{bind_signature, hmac_sha256, seal_verification_id, VID_NONCE_LEN};
use crate::error::Result;
use crate::types::{MacaroonSignature, RootKey};

/// One caveat as carried on the token.
///
/// First-party caveats carry only the predicate in `identifier`. Third-party
/// caveats also carry the authority `location` and the `verification_id`
/// that lets a verifier recover the caveat root key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CaveatPacket {
    /// Discharge location, third-party caveats only.
    pub location: Option<String>,

    /// Predicate bytes (first-party) or caveat identifier (third-party).
    pub identifier: Vec<u8>,

    /// `nonce || ciphertext` of the caveat root key, third-party caveats only.
    pub verification_id: Option<Vec<u8>>,
}

impl CaveatPacket {
    /// A first-party caveat carrying `predicate`.
    pub fn first_party(predicate: impl Into<Vec<u8>>) -> Self {
        Self {
            location: None,
            identifier: predicate.into(),
            verification_id: None,
        }
    }

    /// Whether this caveat needs a discharge token.
    pub fn is_third_party(&self) -> bool {
        self.verification_id.is_some()
    }

    /// Predicate bytes of a first-party caveat.
    pub fn predicate(&self) -> Option<&[u8]> {
        if self.is_third_party() {
            None
        } else {
            Some(&self.identifier)
        }
    }
}

/// A third-party caveat lifted out of a token, as sent to its authority.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThirdPartyCaveat {
    /// Where the discharge authority lives.
    pub location: String,

    /// The caveat identifier. A discharge token must carry it as its own identifier.
    pub identifier: Vec<u8>,

    /// Opaque to the authority.
    pub verification_id: Vec<u8>,
}

/// A chained-MAC bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macaroon {
    pub(crate) location: String,
    pub(crate) identifier: Vec<u8>,
    pub(crate) caveats: Vec<CaveatPacket>,
    pub(crate) signature: MacaroonSignature,
}

impl Macaroon {
    /// Create a token with no caveats.
    pub fn create(
        location: impl Into<String>,
        root_key: &RootKey,
        identifier: impl Into<Vec<u8>>,
    ) -> Self {
        let identifier = identifier.into();
        let signature = hmac_sha256(root_key.as_bytes(), &identifier);
        Self {
            location: location.into(),
            identifier,
            caveats: Vec::new(),
            signature,
        }
    }

    /// Reassemble a token from its parts. The signature is taken as given.
    pub(crate) fn from_parts(
        location: String,
        identifier: Vec<u8>,
        caveats: Vec<CaveatPacket>,
        signature: MacaroonSignature,
    ) -> Self {
        Self {
            location,
            identifier,
            caveats,
            signature,
        }
    }

    /// Append a first-party caveat.
    pub fn add_first_party_caveat(&self, predicate: impl Into<Vec<u8>>) -> Self {
        let packet = CaveatPacket::first_party(predicate);
        let signature = hmac_sha256(self.signature.as_bytes(), &packet.identifier);
        self.with_caveat(packet, signature)
    }

    /// Append a third-party caveat.
    ///
    /// `caveat_root_key` is encrypted under the current signature into the
    /// verification id, so only someone holding this exact token prefix can
    /// recover it at verify time. `nonce` must be fresh. The chain step
    /// hashes only the identifier; the verification id is carried data.
    pub fn add_third_party_caveat(
        &self,
        location: impl Into<String>,
        caveat_root_key: &RootKey,
        identifier: impl Into<Vec<u8>>,
        nonce: &[u8; VID_NONCE_LEN],
    ) -> Result<Self> {
        let identifier = identifier.into();
        let vid = seal_verification_id(&self.signature, caveat_root_key, nonce)?;
        let signature = hmac_sha256(self.signature.as_bytes(), &identifier);

        let packet = CaveatPacket {
            location: Some(location.into()),
            identifier,
            verification_id: Some(vid),
        };
        Ok(self.with_caveat(packet, signature))
    }

    /// Bind this discharge token to `root`.
    ///
    /// The result verifies only alongside that one root token.
    pub fn bind(&self, root: &Macaroon) -> Self {
        self.bind_to_signature(&root.signature)
    }

    /// Bind this discharge token to a root signature.
    pub fn bind_to_signature(&self, root_signature: &MacaroonSignature) -> Self {
        let mut bound = self.clone();
        bound.signature = bind_signature(root_signature, &self.signature);
        bound
    }

    fn with_caveat(&self, packet: CaveatPacket, signature: MacaroonSignature) -> Self {
        let mut caveats = Vec::with_capacity(self.caveats.len() + 1);
        caveats.extend(self.caveats.iter().cloned());
        caveats.push(packet);
        Self {
            location: self.location.clone(),
            identifier: self.identifier.clone(),
            caveats,
            signature,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    /// Location hint of the issuing service.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Token identifier. For root tokens this is the root key id.
    pub fn identifier(&self) -> &[u8] {
        &self.identifier
    }

    /// Caveats in application order.
    pub fn caveats(&self) -> &[CaveatPacket] {
        &self.caveats
    }

    /// Current chain signature.
    pub fn signature(&self) -> &MacaroonSignature {
        &self.signature
    }

    /// All third-party caveats, in application order.
    pub fn third_party_caveats(&self) -> Vec<ThirdPartyCaveat> {
        self.caveats
            .iter()
            .filter_map(|c| match (&c.location, &c.verification_id) {
                (Some(location), Some(vid)) => Some(ThirdPartyCaveat {
                    location: location.clone(),
                    identifier: c.identifier.clone(),
                    verification_id: vid.clone(),
                }),
                _ => None,
            })
            .collect()
    }
}
