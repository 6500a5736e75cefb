//! Wire format.
//!
//! Tokens use the version 2 JSON layout:
//!
//! ```text
//! {"v":2,"l":"<location>","i64":"<id>","c":[{"i64":..,"v64":..,"l":..}],"s64":"<sig>"}
//! ```
//!
//! Binary fields are unpadded URL-safe base64. A bearer string of several
//! tokens is a JSON array, optionally wrapped in base64 as a whole.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{MacaroonError, Result};
use crate::macaroon::{CaveatPacket, Macaroon};
use crate::types::MacaroonSignature;

/// Serialization format version.
pub const WIRE_VERSION: u8 = 2;

/// Outer encoding for a list of tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Plain JSON array.
    Json,
    /// JSON array wrapped in unpadded URL-safe base64.
    #[default]
    Base64,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMacaroon {
    v: u8,
    #[serde(rename = "l", default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(rename = "i64")]
    identifier: String,
    #[serde(rename = "c", default, skip_serializing_if = "Vec::is_empty")]
    caveats: Vec<WireCaveat>,
    #[serde(rename = "s64")]
    signature: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireCaveat {
    #[serde(rename = "i64")]
    identifier: String,
    #[serde(rename = "v64", default, skip_serializing_if = "Option::is_none")]
    verification_id: Option<String>,
    #[serde(rename = "l", default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

impl From<&Macaroon> for WireMacaroon {
    fn from(m: &Macaroon) -> Self {
        Self {
            v: WIRE_VERSION,
            location: (!m.location.is_empty()).then(|| m.location.clone()),
            identifier: URL_SAFE_NO_PAD.encode(&m.identifier),
            caveats: m
                .caveats
                .iter()
                .map(|c| WireCaveat {
                    identifier: URL_SAFE_NO_PAD.encode(&c.identifier),
                    verification_id: c.verification_id.as_ref().map(|v| URL_SAFE_NO_PAD.encode(v)),
                    location: c.location.clone(),
                })
                .collect(),
            signature: URL_SAFE_NO_PAD.encode(m.signature.as_bytes()),
        }
    }
}

impl TryFrom<WireMacaroon> for Macaroon {
    type Error = MacaroonError;

    fn try_from(w: WireMacaroon) -> Result<Self> {
        if w.v != WIRE_VERSION {
            return Err(MacaroonError::UnsupportedVersion(w.v));
        }

        let caveats = w
            .caveats
            .into_iter()
            .map(|c| {
                let verification_id = c.verification_id.as_deref().map(b64_decode).transpose()?;
                if verification_id.is_some() != c.location.is_some() {
                    return Err(MacaroonError::DecodingError(
                        "third-party caveat needs both location and verification id".into(),
                    ));
                }
                Ok(CaveatPacket {
                    location: c.location,
                    identifier: b64_decode(&c.identifier)?,
                    verification_id,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let signature = MacaroonSignature::try_from(b64_decode(&w.signature)?.as_slice())
            .map_err(|_| MacaroonError::DecodingError("signature must be 32 bytes".into()))?;

        Ok(Macaroon::from_parts(
            w.location.unwrap_or_default(),
            b64_decode(&w.identifier)?,
            caveats,
            signature,
        ))
    }
}

fn b64_decode(s: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(s.trim_end_matches('='))
        .map_err(|e| MacaroonError::DecodingError(e.to_string()))
}

impl Macaroon {
    /// Serialize to the JSON wire format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&WireMacaroon::from(self))
            .map_err(|e| MacaroonError::EncodingError(e.to_string()))
    }

    /// Parse from the JSON wire format.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let wire: WireMacaroon = serde_json::from_slice(bytes)
            .map_err(|e| MacaroonError::DecodingError(e.to_string()))?;
        Macaroon::try_from(wire)
    }
}

/// Encode a list of tokens, root first.
pub fn encode_all(tokens: &[Macaroon], encoding: Encoding) -> Result<String> {
    let wire: Vec<WireMacaroon> = tokens.iter().map(WireMacaroon::from).collect();
    let json =
        serde_json::to_string(&wire).map_err(|e| MacaroonError::EncodingError(e.to_string()))?;

    Ok(match encoding {
        Encoding::Json => json,
        Encoding::Base64 => URL_SAFE_NO_PAD.encode(json),
    })
}

/// Decode a single token or a list of tokens.
///
/// Accepts a JSON object, a JSON array, or either of those wrapped in base64.
pub fn decode_all(text: &str) -> Result<Vec<Macaroon>> {
    let text = text.trim();
    match text.as_bytes().first() {
        None => Err(MacaroonError::DecodingError("empty token string".into())),
        Some(b'{') | Some(b'[') => decode_json(text.as_bytes()),
        Some(_) => {
            let json = b64_decode(text)?;
            match json.first() {
                Some(b'{') | Some(b'[') => decode_json(&json),
                _ => Err(MacaroonError::DecodingError(
                    "base64 payload is not JSON".into(),
                )),
            }
        }
    }
}

fn decode_json(bytes: &[u8]) -> Result<Vec<Macaroon>> {
    if bytes.first() == Some(&b'{') {
        return Ok(vec![Macaroon::from_bytes(bytes)?]);
    }

    let wire: Vec<WireMacaroon> =
        serde_json::from_slice(bytes).map_err(|e| MacaroonError::DecodingError(e.to_string()))?;
    wire.into_iter().map(Macaroon::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RootKey;
    use proptest::prelude::*;

    fn sample() -> Macaroon {
        let key = RootKey::from_bytes(vec![0x01; 32]);
        Macaroon::create("https://ts.example", &key, b"key-1".to_vec())
            .add_first_party_caveat(b"user = bob".to_vec())
            .add_third_party_caveat(
                "https://as.example",
                &RootKey::from_bytes(vec![0x02; 32]),
                b"cid".to_vec(),
                &[0x03; 24],
            )
            .unwrap()
    }

    #[test]
    fn test_json_shape() {
        let key = RootKey::from_bytes(vec![0x01; 32]);
        let m = Macaroon::create("loc", &key, b"id".to_vec()).add_first_party_caveat(b"a".to_vec());
        let json: serde_json::Value = serde_json::from_slice(&m.to_bytes().unwrap()).unwrap();

        assert_eq!(json["v"], 2);
        assert_eq!(json["l"], "loc");
        assert_eq!(json["i64"], "aWQ");
        assert_eq!(json["c"][0]["i64"], "YQ");
        assert!(json["c"][0].get("v64").is_none());
        assert_eq!(json["s64"].as_str().unwrap().len(), 43);
    }

    #[test]
    fn test_roundtrip_is_byte_exact() {
        let m = sample();
        let bytes = m.to_bytes().unwrap();
        let decoded = Macaroon::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, m);
        assert_eq!(decoded.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_unsupported_version() {
        let json = br#"{"v":1,"i64":"aWQ","s64":"AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"}"#;
        assert!(matches!(
            Macaroon::from_bytes(json),
            Err(MacaroonError::UnsupportedVersion(1))
        ));
    }

    #[test]
    fn test_short_signature_rejected() {
        let json = br#"{"v":2,"i64":"aWQ","s64":"AAAA"}"#;
        assert!(Macaroon::from_bytes(json).is_err());
    }

    #[test]
    fn test_half_third_party_caveat_rejected() {
        let json = br#"{"v":2,"i64":"aWQ","c":[{"i64":"YQ","v64":"YQ"}],"s64":"AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"}"#;
        assert!(Macaroon::from_bytes(json).is_err());
    }

    #[test]
    fn test_encode_all_both_encodings() {
        let m = sample();
        let discharge = Macaroon::create("as", &RootKey::from_bytes(vec![0x02; 32]), b"cid".to_vec())
            .bind(&m);
        let tokens = vec![m, discharge];

        let json = encode_all(&tokens, Encoding::Json).unwrap();
        assert!(json.starts_with('['));
        assert_eq!(decode_all(&json).unwrap(), tokens);

        let b64 = encode_all(&tokens, Encoding::Base64).unwrap();
        assert!(!b64.contains('='));
        assert_eq!(decode_all(&b64).unwrap(), tokens);
    }

    #[test]
    fn test_decode_single_object() {
        let m = sample();
        let text = String::from_utf8(m.to_bytes().unwrap()).unwrap();
        assert_eq!(decode_all(&text).unwrap(), vec![m.clone()]);

        let wrapped = URL_SAFE_NO_PAD.encode(&text);
        assert_eq!(decode_all(&wrapped).unwrap(), vec![m]);
    }

    #[test]
    fn test_decode_accepts_padding() {
        let tokens = vec![sample()];
        let padded = base64::engine::general_purpose::URL_SAFE
            .encode(encode_all(&tokens, Encoding::Json).unwrap());
        assert_eq!(decode_all(&padded).unwrap(), tokens);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_all("").is_err());
        assert!(decode_all("   ").is_err());
        assert!(decode_all("!!!").is_err());
        assert!(decode_all(&URL_SAFE_NO_PAD.encode("hello")).is_err());
        assert!(decode_all("{not json").is_err());
    }

    proptest! {
        #[test]
        fn prop_wire_roundtrip(
            location in "[a-z:/.]{0,24}",
            identifier in prop::collection::vec(any::<u8>(), 0..48),
            predicates in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..32), 0..6),
        ) {
            let key = RootKey::from_bytes(vec![0x11; 32]);
            let mut m = Macaroon::create(location, &key, identifier);
            for p in predicates {
                m = m.add_first_party_caveat(p);
            }
            let decoded = Macaroon::from_bytes(&m.to_bytes().unwrap()).unwrap();
            prop_assert_eq!(decoded, m);
        }
    }
}
