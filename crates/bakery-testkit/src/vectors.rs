//! Golden test vectors for the signature chain.
//!
//! Any implementation of the token format must reproduce these HMAC-SHA256
//! signatures bit for bit.

use bakery_core::{Macaroon, RootKey};

/// Root key shared by every vector.
pub const VECTOR_ROOT_KEY: &[u8] = b"this is our super secret key; only we should know it";

/// Identifier shared by every vector.
pub const VECTOR_IDENTIFIER: &[u8] = b"we used our secret key";

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// First-party predicates, in order.
    pub caveats: &'static [&'static str],
    /// Bind the result to a root built from these predicates instead.
    pub bind_to: Option<&'static [&'static str]>,
    /// Expected signature (hex).
    pub expected_signature: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "no caveats",
            caveats: &[],
            bind_to: None,
            expected_signature: "5c748a4dabfd5ff2a0b5ab56120c8021912b591ac09023b4bffbc6e1b54e664f",
        },
        GoldenVector {
            name: "one first-party caveat",
            caveats: &["account = 3735928559"],
            bind_to: None,
            expected_signature: "33b8bc5e5d63b644d433512781a5f23dbcf9dfed63e22710fa63785e809cf1d3",
        },
        GoldenVector {
            name: "two first-party caveats",
            caveats: &["account = 3735928559", "user = alice"],
            bind_to: None,
            expected_signature: "aca34b5ba42bb5b48d21ef0bcd8972990fb59b96fe00a223d93dd33feab16c6a",
        },
        GoldenVector {
            name: "bare token bound to two-caveat root",
            caveats: &[],
            bind_to: Some(&["account = 3735928559", "user = alice"]),
            expected_signature: "fe37ff25edee5e4e74143b4a96112ca2460cd6566e35f2d00fa9387d96893cca",
        },
    ]
}

fn build(caveats: &[&str]) -> Macaroon {
    let key = RootKey::from_bytes(VECTOR_ROOT_KEY.to_vec());
    caveats.iter().fold(
        Macaroon::create("http://mybank/", &key, VECTOR_IDENTIFIER.to_vec()),
        |token, predicate| token.add_first_party_caveat(predicate.as_bytes()),
    )
}

/// Compute the signature a vector describes, as hex.
pub fn compute_signature(vector: &GoldenVector) -> String {
    let token = build(vector.caveats);
    match vector.bind_to {
        Some(root) => token.bind(&build(root)).signature().to_hex(),
        None => token.signature().to_hex(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors() {
        for vector in all_vectors() {
            assert_eq!(
                compute_signature(&vector),
                vector.expected_signature,
                "vector {:?}",
                vector.name
            );
        }
    }

    #[test]
    fn test_vector_names_unique() {
        let vectors = all_vectors();
        for (i, a) in vectors.iter().enumerate() {
            for b in &vectors[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
