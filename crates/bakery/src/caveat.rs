//! Caveats as the bakery sees them.

use bakery_core::{CaveatPacket, ThirdPartyCaveat};

use crate::condition::{Condition, ParseError};

/// Reserved location naming the bakery that handles the request.
pub const LOCAL_LOCATION: &str = "local";

/// A caveat to add to a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Caveat {
    /// Checked by whoever verifies the token.
    FirstParty(Condition),
    /// Delegated to the authority at `location`.
    ThirdParty {
        location: String,
        condition: Condition,
    },
}

impl Caveat {
    pub fn first_party(condition: Condition) -> Self {
        Self::FirstParty(condition)
    }

    pub fn third_party(location: impl Into<String>, condition: Condition) -> Self {
        Self::ThirdParty {
            location: location.into(),
            condition,
        }
    }

    /// A third-party caveat discharged by this bakery itself.
    pub fn local(condition: Condition) -> Self {
        Self::third_party(LOCAL_LOCATION, condition)
    }

    pub fn is_third_party(&self) -> bool {
        matches!(self, Self::ThirdParty { .. })
    }

    /// Delegation target, if any.
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::FirstParty(_) => None,
            Self::ThirdParty { location, .. } => Some(location),
        }
    }

    pub fn condition(&self) -> &Condition {
        match self {
            Self::FirstParty(condition) | Self::ThirdParty { condition, .. } => condition,
        }
    }
}

/// A caveat read back from a token.
///
/// A third-party caveat's condition is sealed for its authority, so only the
/// location and identifiers are visible.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenCaveat {
    FirstParty(Condition),
    ThirdParty(ThirdPartyCaveat),
}

impl TokenCaveat {
    /// Interpret one caveat packet.
    pub fn from_packet(packet: &CaveatPacket) -> Result<Self, ParseError> {
        match (&packet.location, &packet.verification_id) {
            (Some(location), Some(vid)) => Ok(Self::ThirdParty(ThirdPartyCaveat {
                location: location.clone(),
                identifier: packet.identifier.clone(),
                verification_id: vid.clone(),
            })),
            _ => Condition::from_bytes(&packet.identifier).map(Self::FirstParty),
        }
    }

    pub fn is_third_party(&self) -> bool {
        matches!(self, Self::ThirdParty(_))
    }
}

/// First-party caveats match on their condition, third-party caveats on
/// their location.
impl PartialEq<Caveat> for TokenCaveat {
    fn eq(&self, other: &Caveat) -> bool {
        match (self, other) {
            (Self::FirstParty(a), Caveat::FirstParty(b)) => a == b,
            (Self::ThirdParty(a), Caveat::ThirdParty { location, .. }) => &a.location == location,
            _ => false,
        }
    }
}
