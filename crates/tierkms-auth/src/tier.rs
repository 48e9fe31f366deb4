use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Privilege tier of a master key.
///
/// Variant order is the privilege order: `PUBLIC < INTERNAL < CONFIDENTIAL < RESTRICTED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Public,
    Internal,
    Confidential,
    Restricted,
}

impl Tier {
    /// Every tier, lowest privilege first.
    pub const ALL: [Tier; 4] = [
        Tier::Public,
        Tier::Internal,
        Tier::Confidential,
        Tier::Restricted,
    ];

    /// Wire identifier, e.g. `"CONFIDENTIAL"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Public => "PUBLIC",
            Tier::Internal => "INTERNAL",
            Tier::Confidential => "CONFIDENTIAL",
            Tier::Restricted => "RESTRICTED",
        }
    }

    /// This tier and every tier above it.
    pub fn at_or_above(self) -> impl Iterator<Item = Tier> {
        Tier::ALL.into_iter().filter(move |t| *t >= self)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifiers are matched exactly; `"internal"` is not a tier.
impl FromStr for Tier {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AuthError::UnknownTier(s.to_string()))
    }
}
