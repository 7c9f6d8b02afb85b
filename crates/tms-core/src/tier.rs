use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Expected read frequency of a documentation file.
///
/// Tiers are categorical labels, not ranks: HOT files are loaded every
/// session, WARM files on demand, COLD files are archival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Hot,
    Warm,
    Cold,
}

impl Tier {
    pub fn all() -> &'static [Tier] {
        &[Tier::Hot, Tier::Warm, Tier::Cold]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Hot => "HOT",
            Tier::Warm => "WARM",
            Tier::Cold => "COLD",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Tier::Hot => "always read",
            Tier::Warm => "read on demand",
            Tier::Cold => "archived",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = crate::error::TmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HOT" => Ok(Tier::Hot),
            "WARM" => Ok(Tier::Warm),
            "COLD" => Ok(Tier::Cold),
            _ => Err(crate::error::TmsError::InvalidTier(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
