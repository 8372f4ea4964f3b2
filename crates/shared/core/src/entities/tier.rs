use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Risk class of a token
///
/// Controls the maximum per-tick price swing and the per-tick delisting
/// probability. Variants are ordered from highest to lowest risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityTier {
    Micro,
    Mid,
    Large,
    BlueChip,
}

impl VolatilityTier {
    /// All tiers, highest risk first
    pub const ALL: [VolatilityTier; 4] = [
        VolatilityTier::Micro,
        VolatilityTier::Mid,
        VolatilityTier::Large,
        VolatilityTier::BlueChip,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VolatilityTier::Micro => "micro",
            VolatilityTier::Mid => "mid",
            VolatilityTier::Large => "large",
            VolatilityTier::BlueChip => "blue_chip",
        }
    }

    /// The next lower-risk tier, if any
    pub fn safer(&self) -> Option<VolatilityTier> {
        match self {
            VolatilityTier::Micro => Some(VolatilityTier::Mid),
            VolatilityTier::Mid => Some(VolatilityTier::Large),
            VolatilityTier::Large => Some(VolatilityTier::BlueChip),
            VolatilityTier::BlueChip => None,
        }
    }
}

impl std::fmt::Display for VolatilityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored tier tag does not name a known tier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown volatility tier: {0:?}")]
pub struct UnknownTierError(pub String);

impl FromStr for VolatilityTier {
    type Err = UnknownTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "micro" => Ok(VolatilityTier::Micro),
            "mid" => Ok(VolatilityTier::Mid),
            "large" => Ok(VolatilityTier::Large),
            "blue_chip" | "bluechip" | "blue-chip" => Ok(VolatilityTier::BlueChip),
            other => Err(UnknownTierError(other.to_string())),
        }
    }
}

/// Deserializes a stored tier tag, mapping missing or unrecognised values to `None`
/// so the caller can apply its fallback policy instead of failing the whole load.
pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<VolatilityTier>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StoredTier {
        Tag(String),
        Other(IgnoredAny),
    }

    let raw: Option<StoredTier> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(StoredTier::Tag(tag)) => tag.parse().ok(),
        Some(StoredTier::Other(_)) | None => None,
    })
}
