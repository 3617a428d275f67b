use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Prize tiers in draw order. The derived `Ord` follows declaration order,
/// so `Third < Second < First < Grand`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrizeTier {
    Third,
    Second,
    First,
    Grand,
}

impl PrizeTier {
    pub const ALL: [PrizeTier; 4] = [
        PrizeTier::Third,
        PrizeTier::Second,
        PrizeTier::First,
        PrizeTier::Grand,
    ];

    /// The tier whose winner is the configured reserved name.
    pub fn is_top(self) -> bool {
        self == PrizeTier::Grand
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrizeTier::Third => "third",
            PrizeTier::Second => "second",
            PrizeTier::First => "first",
            PrizeTier::Grand => "grand",
        }
    }
}

impl fmt::Display for PrizeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrizeTier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        PrizeTier::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ConfigError::UnknownTierName(needle.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierConfig {
    pub tier: PrizeTier,
    pub label: String,
    pub quota: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl TierConfig {
    pub fn new(tier: PrizeTier, label: impl Into<String>, quota: usize) -> Self {
        Self {
            tier,
            label: label.into(),
            quota,
            accent: None,
            icon: None,
        }
    }

    pub fn with_display(mut self, accent: impl Into<String>, icon: impl Into<String>) -> Self {
        self.accent = Some(accent.into());
        self.icon = Some(icon.into());
        self
    }

    pub fn short_label(&self) -> &str {
        short_label(&self.label)
    }
}

/// Label text before the first `-`, used for compact tab headers.
pub fn short_label(label: &str) -> &str {
    label.split('-').next().map(str::trim).unwrap_or(label)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub name: String,
    pub tier: PrizeTier,
    pub drawn_at: DateTime<Utc>,
}
