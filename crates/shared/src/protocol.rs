use serde::{Deserialize, Serialize};

use crate::domain::{short_label, PrizeTier, Winner};

/// Intents forwarded from a front end into the draw controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum DrawCommand {
    StartDraw,
    StopDraw,
    Toggle,
    SelectTier { tier: PrizeTier },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawPhase {
    Idle,
    Rolling,
    TierComplete,
    AllComplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierProgress {
    pub tier: PrizeTier,
    pub label: String,
    pub quota: usize,
    pub winners: Vec<String>,
}

impl TierProgress {
    pub fn short_label(&self) -> &str {
        short_label(&self.label)
    }

    pub fn open_slots(&self) -> usize {
        self.quota.saturating_sub(self.winners.len())
    }
}

/// Read-only view of a draw session handed to presentation code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawSnapshot {
    pub phase: DrawPhase,
    pub current_tier: PrizeTier,
    pub current_tier_label: String,
    pub tiers: Vec<TierProgress>,
    pub winners: Vec<Winner>,
    pub candidates: Vec<String>,
    pub remaining: Vec<String>,
    pub is_rolling: bool,
    pub is_all_complete: bool,
    pub is_current_tier_full: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_winner: Option<String>,
}

impl DrawSnapshot {
    pub fn tier(&self, tier: PrizeTier) -> Option<&TierProgress> {
        self.tiers.iter().find(|progress| progress.tier == tier)
    }

    pub fn has_won(&self, name: &str) -> bool {
        self.winners.iter().any(|winner| winner.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum DrawEvent {
    RollingStarted {
        tier: PrizeTier,
    },
    WinnerDrawn {
        winner: Winner,
        forced: bool,
    },
    TierAdvanceScheduled {
        tier: PrizeTier,
        delay_ms: u64,
    },
    TierChanged {
        tier: PrizeTier,
    },
    AllComplete,
}
