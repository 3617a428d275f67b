use chrono::Utc;
use shared::{
    domain::{PrizeTier, TierConfig, Winner},
    error::{ConfigError, DrawRejected},
    protocol::{DrawPhase, DrawSnapshot, TierProgress},
};
use tracing::{debug, info};

use crate::{
    config::LotteryConfig,
    selection::{choose_winner, RandomSource, Selection},
};

/// Identifies one scheduled auto-advance. Only the most recently issued
/// ticket can be applied; cancelling or superseding it makes it stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceTicket {
    token: u64,
    tier_index: usize,
}

impl AdvanceTicket {
    pub fn token(&self) -> u64 {
        self.token
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopOutcome {
    pub winner: Winner,
    pub selection: Selection,
    pub advance: Option<AdvanceTicket>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Started(PrizeTier),
    Stopped(StopOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Ticket was cancelled or superseded; nothing changed.
    Stale,
    Advanced(PrizeTier),
    AllComplete,
}

/// Draw session state and its transitions.
///
/// The engine never schedules anything itself: `stop_draw` hands back an
/// [`AdvanceTicket`] and whoever owns the clock calls
/// [`DrawEngine::apply_advance`] once the delay has elapsed.
pub struct DrawEngine {
    tiers: Vec<TierConfig>,
    candidates: Vec<String>,
    reserved_winner: String,
    remaining: Vec<String>,
    winners: Vec<Winner>,
    current_tier_index: usize,
    is_rolling: bool,
    last_winner: Option<String>,
    pending_advance: Option<AdvanceTicket>,
    next_token: u64,
    random: Box<dyn RandomSource + Send>,
}

impl DrawEngine {
    pub fn new(
        config: &LotteryConfig,
        random: Box<dyn RandomSource + Send>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            tiers: config.tiers.clone(),
            candidates: config.candidates.clone(),
            reserved_winner: config.reserved_winner.clone(),
            remaining: config.candidates.clone(),
            winners: Vec::new(),
            current_tier_index: 0,
            is_rolling: false,
            last_winner: None,
            pending_advance: None,
            next_token: 1,
            random,
        })
    }

    pub fn start_draw(&mut self) -> Result<PrizeTier, DrawRejected> {
        if self.is_rolling {
            return Err(DrawRejected::AlreadyRolling);
        }
        if self.is_all_complete() {
            return Err(DrawRejected::AllComplete);
        }
        if self.remaining.is_empty() {
            return Err(DrawRejected::PoolExhausted);
        }
        let tier = self.current_tier();
        if self.is_current_tier_full() {
            return Err(DrawRejected::TierFull(tier));
        }

        self.cancel_pending_advance();
        self.is_rolling = true;
        self.last_winner = None;
        debug!(%tier, remaining = self.remaining.len(), "draw rolling");
        Ok(tier)
    }

    pub fn stop_draw(&mut self) -> Result<StopOutcome, DrawRejected> {
        if !self.is_rolling {
            return Err(DrawRejected::NotRolling);
        }

        let tier = self.current_tier();
        let (name, selection) = choose_winner(
            tier,
            &self.remaining,
            &self.reserved_winner,
            self.random.as_mut(),
        )
        .ok_or(DrawRejected::PoolExhausted)?;

        let winner = Winner {
            name,
            tier,
            drawn_at: Utc::now(),
        };
        self.remaining.retain(|candidate| *candidate != winner.name);
        self.winners.push(winner.clone());
        self.is_rolling = false;
        self.last_winner = Some(winner.name.clone());

        info!(
            name = %winner.name,
            %tier,
            forced = selection.is_forced(),
            remaining = self.remaining.len(),
            "winner drawn"
        );

        let advance = if self.is_current_tier_full() {
            let ticket = AdvanceTicket {
                token: self.next_token,
                tier_index: self.current_tier_index,
            };
            self.next_token += 1;
            self.pending_advance = Some(ticket);
            debug!(%tier, token = ticket.token, "tier quota reached; advance pending");
            Some(ticket)
        } else {
            None
        };

        Ok(StopOutcome {
            winner,
            selection,
            advance,
        })
    }

    pub fn toggle(&mut self) -> Result<ToggleOutcome, DrawRejected> {
        if self.is_all_complete() {
            return Err(DrawRejected::AllComplete);
        }
        if self.is_rolling {
            return self.stop_draw().map(ToggleOutcome::Stopped);
        }
        if self.is_current_tier_full() {
            return Err(DrawRejected::TierFull(self.current_tier()));
        }
        self.start_draw().map(ToggleOutcome::Started)
    }

    /// Moves the cursor to `tier`. Rejected while rolling and for tiers not
    /// part of this draw. Works after the cursor has run past the last tier,
    /// so tiers skipped by a manual jump can still be drawn.
    pub fn select_tier(&mut self, tier: PrizeTier) -> Result<PrizeTier, DrawRejected> {
        if self.is_rolling {
            return Err(DrawRejected::AlreadyRolling);
        }
        let idx = self
            .tiers
            .iter()
            .position(|cfg| cfg.tier == tier)
            .ok_or(DrawRejected::UnknownTier(tier))?;

        self.cancel_pending_advance();
        self.current_tier_index = idx;
        self.last_winner = None;
        info!(%tier, "tier selected manually");
        Ok(tier)
    }

    /// Applies a previously issued ticket if it is still the pending one.
    pub fn apply_advance(&mut self, ticket: AdvanceTicket) -> AdvanceOutcome {
        if self.pending_advance != Some(ticket) || self.current_tier_index != ticket.tier_index {
            debug!(token = ticket.token, "ignoring stale advance ticket");
            return AdvanceOutcome::Stale;
        }

        self.pending_advance = None;
        self.current_tier_index += 1;
        self.last_winner = None;

        if self.is_all_complete() {
            info!(winners = self.winners.len(), "all tiers complete");
            AdvanceOutcome::AllComplete
        } else {
            let tier = self.current_tier();
            info!(%tier, "advanced to next tier");
            AdvanceOutcome::Advanced(tier)
        }
    }

    /// Drops the pending ticket, if any, and returns it.
    pub fn cancel_pending_advance(&mut self) -> Option<AdvanceTicket> {
        let cancelled = self.pending_advance.take();
        if let Some(ticket) = cancelled {
            debug!(token = ticket.token, "cancelled pending advance");
        }
        cancelled
    }

    pub fn pending_advance(&self) -> Option<AdvanceTicket> {
        self.pending_advance
    }

    pub fn is_rolling(&self) -> bool {
        self.is_rolling
    }

    pub fn is_all_complete(&self) -> bool {
        self.current_tier_index >= self.tiers.len()
    }

    pub fn current_tier_index(&self) -> usize {
        self.current_tier_index
    }

    /// Tier at the cursor; pinned to the last tier once every tier is done.
    pub fn current_tier_config(&self) -> &TierConfig {
        let idx = self.current_tier_index.min(self.tiers.len() - 1);
        &self.tiers[idx]
    }

    pub fn current_tier(&self) -> PrizeTier {
        self.current_tier_config().tier
    }

    pub fn tier_winners(&self, tier: PrizeTier) -> impl Iterator<Item = &Winner> + '_ {
        self.winners.iter().filter(move |winner| winner.tier == tier)
    }

    pub fn current_tier_winners(&self) -> Vec<&Winner> {
        self.tier_winners(self.current_tier()).collect()
    }

    pub fn is_current_tier_full(&self) -> bool {
        let cfg = self.current_tier_config();
        self.tier_winners(cfg.tier).count() >= cfg.quota
    }

    pub fn phase(&self) -> DrawPhase {
        if self.is_all_complete() {
            DrawPhase::AllComplete
        } else if self.is_rolling {
            DrawPhase::Rolling
        } else if self.pending_advance.is_some() {
            DrawPhase::TierComplete
        } else {
            DrawPhase::Idle
        }
    }

    pub fn tiers(&self) -> &[TierConfig] {
        &self.tiers
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn remaining(&self) -> &[String] {
        &self.remaining
    }

    pub fn winners(&self) -> &[Winner] {
        &self.winners
    }

    pub fn last_winner(&self) -> Option<&str> {
        self.last_winner.as_deref()
    }

    pub fn reserved_winner(&self) -> &str {
        &self.reserved_winner
    }

    pub fn snapshot(&self) -> DrawSnapshot {
        let current = self.current_tier_config();
        DrawSnapshot {
            phase: self.phase(),
            current_tier: current.tier,
            current_tier_label: current.label.clone(),
            tiers: self
                .tiers
                .iter()
                .map(|cfg| TierProgress {
                    tier: cfg.tier,
                    label: cfg.label.clone(),
                    quota: cfg.quota,
                    winners: self
                        .tier_winners(cfg.tier)
                        .map(|winner| winner.name.clone())
                        .collect(),
                })
                .collect(),
            winners: self.winners.clone(),
            candidates: self.candidates.clone(),
            remaining: self.remaining.clone(),
            is_rolling: self.is_rolling,
            is_all_complete: self.is_all_complete(),
            is_current_tier_full: self.is_current_tier_full(),
            last_winner: self.last_winner.clone(),
        }
    }
}

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;
