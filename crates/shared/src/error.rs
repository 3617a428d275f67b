use thiserror::Error;

use crate::domain::PrizeTier;

/// Reasons an inbound draw intent was ignored. A rejected intent never
/// changes draw state; front ends are free to drop these silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawRejected {
    #[error("a draw is already rolling")]
    AlreadyRolling,
    #[error("no draw is rolling")]
    NotRolling,
    #[error("tier {0} has reached its quota")]
    TierFull(PrizeTier),
    #[error("all tiers are complete")]
    AllComplete,
    #[error("no candidates remain in the pool")]
    PoolExhausted,
    #[error("tier {0} is not part of this draw")]
    UnknownTier(PrizeTier),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("candidate list is empty")]
    NoCandidates,
    #[error("candidate '{0}' is listed more than once")]
    DuplicateCandidate(String),
    #[error("no prize tiers configured")]
    NoTiers,
    #[error("tier {tier} is out of order (must come after {previous})")]
    TierOutOfOrder { tier: PrizeTier, previous: PrizeTier },
    #[error("tier {0} must have a quota of at least one winner")]
    ZeroQuota(PrizeTier),
    #[error("reserved winner '{0}' is not in the candidate list")]
    ReservedWinnerNotCandidate(String),
    #[error("unknown prize tier '{0}'")]
    UnknownTierName(String),
}
