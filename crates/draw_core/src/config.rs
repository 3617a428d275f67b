use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;
use shared::{
    domain::{PrizeTier, TierConfig},
    error::ConfigError,
};

pub const DEFAULT_CONFIG_FILE: &str = "lottery.toml";
pub const DEFAULT_AUTO_ADVANCE_DELAY_MS: u64 = 4000;

const DEFAULT_ROSTER: &str = "唐启武;曹朋辉;杜秋霞;范栋;胡可斌;胡苗;胡小龙;康林;康雅伟;廖静怡;林秀萍;刘玉;李燕敏;吕明萍;饶小珊;舒坦;唐开华;王德祥;王泽巨;吴邦正;熊启强;杨艳;叶峰;叶鑫伟;余小红;曾静兰;曾振平;张累;周新乐";
const DEFAULT_RESERVED_WINNER: &str = "王泽巨";

/// Static startup configuration for one draw session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotteryConfig {
    pub candidates: Vec<String>,
    pub tiers: Vec<TierConfig>,
    pub reserved_winner: String,
    pub auto_advance_delay_ms: u64,
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self {
            candidates: parse_candidate_list(DEFAULT_ROSTER),
            tiers: vec![
                TierConfig::new(PrizeTier::Third, "三等奖 - 晶圆级封装奖", 10)
                    .with_display("emerald", "cpu"),
                TierConfig::new(PrizeTier::Second, "二等奖 - 光刻先锋奖", 5)
                    .with_display("cyan", "microchip"),
                TierConfig::new(PrizeTier::First, "一等奖 - 架构宗师奖", 2)
                    .with_display("purple", "zap"),
                TierConfig::new(PrizeTier::Grand, "特等奖 - 摩尔定律突破奖", 1)
                    .with_display("yellow", "award"),
            ],
            reserved_winner: DEFAULT_RESERVED_WINNER.into(),
            auto_advance_delay_ms: DEFAULT_AUTO_ADVANCE_DELAY_MS,
        }
    }
}

impl LotteryConfig {
    pub fn tier_config(&self, tier: PrizeTier) -> Option<&TierConfig> {
        self.tiers.iter().find(|cfg| cfg.tier == tier)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.candidates.is_empty() {
            return Err(ConfigError::NoCandidates);
        }

        let mut seen = HashSet::with_capacity(self.candidates.len());
        for name in &self.candidates {
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateCandidate(name.clone()));
            }
        }

        let Some(first) = self.tiers.first() else {
            return Err(ConfigError::NoTiers);
        };
        if first.quota == 0 {
            return Err(ConfigError::ZeroQuota(first.tier));
        }
        for pair in self.tiers.windows(2) {
            let (previous, tier) = (pair[0].tier, pair[1].tier);
            if tier <= previous {
                return Err(ConfigError::TierOutOfOrder { tier, previous });
            }
            if pair[1].quota == 0 {
                return Err(ConfigError::ZeroQuota(tier));
            }
        }

        if !seen.contains(self.reserved_winner.as_str()) {
            return Err(ConfigError::ReservedWinnerNotCandidate(
                self.reserved_winner.clone(),
            ));
        }

        Ok(())
    }

    /// Parses a TOML document on top of the built-in defaults. Keys left out
    /// of the document keep their default values.
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let file_cfg: FileConfig = toml::from_str(raw).context("invalid lottery config TOML")?;
        let mut cfg = Self::default();
        file_cfg.apply(&mut cfg);
        Ok(cfg)
    }

    /// Applies `APP__*` overrides. `lookup` is `std::env::var` in production.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("APP__RESERVED_WINNER") {
            self.reserved_winner = v.trim().to_string();
        }
        if let Some(v) = lookup("APP__AUTO_ADVANCE_DELAY_MS") {
            match v.trim().parse::<u64>() {
                Ok(parsed) => self.auto_advance_delay_ms = parsed,
                Err(_) => tracing::warn!(value = %v, "ignoring unparsable APP__AUTO_ADVANCE_DELAY_MS"),
            }
        }
        if let Some(v) = lookup("APP__CANDIDATES") {
            self.candidates = parse_candidate_list(&v);
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CandidateSource {
    List(Vec<String>),
    Raw(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    candidates: Option<CandidateSource>,
    tiers: Option<Vec<TierConfig>>,
    reserved_winner: Option<String>,
    auto_advance_delay_ms: Option<u64>,
}

impl FileConfig {
    fn apply(self, cfg: &mut LotteryConfig) {
        match self.candidates {
            Some(CandidateSource::List(names)) => {
                cfg.candidates = names
                    .into_iter()
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .collect();
            }
            Some(CandidateSource::Raw(raw)) => cfg.candidates = parse_candidate_list(&raw),
            None => {}
        }
        if let Some(tiers) = self.tiers {
            cfg.tiers = tiers;
        }
        if let Some(v) = self.reserved_winner {
            cfg.reserved_winner = v;
        }
        if let Some(v) = self.auto_advance_delay_ms {
            cfg.auto_advance_delay_ms = v;
        }
    }
}

/// Splits a `;`-separated roster, dropping blank entries.
pub fn parse_candidate_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Loads defaults, then the config file, then environment overrides, and
/// validates the result.
///
/// With `path == None` the file is `lottery.toml` in the working directory
/// and may be absent. An explicit path must exist.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<LotteryConfig> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    let mut cfg = match fs::read_to_string(&path) {
        Ok(raw) => LotteryConfig::from_toml_str(&raw)
            .with_context(|| format!("failed to parse config '{}'", path.display()))?,
        Err(err) if required => {
            return Err(err).with_context(|| format!("failed to read config '{}'", path.display()));
        }
        Err(_) => LotteryConfig::default(),
    };

    cfg.apply_env_overrides(|key| std::env::var(key).ok());
    cfg.validate()
        .with_context(|| format!("invalid lottery config (source '{}')", path.display()))?;

    tracing::debug!(
        candidates = cfg.candidates.len(),
        tiers = cfg.tiers.len(),
        delay_ms = cfg.auto_advance_delay_ms,
        "loaded lottery config"
    );
    Ok(cfg)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
