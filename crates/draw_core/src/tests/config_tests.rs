use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_are_valid() {
    let cfg = LotteryConfig::default();
    cfg.validate().expect("defaults validate");
    assert_eq!(cfg.candidates.len(), 29);
    assert_eq!(
        cfg.tiers.iter().map(|t| t.quota).collect::<Vec<_>>(),
        vec![10, 5, 2, 1]
    );
    assert!(cfg.candidates.contains(&cfg.reserved_winner));
    assert_eq!(cfg.auto_advance_delay_ms, 4000);
    assert_eq!(
        cfg.tier_config(PrizeTier::Grand).map(|t| t.short_label()),
        Some("特等奖")
    );
}

#[test]
fn parses_semicolon_roster_dropping_blanks() {
    assert_eq!(
        parse_candidate_list(" a ;b;; ;c;"),
        vec!["a".to_string(), "b".into(), "c".into()]
    );
    assert!(parse_candidate_list(";;").is_empty());
}

#[test]
fn rejects_empty_roster() {
    let cfg = LotteryConfig {
        candidates: Vec::new(),
        ..LotteryConfig::default()
    };
    assert_eq!(cfg.validate(), Err(ConfigError::NoCandidates));
}

#[test]
fn rejects_duplicate_candidates() {
    let mut cfg = LotteryConfig::default();
    cfg.candidates.push("胡苗".into());
    assert_eq!(
        cfg.validate(),
        Err(ConfigError::DuplicateCandidate("胡苗".into()))
    );
}

#[test]
fn rejects_missing_tiers() {
    let cfg = LotteryConfig {
        tiers: Vec::new(),
        ..LotteryConfig::default()
    };
    assert_eq!(cfg.validate(), Err(ConfigError::NoTiers));
}

#[test]
fn rejects_tiers_out_of_draw_order() {
    let mut cfg = LotteryConfig::default();
    cfg.tiers.swap(1, 2);
    assert_eq!(
        cfg.validate(),
        Err(ConfigError::TierOutOfOrder {
            tier: PrizeTier::Second,
            previous: PrizeTier::First,
        })
    );

    let mut dup = LotteryConfig::default();
    dup.tiers[1].tier = PrizeTier::Third;
    assert!(matches!(
        dup.validate(),
        Err(ConfigError::TierOutOfOrder { .. })
    ));
}

#[test]
fn rejects_zero_quota() {
    let mut cfg = LotteryConfig::default();
    cfg.tiers[0].quota = 0;
    assert_eq!(cfg.validate(), Err(ConfigError::ZeroQuota(PrizeTier::Third)));

    let mut cfg = LotteryConfig::default();
    cfg.tiers[3].quota = 0;
    assert_eq!(cfg.validate(), Err(ConfigError::ZeroQuota(PrizeTier::Grand)));
}

#[test]
fn rejects_reserved_winner_outside_roster() {
    let cfg = LotteryConfig {
        reserved_winner: "nobody".into(),
        ..LotteryConfig::default()
    };
    assert_eq!(
        cfg.validate(),
        Err(ConfigError::ReservedWinnerNotCandidate("nobody".into()))
    );
}

#[test]
fn toml_overrides_only_given_keys() {
    let cfg = LotteryConfig::from_toml_str(
        r#"
        candidates = "A;B;R"
        reserved_winner = "R"

        [[tiers]]
        tier = "third"
        label = "Third prize"
        quota = 1

        [[tiers]]
        tier = "grand"
        label = "Grand prize"
        quota = 1
        icon = "award"
        "#,
    )
    .expect("parse");

    assert_eq!(cfg.candidates, vec!["A", "B", "R"]);
    assert_eq!(cfg.tiers.len(), 2);
    assert_eq!(cfg.tiers[1].icon.as_deref(), Some("award"));
    assert_eq!(cfg.auto_advance_delay_ms, DEFAULT_AUTO_ADVANCE_DELAY_MS);
    cfg.validate().expect("valid");
}

#[test]
fn toml_accepts_candidate_array() {
    let cfg = LotteryConfig::from_toml_str(
        r#"
        candidates = ["王泽巨", " 胡苗 ", ""]
        auto_advance_delay_ms = 250
        "#,
    )
    .expect("parse");
    assert_eq!(cfg.candidates, vec!["王泽巨", "胡苗"]);
    assert_eq!(cfg.auto_advance_delay_ms, 250);
}

#[test]
fn toml_rejects_unknown_keys() {
    assert!(LotteryConfig::from_toml_str("winners = 3").is_err());
}

#[test]
fn env_overrides_apply_on_top() {
    let mut cfg = LotteryConfig::default();
    cfg.apply_env_overrides(lookup_from(&[
        ("APP__CANDIDATES", "X;Y;Z"),
        ("APP__RESERVED_WINNER", " Z "),
        ("APP__AUTO_ADVANCE_DELAY_MS", "1500"),
    ]));

    assert_eq!(cfg.candidates, vec!["X", "Y", "Z"]);
    assert_eq!(cfg.reserved_winner, "Z");
    assert_eq!(cfg.auto_advance_delay_ms, 1500);
}

#[test]
fn unparsable_delay_override_is_ignored() {
    let mut cfg = LotteryConfig::default();
    cfg.apply_env_overrides(lookup_from(&[("APP__AUTO_ADVANCE_DELAY_MS", "soon")]));
    assert_eq!(cfg.auto_advance_delay_ms, DEFAULT_AUTO_ADVANCE_DELAY_MS);
}

#[test]
fn explicit_config_path_must_exist() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let missing = env::temp_dir().join(format!("lottery_missing_{suffix}.toml"));

    let err = load_config(Some(&missing)).expect_err("missing file");
    assert!(err.to_string().contains("failed to read config"));
}

#[test]
fn loads_config_file_from_path() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("lottery_config_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("lottery.toml");
    fs::write(&path, "candidates = \"王泽巨;胡苗\"\n").expect("write config");

    let cfg = load_config(Some(&path)).expect("load");
    assert_eq!(cfg.candidates.len(), 2);

    fs::write(&path, "candidates = \"胡苗\"\n").expect("write config");
    let err = load_config(Some(&path)).expect_err("reserved winner missing");
    assert!(format!("{err:#}").contains("not in the candidate list"));

    fs::remove_dir_all(temp_root).expect("cleanup");
}
