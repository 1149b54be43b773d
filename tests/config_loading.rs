// tests/config_loading.rs
use std::path::PathBuf;
use std::{env, fs};

use tradeoff_ranker::config::{
    RankerConfig, ENV_CONFIG_PATH, ENV_ERROR_WARN_THRESHOLD, ENV_MAX_TIERS,
};

#[test]
fn parse_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("ranker.toml");
    fs::write(
        &p_toml,
        r#"
max_components = 4
error_warn_threshold = 5.0
tier_names = ["Top", "Middle", "Bottom"]
zscores_path = "in/z.csv"

[labels]
name = ["alternative"]
"#,
    )
    .unwrap();
    let c = RankerConfig::load_from(&p_toml).unwrap();
    assert_eq!(c.max_components, 4);
    assert_eq!(c.error_warn_threshold, 5.0);
    assert_eq!(c.tier_names.name_for(3), "Bottom");
    assert_eq!(c.tier_names.name_for(4), "Tier 4");
    assert_eq!(c.zscores_path, PathBuf::from("in/z.csv"));
    assert_eq!(c.labels.name, vec!["alternative".to_string()]);
    assert_eq!(c.rank_options().max_components, 4);

    let p_json = dir.path().join("ranker.json");
    fs::write(&p_json, r#"{ "tier_names": ["Only"], "max_components": 0 }"#).unwrap();
    let j = RankerConfig::load_from(&p_json).unwrap();
    assert_eq!(j.tier_names.name_for(1), "Only");
    // zero is sanitized back to the default
    assert_eq!(j.max_components, RankerConfig::default().max_components);

    let bad = dir.path().join("broken.toml");
    fs::write(&bad, "max_components = [").unwrap();
    let err = RankerConfig::load_from(&bad).unwrap_err();
    assert!(format!("{err:#}").contains("broken.toml"));
}

#[serial_test::serial]
#[test]
fn json_fallback_and_env_overrides() {
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var(ENV_CONFIG_PATH);
    env::remove_var(ENV_MAX_TIERS);
    env::remove_var(ENV_ERROR_WARN_THRESHOLD);

    fs::create_dir_all(tmp.path().join("config")).unwrap();
    fs::write(
        tmp.path().join("config/ranker.json"),
        r#"{ "max_components": 5, "error_warn_threshold": 10 }"#,
    )
    .unwrap();
    let c = RankerConfig::load_default().unwrap();
    assert_eq!((c.max_components, c.error_warn_threshold), (5, 10.0));

    env::set_var(ENV_ERROR_WARN_THRESHOLD, "2.5");
    env::set_var(ENV_MAX_TIERS, "not-a-number");
    let c = RankerConfig::load_default().unwrap();
    assert_eq!(c.error_warn_threshold, 2.5);
    assert_eq!(c.max_components, 5, "unparseable override is ignored");

    env::set_var(ENV_ERROR_WARN_THRESHOLD, "-1");
    let c = RankerConfig::load_default().unwrap();
    assert_eq!(c.error_warn_threshold, RankerConfig::default().error_warn_threshold);

    env::remove_var(ENV_MAX_TIERS);
    env::remove_var(ENV_ERROR_WARN_THRESHOLD);
    env::set_current_dir(&old).unwrap();
}
