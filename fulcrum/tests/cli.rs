use std::path::Path;

use clap::Parser;
use fulcrum::cli::{RunArgs, SmokeArgs};
use rl::{RunConfig, SmokeConfig};

#[test]
fn run_defaults() {
    let config = RunConfig::from(RunArgs::try_parse_from(["run_trained_policy"]).unwrap());
    assert_eq!(config, RunConfig::default());
}

#[test]
fn run_flags() {
    let args = RunArgs::try_parse_from([
        "run_trained_policy",
        "--scene",
        "other.json",
        "--model",
        "ppo_balance.safetensors",
        "--episodes",
        "3",
        "--no-render",
        "--seed",
        "7",
    ])
    .unwrap();
    let config = RunConfig::from(args);
    assert_eq!(config.scene_path, Path::new("other.json"));
    assert_eq!(
        config.model_path.as_deref(),
        Some(Path::new("ppo_balance.safetensors"))
    );
    assert_eq!(config.episodes, 3);
    assert!(!config.render);
    assert_eq!(config.seed, 7);
}

#[test]
fn zero_episodes_rejected() {
    assert!(RunArgs::try_parse_from(["run_trained_policy", "--episodes", "0"]).is_err());
}

#[test]
fn non_numeric_seed_rejected() {
    assert!(RunArgs::try_parse_from(["run_trained_policy", "--seed", "abc"]).is_err());
}

#[test]
fn smoke_defaults_and_scene_override() {
    let config = SmokeConfig::from(SmokeArgs::try_parse_from(["smoke_test"]).unwrap());
    assert_eq!(config, SmokeConfig::default());

    let config =
        SmokeConfig::from(SmokeArgs::try_parse_from(["smoke_test", "--scene", "x.json"]).unwrap());
    assert_eq!(config.scene_path, Path::new("x.json"));
}

#[test]
fn logging_init_is_idempotent() {
    fulcrum::logging::init();
    fulcrum::logging::init();
}
