//! Command-line arguments for both binaries.

use std::path::PathBuf;

use clap::Parser;
use rl::{RunConfig, SmokeConfig, DEFAULT_SCENE};

/// Run a trained PPO policy on the beam-and-ball task.
#[derive(Debug, Parser)]
#[command(name = "run_trained_policy", version)]
pub struct RunArgs {
    /// Path to scene file
    #[arg(long, default_value = DEFAULT_SCENE)]
    pub scene: PathBuf,

    /// Path to a saved policy (safetensors); omit for a random policy
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Number of episodes to run
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub episodes: u64,

    /// Disable rendering
    #[arg(long)]
    pub no_render: bool,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<RunArgs> for RunConfig {
    #[allow(clippy::cast_possible_truncation)]
    fn from(args: RunArgs) -> Self {
        Self {
            scene_path: args.scene,
            model_path: args.model,
            episodes: args.episodes as usize,
            render: !args.no_render,
            seed: args.seed,
        }
    }
}

/// Quick smoke test for the RL training stack.
#[derive(Debug, Parser)]
#[command(name = "smoke_test", version)]
pub struct SmokeArgs {
    /// Path to scene file
    #[arg(long, default_value = DEFAULT_SCENE)]
    pub scene: PathBuf,
}

impl From<SmokeArgs> for SmokeConfig {
    fn from(args: SmokeArgs) -> Self {
        Self {
            scene_path: args.scene,
            ..Self::default()
        }
    }
}
