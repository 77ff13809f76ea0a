//! Evaluates a trained policy on the beam-and-ball task.

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use fulcrum::cli::RunArgs;
use rl::RunConfig;

fn main() -> Result<()> {
    fulcrum::logging::init();
    let config = RunConfig::from(RunArgs::parse());
    tracing::info!(?config, "starting evaluation");

    let mut stdout = io::stdout().lock();
    rl::run_policy(&config, &mut stdout).with_context(|| {
        format!(
            "evaluation on scene {} failed",
            config.scene_path.display()
        )
    })?;
    Ok(())
}
