//! Episode-by-episode evaluation of a policy on the balancing task.

use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use ml::{MlpPolicy, Policy};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::balance_env::{BalanceBeamEnv, EnvConfig, DEFAULT_SCENE};
use crate::binding::{PhysicsBinding, SimulatorBinding};
use crate::env::{Action, Env};
use crate::error::RunError;

const RULE_WIDTH: usize = 60;
const FIRST_FRAME_PAUSE: Duration = Duration::from_millis(100);
const FRAME_PAUSE: Duration = Duration::from_nanos(1_000_000_000 / 240);

#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    pub scene_path: PathBuf,
    /// Saved policy; `None` evaluates a uniform random policy.
    pub model_path: Option<PathBuf>,
    pub episodes: usize,
    pub render: bool,
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            scene_path: PathBuf::from(DEFAULT_SCENE),
            model_path: None,
            episodes: 5,
            render: true,
            seed: 42,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpisodeStats {
    pub episode_return: f64,
    pub length: u32,
}

/// Per-episode results with population summary statistics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvaluationReport {
    pub episodes: Vec<EpisodeStats>,
}

impl EvaluationReport {
    #[must_use]
    pub fn returns(&self) -> Vec<f64> {
        self.episodes.iter().map(|e| e.episode_return).collect()
    }

    #[must_use]
    pub fn lengths(&self) -> Vec<u32> {
        self.episodes.iter().map(|e| e.length).collect()
    }

    #[must_use]
    pub fn mean_return(&self) -> f64 {
        mean(self.episodes.iter().map(|e| e.episode_return))
    }

    /// Population standard deviation (ddof = 0).
    #[must_use]
    pub fn std_return(&self) -> f64 {
        let m = self.mean_return();
        mean(self.episodes.iter().map(|e| (e.episode_return - m).powi(2))).sqrt()
    }

    #[must_use]
    pub fn mean_length(&self) -> f64 {
        mean(self.episodes.iter().map(|e| f64::from(e.length)))
    }

    #[must_use]
    pub fn max_return(&self) -> f64 {
        self.episodes
            .iter()
            .map(|e| e.episode_return)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Runs `episodes` episodes and writes one line per episode to `out`.
///
/// Actions come from `policy` in deterministic mode, or are sampled from the
/// action space with `rng` when there is no policy. With `render` a first
/// frame is drawn before stepping and every step is paced to real time.
///
/// # Errors
///
/// Propagates environment, policy and output failures.
pub fn evaluate<E, P, W>(
    env: &mut E,
    policy: Option<&P>,
    episodes: usize,
    render: bool,
    rng: &mut StdRng,
    out: &mut W,
) -> Result<EvaluationReport, RunError>
where
    E: Env + ?Sized,
    P: Policy + ?Sized,
    W: Write + ?Sized,
{
    if episodes == 0 {
        return Err(RunError::NoEpisodes);
    }
    let mut report = EvaluationReport::default();

    for ep in 0..episodes {
        let mut obs = env.reset(None)?;
        let mut total_reward = 0.0_f64;
        let mut steps = 0_u32;

        if render {
            env.render()?;
            thread::sleep(FIRST_FRAME_PAUSE);
        }

        loop {
            let action = match policy {
                Some(policy) => Action::Vector(policy.predict(&obs, true)?.0),
                None => Action::Vector(env.action_space().sample(rng)),
            };
            let step = env.step(action)?;
            total_reward += f64::from(step.reward);
            steps += 1;
            let done = step.done();
            obs = step.observation;

            if render {
                env.render()?;
                thread::sleep(FRAME_PAUSE);
            }
            if done {
                break;
            }
        }
        if render {
            env.end_episode()?;
        }

        writeln!(
            out,
            "Episode {:2}: Length={:4}  Return={:8.2}",
            ep + 1,
            steps,
            total_reward
        )?;
        report.episodes.push(EpisodeStats {
            episode_return: total_reward,
            length: steps,
        });
    }

    Ok(report)
}

/// Full evaluation against the bundled simulator, as run by the
/// `run_trained_policy` binary.
///
/// # Errors
///
/// See [`run_policy_with`].
pub fn run_policy<W: Write + ?Sized>(
    config: &RunConfig,
    out: &mut W,
) -> Result<EvaluationReport, RunError> {
    run_policy_with(PhysicsBinding, config, out)
}

/// Builds the adapter on `binding`, loads the policy if one is configured,
/// evaluates it and prints the summary.
///
/// # Errors
///
/// Fails on a zero episode count, a simulator or policy load failure, or an
/// output error.
pub fn run_policy_with<B, W>(
    binding: B,
    config: &RunConfig,
    out: &mut W,
) -> Result<EvaluationReport, RunError>
where
    B: SimulatorBinding,
    W: Write + ?Sized,
{
    if config.episodes == 0 {
        return Err(RunError::NoEpisodes);
    }
    if config.render {
        writeln!(out, "Rendering enabled")?;
    }
    let mut env = BalanceBeamEnv::with_binding(
        binding,
        EnvConfig {
            scene_path: config.scene_path.clone(),
            seed: config.seed,
            headless: !config.render,
            random_init: true,
            ..EnvConfig::default()
        },
    )?;

    let policy = match &config.model_path {
        Some(path) => {
            writeln!(out, "Loading policy from: {}", path.display())?;
            let policy = MlpPolicy::load(path)?;
            writeln!(out, "Model loaded successfully!")?;
            Some(policy)
        }
        None => {
            writeln!(out, "No model provided - using random policy")?;
            None
        }
    };

    writeln!(out, "\nRunning {} episodes...", config.episodes)?;
    writeln!(out, "{}", rule())?;

    // offset so random actions do not replay the adapter's seed draws
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));
    let report = evaluate(
        &mut env,
        policy.as_ref(),
        config.episodes,
        config.render,
        &mut rng,
        out,
    )?;
    env.close();

    writeln!(out, "{}", rule())?;
    writeln!(
        out,
        "Mean return: {:8.2} ± {:.2}",
        report.mean_return(),
        report.std_return()
    )?;
    writeln!(out, "Mean length: {:8.1}", report.mean_length())?;
    writeln!(out, "Max return:  {:8.2}", report.max_return())?;
    writeln!(out, "{}", rule())?;

    info!(
        episodes = report.episodes.len(),
        mean_return = report.mean_return(),
        "evaluation finished"
    );
    Ok(report)
}
