//! # Beam-and-ball environment adapter
//!
//! [`BalanceBeamEnv`] puts a simulator binding behind the [`Env`] interface
//! the policies were trained against. It has to match the training setup
//! exactly: observations are scaled element-wise by [`OBS_SCALE`], actions
//! are clamped to `[-1, 1]`, and episodes are cut at [`MAX_STEPS`] even
//! though the simulator itself allows longer ones.
//!
//! With [`EnvConfig::random_init`] every reset opens a fresh simulator with a
//! seed drawn from the adapter's own RNG, so consecutive episodes start from
//! different states while a fixed adapter seed keeps the whole sequence
//! reproducible.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::binding::{PhysicsBinding, Simulator, SimulatorBinding, SimulatorSpec};
use crate::env::{Action, Env, Step};
use crate::error::EnvError;
use crate::spaces::BoxSpace;

/// Training-time observation normalisation: angle, angular velocity, ball
/// offset (px), ball velocity (px/s).
pub const OBS_SCALE: [f32; 4] = [1.0, 0.5, 0.005, 0.01];
pub const MAX_STEPS: u32 = 2000;
pub const DEFAULT_DT: f32 = 1.0 / 240.0;
pub const DEFAULT_SCENE: &str = "scenes/fulcrum.json";

/// Simulator seeds are drawn from `[0, SEED_BOUND)`.
const SEED_BOUND: u32 = i32::MAX as u32;

#[derive(Clone, Debug, PartialEq)]
pub struct EnvConfig {
    pub scene_path: PathBuf,
    pub seed: u64,
    pub dt: f32,
    pub headless: bool,
    pub random_init: bool,
    pub max_steps: u32,
    pub obs_scale: Vec<f32>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            scene_path: PathBuf::from(DEFAULT_SCENE),
            seed: 0,
            dt: DEFAULT_DT,
            headless: true,
            random_init: false,
            max_steps: MAX_STEPS,
            obs_scale: OBS_SCALE.to_vec(),
        }
    }
}

pub struct BalanceBeamEnv<B: SimulatorBinding = PhysicsBinding> {
    binding: B,
    config: EnvConfig,
    sim: B::Instance,
    sim_seed: u32,
    rng: StdRng,
    steps: u32,
    obs_dim: usize,
    action_space: BoxSpace,
}

impl BalanceBeamEnv<PhysicsBinding> {
    /// Adapter over the bundled physics simulator.
    ///
    /// # Errors
    ///
    /// See [`BalanceBeamEnv::with_binding`].
    pub fn new(config: EnvConfig) -> Result<Self, EnvError> {
        Self::with_binding(PhysicsBinding, config)
    }
}

impl<B: SimulatorBinding> BalanceBeamEnv<B> {
    /// Opens a simulator and resets it once to learn the observation size.
    ///
    /// # Errors
    ///
    /// Fails if the binding cannot open the scene or the observation size
    /// does not match `config.obs_scale`.
    pub fn with_binding(binding: B, config: EnvConfig) -> Result<Self, EnvError> {
        let sim_seed = simulator_seed(config.seed);
        let mut sim = binding.open(&spec(&config, sim_seed))?;
        let obs_dim = sim.reset().len();
        if obs_dim != config.obs_scale.len() {
            return Err(EnvError::ObservationDim {
                expected: config.obs_scale.len(),
                actual: obs_dim,
            });
        }
        info!(
            scene = %config.scene_path.display(),
            seed = config.seed,
            obs_dim,
            headless = config.headless,
            random_init = config.random_init,
            "environment ready"
        );
        Ok(Self {
            binding,
            rng: StdRng::seed_from_u64(config.seed),
            config,
            sim,
            sim_seed,
            steps: 0,
            obs_dim,
            action_space: BoxSpace::uniform(-1.0, 1.0, 1),
        })
    }

    #[must_use]
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    #[must_use]
    pub fn obs_dim(&self) -> usize {
        self.obs_dim
    }

    /// Steps taken in the current episode.
    #[must_use]
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Seed of the simulator instance in use.
    #[must_use]
    pub fn current_seed(&self) -> u32 {
        self.sim_seed
    }

    fn scale(&self, raw: &[f32]) -> Vec<f32> {
        raw.iter()
            .zip(&self.config.obs_scale)
            .map(|(x, s)| x * s)
            .collect()
    }
}

impl<B: SimulatorBinding> Env for BalanceBeamEnv<B> {
    fn reset(&mut self, seed: Option<u64>) -> Result<Vec<f32>, EnvError> {
        if let Some(seed) = seed {
            self.config.seed = seed;
            self.rng = StdRng::seed_from_u64(seed);
        }
        self.steps = 0;

        if self.config.random_init {
            self.sim_seed = self.rng.gen_range(0..SEED_BOUND);
            debug!(seed = self.sim_seed, "reopening simulator");
            self.sim = self.binding.open(&spec(&self.config, self.sim_seed))?;
        }

        let obs = self.sim.reset();
        Ok(self.scale(&obs))
    }

    fn step(&mut self, action: Action) -> Result<Step, EnvError> {
        let raw = action.to_scalar()?;
        // clamp keeps NaN, which the simulator would integrate into every body
        let raw = if raw.is_nan() { 0.0 } else { raw };
        let action = self
            .action_space
            .clip(&[raw])
            .first()
            .copied()
            .unwrap_or(0.0);
        let mut step = self.sim.step(action);
        self.steps += 1;
        if self.steps >= self.config.max_steps {
            step.truncated = true;
        }
        step.observation = self.scale(&step.observation);
        Ok(step)
    }

    fn obs_size(&self) -> usize {
        self.obs_dim
    }

    fn action_space(&self) -> &BoxSpace {
        &self.action_space
    }

    fn render(&mut self) -> Result<(), EnvError> {
        if self.config.headless {
            return Ok(());
        }
        self.sim.render()
    }

    fn end_episode(&mut self) -> Result<(), EnvError> {
        if self.config.headless {
            return Ok(());
        }
        self.sim.end_render()
    }
}

fn spec(config: &EnvConfig, seed: u32) -> SimulatorSpec {
    SimulatorSpec {
        scene_path: config.scene_path.clone(),
        seed,
        dt: config.dt,
        headless: config.headless,
    }
}

/// Simulator seeds are 32-bit; higher bits of the adapter seed are dropped.
#[allow(clippy::cast_possible_truncation)]
fn simulator_seed(seed: u64) -> u32 {
    seed as u32
}
