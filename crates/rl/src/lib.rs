#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]
//! # Fulcrum RL
//!
//! Glue between the simulator binding and the policies:
//!
//! -   [`BalanceBeamEnv`] adapts a [`SimulatorBinding`] to the [`Env`]
//!     interface with the training-time observation scaling and step cap.
//! -   [`run_policy`] evaluates a saved [`ml::MlpPolicy`] (or a random
//!     policy) and prints per-episode and aggregate statistics.
//! -   [`smoke_test`] checks that the simulator, a tiny actor-critic and a
//!     gradient step all work together.

pub mod balance_env;
pub mod binding;
pub mod env;
pub mod error;
pub mod runner;
pub mod smoke;
pub mod spaces;

pub use balance_env::{BalanceBeamEnv, EnvConfig, DEFAULT_DT, DEFAULT_SCENE, MAX_STEPS, OBS_SCALE};
pub use binding::{PhysicsBinding, Simulator, SimulatorBinding, SimulatorSpec};
pub use env::{Action, Env, Step};
pub use error::{EnvError, RunError, SmokeError};
pub use runner::{evaluate, run_policy, run_policy_with, EpisodeStats, EvaluationReport, RunConfig};
pub use smoke::{group_thousands, smoke_test, SmokeConfig, SmokeReport};
pub use spaces::BoxSpace;
