#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]
//! Policies for the balancing task, built on `candle`.
//!
//! - [`Policy`] is the seam between an evaluation loop and whatever picks the
//!   actions.
//! - [`MlpPolicy`] loads a trained feed-forward Gaussian policy from a
//!   safetensors artifact.
//! - [`TinyActorCritic`] is the throwaway network the smoke test pushes a
//!   gradient through.

pub mod actor_critic;
pub mod distributions;
pub mod error;
pub mod mlp;
pub mod policy;

pub use actor_critic::{ActorOutput, Heads, TinyActorCritic};
pub use distributions::{sample_squashed, squash, SquashedSample, TANH_EPSILON};
pub use error::PolicyError;
pub use mlp::MlpPolicy;
pub use policy::{Policy, PolicyState};
