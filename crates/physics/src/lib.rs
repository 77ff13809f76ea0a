#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]
//! # Fulcrum Physics
//!
//! A small 2D simulator for the beam-and-ball balancing task, exposed through
//! the [`Environment`] binding that the evaluation and diagnostic tools use.
//!
//! ## Key Components
//!
//! -   **Scenes:** [`Scene`] parses the JSON scene files describing the world
//!     and its bodies.
//! -   **World:** [`World`] stores [`Body`] values and integrates them with a
//!     fixed timestep and a deterministic RNG.
//! -   **Simulator:** [`Simulator`] drives the beam through a first-order
//!     actuator and produces the 4-element observation.
//! -   **Environment:** [`Environment`] adds reward, termination, the episode
//!     step limit and optional rendering: a `winit`/`wgpu` window with the
//!     `render` feature, a one-line text frame without it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use physics::Environment;
//!
//! let mut env = Environment::new("scenes/fulcrum.json", 0, 1.0 / 240.0, true)?;
//! let obs = env.reset();
//! let result = env.step(0.5);
//! println!("{obs:?} -> {:?} (reward {})", result.obs, result.reward);
//! # Ok::<(), physics::PhysicsError>(())
//! ```

pub mod body;
pub mod env;
pub mod error;
pub mod render;
pub mod scene;
pub mod simulator;
#[cfg(feature = "render")]
pub mod window;
pub mod world;

pub use body::{Body, Shape};
pub use env::{Environment, StepResult, MAX_EPISODE_STEPS};
pub use error::PhysicsError;
pub use render::TextRenderer;
pub use scene::{BodyDef, Scene, ShapeDef, WorldDef};
pub use simulator::{
    Actuator, ActuatorParams, BallOnBeam, Simulator, BALL_BODY_INDEX, OBS_DIM,
};
pub use world::{Bounds, World, XorShift32, DEFAULT_GRAVITY, MAX_BODIES};
