//! # Environment binding
//!
//! [`Environment`] is the surface the learning tools program against:
//! construct it from a scene path, seed, timestep and headless flag, then
//! call [`reset`](Environment::reset) and [`step`](Environment::step).
//!
//! An episode terminates when the ball leaves the beam and is truncated
//! after [`MAX_EPISODE_STEPS`] steps. While the ball is on the beam the
//! reward is `1 - (x / half_length)²`, so staying centred earns the most; the
//! terminating step earns nothing.

use std::path::Path;

use crate::error::PhysicsError;
use crate::render::TextRenderer;
use crate::simulator::{Simulator, OBS_DIM};

pub const MAX_EPISODE_STEPS: u32 = 2400;

/// Outcome of a reset or a step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepResult {
    pub obs: Vec<f32>,
    pub reward: f32,
    /// The ball fell off the beam.
    pub terminated: bool,
    /// The episode hit the step limit.
    pub truncated: bool,
}

enum Sink {
    Text(TextRenderer),
    #[cfg(feature = "render")]
    Window,
}

pub struct Environment {
    sim: Simulator,
    renderer: Option<Sink>,
    steps: u32,
}

impl Environment {
    /// Creates an environment with a fresh simulator.
    ///
    /// # Errors
    ///
    /// Fails if the scene cannot be loaded.
    pub fn new(
        scene_path: impl AsRef<Path>,
        seed: u32,
        dt: f32,
        headless: bool,
    ) -> Result<Self, PhysicsError> {
        let sim = Simulator::new(scene_path, seed, dt)?;
        Ok(Self::from_simulator(sim, headless))
    }

    /// Wraps an already configured simulator. Unless headless, frames go to
    /// the shared window with the `render` feature and to stderr as text
    /// without it.
    #[must_use]
    pub fn from_simulator(sim: Simulator, headless: bool) -> Self {
        #[cfg(feature = "render")]
        let sink = Sink::Window;
        #[cfg(not(feature = "render"))]
        let sink = Sink::Text(TextRenderer::stderr());
        Self {
            sim,
            renderer: (!headless).then_some(sink),
            steps: 0,
        }
    }

    /// Renders through `renderer` regardless of the `render` feature.
    #[must_use]
    pub fn with_renderer(sim: Simulator, renderer: TextRenderer) -> Self {
        Self {
            sim,
            renderer: Some(Sink::Text(renderer)),
            steps: 0,
        }
    }

    #[must_use]
    pub fn obs_dim(&self) -> usize {
        OBS_DIM
    }

    #[must_use]
    pub fn simulator(&self) -> &Simulator {
        &self.sim
    }

    #[must_use]
    pub fn is_headless(&self) -> bool {
        self.renderer.is_none()
    }

    /// Resets to a randomised initial state and returns the observation.
    pub fn reset(&mut self) -> Vec<f32> {
        self.sim.reset();
        self.steps = 0;
        self.sim.observation().to_vec()
    }

    /// Applies `action` (clamped to `[-1, 1]`) for one timestep.
    pub fn step(&mut self, action: f32) -> StepResult {
        self.sim.step(action);
        self.steps += 1;

        let (reward, terminated) = match self.sim.ball_on_beam() {
            Some(ball) if ball.is_off_beam() => (0.0, true),
            Some(ball) => {
                let x = ball.offset / ball.half_length;
                (1.0 - x * x, false)
            }
            None => (0.0, false),
        };

        StepResult {
            obs: self.sim.observation().to_vec(),
            reward,
            terminated,
            truncated: self.steps >= MAX_EPISODE_STEPS,
        }
    }

    /// Draws the current state. No-op when headless, and once the window
    /// has been closed.
    ///
    /// # Errors
    ///
    /// Propagates output failures from the renderer.
    pub fn render(&mut self) -> Result<(), PhysicsError> {
        match self.renderer.as_mut() {
            Some(Sink::Text(renderer)) => renderer.draw(&self.sim),
            #[cfg(feature = "render")]
            Some(Sink::Window) => crate::window::draw(&self.sim).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Ends the current run of frames, moving text output to a fresh line.
    ///
    /// # Errors
    ///
    /// Propagates output failures from the renderer.
    pub fn end_render(&mut self) -> Result<(), PhysicsError> {
        match self.renderer.as_mut() {
            Some(Sink::Text(renderer)) => renderer.finish(),
            _ => Ok(()),
        }
    }
}
