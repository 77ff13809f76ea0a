//! The seam between the adapter and a concrete simulator.
//!
//! A [`SimulatorBinding`] opens [`Simulator`] instances from a
//! [`SimulatorSpec`]. [`PhysicsBinding`] is the real one, backed by
//! [`physics::Environment`]; tests substitute their own.

use std::path::PathBuf;

use crate::env::Step;
use crate::error::EnvError;

/// Everything needed to open a simulator instance.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulatorSpec {
    pub scene_path: PathBuf,
    pub seed: u32,
    pub dt: f32,
    pub headless: bool,
}

pub trait Simulator {
    fn reset(&mut self) -> Vec<f32>;

    fn step(&mut self, action: f32) -> Step;

    fn render(&mut self) -> Result<(), EnvError>;

    /// Called after the last frame of an episode.
    fn end_render(&mut self) -> Result<(), EnvError> {
        Ok(())
    }
}

pub trait SimulatorBinding {
    type Instance: Simulator;

    fn open(&self, spec: &SimulatorSpec) -> Result<Self::Instance, EnvError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PhysicsBinding;

impl SimulatorBinding for PhysicsBinding {
    type Instance = physics::Environment;

    fn open(&self, spec: &SimulatorSpec) -> Result<Self::Instance, EnvError> {
        Ok(physics::Environment::new(
            &spec.scene_path,
            spec.seed,
            spec.dt,
            spec.headless,
        )?)
    }
}

impl Simulator for physics::Environment {
    fn reset(&mut self) -> Vec<f32> {
        physics::Environment::reset(self)
    }

    fn step(&mut self, action: f32) -> Step {
        let result = physics::Environment::step(self, action);
        Step {
            observation: result.obs,
            reward: result.reward,
            terminated: result.terminated,
            truncated: result.truncated,
        }
    }

    fn render(&mut self) -> Result<(), EnvError> {
        Ok(physics::Environment::render(self)?)
    }

    fn end_render(&mut self) -> Result<(), EnvError> {
        Ok(physics::Environment::end_render(self)?)
    }
}
