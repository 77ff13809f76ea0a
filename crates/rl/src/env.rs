//! The reset/step interface the evaluation loop drives.

use crate::error::EnvError;
use crate::spaces::BoxSpace;

/// An action as a policy hands it over: a bare scalar or a vector whose
/// first element is used.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Scalar(f32),
    Vector(Vec<f32>),
}

impl Action {
    /// # Errors
    ///
    /// [`EnvError::EmptyAction`] for an empty vector.
    pub fn to_scalar(&self) -> Result<f32, EnvError> {
        match self {
            Self::Scalar(a) => Ok(*a),
            Self::Vector(v) => v.first().copied().ok_or(EnvError::EmptyAction),
        }
    }
}

impl From<f32> for Action {
    fn from(value: f32) -> Self {
        Self::Scalar(value)
    }
}

impl From<f64> for Action {
    #[allow(clippy::cast_possible_truncation)]
    fn from(value: f64) -> Self {
        Self::Scalar(value as f32)
    }
}

impl From<Vec<f32>> for Action {
    fn from(value: Vec<f32>) -> Self {
        Self::Vector(value)
    }
}

impl From<&[f32]> for Action {
    fn from(value: &[f32]) -> Self {
        Self::Vector(value.to_vec())
    }
}

/// Result of one environment step.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub observation: Vec<f32>,
    pub reward: f32,
    pub terminated: bool,
    pub truncated: bool,
}

impl Step {
    #[must_use]
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

pub trait Env {
    /// Starts a new episode. A `Some` seed replaces the stored seed.
    fn reset(&mut self, seed: Option<u64>) -> Result<Vec<f32>, EnvError>;

    fn step(&mut self, action: Action) -> Result<Step, EnvError>;

    fn obs_size(&self) -> usize;

    fn action_space(&self) -> &BoxSpace;

    fn render(&mut self) -> Result<(), EnvError>;

    /// Marks the end of a rendered episode.
    fn end_episode(&mut self) -> Result<(), EnvError> {
        Ok(())
    }

    fn close(&mut self) {}
}
