use std::io;

use ml::PolicyError;
use physics::PhysicsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error(transparent)]
    Simulator(#[from] PhysicsError),
    #[error("simulator produces {actual} observation values but the scale vector has {expected}")]
    ObservationDim { expected: usize, actual: usize },
    #[error("action has no elements")]
    EmptyAction,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("environment error")]
    Env(#[from] EnvError),
    #[error("policy error")]
    Policy(#[from] PolicyError),
    #[error("at least one episode is required")]
    NoEpisodes,
    #[error("failed to write report")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum SmokeError {
    #[error("failed to create environment")]
    Env(#[from] PhysicsError),
    #[error(transparent)]
    Candle(#[from] candle_core::Error),
    #[error("gradient of parameter with shape {shape:?} is not finite")]
    NonFiniteGradient { shape: Vec<usize> },
    #[error("failed to write report")]
    Io(#[from] io::Error),
}
