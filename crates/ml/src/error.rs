use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error(transparent)]
    Candle(#[from] candle_core::Error),
    #[error("policy artifact is missing tensor `{0}`")]
    MissingTensor(String),
    #[error("tensor `{name}` has shape {actual:?}, expected {expected}")]
    Shape {
        name: String,
        actual: Vec<usize>,
        expected: String,
    },
    #[error("observation has {actual} values, policy expects {expected}")]
    ObservationDim { expected: usize, actual: usize },
}
