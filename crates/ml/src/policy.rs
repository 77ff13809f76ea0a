use crate::error::PolicyError;

/// Recurrent state handed back by [`Policy::predict`]. Feed-forward policies
/// always return `None`.
pub type PolicyState = Vec<f32>;

/// Anything that maps an observation to an action.
pub trait Policy {
    fn observation_dim(&self) -> usize;

    fn action_dim(&self) -> usize;

    /// Returns the action for `observation`. With `deterministic` the policy
    /// returns its mode instead of sampling.
    fn predict(
        &self,
        observation: &[f32],
        deterministic: bool,
    ) -> Result<(Vec<f32>, Option<PolicyState>), PolicyError>;
}
