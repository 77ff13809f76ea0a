//! Minimal actor-critic used for pipeline sanity checks. It is small on
//! purpose and is never trained to do anything useful.

use candle_core::{Module, Result, Tensor, D};
use candle_nn::{linear, Init, Linear, VarBuilder};

use crate::distributions::{sample_squashed, SquashedSample};

pub const HIDDEN: usize = 32;

/// Output of [`TinyActorCritic::forward`].
#[derive(Debug, Clone)]
pub struct Heads {
    pub mu: Tensor,
    pub std: Tensor,
    pub value: Tensor,
}

/// Output of [`TinyActorCritic::act`].
#[derive(Debug, Clone)]
pub struct ActorOutput {
    /// Squashed action in `(-1, 1)`, shape `[batch, act_dim]`.
    pub action: Tensor,
    /// Shape `[batch]`.
    pub log_prob: Tensor,
    /// Shape `[batch]`.
    pub value: Tensor,
}

/// Two tanh hidden layers shared by a Gaussian policy head (state-independent
/// `log_std`) and a scalar value head.
pub struct TinyActorCritic {
    fc1: Linear,
    fc2: Linear,
    mu: Linear,
    log_std: Tensor,
    value_head: Linear,
    obs_dim: usize,
    act_dim: usize,
}

impl TinyActorCritic {
    /// Builds the network, registering every parameter in `vb`. `log_std`
    /// starts at zero.
    pub fn new(vb: VarBuilder, obs_dim: usize, act_dim: usize) -> Result<Self> {
        let fc1 = linear(obs_dim, HIDDEN, vb.pp("backbone.0"))?;
        let fc2 = linear(HIDDEN, HIDDEN, vb.pp("backbone.2"))?;
        let mu = linear(HIDDEN, act_dim, vb.pp("mu"))?;
        let log_std = vb.get_with_hints(act_dim, "log_std", Init::Const(0.0))?;
        let value_head = linear(HIDDEN, 1, vb.pp("value_head"))?;
        Ok(Self {
            fc1,
            fc2,
            mu,
            log_std,
            value_head,
            obs_dim,
            act_dim,
        })
    }

    #[must_use]
    pub fn obs_dim(&self) -> usize {
        self.obs_dim
    }

    #[must_use]
    pub fn act_dim(&self) -> usize {
        self.act_dim
    }

    /// Number of trainable scalars.
    #[must_use]
    pub fn param_count(&self) -> usize {
        let linear_count = |l: &Linear| {
            l.weight().elem_count() + l.bias().map_or(0, Tensor::elem_count)
        };
        linear_count(&self.fc1)
            + linear_count(&self.fc2)
            + linear_count(&self.mu)
            + self.log_std.elem_count()
            + linear_count(&self.value_head)
    }

    /// `obs` has shape `[batch, obs_dim]`.
    pub fn forward(&self, obs: &Tensor) -> Result<Heads> {
        let x = self.fc1.forward(obs)?.tanh()?;
        let x = self.fc2.forward(&x)?.tanh()?;
        let mu = self.mu.forward(&x)?;
        let std = self.log_std.exp()?;
        let value = self.value_head.forward(&x)?.squeeze(D::Minus1)?;
        Ok(Heads { mu, std, value })
    }

    /// Samples a squashed action with its corrected log-probability and the
    /// value estimate.
    pub fn act(&self, obs: &Tensor) -> Result<ActorOutput> {
        let Heads { mu, std, value } = self.forward(obs)?;
        let SquashedSample {
            action, log_prob, ..
        } = sample_squashed(&mu, &std)?;
        Ok(ActorOutput {
            action,
            log_prob,
            value,
        })
    }
}
