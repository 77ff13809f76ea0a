//! Feed-forward Gaussian policy loaded from a safetensors artifact.
//!
//! Tensor names follow the layout PPO's `MlpPolicy` uses when its state dict
//! is exported:
//!
//! ```text
//! mlp_extractor.policy_net.{0,2,..}.{weight,bias}   tanh hidden layers
//! action_net.{weight,bias}                          Gaussian mean
//! log_std                                           [act_dim]
//! mlp_extractor.value_net.{0,2,..}.{weight,bias}    optional critic
//! value_net.{weight,bias}                           optional critic head
//! ```
//!
//! Hidden layer sizes are read off the weight shapes, so any depth or width
//! loads as long as consecutive layers chain.

use std::collections::HashMap;
use std::path::Path;

use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{linear, Init, Linear, VarBuilder, VarMap};
use tracing::{debug, info};

use crate::error::PolicyError;
use crate::policy::{Policy, PolicyState};

const POLICY_NET: &str = "mlp_extractor.policy_net";
const VALUE_NET: &str = "mlp_extractor.value_net";
const ACTION_NET: &str = "action_net";
const VALUE_HEAD: &str = "value_net";
const LOG_STD: &str = "log_std";

struct Critic {
    hidden: Vec<Linear>,
    head: Linear,
}

pub struct MlpPolicy {
    policy_net: Vec<Linear>,
    action_net: Linear,
    log_std: Tensor,
    critic: Option<Critic>,
    obs_dim: usize,
    act_dim: usize,
    device: Device,
}

impl MlpPolicy {
    /// Loads an artifact from disk onto the CPU.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let device = Device::Cpu;
        let tensors = candle_core::safetensors::load(path, &device)?;
        debug!(path = %path.display(), tensors = tensors.len(), "read policy artifact");
        let policy = Self::from_tensors(tensors, &device)?;
        info!(
            obs_dim = policy.obs_dim,
            act_dim = policy.act_dim,
            hidden = ?policy.hidden_sizes(),
            "loaded MLP policy"
        );
        Ok(policy)
    }

    /// Builds a policy from named tensors, validating that the layers chain.
    pub fn from_tensors(
        mut tensors: HashMap<String, Tensor>,
        device: &Device,
    ) -> Result<Self, PolicyError> {
        let action_name = format!("{ACTION_NET}.weight");
        let (act_dim, action_in) = matrix_dims(require(&tensors, &action_name)?, &action_name)?;

        let policy_net = take_hidden(&mut tensors, POLICY_NET)?;
        let obs_dim = policy_net
            .first()
            .map_or(action_in, |layer| layer.weight().dims()[1]);
        let features = chain(&policy_net, obs_dim, POLICY_NET)?;
        let action_net = take_linear(&mut tensors, ACTION_NET, features)?
            .ok_or(PolicyError::MissingTensor(action_name))?;

        let log_std = tensors
            .remove(LOG_STD)
            .ok_or_else(|| PolicyError::MissingTensor(LOG_STD.to_string()))?
            .to_dtype(DType::F32)?;
        if log_std.dims() != [act_dim] {
            return Err(PolicyError::Shape {
                name: LOG_STD.to_string(),
                actual: log_std.dims().to_vec(),
                expected: format!("[{act_dim}]"),
            });
        }

        let value_hidden = take_hidden(&mut tensors, VALUE_NET)?;
        let value_features = chain(&value_hidden, obs_dim, VALUE_NET)?;
        let critic = take_linear(&mut tensors, VALUE_HEAD, value_features)?.map(|head| Critic {
            hidden: value_hidden,
            head,
        });

        Ok(Self {
            policy_net,
            action_net,
            log_std,
            critic,
            obs_dim,
            act_dim,
            device: device.clone(),
        })
    }

    /// Fresh randomly initialised policy with a critic, registered in `vb`
    /// under the artifact names so it can be saved and reloaded.
    pub fn init(
        vb: VarBuilder,
        obs_dim: usize,
        hidden: &[usize],
        act_dim: usize,
    ) -> Result<Self, PolicyError> {
        let build = |prefix: &str| -> candle_core::Result<(Vec<Linear>, usize)> {
            let mut layers = Vec::with_capacity(hidden.len());
            let mut in_dim = obs_dim;
            for (i, &out_dim) in hidden.iter().enumerate() {
                layers.push(linear(in_dim, out_dim, vb.pp(format!("{prefix}.{}", 2 * i)))?);
                in_dim = out_dim;
            }
            Ok((layers, in_dim))
        };
        let (policy_net, features) = build(POLICY_NET)?;
        let action_net = linear(features, act_dim, vb.pp(ACTION_NET))?;
        let log_std = vb.get_with_hints(act_dim, LOG_STD, Init::Const(0.0))?;
        let (value_hidden, value_features) = build(VALUE_NET)?;
        let head = linear(value_features, 1, vb.pp(VALUE_HEAD))?;
        Ok(Self {
            policy_net,
            action_net,
            log_std,
            critic: Some(Critic {
                hidden: value_hidden,
                head,
            }),
            obs_dim,
            act_dim,
            device: vb.device().clone(),
        })
    }

    /// Shorthand for [`MlpPolicy::init`] on a private CPU var map.
    pub fn random(obs_dim: usize, hidden: &[usize], act_dim: usize) -> Result<Self, PolicyError> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        Self::init(vb, obs_dim, hidden, act_dim)
    }

    /// Writes the policy in the layout [`MlpPolicy::load`] reads.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PolicyError> {
        let mut tensors = HashMap::new();
        put_hidden(&mut tensors, POLICY_NET, &self.policy_net);
        put_linear(&mut tensors, ACTION_NET, &self.action_net);
        tensors.insert(LOG_STD.to_string(), self.log_std.clone());
        if let Some(critic) = &self.critic {
            put_hidden(&mut tensors, VALUE_NET, &critic.hidden);
            put_linear(&mut tensors, VALUE_HEAD, &critic.head);
        }
        candle_core::safetensors::save(&tensors, path.as_ref())?;
        Ok(())
    }

    #[must_use]
    pub fn hidden_sizes(&self) -> Vec<usize> {
        self.policy_net.iter().map(|l| l.weight().dims()[0]).collect()
    }

    #[must_use]
    pub fn has_value_head(&self) -> bool {
        self.critic.is_some()
    }

    /// Gaussian mean for a batch of one.
    pub fn mean(&self, observation: &[f32]) -> Result<Tensor, PolicyError> {
        let obs = self.observation_tensor(observation)?;
        let features = forward_tanh(&self.policy_net, obs)?;
        Ok(self.action_net.forward(&features)?)
    }

    /// Critic estimate for `observation`.
    pub fn predict_value(&self, observation: &[f32]) -> Result<f32, PolicyError> {
        let critic = self
            .critic
            .as_ref()
            .ok_or_else(|| PolicyError::MissingTensor(format!("{VALUE_HEAD}.weight")))?;
        let obs = self.observation_tensor(observation)?;
        let features = forward_tanh(&critic.hidden, obs)?;
        let value = critic.head.forward(&features)?.reshape(())?;
        Ok(value.to_scalar::<f32>()?)
    }

    fn observation_tensor(&self, observation: &[f32]) -> Result<Tensor, PolicyError> {
        if observation.len() != self.obs_dim {
            return Err(PolicyError::ObservationDim {
                expected: self.obs_dim,
                actual: observation.len(),
            });
        }
        Ok(Tensor::from_slice(observation, (1, self.obs_dim), &self.device)?)
    }
}

impl Policy for MlpPolicy {
    fn observation_dim(&self) -> usize {
        self.obs_dim
    }

    fn action_dim(&self) -> usize {
        self.act_dim
    }

    fn predict(
        &self,
        observation: &[f32],
        deterministic: bool,
    ) -> Result<(Vec<f32>, Option<PolicyState>), PolicyError> {
        let mean = self.mean(observation)?;
        let action = if deterministic {
            mean
        } else {
            let noise = mean.randn_like(0.0, 1.0)?;
            mean.broadcast_add(&noise.broadcast_mul(&self.log_std.exp()?)?)?
        };
        let action = action.clamp(-1f32, 1f32)?.squeeze(0)?.to_vec1::<f32>()?;
        Ok((action, None))
    }
}

fn forward_tanh(layers: &[Linear], input: Tensor) -> candle_core::Result<Tensor> {
    layers
        .iter()
        .try_fold(input, |x, layer| layer.forward(&x)?.tanh())
}

fn require<'a>(tensors: &'a HashMap<String, Tensor>, name: &str) -> Result<&'a Tensor, PolicyError> {
    tensors
        .get(name)
        .ok_or_else(|| PolicyError::MissingTensor(name.to_string()))
}

fn matrix_dims(tensor: &Tensor, name: &str) -> Result<(usize, usize), PolicyError> {
    match *tensor.dims() {
        [rows, cols] => Ok((rows, cols)),
        _ => Err(PolicyError::Shape {
            name: name.to_string(),
            actual: tensor.dims().to_vec(),
            expected: "[out, in]".to_string(),
        }),
    }
}

/// Removes `{prefix}.weight` / `{prefix}.bias` and checks the weight accepts
/// `in_dim` features. `None` when the weight is absent.
fn take_linear(
    tensors: &mut HashMap<String, Tensor>,
    prefix: &str,
    in_dim: usize,
) -> Result<Option<Linear>, PolicyError> {
    let weight_name = format!("{prefix}.weight");
    let bias_name = format!("{prefix}.bias");
    let Some(weight) = tensors.remove(&weight_name) else {
        return Ok(None);
    };
    let bias = tensors
        .remove(&bias_name)
        .ok_or_else(|| PolicyError::MissingTensor(bias_name.clone()))?;
    let (out_dim, actual_in) = matrix_dims(&weight, &weight_name)?;
    if actual_in != in_dim {
        return Err(PolicyError::Shape {
            name: weight_name,
            actual: weight.dims().to_vec(),
            expected: format!("[{out_dim}, {in_dim}]"),
        });
    }
    if bias.dims() != [out_dim] {
        return Err(PolicyError::Shape {
            name: bias_name,
            actual: bias.dims().to_vec(),
            expected: format!("[{out_dim}]"),
        });
    }
    Ok(Some(Linear::new(
        weight.to_dtype(DType::F32)?,
        Some(bias.to_dtype(DType::F32)?),
    )))
}

/// Pulls `{prefix}.0`, `{prefix}.2`, ... until the next index is missing.
/// Odd indices are the activations and carry no tensors.
fn take_hidden(
    tensors: &mut HashMap<String, Tensor>,
    prefix: &str,
) -> Result<Vec<Linear>, PolicyError> {
    let mut layers = Vec::new();
    let mut index = 0;
    loop {
        let name = format!("{prefix}.{index}");
        let in_dim = match tensors.get(&format!("{name}.weight")) {
            Some(w) => matrix_dims(w, &format!("{name}.weight"))?.1,
            None => break,
        };
        match take_linear(tensors, &name, in_dim)? {
            Some(layer) => layers.push(layer),
            None => break,
        }
        index += 2;
    }
    Ok(layers)
}

/// Checks consecutive layers line up and returns the final feature width.
fn chain(layers: &[Linear], obs_dim: usize, prefix: &str) -> Result<usize, PolicyError> {
    let mut width = obs_dim;
    for (i, layer) in layers.iter().enumerate() {
        let dims = layer.weight().dims();
        if dims[1] != width {
            return Err(PolicyError::Shape {
                name: format!("{prefix}.{}.weight", 2 * i),
                actual: dims.to_vec(),
                expected: format!("[_, {width}]"),
            });
        }
        width = dims[0];
    }
    Ok(width)
}

fn put_linear(tensors: &mut HashMap<String, Tensor>, prefix: &str, layer: &Linear) {
    tensors.insert(format!("{prefix}.weight"), layer.weight().clone());
    if let Some(bias) = layer.bias() {
        tensors.insert(format!("{prefix}.bias"), bias.clone());
    }
}

fn put_hidden(tensors: &mut HashMap<String, Tensor>, prefix: &str, layers: &[Linear]) {
    for (i, layer) in layers.iter().enumerate() {
        put_linear(tensors, &format!("{prefix}.{}", 2 * i), layer);
    }
}
