//! Quick end-to-end check of the training stack.
//!
//! Nothing here learns anything. The run only proves that the simulator
//! loads, the network runs forward, its actions step the environment and a
//! gradient update goes through with finite values.

use std::io::Write;
use std::path::PathBuf;

use candle_core::{DType, Device, Tensor};
use candle_nn::{AdamW, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use ml::TinyActorCritic;
use physics::Environment;
use tracing::info;

use crate::balance_env::{DEFAULT_DT, DEFAULT_SCENE};
use crate::error::SmokeError;

const WIDTH: usize = 60;

#[derive(Clone, Debug, PartialEq)]
pub struct SmokeConfig {
    pub scene_path: PathBuf,
    pub seed: u32,
    pub dt: f32,
    pub rollout_steps: usize,
    pub learning_rate: f64,
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            scene_path: PathBuf::from(DEFAULT_SCENE),
            seed: 0,
            dt: DEFAULT_DT,
            rollout_steps: 10,
            learning_rate: 3e-4,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SmokeReport {
    pub obs_dim: usize,
    pub param_count: usize,
    pub device: String,
    pub rollout_return: f64,
}

/// Runs every stage in order, printing a status line after each.
///
/// # Errors
///
/// The first failing stage aborts the run.
pub fn smoke_test<W: Write + ?Sized>(
    config: &SmokeConfig,
    out: &mut W,
) -> Result<SmokeReport, SmokeError> {
    let rule = "=".repeat(WIDTH);
    writeln!(out, "\n{rule}")?;
    writeln!(out, "{:^WIDTH$}", "RL Pipeline Smoke Test")?;
    writeln!(out, "{rule}")?;

    writeln!(out, "\nCreating environment...")?;
    let mut env = Environment::new(&config.scene_path, config.seed, config.dt, true)?;
    let obs = env.reset();
    let obs_dim = obs.len();
    writeln!(out, "Environment OK (obs_dim={obs_dim})")?;

    let device = Device::cuda_if_available(0)?;
    let device_name = if device.is_cuda() { "cuda" } else { "cpu" };
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
    let policy = TinyActorCritic::new(vb, obs_dim, 1)?;
    let mut optimizer = AdamW::new(
        varmap.all_vars(),
        ParamsAdamW {
            lr: config.learning_rate,
            weight_decay: 0.0,
            ..ParamsAdamW::default()
        },
    )?;
    let param_count = policy.param_count();
    writeln!(
        out,
        "Policy initialized on {device_name} ({} params)",
        group_thousands(param_count)
    )?;

    let sample = policy.act(&batch(&obs, &device)?)?;
    writeln!(out, "Sample action: {}", signed(first(&sample.action)?))?;
    writeln!(out, "Log prob:      {}", signed(first(&sample.log_prob)?))?;
    writeln!(out, "Value estimate:{}", signed(first(&sample.value)?))?;

    let step = env.step(first(&sample.action)?.clamp(-1.0, 1.0));
    writeln!(out, "Step OK")?;
    writeln!(out, "  reward: {:.4}", step.reward)?;
    writeln!(out, "  done:   {}", step.terminated || step.truncated)?;

    writeln!(out, "\nRunning short rollout...")?;
    let mut total_reward = 0.0_f64;
    let mut obs = env.reset();
    for _ in 0..config.rollout_steps {
        let action = first(&policy.act(&batch(&obs, &device)?)?.action)?;
        let step = env.step(action.clamp(-1.0, 1.0));
        total_reward += f64::from(step.reward);
        obs = if step.terminated || step.truncated {
            env.reset()
        } else {
            step.obs
        };
    }
    writeln!(out, "Rollout completed (total_reward={total_reward:.4})")?;

    writeln!(out, "\nChecking gradients...")?;
    let output = policy.act(&batch(&obs, &device)?)?;
    let loss = output.value.mean_all()?.neg()?;
    let grads = loss.backward()?;
    for var in varmap.all_vars() {
        if let Some(grad) = grads.get(var.as_tensor()) {
            let finite = grad
                .flatten_all()?
                .to_vec1::<f32>()?
                .iter()
                .all(|g| g.is_finite());
            if !finite {
                return Err(SmokeError::NonFiniteGradient {
                    shape: var.dims().to_vec(),
                });
            }
        }
    }
    optimizer.step(&grads)?;
    writeln!(out, "Gradient update OK")?;

    writeln!(out, "\n{rule}")?;
    writeln!(out, "{:^WIDTH$}", "Smoke test passed")?;
    writeln!(out, "{rule}\n")?;

    info!(obs_dim, param_count, device = device_name, "smoke test passed");
    Ok(SmokeReport {
        obs_dim,
        param_count,
        device: device_name.to_string(),
        rollout_return: total_reward,
    })
}

fn batch(obs: &[f32], device: &Device) -> candle_core::Result<Tensor> {
    Tensor::from_slice(obs, (1, obs.len()), device)
}

/// First element of a tensor of any shape, detached from the graph.
fn first(t: &Tensor) -> candle_core::Result<f32> {
    t.detach().flatten_all()?.get(0)?.to_scalar::<f32>()
}

/// Four decimals with a space where a minus sign would go.
fn signed(v: f32) -> String {
    if v.is_sign_negative() {
        format!("{v:.4}")
    } else {
        format!(" {v:.4}")
    }
}

/// `1283` -> `"1,283"`.
#[must_use]
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
