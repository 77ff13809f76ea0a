//! Diagonal Gaussian helpers, including the tanh-squashed variant used by
//! bounded continuous actions.

use candle_core::{Result, Tensor, D};

/// Added inside the log of the tanh Jacobian so a saturated action never
/// produces `ln(0)`.
pub const TANH_EPSILON: f64 = 1e-6;

/// Per-dimension log density of `x` under `N(mu, std²)`. `std` broadcasts
/// against `mu`.
pub fn gaussian_log_prob(x: &Tensor, mu: &Tensor, std: &Tensor) -> Result<Tensor> {
    let log_norm = 0.5 * (2.0 * std::f64::consts::PI).ln();
    let var2 = std.sqr()?.affine(2.0, 0.0)?;
    let quad = x.broadcast_sub(mu)?.sqr()?.broadcast_div(&var2)?;
    let log_std = std.log()?.affine(1.0, log_norm)?;
    quad.neg()?.broadcast_sub(&log_std)
}

/// `ln(1 - tanh(u)²)` written in terms of the squashed action, with
/// [`TANH_EPSILON`] for stability.
pub fn tanh_log_det_jacobian(action: &Tensor) -> Result<Tensor> {
    action.sqr()?.affine(-1.0, 1.0 + TANH_EPSILON)?.log()
}

/// A reparameterised sample from a tanh-squashed diagonal Gaussian.
#[derive(Debug, Clone)]
pub struct SquashedSample {
    /// Pre-squash sample `mu + std * eps`.
    pub raw: Tensor,
    /// `tanh(raw)`, in `(-1, 1)`.
    pub action: Tensor,
    /// Log-probability of `action`, summed over the last axis.
    pub log_prob: Tensor,
}

/// Draws `raw = mu + std * eps` with `eps ~ N(0, 1)`, squashes it with tanh
/// and corrects the log-probability for the change of variables.
pub fn sample_squashed(mu: &Tensor, std: &Tensor) -> Result<SquashedSample> {
    let eps = mu.randn_like(0.0, 1.0)?;
    let raw = mu.broadcast_add(&eps.broadcast_mul(std)?)?;
    squash(raw, mu, std)
}

/// Squashes a given pre-tanh sample. Split out so the correction can be
/// checked against a known input.
pub fn squash(raw: Tensor, mu: &Tensor, std: &Tensor) -> Result<SquashedSample> {
    let action = raw.tanh()?;
    let log_prob = (gaussian_log_prob(&raw, mu, std)? - tanh_log_det_jacobian(&action)?)?
        .sum(D::Minus1)?;
    Ok(SquashedSample {
        raw,
        action,
        log_prob,
    })
}
