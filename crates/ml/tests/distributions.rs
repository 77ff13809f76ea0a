use candle_core::{Device, Tensor};
use ml::distributions::{gaussian_log_prob, tanh_log_det_jacobian};
use ml::{sample_squashed, squash};

const HALF_LOG_TWO_PI: f32 = 0.918_938_5;

fn scalar(v: f32) -> Tensor {
    Tensor::new(&[[v]], &Device::Cpu).unwrap()
}

fn first(t: &Tensor) -> f32 {
    t.flatten_all().unwrap().to_vec1::<f32>().unwrap()[0]
}

#[test]
fn standard_normal_density_at_mean() {
    let std = Tensor::new(&[1.0f32], &Device::Cpu).unwrap();
    let lp = gaussian_log_prob(&scalar(0.0), &scalar(0.0), &std).unwrap();
    assert!((first(&lp) + HALF_LOG_TWO_PI).abs() < 1e-5);
}

#[test]
fn wider_gaussian_has_lower_peak() {
    let std = Tensor::new(&[2.0f32], &Device::Cpu).unwrap();
    let lp = gaussian_log_prob(&scalar(1.0), &scalar(1.0), &std).unwrap();
    let expected = -HALF_LOG_TWO_PI - 2.0f32.ln();
    assert!((first(&lp) - expected).abs() < 1e-5);
}

#[test]
fn squash_at_zero_matches_plain_gaussian() {
    let std = Tensor::new(&[1.0f32], &Device::Cpu).unwrap();
    let sample = squash(scalar(0.0), &scalar(0.0), &std).unwrap();
    assert_eq!(first(&sample.action), 0.0);
    assert_eq!(sample.log_prob.dims(), &[1]);
    assert!((first(&sample.log_prob) + HALF_LOG_TWO_PI).abs() < 1e-5);
}

#[test]
fn saturated_action_keeps_log_prob_finite() {
    let jac = tanh_log_det_jacobian(&scalar(1.0)).unwrap();
    assert!((first(&jac) - 1e-6f32.ln()).abs() < 0.1);

    let std = Tensor::new(&[1.0f32], &Device::Cpu).unwrap();
    let sample = squash(scalar(20.0), &scalar(0.0), &std).unwrap();
    assert!(first(&sample.log_prob).is_finite());
}

#[test]
fn narrow_sample_stays_near_squashed_mean() {
    let std = Tensor::new(&[1e-3f32], &Device::Cpu).unwrap();
    let sample = sample_squashed(&scalar(0.5), &std).unwrap();
    assert!((first(&sample.action) - 0.5f32.tanh()).abs() < 1e-2);
    assert!((first(&sample.raw) - 0.5).abs() < 1e-2);
}
