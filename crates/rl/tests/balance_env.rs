mod common;

use common::{reset_obs, step_obs, ScriptedBinding};
use rl::{Action, BalanceBeamEnv, Env, EnvConfig, EnvError, MAX_STEPS, OBS_SCALE};

fn env(binding: &ScriptedBinding, config: EnvConfig) -> BalanceBeamEnv<ScriptedBinding> {
    BalanceBeamEnv::with_binding(binding.clone(), config).unwrap()
}

fn scaled(raw: &[f32]) -> Vec<f32> {
    raw.iter().zip(OBS_SCALE).map(|(x, s)| x * s).collect()
}

#[test]
fn observation_length_is_fixed_at_construction() {
    let binding = ScriptedBinding::new(4, None);
    let mut env = env(&binding, EnvConfig::default());
    assert_eq!(env.obs_dim(), 4);
    assert_eq!(env.obs_size(), 4);
    for seed in [None, Some(3), None] {
        assert_eq!(env.reset(seed).unwrap().len(), 4);
    }
    assert_eq!(env.step(Action::Scalar(0.0)).unwrap().observation.len(), 4);
}

#[test]
fn mismatched_observation_length_is_rejected() {
    let binding = ScriptedBinding::new(3, None);
    match BalanceBeamEnv::with_binding(binding, EnvConfig::default()) {
        Err(EnvError::ObservationDim { expected, actual }) => {
            assert_eq!(expected, 4);
            assert_eq!(actual, 3);
        }
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("three observations should not match the scale vector"),
    }
}

#[test]
fn actions_are_clamped_before_forwarding() {
    let binding = ScriptedBinding::new(4, None);
    let mut env = env(&binding, EnvConfig::default());
    env.reset(None).unwrap();

    env.step(Action::from(5.0_f32)).unwrap();
    env.step(Action::from(vec![-3.0_f32])).unwrap();
    env.step(Action::from(&[0.25_f32, 9.0][..])).unwrap();
    env.step(Action::from(-0.5_f64)).unwrap();

    assert_eq!(binding.log.borrow().actions, vec![1.0, -1.0, 0.25, -0.5]);
}

#[test]
fn nan_action_becomes_zero() {
    let binding = ScriptedBinding::new(4, None);
    let mut env = env(&binding, EnvConfig::default());
    env.reset(None).unwrap();

    env.step(Action::Scalar(f32::NAN)).unwrap();
    env.step(Action::from(vec![f32::NAN, 1.0])).unwrap();

    assert_eq!(binding.log.borrow().actions, vec![0.0, 0.0]);
}

#[test]
fn empty_action_is_an_error() {
    let binding = ScriptedBinding::new(4, None);
    let mut env = env(&binding, EnvConfig::default());
    env.reset(None).unwrap();
    assert!(matches!(
        env.step(Action::Vector(Vec::new())),
        Err(EnvError::EmptyAction)
    ));
}

#[test]
fn truncates_at_step_cap() {
    let binding = ScriptedBinding::new(4, None);
    let mut env = env(&binding, EnvConfig::default());
    env.reset(None).unwrap();
    for _ in 1..MAX_STEPS {
        let step = env.step(Action::Scalar(0.0)).unwrap();
        assert!(!step.truncated);
        assert!(!step.done());
    }
    let step = env.step(Action::Scalar(0.0)).unwrap();
    assert!(step.truncated);
    assert!(!step.terminated);
    assert_eq!(env.steps(), MAX_STEPS);

    env.reset(None).unwrap();
    assert_eq!(env.steps(), 0);
}

#[test]
fn scaling_is_the_same_on_reset_and_step() {
    let binding = ScriptedBinding::new(4, None);
    let mut env = env(&binding, EnvConfig::default());
    assert_eq!(env.reset(None).unwrap(), scaled(&reset_obs(4)));
    let step = env.step(Action::Scalar(0.1)).unwrap();
    assert_eq!(step.observation, scaled(&step_obs(4)));
}

#[test]
fn fixed_init_keeps_one_simulator() {
    let binding = ScriptedBinding::new(4, None);
    let mut env = env(
        &binding,
        EnvConfig {
            seed: 9,
            ..EnvConfig::default()
        },
    );
    env.reset(None).unwrap();
    env.reset(None).unwrap();
    assert_eq!(binding.opened_seeds(), vec![9]);
    assert_eq!(env.current_seed(), 9);
}

#[test]
fn random_init_draws_a_new_seed_every_reset() {
    let binding = ScriptedBinding::new(4, None);
    let mut env = env(
        &binding,
        EnvConfig {
            seed: 42,
            random_init: true,
            ..EnvConfig::default()
        },
    );
    env.reset(None).unwrap();
    let first = env.current_seed();
    env.reset(None).unwrap();
    let second = env.current_seed();

    let seeds = binding.opened_seeds();
    assert_eq!(seeds, vec![42, first, second]);
    assert_ne!(first, second);
    assert!(seeds[1..].iter().all(|&s| s < i32::MAX as u32));
}

#[test]
fn explicit_seed_reproduces_the_draws() {
    let draws = |binding: &ScriptedBinding| {
        let mut env = env(
            binding,
            EnvConfig {
                random_init: true,
                ..EnvConfig::default()
            },
        );
        env.reset(Some(1234)).unwrap();
        env.reset(None).unwrap();
        env.reset(None).unwrap();
        assert_eq!(env.config().seed, 1234);
        binding.opened_seeds()[1..].to_vec()
    };
    let a = draws(&ScriptedBinding::new(4, None));
    let b = draws(&ScriptedBinding::new(4, None));
    assert_eq!(a.len(), 3);
    assert_eq!(a, b);
}

#[test]
fn headless_render_is_a_no_op() {
    let binding = ScriptedBinding::new(4, None);
    let mut env = env(&binding, EnvConfig::default());
    env.render().unwrap();
    env.end_episode().unwrap();
    assert_eq!(binding.log.borrow().renders, 0);
    assert_eq!(binding.log.borrow().episode_ends, 0);

    let binding = ScriptedBinding::new(4, None);
    let mut env = self::env(
        &binding,
        EnvConfig {
            headless: false,
            ..EnvConfig::default()
        },
    );
    env.render().unwrap();
    env.end_episode().unwrap();
    env.close();
    assert_eq!(binding.log.borrow().renders, 1);
    assert_eq!(binding.log.borrow().episode_ends, 1);
    assert!(!binding.log.borrow().opened[0].headless);
}

#[test]
fn action_space_is_unit_interval() {
    let binding = ScriptedBinding::new(4, None);
    let env = env(&binding, EnvConfig::default());
    assert_eq!(env.action_space().low(), &[-1.0]);
    assert_eq!(env.action_space().high(), &[1.0]);
}

#[test]
fn physics_backed_environment() {
    let mut env = BalanceBeamEnv::new(EnvConfig {
        scene_path: "tests/data/fulcrum.json".into(),
        random_init: true,
        ..EnvConfig::default()
    })
    .unwrap();
    for _ in 0..3 {
        let obs = env.reset(None).unwrap();
        assert_eq!(obs.len(), 4);
        assert!(obs[0].abs() <= 0.35, "angle {}", obs[0]);
        // within 20% of the 300 px half-length, plus the tilt projection of
        // the ball sitting 20 px above the beam centre
        assert!(obs[2].abs() <= 67.0 * 0.005, "offset {}", obs[2]);
    }
    let step = env.step(Action::Scalar(0.0)).unwrap();
    assert!(step.reward > 0.0);
}

#[test]
fn missing_scene_fails() {
    let err = BalanceBeamEnv::new(EnvConfig {
        scene_path: "tests/data/absent.json".into(),
        ..EnvConfig::default()
    })
    .err()
    .unwrap();
    assert!(matches!(err, EnvError::Simulator(_)));
}
