#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use rl::{EnvError, Simulator, SimulatorBinding, SimulatorSpec, Step};

/// What the scripted simulators saw, shared with the test body.
#[derive(Default)]
pub struct Log {
    pub opened: Vec<SimulatorSpec>,
    pub actions: Vec<f32>,
    pub renders: usize,
    pub episode_ends: usize,
}

/// Binding that opens [`ScriptedSim`]s and records every call.
#[derive(Clone)]
pub struct ScriptedBinding {
    pub log: Rc<RefCell<Log>>,
    pub obs_dim: usize,
    /// Terminate after this many steps; `None` never terminates.
    pub episode_len: Option<u32>,
}

impl ScriptedBinding {
    pub fn new(obs_dim: usize, episode_len: Option<u32>) -> Self {
        Self {
            log: Rc::new(RefCell::new(Log::default())),
            obs_dim,
            episode_len,
        }
    }

    pub fn opened_seeds(&self) -> Vec<u32> {
        self.log.borrow().opened.iter().map(|s| s.seed).collect()
    }
}

pub struct ScriptedSim {
    log: Rc<RefCell<Log>>,
    obs_dim: usize,
    episode_len: Option<u32>,
    steps: u32,
}

/// Reset observation is `1, 2, 3, ..`; step observations are ten times that.
pub fn reset_obs(dim: usize) -> Vec<f32> {
    (1..=dim).map(|i| i as f32).collect()
}

pub fn step_obs(dim: usize) -> Vec<f32> {
    (1..=dim).map(|i| 10.0 * i as f32).collect()
}

impl Simulator for ScriptedSim {
    fn reset(&mut self) -> Vec<f32> {
        self.steps = 0;
        reset_obs(self.obs_dim)
    }

    fn step(&mut self, action: f32) -> Step {
        self.log.borrow_mut().actions.push(action);
        self.steps += 1;
        Step {
            observation: step_obs(self.obs_dim),
            reward: 1.0,
            terminated: self.episode_len.is_some_and(|n| self.steps >= n),
            truncated: false,
        }
    }

    fn render(&mut self) -> Result<(), EnvError> {
        self.log.borrow_mut().renders += 1;
        Ok(())
    }

    fn end_render(&mut self) -> Result<(), EnvError> {
        self.log.borrow_mut().episode_ends += 1;
        Ok(())
    }
}

impl SimulatorBinding for ScriptedBinding {
    type Instance = ScriptedSim;

    fn open(&self, spec: &SimulatorSpec) -> Result<ScriptedSim, EnvError> {
        self.log.borrow_mut().opened.push(spec.clone());
        Ok(ScriptedSim {
            log: Rc::clone(&self.log),
            obs_dim: self.obs_dim,
            episode_len: self.episode_len,
            steps: 0,
        })
    }
}
