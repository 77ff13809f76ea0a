//! # Beam simulator
//!
//! Wraps a [`World`] built from a scene file and drives its actuator body
//! (the beam) through a first-order motor model. The simulator is the single
//! authority on observation semantics:
//!
//! | index | meaning                                                    | unit  |
//! |-------|------------------------------------------------------------|-------|
//! | 0     | beam angle θ                                               | rad   |
//! | 1     | beam angular velocity                                      | rad/s |
//! | 2     | ball position along the beam, relative to the beam centre | px    |
//! | 3     | ball velocity projected onto the beam axis                 | px/s  |
//!
//! By convention the ball is body index [`BALL_BODY_INDEX`]. Body 0, when it
//! is a rectangle other than the beam, is treated as the fulcrum base the
//! beam rests on.

use std::path::Path;

use glam::Vec2;

use crate::body::Shape;
use crate::error::PhysicsError;
use crate::scene::Scene;
use crate::world::World;

pub const OBS_DIM: usize = 4;
pub const BALL_BODY_INDEX: usize = 1;

/// Motor and reset-randomisation constants.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ActuatorParams {
    /// Beam angular velocity commanded by a full-scale action (rad/s).
    pub max_speed: f32,
    /// Time constant of the first-order lag (s). Larger is slower.
    pub tau: f32,
    /// Saturation limit on the beam angle (rad).
    pub angle_limit: f32,
    /// Initial beam angle is drawn from `±init_angle_range` (rad).
    pub init_angle_range: f32,
    /// Initial ball offset is drawn from `±init_ball_ratio` of the beam half-length.
    pub init_ball_ratio: f32,
}

impl Default for ActuatorParams {
    fn default() -> Self {
        Self {
            max_speed: 2.0,
            tau: 0.1,
            angle_limit: 0.5,
            init_angle_range: 0.349,
            init_ball_ratio: 0.2,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Actuator {
    pub angle: f32,
    pub angular_velocity: f32,
}

/// Position of the ball relative to the beam.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BallOnBeam {
    /// Signed distance from the beam centre along the beam axis (px).
    pub offset: f32,
    /// Velocity along the beam axis (px/s).
    pub velocity: f32,
    pub half_length: f32,
}

impl BallOnBeam {
    #[must_use]
    pub fn is_off_beam(&self) -> bool {
        self.offset.abs() > self.half_length
    }
}

#[derive(Clone, Debug)]
pub struct Simulator {
    scene: Scene,
    seed: u32,
    dt: f32,
    world: World,
    actuator: Actuator,
    params: ActuatorParams,
}

impl Simulator {
    /// Loads the scene and prepares a simulator. Call [`Simulator::reset`]
    /// before stepping to apply the seeded initial randomisation.
    ///
    /// # Errors
    ///
    /// Fails if the scene file cannot be read or parsed.
    pub fn new(scene_path: impl AsRef<Path>, seed: u32, dt: f32) -> Result<Self, PhysicsError> {
        Self::with_params(scene_path, seed, dt, ActuatorParams::default())
    }

    /// Like [`Simulator::new`] with explicit actuator constants.
    ///
    /// # Errors
    ///
    /// Fails if the scene file cannot be read or parsed.
    pub fn with_params(
        scene_path: impl AsRef<Path>,
        seed: u32,
        dt: f32,
        params: ActuatorParams,
    ) -> Result<Self, PhysicsError> {
        let scene = Scene::load(scene_path.as_ref())?;
        let mut world = scene.build_world(dt);
        world.seed(seed);
        Ok(Self {
            scene,
            seed,
            dt,
            world,
            actuator: Actuator::default(),
            params,
        })
    }

    #[must_use]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Changes the seed used by subsequent resets.
    pub fn set_seed(&mut self, seed: u32) {
        self.seed = seed;
    }

    #[must_use]
    pub fn dt(&self) -> f32 {
        self.dt
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[must_use]
    pub fn actuator(&self) -> Actuator {
        self.actuator
    }

    #[must_use]
    pub fn params(&self) -> &ActuatorParams {
        &self.params
    }

    /// Rebuilds the world from the scene and applies the seeded
    /// randomisation: beam angle within `±init_angle_range`, ball shifted
    /// along x by up to `±init_ball_ratio` of the beam half-length, all
    /// velocities zero.
    pub fn reset(&mut self) {
        self.world = self.scene.build_world(self.dt);
        self.world.seed(self.seed);
        self.actuator = Actuator::default();

        tracing::debug!(
            seed = self.seed,
            rng_state = self.world.rng_state(),
            actuator = ?self.world.actuator_index,
            "simulator reset"
        );

        let Some(Shape::Rect { width, .. }) = self.world.actuator().map(|b| b.shape) else {
            return;
        };
        if self.world.body(BALL_BODY_INDEX).is_none() {
            return;
        }

        let angle_norm = self.world.rng().next_signed();
        self.actuator.angle = angle_norm * self.params.init_angle_range;
        self.apply_actuator_pose();

        let offset_norm = self.world.rng().next_signed();
        let offset = offset_norm * self.params.init_ball_ratio * width * 0.5;
        tracing::debug!(
            beam_angle = self.actuator.angle,
            ball_offset = offset,
            "randomised initial state"
        );

        if let Some(ball) = self.world.body_mut(BALL_BODY_INDEX) {
            ball.position.x += offset;
            ball.velocity = Vec2::ZERO;
            ball.angular_velocity = 0.0;
        }
    }

    /// Advances the actuator and the world by one timestep. `action` is a
    /// normalised motor command and is clamped to `[-1, 1]`.
    pub fn step(&mut self, action: f32) {
        let action = action.clamp(-1.0, 1.0);
        let ActuatorParams {
            max_speed,
            tau,
            angle_limit,
            ..
        } = self.params;

        // first-order lag towards the commanded speed
        let target = action * max_speed;
        let a = &mut self.actuator;
        a.angular_velocity += (self.dt / tau) * (target - a.angular_velocity);
        a.angle += a.angular_velocity * self.dt;
        if a.angle.abs() > angle_limit {
            a.angle = angle_limit.copysign(a.angle);
            a.angular_velocity = 0.0;
        }

        self.apply_actuator_pose();
        self.world.step();
        self.apply_actuator_pose();
    }

    /// Ball position and velocity in the beam frame, if both bodies exist.
    #[must_use]
    pub fn ball_on_beam(&self) -> Option<BallOnBeam> {
        let beam = self.world.actuator()?;
        let ball = self.world.body(BALL_BODY_INDEX)?;
        let Shape::Rect { width, .. } = beam.shape else {
            return None;
        };
        let axis = Vec2::from_angle(self.actuator.angle);
        Some(BallOnBeam {
            offset: (ball.position - beam.position).dot(axis),
            velocity: ball.velocity.dot(axis),
            half_length: width * 0.5,
        })
    }

    /// Current observation vector. All zeros when the scene lacks a beam or
    /// a ball.
    #[must_use]
    pub fn observation(&self) -> [f32; OBS_DIM] {
        let Some(ball) = self.ball_on_beam() else {
            return [0.0; OBS_DIM];
        };
        [
            self.actuator.angle,
            self.actuator.angular_velocity,
            ball.offset,
            ball.velocity,
        ]
    }

    /// Places the beam on its pivot at the actuator angle with zero velocity.
    /// The pivot is the top of the fulcrum base when one exists, otherwise
    /// the beam's position from the scene.
    fn apply_actuator_pose(&mut self) {
        let Some(beam_index) = self.world.actuator_index else {
            return;
        };
        let Some(Shape::Rect { height: beam_height, .. }) = self.world.body(beam_index).map(|b| b.shape) else {
            return;
        };

        let fulcrum_top = match self.world.body(0) {
            Some(base) if beam_index != 0 => match base.shape {
                Shape::Rect { height, .. } => {
                    Some(Vec2::new(base.position.x, base.position.y - height * 0.5))
                }
                Shape::Circle { .. } => None,
            },
            _ => None,
        };
        let position = match fulcrum_top {
            Some(top) => Vec2::new(top.x, top.y - beam_height * 0.5),
            None => self.world.actuator_pivot,
        };

        let angle = self.actuator.angle;
        if let Some(beam) = self.world.body_mut(beam_index) {
            beam.position = position;
            beam.angle = angle;
            beam.velocity = Vec2::ZERO;
            beam.angular_velocity = 0.0;
        }
    }
}
