//! # World
//!
//! Body storage and the fixed-step integrator. A world holds at most
//! [`MAX_BODIES`] bodies, integrates them with semi-implicit Euler, keeps
//! circles resting on the top face of the actuated beam, and optionally
//! confines circles to rectangular bounds.
//!
//! Every world also owns a small deterministic RNG so that a simulator reset
//! with the same seed always produces the same initial state.

use glam::Vec2;

use crate::body::{Body, Shape};
use crate::error::PhysicsError;

pub const MAX_BODIES: usize = 256;

/// Gravity used when a scene does not specify one (pixels/s², y down).
pub const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, 98.1);

/// Axis-aligned world boundaries.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// Deterministic xorshift32 generator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    // xorshift has a fixed point at zero
    const ZERO_SEED_REPLACEMENT: u32 = 0x6D2B_79F5;

    #[must_use]
    pub fn new(seed: u32) -> Self {
        let state = if seed == 0 { Self::ZERO_SEED_REPLACEMENT } else { seed };
        Self { state }
    }

    #[must_use]
    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        // top 24 bits fit an f32 mantissa exactly
        (self.next_u32() >> 8) as f32 / 16_777_216.0
    }

    /// Uniform float in `[-1, 1)`.
    pub fn next_signed(&mut self) -> f32 {
        self.next_f32() * 2.0 - 1.0
    }
}

#[derive(Clone, Debug)]
pub struct World {
    pub bodies: Vec<Body>,
    pub gravity: Vec2,
    pub dt: f32,
    /// Index of the body driven by the actuator (the beam), if any.
    pub actuator_index: Option<usize>,
    /// Where the actuator body sits when no fulcrum base supports it.
    pub actuator_pivot: Vec2,
    pub bounds: Option<Bounds>,
    rng: XorShift32,
}

impl World {
    #[must_use]
    pub fn new(gravity: Vec2, dt: f32) -> Self {
        Self {
            bodies: Vec::new(),
            gravity,
            dt,
            actuator_index: None,
            actuator_pivot: Vec2::ZERO,
            bounds: None,
            rng: XorShift32::new(0),
        }
    }

    /// Adds a body and returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::WorldFull`] once [`MAX_BODIES`] is reached.
    pub fn add_body(&mut self, body: Body) -> Result<usize, PhysicsError> {
        if self.bodies.len() >= MAX_BODIES {
            return Err(PhysicsError::WorldFull(MAX_BODIES));
        }
        self.bodies.push(body);
        Ok(self.bodies.len() - 1)
    }

    #[must_use]
    pub fn body(&self, index: usize) -> Option<&Body> {
        self.bodies.get(index)
    }

    pub fn body_mut(&mut self, index: usize) -> Option<&mut Body> {
        self.bodies.get_mut(index)
    }

    #[must_use]
    pub fn actuator(&self) -> Option<&Body> {
        self.actuator_index.and_then(|i| self.bodies.get(i))
    }

    pub fn seed(&mut self, seed: u32) {
        self.rng = XorShift32::new(seed);
    }

    #[must_use]
    pub fn rng_state(&self) -> u32 {
        self.rng.state()
    }

    pub fn rng(&mut self) -> &mut XorShift32 {
        &mut self.rng
    }

    /// Advances every dynamic body by one timestep.
    pub fn step(&mut self) {
        let (gravity, dt) = (self.gravity, self.dt);
        for body in self.bodies.iter_mut().filter(|b| !b.is_static()) {
            // semi-implicit Euler: velocity first, then position with the new velocity
            body.velocity += gravity * dt;
            body.position += body.velocity * dt;
        }
        self.resolve_beam_contacts();
        self.apply_bounds();
    }

    /// Keeps dynamic circles on top of the actuated beam while they are
    /// within its length. The normal velocity component into the beam is
    /// removed, so a resting ball slides along the beam under gravity.
    fn resolve_beam_contacts(&mut self) {
        let Some(beam_index) = self.actuator_index else {
            return;
        };
        let Some(beam) = self.bodies.get(beam_index).copied() else {
            return;
        };
        let Shape::Rect { width, height } = beam.shape else {
            return;
        };
        let axis = beam.axis();
        // top face normal; y points down so "up" is -y when the beam is level
        let normal = Vec2::new(axis.y, -axis.x);

        for (i, body) in self.bodies.iter_mut().enumerate() {
            if i == beam_index || body.is_static() {
                continue;
            }
            let Shape::Circle { radius } = body.shape else {
                continue;
            };
            let offset = body.position - beam.position;
            if offset.dot(axis).abs() > width * 0.5 {
                continue;
            }
            let height_above = offset.dot(normal);
            let resting = height * 0.5 + radius;
            if height_above.abs() >= resting {
                continue;
            }
            body.position += normal * (resting - height_above);
            let into_surface = body.velocity.dot(normal);
            if into_surface < 0.0 {
                body.velocity -= normal * into_surface;
            }
        }
    }

    fn apply_bounds(&mut self) {
        let Some(bounds) = self.bounds else {
            return;
        };
        for body in self.bodies.iter_mut().filter(|b| !b.is_static()) {
            let Shape::Circle { radius } = body.shape else {
                continue;
            };
            let e = body.restitution;
            if body.position.x - radius < bounds.left {
                body.position.x = bounds.left + radius;
                body.velocity.x = -body.velocity.x * e;
            } else if body.position.x + radius > bounds.right {
                body.position.x = bounds.right - radius;
                body.velocity.x = -body.velocity.x * e;
            }
            if body.position.y - radius < bounds.top {
                body.position.y = bounds.top + radius;
                body.velocity.y = -body.velocity.y * e;
            } else if body.position.y + radius > bounds.bottom {
                body.position.y = bounds.bottom - radius;
                body.velocity.y = -body.velocity.y * e;
            }
        }
    }
}
