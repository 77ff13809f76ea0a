//! JSON scene files.
//!
//! A scene lists the world configuration and the bodies to create:
//!
//! ```json
//! {
//!   "world": { "gravity": [0, 98.1], "bounds": { "left": 0, "top": 0, "right": 1920, "bottom": 1080 } },
//!   "bodies": [
//!     { "type": "rect", "position": [960, 700], "width": 40, "height": 120, "static": true },
//!     { "type": "circle", "position": [960, 615], "radius": 15, "mass": 1.0 },
//!     { "type": "rect", "position": [960, 635], "width": 600, "height": 10, "static": true, "actuator": true }
//!   ]
//! }
//! ```
//!
//! Bodies that fail to parse are skipped with a warning.

use std::path::Path;

use glam::Vec2;
use serde::Deserialize;

use crate::body::Body;
use crate::error::PhysicsError;
use crate::world::{Bounds, World, DEFAULT_GRAVITY};

#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub world: WorldDef,
    pub bodies: Vec<BodyDef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WorldDef {
    #[serde(default = "default_gravity")]
    pub gravity: [f32; 2],
    #[serde(default)]
    pub bounds: Option<BoundsDef>,
}

impl Default for WorldDef {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            bounds: None,
        }
    }
}

#[derive(Copy, Clone, Debug, Deserialize)]
pub struct BoundsDef {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeDef {
    Circle { radius: f32 },
    Rect { width: f32, height: f32 },
}

#[derive(Clone, Debug, Deserialize)]
pub struct BodyDef {
    #[serde(flatten)]
    pub shape: ShapeDef,
    pub position: [f32; 2],
    #[serde(default = "default_mass")]
    pub mass: f32,
    #[serde(default = "default_restitution")]
    pub restitution: f32,
    #[serde(default)]
    pub velocity: [f32; 2],
    #[serde(default)]
    pub angular_velocity: f32,
    #[serde(default)]
    pub angle: f32,
    #[serde(default)]
    pub color: Option<[u8; 4]>,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// Marks the body driven by the actuator.
    #[serde(default)]
    pub actuator: bool,
}

#[derive(Deserialize)]
struct RawScene {
    #[serde(default)]
    world: Option<WorldDef>,
    #[serde(default)]
    bodies: Vec<serde_json::Value>,
}

fn default_gravity() -> [f32; 2] {
    DEFAULT_GRAVITY.to_array()
}

fn default_mass() -> f32 {
    1.0
}

fn default_restitution() -> f32 {
    0.8
}

impl Scene {
    /// Parses a scene from JSON text.
    ///
    /// # Errors
    ///
    /// Fails only when the document itself is malformed. Individual bodies
    /// that do not parse are dropped.
    pub fn parse(json: &str) -> Result<Self, PhysicsError> {
        let raw: RawScene = serde_json::from_str(json)?;
        let mut bodies = Vec::with_capacity(raw.bodies.len());
        for (i, value) in raw.bodies.into_iter().enumerate() {
            match serde_json::from_value::<BodyDef>(value) {
                Ok(body) => bodies.push(body),
                Err(e) => tracing::warn!("skipping scene body {i}: {e}"),
            }
        }
        Ok(Self {
            world: raw.world.unwrap_or_default(),
            bodies,
        })
    }

    /// Reads and parses a scene file.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::SceneRead`] if the file cannot be read and
    /// [`PhysicsError::SceneParse`] if it is not a valid scene document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PhysicsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| PhysicsError::SceneRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&json)
    }

    /// Builds a fresh world from this scene using the given timestep.
    #[must_use]
    pub fn build_world(&self, dt: f32) -> World {
        let mut world = World::new(Vec2::from_array(self.world.gravity), dt);
        world.bounds = self.world.bounds.map(|b| Bounds {
            left: b.left,
            top: b.top,
            right: b.right,
            bottom: b.bottom,
        });

        for (i, def) in self.bodies.iter().enumerate() {
            let body = def.to_body();
            match world.add_body(body) {
                Ok(index) if def.actuator => {
                    world.actuator_index = Some(index);
                    world.actuator_pivot = body.position;
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("dropping scene body {i}: {e}"),
            }
        }
        world
    }
}

impl BodyDef {
    #[must_use]
    pub fn to_body(&self) -> Body {
        let position = Vec2::from_array(self.position);
        let mut body = match self.shape {
            ShapeDef::Circle { radius } => Body::circle(position, radius, self.mass, self.restitution),
            ShapeDef::Rect { width, height } => {
                Body::rect(position, width, height, self.mass, self.restitution)
            }
        };
        body.velocity = Vec2::from_array(self.velocity);
        body.angular_velocity = self.angular_velocity;
        body.angle = self.angle;
        if let Some(color) = self.color {
            body.color = color;
        }
        if self.is_static {
            body.set_static();
        }
        body
    }
}
