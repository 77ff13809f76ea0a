//! Rigid bodies stored in a [`World`](crate::World).

use glam::Vec2;

/// Collision shape of a body.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Rect { width: f32, height: f32 },
}

/// A 2D body. Positions are centres of mass in world coordinates (pixels,
/// y pointing down).
#[derive(Copy, Clone, Debug)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Orientation in radians. The local x-axis is `(cos angle, sin angle)`.
    pub angle: f32,
    pub angular_velocity: f32,
    pub shape: Shape,
    pub mass: f32,
    /// `0.0` marks a static body.
    pub inv_mass: f32,
    pub restitution: f32,
    pub color: [u8; 4],
}

impl Body {
    #[must_use]
    pub fn circle(position: Vec2, radius: f32, mass: f32, restitution: f32) -> Self {
        Self::with_shape(position, Shape::Circle { radius }, mass, restitution)
    }

    #[must_use]
    pub fn rect(position: Vec2, width: f32, height: f32, mass: f32, restitution: f32) -> Self {
        Self::with_shape(position, Shape::Rect { width, height }, mass, restitution)
    }

    fn with_shape(position: Vec2, shape: Shape, mass: f32, restitution: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            angle: 0.0,
            angular_velocity: 0.0,
            shape,
            mass,
            inv_mass: if mass > 0.0 { 1.0 / mass } else { 0.0 },
            restitution,
            color: [255, 255, 255, 255],
        }
    }

    pub fn set_static(&mut self) {
        self.mass = 0.0;
        self.inv_mass = 0.0;
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    /// Unit vector along the body's local x-axis.
    #[must_use]
    pub fn axis(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }
}
