// Physics system using rapier2d

pub mod body;
mod outline;
mod world;

pub use body::{BodyShape, Material, RigidBodyHandle};
pub use outline::BodyOutline;
pub use world::{BodyMeta, PhysicsWorld};

// Re-export commonly used rapier types for convenience
pub use rapier2d::prelude::{Real, RigidBody, RigidBodyType};

use glam::Vec2;
use rapier2d::prelude::Vector;

// Conversion helpers: the public surface speaks glam, rapier speaks nalgebra

pub(crate) fn to_vector(v: Vec2) -> Vector<Real> {
    Vector::new(v.x, v.y)
}

pub(crate) fn from_vector(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}
