use glam::Vec2;
use rapier2d::prelude::*;

pub use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};

/// Local (body-space) geometry of a playground body
#[derive(Debug, Clone, PartialEq)]
pub enum BodyShape {
    /// Circle centered on the body origin
    Circle { radius: f32 },
    /// Axis-aligned rectangle in body space (the body rotation tilts it)
    Rect { width: f32, height: f32 },
    /// Convex polygon, vertices relative to the body origin
    Polygon { vertices: Vec<Vec2> },
}

impl BodyShape {
    /// Convert into a rapier shape. Polygons that collapse to fewer than
    /// three distinct points yield `None`.
    pub fn to_shared_shape(&self) -> Option<SharedShape> {
        match self {
            BodyShape::Circle { radius } => Some(SharedShape::ball(*radius)),
            BodyShape::Rect { width, height } => {
                Some(SharedShape::cuboid(width / 2.0, height / 2.0))
            }
            BodyShape::Polygon { vertices } => {
                let points: Vec<_> = vertices.iter().map(|v| point![v.x, v.y]).collect();
                SharedShape::convex_polyline(points)
            }
        }
    }
}

/// Surface and mass properties shared by every dynamic body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub friction: Real,
    pub restitution: Real,
    pub density: Real,
    /// Linear damping, the air resistance every body feels
    pub air_friction: Real,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            friction: 0.1,
            restitution: 0.6,
            density: 0.001,
            air_friction: 0.01,
        }
    }
}

/// Builder for creating rigid bodies with common configurations
pub struct BodyBuilder {
    body_type: RigidBodyType,
    position: Isometry<Real>,
    can_sleep: bool,
    linear_damping: Real,
}

impl BodyBuilder {
    /// Create a new dynamic body (affected by forces and collisions)
    pub fn new_dynamic() -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            position: Isometry::identity(),
            can_sleep: true,
            linear_damping: 0.0,
        }
    }

    /// Create a new fixed (static) body (completely immovable)
    pub fn new_fixed() -> Self {
        Self {
            body_type: RigidBodyType::Fixed,
            position: Isometry::identity(),
            can_sleep: false,
            linear_damping: 0.0,
        }
    }

    /// Set the initial position of the body
    pub fn position(mut self, x: Real, y: Real) -> Self {
        self.position = Isometry::translation(x, y);
        self
    }

    /// Set the initial position and rotation
    pub fn position_rotation(mut self, x: Real, y: Real, angle: Real) -> Self {
        self.position = Isometry::new(vector![x, y], angle);
        self
    }

    /// Set whether the body can sleep when inactive
    pub fn can_sleep(mut self, can_sleep: bool) -> Self {
        self.can_sleep = can_sleep;
        self
    }

    /// Set the linear damping (air friction)
    pub fn linear_damping(mut self, damping: Real) -> Self {
        self.linear_damping = damping;
        self
    }

    /// Build the rigid body
    pub fn build(self) -> RigidBody {
        let mut body = RigidBodyBuilder::new(self.body_type)
            .position(self.position)
            .can_sleep(self.can_sleep)
            .build();

        if self.body_type == RigidBodyType::Dynamic {
            body.set_linear_damping(self.linear_damping);
            body.set_angular_damping(self.linear_damping);
        }

        body
    }
}

/// Builder for creating colliders with common configurations
pub struct ColliderBuilder2D {
    shape: SharedShape,
    friction: Real,
    restitution: Real,
    density: Real,
}

impl ColliderBuilder2D {
    /// Create a collider from any playground shape
    pub fn from_shape(shape: &BodyShape) -> Option<Self> {
        shape.to_shared_shape().map(Self::with_shared_shape)
    }

    /// Create a box-shaped collider
    pub fn box_shape(half_width: Real, half_height: Real) -> Self {
        Self::with_shared_shape(SharedShape::cuboid(half_width, half_height))
    }

    fn with_shared_shape(shape: SharedShape) -> Self {
        Self {
            shape,
            friction: 0.5,
            restitution: 0.0,
            density: 1.0,
        }
    }

    /// Apply friction, restitution and density from a material
    pub fn material(mut self, material: &Material) -> Self {
        self.friction = material.friction;
        self.restitution = material.restitution;
        self.density = material.density;
        self
    }

    /// Set friction coefficient (0.0 = no friction, 1.0 = high friction)
    pub fn friction(mut self, friction: Real) -> Self {
        self.friction = friction;
        self
    }

    /// Set restitution/bounciness (0.0 = no bounce, 1.0 = perfect bounce)
    pub fn restitution(mut self, restitution: Real) -> Self {
        self.restitution = restitution;
        self
    }

    /// Build the collider
    pub fn build(self) -> Collider {
        rapier2d::prelude::ColliderBuilder::new(self.shape)
            .friction(self.friction)
            .restitution(self.restitution)
            .density(self.density)
            .build()
    }
}

/// Common rigid body configurations for playground objects
pub mod presets {
    use super::*;

    /// Create a dynamic playground body at `position`, rotated by `angle`
    pub fn dynamic_body(position: Vec2, angle: Real, material: &Material, can_sleep: bool) -> RigidBody {
        BodyBuilder::new_dynamic()
            .position_rotation(position.x, position.y, angle)
            .linear_damping(material.air_friction)
            .can_sleep(can_sleep)
            .build()
    }

    /// Create a dynamic collider for a playground shape
    pub fn dynamic_collider(shape: &BodyShape, material: &Material) -> Option<Collider> {
        ColliderBuilder2D::from_shape(shape).map(|builder| builder.material(material).build())
    }

    /// Create a boundary body (fixed/static)
    pub fn boundary_body(center: Vec2) -> RigidBody {
        BodyBuilder::new_fixed().position(center.x, center.y).build()
    }

    /// Create a boundary collider (box shape)
    pub fn boundary_collider(width: Real, height: Real) -> Collider {
        ColliderBuilder2D::box_shape(width / 2.0, height / 2.0)
            .friction(0.3)
            .restitution(0.0)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_builder_dynamic() {
        let body = BodyBuilder::new_dynamic()
            .position(10.0, 20.0)
            .build();

        assert_eq!(body.body_type(), RigidBodyType::Dynamic);
        assert_eq!(body.translation().x, 10.0);
        assert_eq!(body.translation().y, 20.0);
    }

    #[test]
    fn test_collider_builder_box() {
        let collider = ColliderBuilder2D::box_shape(1.0, 2.0).friction(0.3).build();

        assert!(!collider.is_sensor());
        assert_eq!(collider.friction(), 0.3);
    }

    #[test]
    fn test_collider_takes_material() {
        let material = Material {
            friction: 0.2,
            restitution: 0.9,
            density: 0.5,
            air_friction: 0.0,
        };
        let collider = presets::dynamic_collider(&BodyShape::Circle { radius: 4.0 }, &material)
            .expect("circle is never degenerate");

        assert_eq!(collider.friction(), 0.2);
        assert_eq!(collider.restitution(), 0.9);
    }

    #[test]
    fn test_degenerate_polygon_rejected() {
        let shape = BodyShape::Polygon {
            vertices: vec![Vec2::ZERO, Vec2::ZERO, Vec2::ZERO],
        };
        assert!(shape.to_shared_shape().is_none());
    }

    #[test]
    fn test_boundary_preset_is_fixed() {
        let body = presets::boundary_body(Vec2::new(400.0, 630.0));
        assert!(body.is_fixed());
        assert_eq!(body.translation().y, 630.0);
    }
}
