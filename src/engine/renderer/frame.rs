// Frame extraction: turn the physics world into drawable primitives

use glam::Vec2;

use super::{RenderHints, Viewport};
use crate::engine::physics::{BodyOutline, PhysicsWorld};

/// Renderable geometry in world space
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Circle { center: Vec2, radius: f32 },
    Polygon { points: Vec<Vec2> },
}

impl From<BodyOutline> for Primitive {
    fn from(outline: BodyOutline) -> Self {
        match outline {
            BodyOutline::Circle { center, radius } => Primitive::Circle { center, radius },
            BodyOutline::Polygon { vertices } => Primitive::Polygon { points: vertices },
        }
    }
}

/// One primitive plus the hints to paint it with
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub primitive: Primitive,
    pub hints: RenderHints,
}

/// Everything a surface needs to paint one tick
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub view: Viewport,
    pub pixel_ratio: f32,
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    /// Extract a frame from the current world state
    pub fn extract(world: &PhysicsWorld, view: Viewport, pixel_ratio: f32) -> Self {
        let commands = world
            .bodies()
            .filter_map(|(handle, _body)| {
                let outline = world.outline(handle)?;
                let hints = world
                    .body_meta(handle)
                    .map(|meta| meta.hints)
                    .unwrap_or_default();
                Some(DrawCommand {
                    primitive: outline.into(),
                    hints,
                })
            })
            .collect();

        Self {
            view,
            pixel_ratio,
            commands,
        }
    }

    /// Number of circles and polygons in the frame
    pub fn counts(&self) -> (usize, usize) {
        self.commands
            .iter()
            .fold((0, 0), |(circles, polygons), cmd| match cmd.primitive {
                Primitive::Circle { .. } => (circles + 1, polygons),
                Primitive::Polygon { .. } => (circles, polygons + 1),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::body::{presets, BodyShape, Material};
    use crate::engine::physics::BodyMeta;
    use crate::engine::renderer::rgb;

    #[test]
    fn test_extract_carries_hints() {
        let mut world = PhysicsWorld::new();
        let material = Material::default();
        let red = RenderHints::filled(rgb(0xff0000));

        world.insert_body(
            presets::dynamic_body(Vec2::new(10.0, 10.0), 0.0, &material, true),
            presets::dynamic_collider(&BodyShape::Circle { radius: 5.0 }, &material)
                .expect("circle"),
            BodyMeta::new("circle", red),
        );
        world.insert_body(
            presets::boundary_body(Vec2::new(0.0, 100.0)),
            presets::boundary_collider(200.0, 60.0),
            BodyMeta::new("ground", RenderHints::default()),
        );

        let frame = Frame::extract(&world, Viewport::from_size(100.0, 100.0), 2.0);

        assert_eq!(frame.counts(), (1, 1));
        assert_eq!(frame.pixel_ratio, 2.0);
        assert!(frame.commands.iter().any(|cmd| cmd.hints == red));
    }
}
