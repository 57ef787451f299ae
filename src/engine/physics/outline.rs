use glam::Vec2;
use rapier2d::prelude::*;

use crate::core::math::point_in_polygon;

/// World-space geometry of a body, as drawn and as hit-tested
#[derive(Debug, Clone, PartialEq)]
pub enum BodyOutline {
    Circle { center: Vec2, radius: f32 },
    Polygon { vertices: Vec<Vec2> },
}

impl BodyOutline {
    /// Boundary-inclusive containment test.
    ///
    /// Circles compare the distance to the center against the radius, polygons
    /// use even-odd ray casting over their world-space vertices.
    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            BodyOutline::Circle { center, radius } => point.distance(*center) <= *radius,
            BodyOutline::Polygon { vertices } => point_in_polygon(point, vertices),
        }
    }
}

/// Compute the world-space outline of a body's collider.
///
/// Colliders are always attached at the body origin, so the body isometry is
/// authoritative even before the next step syncs collider poses.
pub(super) fn body_outline(body: &RigidBody, collider: &Collider) -> Option<BodyOutline> {
    let transform = body.position();
    let shape = collider.shape();

    if let Some(ball) = shape.as_ball() {
        let center = transform * point![0.0, 0.0];
        return Some(BodyOutline::Circle {
            center: Vec2::new(center.x, center.y),
            radius: ball.radius,
        });
    }

    if let Some(cuboid) = shape.as_cuboid() {
        let he = cuboid.half_extents;
        // Four corners
        let corners = [
            point![-he.x, -he.y],
            point![he.x, -he.y],
            point![he.x, he.y],
            point![-he.x, he.y],
        ];
        return Some(BodyOutline::Polygon {
            vertices: corners.iter().map(|c| world_point(transform, c)).collect(),
        });
    }

    shape.as_convex_polygon().map(|polygon| BodyOutline::Polygon {
        vertices: polygon
            .points()
            .iter()
            .map(|p| world_point(transform, p))
            .collect(),
    })
}

fn world_point(transform: &Isometry<Real>, local: &Point<Real>) -> Vec2 {
    let p = transform * local;
    Vec2::new(p.x, p.y)
}
