// Shape geometry shared by spawning, the draw tool and live previews
//
// Committed bodies and previews both go through `ShapeGeometry`, so a preview
// always matches the body that the same drag would create.

use glam::Vec2;
use std::ops::RangeInclusive;

use super::ShapeKind;
use crate::core::math::{clamp, regular_polygon, rotate};
use crate::engine::physics::{BodyOutline, BodyShape};
use crate::engine::renderer::Primitive;

/// Side counts for spawned polygons
pub const SPAWN_POLYGON_SIDES: RangeInclusive<u8> = 3..=7;

/// Side counts for drawn polygons
pub const DRAW_POLYGON_SIDES: RangeInclusive<u8> = 3..=8;

/// Shapes the draw tool can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawShape {
    Circle,
    Box,
    Polygon,
    Line,
}

impl DrawShape {
    pub fn name(self) -> &'static str {
        match self {
            DrawShape::Circle => "circle",
            DrawShape::Box => "box",
            DrawShape::Polygon => "polygon",
            DrawShape::Line => "line",
        }
    }
}

/// Size bounds applied to drawn shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeLimits {
    pub min_size: f32,
    pub max_size: f32,
    pub line_thickness: f32,
}

/// Placement plus local shape of a body-to-be
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeGeometry {
    pub position: Vec2,
    pub angle: f32,
    pub shape: BodyShape,
}

impl ShapeGeometry {
    /// Geometry of a spawned body. `size` is the circle radius, the box side
    /// or the polygon's circumscribed radius.
    pub fn spawned(kind: ShapeKind, position: Vec2, size: f32, sides: u8) -> Self {
        let shape = match kind {
            ShapeKind::Circle => BodyShape::Circle { radius: size },
            ShapeKind::Box => BodyShape::Rect {
                width: size,
                height: size,
            },
            ShapeKind::Polygon => BodyShape::Polygon {
                vertices: regular_polygon(sides, size),
            },
        };
        Self {
            position,
            angle: 0.0,
            shape,
        }
    }

    /// Geometry of a shape drawn by dragging from `start` to `end`
    pub fn from_drag(
        tool: DrawShape,
        start: Vec2,
        end: Vec2,
        limits: &SizeLimits,
        polygon_sides: u8,
    ) -> Self {
        let delta = end - start;
        let distance = delta.length();

        match tool {
            DrawShape::Circle => Self {
                position: start,
                angle: 0.0,
                shape: BodyShape::Circle {
                    radius: clamp(distance, limits.min_size, limits.max_size * 2.0),
                },
            },
            DrawShape::Box => Self {
                position: (start + end) / 2.0,
                angle: 0.0,
                shape: BodyShape::Rect {
                    width: clamp(delta.x.abs(), limits.min_size, limits.max_size * 3.0),
                    height: clamp(delta.y.abs(), limits.min_size, limits.max_size * 3.0),
                },
            },
            DrawShape::Polygon => Self {
                position: start,
                angle: 0.0,
                shape: BodyShape::Polygon {
                    vertices: regular_polygon(
                        polygon_sides,
                        clamp(distance, limits.min_size, limits.max_size * 2.0),
                    ),
                },
            },
            DrawShape::Line => {
                let direction = delta.try_normalize().unwrap_or(Vec2::X);
                let length = clamp(distance, limits.line_thickness, limits.max_size * 5.0);
                Self {
                    position: start + direction * (length / 2.0),
                    angle: direction.y.atan2(direction.x),
                    shape: BodyShape::Rect {
                        width: length,
                        height: limits.line_thickness,
                    },
                }
            }
        }
    }

    /// World-space outline, computed the way the physics world reports it
    pub fn outline(&self) -> BodyOutline {
        let to_world = |local: Vec2| self.position + rotate(local, self.angle);

        match &self.shape {
            BodyShape::Circle { radius } => BodyOutline::Circle {
                center: self.position,
                radius: *radius,
            },
            BodyShape::Rect { width, height } => {
                let (hx, hy) = (width / 2.0, height / 2.0);
                let corners = [
                    Vec2::new(-hx, -hy),
                    Vec2::new(hx, -hy),
                    Vec2::new(hx, hy),
                    Vec2::new(-hx, hy),
                ];
                BodyOutline::Polygon {
                    vertices: corners.into_iter().map(to_world).collect(),
                }
            }
            BodyShape::Polygon { vertices } => BodyOutline::Polygon {
                vertices: vertices.iter().copied().map(to_world).collect(),
            },
        }
    }
}

/// Live preview of a drag in progress. Pure data, never touches the world.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapePreview {
    pub tool: DrawShape,
    pub geometry: ShapeGeometry,
    pub primitive: Primitive,
}

impl ShapePreview {
    pub fn new(tool: DrawShape, geometry: ShapeGeometry) -> Self {
        let primitive = geometry.outline().into();
        Self {
            tool,
            geometry,
            primitive,
        }
    }
}
