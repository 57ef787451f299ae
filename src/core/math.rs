// Math utilities and helper functions

use glam::Vec2;
use std::f32::consts::{PI, TAU};

/// Clamp a value between min and max
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Rotate a vector by `angle` radians around the origin
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Even-odd ray casting test.
///
/// Casts a horizontal ray from `point` and counts edge crossings. Works for any
/// simple polygon regardless of winding; fewer than three vertices never contain
/// anything.
pub fn point_in_polygon(point: Vec2, vertices: &[Vec2]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[j];
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Vertices of a regular polygon centered on the origin.
///
/// Vertex `i` sits at angle `PI / sides + i * TAU / sides`, so every polygon has
/// a flat edge facing the +x axis. Angles increase, giving counter-clockwise
/// winding in math orientation.
pub fn regular_polygon(sides: u8, radius: f32) -> Vec<Vec2> {
    let sides = sides.max(3) as usize;
    let step = TAU / sides as f32;
    let offset = PI / sides as f32;

    (0..sides)
        .map(|i| {
            let angle = offset + i as f32 * step;
            Vec2::new(angle.cos() * radius, angle.sin() * radius)
        })
        .collect()
}

/// Linear proximity falloff: 1 at the center, 0 at `radius` and beyond
pub fn proximity_falloff(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 || distance >= radius {
        return 0.0;
    }
    1.0 - distance / radius
}
