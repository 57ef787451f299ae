// Rendering contract: the engine extracts frames, a surface presents them

pub mod frame;
pub mod style;
mod viewport;

pub use frame::{DrawCommand, Frame, Primitive};
pub use style::{rgb, Effect, Outline, RenderHints, Rgba};
pub use viewport::Viewport;

use glam::Vec2;

/// A drawing surface the engine renders into.
///
/// This is the presentation adapter: a browser canvas, a window or a test
/// recorder all fit behind it. The engine never draws directly.
pub trait RenderSurface {
    /// Current surface size in world units (CSS pixels)
    fn size(&self) -> Vec2;

    /// Device pixels per world unit
    fn pixel_ratio(&self) -> f32 {
        1.0
    }

    /// Resize the backing store
    fn resize(&mut self, _size: Vec2) {}

    /// Paint one extracted frame
    fn present(&mut self, frame: &Frame);
}
