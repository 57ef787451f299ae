// Pointer input handling
//
// ## Architecture
//
// - `tool`: Tools and pointer events in world coordinates
// - `controller`: Per-tool state machine driving the simulation engine
//
// ## Usage Example
//
// ```rust
// use rigid_playground::engine::input::{InteractionController, PointerEvent, Tool};
//
// let mut controller = InteractionController::new(Tool::Drag);
//
// // Forward pointer events from the host, already in world units
// controller.handle(&mut engine, PointerEvent::Down(point))?;
// controller.handle(&mut engine, PointerEvent::Move(point))?;
// controller.handle(&mut engine, PointerEvent::Up(point))?;
// ```

pub mod controller;
pub mod tool;

// Re-export commonly used types
pub use controller::{InteractionController, Outcome};
pub use tool::{PointerEvent, Tool};
