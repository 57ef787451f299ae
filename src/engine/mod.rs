// Engine modules: physics, renderer contract, input, timing

pub mod clock;
pub mod input;
pub mod physics;
pub mod renderer;
pub mod step_loop;
