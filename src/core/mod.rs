// Core helpers shared by the engine and the playground

pub mod math;
