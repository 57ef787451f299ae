// Rigid Playground - interactive 2D rigid-body sandbox engine

pub mod core;
pub mod engine;
pub mod playground;
