// Playground: the interaction engine built on top of the physics world
//
// - Static configuration
// - Pooled objects for transient spawns
// - Shape geometry shared by drawing and previews
// - The simulation engine that owns it all

pub mod config;
mod engine;
mod interact;
pub mod pooled;
pub mod shapes;
mod spawn;

pub use config::{PlaygroundConfig, ShapeKind};
pub use engine::{EngineEvent, SimulationEngine, StepInfo, BOUNDARY_LABELS};
pub use pooled::PooledObject;
pub use shapes::{DrawShape, ShapeGeometry, ShapePreview};

/// Engine errors. Only caller contract violations end up here; routine
/// races between input and engine state are silent no-ops.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Simulation engine used before init()")]
    NotInitialized,

    #[error("Simulation engine already initialized; call destroy() first")]
    AlreadyInitialized,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown shape kind: {0}")]
    UnknownShapeKind(String),

    #[error("Body is not part of the world")]
    BodyNotFound,

    #[error("Shape collapsed to a degenerate collider")]
    DegenerateShape,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::UnknownShapeKind("star".to_string());
        assert_eq!(err.to_string(), "Unknown shape kind: star");
        assert_eq!(
            EngineError::NotInitialized.to_string(),
            "Simulation engine used before init()"
        );
    }
}
