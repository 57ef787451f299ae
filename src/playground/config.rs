// Playground configuration - every tunable the engine reads

use glam::Vec2;

use super::EngineError;
use crate::engine::physics::Material;
use crate::engine::renderer::{rgb, Rgba};

/// Kinds of bodies the spawn tool can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Circle,
    Box,
    Polygon,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Circle, ShapeKind::Box, ShapeKind::Polygon];

    /// Lowercase name, also used as the body label
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Box => "box",
            ShapeKind::Polygon => "polygon",
        }
    }

    /// Parse a kind from its name
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| EngineError::UnknownShapeKind(name.to_string()))
    }
}

/// Spawn weights: circles are the most common, polygons the rarest
pub const DEFAULT_OBJECT_TYPES: [(ShapeKind, u32); 3] = [
    (ShapeKind::Circle, 40),
    (ShapeKind::Box, 35),
    (ShapeKind::Polygon, 25),
];

/// Fill colors for spawned and drawn bodies
pub const DEFAULT_PALETTE: [u32; 8] = [
    0xff6b6b, 0x4ecdc4, 0x45b7d1, 0xf9ca24, 0x6c5ce7, 0xa29bfe, 0xfd79a8, 0x00b894,
];

/// Static tunables, read at init and on every spawn
#[derive(Debug, Clone, PartialEq)]
pub struct PlaygroundConfig {
    // World
    /// Gravity direction (y points down)
    pub gravity: Vec2,
    /// Gravity magnitude in px/s²
    pub gravity_scale: f32,
    /// Device pixels per world unit
    pub pixel_ratio: f32,
    /// Whether resting bodies may fall asleep
    pub sleeping_enabled: bool,

    // Material
    pub friction: f32,
    pub restitution: f32,
    pub air_friction: f32,
    pub density: f32,

    // Population
    /// Ceiling on pooled (spawned) bodies alive at once
    pub max_bodies: usize,
    /// Number of pool slots allocated at init
    pub pool_size: usize,
    /// Minimum time between two successful spawns
    pub spawn_interval_ms: u64,
    /// Spawn table with relative weights
    pub object_types: Vec<(ShapeKind, u32)>,

    // Geometry
    pub min_size: f32,
    pub max_size: f32,
    /// Thickness of bodies drawn with the line tool
    pub line_thickness: f32,

    // Forces
    /// Margin around the view before a body counts as lost
    pub offscreen_buffer: f32,
    /// Radius of the nudge that follows an erase
    pub neighbor_radius: f32,
    pub neighbor_force: f32,
    pub explosion_force: f32,
    pub explosion_radius: f32,

    pub palette: Vec<Rgba>,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 1.0),
            gravity_scale: 980.0,
            pixel_ratio: 1.0,
            sleeping_enabled: true,

            friction: 0.1,
            restitution: 0.6,
            air_friction: 0.01,
            density: 0.001,

            max_bodies: 150,
            pool_size: 200,
            spawn_interval_ms: 50,
            object_types: DEFAULT_OBJECT_TYPES.to_vec(),

            min_size: 15.0,
            max_size: 40.0,
            line_thickness: 8.0,

            offscreen_buffer: 100.0,
            neighbor_radius: 80.0,
            neighbor_force: 3_000.0,
            explosion_force: 60_000.0,
            explosion_radius: 200.0,

            palette: DEFAULT_PALETTE.iter().map(|hex| rgb(*hex)).collect(),
        }
    }
}

impl PlaygroundConfig {
    /// Set the body ceiling
    pub fn with_max_bodies(mut self, max_bodies: usize) -> Self {
        self.max_bodies = max_bodies;
        self
    }

    /// Set the number of pool slots
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Set the spawn rate limit
    pub fn with_spawn_interval_ms(mut self, interval: u64) -> Self {
        self.spawn_interval_ms = interval;
        self
    }

    /// Set the random size range of spawned bodies
    pub fn with_size_range(mut self, min: f32, max: f32) -> Self {
        self.min_size = min;
        self.max_size = max;
        self
    }

    /// Replace the spawn table
    pub fn with_object_types(mut self, types: Vec<(ShapeKind, u32)>) -> Self {
        self.object_types = types;
        self
    }

    /// Set gravity direction and magnitude
    pub fn with_gravity(mut self, direction: Vec2, scale: f32) -> Self {
        self.gravity = direction;
        self.gravity_scale = scale;
        self
    }

    /// Gravity in px/s²
    pub fn gravity_vector(&self) -> Vec2 {
        self.gravity * self.gravity_scale
    }

    /// Material applied to every dynamic body
    pub fn material(&self) -> Material {
        Material {
            friction: self.friction,
            restitution: self.restitution,
            density: self.density,
            air_friction: self.air_friction,
        }
    }

    /// Sum of all spawn weights
    pub fn total_weight(&self) -> u32 {
        self.object_types.iter().map(|(_, weight)| weight).sum()
    }

    /// Reject configurations the engine cannot honor
    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |msg: &str| Err(EngineError::InvalidConfig(msg.to_string()));

        if self.pool_size == 0 {
            return invalid("pool_size must be at least 1");
        }
        if self.max_bodies == 0 {
            return invalid("max_bodies must be at least 1");
        }
        if !(self.min_size > 0.0) {
            return invalid("min_size must be positive");
        }
        if self.min_size > self.max_size {
            return invalid("min_size exceeds max_size");
        }
        if self.total_weight() == 0 {
            return invalid("object_types needs at least one positive weight");
        }
        if self.palette.is_empty() {
            return invalid("palette is empty");
        }
        if !(self.line_thickness > 0.0) {
            return invalid("line_thickness must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PlaygroundConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.total_weight(), 100);
        assert_eq!(config.gravity_vector(), Vec2::new(0.0, 980.0));
    }

    #[test]
    fn test_builder_methods() {
        let config = PlaygroundConfig::default()
            .with_max_bodies(3)
            .with_pool_size(4)
            .with_spawn_interval_ms(0)
            .with_size_range(5.0, 6.0);
        assert_eq!(config.max_bodies, 3);
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.spawn_interval_ms, 0);
        assert_eq!((config.min_size, config.max_size), (5.0, 6.0));
    }

    #[test]
    fn test_validation_failures() {
        let zero_pool = PlaygroundConfig::default().with_pool_size(0);
        assert!(matches!(zero_pool.validate(), Err(EngineError::InvalidConfig(_))));

        let inverted = PlaygroundConfig::default().with_size_range(50.0, 10.0);
        assert!(inverted.validate().is_err());

        let no_weights =
            PlaygroundConfig::default().with_object_types(vec![(ShapeKind::Circle, 0)]);
        assert!(no_weights.validate().is_err());
    }

    #[test]
    fn test_shape_kind_names() {
        for kind in ShapeKind::ALL {
            assert_eq!(ShapeKind::from_name(kind.name()), Ok(kind));
        }
        assert_eq!(ShapeKind::from_name("BOX"), Ok(ShapeKind::Box));
        assert_eq!(
            ShapeKind::from_name("star"),
            Err(EngineError::UnknownShapeKind("star".to_string()))
        );
    }
}
