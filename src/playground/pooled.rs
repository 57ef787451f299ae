// Pooled objects - reusable slots for transient spawned bodies

use glam::Vec2;
use rand::rngs::StdRng;
use rand::Rng;

use super::shapes::{ShapeGeometry, SPAWN_POLYGON_SIDES};
use super::{EngineError, PlaygroundConfig, ShapeKind};
use crate::engine::physics::body::presets;
use crate::engine::physics::{to_vector, BodyMeta, PhysicsWorld, RigidBody, RigidBodyHandle};
use crate::engine::renderer::{Effect, RenderHints};

/// Everything `PooledObject::init` needs besides kind and position
pub struct SpawnContext<'a> {
    pub config: &'a PlaygroundConfig,
    pub rng: &'a mut StdRng,
    /// Fresh identity token for the object
    pub id: u64,
    pub now_ms: u64,
}

/// One slot of the spawn pool.
///
/// Slots are created empty and reused forever. While active the slot owns
/// exactly one body in the world. Every operation on an inactive slot is a
/// silent no-op: the recycling scan pokes at slots opportunistically.
#[derive(Debug, Clone)]
pub struct PooledObject {
    slot: usize,
    id: u64,
    kind: Option<ShapeKind>,
    /// Last body this slot owned; kept after deactivation for inspection
    handle: Option<RigidBodyHandle>,
    active: bool,
    created_at_ms: u64,
}

impl PooledObject {
    /// Create an empty, inactive slot
    pub fn new(slot: usize) -> Self {
        Self {
            slot,
            id: 0,
            kind: None,
            handle: None,
            active: false,
            created_at_ms: 0,
        }
    }

    /// (Re)initialize the slot as a fresh body of `kind` at `position`.
    ///
    /// Size is drawn uniformly from `[min_size, max_size]`, polygon sides from
    /// 3..=7 and the fill from the palette. A body still left over from a
    /// previous life of this slot is replaced.
    pub fn init(
        &mut self,
        world: &mut PhysicsWorld,
        kind: ShapeKind,
        position: Vec2,
        ctx: SpawnContext<'_>,
    ) -> Result<&mut Self, EngineError> {
        let config = ctx.config;
        let size = ctx.rng.random_range(config.min_size..=config.max_size);
        let sides = ctx.rng.random_range(SPAWN_POLYGON_SIDES);
        let fill = config.palette[ctx.rng.random_range(0..config.palette.len())];

        if let Some(stale) = self.handle.take() {
            world.remove_body(stale);
        }

        let geometry = ShapeGeometry::spawned(kind, position, size, sides);
        let material = config.material();
        let body = presets::dynamic_body(position, 0.0, &material, config.sleeping_enabled);
        let collider = presets::dynamic_collider(&geometry.shape, &material)
            .ok_or(EngineError::DegenerateShape)?;
        let handle = world.insert_body(
            body,
            collider,
            BodyMeta::new(kind.name(), RenderHints::filled(fill)),
        );

        self.id = ctx.id;
        self.kind = Some(kind);
        self.handle = Some(handle);
        self.active = true;
        self.created_at_ms = ctx.now_ms;
        Ok(self)
    }

    /// Mark the slot free. The body must already be out of the world.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Apply a force at the body's position for the next step
    pub fn apply_force(&self, world: &mut PhysicsWorld, force: Vec2) {
        if let Some(body) = self.live_body(world) {
            body.add_force(to_vector(force), true);
        }
    }

    /// Teleport the body
    pub fn move_to(&self, world: &mut PhysicsWorld, position: Vec2) {
        if let Some(body) = self.live_body(world) {
            body.set_translation(to_vector(position), true);
        }
    }

    /// Toggle a rendering effect on the body
    pub fn set_effect(&self, world: &mut PhysicsWorld, effect: Effect, active: bool) {
        let Some(handle) = self.body_handle() else {
            return;
        };
        if let Some(meta) = world.body_meta_mut(handle) {
            meta.hints.set_effect(effect, active);
        }
    }

    /// Current body position
    pub fn position(&self, world: &PhysicsWorld) -> Option<Vec2> {
        self.body_handle().and_then(|handle| world.translation(handle))
    }

    fn live_body<'w>(&self, world: &'w mut PhysicsWorld) -> Option<&'w mut RigidBody> {
        self.body_handle()
            .and_then(|handle| world.get_rigid_body_mut(handle))
    }

    /// Index of this slot in the pool
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Identity token of the current (or last) life; 0 before the first init
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> Option<ShapeKind> {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    /// The owned body, present only while active
    pub fn body_handle(&self) -> Option<RigidBodyHandle> {
        self.handle.filter(|_| self.active)
    }

    /// The last body this slot owned, even after deactivation
    pub fn last_body_handle(&self) -> Option<RigidBodyHandle> {
        self.handle
    }
}
