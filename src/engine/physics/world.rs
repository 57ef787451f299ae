use glam::Vec2;
use rapier2d::prelude::*;
use std::collections::HashMap;

use super::outline::{body_outline, BodyOutline};
use super::{from_vector, to_vector};
use crate::engine::renderer::RenderHints;

/// Handle to identify rigid bodies
pub type RigidBodyHandle = rapier2d::prelude::RigidBodyHandle;

/// Per-body data the simulation itself does not care about
#[derive(Debug, Clone, PartialEq)]
pub struct BodyMeta {
    /// Stable label (`ground`, `leftWall`, `circle`, ...)
    pub label: String,
    /// Free-form rendering hints
    pub hints: RenderHints,
}

impl BodyMeta {
    pub fn new(label: impl Into<String>, hints: RenderHints) -> Self {
        Self {
            label: label.into(),
            hints,
        }
    }
}

/// Physics world that manages all physics simulation
pub struct PhysicsWorld {
    /// Gravity vector in px/s² (y points down)
    gravity: Vector<Real>,

    /// Integration parameters for the physics simulation
    integration_parameters: IntegrationParameters,

    /// Physics pipeline handles collision detection and solving
    physics_pipeline: PhysicsPipeline,

    /// Island manager for sleeping bodies
    island_manager: IslandManager,

    /// Broad phase collision detection
    broad_phase: DefaultBroadPhase,

    /// Narrow phase collision detection
    narrow_phase: NarrowPhase,

    /// Impulse joint set
    impulse_joint_set: ImpulseJointSet,

    /// Multibody joint set
    multibody_joint_set: MultibodyJointSet,

    /// CCD solver for fast-moving objects
    ccd_solver: CCDSolver,

    /// Rigid body set
    rigid_body_set: RigidBodySet,

    /// Collider set
    collider_set: ColliderSet,

    /// Labels and render hints keyed by body
    body_meta: HashMap<RigidBodyHandle, BodyMeta>,
}

impl PhysicsWorld {
    /// Create a new physics world with default settings
    pub fn new() -> Self {
        Self::with_gravity(Vec2::new(0.0, 980.0))
    }

    /// Create a new physics world with custom gravity
    pub fn with_gravity(gravity: Vec2) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        // Fixed timestep of 1/60 seconds (60 FPS)
        integration_parameters.dt = 1.0 / 60.0;

        Self {
            gravity: to_vector(gravity),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            body_meta: HashMap::new(),
        }
    }

    /// Step the physics simulation forward by one timestep
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    /// Clear user forces on every body. Forces only act for the step they
    /// were applied before.
    pub fn reset_forces(&mut self) {
        for (_handle, body) in self.rigid_body_set.iter_mut() {
            if body.user_force() != Vector::zeros() {
                body.reset_forces(false);
            }
        }
    }

    /// Insert a body together with its single collider
    pub fn insert_body(&mut self, body: RigidBody, collider: Collider, meta: BodyMeta) -> RigidBodyHandle {
        let handle = self.rigid_body_set.insert(body);
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        self.body_meta.insert(handle, meta);
        handle
    }

    /// Remove a rigid body and all its attached colliders.
    /// Returns false if the body was not in the world.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        self.body_meta.remove(&handle);
        self.rigid_body_set
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true, // remove attached colliders
            )
            .is_some()
    }

    /// Check if a body is part of the world
    pub fn contains(&self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set.contains(handle)
    }

    /// Get a reference to a rigid body
    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    /// Get a mutable reference to a rigid body
    pub fn get_rigid_body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }

    /// Iterate over every body in the world
    pub fn bodies(&self) -> impl Iterator<Item = (RigidBodyHandle, &RigidBody)> {
        self.rigid_body_set.iter()
    }

    /// Number of bodies in the world, boundaries included
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Current position of a body
    pub fn translation(&self, handle: RigidBodyHandle) -> Option<Vec2> {
        self.get_rigid_body(handle)
            .map(|body| from_vector(body.translation()))
    }

    /// Label and render hints of a body
    pub fn body_meta(&self, handle: RigidBodyHandle) -> Option<&BodyMeta> {
        self.body_meta.get(&handle)
    }

    /// Mutable label and render hints of a body
    pub fn body_meta_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut BodyMeta> {
        self.body_meta.get_mut(&handle)
    }

    /// Find the first body carrying `label`
    pub fn find_by_label(&self, label: &str) -> Option<RigidBodyHandle> {
        self.body_meta
            .iter()
            .find(|(_, meta)| meta.label == label)
            .map(|(handle, _)| *handle)
    }

    /// Replace the shape of a body's collider (used when boundaries resize)
    pub fn set_shape(&mut self, handle: RigidBodyHandle, shape: SharedShape) -> bool {
        let Some(&collider_handle) = self
            .rigid_body_set
            .get(handle)
            .and_then(|body| body.colliders().first())
        else {
            return false;
        };

        match self.collider_set.get_mut(collider_handle) {
            Some(collider) => {
                collider.set_shape(shape);
                true
            }
            None => false,
        }
    }

    /// World-space geometry of a body
    pub fn outline(&self, handle: RigidBodyHandle) -> Option<BodyOutline> {
        let body = self.rigid_body_set.get(handle)?;
        let collider = body
            .colliders()
            .first()
            .and_then(|h| self.collider_set.get(*h))?;
        body_outline(body, collider)
    }

    /// Drop every body, collider and joint
    pub fn clear(&mut self) {
        self.island_manager = IslandManager::new();
        self.broad_phase = DefaultBroadPhase::new();
        self.narrow_phase = NarrowPhase::new();
        self.impulse_joint_set = ImpulseJointSet::new();
        self.multibody_joint_set = MultibodyJointSet::new();
        self.ccd_solver = CCDSolver::new();
        self.rigid_body_set = RigidBodySet::new();
        self.collider_set = ColliderSet::new();
        self.body_meta.clear();
    }

    /// Set the timestep for physics simulation
    pub fn set_timestep(&mut self, dt: Real) {
        self.integration_parameters.dt = dt;
    }

    /// Get the current timestep
    pub fn timestep(&self) -> Real {
        self.integration_parameters.dt
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
