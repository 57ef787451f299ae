// Direct manipulation: hit-testing, dragging, drawing, erasing, explosions

use glam::Vec2;
use log::{debug, warn};
use rand::Rng;

use super::shapes::{ShapeGeometry, DRAW_POLYGON_SIDES};
use super::{DrawShape, EngineError, ShapePreview, SimulationEngine};
use crate::core::math::proximity_falloff;
use crate::engine::input::Tool;
use crate::engine::physics::body::presets;
use crate::engine::physics::{
    from_vector, to_vector, BodyMeta, PhysicsWorld, RigidBodyHandle, RigidBodyType,
};
use crate::engine::renderer::{Effect, RenderHints};

/// Share of the pointer offset a dragged body covers per step
const DRAG_VELOCITY_GAIN: f32 = 0.05;

/// Push every movable body within `radius` of `center` away from it.
/// The force falls off linearly to zero at the radius. Returns how many
/// bodies were pushed.
fn push_outward(world: &mut PhysicsWorld, center: Vec2, radius: f32, magnitude: f32) -> usize {
    let pushes: Vec<(RigidBodyHandle, Vec2)> = world
        .bodies()
        .filter(|(_, body)| !body.is_fixed())
        .filter_map(|(handle, body)| {
            let offset = from_vector(body.translation()) - center;
            let falloff = proximity_falloff(offset.length(), radius);
            if falloff <= 0.0 {
                return None;
            }
            // A body sitting exactly on the center gets thrown upward
            let direction = offset.try_normalize().unwrap_or(Vec2::NEG_Y);
            Some((handle, direction * magnitude * falloff))
        })
        .collect();

    for (handle, force) in &pushes {
        if let Some(body) = world.get_rigid_body_mut(*handle) {
            body.add_force(to_vector(*force), true);
        }
    }
    pushes.len()
}

impl SimulationEngine {
    /// Topmost body under `point`: drawn and pooled bodies first, then any
    /// other movable body. Boundaries are never hit.
    pub fn get_body_at_point(&self, point: Vec2) -> Result<Option<RigidBodyHandle>, EngineError> {
        let rt = self.runtime()?;
        let hits = |handle: &RigidBodyHandle| {
            rt.world
                .outline(*handle)
                .is_some_and(|outline| outline.contains(point))
        };

        if let Some(handle) = rt.dynamic_bodies.iter().rev().find(|h| hits(*h)) {
            return Ok(Some(*handle));
        }

        let other = rt
            .world
            .bodies()
            .filter(|(handle, body)| !body.is_fixed() && !rt.dynamic_bodies.contains(handle))
            .map(|(handle, _)| handle)
            .find(|handle| hits(handle));
        Ok(other)
    }

    /// Drag a body toward `position`.
    ///
    /// The body is placed at `position` and given the velocity that covers a
    /// twentieth of the offset per step, so it keeps momentum when released.
    /// Boundaries and bodies that no longer exist are ignored.
    pub fn move_body(&mut self, handle: RigidBodyHandle, position: Vec2) -> Result<(), EngineError> {
        let rt = self.runtime.as_mut().ok_or(EngineError::NotInitialized)?;
        if rt.is_boundary(handle) {
            return Ok(());
        }

        let dt = rt.world.timestep();
        let Some(body) = rt.world.get_rigid_body_mut(handle) else {
            return Ok(());
        };

        let offset = position - from_vector(body.translation());
        if !body.is_dynamic() {
            body.set_body_type(RigidBodyType::Dynamic, true);
        }
        body.set_linvel(to_vector(offset * DRAG_VELOCITY_GAIN / dt), true);
        body.set_translation(to_vector(position), true);
        body.wake_up(true);
        Ok(())
    }

    /// Toggle a rendering effect on a body. Unknown bodies are ignored.
    pub fn set_body_effect(
        &mut self,
        handle: RigidBodyHandle,
        effect: Effect,
        active: bool,
    ) -> Result<(), EngineError> {
        let rt = self.runtime.as_mut().ok_or(EngineError::NotInitialized)?;
        if let Some(meta) = rt.world.body_meta_mut(handle) {
            meta.hints.set_effect(effect, active);
        }
        Ok(())
    }

    /// Commit a circle drawn from `start` (center) to `end` (rim)
    pub fn create_circle(&mut self, start: Vec2, end: Vec2) -> Result<RigidBodyHandle, EngineError> {
        self.create_drawn(DrawShape::Circle, start, end)
    }

    /// Commit a box spanned by the drag rectangle
    pub fn create_box(&mut self, start: Vec2, end: Vec2) -> Result<RigidBodyHandle, EngineError> {
        self.create_drawn(DrawShape::Box, start, end)
    }

    /// Commit a regular polygon centered on `start`
    pub fn create_polygon(&mut self, start: Vec2, end: Vec2) -> Result<RigidBodyHandle, EngineError> {
        self.create_drawn(DrawShape::Polygon, start, end)
    }

    /// Commit a thin bar from `start` toward `end`
    pub fn create_line(&mut self, start: Vec2, end: Vec2) -> Result<RigidBodyHandle, EngineError> {
        self.create_drawn(DrawShape::Line, start, end)
    }

    fn create_drawn(&mut self, shape: DrawShape, start: Vec2, end: Vec2) -> Result<RigidBodyHandle, EngineError> {
        let limits = self.size_limits();
        let rt = self.runtime.as_mut().ok_or(EngineError::NotInitialized)?;

        let geometry = ShapeGeometry::from_drag(shape, start, end, &limits, rt.polygon_sides);
        let material = self.config.material();
        let collider = presets::dynamic_collider(&geometry.shape, &material)
            .ok_or(EngineError::DegenerateShape)?;
        let body = presets::dynamic_body(
            geometry.position,
            geometry.angle,
            &material,
            self.config.sleeping_enabled,
        );
        let fill = self.config.palette[self.rng.random_range(0..self.config.palette.len())];

        let handle = rt
            .world
            .insert_body(body, collider, BodyMeta::new(shape.name(), RenderHints::filled(fill)));
        rt.dynamic_bodies.push(handle);

        if shape == DrawShape::Polygon {
            rt.polygon_sides = self.rng.random_range(DRAW_POLYGON_SIDES);
        }

        debug!("Drew {} at {}", shape.name(), geometry.position);
        Ok(handle)
    }

    /// Preview of what committing the drag with `tool` would create.
    /// Tools that do not draw have no preview.
    pub fn create_shape_preview(
        &self,
        tool: Tool,
        start: Vec2,
        end: Vec2,
    ) -> Result<Option<ShapePreview>, EngineError> {
        let rt = self.runtime()?;
        let Some(shape) = tool.draw_shape() else {
            return Ok(None);
        };
        let geometry = ShapeGeometry::from_drag(shape, start, end, &self.size_limits(), rt.polygon_sides);
        Ok(Some(ShapePreview::new(shape, geometry)))
    }

    /// Remove a body and nudge its neighbors outward.
    ///
    /// Pooled owners are freed and a drag holding the body is dropped.
    /// Boundaries and bodies that are already gone are left alone.
    pub fn destroy_body(&mut self, handle: RigidBodyHandle) -> Result<(), EngineError> {
        let rt = self.runtime.as_mut().ok_or(EngineError::NotInitialized)?;
        if rt.is_boundary(handle) {
            warn!("Refusing to destroy boundary body {handle:?}");
            return Ok(());
        }

        let position = rt.world.translation(handle);
        let tracked = rt.dynamic_bodies.contains(&handle);

        rt.dynamic_bodies.retain(|body| *body != handle);
        if let Some(slot) = rt
            .active_objects
            .iter()
            .copied()
            .find(|slot| rt.pool[*slot].body_handle() == Some(handle))
        {
            rt.pool[slot].deactivate();
            rt.active_objects.retain(|active| *active != slot);
        }
        if rt.interacting == Some(handle) {
            rt.interacting = None;
        }

        if !rt.world.remove_body(handle) {
            if tracked {
                warn!("Tracked body {handle:?} was missing from the world");
            } else {
                debug!("Body {handle:?} already gone");
            }
            return Ok(());
        }

        if let Some(position) = position {
            let pushed = push_outward(
                &mut rt.world,
                position,
                self.config.neighbor_radius,
                self.config.neighbor_force,
            );
            debug!("Destroyed body at {position}, nudged {pushed} neighbors");
        }
        Ok(())
    }

    /// Push bodies away from `position`. Returns how many were affected.
    pub fn apply_explosion_force(
        &mut self,
        position: Vec2,
        magnitude: f32,
        radius: f32,
    ) -> Result<usize, EngineError> {
        let rt = self.runtime.as_mut().ok_or(EngineError::NotInitialized)?;
        let affected = push_outward(&mut rt.world, position, radius, magnitude);
        debug!("Explosion at {position} affected {affected} bodies");
        Ok(affected)
    }
}
