// Spawning and recycling of pooled objects

use glam::Vec2;
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::Rng;

use super::engine::Runtime;
use super::pooled::SpawnContext;
use super::{EngineError, PooledObject, ShapeKind, SimulationEngine};

/// Pick a kind from a weighted table. Zero weights are never picked.
pub(super) fn pick_weighted(table: &[(ShapeKind, u32)], rng: &mut StdRng) -> Option<ShapeKind> {
    let total: u32 = table.iter().map(|(_, weight)| weight).sum();
    if total == 0 {
        return None;
    }

    let drawn = rng.random_range(0.0..f64::from(total));
    let mut cumulative = 0u32;
    let mut last = None;
    for (kind, weight) in table.iter().filter(|(_, weight)| *weight > 0) {
        cumulative += weight;
        if f64::from(cumulative) >= drawn {
            return Some(*kind);
        }
        last = Some(*kind);
    }
    last
}

impl Runtime {
    /// First inactive pool slot
    fn free_slot(&self) -> Option<usize> {
        self.pool.iter().position(|slot| !slot.is_active())
    }

    /// Retire the active object with the earliest creation time
    pub(super) fn recycle_oldest(&mut self) -> Option<usize> {
        let oldest = self
            .active_objects
            .iter()
            .copied()
            .min_by_key(|slot| self.pool[*slot].created_at_ms())?;
        self.retire(oldest);
        Some(oldest)
    }

    /// Retire every active object that left the view by more than `buffer`,
    /// or whose body is gone from the world
    pub(super) fn recycle_offscreen(&mut self, buffer: f32) -> usize {
        let bounds = self.view.expand(buffer);
        let lost: Vec<usize> = self
            .active_objects
            .iter()
            .copied()
            .filter(|slot| {
                self.pool[*slot]
                    .position(&self.world)
                    .map_or(true, |position| !bounds.contains(position))
            })
            .collect();

        for slot in &lost {
            self.retire(*slot);
        }
        lost.len()
    }
}

impl SimulationEngine {
    /// Spawn a pooled object at `point`.
    ///
    /// Returns `Ok(None)` when the call is throttled by the spawn interval.
    /// At the body ceiling the oldest object is recycled first; when the pool
    /// has no free slot the oldest object's slot is reused.
    pub fn spawn_object_at_point(&mut self, point: Vec2) -> Result<Option<&PooledObject>, EngineError> {
        let now = self.clock.now_ms();
        let rt = self.runtime.as_mut().ok_or(EngineError::NotInitialized)?;

        if let Some(last) = rt.last_spawn_at_ms {
            if now.saturating_sub(last) < self.config.spawn_interval_ms {
                trace!("Spawn at {point} throttled");
                return Ok(None);
            }
        }

        if rt.active_objects.len() >= self.config.max_bodies {
            rt.recycle_oldest();
        }

        let kind = pick_weighted(&self.config.object_types, &mut self.rng).ok_or_else(|| {
            EngineError::InvalidConfig("object_types has no positive weight".to_string())
        })?;

        let slot = match rt.free_slot() {
            Some(slot) => slot,
            None => rt
                .recycle_oldest()
                .ok_or_else(|| EngineError::InvalidConfig("pool is empty".to_string()))?,
        };

        self.next_object_id += 1;
        let ctx = SpawnContext {
            config: &self.config,
            rng: &mut self.rng,
            id: self.next_object_id,
            now_ms: now,
        };
        let handle = rt.pool[slot]
            .init(&mut rt.world, kind, point, ctx)?
            .body_handle()
            .ok_or(EngineError::BodyNotFound)?;

        rt.dynamic_bodies.push(handle);
        rt.active_objects.push(slot);
        rt.last_spawn_at_ms = Some(now);

        debug!(
            "Spawned {} #{} in slot {} ({} active)",
            kind.name(),
            self.next_object_id,
            slot,
            rt.active_objects.len()
        );
        Ok(Some(&rt.pool[slot]))
    }

    /// Recycle the oldest active object. Returns the freed slot, or `None`
    /// when nothing is active.
    pub fn recycle_oldest_object(&mut self) -> Result<Option<&PooledObject>, EngineError> {
        let rt = self.runtime.as_mut().ok_or(EngineError::NotInitialized)?;
        let slot = rt.recycle_oldest();
        if let Some(slot) = slot {
            debug!("Recycled oldest object in slot {slot}");
        }
        Ok(slot.map(|slot| &rt.pool[slot]))
    }

    /// Recycle every active object that drifted past the offscreen buffer.
    /// Returns how many were recycled.
    pub fn recycle_offscreen_bodies(&mut self) -> Result<usize, EngineError> {
        let buffer = self.config.offscreen_buffer;
        let rt = self.runtime.as_mut().ok_or(EngineError::NotInitialized)?;
        Ok(rt.recycle_offscreen(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::{to_vector, RigidBodyHandle};
    use crate::playground::engine::tests::test_engine;
    use crate::playground::PlaygroundConfig;
    use rand::SeedableRng;

    /// Every active object owns a live body listed in dynamic_bodies
    fn assert_bookkeeping(engine: &SimulationEngine) {
        let config = engine.config();
        assert!(engine.get_active_object_count() <= config.max_bodies);
        assert!(engine.get_active_object_count() <= config.pool_size);
        for object in engine.active_objects() {
            let handle = object.body_handle().expect("active object owns a body");
            assert!(engine.contains_body(handle));
            assert!(engine.dynamic_bodies().contains(&handle));
        }
        let active_slots: Vec<usize> = engine.active_objects().map(|o| o.slot()).collect();
        for slot in engine.pool() {
            assert_eq!(slot.is_active(), active_slots.contains(&slot.slot()));
        }
    }

    /// Teleport a body well past the 100px buffer below the view
    fn push_below_view(engine: &mut SimulationEngine, handle: RigidBodyHandle) {
        engine
            .world_mut()
            .and_then(|world| world.get_rigid_body_mut(handle))
            .expect("body")
            .set_translation(to_vector(Vec2::new(400.0, 900.0)), true);
    }

    #[test]
    fn test_pick_weighted_respects_zero_weights() {
        let mut rng = StdRng::seed_from_u64(1);
        let table = [(ShapeKind::Circle, 0), (ShapeKind::Box, 5), (ShapeKind::Polygon, 0)];
        for _ in 0..200 {
            assert_eq!(pick_weighted(&table, &mut rng), Some(ShapeKind::Box));
        }
        assert_eq!(pick_weighted(&[(ShapeKind::Circle, 0)], &mut rng), None);
    }

    #[test]
    fn test_pick_weighted_follows_distribution() {
        let mut rng = StdRng::seed_from_u64(2);
        let table = [(ShapeKind::Circle, 3), (ShapeKind::Box, 1)];
        let circles = (0..4_000)
            .filter(|_| pick_weighted(&table, &mut rng) == Some(ShapeKind::Circle))
            .count();
        assert!((2_700..3_300).contains(&circles), "got {circles} circles");
    }

    #[test]
    fn test_spawn_rate_limited() {
        let config = PlaygroundConfig::default().with_spawn_interval_ms(50);
        let (mut engine, clock) = test_engine(config);
        let point = Vec2::new(200.0, 200.0);

        assert!(engine.spawn_object_at_point(point).expect("spawn").is_some());
        clock.advance(10);
        assert!(engine.spawn_object_at_point(point).expect("spawn").is_none());
        clock.advance(40);
        assert!(engine.spawn_object_at_point(point).expect("spawn").is_some());

        assert_eq!(engine.get_active_object_count(), 2);
    }

    #[test]
    fn test_single_body_ceiling_replaces_object() {
        let config = PlaygroundConfig::default().with_max_bodies(1);
        let interval = config.spawn_interval_ms;
        let (mut engine, clock) = test_engine(config);

        let first = engine
            .spawn_object_at_point(Vec2::new(100.0, 100.0))
            .expect("spawn")
            .map(|object| (object.id(), object.body_handle()))
            .expect("not throttled");
        clock.advance(interval);
        let second = engine
            .spawn_object_at_point(Vec2::new(200.0, 200.0))
            .expect("spawn")
            .map(|object| (object.id(), object.body_handle()))
            .expect("not throttled");

        assert_eq!(engine.get_active_object_count(), 1);
        assert_ne!(first.0, second.0);
        let position = second
            .1
            .and_then(|handle| engine.body_position(handle))
            .expect("second body");
        assert!(position.distance(Vec2::new(200.0, 200.0)) < 1.0);

        let stale = first.1.expect("first body");
        assert!(!engine.contains_body(stale));
        assert!(!engine.dynamic_bodies().contains(&stale));
        assert_bookkeeping(&engine);
    }

    #[test]
    fn test_eviction_is_fifo() {
        let config = PlaygroundConfig::default().with_max_bodies(3);
        let interval = config.spawn_interval_ms;
        let (mut engine, clock) = test_engine(config);

        let mut ids = Vec::new();
        for i in 0..4 {
            clock.advance(interval);
            let id = engine
                .spawn_object_at_point(Vec2::new(100.0 + 80.0 * i as f32, 100.0))
                .expect("spawn")
                .map(|object| object.id())
                .expect("not throttled");
            ids.push(id);
        }

        let mut alive: Vec<u64> = engine.active_objects().map(|object| object.id()).collect();
        alive.sort_unstable();
        assert_eq!(alive, ids[1..].to_vec());
        assert_bookkeeping(&engine);
    }

    #[test]
    fn test_small_pool_recycles_oldest_slot() {
        let config = PlaygroundConfig::default()
            .with_pool_size(2)
            .with_max_bodies(10)
            .with_spawn_interval_ms(0);
        let (mut engine, clock) = test_engine(config);

        for _ in 0..4 {
            clock.advance(1);
            engine
                .spawn_object_at_point(Vec2::new(400.0, 300.0))
                .expect("spawn");
        }

        assert_eq!(engine.get_active_object_count(), 2);
        assert_eq!(engine.dynamic_bodies().len(), 2);
        assert_bookkeeping(&engine);
    }

    #[test]
    fn test_recycle_oldest_on_empty_engine() {
        let (mut engine, _clock) = test_engine(PlaygroundConfig::default());
        assert!(engine.recycle_oldest_object().expect("initialized").is_none());
    }

    #[test]
    fn test_recycle_offscreen_bodies() {
        let config = PlaygroundConfig::default().with_spawn_interval_ms(0);
        let (mut engine, clock) = test_engine(config);

        engine
            .spawn_object_at_point(Vec2::new(400.0, 300.0))
            .expect("spawn");
        clock.advance(1);
        let lost = engine
            .spawn_object_at_point(Vec2::new(400.0, 300.0))
            .expect("spawn")
            .and_then(|object| object.body_handle())
            .expect("body");

        push_below_view(&mut engine, lost);

        assert_eq!(engine.recycle_offscreen_bodies(), Ok(1));
        assert_eq!(engine.get_active_object_count(), 1);
        assert!(!engine.contains_body(lost));
        assert_bookkeeping(&engine);
    }

    #[test]
    fn test_step_recycles_offscreen_body() {
        let config = PlaygroundConfig::default().with_spawn_interval_ms(0);
        let (mut engine, clock) = test_engine(config);

        let kept = engine
            .spawn_object_at_point(Vec2::new(400.0, 300.0))
            .expect("spawn")
            .map(|object| object.slot())
            .expect("not throttled");
        clock.advance(1);
        let (slot, lost) = engine
            .spawn_object_at_point(Vec2::new(200.0, 300.0))
            .expect("spawn")
            .and_then(|object| Some((object.slot(), object.body_handle()?)))
            .expect("body");

        push_below_view(&mut engine, lost);
        engine.step().expect("step");

        assert!(!engine.pool()[slot].is_active());
        assert!(engine.pool()[kept].is_active());
        assert_eq!(engine.get_active_object_count(), 1);
        assert!(!engine.contains_body(lost));
        assert!(!engine.dynamic_bodies().contains(&lost));
        assert_bookkeeping(&engine);
    }

    #[test]
    fn test_step_sweeps_bodies_removed_behind_our_back() {
        let (mut engine, _clock) = test_engine(PlaygroundConfig::default());
        let handle = engine
            .spawn_object_at_point(Vec2::new(400.0, 300.0))
            .expect("spawn")
            .and_then(|object| object.body_handle())
            .expect("body");

        if let Some(world) = engine.world_mut() {
            world.remove_body(handle);
        }
        engine.step().expect("step");

        assert_eq!(engine.get_active_object_count(), 0);
        assert!(engine.dynamic_bodies().is_empty());
    }

    #[test]
    fn test_long_spawn_run_keeps_bookkeeping() {
        let config = PlaygroundConfig::default()
            .with_max_bodies(20)
            .with_pool_size(25)
            .with_spawn_interval_ms(0);
        let (mut engine, clock) = test_engine(config);

        for i in 0..200 {
            clock.advance(1);
            let x = 50.0 + (i % 14) as f32 * 50.0;
            engine
                .spawn_object_at_point(Vec2::new(x, 100.0))
                .expect("spawn");
            if i % 5 == 0 {
                engine.step().expect("step");
            }
            assert_bookkeeping(&engine);
        }
        assert!(engine.get_active_object_count() > 0);
    }

    #[test]
    fn test_spawn_before_init_fails() {
        let mut engine = SimulationEngine::new(PlaygroundConfig::default());
        assert!(matches!(
            engine.spawn_object_at_point(Vec2::ZERO),
            Err(EngineError::NotInitialized)
        ));
    }
}
