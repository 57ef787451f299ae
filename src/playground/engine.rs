// Simulation engine - owns the world, the pool and the step loop

use glam::Vec2;
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rapier2d::prelude::SharedShape;
use std::time::Duration;

use super::shapes::{SizeLimits, DRAW_POLYGON_SIDES};
use super::{EngineError, PlaygroundConfig, PooledObject};
use crate::engine::clock::{Clock, MonotonicClock};
use crate::engine::physics::body::presets;
use crate::engine::physics::{to_vector, BodyMeta, BodyOutline, PhysicsWorld, RigidBodyHandle};
use crate::engine::renderer::{rgb, Frame, RenderHints, RenderSurface, Viewport};
use crate::engine::step_loop::{StepLoop, FIXED_TIMESTEP};

/// Labels of the three static boundary bodies
pub const BOUNDARY_LABELS: [&str; 3] = ["ground", "leftWall", "rightWall"];

/// Thickness of ground and walls
const BOUNDARY_THICKNESS: f32 = 60.0;

/// How far the ground reaches past each side of the view
const GROUND_OVERHANG: f32 = 100.0;

/// Engine events a callback can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineEvent {
    /// Fired right before the world integrates a step
    BeforeUpdate,
    /// Fired after the step and the offscreen sweep
    AfterUpdate,
}

/// Passed to step callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepInfo {
    pub step: u64,
    pub timestamp_ms: u64,
    pub active_objects: usize,
}

type StepCallback = Box<dyn FnMut(&StepInfo)>;

/// Handles of ground and walls
#[derive(Debug, Clone, Copy)]
pub(super) struct Boundaries {
    ground: RigidBodyHandle,
    left_wall: RigidBodyHandle,
    right_wall: RigidBodyHandle,
}

impl Boundaries {
    pub(super) fn contains(&self, handle: RigidBodyHandle) -> bool {
        [self.ground, self.left_wall, self.right_wall].contains(&handle)
    }
}

/// Center and full size of each boundary for a `width` x `height` view,
/// in `BOUNDARY_LABELS` order
fn boundary_layout(width: f32, height: f32) -> [(Vec2, Vec2); 3] {
    let half = BOUNDARY_THICKNESS / 2.0;
    [
        (
            Vec2::new(width / 2.0, height + half),
            Vec2::new(width + GROUND_OVERHANG * 2.0, BOUNDARY_THICKNESS),
        ),
        (
            Vec2::new(-half, height / 2.0),
            Vec2::new(BOUNDARY_THICKNESS, height * 2.0),
        ),
        (
            Vec2::new(width + half, height / 2.0),
            Vec2::new(BOUNDARY_THICKNESS, height * 2.0),
        ),
    ]
}

/// State that only exists between `init()` and `destroy()`
pub(super) struct Runtime {
    pub(super) world: PhysicsWorld,
    pub(super) step_loop: StepLoop,
    pub(super) view: Viewport,
    pub(super) pixel_ratio: f32,
    pub(super) boundaries: Option<Boundaries>,
    /// Mirrors world membership of every non-boundary body we created
    pub(super) dynamic_bodies: Vec<RigidBodyHandle>,
    pub(super) pool: Vec<PooledObject>,
    /// Pool slots in spawn order
    pub(super) active_objects: Vec<usize>,
    pub(super) last_spawn_at_ms: Option<u64>,
    /// Body currently held by a drag; cleared when the body goes away
    pub(super) interacting: Option<RigidBodyHandle>,
    /// Side count the next drawn polygon (and its preview) uses
    pub(super) polygon_sides: u8,
    pub(super) step_index: u64,
}

impl Runtime {
    pub(super) fn is_boundary(&self, handle: RigidBodyHandle) -> bool {
        self.boundaries.is_some_and(|b| b.contains(handle))
    }

    /// Remove a pooled object's body from the world and free its slot
    pub(super) fn retire(&mut self, slot: usize) {
        if let Some(handle) = self.pool[slot].body_handle() {
            self.world.remove_body(handle);
            self.dynamic_bodies.retain(|body| *body != handle);
            if self.interacting == Some(handle) {
                self.interacting = None;
            }
        }
        self.pool[slot].deactivate();
        self.active_objects.retain(|active| *active != slot);
    }
}

/// The physics interaction engine.
///
/// Construct it, call [`SimulationEngine::init`] once, then drive it with
/// [`SimulationEngine::tick`] and the tool operations. Everything runs on the
/// caller's thread; there is no internal locking.
pub struct SimulationEngine {
    pub(super) config: PlaygroundConfig,
    pub(super) clock: Box<dyn Clock>,
    pub(super) rng: StdRng,
    pub(super) next_object_id: u64,
    pub(super) runtime: Option<Runtime>,
    before_update: Option<StepCallback>,
    after_update: Option<StepCallback>,
}

impl SimulationEngine {
    /// Create an engine on the wall clock with OS-seeded randomness
    pub fn new(config: PlaygroundConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new(), StdRng::from_os_rng())
    }

    /// Create an engine with an explicit clock and random source
    pub fn with_clock(config: PlaygroundConfig, clock: impl Clock + 'static, rng: StdRng) -> Self {
        Self {
            config,
            clock: Box::new(clock),
            rng,
            next_object_id: 0,
            runtime: None,
            before_update: None,
            after_update: None,
        }
    }

    /// Create the world, size it to the surface, allocate the pool and start
    /// the step loop. Calling it again before `destroy()` is an error.
    pub fn init(&mut self, surface: &dyn RenderSurface) -> Result<(), EngineError> {
        if self.runtime.is_some() {
            return Err(EngineError::AlreadyInitialized);
        }
        self.config.validate()?;

        let size = surface.size();
        let mut world = PhysicsWorld::with_gravity(self.config.gravity_vector());
        world.set_timestep(FIXED_TIMESTEP);

        let mut step_loop = StepLoop::new();
        step_loop.start();

        self.runtime = Some(Runtime {
            world,
            step_loop,
            view: Viewport::from_size(size.x, size.y),
            pixel_ratio: surface.pixel_ratio() * self.config.pixel_ratio,
            boundaries: None,
            dynamic_bodies: Vec::new(),
            pool: (0..self.config.pool_size).map(PooledObject::new).collect(),
            active_objects: Vec::with_capacity(self.config.max_bodies),
            last_spawn_at_ms: None,
            interacting: None,
            polygon_sides: self.rng.random_range(DRAW_POLYGON_SIDES),
            step_index: 0,
        });

        info!(
            "Simulation engine initialized: {}x{}, pool of {}, max {} bodies",
            size.x, size.y, self.config.pool_size, self.config.max_bodies
        );
        Ok(())
    }

    /// Whether `init()` has run (and `destroy()` has not)
    pub fn is_initialized(&self) -> bool {
        self.runtime.is_some()
    }

    /// Create ground and side walls for the current view.
    /// Calling it again replaces the previous boundaries.
    pub fn create_bodies(&mut self) -> Result<(), EngineError> {
        let rt = self.runtime.as_mut().ok_or(EngineError::NotInitialized)?;

        if let Some(old) = rt.boundaries.take() {
            for handle in [old.ground, old.left_wall, old.right_wall] {
                rt.world.remove_body(handle);
            }
        }

        let hints = RenderHints::filled(rgb(0x2d3436));
        let layout = boundary_layout(rt.view.width(), rt.view.height());
        let mut handles = [RigidBodyHandle::invalid(); 3];
        for (i, (center, size)) in layout.into_iter().enumerate() {
            handles[i] = rt.world.insert_body(
                presets::boundary_body(center),
                presets::boundary_collider(size.x, size.y),
                BodyMeta::new(BOUNDARY_LABELS[i], hints),
            );
        }

        rt.boundaries = Some(Boundaries {
            ground: handles[0],
            left_wall: handles[1],
            right_wall: handles[2],
        });
        debug!("Boundaries created");
        Ok(())
    }

    /// Resize the view and move ground and walls to the new edges
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), EngineError> {
        let rt = self.runtime.as_mut().ok_or(EngineError::NotInitialized)?;

        if let Some(bounds) = rt.boundaries {
            let layout = boundary_layout(width, height);
            let handles = [bounds.ground, bounds.left_wall, bounds.right_wall];
            for (handle, (center, size)) in handles.into_iter().zip(layout) {
                if let Some(body) = rt.world.get_rigid_body_mut(handle) {
                    body.set_translation(to_vector(center), true);
                }
                rt.world
                    .set_shape(handle, SharedShape::cuboid(size.x / 2.0, size.y / 2.0));
            }
        }

        rt.view = Viewport::from_size(width, height);
        info!("Resized to {}x{}", width, height);
        Ok(())
    }

    /// Tear everything down. Safe to call any number of times.
    pub fn destroy(&mut self) {
        self.before_update = None;
        self.after_update = None;

        let Some(mut rt) = self.runtime.take() else {
            return;
        };

        rt.step_loop.stop();
        rt.world.clear();
        rt.pool.clear();
        rt.active_objects.clear();
        rt.dynamic_bodies.clear();
        rt.interacting = None;
        info!("Simulation engine destroyed after {} steps", rt.step_index);
    }

    /// Attach a callback to an engine event, replacing any previous one
    pub fn on(&mut self, event: EngineEvent, callback: impl FnMut(&StepInfo) + 'static) {
        let slot = match event {
            EngineEvent::BeforeUpdate => &mut self.before_update,
            EngineEvent::AfterUpdate => &mut self.after_update,
        };
        *slot = Some(Box::new(callback));
    }

    /// Detach the callback of an event
    pub fn off(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::BeforeUpdate => self.before_update = None,
            EngineEvent::AfterUpdate => self.after_update = None,
        }
    }

    /// Feed elapsed frame time to the step loop and run every step that is due
    pub fn tick(&mut self, frame_time: Duration) -> Result<u32, EngineError> {
        let rt = self.runtime.as_mut().ok_or(EngineError::NotInitialized)?;
        let steps = rt.step_loop.advance(frame_time);
        for _ in 0..steps {
            self.step()?;
        }
        Ok(steps)
    }

    /// Run exactly one simulation step, sweeping lost bodies afterwards
    pub fn step(&mut self) -> Result<(), EngineError> {
        let now = self.clock.now_ms();
        let buffer = self.config.offscreen_buffer;
        let rt = self.runtime.as_mut().ok_or(EngineError::NotInitialized)?;

        rt.step_index += 1;
        let mut info = StepInfo {
            step: rt.step_index,
            timestamp_ms: now,
            active_objects: rt.active_objects.len(),
        };
        if let Some(callback) = self.before_update.as_mut() {
            callback(&info);
        }

        rt.world.step();
        rt.world.reset_forces();

        let recycled = rt.recycle_offscreen(buffer);
        if recycled > 0 {
            trace!("Step {}: recycled {} offscreen objects", rt.step_index, recycled);
        }

        info.active_objects = rt.active_objects.len();
        if let Some(callback) = self.after_update.as_mut() {
            callback(&info);
        }
        Ok(())
    }

    /// Extract the current frame and hand it to the surface.
    /// Does nothing before `init()` or after `destroy()`.
    pub fn render(&self, surface: &mut dyn RenderSurface) {
        if let Some(rt) = &self.runtime {
            surface.present(&Frame::extract(&rt.world, rt.view, rt.pixel_ratio));
        }
    }

    pub(super) fn runtime(&self) -> Result<&Runtime, EngineError> {
        self.runtime.as_ref().ok_or(EngineError::NotInitialized)
    }

    pub(super) fn size_limits(&self) -> SizeLimits {
        SizeLimits {
            min_size: self.config.min_size,
            max_size: self.config.max_size,
            line_thickness: self.config.line_thickness,
        }
    }

    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    /// Number of live pooled objects
    pub fn get_active_object_count(&self) -> usize {
        self.runtime
            .as_ref()
            .map_or(0, |rt| rt.active_objects.len())
    }

    /// Live pooled objects, oldest first
    pub fn active_objects(&self) -> impl Iterator<Item = &PooledObject> + '_ {
        self.runtime.iter().flat_map(|rt| {
            rt.active_objects
                .iter()
                .map(move |slot| &rt.pool[*slot])
        })
    }

    /// Every pool slot, active or not
    pub fn pool(&self) -> &[PooledObject] {
        self.runtime
            .as_ref()
            .map(|rt| rt.pool.as_slice())
            .unwrap_or_default()
    }

    /// Non-boundary bodies the engine created, pooled and drawn
    pub fn dynamic_bodies(&self) -> &[RigidBodyHandle] {
        self.runtime
            .as_ref()
            .map(|rt| rt.dynamic_bodies.as_slice())
            .unwrap_or_default()
    }

    pub fn contains_body(&self, handle: RigidBodyHandle) -> bool {
        self.runtime
            .as_ref()
            .is_some_and(|rt| rt.world.contains(handle))
    }

    pub fn body_position(&self, handle: RigidBodyHandle) -> Option<Vec2> {
        self.runtime.as_ref()?.world.translation(handle)
    }

    /// World-space geometry of a body
    pub fn body_outline(&self, handle: RigidBodyHandle) -> Option<BodyOutline> {
        self.runtime.as_ref()?.world.outline(handle)
    }

    pub fn find_body_by_label(&self, label: &str) -> Option<RigidBodyHandle> {
        self.runtime.as_ref()?.world.find_by_label(label)
    }

    pub fn view(&self) -> Option<Viewport> {
        self.runtime.as_ref().map(|rt| rt.view)
    }

    pub fn world(&self) -> Option<&PhysicsWorld> {
        self.runtime.as_ref().map(|rt| &rt.world)
    }

    pub fn world_mut(&mut self) -> Option<&mut PhysicsWorld> {
        self.runtime.as_mut().map(|rt| &mut rt.world)
    }

    /// Remember the body a drag is holding
    pub fn set_interacting(&mut self, body: Option<RigidBodyHandle>) {
        if let Some(rt) = self.runtime.as_mut() {
            rt.interacting = body;
        }
    }

    /// Body a drag is holding, if it still exists
    pub fn interacting_body(&self) -> Option<RigidBodyHandle> {
        self.runtime.as_ref()?.interacting
    }
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::engine::clock::ManualClock;
    use crate::engine::renderer::Primitive;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Headless surface that records what it was asked to paint
    #[derive(Default)]
    pub struct RecordingSurface {
        pub size: Vec2,
        pub frames: Vec<Frame>,
    }

    impl RecordingSurface {
        pub fn sized(width: f32, height: f32) -> Self {
            Self {
                size: Vec2::new(width, height),
                frames: Vec::new(),
            }
        }
    }

    impl RenderSurface for RecordingSurface {
        fn size(&self) -> Vec2 {
            self.size
        }

        fn present(&mut self, frame: &Frame) {
            self.frames.push(frame.clone());
        }
    }

    /// Initialized engine over an 800x600 view with boundaries and a manual clock
    pub fn test_engine(config: PlaygroundConfig) -> (SimulationEngine, ManualClock) {
        let clock = ManualClock::new(10_000);
        let mut engine = SimulationEngine::with_clock(config, clock.clone(), StdRng::seed_from_u64(42));
        engine
            .init(&RecordingSurface::sized(800.0, 600.0))
            .expect("init");
        engine.create_bodies().expect("boundaries");
        (engine, clock)
    }

    #[test]
    fn test_methods_fail_before_init() {
        let mut engine = SimulationEngine::new(PlaygroundConfig::default());

        assert_eq!(engine.create_bodies(), Err(EngineError::NotInitialized));
        assert_eq!(engine.resize(10.0, 10.0), Err(EngineError::NotInitialized));
        assert_eq!(engine.step(), Err(EngineError::NotInitialized));
        assert_eq!(engine.get_active_object_count(), 0);
        assert!(engine.pool().is_empty());
    }

    #[test]
    fn test_init_twice_is_rejected() {
        let (mut engine, _clock) = test_engine(PlaygroundConfig::default());
        let again = engine.init(&RecordingSurface::sized(800.0, 600.0));
        assert_eq!(again, Err(EngineError::AlreadyInitialized));
    }

    #[test]
    fn test_init_rejects_invalid_config() {
        let mut engine = SimulationEngine::new(PlaygroundConfig::default().with_pool_size(0));
        let result = engine.init(&RecordingSurface::sized(800.0, 600.0));
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
        assert!(!engine.is_initialized());
    }

    #[test]
    fn test_init_allocates_empty_pool() {
        let (engine, _clock) = test_engine(PlaygroundConfig::default().with_pool_size(12));
        assert_eq!(engine.pool().len(), 12);
        assert!(engine.pool().iter().all(|slot| !slot.is_active()));
        assert_eq!(engine.view(), Some(Viewport::from_size(800.0, 600.0)));
    }

    #[test]
    fn test_create_bodies_labels_boundaries() {
        let (engine, _clock) = test_engine(PlaygroundConfig::default());

        for label in BOUNDARY_LABELS {
            assert!(engine.find_body_by_label(label).is_some(), "missing {label}");
        }
        let ground = engine.find_body_by_label("ground").expect("ground");
        assert_eq!(engine.body_position(ground), Some(Vec2::new(400.0, 630.0)));
        // Boundaries never count as dynamic
        assert!(engine.dynamic_bodies().is_empty());
    }

    #[test]
    fn test_resize_moves_boundaries() {
        let clock = ManualClock::new(0);
        let mut engine = SimulationEngine::with_clock(PlaygroundConfig::default(), clock, StdRng::seed_from_u64(1));
        engine.init(&RecordingSurface::sized(1024.0, 768.0)).expect("init");
        engine.create_bodies().expect("boundaries");

        engine.resize(800.0, 600.0).expect("resize");

        let ground = engine.find_body_by_label("ground").expect("ground");
        let position = engine.body_position(ground).expect("ground position");
        assert_relative_eq!(position.y, 600.0 + 30.0);
        assert_relative_eq!(position.x, 400.0);

        let right = engine.find_body_by_label("rightWall").expect("right wall");
        assert_relative_eq!(engine.body_position(right).map_or(0.0, |p| p.x), 830.0);

        match engine.body_outline(ground) {
            Some(BodyOutline::Polygon { vertices }) => {
                let width = vertices[1].x - vertices[0].x;
                assert_relative_eq!(width, 1000.0, epsilon = 1e-3);
            }
            other => panic!("ground must be a box, got {other:?}"),
        }
        assert_eq!(engine.view(), Some(Viewport::from_size(800.0, 600.0)));
    }

    #[test]
    fn test_resize_before_boundaries_is_safe() {
        let clock = ManualClock::new(0);
        let mut engine = SimulationEngine::with_clock(PlaygroundConfig::default(), clock, StdRng::seed_from_u64(1));
        engine.init(&RecordingSurface::sized(300.0, 300.0)).expect("init");

        assert_eq!(engine.resize(640.0, 480.0), Ok(()));
        engine.create_bodies().expect("boundaries");

        let ground = engine.find_body_by_label("ground").expect("ground");
        assert_eq!(engine.body_position(ground).map(|p| p.y), Some(510.0));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let (mut engine, _clock) = test_engine(PlaygroundConfig::default());
        engine
            .spawn_object_at_point(Vec2::new(100.0, 100.0))
            .expect("spawn");

        engine.destroy();
        engine.destroy();

        assert!(!engine.is_initialized());
        assert_eq!(engine.get_active_object_count(), 0);
        assert!(engine.pool().is_empty());
        assert!(engine.world().is_none());
        assert_eq!(engine.step(), Err(EngineError::NotInitialized));

        // A destroyed engine may be brought back up
        assert!(engine.init(&RecordingSurface::sized(100.0, 100.0)).is_ok());
    }

    #[test]
    fn test_step_fires_callbacks_in_order() {
        let (mut engine, _clock) = test_engine(PlaygroundConfig::default());
        let log = Rc::new(RefCell::new(Vec::new()));

        let before = Rc::clone(&log);
        engine.on(EngineEvent::BeforeUpdate, move |info| {
            before.borrow_mut().push(("before", info.step))
        });
        let after = Rc::clone(&log);
        engine.on(EngineEvent::AfterUpdate, move |info| {
            after.borrow_mut().push(("after", info.step))
        });

        engine.step().expect("step");
        engine.step().expect("step");

        assert_eq!(
            *log.borrow(),
            vec![("before", 1), ("after", 1), ("before", 2), ("after", 2)]
        );
    }

    #[test]
    fn test_on_replaces_previous_callback() {
        let (mut engine, _clock) = test_engine(PlaygroundConfig::default());
        let hits = Rc::new(RefCell::new((0, 0)));

        let first = Rc::clone(&hits);
        engine.on(EngineEvent::AfterUpdate, move |_| first.borrow_mut().0 += 1);
        let second = Rc::clone(&hits);
        engine.on(EngineEvent::AfterUpdate, move |_| second.borrow_mut().1 += 1);

        engine.step().expect("step");
        assert_eq!(*hits.borrow(), (0, 1));

        engine.off(EngineEvent::AfterUpdate);
        engine.step().expect("step");
        assert_eq!(*hits.borrow(), (0, 1));
    }

    #[test]
    fn test_destroy_detaches_callbacks() {
        let (mut engine, _clock) = test_engine(PlaygroundConfig::default());
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        engine.on(EngineEvent::AfterUpdate, move |_| *counter.borrow_mut() += 1);

        engine.destroy();
        engine
            .init(&RecordingSurface::sized(100.0, 100.0))
            .expect("re-init");
        engine.step().expect("step");

        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn test_tick_runs_due_steps() {
        let (mut engine, _clock) = test_engine(PlaygroundConfig::default());
        let steps = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&steps);
        engine.on(EngineEvent::AfterUpdate, move |_| *counter.borrow_mut() += 1);

        assert_eq!(engine.tick(Duration::from_millis(5)), Ok(0));
        assert_eq!(engine.tick(Duration::from_millis(40)), Ok(2));
        assert_eq!(*steps.borrow(), 2);
    }

    #[test]
    fn test_render_presents_every_body() {
        let (mut engine, _clock) = test_engine(PlaygroundConfig::default());
        engine
            .create_circle(Vec2::new(200.0, 200.0), Vec2::new(230.0, 200.0))
            .expect("circle");

        let mut surface = RecordingSurface::sized(800.0, 600.0);
        engine.render(&mut surface);

        let frame = &surface.frames[0];
        assert_eq!(frame.commands.len(), 4);
        assert!(frame
            .commands
            .iter()
            .any(|cmd| matches!(cmd.primitive, Primitive::Circle { radius, .. } if radius == 30.0)));

        engine.destroy();
        engine.render(&mut surface);
        assert_eq!(surface.frames.len(), 1);
    }
}
