// Interaction controller - turns pointer events into engine calls

use glam::Vec2;
use log::{debug, trace};

use super::{PointerEvent, Tool};
use crate::engine::physics::RigidBodyHandle;
use crate::engine::renderer::Effect;
use crate::playground::{DrawShape, EngineError, ShapePreview, SimulationEngine};

/// What a pointer event ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing happened
    Nothing,
    /// A pooled object was spawned
    Spawned { id: u64 },
    /// Spawn was rate limited
    Throttled,
    /// A drag picked up a body
    Grabbed(RigidBodyHandle),
    /// The held body followed the pointer
    Dragged(RigidBodyHandle),
    /// The held body was let go
    Released(RigidBodyHandle),
    /// The held body disappeared mid-drag
    DragLost,
    /// A draw gesture moved; the preview changed
    Previewing,
    /// A drawn shape was committed
    Drew(RigidBodyHandle),
    /// An explosion went off
    Exploded { affected: usize },
    /// A body was erased
    Erased(RigidBodyHandle),
    /// The hovered body changed
    Hovered(Option<RigidBodyHandle>),
    /// The gesture was aborted
    Cancelled,
}

/// Gesture in progress
#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Spawning,
    Dragging { body: RigidBodyHandle },
    Drawing { shape: DrawShape, start: Vec2, current: Vec2 },
    Erasing,
}

/// Per-tool pointer state machine sitting in front of the engine.
///
/// Holds no physics state of its own: a dragged body is referenced by handle
/// and re-checked against the engine on every move.
pub struct InteractionController {
    tool: Tool,
    gesture: Gesture,
    hovered: Option<RigidBodyHandle>,
}

impl InteractionController {
    pub fn new(tool: Tool) -> Self {
        Self {
            tool,
            gesture: Gesture::Idle,
            hovered: None,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switch tools, aborting any gesture in progress
    pub fn set_tool(&mut self, engine: &mut SimulationEngine, tool: Tool) -> Result<(), EngineError> {
        self.cancel(engine)?;
        self.clear_hover(engine)?;
        debug!("Tool: {} -> {}", self.tool.name(), tool.name());
        self.tool = tool;
        Ok(())
    }

    /// Whether a button is held
    pub fn is_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    /// Body under the pointer while no button is held
    pub fn hovered(&self) -> Option<RigidBodyHandle> {
        self.hovered
    }

    /// Preview of the shape being drawn, if a draw gesture is in progress
    pub fn preview(&self, engine: &SimulationEngine) -> Result<Option<ShapePreview>, EngineError> {
        match self.gesture {
            Gesture::Drawing {
                shape,
                start,
                current,
            } => engine.create_shape_preview(Tool::Draw(shape), start, current),
            _ => Ok(None),
        }
    }

    /// Feed one pointer event through the state machine
    pub fn handle(
        &mut self,
        engine: &mut SimulationEngine,
        event: PointerEvent,
    ) -> Result<Outcome, EngineError> {
        trace!("{:?} with {} tool", event, self.tool.name());

        match event {
            PointerEvent::Down(point) => self.on_down(engine, point),
            PointerEvent::Move(point) => self.on_move(engine, point),
            PointerEvent::Up(point) => self.on_up(engine, point),
            PointerEvent::Cancel => {
                let was_active = self.is_active();
                self.cancel(engine)?;
                self.clear_hover(engine)?;
                Ok(if was_active {
                    Outcome::Cancelled
                } else {
                    Outcome::Nothing
                })
            }
        }
    }

    fn on_down(&mut self, engine: &mut SimulationEngine, point: Vec2) -> Result<Outcome, EngineError> {
        // A lost Up leaves a stale gesture; drop it before starting over
        self.cancel(engine)?;
        self.clear_hover(engine)?;

        match self.tool {
            Tool::Spawn => {
                self.gesture = Gesture::Spawning;
                spawn(engine, point)
            }
            Tool::Drag => match engine.get_body_at_point(point)? {
                Some(body) => {
                    engine.set_interacting(Some(body));
                    engine.set_body_effect(body, Effect::Drag, true)?;
                    self.gesture = Gesture::Dragging { body };
                    Ok(Outcome::Grabbed(body))
                }
                None => Ok(Outcome::Nothing),
            },
            Tool::Draw(shape) => {
                self.gesture = Gesture::Drawing {
                    shape,
                    start: point,
                    current: point,
                };
                Ok(Outcome::Previewing)
            }
            Tool::Explode => {
                let config = engine.config();
                let (force, radius) = (config.explosion_force, config.explosion_radius);
                let affected = engine.apply_explosion_force(point, force, radius)?;
                Ok(Outcome::Exploded { affected })
            }
            Tool::Erase => {
                self.gesture = Gesture::Erasing;
                erase(engine, point)
            }
        }
    }

    fn on_move(&mut self, engine: &mut SimulationEngine, point: Vec2) -> Result<Outcome, EngineError> {
        match self.gesture {
            Gesture::Idle => self.hover(engine, point),
            Gesture::Spawning => spawn(engine, point),
            Gesture::Dragging { body } => {
                if engine.interacting_body() != Some(body) {
                    debug!("Dragged body {body:?} is gone");
                    self.gesture = Gesture::Idle;
                    return Ok(Outcome::DragLost);
                }
                engine.move_body(body, point)?;
                Ok(Outcome::Dragged(body))
            }
            Gesture::Drawing { shape, start, .. } => {
                self.gesture = Gesture::Drawing {
                    shape,
                    start,
                    current: point,
                };
                Ok(Outcome::Previewing)
            }
            Gesture::Erasing => erase(engine, point),
        }
    }

    fn on_up(&mut self, engine: &mut SimulationEngine, point: Vec2) -> Result<Outcome, EngineError> {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);

        match gesture {
            Gesture::Dragging { body } => {
                engine.set_body_effect(body, Effect::Drag, false)?;
                let still_held = engine.interacting_body() == Some(body);
                engine.set_interacting(None);
                Ok(if still_held {
                    Outcome::Released(body)
                } else {
                    Outcome::DragLost
                })
            }
            Gesture::Drawing { shape, start, .. } => {
                let body = match shape {
                    DrawShape::Circle => engine.create_circle(start, point),
                    DrawShape::Box => engine.create_box(start, point),
                    DrawShape::Polygon => engine.create_polygon(start, point),
                    DrawShape::Line => engine.create_line(start, point),
                }?;
                Ok(Outcome::Drew(body))
            }
            Gesture::Idle | Gesture::Spawning | Gesture::Erasing => Ok(Outcome::Nothing),
        }
    }

    /// Abort the current gesture without committing anything
    fn cancel(&mut self, engine: &mut SimulationEngine) -> Result<(), EngineError> {
        if let Gesture::Dragging { body } = std::mem::replace(&mut self.gesture, Gesture::Idle) {
            engine.set_body_effect(body, Effect::Drag, false)?;
            if engine.interacting_body() == Some(body) {
                engine.set_interacting(None);
            }
        }
        Ok(())
    }

    fn hover(&mut self, engine: &mut SimulationEngine, point: Vec2) -> Result<Outcome, EngineError> {
        let under = engine.get_body_at_point(point)?;
        if under == self.hovered {
            return Ok(Outcome::Nothing);
        }

        self.clear_hover(engine)?;
        if let Some(body) = under {
            engine.set_body_effect(body, Effect::Hover, true)?;
        }
        self.hovered = under;
        Ok(Outcome::Hovered(under))
    }

    fn clear_hover(&mut self, engine: &mut SimulationEngine) -> Result<(), EngineError> {
        if let Some(body) = self.hovered.take() {
            engine.set_body_effect(body, Effect::Hover, false)?;
        }
        Ok(())
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(Tool::default())
    }
}

fn spawn(engine: &mut SimulationEngine, point: Vec2) -> Result<Outcome, EngineError> {
    Ok(match engine.spawn_object_at_point(point)? {
        Some(object) => Outcome::Spawned { id: object.id() },
        None => Outcome::Throttled,
    })
}

fn erase(engine: &mut SimulationEngine, point: Vec2) -> Result<Outcome, EngineError> {
    match engine.get_body_at_point(point)? {
        Some(body) => {
            engine.destroy_body(body)?;
            Ok(Outcome::Erased(body))
        }
        None => Ok(Outcome::Nothing),
    }
}
