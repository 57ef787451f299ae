use anyhow::{Context, Result};
use glam::Vec2;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

use rigid_playground::engine::clock::ManualClock;
use rigid_playground::engine::input::{InteractionController, PointerEvent, Tool};
use rigid_playground::engine::renderer::{Frame, RenderSurface};
use rigid_playground::playground::{DrawShape, EngineEvent, PlaygroundConfig, SimulationEngine};

const FRAME: Duration = Duration::from_millis(16);

/// Headless surface that logs a summary of every frame it is handed
struct LogSurface {
    size: Vec2,
    frames: u64,
}

impl RenderSurface for LogSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn resize(&mut self, size: Vec2) {
        self.size = size;
    }

    fn present(&mut self, frame: &Frame) {
        self.frames += 1;
        if self.frames % 60 == 0 {
            let (circles, polygons) = frame.counts();
            info!(
                "Frame {}: {} circles, {} polygons in {}x{}",
                self.frames,
                circles,
                polygons,
                frame.view.width(),
                frame.view.height()
            );
        }
    }
}

/// Advance simulated time by `frames` frames, rendering each one
fn run_frames(
    engine: &mut SimulationEngine,
    surface: &mut LogSurface,
    clock: &ManualClock,
    frames: u32,
) -> Result<()> {
    for _ in 0..frames {
        clock.advance(FRAME.as_millis() as u64);
        engine.tick(FRAME)?;
        engine.render(surface);
    }
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Rigid Playground...");

    let clock = ManualClock::new(0);
    let mut engine = SimulationEngine::with_clock(
        PlaygroundConfig::default(),
        clock.clone(),
        StdRng::from_os_rng(),
    );
    let mut surface = LogSurface {
        size: Vec2::new(1280.0, 720.0),
        frames: 0,
    };

    engine.init(&surface).context("failed to start the engine")?;
    engine.create_bodies()?;
    engine.on(EngineEvent::AfterUpdate, |step| {
        if step.step % 120 == 0 {
            info!("Step {}: {} active objects", step.step, step.active_objects);
        }
    });

    let mut controller = InteractionController::new(Tool::Spawn);

    // Spawn burst: sweep across the top of the view with the button held
    controller.handle(&mut engine, PointerEvent::Down(Vec2::new(200.0, 100.0)))?;
    for i in 0..60 {
        let x = 200.0 + i as f32 * 15.0;
        controller.handle(&mut engine, PointerEvent::Move(Vec2::new(x, 100.0)))?;
        run_frames(&mut engine, &mut surface, &clock, 1)?;
    }
    controller.handle(&mut engine, PointerEvent::Up(Vec2::new(1100.0, 100.0)))?;
    run_frames(&mut engine, &mut surface, &clock, 120)?;

    // Draw one of each shape
    let strokes = [
        (DrawShape::Circle, Vec2::new(300.0, 200.0), Vec2::new(340.0, 200.0)),
        (DrawShape::Box, Vec2::new(500.0, 150.0), Vec2::new(580.0, 210.0)),
        (DrawShape::Polygon, Vec2::new(700.0, 200.0), Vec2::new(700.0, 245.0)),
        (DrawShape::Line, Vec2::new(850.0, 250.0), Vec2::new(1050.0, 300.0)),
    ];
    for (shape, start, end) in strokes {
        controller.set_tool(&mut engine, Tool::Draw(shape))?;
        controller.handle(&mut engine, PointerEvent::Down(start))?;
        controller.handle(&mut engine, PointerEvent::Move(end))?;
        if let Some(preview) = controller.preview(&engine)? {
            info!("Previewing {} at {}", preview.tool.name(), preview.geometry.position);
        }
        controller.handle(&mut engine, PointerEvent::Up(end))?;
    }
    run_frames(&mut engine, &mut surface, &clock, 60)?;

    // Grab whatever sits under the drawn circle and fling it
    controller.set_tool(&mut engine, Tool::Drag)?;
    let outcome = controller.handle(&mut engine, PointerEvent::Down(Vec2::new(300.0, 200.0)))?;
    info!("Drag start: {:?}", outcome);
    for i in 1..=20 {
        let point = Vec2::new(300.0 + i as f32 * 20.0, 200.0 - i as f32 * 5.0);
        controller.handle(&mut engine, PointerEvent::Move(point))?;
        run_frames(&mut engine, &mut surface, &clock, 1)?;
    }
    controller.handle(&mut engine, PointerEvent::Up(Vec2::new(700.0, 100.0)))?;
    run_frames(&mut engine, &mut surface, &clock, 60)?;

    // Explode near the floor, then erase through the middle
    controller.set_tool(&mut engine, Tool::Explode)?;
    let outcome = controller.handle(&mut engine, PointerEvent::Down(Vec2::new(640.0, 680.0)))?;
    info!("Explosion: {:?}", outcome);
    run_frames(&mut engine, &mut surface, &clock, 90)?;

    controller.set_tool(&mut engine, Tool::Erase)?;
    controller.handle(&mut engine, PointerEvent::Down(Vec2::new(100.0, 650.0)))?;
    for i in 0..40 {
        let point = Vec2::new(100.0 + i as f32 * 27.0, 650.0);
        controller.handle(&mut engine, PointerEvent::Move(point))?;
    }
    controller.handle(&mut engine, PointerEvent::Up(Vec2::new(1180.0, 650.0)))?;

    // Shrink the window and let things settle
    surface.resize(Vec2::new(960.0, 540.0));
    engine.resize(960.0, 540.0)?;
    run_frames(&mut engine, &mut surface, &clock, 180)?;

    info!(
        "Done: {} active pooled objects, {} dynamic bodies, {} frames",
        engine.get_active_object_count(),
        engine.dynamic_bodies().len(),
        surface.frames
    );

    engine.destroy();
    Ok(())
}
