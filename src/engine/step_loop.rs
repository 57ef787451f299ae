/// Simulation step loop timing
///
/// Implements a fixed timestep runner with variable rendering.
/// Physics advances at a consistent rate while frames arrive
/// whenever the host delivers them.
use std::time::{Duration, Instant};

/// Target physics/update rate (60 updates per second)
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;
const FIXED_TIMESTEP_DURATION: Duration = Duration::from_micros(16_667); // ~1/60 second

/// Maximum number of physics steps per frame to prevent spiral of death
const MAX_PHYSICS_STEPS: u32 = 5;

/// Step loop timing state
pub struct StepLoop {
    /// Accumulated time for fixed timestep updates
    accumulator: Duration,

    /// Time of last wall-clock frame
    last_frame_time: Instant,

    /// Whether the loop is running
    running: bool,

    /// Current frame number
    frame_count: u64,

    /// Total steps executed
    step_count: u64,
}

impl StepLoop {
    /// Create a stopped step loop
    pub fn new() -> Self {
        Self {
            accumulator: Duration::ZERO,
            last_frame_time: Instant::now(),
            running: false,
            frame_count: 0,
            step_count: 0,
        }
    }

    /// Start (or restart) the loop
    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.accumulator = Duration::ZERO;
            self.last_frame_time = Instant::now();
            log::debug!("Step loop started");
        }
    }

    /// Stop the loop; pending time is discarded
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.accumulator = Duration::ZERO;
            log::debug!("Step loop stopped");
        }
    }

    /// Check if the loop is running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Begin a new frame using the wall clock, returns the number of fixed steps to run
    pub fn begin_frame(&mut self) -> u32 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.advance(frame_time)
    }

    /// Feed `frame_time` into the accumulator, returns the number of fixed steps to run
    pub fn advance(&mut self, frame_time: Duration) -> u32 {
        self.frame_count += 1;

        // If stopped, don't accumulate time for updates
        if !self.running {
            return 0;
        }

        self.accumulator += frame_time;

        let mut steps = 0;
        while self.accumulator >= FIXED_TIMESTEP_DURATION && steps < MAX_PHYSICS_STEPS {
            self.accumulator -= FIXED_TIMESTEP_DURATION;
            steps += 1;
        }

        // Drop the backlog we refused to simulate
        if steps == MAX_PHYSICS_STEPS && self.accumulator >= FIXED_TIMESTEP_DURATION {
            self.accumulator = Duration::ZERO;
        }

        self.step_count += steps as u64;
        steps
    }

    /// Get the fixed timestep for physics updates (in seconds)
    pub fn fixed_timestep(&self) -> f32 {
        FIXED_TIMESTEP
    }

    /// Interpolation alpha between the last two physics steps
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / FIXED_TIMESTEP
    }

    /// Get total number of frames seen
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get total number of steps scheduled
    pub fn step_count(&self) -> u64 {
        self.step_count
    }
}

impl Default for StepLoop {
    fn default() -> Self {
        Self::new()
    }
}
