//! Frame Statistics
//!
//! Frame counting with an explicit owner instead of process-wide counters.
//! The adapter creates one [`FpsCounter`] at construction and feeds every
//! frame through it; observers are told once per frame and once per
//! averaging window.

use std::time::{Duration, Instant};

use tracing::debug;

/// What the last frame looked like.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Frames rendered since the adapter was created.
    pub frames: u64,
    /// Average over the last closed window.
    pub fps: f32,
    pub nodes: usize,
    pub edges: usize,
}

/// Averages frame rate over a fixed window.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: Duration,
    window_start: Instant,
    frames_in_window: u32,
    fps: f32,
    total_frames: u64,
}

impl FpsCounter {
    /// Counter whose first window starts at `now`.
    pub fn new(window: Duration, now: Instant) -> Self {
        Self {
            window,
            window_start: now,
            frames_in_window: 0,
            fps: 0.0,
            total_frames: 0,
        }
    }

    /// Count one frame. Returns true when this frame closed a window.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.frames_in_window += 1;
        self.total_frames += 1;

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window || elapsed.is_zero() {
            return false;
        }

        self.fps = self.frames_in_window as f32 / elapsed.as_secs_f32();
        self.frames_in_window = 0;
        self.window_start = now;
        true
    }

    /// Frames per second over the last closed window. 0 before the first.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Frames counted since construction.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}

/// Receives frame statistics from the render adapter.
pub trait FrameObserver: Send {
    /// Called after every frame.
    fn frame_rendered(&mut self, _stats: &FrameStats) {}

    /// Called when an averaging window closes.
    fn window_closed(&mut self, stats: &FrameStats);
}

/// Logs one line per window.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl FrameObserver for TracingObserver {
    fn window_closed(&mut self, stats: &FrameStats) {
        debug!(
            nodes = stats.nodes,
            edges = stats.edges,
            fps = stats.fps,
            "{} nodes, {} edges @ {:.0} fps",
            stats.nodes,
            stats.edges,
            stats.fps
        );
    }
}
