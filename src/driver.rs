//! Frame loop: smoothing step plus one rasterization pass per scheduled frame

use crate::canvas::Surface;
use crate::config::{ScrollParams, TorusParams};
use crate::depth::DepthBuffer;
use crate::scroll::{Rotation, ScrollInput, ScrollState};
use crate::torus::{FrameStats, Torus};
use crate::viewport::Viewport;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Clonable flag that ends a running frame loop
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    stopped: Arc<AtomicBool>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

/// Decides when the next frame may start
pub trait FrameScheduler {
    /// Block until the next frame is due. Returning false ends the loop.
    fn next_frame(&mut self) -> bool;
}

/// Paces frames at a fixed rate. A frame that overruns its slot delays the
/// next one; missed slots are never replayed.
pub struct IntervalScheduler {
    interval: Duration,
    last: Option<Instant>,
}

impl IntervalScheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    pub fn from_fps(fps: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / fps.max(1) as f64))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl FrameScheduler for IntervalScheduler {
    fn next_frame(&mut self) -> bool {
        if let Some(last) = self.last {
            let due = last + self.interval;
            let now = Instant::now();
            if due > now {
                std::thread::sleep(due - now);
            }
        }
        self.last = Some(Instant::now());
        true
    }
}

/// Grants a fixed number of frames without waiting
#[cfg(test)]
pub struct CountedScheduler {
    remaining: u64,
}

#[cfg(test)]
impl CountedScheduler {
    pub fn new(frames: u64) -> Self {
        Self { remaining: frames }
    }
}

#[cfg(test)]
impl FrameScheduler for CountedScheduler {
    fn next_frame(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// What the host wants done with the frame it was just offered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    /// Advance smoothing and draw
    Render,
    /// Draw the current rotation again without advancing smoothing
    Redraw,
    Skip,
}

/// The environment a frame loop runs in: input, a surface, and presentation
pub trait FrameHost {
    type Canvas: Surface + ?Sized;

    /// Pump input and apply resizes before the frame. May stop the token.
    fn begin_frame(&mut self, driver: &mut FrameDriver, stop: &StopToken) -> io::Result<FrameControl>;

    fn surface(&mut self) -> &mut Self::Canvas;

    /// Show the finished frame
    fn present(&mut self, stats: &FrameStats) -> io::Result<()>;
}

/// Owns the scroll state, projection, and per-frame depth buffer
pub struct FrameDriver {
    torus: Torus,
    scroll_params: ScrollParams,
    viewport: Viewport,
    depth: DepthBuffer,
    state: ScrollState,
    rotation: Rotation,
    input: Option<ScrollInput>,
    frames: u64,
}

impl FrameDriver {
    pub fn new(torus_params: TorusParams, scroll_params: ScrollParams, width: u32, height: u32) -> Self {
        Self {
            viewport: Viewport::new(width, height, &torus_params),
            depth: DepthBuffer::new(width, height),
            torus: Torus::new(torus_params),
            scroll_params,
            state: ScrollState::new(),
            rotation: Rotation::default(),
            input: None,
            frames: 0,
        }
    }

    pub fn with_cell_aspect(mut self, cell_aspect: f32) -> Self {
        self.viewport = self.viewport.with_cell_aspect(cell_aspect);
        self
    }

    /// Read scroll targets from a shared slot at the start of every tick
    pub fn with_input(mut self, input: ScrollInput) -> Self {
        self.input = Some(input);
        self
    }

    /// Apply a new surface size; cheap when nothing changed
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let changed = self.viewport.resize(width, height, self.torus.params());
        if changed {
            tracing::debug!(width, height, k1 = self.viewport.k1(), "viewport resized");
        }
        changed
    }

    pub fn set_scroll_target(&mut self, offset: f64) {
        self.state.set_target(offset);
    }

    /// Skip the easing and put the scroll position directly on `offset`
    pub fn jump_to(&mut self, offset: f64) {
        self.state = ScrollState::settled_at(offset);
        self.rotation = self.state.rotation(&self.scroll_params);
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.state
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Smoothing steps taken so far; redraws are not counted
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance smoothing one step, then rasterize into `surface`
    pub fn tick<S>(&mut self, surface: &mut S) -> FrameStats
    where
        S: Surface + ?Sized,
    {
        if let Some(input) = &self.input {
            self.state.set_target(input.get());
        }
        let (state, rotation) = self.state.tick(&self.scroll_params);
        self.state = state;
        self.rotation = rotation;

        let (width, height) = surface.size();
        self.resize(width, height);

        let stats = self.torus.rasterize(rotation, &self.viewport, &mut self.depth, surface);
        self.frames += 1;
        stats
    }

    /// Rasterize the current rotation into `surface` with scroll state untouched
    pub fn redraw<S>(&mut self, surface: &mut S) -> FrameStats
    where
        S: Surface + ?Sized,
    {
        let (width, height) = surface.size();
        self.resize(width, height);
        self.torus.rasterize(self.rotation, &self.viewport, &mut self.depth, surface)
    }

    /// Run `count` ticks back to back, returning the last frame's stats
    pub fn run_ticks<S>(&mut self, count: u32, surface: &mut S) -> FrameStats
    where
        S: Surface + ?Sized,
    {
        let mut stats = FrameStats::default();
        for _ in 0..count {
            stats = self.tick(surface);
        }
        stats
    }

    /// Drive frames until the token is stopped or the scheduler runs out.
    /// Returns the number of frames presented, redraws included.
    pub fn run<Sch, H>(&mut self, scheduler: &mut Sch, host: &mut H, stop: &StopToken) -> io::Result<u64>
    where
        Sch: FrameScheduler + ?Sized,
        H: FrameHost + ?Sized,
    {
        let mut rendered = 0;
        while !stop.is_stopped() && scheduler.next_frame() {
            let control = host.begin_frame(self, stop)?;
            if stop.is_stopped() {
                continue;
            }
            let started = Instant::now();
            let stats = match control {
                FrameControl::Render => self.tick(host.surface()),
                FrameControl::Redraw => self.redraw(host.surface()),
                FrameControl::Skip => continue,
            };
            host.present(&stats)?;
            rendered += 1;
            tracing::trace!(
                frame = self.frames,
                written = stats.written,
                elapsed_us = started.elapsed().as_micros() as u64,
                "frame"
            );
        }
        Ok(rendered)
    }
}
