//! Frame loop driving every registered field once per display refresh.
//!
//! Execution is single-threaded: a frame ticks and renders each slot to
//! completion before the next frame is requested. Resize and pointer updates
//! are applied between frames. The loop has no built-in end; it runs until the
//! [`FrameSource`] dries up or the [`StopHandle`] is triggered.

use crate::animation::Animation;
use crate::error::FieldError;
use crate::surface::Surface;
use crate::viewport::{PointerState, ViewportAdapter, ViewportInfo};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Refresh rate the per-frame tuning constants were calibrated at.
pub const REFERENCE_HZ: f64 = 60.0;

/// Default upper bound on reference frames simulated in a single callback.
pub const DEFAULT_MAX_FRAMES: f64 = 4.0;

/// How wall-clock time maps to simulation steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeStep {
    /// One simulation frame per callback regardless of elapsed time. Motion
    /// speed scales with the display refresh rate.
    PerFrame,
    /// Elapsed time converted to reference frames at `reference_hz`, capped
    /// at `max_frames` so a suspended tab does not fling particles.
    Scaled { reference_hz: f64, max_frames: f64 },
}

impl Default for TimeStep {
    fn default() -> Self {
        TimeStep::Scaled {
            reference_hz: REFERENCE_HZ,
            max_frames: DEFAULT_MAX_FRAMES,
        }
    }
}

impl TimeStep {
    /// Rejects non-positive or non-finite scaling parameters.
    pub fn validate(&self) -> Result<(), FieldError> {
        if let TimeStep::Scaled {
            reference_hz,
            max_frames,
        } = *self
        {
            if !(reference_hz.is_finite() && reference_hz > 0.0) {
                return Err(FieldError::config("reference_hz", "must be finite and > 0"));
            }
            if !(max_frames.is_finite() && max_frames > 0.0) {
                return Err(FieldError::config("max_frames", "must be finite and > 0"));
            }
        }
        Ok(())
    }

    /// Reference frames to simulate given the previous and current callback
    /// timestamps in milliseconds. The first frame always counts as one.
    pub fn frames_between(&self, previous_ms: Option<f64>, now_ms: f64) -> f64 {
        match *self {
            TimeStep::PerFrame => 1.0,
            TimeStep::Scaled {
                reference_hz,
                max_frames,
            } => match previous_ms {
                None => 1.0,
                Some(prev) => {
                    let elapsed = (now_ms - prev).max(0.0) / 1000.0;
                    (elapsed * reference_hz).min(max_frames)
                }
            },
        }
    }
}

/// Shared flag that halts a running scheduler at the next frame boundary.
///
/// Clones share the flag, so the page (or a test) can keep one while the loop
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Supplies display-refresh timestamps in milliseconds.
///
/// This is the only suspension point of the loop. Returning `None` ends the
/// run, e.g. a headless source that has produced its quota of frames.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<f64>;
}

/// Headless source yielding `remaining` frames spaced at `interval_ms`.
#[derive(Debug, Clone)]
pub struct FixedRate {
    remaining: u64,
    now_ms: f64,
    interval_ms: f64,
}

impl FixedRate {
    pub fn new(frames: u64, hz: f64) -> Self {
        Self {
            remaining: frames,
            now_ms: 0.0,
            interval_ms: 1000.0 / hz,
        }
    }
}

impl FrameSource for FixedRate {
    fn next_frame(&mut self) -> Option<f64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let t = self.now_ms;
        self.now_ms += self.interval_ms;
        Some(t)
    }
}

/// Identifies a slot returned by [`FrameScheduler::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

struct Slot<S> {
    animation: Box<dyn Animation>,
    surface: S,
    stride: NonZeroU32,
}

/// Drives tick-then-render for each slot on every frame.
///
/// A slot with render stride `n` is ticked every frame but only rendered on
/// frames where `frame % n == 0`.
pub struct FrameScheduler<S: Surface> {
    slots: Vec<Slot<S>>,
    viewport: ViewportAdapter,
    time_step: TimeStep,
    stop: StopHandle,
    frame: u64,
    last_timestamp: Option<f64>,
}

impl<S: Surface> FrameScheduler<S> {
    pub fn new(viewport: ViewportInfo, time_step: TimeStep) -> Result<Self, FieldError> {
        time_step.validate()?;
        Ok(Self {
            slots: Vec::new(),
            viewport: ViewportAdapter::new(viewport),
            time_step,
            stop: StopHandle::new(),
            frame: 0,
            last_timestamp: None,
        })
    }

    /// Registers a field rendering to `surface` every frame.
    pub fn add(&mut self, animation: Box<dyn Animation>, surface: S) -> SlotId {
        self.add_with_stride(animation, surface, NonZeroU32::MIN)
    }

    /// Registers a field rendering to `surface` every `stride` frames.
    ///
    /// The field must already be built for [`viewport`](Self::viewport); only
    /// the surface is sized here, so a freshly seeded field keeps its initial
    /// state.
    pub fn add_with_stride(
        &mut self,
        animation: Box<dyn Animation>,
        mut surface: S,
        stride: NonZeroU32,
    ) -> SlotId {
        surface.resize(&self.viewport.current());
        tracing::debug!(field = animation.name(), stride = stride.get(), "slot added");
        self.slots.push(Slot {
            animation,
            surface,
            stride,
        });
        SlotId(self.slots.len() - 1)
    }

    /// A clone of the handle that stops this scheduler.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn viewport(&self) -> ViewportInfo {
        self.viewport.current()
    }

    pub fn animation(&self, id: SlotId) -> Option<&dyn Animation> {
        self.slots.get(id.0).map(|s| s.animation.as_ref())
    }

    pub fn surface(&self, id: SlotId) -> Option<&S> {
        self.slots.get(id.0).map(|s| &s.surface)
    }

    /// Applies a viewport change to every slot. No-op when unchanged.
    pub fn resize(&mut self, viewport: ViewportInfo) {
        if !self.viewport.update(viewport) {
            return;
        }
        for slot in &mut self.slots {
            slot.surface.resize(&viewport);
            slot.animation.resize(&viewport);
        }
    }

    /// Forwards the last known pointer position to every slot.
    pub fn set_pointer(&mut self, pointer: Option<PointerState>) {
        for slot in &mut self.slots {
            slot.animation.set_pointer(pointer);
        }
    }

    /// Runs one frame at `timestamp_ms`. Returns `false` without doing any
    /// work once the stop handle has been triggered.
    pub fn frame(&mut self, timestamp_ms: f64) -> bool {
        if self.stop.is_stopped() {
            return false;
        }
        let frames = self.time_step.frames_between(self.last_timestamp, timestamp_ms);
        self.last_timestamp = Some(timestamp_ms);

        for slot in &mut self.slots {
            slot.animation.advance(frames);
            if self.frame % u64::from(slot.stride.get()) == 0 {
                slot.animation.render(&mut slot.surface);
            }
        }
        tracing::trace!(frame = self.frame, frames, "frame complete");
        self.frame += 1;
        true
    }

    /// Consumes the scheduler, returning each slot's surface in slot order.
    pub fn into_surfaces(self) -> Vec<S> {
        self.slots.into_iter().map(|s| s.surface).collect()
    }

    /// Renders every slot immediately, ignoring strides, without advancing.
    pub fn render_all(&mut self) {
        for slot in &mut self.slots {
            slot.animation.render(&mut slot.surface);
        }
    }

    /// Runs frames until the source is exhausted or the scheduler is stopped.
    /// Returns the number of frames executed.
    pub fn run(&mut self, source: &mut dyn FrameSource) -> u64 {
        let mut executed = 0;
        while !self.stop.is_stopped() {
            let Some(timestamp) = source.next_frame() else {
                break;
            };
            if self.frame(timestamp) {
                executed += 1;
            }
        }
        tracing::debug!(executed, stopped = self.stop.is_stopped(), "scheduler loop ended");
        executed
    }
}
