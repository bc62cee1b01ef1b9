#![deny(unsafe_code)]
//! Core types and traits for the holofield procedural backgrounds.
//!
//! Provides the `Animation` trait, the `Surface` drawing abstraction and its
//! recording implementation, viewport and pointer input, the `FrameScheduler`
//! loop with its `StopHandle`, the `Xorshift64` seedable PRNG, `Scene`, and
//! parameter helpers.

pub mod animation;
pub mod color;
pub mod error;
pub mod params;
pub mod prng;
pub mod scene;
pub mod scheduler;
pub mod surface;
pub mod viewport;

pub use animation::Animation;
pub use color::Srgb;
pub use error::FieldError;
pub use prng::{RandomSource, Xorshift64};
pub use scene::Scene;
pub use scheduler::{FixedRate, FrameScheduler, FrameSource, SlotId, StopHandle, TimeStep};
pub use surface::{
    draw_grid, DashPattern, DrawCommand, DrawSummary, Fill, RecordingSurface, Stroke, Surface,
};
pub use viewport::{PointerState, ViewportAdapter, ViewportInfo};

/// Re-exported so downstream crates share one vector type.
pub use glam::DVec2;
