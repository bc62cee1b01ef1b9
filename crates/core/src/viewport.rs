//! Logical drawing-surface geometry and pointer input.
//!
//! The page reports its element size and device pixel ratio as a
//! [`ViewportInfo`]. [`ViewportAdapter`] keeps the last accepted value and
//! tells callers whether a resize actually changed anything, so fields are only
//! re-seeded on real geometry changes.

use crate::error::FieldError;
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Logical widths at or below this are treated as constrained (phone/tablet).
pub const CONSTRAINED_MAX_WIDTH: f64 = 1024.0;

/// Size of a drawing surface in logical units plus its pixel density.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportInfo {
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_pixel_scale")]
    pub pixel_scale: f64,
}

fn default_pixel_scale() -> f64 {
    1.0
}

impl ViewportInfo {
    /// Creates a viewport, rejecting negative or non-finite values.
    ///
    /// Zero width or height is accepted: such a viewport is degenerate and
    /// fields skip their work while it is active.
    pub fn new(width: f64, height: f64, pixel_scale: f64) -> Result<Self, FieldError> {
        for (name, v) in [("width", width), ("height", height)] {
            if !v.is_finite() || v < 0.0 {
                return Err(FieldError::config(name, format!("must be finite and >= 0, got {v}")));
            }
        }
        if !pixel_scale.is_finite() || pixel_scale <= 0.0 {
            return Err(FieldError::config(
                "pixel_scale",
                format!("must be finite and > 0, got {pixel_scale}"),
            ));
        }
        Ok(Self {
            width,
            height,
            pixel_scale,
        })
    }

    /// True when either dimension is zero.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// True for small viewports, which get fewer particles and shorter edges.
    pub fn is_constrained(&self) -> bool {
        self.width <= CONSTRAINED_MAX_WIDTH
    }

    /// Logical size as a vector.
    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    /// Backing-store size in device pixels, rounded.
    pub fn physical_size(&self) -> (u32, u32) {
        let px = |v: f64| (v * self.pixel_scale).round().clamp(0.0, u32::MAX as f64) as u32;
        (px(self.width), px(self.height))
    }

    /// Logical center point.
    pub fn center(&self) -> DVec2 {
        self.size() * 0.5
    }
}

/// Last known pointer position in the field's logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerState {
    pub x: f64,
    pub y: f64,
}

impl PointerState {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

/// Tracks the current viewport and detects genuine resizes.
#[derive(Debug, Clone)]
pub struct ViewportAdapter {
    current: ViewportInfo,
    generation: u64,
}

impl ViewportAdapter {
    pub fn new(initial: ViewportInfo) -> Self {
        Self {
            current: initial,
            generation: 0,
        }
    }

    /// The viewport most recently accepted.
    pub fn current(&self) -> ViewportInfo {
        self.current
    }

    /// Number of accepted resizes since construction.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Applies a new viewport. Returns `true` when it differs from the
    /// current one, in which case dependents must re-initialise.
    pub fn update(&mut self, next: ViewportInfo) -> bool {
        if next == self.current {
            return false;
        }
        tracing::debug!(
            from_w = self.current.width,
            from_h = self.current.height,
            to_w = next.width,
            to_h = next.height,
            scale = next.pixel_scale,
            "viewport resized"
        );
        self.current = next;
        self.generation += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_negative_and_nan_dimensions() {
        assert!(ViewportInfo::new(-1.0, 10.0, 1.0).is_err());
        assert!(ViewportInfo::new(10.0, f64::NAN, 1.0).is_err());
        assert!(ViewportInfo::new(10.0, 10.0, 0.0).is_err());
        assert!(ViewportInfo::new(10.0, 10.0, f64::INFINITY).is_err());
    }

    #[test]
    fn zero_sized_viewport_is_accepted_but_degenerate() {
        let v = ViewportInfo::new(0.0, 300.0, 1.0).unwrap();
        assert!(v.is_degenerate());
        assert!(!ViewportInfo::new(1.0, 1.0, 1.0).unwrap().is_degenerate());
    }

    #[test]
    fn constrained_threshold_is_inclusive() {
        assert!(ViewportInfo::new(1024.0, 768.0, 1.0).unwrap().is_constrained());
        assert!(!ViewportInfo::new(1025.0, 768.0, 1.0).unwrap().is_constrained());
    }

    #[test]
    fn physical_size_applies_pixel_scale() {
        let v = ViewportInfo::new(400.0, 300.5, 2.0).unwrap();
        assert_eq!(v.physical_size(), (800, 601));
    }

    #[test]
    fn update_reports_only_real_changes() {
        let start = ViewportInfo::new(800.0, 600.0, 1.0).unwrap();
        let mut adapter = ViewportAdapter::new(start);
        assert!(!adapter.update(start));
        assert_eq!(adapter.generation(), 0);

        let smaller = ViewportInfo::new(400.0, 300.0, 1.0).unwrap();
        assert!(adapter.update(smaller));
        assert_eq!(adapter.current(), smaller);
        assert_eq!(adapter.generation(), 1);

        let denser = ViewportInfo::new(400.0, 300.0, 2.0).unwrap();
        assert!(adapter.update(denser), "pixel scale change counts as a resize");
    }

    #[test]
    fn viewport_deserializes_without_pixel_scale() {
        let v: ViewportInfo = serde_json::from_str(r#"{"width": 10, "height": 20}"#).unwrap();
        assert!((v.pixel_scale - 1.0).abs() < f64::EPSILON);
    }
}
