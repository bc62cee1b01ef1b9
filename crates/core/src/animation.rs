//! The `Animation` trait every procedural field implements.
//!
//! The trait is object-safe so the scheduler and the registry can hold
//! fields as `Box<dyn Animation>` and switch between them at run time.

use crate::surface::Surface;
use crate::viewport::{PointerState, ViewportInfo};
use serde_json::Value;

/// A continuously animated field: advanced once per display refresh, then
/// rendered to a [`Surface`].
///
/// Simulation and drawing are split so callers can tick without drawing
/// (render strides) and draw the same state to several surfaces.
pub trait Animation {
    /// Registry name of the field, e.g. `"particles"`.
    fn name(&self) -> &'static str;

    /// Adopts new surface geometry. Fields whose state depends on bounds
    /// re-initialise here.
    fn resize(&mut self, viewport: &ViewportInfo);

    /// Records the last known pointer position. Fields that do not react to
    /// the pointer ignore it.
    fn set_pointer(&mut self, pointer: Option<PointerState>) {
        let _ = pointer;
    }

    /// Advances the simulation by `frames` reference frames.
    ///
    /// `1.0` is exactly one frame at the tuning rate;
    /// fractional values come from delta-time scaling.
    fn advance(&mut self, frames: f64);

    /// Advances by exactly one frame.
    fn tick(&mut self) {
        self.advance(1.0);
    }

    /// Draws the current state. A degenerate surface draws nothing.
    fn render(&self, surface: &mut dyn Surface);

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Srgb;
    use crate::surface::{Fill, RecordingSurface};
    use glam::DVec2;
    use serde_json::json;

    /// Minimal animation used to verify trait object safety and the
    /// provided methods.
    struct Blinker {
        clock: f64,
        pointer: Option<PointerState>,
    }

    impl Animation for Blinker {
        fn name(&self) -> &'static str {
            "blinker"
        }

        fn resize(&mut self, _viewport: &ViewportInfo) {
            self.clock = 0.0;
        }

        fn set_pointer(&mut self, pointer: Option<PointerState>) {
            self.pointer = pointer;
        }

        fn advance(&mut self, frames: f64) {
            self.clock += frames;
        }

        fn render(&self, surface: &mut dyn Surface) {
            surface.clear();
            surface.draw_circle(DVec2::ZERO, self.clock, &Fill::new(Srgb::ACCENT, 1.0));
        }

        fn params(&self) -> Value {
            json!({"clock": self.clock})
        }

        fn param_schema(&self) -> Value {
            json!({"clock": {"type": "number", "default": 0.0}})
        }
    }

    fn blinker() -> Blinker {
        Blinker {
            clock: 0.0,
            pointer: None,
        }
    }

    #[test]
    fn animation_trait_is_object_safe() {
        let mut anim: Box<dyn Animation> = Box::new(blinker());
        anim.tick();
        anim.tick();
        assert_eq!(anim.params()["clock"], 2.0);
        assert_eq!(anim.name(), "blinker");
    }

    #[test]
    fn tick_is_one_reference_frame() {
        let mut a = blinker();
        a.tick();
        a.advance(0.5);
        assert!((a.clock - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn render_goes_through_dyn_surface() {
        let mut a = blinker();
        a.advance(3.0);
        let mut surface = RecordingSurface::new();
        a.render(&mut surface);
        let (_, radius, _) = surface.circles().next().unwrap();
        assert!((radius - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn set_pointer_is_forwarded() {
        let mut a = blinker();
        let anim: &mut dyn Animation = &mut a;
        anim.set_pointer(Some(PointerState::new(1.0, 2.0)));
        assert_eq!(a.pointer, Some(PointerState::new(1.0, 2.0)));
    }
}
