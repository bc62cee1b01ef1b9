#![deny(unsafe_code)]
//! Field registry: maps field names to implementations, plus headless
//! rendering.
//!
//! This crate sits between `holofield-core` (which defines the `Animation`
//! trait) and the individual field crates (`holofield-particles`, etc.). Both
//! the CLI and the wasm bindings depend on it to avoid duplicating dispatch
//! logic.

pub mod headless;
pub mod raster;

#[cfg(feature = "png")]
pub mod snapshot;

pub use headless::{run_scene, HeadlessRun};
pub use raster::RasterSurface;

use holofield_core::{Animation, FieldError, PointerState, Scene, Surface, ViewportInfo};
use holofield_grain::GrainOverlay;
use holofield_particles::ParticleField;
use holofield_waves::WaveField;
use serde_json::Value;

/// All available field names.
const FIELD_NAMES: &[&str] = &["particles", "waves", "grain"];

/// Every available field.
///
/// Wraps each implementation and delegates the `Animation` trait methods.
/// Use [`FieldKind::from_name`] for string-based construction (CLI, wasm).
pub enum FieldKind {
    /// Pointer-repelled particles with a proximity graph.
    Particles(ParticleField),
    /// Layered signal waves with a halftone trail.
    Waves(WaveField),
    /// Film-grain noise overlay.
    Grain(GrainOverlay),
}

impl FieldKind {
    /// Constructs a field by name.
    ///
    /// Returns `FieldError::UnknownField` if the name is not recognized.
    pub fn from_name(
        name: &str,
        viewport: &ViewportInfo,
        seed: u64,
        params: &Value,
    ) -> Result<Self, FieldError> {
        match name {
            "particles" => Ok(FieldKind::Particles(ParticleField::from_json(
                viewport, seed, params,
            )?)),
            "waves" => Ok(FieldKind::Waves(WaveField::from_json(viewport, params)?)),
            "grain" => Ok(FieldKind::Grain(GrainOverlay::from_json(viewport, seed, params)?)),
            _ => Err(FieldError::UnknownField(name.to_string())),
        }
    }

    /// Validates the scene and constructs its field.
    pub fn from_scene(scene: &Scene) -> Result<Self, FieldError> {
        scene.validate()?;
        Self::from_name(&scene.field, &scene.viewport()?, scene.seed, &scene.params)
    }

    /// Returns a slice of all recognized field names.
    pub fn list_fields() -> &'static [&'static str] {
        FIELD_NAMES
    }

    fn inner(&self) -> &dyn Animation {
        match self {
            FieldKind::Particles(f) => f,
            FieldKind::Waves(f) => f,
            FieldKind::Grain(f) => f,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Animation {
        match self {
            FieldKind::Particles(f) => f,
            FieldKind::Waves(f) => f,
            FieldKind::Grain(f) => f,
        }
    }
}

impl Animation for FieldKind {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn resize(&mut self, viewport: &ViewportInfo) {
        self.inner_mut().resize(viewport);
    }

    fn set_pointer(&mut self, pointer: Option<PointerState>) {
        self.inner_mut().set_pointer(pointer);
    }

    fn advance(&mut self, frames: f64) {
        self.inner_mut().advance(frames);
    }

    fn tick(&mut self) {
        self.inner_mut().tick();
    }

    fn render(&self, surface: &mut dyn Surface) {
        self.inner().render(surface);
    }

    fn params(&self) -> Value {
        self.inner().params()
    }

    fn param_schema(&self) -> Value {
        self.inner().param_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holofield_core::RecordingSurface;
    use serde_json::json;

    fn viewport() -> ViewportInfo {
        ViewportInfo::new(640.0, 360.0, 1.0).unwrap()
    }

    #[test]
    fn every_listed_name_constructs() {
        for name in FieldKind::list_fields() {
            let field = FieldKind::from_name(name, &viewport(), 42, &json!({}));
            assert!(field.is_ok(), "{name} failed to construct");
            assert_eq!(field.unwrap().name(), *name);
        }
    }

    #[test]
    fn from_name_unknown_returns_error() {
        let result = FieldKind::from_name("nonexistent", &viewport(), 42, &json!({}));
        assert!(matches!(result, Err(FieldError::UnknownField(_))));
    }

    #[test]
    fn from_name_propagates_param_errors() {
        let result = FieldKind::from_name("particles", &viewport(), 1, &json!({"count": -3}));
        assert!(matches!(result, Err(FieldError::InvalidConfig { .. })));
        let result = FieldKind::from_name("waves", &viewport(), 1, &json!({"layers": -1}));
        assert!(matches!(result, Err(FieldError::InvalidConfig { .. })));
    }

    #[test]
    fn from_scene_validates_first() {
        let scene = Scene::new("particles", 0, 10, 1);
        assert!(matches!(FieldKind::from_scene(&scene), Err(FieldError::InvalidDimensions)));
    }

    #[test]
    fn trait_delegation_params_and_schema() {
        let field = FieldKind::from_name("particles", &viewport(), 42, &json!({})).unwrap();
        assert!(field.params().get("max_dist").is_some());
        assert!(field.param_schema().get("max_dist").is_some());

        let field = FieldKind::from_name("waves", &viewport(), 42, &json!({})).unwrap();
        assert_eq!(field.params()["layers"], 9);
    }

    #[test]
    fn trait_delegation_tick_and_render() {
        let mut field = FieldKind::from_name("waves", &viewport(), 0, &json!({})).unwrap();
        field.tick();
        let mut surface = RecordingSurface::new();
        field.render(&mut surface);
        assert_eq!(surface.summary().polylines, 9);
    }

    #[test]
    fn determinism_same_seed() {
        let mut a = FieldKind::from_name("particles", &viewport(), 99, &json!({})).unwrap();
        let mut b = FieldKind::from_name("particles", &viewport(), 99, &json!({})).unwrap();
        let pointer = Some(PointerState::new(320.0, 180.0));
        a.set_pointer(pointer);
        b.set_pointer(pointer);
        for _ in 0..10 {
            a.tick();
            b.tick();
        }
        let (mut sa, mut sb) = (RecordingSurface::new(), RecordingSurface::new());
        a.render(&mut sa);
        b.render(&mut sb);
        assert_eq!(sa.commands(), sb.commands());
    }

    #[test]
    fn object_safety() {
        let field = FieldKind::from_name("grain", &viewport(), 42, &json!({})).unwrap();
        let boxed: Box<dyn Animation> = Box::new(field);
        assert_eq!(boxed.name(), "grain");
    }
}
