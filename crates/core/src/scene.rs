//! Reproducible description of a headless field run.
//!
//! A [`Scene`] captures everything needed to recreate a frame: field name,
//! viewport, parameter overrides, PRNG seed, frame count and an optional fixed
//! pointer position.

use crate::error::FieldError;
use crate::viewport::{PointerState, ViewportInfo};
use serde::{Deserialize, Serialize};

/// Reproducible description of a field run.
///
/// Two identical scenes fed to the same binary produce bit-identical output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scene {
    pub field: String,
    pub width: usize,
    pub height: usize,
    #[serde(default = "one")]
    pub pixel_scale: f64,
    #[serde(default = "empty_object")]
    pub params: serde_json::Value,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub frames: usize,
    #[serde(default)]
    pub pointer: Option<PointerState>,
}

fn one() -> f64 {
    1.0
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Scene {
    /// Creates a scene with default params (`{}`), no frames and no pointer.
    pub fn new(field: &str, width: usize, height: usize, seed: u64) -> Self {
        Self {
            field: field.to_string(),
            width,
            height,
            pixel_scale: 1.0,
            params: empty_object(),
            seed,
            frames: 0,
            pointer: None,
        }
    }

    /// Validates that the scene has non-zero dimensions, a usable pixel
    /// scale, and that the physical pixel area does not overflow.
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.width == 0 || self.height == 0 {
            return Err(FieldError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(FieldError::InvalidDimensions)?;
        self.viewport()?;
        if !self.params.is_object() {
            return Err(FieldError::config("params", "must be a JSON object"));
        }
        Ok(())
    }

    /// The logical viewport this scene renders into.
    pub fn viewport(&self) -> Result<ViewportInfo, FieldError> {
        ViewportInfo::new(self.width as f64, self.height as f64, self.pixel_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_scene_with_defaults() {
        let s = Scene::new("particles", 1280, 720, 42);
        assert_eq!(s.field, "particles");
        assert_eq!(s.frames, 0);
        assert_eq!(s.params, serde_json::json!({}));
        assert!(s.pointer.is_none());
    }

    #[test]
    fn json_round_trip_with_pointer_and_params() {
        let mut s = Scene::new("particles", 800, 600, 7);
        s.params = serde_json::json!({"count": 40, "proximity": "grid"});
        s.frames = 120;
        s.pointer = Some(PointerState::new(400.0, 300.0));
        let json = serde_json::to_string_pretty(&s).unwrap();
        let restored: Scene = serde_json::from_str(&json).unwrap();
        assert_eq!(s, restored);
    }

    #[test]
    fn minimal_json_fills_defaults() {
        let s: Scene =
            serde_json::from_str(r#"{"field": "waves", "width": 640, "height": 360}"#).unwrap();
        assert_eq!(s.seed, 0);
        assert!((s.pixel_scale - 1.0).abs() < f64::EPSILON);
        assert!(s.params.is_object());
    }

    #[test]
    fn validate_succeeds_for_valid_scene() {
        assert!(Scene::new("waves", 640, 360, 1).validate().is_ok());
    }

    #[test]
    fn validate_fails_for_zero_dimension() {
        assert!(Scene::new("waves", 0, 360, 1).validate().is_err());
        assert!(Scene::new("waves", 640, 0, 1).validate().is_err());
    }

    #[test]
    fn validate_fails_for_overflow() {
        assert!(Scene::new("waves", usize::MAX, 2, 1).validate().is_err());
    }

    #[test]
    fn validate_fails_for_bad_pixel_scale_or_params() {
        let mut s = Scene::new("waves", 10, 10, 1);
        s.pixel_scale = -2.0;
        assert!(s.validate().is_err());

        let mut s = Scene::new("waves", 10, 10, 1);
        s.params = serde_json::json!([1, 2]);
        assert!(s.validate().is_err());
    }
}
