#![deny(unsafe_code)]
//! Film-grain overlay: a full-surface image of random gray pixels.
//!
//! Filling the buffer is the expensive part, so it is redrawn only on every
//! `stride`-th display frame and the previous noise is shown in between.

use holofield_core::params::{check_count, require_count, require_finite};
use holofield_core::{Animation, FieldError, RandomSource, Surface, ViewportInfo, Xorshift64};
use serde_json::{json, Value};

pub const DEFAULT_STRIDE: usize = 4;
pub const DEFAULT_OPACITY: f64 = 0.04;
pub const MAX_STRIDE: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrainParams {
    /// Regenerate on frames where `frame % stride == 0`.
    pub stride: usize,
    /// Alpha of every grain pixel, in `[0, 1]`.
    pub opacity: f64,
}

impl Default for GrainParams {
    fn default() -> Self {
        Self {
            stride: DEFAULT_STRIDE,
            opacity: DEFAULT_OPACITY,
        }
    }
}

impl GrainParams {
    pub fn from_json(params: &Value) -> Result<Self, FieldError> {
        let d = Self::default();
        let parsed = Self {
            stride: require_count(params, "stride", d.stride)?,
            opacity: require_finite(params, "opacity", d.opacity)?,
        };
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        if self.stride == 0 {
            return Err(FieldError::config("stride", "must be at least 1"));
        }
        check_count("stride", self.stride, MAX_STRIDE)?;
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(FieldError::config("opacity", "must be in [0, 1]"));
        }
        Ok(())
    }

    fn alpha_byte(&self) -> u8 {
        (self.opacity * 255.0).round() as u8
    }
}

pub struct GrainOverlay {
    params: GrainParams,
    rng: Xorshift64,
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    /// Display frames seen since construction.
    frame: u64,
    regenerations: u64,
}

impl GrainOverlay {
    pub fn new(viewport: &ViewportInfo, seed: u64, params: GrainParams) -> Result<Self, FieldError> {
        params.validate()?;
        let mut overlay = Self {
            params,
            rng: Xorshift64::new(seed),
            width: 0,
            height: 0,
            pixels: Vec::new(),
            frame: 0,
            regenerations: 0,
        };
        overlay.resize(viewport);
        Ok(overlay)
    }

    pub fn from_json(viewport: &ViewportInfo, seed: u64, params: &Value) -> Result<Self, FieldError> {
        Self::new(viewport, seed, GrainParams::from_json(params)?)
    }

    /// Row-major RGBA8 noise, `width × height × 4` bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// How many times the noise has been redrawn.
    pub fn regenerations(&self) -> u64 {
        self.regenerations
    }

    fn regenerate(&mut self) {
        let alpha = self.params.alpha_byte();
        for px in self.pixels.chunks_exact_mut(4) {
            let v = self.rng.next_u8();
            px.copy_from_slice(&[v, v, v, alpha]);
        }
        self.regenerations += 1;
    }
}

impl Animation for GrainOverlay {
    fn name(&self) -> &'static str {
        "grain"
    }

    fn resize(&mut self, viewport: &ViewportInfo) {
        let (w, h) = (viewport.width.floor() as usize, viewport.height.floor() as usize);
        let Some(len) = w.checked_mul(h).and_then(|n| n.checked_mul(4)) else {
            tracing::debug!(width = viewport.width, height = viewport.height, "grain buffer too large; disabled");
            self.width = 0;
            self.height = 0;
            self.pixels = Vec::new();
            return;
        };
        self.width = w;
        self.height = h;
        self.pixels = vec![0; len];
        self.regenerate();
        tracing::debug!(width = w, height = h, "grain buffer allocated");
    }

    /// Counts display frames; the elapsed time is irrelevant to grain.
    fn advance(&mut self, _frames: f64) {
        self.frame += 1;
        if self.frame % self.params.stride as u64 == 0 {
            self.regenerate();
        } else {
            tracing::trace!(frame = self.frame, "grain kept");
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.clear();
        if self.pixels.is_empty() {
            return;
        }
        surface.draw_pixels(self.width, self.height, &self.pixels);
    }

    fn params(&self) -> Value {
        json!({
            "stride": self.params.stride,
            "opacity": self.params.opacity,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "stride": {
                "type": "integer",
                "default": DEFAULT_STRIDE,
                "min": 1,
                "max": MAX_STRIDE,
                "description": "Redraw the noise every N frames"
            },
            "opacity": {
                "type": "number",
                "default": DEFAULT_OPACITY,
                "min": 0.0,
                "max": 1.0,
                "description": "Alpha of each grain pixel"
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holofield_core::{DrawCommand, RecordingSurface};

    fn viewport(w: f64, h: f64) -> ViewportInfo {
        ViewportInfo::new(w, h, 1.0).unwrap()
    }

    fn overlay(seed: u64) -> GrainOverlay {
        GrainOverlay::new(&viewport(16.0, 8.0), seed, GrainParams::default()).unwrap()
    }

    #[test]
    fn buffer_matches_viewport() {
        let g = overlay(1);
        assert_eq!(g.dimensions(), (16, 8));
        assert_eq!(g.pixels().len(), 16 * 8 * 4);
        assert_eq!(g.regenerations(), 1);
    }

    #[test]
    fn pixels_are_gray_with_fixed_alpha() {
        let g = GrainOverlay::from_json(&viewport(16.0, 8.0), 3, &json!({"opacity": 1.0})).unwrap();
        for px in g.pixels().chunks_exact(4) {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
            assert_eq!(px[3], 255);
        }
    }

    #[test]
    fn noise_only_changes_every_fourth_frame() {
        let mut g = overlay(9);
        let initial = g.pixels().to_vec();
        for _ in 0..3 {
            g.tick();
            assert_eq!(g.pixels(), initial.as_slice());
        }
        g.tick();
        assert_eq!(g.frame(), 4);
        assert_ne!(g.pixels(), initial.as_slice());
        assert_eq!(g.regenerations(), 2);
        for _ in 0..8 {
            g.tick();
        }
        assert_eq!(g.regenerations(), 4);
    }

    #[test]
    fn stride_one_regenerates_every_frame() {
        let mut g = GrainOverlay::from_json(&viewport(4.0, 4.0), 1, &json!({"stride": 1})).unwrap();
        for _ in 0..5 {
            g.tick();
        }
        assert_eq!(g.regenerations(), 6);
    }

    #[test]
    fn same_seed_same_noise() {
        let mut a = overlay(77);
        let mut b = overlay(77);
        for _ in 0..8 {
            a.tick();
            b.tick();
        }
        assert_eq!(a.pixels(), b.pixels());
    }

    #[test]
    fn render_blits_the_buffer_once() {
        let g = overlay(5);
        let mut s = RecordingSurface::new();
        g.render(&mut s);
        assert_eq!(s.commands().len(), 1);
        match &s.commands()[0] {
            DrawCommand::Pixels { width, height, rgba } => {
                assert_eq!((*width, *height), (16, 8));
                assert_eq!(rgba.as_slice(), g.pixels());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn degenerate_viewport_draws_nothing() {
        let g = GrainOverlay::new(&viewport(0.0, 10.0), 1, GrainParams::default()).unwrap();
        let mut s = RecordingSurface::new();
        g.render(&mut s);
        assert!(s.commands().is_empty());
    }

    #[test]
    fn resize_reallocates() {
        let mut g = overlay(2);
        g.resize(&viewport(3.5, 2.0));
        assert_eq!(g.dimensions(), (3, 2));
        assert_eq!(g.pixels().len(), 24);
    }

    #[test]
    fn invalid_params_are_rejected() {
        let vp = viewport(4.0, 4.0);
        assert!(GrainOverlay::from_json(&vp, 1, &json!({"stride": 0})).is_err());
        assert!(GrainOverlay::from_json(&vp, 1, &json!({"stride": -4})).is_err());
        assert!(GrainOverlay::from_json(&vp, 1, &json!({"opacity": 1.5})).is_err());
        assert!(GrainOverlay::from_json(&vp, 1, &json!({"stride": MAX_STRIDE + 1})).is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn regeneration_count_follows_stride(stride in 1_usize..12, frames in 0_u64..100) {
                let params = GrainParams { stride, opacity: 0.5 };
                let mut g = GrainOverlay::new(&viewport(2.0, 2.0), 1, params).unwrap();
                for _ in 0..frames {
                    g.tick();
                }
                prop_assert_eq!(g.regenerations(), 1 + frames / stride as u64);
            }
        }
    }
}
