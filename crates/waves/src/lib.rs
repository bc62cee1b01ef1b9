#![deny(unsafe_code)]
//! Signal-wave field: a stack of dashed sinusoids over a faint grid, with a
//! halftone dot trail.
//!
//! Geometry is recomputed from the current viewport on every render, so a
//! resize only updates the stored size. The layer stack is fixed at
//! construction and the only state that evolves is the tick clock.

pub mod halftone;
pub mod layer;

pub use halftone::{center_weight, halftone_dots, HalftoneDot};
pub use layer::{layers, noise, sample, DashStyle, WaveLayer};

use holofield_core::params::{check_count, check_range, require_count, require_positive};
use holofield_core::surface::draw_grid;
use holofield_core::{
    Animation, DVec2, FieldError, Fill, Srgb, Stroke, Surface, ViewportInfo,
};
use serde_json::{json, Value};

pub const DEFAULT_LAYERS: usize = 9;
pub const MAX_LAYERS: usize = 64;
const DEFAULT_GRID_SPACING: f64 = 30.0;
const DEFAULT_SAMPLE_STEP: f64 = 2.0;
const DEFAULT_DOT_SPACING: f64 = 10.0;

const MIN_GRID_SPACING: f64 = 1.0;
const SAMPLE_STEP_RANGE: (f64, f64) = (0.5, 20.0);
const MIN_DOT_SPACING: f64 = 1.0;

const GRID_ALPHA: f64 = 0.02;
const GRID_WIDTH: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveParams {
    pub layers: usize,
    pub grid_spacing: f64,
    /// Horizontal distance between polyline samples.
    pub sample_step: f64,
    pub dot_spacing: f64,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            layers: DEFAULT_LAYERS,
            grid_spacing: DEFAULT_GRID_SPACING,
            sample_step: DEFAULT_SAMPLE_STEP,
            dot_spacing: DEFAULT_DOT_SPACING,
        }
    }
}

impl WaveParams {
    pub fn from_json(params: &Value) -> Result<Self, FieldError> {
        let d = Self::default();
        let parsed = Self {
            layers: require_count(params, "layers", d.layers)?,
            grid_spacing: require_positive(params, "grid_spacing", d.grid_spacing)?,
            sample_step: require_positive(params, "sample_step", d.sample_step)?,
            dot_spacing: require_positive(params, "dot_spacing", d.dot_spacing)?,
        };
        parsed.validate()?;
        Ok(parsed)
    }

    /// Checks the ranges advertised by the parameter schema.
    pub fn validate(&self) -> Result<(), FieldError> {
        check_count("layers", self.layers, MAX_LAYERS)?;
        check_range("grid_spacing", self.grid_spacing, MIN_GRID_SPACING, f64::MAX)?;
        let (lo, hi) = SAMPLE_STEP_RANGE;
        check_range("sample_step", self.sample_step, lo, hi)?;
        check_range("dot_spacing", self.dot_spacing, MIN_DOT_SPACING, f64::MAX)?;
        Ok(())
    }
}

/// Deterministic multi-layer wave field.
pub struct WaveField {
    params: WaveParams,
    layers: Vec<WaveLayer>,
    size: DVec2,
    time: f64,
}

impl WaveField {
    pub fn new(viewport: &ViewportInfo, params: WaveParams) -> Result<Self, FieldError> {
        params.validate()?;
        tracing::debug!(layers = params.layers, "wave field created");
        Ok(Self {
            layers: layers(params.layers),
            params,
            size: viewport.size(),
            time: 0.0,
        })
    }

    pub fn from_json(viewport: &ViewportInfo, params: &Value) -> Result<Self, FieldError> {
        Self::new(viewport, WaveParams::from_json(params)?)
    }

    pub fn layers(&self) -> &[WaveLayer] {
        &self.layers
    }

    /// Tick clock; one unit per reference frame.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn size(&self) -> DVec2 {
        self.size
    }

    pub fn center_y(&self) -> f64 {
        self.size.y / 2.0
    }

    /// Polyline vertices for `layer` at `x = 0, step, ...` up to and
    /// including the right edge.
    pub fn layer_points(&self, layer: &WaveLayer) -> Vec<DVec2> {
        let (width, step, center_y) = (self.size.x, self.params.sample_step, self.center_y());
        (0_u64..)
            .map(|k| k as f64 * step)
            .take_while(|&x| x <= width)
            .map(|x| DVec2::new(x, sample(layer, x, self.time, center_y)))
            .collect()
    }

    fn is_degenerate(&self) -> bool {
        !(self.size.x > 0.0 && self.size.y > 0.0)
    }
}

impl Animation for WaveField {
    fn name(&self) -> &'static str {
        "waves"
    }

    fn resize(&mut self, viewport: &ViewportInfo) {
        self.size = viewport.size();
        tracing::debug!(width = self.size.x, height = self.size.y, "wave field resized");
    }

    fn advance(&mut self, frames: f64) {
        if frames.is_finite() && frames > 0.0 {
            self.time += frames;
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.clear();
        if self.is_degenerate() {
            tracing::trace!("wave render skipped: degenerate size");
            return;
        }
        draw_grid(
            surface,
            self.size,
            self.params.grid_spacing,
            &Stroke::solid(Srgb::ACCENT, GRID_ALPHA, GRID_WIDTH),
        );

        for layer in &self.layers {
            surface.draw_polyline(&self.layer_points(layer), &layer.stroke());
        }

        let dots = halftone_dots(self.size.x, self.center_y(), self.params.dot_spacing, self.time);
        for dot in &dots {
            surface.draw_circle(dot.center, dot.radius, &Fill::new(Srgb::ACCENT, dot.alpha));
        }
        tracing::trace!(layers = self.layers.len(), dots = dots.len(), time = self.time, "waves rendered");
    }

    fn params(&self) -> Value {
        json!({
            "layers": self.params.layers,
            "grid_spacing": self.params.grid_spacing,
            "sample_step": self.params.sample_step,
            "dot_spacing": self.params.dot_spacing,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "layers": {
                "type": "integer",
                "default": DEFAULT_LAYERS,
                "min": 0,
                "max": MAX_LAYERS,
                "description": "Number of wave layers"
            },
            "grid_spacing": {
                "type": "number",
                "default": DEFAULT_GRID_SPACING,
                "min": MIN_GRID_SPACING,
                "description": "Background grid spacing"
            },
            "sample_step": {
                "type": "number",
                "default": DEFAULT_SAMPLE_STEP,
                "min": SAMPLE_STEP_RANGE.0,
                "max": SAMPLE_STEP_RANGE.1,
                "description": "Horizontal distance between wave samples"
            },
            "dot_spacing": {
                "type": "number",
                "default": DEFAULT_DOT_SPACING,
                "min": MIN_DOT_SPACING,
                "description": "Horizontal distance between halftone dots"
            }
        })
    }
}
