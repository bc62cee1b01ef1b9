//! Wave layers and the signal they trace.

use holofield_core::{DashPattern, Srgb, Stroke};
use serde::Serialize;

/// Amplitude of the shared shimmer term.
pub const NOISE_AMPLITUDE: f64 = 5.0;
const NOISE_FREQUENCY: f64 = 0.015;
const NOISE_SPEED: f64 = 0.3;

/// Dash family for a layer, chosen by `index mod 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashStyle {
    /// Long dashes, `[6, 8]`.
    Dense,
    /// Short dashes, `[2, 4]`.
    Sparse,
    Solid,
}

impl DashStyle {
    pub fn for_index(index: usize) -> Self {
        match index % 3 {
            0 => DashStyle::Dense,
            1 => DashStyle::Sparse,
            _ => DashStyle::Solid,
        }
    }

    pub fn pattern(self) -> DashPattern {
        match self {
            DashStyle::Dense => DashPattern::Dashed { on: 6.0, off: 8.0 },
            DashStyle::Sparse => DashPattern::Dashed { on: 2.0, off: 4.0 },
            DashStyle::Solid => DashPattern::Solid,
        }
    }
}

/// One sinusoid of the signal field. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaveLayer {
    pub index: usize,
    pub amplitude: f64,
    pub frequency: f64,
    pub speed: f64,
    pub stroke_alpha: f64,
    pub stroke_width: f64,
    pub dash: DashStyle,
}

impl WaveLayer {
    /// Layer `index` of a stack of `count`. Later layers are taller, faster
    /// and more opaque.
    pub fn new(index: usize, count: usize) -> Self {
        let i = index as f64;
        Self {
            index,
            amplitude: 10.0 + 10.0 * i,
            frequency: 0.002 + 0.0008 * i,
            speed: 0.012 + 0.004 * i,
            stroke_alpha: 0.06 + (i / count.max(1) as f64) * 0.2,
            stroke_width: 0.8 + 0.2 * i,
            dash: DashStyle::for_index(index),
        }
    }

    pub fn stroke(&self) -> Stroke {
        Stroke::solid(Srgb::ACCENT, self.stroke_alpha, self.stroke_width).with_dash(self.dash.pattern())
    }
}

/// The layer stack for `count` layers. A pure function of `count`.
pub fn layers(count: usize) -> Vec<WaveLayer> {
    (0..count).map(|i| WaveLayer::new(i, count)).collect()
}

/// Perturbation shared by every layer, so the layers shimmer together.
pub fn noise(x: f64, time: f64) -> f64 {
    (x * NOISE_FREQUENCY + time * NOISE_SPEED).sin() * NOISE_AMPLITUDE
}

/// Height of `layer` at horizontal position `x` and tick `time`.
pub fn sample(layer: &WaveLayer, x: f64, time: f64, center_y: f64) -> f64 {
    center_y + (x * layer.frequency + time * layer.speed).sin() * layer.amplitude + noise(x, time)
}
