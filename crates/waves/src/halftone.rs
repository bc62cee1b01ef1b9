//! Halftone dot trail laid over the waves.
//!
//! Dots sit on a slow wave of their own and fade toward both horizontal
//! edges: radius and opacity scale with `1 − |x − w/2| / (w/2)`.

use holofield_core::DVec2;

const DOT_WAVE_FREQUENCY: f64 = 0.006;
const DOT_WAVE_SPEED: f64 = 0.015;
pub const DOT_WAVE_AMPLITUDE: f64 = 30.0;
pub const DOT_ALPHA_SCALE: f64 = 0.1;
pub const DOT_BASE_RADIUS: f64 = 0.8;
pub const DOT_RADIUS_GAIN: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalftoneDot {
    pub center: DVec2,
    pub radius: f64,
    pub alpha: f64,
}

/// 1 at the horizontal center, 0 at both edges. Zero for a non-positive width.
pub fn center_weight(x: f64, width: f64) -> f64 {
    if !(width > 0.0) {
        return 0.0;
    }
    let half = width / 2.0;
    (1.0 - (x - half).abs() / half).clamp(0.0, 1.0)
}

/// Vertical offset of the dot trail at `x`.
pub fn dot_offset(x: f64, time: f64) -> f64 {
    (x * DOT_WAVE_FREQUENCY + time * DOT_WAVE_SPEED).sin() * DOT_WAVE_AMPLITUDE
}

/// Dots at `x = 0, spacing, 2·spacing, ...` below `width`.
pub fn halftone_dots(width: f64, center_y: f64, spacing: f64, time: f64) -> Vec<HalftoneDot> {
    if !(width > 0.0 && spacing > 0.0) {
        return Vec::new();
    }
    (0_u64..)
        .map(|k| k as f64 * spacing)
        .take_while(|&x| x < width)
        .map(|x| {
            let weight = center_weight(x, width);
            HalftoneDot {
                center: DVec2::new(x, center_y + dot_offset(x, time)),
                radius: DOT_BASE_RADIUS + weight * DOT_RADIUS_GAIN,
                alpha: weight * DOT_ALPHA_SCALE,
            }
        })
        .collect()
}
