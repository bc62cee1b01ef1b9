//! Software rasterizer implementing [`Surface`] over an RGBA8 buffer.
//!
//! Always available (no feature gate) so that headless runs, the PNG snapshot
//! path and tests share one implementation. Drawing is source-over with
//! straight alpha; edges are antialiased by pixel-center distance coverage.

use holofield_core::{DVec2, Fill, Srgb, Stroke, Surface, ViewportInfo};

/// Narrowest stroke half-width in device pixels, so hairlines stay visible.
const MIN_HALF_WIDTH: f64 = 0.5;

/// Rasterizes surface calls into a row-major RGBA8 buffer at device
/// resolution.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    width: usize,
    height: usize,
    scale: f64,
    background: [u8; 4],
    pixels: Vec<u8>,
}

impl RasterSurface {
    /// A transparent surface sized to `viewport` at its pixel scale.
    pub fn new(viewport: &ViewportInfo) -> Self {
        let mut surface = Self {
            width: 0,
            height: 0,
            scale: 1.0,
            background: [0; 4],
            pixels: Vec::new(),
        };
        surface.resize(viewport);
        surface
    }

    /// Sets the color `clear()` fills with and clears to it.
    pub fn with_background(mut self, color: Srgb, alpha: f64) -> Self {
        let [r, g, b] = color.to_rgb8();
        self.background = [r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8];
        self.clear();
        self
    }

    /// Width in device pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in device pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_scale(&self) -> f64 {
        self.scale
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]])
    }

    fn blend(&mut self, x: usize, y: usize, rgb: [f64; 3], alpha: f64) {
        if !(alpha > 0.0) {
            return;
        }
        let alpha = alpha.min(1.0);
        let i = (y * self.width + x) * 4;
        let dst_a = f64::from(self.pixels[i + 3]) / 255.0;
        let out_a = alpha + dst_a * (1.0 - alpha);
        if out_a <= 0.0 {
            return;
        }
        for (c, src) in rgb.iter().enumerate() {
            let dst = f64::from(self.pixels[i + c]) / 255.0;
            let out = (src * alpha + dst * dst_a * (1.0 - alpha)) / out_a;
            self.pixels[i + c] = (out.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        self.pixels[i + 3] = (out_a.clamp(0.0, 1.0) * 255.0).round() as u8;
    }

    /// Device-pixel index range covering `[lo, hi]` on an axis of `extent`.
    fn span(lo: f64, hi: f64, extent: usize) -> std::ops::Range<usize> {
        let start = lo.floor().max(0.0);
        let end = hi.ceil().min(extent as f64);
        if !(start < end) {
            return 0..0;
        }
        start as usize..end as usize
    }

    /// Strokes one segment whose start lies `dash_offset` logical units
    /// along the enclosing path.
    fn stroke_segment(&mut self, from: DVec2, to: DVec2, stroke: &Stroke, dash_offset: f64) {
        if !(from.is_finite() && to.is_finite()) || !(stroke.alpha > 0.0) {
            return;
        }
        let (a, b) = (from * self.scale, to * self.scale);
        let half = (stroke.width * self.scale / 2.0).max(MIN_HALF_WIDTH);
        let reach = half + 1.0;
        let d = b - a;
        let len_sq = d.length_squared();
        let logical_len = from.distance(to);
        let rgb = [stroke.color.r, stroke.color.g, stroke.color.b];

        for y in Self::span(a.y.min(b.y) - reach, a.y.max(b.y) + reach, self.height) {
            for x in Self::span(a.x.min(b.x) - reach, a.x.max(b.x) + reach, self.width) {
                let c = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                let t = if len_sq > 0.0 {
                    ((c - a).dot(d) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let coverage = (half + 0.5 - c.distance(a + d * t)).clamp(0.0, 1.0);
                if coverage <= 0.0 || !stroke.dash.is_on(dash_offset + t * logical_len) {
                    continue;
                }
                self.blend(x, y, rgb, stroke.alpha * coverage);
            }
        }
    }
}

impl Surface for RasterSurface {
    fn resize(&mut self, viewport: &ViewportInfo) {
        let (w, h) = viewport.physical_size();
        self.width = w as usize;
        self.height = h as usize;
        self.scale = viewport.pixel_scale;
        self.pixels = self.background.repeat(self.width * self.height);
        tracing::debug!(width = self.width, height = self.height, scale = self.scale, "raster resized");
    }

    fn clear(&mut self) {
        let bg = self.background;
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bg);
        }
    }

    fn draw_line(&mut self, from: DVec2, to: DVec2, stroke: &Stroke) {
        self.stroke_segment(from, to, stroke, 0.0);
    }

    fn draw_polyline(&mut self, points: &[DVec2], stroke: &Stroke) {
        let mut offset = 0.0;
        for pair in points.windows(2) {
            self.stroke_segment(pair[0], pair[1], stroke, offset);
            offset += pair[0].distance(pair[1]);
        }
    }

    fn draw_circle(&mut self, center: DVec2, radius: f64, fill: &Fill) {
        if !center.is_finite() || !(radius > 0.0) || !(fill.alpha > 0.0) {
            return;
        }
        let c = center * self.scale;
        let r = radius * self.scale;
        let rgb = [fill.color.r, fill.color.g, fill.color.b];
        for y in Self::span(c.y - r - 1.0, c.y + r + 1.0, self.height) {
            for x in Self::span(c.x - r - 1.0, c.x + r + 1.0, self.width) {
                let p = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                let coverage = (r + 0.5 - p.distance(c)).clamp(0.0, 1.0);
                self.blend(x, y, rgb, fill.alpha * coverage);
            }
        }
    }

    fn draw_pixels(&mut self, width: usize, height: usize, rgba: &[u8]) {
        if width.checked_mul(height).and_then(|n| n.checked_mul(4)) != Some(rgba.len()) {
            tracing::trace!(width, height, len = rgba.len(), "pixel blit skipped: size mismatch");
            return;
        }
        for y in 0..self.height {
            let sy = (y as f64 / self.scale).floor() as usize;
            if sy >= height {
                break;
            }
            for x in 0..self.width {
                let sx = (x as f64 / self.scale).floor() as usize;
                if sx >= width {
                    break;
                }
                let i = (sy * width + sx) * 4;
                let rgb = [
                    f64::from(rgba[i]) / 255.0,
                    f64::from(rgba[i + 1]) / 255.0,
                    f64::from(rgba[i + 2]) / 255.0,
                ];
                self.blend(x, y, rgb, f64::from(rgba[i + 3]) / 255.0);
            }
        }
    }
}
