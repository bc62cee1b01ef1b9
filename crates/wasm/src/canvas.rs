//! [`Surface`] over a browser 2D canvas.
//!
//! The backing store is sized in device pixels and the context carries a
//! `pixel_scale` transform, so fields draw in logical units and strokes stay
//! crisp on high-density displays.

use holofield_core::{DVec2, DashPattern, Fill, Stroke, Surface, ViewportInfo};
use std::f64::consts::TAU;
use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    viewport: Option<ViewportInfo>,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("missing 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            canvas,
            context,
            viewport: None,
        })
    }

    fn set_stroke(&self, stroke: &Stroke) {
        self.context.set_stroke_style_str(&stroke.color.css_rgba(stroke.alpha));
        self.context.set_line_width(stroke.width);
        let dash = js_sys::Array::new();
        for v in dash_segments(&stroke.dash) {
            dash.push(&JsValue::from_f64(v));
        }
        report(self.context.set_line_dash(&dash), "set_line_dash");
    }
}

/// Canvas `setLineDash` segments; empty for a solid line.
pub fn dash_segments(dash: &DashPattern) -> Vec<f64> {
    dash.intervals().map(|d| d.to_vec()).unwrap_or_default()
}

/// Nearest-neighbour upscale of a logical-resolution RGBA image to the
/// device-pixel size of the canvas.
pub fn upscale_nearest(rgba: &[u8], width: usize, height: usize, scale: f64) -> (Vec<u8>, usize, usize) {
    let out_w = (width as f64 * scale).round() as usize;
    let out_h = (height as f64 * scale).round() as usize;
    let mut out = Vec::with_capacity(out_w * out_h * 4);
    for y in 0..out_h {
        let sy = ((y as f64 / scale).floor() as usize).min(height.saturating_sub(1));
        for x in 0..out_w {
            let sx = ((x as f64 / scale).floor() as usize).min(width.saturating_sub(1));
            let i = (sy * width + sx) * 4;
            out.extend_from_slice(&rgba[i..i + 4]);
        }
    }
    (out, out_w, out_h)
}

fn report(result: Result<(), JsValue>, op: &'static str) {
    if let Err(e) = result {
        tracing::debug!(op, error = ?e, "canvas call failed");
    }
}

impl Surface for CanvasSurface {
    fn resize(&mut self, viewport: &ViewportInfo) {
        let (w, h) = viewport.physical_size();
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        let s = viewport.pixel_scale;
        report(self.context.set_transform(s, 0.0, 0.0, s, 0.0, 0.0), "set_transform");
        self.viewport = Some(*viewport);
    }

    fn clear(&mut self) {
        if let Some(v) = self.viewport {
            self.context.clear_rect(0.0, 0.0, v.width, v.height);
        }
    }

    fn draw_line(&mut self, from: DVec2, to: DVec2, stroke: &Stroke) {
        self.draw_polyline(&[from, to], stroke);
    }

    fn draw_polyline(&mut self, points: &[DVec2], stroke: &Stroke) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        if rest.is_empty() {
            return;
        }
        self.set_stroke(stroke);
        self.context.begin_path();
        self.context.move_to(first.x, first.y);
        for p in rest {
            self.context.line_to(p.x, p.y);
        }
        self.context.stroke();
    }

    fn draw_circle(&mut self, center: DVec2, radius: f64, fill: &Fill) {
        if !(radius > 0.0) {
            return;
        }
        self.context.set_fill_style_str(&fill.color.css_rgba(fill.alpha));
        self.context.begin_path();
        report(self.context.arc(center.x, center.y, radius, 0.0, TAU), "arc");
        self.context.fill();
    }

    /// Replaces the covered region; `putImageData` does not blend.
    fn draw_pixels(&mut self, width: usize, height: usize, rgba: &[u8]) {
        if width.checked_mul(height).and_then(|n| n.checked_mul(4)) != Some(rgba.len()) || rgba.is_empty() {
            return;
        }
        let scale = self.viewport.map_or(1.0, |v| v.pixel_scale);
        let (pixels, w, h) = if scale == 1.0 {
            (rgba.to_vec(), width, height)
        } else {
            upscale_nearest(rgba, width, height, scale)
        };
        let (Ok(w), Ok(h)) = (u32::try_from(w), u32::try_from(h)) else {
            return;
        };
        match ImageData::new_with_u8_clamped_array_and_sh(Clamped(&pixels), w, h) {
            Ok(image) => report(self.context.put_image_data(&image, 0.0, 0.0), "put_image_data"),
            Err(e) => tracing::debug!(error = ?e, "image data rejected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_stroke_has_no_dash_segments() {
        assert!(dash_segments(&DashPattern::Solid).is_empty());
        assert_eq!(dash_segments(&DashPattern::Dashed { on: 6.0, off: 8.0 }), vec![6.0, 8.0]);
    }

    #[test]
    fn upscale_doubles_each_pixel() {
        let img = [1, 1, 1, 255, 2, 2, 2, 255];
        let (out, w, h) = upscale_nearest(&img, 2, 1, 2.0);
        assert_eq!((w, h), (4, 2));
        let firsts: Vec<u8> = out.chunks_exact(4).map(|p| p[0]).collect();
        assert_eq!(firsts, vec![1, 1, 2, 2, 1, 1, 2, 2]);
    }

    #[test]
    fn fractional_scale_stays_in_bounds() {
        let img = vec![7; 3 * 3 * 4];
        let (out, w, h) = upscale_nearest(&img, 3, 3, 1.5);
        assert_eq!(out.len(), w * h * 4);
        assert!(out.iter().all(|&b| b == 7));
    }
}
