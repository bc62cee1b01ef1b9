#![deny(unsafe_code)]
//! Browser bindings.
//!
//! The page owns the animation loop: it calls [`FieldHandle::frame`] from
//! `requestAnimationFrame`, forwards resize and pointer events between frames,
//! and calls [`FieldHandle::stop`] when the field should go away. No tracing
//! subscriber is installed here.

pub mod canvas;

pub use canvas::CanvasSurface;

use holofield_core::{
    Animation, FieldError, FrameScheduler, PointerState, StopHandle, TimeStep, ViewportInfo,
};
use holofield_engines::FieldKind;
use std::num::NonZeroU32;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn parse_params(json: &str) -> Result<serde_json::Value, FieldError> {
    if json.trim().is_empty() {
        return Ok(serde_json::json!({}));
    }
    serde_json::from_str(json).map_err(|e| FieldError::config("params", e.to_string()))
}

/// One field bound to one canvas.
#[wasm_bindgen]
pub struct FieldHandle {
    scheduler: FrameScheduler<CanvasSurface>,
    stop: StopHandle,
    name: &'static str,
}

#[wasm_bindgen]
impl FieldHandle {
    /// Binds `field` (`particles`, `waves`, `grain`) to `canvas`.
    ///
    /// `params` is a JSON object string (may be empty). A `render_stride` of
    /// `n` renders on every n-th frame; 0 is treated as 1. With `per_frame`
    /// set, each callback is one simulation step regardless of elapsed time.
    #[wasm_bindgen(constructor)]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        canvas: HtmlCanvasElement,
        field: &str,
        width: f64,
        height: f64,
        pixel_scale: f64,
        seed: u64,
        params: &str,
        render_stride: u32,
        per_frame: bool,
    ) -> Result<FieldHandle, JsValue> {
        let viewport = ViewportInfo::new(width, height, pixel_scale).map_err(js_error)?;
        let params = parse_params(params).map_err(js_error)?;
        let kind = FieldKind::from_name(field, &viewport, seed, &params).map_err(js_error)?;
        let time_step = if per_frame {
            TimeStep::PerFrame
        } else {
            TimeStep::default()
        };
        let mut scheduler = FrameScheduler::new(viewport, time_step).map_err(js_error)?;
        let stride = NonZeroU32::new(render_stride).unwrap_or(NonZeroU32::MIN);
        let name = kind.name();
        scheduler.add_with_stride(Box::new(kind), CanvasSurface::new(canvas)?, stride);
        let stop = scheduler.stop_handle();
        Ok(Self {
            scheduler,
            stop,
            name,
        })
    }

    /// Names accepted by the constructor.
    pub fn fields() -> js_sys::Array {
        FieldKind::list_fields()
            .iter()
            .map(|n| JsValue::from_str(n))
            .collect()
    }

    #[wasm_bindgen(getter)]
    pub fn name(&self) -> String {
        self.name.to_string()
    }

    /// Runs one frame. Returns `false` once stopped, so the page can stop
    /// requesting frames.
    pub fn frame(&mut self, timestamp_ms: f64) -> bool {
        self.scheduler.frame(timestamp_ms)
    }

    pub fn resize(&mut self, width: f64, height: f64, pixel_scale: f64) -> Result<(), JsValue> {
        let viewport = ViewportInfo::new(width, height, pixel_scale).map_err(js_error)?;
        self.scheduler.resize(viewport);
        Ok(())
    }

    #[wasm_bindgen(js_name = setPointer)]
    pub fn set_pointer(&mut self, x: f64, y: f64) {
        self.scheduler.set_pointer(Some(PointerState::new(x, y)));
    }

    #[wasm_bindgen(js_name = clearPointer)]
    pub fn clear_pointer(&mut self) {
        self.scheduler.set_pointer(None);
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    #[wasm_bindgen(js_name = isStopped)]
    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    #[wasm_bindgen(js_name = frameCount)]
    pub fn frame_count(&self) -> f64 {
        self.scheduler.frame_count() as f64
    }
}
