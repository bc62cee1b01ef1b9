//! Runs a [`Scene`] to completion without a display.
//!
//! Headless runs step one reference frame per callback so a scene renders the
//! same on every machine regardless of how fast frames are produced. Only the
//! first and the final frame are rasterized.

use holofield_core::scheduler::REFERENCE_HZ;
use holofield_core::{
    Animation, FieldError, FixedRate, FrameScheduler, Scene, Surface, TimeStep,
};
use serde_json::Value;
use std::num::NonZeroU32;

use crate::FieldKind;

/// Final state of a headless run.
#[derive(Debug)]
pub struct HeadlessRun<S> {
    /// Holds the last frame.
    pub surface: S,
    pub frames: u64,
    pub field: &'static str,
    /// Effective parameters after defaults were applied.
    pub params: Value,
}

/// Builds the scene's field, ticks it `scene.frames` times with the scene's
/// pointer held fixed, then renders the final state once into `surface`.
pub fn run_scene<S: Surface>(scene: &Scene, surface: S) -> Result<HeadlessRun<S>, FieldError> {
    let field = FieldKind::from_scene(scene)?;
    let name = field.name();
    let params = field.params();

    let mut scheduler = FrameScheduler::new(scene.viewport()?, TimeStep::PerFrame)?;
    scheduler.add_with_stride(Box::new(field), surface, NonZeroU32::MAX);
    scheduler.set_pointer(scene.pointer);
    let frames = scheduler.run(&mut FixedRate::new(scene.frames as u64, REFERENCE_HZ));
    scheduler.render_all();
    tracing::debug!(field = name, frames, seed = scene.seed, "headless run finished");

    let surface = scheduler
        .into_surfaces()
        .pop()
        .ok_or_else(|| FieldError::config("scene", "scheduler lost its slot"))?;
    Ok(HeadlessRun {
        surface,
        frames,
        field: name,
        params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RasterSurface;
    use holofield_core::{PointerState, RecordingSurface, ViewportInfo};
    use serde_json::json;

    #[test]
    fn particle_scene_runs_requested_frames() {
        let mut scene = Scene::new("particles", 320, 200, 42);
        scene.frames = 30;
        let run = run_scene(&scene, RecordingSurface::new()).unwrap();
        assert_eq!(run.frames, 30);
        assert_eq!(run.field, "particles");
        assert_eq!(run.params["count"], 60);
        // frame 0 plus the final render
        assert_eq!(run.surface.clears(), 2);
        assert_eq!(run.surface.summary().circles, 60);
    }

    #[test]
    fn zero_frames_still_renders_initial_state() {
        let scene = Scene::new("waves", 300, 90, 1);
        let run = run_scene(&scene, RecordingSurface::new()).unwrap();
        assert_eq!(run.frames, 0);
        assert_eq!(run.surface.summary().polylines, 9);
    }

    #[test]
    fn first_frame_shows_the_initial_scatter() {
        let scene = Scene::new("particles", 640, 360, 11);
        let run = run_scene(&scene, RecordingSurface::new()).unwrap();

        let fresh = FieldKind::from_scene(&scene).unwrap();
        let mut expected = RecordingSurface::new();
        fresh.render(&mut expected);
        assert_eq!(run.surface.commands(), expected.commands());
    }

    #[test]
    fn same_scene_renders_bit_identical_pixels() {
        let mut scene = Scene::new("particles", 160, 120, 7);
        scene.frames = 12;
        scene.pointer = Some(PointerState::new(80.0, 60.0));
        scene.params = json!({"repulsion": true});
        let viewport = ViewportInfo::new(160.0, 120.0, 1.0).unwrap();
        let a = run_scene(&scene, RasterSurface::new(&viewport)).unwrap();
        let b = run_scene(&scene, RasterSurface::new(&viewport)).unwrap();
        assert_eq!(a.surface.pixels(), b.surface.pixels());
        assert!(a.surface.pixels().chunks_exact(4).any(|p| p[3] > 0));
    }

    #[test]
    fn invalid_scene_is_rejected_before_running() {
        let scene = Scene::new("particles", 0, 200, 1);
        assert!(matches!(
            run_scene(&scene, RecordingSurface::new()),
            Err(FieldError::InvalidDimensions)
        ));
        let scene = Scene::new("fireworks", 10, 10, 1);
        assert!(matches!(
            run_scene(&scene, RecordingSurface::new()),
            Err(FieldError::UnknownField(_))
        ));
    }
}
