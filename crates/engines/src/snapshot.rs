//! PNG output of a rasterized frame.
//!
//! Feature-gated behind `png` (default on) so the wasm build can depend on
//! this crate without pulling in `image`. Rasterization itself lives in
//! [`crate::raster`] and is always available.

use holofield_core::FieldError;
use std::path::Path;

use crate::raster::RasterSurface;

/// Writes the surface's current pixels as an RGBA PNG at device resolution.
///
/// Returns `FieldError::InvalidDimensions` if the surface is empty or its
/// size overflows `u32`, or `FieldError::Io` on write failure.
pub fn write_png(surface: &RasterSurface, path: &Path) -> Result<(), FieldError> {
    if surface.width() == 0 || surface.height() == 0 {
        return Err(FieldError::InvalidDimensions);
    }
    let w = u32::try_from(surface.width()).map_err(|_| FieldError::InvalidDimensions)?;
    let h = u32::try_from(surface.height()).map_err(|_| FieldError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, surface.pixels().to_vec())
        .ok_or_else(|| FieldError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| FieldError::Io(e.to_string()))?;
    tracing::debug!(path = %path.display(), width = w, height = h, "png written");
    Ok(())
}
