//! PNG output for a [`PixelSurface`].
//!
//! Feature-gated behind `png` (default on) so that consumers that only need
//! the in-memory surface do not pull in the `image` crate.

use constellation_core::EngineError;
use std::path::Path;

use crate::pixel::PixelSurface;

/// Writes the surface's RGBA buffer as a PNG.
///
/// Returns `EngineError::InvalidDimensions` if a side overflows `u32`, or
/// `EngineError::Io` on write failure.
pub fn write_png(surface: &PixelSurface, path: &Path) -> Result<(), EngineError> {
    let w = u32::try_from(surface.width()).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(surface.height()).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, surface.data().to_vec())
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))?;
    log::info!("wrote {}x{} snapshot to {}", w, h, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use constellation_core::{Seed, Srgb};

    #[test]
    fn write_png_round_trip() {
        let mut seed = Seed::new(64, 32, 42);
        seed.frames = 10;
        let surface = crate::render_seed(&seed, Some(Srgb::from_u8(15, 23, 42))).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");

        write_png(&surface, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 64);
        assert_eq!(img.height(), 32);
        assert_eq!(img.into_raw(), surface.into_data());
    }

    #[test]
    fn write_png_into_missing_directory_is_io_error() {
        let surface = PixelSurface::new(4, 4, None).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("frame.png");
        assert!(matches!(write_png(&surface, &path), Err(EngineError::Io(_))));
    }
}
