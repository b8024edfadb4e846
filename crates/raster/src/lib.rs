#![deny(unsafe_code)]
//! Headless rendering for the constellation particle field.
//!
//! [`PixelSurface`] implements the core `Surface` trait on an RGBA8 buffer,
//! so a field can be drawn without a browser. The CLI uses it for offline
//! frames; the `png` feature adds [`snapshot::write_png`].

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use constellation_core::{EngineError, ParticleField, Seed, Srgb, Surface};

pub use pixel::PixelSurface;

/// Draws the field's current frame onto a fresh surface of the field's size.
///
/// Returns `EngineError::InvalidDimensions` if the field's bounds round down
/// to an empty surface.
pub fn render_field(field: &ParticleField, background: Option<Srgb>) -> Result<PixelSurface, EngineError> {
    let bounds = field.bounds();
    let mut surface = PixelSurface::new(bounds.width as usize, bounds.height as usize, background)?;
    field.draw(&mut surface);
    Ok(surface)
}

/// Replays a seed and renders its final frame.
pub fn render_seed(seed: &Seed, background: Option<Srgb>) -> Result<PixelSurface, EngineError> {
    let field = seed.replay()?;
    render_field(&field, background)
}
