//! Reproducible recipe for a rendered frame.
//!
//! A [`Seed`] holds everything needed to rebuild a field and replay it to
//! the same frame: surface size, parameter overrides, PRNG seed, frame
//! count, and where the pointer rested.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::field::{Bounds, ParticleField};
use crate::params::FieldParams;

/// Largest accepted width or height, in pixels.
pub const MAX_SIDE: usize = 16_384;

/// Recipe for a deterministic frame. Replaying the same `Seed` produces a
/// bit-identical field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seed {
    pub width: usize,
    pub height: usize,
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
    pub seed: u64,
    #[serde(default)]
    pub frames: usize,
    /// Pointer position held for every frame; the origin when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<[f64; 2]>,
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Seed {
    /// Creates a seed with default params (`{}`), zero frames, and no pointer.
    pub fn new(width: usize, height: usize, seed: u64) -> Self {
        Self {
            width,
            height,
            params: empty_params(),
            seed,
            frames: 0,
            pointer: None,
        }
    }

    /// Checks that the surface is non-empty and neither side exceeds [`MAX_SIDE`].
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 || self.width > MAX_SIDE || self.height > MAX_SIDE {
            return Err(EngineError::InvalidDimensions);
        }
        Ok(())
    }

    /// Surface size as field bounds.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width as f64, self.height as f64)
    }

    /// Held pointer position, or the origin.
    pub fn pointer(&self) -> DVec2 {
        self.pointer.map(DVec2::from_array).unwrap_or(DVec2::ZERO)
    }

    /// Builds the field and advances it `frames` times.
    pub fn replay(&self) -> Result<ParticleField, EngineError> {
        self.validate()?;
        let params = FieldParams::from_json(&self.params)?;
        let mut field = ParticleField::new(self.bounds(), self.seed, params);
        field.set_pointer(self.pointer());
        (0..self.frames).for_each(|_| field.step());
        Ok(field)
    }
}
