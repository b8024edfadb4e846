#![deny(unsafe_code)]
//! Core of the constellation particle field.
//!
//! Provides [`Particle`] and its update rule, [`ParticleField`] (spawning,
//! advance, proximity links, drawing), the [`Surface`] drawing trait, the
//! [`AnimationLoop`] frame driver with its [`FrameHost`] abstraction,
//! [`FieldParams`], the `Xorshift64` PRNG, and reproducible [`Seed`]s.

pub mod animation;
pub mod color;
pub mod error;
pub mod field;
pub mod params;
pub mod particle;
pub mod prng;
pub mod seed;
pub mod surface;

pub use animation::{AnimationLoop, FrameHandle, FrameHost, LoopState, PointerHandle, Subscription};
pub use color::{Rgba, Srgb};
pub use error::EngineError;
pub use field::{Bounds, Edge, FieldStats, ParticleField, MAX_PARTICLES};
pub use params::FieldParams;
pub use particle::Particle;
pub use prng::Xorshift64;
pub use seed::Seed;
pub use surface::{DrawCommand, RecordingSurface, Surface};
