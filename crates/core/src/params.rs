//! Tunable constants of the particle field and how they are read from JSON.
//!
//! [`FieldParams::default`] reproduces the hero-page effect exactly. Hosts
//! override individual keys with a JSON object; missing or mistyped keys
//! fall back to the defaults.

use serde_json::{json, Value};

use crate::color::{Rgba, Srgb};
use crate::error::EngineError;

/// Area units per particle.
pub const DEFAULT_DENSITY: f64 = 15_000.0;
/// Smallest accepted density; denser fields are rejected by [`FieldParams::from_json`].
pub const MIN_DENSITY: f64 = 1.0;
/// Pointer distance below which particles are pushed away.
pub const DEFAULT_INTERACTION_RADIUS: f64 = 100.0;
/// Peak repulsion impulse per frame at zero distance.
pub const DEFAULT_REPULSION: f64 = 0.01;
/// Spring constant pulling each particle toward its home.
pub const DEFAULT_SPRING: f64 = 0.001;
/// Per-frame velocity multiplier.
pub const DEFAULT_DAMPING: f64 = 0.99;
/// Initial velocity components are drawn from `±initial_speed / 2`.
pub const DEFAULT_INITIAL_SPEED: f64 = 0.5;
pub const DEFAULT_PARTICLE_RADIUS: f64 = 2.0;
pub const DEFAULT_PARTICLE_OPACITY: f64 = 0.6;
/// Pair distance below which a link is drawn.
pub const DEFAULT_LINK_DISTANCE: f64 = 120.0;
/// Link opacity at zero distance.
pub const DEFAULT_LINK_OPACITY: f64 = 0.3;
pub const DEFAULT_LINK_WIDTH: f64 = 1.0;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
///
/// JSON integers are accepted and widened.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a `bool` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

/// Extracts a `String` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Physics and styling constants for a [`ParticleField`](crate::field::ParticleField).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldParams {
    pub density: f64,
    pub interaction_radius: f64,
    pub repulsion: f64,
    pub spring: f64,
    pub damping: f64,
    pub initial_speed: f64,
    pub particle_radius: f64,
    pub particle_opacity: f64,
    pub link_distance: f64,
    pub link_opacity: f64,
    pub link_width: f64,
    pub color: Srgb,
    /// Respawn particles for the new area on resize instead of keeping them.
    pub repopulate_on_resize: bool,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            density: DEFAULT_DENSITY,
            interaction_radius: DEFAULT_INTERACTION_RADIUS,
            repulsion: DEFAULT_REPULSION,
            spring: DEFAULT_SPRING,
            damping: DEFAULT_DAMPING,
            initial_speed: DEFAULT_INITIAL_SPEED,
            particle_radius: DEFAULT_PARTICLE_RADIUS,
            particle_opacity: DEFAULT_PARTICLE_OPACITY,
            link_distance: DEFAULT_LINK_DISTANCE,
            link_opacity: DEFAULT_LINK_OPACITY,
            link_width: DEFAULT_LINK_WIDTH,
            color: Srgb::INDIGO,
            repopulate_on_resize: false,
        }
    }
}

impl FieldParams {
    /// Reads overrides from a JSON object, falling back to defaults.
    ///
    /// A malformed `color` or a `density` below [`MIN_DENSITY`] is an error;
    /// every other key silently keeps its default when missing or mistyped.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        let d = Self::default();
        let color = Srgb::from_hex(&param_string(params, "color", &d.color.to_hex()))?;
        let density = param_f64(params, "density", d.density);
        if !density.is_finite() || density < MIN_DENSITY {
            return Err(EngineError::InvalidParam(format!(
                "density must be a finite number >= {MIN_DENSITY}, got {density}"
            )));
        }
        Ok(Self {
            density,
            interaction_radius: param_f64(params, "interaction_radius", d.interaction_radius),
            repulsion: param_f64(params, "repulsion", d.repulsion),
            spring: param_f64(params, "spring", d.spring),
            damping: param_f64(params, "damping", d.damping),
            initial_speed: param_f64(params, "initial_speed", d.initial_speed),
            particle_radius: param_f64(params, "particle_radius", d.particle_radius),
            particle_opacity: param_f64(params, "particle_opacity", d.particle_opacity),
            link_distance: param_f64(params, "link_distance", d.link_distance),
            link_opacity: param_f64(params, "link_opacity", d.link_opacity),
            link_width: param_f64(params, "link_width", d.link_width),
            color,
            repopulate_on_resize: param_bool(params, "repopulate_on_resize", d.repopulate_on_resize),
        })
    }

    /// Current values as a JSON object, keyed like [`FieldParams::from_json`].
    pub fn to_json(&self) -> Value {
        json!({
            "density": self.density,
            "interaction_radius": self.interaction_radius,
            "repulsion": self.repulsion,
            "spring": self.spring,
            "damping": self.damping,
            "initial_speed": self.initial_speed,
            "particle_radius": self.particle_radius,
            "particle_opacity": self.particle_opacity,
            "link_distance": self.link_distance,
            "link_opacity": self.link_opacity,
            "link_width": self.link_width,
            "color": self.color.to_hex(),
            "repopulate_on_resize": self.repopulate_on_resize,
        })
    }

    /// Describes every key: type, default, and a short description.
    pub fn schema() -> Value {
        let d = Self::default();
        let num = |default: f64, description: &str| {
            json!({"type": "number", "default": default, "description": description})
        };
        json!({
            "density": num(d.density, "Area units per particle"),
            "interaction_radius": num(d.interaction_radius, "Pointer distance that triggers repulsion"),
            "repulsion": num(d.repulsion, "Peak repulsion impulse per frame"),
            "spring": num(d.spring, "Pull toward the home position per unit offset"),
            "damping": num(d.damping, "Velocity multiplier applied every frame"),
            "initial_speed": num(d.initial_speed, "Spread of the initial velocity components"),
            "particle_radius": num(d.particle_radius, "Dot radius"),
            "particle_opacity": num(d.particle_opacity, "Dot opacity"),
            "link_distance": num(d.link_distance, "Pair distance below which a link is drawn"),
            "link_opacity": num(d.link_opacity, "Link opacity at zero distance"),
            "link_width": num(d.link_width, "Link stroke width"),
            "color": {"type": "string", "default": d.color.to_hex(), "description": "Hex color for dots and links"},
            "repopulate_on_resize": {"type": "boolean", "default": d.repopulate_on_resize, "description": "Respawn particles when the surface is resized"},
        })
    }

    /// Fill color of a particle dot.
    pub fn particle_color(&self) -> Rgba {
        self.color.with_alpha(self.particle_opacity)
    }

    /// Opacity of a link between two particles `distance` apart.
    ///
    /// Fades linearly from `link_opacity` at 0 to 0 at `link_distance`;
    /// `None` at or beyond `link_distance`, where no link is drawn.
    pub fn link_opacity_at(&self, distance: f64) -> Option<f64> {
        edge_opacity(distance, self.link_distance, self.link_opacity)
    }
}

/// Linear fade `(max_distance - d) / max_distance * peak`, `None` when `d >= max_distance`.
pub fn edge_opacity(distance: f64, max_distance: f64, peak: f64) -> Option<f64> {
    (distance < max_distance).then(|| (max_distance - distance) / max_distance * peak)
}
