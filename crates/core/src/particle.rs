//! A single particle and its per-frame update rule.

use glam::DVec2;

use crate::params::FieldParams;

/// A point mass that flees the pointer and springs back to a fixed home.
///
/// `home` is captured at creation and has no setter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: DVec2,
    pub velocity: DVec2,
    home: DVec2,
}

impl Particle {
    /// Creates a particle resting at `position`, which also becomes its home.
    pub fn new(position: DVec2, velocity: DVec2) -> Self {
        Self {
            position,
            velocity,
            home: position,
        }
    }

    /// The restoring-force target fixed at creation.
    pub fn home(&self) -> DVec2 {
        self.home
    }

    /// Distance from the current position to home.
    pub fn displacement(&self) -> f64 {
        self.position.distance(self.home)
    }

    /// Advances one frame (semi-implicit Euler).
    ///
    /// Order matters: repulsion and spring change the velocity, the new
    /// velocity moves the particle, then damping applies for the next frame.
    /// Positions are never clamped to the surface.
    pub fn update(&mut self, pointer: DVec2, params: &FieldParams) {
        let delta = pointer - self.position;
        let distance = delta.length();

        if distance < params.interaction_radius {
            let force = (params.interaction_radius - distance) / params.interaction_radius;
            let angle = delta.y.atan2(delta.x);
            // Subtracting pushes the particle away from the pointer.
            self.velocity.x -= angle.cos() * force * params.repulsion;
            self.velocity.y -= angle.sin() * force * params.repulsion;
        }

        self.velocity += (self.home - self.position) * params.spring;
        self.position += self.velocity;
        self.velocity *= params.damping;
    }
}
