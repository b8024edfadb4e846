//! The particle field: spawning, per-frame advance, proximity links, drawing.
//!
//! Particle count is derived from the surface area once, at creation. The
//! field never wraps or reflects particles at its bounds, so a strongly
//! disturbed particle may briefly leave the surface before its spring brings
//! it back.

use glam::DVec2;
use serde::Serialize;
use serde_json::Value;

use crate::params::FieldParams;
use crate::particle::Particle;
use crate::prng::Xorshift64;
use crate::surface::Surface;

/// Upper bound on the particles spawned for any surface and density.
pub const MAX_PARTICLES: usize = 5_000;

/// Size of the drawable surface in area units (pixels on a canvas).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Creates bounds, treating negative or NaN extents as 0.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// `width * height`.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// `floor(area / density)`, capped at [`MAX_PARTICLES`]; 0 for a
    /// non-positive or NaN density.
    pub fn particle_count(&self, density: f64) -> usize {
        if density.is_nan() || density <= 0.0 {
            return 0;
        }
        let count = (self.area() / density).floor();
        if count >= MAX_PARTICLES as f64 {
            MAX_PARTICLES
        } else {
            count as usize
        }
    }
}

/// A link between two particles closer than the link distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Index of the first particle; always less than `b`.
    pub a: usize,
    pub b: usize,
    pub distance: f64,
    pub opacity: f64,
}

/// Aggregate numbers describing the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldStats {
    pub particles: usize,
    pub edges: usize,
    /// Mean distance between particles and their homes.
    pub mean_displacement: f64,
    /// Sum of `|v|^2 / 2` over all particles (unit mass).
    pub kinetic_energy: f64,
}

/// A set of particles evolving on a surface of a given size.
#[derive(Debug, Clone)]
pub struct ParticleField {
    bounds: Bounds,
    particles: Vec<Particle>,
    pointer: DVec2,
    params: FieldParams,
    rng: Xorshift64,
}

impl ParticleField {
    /// Spawns `floor(area / density)` particles at random homes with small
    /// random velocities. Zero area gives an empty field.
    pub fn new(bounds: Bounds, seed: u64, params: FieldParams) -> Self {
        let mut rng = Xorshift64::new(seed);
        let particles = spawn(&mut rng, bounds, &params);
        log::debug!(
            "spawned {} particles on {}x{} (seed {seed})",
            particles.len(),
            bounds.width,
            bounds.height
        );
        Self {
            bounds,
            particles,
            pointer: DVec2::ZERO,
            params,
            rng,
        }
    }

    /// Builds a field from explicit particles, bypassing the density rule.
    pub fn from_particles(bounds: Bounds, particles: Vec<Particle>, params: FieldParams) -> Self {
        Self {
            bounds,
            particles,
            pointer: DVec2::ZERO,
            params,
            rng: Xorshift64::new(0),
        }
    }

    /// Surface size the field was last created or resized for.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// All particles, in spawn order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// True when the surface was too small to hold a particle.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Typed parameters; see [`ParticleField::params`] for the JSON view.
    pub fn field_params(&self) -> &FieldParams {
        &self.params
    }

    /// Last known pointer position, the origin until the first update.
    pub fn pointer(&self) -> DVec2 {
        self.pointer
    }

    /// Stores the pointer used by [`ParticleField::step`].
    pub fn set_pointer(&mut self, pointer: DVec2) {
        self.pointer = pointer;
    }

    /// Moves every particle one frame with `pointer` as the repulsion source.
    pub fn advance(&mut self, pointer: DVec2) {
        let params = self.params;
        for particle in &mut self.particles {
            particle.update(pointer, &params);
        }
    }

    /// Advances one frame using the stored pointer.
    pub fn step(&mut self) {
        self.advance(self.pointer);
    }

    /// Records new surface bounds.
    ///
    /// Particles keep their homes and positions unless
    /// `repopulate_on_resize` is set, in which case the field is respawned
    /// for the new area from its own generator.
    pub fn resize(&mut self, bounds: Bounds) {
        if bounds == self.bounds {
            return;
        }
        self.bounds = bounds;
        if self.params.repopulate_on_resize {
            self.particles = spawn(&mut self.rng, bounds, &self.params);
        }
        log::debug!(
            "resized to {}x{}, {} particles",
            bounds.width,
            bounds.height,
            self.particles.len()
        );
    }

    /// Every pair `a < b` closer than the link distance, with its fade opacity.
    ///
    /// O(n²) in the particle count.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        let particles = &self.particles;
        let params = &self.params;
        (0..particles.len()).flat_map(move |a| {
            ((a + 1)..particles.len()).filter_map(move |b| {
                let distance = particles[a].position.distance(particles[b].position);
                params.link_opacity_at(distance).map(|opacity| Edge {
                    a,
                    b,
                    distance,
                    opacity,
                })
            })
        })
    }

    /// Clears the surface, then draws all dots followed by all links.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.clear();

        let dot = self.params.particle_color();
        for particle in &self.particles {
            surface.fill_circle(particle.position, self.params.particle_radius, dot);
        }

        for edge in self.edges() {
            surface.stroke_line(
                self.particles[edge.a].position,
                self.particles[edge.b].position,
                self.params.link_width,
                self.params.color.with_alpha(edge.opacity),
            );
        }
    }

    /// Particle and link counts, mean displacement, and kinetic energy.
    pub fn stats(&self) -> FieldStats {
        let n = self.particles.len();
        let mean_displacement = if n == 0 {
            0.0
        } else {
            self.particles.iter().map(Particle::displacement).sum::<f64>() / n as f64
        };
        FieldStats {
            particles: n,
            edges: self.edges().count(),
            mean_displacement,
            kinetic_energy: self
                .particles
                .iter()
                .map(|p| 0.5 * p.velocity.length_squared())
                .sum(),
        }
    }

    /// Current parameter values as a JSON object.
    pub fn params(&self) -> Value {
        self.params.to_json()
    }

    /// Schema describing every parameter, its type, and its default.
    pub fn param_schema(&self) -> Value {
        FieldParams::schema()
    }
}

fn spawn(rng: &mut Xorshift64, bounds: Bounds, params: &FieldParams) -> Vec<Particle> {
    let count = bounds.particle_count(params.density);
    (0..count)
        .map(|_| {
            let position = rng.next_point(bounds);
            let vx = rng.next_centered(params.initial_speed);
            let vy = rng.next_centered(params.initial_speed);
            Particle::new(position, DVec2::new(vx, vy))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};

    fn field(width: f64, height: f64, seed: u64) -> ParticleField {
        ParticleField::new(Bounds::new(width, height), seed, FieldParams::default())
    }

    fn pair(distance: f64) -> ParticleField {
        let particles = vec![
            Particle::new(DVec2::new(100.0, 100.0), DVec2::ZERO),
            Particle::new(DVec2::new(100.0 + distance, 100.0), DVec2::ZERO),
        ];
        ParticleField::from_particles(Bounds::new(400.0, 400.0), particles, FieldParams::default())
    }

    #[test]
    fn count_follows_area_over_density() {
        assert_eq!(field(300.0, 150.0, 1).len(), 3);
        assert_eq!(field(1920.0, 1080.0, 1).len(), 138);
        assert_eq!(field(100.0, 100.0, 1).len(), 0);
    }

    #[test]
    fn tiny_density_is_capped_instead_of_exhausting_memory() {
        assert_eq!(Bounds::new(300.0, 150.0).particle_count(1e-300), MAX_PARTICLES);
        assert_eq!(Bounds::new(300.0, 150.0).particle_count(f64::NAN), 0);
        let mut params = FieldParams::default();
        params.density = 1e-300;
        let f = ParticleField::new(Bounds::new(300.0, 150.0), 1, params);
        assert_eq!(f.len(), MAX_PARTICLES);
    }

    #[test]
    fn zero_area_gives_empty_field() {
        let f = field(0.0, 900.0, 5);
        assert!(f.is_empty());
        assert_eq!(f.edges().count(), 0);
        assert_eq!(f.stats().mean_displacement, 0.0);
    }

    #[test]
    fn negative_bounds_are_treated_as_empty() {
        assert_eq!(Bounds::new(-300.0, 150.0).area(), 0.0);
        assert!(field(-300.0, 150.0, 1).is_empty());
    }

    #[test]
    fn spawned_particles_start_home_inside_bounds() {
        let f = field(800.0, 600.0, 42);
        for p in f.particles() {
            assert_eq!(p.position, p.home());
            assert!((0.0..800.0).contains(&p.position.x));
            assert!((0.0..600.0).contains(&p.position.y));
            assert!(p.velocity.x.abs() <= 0.25 && p.velocity.y.abs() <= 0.25);
        }
    }

    #[test]
    fn same_seed_gives_identical_fields() {
        let mut a = field(640.0, 480.0, 99);
        let mut b = field(640.0, 480.0, 99);
        a.set_pointer(DVec2::new(320.0, 240.0));
        b.set_pointer(DVec2::new(320.0, 240.0));
        for _ in 0..50 {
            a.step();
            b.step();
        }
        assert!(a
            .particles()
            .iter()
            .zip(b.particles())
            .all(|(pa, pb)| pa.position.x.to_bits() == pb.position.x.to_bits()
                && pa.position.y.to_bits() == pb.position.y.to_bits()));
    }

    #[test]
    fn different_seeds_scatter_differently() {
        let a = field(640.0, 480.0, 1);
        let b = field(640.0, 480.0, 2);
        assert_ne!(a.particles()[0].position, b.particles()[0].position);
    }

    #[test]
    fn pointer_defaults_to_origin() {
        assert_eq!(field(300.0, 300.0, 1).pointer(), DVec2::ZERO);
    }

    #[test]
    fn particles_settle_home_when_pointer_is_out_of_reach() {
        // Pick a seed whose three particles all sit well away from the origin,
        // where the pointer stays for the whole run.
        let mut f = (1..)
            .map(|seed| field(300.0, 150.0, seed))
            .find(|f| f.particles().iter().all(|p| p.home().length() > 130.0))
            .unwrap();
        assert_eq!(f.len(), 3);
        for _ in 0..1000 {
            f.advance(DVec2::ZERO);
        }
        for p in f.particles() {
            assert!(
                p.displacement() < 0.05,
                "particle {:?} still {} from home",
                p.position,
                p.displacement()
            );
        }
    }

    #[test]
    fn particles_are_not_clamped_to_bounds() {
        let particles = vec![Particle::new(DVec2::new(1.0, 1.0), DVec2::new(-5.0, -5.0))];
        let mut f =
            ParticleField::from_particles(Bounds::new(100.0, 100.0), particles, FieldParams::default());
        f.advance(DVec2::new(1000.0, 1000.0));
        let p = f.particles()[0].position;
        assert!(p.x < 0.0 && p.y < 0.0, "position {p:?} was clamped");
    }

    #[test]
    fn pair_fifty_apart_draws_one_link_at_0_175() {
        let f = pair(50.0);
        let mut surface = RecordingSurface::new(Bounds::new(400.0, 400.0));
        f.draw(&mut surface);

        let lines: Vec<_> = surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Line { color, width, .. } => Some((*color, *width)),
                _ => None,
            })
            .collect();
        assert_eq!(lines.len(), 1);
        assert!((lines[0].0.alpha - 0.175).abs() < 1e-12, "alpha {}", lines[0].0.alpha);
        assert_eq!(lines[0].1, 1.0);
    }

    #[test]
    fn draw_clears_then_dots_then_links() {
        let f = pair(10.0);
        let mut surface = RecordingSurface::new(Bounds::new(400.0, 400.0));
        f.draw(&mut surface);
        let cmds = surface.commands();
        assert_eq!(cmds.len(), 4);
        assert!(matches!(cmds[0], DrawCommand::Clear));
        assert!(matches!(cmds[1], DrawCommand::Circle { radius, .. } if radius == 2.0));
        assert!(matches!(cmds[2], DrawCommand::Circle { .. }));
        assert!(matches!(cmds[3], DrawCommand::Line { .. }));
        if let DrawCommand::Circle { color, .. } = cmds[1] {
            assert_eq!(color.to_css(), "rgba(99, 102, 241, 0.6)");
        }
    }

    #[test]
    fn no_link_at_or_beyond_threshold() {
        assert_eq!(pair(120.0).edges().count(), 0);
        assert_eq!(pair(150.0).edges().count(), 0);
        assert_eq!(pair(119.0).edges().count(), 1);
    }

    #[test]
    fn coincident_particles_link_at_peak_opacity() {
        let edge = pair(0.0).edges().next().unwrap();
        assert_eq!(edge.opacity, 0.3);
        assert_eq!((edge.a, edge.b), (0, 1));
    }

    #[test]
    fn edges_enumerate_each_unordered_pair_once() {
        let particles = (0..4)
            .map(|i| Particle::new(DVec2::new(i as f64 * 10.0, 0.0), DVec2::ZERO))
            .collect();
        let f = ParticleField::from_particles(Bounds::new(100.0, 100.0), particles, FieldParams::default());
        let edges: Vec<_> = f.edges().map(|e| (e.a, e.b)).collect();
        assert_eq!(edges, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn resize_keeps_particles_by_default() {
        let mut f = field(600.0, 300.0, 3);
        let before = f.particles().to_vec();
        f.resize(Bounds::new(1200.0, 900.0));
        assert_eq!(f.bounds(), Bounds::new(1200.0, 900.0));
        assert_eq!(f.particles(), &before[..]);
    }

    #[test]
    fn resize_can_repopulate() {
        let mut params = FieldParams::default();
        params.repopulate_on_resize = true;
        let mut f = ParticleField::new(Bounds::new(600.0, 300.0), 3, params);
        assert_eq!(f.len(), 12);
        f.resize(Bounds::new(1200.0, 900.0));
        assert_eq!(f.len(), 72);
        assert!(f
            .particles()
            .iter()
            .all(|p| p.position.x < 1200.0 && p.position.y < 900.0));
    }

    #[test]
    fn stats_report_counts_and_energy() {
        let particles = vec![
            Particle::new(DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0)),
            Particle::new(DVec2::new(30.0, 40.0), DVec2::new(0.0, 2.0)),
        ];
        let f = ParticleField::from_particles(Bounds::new(100.0, 100.0), particles, FieldParams::default());
        let stats = f.stats();
        assert_eq!(stats.particles, 2);
        assert_eq!(stats.edges, 1);
        assert_eq!(stats.mean_displacement, 0.0);
        assert_eq!(stats.kinetic_energy, 2.5);
    }

    #[test]
    fn params_and_schema_are_json_objects() {
        let f = field(300.0, 300.0, 1);
        assert_eq!(f.params()["link_distance"], 120.0);
        assert!(f.param_schema().get("interaction_radius").is_some());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn particle_count_is_floor_of_area_over_density(w in 0.0_f64..2000.0, h in 0.0_f64..2000.0) {
                let expected = (w * h / 15_000.0).floor() as usize;
                prop_assert_eq!(Bounds::new(w, h).particle_count(15_000.0), expected);
                prop_assert_eq!(field(w, h, 11).len(), expected);
            }

            #[test]
            fn small_areas_have_no_particles(w in 0.0_f64..150.0, h in 0.0_f64..100.0) {
                prop_assert_eq!(field(w, h, 3).len(), 0);
            }

            #[test]
            fn edge_opacity_depends_only_on_distance(d in 0.0_f64..200.0) {
                let f = pair(d);
                let opacity = f.edges().next().map(|e| e.opacity);
                prop_assert_eq!(opacity, FieldParams::default().link_opacity_at(f.particles()[0].position.distance(f.particles()[1].position)));
            }
        }
    }
}
