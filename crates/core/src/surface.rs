//! Immediate-mode drawing target for the particle field.
//!
//! A [`Surface`] is whatever the host draws on: a browser canvas, an RGBA
//! buffer, or the [`RecordingSurface`] used for inspection and tests.

use glam::DVec2;

use crate::color::Rgba;
use crate::field::Bounds;

/// A 2D drawing target with a pixel size that may follow its display size.
pub trait Surface {
    /// Resizes the backing store to the displayed size and returns it.
    ///
    /// Surfaces without a separate display size return [`Surface::bounds`].
    fn fit_to_display(&mut self) -> Bounds {
        self.bounds()
    }

    /// Current pixel size.
    fn bounds(&self) -> Bounds;

    /// Erases everything drawn so far.
    fn clear(&mut self);

    /// Fills a circle.
    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba);

    /// Strokes a straight segment.
    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Rgba);
}

/// One recorded drawing call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Clear,
    Circle {
        center: DVec2,
        radius: f64,
        color: Rgba,
    },
    Line {
        from: DVec2,
        to: DVec2,
        width: f64,
        color: Rgba,
    },
}

/// A surface that records the calls of the most recent frame.
///
/// `clear` drops earlier commands, so after a draw the recording holds exactly
/// one frame.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    bounds: Bounds,
    commands: Vec<DrawCommand>,
    frames: usize,
}

impl RecordingSurface {
    /// Creates an empty recording of the given size.
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            commands: Vec::new(),
            frames: 0,
        }
    }

    /// Simulates the display changing size; picked up on the next fit or frame.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    /// Calls made since the last `clear`, starting with that `clear`.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of `clear` calls, i.e. frames drawn.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Circles in the current recording.
    pub fn circle_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count()
    }

    /// Lines in the current recording.
    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
        self.frames += 1;
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Rgba) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Srgb;

    #[test]
    fn clear_starts_a_new_recording() {
        let mut s = RecordingSurface::new(Bounds::new(10.0, 10.0));
        let c = Srgb::INDIGO.with_alpha(1.0);
        s.clear();
        s.fill_circle(DVec2::ZERO, 1.0, c);
        s.clear();
        s.stroke_line(DVec2::ZERO, DVec2::ONE, 1.0, c);
        assert_eq!(s.frames(), 2);
        assert_eq!(s.circle_count(), 0);
        assert_eq!(s.line_count(), 1);
        assert_eq!(s.commands()[0], DrawCommand::Clear);
    }

    #[test]
    fn default_fit_returns_current_bounds() {
        let mut s = RecordingSurface::new(Bounds::new(30.0, 20.0));
        s.set_bounds(Bounds::new(60.0, 40.0));
        assert_eq!(s.fit_to_display(), Bounds::new(60.0, 40.0));
    }

    #[test]
    fn surface_is_object_safe() {
        let mut s = RecordingSurface::new(Bounds::new(5.0, 5.0));
        let dyn_surface: &mut dyn Surface = &mut s;
        dyn_surface.clear();
        assert_eq!(dyn_surface.bounds().width, 5.0);
    }
}
