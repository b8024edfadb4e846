//! RGBA8 software surface.
//!
//! Composites with straight-alpha source-over, like a 2D canvas, and
//! anti-aliases edges with a one-pixel coverage ramp. Always available so
//! tests and the CLI can render without the `png` feature.

use constellation_core::{Bounds, EngineError, Rgba, Srgb, Surface};
use glam::DVec2;

/// A `width * height` RGBA8 buffer, row-major.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: usize,
    height: usize,
    background: Option<Srgb>,
    data: Vec<u8>,
}

impl PixelSurface {
    /// Creates a cleared surface. With no background, cleared pixels are
    /// transparent black, otherwise the opaque background color.
    ///
    /// Returns `EngineError::InvalidDimensions` for a zero or overflowing size.
    pub fn new(width: usize, height: usize, background: Option<Srgb>) -> Result<Self, EngineError> {
        let len = buffer_len(width, height)?;
        let mut surface = Self {
            width,
            height,
            background,
            data: vec![0; len],
        };
        surface.clear();
        Ok(surface)
    }

    /// Reallocates to a new size and clears.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), EngineError> {
        let len = buffer_len(width, height)?;
        self.width = width;
        self.height = height;
        self.data = vec![0; len];
        self.clear();
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// The RGBA bytes at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Composites `color` over pixel `(x, y)` scaled by `coverage` in [0, 1].
    fn blend(&mut self, x: usize, y: usize, color: Rgba, coverage: f64) {
        let src_a = color.alpha * coverage;
        if src_a <= 0.0 {
            return;
        }
        let i = (y * self.width + x) * 4;
        let dst = &mut self.data[i..i + 4];
        let dst_a = dst[3] as f64 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        let src = [color.rgb.r, color.rgb.g, color.rgb.b];
        for (d, s) in dst.iter_mut().zip(src) {
            let dc = *d as f64 / 255.0;
            let c = (s * src_a + dc * dst_a * (1.0 - src_a)) / out_a;
            *d = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        dst[3] = (out_a.clamp(0.0, 1.0) * 255.0).round() as u8;
    }

    /// Pixel ranges covering `[min, max]`, clipped to the surface.
    fn clip(&self, min: DVec2, max: DVec2) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
        let x0 = min.x.floor().max(0.0) as usize;
        let y0 = min.y.floor().max(0.0) as usize;
        let x1 = (max.x.ceil().max(0.0) as usize).min(self.width);
        let y1 = (max.y.ceil().max(0.0) as usize).min(self.height);
        (x0..x1, y0..y1)
    }

    /// Blends `color` wherever `distance(pixel center) < reach`, with a
    /// one-pixel coverage ramp at the edge.
    fn shade(&mut self, min: DVec2, max: DVec2, reach: f64, color: Rgba, distance: impl Fn(DVec2) -> f64) {
        let (xs, ys) = self.clip(min, max);
        for y in ys {
            for x in xs.clone() {
                let center = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                let coverage = (reach + 0.5 - distance(center)).clamp(0.0, 1.0);
                self.blend(x, y, color, coverage);
            }
        }
    }
}

fn buffer_len(width: usize, height: usize) -> Result<usize, EngineError> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(4))
        .ok_or(EngineError::InvalidDimensions)
}

/// Distance from `p` to the segment `a..b`.
fn segment_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

impl Surface for PixelSurface {
    fn bounds(&self) -> Bounds {
        Bounds::new(self.width as f64, self.height as f64)
    }

    fn clear(&mut self) {
        let fill = match self.background {
            Some(bg) => {
                let [r, g, b] = bg.to_u8();
                [r, g, b, 255]
            }
            None => [0; 4],
        };
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&fill);
        }
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        let reach = DVec2::splat(radius + 1.0);
        self.shade(center - reach, center + reach, radius, color, |p| p.distance(center));
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Rgba) {
        let half = width / 2.0;
        let reach = DVec2::splat(half + 1.0);
        self.shade(
            from.min(to) - reach,
            from.max(to) + reach,
            half,
            color,
            |p| segment_distance(p, from, to),
        );
    }
}
