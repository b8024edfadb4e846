//! [`Surface`] backed by an HTML canvas 2D context.

use std::f64::consts::TAU;

use constellation_core::{Bounds, Rgba, Surface};
use glam::DVec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// A canvas together with its 2D context.
///
/// Construction fails if the canvas cannot provide a 2D context, so a value
/// of this type is always drawable.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| JsValue::from_str("2d context has an unexpected type"))?;
        Ok(Self { canvas, ctx })
    }
}

/// Sets the canvas pixel size to its laid-out CSS size.
pub(crate) fn fit_canvas(canvas: &HtmlCanvasElement) {
    canvas.set_width(canvas.offset_width().max(0) as u32);
    canvas.set_height(canvas.offset_height().max(0) as u32);
}

impl Surface for CanvasSurface {
    fn fit_to_display(&mut self) -> Bounds {
        fit_canvas(&self.canvas);
        self.bounds()
    }

    fn bounds(&self) -> Bounds {
        Bounds::new(self.canvas.width() as f64, self.canvas.height() as f64)
    }

    fn clear(&mut self) {
        let Bounds { width, height } = self.bounds();
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        if self.ctx.arc(center.x, center.y, radius, 0.0, TAU).is_ok() {
            self.ctx.fill();
        }
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Rgba) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }
}
