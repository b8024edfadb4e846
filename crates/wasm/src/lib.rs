#![deny(unsafe_code)]
//! WASM bindings for the constellation particle field.
//!
//! ```js
//! import init, { initLogging, ParticleCanvas } from "./constellation_wasm.js";
//! await init();
//! initLogging(false);
//! const field = new ParticleCanvas(document.querySelector("canvas"), 42, "{}");
//! field.start();
//! // on teardown
//! field.stop();
//! field.free();
//! ```

pub mod canvas;
pub mod host;
pub mod logger;

use std::cell::RefCell;
use std::rc::Rc;

use constellation_core::{AnimationLoop, FieldParams, ParticleField};
use log::LevelFilter;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::canvas::CanvasSurface;
use crate::host::BrowserHost;

type CanvasLoop = AnimationLoop<CanvasSurface, BrowserHost>;

/// Routes panics and `log` records to the browser console.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(verbose: bool) {
    console_error_panic_hook::set_once();
    logger::install(if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
}

/// The particle background bound to one canvas.
///
/// Freeing the object from JS stops the animation and detaches its listeners.
#[wasm_bindgen]
pub struct ParticleCanvas {
    inner: Rc<RefCell<CanvasLoop>>,
}

#[wasm_bindgen]
impl ParticleCanvas {
    /// Binds to `canvas`. `params` is a JSON object of overrides (`"{}"` for defaults).
    ///
    /// Fails if there is no window, the canvas has no 2D context, or
    /// `params` is not valid.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, seed: u32, params: &str) -> Result<ParticleCanvas, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let params: serde_json::Value =
            serde_json::from_str(params).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let params = FieldParams::from_json(&params).map_err(|e| JsValue::from_str(&e.to_string()))?;

        let surface = CanvasSurface::new(canvas.clone())?;
        let host = BrowserHost::new(window, canvas);
        let slot = host.frame_slot();
        let inner = Rc::new(RefCell::new(AnimationLoop::new(
            surface,
            host,
            u64::from(seed),
            params,
        )));

        let weak = Rc::downgrade(&inner);
        *slot.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |_timestamp: f64| {
            if let Some(lp) = weak.upgrade() {
                if let Ok(mut lp) = lp.try_borrow_mut() {
                    lp.on_frame();
                }
            }
        }));

        Ok(ParticleCanvas { inner })
    }

    /// Sizes the canvas, spawns particles, and starts animating.
    pub fn start(&self) {
        self.inner.borrow_mut().start();
    }

    /// Stops animating and detaches listeners. Safe to call repeatedly.
    pub fn stop(&self) {
        self.inner.borrow_mut().stop();
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.inner.borrow().is_running()
    }

    #[wasm_bindgen(getter, js_name = particleCount)]
    pub fn particle_count(&self) -> usize {
        self.inner.borrow().field().map_or(0, ParticleField::len)
    }

    /// Current parameters as a JSON string.
    pub fn params(&self) -> String {
        self.inner
            .borrow()
            .field()
            .map(ParticleField::params)
            .unwrap_or_else(|| FieldParams::default().to_json())
            .to_string()
    }

    /// Parameter schema as a JSON string.
    #[wasm_bindgen(js_name = paramSchema)]
    pub fn param_schema() -> String {
        FieldParams::schema().to_string()
    }
}
