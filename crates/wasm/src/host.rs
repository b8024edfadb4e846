//! [`FrameHost`] for the browser: `requestAnimationFrame` plus DOM listeners.

use std::cell::RefCell;
use std::rc::Rc;

use constellation_core::{FrameHandle, FrameHost, PointerHandle, Subscription};
use glam::DVec2;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Event, EventTarget, HtmlCanvasElement, MouseEvent, Window};

use crate::canvas::fit_canvas;

/// Slot for the per-frame callback. It is filled after the loop exists,
/// since the callback needs a handle back to the loop.
pub type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

pub struct BrowserHost {
    window: Window,
    canvas: HtmlCanvasElement,
    frame: FrameSlot,
}

impl BrowserHost {
    pub fn new(window: Window, canvas: HtmlCanvasElement) -> Self {
        Self {
            window,
            canvas,
            frame: Rc::new(RefCell::new(None)),
        }
    }

    /// Shared slot that must hold the frame callback before the loop starts.
    pub fn frame_slot(&self) -> FrameSlot {
        Rc::clone(&self.frame)
    }
}

impl FrameHost for BrowserHost {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        let slot = self.frame.borrow();
        let Some(callback) = slot.as_ref() else {
            log::warn!("no frame callback installed");
            return None;
        };
        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(id) => Some(FrameHandle(id)),
            Err(e) => {
                log::warn!("requestAnimationFrame failed: {e:?}");
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(e) = self.window.cancel_animation_frame(handle.0) {
            log::warn!("cancelAnimationFrame failed: {e:?}");
        }
    }

    fn attach_listeners(&mut self, pointer: PointerHandle) -> Vec<Subscription> {
        let canvas = self.canvas.clone();
        let on_move = Closure::<dyn FnMut(MouseEvent)>::new(move |e: MouseEvent| {
            let rect = canvas.get_bounding_client_rect();
            pointer.set(DVec2::new(
                e.client_x() as f64 - rect.left(),
                e.client_y() as f64 - rect.top(),
            ));
        });

        let canvas = self.canvas.clone();
        let on_resize = Closure::<dyn FnMut(Event)>::new(move |_: Event| fit_canvas(&canvas));

        listen(&self.canvas, "mousemove", on_move)
            .into_iter()
            .chain(listen(&self.window, "resize", on_resize))
            .collect()
    }
}

/// Registers `callback` on `target`. The returned subscription removes the
/// listener and frees the closure when dropped.
fn listen<T>(target: &EventTarget, event: &'static str, callback: Closure<T>) -> Option<Subscription>
where
    T: ?Sized + 'static,
    Closure<T>: AsRef<JsValue>,
{
    if let Err(e) = target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref()) {
        log::warn!("could not listen for {event}: {e:?}");
        return None;
    }
    let target = target.clone();
    Some(Subscription::new(move || {
        if let Err(e) =
            target.remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
        {
            log::warn!("could not detach {event} listener: {e:?}");
        }
    }))
}
