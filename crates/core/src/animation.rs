//! Frame-by-frame driver for a [`ParticleField`].
//!
//! [`AnimationLoop`] owns the surface, the host's frame handle, and the
//! listener subscriptions. Everything acquired by [`AnimationLoop::start`]
//! is released by [`AnimationLoop::stop`], which also runs on drop.
//!
//! The loop is single-threaded and cooperative: the host calls
//! [`AnimationLoop::on_frame`] when a requested frame fires, and the next
//! frame is only requested after the current one has advanced and drawn.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use glam::DVec2;

use crate::field::ParticleField;
use crate::params::FieldParams;
use crate::surface::Surface;

/// Opaque id of a frame request, as returned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// Lifecycle of an [`AnimationLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// Shared pointer position written by input listeners and read each frame.
///
/// Cloning shares the same cell.
#[derive(Debug, Clone, Default)]
pub struct PointerHandle(Rc<Cell<DVec2>>);

impl PointerHandle {
    /// Latest pointer position.
    pub fn get(&self) -> DVec2 {
        self.0.get()
    }

    /// Overwrites the pointer position; visible to the next frame.
    pub fn set(&self, position: DVec2) {
        self.0.set(position);
    }
}

/// Deregistration guard for a listener; detaches when dropped.
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wraps the closure that removes the listener.
    pub fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

/// The environment a loop runs in: frame scheduling and input listeners.
pub trait FrameHost {
    /// Asks for [`AnimationLoop::on_frame`] to be called before the next repaint.
    ///
    /// `None` means the host could not schedule a frame.
    fn request_frame(&mut self) -> Option<FrameHandle>;

    /// Withdraws a request made by [`FrameHost::request_frame`].
    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Attaches the pointer-move and resize listeners.
    ///
    /// Pointer listeners write surface-relative coordinates into `pointer`.
    /// Resize listeners only resize the surface; the loop notices the new
    /// size on its next frame.
    fn attach_listeners(&mut self, pointer: PointerHandle) -> Vec<Subscription>;
}

/// Resources held while running; dropping this releases all of them except
/// the pending frame, which [`AnimationLoop::stop`] cancels first.
struct Active {
    field: ParticleField,
    pending: Option<FrameHandle>,
    _subscriptions: Vec<Subscription>,
}

/// Drives a particle field on a surface until stopped.
///
/// A loop can only be built around a surface value, so it never runs
/// without one.
pub struct AnimationLoop<S: Surface, H: FrameHost> {
    surface: S,
    host: H,
    seed: u64,
    params: FieldParams,
    pointer: PointerHandle,
    active: Option<Active>,
}

impl<S: Surface, H: FrameHost> AnimationLoop<S, H> {
    /// Creates a stopped loop.
    pub fn new(surface: S, host: H, seed: u64, params: FieldParams) -> Self {
        Self {
            surface,
            host,
            seed,
            params,
            pointer: PointerHandle::default(),
            active: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LoopState {
        if self.active.is_some() {
            LoopState::Running
        } else {
            LoopState::Stopped
        }
    }

    /// Shorthand for `state() == LoopState::Running`.
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Fits the surface to its display, spawns the field, attaches listeners,
    /// and requests the first frame. Does nothing if already running.
    pub fn start(&mut self) {
        if self.active.is_some() {
            return;
        }
        let bounds = self.surface.fit_to_display();
        let field = ParticleField::new(bounds, self.seed, self.params);
        self.pointer.set(DVec2::ZERO);
        let subscriptions = self.host.attach_listeners(self.pointer.clone());
        let pending = self.host.request_frame();
        if pending.is_none() {
            log::warn!("host could not schedule the first frame");
        }
        log::info!(
            "animation started: {} particles on {}x{}",
            field.len(),
            bounds.width,
            bounds.height
        );
        self.active = Some(Active {
            field,
            pending,
            _subscriptions: subscriptions,
        });
    }

    /// Runs one frame: pick up resizes, advance with the latest pointer,
    /// draw, and request the next frame.
    ///
    /// Ignored unless running with a frame pending, so a callback that fires
    /// after [`AnimationLoop::stop`] does nothing.
    pub fn on_frame(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.pending.take().is_none() {
            return;
        }

        active.field.resize(self.surface.bounds());
        let pointer = self.pointer.get();
        active.field.set_pointer(pointer);
        active.field.advance(pointer);
        active.field.draw(&mut self.surface);

        active.pending = self.host.request_frame();
        if active.pending.is_none() {
            log::warn!("host could not schedule the next frame; animation is stalled");
        }
    }

    /// Cancels the pending frame, detaches listeners, and drops the field.
    /// Stopping a stopped loop is a no-op.
    pub fn stop(&mut self) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        if let Some(handle) = active.pending.take() {
            self.host.cancel_frame(handle);
        }
        drop(active);
        log::info!("animation stopped");
    }

    /// The live field, present only while running.
    pub fn field(&self) -> Option<&ParticleField> {
        self.active.as_ref().map(|a| &a.field)
    }

    /// The frame currently requested from the host, if any.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.active.as_ref().and_then(|a| a.pending)
    }

    /// Handle to the pointer cell the listeners write into.
    pub fn pointer(&self) -> PointerHandle {
        self.pointer.clone()
    }

    /// The surface drawn on each frame.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface, e.g. to resize it.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The frame host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the frame host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<S: Surface, H: FrameHost> Drop for AnimationLoop<S, H> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Bounds;
    use crate::surface::RecordingSurface;
    use std::cell::RefCell;

    #[derive(Default)]
    struct HostLog {
        requested: Cell<usize>,
        cancelled: RefCell<Vec<FrameHandle>>,
        attached: Cell<usize>,
        detached: Cell<usize>,
    }

    /// Host whose frames fire only when the test says so.
    struct ManualHost {
        next_id: i32,
        pending: Option<FrameHandle>,
        pointer: Option<PointerHandle>,
        refuse_frames: bool,
        log: Rc<HostLog>,
    }

    impl ManualHost {
        fn new(log: Rc<HostLog>) -> Self {
            Self {
                next_id: 0,
                pending: None,
                pointer: None,
                refuse_frames: false,
                log,
            }
        }
    }

    impl FrameHost for ManualHost {
        fn request_frame(&mut self) -> Option<FrameHandle> {
            if self.refuse_frames {
                return None;
            }
            self.next_id += 1;
            let handle = FrameHandle(self.next_id);
            self.pending = Some(handle);
            self.log.requested.set(self.log.requested.get() + 1);
            Some(handle)
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.log.cancelled.borrow_mut().push(handle);
            if self.pending == Some(handle) {
                self.pending = None;
            }
        }

        fn attach_listeners(&mut self, pointer: PointerHandle) -> Vec<Subscription> {
            self.pointer = Some(pointer);
            ["mousemove", "resize"]
                .into_iter()
                .map(|_| {
                    self.log.attached.set(self.log.attached.get() + 1);
                    let log = Rc::clone(&self.log);
                    Subscription::new(move || log.detached.set(log.detached.get() + 1))
                })
                .collect()
        }
    }

    type TestLoop = AnimationLoop<RecordingSurface, ManualHost>;

    fn new_loop(width: f64, height: f64) -> (TestLoop, Rc<HostLog>) {
        let log = Rc::new(HostLog::default());
        let lp = AnimationLoop::new(
            RecordingSurface::new(Bounds::new(width, height)),
            ManualHost::new(Rc::clone(&log)),
            7,
            FieldParams::default(),
        );
        (lp, log)
    }

    /// Fires the host's pending frame, if any.
    fn fire(lp: &mut TestLoop) -> bool {
        if lp.host_mut().pending.take().is_none() {
            return false;
        }
        lp.on_frame();
        true
    }

    #[test]
    fn new_loop_is_stopped_without_field() {
        let (lp, log) = new_loop(300.0, 300.0);
        assert_eq!(lp.state(), LoopState::Stopped);
        assert!(lp.field().is_none());
        assert_eq!(log.requested.get(), 0);
    }

    #[test]
    fn start_spawns_field_attaches_listeners_and_requests_a_frame() {
        let (mut lp, log) = new_loop(600.0, 300.0);
        lp.start();
        assert_eq!(lp.state(), LoopState::Running);
        assert_eq!(lp.field().map(ParticleField::len), Some(12));
        assert_eq!(log.attached.get(), 2);
        assert_eq!(log.requested.get(), 1);
        assert!(lp.pending_frame().is_some());
        assert_eq!(lp.surface().frames(), 0, "nothing drawn before the first frame");
    }

    #[test]
    fn start_while_running_is_a_no_op() {
        let (mut lp, log) = new_loop(600.0, 300.0);
        lp.start();
        lp.start();
        assert_eq!(log.attached.get(), 2);
        assert_eq!(log.requested.get(), 1);
    }

    #[test]
    fn each_frame_draws_once_and_reschedules() {
        let (mut lp, log) = new_loop(600.0, 300.0);
        lp.start();
        for _ in 0..3 {
            assert!(fire(&mut lp));
        }
        assert_eq!(lp.surface().frames(), 3);
        assert_eq!(lp.surface().circle_count(), 12);
        assert_eq!(log.requested.get(), 4);
    }

    #[test]
    fn stop_cancels_pending_frame_and_detaches_listeners() {
        let (mut lp, log) = new_loop(600.0, 300.0);
        lp.start();
        fire(&mut lp);
        let pending = lp.pending_frame().unwrap();
        lp.stop();
        assert_eq!(lp.state(), LoopState::Stopped);
        assert_eq!(*log.cancelled.borrow(), vec![pending]);
        assert_eq!(log.detached.get(), 2);
        assert!(lp.host().pending.is_none());
        assert!(lp.field().is_none());
    }

    #[test]
    fn stop_twice_is_idempotent() {
        let (mut lp, log) = new_loop(600.0, 300.0);
        lp.start();
        lp.stop();
        lp.stop();
        assert_eq!(log.cancelled.borrow().len(), 1);
        assert_eq!(log.detached.get(), 2);
        assert!(lp.pending_frame().is_none());
        assert!(lp.host().pending.is_none());
    }

    #[test]
    fn stop_before_start_is_a_no_op() {
        let (mut lp, log) = new_loop(600.0, 300.0);
        lp.stop();
        assert!(log.cancelled.borrow().is_empty());
        assert_eq!(lp.state(), LoopState::Stopped);
    }

    #[test]
    fn stray_frame_after_stop_draws_nothing() {
        let (mut lp, _log) = new_loop(600.0, 300.0);
        lp.start();
        fire(&mut lp);
        lp.stop();
        lp.on_frame();
        assert_eq!(lp.surface().frames(), 1);
    }

    #[test]
    fn dropping_a_running_loop_releases_everything() {
        let (mut lp, log) = new_loop(600.0, 300.0);
        lp.start();
        drop(lp);
        assert_eq!(log.cancelled.borrow().len(), 1);
        assert_eq!(log.detached.get(), 2);
    }

    #[test]
    fn pointer_updates_reach_the_next_frame() {
        let (mut lp, _log) = new_loop(600.0, 300.0);
        lp.start();
        assert_eq!(lp.field().unwrap().pointer(), DVec2::ZERO);
        let listener_side = lp.host().pointer.clone().unwrap();
        listener_side.set(DVec2::new(120.0, 80.0));
        fire(&mut lp);
        assert_eq!(lp.field().unwrap().pointer(), DVec2::new(120.0, 80.0));
    }

    #[test]
    fn resize_is_picked_up_without_repopulating() {
        let (mut lp, _log) = new_loop(600.0, 300.0);
        lp.start();
        lp.surface_mut().set_bounds(Bounds::new(1200.0, 900.0));
        fire(&mut lp);
        let field = lp.field().unwrap();
        assert_eq!(field.bounds(), Bounds::new(1200.0, 900.0));
        assert_eq!(field.len(), 12);
    }

    #[test]
    fn restart_spawns_the_same_field_again() {
        let (mut lp, log) = new_loop(600.0, 300.0);
        lp.start();
        let first: Vec<_> = lp.field().unwrap().particles().to_vec();
        for _ in 0..5 {
            fire(&mut lp);
        }
        lp.stop();
        lp.start();
        assert_eq!(lp.field().unwrap().particles(), &first[..]);
        assert_eq!(log.attached.get(), 4);
    }

    #[test]
    fn empty_surface_runs_with_no_particles() {
        let (mut lp, _log) = new_loop(0.0, 0.0);
        lp.start();
        fire(&mut lp);
        assert!(lp.field().unwrap().is_empty());
        assert_eq!(lp.surface().commands().len(), 1);
    }

    #[test]
    fn refused_frame_leaves_loop_running_but_idle() {
        let (mut lp, log) = new_loop(600.0, 300.0);
        lp.host_mut().refuse_frames = true;
        lp.start();
        assert!(lp.is_running());
        assert!(lp.pending_frame().is_none());
        lp.on_frame();
        assert_eq!(lp.surface().frames(), 0);
        lp.stop();
        assert!(log.cancelled.borrow().is_empty());
        assert_eq!(log.detached.get(), 2);
    }
}
