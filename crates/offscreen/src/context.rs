//! Engine-facing test context and the surfaces created from it.

use std::fmt;
use std::rc::Rc;

use glesbed_core::reactor::ReactorContext;

use crate::delegate::OffscreenDelegate;
use crate::worker::OffscreenReactorWorker;

/// The context object handed to the rendering engine under test.
///
/// Aggregates the surface delegate and the reference-counted backend
/// context. Dropping the test context shuts the backend down; surfaces
/// holding the backend keep the allocation alive but observe it as
/// invalid from then on.
pub struct TestContext {
    delegate: Rc<OffscreenDelegate>,
    worker: Rc<OffscreenReactorWorker>,
    backend: Rc<ReactorContext>,
}

impl TestContext {
    pub(crate) fn new(
        delegate: Rc<OffscreenDelegate>,
        worker: Rc<OffscreenReactorWorker>,
        backend: Rc<ReactorContext>,
    ) -> Self {
        Self {
            delegate,
            worker,
            backend,
        }
    }

    /// The shared backend graphics context.
    pub fn backend_context(&self) -> Rc<ReactorContext> {
        self.backend.clone()
    }

    /// The surface delegate the engine renders through.
    pub fn delegate(&self) -> Rc<OffscreenDelegate> {
        self.delegate.clone()
    }

    /// The reactor worker attached to the backend context.
    pub fn worker(&self) -> &Rc<OffscreenReactorWorker> {
        &self.worker
    }

    /// Creates a rendering surface sharing this context's backend.
    ///
    /// Returns `None` when the delegate or the backend is no longer
    /// valid.
    pub fn create_rendering_surface(&self) -> Option<OffscreenSurface> {
        let surface = OffscreenSurface {
            delegate: self.delegate.clone(),
            backend: self.backend.clone(),
        };
        if surface.is_valid() {
            Some(surface)
        } else {
            None
        }
    }
}

impl fmt::Debug for TestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestContext").finish_non_exhaustive()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if !self.backend.shutdown() {
            log::debug!("backend context was already shut down");
        }
    }
}

/// A ready-to-draw surface backed by the shared offscreen context.
pub struct OffscreenSurface {
    delegate: Rc<OffscreenDelegate>,
    backend: Rc<ReactorContext>,
}

impl OffscreenSurface {
    pub fn is_valid(&self) -> bool {
        self.delegate.is_valid() && self.backend.is_valid()
    }

    pub fn delegate(&self) -> &OffscreenDelegate {
        &self.delegate
    }

    /// The backend graphics context shared with the owning test context.
    pub fn backend_context(&self) -> Rc<ReactorContext> {
        self.backend.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{try_create, FactoryOptions};
    use glesbed_core::api::FakeEgl;
    use glesbed_core::scheduler::TaskLoop;

    fn test_context() -> (Rc<FakeEgl>, TestContext) {
        let api = Rc::new(FakeEgl::new());
        let scheduler = Rc::new(TaskLoop::new());
        let context = try_create(FactoryOptions::new(api.clone(), scheduler)).unwrap();
        (api, context)
    }

    #[test]
    fn create_rendering_surface_shares_the_backend() {
        let (_, context) = test_context();
        let surface = context.create_rendering_surface().unwrap();

        assert!(surface.is_valid());
        assert!(Rc::ptr_eq(
            &surface.backend_context(),
            &context.backend_context()
        ));
    }

    #[test]
    fn dropping_the_context_shuts_the_backend_down_once() {
        let (_, context) = test_context();
        let backend = context.backend_context();
        let surface = context.create_rendering_surface().unwrap();

        drop(context);

        assert!(backend.is_shut_down());
        assert!(!backend.is_valid());
        assert!(
            !surface.is_valid(),
            "surviving surfaces observe the shutdown"
        );
        assert!(!backend.shutdown(), "the drop already performed the shutdown");
    }

    #[test]
    fn no_surface_after_shutdown() {
        let (_, context) = test_context();
        context.backend_context().shutdown();
        assert!(context.create_rendering_surface().is_none());
    }
}
