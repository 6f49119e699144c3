//! Reactor worker for the offscreen delegate.
//!
//! The engine's reactor asks, at submission time, whether GL commands may
//! run on the calling execution context. The worker answers by making the
//! offscreen context current on demand. Because it cannot know when the
//! enclosing task ends, it hands the release of current-ness to the
//! scheduler as a one-shot end-of-task observer instead of requiring an
//! explicit unlock from every caller.

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use glesbed_core::reactor::ReactorWorker;
use glesbed_core::scheduler::{ObserverKey, TaskScheduler};
use glesbed_core::surface::GlSurfaceDelegate;

use crate::delegate::OffscreenDelegate;

static NEXT_WORKER_KEY: AtomicU64 = AtomicU64::new(1);

/// Makes the offscreen context current for the duration of the current
/// task, lazily and at most once per task.
pub struct OffscreenReactorWorker {
    delegate: Rc<OffscreenDelegate>,
    scheduler: Rc<dyn TaskScheduler>,
    key: ObserverKey,
}

impl OffscreenReactorWorker {
    pub fn new(delegate: Rc<OffscreenDelegate>, scheduler: Rc<dyn TaskScheduler>) -> Rc<Self> {
        Rc::new(Self {
            delegate,
            scheduler,
            key: ObserverKey(NEXT_WORKER_KEY.fetch_add(1, Ordering::Relaxed)),
        })
    }

    /// Identity under which this worker registers its end-of-task cleanup.
    pub fn observer_key(&self) -> ObserverKey {
        self.key
    }
}

impl ReactorWorker for OffscreenReactorWorker {
    fn can_react_now(&self) -> bool {
        if self.delegate.is_context_current() {
            return true;
        }

        let switch = self.delegate.make_current();
        if !switch.ok() {
            // Routine backpressure; the reactor retries on a later task.
            log::debug!("offscreen context not available for GL submission on this task");
            return false;
        }

        // Park the live switch in an end-of-task observer so current-ness
        // is released exactly when the scheduler finishes this task. The
        // key guarantees at most one registration per task.
        self.scheduler
            .add_task_observer(self.key, Box::new(move || drop(switch)));
        true
    }
}
