//! Reference-counted backend context with worker-gated GL submission.
//!
//! GL commands may only be issued while the context is bound on the
//! calling execution context, and binding is owned by the task machinery,
//! not by whoever happens to hold a command. The reactor therefore never
//! runs an operation directly: each submission asks the registered workers
//! whether the calling execution context can issue GL right now, runs the
//! queue if so, and defers otherwise until a later submission finds a
//! consenting moment.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::CoreError;
use crate::proc_table::ProcTable;
use crate::shaders::ShaderBlob;

/// Answers whether GL commands may be issued on the calling execution
/// context right now.
///
/// A `false` answer is routine backpressure, not an error; the reactor
/// retries on a later submission.
pub trait ReactorWorker {
    fn can_react_now(&self) -> bool;
}

/// A deferred GL operation. Runs with the context current.
pub type GlOperation = Box<dyn FnOnce(&ProcTable)>;

/// What happened to a submitted operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactOutcome {
    /// The queue (including this operation) ran immediately.
    Reacted,
    /// The operation was queued for a later submission.
    Deferred,
}

/// The backend graphics context the engine submits GL work through.
///
/// Shared by the test harness and by every surface created from it
/// (`Rc`); torn down exactly once via the idempotent
/// [`ReactorContext::shutdown`], independent of drop order.
pub struct ReactorContext {
    gl: ProcTable,
    shaders: Vec<ShaderBlob>,
    workers: RefCell<Vec<Rc<dyn ReactorWorker>>>,
    pending: RefCell<Vec<GlOperation>>,
    shut_down: Cell<bool>,
}

impl ReactorContext {
    pub fn new(gl: ProcTable, shaders: Vec<ShaderBlob>) -> Rc<Self> {
        Rc::new(Self {
            gl,
            shaders,
            workers: RefCell::new(Vec::new()),
            pending: RefCell::new(Vec::new()),
            shut_down: Cell::new(false),
        })
    }

    /// Whether the context passed validation and has not shut down.
    pub fn is_valid(&self) -> bool {
        !self.shut_down.get() && self.gl.is_valid() && !self.shaders.is_empty()
    }

    pub fn shader_blobs(&self) -> &[ShaderBlob] {
        &self.shaders
    }

    pub fn proc_table(&self) -> &ProcTable {
        &self.gl
    }

    /// Registers a worker consulted before any GL work runs.
    pub fn add_reactor_worker(&self, worker: Rc<dyn ReactorWorker>) {
        self.workers.borrow_mut().push(worker);
    }

    pub fn worker_count(&self) -> usize {
        self.workers.borrow().len()
    }

    /// Whether GL work may run on the calling execution context right now.
    ///
    /// Requires consent from every registered worker. With no workers
    /// registered the answer is `false`: nobody can establish a current
    /// context, so GL work must not run.
    pub fn can_react_now(&self) -> bool {
        let workers = self.workers.borrow();
        !workers.is_empty() && workers.iter().all(|worker| worker.can_react_now())
    }

    /// Submits a GL operation.
    ///
    /// The operation is queued and the whole queue runs immediately if a
    /// worker can make the context current; otherwise it stays queued for
    /// a later submission.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ContextShutDown` after [`ReactorContext::shutdown`].
    pub fn submit(&self, op: GlOperation) -> Result<ReactOutcome, CoreError> {
        if self.shut_down.get() {
            return Err(CoreError::ContextShutDown);
        }
        self.pending.borrow_mut().push(op);
        if self.can_react_now() {
            self.react();
            Ok(ReactOutcome::Reacted)
        } else {
            Ok(ReactOutcome::Deferred)
        }
    }

    pub fn pending_ops(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Marks the context dead and drops any queued work.
    ///
    /// Idempotent: returns `true` on the call that performed the
    /// shutdown, `false` on every later call.
    pub fn shutdown(&self) -> bool {
        if self.shut_down.replace(true) {
            return false;
        }
        let dropped = self.pending.borrow_mut().drain(..).count();
        if dropped > 0 {
            log::debug!("dropping {dropped} pending GL operations at shutdown");
        }
        true
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.get()
    }

    /// Drains the queue. Operations may enqueue more work; the loop keeps
    /// draining until the queue stays empty. The queue borrow is released
    /// before any operation runs.
    fn react(&self) {
        loop {
            let ops: Vec<GlOperation> = self.pending.borrow_mut().drain(..).collect();
            if ops.is_empty() {
                break;
            }
            for op in ops {
                op(&self.gl);
            }
        }
    }
}
