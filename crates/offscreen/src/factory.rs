//! Wires the handle, delegate, worker, and backend context into a ready
//! test context.

use std::rc::Rc;

use glesbed_core::api::EglApi;
use glesbed_core::proc_table::ProcTable;
use glesbed_core::reactor::ReactorContext;
use glesbed_core::scheduler::TaskScheduler;
use glesbed_core::shaders::{builtin_shader_blobs, ShaderBlob};
use glesbed_core::surface::GlSurfaceDelegate;

use crate::context::TestContext;
use crate::delegate::OffscreenDelegate;
use crate::error::CreateError;
use crate::worker::OffscreenReactorWorker;

/// Everything the factory needs to build a context.
pub struct FactoryOptions {
    pub api: Rc<dyn EglApi>,
    pub scheduler: Rc<dyn TaskScheduler>,
    pub shaders: Vec<ShaderBlob>,
}

impl FactoryOptions {
    /// Options with the built-in shader library.
    pub fn new(api: Rc<dyn EglApi>, scheduler: Rc<dyn TaskScheduler>) -> Self {
        Self {
            api,
            scheduler,
            shaders: builtin_shader_blobs(),
        }
    }
}

/// Builds a fully wired offscreen test context.
///
/// Construction steps run in order; the first failure aborts the attempt
/// and no partial object is returned. The context is made current while
/// the entry-point table and backend context are built, and released
/// before this function returns.
///
/// # Errors
///
/// Returns the `CreateError` for the failing step.
pub fn try_create(options: FactoryOptions) -> Result<TestContext, CreateError> {
    let FactoryOptions {
        api,
        scheduler,
        shaders,
    } = options;

    let delegate = Rc::new(OffscreenDelegate::new(api.clone())?);

    let switch = delegate.make_current();
    if !switch.ok() {
        return Err(CreateError::MakeCurrent);
    }

    let gl = ProcTable::load(api.as_ref())?;

    let backend = ReactorContext::new(gl, shaders);
    if !backend.is_valid() {
        return Err(CreateError::InvalidBackendContext);
    }

    let worker = OffscreenReactorWorker::new(delegate.clone(), scheduler);
    backend.add_reactor_worker(worker.clone());

    drop(switch);

    Ok(TestContext::new(delegate, worker, backend))
}

/// Bootstrap entry point: a ready context or `None`, with the failure
/// logged at error severity. No panics or errors cross this boundary.
pub fn create(options: FactoryOptions) -> Option<TestContext> {
    match try_create(options) {
        Ok(context) => Some(context),
        Err(e) => {
            log::error!("could not create offscreen test context: {e}");
            None
        }
    }
}

/// Builds a context over the system's EGL library, loading it (and
/// selecting the software renderer) once per process.
#[cfg(feature = "egl")]
pub fn create_system(scheduler: Rc<dyn TaskScheduler>) -> Option<TestContext> {
    let api = match crate::system::SystemEgl::load() {
        Ok(api) => api,
        Err(e) => {
            log::error!("could not create offscreen test context: {e}");
            return None;
        }
    };
    create(FactoryOptions::new(api, scheduler))
}
