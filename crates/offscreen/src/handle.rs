//! The pixel-buffer context handle: display, config, context, surface.
//!
//! Construction runs the five platform steps in order and stops at the
//! first failure, releasing whatever was already created. A constructed
//! handle always carries four valid platform handles; there is no
//! partially valid state to observe.

use std::fmt;
use std::rc::Rc;

use glesbed_core::api::{ConfigRequest, EglApi, RawConfig, RawContext, RawDisplay, RawSurface};

use crate::error::CreateError;

/// GLES client version requested for the offscreen context.
const CLIENT_VERSION: i32 = 2;

/// Pbuffer dimensions. The surface exists to satisfy make-current; the
/// engine renders into its own framebuffers, so 1x1 is enough.
const PBUFFER_WIDTH: i32 = 1;
const PBUFFER_HEIGHT: i32 = 1;

/// Owns one display/config/context/surface quadruple from the native API.
///
/// Created once at initialization, destroyed once on drop, never shared.
pub struct PbufferHandle {
    api: Rc<dyn EglApi>,
    display: RawDisplay,
    config: RawConfig,
    context: RawContext,
    surface: RawSurface,
}

impl PbufferHandle {
    /// Acquires and initializes a display, chooses the unique ES2 pbuffer
    /// configuration, and creates the context and 1x1 pbuffer surface.
    ///
    /// # Errors
    ///
    /// Each step maps to its own `CreateError` variant; no step after the
    /// failing one executes, and already-created platform objects are
    /// released before returning.
    pub fn new(api: Rc<dyn EglApi>) -> Result<Self, CreateError> {
        let display = api.default_display().ok_or(CreateError::NoDisplay)?;
        if !api.initialize(display) {
            return Err(CreateError::DisplayInit);
        }

        match Self::build(api.as_ref(), display) {
            Ok((config, context, surface)) => Ok(Self {
                api,
                display,
                config,
                context,
                surface,
            }),
            Err(e) => {
                let _ = api.terminate(display);
                Err(e)
            }
        }
    }

    fn build(
        api: &dyn EglApi,
        display: RawDisplay,
    ) -> Result<(RawConfig, RawContext, RawSurface), CreateError> {
        let request = ConfigRequest::es2_pbuffer();
        let config = api
            .choose_config(display, &request)
            .ok_or(CreateError::NoMatchingConfig)?;

        let context = api
            .create_context(display, config, CLIENT_VERSION)
            .ok_or(CreateError::ContextCreation)?;

        let surface = match api.create_pbuffer_surface(display, config, PBUFFER_WIDTH, PBUFFER_HEIGHT)
        {
            Some(surface) => surface,
            None => {
                let _ = api.destroy_context(display, context);
                return Err(CreateError::SurfaceCreation);
            }
        };

        Ok((config, context, surface))
    }

    pub fn display(&self) -> RawDisplay {
        self.display
    }

    pub fn config(&self) -> RawConfig {
        self.config
    }

    pub fn context(&self) -> RawContext {
        self.context
    }

    pub fn surface(&self) -> RawSurface {
        self.surface
    }

    pub fn api(&self) -> &Rc<dyn EglApi> {
        &self.api
    }

    /// Whether this handle's context is bound on the calling execution
    /// context.
    pub fn is_current(&self) -> bool {
        self.api.current_context() == Some(self.context)
    }
}

impl fmt::Debug for PbufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PbufferHandle")
            .field("display", &self.display)
            .field("config", &self.config)
            .field("context", &self.context)
            .field("surface", &self.surface)
            .finish()
    }
}

impl Drop for PbufferHandle {
    fn drop(&mut self) {
        let _ = self.api.destroy_surface(self.display, self.surface);
        let _ = self.api.destroy_context(self.display, self.context);
        let _ = self.api.terminate(self.display);
    }
}
