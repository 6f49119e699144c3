//! Surface delegate adapting the pbuffer handle to the engine's
//! GPU-surface contract.

use std::rc::Rc;

use glesbed_core::api::{EglApi, RawContext, RawDisplay, RawSurface};
use glesbed_core::surface::{FboInfo, FrameInfo, FramebufferInfo, GlSurfaceDelegate, PresentInfo};
use glesbed_core::switch::{ContextSwitch, SwitchResult, SwitchableContext};

use crate::error::CreateError;
use crate::handle::PbufferHandle;

/// Binds and unbinds one handle's display/surface/context triplet.
struct PbufferSwitchable {
    api: Rc<dyn EglApi>,
    display: RawDisplay,
    surface: RawSurface,
    context: RawContext,
}

impl SwitchableContext for PbufferSwitchable {
    fn set_current(&self) -> bool {
        self.api
            .make_current(self.display, Some(self.surface), Some(self.context))
    }

    fn clear_current(&self) -> bool {
        self.api.clear_current(self.display)
    }
}

/// Owns the pbuffer handle and mediates every make-current, clear-current,
/// present, and framebuffer query the engine issues.
///
/// A delegate whose handle failed to construct is permanently invalid:
/// [`OffscreenDelegate::is_valid`] reports `false` and `make_current`
/// reports a defined always-false outcome.
pub struct OffscreenDelegate {
    api: Rc<dyn EglApi>,
    handle: Option<PbufferHandle>,
}

impl OffscreenDelegate {
    /// Builds the pbuffer handle and wraps it.
    ///
    /// # Errors
    ///
    /// Propagates the handle's construction error; see
    /// [`PbufferHandle::new`].
    pub fn new(api: Rc<dyn EglApi>) -> Result<Self, CreateError> {
        let handle = PbufferHandle::new(api.clone())?;
        Ok(Self {
            api,
            handle: Some(handle),
        })
    }

    /// A permanently invalid delegate, as observed after failed handle
    /// construction.
    pub fn without_context(api: Rc<dyn EglApi>) -> Self {
        Self { api, handle: None }
    }

    pub fn is_valid(&self) -> bool {
        self.handle.is_some()
    }

    /// Whether this delegate's context is bound on the calling execution
    /// context.
    pub fn is_context_current(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| handle.is_current())
    }

    pub fn handle(&self) -> Option<&PbufferHandle> {
        self.handle.as_ref()
    }
}

impl GlSurfaceDelegate for OffscreenDelegate {
    fn make_current(&self) -> SwitchResult {
        let Some(handle) = self.handle.as_ref() else {
            return SwitchResult::Unchanged(false);
        };
        if handle.is_current() {
            return SwitchResult::Unchanged(true);
        }
        SwitchResult::Switched(ContextSwitch::new(Box::new(PbufferSwitchable {
            api: self.api.clone(),
            display: handle.display(),
            surface: handle.surface(),
            context: handle.context(),
        })))
    }

    fn clear_current(&self) -> bool {
        match self.handle.as_ref() {
            Some(handle) => self.api.clear_current(handle.display()),
            None => false,
        }
    }

    fn present(&self, _info: &PresentInfo) -> bool {
        // The pbuffer is never shown; there is no buffer to swap.
        true
    }

    fn fbo_info(&self, _frame: FrameInfo) -> FboInfo {
        FboInfo {
            id: 0,
            multisampled: false,
        }
    }

    fn framebuffer_info(&self) -> FramebufferInfo {
        FramebufferInfo {
            supports_readback: true,
            supports_partial_repaint: false,
        }
    }
}
