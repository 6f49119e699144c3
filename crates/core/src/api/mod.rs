//! The native graphics API seam.
//!
//! Everything glesbed consumes from the platform's EGL-class API goes
//! through the object-safe [`EglApi`] trait: display/config/context/surface
//! lifecycle, make-current and clear-current, and procedure-address
//! resolution by name. Backends implement it over the real library; tests
//! drive the in-memory [`FakeEgl`].
//!
//! Handles are opaque tokens ([`RawDisplay`], [`RawConfig`], [`RawContext`],
//! [`RawSurface`]). The trait never interprets them; only the backend that
//! minted a token may.

pub mod fake;

pub use fake::FakeEgl;

use serde::Serialize;
use std::ffi::c_void;

/// Address of a resolved GL entry point.
///
/// Never dereferenced by the core; callers that invoke entry points do so
/// through their own bindings layer.
pub type ProcAddr = *const c_void;

/// Opaque display handle minted by an [`EglApi`] backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawDisplay(pub usize);

/// Opaque framebuffer-configuration handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawConfig(pub usize);

/// Opaque context handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawContext(pub usize);

/// Opaque rendering-surface handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawSurface(pub usize);

/// Framebuffer configuration attributes requested from the backend.
///
/// [`ConfigRequest::es2_pbuffer`] is the canonical request for the
/// offscreen test context: 8-bit RGBA, 24-bit depth, 8-bit stencil, a
/// pbuffer-capable surface, and ES2 conformance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigRequest {
    pub red_bits: u8,
    pub green_bits: u8,
    pub blue_bits: u8,
    pub alpha_bits: u8,
    pub depth_bits: u8,
    pub stencil_bits: u8,
    /// The surface type must support off-screen pixel buffers.
    pub pbuffer: bool,
    /// The configuration must be conformant for OpenGL ES 2.
    pub es2_conformant: bool,
}

impl ConfigRequest {
    /// The fixed attribute set used by the offscreen test context.
    pub fn es2_pbuffer() -> Self {
        Self {
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            alpha_bits: 8,
            depth_bits: 24,
            stencil_bits: 8,
            pbuffer: true,
            es2_conformant: true,
        }
    }
}

/// The EGL-class operations glesbed consumes from the platform.
///
/// Object-safe so backends can be swapped behind `Rc<dyn EglApi>`. All
/// fallible operations report failure through `Option`/`bool` rather than
/// panicking; the native APIs in this class signal failure with sentinel
/// values, and callers decide whether a failure is terminal.
pub trait EglApi {
    /// Returns the default display, or `None` if the backend cannot
    /// produce one.
    fn default_display(&self) -> Option<RawDisplay>;

    /// Initializes a display obtained from [`EglApi::default_display`].
    fn initialize(&self, display: RawDisplay) -> bool;

    /// Returns the configuration matching `request`.
    ///
    /// The match must be unique: zero matches and ambiguous matches both
    /// yield `None`.
    fn choose_config(&self, display: RawDisplay, request: &ConfigRequest) -> Option<RawConfig>;

    /// Creates a context for `config` requesting the given client version.
    fn create_context(
        &self,
        display: RawDisplay,
        config: RawConfig,
        client_version: i32,
    ) -> Option<RawContext>;

    /// Creates an off-screen pixel-buffer surface bound to `config`.
    fn create_pbuffer_surface(
        &self,
        display: RawDisplay,
        config: RawConfig,
        width: i32,
        height: i32,
    ) -> Option<RawSurface>;

    /// Binds `{surface, context}` on the calling execution context.
    ///
    /// Passing `None` for both detaches whatever is bound. Mixed
    /// `Some`/`None` arguments are rejected.
    fn make_current(
        &self,
        display: RawDisplay,
        surface: Option<RawSurface>,
        context: Option<RawContext>,
    ) -> bool;

    /// Detaches any bound surface/context from the calling execution
    /// context.
    fn clear_current(&self, display: RawDisplay) -> bool;

    /// The context currently bound on the calling execution context, if
    /// any.
    fn current_context(&self) -> Option<RawContext>;

    /// Resolves a GL entry point by name.
    fn get_proc_address(&self, name: &str) -> Option<ProcAddr>;

    /// Destroys a surface created by this backend.
    fn destroy_surface(&self, display: RawDisplay, surface: RawSurface) -> bool;

    /// Destroys a context created by this backend.
    fn destroy_context(&self, display: RawDisplay, context: RawContext) -> bool;

    /// Releases the display and everything still associated with it.
    fn terminate(&self, display: RawDisplay) -> bool;
}
