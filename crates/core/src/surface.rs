//! The rendering engine's generic GPU-surface contract.
//!
//! The engine talks to any GL-backed surface through [`GlSurfaceDelegate`]:
//! make-current, clear-current, present, and framebuffer description.
//! Backends (on-screen, offscreen pbuffer, null) implement the trait;
//! the engine never sees their handles.

use serde::Serialize;

use crate::switch::SwitchResult;

/// Per-present information handed to the delegate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresentInfo {
    /// Framebuffer the frame was rendered into.
    pub fbo_id: u32,
}

/// Describes the frame about to be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    pub width: u32,
    pub height: u32,
}

/// Which framebuffer the engine should render into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FboInfo {
    /// Framebuffer object id; 0 selects the default framebuffer.
    pub id: u32,
    pub multisampled: bool,
}

/// Capabilities of the delegate's framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FramebufferInfo {
    /// Whether rendered pixels can be read back for inspection.
    pub supports_readback: bool,
    pub supports_partial_repaint: bool,
}

/// Surface contract the engine renders through.
///
/// Object-safe. `make_current` returns a [`SwitchResult`]; when it carries
/// a guard, the caller keeps the guard alive for as long as current-ness
/// is needed and drops it to release.
pub trait GlSurfaceDelegate {
    /// Makes the delegate's context current on the calling execution
    /// context, or reports that no change was needed (or possible).
    fn make_current(&self) -> SwitchResult;

    /// Detaches current-ness from the calling execution context.
    fn clear_current(&self) -> bool;

    /// Presents a rendered frame. Offscreen backends may report success
    /// without displaying anything.
    fn present(&self, info: &PresentInfo) -> bool;

    /// The framebuffer to render the described frame into.
    fn fbo_info(&self, frame: FrameInfo) -> FboInfo;

    /// Capabilities of the delegate's framebuffer.
    fn framebuffer_info(&self) -> FramebufferInfo;
}
