//! Scoped acquisition of context current-ness.
//!
//! Graphics APIs in the EGL class bind a context to at most one execution
//! context at a time, and binding is not reentrant. [`ContextSwitch`] makes
//! the binding a scoped resource: construction attempts to bind, and drop
//! always unbinds, on every exit path. Callers that find the context
//! already bound skip constructing a switch entirely; [`SwitchResult`]
//! captures both shapes.

/// A context that can be bound to and unbound from the calling execution
/// context.
///
/// Object-safe; each backend implements it over its own handle triplet.
/// Only one [`ContextSwitch`] may be alive for a given context at a time;
/// the underlying bind operation is not reentrant.
pub trait SwitchableContext {
    /// Binds the context. Returns whether the bind took effect.
    fn set_current(&self) -> bool;

    /// Unbinds whatever is bound on the calling execution context.
    fn clear_current(&self) -> bool;
}

/// Scoped current-ness guard.
///
/// Construction attempts the bind and records the outcome, observable via
/// [`ContextSwitch::ok`]. Dropping the guard unbinds unconditionally, even
/// when the bind failed, so no exit path can leak current-ness into an
/// unrelated task.
#[must_use = "dropping the switch releases current-ness"]
pub struct ContextSwitch {
    context: Box<dyn SwitchableContext>,
    ok: bool,
}

impl ContextSwitch {
    /// Attempts to bind `context` on the calling execution context.
    pub fn new(context: Box<dyn SwitchableContext>) -> Self {
        let ok = context.set_current();
        Self { context, ok }
    }

    /// Whether the bind at construction took effect.
    pub fn ok(&self) -> bool {
        self.ok
    }
}

impl Drop for ContextSwitch {
    fn drop(&mut self) {
        if !self.context.clear_current() {
            // Nothing more can be done from a destructor; surface it for
            // whoever is reading logs.
            log::warn!("failed to clear current context while releasing switch");
        }
    }
}

/// Result of a make-current request on a surface delegate.
#[must_use = "the Switched variant holds current-ness; dropping it releases"]
pub enum SwitchResult {
    /// No binding change happened. `true` means the context was already
    /// current; `false` means the delegate cannot be made current at all.
    Unchanged(bool),
    /// Current-ness was acquired and is held by the guard.
    Switched(ContextSwitch),
}

impl SwitchResult {
    /// Whether the context is current after the request.
    pub fn ok(&self) -> bool {
        match self {
            SwitchResult::Unchanged(ok) => *ok,
            SwitchResult::Switched(switch) => switch.ok(),
        }
    }
}
