//! Scripted in-memory implementation of the native API seam.
//!
//! [`FakeEgl`] mints token handles, tracks which context is bound, and can
//! be scripted to fail at any individual step. Every test in the workspace
//! that needs "an EGL" drives this type; no real graphics library is
//! touched.

use std::cell::RefCell;
use std::collections::HashSet;

use super::{ConfigRequest, EglApi, ProcAddr, RawConfig, RawContext, RawDisplay, RawSurface};

/// Non-null address handed out for every resolved entry point.
///
/// The core never dereferences resolved addresses, so a stable dummy is
/// enough for the proc table to validate against.
static DUMMY_PROC: u8 = 0;

/// Per-operation call counters, readable from tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub initialize: u32,
    pub choose_config: u32,
    pub create_context: u32,
    pub create_pbuffer_surface: u32,
    pub make_current: u32,
    pub clear_current: u32,
    pub destroy_surface: u32,
    pub destroy_context: u32,
    pub terminate: u32,
}

#[derive(Debug)]
struct FakeState {
    fail_display: bool,
    fail_initialize: bool,
    /// Number of configurations that match any request. The seam contract
    /// requires a unique match, so anything but 1 makes `choose_config`
    /// fail.
    matching_configs: usize,
    fail_create_context: bool,
    fail_create_surface: bool,
    fail_make_current: bool,
    denied_procs: HashSet<String>,
    initialized: bool,
    terminated: bool,
    current: Option<(RawSurface, RawContext)>,
    live_contexts: Vec<RawContext>,
    live_surfaces: Vec<RawSurface>,
    next_handle: usize,
    calls: CallCounts,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            fail_display: false,
            fail_initialize: false,
            matching_configs: 1,
            fail_create_context: false,
            fail_create_surface: false,
            fail_make_current: false,
            denied_procs: HashSet::new(),
            initialized: false,
            terminated: false,
            current: None,
            live_contexts: Vec::new(),
            live_surfaces: Vec::new(),
            next_handle: 0x100,
            calls: CallCounts::default(),
        }
    }
}

/// In-memory EGL with failure injection, handle tracking, and call
/// counters.
#[derive(Default)]
pub struct FakeEgl {
    state: RefCell<FakeState>,
}

impl FakeEgl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes [`EglApi::default_display`] return `None`.
    pub fn set_fail_display(&self, fail: bool) {
        self.state.borrow_mut().fail_display = fail;
    }

    /// Makes [`EglApi::initialize`] report failure.
    pub fn set_fail_initialize(&self, fail: bool) {
        self.state.borrow_mut().fail_initialize = fail;
    }

    /// Scripts how many configurations match any request (default 1).
    pub fn set_matching_configs(&self, count: usize) {
        self.state.borrow_mut().matching_configs = count;
    }

    /// Makes [`EglApi::create_context`] report failure.
    pub fn set_fail_create_context(&self, fail: bool) {
        self.state.borrow_mut().fail_create_context = fail;
    }

    /// Makes [`EglApi::create_pbuffer_surface`] report failure.
    pub fn set_fail_create_surface(&self, fail: bool) {
        self.state.borrow_mut().fail_create_surface = fail;
    }

    /// Makes binding attempts via [`EglApi::make_current`] report failure.
    /// Unbinding (both arguments `None`) still succeeds.
    pub fn set_fail_make_current(&self, fail: bool) {
        self.state.borrow_mut().fail_make_current = fail;
    }

    /// Makes [`EglApi::get_proc_address`] fail to resolve `name`.
    pub fn deny_proc(&self, name: &str) {
        self.state.borrow_mut().denied_procs.insert(name.to_string());
    }

    /// Snapshot of the per-operation call counters.
    pub fn calls(&self) -> CallCounts {
        self.state.borrow().calls
    }

    /// Surface/context binding on the (single) fake execution context.
    pub fn current_binding(&self) -> Option<(RawSurface, RawContext)> {
        self.state.borrow().current
    }

    /// Number of contexts created and not yet destroyed.
    pub fn live_contexts(&self) -> usize {
        self.state.borrow().live_contexts.len()
    }

    /// Number of surfaces created and not yet destroyed.
    pub fn live_surfaces(&self) -> usize {
        self.state.borrow().live_surfaces.len()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.borrow().initialized
    }

    pub fn is_terminated(&self) -> bool {
        self.state.borrow().terminated
    }

    fn mint_handle(state: &mut FakeState) -> usize {
        state.next_handle += 1;
        state.next_handle
    }
}

impl EglApi for FakeEgl {
    fn default_display(&self) -> Option<RawDisplay> {
        if self.state.borrow().fail_display {
            None
        } else {
            Some(RawDisplay(1))
        }
    }

    fn initialize(&self, _display: RawDisplay) -> bool {
        let mut state = self.state.borrow_mut();
        state.calls.initialize += 1;
        if state.fail_initialize {
            return false;
        }
        state.initialized = true;
        true
    }

    fn choose_config(&self, _display: RawDisplay, _request: &ConfigRequest) -> Option<RawConfig> {
        let mut state = self.state.borrow_mut();
        state.calls.choose_config += 1;
        if state.matching_configs == 1 {
            Some(RawConfig(0x10))
        } else {
            None
        }
    }

    fn create_context(
        &self,
        _display: RawDisplay,
        _config: RawConfig,
        _client_version: i32,
    ) -> Option<RawContext> {
        let mut state = self.state.borrow_mut();
        state.calls.create_context += 1;
        if state.fail_create_context {
            return None;
        }
        let context = RawContext(Self::mint_handle(&mut state));
        state.live_contexts.push(context);
        Some(context)
    }

    fn create_pbuffer_surface(
        &self,
        _display: RawDisplay,
        _config: RawConfig,
        _width: i32,
        _height: i32,
    ) -> Option<RawSurface> {
        let mut state = self.state.borrow_mut();
        state.calls.create_pbuffer_surface += 1;
        if state.fail_create_surface {
            return None;
        }
        let surface = RawSurface(Self::mint_handle(&mut state));
        state.live_surfaces.push(surface);
        Some(surface)
    }

    fn make_current(
        &self,
        _display: RawDisplay,
        surface: Option<RawSurface>,
        context: Option<RawContext>,
    ) -> bool {
        let mut state = self.state.borrow_mut();
        state.calls.make_current += 1;
        match (surface, context) {
            (Some(surface), Some(context)) => {
                if state.fail_make_current {
                    return false;
                }
                state.current = Some((surface, context));
                true
            }
            (None, None) => {
                state.current = None;
                true
            }
            _ => false,
        }
    }

    fn clear_current(&self, _display: RawDisplay) -> bool {
        let mut state = self.state.borrow_mut();
        state.calls.clear_current += 1;
        state.current = None;
        true
    }

    fn current_context(&self) -> Option<RawContext> {
        self.state.borrow().current.map(|(_, context)| context)
    }

    fn get_proc_address(&self, name: &str) -> Option<ProcAddr> {
        if self.state.borrow().denied_procs.contains(name) {
            None
        } else {
            Some(&DUMMY_PROC as *const u8 as ProcAddr)
        }
    }

    fn destroy_surface(&self, _display: RawDisplay, surface: RawSurface) -> bool {
        let mut state = self.state.borrow_mut();
        state.calls.destroy_surface += 1;
        state.live_surfaces.retain(|s| *s != surface);
        true
    }

    fn destroy_context(&self, _display: RawDisplay, context: RawContext) -> bool {
        let mut state = self.state.borrow_mut();
        state.calls.destroy_context += 1;
        state.live_contexts.retain(|c| *c != context);
        true
    }

    fn terminate(&self, _display: RawDisplay) -> bool {
        let mut state = self.state.borrow_mut();
        state.calls.terminate += 1;
        state.terminated = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(api: &FakeEgl) -> (RawDisplay, RawSurface, RawContext) {
        let display = api.default_display().unwrap();
        assert!(api.initialize(display));
        let config = api.choose_config(display, &ConfigRequest::es2_pbuffer()).unwrap();
        let context = api.create_context(display, config, 2).unwrap();
        let surface = api.create_pbuffer_surface(display, config, 1, 1).unwrap();
        (display, surface, context)
    }

    #[test]
    fn make_current_tracks_binding() {
        let api = FakeEgl::new();
        let (display, surface, context) = bind(&api);

        assert!(api.current_context().is_none());
        assert!(api.make_current(display, Some(surface), Some(context)));
        assert_eq!(api.current_context(), Some(context));

        assert!(api.make_current(display, None, None));
        assert!(api.current_context().is_none());
    }

    #[test]
    fn mixed_binding_arguments_are_rejected() {
        let api = FakeEgl::new();
        let (display, surface, _context) = bind(&api);
        assert!(!api.make_current(display, Some(surface), None));
        assert!(api.current_context().is_none());
    }

    #[test]
    fn scripted_make_current_failure_leaves_binding_unchanged() {
        let api = FakeEgl::new();
        let (display, surface, context) = bind(&api);
        api.set_fail_make_current(true);

        assert!(!api.make_current(display, Some(surface), Some(context)));
        assert!(api.current_context().is_none());

        // Unbinding is unaffected by the scripted failure.
        assert!(api.make_current(display, None, None));
    }

    #[test]
    fn zero_matching_configs_fails_choose_config() {
        let api = FakeEgl::new();
        let display = api.default_display().unwrap();
        api.set_matching_configs(0);
        assert!(api.choose_config(display, &ConfigRequest::es2_pbuffer()).is_none());
    }

    #[test]
    fn ambiguous_config_match_fails_choose_config() {
        let api = FakeEgl::new();
        let display = api.default_display().unwrap();
        api.set_matching_configs(3);
        assert!(api.choose_config(display, &ConfigRequest::es2_pbuffer()).is_none());
    }

    #[test]
    fn destroy_calls_release_live_handles() {
        let api = FakeEgl::new();
        let (display, surface, context) = bind(&api);
        assert_eq!(api.live_surfaces(), 1);
        assert_eq!(api.live_contexts(), 1);

        assert!(api.destroy_surface(display, surface));
        assert!(api.destroy_context(display, context));
        assert!(api.terminate(display));

        assert_eq!(api.live_surfaces(), 0);
        assert_eq!(api.live_contexts(), 0);
        assert!(api.is_terminated());
    }

    #[test]
    fn denied_procs_fail_to_resolve() {
        let api = FakeEgl::new();
        assert!(api.get_proc_address("glClear").is_some());
        api.deny_proc("glClear");
        assert!(api.get_proc_address("glClear").is_none());
        assert!(api.get_proc_address("glViewport").is_some());
    }

    #[test]
    fn call_counters_record_each_operation() {
        let api = FakeEgl::new();
        let (display, surface, context) = bind(&api);
        api.make_current(display, Some(surface), Some(context));
        api.clear_current(display);

        let calls = api.calls();
        assert_eq!(calls.initialize, 1);
        assert_eq!(calls.choose_config, 1);
        assert_eq!(calls.create_context, 1);
        assert_eq!(calls.create_pbuffer_surface, 1);
        assert_eq!(calls.make_current, 1);
        assert_eq!(calls.clear_current, 1);
    }
}
