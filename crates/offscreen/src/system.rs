//! The system EGL backend.
//!
//! Loads the platform's EGL library dynamically at runtime (nothing
//! links against libEGL, so the workspace builds on machines without GL)
//! and implements the native-API seam over it. The library is loaded once
//! per process, with the environment nudged toward software rendering
//! first so CI-class machines without a GPU still produce a context.

use std::ffi::c_void;
use std::rc::Rc;
use std::sync::OnceLock;

use khronos_egl as egl;

use glesbed_core::api::{
    ConfigRequest, EglApi, ProcAddr, RawConfig, RawContext, RawDisplay, RawSurface,
};

use crate::error::CreateError;

type Egl = egl::DynamicInstance<egl::EGL1_4>;

static INSTANCE: OnceLock<Result<Egl, String>> = OnceLock::new();

/// Loads the EGL library exactly once for the process.
#[allow(unsafe_code)]
fn instance() -> Result<&'static Egl, CreateError> {
    let slot = INSTANCE.get_or_init(|| {
        // The software path must be chosen before the library first reads
        // the environment.
        if std::env::var_os("LIBGL_ALWAYS_SOFTWARE").is_none() {
            std::env::set_var("LIBGL_ALWAYS_SOFTWARE", "1");
        }
        // SAFETY: loading libEGL runs its initialization routines; we load
        // it at most once, before any other EGL usage in this process.
        unsafe { Egl::load_required().map_err(|e| e.to_string()) }
    });
    match slot {
        Ok(egl) => Ok(egl),
        Err(msg) => Err(CreateError::EglUnavailable(msg.clone())),
    }
}

/// [`EglApi`] over the system's EGL library.
///
/// Raw seam tokens are the native handles' addresses; only tokens minted
/// by this backend are ever passed back in, upholding the reconstruction
/// contract below.
pub struct SystemEgl {
    egl: &'static Egl,
}

impl SystemEgl {
    /// Wraps the process-wide EGL library, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns `CreateError::EglUnavailable` when no EGL library can be
    /// loaded; the failure is remembered for the life of the process.
    pub fn load() -> Result<Rc<Self>, CreateError> {
        Ok(Rc::new(Self { egl: instance()? }))
    }
}

#[allow(unsafe_code)]
fn display_from(raw: RawDisplay) -> egl::Display {
    // SAFETY: the token was minted from a live Display's address by this
    // backend.
    unsafe { egl::Display::from_ptr(raw.0 as *mut c_void) }
}

#[allow(unsafe_code)]
fn config_from(raw: RawConfig) -> egl::Config {
    // SAFETY: as above; the token round-trips a live Config.
    unsafe { egl::Config::from_ptr(raw.0 as *mut c_void) }
}

#[allow(unsafe_code)]
fn context_from(raw: RawContext) -> egl::Context {
    // SAFETY: as above; the token round-trips a live Context.
    unsafe { egl::Context::from_ptr(raw.0 as *mut c_void) }
}

#[allow(unsafe_code)]
fn surface_from(raw: RawSurface) -> egl::Surface {
    // SAFETY: as above; the token round-trips a live Surface.
    unsafe { egl::Surface::from_ptr(raw.0 as *mut c_void) }
}

fn config_attributes(request: &ConfigRequest) -> Vec<egl::Int> {
    vec![
        egl::RED_SIZE,
        egl::Int::from(request.red_bits),
        egl::GREEN_SIZE,
        egl::Int::from(request.green_bits),
        egl::BLUE_SIZE,
        egl::Int::from(request.blue_bits),
        egl::ALPHA_SIZE,
        egl::Int::from(request.alpha_bits),
        egl::DEPTH_SIZE,
        egl::Int::from(request.depth_bits),
        egl::STENCIL_SIZE,
        egl::Int::from(request.stencil_bits),
        egl::SURFACE_TYPE,
        if request.pbuffer {
            egl::PBUFFER_BIT
        } else {
            egl::WINDOW_BIT
        },
        egl::CONFORMANT,
        if request.es2_conformant {
            egl::OPENGL_ES2_BIT
        } else {
            0
        },
        egl::RENDERABLE_TYPE,
        egl::OPENGL_ES2_BIT,
        egl::NONE,
    ]
}

impl EglApi for SystemEgl {
    #[allow(unsafe_code)]
    fn default_display(&self) -> Option<RawDisplay> {
        // SAFETY: DEFAULT_DISPLAY is the one native display id that is
        // always valid to query.
        let display = unsafe { self.egl.get_display(egl::DEFAULT_DISPLAY) }?;
        Some(RawDisplay(display.as_ptr() as usize))
    }

    fn initialize(&self, display: RawDisplay) -> bool {
        self.egl.initialize(display_from(display)).is_ok()
    }

    fn choose_config(&self, display: RawDisplay, request: &ConfigRequest) -> Option<RawConfig> {
        let display = display_from(display);
        let attributes = config_attributes(request);

        let count = self.egl.matching_config_count(display, &attributes).ok()?;
        if count != 1 {
            return None;
        }
        let config = self.egl.choose_first_config(display, &attributes).ok()??;
        Some(RawConfig(config.as_ptr() as usize))
    }

    fn create_context(
        &self,
        display: RawDisplay,
        config: RawConfig,
        client_version: i32,
    ) -> Option<RawContext> {
        let attributes = [egl::CONTEXT_CLIENT_VERSION, client_version, egl::NONE];
        let context = self
            .egl
            .create_context(display_from(display), config_from(config), None, &attributes)
            .ok()?;
        Some(RawContext(context.as_ptr() as usize))
    }

    fn create_pbuffer_surface(
        &self,
        display: RawDisplay,
        config: RawConfig,
        width: i32,
        height: i32,
    ) -> Option<RawSurface> {
        let attributes = [egl::WIDTH, width, egl::HEIGHT, height, egl::NONE];
        let surface = self
            .egl
            .create_pbuffer_surface(display_from(display), config_from(config), &attributes)
            .ok()?;
        Some(RawSurface(surface.as_ptr() as usize))
    }

    fn make_current(
        &self,
        display: RawDisplay,
        surface: Option<RawSurface>,
        context: Option<RawContext>,
    ) -> bool {
        let draw = surface.map(surface_from);
        let read = surface.map(surface_from);
        self.egl
            .make_current(display_from(display), draw, read, context.map(context_from))
            .is_ok()
    }

    fn clear_current(&self, display: RawDisplay) -> bool {
        self.egl
            .make_current(display_from(display), None, None, None)
            .is_ok()
    }

    fn current_context(&self) -> Option<RawContext> {
        let context = self.egl.get_current_context()?;
        Some(RawContext(context.as_ptr() as usize))
    }

    fn get_proc_address(&self, name: &str) -> Option<ProcAddr> {
        let addr = self.egl.get_proc_address(name)?;
        Some(addr as ProcAddr)
    }

    fn destroy_surface(&self, display: RawDisplay, surface: RawSurface) -> bool {
        self.egl
            .destroy_surface(display_from(display), surface_from(surface))
            .is_ok()
    }

    fn destroy_context(&self, display: RawDisplay, context: RawContext) -> bool {
        self.egl
            .destroy_context(display_from(display), context_from(context))
            .is_ok()
    }

    fn terminate(&self, display: RawDisplay) -> bool {
        self.egl.terminate(display_from(display)).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{try_create, FactoryOptions};
    use glesbed_core::scheduler::TaskLoop;

    // These tests exercise the real library and only run where one is
    // installed (e.g. Mesa with llvmpipe). Run with `cargo test -- --ignored`.

    #[test]
    #[ignore = "requires EGL"]
    fn system_egl_produces_a_display() {
        let api = SystemEgl::load().unwrap();
        assert!(api.default_display().is_some());
    }

    #[test]
    #[ignore = "requires EGL"]
    fn full_context_construction_succeeds() {
        let api = SystemEgl::load().unwrap();
        let scheduler = Rc::new(TaskLoop::new());
        let context = try_create(FactoryOptions::new(api, scheduler)).unwrap();
        assert!(context.delegate().is_valid());
    }
}
