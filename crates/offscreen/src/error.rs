//! Error types for offscreen context construction.

use glesbed_core::CoreError;
use thiserror::Error;

/// Construction-time failures. Each is terminal for the attempt: the
/// factory yields no partial objects, and nothing is retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CreateError {
    /// The EGL library could not be loaded at runtime.
    #[error("EGL library unavailable: {0}")]
    EglUnavailable(String),

    /// The backend produced no display.
    #[error("could not acquire an EGL display")]
    NoDisplay,

    /// The display refused to initialize.
    #[error("could not initialize the EGL display")]
    DisplayInit,

    /// Zero or more than one configuration matched the requested
    /// attributes.
    #[error("no unique EGL config matches the requested attributes")]
    NoMatchingConfig,

    /// Context creation returned no context.
    #[error("could not create a GLES context")]
    ContextCreation,

    /// Pixel-buffer surface creation returned no surface.
    #[error("could not create a pbuffer surface")]
    SurfaceCreation,

    /// The freshly built context could not be made current.
    #[error("could not make the GLES context current")]
    MakeCurrent,

    /// The GL entry-point table failed to resolve.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The backend context failed its validity check after construction.
    #[error("backend context failed validation")]
    InvalidBackendContext,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_convert_transparently() {
        let err = CreateError::from(CoreError::MissingProc("glClear".into()));
        let msg = format!("{err}");
        assert!(msg.contains("glClear"), "expected symbol name in: {msg}");
    }

    #[test]
    fn variants_display_readable_messages() {
        assert!(format!("{}", CreateError::NoDisplay).contains("display"));
        assert!(format!("{}", CreateError::NoMatchingConfig).contains("config"));
        assert!(format!("{}", CreateError::SurfaceCreation).contains("pbuffer"));
        assert!(format!("{}", CreateError::MakeCurrent).contains("current"));
    }

    #[test]
    fn create_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<CreateError>();
    }
}
