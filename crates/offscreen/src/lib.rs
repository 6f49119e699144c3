#![deny(unsafe_code)]
//! Offscreen pixel-buffer GLES backend for the glesbed test harness.
//!
//! Builds a software-backed, never-displayed GLES context and adapts it
//! to the rendering engine's surface contract so GPU code paths run on
//! machines with no display hardware. The factory wires four pieces
//! together:
//!
//! - [`PbufferHandle`] -- display/config/context/surface ownership
//! - [`OffscreenDelegate`] -- the engine-facing surface delegate
//! - [`OffscreenReactorWorker`] -- per-task current-ness brokering
//! - [`TestContext`] -- the context object handed to the engine
//!
//! With the `egl` feature (default), [`SystemEgl`] backs the seam with
//! the platform's EGL library and [`snapshot`] reads rendered pixels
//! back into PNGs.

pub mod context;
pub mod delegate;
pub mod error;
pub mod factory;
pub mod handle;
pub mod worker;

#[cfg(feature = "egl")]
pub mod snapshot;
#[cfg(feature = "egl")]
pub mod system;

pub use context::{OffscreenSurface, TestContext};
pub use delegate::OffscreenDelegate;
pub use error::CreateError;
pub use factory::{create, try_create, FactoryOptions};
pub use handle::PbufferHandle;
pub use worker::OffscreenReactorWorker;

#[cfg(feature = "egl")]
pub use factory::create_system;
#[cfg(feature = "egl")]
pub use system::SystemEgl;
