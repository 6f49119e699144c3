#![deny(unsafe_code)]
//! Core contracts for glesbed, an offscreen software-GL test context.
//!
//! Provides the native-API seam ([`EglApi`] + [`FakeEgl`]), the scoped
//! current-context switch ([`ContextSwitch`]/[`SwitchResult`]), the
//! engine's generic GPU-surface contract ([`GlSurfaceDelegate`]), the
//! cooperative scheduling seam ([`TaskScheduler`]/[`TaskLoop`]), the GL
//! entry-point table ([`ProcTable`]), the built-in shader library, and
//! the worker-gated backend context ([`ReactorContext`]).

pub mod api;
pub mod error;
pub mod proc_table;
pub mod reactor;
pub mod scheduler;
pub mod shaders;
pub mod surface;
pub mod switch;

pub use api::{ConfigRequest, EglApi, FakeEgl, ProcAddr, RawConfig, RawContext, RawDisplay, RawSurface};
pub use error::CoreError;
pub use proc_table::{ProcTable, REQUIRED_PROCS};
pub use reactor::{GlOperation, ReactOutcome, ReactorContext, ReactorWorker};
pub use scheduler::{ObserverKey, TaskLoop, TaskObserver, TaskScheduler};
pub use shaders::{builtin_shader_blobs, ShaderBlob};
pub use surface::{FboInfo, FrameInfo, FramebufferInfo, GlSurfaceDelegate, PresentInfo};
pub use switch::{ContextSwitch, SwitchResult, SwitchableContext};
