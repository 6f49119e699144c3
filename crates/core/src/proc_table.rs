//! GL entry-point resolution and validation.
//!
//! The engine never links GL symbols directly; it resolves the entry
//! points it needs by name through the platform's procedure lookup and
//! fails fast if any are missing, rather than crashing mid-frame on a
//! null call.

use crate::api::{EglApi, ProcAddr};
use crate::error::CoreError;

/// Entry points the harness requires from a GLES2 implementation.
pub const REQUIRED_PROCS: &[&str] = &[
    "glGetString",
    "glGetError",
    "glGetIntegerv",
    "glClear",
    "glClearColor",
    "glViewport",
    "glScissor",
    "glBindFramebuffer",
    "glReadPixels",
    "glPixelStorei",
    "glFinish",
    "glFlush",
];

/// Resolved addresses for [`REQUIRED_PROCS`].
///
/// A loaded table is complete by construction; [`ProcTable::is_valid`]
/// re-checks completeness so holders can validate without knowing how the
/// table was produced.
#[derive(Debug)]
pub struct ProcTable {
    procs: Vec<(&'static str, ProcAddr)>,
}

impl ProcTable {
    /// Resolves every required entry point through the API's procedure
    /// lookup.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MissingProc` naming the first symbol that does
    /// not resolve; no further symbols are looked up after a failure.
    pub fn load(api: &dyn EglApi) -> Result<Self, CoreError> {
        let mut procs = Vec::with_capacity(REQUIRED_PROCS.len());
        for &name in REQUIRED_PROCS {
            let addr = api
                .get_proc_address(name)
                .ok_or_else(|| CoreError::MissingProc(name.to_string()))?;
            procs.push((name, addr));
        }
        Ok(Self { procs })
    }

    /// Address of a resolved entry point, if present in the table.
    pub fn get(&self, name: &str) -> Option<ProcAddr> {
        self.procs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, addr)| *addr)
    }

    pub fn len(&self) -> usize {
        self.procs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }

    /// Whether the table carries a non-null address for every required
    /// entry point.
    pub fn is_valid(&self) -> bool {
        self.procs.len() == REQUIRED_PROCS.len() && self.procs.iter().all(|(_, addr)| !addr.is_null())
    }
}
