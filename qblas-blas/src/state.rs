//! Process-wide library state: `setup`, `teardown` and `version`.
//!
//! Every routine starts by fetching the current [`Library`]; if `setup` has
//! not run (or `teardown` already did) it fails with `NotInitialized` before
//! looking at any argument.
//!
//! `setup` and `teardown` must not race with routine calls. Commands that are
//! already enqueued hold their own references and finish normally.

use crate::dispatch::KernelCache;
use crate::scratch::ScratchArena;
use parking_lot::RwLock;
use qblas_core::{parallel, Config, Error, Result};
use std::sync::Arc;

/// State shared by every routine between `setup` and `teardown`.
#[derive(Debug)]
pub(crate) struct Library {
    pub(crate) config: Config,
    pub(crate) kernels: KernelCache,
    pub(crate) scratch: ScratchArena,
}

static LIBRARY: RwLock<Option<Arc<Library>>> = parking_lot::const_rwlock(None);

/// Initialise the library from the `QBLAS_*` environment.
///
/// Calling it again while initialised is a no-op.
pub fn setup() -> Result<()> {
    setup_with(Config::from_env())
}

/// Initialise the library with an explicit configuration.
pub fn setup_with(config: Config) -> Result<()> {
    let mut slot = LIBRARY.write();
    if slot.is_some() {
        tracing::debug!("setup called while already initialized");
        return Ok(());
    }
    parallel::set_max_threads(config.max_threads);
    tracing::info!(?config, "qblas initialized");
    *slot = Some(Arc::new(Library {
        config,
        kernels: KernelCache::new(),
        scratch: ScratchArena::new(),
    }));
    Ok(())
}

/// Drop cached kernels and scratch images. Later calls fail with `NotInitialized`.
pub fn teardown() {
    if let Some(lib) = LIBRARY.write().take() {
        tracing::info!(
            kernels = lib.kernels.len(),
            scratch_images = lib.scratch.len(),
            "qblas torn down"
        );
    }
}

pub fn is_initialized() -> bool {
    LIBRARY.read().is_some()
}

/// Library version as `(major, minor, patch)`.
pub fn version() -> (u32, u32, u32) {
    (
        env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0),
        env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0),
        env!("CARGO_PKG_VERSION_PATCH").parse().unwrap_or(0),
    )
}

/// Number of kernels built so far across all devices.
pub fn cached_kernel_count() -> Result<usize> {
    Ok(library()?.kernels.len())
}

pub(crate) fn library() -> Result<Arc<Library>> {
    LIBRARY.read().clone().ok_or(Error::NotInitialized)
}
