//! Scratch images for the image-backed GEMM path (deprecated).
//!
//! Registered images are kept in an arena keyed by monotonically increasing
//! ids. When a GEMM runs on a context that owns an image large enough for a
//! packed B panel, the kernel packs into the image instead of a heap buffer.
//! Newer code should not register images; the heap path is as fast on the
//! host device.

use crate::state;
use parking_lot::Mutex;
use qblas_core::{Context, DeviceCopy, Error, Image, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handle of a registered scratch image. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScratchImageId(u64);

impl ScratchImageId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScratchImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scratch#{}", self.0)
    }
}

#[derive(Debug)]
pub(crate) struct ScratchArena {
    next_id: AtomicU64,
    images: Mutex<BTreeMap<u64, Image>>,
}

impl ScratchArena {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            images: Mutex::new(BTreeMap::new()),
        }
    }

    pub(crate) fn insert(&self, image: Image) -> ScratchImageId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.images.lock().insert(id, image);
        ScratchImageId(id)
    }

    pub(crate) fn remove(&self, id: ScratchImageId) -> Option<Image> {
        self.images.lock().remove(&id.0)
    }

    pub(crate) fn len(&self) -> usize {
        self.images.lock().len()
    }

    /// Smallest image of `context_id` that holds at least `len` elements of `T`.
    pub(crate) fn find<T: DeviceCopy>(&self, context_id: u64, len: usize) -> Option<Image> {
        self.images
            .lock()
            .values()
            .filter(|img| img.context_id() == context_id && img.capacity::<T>() >= len)
            .min_by_key(|img| img.size_in_bytes())
            .cloned()
    }
}

/// Register a `width x height` scratch image in `context`.
#[deprecated(note = "GEMM packs into heap memory; scratch images are no longer needed")]
pub fn add_scratch_image(context: &Context, width: usize, height: usize) -> Result<ScratchImageId> {
    let lib = state::library()?;
    let image = Image::new(context, width, height)?;
    let id = lib.scratch.insert(image);
    tracing::warn!(%id, width, height, "registered deprecated scratch image");
    Ok(id)
}

/// Release a scratch image. Unknown ids fail with `InvalidValue`.
///
/// Commands already using the image keep it alive until they finish.
#[deprecated(note = "GEMM packs into heap memory; scratch images are no longer needed")]
pub fn remove_scratch_image(id: ScratchImageId) -> Result<()> {
    let lib = state::library()?;
    match lib.scratch.remove(id) {
        Some(_) => {
            tracing::debug!(%id, "removed scratch image");
            Ok(())
        }
        None => Err(Error::invalid_value(
            "image",
            format!("{id} is not a registered scratch image"),
        )),
    }
}
