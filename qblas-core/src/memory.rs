//! Device memory objects: typed buffers and 2-D images.
//!
//! A [`Buffer`] is a zero-initialised allocation owned by one [`Context`].
//! Routines address it by element offset, so one buffer can hold several
//! matrices and vectors side by side. Handles are cheap clones of the same
//! object; commands capture a clone, so memory stays alive until every
//! enqueued command that uses it has run, even after [`Buffer::release`].
//!
//! # Borrowing
//!
//! Host access goes through mapped guards ([`Buffer::map_read`],
//! [`Buffer::map_write`]). Any number of readers may hold a buffer at once;
//! a writer is exclusive. Kernels that read and write the same object take
//! a snapshot of the read side first, so a call like `C := A * C` never
//! deadlocks on its own buffer.

use crate::context::Context;
use crate::error::{Error, Result};
use bytemuck::Pod;
use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_MEM_ID: AtomicU64 = AtomicU64::new(1);

/// Plain-old-data types that can live in device memory.
pub trait DeviceCopy: Pod + Send + Sync {}

impl<T: Pod + Send + Sync> DeviceCopy for T {}

/// Access permitted to kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemFlags {
    #[default]
    ReadWrite,
    ReadOnly,
    WriteOnly,
}

impl MemFlags {
    pub fn readable(self) -> bool {
        !matches!(self, MemFlags::WriteOnly)
    }

    pub fn writable(self) -> bool {
        !matches!(self, MemFlags::ReadOnly)
    }
}

fn zeroed_vec<T: DeviceCopy>(len: usize) -> Result<Vec<T>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| Error::OutOfHostMemory {
            bytes: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
    data.resize(len, T::zeroed());
    Ok(data)
}

struct BufferInner<T> {
    id: u64,
    context_id: u64,
    flags: MemFlags,
    len: usize,
    released: AtomicBool,
    data: RwLock<Vec<T>>,
}

/// A typed device buffer. Cheap to clone; clones refer to the same memory.
pub struct Buffer<T: DeviceCopy> {
    inner: Arc<BufferInner<T>>,
}

impl<T: DeviceCopy> Clone for Buffer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: DeviceCopy> std::fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("id", &self.inner.id)
            .field("context", &self.inner.context_id)
            .field("flags", &self.inner.flags)
            .field("len", &self.len())
            .field("released", &self.is_released())
            .finish()
    }
}

impl<T: DeviceCopy> Buffer<T> {
    /// Allocate `len` zeroed elements in `context`.
    pub fn new(context: &Context, flags: MemFlags, len: usize) -> Result<Self> {
        if len == 0 {
            return Err(Error::invalid_value("len", "buffer size must be non-zero"));
        }
        Ok(Self::wrap(context, flags, zeroed_vec(len)?))
    }

    /// Allocate a buffer initialised with `data`.
    pub fn from_slice(context: &Context, flags: MemFlags, data: &[T]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::invalid_value("data", "buffer size must be non-zero"));
        }
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(data.len())
            .map_err(|_| Error::OutOfHostMemory {
                bytes: std::mem::size_of_val(data),
            })?;
        storage.extend_from_slice(data);
        Ok(Self::wrap(context, flags, storage))
    }

    fn wrap(context: &Context, flags: MemFlags, data: Vec<T>) -> Self {
        Self {
            inner: Arc::new(BufferInner {
                id: NEXT_MEM_ID.fetch_add(1, Ordering::Relaxed),
                context_id: context.id(),
                flags,
                len: data.len(),
                released: AtomicBool::new(false),
                data: RwLock::new(data),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn context_id(&self) -> u64 {
        self.inner.context_id
    }

    pub fn flags(&self) -> MemFlags {
        self.inner.flags
    }

    /// Capacity in elements. Does not wait for commands using the buffer.
    pub fn len(&self) -> usize {
        self.inner.len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn same_object(&self, other: &Buffer<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Mark the handle as released. New commands reject it; commands already
    /// enqueued keep their reference and run normally.
    pub fn release(&self) {
        self.inner.released.store(true, Ordering::Release);
    }

    pub fn is_released(&self) -> bool {
        self.inner.released.load(Ordering::Acquire)
    }

    /// Shared view of the whole buffer.
    pub fn map_read(&self) -> MappedRwLockReadGuard<'_, [T]> {
        RwLockReadGuard::map(self.inner.data.read(), |v| v.as_slice())
    }

    /// Exclusive view of the whole buffer.
    pub fn map_write(&self) -> MappedRwLockWriteGuard<'_, [T]> {
        RwLockWriteGuard::map(self.inner.data.write(), |v| v.as_mut_slice())
    }

    /// Copy of the whole buffer.
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.data.read().clone()
    }

    /// Copy `len` elements starting at `offset`.
    pub fn read_range(&self, offset: usize, len: usize) -> Result<Vec<T>> {
        let data = self.inner.data.read();
        let end = offset
            .checked_add(len)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                Error::invalid_value(
                    "offset",
                    format!("range {offset}+{len} exceeds buffer of {}", data.len()),
                )
            })?;
        Ok(data[offset..end].to_vec())
    }

    /// Overwrite elements starting at `offset` with `src`.
    pub fn write(&self, offset: usize, src: &[T]) -> Result<()> {
        let mut data = self.inner.data.write();
        let capacity = data.len();
        let end = offset
            .checked_add(src.len())
            .filter(|&end| end <= capacity)
            .ok_or_else(|| {
                Error::invalid_value(
                    "offset",
                    format!("range {offset}+{} exceeds buffer of {capacity}", src.len()),
                )
            })?;
        data[offset..end].copy_from_slice(src);
        Ok(())
    }
}

/// Bytes per texel of an RGBA float image.
pub const TEXEL_BYTES: usize = 16;

struct ImageInner {
    id: u64,
    context_id: u64,
    width: usize,
    height: usize,
    // u64 words keep every element type's alignment satisfied when viewed as a workspace
    texels: RwLock<Vec<u64>>,
}

/// A 2-D RGBA float image. Used as packing workspace by image-backed kernels.
#[derive(Clone)]
pub struct Image {
    inner: Arc<ImageInner>,
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("id", &self.inner.id)
            .field("context", &self.inner.context_id)
            .field("width", &self.inner.width)
            .field("height", &self.inner.height)
            .finish()
    }
}

impl Image {
    /// Allocate a `width x height` image in `context`.
    ///
    /// Fails with `InvalidOperation` if no device of the context supports images
    /// and with `InvalidValue` if the size is zero or beyond every device's limit.
    pub fn new(context: &Context, width: usize, height: usize) -> Result<Self> {
        let capable: Vec<_> = context
            .devices()
            .iter()
            .filter(|d| d.info().image_support)
            .collect();
        if capable.is_empty() {
            return Err(Error::InvalidOperation(
                "no device in the context supports images".into(),
            ));
        }
        if width == 0 || height == 0 {
            return Err(Error::invalid_value("width/height", "image size must be non-zero"));
        }
        let fits = capable.iter().any(|d| {
            let (max_w, max_h) = d.info().max_image2d;
            width <= max_w && height <= max_h
        });
        if !fits {
            return Err(Error::invalid_value(
                "width/height",
                format!("{width}x{height} exceeds the device image limits"),
            ));
        }
        let words = width
            .checked_mul(height)
            .and_then(|t| t.checked_mul(TEXEL_BYTES / 8))
            .ok_or(Error::OutOfHostMemory { bytes: usize::MAX })?;
        Ok(Self {
            inner: Arc::new(ImageInner {
                id: NEXT_MEM_ID.fetch_add(1, Ordering::Relaxed),
                context_id: context.id(),
                width,
                height,
                texels: RwLock::new(zeroed_vec(words)?),
            }),
        })
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn context_id(&self) -> u64 {
        self.inner.context_id
    }

    pub fn width(&self) -> usize {
        self.inner.width
    }

    pub fn height(&self) -> usize {
        self.inner.height
    }

    pub fn size_in_bytes(&self) -> usize {
        self.inner.width * self.inner.height * TEXEL_BYTES
    }

    /// How many `T` elements fit in the image.
    pub fn capacity<T: DeviceCopy>(&self) -> usize {
        self.size_in_bytes() / std::mem::size_of::<T>()
    }

    /// Run `f` with exclusive use of the first `len` elements of the image viewed as `T`.
    pub fn with_workspace<T: DeviceCopy, R>(
        &self,
        len: usize,
        f: impl FnOnce(&mut [T]) -> R,
    ) -> Result<R> {
        let elem = std::mem::size_of::<T>();
        if len > self.capacity::<T>() {
            return Err(Error::InvalidMemObject(format!(
                "image {} holds {} elements, {len} requested",
                self.inner.id,
                self.capacity::<T>()
            )));
        }
        // Round up to whole texels so the byte length divides evenly by every element size.
        let words = (len * elem).div_ceil(TEXEL_BYTES) * (TEXEL_BYTES / 8);
        let mut texels = self.inner.texels.write();
        let view: &mut [T] = bytemuck::try_cast_slice_mut(&mut texels[..words])
            .map_err(|e| Error::InvalidMemObject(format!("image view: {e}")))?;
        Ok(f(&mut view[..len]))
    }
}
