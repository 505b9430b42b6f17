//! Kernel selection, the per-device kernel cache and partitioning across queues.
//!
//! A kernel is identified by [`KernelKey`] (routine, element type, variant)
//! and built at most once per device. Building derives the tile parameters
//! the kernel runs with from the device description and the configuration;
//! concurrent first users of a key block until the build finishes.
//!
//! A [`Plan`] holds one built kernel per queue. Kernels for every queue are
//! built before anything is enqueued, so a build failure never leaves a
//! partially submitted call behind.

use crate::state::Library;
use crate::validate;
use parking_lot::Mutex;
use qblas_core::{
    parallel, CommandQueue, Config, DType, Device, DeviceId, DeviceInfo, Element, Error, Event,
    Result,
};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Largest micro-tile the kernels keep in registers.
pub(crate) const MAX_MR: usize = 8;
pub(crate) const MAX_NR: usize = 16;

/// Smallest depth block worth staging.
const MIN_KC: usize = 16;

/// Every operation a kernel can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Routine {
    Swap,
    Scal,
    Copy,
    Axpy,
    Dot,
    Dotc,
    Rotg,
    Rotmg,
    Rot,
    Rotm,
    Nrm2,
    Iamax,
    Asum,
    Gemv,
    Gbmv,
    Trmv,
    Tpmv,
    Tbmv,
    Trsv,
    Tpsv,
    Tbsv,
    Symv,
    Spmv,
    Sbmv,
    Hemv,
    Hpmv,
    Hbmv,
    Ger,
    Gerc,
    Syr,
    Spr,
    Her,
    Hpr,
    Syr2,
    Spr2,
    Her2,
    Hpr2,
    Gemm,
    Symm,
    Hemm,
    Trmm,
    Trsm,
    Syrk,
    Herk,
    Syr2k,
    Her2k,
    WriteMatrix,
    ReadMatrix,
    Fill,
}

impl Routine {
    /// Lower-case name used for events and log lines.
    pub fn name(self) -> &'static str {
        match self {
            Routine::Swap => "swap",
            Routine::Scal => "scal",
            Routine::Copy => "copy",
            Routine::Axpy => "axpy",
            Routine::Dot => "dot",
            Routine::Dotc => "dotc",
            Routine::Rotg => "rotg",
            Routine::Rotmg => "rotmg",
            Routine::Rot => "rot",
            Routine::Rotm => "rotm",
            Routine::Nrm2 => "nrm2",
            Routine::Iamax => "iamax",
            Routine::Asum => "asum",
            Routine::Gemv => "gemv",
            Routine::Gbmv => "gbmv",
            Routine::Trmv => "trmv",
            Routine::Tpmv => "tpmv",
            Routine::Tbmv => "tbmv",
            Routine::Trsv => "trsv",
            Routine::Tpsv => "tpsv",
            Routine::Tbsv => "tbsv",
            Routine::Symv => "symv",
            Routine::Spmv => "spmv",
            Routine::Sbmv => "sbmv",
            Routine::Hemv => "hemv",
            Routine::Hpmv => "hpmv",
            Routine::Hbmv => "hbmv",
            Routine::Ger => "ger",
            Routine::Gerc => "gerc",
            Routine::Syr => "syr",
            Routine::Spr => "spr",
            Routine::Her => "her",
            Routine::Hpr => "hpr",
            Routine::Syr2 => "syr2",
            Routine::Spr2 => "spr2",
            Routine::Her2 => "her2",
            Routine::Hpr2 => "hpr2",
            Routine::Gemm => "gemm",
            Routine::Symm => "symm",
            Routine::Hemm => "hemm",
            Routine::Trmm => "trmm",
            Routine::Trsm => "trsm",
            Routine::Syrk => "syrk",
            Routine::Herk => "herk",
            Routine::Syr2k => "syr2k",
            Routine::Her2k => "her2k",
            Routine::WriteMatrix => "write_matrix",
            Routine::ReadMatrix => "read_matrix",
            Routine::Fill => "fill",
        }
    }
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Implementation strategy of a kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Direct loops over the operands.
    Reference,
    /// Cache-blocked with packed panels.
    Blocked,
    /// Blocked, packing B into a registered scratch image.
    ImageBacked,
}

impl Variant {
    fn stages_panels(self) -> bool {
        !matches!(self, Variant::Reference)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KernelKey {
    pub routine: Routine,
    pub dtype: DType,
    pub variant: Variant,
}

impl fmt::Display for KernelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{:?}", self.dtype.prefix(), self.routine, self.variant)
    }
}

/// Blocking parameters a kernel was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileParams {
    /// Micro-tile rows.
    pub mr: usize,
    /// Micro-tile columns.
    pub nr: usize,
    /// Rows of a packed A block, a multiple of `mr`.
    pub mc: usize,
    /// Columns of a packed B panel, a multiple of `nr`.
    pub nc: usize,
    /// Depth of packed panels.
    pub kc: usize,
    /// Output elements below which the kernel runs on one thread.
    pub parallel_threshold: usize,
}

impl TileParams {
    /// Derive tiles for `dtype` on a device.
    ///
    /// Staging variants keep a `kc x nr` strip of B in local memory, so `kc`
    /// is capped by the device's local memory.
    pub fn for_device(
        info: &DeviceInfo,
        dtype: DType,
        variant: Variant,
        config: &Config,
    ) -> Result<Self> {
        let elem = dtype.size_in_bytes();
        let nr = (info.vector_bytes / elem).clamp(2, MAX_NR);
        let mr = if dtype.is_complex() { 4 } else { 6 };
        let (mc_default, nc_default) = if dtype.is_double() {
            (96, 1024)
        } else {
            (128, 2048)
        };

        let mut kc = config.gemm_kc.unwrap_or(256);
        if variant.stages_panels() {
            let kc_cap = info.local_mem_bytes / (nr * elem);
            if kc_cap < MIN_KC {
                return Err(Error::BuildProgramFailure {
                    kernel: format!("{}gemm", dtype.prefix()),
                    reason: format!(
                        "{} bytes of local memory cannot stage a {MIN_KC}x{nr} panel",
                        info.local_mem_bytes
                    ),
                });
            }
            kc = kc.min(kc_cap);
        }

        Ok(Self {
            mr,
            nr,
            mc: config.gemm_mc.unwrap_or(mc_default).div_ceil(mr) * mr,
            nc: config.gemm_nc.unwrap_or(nc_default).div_ceil(nr) * nr,
            kc,
            parallel_threshold: config.parallel_threshold,
        })
    }

    /// Elements of a packed B panel.
    pub fn packed_b_len(&self) -> usize {
        self.kc * self.nc
    }
}

/// A built kernel.
#[derive(Debug)]
pub struct Kernel {
    pub key: KernelKey,
    pub device: DeviceId,
    pub tiles: TileParams,
}

type Slot = Arc<Mutex<Option<Arc<Kernel>>>>;

/// Compile-once kernel cache keyed by device and kernel.
#[derive(Debug, Default)]
pub(crate) struct KernelCache {
    slots: Mutex<HashMap<(DeviceId, KernelKey), Slot>>,
    builds: AtomicUsize,
}

impl KernelCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Kernels built successfully so far.
    pub(crate) fn len(&self) -> usize {
        self.builds.load(Ordering::Acquire)
    }

    pub(crate) fn get_or_build(
        &self,
        device: &Device,
        key: KernelKey,
        config: &Config,
    ) -> Result<Arc<Kernel>> {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry((device.id(), key)).or_default())
        };
        // Held across the build: other first users wait here.
        let mut slot = slot.lock();
        if let Some(kernel) = slot.as_ref() {
            return Ok(Arc::clone(kernel));
        }
        let kernel = Arc::new(build(device, key, config)?);
        self.builds.fetch_add(1, Ordering::AcqRel);
        *slot = Some(Arc::clone(&kernel));
        Ok(kernel)
    }
}

fn build(device: &Device, key: KernelKey, config: &Config) -> Result<Kernel> {
    let info = device.info();
    if !info.compiler_available {
        return Err(Error::CompilerNotAvailable {
            device: info.name.clone(),
        });
    }
    let tiles = TileParams::for_device(info, key.dtype, key.variant, config)?;
    tracing::debug!(kernel = %key, device = %info.name, ?tiles, "built kernel");
    Ok(Kernel {
        key,
        device: device.id(),
        tiles,
    })
}

/// Kernels for one call, one per queue.
pub(crate) struct Plan<'a> {
    routine: Routine,
    queues: &'a [CommandQueue],
    wait: &'a [Event],
    kernels: SmallVec<[Arc<Kernel>; 4]>,
}

/// Run the resource checks and build one kernel per queue.
pub(crate) fn plan<'a, T: Element>(
    lib: &Library,
    routine: Routine,
    variant: Variant,
    queues: &'a [CommandQueue],
    wait: &'a [Event],
) -> Result<Plan<'a>> {
    let context = validate::queues(queues)?;
    validate::wait_list(wait, context)?;
    validate::device_support::<T>(queues)?;

    let key = KernelKey {
        routine,
        dtype: T::DTYPE,
        variant,
    };
    let kernels = queues
        .iter()
        .map(|q| lib.kernels.get_or_build(q.device(), key, &lib.config))
        .collect::<Result<SmallVec<_>>>()?;
    tracing::debug!(kernel = %key, queues = queues.len(), waits = wait.len(), "dispatching");
    Ok(Plan {
        routine,
        queues,
        wait,
        kernels,
    })
}

impl Plan<'_> {
    /// Run `work` on the first queue. The others get a marker.
    pub(crate) fn single<F>(self, work: F) -> Result<Vec<Event>>
    where
        F: FnOnce(&Kernel) -> Result<()> + Send + 'static,
    {
        let kernel = Arc::clone(&self.kernels[0]);
        tracing::trace!(
            queue = self.queues[0].id(),
            kernel = %kernel.key,
            device = kernel.device.raw(),
            "enqueue"
        );
        let mut events = Vec::with_capacity(self.queues.len());
        events.push(
            self.queues[0].enqueue(self.routine.name(), self.wait, move || work(&kernel))?,
        );
        for queue in &self.queues[1..] {
            events.push(queue.enqueue_marker(self.wait)?);
        }
        Ok(events)
    }

    /// Split `0..total` into one contiguous range per queue and run `work` on each.
    ///
    /// Queues left without a range get a marker.
    pub(crate) fn split<F>(self, total: usize, work: F) -> Result<Vec<Event>>
    where
        F: Fn(&Kernel, Range<usize>) -> Result<()> + Send + Sync + 'static,
    {
        let work = Arc::new(work);
        let ranges = parallel::split_even(total, self.queues.len());
        let mut events = Vec::with_capacity(self.queues.len());
        for (i, queue) in self.queues.iter().enumerate() {
            let event = match ranges.get(i) {
                Some(range) => {
                    let (work, kernel, range) =
                        (Arc::clone(&work), Arc::clone(&self.kernels[i]), range.clone());
                    tracing::trace!(
                        queue = queue.id(),
                        kernel = %kernel.key,
                        device = kernel.device.raw(),
                        ?range,
                        "enqueue partition"
                    );
                    queue.enqueue(self.routine.name(), self.wait, move || work(&kernel, range))?
                }
                None => queue.enqueue_marker(self.wait)?,
            };
            events.push(event);
        }
        Ok(events)
    }
}
