//! Compute devices and their capabilities.
//!
//! A [`Device`] describes what a kernel may assume: compute units, work-group
//! and local-memory limits, fp64 support, image support and whether a kernel
//! compiler is present. The host device is detected once from the running CPU;
//! further devices can be described with [`DeviceBuilder`], which is how tests
//! model hardware without double precision.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Opaque device identifier, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(u64);

impl DeviceId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

static NEXT_DEVICE_ID: AtomicU64 = AtomicU64::new(1);

/// Detected SIMD features of the host CPU.
///
/// Kernels are plain Rust; these only steer tile sizes so the compiler's
/// auto-vectorised micro-tiles line up with the register width.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostCaps {
    pub avx2: bool,
    pub fma: bool,
    pub avx512f: bool,
    pub neon: bool,
    pub num_cores: usize,
}

impl HostCaps {
    /// Vector register width in bytes implied by the detected features.
    pub fn vector_bytes(&self) -> usize {
        if self.avx512f {
            64
        } else if self.avx2 {
            32
        } else {
            16
        }
    }
}

static HOST_CAPS: OnceLock<HostCaps> = OnceLock::new();

/// Detect host capabilities (cached after first call).
pub fn detect() -> &'static HostCaps {
    HOST_CAPS.get_or_init(|| {
        let num_cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        #[cfg(target_arch = "x86_64")]
        {
            HostCaps {
                avx2: is_x86_feature_detected!("avx2"),
                fma: is_x86_feature_detected!("fma"),
                avx512f: is_x86_feature_detected!("avx512f"),
                neon: false,
                num_cores,
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            HostCaps {
                avx2: false,
                fma: true,
                avx512f: false,
                neon: true,
                num_cores,
            }
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            HostCaps {
                num_cores,
                ..HostCaps::default()
            }
        }
    })
}

/// Static description of a device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub vendor: String,
    pub compute_units: usize,
    pub max_work_group_size: usize,
    pub local_mem_bytes: usize,
    pub global_mem_bytes: usize,
    /// Double-precision arithmetic available.
    pub fp64: bool,
    /// 2-D image objects available.
    pub image_support: bool,
    pub max_image2d: (usize, usize),
    /// A kernel compiler is present; without it no kernel can be built.
    pub compiler_available: bool,
    /// Vector register width kernels should tile for.
    pub vector_bytes: usize,
}

/// A compute device. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Device {
    id: DeviceId,
    info: Arc<DeviceInfo>,
}

impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Device {}

static HOST_DEVICE: OnceLock<Device> = OnceLock::new();

impl Device {
    /// The host CPU, detected on first use.
    pub fn host() -> Device {
        HOST_DEVICE
            .get_or_init(|| {
                let caps = detect();
                DeviceBuilder::new("host")
                    .vendor(std::env::consts::ARCH)
                    .compute_units(caps.num_cores)
                    .vector_bytes(caps.vector_bytes())
                    .build()
            })
            .clone()
    }

    pub fn builder(name: impl Into<String>) -> DeviceBuilder {
        DeviceBuilder::new(name)
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn supports_fp64(&self) -> bool {
        self.info.fp64
    }
}

/// Builder for [`Device`] descriptions.
#[derive(Clone, Debug)]
pub struct DeviceBuilder {
    info: DeviceInfo,
}

impl DeviceBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: DeviceInfo {
                name: name.into(),
                vendor: String::from("qblas"),
                compute_units: 1,
                max_work_group_size: 256,
                local_mem_bytes: 64 * 1024,
                global_mem_bytes: 1 << 32,
                fp64: true,
                image_support: true,
                max_image2d: (16384, 16384),
                compiler_available: true,
                vector_bytes: 32,
            },
        }
    }

    pub fn vendor(mut self, vendor: impl Into<String>) -> Self {
        self.info.vendor = vendor.into();
        self
    }

    pub fn compute_units(mut self, units: usize) -> Self {
        self.info.compute_units = units.max(1);
        self
    }

    pub fn max_work_group_size(mut self, size: usize) -> Self {
        self.info.max_work_group_size = size.max(1);
        self
    }

    pub fn local_mem_bytes(mut self, bytes: usize) -> Self {
        self.info.local_mem_bytes = bytes;
        self
    }

    pub fn fp64(mut self, enabled: bool) -> Self {
        self.info.fp64 = enabled;
        self
    }

    pub fn image_support(mut self, enabled: bool) -> Self {
        self.info.image_support = enabled;
        self
    }

    pub fn compiler_available(mut self, enabled: bool) -> Self {
        self.info.compiler_available = enabled;
        self
    }

    pub fn vector_bytes(mut self, bytes: usize) -> Self {
        self.info.vector_bytes = bytes.max(4);
        self
    }

    pub fn build(self) -> Device {
        Device {
            id: DeviceId(NEXT_DEVICE_ID.fetch_add(1, Ordering::Relaxed)),
            info: Arc::new(self.info),
        }
    }
}
