//! Contexts group devices with the memory objects and queues created on them.

use crate::device::Device;
use crate::error::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct ContextInner {
    id: u64,
    devices: Vec<Device>,
}

/// A set of devices sharing memory objects. Cheap to clone.
///
/// Buffers, images, queues and user events belong to exactly one context;
/// routines reject operands from a different context than their queues.
#[derive(Clone, Debug)]
pub struct Context {
    inner: Arc<ContextInner>,
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Context {}

impl Context {
    pub fn new(devices: &[Device]) -> Result<Self> {
        if devices.is_empty() {
            return Err(Error::invalid_value(
                "devices",
                "a context needs at least one device",
            ));
        }
        let mut unique: Vec<Device> = Vec::with_capacity(devices.len());
        for device in devices {
            if !unique.contains(device) {
                unique.push(device.clone());
            }
        }
        let id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(context = id, devices = unique.len(), "created context");
        Ok(Self {
            inner: Arc::new(ContextInner {
                id,
                devices: unique,
            }),
        })
    }

    /// A context holding only the host device.
    pub fn host() -> Self {
        let id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            inner: Arc::new(ContextInner {
                id,
                devices: vec![Device::host()],
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn devices(&self) -> &[Device] {
        &self.inner.devices
    }

    pub fn contains(&self, device: &Device) -> bool {
        self.inner.devices.contains(device)
    }
}
