//! # qblas core
//!
//! Runtime model shared by the qblas BLAS routines.
//!
//! This crate provides:
//! - **Layout selectors**: `Order`, `Transpose`, `Uplo`, `Diag`, `Side`.
//! - **Element types**: `f32`, `f64`, `Complex32`, `Complex64` behind the [`Element`] trait.
//! - **Status and errors**: the closed [`Status`] enumeration and the [`Error`] type mapping onto it.
//! - **Devices and contexts**: host-memory compute devices with configurable capabilities.
//! - **Memory objects**: typed [`Buffer`]s and RGBA [`Image`]s owned by a context.
//! - **Queues and events**: in-order [`CommandQueue`]s with worker threads, completion [`Event`]s.
//! - **Parallel helpers**, **configuration** and an optional **logging** subscriber.

pub mod config;
pub mod context;
pub mod device;
pub mod element;
pub mod error;
pub mod event;
pub mod layout;
pub mod logging;
pub mod memory;
pub mod parallel;
pub mod queue;

pub use config::Config;
pub use context::Context;
pub use device::{Device, DeviceBuilder, DeviceId, DeviceInfo, HostCaps};
pub use element::{DType, Element, Real};
pub use error::{Error, Operand, Result, Status};
pub use event::{Event, EventStatus};
pub use layout::{Diag, Order, Side, Transpose, Uplo};
pub use memory::{Buffer, DeviceCopy, Image, MemFlags};
pub use num_complex::{Complex32, Complex64};
pub use parallel::parallel_for_chunks;
pub use queue::CommandQueue;
