// Routine signatures follow the CBLAS argument lists, so they are long.
// Kernels index packed operands directly.
#![allow(clippy::too_many_arguments, clippy::needless_range_loop)]

//! # qblas
//!
//! BLAS levels 1, 2 and 3 for `f32`, `f64`, `Complex32` and `Complex64`,
//! enqueued asynchronously on qblas command queues.
//!
//! Every routine takes its operands as buffers plus element offsets, a list
//! of queues and a wait list, and returns one [`Event`] per queue. Arguments
//! are validated synchronously; once a routine has returned `Ok` its outcome
//! is only observable through the events.
//!
//! ## Routines
//!
//! - **Level 1**: `swap`, `scal`, `copy`, `axpy`, `dot`/`dotc`, `rotg`,
//!   `rotmg`, `rot`, `rotm`, `nrm2`, `asum`, `iamax`
//! - **Level 2**: `gemv`, `gbmv`, the `tr*`/`tp*`/`tb*` multiply and solve
//!   families, `symv`/`hemv` with packed and band forms, `ger`/`gerc` and the
//!   symmetric/hermitian rank-1 and rank-2 updates
//! - **Level 3**: `gemm`, `symm`, `hemm`, `trmm`, `trsm`, `syrk`, `herk`,
//!   `syr2k`, `her2k`
//! - **Transfers**: `write_matrix`, `read_matrix`, `fill_matrix`, `fill_vector`
//!
//! Each generic routine has typed wrappers with the usual prefixes
//! (`sgemm`, `zherk`, `icamax`, ...).
//!
//! ## Multiple queues
//!
//! Large routines split their output across the queues they are given; the
//! rest run on the first queue and place a marker on the others. Either way
//! the result is the same as on a single queue.
//!
//! ## Example
//!
//! ```
//! use qblas_blas::{sgemm, Buffer, CommandQueue, Context, Event, MemFlags, Order, Transpose};
//!
//! qblas_blas::setup()?;
//! let ctx = Context::host();
//! let queue = CommandQueue::default_for(&ctx)?;
//!
//! let a = Buffer::from_slice(&ctx, MemFlags::ReadOnly, &[1.0f32; 6])?;
//! let b = Buffer::from_slice(&ctx, MemFlags::ReadOnly, &[1.0f32; 6])?;
//! let c = Buffer::<f32>::new(&ctx, MemFlags::ReadWrite, 4)?;
//!
//! // C (2x2) = A (2x3) * B (3x2), row-major
//! let events = sgemm(
//!     Order::RowMajor, Transpose::NoTrans, Transpose::NoTrans,
//!     2, 2, 3, 1.0, &a, 0, 3, &b, 0, 2, 0.0, &c, 0, 2, &[queue], &[],
//! )?;
//! Event::wait_all(&events)?;
//! assert_eq!(c.to_vec(), vec![3.0; 4]);
//! # Ok::<(), qblas_blas::Error>(())
//! ```

mod dispatch;
mod kernels;
mod scratch;
mod state;
mod validate;

pub mod level1;
pub mod level2;
pub mod level3;
pub mod transfer;

pub use dispatch::{Routine, TileParams, Variant};
pub use level1::*;
pub use level2::*;
pub use level3::*;
#[allow(deprecated)]
pub use scratch::{add_scratch_image, remove_scratch_image, ScratchImageId};
pub use state::{cached_kernel_count, is_initialized, setup, setup_with, teardown, version};
pub use transfer::{fill_matrix, fill_vector, read_matrix, write_matrix, Pending};

pub use qblas_core::{
    Buffer, CommandQueue, Complex32, Complex64, Config, Context, DType, Device, DeviceBuilder,
    Diag, Element, Error, Event, EventStatus, Image, MemFlags, Operand, Order, Real, Result, Side,
    Status, Transpose, Uplo,
};
