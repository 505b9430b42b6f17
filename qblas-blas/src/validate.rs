//! Argument, memory-object and resource checks shared by every routine.
//!
//! Routines run the checks in a fixed order and report the first failure:
//!
//! 1. library initialised (done by fetching the library state),
//! 2. argument values: dimensions, band widths, leading dimensions, increments,
//! 3. memory objects: released, foreign context, access flags, capacity,
//! 4. resources: queues, wait list, double-precision support,
//! 5. kernel builds (in [`crate::dispatch`]).
//!
//! Steps 2 and 3 are split into shape constructors ([`MatShape`],
//! [`VecShape`]) and [`operand`] so that every argument of a call is checked
//! before any of its buffers.

use qblas_core::{
    Buffer, CommandQueue, Context, DeviceCopy, Element, Error, Event, EventStatus, Operand, Order,
    Result,
};

/// How a routine uses a memory object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Read,
    Write,
    ReadWrite,
}

impl Access {
    fn reads(self) -> bool {
        !matches!(self, Access::Write)
    }

    fn writes(self) -> bool {
        !matches!(self, Access::Read)
    }
}

/// Reject zero sizes. `dims` pairs an argument name with its value.
pub(crate) fn dims(dims: &[(&'static str, usize)]) -> Result<()> {
    for &(arg, value) in dims {
        if value == 0 {
            return Err(Error::invalid_value(arg, "dimension must be non-zero"));
        }
    }
    Ok(())
}

/// A band width must stay below the dimension it spans.
pub(crate) fn band_width(arg: &'static str, width: usize, limit: usize) -> Result<()> {
    if width >= limit {
        return Err(Error::invalid_dim(
            arg,
            format!("band width {width} must be smaller than {limit}"),
        ));
    }
    Ok(())
}

/// Storage of one matrix operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MatShape {
    pub operand: Operand,
    pub order: Order,
    /// Stored rows.
    pub rows: usize,
    /// Stored columns.
    pub cols: usize,
    pub off: usize,
    pub ld: usize,
}

impl MatShape {
    /// A dense `rows x cols` matrix as stored (after any transpose).
    pub(crate) fn general(
        operand: Operand,
        order: Order,
        rows: usize,
        cols: usize,
        off: usize,
        ld: usize,
    ) -> Result<Self> {
        let min = order.leading_dim(rows, cols);
        if ld < min {
            return Err(Error::InvalidLeadDim { operand, ld, min });
        }
        Ok(Self {
            operand,
            order,
            rows,
            cols,
            off,
            ld,
        })
    }

    /// An `m x n` band matrix with `kl` sub- and `ku` super-diagonals.
    ///
    /// Column-major stores `kl + ku + 1` rows per column, row-major stores
    /// `kl + ku + 1` columns per row.
    pub(crate) fn band(
        operand: Operand,
        order: Order,
        m: usize,
        n: usize,
        kl: usize,
        ku: usize,
        off: usize,
        ld: usize,
    ) -> Result<Self> {
        let width = kl + ku + 1;
        if ld < width {
            return Err(Error::InvalidLeadDim {
                operand,
                ld,
                min: width,
            });
        }
        let (rows, cols) = match order {
            Order::ColumnMajor => (width, n),
            Order::RowMajor => (m, width),
        };
        Ok(Self {
            operand,
            order,
            rows,
            cols,
            off,
            ld,
        })
    }

    /// Elements spanned from the matrix origin.
    pub(crate) fn extent(&self) -> usize {
        if self.rows == 0 || self.cols == 0 {
            return 0;
        }
        let (outer, inner) = match self.order {
            Order::RowMajor => (self.rows, self.cols),
            Order::ColumnMajor => (self.cols, self.rows),
        };
        (outer - 1).saturating_mul(self.ld).saturating_add(inner)
    }

    pub(crate) fn end(&self) -> usize {
        self.off.saturating_add(self.extent())
    }
}

/// A strided vector operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VecShape {
    pub operand: Operand,
    pub n: usize,
    pub off: usize,
    pub inc: isize,
}

impl VecShape {
    pub(crate) fn new(operand: Operand, n: usize, off: usize, inc: isize) -> Result<Self> {
        if inc == 0 {
            return Err(Error::InvalidInc { operand });
        }
        Ok(Self {
            operand,
            n,
            off,
            inc,
        })
    }

    pub(crate) fn extent(&self) -> usize {
        if self.n == 0 {
            return 0;
        }
        (self.n - 1)
            .saturating_mul(self.inc.unsigned_abs())
            .saturating_add(1)
    }

    pub(crate) fn end(&self) -> usize {
        self.off.saturating_add(self.extent())
    }
}

/// Elements of a packed triangle of order `n`.
pub(crate) fn packed_len(n: usize) -> usize {
    n.saturating_mul(n.saturating_add(1)) / 2
}

/// Check a routine operand spanning `[.., end)` of `buf`.
///
/// The context check uses the first queue; a missing queue is reported
/// later with the other resource checks.
pub(crate) fn operand<T: DeviceCopy>(
    buf: &Buffer<T>,
    operand: Operand,
    end: usize,
    access: Access,
    queues: &[CommandQueue],
) -> Result<()> {
    let invalid = |reason| Error::InvalidOperand { operand, reason };
    if buf.is_released() {
        return Err(invalid("buffer has been released"));
    }
    if let Some(queue) = queues.first() {
        if buf.context_id() != queue.context().id() {
            return Err(invalid("buffer belongs to a different context"));
        }
    }
    if access.writes() && !buf.flags().writable() {
        return Err(invalid("buffer is read-only"));
    }
    if access.reads() && !buf.flags().readable() {
        return Err(invalid("buffer is write-only"));
    }
    if end > buf.len() {
        return Err(Error::InsufficientMem {
            operand,
            required: end,
            capacity: buf.len(),
        });
    }
    Ok(())
}

/// Check a scalar buffer holding `len` values at `off` (dot results, rotation
/// parameters). Failures are reported as `InvalidMemObject`.
pub(crate) fn scalar<T: DeviceCopy>(
    buf: &Buffer<T>,
    off: usize,
    len: usize,
    access: Access,
    queues: &[CommandQueue],
) -> Result<()> {
    let invalid = |reason: String| Err(Error::InvalidMemObject(reason));
    if buf.is_released() {
        return invalid(format!("scalar buffer {} has been released", buf.id()));
    }
    if let Some(queue) = queues.first() {
        if buf.context_id() != queue.context().id() {
            return invalid(format!("scalar buffer {} belongs to a different context", buf.id()));
        }
    }
    if access.writes() && !buf.flags().writable() {
        return invalid(format!("scalar buffer {} is read-only", buf.id()));
    }
    if access.reads() && !buf.flags().readable() {
        return invalid(format!("scalar buffer {} is write-only", buf.id()));
    }
    if off.saturating_add(len) > buf.len() {
        return invalid(format!(
            "{len} values at offset {off} do not fit a buffer of {}",
            buf.len()
        ));
    }
    Ok(())
}

/// Queues must exist, be live and share one context, which is returned.
pub(crate) fn queues(queues: &[CommandQueue]) -> Result<&Context> {
    let first = queues
        .first()
        .ok_or_else(|| Error::InvalidCommandQueue("no command queue given".into()))?;
    for queue in queues {
        if queue.is_released() {
            return Err(Error::InvalidCommandQueue(format!(
                "queue {} has been released",
                queue.id()
            )));
        }
        if queue.context() != first.context() {
            return Err(Error::InvalidContext(format!(
                "queue {} belongs to context {}, queue {} to context {}",
                first.id(),
                first.context().id(),
                queue.id(),
                queue.context().id()
            )));
        }
    }
    Ok(first.context())
}

/// Wait-list events must belong to `context` and must not have failed already.
pub(crate) fn wait_list(wait: &[Event], context: &Context) -> Result<()> {
    for event in wait {
        if event.context_id() != context.id() {
            return Err(Error::InvalidContext(format!(
                "event {} belongs to context {}",
                event.id(),
                event.context_id()
            )));
        }
        if let EventStatus::Failed(status) = event.status() {
            return Err(Error::InvalidEventWaitList(format!(
                "event {} failed with {status}",
                event.id()
            )));
        }
    }
    Ok(())
}

/// Double-precision elements need fp64 on every queue's device.
pub(crate) fn device_support<T: Element>(queues: &[CommandQueue]) -> Result<()> {
    if !T::requires_fp64() {
        return Ok(());
    }
    match queues.iter().find(|q| !q.device().supports_fp64()) {
        Some(queue) => Err(Error::invalid_device(
            queue.device().name(),
            format!("{} needs double precision support", T::DTYPE),
        )),
        None => Ok(()),
    }
}
