//! Host <-> buffer transfers and fills for sub-matrices and strided vectors.
//!
//! These are enqueued like routines: same validation, same wait-list and
//! event semantics. Each runs on the first queue; extra queues get a marker.

use crate::dispatch::{self, Routine, Variant};
use crate::level1::store;
use crate::state;
use crate::validate::{self, Access, MatShape, VecShape};
use parking_lot::Mutex;
use qblas_core::{Buffer, CommandQueue, Element, Error, Event, Operand, Order, Result};
use std::sync::Arc;

/// Copy `rows x cols` elements of `src` (leading dimension `ld_src`) into a
/// sub-matrix of `dst`.
///
/// The host data is captured when the call is made, so `src` may be reused
/// as soon as this returns.
pub fn write_matrix<T: Element>(
    order: Order,
    rows: usize,
    cols: usize,
    src: &[T],
    ld_src: usize,
    dst: &Buffer<T>,
    off: usize,
    ld: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::dims(&[("rows", rows), ("cols", cols)])?;
    let host = MatShape::general(Operand::A, order, rows, cols, 0, ld_src)?;
    let shape = MatShape::general(Operand::B, order, rows, cols, off, ld)?;
    if src.len() < host.extent() {
        return Err(Error::invalid_value(
            "src",
            format!("holds {} elements, {} required", src.len(), host.extent()),
        ));
    }
    validate::operand(dst, Operand::B, shape.end(), Access::Write, queues)?;
    let plan = dispatch::plan::<T>(&lib, Routine::WriteMatrix, Variant::Reference, queues, wait)?;

    let src = src[..host.extent()].to_vec();
    let dst = dst.clone();
    plan.single(move |_kernel| {
        let mut data = dst.map_write();
        for j in 0..cols {
            for i in 0..rows {
                data[off + order.index(i, j, ld)] = src[order.index(i, j, ld_src)];
            }
        }
        Ok(())
    })
}

/// Result of [`read_matrix`], available once its events complete.
#[derive(Debug)]
pub struct Pending<T> {
    events: Vec<Event>,
    data: Arc<Mutex<Option<Vec<T>>>>,
}

impl<T> Pending<T> {
    /// Events of the read, one per queue.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Block until the read finishes and take the data.
    pub fn wait(self) -> Result<Vec<T>> {
        Event::wait_all(&self.events)?;
        self.data
            .lock()
            .take()
            .ok_or_else(|| Error::InvalidOperation("read finished without data".into()))
    }
}

/// Read a `rows x cols` sub-matrix of `src` into a dense host matrix in
/// `order` with the minimal leading dimension.
pub fn read_matrix<T: Element>(
    order: Order,
    rows: usize,
    cols: usize,
    src: &Buffer<T>,
    off: usize,
    ld: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Pending<T>> {
    let lib = state::library()?;
    validate::dims(&[("rows", rows), ("cols", cols)])?;
    let shape = MatShape::general(Operand::A, order, rows, cols, off, ld)?;
    validate::operand(src, Operand::A, shape.end(), Access::Read, queues)?;
    let plan = dispatch::plan::<T>(&lib, Routine::ReadMatrix, Variant::Reference, queues, wait)?;

    let slot = Arc::new(Mutex::new(None));
    let (src, out) = (src.clone(), Arc::clone(&slot));
    let events = plan.single(move |_kernel| {
        let stored = src.read_range(shape.off, shape.extent())?;
        let ld_out = order.leading_dim(rows, cols);
        let mut dense = vec![T::zero(); rows * cols];
        for j in 0..cols {
            for i in 0..rows {
                dense[order.index(i, j, ld_out)] = stored[order.index(i, j, ld)];
            }
        }
        *out.lock() = Some(dense);
        Ok(())
    })?;
    Ok(Pending { events, data: slot })
}

/// Set every element of a `rows x cols` sub-matrix of `buf` to `value`.
pub fn fill_matrix<T: Element>(
    order: Order,
    rows: usize,
    cols: usize,
    value: T,
    buf: &Buffer<T>,
    off: usize,
    ld: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::dims(&[("rows", rows), ("cols", cols)])?;
    let shape = MatShape::general(Operand::A, order, rows, cols, off, ld)?;
    validate::operand(buf, Operand::A, shape.end(), Access::Write, queues)?;
    let plan = dispatch::plan::<T>(&lib, Routine::Fill, Variant::Reference, queues, wait)?;

    let buf = buf.clone();
    plan.single(move |_kernel| {
        let mut data = buf.map_write();
        for j in 0..cols {
            for i in 0..rows {
                data[off + order.index(i, j, ld)] = value;
            }
        }
        Ok(())
    })
}

/// Set `n` elements of a strided vector to `value`.
pub fn fill_vector<T: Element>(
    n: usize,
    value: T,
    buf: &Buffer<T>,
    off: usize,
    inc: isize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::dims(&[("N", n)])?;
    let shape = VecShape::new(Operand::X, n, off, inc)?;
    validate::operand(buf, Operand::X, shape.end(), Access::Write, queues)?;
    let plan = dispatch::plan::<T>(&lib, Routine::Fill, Variant::Reference, queues, wait)?;

    let buf = buf.clone();
    plan.single(move |_kernel| {
        store(&buf, &shape, &vec![value; n]);
        Ok(())
    })
}
