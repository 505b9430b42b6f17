//! Scoped data-parallel helpers used by the host kernels.
//!
//! Work is split into contiguous chunks over `std::thread::scope`, so closures
//! may borrow from the caller's stack. The thread count is capped by
//! [`set_max_threads`] (driven by configuration) and by a minimum chunk size,
//! so small problems run inline without spawning.

use std::sync::atomic::{AtomicUsize, Ordering};

static MAX_THREADS: AtomicUsize = AtomicUsize::new(0);

/// Cap the number of worker threads per parallel region. `0` means one per core.
pub fn set_max_threads(threads: usize) {
    MAX_THREADS.store(threads, Ordering::Relaxed);
}

/// Effective thread budget for a parallel region.
pub fn max_threads() -> usize {
    match MAX_THREADS.load(Ordering::Relaxed) {
        0 => crate::device::detect().num_cores.max(1),
        n => n,
    }
}

fn chunk_plan(start: usize, end: usize, min_chunk: usize) -> (usize, usize) {
    let total = end - start;
    let by_size = total.div_ceil(min_chunk.max(1));
    let threads = max_threads().min(by_size).max(1);
    (threads, total.div_ceil(threads))
}

/// Execute `f` over chunks of `[start, end)` in parallel.
///
/// Each chunk holds at least `min_chunk` items (except possibly the last).
/// `f` receives `(chunk_start, chunk_end)`.
#[inline]
pub fn parallel_for_chunks<F>(start: usize, end: usize, min_chunk: usize, f: F)
where
    F: Fn(usize, usize) + Sync,
{
    if start >= end {
        return;
    }
    let (threads, chunk_size) = chunk_plan(start, end, min_chunk);
    if threads <= 1 {
        f(start, end);
        return;
    }

    let f = &f;
    std::thread::scope(|s| {
        for chunk_start in (start..end).step_by(chunk_size) {
            let chunk_end = (chunk_start + chunk_size).min(end);
            s.spawn(move || f(chunk_start, chunk_end));
        }
    });
}

/// Execute `f` over chunks in parallel, collecting one result per chunk in order.
#[inline]
pub fn parallel_map_chunks<F, R>(start: usize, end: usize, min_chunk: usize, f: F) -> Vec<R>
where
    F: Fn(usize, usize) -> R + Sync,
    R: Send,
{
    if start >= end {
        return Vec::new();
    }
    let (threads, chunk_size) = chunk_plan(start, end, min_chunk);
    if threads <= 1 {
        return vec![f(start, end)];
    }

    let f = &f;
    std::thread::scope(|s| {
        let handles: Vec<_> = (start..end)
            .step_by(chunk_size)
            .map(|chunk_start| {
                let chunk_end = (chunk_start + chunk_size).min(end);
                s.spawn(move || f(chunk_start, chunk_end))
            })
            .collect();

        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(r) => r,
                Err(payload) => std::panic::resume_unwind(payload),
            })
            .collect()
    })
}

/// Split `total` items into at most `parts` contiguous, non-empty ranges of near-equal size.
pub fn split_even(total: usize, parts: usize) -> Vec<std::ops::Range<usize>> {
    let parts = parts.max(1).min(total);
    if parts == 0 {
        return Vec::new();
    }
    let base = total / parts;
    let extra = total % parts;
    let mut ranges = Vec::with_capacity(parts);
    let mut at = 0;
    for p in 0..parts {
        let len = base + usize::from(p < extra);
        ranges.push(at..at + len);
        at += len;
    }
    ranges
}
