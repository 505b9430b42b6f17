//! Host kernels.
//!
//! Kernels work on plain slices whose index 0 is the operand origin (the
//! routine has already applied the buffer offset). Matrices are described by
//! [`Mat`] (order plus full, packed or band storage), vectors by [`Stride`].
//! Shared pieces for symmetric/hermitian and triangular operands live here so
//! that full, packed and band variants run the same arithmetic.

pub(crate) mod gemm;
pub(crate) mod level1;
pub(crate) mod level2;
pub(crate) mod level3;

use crate::validate::VecShape;
use qblas_core::{parallel, Diag, Element, Order, Transpose, Uplo};
use std::ops::Range;

// ============================================================================
// Vectors
// ============================================================================

/// Logical-to-storage mapping of a strided vector.
///
/// A negative increment walks the vector from its far end, as in reference BLAS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Stride {
    pub n: usize,
    pub inc: isize,
}

impl Stride {
    pub(crate) fn new(n: usize, inc: isize) -> Self {
        Self { n, inc }
    }

    pub(crate) fn of(shape: &VecShape) -> Self {
        Self::new(shape.n, shape.inc)
    }

    #[inline(always)]
    pub(crate) fn at(&self, i: usize) -> usize {
        if self.inc > 0 {
            i * self.inc as usize
        } else {
            (self.n - 1 - i) * self.inc.unsigned_abs()
        }
    }

    /// Copy the logical elements into a contiguous buffer.
    pub(crate) fn gather<T: Copy>(&self, x: &[T]) -> Vec<T> {
        (0..self.n).map(|i| x[self.at(i)]).collect()
    }

    pub(crate) fn scatter<T: Copy>(&self, src: &[T], dst: &mut [T]) {
        for (i, &v) in src.iter().enumerate().take(self.n) {
            dst[self.at(i)] = v;
        }
    }
}

// ============================================================================
// Matrix storage
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Storage {
    Full { ld: usize },
    /// One triangle of an `n x n` matrix, packed without gaps.
    Packed { n: usize, uplo: Uplo },
    /// `kl` sub- and `ku` super-diagonals.
    Band { kl: usize, ku: usize, ld: usize },
}

/// Where element (i, j) of a matrix lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Mat {
    pub order: Order,
    pub storage: Storage,
}

impl Mat {
    pub(crate) fn full(order: Order, ld: usize) -> Self {
        Self {
            order,
            storage: Storage::Full { ld },
        }
    }

    pub(crate) fn packed(order: Order, n: usize, uplo: Uplo) -> Self {
        Self {
            order,
            storage: Storage::Packed { n, uplo },
        }
    }

    pub(crate) fn band(order: Order, kl: usize, ku: usize, ld: usize) -> Self {
        Self {
            order,
            storage: Storage::Band { kl, ku, ld },
        }
    }

    /// Band storage for one triangle of a symmetric or triangular band matrix.
    pub(crate) fn tri_band(order: Order, uplo: Uplo, k: usize, ld: usize) -> Self {
        match uplo {
            Uplo::Upper => Self::band(order, 0, k, ld),
            Uplo::Lower => Self::band(order, k, 0, ld),
        }
    }

    /// Storage index of (i, j). Packed and band storage only hold their
    /// triangle or band; callers stay inside it.
    #[inline(always)]
    pub(crate) fn index(&self, i: usize, j: usize) -> usize {
        match self.storage {
            Storage::Full { ld } => self.order.index(i, j, ld),
            Storage::Packed { n, uplo } => {
                // Row-major packing of one triangle is column-major packing of the other.
                let (r, c, tri) = match self.order {
                    Order::ColumnMajor => (i, j, uplo),
                    Order::RowMajor => (j, i, uplo.flip()),
                };
                match tri {
                    Uplo::Upper => r + c * (c + 1) / 2,
                    Uplo::Lower => r + (2 * n - c - 1) * c / 2,
                }
            }
            Storage::Band { kl, ku, ld } => match self.order {
                Order::ColumnMajor => ku + i - j + j * ld,
                Order::RowMajor => kl + j - i + i * ld,
            },
        }
    }
}

/// Element (i, j) of `op(A)` for a dense `A`.
#[inline(always)]
pub(crate) fn op_at<T: Element>(a: &[T], mat: &Mat, trans: Transpose, i: usize, j: usize) -> T {
    match trans {
        Transpose::NoTrans => a[mat.index(i, j)],
        Transpose::Trans => a[mat.index(j, i)],
        Transpose::ConjTrans => a[mat.index(j, i)].conj(),
    }
}

// ============================================================================
// Symmetric / hermitian operands
// ============================================================================

/// A symmetric or hermitian matrix given by one stored triangle.
#[derive(Clone, Copy)]
pub(crate) struct Sym<'a, T> {
    pub a: &'a [T],
    pub mat: Mat,
    pub uplo: Uplo,
    pub herm: bool,
    /// Bandwidth for band storage.
    pub k: Option<usize>,
}

impl<T: Element> Sym<'_, T> {
    #[inline]
    pub(crate) fn at(&self, i: usize, j: usize) -> T {
        if let Some(k) = self.k {
            if i.abs_diff(j) > k {
                return T::zero();
            }
        }
        if i == j {
            let d = self.a[self.mat.index(i, i)];
            return if self.herm { T::from_real(d.re()) } else { d };
        }
        if self.uplo.contains(i, j) {
            self.a[self.mat.index(i, j)]
        } else {
            let v = self.a[self.mat.index(j, i)];
            if self.herm {
                v.conj()
            } else {
                v
            }
        }
    }

    /// Dense copy of the full `n x n` matrix in `order` with `ld = n`.
    pub(crate) fn expand(&self, order: Order, n: usize) -> Vec<T> {
        let mut out = vec![T::zero(); n * n];
        for j in 0..n {
            for i in 0..n {
                out[order.index(i, j, n)] = self.at(i, j);
            }
        }
        out
    }
}

// ============================================================================
// Triangular operands
// ============================================================================

/// `op(A)` for a triangular `A`, optionally banded, optionally viewed transposed.
#[derive(Clone, Copy)]
pub(crate) struct Tri<'a, T> {
    pub a: &'a [T],
    pub mat: Mat,
    pub uplo: Uplo,
    pub trans: Transpose,
    pub diag: Diag,
    pub k: Option<usize>,
    /// View `op(A)^T` instead of `op(A)`.
    pub flip: bool,
}

impl<'a, T: Element> Tri<'a, T> {
    pub(crate) fn new(a: &'a [T], mat: Mat, uplo: Uplo, trans: Transpose, diag: Diag) -> Self {
        Self {
            a,
            mat,
            uplo,
            trans,
            diag,
            k: None,
            flip: false,
        }
    }

    pub(crate) fn banded(self, k: usize) -> Self {
        Self { k: Some(k), ..self }
    }

    pub(crate) fn transposed(self) -> Self {
        Self {
            flip: !self.flip,
            ..self
        }
    }

    /// Triangle holding the non-zeros of the viewed matrix.
    pub(crate) fn shape(&self) -> Uplo {
        let u = self.uplo.under(self.trans);
        if self.flip {
            u.flip()
        } else {
            u
        }
    }

    /// Column range of the non-zeros in row `i` of an `n x n` view.
    #[inline]
    pub(crate) fn row_span(&self, i: usize, n: usize) -> Range<usize> {
        let k = self.k.unwrap_or(n);
        match self.shape() {
            Uplo::Upper => i..n.min(i.saturating_add(k) + 1),
            Uplo::Lower => i.saturating_sub(k)..i + 1,
        }
    }

    /// Element (i, j) of the view; (i, j) must lie in [`Tri::row_span`].
    #[inline(always)]
    pub(crate) fn at(&self, i: usize, j: usize) -> T {
        if i == j && self.diag.is_unit() {
            return T::one();
        }
        let (i, j) = if self.flip { (j, i) } else { (i, j) };
        op_at(self.a, &self.mat, self.trans, i, j)
    }

    /// `x := view * x` for a contiguous vector of length `n`.
    pub(crate) fn mul_vec(&self, n: usize, x: &mut [T]) {
        let src = x[..n].to_vec();
        for (i, xi) in x.iter_mut().enumerate().take(n) {
            let mut sum = T::zero();
            for j in self.row_span(i, n) {
                sum += self.at(i, j) * src[j];
            }
            *xi = sum;
        }
    }

    /// Solve `view * y = x` in place for a contiguous vector of length `n`.
    pub(crate) fn solve_vec(&self, n: usize, x: &mut [T]) {
        let mut step = |i: usize| {
            let mut sum = x[i];
            for j in self.row_span(i, n) {
                if j != i {
                    sum -= self.at(i, j) * x[j];
                }
            }
            x[i] = if self.diag.is_unit() {
                sum
            } else {
                sum / self.at(i, i)
            };
        };
        match self.shape() {
            Uplo::Lower => (0..n).for_each(&mut step),
            Uplo::Upper => (0..n).rev().for_each(&mut step),
        }
    }
}

// ============================================================================
// Parallel helpers
// ============================================================================

/// Compute `lines` independent output lines of length `len` in parallel.
///
/// `f(line, out)` fills one line. Lines come back concatenated in order.
/// Runs on one thread while `lines * len` is below `threshold`.
pub(crate) fn par_lines<T, F>(lines: Range<usize>, len: usize, threshold: usize, f: F) -> Vec<T>
where
    T: Element,
    F: Fn(usize, &mut [T]) + Sync,
{
    let count = lines.len();
    let min_chunk = if count.saturating_mul(len) >= threshold {
        1
    } else {
        count.max(1)
    };
    parallel::parallel_map_chunks(lines.start, lines.end, min_chunk, |s, e| {
        let mut out = vec![T::zero(); (e - s) * len];
        for (line, buf) in (s..e).zip(out.chunks_mut(len.max(1))) {
            f(line, buf);
        }
        out
    })
    .concat()
}
