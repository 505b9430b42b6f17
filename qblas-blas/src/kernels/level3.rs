//! Level 3 kernels other than plain GEMM.
//!
//! `symm`/`hemm` expand the special operand and reuse [`Gemm`]. Rank-k
//! updates and triangular products/solves compute whole output lines in
//! parallel with [`par_lines`] and write back only what the routine owns.

use super::gemm::Gemm;
use super::{op_at, par_lines, Mat, Tri};
use qblas_core::{Element, Order, Side, Transpose, Uplo};
use std::ops::Range;

/// GEMM computing `C := alpha * A * B + beta * C` (Left) or
/// `C := alpha * B * A + beta * C` (Right) where `dense` is the expanded
/// symmetric/hermitian `A` with `ld` equal to its order.
#[allow(clippy::too_many_arguments)]
pub(crate) fn symm_gemm<'a, T: Element>(
    order: Order,
    side: Side,
    m: usize,
    n: usize,
    alpha: T,
    dense: &'a [T],
    b: &'a [T],
    ldb: usize,
    beta: T,
    ldc: usize,
) -> Gemm<'a, T> {
    let (k, a, lda, b, ldb) = match side {
        Side::Left => (m, dense, m.max(1), b, ldb),
        Side::Right => (n, b, ldb, dense, n.max(1)),
    };
    Gemm {
        order,
        trans_a: Transpose::NoTrans,
        trans_b: Transpose::NoTrans,
        m,
        n,
        k,
        alpha,
        a,
        lda,
        b,
        ldb,
        beta,
        ldc,
    }
}

/// Rank-k and rank-2k updates of one triangle of an `n x n` C.
///
/// With `b` unset: `C := alpha * op(A) * op(A)^T + beta * C` (`^H` when
/// `herm`). With `b` set: `C := alpha * op(A) * op(B)^T + alpha' * op(B) * op(A)^T + beta * C`
/// where `alpha'` is `conj(alpha)` for the hermitian form.
#[derive(Clone, Copy)]
pub(crate) struct RankK<'a, T> {
    pub order: Order,
    pub uplo: Uplo,
    /// `NoTrans`, or the transpose flavour to apply to A (and B).
    pub trans: Transpose,
    pub n: usize,
    pub k: usize,
    pub alpha: T,
    pub a: &'a [T],
    pub lda: usize,
    pub b: Option<(&'a [T], usize)>,
    pub beta: T,
    pub herm: bool,
    pub ldc: usize,
}

impl<T: Element> RankK<'_, T> {
    fn rows(&self, j: usize) -> Range<usize> {
        match self.uplo {
            Uplo::Upper => 0..j + 1,
            Uplo::Lower => j..self.n,
        }
    }

    #[inline]
    fn cj(&self, v: T) -> T {
        if self.herm {
            v.conj()
        } else {
            v
        }
    }

    fn product(&self, x: &[T], ldx: usize, y: &[T], ldy: usize, i: usize, j: usize) -> T {
        let (xm, ym) = (Mat::full(self.order, ldx), Mat::full(self.order, ldy));
        let mut sum = T::zero();
        for p in 0..self.k {
            sum += op_at(x, &xm, self.trans, i, p) * self.cj(op_at(y, &ym, self.trans, j, p));
        }
        sum
    }

    /// Update columns `cols` of C's stored triangle.
    pub(crate) fn columns(&self, cols: Range<usize>, threshold: usize, c: &mut [T]) {
        let n = self.n;
        let start = cols.start;
        let fresh = {
            let cur: &[T] = c;
            par_lines(cols.clone(), n, threshold, |j, out| {
                for i in self.rows(j) {
                    let mut v = match self.b {
                        None => self.alpha * self.product(self.a, self.lda, self.a, self.lda, i, j),
                        Some((b, ldb)) => {
                            self.alpha * self.product(self.a, self.lda, b, ldb, i, j)
                                + self.cj(self.alpha) * self.product(b, ldb, self.a, self.lda, i, j)
                        }
                    };
                    if self.beta != T::zero() {
                        v += self.beta * cur[self.order.index(i, j, self.ldc)];
                    }
                    if self.herm && i == j {
                        v = T::from_real(v.re());
                    }
                    out[i] = v;
                }
            })
        };
        for j in cols {
            let line = &fresh[(j - start) * n..(j - start + 1) * n];
            for i in self.rows(j) {
                c[self.order.index(i, j, self.ldc)] = line[i];
            }
        }
    }
}

/// Triangular matrix product or solve against an `m x n` B, in place.
///
/// Left: `B := alpha * op(A) * B` or `op(A) * X = alpha * B`, one B column
/// per line. Right: `B := alpha * B * op(A)` or `X * op(A) = alpha * B`,
/// one B row per line through the transposed view of `op(A)`.
#[derive(Clone, Copy)]
pub(crate) struct TriMat<'a, T> {
    pub side: Side,
    pub tri: Tri<'a, T>,
    pub order: Order,
    pub m: usize,
    pub n: usize,
    pub alpha: T,
    pub ldb: usize,
    pub solve: bool,
}

impl<T: Element> TriMat<'_, T> {
    fn at(&self, line: usize, pos: usize) -> usize {
        match self.side {
            Side::Left => self.order.index(pos, line, self.ldb),
            Side::Right => self.order.index(line, pos, self.ldb),
        }
    }

    /// Process `lines` of B.
    pub(crate) fn lines(&self, lines: Range<usize>, threshold: usize, b: &mut [T]) {
        let (len, view) = match self.side {
            Side::Left => (self.m, self.tri),
            Side::Right => (self.n, self.tri.transposed()),
        };
        let start = lines.start;
        let fresh = {
            let cur: &[T] = b;
            par_lines(lines.clone(), len, threshold, |line, out| {
                if self.alpha == T::zero() {
                    out.fill(T::zero());
                    return;
                }
                for (pos, v) in out.iter_mut().enumerate() {
                    *v = self.alpha * cur[self.at(line, pos)];
                }
                if self.solve {
                    view.solve_vec(len, out);
                } else {
                    view.mul_vec(len, out);
                }
            })
        };
        for line in lines {
            let src = &fresh[(line - start) * len..(line - start + 1) * len];
            for (pos, &v) in src.iter().enumerate() {
                b[self.at(line, pos)] = v;
            }
        }
    }
}
