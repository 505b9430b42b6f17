//! Level 2 kernels: matrix-vector products, triangular solves and rank updates.
//!
//! Input vectors arrive gathered into contiguous slices; output vectors are
//! updated in place through their [`Stride`].

use super::{Mat, Stride, Sym, Tri};
use qblas_core::{Element, Transpose, Uplo};
use std::ops::Range;

/// `y := alpha * op(A) * x + beta * y` for a general or general-band `A`.
#[derive(Clone, Copy)]
pub(crate) struct Gemv<'a, T> {
    pub mat: Mat,
    pub trans: Transpose,
    /// Stored rows of A.
    pub m: usize,
    /// Stored columns of A.
    pub n: usize,
    /// `(kl, ku)` for band storage.
    pub band: Option<(usize, usize)>,
    pub alpha: T,
    pub a: &'a [T],
    pub beta: T,
}

impl<T: Element> Gemv<'_, T> {
    /// Non-zero span of row `r` of `op(A)`.
    fn span(&self, r: usize) -> Range<usize> {
        let (len, below, above) = match (self.trans.is_transposed(), self.band) {
            (false, None) => return 0..self.n,
            (true, None) => return 0..self.m,
            (false, Some((kl, ku))) => (self.n, kl, ku),
            (true, Some((kl, ku))) => (self.m, ku, kl),
        };
        r.saturating_sub(below)..len.min(r.saturating_add(above) + 1)
    }

    /// Update rows `rows` of `y`. `x` holds `op(A)`'s column count of elements.
    pub(crate) fn rows(&self, rows: Range<usize>, x: &[T], y: &mut [T], sy: Stride) {
        for r in rows {
            let yi = sy.at(r);
            let base = if self.beta == T::zero() {
                T::zero()
            } else {
                self.beta * y[yi]
            };
            if self.alpha == T::zero() {
                y[yi] = base;
                continue;
            }
            let mut sum = T::zero();
            for c in self.span(r) {
                let av = match self.trans {
                    Transpose::NoTrans => self.a[self.mat.index(r, c)],
                    Transpose::Trans => self.a[self.mat.index(c, r)],
                    Transpose::ConjTrans => self.a[self.mat.index(c, r)].conj(),
                };
                sum += av * x[c];
            }
            y[yi] = base + self.alpha * sum;
        }
    }
}

/// `y := alpha * A * x + beta * y` for a symmetric or hermitian `A` of order `n`.
pub(crate) fn symv<T: Element>(
    sym: &Sym<'_, T>,
    n: usize,
    alpha: T,
    x: &[T],
    beta: T,
    y: &mut [T],
    sy: Stride,
) {
    let k = sym.k.unwrap_or(n);
    for i in 0..n {
        let yi = sy.at(i);
        let base = if beta == T::zero() {
            T::zero()
        } else {
            beta * y[yi]
        };
        let mut sum = T::zero();
        for j in i.saturating_sub(k)..n.min(i.saturating_add(k) + 1) {
            sum += sym.at(i, j) * x[j];
        }
        y[yi] = base + alpha * sum;
    }
}

/// `x := op(A) * x` for a triangular `A`.
pub(crate) fn trmv<T: Element>(tri: &Tri<'_, T>, n: usize, x: &mut [T], sx: Stride) {
    let mut v = sx.gather(x);
    tri.mul_vec(n, &mut v);
    sx.scatter(&v, x);
}

/// Solve `op(A) * x = b` in place for a triangular `A`.
pub(crate) fn trsv<T: Element>(tri: &Tri<'_, T>, n: usize, x: &mut [T], sx: Stride) {
    let mut v = sx.gather(x);
    tri.solve_vec(n, &mut v);
    sx.scatter(&v, x);
}

/// `A := alpha * x * y^T + A`, or `x * y^H` when `conj` is set.
#[allow(clippy::too_many_arguments)]
pub(crate) fn ger<T: Element>(
    mat: &Mat,
    m: usize,
    n: usize,
    alpha: T,
    x: &[T],
    y: &[T],
    conj: bool,
    a: &mut [T],
) {
    if alpha == T::zero() {
        return;
    }
    for (j, &yj) in y.iter().enumerate().take(n) {
        let t = alpha * if conj { yj.conj() } else { yj };
        for (i, &xi) in x.iter().enumerate().take(m) {
            a[mat.index(i, j)] += xi * t;
        }
    }
}

/// Symmetric or hermitian rank-1 update of the stored triangle:
/// `A := alpha * x * x^T + A` or `A := alpha * x * x^H + A`.
///
/// For the hermitian form `alpha` is real and the diagonal comes out real.
pub(crate) fn syr<T: Element>(
    mat: &Mat,
    uplo: Uplo,
    n: usize,
    alpha: T,
    x: &[T],
    herm: bool,
    a: &mut [T],
) {
    let cj = |v: T| if herm { v.conj() } else { v };
    for j in 0..n {
        let t = alpha * cj(x[j]);
        for i in 0..n {
            if !uplo.contains(i, j) {
                continue;
            }
            let idx = mat.index(i, j);
            a[idx] += x[i] * t;
            if herm && i == j {
                a[idx] = T::from_real(a[idx].re());
            }
        }
    }
}

/// Symmetric or hermitian rank-2 update of the stored triangle:
/// `A := alpha * x * y^T + alpha * y * x^T + A` or
/// `A := alpha * x * y^H + conj(alpha) * y * x^H + A`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn syr2<T: Element>(
    mat: &Mat,
    uplo: Uplo,
    n: usize,
    alpha: T,
    x: &[T],
    y: &[T],
    herm: bool,
    a: &mut [T],
) {
    let cj = |v: T| if herm { v.conj() } else { v };
    let alpha2 = cj(alpha);
    for j in 0..n {
        let t1 = alpha * cj(y[j]);
        let t2 = alpha2 * cj(x[j]);
        for i in 0..n {
            if !uplo.contains(i, j) {
                continue;
            }
            let idx = mat.index(i, j);
            a[idx] += x[i] * t1 + y[i] * t2;
            if herm && i == j {
                a[idx] = T::from_real(a[idx].re());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
    use qblas_core::{Diag, Order};

    fn naive_gemv(order: Order, trans: Transpose, m: usize, n: usize, a: &[f64], x: &[f64]) -> Vec<f64> {
        let mat = Mat::full(order, order.leading_dim(m, n));
        let (rows, cols) = if trans.is_transposed() { (n, m) } else { (m, n) };
        (0..rows)
            .map(|r| {
                (0..cols)
                    .map(|c| super::super::op_at(a, &mat, trans, r, c) * x[c])
                    .sum()
            })
            .collect()
    }

    #[test]
    fn test_gemv_matches_naive() {
        let (m, n) = (5, 3);
        let a: Vec<f64> = (0..m * n).map(|v| v as f64 - 4.0).collect();
        for order in [Order::RowMajor, Order::ColumnMajor] {
            for trans in [Transpose::NoTrans, Transpose::Trans] {
                let g = Gemv {
                    mat: Mat::full(order, order.leading_dim(m, n)),
                    trans,
                    m,
                    n,
                    band: None,
                    alpha: 2.0,
                    a: &a,
                    beta: 0.0,
                };
                let x: Vec<f64> = (0..if trans.is_transposed() { m } else { n })
                    .map(|v| v as f64 + 1.0)
                    .collect();
                let len = if trans.is_transposed() { n } else { m };
                let mut y = vec![f64::NAN; len];
                // two halves compose to the full product
                g.rows(0..len / 2, &x, &mut y, Stride::new(len, 1));
                g.rows(len / 2..len, &x, &mut y, Stride::new(len, 1));
                let expect: Vec<f64> = naive_gemv(order, trans, m, n, &a, &x)
                    .into_iter()
                    .map(|v| 2.0 * v)
                    .collect();
                assert_eq!(y, expect, "{order:?} {trans:?}");
            }
        }
    }

    #[test]
    fn test_gbmv_matches_dense() {
        // 4x5 with kl = 1, ku = 2, column-major band storage with ld = 4
        let (m, n, kl, ku) = (4, 5, 1, 2);
        let ld = kl + ku + 1;
        let mut band = vec![0.0f64; ld * n];
        let mut dense = vec![0.0f64; m * n];
        let bmat = Mat::band(Order::ColumnMajor, kl, ku, ld);
        for j in 0..n {
            for i in 0..m {
                if i <= j + kl && j <= i + ku {
                    let v = (i * 10 + j) as f64;
                    band[bmat.index(i, j)] = v;
                    dense[Order::ColumnMajor.index(i, j, m)] = v;
                }
            }
        }
        for trans in [Transpose::NoTrans, Transpose::Trans] {
            let g = Gemv {
                mat: bmat,
                trans,
                m,
                n,
                band: Some((kl, ku)),
                alpha: 1.0,
                a: &band,
                beta: 1.0,
            };
            let x: Vec<f64> = (0..if trans.is_transposed() { m } else { n })
                .map(|v| v as f64)
                .collect();
            let len = if trans.is_transposed() { n } else { m };
            let mut y = vec![1.0; len];
            g.rows(0..len, &x, &mut y, Stride::new(len, 1));
            let expect: Vec<f64> = naive_gemv(Order::ColumnMajor, trans, m, n, &dense, &x)
                .into_iter()
                .map(|v| v + 1.0)
                .collect();
            assert_eq!(y, expect, "{trans:?}");
        }
    }

    #[test]
    fn test_hemv_uses_conjugate_mirror() {
        // upper triangle of [[2, 1+i], [1-i, 3]], row-major
        let a = [
            Complex64::new(2.0, 0.0),
            Complex64::new(1.0, 1.0),
            Complex64::new(99.0, 99.0),
            Complex64::new(3.0, 0.0),
        ];
        let sym = Sym {
            a: &a,
            mat: Mat::full(Order::RowMajor, 2),
            uplo: Uplo::Upper,
            herm: true,
            k: None,
        };
        let x = [Complex64::new(1.0, 0.0), Complex64::new(0.0, 1.0)];
        let mut y = [Complex64::new(0.0, 0.0); 2];
        symv(&sym, 2, Complex64::new(1.0, 0.0), &x, Complex64::new(0.0, 0.0), &mut y, Stride::new(2, 1));
        // row 0: 2 + (1+i)i = 1 + i ; row 1: (1-i) + 3i = 1 + 2i
        assert_eq!(y, [Complex64::new(1.0, 1.0), Complex64::new(1.0, 2.0)]);
    }

    #[test]
    fn test_tpsv_negative_increment() {
        // lower packed column-major [[2,0],[1,4]]: (0,0) (1,0) (1,1)
        let a = [2.0f64, 1.0, 4.0];
        let tri = Tri::new(
            &a,
            Mat::packed(Order::ColumnMajor, 2, Uplo::Lower),
            Uplo::Lower,
            Transpose::NoTrans,
            Diag::NonUnit,
        );
        // logical b = [2, 9] stored backwards
        let mut x = [9.0, 2.0];
        trsv(&tri, 2, &mut x, Stride::new(2, -1));
        assert_eq!(x, [2.0, 1.0]);
        trmv(&tri, 2, &mut x, Stride::new(2, -1));
        assert_eq!(x, [9.0, 2.0]);
    }

    #[test]
    fn test_her_keeps_diagonal_real_and_triangle_only() {
        let mat = Mat::full(Order::ColumnMajor, 2);
        let mut a = [Complex64::new(1.0, 0.5); 4];
        let x = [Complex64::new(1.0, 1.0), Complex64::new(0.0, 2.0)];
        syr(&mat, Uplo::Lower, 2, Complex64::new(1.0, 0.0), &x, true, &mut a);
        assert_eq!(a[0], Complex64::new(3.0, 0.0));
        // (1,0): x1 * conj(x0) = 2i * (1 - i) = 2 + 2i
        assert_eq!(a[1], Complex64::new(3.0, 2.5));
        // upper element untouched
        assert_eq!(a[2], Complex64::new(1.0, 0.5));
        assert_eq!(a[3], Complex64::new(5.0, 0.0));
    }

    #[test]
    fn test_syr2_and_ger() {
        let mat = Mat::full(Order::RowMajor, 2);
        let mut a = [0.0f64; 4];
        syr2(&mat, Uplo::Upper, 2, 1.0, &[1.0, 2.0], &[3.0, 4.0], false, &mut a);
        // x y^T + y x^T = [[6, 10], [10, 16]]; lower (1,0) untouched
        assert_eq!(a, [6.0, 10.0, 0.0, 16.0]);

        let mut g = [0.0f64; 6];
        ger(&Mat::full(Order::ColumnMajor, 2), 2, 3, 1.0, &[1.0, 2.0], &[1.0, 10.0, 100.0], false, &mut g);
        assert_eq!(g, [1.0, 2.0, 10.0, 20.0, 100.0, 200.0]);
    }
}
