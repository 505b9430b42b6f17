//! General matrix multiply: C := alpha * op(A) * op(B) + beta * C
//!
//! Uses the Goto BLAS algorithm: pack panels of A and B into contiguous
//! cache-friendly buffers, then run an MR x NR micro-kernel over the tiles.
//! Tile sizes come from the kernel's [`TileParams`]. The packed B panel can
//! live on the heap or in a scratch image.
//!
//! Each call computes a column range of C, so a GEMM split across queues
//! performs exactly the same arithmetic per element as an unsplit one.

use crate::dispatch::{TileParams, MAX_MR, MAX_NR};
use crate::kernels::{op_at, Mat};
use qblas_core::{parallel, Element, Image, Order, Result, Transpose};
use std::ops::Range;

/// Below this many multiply-adds the packing overhead isn't worth it.
const SMALL_GEMM_FLOPS: usize = 48 * 48 * 48;

/// Wrapper to send a raw mutable pointer across thread boundaries.
/// Safety: The caller must ensure non-overlapping access between threads.
#[derive(Clone, Copy)]
struct SendMutPtr<T> {
    ptr: *mut T,
    len: usize,
}
unsafe impl<T> Send for SendMutPtr<T> {}
unsafe impl<T> Sync for SendMutPtr<T> {}

impl<T> SendMutPtr<T> {
    fn new(slice: &mut [T]) -> Self {
        Self {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
        }
    }

    /// Get a mutable slice. Safety: caller ensures no aliasing.
    #[allow(clippy::mut_from_ref)] // raw pointer interior mutability for parallel tiling
    unsafe fn as_mut_slice(&self) -> &mut [T] {
        std::slice::from_raw_parts_mut(self.ptr, self.len)
    }
}

/// Where the packed B panel lives.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Packing<'a> {
    Heap,
    Image(&'a Image),
}

/// Operands of one GEMM call, relative to their origins.
#[derive(Clone, Copy)]
pub(crate) struct Gemm<'a, T> {
    pub order: Order,
    pub trans_a: Transpose,
    pub trans_b: Transpose,
    pub m: usize,
    /// Full column count of C, even when only a range is computed.
    pub n: usize,
    pub k: usize,
    pub alpha: T,
    pub a: &'a [T],
    pub lda: usize,
    pub b: &'a [T],
    pub ldb: usize,
    pub beta: T,
    pub ldc: usize,
}

impl<T: Element> Gemm<'_, T> {
    /// Compute columns `cols` of C.
    pub(crate) fn run(
        &self,
        tiles: &TileParams,
        packing: Packing<'_>,
        c: &mut [T],
        cols: Range<usize>,
    ) -> Result<()> {
        self.scale_c(c, cols.clone());
        if self.alpha == T::zero() || cols.is_empty() {
            return Ok(());
        }

        // Path choice depends on the whole problem so partitions agree bit for bit.
        if self.m * self.n * self.k < SMALL_GEMM_FLOPS {
            self.simple(c, cols);
            return Ok(());
        }

        let kc = tiles.kc.min(self.k);
        let nc = tiles.nc.min(cols.len().div_ceil(tiles.nr) * tiles.nr);
        match packing {
            Packing::Heap => {
                let mut packed_b = vec![T::zero(); kc * nc];
                self.blocked(tiles, c, cols, &mut packed_b);
            }
            Packing::Image(image) => {
                image.with_workspace::<T, _>(kc * nc, |packed_b| {
                    self.blocked(tiles, c, cols, packed_b)
                })?;
            }
        }
        Ok(())
    }

    fn scale_c(&self, c: &mut [T], cols: Range<usize>) {
        if self.beta == T::one() {
            return;
        }
        for j in cols {
            for i in 0..self.m {
                let idx = self.order.index(i, j, self.ldc);
                c[idx] = if self.beta == T::zero() {
                    T::zero()
                } else {
                    c[idx] * self.beta
                };
            }
        }
    }

    /// Small-matrix GEMM: gather B columns once, then one dot product per element.
    fn simple(&self, c: &mut [T], cols: Range<usize>) {
        let (k, a_mat, b_mat) = (self.k, Mat::full(self.order, self.lda), Mat::full(self.order, self.ldb));

        let mut b_cols = Vec::with_capacity(cols.len() * k);
        for j in cols.clone() {
            for p in 0..k {
                b_cols.push(op_at(self.b, &b_mat, self.trans_b, p, j));
            }
        }

        let mut a_row = vec![T::zero(); k];
        for i in 0..self.m {
            for (p, v) in a_row.iter_mut().enumerate() {
                *v = op_at(self.a, &a_mat, self.trans_a, i, p);
            }
            for (jj, j) in cols.clone().enumerate() {
                let b_col = &b_cols[jj * k..(jj + 1) * k];
                let mut dot = T::zero();
                for p in 0..k {
                    dot += a_row[p] * b_col[p];
                }
                c[self.order.index(i, j, self.ldc)] += self.alpha * dot;
            }
        }
    }

    /// Cache-blocked GEMM using the Goto BLAS algorithm.
    ///
    /// - Outer loop over the column range (blocks of NC columns)
    /// - Middle loop over K (blocks of KC depth)
    /// - Pack panel of B into `packed_b` (shared across threads)
    /// - Inner loop over M, split across threads; each packs its own A block
    fn blocked(&self, tiles: &TileParams, c: &mut [T], cols: Range<usize>, packed_b: &mut [T]) {
        let (m, k) = (self.m, self.k);
        let TileParams { mr, nr, .. } = *tiles;
        let mc = tiles.mc.min(m.div_ceil(mr) * mr);
        let kc = tiles.kc.min(k);
        let nc = packed_b.len() / kc;

        let threads = if m * cols.len() > tiles.parallel_threshold {
            parallel::max_threads()
        } else {
            1
        };

        for jc in cols.clone().step_by(nc) {
            let jb = nc.min(cols.end - jc);

            for pc in (0..k).step_by(kc) {
                let pb = kc.min(k - pc);
                self.pack_b(nr, pc, jc, pb, jb, packed_b);
                let packed_b = &*packed_b;

                if threads > 1 {
                    // Each chunk owns disjoint rows of C.
                    let c_send = SendMutPtr::new(c);
                    let rows_per_thread = m.div_ceil(threads).div_ceil(mr) * mr;
                    parallel::parallel_for_chunks(0, m, rows_per_thread, |row, row_end| {
                        // Safety: rows [row, row_end) of C are written by this chunk only.
                        let c = unsafe { c_send.as_mut_slice() };
                        let mut packed_a = vec![T::zero(); mc * pb];
                        for ic in (row..row_end).step_by(mc) {
                            let ib = mc.min(row_end - ic);
                            self.pack_a(mr, ic, pc, ib, pb, &mut packed_a);
                            self.macrokernel(tiles, &packed_a, packed_b, c, ic, jc, ib, jb, pb);
                        }
                    });
                } else {
                    let mut packed_a = vec![T::zero(); mc * pb];
                    for ic in (0..m).step_by(mc) {
                        let ib = mc.min(m - ic);
                        self.pack_a(mr, ic, pc, ib, pb, &mut packed_a);
                        self.macrokernel(tiles, &packed_a, packed_b, c, ic, jc, ib, jb, pb);
                    }
                }
            }
        }
    }

    /// Pack a block of op(A) into MR-row contiguous strips, zero padded.
    fn pack_a(
        &self,
        mr: usize,
        row_start: usize,
        col_start: usize,
        rows: usize,
        cols: usize,
        packed: &mut [T],
    ) {
        let mat = Mat::full(self.order, self.lda);
        let mut idx = 0;
        for i_block in (0..rows).step_by(mr) {
            let live = mr.min(rows - i_block);
            for p in 0..cols {
                for ir in 0..mr {
                    packed[idx] = if ir < live {
                        op_at(self.a, &mat, self.trans_a, row_start + i_block + ir, col_start + p)
                    } else {
                        T::zero()
                    };
                    idx += 1;
                }
            }
        }
    }

    /// Pack a panel of op(B) into NR-column contiguous strips, zero padded.
    fn pack_b(
        &self,
        nr: usize,
        row_start: usize,
        col_start: usize,
        rows: usize,
        cols: usize,
        packed: &mut [T],
    ) {
        let mat = Mat::full(self.order, self.ldb);
        let mut idx = 0;
        for j_block in (0..cols).step_by(nr) {
            let live = nr.min(cols - j_block);
            for p in 0..rows {
                for jr in 0..nr {
                    packed[idx] = if jr < live {
                        op_at(self.b, &mat, self.trans_b, row_start + p, col_start + j_block + jr)
                    } else {
                        T::zero()
                    };
                    idx += 1;
                }
            }
        }
    }

    /// Dispatch MR x NR micro-kernels over the packed panels.
    fn macrokernel(
        &self,
        tiles: &TileParams,
        packed_a: &[T],
        packed_b: &[T],
        c: &mut [T],
        ic: usize,
        jc: usize,
        mb: usize,
        nb: usize,
        kb: usize,
    ) {
        let TileParams { mr, nr, .. } = *tiles;
        for jr in 0..nb.div_ceil(nr) {
            let live_n = nr.min(nb - jr * nr);
            for ir in 0..mb.div_ceil(mr) {
                let live_m = mr.min(mb - ir * mr);
                self.microkernel(
                    mr,
                    nr,
                    &packed_a[ir * mr * kb..],
                    &packed_b[jr * nr * kb..],
                    c,
                    ic + ir * mr,
                    jc + jr * nr,
                    live_m,
                    live_n,
                    kb,
                );
            }
        }
    }

    /// One MR x NR tile of C, accumulated in a register-sized array.
    #[inline(always)]
    fn microkernel(
        &self,
        mr: usize,
        nr: usize,
        packed_a: &[T],
        packed_b: &[T],
        c: &mut [T],
        row: usize,
        col: usize,
        live_m: usize,
        live_n: usize,
        kb: usize,
    ) {
        let mut acc = [[T::zero(); MAX_NR]; MAX_MR];
        for p in 0..kb {
            let a = &packed_a[p * mr..(p + 1) * mr];
            let b = &packed_b[p * nr..(p + 1) * nr];
            for (acc_row, &av) in acc.iter_mut().zip(a) {
                for (acc_v, &bv) in acc_row.iter_mut().zip(b) {
                    *acc_v += av * bv;
                }
            }
        }
        for (ir, acc_row) in acc.iter().enumerate().take(live_m) {
            for (jr, &v) in acc_row.iter().enumerate().take(live_n) {
                c[self.order.index(row + ir, col + jr, self.ldc)] += self.alpha * v;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Variant;
    use num_complex::Complex64;
    use qblas_core::{Config, Context, DType, Device};

    fn tiles(dtype: DType) -> TileParams {
        let cfg = Config {
            gemm_mc: Some(12),
            gemm_nc: Some(16),
            gemm_kc: Some(8),
            parallel_threshold: 64,
            ..Config::default()
        };
        TileParams::for_device(Device::host().info(), dtype, Variant::Blocked, &cfg).unwrap()
    }

    fn naive<T: Element>(g: &Gemm<'_, T>, c: &mut [T]) {
        let (am, bm) = (Mat::full(g.order, g.lda), Mat::full(g.order, g.ldb));
        for i in 0..g.m {
            for j in 0..g.n {
                let mut s = T::zero();
                for p in 0..g.k {
                    s += op_at(g.a, &am, g.trans_a, i, p) * op_at(g.b, &bm, g.trans_b, p, j);
                }
                let idx = g.order.index(i, j, g.ldc);
                c[idx] = g.alpha * s + g.beta * c[idx];
            }
        }
    }

    #[test]
    fn test_simple_multiply() {
        // A = [[1,2],[3,4]], B = [[5,6],[7,8]], C = A*B = [[19,22],[43,50]]
        let a = [1.0f32, 2.0, 3.0, 4.0];
        let b = [5.0f32, 6.0, 7.0, 8.0];
        let mut c = [0.0f32; 4];
        let g = Gemm {
            order: Order::RowMajor,
            trans_a: Transpose::NoTrans,
            trans_b: Transpose::NoTrans,
            m: 2,
            n: 2,
            k: 2,
            alpha: 1.0,
            a: &a,
            lda: 2,
            b: &b,
            ldb: 2,
            beta: 0.0,
            ldc: 2,
        };
        g.run(&tiles(DType::F32), Packing::Heap, &mut c, 0..2).unwrap();
        assert_eq!(c, [19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_blocked_matches_naive_all_transposes() {
        let (m, n, k) = (53, 61, 47);
        for order in [Order::RowMajor, Order::ColumnMajor] {
            for (ta, tb) in [
                (Transpose::NoTrans, Transpose::NoTrans),
                (Transpose::Trans, Transpose::NoTrans),
                (Transpose::NoTrans, Transpose::Trans),
                (Transpose::Trans, Transpose::Trans),
            ] {
                let (ar, ac) = ta.stored_dims(m, k);
                let (br, bc) = tb.stored_dims(k, n);
                let lda = order.leading_dim(ar, ac) + 3;
                let ldb = order.leading_dim(br, bc) + 1;
                let ldc = order.leading_dim(m, n) + 2;
                let a: Vec<f64> = (0..lda * ar.max(ac)).map(|i| ((i * 7 + 3) % 19) as f64 - 9.0).collect();
                let b: Vec<f64> = (0..ldb * br.max(bc)).map(|i| ((i * 11 + 5) % 23) as f64 - 11.0).collect();
                let c0: Vec<f64> = (0..ldc * m.max(n)).map(|i| (i % 5) as f64).collect();
                let g = Gemm {
                    order,
                    trans_a: ta,
                    trans_b: tb,
                    m,
                    n,
                    k,
                    alpha: 2.0,
                    a: &a,
                    lda,
                    b: &b,
                    ldb,
                    beta: -1.0,
                    ldc,
                };
                let mut c = c0.clone();
                g.run(&tiles(DType::F64), Packing::Heap, &mut c, 0..n).unwrap();
                let mut expected = c0.clone();
                naive(&g, &mut expected);
                assert_eq!(c, expected, "{order:?} {ta:?} {tb:?}");
            }
        }
    }

    #[test]
    fn test_column_ranges_compose() {
        let (m, n, k) = (40, 50, 60);
        let a: Vec<f32> = (0..m * k).map(|i| (i % 7) as f32).collect();
        let b: Vec<f32> = (0..k * n).map(|i| (i % 5) as f32).collect();
        let g = Gemm {
            order: Order::ColumnMajor,
            trans_a: Transpose::NoTrans,
            trans_b: Transpose::NoTrans,
            m,
            n,
            k,
            alpha: 1.0,
            a: &a,
            lda: m,
            b: &b,
            ldb: k,
            beta: 0.0,
            ldc: m,
        };
        let t = tiles(DType::F32);
        let mut whole = vec![0.0f32; m * n];
        g.run(&t, Packing::Heap, &mut whole, 0..n).unwrap();
        let mut parts = vec![0.0f32; m * n];
        for r in [0..17, 17..18, 18..50] {
            g.run(&t, Packing::Heap, &mut parts, r).unwrap();
        }
        assert_eq!(whole, parts);
    }

    #[test]
    fn test_conj_trans_complex_via_image() {
        let (m, n, k) = (50, 40, 60);
        let a: Vec<Complex64> = (0..k * m)
            .map(|i| Complex64::new((i % 7) as f64, (i % 3) as f64 - 1.0))
            .collect();
        let b: Vec<Complex64> = (0..k * n)
            .map(|i| Complex64::new((i % 5) as f64 - 2.0, (i % 4) as f64))
            .collect();
        let g = Gemm {
            order: Order::RowMajor,
            trans_a: Transpose::ConjTrans,
            trans_b: Transpose::NoTrans,
            m,
            n,
            k,
            alpha: Complex64::new(0.5, 1.0),
            a: &a,
            lda: m,
            b: &b,
            ldb: n,
            beta: Complex64::new(0.0, 0.0),
            ldc: n,
        };
        let ctx = Context::host();
        let image = Image::new(&ctx, 64, 64).unwrap();
        let mut c = vec![Complex64::new(7.0, 7.0); m * n];
        g.run(&tiles(DType::C64), Packing::Image(&image), &mut c, 0..n).unwrap();
        let mut expected = vec![Complex64::new(0.0, 0.0); m * n];
        naive(&g, &mut expected);
        assert_eq!(c, expected);
    }
}
