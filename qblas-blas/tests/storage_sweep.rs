//! Band, packed and triangular storage against dense references, over every
//! order, transpose, triangle and diagonal combination.
//!
//! Storage slots a routine must not read hold NaN, so a wrong index shows up
//! as a NaN result. Slots a routine must not write hold a finite sentinel and
//! are compared exactly.

use approx::relative_eq;
use qblas_blas::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

type Dense = Vec<Vec<Complex64>>;

const ORDERS: [Order; 2] = [Order::RowMajor, Order::ColumnMajor];
const TRANSPOSES: [Transpose; 3] = [Transpose::NoTrans, Transpose::Trans, Transpose::ConjTrans];
const UPLOS: [Uplo; 2] = [Uplo::Upper, Uplo::Lower];
const DIAGS: [Diag; 2] = [Diag::NonUnit, Diag::Unit];
const SIDES: [Side; 2] = [Side::Left, Side::Right];
const INCS: [isize; 2] = [1, -2];

const POISON: Complex64 = Complex64::new(f64::NAN, f64::NAN);
const SENTINEL: Complex64 = Complex64::new(7.0, -7.0);
const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

const OFF_A: usize = 2;
const OFF_X: usize = 1;

fn host(queues: usize) -> (Context, Vec<CommandQueue>) {
    setup().unwrap();
    let ctx = Context::host();
    let queues = (0..queues).map(|_| CommandQueue::default_for(&ctx).unwrap()).collect();
    (ctx, queues)
}

fn buf(ctx: &Context, data: &[Complex64]) -> Buffer<Complex64> {
    Buffer::from_slice(ctx, MemFlags::ReadWrite, data).unwrap()
}

fn random_dense(rng: &mut StdRng, rows: usize, cols: usize) -> Dense {
    (0..rows)
        .map(|_| {
            (0..cols)
                .map(|_| Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
                .collect()
        })
        .collect()
}

fn random_vec(rng: &mut StdRng, n: usize) -> Vec<Complex64> {
    random_dense(rng, 1, n).remove(0)
}

/// Random square matrix with a dominant diagonal, so triangular solves stay well conditioned.
fn random_square(rng: &mut StdRng, n: usize) -> Dense {
    let mut a = random_dense(rng, n, n);
    for (i, row) in a.iter_mut().enumerate() {
        row[i] += Complex64::new(4.0, 0.0);
    }
    a
}

// ── Dense reference arithmetic ──────────────────────────────────────────────

fn transposed(a: &Dense) -> Dense {
    let cols = a.first().map_or(0, Vec::len);
    (0..cols).map(|j| a.iter().map(|row| row[j]).collect()).collect()
}

fn apply(trans: Transpose, a: &Dense) -> Dense {
    match trans {
        Transpose::NoTrans => a.clone(),
        Transpose::Trans => transposed(a),
        Transpose::ConjTrans => {
            transposed(a).into_iter().map(|row| row.iter().map(|v| v.conj()).collect()).collect()
        }
    }
}

fn mat_vec(a: &Dense, x: &[Complex64]) -> Vec<Complex64> {
    a.iter().map(|row| row.iter().zip(x).map(|(a, x)| a * x).sum()).collect()
}

fn mat_mul(a: &Dense, b: &Dense) -> Dense {
    let bt = transposed(b);
    a.iter().map(|row| mat_vec(&bt, row)).collect()
}

/// Gaussian elimination without pivoting; `a` is triangular or diagonally dominant.
fn dense_solve(a: &Dense, b: &[Complex64]) -> Vec<Complex64> {
    let n = b.len();
    let (mut a, mut x) = (a.clone(), b.to_vec());
    for p in 0..n {
        for r in p + 1..n {
            let f = a[r][p] / a[p][p];
            if f == ZERO {
                continue;
            }
            for c in p..n {
                let v = a[p][c];
                a[r][c] -= f * v;
            }
            let v = x[p];
            x[r] -= f * v;
        }
    }
    for p in (0..n).rev() {
        let tail: Complex64 = (p + 1..n).map(|c| a[p][c] * x[c]).sum();
        x[p] = (x[p] - tail) / a[p][p];
    }
    x
}

fn in_triangle(uplo: Uplo, i: usize, j: usize) -> bool {
    match uplo {
        Uplo::Upper => i <= j,
        Uplo::Lower => i >= j,
    }
}

fn in_band(k: Option<usize>, i: usize, j: usize) -> bool {
    k.map_or(true, |k| i.abs_diff(j) <= k)
}

/// Stored and logical views of a triangular operand. A unit diagonal is
/// never read, so it is stored as NaN.
fn triangular(a: &Dense, uplo: Uplo, diag: Diag, k: Option<usize>) -> (Dense, Dense) {
    let n = a.len();
    let mut stored = vec![vec![POISON; n]; n];
    let mut logical = vec![vec![ZERO; n]; n];
    for i in 0..n {
        for j in 0..n {
            if !in_triangle(uplo, i, j) || !in_band(k, i, j) {
                continue;
            }
            if i == j && diag == Diag::Unit {
                logical[i][j] = ONE;
            } else {
                stored[i][j] = a[i][j];
                logical[i][j] = a[i][j];
            }
        }
    }
    (stored, logical)
}

/// Stored and logical views of a symmetric or hermitian operand. The
/// hermitian diagonal keeps its imaginary part in storage; it must be ignored.
fn symmetric(a: &Dense, uplo: Uplo, herm: bool, k: Option<usize>) -> (Dense, Dense) {
    let n = a.len();
    let mut stored = vec![vec![POISON; n]; n];
    let mut logical = vec![vec![ZERO; n]; n];
    for i in 0..n {
        for j in 0..n {
            if !in_band(k, i, j) {
                continue;
            }
            if in_triangle(uplo, i, j) {
                stored[i][j] = a[i][j];
            }
            logical[i][j] = match (in_triangle(uplo, i, j), herm) {
                (true, true) if i == j => Complex64::new(a[i][i].re, 0.0),
                (true, _) => a[i][j],
                (false, true) => a[j][i].conj(),
                (false, false) => a[j][i],
            };
        }
    }
    (stored, logical)
}

// ── Storage layouts ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Storage {
    Full,
    Packed,
    Band(usize),
}

impl Storage {
    fn bandwidth(self) -> Option<usize> {
        match self {
            Storage::Band(k) => Some(k),
            _ => None,
        }
    }
}

fn store_full(order: Order, a: &Dense, ld: usize, off: usize, gap: Complex64) -> Vec<Complex64> {
    let (rows, cols) = (a.len(), a.first().map_or(0, Vec::len));
    let mut out = vec![gap; off + order.extent(rows, cols, ld) + 1];
    for (i, row) in a.iter().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            out[off + order.index(i, j, ld)] = v;
        }
    }
    out
}

/// Column-major packing walks columns, row-major packing walks rows; both
/// keep only the `uplo` triangle.
fn store_packed(order: Order, uplo: Uplo, a: &Dense, off: usize) -> Vec<Complex64> {
    let n = a.len();
    let mut out = vec![POISON; off];
    for outer in 0..n {
        for inner in 0..n {
            let (i, j) = match order {
                Order::ColumnMajor => (inner, outer),
                Order::RowMajor => (outer, inner),
            };
            if in_triangle(uplo, i, j) {
                out.push(a[i][j]);
            }
        }
    }
    out
}

fn store_band(
    order: Order,
    a: &Dense,
    kl: usize,
    ku: usize,
    ld: usize,
    off: usize,
) -> Vec<Complex64> {
    let (m, n) = (a.len(), a.first().map_or(0, Vec::len));
    let lines = match order {
        Order::ColumnMajor => n,
        Order::RowMajor => m,
    };
    let mut out = vec![POISON; off + lines * ld];
    for i in 0..m {
        for j in 0..n {
            if j > i + ku || i > j + kl {
                continue;
            }
            let idx = match order {
                Order::ColumnMajor => ku + i - j + j * ld,
                Order::RowMajor => kl + j - i + i * ld,
            };
            out[off + idx] = a[i][j];
        }
    }
    out
}

/// Lay out one triangle of a square operand at `OFF_A`; returns the data and its `ld`.
fn store_square(
    order: Order,
    uplo: Uplo,
    storage: Storage,
    stored: &Dense,
) -> (Vec<Complex64>, usize) {
    let n = stored.len();
    match storage {
        Storage::Full => (store_full(order, stored, n + 1, OFF_A, POISON), n + 1),
        Storage::Packed => (store_packed(order, uplo, stored, OFF_A), 0),
        Storage::Band(k) => {
            let (kl, ku) = match uplo {
                Uplo::Upper => (0, k),
                Uplo::Lower => (k, 0),
            };
            (store_band(order, stored, kl, ku, k + 2, OFF_A), k + 2)
        }
    }
}

// ── Strided vectors ─────────────────────────────────────────────────────────

fn strided(off: usize, n: usize, inc: isize, i: usize) -> usize {
    let step = inc.unsigned_abs();
    if inc > 0 {
        off + i * step
    } else {
        off + (n - 1 - i) * step
    }
}

fn store_vec(values: &[Complex64], inc: isize, gap: Complex64) -> Vec<Complex64> {
    let n = values.len();
    let mut out = vec![gap; OFF_X + (n - 1) * inc.unsigned_abs() + 2];
    for (i, &v) in values.iter().enumerate() {
        out[strided(OFF_X, n, inc, i)] = v;
    }
    out
}

fn inc_pairs() -> impl Iterator<Item = (isize, isize)> {
    INCS.into_iter().flat_map(|x| INCS.map(move |y| (x, y)))
}

fn assert_close(got: &[Complex64], want: &[Complex64], what: &str) {
    assert_eq!(got.len(), want.len(), "{what}: length");
    for (i, (g, w)) in got.iter().zip(want).enumerate() {
        let ok = relative_eq!(g.re, w.re, epsilon = 1e-9, max_relative = 1e-9)
            && relative_eq!(g.im, w.im, epsilon = 1e-9, max_relative = 1e-9);
        assert!(ok, "{what}: element {i} is {g}, expected {w}");
    }
}

// ============================================================================
// Level 2
// ============================================================================

#[test]
fn test_gbmv_matches_dense_for_every_transpose() {
    let (ctx, queues) = host(2);
    let mut rng = StdRng::seed_from_u64(21);
    let alpha = Complex64::new(0.5, -1.0);
    let beta = Complex64::new(0.25, 0.75);
    for (m, n, bands) in [(6, 5, [(1, 2), (2, 0), (0, 3)]), (4, 7, [(3, 1), (0, 0), (1, 4)])] {
        for (kl, ku) in bands {
            let full = random_dense(&mut rng, m, n);
            let mut logical = vec![vec![ZERO; n]; m];
            for i in 0..m {
                for j in 0..n {
                    if j <= i + ku && i <= j + kl {
                        logical[i][j] = full[i][j];
                    }
                }
            }
            for order in ORDERS {
                let lda = kl + ku + 2;
                let a = buf(&ctx, &store_band(order, &full, kl, ku, lda, OFF_A));
                for trans in TRANSPOSES {
                    let op = apply(trans, &logical);
                    let (ylen, xlen) = (op.len(), op[0].len());
                    for (inc_x, inc_y) in inc_pairs() {
                        let what =
                            format!("gbmv {m}x{n} kl={kl} ku={ku} {order:?} {trans:?} {inc_x},{inc_y}");
                        let xv = random_vec(&mut rng, xlen);
                        let yv = random_vec(&mut rng, ylen);
                        let y0 = store_vec(&yv, inc_y, SENTINEL);
                        let mut expected = y0.clone();
                        for (i, v) in mat_vec(&op, &xv).into_iter().enumerate() {
                            expected[strided(OFF_X, ylen, inc_y, i)] = alpha * v + beta * yv[i];
                        }

                        let x = buf(&ctx, &store_vec(&xv, inc_x, POISON));
                        let y = buf(&ctx, &y0);
                        let events = gbmv(
                            order, trans, m, n, kl, ku, alpha, &a, OFF_A, lda, &x, OFF_X, inc_x,
                            beta, &y, OFF_X, inc_y, &queues, &[],
                        )
                        .unwrap();
                        assert_eq!(events.len(), 2);
                        Event::wait_all(&events).unwrap();
                        assert_close(&y.to_vec(), &expected, &what);
                    }
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_triangular(
    storage: Storage,
    solve: bool,
    order: Order,
    uplo: Uplo,
    trans: Transpose,
    diag: Diag,
    n: usize,
    a: &Buffer<Complex64>,
    lda: usize,
    x: &Buffer<Complex64>,
    inc: isize,
    queues: &[CommandQueue],
) -> Vec<Event> {
    let off = OFF_X;
    let events = match (storage, solve) {
        (Storage::Full, false) => {
            trmv(order, uplo, trans, diag, n, a, OFF_A, lda, x, off, inc, queues, &[])
        }
        (Storage::Full, true) => {
            trsv(order, uplo, trans, diag, n, a, OFF_A, lda, x, off, inc, queues, &[])
        }
        (Storage::Packed, false) => {
            tpmv(order, uplo, trans, diag, n, a, OFF_A, x, off, inc, queues, &[])
        }
        (Storage::Packed, true) => {
            tpsv(order, uplo, trans, diag, n, a, OFF_A, x, off, inc, queues, &[])
        }
        (Storage::Band(k), false) => {
            tbmv(order, uplo, trans, diag, n, k, a, OFF_A, lda, x, off, inc, queues, &[])
        }
        (Storage::Band(k), true) => {
            tbsv(order, uplo, trans, diag, n, k, a, OFF_A, lda, x, off, inc, queues, &[])
        }
    };
    events.unwrap()
}

#[test]
fn test_triangular_mv_and_sv_match_dense_in_every_storage() {
    let (ctx, queues) = host(1);
    let mut rng = StdRng::seed_from_u64(22);
    let n = 5;
    for storage in [Storage::Full, Storage::Packed, Storage::Band(2)] {
        for order in ORDERS {
            for uplo in UPLOS {
                for diag in DIAGS {
                    let (stored, logical) =
                        triangular(&random_square(&mut rng, n), uplo, diag, storage.bandwidth());
                    let (data, lda) = store_square(order, uplo, storage, &stored);
                    let a = buf(&ctx, &data);
                    for trans in TRANSPOSES {
                        let op = apply(trans, &logical);
                        for solve in [false, true] {
                            for inc in INCS {
                                let what = format!(
                                    "{storage:?} {} {order:?} {uplo:?} {trans:?} {diag:?} inc {inc}",
                                    if solve { "solve" } else { "product" }
                                );
                                let xv = random_vec(&mut rng, n);
                                let x0 = store_vec(&xv, inc, SENTINEL);
                                let want = if solve { dense_solve(&op, &xv) } else { mat_vec(&op, &xv) };
                                let mut expected = x0.clone();
                                for (i, v) in want.into_iter().enumerate() {
                                    expected[strided(OFF_X, n, inc, i)] = v;
                                }

                                let x = buf(&ctx, &x0);
                                let events = run_triangular(
                                    storage, solve, order, uplo, trans, diag, n, &a, lda, &x, inc,
                                    &queues,
                                );
                                Event::wait_all(&events).unwrap();
                                assert_close(&x.to_vec(), &expected, &what);
                            }
                        }
                    }
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_symmetric(
    storage: Storage,
    herm: bool,
    order: Order,
    uplo: Uplo,
    n: usize,
    alpha: Complex64,
    a: &Buffer<Complex64>,
    lda: usize,
    x: &Buffer<Complex64>,
    inc_x: isize,
    beta: Complex64,
    y: &Buffer<Complex64>,
    inc_y: isize,
    queues: &[CommandQueue],
) -> Vec<Event> {
    let (ox, oy) = (OFF_X, OFF_X);
    let events = match (storage, herm) {
        (Storage::Full, false) => {
            symv(order, uplo, n, alpha, a, OFF_A, lda, x, ox, inc_x, beta, y, oy, inc_y, queues, &[])
        }
        (Storage::Full, true) => {
            hemv(order, uplo, n, alpha, a, OFF_A, lda, x, ox, inc_x, beta, y, oy, inc_y, queues, &[])
        }
        (Storage::Packed, false) => {
            spmv(order, uplo, n, alpha, a, OFF_A, x, ox, inc_x, beta, y, oy, inc_y, queues, &[])
        }
        (Storage::Packed, true) => {
            hpmv(order, uplo, n, alpha, a, OFF_A, x, ox, inc_x, beta, y, oy, inc_y, queues, &[])
        }
        (Storage::Band(k), false) => sbmv(
            order, uplo, n, k, alpha, a, OFF_A, lda, x, ox, inc_x, beta, y, oy, inc_y, queues, &[],
        ),
        (Storage::Band(k), true) => hbmv(
            order, uplo, n, k, alpha, a, OFF_A, lda, x, ox, inc_x, beta, y, oy, inc_y, queues, &[],
        ),
    };
    events.unwrap()
}

#[test]
fn test_symmetric_and_hermitian_mv_match_dense_in_every_storage() {
    let (ctx, queues) = host(1);
    let mut rng = StdRng::seed_from_u64(23);
    let n = 5;
    let alpha = Complex64::new(-0.5, 1.25);
    let beta = Complex64::new(0.5, -0.5);
    for storage in [Storage::Full, Storage::Packed, Storage::Band(2), Storage::Band(0)] {
        for herm in [false, true] {
            for order in ORDERS {
                for uplo in UPLOS {
                    let (stored, logical) =
                        symmetric(&random_dense(&mut rng, n, n), uplo, herm, storage.bandwidth());
                    let (data, lda) = store_square(order, uplo, storage, &stored);
                    let a = buf(&ctx, &data);
                    for (inc_x, inc_y) in inc_pairs() {
                        let what = format!(
                            "{storage:?} {} {order:?} {uplo:?} incs {inc_x},{inc_y}",
                            if herm { "hermitian" } else { "symmetric" }
                        );
                        let xv = random_vec(&mut rng, n);
                        let yv = random_vec(&mut rng, n);
                        let y0 = store_vec(&yv, inc_y, SENTINEL);
                        let mut expected = y0.clone();
                        for (i, v) in mat_vec(&logical, &xv).into_iter().enumerate() {
                            expected[strided(OFF_X, n, inc_y, i)] = alpha * v + beta * yv[i];
                        }

                        let x = buf(&ctx, &store_vec(&xv, inc_x, POISON));
                        let y = buf(&ctx, &y0);
                        let events = run_symmetric(
                            storage, herm, order, uplo, n, alpha, &a, lda, &x, inc_x, beta, &y,
                            inc_y, &queues,
                        );
                        Event::wait_all(&events).unwrap();
                        assert_close(&y.to_vec(), &expected, &what);
                    }
                }
            }
        }
    }
}

// ============================================================================
// Level 3, split over two queues
// ============================================================================

/// Expected buffer contents after writing `values` over an `m x n` matrix at `off`.
fn overwrite(
    order: Order,
    base: &[Complex64],
    values: &Dense,
    ld: usize,
    off: usize,
) -> Vec<Complex64> {
    let mut out = base.to_vec();
    for (i, row) in values.iter().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            out[off + order.index(i, j, ld)] = v;
        }
    }
    out
}

#[test]
fn test_trmm_and_trsm_match_dense_over_two_queues() {
    let (ctx, queues) = host(2);
    let mut rng = StdRng::seed_from_u64(24);
    let (m, n) = (5, 4);
    let alpha = Complex64::new(0.5, 0.25);
    let off_b = 1;
    for order in ORDERS {
        for side in SIDES {
            let ka = match side {
                Side::Left => m,
                Side::Right => n,
            };
            for uplo in UPLOS {
                for diag in DIAGS {
                    let (stored, logical) = triangular(&random_square(&mut rng, ka), uplo, diag, None);
                    let lda = ka + 1;
                    let a = buf(&ctx, &store_full(order, &stored, lda, OFF_A, POISON));
                    for trans in TRANSPOSES {
                        let op = apply(trans, &logical);
                        for solve in [false, true] {
                            let what = format!(
                                "{} {order:?} {side:?} {uplo:?} {trans:?} {diag:?}",
                                if solve { "trsm" } else { "trmm" }
                            );
                            let bv = random_dense(&mut rng, m, n);
                            let scaled: Dense = bv
                                .iter()
                                .map(|row| row.iter().map(|v| alpha * v).collect())
                                .collect();
                            let want: Dense = match (side, solve) {
                                (Side::Left, false) => mat_mul(&op, &scaled),
                                (Side::Right, false) => mat_mul(&scaled, &op),
                                (Side::Left, true) => transposed(
                                    &transposed(&scaled)
                                        .iter()
                                        .map(|col| dense_solve(&op, col))
                                        .collect::<Dense>(),
                                ),
                                (Side::Right, true) => {
                                    let opt = transposed(&op);
                                    scaled.iter().map(|row| dense_solve(&opt, row)).collect()
                                }
                            };
                            let ldb = order.leading_dim(m, n) + 2;
                            let b0 = store_full(order, &bv, ldb, off_b, SENTINEL);
                            let expected = overwrite(order, &b0, &want, ldb, off_b);

                            let b = buf(&ctx, &b0);
                            let call = if solve { trsm::<Complex64> } else { trmm::<Complex64> };
                            let events = call(
                                order, side, uplo, trans, diag, m, n, alpha, &a, OFF_A, lda, &b,
                                off_b, ldb, &queues, &[],
                            )
                            .unwrap();
                            assert_eq!(events.len(), 2);
                            Event::wait_all(&events).unwrap();
                            assert_close(&b.to_vec(), &expected, &what);
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn test_symm_and_hemm_match_dense_over_two_queues() {
    let (ctx, queues) = host(2);
    let mut rng = StdRng::seed_from_u64(25);
    let (m, n) = (5, 4);
    let alpha = Complex64::new(1.5, -0.5);
    let beta = Complex64::new(-0.25, 0.5);
    let (off_b, off_c) = (1, 3);
    for order in ORDERS {
        for side in SIDES {
            let ka = match side {
                Side::Left => m,
                Side::Right => n,
            };
            for uplo in UPLOS {
                for herm in [false, true] {
                    let what = format!(
                        "{} {order:?} {side:?} {uplo:?}",
                        if herm { "hemm" } else { "symm" }
                    );
                    let (stored, logical) = symmetric(&random_dense(&mut rng, ka, ka), uplo, herm, None);
                    let lda = ka + 1;
                    let bv = random_dense(&mut rng, m, n);
                    let cv = random_dense(&mut rng, m, n);
                    let product = match side {
                        Side::Left => mat_mul(&logical, &bv),
                        Side::Right => mat_mul(&bv, &logical),
                    };
                    let want: Dense = product
                        .iter()
                        .zip(&cv)
                        .map(|(p, c)| p.iter().zip(c).map(|(p, c)| alpha * p + beta * c).collect())
                        .collect();
                    let ldb = order.leading_dim(m, n) + 1;
                    let ldc = order.leading_dim(m, n) + 2;
                    let c0 = store_full(order, &cv, ldc, off_c, SENTINEL);
                    let expected = overwrite(order, &c0, &want, ldc, off_c);

                    let a = buf(&ctx, &store_full(order, &stored, lda, OFF_A, POISON));
                    let b = buf(&ctx, &store_full(order, &bv, ldb, off_b, POISON));
                    let c = buf(&ctx, &c0);
                    let call = if herm { hemm::<Complex64> } else { symm::<Complex64> };
                    let events = call(
                        order, side, uplo, m, n, alpha, &a, OFF_A, lda, &b, off_b, ldb, beta, &c,
                        off_c, ldc, &queues, &[],
                    )
                    .unwrap();
                    assert_eq!(events.len(), 2);
                    Event::wait_all(&events).unwrap();
                    assert_close(&c.to_vec(), &expected, &what);
                }
            }
        }
    }
}

#[test]
fn test_rank_k_updates_match_dense_over_two_queues() {
    let (ctx, queues) = host(2);
    let mut rng = StdRng::seed_from_u64(26);
    let (n, k) = (5, 3);
    let alpha = Complex64::new(0.5, -0.25);
    let (off_b, off_c) = (1, 2);
    for order in ORDERS {
        for uplo in UPLOS {
            for herm in [false, true] {
                let flavours = if herm {
                    [Transpose::NoTrans, Transpose::ConjTrans]
                } else {
                    [Transpose::NoTrans, Transpose::Trans]
                };
                for trans in flavours {
                    for rank2 in [false, true] {
                        let what = format!(
                            "{}{} {order:?} {uplo:?} {trans:?}",
                            if herm { "her" } else { "syr" },
                            if rank2 { "2k" } else { "k" }
                        );
                        let (ar, ac) = trans.stored_dims(n, k);
                        let av = random_dense(&mut rng, ar, ac);
                        let bv = random_dense(&mut rng, ar, ac);
                        let cv = random_dense(&mut rng, n, n);
                        let (opa, opb) = (apply(trans, &av), apply(trans, &bv));
                        let cj = |v: Complex64| if herm { v.conj() } else { v };
                        // herk takes a real alpha; beta is real for both hermitian forms
                        let alpha = if herm && !rank2 { Complex64::new(alpha.re, 0.0) } else { alpha };
                        let beta = if herm {
                            Complex64::new(0.75, 0.0)
                        } else {
                            Complex64::new(0.75, 0.5)
                        };
                        let dot = |x: &Dense, y: &Dense, i: usize, j: usize| -> Complex64 {
                            (0..k).map(|p| x[i][p] * cj(y[j][p])).sum()
                        };

                        let mut want = cv.clone();
                        for i in 0..n {
                            for j in 0..n {
                                if !in_triangle(uplo, i, j) {
                                    continue;
                                }
                                let update = if rank2 {
                                    alpha * dot(&opa, &opb, i, j) + cj(alpha) * dot(&opb, &opa, i, j)
                                } else {
                                    alpha * dot(&opa, &opa, i, j)
                                };
                                let v = update + beta * cv[i][j];
                                want[i][j] = if herm && i == j { Complex64::new(v.re, 0.0) } else { v };
                            }
                        }
                        let lda = order.leading_dim(ar, ac) + 1;
                        let ldc = order.leading_dim(n, n) + 1;
                        let c0 = store_full(order, &cv, ldc, off_c, SENTINEL);
                        let expected = overwrite(order, &c0, &want, ldc, off_c);

                        let a = buf(&ctx, &store_full(order, &av, lda, OFF_A, POISON));
                        let b = buf(&ctx, &store_full(order, &bv, lda, off_b, POISON));
                        let c = buf(&ctx, &c0);
                        let events = match (herm, rank2) {
                            (false, false) => syrk(
                                order, uplo, trans, n, k, alpha, &a, OFF_A, lda, beta, &c, off_c,
                                ldc, &queues, &[],
                            ),
                            (true, false) => herk(
                                order, uplo, trans, n, k, alpha.re, &a, OFF_A, lda, beta.re, &c,
                                off_c, ldc, &queues, &[],
                            ),
                            (false, true) => syr2k(
                                order, uplo, trans, n, k, alpha, &a, OFF_A, lda, &b, off_b, lda,
                                beta, &c, off_c, ldc, &queues, &[],
                            ),
                            (true, true) => her2k(
                                order, uplo, trans, n, k, alpha, &a, OFF_A, lda, &b, off_b, lda,
                                beta.re, &c, off_c, ldc, &queues, &[],
                            ),
                        }
                        .unwrap();
                        assert_eq!(events.len(), 2);
                        Event::wait_all(&events).unwrap();
                        assert_close(&c.to_vec(), &expected, &what);
                    }
                }
            }
        }
    }
}
