//! BLAS Level 3: matrix-matrix operations.
//!
//! Partitioning across queues:
//!
//! - `gemm`, `symm`/`hemm` and the rank-k family split the columns of C,
//! - `trmm` and `trsm` split the right-hand sides: columns of B when A is on
//!   the left, rows of B when it is on the right.
//!
//! Every element of the output is computed by exactly one queue with the
//! same arithmetic it would get on a single queue, so results do not depend
//! on the number of queues.

use crate::dispatch::{self, Routine, TileParams, Variant};
use crate::kernels::gemm::{Gemm, Packing};
use crate::kernels::level3::{symm_gemm, RankK, TriMat};
use crate::kernels::{Mat, Sym, Tri};
use crate::state::{self, Library};
use crate::validate::{self, Access, MatShape};
use qblas_core::{
    Buffer, CommandQueue, Complex32, Complex64, Diag, Element, Error, Event, Image, Operand,
    Order, Result, Side, Transpose, Uplo,
};

// ============================================================================
// GEMM
// ============================================================================

/// A registered scratch image that can hold a packed B panel, if images are enabled.
fn scratch_image<T: Element>(lib: &Library, queues: &[CommandQueue]) -> Option<Image> {
    if !lib.config.images_enabled {
        return None;
    }
    let queue = queues.first()?;
    let tiles = TileParams::for_device(
        queue.device().info(),
        T::DTYPE,
        Variant::ImageBacked,
        &lib.config,
    )
    .ok()?;
    lib.scratch
        .find::<T>(queue.context().id(), tiles.packed_b_len())
}

/// `C := alpha * op(A) * op(B) + beta * C`
///
/// `op(A)` is `m x k`, `op(B)` is `k x n` and C is `m x n`.
pub fn gemm<T: Element>(
    order: Order,
    trans_a: Transpose,
    trans_b: Transpose,
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    b: &Buffer<T>,
    off_b: usize,
    ldb: usize,
    beta: T,
    c: &Buffer<T>,
    off_c: usize,
    ldc: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::dims(&[("M", m), ("N", n), ("K", k)])?;
    let (ar, ac) = trans_a.stored_dims(m, k);
    let (br, bc) = trans_b.stored_dims(k, n);
    let a_shape = MatShape::general(Operand::A, order, ar, ac, off_a, lda)?;
    let b_shape = MatShape::general(Operand::B, order, br, bc, off_b, ldb)?;
    let c_shape = MatShape::general(Operand::C, order, m, n, off_c, ldc)?;
    validate::operand(a, Operand::A, a_shape.end(), Access::Read, queues)?;
    validate::operand(b, Operand::B, b_shape.end(), Access::Read, queues)?;
    validate::operand(c, Operand::C, c_shape.end(), Access::ReadWrite, queues)?;

    let image = scratch_image::<T>(&lib, queues);
    let variant = if image.is_some() {
        Variant::ImageBacked
    } else {
        Variant::Blocked
    };
    let plan = dispatch::plan::<T>(&lib, Routine::Gemm, variant, queues, wait)?;

    let (a, b, c) = (a.clone(), b.clone(), c.clone());
    plan.split(n, move |kernel, cols| {
        let av = a.read_range(a_shape.off, a_shape.extent())?;
        let bv = b.read_range(b_shape.off, b_shape.extent())?;
        let packing = match &image {
            Some(img) if img.capacity::<T>() >= kernel.tiles.packed_b_len() => Packing::Image(img),
            _ => Packing::Heap,
        };
        let gemm = Gemm {
            order,
            trans_a,
            trans_b,
            m,
            n,
            k,
            alpha,
            a: &av,
            lda,
            b: &bv,
            ldb,
            beta,
            ldc,
        };
        let mut data = c.map_write();
        gemm.run(&kernel.tiles, packing, &mut data[c_shape.off..c_shape.end()], cols)
    })
}

// ============================================================================
// Symmetric / hermitian products
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn symm_impl<T: Element>(
    routine: Routine,
    herm: bool,
    order: Order,
    side: Side,
    uplo: Uplo,
    m: usize,
    n: usize,
    alpha: T,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    b: &Buffer<T>,
    off_b: usize,
    ldb: usize,
    beta: T,
    c: &Buffer<T>,
    off_c: usize,
    ldc: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::dims(&[("M", m), ("N", n)])?;
    let ka = match side {
        Side::Left => m,
        Side::Right => n,
    };
    let a_shape = MatShape::general(Operand::A, order, ka, ka, off_a, lda)?;
    let b_shape = MatShape::general(Operand::B, order, m, n, off_b, ldb)?;
    let c_shape = MatShape::general(Operand::C, order, m, n, off_c, ldc)?;
    validate::operand(a, Operand::A, a_shape.end(), Access::Read, queues)?;
    validate::operand(b, Operand::B, b_shape.end(), Access::Read, queues)?;
    validate::operand(c, Operand::C, c_shape.end(), Access::ReadWrite, queues)?;
    let plan = dispatch::plan::<T>(&lib, routine, Variant::Reference, queues, wait)?;

    let (a, b, c) = (a.clone(), b.clone(), c.clone());
    plan.split(n, move |kernel, cols| {
        let av = a.read_range(a_shape.off, a_shape.extent())?;
        let bv = b.read_range(b_shape.off, b_shape.extent())?;
        let sym = Sym {
            a: &av,
            mat: Mat::full(order, lda),
            uplo,
            herm,
            k: None,
        };
        let dense = sym.expand(order, ka);
        let gemm = symm_gemm(order, side, m, n, alpha, &dense, &bv, ldb, beta, ldc);
        let mut data = c.map_write();
        gemm.run(&kernel.tiles, Packing::Heap, &mut data[c_shape.off..c_shape.end()], cols)
    })
}

/// `C := alpha * A * B + beta * C` (Left) or `C := alpha * B * A + beta * C`
/// (Right) for a symmetric A given by its `uplo` triangle.
pub fn symm<T: Element>(
    order: Order,
    side: Side,
    uplo: Uplo,
    m: usize,
    n: usize,
    alpha: T,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    b: &Buffer<T>,
    off_b: usize,
    ldb: usize,
    beta: T,
    c: &Buffer<T>,
    off_c: usize,
    ldc: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    symm_impl(
        Routine::Symm, false, order, side, uplo, m, n, alpha, a, off_a, lda, b, off_b, ldb, beta,
        c, off_c, ldc, queues, wait,
    )
}

/// [`symm`] for a hermitian A.
pub fn hemm<T: Element>(
    order: Order,
    side: Side,
    uplo: Uplo,
    m: usize,
    n: usize,
    alpha: T,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    b: &Buffer<T>,
    off_b: usize,
    ldb: usize,
    beta: T,
    c: &Buffer<T>,
    off_c: usize,
    ldc: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    symm_impl(
        Routine::Hemm, true, order, side, uplo, m, n, alpha, a, off_a, lda, b, off_b, ldb, beta,
        c, off_c, ldc, queues, wait,
    )
}

// ============================================================================
// Rank-k updates
// ============================================================================

/// Transpose flavours each rank-k routine accepts.
fn check_rank_trans<T: Element>(herm: bool, trans: Transpose) -> Result<()> {
    let bad = match trans {
        Transpose::NoTrans => false,
        Transpose::Trans => herm && T::DTYPE.is_complex(),
        Transpose::ConjTrans => !herm && T::DTYPE.is_complex(),
    };
    if bad {
        let allowed = if herm { "NoTrans or ConjTrans" } else { "NoTrans or Trans" };
        return Err(Error::invalid_value("transA", format!("{trans:?} given, expected {allowed}")));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn rank_k_impl<T: Element>(
    routine: Routine,
    herm: bool,
    order: Order,
    uplo: Uplo,
    trans: Transpose,
    n: usize,
    k: usize,
    alpha: T,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    b: Option<(&Buffer<T>, usize, usize)>,
    beta: T,
    c: &Buffer<T>,
    off_c: usize,
    ldc: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::dims(&[("N", n), ("K", k)])?;
    check_rank_trans::<T>(herm, trans)?;
    let (ar, ac) = trans.stored_dims(n, k);
    let a_shape = MatShape::general(Operand::A, order, ar, ac, off_a, lda)?;
    let b_shape = b
        .map(|(_, off_b, ldb)| MatShape::general(Operand::B, order, ar, ac, off_b, ldb))
        .transpose()?;
    let c_shape = MatShape::general(Operand::C, order, n, n, off_c, ldc)?;
    validate::operand(a, Operand::A, a_shape.end(), Access::Read, queues)?;
    if let (Some((buf, ..)), Some(shape)) = (b, b_shape) {
        validate::operand(buf, Operand::B, shape.end(), Access::Read, queues)?;
    }
    validate::operand(c, Operand::C, c_shape.end(), Access::ReadWrite, queues)?;
    let plan = dispatch::plan::<T>(&lib, routine, Variant::Reference, queues, wait)?;

    let (a, c) = (a.clone(), c.clone());
    let b = b.map(|(buf, ..)| buf.clone()).zip(b_shape);
    plan.split(n, move |kernel, cols| {
        let av = a.read_range(a_shape.off, a_shape.extent())?;
        let bv = match &b {
            Some((buf, shape)) => Some((buf.read_range(shape.off, shape.extent())?, shape.ld)),
            None => None,
        };
        let rank = RankK {
            order,
            uplo,
            trans,
            n,
            k,
            alpha,
            a: &av,
            lda,
            b: bv.as_ref().map(|(v, ld)| (v.as_slice(), *ld)),
            beta,
            herm,
            ldc,
        };
        let mut data = c.map_write();
        rank.columns(cols, kernel.tiles.parallel_threshold, &mut data[c_shape.off..c_shape.end()]);
        Ok(())
    })
}

/// `C := alpha * op(A) * op(A)^T + beta * C` on the `uplo` triangle of an
/// `n x n` symmetric C; `op(A)` is `n x k`.
pub fn syrk<T: Element>(
    order: Order,
    uplo: Uplo,
    trans: Transpose,
    n: usize,
    k: usize,
    alpha: T,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    beta: T,
    c: &Buffer<T>,
    off_c: usize,
    ldc: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    rank_k_impl(
        Routine::Syrk, false, order, uplo, trans, n, k, alpha, a, off_a, lda, None, beta, c,
        off_c, ldc, queues, wait,
    )
}

/// `C := alpha * op(A) * op(A)^H + beta * C` for a hermitian C with real
/// `alpha` and `beta`. The diagonal of C comes out real.
pub fn herk<T: Element>(
    order: Order,
    uplo: Uplo,
    trans: Transpose,
    n: usize,
    k: usize,
    alpha: T::Real,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    beta: T::Real,
    c: &Buffer<T>,
    off_c: usize,
    ldc: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    rank_k_impl(
        Routine::Herk,
        true,
        order,
        uplo,
        trans,
        n,
        k,
        T::from_real(alpha),
        a,
        off_a,
        lda,
        None,
        T::from_real(beta),
        c,
        off_c,
        ldc,
        queues,
        wait,
    )
}

/// `C := alpha * op(A) * op(B)^T + alpha * op(B) * op(A)^T + beta * C` on
/// the `uplo` triangle of a symmetric C.
pub fn syr2k<T: Element>(
    order: Order,
    uplo: Uplo,
    trans: Transpose,
    n: usize,
    k: usize,
    alpha: T,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    b: &Buffer<T>,
    off_b: usize,
    ldb: usize,
    beta: T,
    c: &Buffer<T>,
    off_c: usize,
    ldc: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    rank_k_impl(
        Routine::Syr2k, false, order, uplo, trans, n, k, alpha, a, off_a, lda,
        Some((b, off_b, ldb)), beta, c, off_c, ldc, queues, wait,
    )
}

/// `C := alpha * op(A) * op(B)^H + conj(alpha) * op(B) * op(A)^H + beta * C`
/// for a hermitian C with real `beta`.
pub fn her2k<T: Element>(
    order: Order,
    uplo: Uplo,
    trans: Transpose,
    n: usize,
    k: usize,
    alpha: T,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    b: &Buffer<T>,
    off_b: usize,
    ldb: usize,
    beta: T::Real,
    c: &Buffer<T>,
    off_c: usize,
    ldc: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    rank_k_impl(
        Routine::Her2k, true, order, uplo, trans, n, k, alpha, a, off_a, lda,
        Some((b, off_b, ldb)), T::from_real(beta), c, off_c, ldc, queues, wait,
    )
}

// ============================================================================
// Triangular products and solves
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn tri_impl<T: Element>(
    routine: Routine,
    solve: bool,
    order: Order,
    side: Side,
    uplo: Uplo,
    trans: Transpose,
    diag: Diag,
    m: usize,
    n: usize,
    alpha: T,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    b: &Buffer<T>,
    off_b: usize,
    ldb: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::dims(&[("M", m), ("N", n)])?;
    let ka = match side {
        Side::Left => m,
        Side::Right => n,
    };
    let a_shape = MatShape::general(Operand::A, order, ka, ka, off_a, lda)?;
    let b_shape = MatShape::general(Operand::B, order, m, n, off_b, ldb)?;
    validate::operand(a, Operand::A, a_shape.end(), Access::Read, queues)?;
    validate::operand(b, Operand::B, b_shape.end(), Access::ReadWrite, queues)?;
    let plan = dispatch::plan::<T>(&lib, routine, Variant::Reference, queues, wait)?;

    let lines = match side {
        Side::Left => n,
        Side::Right => m,
    };
    let (a, b) = (a.clone(), b.clone());
    plan.split(lines, move |kernel, range| {
        let av = a.read_range(a_shape.off, a_shape.extent())?;
        let op = TriMat {
            side,
            tri: Tri::new(&av, Mat::full(order, lda), uplo, trans, diag),
            order,
            m,
            n,
            alpha,
            ldb,
            solve,
        };
        let mut data = b.map_write();
        op.lines(range, kernel.tiles.parallel_threshold, &mut data[b_shape.off..b_shape.end()]);
        Ok(())
    })
}

/// `B := alpha * op(A) * B` (Left) or `B := alpha * B * op(A)` (Right) for a triangular A.
pub fn trmm<T: Element>(
    order: Order,
    side: Side,
    uplo: Uplo,
    trans_a: Transpose,
    diag: Diag,
    m: usize,
    n: usize,
    alpha: T,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    b: &Buffer<T>,
    off_b: usize,
    ldb: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    tri_impl(
        Routine::Trmm, false, order, side, uplo, trans_a, diag, m, n, alpha, a, off_a, lda, b,
        off_b, ldb, queues, wait,
    )
}

/// Solve `op(A) * X = alpha * B` (Left) or `X * op(A) = alpha * B` (Right)
/// for a triangular A. B is overwritten with X.
pub fn trsm<T: Element>(
    order: Order,
    side: Side,
    uplo: Uplo,
    trans_a: Transpose,
    diag: Diag,
    m: usize,
    n: usize,
    alpha: T,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    b: &Buffer<T>,
    off_b: usize,
    ldb: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    tri_impl(
        Routine::Trsm, true, order, side, uplo, trans_a, diag, m, n, alpha, a, off_a, lda, b,
        off_b, ldb, queues, wait,
    )
}

// ============================================================================
// Typed wrappers
// ============================================================================

macro_rules! gemm_fns {
    ($($name:ident => $t:ty),+) => {$(
        #[doc = concat!("[`gemm`] for `", stringify!($t), "`.")]
        pub fn $name(
            order: Order,
            trans_a: Transpose,
            trans_b: Transpose,
            m: usize,
            n: usize,
            k: usize,
            alpha: $t,
            a: &Buffer<$t>,
            off_a: usize,
            lda: usize,
            b: &Buffer<$t>,
            off_b: usize,
            ldb: usize,
            beta: $t,
            c: &Buffer<$t>,
            off_c: usize,
            ldc: usize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            gemm::<$t>(
                order, trans_a, trans_b, m, n, k, alpha, a, off_a, lda, b, off_b, ldb, beta, c,
                off_c, ldc, queues, wait,
            )
        }
    )+};
}

gemm_fns!(sgemm => f32, dgemm => f64, cgemm => Complex32, zgemm => Complex64);

macro_rules! symm_fns {
    ($generic:ident: $($name:ident => $t:ty),+) => {$(
        #[doc = concat!("[`", stringify!($generic), "`] for `", stringify!($t), "`.")]
        pub fn $name(
            order: Order,
            side: Side,
            uplo: Uplo,
            m: usize,
            n: usize,
            alpha: $t,
            a: &Buffer<$t>,
            off_a: usize,
            lda: usize,
            b: &Buffer<$t>,
            off_b: usize,
            ldb: usize,
            beta: $t,
            c: &Buffer<$t>,
            off_c: usize,
            ldc: usize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            $generic::<$t>(
                order, side, uplo, m, n, alpha, a, off_a, lda, b, off_b, ldb, beta, c, off_c, ldc,
                queues, wait,
            )
        }
    )+};
}

symm_fns!(symm: ssymm => f32, dsymm => f64, csymm => Complex32, zsymm => Complex64);
symm_fns!(hemm: chemm => Complex32, zhemm => Complex64);

macro_rules! rank_k_fns {
    ($generic:ident: $($name:ident => $t:ty, $scalar:ty),+) => {$(
        #[doc = concat!("[`", stringify!($generic), "`] for `", stringify!($t), "`.")]
        pub fn $name(
            order: Order,
            uplo: Uplo,
            trans: Transpose,
            n: usize,
            k: usize,
            alpha: $scalar,
            a: &Buffer<$t>,
            off_a: usize,
            lda: usize,
            beta: $scalar,
            c: &Buffer<$t>,
            off_c: usize,
            ldc: usize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            $generic::<$t>(
                order, uplo, trans, n, k, alpha, a, off_a, lda, beta, c, off_c, ldc, queues, wait,
            )
        }
    )+};
}

rank_k_fns!(syrk: ssyrk => f32, f32, dsyrk => f64, f64, csyrk => Complex32, Complex32, zsyrk => Complex64, Complex64);
rank_k_fns!(herk: cherk => Complex32, f32, zherk => Complex64, f64);

macro_rules! rank_2k_fns {
    ($generic:ident: $($name:ident => $t:ty, $beta:ty),+) => {$(
        #[doc = concat!("[`", stringify!($generic), "`] for `", stringify!($t), "`.")]
        pub fn $name(
            order: Order,
            uplo: Uplo,
            trans: Transpose,
            n: usize,
            k: usize,
            alpha: $t,
            a: &Buffer<$t>,
            off_a: usize,
            lda: usize,
            b: &Buffer<$t>,
            off_b: usize,
            ldb: usize,
            beta: $beta,
            c: &Buffer<$t>,
            off_c: usize,
            ldc: usize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            $generic::<$t>(
                order, uplo, trans, n, k, alpha, a, off_a, lda, b, off_b, ldb, beta, c, off_c, ldc,
                queues, wait,
            )
        }
    )+};
}

rank_2k_fns!(syr2k: ssyr2k => f32, f32, dsyr2k => f64, f64, csyr2k => Complex32, Complex32, zsyr2k => Complex64, Complex64);
rank_2k_fns!(her2k: cher2k => Complex32, f32, zher2k => Complex64, f64);

macro_rules! tri_fns {
    ($generic:ident: $($name:ident => $t:ty),+) => {$(
        #[doc = concat!("[`", stringify!($generic), "`] for `", stringify!($t), "`.")]
        pub fn $name(
            order: Order,
            side: Side,
            uplo: Uplo,
            trans_a: Transpose,
            diag: Diag,
            m: usize,
            n: usize,
            alpha: $t,
            a: &Buffer<$t>,
            off_a: usize,
            lda: usize,
            b: &Buffer<$t>,
            off_b: usize,
            ldb: usize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            $generic::<$t>(
                order, side, uplo, trans_a, diag, m, n, alpha, a, off_a, lda, b, off_b, ldb,
                queues, wait,
            )
        }
    )+};
}

tri_fns!(trmm: strmm => f32, dtrmm => f64, ctrmm => Complex32, ztrmm => Complex64);
tri_fns!(trsm: strsm => f32, dtrsm => f64, ctrsm => Complex32, ztrsm => Complex64);

#[cfg(test)]
mod tests {
    use super::*;
    use qblas_core::{Context, MemFlags, Status};

    fn env() -> (Context, CommandQueue) {
        state::setup().unwrap();
        let ctx = Context::host();
        let queue = CommandQueue::default_for(&ctx).unwrap();
        (ctx, queue)
    }

    fn buf<T: Element>(ctx: &Context, data: &[T]) -> Buffer<T> {
        Buffer::from_slice(ctx, MemFlags::ReadWrite, data).unwrap()
    }

    #[test]
    fn test_sgemm_small() {
        let (ctx, q) = env();
        // [[1,2],[3,4]] * [[5,6],[7,8]] row-major
        let a = buf(&ctx, &[1.0f32, 2.0, 3.0, 4.0]);
        let b = buf(&ctx, &[5.0f32, 6.0, 7.0, 8.0]);
        let c = buf(&ctx, &[0.0f32; 4]);
        let events = sgemm(
            Order::RowMajor, Transpose::NoTrans, Transpose::NoTrans, 2, 2, 2, 1.0, &a, 0, 2, &b,
            0, 2, 0.0, &c, 0, 2, &[q], &[],
        )
        .unwrap();
        Event::wait_all(&events).unwrap();
        assert_eq!(c.to_vec(), vec![19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_gemm_lead_dim_of_transposed_operand() {
        let (ctx, q) = env();
        let a = buf(&ctx, &[0.0f32; 64]);
        let b = buf(&ctx, &[0.0f32; 64]);
        let c = buf(&ctx, &[0.0f32; 64]);
        // op(A) = A^T is 4x2, so A is stored 2x4 row-major and needs lda >= 4
        let err = sgemm(
            Order::RowMajor, Transpose::Trans, Transpose::NoTrans, 4, 4, 2, 1.0, &a, 0, 2, &b, 0,
            4, 0.0, &c, 0, 4, &[q], &[],
        )
        .unwrap_err();
        assert_eq!(err.status(), Status::InvalidLeadDimA);
    }

    #[test]
    fn test_herk_rejects_plain_transpose() {
        let (ctx, q) = env();
        let a = buf(&ctx, &[Complex32::new(1.0, 0.0); 4]);
        let c = buf(&ctx, &[Complex32::new(0.0, 0.0); 4]);
        let err = cherk(
            Order::ColumnMajor, Uplo::Upper, Transpose::Trans, 2, 2, 1.0, &a, 0, 2, 0.0, &c, 0, 2,
            &[q.clone()], &[],
        )
        .unwrap_err();
        assert_eq!(err.status(), Status::InvalidValue);
        let err = csyrk(
            Order::ColumnMajor, Uplo::Upper, Transpose::ConjTrans, 2, 2, Complex32::new(1.0, 0.0),
            &a, 0, 2, Complex32::new(0.0, 0.0), &c, 0, 2, &[q], &[],
        )
        .unwrap_err();
        assert_eq!(err.status(), Status::InvalidValue);
    }

    #[test]
    fn test_trsm_right_split_over_queues() {
        let (ctx, q0) = env();
        let q1 = CommandQueue::default_for(&ctx).unwrap();
        // lower [[2,0],[1,1]] column-major; B (3x2) = X * A with X = [[1,2],[3,4],[5,6]]
        let a = buf(&ctx, &[2.0f64, 1.0, 0.0, 1.0]);
        // X * A = [[1*2+2*1, 2], [3*2+4, 4], [5*2+6, 6]] column-major
        let b = buf(&ctx, &[4.0f64, 10.0, 16.0, 2.0, 4.0, 6.0]);
        let events = dtrsm(
            Order::ColumnMajor, Side::Right, Uplo::Lower, Transpose::NoTrans, Diag::NonUnit, 3, 2,
            1.0, &a, 0, 2, &b, 0, 3, &[q0, q1], &[],
        )
        .unwrap();
        assert_eq!(events.len(), 2);
        Event::wait_all(&events).unwrap();
        assert_eq!(b.to_vec(), vec![1.0, 3.0, 5.0, 2.0, 4.0, 6.0]);
    }
}
