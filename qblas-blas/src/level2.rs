//! BLAS Level 2: matrix-vector operations.
//!
//! `gemv` and `gbmv` split the rows of y across the queues; everything else
//! runs on the first queue. Symmetric, hermitian and triangular operands come
//! in full (`ld`), packed and band storage and share one implementation per
//! operation.

use crate::dispatch::{self, Routine, Variant};
use crate::kernels::level2::{self as k, Gemv};
use crate::kernels::{Mat, Stride, Sym, Tri};
use crate::level1::load;
use crate::state;
use crate::validate::{self, Access, MatShape, VecShape};
use qblas_core::{
    Buffer, CommandQueue, Complex32, Complex64, Diag, Element, Event, Operand, Order, Result,
    Transpose, Uplo,
};

/// Storage of a square symmetric, hermitian or triangular A.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Full { ld: usize },
    Packed,
    Band { k: usize, ld: usize },
}

impl Layout {
    /// Check band width and leading dimension; returns the extent of A.
    fn extent(self, order: Order, uplo: Uplo, n: usize, off: usize) -> Result<usize> {
        match self {
            Layout::Full { ld } => Ok(MatShape::general(Operand::A, order, n, n, off, ld)?.extent()),
            Layout::Packed => Ok(validate::packed_len(n)),
            Layout::Band { k, ld } => {
                validate::band_width("K", k, n)?;
                let (kl, ku) = match uplo {
                    Uplo::Upper => (0, k),
                    Uplo::Lower => (k, 0),
                };
                Ok(MatShape::band(Operand::A, order, n, n, kl, ku, off, ld)?.extent())
            }
        }
    }

    fn mat(self, order: Order, uplo: Uplo, n: usize) -> Mat {
        match self {
            Layout::Full { ld } => Mat::full(order, ld),
            Layout::Packed => Mat::packed(order, n, uplo),
            Layout::Band { k, ld } => Mat::tri_band(order, uplo, k, ld),
        }
    }

    fn band(self) -> Option<usize> {
        match self {
            Layout::Band { k, .. } => Some(k),
            _ => None,
        }
    }
}

// ============================================================================
// General matrix-vector products
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn gemv_impl<T: Element>(
    routine: Routine,
    order: Order,
    trans: Transpose,
    m: usize,
    n: usize,
    band: Option<(usize, usize)>,
    alpha: T,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    beta: T,
    y: &Buffer<T>,
    off_y: usize,
    inc_y: isize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::dims(&[("M", m), ("N", n)])?;
    let a_shape = match band {
        None => MatShape::general(Operand::A, order, m, n, off_a, lda)?,
        Some((kl, ku)) => {
            validate::band_width("KL", kl, m)?;
            validate::band_width("KU", ku, n)?;
            MatShape::band(Operand::A, order, m, n, kl, ku, off_a, lda)?
        }
    };
    let (x_len, y_len) = if trans.is_transposed() { (m, n) } else { (n, m) };
    let xs = VecShape::new(Operand::X, x_len, off_x, inc_x)?;
    let ys = VecShape::new(Operand::Y, y_len, off_y, inc_y)?;
    validate::operand(a, Operand::A, a_shape.end(), Access::Read, queues)?;
    validate::operand(x, Operand::X, xs.end(), Access::Read, queues)?;
    validate::operand(y, Operand::Y, ys.end(), Access::ReadWrite, queues)?;
    let plan = dispatch::plan::<T>(&lib, routine, Variant::Reference, queues, wait)?;

    let mat = match band {
        None => Mat::full(order, lda),
        Some((kl, ku)) => Mat::band(order, kl, ku, lda),
    };
    let (a, x, y) = (a.clone(), x.clone(), y.clone());
    plan.split(y_len, move |_, rows| {
        let av = a.read_range(a_shape.off, a_shape.extent())?;
        let xv = load(&x, &xs)?;
        let gemv = Gemv {
            mat,
            trans,
            m,
            n,
            band,
            alpha,
            a: &av,
            beta,
        };
        let mut data = y.map_write();
        gemv.rows(rows, &xv, &mut data[ys.off..ys.end()], Stride::of(&ys));
        Ok(())
    })
}

/// `y := alpha * op(A) * x + beta * y` for a general `m x n` A.
pub fn gemv<T: Element>(
    order: Order,
    trans: Transpose,
    m: usize,
    n: usize,
    alpha: T,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    beta: T,
    y: &Buffer<T>,
    off_y: usize,
    inc_y: isize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    gemv_impl(
        Routine::Gemv, order, trans, m, n, None, alpha, a, off_a, lda, x, off_x, inc_x, beta, y,
        off_y, inc_y, queues, wait,
    )
}

/// `y := alpha * op(A) * x + beta * y` for an `m x n` band A with `kl`
/// sub- and `ku` super-diagonals.
pub fn gbmv<T: Element>(
    order: Order,
    trans: Transpose,
    m: usize,
    n: usize,
    kl: usize,
    ku: usize,
    alpha: T,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    beta: T,
    y: &Buffer<T>,
    off_y: usize,
    inc_y: isize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    gemv_impl(
        Routine::Gbmv,
        order,
        trans,
        m,
        n,
        Some((kl, ku)),
        alpha,
        a,
        off_a,
        lda,
        x,
        off_x,
        inc_x,
        beta,
        y,
        off_y,
        inc_y,
        queues,
        wait,
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
    uplo: Uplo,
    trans: Transpose,
    diag: Diag,
    n: usize,
    layout: Layout,
    a: &Buffer<T>,
    off_a: usize,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::dims(&[("N", n)])?;
    let a_extent = layout.extent(order, uplo, n, off_a)?;
    let xs = VecShape::new(Operand::X, n, off_x, inc_x)?;
    validate::operand(a, Operand::A, off_a.saturating_add(a_extent), Access::Read, queues)?;
    validate::operand(x, Operand::X, xs.end(), Access::ReadWrite, queues)?;
    let plan = dispatch::plan::<T>(&lib, routine, Variant::Reference, queues, wait)?;

    let mat = layout.mat(order, uplo, n);
    let (a, x) = (a.clone(), x.clone());
    plan.single(move |_| {
        let av = a.read_range(off_a, a_extent)?;
        let mut tri = Tri::new(&av, mat, uplo, trans, diag);
        if let Some(k) = layout.band() {
            tri = tri.banded(k);
        }
        let mut data = x.map_write();
        let xv = &mut data[xs.off..xs.end()];
        if solve {
            k::trsv(&tri, n, xv, Stride::of(&xs));
        } else {
            k::trmv(&tri, n, xv, Stride::of(&xs));
        }
        Ok(())
    })
}

macro_rules! tri_generic {
    ($(#[$doc:meta])* $name:ident, $routine:ident, $solve:expr, full) => {
        $(#[$doc])*
        #[allow(clippy::too_many_arguments)]
        pub fn $name<T: Element>(
            order: Order,
            uplo: Uplo,
            trans: Transpose,
            diag: Diag,
            n: usize,
            a: &Buffer<T>,
            off_a: usize,
            lda: usize,
            x: &Buffer<T>,
            off_x: usize,
            inc_x: isize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            tri_impl(
                Routine::$routine, $solve, order, uplo, trans, diag, n, Layout::Full { ld: lda },
                a, off_a, x, off_x, inc_x, queues, wait,
            )
        }
    };
    ($(#[$doc:meta])* $name:ident, $routine:ident, $solve:expr, packed) => {
        $(#[$doc])*
        #[allow(clippy::too_many_arguments)]
        pub fn $name<T: Element>(
            order: Order,
            uplo: Uplo,
            trans: Transpose,
            diag: Diag,
            n: usize,
            ap: &Buffer<T>,
            off_a: usize,
            x: &Buffer<T>,
            off_x: usize,
            inc_x: isize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            tri_impl(
                Routine::$routine, $solve, order, uplo, trans, diag, n, Layout::Packed, ap, off_a,
                x, off_x, inc_x, queues, wait,
            )
        }
    };
    ($(#[$doc:meta])* $name:ident, $routine:ident, $solve:expr, band) => {
        $(#[$doc])*
        #[allow(clippy::too_many_arguments)]
        pub fn $name<T: Element>(
            order: Order,
            uplo: Uplo,
            trans: Transpose,
            diag: Diag,
            n: usize,
            k: usize,
            a: &Buffer<T>,
            off_a: usize,
            lda: usize,
            x: &Buffer<T>,
            off_x: usize,
            inc_x: isize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            tri_impl(
                Routine::$routine, $solve, order, uplo, trans, diag, n, Layout::Band { k, ld: lda },
                a, off_a, x, off_x, inc_x, queues, wait,
            )
        }
    };
}

tri_generic!(
    /// `x := op(A) * x` for a triangular A.
    trmv, Trmv, false, full
);
tri_generic!(
    /// Solve `op(A) * x = b` for a triangular A; b is overwritten with x.
    trsv, Trsv, true, full
);
tri_generic!(
    /// [`trmv`] with A in packed storage.
    tpmv, Tpmv, false, packed
);
tri_generic!(
    /// [`trsv`] with A in packed storage.
    tpsv, Tpsv, true, packed
);
tri_generic!(
    /// [`trmv`] with A in band storage with `k` off-diagonals.
    tbmv, Tbmv, false, band
);
tri_generic!(
    /// [`trsv`] with A in band storage with `k` off-diagonals.
    tbsv, Tbsv, true, band
);

// ============================================================================
// Symmetric and hermitian products
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn symv_impl<T: Element>(
    routine: Routine,
    herm: bool,
    order: Order,
    uplo: Uplo,
    n: usize,
    layout: Layout,
    alpha: T,
    a: &Buffer<T>,
    off_a: usize,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    beta: T,
    y: &Buffer<T>,
    off_y: usize,
    inc_y: isize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::dims(&[("N", n)])?;
    let a_extent = layout.extent(order, uplo, n, off_a)?;
    let xs = VecShape::new(Operand::X, n, off_x, inc_x)?;
    let ys = VecShape::new(Operand::Y, n, off_y, inc_y)?;
    validate::operand(a, Operand::A, off_a.saturating_add(a_extent), Access::Read, queues)?;
    validate::operand(x, Operand::X, xs.end(), Access::Read, queues)?;
    validate::operand(y, Operand::Y, ys.end(), Access::ReadWrite, queues)?;
    let plan = dispatch::plan::<T>(&lib, routine, Variant::Reference, queues, wait)?;

    let mat = layout.mat(order, uplo, n);
    let (a, x, y) = (a.clone(), x.clone(), y.clone());
    plan.single(move |_| {
        let av = a.read_range(off_a, a_extent)?;
        let xv = load(&x, &xs)?;
        let sym = Sym {
            a: &av,
            mat,
            uplo,
            herm,
            k: layout.band(),
        };
        let mut data = y.map_write();
        k::symv(&sym, n, alpha, &xv, beta, &mut data[ys.off..ys.end()], Stride::of(&ys));
        Ok(())
    })
}

macro_rules! sym_generic {
    ($(#[$doc:meta])* $name:ident, $routine:ident, $herm:expr, full) => {
        $(#[$doc])*
        #[allow(clippy::too_many_arguments)]
        pub fn $name<T: Element>(
            order: Order,
            uplo: Uplo,
            n: usize,
            alpha: T,
            a: &Buffer<T>,
            off_a: usize,
            lda: usize,
            x: &Buffer<T>,
            off_x: usize,
            inc_x: isize,
            beta: T,
            y: &Buffer<T>,
            off_y: usize,
            inc_y: isize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            symv_impl(
                Routine::$routine, $herm, order, uplo, n, Layout::Full { ld: lda }, alpha, a,
                off_a, x, off_x, inc_x, beta, y, off_y, inc_y, queues, wait,
            )
        }
    };
    ($(#[$doc:meta])* $name:ident, $routine:ident, $herm:expr, packed) => {
        $(#[$doc])*
        #[allow(clippy::too_many_arguments)]
        pub fn $name<T: Element>(
            order: Order,
            uplo: Uplo,
            n: usize,
            alpha: T,
            ap: &Buffer<T>,
            off_a: usize,
            x: &Buffer<T>,
            off_x: usize,
            inc_x: isize,
            beta: T,
            y: &Buffer<T>,
            off_y: usize,
            inc_y: isize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            symv_impl(
                Routine::$routine, $herm, order, uplo, n, Layout::Packed, alpha, ap, off_a, x,
                off_x, inc_x, beta, y, off_y, inc_y, queues, wait,
            )
        }
    };
    ($(#[$doc:meta])* $name:ident, $routine:ident, $herm:expr, band) => {
        $(#[$doc])*
        #[allow(clippy::too_many_arguments)]
        pub fn $name<T: Element>(
            order: Order,
            uplo: Uplo,
            n: usize,
            k: usize,
            alpha: T,
            a: &Buffer<T>,
            off_a: usize,
            lda: usize,
            x: &Buffer<T>,
            off_x: usize,
            inc_x: isize,
            beta: T,
            y: &Buffer<T>,
            off_y: usize,
            inc_y: isize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            symv_impl(
                Routine::$routine, $herm, order, uplo, n, Layout::Band { k, ld: lda }, alpha, a,
                off_a, x, off_x, inc_x, beta, y, off_y, inc_y, queues, wait,
            )
        }
    };
}

sym_generic!(
    /// `y := alpha * A * x + beta * y` for a symmetric A.
    symv, Symv, false, full
);
sym_generic!(
    /// [`symv`] with A in packed storage.
    spmv, Spmv, false, packed
);
sym_generic!(
    /// [`symv`] with A in band storage with `k` off-diagonals.
    sbmv, Sbmv, false, band
);
sym_generic!(
    /// `y := alpha * A * x + beta * y` for a hermitian A. The imaginary
    /// part of the diagonal is ignored.
    hemv, Hemv, true, full
);
sym_generic!(
    /// [`hemv`] with A in packed storage.
    hpmv, Hpmv, true, packed
);
sym_generic!(
    /// [`hemv`] with A in band storage with `k` off-diagonals.
    hbmv, Hbmv, true, band
);

// ============================================================================
// Rank updates
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn ger_impl<T: Element>(
    routine: Routine,
    conj: bool,
    order: Order,
    m: usize,
    n: usize,
    alpha: T,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    y: &Buffer<T>,
    off_y: usize,
    inc_y: isize,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::dims(&[("M", m), ("N", n)])?;
    let a_shape = MatShape::general(Operand::A, order, m, n, off_a, lda)?;
    let xs = VecShape::new(Operand::X, m, off_x, inc_x)?;
    let ys = VecShape::new(Operand::Y, n, off_y, inc_y)?;
    validate::operand(x, Operand::X, xs.end(), Access::Read, queues)?;
    validate::operand(y, Operand::Y, ys.end(), Access::Read, queues)?;
    validate::operand(a, Operand::A, a_shape.end(), Access::ReadWrite, queues)?;
    let plan = dispatch::plan::<T>(&lib, routine, Variant::Reference, queues, wait)?;

    let (x, y, a) = (x.clone(), y.clone(), a.clone());
    plan.single(move |_| {
        let (xv, yv) = (load(&x, &xs)?, load(&y, &ys)?);
        let mut data = a.map_write();
        let av = &mut data[a_shape.off..a_shape.end()];
        k::ger(&Mat::full(order, lda), m, n, alpha, &xv, &yv, conj, av);
        Ok(())
    })
}

/// `A := alpha * x * y^T + A`. For complex types this is `geru`.
pub fn ger<T: Element>(
    order: Order,
    m: usize,
    n: usize,
    alpha: T,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    y: &Buffer<T>,
    off_y: usize,
    inc_y: isize,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    ger_impl(
        Routine::Ger, false, order, m, n, alpha, x, off_x, inc_x, y, off_y, inc_y, a, off_a, lda,
        queues, wait,
    )
}

/// `A := alpha * x * y^H + A`.
pub fn gerc<T: Element>(
    order: Order,
    m: usize,
    n: usize,
    alpha: T,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    y: &Buffer<T>,
    off_y: usize,
    inc_y: isize,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    ger_impl(
        Routine::Gerc, true, order, m, n, alpha, x, off_x, inc_x, y, off_y, inc_y, a, off_a, lda,
        queues, wait,
    )
}

/// Symmetric/hermitian rank-1 (`y` unset) or rank-2 update of the stored triangle.
#[allow(clippy::too_many_arguments)]
fn rank_impl<T: Element>(
    routine: Routine,
    herm: bool,
    order: Order,
    uplo: Uplo,
    n: usize,
    alpha: T,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    y: Option<(&Buffer<T>, usize, isize)>,
    layout: Layout,
    a: &Buffer<T>,
    off_a: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::dims(&[("N", n)])?;
    let a_extent = layout.extent(order, uplo, n, off_a)?;
    let xs = VecShape::new(Operand::X, n, off_x, inc_x)?;
    let ys = y
        .map(|(_, off, inc)| VecShape::new(Operand::Y, n, off, inc))
        .transpose()?;
    validate::operand(x, Operand::X, xs.end(), Access::Read, queues)?;
    if let (Some((buf, ..)), Some(ys)) = (y, ys) {
        validate::operand(buf, Operand::Y, ys.end(), Access::Read, queues)?;
    }
    validate::operand(a, Operand::A, off_a.saturating_add(a_extent), Access::ReadWrite, queues)?;
    let plan = dispatch::plan::<T>(&lib, routine, Variant::Reference, queues, wait)?;

    let mat = layout.mat(order, uplo, n);
    let (x, a) = (x.clone(), a.clone());
    let y = y.map(|(buf, ..)| buf.clone()).zip(ys);
    plan.single(move |_| {
        let xv = load(&x, &xs)?;
        let yv = y.as_ref().map(|(buf, ys)| load(buf, ys)).transpose()?;
        let mut data = a.map_write();
        let av = &mut data[off_a..off_a + a_extent];
        match yv {
            None => k::syr(&mat, uplo, n, alpha, &xv, herm, av),
            Some(yv) => k::syr2(&mat, uplo, n, alpha, &xv, &yv, herm, av),
        }
        Ok(())
    })
}

/// `A := alpha * x * x^T + A` for a symmetric A.
pub fn syr<T: Element>(
    order: Order,
    uplo: Uplo,
    n: usize,
    alpha: T,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    rank_impl(
        Routine::Syr, false, order, uplo, n, alpha, x, off_x, inc_x, None,
        Layout::Full { ld: lda }, a, off_a, queues, wait,
    )
}

/// [`syr`] with A in packed storage.
pub fn spr<T: Element>(
    order: Order,
    uplo: Uplo,
    n: usize,
    alpha: T,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    ap: &Buffer<T>,
    off_a: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    rank_impl(
        Routine::Spr, false, order, uplo, n, alpha, x, off_x, inc_x, None, Layout::Packed, ap,
        off_a, queues, wait,
    )
}

/// `A := alpha * x * x^H + A` for a hermitian A with a real `alpha`.
pub fn her<T: Element>(
    order: Order,
    uplo: Uplo,
    n: usize,
    alpha: T::Real,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    rank_impl(
        Routine::Her, true, order, uplo, n, T::from_real(alpha), x, off_x, inc_x, None,
        Layout::Full { ld: lda }, a, off_a, queues, wait,
    )
}

/// [`her`] with A in packed storage.
pub fn hpr<T: Element>(
    order: Order,
    uplo: Uplo,
    n: usize,
    alpha: T::Real,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    ap: &Buffer<T>,
    off_a: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    rank_impl(
        Routine::Hpr, true, order, uplo, n, T::from_real(alpha), x, off_x, inc_x, None,
        Layout::Packed, ap, off_a, queues, wait,
    )
}

/// `A := alpha * x * y^T + alpha * y * x^T + A` for a symmetric A.
pub fn syr2<T: Element>(
    order: Order,
    uplo: Uplo,
    n: usize,
    alpha: T,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    y: &Buffer<T>,
    off_y: usize,
    inc_y: isize,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    rank_impl(
        Routine::Syr2, false, order, uplo, n, alpha, x, off_x, inc_x, Some((y, off_y, inc_y)),
        Layout::Full { ld: lda }, a, off_a, queues, wait,
    )
}

/// [`syr2`] with A in packed storage.
pub fn spr2<T: Element>(
    order: Order,
    uplo: Uplo,
    n: usize,
    alpha: T,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    y: &Buffer<T>,
    off_y: usize,
    inc_y: isize,
    ap: &Buffer<T>,
    off_a: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    rank_impl(
        Routine::Spr2, false, order, uplo, n, alpha, x, off_x, inc_x, Some((y, off_y, inc_y)),
        Layout::Packed, ap, off_a, queues, wait,
    )
}

/// `A := alpha * x * y^H + conj(alpha) * y * x^H + A` for a hermitian A.
pub fn her2<T: Element>(
    order: Order,
    uplo: Uplo,
    n: usize,
    alpha: T,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    y: &Buffer<T>,
    off_y: usize,
    inc_y: isize,
    a: &Buffer<T>,
    off_a: usize,
    lda: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    rank_impl(
        Routine::Her2, true, order, uplo, n, alpha, x, off_x, inc_x, Some((y, off_y, inc_y)),
        Layout::Full { ld: lda }, a, off_a, queues, wait,
    )
}

/// [`her2`] with A in packed storage.
pub fn hpr2<T: Element>(
    order: Order,
    uplo: Uplo,
    n: usize,
    alpha: T,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    y: &Buffer<T>,
    off_y: usize,
    inc_y: isize,
    ap: &Buffer<T>,
    off_a: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    rank_impl(
        Routine::Hpr2, true, order, uplo, n, alpha, x, off_x, inc_x, Some((y, off_y, inc_y)),
        Layout::Packed, ap, off_a, queues, wait,
    )
}

// ============================================================================
// Typed wrappers
// ============================================================================

macro_rules! gemv_fns {
    ($($name:ident => $t:ty),+) => {$(
        #[doc = concat!("[`gemv`] for `", stringify!($t), "`.")]
        pub fn $name(
            order: Order,
            trans: Transpose,
            m: usize,
            n: usize,
            alpha: $t,
            a: &Buffer<$t>,
            off_a: usize,
            lda: usize,
            x: &Buffer<$t>,
            off_x: usize,
            inc_x: isize,
            beta: $t,
            y: &Buffer<$t>,
            off_y: usize,
            inc_y: isize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            gemv::<$t>(
                order, trans, m, n, alpha, a, off_a, lda, x, off_x, inc_x, beta, y, off_y, inc_y,
                queues, wait,
            )
        }
    )+};
}

gemv_fns!(sgemv => f32, dgemv => f64, cgemv => Complex32, zgemv => Complex64);

macro_rules! gbmv_fns {
    ($($name:ident => $t:ty),+) => {$(
        #[doc = concat!("[`gbmv`] for `", stringify!($t), "`.")]
        pub fn $name(
            order: Order,
            trans: Transpose,
            m: usize,
            n: usize,
            kl: usize,
            ku: usize,
            alpha: $t,
            a: &Buffer<$t>,
            off_a: usize,
            lda: usize,
            x: &Buffer<$t>,
            off_x: usize,
            inc_x: isize,
            beta: $t,
            y: &Buffer<$t>,
            off_y: usize,
            inc_y: isize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            gbmv::<$t>(
                order, trans, m, n, kl, ku, alpha, a, off_a, lda, x, off_x, inc_x, beta, y, off_y,
                inc_y, queues, wait,
            )
        }
    )+};
}

gbmv_fns!(sgbmv => f32, dgbmv => f64, cgbmv => Complex32, zgbmv => Complex64);

macro_rules! tri_full_fns {
    ($generic:ident: $($name:ident => $t:ty),+) => {$(
        #[doc = concat!("[`", stringify!($generic), "`] for `", stringify!($t), "`.")]
        pub fn $name(
            order: Order,
            uplo: Uplo,
            trans: Transpose,
            diag: Diag,
            n: usize,
            a: &Buffer<$t>,
            off_a: usize,
            lda: usize,
            x: &Buffer<$t>,
            off_x: usize,
            inc_x: isize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            $generic::<$t>(order, uplo, trans, diag, n, a, off_a, lda, x, off_x, inc_x, queues, wait)
        }
    )+};
}

tri_full_fns!(trmv: strmv => f32, dtrmv => f64, ctrmv => Complex32, ztrmv => Complex64);
tri_full_fns!(trsv: strsv => f32, dtrsv => f64, ctrsv => Complex32, ztrsv => Complex64);

macro_rules! tri_packed_fns {
    ($generic:ident: $($name:ident => $t:ty),+) => {$(
        #[doc = concat!("[`", stringify!($generic), "`] for `", stringify!($t), "`.")]
        pub fn $name(
            order: Order,
            uplo: Uplo,
            trans: Transpose,
            diag: Diag,
            n: usize,
            ap: &Buffer<$t>,
            off_a: usize,
            x: &Buffer<$t>,
            off_x: usize,
            inc_x: isize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            $generic::<$t>(order, uplo, trans, diag, n, ap, off_a, x, off_x, inc_x, queues, wait)
        }
    )+};
}

tri_packed_fns!(tpmv: stpmv => f32, dtpmv => f64, ctpmv => Complex32, ztpmv => Complex64);
tri_packed_fns!(tpsv: stpsv => f32, dtpsv => f64, ctpsv => Complex32, ztpsv => Complex64);

macro_rules! tri_band_fns {
    ($generic:ident: $($name:ident => $t:ty),+) => {$(
        #[doc = concat!("[`", stringify!($generic), "`] for `", stringify!($t), "`.")]
        pub fn $name(
            order: Order,
            uplo: Uplo,
            trans: Transpose,
            diag: Diag,
            n: usize,
            k: usize,
            a: &Buffer<$t>,
            off_a: usize,
            lda: usize,
            x: &Buffer<$t>,
            off_x: usize,
            inc_x: isize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            $generic::<$t>(order, uplo, trans, diag, n, k, a, off_a, lda, x, off_x, inc_x, queues, wait)
        }
    )+};
}

tri_band_fns!(tbmv: stbmv => f32, dtbmv => f64, ctbmv => Complex32, ztbmv => Complex64);
tri_band_fns!(tbsv: stbsv => f32, dtbsv => f64, ctbsv => Complex32, ztbsv => Complex64);

macro_rules! sym_full_fns {
    ($generic:ident: $($name:ident => $t:ty),+) => {$(
        #[doc = concat!("[`", stringify!($generic), "`] for `", stringify!($t), "`.")]
        pub fn $name(
            order: Order,
            uplo: Uplo,
            n: usize,
            alpha: $t,
            a: &Buffer<$t>,
            off_a: usize,
            lda: usize,
            x: &Buffer<$t>,
            off_x: usize,
            inc_x: isize,
            beta: $t,
            y: &Buffer<$t>,
            off_y: usize,
            inc_y: isize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            $generic::<$t>(
                order, uplo, n, alpha, a, off_a, lda, x, off_x, inc_x, beta, y, off_y, inc_y,
                queues, wait,
            )
        }
    )+};
}

sym_full_fns!(symv: ssymv => f32, dsymv => f64);
sym_full_fns!(hemv: chemv => Complex32, zhemv => Complex64);

macro_rules! sym_packed_fns {
    ($generic:ident: $($name:ident => $t:ty),+) => {$(
        #[doc = concat!("[`", stringify!($generic), "`] for `", stringify!($t), "`.")]
        pub fn $name(
            order: Order,
            uplo: Uplo,
            n: usize,
            alpha: $t,
            ap: &Buffer<$t>,
            off_a: usize,
            x: &Buffer<$t>,
            off_x: usize,
            inc_x: isize,
            beta: $t,
            y: &Buffer<$t>,
            off_y: usize,
            inc_y: isize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            $generic::<$t>(
                order, uplo, n, alpha, ap, off_a, x, off_x, inc_x, beta, y, off_y, inc_y, queues,
                wait,
            )
        }
    )+};
}

sym_packed_fns!(spmv: sspmv => f32, dspmv => f64);
sym_packed_fns!(hpmv: chpmv => Complex32, zhpmv => Complex64);

macro_rules! sym_band_fns {
    ($generic:ident: $($name:ident => $t:ty),+) => {$(
        #[doc = concat!("[`", stringify!($generic), "`] for `", stringify!($t), "`.")]
        pub fn $name(
            order: Order,
            uplo: Uplo,
            n: usize,
            k: usize,
            alpha: $t,
            a: &Buffer<$t>,
            off_a: usize,
            lda: usize,
            x: &Buffer<$t>,
            off_x: usize,
            inc_x: isize,
            beta: $t,
            y: &Buffer<$t>,
            off_y: usize,
            inc_y: isize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            $generic::<$t>(
                order, uplo, n, k, alpha, a, off_a, lda, x, off_x, inc_x, beta, y, off_y, inc_y,
                queues, wait,
            )
        }
    )+};
}

sym_band_fns!(sbmv: ssbmv => f32, dsbmv => f64);
sym_band_fns!(hbmv: chbmv => Complex32, zhbmv => Complex64);

macro_rules! ger_fns {
    ($generic:ident: $($name:ident => $t:ty),+) => {$(
        #[doc = concat!("[`", stringify!($generic), "`] for `", stringify!($t), "`.")]
        pub fn $name(
            order: Order,
            m: usize,
            n: usize,
            alpha: $t,
            x: &Buffer<$t>,
            off_x: usize,
            inc_x: isize,
            y: &Buffer<$t>,
            off_y: usize,
            inc_y: isize,
            a: &Buffer<$t>,
            off_a: usize,
            lda: usize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            $generic::<$t>(
                order, m, n, alpha, x, off_x, inc_x, y, off_y, inc_y, a, off_a, lda, queues, wait,
            )
        }
    )+};
}

ger_fns!(ger: sger => f32, dger => f64, cgeru => Complex32, zgeru => Complex64);
ger_fns!(gerc: cgerc => Complex32, zgerc => Complex64);

macro_rules! rank1_full_fns {
    ($generic:ident: $($name:ident => $t:ty, $alpha:ty),+) => {$(
        #[doc = concat!("[`", stringify!($generic), "`] for `", stringify!($t), "`.")]
        pub fn $name(
            order: Order,
            uplo: Uplo,
            n: usize,
            alpha: $alpha,
            x: &Buffer<$t>,
            off_x: usize,
            inc_x: isize,
            a: &Buffer<$t>,
            off_a: usize,
            lda: usize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            $generic::<$t>(order, uplo, n, alpha, x, off_x, inc_x, a, off_a, lda, queues, wait)
        }
    )+};
}

rank1_full_fns!(syr: ssyr => f32, f32, dsyr => f64, f64);
rank1_full_fns!(her: cher => Complex32, f32, zher => Complex64, f64);

macro_rules! rank1_packed_fns {
    ($generic:ident: $($name:ident => $t:ty, $alpha:ty),+) => {$(
        #[doc = concat!("[`", stringify!($generic), "`] for `", stringify!($t), "`.")]
        pub fn $name(
            order: Order,
            uplo: Uplo,
            n: usize,
            alpha: $alpha,
            x: &Buffer<$t>,
            off_x: usize,
            inc_x: isize,
            ap: &Buffer<$t>,
            off_a: usize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            $generic::<$t>(order, uplo, n, alpha, x, off_x, inc_x, ap, off_a, queues, wait)
        }
    )+};
}

rank1_packed_fns!(spr: sspr => f32, f32, dspr => f64, f64);
rank1_packed_fns!(hpr: chpr => Complex32, f32, zhpr => Complex64, f64);

macro_rules! rank2_full_fns {
    ($generic:ident: $($name:ident => $t:ty),+) => {$(
        #[doc = concat!("[`", stringify!($generic), "`] for `", stringify!($t), "`.")]
        pub fn $name(
            order: Order,
            uplo: Uplo,
            n: usize,
            alpha: $t,
            x: &Buffer<$t>,
            off_x: usize,
            inc_x: isize,
            y: &Buffer<$t>,
            off_y: usize,
            inc_y: isize,
            a: &Buffer<$t>,
            off_a: usize,
            lda: usize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            $generic::<$t>(
                order, uplo, n, alpha, x, off_x, inc_x, y, off_y, inc_y, a, off_a, lda, queues,
                wait,
            )
        }
    )+};
}

rank2_full_fns!(syr2: ssyr2 => f32, dsyr2 => f64);
rank2_full_fns!(her2: cher2 => Complex32, zher2 => Complex64);

macro_rules! rank2_packed_fns {
    ($generic:ident: $($name:ident => $t:ty),+) => {$(
        #[doc = concat!("[`", stringify!($generic), "`] for `", stringify!($t), "`.")]
        pub fn $name(
            order: Order,
            uplo: Uplo,
            n: usize,
            alpha: $t,
            x: &Buffer<$t>,
            off_x: usize,
            inc_x: isize,
            y: &Buffer<$t>,
            off_y: usize,
            inc_y: isize,
            ap: &Buffer<$t>,
            off_a: usize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            $generic::<$t>(
                order, uplo, n, alpha, x, off_x, inc_x, y, off_y, inc_y, ap, off_a, queues, wait,
            )
        }
    )+};
}

rank2_packed_fns!(spr2: sspr2 => f32, dspr2 => f64);
rank2_packed_fns!(hpr2: chpr2 => Complex32, zhpr2 => Complex64);
