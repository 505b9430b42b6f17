//! BLAS Level 1: vector-vector operations and plane rotations.
//!
//! Each routine validates its arguments, enqueues one command on the first
//! queue and returns one event per queue (markers on the others). Scalar
//! results (`dot`, `nrm2`, `asum`, `iamax`) and rotation parameters live in
//! buffers at an offset, so they can be consumed by later commands without a
//! round trip through the host.
//!
//! Generic entry points take any [`Element`]; the `s`/`d`/`c`/`z` functions
//! at the bottom of the file are thin typed wrappers.

use crate::dispatch::{self, Routine, Variant};
use crate::kernels::{level1 as k, Stride};
use crate::state;
use crate::validate::{self, Access, VecShape};
use qblas_core::{
    Buffer, CommandQueue, Complex32, Complex64, DeviceCopy, Element, Error, Event, Operand, Real,
    Result,
};

// ============================================================================
// Buffer access shared with the level 2 routines
// ============================================================================

/// Logical elements of a strided vector, gathered into a contiguous copy.
pub(crate) fn load<T: Element>(buf: &Buffer<T>, shape: &VecShape) -> Result<Vec<T>> {
    let raw = buf.read_range(shape.off, shape.extent())?;
    Ok(Stride::of(shape).gather(&raw))
}

/// Write logical elements back through the vector's stride.
pub(crate) fn store<T: Element>(buf: &Buffer<T>, shape: &VecShape, values: &[T]) {
    let mut data = buf.map_write();
    Stride::of(shape).scatter(values, &mut data[shape.off..shape.end()]);
}

fn read_scalar<T: DeviceCopy>(buf: &Buffer<T>, off: usize) -> Result<T> {
    Ok(buf.read_range(off, 1)?[0])
}

// ============================================================================
// Vector updates
// ============================================================================

/// Interchange x and y.
pub fn swap<T: Element>(
    n: usize,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    y: &Buffer<T>,
    off_y: usize,
    inc_y: isize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::dims(&[("N", n)])?;
    let xs = VecShape::new(Operand::X, n, off_x, inc_x)?;
    let ys = VecShape::new(Operand::Y, n, off_y, inc_y)?;
    validate::operand(x, Operand::X, xs.end(), Access::ReadWrite, queues)?;
    validate::operand(y, Operand::Y, ys.end(), Access::ReadWrite, queues)?;
    let plan = dispatch::plan::<T>(&lib, Routine::Swap, Variant::Reference, queues, wait)?;

    let (x, y) = (x.clone(), y.clone());
    plan.single(move |_| {
        let (xv, yv) = (load(&x, &xs)?, load(&y, &ys)?);
        store(&x, &xs, &yv);
        store(&y, &ys, &xv);
        Ok(())
    })
}

/// x := alpha * x
pub fn scal<T: Element>(
    n: usize,
    alpha: T,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::dims(&[("N", n)])?;
    let xs = VecShape::new(Operand::X, n, off_x, inc_x)?;
    validate::operand(x, Operand::X, xs.end(), Access::ReadWrite, queues)?;
    let plan = dispatch::plan::<T>(&lib, Routine::Scal, Variant::Reference, queues, wait)?;

    let x = x.clone();
    plan.single(move |_| {
        let mut data = x.map_write();
        k::scal(alpha, &mut data[xs.off..xs.end()], Stride::of(&xs));
        Ok(())
    })
}

/// x := alpha * x for a complex x and a real alpha (`csscal`, `zdscal`).
pub fn scal_real<T: Element>(
    n: usize,
    alpha: T::Real,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::dims(&[("N", n)])?;
    let xs = VecShape::new(Operand::X, n, off_x, inc_x)?;
    validate::operand(x, Operand::X, xs.end(), Access::ReadWrite, queues)?;
    let plan = dispatch::plan::<T>(&lib, Routine::Scal, Variant::Reference, queues, wait)?;

    let x = x.clone();
    plan.single(move |_| {
        let mut data = x.map_write();
        k::scal_real(alpha, &mut data[xs.off..xs.end()], Stride::of(&xs));
        Ok(())
    })
}

/// y := x
pub fn copy<T: Element>(
    n: usize,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    y: &Buffer<T>,
    off_y: usize,
    inc_y: isize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::dims(&[("N", n)])?;
    let xs = VecShape::new(Operand::X, n, off_x, inc_x)?;
    let ys = VecShape::new(Operand::Y, n, off_y, inc_y)?;
    validate::operand(x, Operand::X, xs.end(), Access::Read, queues)?;
    validate::operand(y, Operand::Y, ys.end(), Access::Write, queues)?;
    let plan = dispatch::plan::<T>(&lib, Routine::Copy, Variant::Reference, queues, wait)?;

    let (x, y) = (x.clone(), y.clone());
    plan.single(move |_| {
        let src = x.read_range(xs.off, xs.extent())?;
        let mut data = y.map_write();
        k::copy(&src, Stride::of(&xs), &mut data[ys.off..ys.end()], Stride::of(&ys));
        Ok(())
    })
}

/// y := alpha * x + y
pub fn axpy<T: Element>(
    n: usize,
    alpha: T,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    y: &Buffer<T>,
    off_y: usize,
    inc_y: isize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::dims(&[("N", n)])?;
    let xs = VecShape::new(Operand::X, n, off_x, inc_x)?;
    let ys = VecShape::new(Operand::Y, n, off_y, inc_y)?;
    validate::operand(x, Operand::X, xs.end(), Access::Read, queues)?;
    validate::operand(y, Operand::Y, ys.end(), Access::ReadWrite, queues)?;
    let plan = dispatch::plan::<T>(&lib, Routine::Axpy, Variant::Reference, queues, wait)?;

    let (x, y) = (x.clone(), y.clone());
    plan.single(move |_| {
        let src = x.read_range(xs.off, xs.extent())?;
        let mut data = y.map_write();
        k::axpy(alpha, &src, Stride::of(&xs), &mut data[ys.off..ys.end()], Stride::of(&ys));
        Ok(())
    })
}

// ============================================================================
// Reductions
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn dot_impl<T: Element>(
    routine: Routine,
    conj: bool,
    n: usize,
    result: &Buffer<T>,
    off_result: usize,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    y: &Buffer<T>,
    off_y: usize,
    inc_y: isize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::dims(&[("N", n)])?;
    let xs = VecShape::new(Operand::X, n, off_x, inc_x)?;
    let ys = VecShape::new(Operand::Y, n, off_y, inc_y)?;
    validate::operand(x, Operand::X, xs.end(), Access::Read, queues)?;
    validate::operand(y, Operand::Y, ys.end(), Access::Read, queues)?;
    validate::scalar(result, off_result, 1, Access::Write, queues)?;
    let plan = dispatch::plan::<T>(&lib, routine, Variant::Reference, queues, wait)?;

    let (result, x, y) = (result.clone(), x.clone(), y.clone());
    plan.single(move |_| {
        let xv = x.read_range(xs.off, xs.extent())?;
        let yv = y.read_range(ys.off, ys.extent())?;
        let value = k::dot(&xv, Stride::of(&xs), &yv, Stride::of(&ys), conj);
        result.write(off_result, &[value])
    })
}

/// Unconjugated dot product `x^T y`, written to `result[off_result]`.
pub fn dot<T: Element>(
    n: usize,
    result: &Buffer<T>,
    off_result: usize,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    y: &Buffer<T>,
    off_y: usize,
    inc_y: isize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    dot_impl(
        Routine::Dot, false, n, result, off_result, x, off_x, inc_x, y, off_y, inc_y, queues, wait,
    )
}

/// Conjugated dot product `x^H y`, written to `result[off_result]`.
pub fn dotc<T: Element>(
    n: usize,
    result: &Buffer<T>,
    off_result: usize,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    y: &Buffer<T>,
    off_y: usize,
    inc_y: isize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    dot_impl(
        Routine::Dotc, true, n, result, off_result, x, off_x, inc_x, y, off_y, inc_y, queues, wait,
    )
}

/// Apply a real-valued reduction of x and store it at `result[off_result]`.
#[allow(clippy::too_many_arguments)]
fn reduce<T, R, F>(
    routine: Routine,
    n: usize,
    result: &Buffer<R>,
    off_result: usize,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    queues: &[CommandQueue],
    wait: &[Event],
    f: F,
) -> Result<Vec<Event>>
where
    T: Element,
    R: DeviceCopy,
    F: Fn(&[T], Stride) -> R + Send + 'static,
{
    let lib = state::library()?;
    validate::dims(&[("N", n)])?;
    let xs = VecShape::new(Operand::X, n, off_x, inc_x)?;
    validate::operand(x, Operand::X, xs.end(), Access::Read, queues)?;
    validate::scalar(result, off_result, 1, Access::Write, queues)?;
    let plan = dispatch::plan::<T>(&lib, routine, Variant::Reference, queues, wait)?;

    let (result, x) = (result.clone(), x.clone());
    plan.single(move |_| {
        let xv = x.read_range(xs.off, xs.extent())?;
        result.write(off_result, &[f(&xv, Stride::of(&xs))])
    })
}

/// Euclidean norm of x.
pub fn nrm2<T: Element>(
    n: usize,
    result: &Buffer<T::Real>,
    off_result: usize,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    reduce(Routine::Nrm2, n, result, off_result, x, off_x, inc_x, queues, wait, k::nrm2::<T>)
}

/// Sum of `|re(x_i)| + |im(x_i)|`.
pub fn asum<T: Element>(
    n: usize,
    result: &Buffer<T::Real>,
    off_result: usize,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    reduce(Routine::Asum, n, result, off_result, x, off_x, inc_x, queues, wait, k::asum::<T>)
}

/// 1-based index of the first element with the largest `|re| + |im|`.
pub fn iamax<T: Element>(
    n: usize,
    result: &Buffer<u32>,
    off_result: usize,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    if u32::try_from(n).is_err() {
        state::library()?;
        return Err(Error::invalid_value("N", "index would not fit the u32 result"));
    }
    reduce(Routine::Iamax, n, result, off_result, x, off_x, inc_x, queues, wait, |x, s| {
        k::iamax::<T>(x, s) as u32
    })
}

// ============================================================================
// Rotations
// ============================================================================

/// Construct a Givens rotation that zeroes `b`.
///
/// On completion `a` holds `r`, `c` the cosine and `s` the sine. For real
/// types `b` holds the reconstruction value `z`; complex `b` is unchanged.
#[allow(clippy::too_many_arguments)]
pub fn rotg<T: Element>(
    a: &Buffer<T>,
    off_a: usize,
    b: &Buffer<T>,
    off_b: usize,
    c: &Buffer<T::Real>,
    off_c: usize,
    s: &Buffer<T>,
    off_s: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::scalar(a, off_a, 1, Access::ReadWrite, queues)?;
    validate::scalar(b, off_b, 1, Access::ReadWrite, queues)?;
    validate::scalar(c, off_c, 1, Access::Write, queues)?;
    validate::scalar(s, off_s, 1, Access::Write, queues)?;
    let plan = dispatch::plan::<T>(&lib, Routine::Rotg, Variant::Reference, queues, wait)?;

    let (a, b, c, s) = (a.clone(), b.clone(), c.clone(), s.clone());
    plan.single(move |_| {
        let (r, z, cv, sv) = k::rotg(read_scalar(&a, off_a)?, read_scalar(&b, off_b)?);
        a.write(off_a, &[r])?;
        b.write(off_b, &[z])?;
        c.write(off_c, &[cv])?;
        s.write(off_s, &[sv])
    })
}

/// Construct a modified Givens rotation.
///
/// `param` holds five values at `off_param`: the flag followed by
/// `h11, h21, h12, h22`. Entries implied by the flag are left untouched.
#[allow(clippy::too_many_arguments)]
pub fn rotmg<R: Real>(
    d1: &Buffer<R>,
    off_d1: usize,
    d2: &Buffer<R>,
    off_d2: usize,
    x1: &Buffer<R>,
    off_x1: usize,
    y1: &Buffer<R>,
    off_y1: usize,
    param: &Buffer<R>,
    off_param: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::scalar(d1, off_d1, 1, Access::ReadWrite, queues)?;
    validate::scalar(d2, off_d2, 1, Access::ReadWrite, queues)?;
    validate::scalar(x1, off_x1, 1, Access::ReadWrite, queues)?;
    validate::scalar(y1, off_y1, 1, Access::Read, queues)?;
    validate::scalar(param, off_param, 5, Access::ReadWrite, queues)?;
    let plan = dispatch::plan::<R>(&lib, Routine::Rotmg, Variant::Reference, queues, wait)?;

    let (d1, d2, x1, y1, param) = (d1.clone(), d2.clone(), x1.clone(), y1.clone(), param.clone());
    plan.single(move |_| {
        let mut dv1 = read_scalar(&d1, off_d1)?;
        let mut dv2 = read_scalar(&d2, off_d2)?;
        let mut xv1 = read_scalar(&x1, off_x1)?;
        let yv1 = read_scalar(&y1, off_y1)?;
        let mut pv = [R::zero(); 5];
        pv.copy_from_slice(&param.read_range(off_param, 5)?);
        k::rotmg(&mut dv1, &mut dv2, &mut xv1, yv1, &mut pv);
        d1.write(off_d1, &[dv1])?;
        d2.write(off_d2, &[dv2])?;
        x1.write(off_x1, &[xv1])?;
        param.write(off_param, &pv)
    })
}

/// Apply a plane rotation with real cosine `c` and sine `s`.
pub fn rot<T: Element>(
    n: usize,
    x: &Buffer<T>,
    off_x: usize,
    inc_x: isize,
    y: &Buffer<T>,
    off_y: usize,
    inc_y: isize,
    c: T::Real,
    s: T::Real,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::dims(&[("N", n)])?;
    let xs = VecShape::new(Operand::X, n, off_x, inc_x)?;
    let ys = VecShape::new(Operand::Y, n, off_y, inc_y)?;
    validate::operand(x, Operand::X, xs.end(), Access::ReadWrite, queues)?;
    validate::operand(y, Operand::Y, ys.end(), Access::ReadWrite, queues)?;
    let plan = dispatch::plan::<T>(&lib, Routine::Rot, Variant::Reference, queues, wait)?;

    let (x, y) = (x.clone(), y.clone());
    plan.single(move |_| {
        let (mut xv, mut yv) = (load(&x, &xs)?, load(&y, &ys)?);
        k::rot(&mut xv, &mut yv, c, s);
        store(&x, &xs, &xv);
        store(&y, &ys, &yv);
        Ok(())
    })
}

/// Apply the modified Givens rotation described by the five values at `param[off_param]`.
#[allow(clippy::too_many_arguments)]
pub fn rotm<R: Real>(
    n: usize,
    x: &Buffer<R>,
    off_x: usize,
    inc_x: isize,
    y: &Buffer<R>,
    off_y: usize,
    inc_y: isize,
    param: &Buffer<R>,
    off_param: usize,
    queues: &[CommandQueue],
    wait: &[Event],
) -> Result<Vec<Event>> {
    let lib = state::library()?;
    validate::dims(&[("N", n)])?;
    let xs = VecShape::new(Operand::X, n, off_x, inc_x)?;
    let ys = VecShape::new(Operand::Y, n, off_y, inc_y)?;
    validate::operand(x, Operand::X, xs.end(), Access::ReadWrite, queues)?;
    validate::operand(y, Operand::Y, ys.end(), Access::ReadWrite, queues)?;
    validate::scalar(param, off_param, 5, Access::Read, queues)?;
    let plan = dispatch::plan::<R>(&lib, Routine::Rotm, Variant::Reference, queues, wait)?;

    let (x, y, param) = (x.clone(), y.clone(), param.clone());
    plan.single(move |_| {
        let mut pv = [R::zero(); 5];
        pv.copy_from_slice(&param.read_range(off_param, 5)?);
        let (mut xv, mut yv) = (load(&x, &xs)?, load(&y, &ys)?);
        k::rotm(&mut xv, &mut yv, &pv);
        store(&x, &xs, &xv);
        store(&y, &ys, &yv);
        Ok(())
    })
}

// ============================================================================
// Typed wrappers
// ============================================================================

macro_rules! two_vectors {
    ($generic:ident: $($name:ident => $t:ty),+) => {$(
        #[doc = concat!("[`", stringify!($generic), "`] for `", stringify!($t), "`.")]
        pub fn $name(
            n: usize,
            x: &Buffer<$t>,
            off_x: usize,
            inc_x: isize,
            y: &Buffer<$t>,
            off_y: usize,
            inc_y: isize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            $generic::<$t>(n, x, off_x, inc_x, y, off_y, inc_y, queues, wait)
        }
    )+};
}

two_vectors!(swap: sswap => f32, dswap => f64, cswap => Complex32, zswap => Complex64);
two_vectors!(copy: scopy => f32, dcopy => f64, ccopy => Complex32, zcopy => Complex64);

macro_rules! scale_vector {
    ($generic:ident: $($name:ident => $t:ty, $alpha:ty),+) => {$(
        #[doc = concat!("[`", stringify!($generic), "`] for `", stringify!($t), "`.")]
        pub fn $name(
            n: usize,
            alpha: $alpha,
            x: &Buffer<$t>,
            off_x: usize,
            inc_x: isize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            $generic::<$t>(n, alpha, x, off_x, inc_x, queues, wait)
        }
    )+};
}

scale_vector!(scal: sscal => f32, f32, dscal => f64, f64, cscal => Complex32, Complex32, zscal => Complex64, Complex64);
scale_vector!(scal_real: csscal => Complex32, f32, zdscal => Complex64, f64);

macro_rules! axpy_fns {
    ($($name:ident => $t:ty),+) => {$(
        #[doc = concat!("[`axpy`] for `", stringify!($t), "`.")]
        pub fn $name(
            n: usize,
            alpha: $t,
            x: &Buffer<$t>,
            off_x: usize,
            inc_x: isize,
            y: &Buffer<$t>,
            off_y: usize,
            inc_y: isize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            axpy::<$t>(n, alpha, x, off_x, inc_x, y, off_y, inc_y, queues, wait)
        }
    )+};
}

axpy_fns!(saxpy => f32, daxpy => f64, caxpy => Complex32, zaxpy => Complex64);

macro_rules! dot_fns {
    ($generic:ident: $($name:ident => $t:ty),+) => {$(
        #[doc = concat!("[`", stringify!($generic), "`] for `", stringify!($t), "`.")]
        pub fn $name(
            n: usize,
            result: &Buffer<$t>,
            off_result: usize,
            x: &Buffer<$t>,
            off_x: usize,
            inc_x: isize,
            y: &Buffer<$t>,
            off_y: usize,
            inc_y: isize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            $generic::<$t>(n, result, off_result, x, off_x, inc_x, y, off_y, inc_y, queues, wait)
        }
    )+};
}

dot_fns!(dot: sdot => f32, ddot => f64, cdotu => Complex32, zdotu => Complex64);
dot_fns!(dotc: cdotc => Complex32, zdotc => Complex64);

macro_rules! reduce_fns {
    ($generic:ident: $($name:ident => $t:ty, $out:ty),+) => {$(
        #[doc = concat!("[`", stringify!($generic), "`] for `", stringify!($t), "`.")]
        pub fn $name(
            n: usize,
            result: &Buffer<$out>,
            off_result: usize,
            x: &Buffer<$t>,
            off_x: usize,
            inc_x: isize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            $generic::<$t>(n, result, off_result, x, off_x, inc_x, queues, wait)
        }
    )+};
}

reduce_fns!(nrm2: snrm2 => f32, f32, dnrm2 => f64, f64, scnrm2 => Complex32, f32, dznrm2 => Complex64, f64);
reduce_fns!(asum: sasum => f32, f32, dasum => f64, f64, scasum => Complex32, f32, dzasum => Complex64, f64);
reduce_fns!(iamax: isamax => f32, u32, idamax => f64, u32, icamax => Complex32, u32, izamax => Complex64, u32);

macro_rules! rotg_fns {
    ($($name:ident => $t:ty, $real:ty),+) => {$(
        #[doc = concat!("[`rotg`] for `", stringify!($t), "`.")]
        #[allow(clippy::too_many_arguments)]
        pub fn $name(
            a: &Buffer<$t>,
            off_a: usize,
            b: &Buffer<$t>,
            off_b: usize,
            c: &Buffer<$real>,
            off_c: usize,
            s: &Buffer<$t>,
            off_s: usize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            rotg::<$t>(a, off_a, b, off_b, c, off_c, s, off_s, queues, wait)
        }
    )+};
}

rotg_fns!(srotg => f32, f32, drotg => f64, f64, crotg => Complex32, f32, zrotg => Complex64, f64);

macro_rules! rotmg_fns {
    ($($name:ident => $t:ty),+) => {$(
        #[doc = concat!("[`rotmg`] for `", stringify!($t), "`.")]
        #[allow(clippy::too_many_arguments)]
        pub fn $name(
            d1: &Buffer<$t>,
            off_d1: usize,
            d2: &Buffer<$t>,
            off_d2: usize,
            x1: &Buffer<$t>,
            off_x1: usize,
            y1: &Buffer<$t>,
            off_y1: usize,
            param: &Buffer<$t>,
            off_param: usize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            rotmg::<$t>(d1, off_d1, d2, off_d2, x1, off_x1, y1, off_y1, param, off_param, queues, wait)
        }
    )+};
}

rotmg_fns!(srotmg => f32, drotmg => f64);

macro_rules! rot_fns {
    ($($name:ident => $t:ty, $real:ty),+) => {$(
        #[doc = concat!("[`rot`] for `", stringify!($t), "`.")]
        #[allow(clippy::too_many_arguments)]
        pub fn $name(
            n: usize,
            x: &Buffer<$t>,
            off_x: usize,
            inc_x: isize,
            y: &Buffer<$t>,
            off_y: usize,
            inc_y: isize,
            c: $real,
            s: $real,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            rot::<$t>(n, x, off_x, inc_x, y, off_y, inc_y, c, s, queues, wait)
        }
    )+};
}

rot_fns!(srot => f32, f32, drot => f64, f64, csrot => Complex32, f32, zdrot => Complex64, f64);

macro_rules! rotm_fns {
    ($($name:ident => $t:ty),+) => {$(
        #[doc = concat!("[`rotm`] for `", stringify!($t), "`.")]
        #[allow(clippy::too_many_arguments)]
        pub fn $name(
            n: usize,
            x: &Buffer<$t>,
            off_x: usize,
            inc_x: isize,
            y: &Buffer<$t>,
            off_y: usize,
            inc_y: isize,
            param: &Buffer<$t>,
            off_param: usize,
            queues: &[CommandQueue],
            wait: &[Event],
        ) -> Result<Vec<Event>> {
            rotm::<$t>(n, x, off_x, inc_x, y, off_y, inc_y, param, off_param, queues, wait)
        }
    )+};
}

rotm_fns!(srotm => f32, drotm => f64);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
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
    fn test_axpy_and_dot() {
        let (ctx, q) = env();
        let qs = std::slice::from_ref(&q);
        let x = buf(&ctx, &[1.0f32, 2.0, 3.0]);
        let y = buf(&ctx, &[1.0f32, 1.0, 1.0]);
        let events = saxpy(3, 2.0, &x, 0, 1, &y, 0, 1, qs, &[]).unwrap();
        assert_eq!(events.len(), 1);
        let r = buf(&ctx, &[0.0f32; 2]);
        let events = sdot(3, &r, 1, &x, 0, 1, &y, 0, 1, qs, &events).unwrap();
        Event::wait_all(&events).unwrap();
        assert_eq!(y.to_vec(), vec![3.0, 5.0, 7.0]);
        assert_eq!(r.to_vec(), vec![0.0, 3.0 + 10.0 + 21.0]);
    }

    #[test]
    fn test_swap_negative_increment() {
        let (ctx, q) = env();
        let x = buf(&ctx, &[1.0f64, 2.0, 3.0]);
        let y = buf(&ctx, &[10.0f64, 0.0, 20.0, 0.0, 30.0]);
        let events = dswap(3, &x, 0, 1, &y, 0, -2, &[q], &[]).unwrap();
        Event::wait_all(&events).unwrap();
        // logical y was [30, 20, 10]
        assert_eq!(x.to_vec(), vec![30.0, 20.0, 10.0]);
        assert_eq!(y.to_vec(), vec![3.0, 0.0, 2.0, 0.0, 1.0]);
    }

    #[test]
    fn test_nrm2_iamax_asum_complex() {
        let (ctx, q) = env();
        let qs = std::slice::from_ref(&q);
        let x = buf(&ctx, &[Complex32::new(3.0, 4.0), Complex32::new(0.0, -6.0)]);
        let norm = buf(&ctx, &[0.0f32]);
        let sum = buf(&ctx, &[0.0f32]);
        let idx = Buffer::from_slice(&ctx, MemFlags::ReadWrite, &[0u32]).unwrap();
        let mut events = scnrm2(2, &norm, 0, &x, 0, 1, qs, &[]).unwrap();
        events.extend(scasum(2, &sum, 0, &x, 0, 1, qs, &[]).unwrap());
        events.extend(icamax(2, &idx, 0, &x, 0, 1, qs, &[]).unwrap());
        Event::wait_all(&events).unwrap();
        assert_relative_eq!(norm.to_vec()[0], 61.0f32.sqrt(), max_relative = 1e-6);
        assert_eq!(sum.to_vec()[0], 13.0);
        assert_eq!(idx.to_vec()[0], 1);
    }

    #[test]
    fn test_rotg_through_buffers() {
        let (ctx, q) = env();
        let a = buf(&ctx, &[3.0f64]);
        let b = buf(&ctx, &[4.0f64]);
        let c = buf(&ctx, &[0.0f64]);
        let s = buf(&ctx, &[0.0f64]);
        let events = drotg(&a, 0, &b, 0, &c, 0, &s, 0, &[q], &[]).unwrap();
        Event::wait_all(&events).unwrap();
        assert_relative_eq!(a.to_vec()[0], 5.0, max_relative = 1e-12);
        assert_relative_eq!(c.to_vec()[0], 0.6, max_relative = 1e-12);
        assert_relative_eq!(s.to_vec()[0], 0.8, max_relative = 1e-12);
    }

    #[test]
    fn test_rotmg_then_rotm() {
        let (ctx, q) = env();
        let qs = std::slice::from_ref(&q);
        let d1 = buf(&ctx, &[2.0f64]);
        let d2 = buf(&ctx, &[1.0f64]);
        let x1 = buf(&ctx, &[3.0f64]);
        let y1 = buf(&ctx, &[4.0f64]);
        let param = buf(&ctx, &[0.0f64; 5]);
        let events = drotmg(&d1, 0, &d2, 0, &x1, 0, &y1, 0, &param, 0, qs, &[]).unwrap();
        let x = buf(&ctx, &[3.0f64]);
        let y = buf(&ctx, &[4.0f64]);
        let events = drotm(1, &x, 0, 1, &y, 0, 1, &param, 0, qs, &events).unwrap();
        Event::wait_all(&events).unwrap();
        assert_relative_eq!(y.to_vec()[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(x.to_vec()[0], x1.to_vec()[0], max_relative = 1e-12);
    }

    #[test]
    fn test_argument_errors() {
        let (ctx, q) = env();
        let qs = std::slice::from_ref(&q);
        let x = buf(&ctx, &[1.0f32; 4]);
        let y = buf(&ctx, &[1.0f32; 4]);
        assert_eq!(
            scopy(4, &x, 0, 0, &y, 0, 1, qs, &[]).unwrap_err().status(),
            Status::InvalidIncX
        );
        assert_eq!(
            scopy(0, &x, 0, 1, &y, 0, 1, qs, &[]).unwrap_err().status(),
            Status::InvalidValue
        );
        assert_eq!(
            scopy(3, &x, 0, 1, &y, 0, 2, qs, &[]).unwrap_err().status(),
            Status::InsufficientMemVecY
        );
        let r = Buffer::<f32>::new(&ctx, MemFlags::ReadOnly, 1).unwrap();
        assert_eq!(
            sdot(4, &r, 0, &x, 0, 1, &y, 0, 1, qs, &[]).unwrap_err().status(),
            Status::InvalidMemObject
        );
    }
}
