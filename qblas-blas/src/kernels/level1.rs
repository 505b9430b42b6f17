//! Level 1 kernels: vector-vector operations and plane rotations.
//!
//! Vectors are addressed through [`Stride`], so negative increments work
//! everywhere. Routines that update two vectors (`swap`, `rot`, `rotm`)
//! operate on gathered copies; the caller scatters them back.

use super::Stride;
use num_traits::Float;
use qblas_core::{Element, Real};

/// x := alpha * x
pub(crate) fn scal<T: Element>(alpha: T, x: &mut [T], sx: Stride) {
    for i in 0..sx.n {
        let idx = sx.at(i);
        x[idx] = if alpha == T::zero() {
            T::zero()
        } else {
            alpha * x[idx]
        };
    }
}

/// x := alpha * x with a real alpha (`csscal`, `zdscal`).
pub(crate) fn scal_real<T: Element>(alpha: T::Real, x: &mut [T], sx: Stride) {
    for i in 0..sx.n {
        let idx = sx.at(i);
        x[idx] = x[idx].scale(alpha);
    }
}

/// y := x
pub(crate) fn copy<T: Copy>(x: &[T], sx: Stride, y: &mut [T], sy: Stride) {
    for i in 0..sx.n {
        y[sy.at(i)] = x[sx.at(i)];
    }
}

/// y := alpha * x + y
pub(crate) fn axpy<T: Element>(alpha: T, x: &[T], sx: Stride, y: &mut [T], sy: Stride) {
    if alpha == T::zero() {
        return;
    }
    for i in 0..sx.n {
        y[sy.at(i)] += alpha * x[sx.at(i)];
    }
}

/// x^T y, or x^H y when `conj` is set.
pub(crate) fn dot<T: Element>(x: &[T], sx: Stride, y: &[T], sy: Stride, conj: bool) -> T {
    let mut sum = T::zero();
    for i in 0..sx.n {
        let xv = x[sx.at(i)];
        let xv = if conj { xv.conj() } else { xv };
        sum += xv * y[sy.at(i)];
    }
    sum
}

/// Euclidean norm, scaled to avoid overflow and underflow.
pub(crate) fn nrm2<T: Element>(x: &[T], sx: Stride) -> T::Real {
    let zero = <T::Real as num_traits::Zero>::zero();
    let one = <T::Real as num_traits::One>::one();
    let mut scale = zero;
    let mut ssq = one;
    for i in 0..sx.n {
        let v = x[sx.at(i)];
        for part in [v.re(), v.im()] {
            if part != zero {
                let a = part.abs();
                if scale < a {
                    let r = scale / a;
                    ssq = one + ssq * r * r;
                    scale = a;
                } else {
                    let r = a / scale;
                    ssq += r * r;
                }
            }
        }
    }
    scale * ssq.sqrt()
}

/// Sum of `|re| + |im|`.
pub(crate) fn asum<T: Element>(x: &[T], sx: Stride) -> T::Real {
    let mut sum = <T::Real as num_traits::Zero>::zero();
    for i in 0..sx.n {
        sum += x[sx.at(i)].abs1();
    }
    sum
}

/// 1-based position of the first element with the largest `|re| + |im|`.
pub(crate) fn iamax<T: Element>(x: &[T], sx: Stride) -> usize {
    if sx.n == 0 {
        return 0;
    }
    let mut best = 0;
    let mut best_val = x[sx.at(0)].abs1();
    for i in 1..sx.n {
        let v = x[sx.at(i)].abs1();
        if v > best_val {
            best = i;
            best_val = v;
        }
    }
    best + 1
}

/// Apply a plane rotation with real `c`, `s` to contiguous copies of x and y.
pub(crate) fn rot<T: Element>(x: &mut [T], y: &mut [T], c: T::Real, s: T::Real) {
    for (xv, yv) in x.iter_mut().zip(y.iter_mut()) {
        let (xo, yo) = (*xv, *yv);
        *xv = xo.scale(c) + yo.scale(s);
        *yv = yo.scale(c) - xo.scale(s);
    }
}

/// Construct a Givens rotation that zeroes `b`.
///
/// Returns `(r, z, c, s)`: the new `a`, the new `b`, the cosine and the sine.
/// For complex types `b` is returned unchanged.
pub(crate) fn rotg<T: Element>(a: T, b: T) -> (T, T, T::Real, T) {
    if T::DTYPE.is_complex() {
        rotg_complex(a, b)
    } else {
        let (r, z, c, s) = rotg_real(a.re(), b.re());
        (T::from_real(r), T::from_real(z), c, T::from_real(s))
    }
}

fn rotg_real<R: Real>(a: R, b: R) -> (R, R, R, R) {
    let roe = if a.abs() > b.abs() { a } else { b };
    let scale = a.abs() + b.abs();
    if scale == R::zero() {
        return (R::zero(), R::zero(), R::one(), R::zero());
    }
    let (sa, sb) = (a / scale, b / scale);
    let mut r = scale * (sa * sa + sb * sb).sqrt();
    if roe < R::zero() {
        r = -r;
    }
    let c = a / r;
    let s = b / r;
    let z = if a.abs() > b.abs() {
        s
    } else if c != R::zero() {
        R::one() / c
    } else {
        R::one()
    };
    (r, z, c, s)
}

fn rotg_complex<T: Element>(a: T, b: T) -> (T, T, T::Real, T) {
    let abs_a = a.modulus();
    if abs_a == <T::Real as num_traits::Zero>::zero() {
        return (b, b, <T::Real as num_traits::Zero>::zero(), T::one());
    }
    let scale = abs_a + b.modulus();
    let (sa, sb) = ((a.scale(scale.recip())).modulus(), (b.scale(scale.recip())).modulus());
    let norm = scale * (sa * sa + sb * sb).sqrt();
    let alpha = a.scale(abs_a.recip());
    let c = abs_a / norm;
    let s = (alpha * b.conj()).scale(norm.recip());
    (alpha.scale(norm), b, c, s)
}

/// Construct a modified Givens rotation.
///
/// Updates `d1`, `d2`, `x1` and the five-element `param` (`flag`, then the
/// `H` entries the flag says are explicit; the others are left untouched).
pub(crate) fn rotmg<R: Real>(d1: &mut R, d2: &mut R, x1: &mut R, y1: R, param: &mut [R; 5]) {
    let zero = R::zero();
    let one = R::one();
    let gam = R::from_f64(4096.0);
    let gamsq = gam * gam;
    let rgamsq = gamsq.recip();

    let (mut h11, mut h12, mut h21, mut h22) = (zero, zero, zero, zero);
    let mut flag: i32;

    if *d1 < zero {
        flag = -1;
        *d1 = zero;
        *d2 = zero;
        *x1 = zero;
    } else {
        let p2 = *d2 * y1;
        if p2 == zero {
            param[0] = R::from_f64(-2.0);
            return;
        }
        let p1 = *d1 * *x1;
        let q2 = p2 * y1;
        let q1 = p1 * *x1;

        if q1.abs() > q2.abs() {
            h21 = -y1 / *x1;
            h12 = p2 / p1;
            let u = one - h12 * h21;
            if u > zero {
                flag = 0;
                *d1 = *d1 / u;
                *d2 = *d2 / u;
                *x1 = *x1 * u;
            } else {
                flag = -1;
                (h11, h12, h21, h22) = (zero, zero, zero, zero);
                *d1 = zero;
                *d2 = zero;
                *x1 = zero;
            }
        } else if q2 < zero {
            flag = -1;
            (h11, h12, h21, h22) = (zero, zero, zero, zero);
            *d1 = zero;
            *d2 = zero;
            *x1 = zero;
        } else {
            flag = 1;
            h11 = p1 / p2;
            h22 = *x1 / y1;
            let u = one + h11 * h22;
            let temp = *d2 / u;
            *d2 = *d1 / u;
            *d1 = temp;
            *x1 = y1 * u;
        }

        // Make the implicit entries explicit before rescaling.
        let make_explicit = |flag: &mut i32, h11: &mut R, h12: &mut R, h21: &mut R, h22: &mut R| {
            match *flag {
                0 => {
                    *h11 = one;
                    *h22 = one;
                }
                1 => {
                    *h21 = -one;
                    *h12 = one;
                }
                _ => {}
            }
            *flag = -1;
        };

        if *d1 != zero {
            while *d1 <= rgamsq || *d1 >= gamsq {
                make_explicit(&mut flag, &mut h11, &mut h12, &mut h21, &mut h22);
                if *d1 <= rgamsq {
                    *d1 = *d1 * gamsq;
                    *x1 = *x1 / gam;
                    h11 = h11 / gam;
                    h12 = h12 / gam;
                } else {
                    *d1 = *d1 / gamsq;
                    *x1 = *x1 * gam;
                    h11 = h11 * gam;
                    h12 = h12 * gam;
                }
            }
        }

        if *d2 != zero {
            while d2.abs() <= rgamsq || d2.abs() >= gamsq {
                make_explicit(&mut flag, &mut h11, &mut h12, &mut h21, &mut h22);
                if d2.abs() <= rgamsq {
                    *d2 = *d2 * gamsq;
                    h21 = h21 / gam;
                    h22 = h22 / gam;
                } else {
                    *d2 = *d2 / gamsq;
                    h21 = h21 * gam;
                    h22 = h22 * gam;
                }
            }
        }
    }

    match flag {
        f if f < 0 => {
            param[1] = h11;
            param[2] = h21;
            param[3] = h12;
            param[4] = h22;
        }
        0 => {
            param[2] = h21;
            param[3] = h12;
        }
        _ => {
            param[1] = h11;
            param[4] = h22;
        }
    }
    param[0] = R::from_f64(f64::from(flag));
}

/// Apply a modified Givens rotation to contiguous copies of x and y.
pub(crate) fn rotm<R: Real>(x: &mut [R], y: &mut [R], param: &[R; 5]) {
    let flag = param[0].as_f64();
    let (h11, h21, h12, h22) = if flag == -2.0 {
        return;
    } else if flag < 0.0 {
        (param[1], param[2], param[3], param[4])
    } else if flag == 0.0 {
        (R::one(), param[2], param[3], R::one())
    } else {
        (param[1], -R::one(), R::one(), param[4])
    };
    for (xv, yv) in x.iter_mut().zip(y.iter_mut()) {
        let (w, z) = (*xv, *yv);
        *xv = w * h11 + z * h12;
        *yv = w * h21 + z * h22;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_complex::{Complex32, Complex64};

    fn s(n: usize) -> Stride {
        Stride::new(n, 1)
    }

    #[test]
    fn test_axpy_negative_increment() {
        // x read backwards: logical x = [3, 2, 1]
        let x = [1.0f64, 2.0, 3.0];
        let mut y = [10.0f64, 20.0, 30.0];
        axpy(2.0, &x, Stride::new(3, -1), &mut y, s(3));
        assert_eq!(y, [16.0, 24.0, 32.0]);
    }

    #[test]
    fn test_dotc_conjugates_x() {
        let x = [Complex32::new(1.0, 2.0), Complex32::new(0.0, 1.0)];
        let y = [Complex32::new(3.0, 0.0), Complex32::new(0.0, 1.0)];
        assert_eq!(dot(&x, s(2), &y, s(2), false), Complex32::new(2.0, 6.0));
        assert_eq!(dot(&x, s(2), &y, s(2), true), Complex32::new(4.0, -6.0));
    }

    #[test]
    fn test_nrm2_extreme_values() {
        let x = [3.0e200f64, 4.0e200];
        assert_relative_eq!(nrm2(&x, s(2)), 5.0e200, max_relative = 1e-12);
        let z = [Complex64::new(3.0, 4.0)];
        assert_relative_eq!(nrm2(&z, s(1)), 5.0);
        assert_eq!(nrm2(&[0.0f32; 4], s(4)), 0.0);
    }

    #[test]
    fn test_asum_and_iamax() {
        let x = [Complex32::new(1.0, -1.0), Complex32::new(-3.0, 0.5), Complex32::new(0.0, 3.5)];
        assert_eq!(asum(&x, s(3)), 9.0);
        // |-3| + 0.5 == 3.5 ties with the last element; first wins
        assert_eq!(iamax(&x, s(3)), 2);
        assert_eq!(iamax(&[1.0f64, -7.0, 7.0], s(3)), 2);
    }

    #[test]
    fn test_scal_zero_clears_nan() {
        let mut x = [f32::NAN, 1.0];
        scal(0.0, &mut x, s(2));
        assert_eq!(x, [0.0, 0.0]);
        let mut z = [Complex64::new(1.0, 2.0)];
        scal_real(2.0, &mut z, s(1));
        assert_eq!(z[0], Complex64::new(2.0, 4.0));
    }

    #[test]
    fn test_rotg_real() {
        let (r, z, c, s) = rotg(3.0f64, 4.0);
        assert_relative_eq!(r, 5.0, max_relative = 1e-12);
        assert_relative_eq!(c, 0.6, max_relative = 1e-12);
        assert_relative_eq!(s, 0.8, max_relative = 1e-12);
        assert_relative_eq!(z, 1.0 / 0.6, max_relative = 1e-12);
        let (r, z, c, s) = rotg(0.0f32, 0.0);
        assert_eq!((r, z, c, s), (0.0, 0.0, 1.0, 0.0));
        let (r, _, c, s) = rotg(-4.0f64, 3.0);
        assert_relative_eq!(r, -5.0, max_relative = 1e-12);
        assert_relative_eq!(c * -4.0 + s * 3.0, r, max_relative = 1e-12);
    }

    #[test]
    fn test_rotg_complex_zeroes_b() {
        let a = Complex64::new(1.0, 1.0);
        let b = Complex64::new(2.0, -1.0);
        let (r, b_out, c, s) = rotg(a, b);
        assert_eq!(b_out, b);
        // [c s; -conj(s) c] [a; b] = [r; 0]
        let top = a.scale(c) + s * b;
        let bottom = -s.conj() * a + b.scale(c);
        assert_relative_eq!(top.re, r.re, epsilon = 1e-12);
        assert_relative_eq!(top.im, r.im, epsilon = 1e-12);
        assert!(bottom.norm() < 1e-12);

        let (r, _, c, s) = rotg(Complex64::new(0.0, 0.0), b);
        assert_eq!((r, c, s), (b, 0.0, Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_rotg_complex_large_magnitude() {
        let a = Complex64::new(3.0e200, 0.0);
        let b = Complex64::new(0.0, 4.0e200);
        let (r, _, c, s) = rotg(a, b);
        assert_relative_eq!(r.norm(), 5.0e200, max_relative = 1e-12);
        assert_relative_eq!(c, 0.6, max_relative = 1e-12);
        assert_relative_eq!(s.norm(), 0.8, max_relative = 1e-12);
    }

    #[test]
    fn test_rotmg_rescales_until_in_range() {
        let gamsq = 4096.0f64 * 4096.0;
        let (mut d1, mut d2, mut x1) = (1.0e20f64, 1.0, 1.0);
        let mut param = [0.0f64; 5];
        rotmg(&mut d1, &mut d2, &mut x1, 1.0, &mut param);
        // 1e20 needs two gam^2 steps to land inside (1/gam^2, gam^2)
        assert_eq!(param[0], -1.0);
        assert!(d1 > gamsq.recip() && d1 < gamsq);
        assert_relative_eq!(d1, 1.0e20 / gamsq / gamsq, max_relative = 1e-12);
        assert_relative_eq!(d1 * x1 * x1, 1.0e20 + 1.0, max_relative = 1e-12);
        // H zeroes y1
        assert_relative_eq!(param[2] + param[4], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rot_preserves_norm() {
        let mut x = vec![1.0f64, 0.0];
        let mut y = vec![0.0f64, 1.0];
        let (c, s) = (0.6, 0.8);
        rot(&mut x, &mut y, c, s);
        assert_eq!(x, vec![0.6, 0.8]);
        assert_eq!(y, vec![-0.8, 0.6]);
    }

    #[test]
    fn test_rotmg_then_rotm_zeroes_y() {
        let (mut d1, mut d2, mut x1) = (2.0f64, 1.0, 3.0);
        let y1 = 4.0;
        let mut param = [0.0f64; 5];
        rotmg(&mut d1, &mut d2, &mut x1, y1, &mut param);
        let mut x = vec![3.0];
        let mut y = vec![y1];
        rotm(&mut x, &mut y, &param);
        assert_relative_eq!(y[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(x[0], x1, max_relative = 1e-12);
        // the weighted norm is preserved: d1*x^2 + d2*y^2 before and after
        assert_relative_eq!(d1 * x1 * x1, 2.0 * 9.0 + 1.0 * 16.0, max_relative = 1e-12);
    }

    #[test]
    fn test_rotmg_degenerate_cases() {
        let mut param = [9.0f32; 5];
        let (mut d1, mut d2, mut x1) = (1.0f32, 0.0, 1.0);
        rotmg(&mut d1, &mut d2, &mut x1, 2.0, &mut param);
        assert_eq!(param[0], -2.0);
        assert_eq!(param[1], 9.0);

        let (mut d1, mut d2, mut x1) = (-1.0f32, 1.0, 1.0);
        rotmg(&mut d1, &mut d2, &mut x1, 2.0, &mut param);
        assert_eq!(param, [-1.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!((d1, d2, x1), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_rotm_identity_flag() {
        let mut x = vec![1.0f32, 2.0];
        let mut y = vec![3.0f32, 4.0];
        rotm(&mut x, &mut y, &[-2.0, 5.0, 5.0, 5.0, 5.0]);
        assert_eq!((x, y), (vec![1.0, 2.0], vec![3.0, 4.0]));
    }
}
