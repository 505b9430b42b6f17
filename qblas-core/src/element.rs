//! Element types understood by the BLAS kernels.
//!
//! Four precisions are supported, matching the `s`/`d`/`c`/`z` routine prefixes:
//! `f32`, `f64`, [`Complex32`] and [`Complex64`]. Every element type has an
//! associated [`Real`] type used for norms, real scalars (`herk`, `csscal`) and
//! Givens cosines.

use bytemuck::Pod;
use num_complex::{Complex32, Complex64};
use num_traits::{Float, One, Zero};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// Runtime tag for an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DType {
    #[default]
    F32,
    F64,
    C32,
    C64,
}

impl DType {
    pub fn size_in_bytes(self) -> usize {
        match self {
            DType::F32 => 4,
            DType::F64 | DType::C32 => 8,
            DType::C64 => 16,
        }
    }

    /// Double-precision types need a device with fp64 support.
    pub fn is_double(self) -> bool {
        matches!(self, DType::F64 | DType::C64)
    }

    pub fn is_complex(self) -> bool {
        matches!(self, DType::C32 | DType::C64)
    }

    /// BLAS routine prefix.
    pub fn prefix(self) -> char {
        match self {
            DType::F32 => 's',
            DType::F64 => 'd',
            DType::C32 => 'c',
            DType::C64 => 'z',
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::F32 => "f32",
            DType::F64 => "f64",
            DType::C32 => "complex32",
            DType::C64 => "complex64",
        };
        f.write_str(name)
    }
}

/// A BLAS element: real or complex, single or double precision.
pub trait Element:
    Pod
    + Send
    + Sync
    + fmt::Debug
    + Default
    + PartialEq
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
{
    /// Real counterpart (`Self` for real types).
    type Real: Real;

    const DTYPE: DType;

    /// Kernels on this type need a device with fp64 support.
    #[inline]
    fn requires_fp64() -> bool {
        Self::DTYPE.is_double()
    }

    /// Complex conjugate; identity for real types.
    fn conj(self) -> Self;

    fn re(self) -> Self::Real;

    /// Imaginary part; zero for real types.
    fn im(self) -> Self::Real;

    fn from_real(re: Self::Real) -> Self;

    /// Build from parts. Real types ignore `im`.
    fn from_parts(re: Self::Real, im: Self::Real) -> Self;

    /// Modulus `|x|`.
    fn modulus(self) -> Self::Real;

    /// `|re(x)| + |im(x)|`, the BLAS "absolute value" used by `asum` and `iamax`.
    #[inline(always)]
    fn abs1(self) -> Self::Real {
        self.re().abs() + self.im().abs()
    }

    /// Multiply by a real scalar.
    #[inline(always)]
    fn scale(self, r: Self::Real) -> Self {
        self * Self::from_real(r)
    }
}

/// Real element types.
pub trait Real: Element<Real = Self> + Float {
    fn as_f64(self) -> f64;
    fn from_f64(v: f64) -> Self;
}

macro_rules! impl_real {
    ($t:ty, $dtype:expr) => {
        impl Element for $t {
            type Real = $t;
            const DTYPE: DType = $dtype;

            #[inline(always)]
            fn conj(self) -> Self {
                self
            }

            #[inline(always)]
            fn re(self) -> Self {
                self
            }

            #[inline(always)]
            fn im(self) -> Self {
                0.0
            }

            #[inline(always)]
            fn from_real(re: Self) -> Self {
                re
            }

            #[inline(always)]
            fn from_parts(re: Self, _im: Self) -> Self {
                re
            }

            #[inline(always)]
            fn modulus(self) -> Self {
                self.abs()
            }
        }

        impl Real for $t {
            #[inline(always)]
            fn as_f64(self) -> f64 {
                self as f64
            }

            #[inline(always)]
            fn from_f64(v: f64) -> Self {
                v as $t
            }
        }
    };
}

macro_rules! impl_complex {
    ($t:ty, $real:ty, $dtype:expr) => {
        impl Element for $t {
            type Real = $real;
            const DTYPE: DType = $dtype;

            #[inline(always)]
            fn conj(self) -> Self {
                <$t>::new(self.re, -self.im)
            }

            #[inline(always)]
            fn re(self) -> $real {
                self.re
            }

            #[inline(always)]
            fn im(self) -> $real {
                self.im
            }

            #[inline(always)]
            fn from_real(re: $real) -> Self {
                <$t>::new(re, 0.0)
            }

            #[inline(always)]
            fn from_parts(re: $real, im: $real) -> Self {
                <$t>::new(re, im)
            }

            #[inline(always)]
            fn modulus(self) -> $real {
                self.re.hypot(self.im)
            }

            #[inline(always)]
            fn scale(self, r: $real) -> Self {
                <$t>::new(self.re * r, self.im * r)
            }
        }
    };
}

impl_real!(f32, DType::F32);
impl_real!(f64, DType::F64);
impl_complex!(Complex32, f32, DType::C32);
impl_complex!(Complex64, f64, DType::C64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_properties() {
        assert!(DType::F64.is_double());
        assert!(DType::C64.is_double());
        assert!(!DType::C32.is_double());
        assert_eq!(DType::C64.size_in_bytes(), std::mem::size_of::<Complex64>());
        assert_eq!(DType::C32.prefix(), 'c');
    }

    #[test]
    fn test_complex_helpers() {
        let z = Complex32::new(3.0, -4.0);
        assert_eq!(Element::conj(z), Complex32::new(3.0, 4.0));
        assert_eq!(z.modulus(), 5.0);
        assert_eq!(z.abs1(), 7.0);
        assert_eq!(z.scale(2.0), Complex32::new(6.0, -8.0));
    }

    #[test]
    fn test_real_helpers() {
        assert_eq!(Element::conj(-2.0f64), -2.0);
        assert_eq!((-2.0f64).abs1(), 2.0);
        assert_eq!(<f32 as Element>::from_parts(1.5, 9.0), 1.5);
        assert_eq!(<f64 as Element>::DTYPE, DType::F64);
    }
}
