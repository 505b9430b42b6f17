//! Matrix order, transpose, triangle, diagonal and side selectors.
//!
//! Discriminants follow the classic OpenCL BLAS numbering (`RowMajor = 0`,
//! `NoTrans = 0`, ...), so the enums can cross an FFI boundary unchanged.

/// Memory order of a matrix stored in a linear buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum Order {
    /// Elements in a row are contiguous.
    #[default]
    RowMajor = 0,
    /// Elements in a column are contiguous.
    ColumnMajor = 1,
}

/// Transpose operation applied to a matrix operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum Transpose {
    #[default]
    NoTrans = 0,
    Trans = 1,
    /// Conjugate transpose (same as `Trans` for real types).
    ConjTrans = 2,
}

/// Which triangle of a symmetric, hermitian or triangular matrix is referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum Uplo {
    #[default]
    Upper = 0,
    Lower = 1,
}

/// Whether a triangular matrix has an implicit unit diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum Diag {
    Unit = 0,
    #[default]
    NonUnit = 1,
}

/// Side of the special matrix in symmetric and triangular matrix products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum Side {
    #[default]
    Left = 0,
    Right = 1,
}

impl Order {
    /// Minimum leading dimension for a stored `rows x cols` matrix.
    ///
    /// Never less than 1, so that degenerate shapes still have a valid stride.
    #[inline(always)]
    pub fn leading_dim(self, rows: usize, cols: usize) -> usize {
        match self {
            Order::RowMajor => cols.max(1),
            Order::ColumnMajor => rows.max(1),
        }
    }

    /// Linear index of element (i, j) relative to the matrix origin.
    #[inline(always)]
    pub fn index(self, i: usize, j: usize, ld: usize) -> usize {
        match self {
            Order::RowMajor => i * ld + j,
            Order::ColumnMajor => j * ld + i,
        }
    }

    /// Number of elements spanned by a stored `rows x cols` matrix with stride `ld`.
    ///
    /// Zero when either dimension is zero.
    #[inline]
    pub fn extent(self, rows: usize, cols: usize, ld: usize) -> usize {
        if rows == 0 || cols == 0 {
            return 0;
        }
        match self {
            Order::RowMajor => (rows - 1) * ld + cols,
            Order::ColumnMajor => (cols - 1) * ld + rows,
        }
    }

    /// The opposite order. A row-major matrix is a column-major view of its transpose.
    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Order::RowMajor => Order::ColumnMajor,
            Order::ColumnMajor => Order::RowMajor,
        }
    }
}

impl Transpose {
    /// True for `Trans` and `ConjTrans`.
    #[inline(always)]
    pub fn is_transposed(self) -> bool {
        !matches!(self, Transpose::NoTrans)
    }

    /// Stored dimensions of a matrix whose operated form `op(X)` is `rows x cols`.
    #[inline]
    pub fn stored_dims(self, rows: usize, cols: usize) -> (usize, usize) {
        match self {
            Transpose::NoTrans => (rows, cols),
            Transpose::Trans | Transpose::ConjTrans => (cols, rows),
        }
    }
}

impl Uplo {
    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Uplo::Upper => Uplo::Lower,
            Uplo::Lower => Uplo::Upper,
        }
    }

    /// Whether element (i, j) lies in this triangle (diagonal included).
    #[inline(always)]
    pub fn contains(self, i: usize, j: usize) -> bool {
        match self {
            Uplo::Upper => i <= j,
            Uplo::Lower => i >= j,
        }
    }

    /// Triangle occupied by `op(A)` when `A` stores this triangle.
    #[inline]
    pub fn under(self, trans: Transpose) -> Self {
        if trans.is_transposed() {
            self.flip()
        } else {
            self
        }
    }
}

impl Diag {
    #[inline(always)]
    pub fn is_unit(self) -> bool {
        matches!(self, Diag::Unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_both_orders() {
        // 2x3 matrix, element (1, 2)
        assert_eq!(Order::RowMajor.index(1, 2, 3), 5);
        assert_eq!(Order::ColumnMajor.index(1, 2, 2), 5);
    }

    #[test]
    fn test_leading_dim_minimum() {
        assert_eq!(Order::RowMajor.leading_dim(4, 7), 7);
        assert_eq!(Order::ColumnMajor.leading_dim(4, 7), 4);
        assert_eq!(Order::RowMajor.leading_dim(4, 0), 1);
    }

    #[test]
    fn test_extent() {
        assert_eq!(Order::RowMajor.extent(3, 4, 10), 24);
        assert_eq!(Order::ColumnMajor.extent(3, 4, 10), 33);
        assert_eq!(Order::ColumnMajor.extent(0, 4, 10), 0);
    }

    #[test]
    fn test_stored_dims() {
        assert_eq!(Transpose::NoTrans.stored_dims(2, 5), (2, 5));
        assert_eq!(Transpose::ConjTrans.stored_dims(2, 5), (5, 2));
    }

    #[test]
    fn test_uplo_under_transpose() {
        assert_eq!(Uplo::Upper.under(Transpose::NoTrans), Uplo::Upper);
        assert_eq!(Uplo::Upper.under(Transpose::Trans), Uplo::Lower);
        assert!(Uplo::Lower.contains(3, 1));
        assert!(!Uplo::Lower.contains(1, 3));
    }

    #[test]
    fn test_discriminants() {
        assert_eq!(Order::ColumnMajor as u32, 1);
        assert_eq!(Transpose::ConjTrans as u32, 2);
        assert_eq!(Diag::NonUnit as u32, 1);
        assert_eq!(Side::Right as u32, 1);
    }
}
