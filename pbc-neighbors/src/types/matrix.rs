use std::ops::{Add, Sub, Mul, Index, IndexMut};

use approx::{AbsDiffEq, RelativeEq, UlpsEq};

use super::Vector3D;

/// A 3x3 matrix type, stored in row-major order. When used as a unit cell,
/// each row is one of the lattice vectors.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Matrix3([[f64; 3]; 3]);

impl Matrix3 {
    /// Create a new `Matrix3` from the given rows
    pub fn new(data: [[f64; 3]; 3]) -> Matrix3 {
        Matrix3(data)
    }

    /// Create a new `Matrix3` with all components set to zero
    pub fn zero() -> Matrix3 {
        Matrix3([[0.0; 3]; 3])
    }

    /// Create the identity matrix
    pub fn one() -> Matrix3 {
        Matrix3([
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ])
    }

    /// Get the transpose of this matrix
    pub fn transposed(&self) -> Matrix3 {
        let m = &self.0;
        Matrix3([
            [m[0][0], m[1][0], m[2][0]],
            [m[0][1], m[1][1], m[2][1]],
            [m[0][2], m[1][2], m[2][2]],
        ])
    }

    /// Get the determinant of this matrix
    pub fn determinant(&self) -> f64 {
        let m = &self.0;
        m[0][0] * (m[1][1] * m[2][2] - m[2][1] * m[1][2]) -
        m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0]) +
        m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Get the inverse of this matrix. The matrix must be invertible, this is
    /// only checked in debug mode. Use [`UnitCell::new`](crate::UnitCell::new)
    /// to get a checked inverse of a cell matrix.
    pub fn inverse(&self) -> Matrix3 {
        let determinant = self.determinant();
        debug_assert!(determinant != 0.0, "the matrix is not invertible");

        let m = &self.0;
        let factor = 1.0 / determinant;
        Matrix3([
            [
                (m[1][1] * m[2][2] - m[2][1] * m[1][2]) * factor,
                (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * factor,
                (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * factor,
            ],
            [
                (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * factor,
                (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * factor,
                (m[1][0] * m[0][2] - m[0][0] * m[1][2]) * factor,
            ],
            [
                (m[1][0] * m[2][1] - m[2][0] * m[1][1]) * factor,
                (m[2][0] * m[0][1] - m[0][0] * m[2][1]) * factor,
                (m[0][0] * m[1][1] - m[1][0] * m[0][1]) * factor,
            ],
        ])
    }

    /// Get the `i`-th column of this matrix
    pub fn column(&self, i: usize) -> Vector3D {
        Vector3D::new(self.0[0][i], self.0[1][i], self.0[2][i])
    }

    /// Check that all the components of this matrix are finite
    pub fn is_finite(&self) -> bool {
        self.0.iter().flatten().all(|value| value.is_finite())
    }
}

impl From<[[f64; 3]; 3]> for Matrix3 {
    fn from(data: [[f64; 3]; 3]) -> Matrix3 {
        Matrix3(data)
    }
}

impl From<Matrix3> for [[f64; 3]; 3] {
    fn from(matrix: Matrix3) -> [[f64; 3]; 3] {
        matrix.0
    }
}

impl Index<usize> for Matrix3 {
    type Output = [f64; 3];
    #[inline]
    fn index(&self, index: usize) -> &[f64; 3] {
        &self.0[index]
    }
}

impl IndexMut<usize> for Matrix3 {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut [f64; 3] {
        &mut self.0[index]
    }
}

impl_arithmetic!(
    Matrix3, Matrix3, Add, add, Matrix3,
    self, other,
    {
        let mut result = Matrix3::zero();
        for i in 0..3 {
            for j in 0..3 {
                result[i][j] = self[i][j] + other[i][j];
            }
        }
        result
    }
);

impl_arithmetic!(
    Matrix3, Matrix3, Sub, sub, Matrix3,
    self, other,
    {
        let mut result = Matrix3::zero();
        for i in 0..3 {
            for j in 0..3 {
                result[i][j] = self[i][j] - other[i][j];
            }
        }
        result
    }
);

impl_arithmetic!(
    Matrix3, Matrix3, Mul, mul, Matrix3,
    self, other,
    {
        let mut result = Matrix3::zero();
        for i in 0..3 {
            for j in 0..3 {
                result[i][j] = self[i][0] * other[0][j] + self[i][1] * other[1][j] + self[i][2] * other[2][j];
            }
        }
        result
    }
);

impl_arithmetic!(
    Matrix3, Vector3D, Mul, mul, Vector3D,
    self, other,
    Vector3D::new(
        self[0][0] * other[0] + self[0][1] * other[1] + self[0][2] * other[2],
        self[1][0] * other[0] + self[1][1] * other[1] + self[1][2] * other[2],
        self[2][0] * other[0] + self[2][1] * other[1] + self[2][2] * other[2],
    )
);

lsh_scal_arithmetic!(
    Matrix3, Mul, mul, Matrix3,
    self, other,
    {
        let mut result = Matrix3::zero();
        for i in 0..3 {
            for j in 0..3 {
                result[i][j] = self[i][j] * other;
            }
        }
        result
    }
);

impl AbsDiffEq for Matrix3 {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Matrix3, epsilon: f64) -> bool {
        self.0.iter().flatten()
            .zip(other.0.iter().flatten())
            .all(|(a, b)| f64::abs_diff_eq(a, b, epsilon))
    }
}

impl RelativeEq for Matrix3 {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Matrix3, epsilon: f64, max_relative: f64) -> bool {
        self.0.iter().flatten()
            .zip(other.0.iter().flatten())
            .all(|(a, b)| f64::relative_eq(a, b, epsilon, max_relative))
    }
}

impl UlpsEq for Matrix3 {
    fn default_max_ulps() -> u32 {
        f64::default_max_ulps()
    }

    fn ulps_eq(&self, other: &Matrix3, epsilon: f64, max_ulps: u32) -> bool {
        self.0.iter().flatten()
            .zip(other.0.iter().flatten())
            .all(|(a, b)| f64::ulps_eq(a, b, epsilon, max_ulps))
    }
}
