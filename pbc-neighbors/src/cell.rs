//! The `UnitCell` type represents the periodic box of a simulated system. The
//! rows of the cell matrix are the lattice vectors.
use crate::{Error, Matrix3, Vector3D};

/// Relative tolerance on the cell volume, compared to the product of the
/// lattice vector lengths, below which a cell is considered degenerate
const SINGULAR_CELL_TOLERANCE: f64 = 1e-10;

/// The shape of a cell, used to pick a cheaper path for some operations
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(clippy::module_name_repetitions)]
pub enum CellShape {
    /// Orthorhombic unit cell, with cuboid shape
    Orthorhombic,
    /// Triclinic unit cell, with arbitrary parallelepiped shape
    Triclinic,
}

/// An invertible `UnitCell`, defining periodic boundary conditions in all
/// three directions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(clippy::module_name_repetitions)]
pub struct UnitCell {
    /// Unit cell matrix, one lattice vector per row
    matrix: Matrix3,
    /// Inverse of the unit cell matrix, cached from matrix
    inverse: Matrix3,
    /// Transpose of the inverse of the unit cell matrix, cached from matrix
    inverse_transpose: Matrix3,
    /// Unit cell shape
    shape: CellShape,
}

impl UnitCell {
    /// Create a new unit cell from the given matrix, where each row is a
    /// lattice vector.
    ///
    /// This fails with `Error::InvalidParameter` if the matrix contains
    /// non-finite values, and with `Error::Numeric` if the cell is degenerate
    /// (its volume is negligible compared to the lengths of its vectors).
    pub fn new(matrix: Matrix3) -> Result<UnitCell, Error> {
        if !matrix.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "unit cell matrix contains non-finite values: {:?}", matrix
            )));
        }

        let lengths = Vector3D::from(matrix[0]).norm()
            * Vector3D::from(matrix[1]).norm()
            * Vector3D::from(matrix[2]).norm();

        let determinant = matrix.determinant();
        if !(f64::abs(determinant) > SINGULAR_CELL_TOLERANCE * lengths) {
            return Err(Error::Numeric(format!(
                "unit cell matrix is not invertible (determinant = {})", determinant
            )));
        }

        let is_close_0 = |value| f64::abs(value) < 1e-6;
        let is_diagonal = |matrix: Matrix3| {
            is_close_0(matrix[0][1]) && is_close_0(matrix[0][2]) &&
            is_close_0(matrix[1][0]) && is_close_0(matrix[1][2]) &&
            is_close_0(matrix[2][0]) && is_close_0(matrix[2][1])
        };

        let shape = if is_diagonal(matrix) {
            CellShape::Orthorhombic
        } else {
            CellShape::Triclinic
        };

        let inverse = matrix.inverse();
        return Ok(UnitCell {
            matrix: matrix,
            inverse: inverse,
            inverse_transpose: inverse.transposed(),
            shape: shape,
        });
    }

    /// Create an orthorhombic unit cell, with side lengths `a, b, c`.
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> Result<UnitCell, Error> {
        if !(a > 0.0 && b > 0.0 && c > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "cell lengths must be positive, got {}, {}, {}", a, b, c
            )));
        }

        UnitCell::new(Matrix3::new([
            [a, 0.0, 0.0],
            [0.0, b, 0.0],
            [0.0, 0.0, c]
        ]))
    }

    /// Create a cubic unit cell, with side lengths `length, length, length`.
    pub fn cubic(length: f64) -> Result<UnitCell, Error> {
        UnitCell::orthorhombic(length, length, length)
    }

    /// Create a triclinic unit cell, with side lengths `a, b, c` and angles
    /// `alpha, beta, gamma` (in degrees).
    pub fn triclinic(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Result<UnitCell, Error> {
        if !(a > 0.0 && b > 0.0 && c > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "cell lengths must be positive, got {}, {}, {}", a, b, c
            )));
        }

        let cos_alpha = alpha.to_radians().cos();
        let cos_beta = beta.to_radians().cos();
        let (sin_gamma, cos_gamma) = gamma.to_radians().sin_cos();

        let b_x = b * cos_gamma;
        let b_y = b * sin_gamma;

        let c_x = c * cos_beta;
        let c_y = c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let c_z = f64::sqrt(c * c - c_y * c_y - c_x * c_x);

        return UnitCell::new(Matrix3::new([
            [a,   0.0, 0.0],
            [b_x, b_y, 0.0],
            [c_x, c_y, c_z],
        ]));
    }

    /// Apply a deformation to this cell, transforming each lattice vector
    /// `v` into `strain_tensor * v`. The `strain_tensor` is the full
    /// deformation, i.e. `I + strain`.
    pub fn strained(&self, strain_tensor: &Matrix3) -> Result<UnitCell, Error> {
        // (S · Hᵀ)ᵀ = H · Sᵀ
        UnitCell::new(self.matrix * strain_tensor.transposed())
    }

    /// Get the cell shape
    pub fn shape(&self) -> CellShape {
        self.shape
    }

    /// Get the matricial representation of the unit cell
    pub fn matrix(&self) -> Matrix3 {
        self.matrix
    }

    /// Get the inverse of the cell matrix
    pub fn inverse(&self) -> Matrix3 {
        self.inverse
    }

    /// Get the volume of the cell. This is negative for left-handed cells.
    pub fn volume(&self) -> f64 {
        let a = Vector3D::from(self.matrix[0]);
        let b = Vector3D::from(self.matrix[1]);
        let c = Vector3D::from(self.matrix[2]);
        a * (b ^ c)
    }

    /// Get the norms of the columns of the inverse cell matrix, i.e. the
    /// lengths of the reciprocal lattice vectors (without the 2π factor).
    /// Along axis `i`, a sphere of radius `r` spans `r * reciprocal_norms[i]`
    /// cells.
    pub fn reciprocal_norms(&self) -> Vector3D {
        Vector3D::new(
            self.inverse.column(0).norm(),
            self.inverse.column(1).norm(),
            self.inverse.column(2).norm(),
        )
    }

    /// Get the distances between opposite faces of the unit cell
    pub fn distances_between_faces(&self) -> Vector3D {
        self.reciprocal_norms().map(|norm| 1.0 / norm)
    }

    /// Get the fractional representation of the `vector` in this cell
    pub fn fractional(&self, vector: Vector3D) -> Vector3D {
        // vector · H⁻¹, written as a matrix-vector product
        return self.inverse_transpose * vector;
    }

    /// Get the Cartesian representation of the `fractional` vector in this
    /// cell
    pub fn cartesian(&self, fractional: Vector3D) -> Vector3D {
        return fractional[0] * Vector3D::from(self.matrix[0])
             + fractional[1] * Vector3D::from(self.matrix[1])
             + fractional[2] * Vector3D::from(self.matrix[2]);
    }

    /// Get the fractional coordinates of `vector`, wrapped inside `[0, 1)`
    pub fn wrap_fractional(&self, vector: Vector3D) -> Vector3D {
        let fractional = match self.shape {
            CellShape::Orthorhombic => Vector3D::new(
                vector[0] / self.matrix[0][0],
                vector[1] / self.matrix[1][1],
                vector[2] / self.matrix[2][2],
            ),
            CellShape::Triclinic => self.fractional(vector),
        };

        // `rem_euclid` can round up to exactly 1.0 for tiny negative values,
        // fold these back to 0
        fractional.map(|x| {
            let wrapped = x.rem_euclid(1.0);
            if wrapped >= 1.0 { 0.0 } else { wrapped }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::{assert_ulps_eq, assert_relative_eq};

    #[test]
    fn negative_lengths() {
        assert!(matches!(UnitCell::cubic(-4.0), Err(Error::InvalidParameter(_))));
        assert!(matches!(UnitCell::orthorhombic(3.0, 0.0, -5.0), Err(Error::InvalidParameter(_))));
        assert!(matches!(
            UnitCell::triclinic(3.0, 0.0, -5.0, 90.0, 90.0, 90.0),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn degenerate() {
        let flat = Matrix3::new([
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
        ]);
        assert!(matches!(UnitCell::new(flat), Err(Error::Numeric(_))));
        assert!(matches!(UnitCell::new(Matrix3::zero()), Err(Error::Numeric(_))));

        let nearly_flat = Matrix3::new([
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 1e-12],
        ]);
        assert!(matches!(UnitCell::new(nearly_flat), Err(Error::Numeric(_))));

        let nan = Matrix3::new([
            [1.0, 0.0, 0.0],
            [0.0, f64::NAN, 0.0],
            [0.0, 0.0, 1.0],
        ]);
        assert!(matches!(UnitCell::new(nan), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn left_handed() {
        let cell = UnitCell::new(Matrix3::new([
            [0.0, 2.0, 0.0],
            [2.0, 0.0, 0.0],
            [0.0, 0.0, 2.0],
        ])).unwrap();

        assert_eq!(cell.shape(), CellShape::Triclinic);
        assert_eq!(cell.volume(), -8.0);
        assert_ulps_eq!(cell.distances_between_faces(), Vector3D::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn shapes() {
        let cell = UnitCell::cubic(3.0).unwrap();
        assert_eq!(cell.shape(), CellShape::Orthorhombic);
        assert_eq!(cell.volume(), 27.0);

        let cell = UnitCell::triclinic(3.0, 4.0, 5.0, 80.0, 90.0, 110.0).unwrap();
        assert_eq!(cell.shape(), CellShape::Triclinic);
        assert_relative_eq!(cell.volume(), 55.410529, epsilon = 1e-6);
    }

    #[test]
    fn distances_between_faces() {
        let ortho = UnitCell::orthorhombic(3.0, 4.0, 5.0).unwrap();
        assert_ulps_eq!(ortho.distances_between_faces(), Vector3D::new(3.0, 4.0, 5.0));
        assert_ulps_eq!(ortho.reciprocal_norms(), Vector3D::new(1.0 / 3.0, 0.25, 0.2));

        let triclinic = UnitCell::triclinic(3.0, 4.0, 5.0, 90.0, 80.0, 100.0).unwrap();
        assert_relative_eq!(
            triclinic.distances_between_faces(),
            Vector3D::new(2.908132319388713, 3.9373265973230853, 4.921658246653857),
            epsilon = 1e-12
        );
    }

    #[test]
    fn fractional_cartesian() {
        let cell = UnitCell::cubic(5.0).unwrap();

        assert_ulps_eq!(
            cell.fractional(Vector3D::new(0.0, 10.0, 4.0)),
            Vector3D::new(0.0, 2.0, 0.8)
        );
        assert_ulps_eq!(
            cell.cartesian(Vector3D::new(0.0, 2.0, 0.8)),
            Vector3D::new(0.0, 10.0, 4.0)
        );

        let cell = UnitCell::triclinic(5.0, 6.0, 3.6, 90.0, 53.0, 77.0).unwrap();
        let tests = vec![
            Vector3D::new(0.0, 10.0, 4.0),
            Vector3D::new(-5.0, 12.0, 4.9),
        ];

        for test in tests {
            let transformed = cell.cartesian(cell.fractional(test));
            assert_ulps_eq!(test, transformed, epsilon = 1e-14);
        }

        // a lattice vector has fractional coordinates (1, 0, 0)
        let a = Vector3D::from(cell.matrix()[0]);
        assert_relative_eq!(cell.fractional(a), Vector3D::new(1.0, 0.0, 0.0), epsilon = 1e-14);
    }

    #[test]
    fn wrap_fractional() {
        let cell = UnitCell::cubic(10.0).unwrap();
        assert_ulps_eq!(
            cell.wrap_fractional(Vector3D::new(9.0, 18.0, -6.0)),
            Vector3D::new(0.9, 0.8, 0.4)
        );

        let wrapped = cell.wrap_fractional(Vector3D::new(-1e-17, 0.0, 10.0));
        assert_eq!(wrapped, Vector3D::new(0.0, 0.0, 0.0));

        let cell = UnitCell::triclinic(3.0, 4.0, 5.0, 80.0, 90.0, 110.0).unwrap();
        let position = Vector3D::new(-7.0, 13.5, 6.2);
        let wrapped = cell.wrap_fractional(position);
        for i in 0..3 {
            assert!(wrapped[i] >= 0.0 && wrapped[i] < 1.0);
        }
        let fractional = cell.fractional(position);
        let shift = wrapped - fractional;
        for i in 0..3 {
            assert_relative_eq!(shift[i], shift[i].round(), epsilon = 1e-12);
        }
    }

    #[test]
    fn strain() {
        let cell = UnitCell::cubic(2.0).unwrap();

        let mut strain = Matrix3::one();
        strain[0][1] = 0.5;
        let strained = cell.strained(&strain).unwrap();
        // each lattice vector v becomes S v
        assert_eq!(strained.matrix(), Matrix3::new([
            [2.0, 0.0, 0.0],
            [1.0, 2.0, 0.0],
            [0.0, 0.0, 2.0],
        ]));

        let collapse = Matrix3::new([
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0],
        ]);
        assert!(matches!(cell.strained(&collapse), Err(Error::Numeric(_))));
    }
}
