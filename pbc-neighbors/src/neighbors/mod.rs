//! Neighbor lists in periodic systems.
//!
//! Two flavors of neighbor lists are available:
//!
//! - a dense "bothways" list ([`compute_distances`]), storing the distance
//!   between every pair of atoms for every relevant periodic image in a 3D
//!   tensor. Each ordered pair `(i, j)` is present independently;
//! - a sparse "one-way" list ([`compute_oneway`]), where each unordered pair
//!   of atoms (including an atom paired with one of its own periodic images)
//!   is present exactly once. [`compute_oneway_cell_list`] builds the same
//!   list using a cell list, which is faster for large systems.
use crate::{Error, Matrix3, Vector3D, UnitCell, NeighborOptions};

mod dense;
pub use self::dense::{compute_distances, query_neighbors, ImageDistances};

mod oneway;
pub use self::oneway::{compute_oneway, OneWayNeighbors};

mod cell_list;
pub use self::cell_list::compute_oneway_cell_list;

/// Squared distance below which two atoms are reported as suspiciously close
const VERY_CLOSE_DISTANCE2: f64 = 1e-3;

/// A cell shift represents the displacement along cell axis between the actual
/// position of an atom and a periodic image of this atom.
///
/// The cell shift can be used to reconstruct the vector between two points,
/// wrapped inside the unit cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellShift(pub [i32; 3]);

impl std::ops::Add<CellShift> for CellShift {
    type Output = CellShift;

    fn add(mut self, rhs: CellShift) -> Self::Output {
        self.0[0] += rhs[0];
        self.0[1] += rhs[1];
        self.0[2] += rhs[2];
        return self;
    }
}

impl std::ops::Sub<CellShift> for CellShift {
    type Output = CellShift;

    fn sub(mut self, rhs: CellShift) -> Self::Output {
        self.0[0] -= rhs[0];
        self.0[1] -= rhs[1];
        self.0[2] -= rhs[2];
        return self;
    }
}

impl std::ops::Neg for CellShift {
    type Output = CellShift;

    fn neg(self) -> Self::Output {
        CellShift([-self[0], -self[1], -self[2]])
    }
}

impl std::ops::Index<usize> for CellShift {
    type Output = i32;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl From<[i32; 3]> for CellShift {
    fn from(shift: [i32; 3]) -> CellShift {
        CellShift(shift)
    }
}

impl CellShift {
    /// Compute the shift vector in cartesian coordinates, using the given cell
    /// matrix (stored in row major order).
    pub fn cartesian(&self, cell: &Matrix3) -> Vector3D {
        let x = cell[0][0] * self[0] as f64 + cell[1][0] * self[1] as f64 + cell[2][0] * self[2] as f64;
        let y = cell[0][1] * self[0] as f64 + cell[1][1] * self[1] as f64 + cell[2][1] * self[2] as f64;
        let z = cell[0][2] * self[0] as f64 + cell[1][2] * self[1] as f64 + cell[2][2] * self[2] as f64;
        Vector3D::new(x, y, z)
    }

    /// Is this the shift to the original cell?
    pub fn is_zero(&self) -> bool {
        self[0] == 0 && self[1] == 0 && self[2] == 0
    }

    /// Among a shift `s` and its opposite `-s`, exactly one is in the
    /// negative half-space. The zero shift is not.
    ///
    /// Shifts with `n0 > 0` are always kept and shifts with `n0 < 0` always
    /// dropped. In the `n0 = 0` plane, we keep the shifts indicated with `O`
    /// and drop the ones indicated with `X`:
    ///
    /// ```text
    ///  n2
    ///   ^  X X X O O O O
    ///   |  X X X O O O O
    ///   |  X X X O O O O
    ///   |  X X X O O O O   <- n2 = 0
    ///   |  X X X X O O O
    ///   |  X X X X O O O
    ///   |  X X X X O O O
    ///   +---------------> n1
    /// ```
    pub fn is_in_negative_half_space(&self) -> bool {
        self[0] < 0 || (self[0] == 0 && (self[1] < 0 || (self[1] == 0 && self[2] < 0)))
    }
}

/// Pair of atoms coming from a neighbor list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pair {
    /// index of the first atom in the pair
    pub first: usize,
    /// index of the second atom in the pair
    pub second: usize,
    /// distance between the two atoms
    pub distance: f64,
    /// vector from the first atom to the second atom, accounting for periodic
    /// boundary conditions. This should be `position\[second\] -
    /// position\[first\] + H * cell_shift` where `H` is the cell matrix.
    pub vector: Vector3D,
    /// How many cell shift where applied to the `second` atom to create this
    /// pair.
    pub cell_shift_indices: [i32; 3],
}

/// Square root of `distance2`, returning exactly 0 for a zero input.
///
/// The square root is never evaluated at 0 (1 is used in its place, and the
/// result discarded), so a differentiation layer wrapping this function sees
/// a zero derivative at the origin instead of an infinite one.
#[inline]
pub fn guarded_sqrt(distance2: f64) -> f64 {
    let is_zero = distance2 == 0.0;
    let adjusted = if is_zero { 1.0 } else { distance2 };
    let distance = f64::sqrt(adjusted);
    if is_zero { 0.0 } else { distance }
}

/// Convert an integral floating point value to a cell shift index, if it
/// can be represented
fn shift_index(value: f64) -> Option<i32> {
    if value.is_finite() && value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX) {
        Some(value as i32)
    } else {
        None
    }
}

/// Cell and positions after applying the strain, shared by all builders
pub(crate) struct StrainedSystem {
    pub cell: UnitCell,
    pub positions: Vec<Vector3D>,
}

impl StrainedSystem {
    /// Validate the inputs of a neighbor list builder, and apply the strain
    /// from `options` to both the cell and the positions.
    pub fn new(positions: &[Vector3D], cell: Matrix3, options: &NeighborOptions) -> Result<StrainedSystem, Error> {
        options.validate()?;

        if let Some(atom) = positions.iter().position(|position| !position.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "position of atom {} contains non-finite values: {:?}", atom, positions[atom]
            )));
        }

        let strain_tensor = options.strain_tensor();
        let cell = UnitCell::new(cell)?.strained(&strain_tensor)?;
        let positions = positions.iter().map(|&position| strain_tensor * position).collect();

        return Ok(StrainedSystem { cell, positions });
    }

    /// Get the integer shift bringing each atom inside the unit cell, i.e.
    /// such that `position + shift · H` has fractional coordinates in
    /// `[0, 1)`, together with these wrapped fractional coordinates.
    pub fn wrapping_shifts(&self) -> (Vec<CellShift>, Vec<Vector3D>) {
        let mut shifts = Vec::with_capacity(self.positions.len());
        let mut wrapped = Vec::with_capacity(self.positions.len());
        for &position in &self.positions {
            let fractional = self.cell.fractional(position);
            let wrapped_fractional = self.cell.wrap_fractional(position);
            let shift = wrapped_fractional - fractional;
            shifts.push(CellShift([
                shift[0].round() as i32,
                shift[1].round() as i32,
                shift[2].round() as i32,
            ]));
            wrapped.push(wrapped_fractional);
        }
        return (shifts, wrapped);
    }
}

/// Emit a warning if the pair between `first` and `second` is very short
fn warn_if_too_close(first: usize, second: usize, distance2: f64) {
    if distance2 < VERY_CLOSE_DISTANCE2 {
        log::warn!(
            "atoms {} and {} are very close to one another ({} A)",
            first, second, distance2.sqrt()
        );
    }
}
