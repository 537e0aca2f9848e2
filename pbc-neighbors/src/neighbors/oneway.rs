use log::debug;

use crate::{Error, Matrix3, Vector3D, UnitCell, NeighborOptions};
use super::{CellShift, Pair, StrainedSystem, guarded_sqrt, shift_index, warn_if_too_close};

/// Sparse "one-way" neighbor list, where each unordered pair of atoms is
/// stored exactly once.
///
/// For each atom `a`, `neighbors[a][n]` is the index of a neighbor `b` and
/// `displacements[a][n]` the cell shift `D` such that the vector from `a` to
/// this neighbor is `position[b] - position[a] + D · H`, where `H` is the
/// (strained) cell matrix. The reverse pair `(b, a, -D)` is never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OneWayNeighbors {
    /// Indices of the neighbors of each atom
    pub neighbors: Vec<Vec<usize>>,
    /// Cell shift of each neighbor, parallel to `neighbors`
    pub displacements: Vec<Vec<CellShift>>,
}

impl OneWayNeighbors {
    /// Create an empty list for `n_atoms` atoms
    pub(crate) fn with_atoms(n_atoms: usize) -> OneWayNeighbors {
        OneWayNeighbors {
            neighbors: vec![Vec::new(); n_atoms],
            displacements: vec![Vec::new(); n_atoms],
        }
    }

    pub(crate) fn push(&mut self, first: usize, second: usize, shift: CellShift) {
        self.neighbors[first].push(second);
        self.displacements[first].push(shift);
    }

    /// Get the number of atoms in this list
    pub fn n_atoms(&self) -> usize {
        self.neighbors.len()
    }

    /// Get the total number of pairs in this list
    pub fn len(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum()
    }

    /// Does this list contains no pairs?
    pub fn is_empty(&self) -> bool {
        self.neighbors.iter().all(Vec::is_empty)
    }

    /// Iterate over all `(first, second, shift)` triples, in the order
    /// of the first atom and then in construction order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, CellShift)> + '_ {
        self.neighbors.iter()
            .zip(&self.displacements)
            .enumerate()
            .flat_map(|(first, (neighbors, shifts))| {
                neighbors.iter().zip(shifts).map(move |(&second, &shift)| (first, second, shift))
            })
    }

    /// Compute the vectors and distances of all the pairs in this list for
    /// the given `positions` and `cell`.
    ///
    /// The geometry is used as-is: if the list was built with a strain, the
    /// same strain should already be applied to `positions` and `cell`. This
    /// allows evaluating a pair potential on a fixed list of pairs while the
    /// geometry changes.
    pub fn to_pairs(&self, positions: &[Vector3D], cell: &UnitCell) -> Result<Vec<Pair>, Error> {
        if positions.len() != self.n_atoms() {
            return Err(Error::InvalidParameter(format!(
                "expected {} positions for this neighbor list, got {}",
                self.n_atoms(), positions.len()
            )));
        }

        let cell_matrix = cell.matrix();
        let pairs = self.iter().map(|(first, second, shift)| {
            let vector = positions[second] - positions[first] + shift.cartesian(&cell_matrix);
            Pair {
                first: first,
                second: second,
                distance: guarded_sqrt(vector.norm2()),
                vector: vector,
                cell_shift_indices: shift.0,
            }
        }).collect();

        return Ok(pairs);
    }
}

/// Build the one-way neighbor list of the atoms at `positions` in the given
/// unit `cell` (one lattice vector per row).
///
/// The strain in `options` is applied first. Atoms are then wrapped inside
/// the cell and every pair with `distance² < cutoff² + skin` is found by
/// looping over half of the periodic images: `n0` in `0..=N0`, `n1` in
/// `-N1..=N1` and `n2` in `-N2..=N2`, skipping images in the negative
/// half-space. In the original cell only pairs `b > a` are kept.
///
/// For each atom, neighbors are ordered by cell shift of the image, then by
/// neighbor index.
#[time_graph::instrument(name = "compute_oneway")]
pub fn compute_oneway(positions: &[Vector3D], cell: Matrix3, options: &NeighborOptions) -> Result<OneWayNeighbors, Error> {
    let system = StrainedSystem::new(positions, cell, options)?;
    let cutoff2 = options.oneway_cutoff2();

    let (shifts, _) = system.wrapping_shifts();
    let cell_matrix = system.cell.matrix();
    let wrapped = system.positions.iter()
        .zip(&shifts)
        .map(|(&position, shift)| position + shift.cartesian(&cell_matrix))
        .collect::<Vec<_>>();

    let n_images = image_counts(&system.cell, options)?;
    debug!(
        "one-way neighbor list: searching images up to {:?} for {} atoms",
        n_images, wrapped.len()
    );

    let mut list = OneWayNeighbors::with_atoms(wrapped.len());
    for n0 in 0..=n_images[0] {
        for n1 in -n_images[1]..=n_images[1] {
            for n2 in -n_images[2]..=n_images[2] {
                let image = CellShift([n0, n1, n2]);
                if image.is_in_negative_half_space() {
                    continue;
                }

                let translation = image.cartesian(&cell_matrix);
                let is_origin = image.is_zero();
                for (a, &position_a) in wrapped.iter().enumerate() {
                    let start = if is_origin { a + 1 } else { 0 };
                    for (b, &position_b) in wrapped.iter().enumerate().skip(start) {
                        let vector = position_b + translation - position_a;
                        let distance2 = vector.norm2();
                        if distance2 < cutoff2 {
                            warn_if_too_close(a, b, distance2);
                            list.push(a, b, image + shifts[b] - shifts[a]);
                        }
                    }
                }
            }
        }
    }

    return Ok(list);
}

/// Number of periodic images to search along each axis, `floor(2 r / h) + 1`
/// where `h` are the distances between opposite faces of the cell and `r`
/// the largest distance that can pass the squared cutoff test.
fn image_counts(cell: &UnitCell, options: &NeighborOptions) -> Result<[i32; 3], Error> {
    let radius = f64::max(options.cutoff, f64::sqrt(options.oneway_cutoff2()));
    let faces = cell.distances_between_faces();

    let mut counts = [0; 3];
    for (axis, count) in counts.iter_mut().enumerate() {
        let images = shift_index(f64::floor(2.0 * radius / faces[axis]))
            .and_then(|images| images.checked_add(1));
        *count = images.ok_or_else(|| Error::InvalidParameter(format!(
            "the cutoff {} is too large compared to the cell: periodic \
            images along axis {} can not be indexed", options.cutoff, axis
        )))?;
    }

    return Ok(counts);
}
