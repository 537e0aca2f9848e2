use log::debug;
use ndarray::Array3;

use crate::{Error, Matrix3, Vector3D, UnitCell, NeighborOptions};
use super::{CellShift, OneWayNeighbors, StrainedSystem, warn_if_too_close};

/// Maximal number of cells, we need to use this to prevent having too many
/// cells with a small unit cell and a large cutoff
const MAX_NUMBER_OF_CELLS: f64 = 1e5;

/// Candidate pair produced by the cell list. The vector between the atoms can
/// be constructed as `position[second] - position[first] + shift.cartesian(H)`
#[derive(Debug, Clone, Copy)]
struct CellPair {
    first: usize,
    second: usize,
    shift: CellShift,
}

/// Data associated with an atom inside the `CellList`
#[derive(Debug, Clone)]
struct AtomData {
    /// index of the atom in the original system
    index: usize,
    /// the shift from the actual atom position to the image of this atom
    /// inside the unit cell
    shift: CellShift,
}

/// The cell list is used to sort atoms inside bins/cells.
///
/// The list of potential pairs is then constructed by looking through all
/// neighboring cells (the number of cells to search depends on the cutoff and
/// the size of the cells) for each atom to create pair candidates.
#[derive(Debug, Clone)]
struct CellList {
    /// How many cells do we need to look at when searching neighbors to include
    /// all neighbors below cutoff
    n_search: [i32; 3],
    /// the cells themselves
    cells: Array3<Vec<AtomData>>,
    /// Unit cell defining periodic boundary conditions
    unit_cell: UnitCell,
}

impl CellList {
    /// Create a new `CellList` for the given unit cell and cutoff, determining
    /// all required parameters. The cutoff must be strictly positive.
    fn new(unit_cell: UnitCell, cutoff: f64) -> CellList {
        debug_assert!(cutoff > 0.0);
        let distances_between_faces = unit_cell.distances_between_faces();

        let mut n_cells = [
            f64::clamp(f64::trunc(distances_between_faces[0] / cutoff), 1.0, f64::INFINITY),
            f64::clamp(f64::trunc(distances_between_faces[1] / cutoff), 1.0, f64::INFINITY),
            f64::clamp(f64::trunc(distances_between_faces[2] / cutoff), 1.0, f64::INFINITY),
        ];

        // limit memory consumption by ensuring we have less than `MAX_N_CELLS`
        // cells to look though
        let n_cells_total = n_cells[0] * n_cells[1] * n_cells[2];
        if n_cells_total > MAX_NUMBER_OF_CELLS {
            // set the total number of cells close to MAX_N_CELLS, while keeping
            // roughly the ratio of cells in each direction
            let ratio_x_y = n_cells[0] / n_cells[1];
            let ratio_y_z = n_cells[1] / n_cells[2];

            n_cells[2] = f64::max(1.0, f64::trunc(f64::cbrt(MAX_NUMBER_OF_CELLS / (ratio_x_y * ratio_y_z * ratio_y_z))));
            n_cells[1] = f64::max(1.0, f64::trunc(ratio_y_z * n_cells[2]));
            n_cells[0] = f64::max(1.0, f64::trunc(ratio_x_y * n_cells[1]));
        }

        // number of cells to search in each direction to make sure all possible
        // pairs below the cutoff are accounted for.
        let n_search = [
            i32::max(f64::ceil(cutoff * n_cells[0] / distances_between_faces[0]) as i32, 1),
            i32::max(f64::ceil(cutoff * n_cells[1] / distances_between_faces[1]) as i32, 1),
            i32::max(f64::ceil(cutoff * n_cells[2] / distances_between_faces[2]) as i32, 1),
        ];

        let n_cells = [
            n_cells[0] as usize,
            n_cells[1] as usize,
            n_cells[2] as usize,
        ];

        debug!("cell list: {:?} cells, searching {:?} neighboring cells", n_cells, n_search);

        CellList {
            n_search: n_search,
            cells: Array3::from_elem(n_cells, Vec::new()),
            unit_cell: unit_cell,
        }
    }

    /// Add a single atom to the cell list at the given `position`. The atom is
    /// uniquely identified by its `index`.
    fn add_atom(&mut self, index: usize, position: Vector3D) {
        let fractional = self.unit_cell.fractional(position);

        let n_cells = self.cells.shape();
        let n_cells = [n_cells[0], n_cells[1], n_cells[2]];

        // find the subcell in which this atom 'should go'
        let cell_index = [
            f64::floor(fractional[0] * n_cells[0] as f64) as i32,
            f64::floor(fractional[1] * n_cells[1] as f64) as i32,
            f64::floor(fractional[2] * n_cells[2] as f64) as i32,
        ];

        // deal with pbc by wrapping the atom inside if it was outside of the
        // cell
        let (shift, cell_index) = divmod_vec(cell_index, n_cells);
        self.cells[cell_index].push(AtomData {
            index: index,
            shift: CellShift(shift),
        });
    }

    /// Get the list of candidate pairs. Some pairs might be separated by more
    /// than `cutoff`, so additional filtering of the pairs is required later.
    ///
    /// Each pair is only included once: if atoms 33 and 64 are in range of
    /// each other, the output will only contain pairs in the order 33-64, and
    /// not 64-33. Pairs between an atom and its own periodic images only use
    /// shifts outside of the negative half-space.
    ///
    /// If two atoms are neighbors of one another more than once (this happens
    /// when the cutoff is larger than half the cell), all pairs at different
    /// distances/directions are still included.
    fn pairs(&self) -> Vec<CellPair> {
        let mut pairs = Vec::new();

        let n_cells = self.cells.shape();
        let n_cells = [n_cells[0], n_cells[1], n_cells[2]];

        let search_x = -self.n_search[0]..=self.n_search[0];
        let search_y = -self.n_search[1]..=self.n_search[1];
        let search_z = -self.n_search[2]..=self.n_search[2];

        // for each cell in the cell list
        for ((cell_i_x, cell_i_y, cell_i_z), current_cell) in self.cells.indexed_iter() {
            if current_cell.is_empty() {
                continue;
            }

            // look through each neighboring cell
            for delta_x in search_x.clone() {
                for delta_y in search_y.clone() {
                    for delta_z in search_z.clone() {
                        let cell_i = [
                            cell_i_x as i32 + delta_x,
                            cell_i_y as i32 + delta_y,
                            cell_i_z as i32 + delta_z,
                        ];

                        // shift vector from one cell to the other and index of
                        // the neighboring cell
                        let (cell_shift, neighbor_cell_i) = divmod_vec(cell_i, n_cells);

                        for atom_i in current_cell {
                            for atom_j in &self.cells[neighbor_cell_i] {
                                if atom_i.index > atom_j.index {
                                    continue;
                                }

                                let shift = CellShift(cell_shift) + atom_i.shift - atom_j.shift;
                                if atom_i.index == atom_j.index
                                    && (shift.is_zero() || shift.is_in_negative_half_space()) {
                                    continue;
                                }

                                pairs.push(CellPair {
                                    first: atom_i.index,
                                    second: atom_j.index,
                                    shift: shift,
                                });
                            }
                        }
                    }
                }
            }
        }

        return pairs;
    }
}

/// Function to compute both quotient and remainder of the division of a by b.
/// This function follows Python convention, making sure the remainder have the
/// same sign as `b`.
fn divmod(a: i32, b: usize) -> (i32, usize) {
    debug_assert!(b < (i32::MAX as usize));
    let b = b as i32;
    let mut quotient = a / b;
    let mut remainder = a % b;
    if remainder < 0 {
        remainder += b;
        quotient -= 1;
    }
    return (quotient, remainder as usize);
}

/// Apply the [`divmod`] function to three components at the time
fn divmod_vec(a: [i32; 3], b: [usize; 3]) -> ([i32; 3], [usize; 3]) {
    let (qx, rx) = divmod(a[0], b[0]);
    let (qy, ry) = divmod(a[1], b[1]);
    let (qz, rz) = divmod(a[2], b[2]);
    return ([qx, qy, qz], [rx, ry, rz]);
}

/// Build the same one-way neighbor list as [`super::compute_oneway`], using a
/// cell list. This scales linearly with the number of atoms, and is faster
/// for large systems.
///
/// The set of unordered pairs is the same as the one found by
/// `compute_oneway`, but a given pair can be stored from the other atom (as
/// `(b, a, -D)` instead of `(a, b, D)`). Here the first atom of a pair is
/// always the one with the smallest index, and the neighbors of each atom are
/// sorted by index and cell shift.
#[time_graph::instrument(name = "compute_oneway_cell_list")]
pub fn compute_oneway_cell_list(positions: &[Vector3D], cell: Matrix3, options: &NeighborOptions) -> Result<OneWayNeighbors, Error> {
    let system = StrainedSystem::new(positions, cell, options)?;
    let cutoff2 = options.oneway_cutoff2();

    let mut list = OneWayNeighbors::with_atoms(system.positions.len());
    if !(cutoff2 > 0.0) || system.positions.is_empty() {
        return Ok(list);
    }

    let mut cell_list = CellList::new(system.cell, f64::sqrt(cutoff2));
    for (index, &position) in system.positions.iter().enumerate() {
        cell_list.add_atom(index, position);
    }

    let cell_matrix = system.cell.matrix();

    // the cell list creates too many pairs, we only need to keep the one where
    // the distance is actually below the cutoff
    let mut pairs_by_atom = vec![Vec::new(); system.positions.len()];
    for pair in cell_list.pairs() {
        let mut vector = system.positions[pair.second] - system.positions[pair.first];
        vector += pair.shift.cartesian(&cell_matrix);

        let distance2 = vector.norm2();
        if distance2 < cutoff2 {
            warn_if_too_close(pair.first, pair.second, distance2);
            pairs_by_atom[pair.first].push((pair.second, pair.shift));
        }
    }

    for (first, mut pairs) in pairs_by_atom.into_iter().enumerate() {
        pairs.sort_unstable();
        for (second, shift) in pairs {
            list.push(first, second, shift);
        }
    }

    return Ok(list);
}
