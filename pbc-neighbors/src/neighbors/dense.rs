use std::ops::RangeInclusive;

use log::{debug, warn};
use ndarray::{Array3, ArrayView3, ArrayViewMut2, Axis};
use rayon::prelude::*;

use crate::{Error, Matrix3, Vector3D, UnitCell, NeighborOptions};
use super::{CellShift, StrainedSystem, guarded_sqrt, shift_index, warn_if_too_close};

/// Number of entries in the distance tensor above which we warn about memory
/// consumption
const LARGE_TENSOR_ENTRIES: usize = 100_000_000;

/// Dense "bothways" neighbor list, storing distances between all pairs of
/// atoms and all the periodic images required to find every neighbor within
/// the cutoff.
#[derive(Debug, Clone)]
pub struct ImageDistances {
    /// Distance tensor of shape `(n_atoms, n_atoms, n_images)`:
    /// `distances[[i, j, k]]` is the distance between atom `i` and the
    /// `k`-th periodic image of atom `j`, or zero if this distance is larger
    /// than the cutoff.
    ///
    /// Zero is also the distance between an atom and itself in the original
    /// cell: use the corresponding offset to tell the two apart.
    pub distances: Array3<f64>,
    /// Cell shift of each periodic image, parallel to the last axis of
    /// `distances`. The `k`-th image of atom `j` is at
    /// `position[j] + offsets[k] · H`.
    pub offsets: Vec<CellShift>,
}

impl ImageDistances {
    /// Get the number of atoms in this neighbor list
    pub fn n_atoms(&self) -> usize {
        self.distances.shape()[0]
    }

    /// Get the index of the zero offset (i.e. the original cell) in
    /// `self.offsets`.
    pub fn origin(&self) -> Option<usize> {
        self.offsets.iter().position(CellShift::is_zero)
    }

    /// Get the neighbors of `atom`, see [`query_neighbors`].
    pub fn neighbors(&self, atom: usize, oneway: bool) -> Result<(Vec<usize>, Vec<CellShift>), Error> {
        query_neighbors(atom, self.distances.view(), &self.offsets, oneway)
    }

    /// Get the number of neighbors of `atom` in the bothways list, including
    /// periodic images of `atom` itself.
    pub fn neighbor_count(&self, atom: usize) -> Result<usize, Error> {
        check_atom(atom, self.n_atoms())?;
        let count = self.distances.index_axis(Axis(0), atom)
            .iter()
            .filter(|&&distance| distance > 0.0)
            .count();
        return Ok(count);
    }
}

/// Get the distances between all atoms at `positions` and all their periodic
/// images in the unit `cell` (one lattice vector per row), up to the cutoff
/// in `options`.
///
/// The strain in `options` is first applied to both the cell and the
/// positions. Distances are then computed for all atoms `i`, `j` and all cell
/// shifts `k` in a box large enough to contain every image closer than
/// `options.cutoff + options.skin`. Distances which are not strictly below
/// this value are set to zero.
///
/// The cost of this function is `O(N² K)` in both time and memory, where `K`
/// is the number of periodic images, which grows with the cutoff and with the
/// anisotropy of the cell.
#[time_graph::instrument(name = "compute_distances")]
pub fn compute_distances(positions: &[Vector3D], cell: Matrix3, options: &NeighborOptions) -> Result<ImageDistances, Error> {
    let system = StrainedSystem::new(positions, cell, options)?;
    let cutoff = options.effective_cutoff();

    let (shifts, wrapped) = system.wrapping_shifts();
    let ranges = image_ranges(&system.cell, &wrapped, &shifts, cutoff)?;
    debug!(
        "dense neighbor list: searching images in {:?} x {:?} x {:?}",
        ranges[0], ranges[1], ranges[2]
    );

    let mut offsets = Vec::new();
    for a in ranges[0].clone() {
        for b in ranges[1].clone() {
            for c in ranges[2].clone() {
                offsets.push(CellShift([a, b, c]));
            }
        }
    }

    let cell_matrix = system.cell.matrix();
    let translations = offsets.iter()
        .map(|offset| offset.cartesian(&cell_matrix))
        .collect::<Vec<_>>();

    let n_atoms = system.positions.len();
    let n_entries = n_atoms.saturating_mul(n_atoms).saturating_mul(offsets.len());
    if n_entries > LARGE_TENSOR_ENTRIES {
        warn!(
            "the dense distance tensor will contain {} entries ({} atoms, {} periodic images), \
            consider using a one-way neighbor list instead",
            n_entries, n_atoms, offsets.len()
        );
    }

    let positions = &system.positions;
    let fill = |i: usize, mut slab: ArrayViewMut2<f64>| {
        for (j, &position_j) in positions.iter().enumerate() {
            for (k, translation) in translations.iter().enumerate() {
                let vector = position_j + translation - positions[i];
                let distance2 = vector.norm2();
                let distance = guarded_sqrt(distance2);
                if distance < cutoff {
                    if !(i == j && offsets[k].is_zero()) {
                        warn_if_too_close(i, j, distance2);
                    }
                    slab[[j, k]] = distance;
                }
            }
        }
    };

    let mut distances = Array3::zeros((n_atoms, n_atoms, offsets.len()));
    if options.parallel {
        distances.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(i, slab)| fill(i, slab));
    } else {
        for (i, slab) in distances.axis_iter_mut(Axis(0)).enumerate() {
            fill(i, slab);
        }
    }

    return Ok(ImageDistances { distances, offsets });
}

/// Get the inclusive range of cell shifts to search along each axis.
///
/// For atoms with wrapped fractional coordinates `s` in `[0, 1)`, an image
/// at shift `k` can only be within `radius` if `|s_j + k - s_i| <= r` along
/// each axis, where `r` is the radius in fractional units. The range is then
/// widened by the spread of the atoms own wrapping shifts, to account for
/// atoms given outside of the cell.
///
/// This fails if the range along one axis does not fit in an `i32`.
fn image_ranges(cell: &UnitCell, wrapped: &[Vector3D], shifts: &[CellShift], radius: f64) -> Result<[RangeInclusive<i32>; 3], Error> {
    let repeats = radius * cell.reciprocal_norms();

    let mut ranges = [0..=0, 0..=0, 0..=0];
    for (axis, range) in ranges.iter_mut().enumerate() {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for fractional in wrapped {
            min = f64::min(min, f64::floor(fractional[axis] - repeats[axis]));
            max = f64::max(max, f64::ceil(fractional[axis] + repeats[axis]));
        }

        if wrapped.is_empty() {
            min = f64::floor(-repeats[axis]);
            max = f64::ceil(repeats[axis]);
        }

        let spread = match (shifts.iter().map(|s| s[axis]).min(), shifts.iter().map(|s| s[axis]).max()) {
            (Some(min), Some(max)) => max.checked_sub(min),
            _ => Some(0),
        };

        let start = shift_index(min).zip(spread).and_then(|(min, spread)| min.checked_sub(spread));
        let end = shift_index(max).zip(spread).and_then(|(max, spread)| max.checked_add(spread));
        match (start, end) {
            (Some(start), Some(end)) => *range = start..=end,
            _ => {
                return Err(Error::InvalidParameter(format!(
                    "the cutoff {} is too large compared to the cell: periodic \
                    images along axis {} can not be indexed", radius, axis
                )));
            }
        }
    }

    return Ok(ranges);
}

fn check_atom(atom: usize, n_atoms: usize) -> Result<(), Error> {
    if atom >= n_atoms {
        return Err(Error::InvalidParameter(format!(
            "atom index {} is out of bounds for a system with {} atoms", atom, n_atoms
        )));
    }
    return Ok(());
}

/// Get the indices and cell offsets of all neighbors of `atom`, using the
/// `distances` and `offsets` produced by [`compute_distances`].
///
/// Every entry with a strictly positive distance is a neighbor. Entries are
/// returned ordered by neighbor index, then by offset index.
///
/// With `oneway = false`, the full "bothways" list is returned: if `j` is a
/// neighbor of `i` through offset `k`, then `i` is a neighbor of `j` through
/// `-k`, and both appear in their respective lists. Periodic images of `atom`
/// itself are included.
///
/// With `oneway = true`, only neighbors `j > atom` are returned, together with
/// images of `atom` itself whose offset is not in the negative half-space
/// (see [`CellShift::is_in_negative_half_space`]). Collecting the neighbors of
/// all atoms this way gives every unordered pair exactly once.
pub fn query_neighbors(
    atom: usize,
    distances: ArrayView3<f64>,
    offsets: &[CellShift],
    oneway: bool,
) -> Result<(Vec<usize>, Vec<CellShift>), Error> {
    let shape = distances.shape();
    if shape[2] != offsets.len() {
        return Err(Error::InvalidParameter(format!(
            "the distance tensor contains {} periodic images, but got {} offsets",
            shape[2], offsets.len()
        )));
    }
    check_atom(atom, shape[0])?;

    let mut indices = Vec::new();
    let mut neighbor_offsets = Vec::new();
    for ((neighbor, k), &distance) in distances.index_axis(Axis(0), atom).indexed_iter() {
        if !(distance > 0.0) {
            continue;
        }

        let offset = offsets[k];
        if oneway {
            let keep = neighbor > atom || (
                neighbor == atom && !offset.is_zero() && !offset.is_in_negative_half_space()
            );
            if !keep {
                continue;
            }
        }

        indices.push(neighbor);
        neighbor_offsets.push(offset);
    }

    return Ok((indices, neighbor_offsets));
}
