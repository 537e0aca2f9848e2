#![allow(dead_code)]

use std::collections::BTreeSet;

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use pbc_neighbors::{CellShift, Matrix3, Vector3D, OneWayNeighbors, ImageDistances};

/// Atomic positions together with the unit cell (one lattice vector per row)
pub struct Structure {
    pub positions: Vec<Vector3D>,
    pub cell: Matrix3,
}

impl Structure {
    /// Repeat this structure `repeats` times along each lattice vector
    pub fn repeat(&self, repeats: [usize; 3]) -> Structure {
        let a = Vector3D::from(self.cell[0]);
        let b = Vector3D::from(self.cell[1]);
        let c = Vector3D::from(self.cell[2]);

        let mut positions = Vec::new();
        for i in 0..repeats[0] {
            for j in 0..repeats[1] {
                for k in 0..repeats[2] {
                    let translation = i as f64 * a + j as f64 * b + k as f64 * c;
                    for &position in &self.positions {
                        positions.push(position + translation);
                    }
                }
            }
        }

        let cell = Matrix3::new([
            (repeats[0] as f64 * a).into(),
            (repeats[1] as f64 * b).into(),
            (repeats[2] as f64 * c).into(),
        ]);

        return Structure { positions, cell };
    }

    /// Randomly displace all atoms by up to `amplitude` along each axis. The
    /// displacement is reproducible for a given `seed`.
    pub fn rattle(mut self, amplitude: f64, seed: u64) -> Structure {
        let mut rng = StdRng::seed_from_u64(seed);
        for position in &mut self.positions {
            *position += Vector3D::new(
                rng.gen_range(-amplitude..amplitude),
                rng.gen_range(-amplitude..amplitude),
                rng.gen_range(-amplitude..amplitude),
            );
        }
        return self;
    }

    /// Translate all atoms by `translation`, moving some of them outside of
    /// the unit cell
    pub fn translate(mut self, translation: Vector3D) -> Structure {
        for position in &mut self.positions {
            *position += translation;
        }
        return self;
    }
}

fn cubic_cell(a: f64) -> Matrix3 {
    Matrix3::new([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]])
}

/// Simple cubic crystal, one atom in a cubic cell of side `a`
pub fn simple_cubic(a: f64) -> Structure {
    Structure {
        positions: vec![Vector3D::zero()],
        cell: cubic_cell(a),
    }
}

/// Conventional cubic cell of a fcc crystal, with 4 atoms
pub fn fcc(a: f64) -> Structure {
    let half = a / 2.0;
    Structure {
        positions: vec![
            Vector3D::new(0.0, 0.0, 0.0),
            Vector3D::new(0.0, half, half),
            Vector3D::new(half, 0.0, half),
            Vector3D::new(half, half, 0.0),
        ],
        cell: cubic_cell(a),
    }
}

/// Primitive cell of a fcc crystal, with a single atom
pub fn fcc_primitive(a: f64) -> Structure {
    let half = a / 2.0;
    Structure {
        positions: vec![Vector3D::zero()],
        cell: Matrix3::new([
            [0.0, half, half],
            [half, 0.0, half],
            [half, half, 0.0],
        ]),
    }
}

/// Conventional cubic cell of a bcc crystal, with 2 atoms
pub fn bcc(a: f64) -> Structure {
    Structure {
        positions: vec![Vector3D::zero(), Vector3D::new(a / 2.0, a / 2.0, a / 2.0)],
        cell: cubic_cell(a),
    }
}

/// Conventional cubic cell of a diamond crystal, with 8 atoms
pub fn diamond(a: f64) -> Structure {
    let mut structure = fcc(a);
    let shift = Vector3D::new(a / 4.0, a / 4.0, a / 4.0);
    let shifted = structure.positions.iter().map(|&p| p + shift).collect::<Vec<_>>();
    structure.positions.extend(shifted);
    return structure;
}

/// A strongly skewed triclinic cell containing a few atoms, some of them
/// outside of the cell
pub fn skewed() -> Structure {
    Structure {
        positions: vec![
            Vector3D::new(0.1, 0.2, 0.3),
            Vector3D::new(2.3, 1.1, 0.7),
            Vector3D::new(-1.4, 3.2, 2.2),
            Vector3D::new(5.9, -0.8, 1.5),
            Vector3D::new(3.3, 2.4, -2.6),
        ],
        cell: Matrix3::new([
            [4.0, 0.0, 0.0],
            [3.1, 2.5, 0.0],
            [-1.2, 1.9, 3.0],
        ]),
    }
}

/// A pair `(first, second, shift)` in canonical form: `first < second`, or
/// `first == second` with a shift outside of the negative half-space
pub type CanonicalPair = (usize, usize, CellShift);

pub fn canonical(first: usize, second: usize, shift: CellShift) -> CanonicalPair {
    if first < second {
        (first, second, shift)
    } else if first > second {
        (second, first, -shift)
    } else if shift.is_in_negative_half_space() {
        (first, second, -shift)
    } else {
        (first, second, shift)
    }
}

/// Get the set of canonical pairs in a one-way list, checking that no pair
/// is present twice
pub fn oneway_pairs(list: &OneWayNeighbors) -> BTreeSet<CanonicalPair> {
    let mut pairs = BTreeSet::new();
    for (first, second, shift) in list.iter() {
        let inserted = pairs.insert(canonical(first, second, shift));
        assert!(inserted, "pair ({}, {}, {:?}) is present twice", first, second, shift);
    }
    return pairs;
}

/// Get the set of canonical pairs in a dense list, using the `oneway` query
pub fn dense_pairs(distances: &ImageDistances) -> BTreeSet<CanonicalPair> {
    let mut pairs = BTreeSet::new();
    for atom in 0..distances.n_atoms() {
        let (indices, offsets) = distances.neighbors(atom, true).unwrap();
        for (neighbor, offset) in indices.into_iter().zip(offsets) {
            let inserted = pairs.insert(canonical(atom, neighbor, offset));
            assert!(inserted);
        }
    }
    return pairs;
}
