use crate::{Matrix3, Vector3D};

/// Repeat the atoms at `positions` in `cell` `repeats` times along each
/// lattice vector, returning the positions and cell of the supercell.
pub fn repeat(positions: &[Vector3D], cell: Matrix3, repeats: [usize; 3]) -> (Vec<Vector3D>, Matrix3) {
    let a = Vector3D::from(cell[0]);
    let b = Vector3D::from(cell[1]);
    let c = Vector3D::from(cell[2]);

    let mut supercell_positions = Vec::new();
    for i in 0..repeats[0] {
        for j in 0..repeats[1] {
            for k in 0..repeats[2] {
                let translation = i as f64 * a + j as f64 * b + k as f64 * c;
                for &position in positions {
                    supercell_positions.push(position + translation);
                }
            }
        }
    }

    let supercell = Matrix3::new([
        (repeats[0] as f64 * a).into(),
        (repeats[1] as f64 * b).into(),
        (repeats[2] as f64 * c).into(),
    ]);

    return (supercell_positions, supercell);
}

/// Primitive cell of a fcc crystal with lattice parameter `a`, containing a
/// single atom
pub fn fcc_primitive(a: f64) -> (Vec<Vector3D>, Matrix3) {
    let half = a / 2.0;
    let cell = Matrix3::new([
        [0.0, half, half],
        [half, 0.0, half],
        [half, half, 0.0],
    ]);
    return (vec![Vector3D::zero()], cell);
}

/// Conventional cubic cell of a fcc crystal with lattice parameter `a` (4
/// atoms), repeated `repeats` times
pub fn fcc_supercell(a: f64, repeats: [usize; 3]) -> (Vec<Vector3D>, Matrix3) {
    let half = a / 2.0;
    let positions = [
        Vector3D::new(0.0, 0.0, 0.0),
        Vector3D::new(0.0, half, half),
        Vector3D::new(half, 0.0, half),
        Vector3D::new(half, half, 0.0),
    ];
    let cell = Matrix3::new([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]]);
    return repeat(&positions, cell, repeats);
}
