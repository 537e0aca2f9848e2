use pbc_neighbors::{Matrix3, Vector3D, NeighborOptions};
use pbc_neighbors::{compute_distances, compute_oneway, compute_oneway_cell_list};

use criterion::{Criterion, BenchmarkId, black_box, criterion_group, criterion_main};

/// fcc crystal with lattice parameter `a`, made of `n x n x n` conventional
/// cells. Atoms are slightly displaced from their equilibrium positions.
fn fcc_crystal(a: f64, n: usize) -> (Vec<Vector3D>, Matrix3) {
    let half = a / 2.0;
    let basis = [
        Vector3D::new(0.0, 0.0, 0.0),
        Vector3D::new(0.0, half, half),
        Vector3D::new(half, 0.0, half),
        Vector3D::new(half, half, 0.0),
    ];

    let mut positions = Vec::new();
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                let translation = a * Vector3D::new(i as f64, j as f64, k as f64);
                for &position in &basis {
                    let index = positions.len() as f64;
                    // cheap deterministic displacement
                    let noise = 0.05 * Vector3D::new(f64::sin(index), f64::cos(3.0 * index), f64::sin(7.0 * index));
                    positions.push(position + translation + noise);
                }
            }
        }
    }

    let length = a * n as f64;
    let cell = Matrix3::new([[length, 0.0, 0.0], [0.0, length, 0.0], [0.0, 0.0, length]]);
    return (positions, cell);
}

fn dense(c: &mut Criterion) {
    let mut group = c.benchmark_group("dense distances");
    group.noise_threshold(0.05);

    for &n in black_box(&[1, 2, 3]) {
        let (positions, cell) = fcc_crystal(3.6, n);
        let mut options = NeighborOptions::new(5.0);

        group.bench_with_input(BenchmarkId::new("serial", positions.len()), &positions, |b, positions| b.iter(|| {
            compute_distances(positions, cell, &options).unwrap()
        }));

        options.parallel = true;
        group.bench_with_input(BenchmarkId::new("parallel", positions.len()), &positions, |b, positions| b.iter(|| {
            compute_distances(positions, cell, &options).unwrap()
        }));
    }
}

fn oneway(c: &mut Criterion) {
    let mut group = c.benchmark_group("one-way neighbors");
    group.noise_threshold(0.05);

    for &n in black_box(&[1, 3, 5]) {
        let (positions, cell) = fcc_crystal(3.6, n);
        let options = NeighborOptions::new(5.0);

        group.bench_with_input(BenchmarkId::new("images", positions.len()), &positions, |b, positions| b.iter(|| {
            compute_oneway(positions, cell, &options).unwrap()
        }));

        group.bench_with_input(BenchmarkId::new("cell list", positions.len()), &positions, |b, positions| b.iter(|| {
            compute_oneway_cell_list(positions, cell, &options).unwrap()
        }));
    }
}

criterion_group!(neighbors, dense, oneway);
criterion_main!(neighbors);
