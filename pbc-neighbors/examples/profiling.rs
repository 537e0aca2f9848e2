use pbc_neighbors::{Matrix3, Vector3D, NeighborOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let n_cells = std::env::args().nth(1)
        .map(|arg| arg.parse::<usize>())
        .transpose()?
        .unwrap_or(4);

    // enable collection of profiling data
    time_graph::enable_data_collection(true);
    // clear any existing collected data
    time_graph::clear_collected_data();

    let (positions, cell) = bcc_crystal(3.1, n_cells);
    let options = NeighborOptions::from_json(r#"{"cutoff": 5.0, "skin": 0.01}"#)?;

    let n_pairs = time_graph::spanned!("Full calculation", {
        let dense = pbc_neighbors::compute_distances(&positions, cell, &options)?;
        let mut n_dense = 0;
        for atom in 0..dense.n_atoms() {
            n_dense += dense.neighbors(atom, true)?.0.len();
        }

        let oneway = pbc_neighbors::compute_oneway(&positions, cell, &options)?;
        let cell_list = pbc_neighbors::compute_oneway_cell_list(&positions, cell, &options)?;

        [n_dense, oneway.len(), cell_list.len()]
    });
    println!("{} atoms, pairs (dense/one-way/cell list): {:?}", positions.len(), n_pairs);

    // get the call graph and display it
    let graph = time_graph::get_full_graph();
    // (this requires the "table" feature for the time_graph crate)
    println!("{}", graph.as_short_table());

    // also available for saving profiling data to the disk & future analysis
    // (this requires the "json" feature for the time_graph crate)
    println!("{}", graph.as_json());

    Ok(())
}

fn bcc_crystal(a: f64, n: usize) -> (Vec<Vector3D>, Matrix3) {
    let mut positions = Vec::new();
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                let corner = a * Vector3D::new(i as f64, j as f64, k as f64);
                positions.push(corner);
                positions.push(corner + Vector3D::new(a / 2.0, a / 2.0, a / 2.0));
            }
        }
    }

    let length = a * n as f64;
    let cell = Matrix3::new([[length, 0.0, 0.0], [0.0, length, 0.0], [0.0, 0.0, length]]);
    return (positions, cell);
}
