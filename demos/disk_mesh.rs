//! Mesh the unit disk with a hole, refined towards the hole.
//!
//! Run with `RUST_LOG=info cargo run --example disk_mesh [hull|exact]`.

use sdf_mesh::prelude::*;

fn main() -> Result<(), MeshGenError> {
    env_logger::init();

    let method: TriangulationMethod = std::env::args()
        .nth(1)
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or_default();

    let h0 = 0.05;
    let domain = Domain::new(
        BoundingBox::new(vec![(-1.0, 1.0), (-1.0, 1.0)])?,
        h0,
        |p| sdf::difference(sdf::ball(p, &[0.0, 0.0], 1.0), sdf::ball(p, &[0.0, 0.0], 0.4)),
        move |p| {
            let r = (p[0] * p[0] + p[1] * p[1]).sqrt();
            h0 + 0.3 * (r - 0.4).max(0.0)
        },
    )?;

    let opts = BuildOptions {
        max_iter: 100,
        nscreen: 10,
        seed: Some(2024),
        ..Default::default()
    };
    let mesh = MeshGenerator::new(domain, method).build(&opts)?;

    println!(
        "{} vertices, {} triangles after {} iterations ({:?}, {} retriangulations)",
        mesh.points.len(),
        mesh.cells.len(),
        mesh.report.iterations,
        mesh.report.termination,
        mesh.report.retriangulations
    );
    if let Some(q) = mesh_quality(&mesh.points, &mesh.cells) {
        println!("radius ratio: min {:.3}, mean {:.3}", q.min, q.mean);
    }
    Ok(())
}
