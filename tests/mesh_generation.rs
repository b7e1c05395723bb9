use approx::assert_relative_eq;
use sdf_mesh::algs::bars::centroids;
use sdf_mesh::data::point_set::PointSet;
use sdf_mesh::geometry::quality::simplex_volume;
use sdf_mesh::geometry::{BoundingBox, Domain, SizingFunction, sdf};
use sdf_mesh::mesh_error::MeshGenError;
use sdf_mesh::mesh_generation::{
    BuildOptions, IterationStats, MeshGenerator, RelaxationObserver, RelaxationParams, Termination,
};
use sdf_mesh::triangulation::TriangulationMethod;

fn unit_square(h: f64) -> Domain {
    Domain::uniform(
        BoundingBox::new(vec![(0.0, 1.0), (0.0, 1.0)]).unwrap(),
        h,
        |p| sdf::rectangle(p, 0.0, 1.0, 0.0, 1.0),
    )
    .unwrap()
}

fn unit_disk(h: f64) -> Domain {
    Domain::uniform(
        BoundingBox::new(vec![(-1.0, 1.0), (-1.0, 1.0)]).unwrap(),
        h,
        |p| sdf::ball(p, &[0.0, 0.0], 1.0),
    )
    .unwrap()
}

fn seeded(seed: u64) -> BuildOptions {
    BuildOptions {
        seed: Some(seed),
        ..Default::default()
    }
}

/// Records everything the engine reports.
#[derive(Default)]
struct Recorder {
    iterations: Vec<IterationStats>,
    snapshots: Vec<PointSet>,
    triangulations: Vec<(usize, PointSet, Vec<Vec<usize>>)>,
}

impl RelaxationObserver for Recorder {
    fn on_iteration(&mut self, stats: &IterationStats, points: &PointSet) {
        self.iterations.push(stats.clone());
        self.snapshots.push(points.clone());
    }

    fn on_retriangulation(&mut self, iteration: usize, points: &PointSet, cells: &[Vec<usize>]) {
        self.triangulations
            .push((iteration, points.clone(), cells.to_vec()));
    }
}

#[test]
fn uniform_square_is_in_equilibrium_from_the_start() {
    let mesh = MeshGenerator::new(unit_square(0.1), TriangulationMethod::Hull)
        .build(&seeded(42))
        .unwrap();

    assert_eq!(mesh.report.termination, Termination::Converged);
    assert_eq!(mesh.report.iterations, 1);
    assert_eq!(mesh.report.retriangulations, 1);
    assert_eq!(mesh.points.len(), 121);
    assert_eq!(mesh.cells.len(), 200);
    for p in mesh.points.iter() {
        for &x in p {
            assert!((-0.01..=1.01).contains(&x), "vertex {p:?} left the square");
        }
    }
    let area: f64 = mesh
        .cells
        .iter()
        .map(|c| simplex_volume(&mesh.points, c))
        .sum();
    assert!((area - 1.0).abs() < 0.05, "area {area}");
    assert!(mesh.cells.iter().all(|c| simplex_volume(&mesh.points, c) > 0.0));
}

#[test]
fn unit_disk_relaxes_to_convergence() {
    let opts = BuildOptions {
        max_iter: 2000,
        ..seeded(1)
    };
    let mesh = MeshGenerator::new(unit_disk(0.1), TriangulationMethod::Hull)
        .build(&opts)
        .unwrap();

    assert_eq!(mesh.report.termination, Termination::Converged);
    assert!(mesh.report.iterations < 2000);
    assert!(mesh.report.max_displacement < 0.001 * 0.1);
    // ttol keeps retriangulation rare compared to force steps
    assert!(mesh.report.retriangulations < mesh.report.iterations);
    assert!(mesh.cells.iter().all(|c| simplex_volume(&mesh.points, c) > 0.0));
    let area: f64 = mesh
        .cells
        .iter()
        .map(|c| simplex_volume(&mesh.points, c))
        .sum();
    assert!((area - std::f64::consts::PI).abs() < 0.1, "area {area}");
}

#[test]
fn stale_bars_are_rescaled_every_iteration() {
    let opts = BuildOptions {
        max_iter: 40,
        ..seeded(6)
    };
    let params = RelaxationParams {
        ptol: 1e-12,
        ..Default::default()
    };
    let mut rec = Recorder::default();
    MeshGenerator::new(unit_disk(0.2), TriangulationMethod::Hull)
        .with_params(params)
        .build_with_observer(&opts, &mut rec)
        .unwrap();

    assert!(rec.iterations.iter().all(|s| s.length_scale > 0.0));
    let reused: Vec<_> = rec
        .iterations
        .windows(2)
        .filter(|w| !w[1].retriangulated)
        .collect();
    assert!(!reused.is_empty(), "every iteration retriangulated");
    assert!(
        reused.iter().any(|w| w[1].length_scale != w[0].length_scale),
        "scale never moved while bars were reused"
    );
}

#[test]
fn fixed_point_on_lattice_node_is_kept_once() {
    let opts = BuildOptions {
        fixed_points: vec![vec![0.5, 0.5]],
        ..seeded(42)
    };
    let mesh = MeshGenerator::new(unit_square(0.1), TriangulationMethod::Hull)
        .build(&opts)
        .unwrap();

    assert_eq!(mesh.points.point(0), &[0.5, 0.5]);
    let copies = mesh.points.iter().filter(|p| *p == [0.5, 0.5]).count();
    assert_eq!(copies, 1);
    assert_eq!(mesh.points.len(), 121);
}

#[test]
fn domain_outside_bounding_box_yields_empty_mesh() {
    let domain = Domain::uniform(
        BoundingBox::new(vec![(0.0, 1.0), (0.0, 1.0)]).unwrap(),
        0.1,
        |p| sdf::ball(p, &[5.0, 5.0], 1.0),
    )
    .unwrap();
    let mesh = MeshGenerator::new(domain, TriangulationMethod::Hull)
        .build(&seeded(3))
        .unwrap();
    assert!(mesh.points.is_empty());
    assert!(mesh.cells.is_empty());
    assert_eq!(mesh.report.max_displacement, 0.0);
    assert!(mesh.report.converged());
}

#[test]
fn ball_in_three_dimensions() {
    let ball = Domain::uniform(
        BoundingBox::new(vec![(-1.0, 1.0), (-1.0, 1.0), (-1.0, 1.0)]).unwrap(),
        0.4,
        |p| sdf::ball(p, &[0.0, 0.0, 0.0], 1.0),
    )
    .unwrap();
    let opts = BuildOptions {
        max_iter: 15,
        nscreen: 1,
        plot: true,
        ..seeded(5)
    };
    let generator = MeshGenerator::new(ball, TriangulationMethod::Hull);
    let mut rec = Recorder::default();
    let mesh = generator.build_with_observer(&opts, &mut rec).unwrap();

    assert!(mesh.report.iterations <= 15);
    assert!(!mesh.cells.is_empty());
    for cell in &mesh.cells {
        assert_eq!(cell.len(), 4);
        let mut sorted = cell.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 4);
        assert!(cell.iter().all(|&v| v < mesh.points.len()));
    }

    // every triangulation handed out only contains interior simplices
    let geps = 0.1 * 0.4;
    assert_eq!(rec.triangulations.len(), mesh.report.retriangulations);
    for (_, points, cells) in &rec.triangulations {
        let d = generator.sizing().signed_distance(&centroids(points, cells));
        assert!(d.iter().all(|&d| d < -geps));
    }
}

#[test]
fn same_seed_same_mesh() {
    let run = |seed| {
        MeshGenerator::new(unit_disk(0.2), TriangulationMethod::Hull)
            .build(&seeded(seed))
            .unwrap()
    };
    let a = run(11);
    let b = run(11);
    assert_eq!(a.points, b.points);
    assert_eq!(a.cells, b.cells);
    assert_eq!(a.report.max_displacement, b.report.max_displacement);
}

#[test]
fn fixed_points_never_move() {
    let fixed = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, 0.0], vec![0.0, -1.0]];
    let opts = BuildOptions {
        fixed_points: fixed.clone(),
        max_iter: 20,
        ..seeded(9)
    };
    let mut rec = Recorder::default();
    let mesh = MeshGenerator::new(unit_disk(0.25), TriangulationMethod::Hull)
        .build_with_observer(&opts, &mut rec)
        .unwrap();

    assert_eq!(rec.snapshots.len(), mesh.report.iterations);
    for snapshot in &rec.snapshots {
        for (i, f) in fixed.iter().enumerate() {
            assert_eq!(snapshot.point(i), f.as_slice());
        }
    }
    for (i, f) in fixed.iter().enumerate() {
        assert_eq!(mesh.points.point(i), f.as_slice());
    }
}

#[test]
fn iteration_budget_bounds_the_run() {
    let opts = BuildOptions {
        max_iter: 3,
        ..seeded(4)
    };
    let params = RelaxationParams {
        ptol: 1e-12,
        ..Default::default()
    };
    let mut rec = Recorder::default();
    let mesh = MeshGenerator::new(unit_disk(0.2), TriangulationMethod::Hull)
        .with_params(params)
        .build_with_observer(&opts, &mut rec)
        .unwrap();

    assert!(mesh.report.iterations <= 3);
    assert_eq!(mesh.report.history.len(), mesh.report.iterations);
    if mesh.report.termination == Termination::MaxIterations {
        assert_eq!(mesh.report.iterations, 3);
    }
    assert!(rec.iterations.iter().all(|s| s.max_displacement >= 0.0));
    assert!(rec.iterations[0].retriangulated);
    assert!(rec.triangulations.is_empty());
    assert!(mesh.report.retriangulations >= 1);
}

#[test]
fn plot_hook_follows_nscreen() {
    let opts = BuildOptions {
        max_iter: 6,
        nscreen: 2,
        plot: true,
        ..seeded(8)
    };
    let mut rec = Recorder::default();
    MeshGenerator::new(unit_disk(0.2), TriangulationMethod::Hull)
        .build_with_observer(&opts, &mut rec)
        .unwrap();
    assert!(!rec.triangulations.is_empty());
    assert_eq!(rec.triangulations[0].0, 0);
    assert!(rec.triangulations.iter().all(|(it, _, _)| it % 2 == 0));
}

#[test]
fn configuration_errors_are_reported_before_seeding() {
    let generator = MeshGenerator::new(unit_square(0.1), TriangulationMethod::Hull);

    let err = generator
        .build(&BuildOptions {
            fixed_points: vec![vec![0.0, 0.0, 0.0]],
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, MeshGenError::DimensionMismatch { expected: 2, got: 3, .. }));

    let err = generator
        .build(&BuildOptions {
            fixed_points: vec![vec![0.0, 0.0], vec![0.0, 0.0]],
            ..Default::default()
        })
        .unwrap_err();
    assert_eq!(err, MeshGenError::DuplicateFixedPoint { index: 1, first: 0 });

    let err = generator
        .build(&BuildOptions {
            nscreen: 0,
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, MeshGenError::InvalidParameter { name: "nscreen", .. }));

    let err = MeshGenerator::new(unit_square(0.1), TriangulationMethod::Hull)
        .with_params(RelaxationParams {
            deltat: 0.0,
            ..Default::default()
        })
        .build(&BuildOptions::default())
        .unwrap_err();
    assert!(matches!(err, MeshGenError::InvalidParameter { name: "deltat", .. }));

    assert!(matches!(
        BoundingBox::new(vec![(0.0, 1.0)]),
        Err(MeshGenError::UnsupportedDimension(1))
    ));
    assert!(matches!(
        "delaunator".parse::<TriangulationMethod>(),
        Err(MeshGenError::UnknownMethod(_))
    ));
}

#[test]
fn exact_selector_always_produces_a_mesh() {
    let mesh = MeshGenerator::new(unit_square(0.2), TriangulationMethod::Exact)
        .build(&seeded(1))
        .unwrap();
    assert!(!mesh.cells.is_empty());
    let area: f64 = mesh
        .cells
        .iter()
        .map(|c| simplex_volume(&mesh.points, c))
        .sum();
    assert_relative_eq!(area, 1.0, epsilon = 0.05);
}

#[test]
fn options_round_trip_through_json() {
    let opts = BuildOptions {
        fixed_points: vec![vec![0.0, 0.0], vec![1.0, 0.5]],
        max_iter: 50,
        nscreen: 10,
        plot: true,
        seed: Some(7),
    };
    let json = serde_json::to_string(&opts).unwrap();
    assert_eq!(serde_json::from_str::<BuildOptions>(&json).unwrap(), opts);

    let params = RelaxationParams {
        l0mult: Some(1.3),
        ..Default::default()
    };
    let json = serde_json::to_string(&params).unwrap();
    assert_eq!(serde_json::from_str::<RelaxationParams>(&json).unwrap(), params);

    // missing fields fall back to defaults
    let partial: BuildOptions = serde_json::from_str(r#"{"max_iter": 3}"#).unwrap();
    assert_eq!(partial.max_iter, 3);
    assert_eq!(partial.nscreen, 5);
    assert_eq!(
        serde_json::to_string(&TriangulationMethod::Exact).unwrap(),
        "\"exact\""
    );
}
