//! The seven steps of the mesh generation tour
//!
//! Every step builds its own mesh from scratch, possibly modifies it, and
//! hands it to [`mesh_info`] which writes `grid-<n>.eps` and returns a
//! summary. Steps share nothing but the configuration.

use crate::config::TourConfig;
use crate::geometry::{HyperBallBoundary, Point};
use crate::gmsh::read_msh_file;
use crate::mesh::{
    PointMap, Triangulation, distort_random, extrude_triangulation,
    hyper_cube_with_cylindrical_hole, merge_triangulations, subdivided_hyper_rectangle,
    transform, validate_mesh,
};
use crate::report::{MeshInfo, mesh_info};
use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::f64::consts::PI;
use std::sync::Arc;

/// A tour step: number, short description and the routine itself
pub struct Step {
    pub number: usize,
    pub title: &'static str,
    pub run: fn(&TourConfig) -> Result<MeshInfo>,
}

pub static STEPS: [Step; 7] = [
    Step {
        number: 1,
        title: "Loading a mesh generated by gmsh",
        run: grid_1,
    },
    Step {
        number: 2,
        title: "Merging triangulations",
        run: grid_2,
    },
    Step {
        number: 3,
        title: "Moving vertices and refining with a curved boundary",
        run: grid_3,
    },
    Step {
        number: 4,
        title: "Extruding into three dimensions",
        run: grid_4,
    },
    Step {
        number: 5,
        title: "Transforming with a plain function",
        run: grid_5,
    },
    Step {
        number: 6,
        title: "Transforming with a function object",
        run: grid_6,
    },
    Step {
        number: 7,
        title: "Random distortion",
        run: grid_7,
    },
];

/// Run all steps in order, stopping at the first failure
pub fn run_all(config: &TourConfig) -> Result<Vec<MeshInfo>> {
    STEPS
        .iter()
        .map(|step| {
            (step.run)(config)
                .with_context(|| format!("Step {} ({}) failed", step.number, step.title))
        })
        .collect()
}

/// Step 1: load a mesh from a gmsh file
pub fn grid_1(config: &TourConfig) -> Result<MeshInfo> {
    let tria: Triangulation<2> = read_msh_file(&config.input)
        .with_context(|| format!("Failed to read mesh from {}", config.input.display()))?;

    let report = validate_mesh(&tria);
    if report.has_issues() {
        eprintln!("Warning: {}: {}", config.input.display(), report.summary());
        for warning in &report.warnings {
            eprintln!("  {}", warning);
        }
    }

    mesh_info(&tria, &config.output_path(1), &config.eps)
}

/// Step 2: merge a square with a hole and a rectangle sharing its right edge
pub fn grid_2(config: &TourConfig) -> Result<MeshInfo> {
    let tria1 = hyper_cube_with_cylindrical_hole(0.25, 1.0)?;
    let tria2 = subdivided_hyper_rectangle([3, 2], Point::xy(1.0, -1.0), Point::xy(4.0, 1.0), false)?;

    let triangulation = merge_triangulations(&tria1, &tria2)?;

    mesh_info(&triangulation, &config.output_path(2), &config.eps)
}

/// Step 3: move the top edge up, then refine with a round hole
pub fn grid_3(config: &TourConfig) -> Result<MeshInfo> {
    let mut triangulation = hyper_cube_with_cylindrical_hole(0.25, 1.0)?;
    raise_top_edge(&mut triangulation);

    // The hole carries boundary indicator 1
    let boundary = Arc::new(HyperBallBoundary::new(Point::xy(0.0, 0.0), 0.25));
    triangulation.set_boundary(1, boundary);
    triangulation.refine_global(2);

    let info = mesh_info(&triangulation, &config.output_path(3), &config.eps);
    triangulation.clear_boundary(1);
    info
}

/// Move every vertex on the line y = 1 up by 0.5
///
/// Vertices are visited once per adjacent cell; a vertex that was moved no
/// longer matches the test, so none moves twice.
pub(crate) fn raise_top_edge(tria: &mut Triangulation<2>) {
    for cell in 0..tria.n_active_cells() {
        for i in 0..4 {
            let v = tria.cell_vertex_mut(cell, i);
            if (v[1] - 1.0).abs() < 1e-5 {
                v[1] += 0.5;
            }
        }
    }
}

/// Step 4: extrude the square with a hole into 3D
pub fn grid_4(config: &TourConfig) -> Result<MeshInfo> {
    let triangulation = hyper_cube_with_cylindrical_hole(0.25, 1.0)?;
    let out = extrude_triangulation(&triangulation, 3, 2.0)?;

    mesh_info(&out, &config.output_path(4), &config.eps)
}

/// (x, y) -> (x, y + sin(pi x / 5))
pub fn grid_5_transform(p: Point<2>) -> Point<2> {
    Point::xy(p[0], p[1] + (p[0] / 5.0 * PI).sin())
}

/// Step 5: bend a long rectangle with a plain function
pub fn grid_5(config: &TourConfig) -> Result<MeshInfo> {
    let mut tria =
        subdivided_hyper_rectangle([14, 2], Point::xy(0.0, 0.0), Point::xy(10.0, 1.0), false)?;

    transform(grid_5_transform, &mut tria);

    mesh_info(&tria, &config.output_path(5), &config.eps)
}

/// (x, y) -> (x, tanh(2y) / tanh(2)), grading the mesh towards y = 0 and y = 1
#[derive(Debug, Clone, Copy, Default)]
pub struct Grid6Func;

impl Grid6Func {
    fn trans(&self, y: f64) -> f64 {
        (2.0 * y).tanh() / 2f64.tanh()
    }
}

impl PointMap<2> for Grid6Func {
    fn map(&self, p: Point<2>) -> Point<2> {
        Point::xy(p[0], self.trans(p[1]))
    }
}

/// Step 6: grade a square with a function object
pub fn grid_6(config: &TourConfig) -> Result<MeshInfo> {
    let mut tria =
        subdivided_hyper_rectangle([40, 40], Point::xy(0.0, 0.0), Point::xy(1.0, 1.0), false)?;

    transform(Grid6Func, &mut tria);

    mesh_info(&tria, &config.output_path(6), &config.eps)
}

/// Step 7: randomly perturb the interior vertices of a square
pub fn grid_7(config: &TourConfig) -> Result<MeshInfo> {
    let mut tria =
        subdivided_hyper_rectangle([16, 16], Point::xy(0.0, 0.0), Point::xy(1.0, 1.0), false)?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    distort_random(
        config.distortion.factor,
        &mut tria,
        config.distortion.keep_boundary,
        &mut rng,
    );

    mesh_info(&tria, &config.output_path(7), &config.eps)
}
