//! Mesh generators for simple domains
//!
//! Every generator returns a fresh [`Triangulation`] with boundary indicators
//! set as documented on the individual function.

use super::error::{MeshError, MeshResult};
use super::tools::{delete_duplicated_vertices, minimal_cell_diameter};
use super::triangulation::{Triangulation, vertices_per_cell};
use crate::geometry::Point;

/// Tolerance for identifying coincident vertices when merging, relative to
/// the smallest cell diameter
const MERGE_TOLERANCE: f64 = 1e-12;

/// Tensor-product grid of `repetitions[d]` cells along each axis
///
/// `p1` and `p2` are any two opposite corners of the box. All boundary faces
/// get indicator 0 unless `colorize` is set, in which case the face at the low
/// end of axis `d` gets `2d` and the one at the high end `2d + 1`.
pub fn subdivided_hyper_rectangle<const D: usize>(
    repetitions: [usize; D],
    p1: Point<D>,
    p2: Point<D>,
    colorize: bool,
) -> MeshResult<Triangulation<D>> {
    if let Some(d) = repetitions.iter().position(|&r| r == 0) {
        return Err(MeshError::InvalidArgument(format!(
            "repetitions along axis {} must be positive",
            d
        )));
    }

    let mut lo = p1;
    let mut hi = p2;
    for d in 0..D {
        if lo[d] > hi[d] {
            std::mem::swap(&mut lo[d], &mut hi[d]);
        }
        if hi[d] - lo[d] <= 0.0 {
            return Err(MeshError::InvalidGeometry(format!(
                "box has zero extent along axis {}",
                d
            )));
        }
    }

    // Vertex (i_0, .., i_{D-1}) lives at index sum(i_d * stride_d)
    let mut strides = [1usize; D];
    for d in 1..D {
        strides[d] = strides[d - 1] * (repetitions[d - 1] + 1);
    }
    let n_vertices = strides[D - 1] * (repetitions[D - 1] + 1);

    let mut vertices = Vec::with_capacity(n_vertices);
    for index in 0..n_vertices {
        let mut p = Point::<D>::origin();
        for d in 0..D {
            let i = (index / strides[d]) % (repetitions[d] + 1);
            p[d] = lo[d] + (hi[d] - lo[d]) * i as f64 / repetitions[d] as f64;
        }
        vertices.push(p);
    }

    let n_cells: usize = repetitions.iter().product();
    let mut cells = Vec::with_capacity(n_cells);
    for c in 0..n_cells {
        let mut rest = c;
        let mut base = 0;
        for d in 0..D {
            base += (rest % repetitions[d]) * strides[d];
            rest /= repetitions[d];
        }
        let cell: Vec<usize> = (0..vertices_per_cell(D))
            .map(|v| base + (0..D).map(|d| ((v >> d) & 1) * strides[d]).sum::<usize>())
            .collect();
        cells.push(cell);
    }

    let mut tria = Triangulation::new(vertices, cells)?;

    if colorize {
        for (cell, face, _) in tria.boundary_faces() {
            tria.set_face_boundary_id(cell, face, face as u32);
        }
    }

    Ok(tria)
}

/// Square `[-outer_radius, outer_radius]^2` with a circular hole at the origin
///
/// Eight cells connect the corners and edge midpoints of the square with eight
/// points on the circle of radius `inner_radius` at the matching angles. Faces
/// on the circle get boundary indicator 1, faces on the square 0. No boundary
/// description is attached; do that before refining to keep the hole round.
pub fn hyper_cube_with_cylindrical_hole(
    inner_radius: f64,
    outer_radius: f64,
) -> MeshResult<Triangulation<2>> {
    if !(inner_radius > 0.0 && inner_radius < outer_radius) {
        return Err(MeshError::InvalidArgument(format!(
            "need 0 < inner radius ({}) < outer radius ({})",
            inner_radius, outer_radius
        )));
    }

    // Counter-clockwise starting from the lower-left corner
    const SQUARE: [(f64, f64); 8] = [
        (-1.0, -1.0),
        (0.0, -1.0),
        (1.0, -1.0),
        (1.0, 0.0),
        (1.0, 1.0),
        (0.0, 1.0),
        (-1.0, 1.0),
        (-1.0, 0.0),
    ];

    let mut vertices = Vec::with_capacity(16);
    for &(x, y) in &SQUARE {
        vertices.push(Point::xy(x * outer_radius, y * outer_radius));
    }
    for &(x, y) in &SQUARE {
        let angle = y.atan2(x);
        vertices.push(Point::xy(
            inner_radius * angle.cos(),
            inner_radius * angle.sin(),
        ));
    }

    // Local axis 0 runs outward from the hole, axis 1 counter-clockwise
    let cells: Vec<Vec<usize>> = (0..8)
        .map(|k| {
            let next = (k + 1) % 8;
            vec![8 + k, k, 8 + next, next]
        })
        .collect();

    let mut tria = Triangulation::new(vertices, cells)?;
    for cell in 0..tria.n_cells() {
        tria.set_face_boundary_id(cell, 0, 1);
        tria.set_face_boundary_id(cell, 1, 0);
    }

    Ok(tria)
}

/// Merge two triangulations into one
///
/// Vertices agreeing to within `1e-12` times the smallest cell diameter are
/// identified, so the inputs must share coincident vertices along their common
/// interface. Indicators of faces that end up inside the merged mesh are
/// discarded. Boundary descriptions are not carried over.
pub fn merge_triangulations<const D: usize>(
    first: &Triangulation<D>,
    second: &Triangulation<D>,
) -> MeshResult<Triangulation<D>> {
    let mut merged = Triangulation::<D>::default();
    merged.append(first);
    merged.append(second);

    let tol = MERGE_TOLERANCE * minimal_cell_diameter(&merged).unwrap_or(1.0);

    delete_duplicated_vertices(&mut merged, tol);
    merged.prune_boundary_ids();

    Ok(merged)
}
