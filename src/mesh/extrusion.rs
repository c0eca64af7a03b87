use super::error::{MeshError, MeshResult};
use super::triangulation::Triangulation;
use crate::geometry::Point;

/// Sweep a 2D mesh along the z axis
///
/// `n_slices` vertex layers are placed evenly in `[0, height]`, so each input
/// cell produces `n_slices - 1` hexahedra. Lateral faces inherit the
/// indicator of the 2D boundary edge they come from; if `m` is the largest
/// indicator of the input, bottom faces get `m + 1` and top faces `m + 2`.
pub fn extrude_triangulation(
    input: &Triangulation<2>,
    n_slices: usize,
    height: f64,
) -> MeshResult<Triangulation<3>> {
    if n_slices < 2 {
        return Err(MeshError::InvalidArgument(format!(
            "extrusion needs at least 2 slices, got {}",
            n_slices
        )));
    }
    if height <= 0.0 {
        return Err(MeshError::InvalidArgument(format!(
            "extrusion height must be positive, got {}",
            height
        )));
    }

    let nv = input.n_vertices();
    let layer = |k: usize, v: usize| k * nv + v;

    let mut vertices = Vec::with_capacity(nv * n_slices);
    for k in 0..n_slices {
        let z = height * k as f64 / (n_slices - 1) as f64;
        for p in input.vertices() {
            vertices.push(Point::xyz(p[0], p[1], z));
        }
    }

    let mut cells = Vec::with_capacity(input.n_cells() * (n_slices - 1));
    for k in 0..n_slices - 1 {
        for cell in input.cells() {
            let mut hex: Vec<usize> = cell.vertices().iter().map(|&v| layer(k, v)).collect();
            hex.extend(cell.vertices().iter().map(|&v| layer(k + 1, v)));
            cells.push(hex);
        }
    }

    let mut out = Triangulation::new(vertices, cells)?;

    let edges = input.boundary_faces();
    let max_id = input.max_boundary_id();

    for &(cell, face, id) in &edges {
        let edge = input.face_key(cell, face);
        for k in 0..n_slices - 1 {
            let mut key: Vec<usize> = edge.iter().map(|&v| layer(k, v)).collect();
            key.extend(edge.iter().map(|&v| layer(k + 1, v)));
            out.set_boundary_id(key, id);
        }
    }

    let n_cells_2d = input.n_cells();
    for cell in 0..n_cells_2d {
        out.set_face_boundary_id(cell, 4, max_id + 1);
        out.set_face_boundary_id((n_slices - 2) * n_cells_2d + cell, 5, max_id + 2);
    }

    Ok(out)
}
