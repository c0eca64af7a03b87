//! Mesh validation
//!
//! Checks a triangulation for problems that make its pictures or later
//! processing meaningless:
//! - Invalid (NaN/Inf) vertex coordinates
//! - Degenerate cells (zero or near-zero measure)
//! - Inverted cells (negative orientation at the first vertex)
//! - Vertices not used by any cell

use super::triangulation::Triangulation;
use crate::geometry::Point;

/// Result of mesh validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Total number of cells validated
    pub total: usize,
    /// Number of cells with (near-)zero measure
    pub degenerate: usize,
    /// Number of cells touching a vertex with NaN/Inf coordinates
    pub invalid_coords: usize,
    /// Number of cells whose first corner has negative orientation
    pub inverted: usize,
    /// Number of vertices not referenced by any cell
    pub unused_vertices: usize,
    /// Warning messages for issues found
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Check if the mesh passed validation without critical issues
    pub fn is_valid(&self) -> bool {
        self.invalid_coords == 0 && self.degenerate == 0
    }

    /// Check if the mesh has any issues at all
    pub fn has_issues(&self) -> bool {
        self.degenerate > 0 || self.invalid_coords > 0 || self.inverted > 0 || self.unused_vertices > 0
    }

    pub fn summary(&self) -> String {
        if !self.has_issues() {
            format!("Mesh valid: {} cells, no issues", self.total)
        } else {
            format!(
                "Mesh issues: {} cells, {} degenerate, {} invalid coords, {} inverted, {} unused vertices",
                self.total, self.degenerate, self.invalid_coords, self.inverted, self.unused_vertices
            )
        }
    }
}

/// Cells smaller than this fraction of their diameter^D count as degenerate
const MIN_RELATIVE_MEASURE: f64 = 1e-10;

/// Validate a mesh and return a detailed report
pub fn validate_mesh<const D: usize>(tria: &Triangulation<D>) -> ValidationResult {
    let mut result = ValidationResult {
        total: tria.n_cells(),
        ..Default::default()
    };

    let mut used = vec![false; tria.n_vertices()];

    for cell in 0..tria.n_cells() {
        let corners = tria.cell_vertices(cell);
        for &v in tria.cells()[cell].vertices() {
            used[v] = true;
        }

        if corners.iter().any(|p| p.coords().iter().any(|c| !c.is_finite())) {
            result.invalid_coords += 1;
            result
                .warnings
                .push(format!("Cell {} has NaN/Inf coordinates", cell));
            continue;
        }

        let diameter = tria.cell_diameter(cell);
        if tria.cell_measure(cell) <= MIN_RELATIVE_MEASURE * diameter.powi(D as i32) {
            result.degenerate += 1;
        }

        if corner_orientation(tria, cell) < 0.0 {
            result.inverted += 1;
        }
    }

    result.unused_vertices = used.iter().filter(|&&u| !u).count();

    if result.degenerate > 0 {
        result
            .warnings
            .push(format!("{} degenerate cells detected", result.degenerate));
    }
    if result.inverted > 0 {
        result
            .warnings
            .push(format!("{} cells are inverted", result.inverted));
    }
    if result.unused_vertices > 0 {
        result.warnings.push(format!(
            "{} vertices are not used by any cell",
            result.unused_vertices
        ));
    }

    result
}

fn corner_orientation<const D: usize>(tria: &Triangulation<D>, cell: usize) -> f64 {
    lexicographic_orientation(&tria.cell_vertices(cell))
}

/// Determinant of the edge vectors leaving corner 0 along each axis
///
/// `corners` are the cell's vertices in lexicographic order.
pub(crate) fn lexicographic_orientation<const D: usize>(corners: &[Point<D>]) -> f64 {
    let e = |axis: usize| corners[1 << axis] - corners[0];
    match D {
        1 => e(0)[0],
        2 => {
            let (a, b) = (e(0), e(1));
            a[0] * b[1] - a[1] * b[0]
        }
        3 => {
            let (a, b, c) = (e(0), e(1), e(2));
            a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
                + a[2] * (b[0] * c[1] - b[1] * c[0])
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::generator::{hyper_cube_with_cylindrical_hole, subdivided_hyper_rectangle};

    #[test]
    fn test_generated_meshes_are_valid() {
        let hole = hyper_cube_with_cylindrical_hole(0.25, 1.0).unwrap();
        let report = validate_mesh(&hole);
        assert!(report.is_valid());
        assert!(!report.has_issues());
        assert_eq!(report.total, 8);

        let rect =
            subdivided_hyper_rectangle([3, 2], Point::xy(1.0, -1.0), Point::xy(4.0, 1.0), false)
                .unwrap();
        assert!(!validate_mesh(&rect).has_issues());
    }

    #[test]
    fn test_degenerate_cell() {
        let tria = Triangulation::new(
            vec![
                Point::xy(0.0, 0.0),
                Point::xy(1.0, 0.0),
                Point::xy(2.0, 0.0),
                Point::xy(3.0, 0.0),
            ],
            vec![vec![0, 1, 2, 3]],
        )
        .unwrap();

        let report = validate_mesh(&tria);
        assert_eq!(report.degenerate, 1);
        assert!(!report.is_valid());
    }

    #[test]
    fn test_inverted_cell() {
        let tria = Triangulation::new(
            vec![
                Point::xy(0.0, 0.0),
                Point::xy(0.0, 1.0),
                Point::xy(1.0, 0.0),
                Point::xy(1.0, 1.0),
            ],
            vec![vec![0, 1, 2, 3]],
        )
        .unwrap();

        let report = validate_mesh(&tria);
        assert_eq!(report.inverted, 1);
        assert!(report.is_valid());
        assert!(report.has_issues());
    }

    #[test]
    fn test_invalid_coords_and_unused_vertex() {
        let tria = Triangulation::new(
            vec![
                Point::xy(f64::NAN, 0.0),
                Point::xy(1.0, 0.0),
                Point::xy(0.0, 1.0),
                Point::xy(1.0, 1.0),
                Point::xy(5.0, 5.0),
            ],
            vec![vec![0, 1, 2, 3]],
        )
        .unwrap();

        let report = validate_mesh(&tria);
        assert_eq!(report.invalid_coords, 1);
        assert_eq!(report.unused_vertices, 1);
        assert!(report.summary().contains("1 unused vertices"));
    }
}
