//! Tools operating on existing triangulations: vertex transformations,
//! random distortion and geometric queries.

use super::triangulation::{Triangulation, cell_edges};
use crate::geometry::Point;
use rand::Rng;
use std::collections::HashSet;

/// A function-like value mapping points to points
///
/// Implemented for every `Fn(Point<D>) -> Point<D>` (plain functions and
/// closures) and for any type that wants to carry state of its own.
pub trait PointMap<const D: usize> {
    fn map(&self, p: Point<D>) -> Point<D>;
}

impl<const D: usize, F> PointMap<D> for F
where
    F: Fn(Point<D>) -> Point<D>,
{
    fn map(&self, p: Point<D>) -> Point<D> {
        self(p)
    }
}

/// Move every vertex of the mesh to `map(vertex)`
///
/// Connectivity and boundary indicators are untouched.
pub fn transform<const D: usize, M: PointMap<D>>(map: M, tria: &mut Triangulation<D>) {
    for p in tria.vertices_mut() {
        *p = map.map(*p);
    }
}

/// Randomly perturb vertex positions
///
/// Each vertex moves by a random direction scaled to `factor` times the
/// length of the shortest edge adjacent to it. Boundary vertices stay put
/// when `keep_boundary` is set. Vertices not used by any cell are skipped.
pub fn distort_random<const D: usize, R: Rng + ?Sized>(
    factor: f64,
    tria: &mut Triangulation<D>,
    keep_boundary: bool,
    rng: &mut R,
) {
    let minimal_length = minimal_adjacent_edge_lengths(tria);
    let fixed = if keep_boundary {
        tria.boundary_vertices()
    } else {
        HashSet::new()
    };

    for (v, &len) in minimal_length.iter().enumerate() {
        if fixed.contains(&v) || !len.is_finite() {
            continue;
        }

        let mut shift = Point::<D>::origin();
        for d in 0..D {
            shift[d] = rng.random_range(-1.0..1.0);
        }
        let norm = shift.norm();
        if norm == 0.0 {
            continue;
        }

        *tria.vertex_mut(v) += shift * (factor * len / norm);
    }
}

/// Length of the shortest edge touching each vertex (infinite if none)
pub fn minimal_adjacent_edge_lengths<const D: usize>(tria: &Triangulation<D>) -> Vec<f64> {
    let mut lengths = vec![f64::INFINITY; tria.n_vertices()];
    let edges = cell_edges(D);

    for cell in tria.cells() {
        for &(a, b) in &edges {
            let (va, vb) = (cell.vertex(a), cell.vertex(b));
            let len = tria.vertex(va).distance(tria.vertex(vb));
            lengths[va] = lengths[va].min(len);
            lengths[vb] = lengths[vb].min(len);
        }
    }

    lengths
}

/// Identify vertices that agree in every coordinate up to `tol`
///
/// Cells and boundary indicators are renumbered to the surviving vertex.
/// Returns the number of vertices removed.
pub fn delete_duplicated_vertices<const D: usize>(tria: &mut Triangulation<D>, tol: f64) -> usize {
    let n = tria.n_vertices();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| tria.vertex(a)[0].total_cmp(&tria.vertex(b)[0]));

    // Sweep along x; only candidates within `tol` in x need a full comparison
    let mut representative: Vec<usize> = (0..n).collect();
    for (i, &a) in order.iter().enumerate() {
        if representative[a] != a {
            continue;
        }
        let pa = *tria.vertex(a);
        for &b in &order[i + 1..] {
            let pb = tria.vertex(b);
            if pb[0] - pa[0] > tol {
                break;
            }
            if representative[b] == b && (0..D).all(|d| (pa[d] - pb[d]).abs() <= tol) {
                representative[b] = a;
            }
        }
    }

    let mut map = vec![0usize; n];
    let mut vertices = Vec::with_capacity(n);
    for v in 0..n {
        if representative[v] == v {
            map[v] = vertices.len();
            vertices.push(*tria.vertex(v));
        }
    }
    for v in 0..n {
        map[v] = map[representative[v]];
    }

    let removed = n - vertices.len();
    if removed > 0 {
        tria.renumber_vertices(vertices, &map);
    }
    removed
}

/// Smallest cell diameter, `None` for an empty mesh
pub fn minimal_cell_diameter<const D: usize>(tria: &Triangulation<D>) -> Option<f64> {
    (0..tria.n_cells())
        .map(|c| tria.cell_diameter(c))
        .min_by(f64::total_cmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::generator::subdivided_hyper_rectangle;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn unit_grid(n: usize) -> Triangulation<2> {
        subdivided_hyper_rectangle([n, n], Point::xy(0.0, 0.0), Point::xy(1.0, 1.0), false)
            .unwrap()
    }

    struct Stretch {
        factor: f64,
    }

    impl PointMap<2> for Stretch {
        fn map(&self, p: Point<2>) -> Point<2> {
            Point::xy(p[0] * self.factor, p[1])
        }
    }

    fn volume<const D: usize>(tria: &Triangulation<D>) -> f64 {
        (0..tria.n_cells()).map(|c| tria.cell_measure(c)).sum()
    }

    fn flip(p: Point<2>) -> Point<2> {
        Point::xy(p[1], p[0])
    }

    #[test]
    fn test_transform_with_plain_function() {
        let mut tria = subdivided_hyper_rectangle(
            [2, 1],
            Point::xy(0.0, 0.0),
            Point::xy(2.0, 1.0),
            false,
        )
        .unwrap();
        transform(flip, &mut tria);
        assert!(tria.vertices().iter().all(|p| p[0] <= 1.0 && p[1] <= 2.0));
    }

    #[test]
    fn test_transform_with_struct() {
        let mut tria = unit_grid(2);
        transform(Stretch { factor: 3.0 }, &mut tria);
        assert!((volume(&tria) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_with_closure() {
        let mut tria = unit_grid(2);
        let offset = Point::xy(1.0, -1.0);
        transform(move |p: Point<2>| (p + offset) * 2.0, &mut tria);

        assert_eq!(tria.vertex(0), &Point::xy(2.0, -2.0));
        assert!((volume(&tria) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_distort_random_keeps_boundary() {
        let mut tria = unit_grid(8);
        let before = tria.vertices().to_vec();
        let boundary = tria.boundary_vertices();
        let lengths = minimal_adjacent_edge_lengths(&tria);

        let mut rng = StdRng::seed_from_u64(7);
        distort_random(0.3, &mut tria, true, &mut rng);

        let mut moved = 0;
        for (v, p) in tria.vertices().iter().enumerate() {
            let displacement = p.distance(&before[v]);
            if boundary.contains(&v) {
                assert_eq!(*p, before[v]);
            } else {
                assert!(displacement <= 0.3 * lengths[v] + 1e-12);
                if displacement > 0.0 {
                    moved += 1;
                }
            }
        }
        assert_eq!(moved, 49);
    }

    #[test]
    fn test_distort_random_moves_boundary_when_allowed() {
        let mut tria = unit_grid(2);
        let before = *tria.vertex(0);
        let mut rng = StdRng::seed_from_u64(1);
        distort_random(0.1, &mut tria, false, &mut rng);
        assert_ne!(*tria.vertex(0), before);
    }

    #[test]
    fn test_delete_duplicated_vertices() {
        let mut tria = Triangulation::new(
            vec![
                Point::xy(0.0, 0.0),
                Point::xy(1.0, 0.0),
                Point::xy(0.0, 1.0),
                Point::xy(1.0, 1.0),
                Point::xy(1.0 + 1e-9, 0.0),
                Point::xy(2.0, 0.0),
                Point::xy(1.0, 1.0 - 1e-9),
                Point::xy(2.0, 1.0),
            ],
            vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]],
        )
        .unwrap();
        assert_eq!(tria.n_boundary_faces(), 8);

        let removed = delete_duplicated_vertices(&mut tria, 1e-6);

        assert_eq!(removed, 2);
        assert_eq!(tria.n_vertices(), 6);
        assert_eq!(tria.n_boundary_faces(), 6);
    }

    #[test]
    fn test_minimal_cell_diameter() {
        let tria = unit_grid(4);
        let d = minimal_cell_diameter(&tria).unwrap();
        assert!((d - 0.25 * 2f64.sqrt()).abs() < 1e-12);
        assert!(minimal_cell_diameter(&Triangulation::<2>::default()).is_none());
    }
}
