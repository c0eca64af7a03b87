use super::error::{MeshError, MeshResult};
use crate::geometry::{Boundary, Point, StraightBoundary};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Boundary indicator attached to a face
pub type BoundaryId = u32;

/// A face identified by its sorted global vertex indices
pub type FaceKey = Vec<usize>;

/// A quadrilateral (2D) or hexahedral (3D) cell
///
/// Vertices are stored in lexicographic order: bit `d` of a local vertex index
/// selects the low (0) or high (1) side along axis `d`. For a quadrilateral
/// that is lower-left, lower-right, upper-left, upper-right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    vertices: Vec<usize>,
}

impl Cell {
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    pub fn vertex(&self, i: usize) -> usize {
        self.vertices[i]
    }
}

/// Number of vertices of a `dim`-dimensional tensor-product cell
pub const fn vertices_per_cell(dim: usize) -> usize {
    1 << dim
}

/// Number of faces of a `dim`-dimensional tensor-product cell
pub const fn faces_per_cell(dim: usize) -> usize {
    2 * dim
}

/// Local vertex indices of face `face` in lexicographic order
///
/// Face `2d + s` holds the vertices whose bit `d` equals `s`.
pub fn face_local_vertices(dim: usize, face: usize) -> Vec<usize> {
    let axis = face / 2;
    let side = face % 2;
    (0..vertices_per_cell(dim))
        .filter(|v| (v >> axis) & 1 == side)
        .collect()
}

/// Local vertex pairs forming the edges of a cell
pub fn cell_edges(dim: usize) -> Vec<(usize, usize)> {
    let mut edges = Vec::new();
    for v in 0..vertices_per_cell(dim) {
        for d in 0..dim {
            if (v >> d) & 1 == 0 {
                edges.push((v, v | (1 << d)));
            }
        }
    }
    edges
}

/// A mesh of `D`-dimensional quadrilaterals/hexahedra
///
/// All cells are active: global refinement replaces every cell by its
/// children. Boundary indicators are stored per face; boundary faces without
/// an explicit indicator report 0.
#[derive(Debug, Clone)]
pub struct Triangulation<const D: usize> {
    vertices: Vec<Point<D>>,
    cells: Vec<Cell>,
    boundary_ids: HashMap<FaceKey, BoundaryId>,
    boundaries: BTreeMap<BoundaryId, Arc<dyn Boundary<D>>>,
}

impl<const D: usize> Default for Triangulation<D> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            cells: Vec::new(),
            boundary_ids: HashMap::new(),
            boundaries: BTreeMap::new(),
        }
    }
}

impl<const D: usize> Triangulation<D> {
    /// Create a triangulation from raw vertices and cell connectivity
    pub fn new(vertices: Vec<Point<D>>, cells: Vec<Vec<usize>>) -> MeshResult<Self> {
        if D == 0 || D > 3 {
            return Err(MeshError::InvalidArgument(format!(
                "unsupported dimension {}",
                D
            )));
        }

        let n_vertices = vertices.len();
        let mut checked = Vec::with_capacity(cells.len());
        for (i, cell) in cells.into_iter().enumerate() {
            if cell.len() != vertices_per_cell(D) {
                return Err(MeshError::InvalidGeometry(format!(
                    "cell {} has {} vertices, expected {}",
                    i,
                    cell.len(),
                    vertices_per_cell(D)
                )));
            }
            if let Some(&bad) = cell.iter().find(|&&v| v >= n_vertices) {
                return Err(MeshError::InvalidGeometry(format!(
                    "cell {} references vertex {} but only {} vertices exist",
                    i, bad, n_vertices
                )));
            }
            checked.push(Cell { vertices: cell });
        }

        Ok(Self {
            vertices,
            cells: checked,
            ..Default::default()
        })
    }

    pub fn dimension(&self) -> usize {
        D
    }

    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn n_active_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn vertices(&self) -> &[Point<D>] {
        &self.vertices
    }

    pub fn vertex(&self, i: usize) -> &Point<D> {
        &self.vertices[i]
    }

    pub fn vertex_mut(&mut self, i: usize) -> &mut Point<D> {
        &mut self.vertices[i]
    }

    /// Iterate mutably over all vertex positions
    pub fn vertices_mut(&mut self) -> impl Iterator<Item = &mut Point<D>> {
        self.vertices.iter_mut()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Position of local vertex `i` of cell `cell`
    pub fn cell_vertex(&self, cell: usize, i: usize) -> &Point<D> {
        &self.vertices[self.cells[cell].vertices[i]]
    }

    /// Mutable position of local vertex `i` of cell `cell`
    ///
    /// Vertices are shared between neighbouring cells, so a vertex reached
    /// through several cells is the same storage every time.
    pub fn cell_vertex_mut(&mut self, cell: usize, i: usize) -> &mut Point<D> {
        let v = self.cells[cell].vertices[i];
        &mut self.vertices[v]
    }

    pub fn cell_vertices(&self, cell: usize) -> Vec<Point<D>> {
        self.cells[cell]
            .vertices
            .iter()
            .map(|&v| self.vertices[v])
            .collect()
    }

    /// Sorted global vertex indices of face `face` of cell `cell`
    pub fn face_key(&self, cell: usize, face: usize) -> FaceKey {
        let verts = &self.cells[cell].vertices;
        let mut key: FaceKey = face_local_vertices(D, face)
            .into_iter()
            .map(|l| verts[l])
            .collect();
        key.sort_unstable();
        key
    }

    /// How many cells own each face
    fn face_owner_counts(&self) -> HashMap<FaceKey, usize> {
        let mut counts = HashMap::new();
        for cell in 0..self.cells.len() {
            for face in 0..faces_per_cell(D) {
                *counts.entry(self.face_key(cell, face)).or_insert(0) += 1;
            }
        }
        counts
    }

    /// All faces at the boundary as `(cell, face, indicator)`
    pub fn boundary_faces(&self) -> Vec<(usize, usize, BoundaryId)> {
        let counts = self.face_owner_counts();
        let mut faces = Vec::new();
        for cell in 0..self.cells.len() {
            for face in 0..faces_per_cell(D) {
                let key = self.face_key(cell, face);
                if counts.get(&key) == Some(&1) {
                    faces.push((cell, face, self.boundary_id(&key)));
                }
            }
        }
        faces
    }

    /// Number of faces at the boundary
    pub fn n_boundary_faces(&self) -> usize {
        self.boundary_faces().len()
    }

    /// Indices of all vertices lying on a boundary face
    pub fn boundary_vertices(&self) -> HashSet<usize> {
        self.boundary_faces()
            .into_iter()
            .flat_map(|(cell, face, _)| self.face_key(cell, face))
            .collect()
    }

    /// Boundary indicator of a face, 0 unless set explicitly
    pub fn boundary_id(&self, key: &FaceKey) -> BoundaryId {
        self.boundary_ids.get(key).copied().unwrap_or(0)
    }

    /// Set the boundary indicator of a face given by any ordering of its vertices
    pub fn set_boundary_id(&mut self, mut key: FaceKey, id: BoundaryId) {
        key.sort_unstable();
        self.boundary_ids.insert(key, id);
    }

    /// Set the boundary indicator of face `face` of cell `cell`
    pub fn set_face_boundary_id(&mut self, cell: usize, face: usize, id: BoundaryId) {
        let key = self.face_key(cell, face);
        self.boundary_ids.insert(key, id);
    }

    /// Largest indicator in use on the boundary (0 for an empty mesh)
    pub fn max_boundary_id(&self) -> BoundaryId {
        self.boundary_faces()
            .into_iter()
            .map(|(_, _, id)| id)
            .max()
            .unwrap_or(0)
    }

    /// Drop stored indicators of faces that are no longer at the boundary
    pub(crate) fn prune_boundary_ids(&mut self) {
        let counts = self.face_owner_counts();
        self.boundary_ids.retain(|key, _| counts.get(key) == Some(&1));
    }

    /// Attach a boundary description to all faces with indicator `id`
    pub fn set_boundary(&mut self, id: BoundaryId, boundary: Arc<dyn Boundary<D>>) {
        self.boundaries.insert(id, boundary);
    }

    /// Detach the boundary description of indicator `id`; faces revert to straight
    pub fn clear_boundary(&mut self, id: BoundaryId) {
        self.boundaries.remove(&id);
    }

    /// Measure (area in 2D, volume in 3D) of a cell
    ///
    /// The cell is split into `D!` simplices along its main diagonal and their
    /// signed measures are summed, which is exact for cells with planar faces.
    pub fn cell_measure(&self, cell: usize) -> f64 {
        let pts = self.cell_vertices(cell);
        let mut total = 0.0;
        for perm in permutations(D) {
            let sign = permutation_sign(&perm);
            let mut simplex = vec![pts[0]];
            let mut local = 0usize;
            for axis in perm {
                local |= 1 << axis;
                simplex.push(pts[local]);
            }
            total += sign * signed_simplex_measure(&simplex);
        }
        total.abs()
    }

    /// Length of the longest diagonal of a cell
    pub fn cell_diameter(&self, cell: usize) -> f64 {
        let n = vertices_per_cell(D);
        (0..n / 2)
            .map(|v| {
                self.cell_vertex(cell, v)
                    .distance(self.cell_vertex(cell, n - 1 - v))
            })
            .fold(0.0, f64::max)
    }

    /// Refine every cell `times` times
    ///
    /// Each cell is split into `2^D` children. A new vertex is shared by all
    /// cells touching the edge/face it was created for. New vertices on a
    /// boundary face with an attached boundary description are placed by that
    /// description; all others are the average of their parent vertices.
    pub fn refine_global(&mut self, times: usize) {
        for _ in 0..times {
            self.refine_once();
        }
    }

    fn refine_once(&mut self) {
        let n_children = vertices_per_cell(D);
        let n_points = 3usize.pow(D as u32);

        let curved = self.curved_boundary_faces();
        let mut vertex_of_key: HashMap<FaceKey, usize> = HashMap::new();
        let mut new_cells = Vec::with_capacity(self.cells.len() * n_children);
        let mut new_ids: HashMap<FaceKey, BoundaryId> = HashMap::new();

        let parents = std::mem::take(&mut self.cells);
        for parent in &parents {
            // Vertex for each point of the 3^D sub-lattice, base-3 index per axis
            let mut lattice = Vec::with_capacity(n_points);
            for m in 0..n_points {
                let key = lattice_key(&parent.vertices, m, D);

                let index = if key.len() == 1 {
                    key[0]
                } else if let Some(&existing) = vertex_of_key.get(&key) {
                    existing
                } else {
                    let position = self.new_point(&key, &curved);
                    self.vertices.push(position);
                    let index = self.vertices.len() - 1;
                    vertex_of_key.insert(key, index);
                    index
                };
                lattice.push(index);
            }

            let parent_face_ids: Vec<Option<BoundaryId>> = (0..faces_per_cell(D))
                .map(|face| {
                    let mut key: FaceKey = face_local_vertices(D, face)
                        .into_iter()
                        .map(|l| parent.vertices[l])
                        .collect();
                    key.sort_unstable();
                    self.boundary_ids.get(&key).copied()
                })
                .collect();

            for child in 0..n_children {
                let vertices: Vec<usize> = (0..n_children)
                    .map(|local| {
                        let m = (0..D).fold(0, |acc, d| {
                            let digit = ((child >> d) & 1) + ((local >> d) & 1);
                            acc + digit * 3usize.pow(d as u32)
                        });
                        lattice[m]
                    })
                    .collect();

                for (face, id) in parent_face_ids.iter().enumerate() {
                    let Some(id) = id else { continue };
                    let axis = face / 2;
                    let side = face % 2;
                    if (child >> axis) & 1 != side {
                        continue;
                    }
                    let mut key: FaceKey = face_local_vertices(D, face)
                        .into_iter()
                        .map(|l| vertices[l])
                        .collect();
                    key.sort_unstable();
                    new_ids.insert(key, *id);
                }

                new_cells.push(Cell { vertices });
            }
        }

        self.cells = new_cells;
        self.boundary_ids = new_ids;
    }

    /// Every edge and face of a curved boundary face, keyed like new vertices
    ///
    /// Maps the sorted parent vertices of each sub-entity to the indicator of
    /// the boundary face it lies in.
    fn curved_boundary_faces(&self) -> HashMap<FaceKey, BoundaryId> {
        let mut curved = HashMap::new();
        if self.boundaries.is_empty() {
            return curved;
        }
        let n_points = 3usize.pow(D as u32 - 1);
        for (cell, face, id) in self.boundary_faces() {
            if !self.boundaries.contains_key(&id) {
                continue;
            }
            let corners: Vec<usize> = face_local_vertices(D, face)
                .into_iter()
                .map(|l| self.cells[cell].vertices[l])
                .collect();
            for m in 0..n_points {
                let key = lattice_key(&corners, m, D - 1);
                if key.len() > 1 {
                    curved.insert(key, id);
                }
            }
        }
        curved
    }

    fn new_point(&self, key: &FaceKey, curved: &HashMap<FaceKey, BoundaryId>) -> Point<D> {
        let parents: Vec<Point<D>> = key.iter().map(|&v| self.vertices[v]).collect();

        match curved.get(key).and_then(|id| self.boundaries.get(id)) {
            Some(boundary) => boundary.new_point(&parents),
            None => StraightBoundary.new_point(&parents),
        }
    }

    /// Replace vertex storage and remap all connectivity through `map`
    ///
    /// `map[old]` is the new index of old vertex `old`.
    pub(crate) fn renumber_vertices(&mut self, vertices: Vec<Point<D>>, map: &[usize]) {
        for cell in &mut self.cells {
            for v in &mut cell.vertices {
                *v = map[*v];
            }
        }
        let ids = std::mem::take(&mut self.boundary_ids);
        for (key, id) in ids {
            let mut key: FaceKey = key.into_iter().map(|v| map[v]).collect();
            key.sort_unstable();
            self.boundary_ids.insert(key, id);
        }
        self.vertices = vertices;
    }

    /// Append all cells, vertices and indicators of `other`
    pub(crate) fn append(&mut self, other: &Triangulation<D>) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);
        self.cells.extend(other.cells.iter().map(|c| Cell {
            vertices: c.vertices.iter().map(|v| v + offset).collect(),
        }));
        for (key, id) in &other.boundary_ids {
            self.boundary_ids
                .insert(key.iter().map(|v| v + offset).collect(), *id);
        }
    }
}

/// Sorted corners spanning point `m` of the 3^dim sub-lattice of a cell
///
/// Digit `d` of `m` in base 3 picks the low side (0), both sides (1) or the
/// high side (2) along axis `d`; `corners` are in lexicographic order.
fn lattice_key(corners: &[usize], m: usize, dim: usize) -> FaceKey {
    let digits = base3_digits(m, dim);
    let mut key: FaceKey = (0..corners.len())
        .filter(|&v| {
            digits.iter().enumerate().all(|(d, &digit)| match digit {
                0 => (v >> d) & 1 == 0,
                2 => (v >> d) & 1 == 1,
                _ => true,
            })
        })
        .map(|v| corners[v])
        .collect();
    key.sort_unstable();
    key
}

fn base3_digits(mut m: usize, dim: usize) -> Vec<usize> {
    let mut digits = Vec::with_capacity(dim);
    for _ in 0..dim {
        digits.push(m % 3);
        m /= 3;
    }
    digits
}

fn permutations(n: usize) -> Vec<Vec<usize>> {
    if n == 0 {
        return vec![Vec::new()];
    }
    let mut out = Vec::new();
    for rest in permutations(n - 1) {
        for pos in 0..=rest.len() {
            let mut p = rest.clone();
            p.insert(pos, n - 1);
            out.push(p);
        }
    }
    out
}

fn permutation_sign(perm: &[usize]) -> f64 {
    let mut inversions = 0;
    for i in 0..perm.len() {
        for j in i + 1..perm.len() {
            if perm[i] > perm[j] {
                inversions += 1;
            }
        }
    }
    if inversions % 2 == 0 { 1.0 } else { -1.0 }
}

/// Signed measure of a simplex given by `D + 1` points
fn signed_simplex_measure<const D: usize>(points: &[Point<D>]) -> f64 {
    let mut m: Vec<Vec<f64>> = points[1..]
        .iter()
        .map(|p| (0..D).map(|d| p[d] - points[0][d]).collect())
        .collect();

    let mut det = 1.0;
    for col in 0..D {
        let pivot = (col..D)
            .max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))
            .unwrap_or(col);
        if m[pivot][col].abs() < f64::EPSILON {
            return 0.0;
        }
        if pivot != col {
            m.swap(pivot, col);
            det = -det;
        }
        det *= m[col][col];
        for row in col + 1..D {
            let f = m[row][col] / m[col][col];
            for k in col..D {
                let delta = f * m[col][k];
                m[row][k] -= delta;
            }
        }
    }

    let factorial: f64 = (1..=D).map(|k| k as f64).product();
    det / factorial
}
