use crate::geometry::Point;
use crate::mesh::error::{MeshError, MeshResult};
use crate::mesh::validation::lexicographic_orientation;
use crate::mesh::{BoundaryId, Triangulation};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// gmsh element type numbers used here
const GMSH_LINE: u32 = 1;
const GMSH_QUAD: u32 = 3;
const GMSH_HEX: u32 = 5;

/// gmsh numbers quadrilateral and hexahedral vertices counter-clockwise;
/// these tables pick them out in lexicographic order
const QUAD_TO_LEXICOGRAPHIC: &[usize] = &[0, 1, 3, 2];
const HEX_TO_LEXICOGRAPHIC: &[usize] = &[0, 1, 3, 2, 4, 5, 7, 6];

/// Read a gmsh file from disk
pub fn read_msh_file<const D: usize>(path: &Path) -> MeshResult<Triangulation<D>> {
    let file = File::open(path).map_err(|e| {
        MeshError::Io(std::io::Error::new(
            e.kind(),
            format!("cannot open {}: {}", path.display(), e),
        ))
    })?;
    read_msh(BufReader::new(file))
}

/// Parse a gmsh ASCII 2.x mesh into a `D`-dimensional triangulation
///
/// # Algorithm
/// 1. Check `$MeshFormat` for a 2.x ASCII file
/// 2. Read `$Nodes`, mapping gmsh node tags to dense vertex indices
/// 3. Read `$Elements`:
///    - quadrilaterals (2D) / hexahedra (3D) become cells
///    - lines (2D) / quadrilaterals (3D) become boundary faces whose first
///      tag (the physical entity) is the boundary indicator
///    - everything else is ignored
/// 4. Flip cells with negative orientation
pub fn read_msh<const D: usize, R: BufRead>(reader: R) -> MeshResult<Triangulation<D>> {
    let (cell_type, face_type, cell_order): (u32, u32, &[usize]) = match D {
        2 => (GMSH_QUAD, GMSH_LINE, QUAD_TO_LEXICOGRAPHIC),
        3 => (GMSH_HEX, GMSH_QUAD, HEX_TO_LEXICOGRAPHIC),
        _ => {
            return Err(MeshError::InvalidArgument(format!(
                "gmsh input supports 2D and 3D meshes, not {}D",
                D
            )));
        }
    };

    let mut lines = Lines::new(reader);
    let mut vertices: Vec<Point<D>> = Vec::new();
    let mut node_index: HashMap<u64, usize> = HashMap::new();
    let mut cells: Vec<Vec<usize>> = Vec::new();
    let mut faces: Vec<(Vec<usize>, BoundaryId)> = Vec::new();
    let mut seen_format = false;

    while let Some((line_no, line)) = lines.next_line()? {
        match line.trim() {
            "$MeshFormat" => {
                let (n, fmt) = lines.expect_line("mesh format")?;
                parse_format(n, &fmt)?;
                lines.skip_to("$EndMeshFormat")?;
                seen_format = true;
            }
            "$Nodes" => {
                let count = lines.expect_count("node count")?;
                for _ in 0..count {
                    let (n, node) = lines.expect_line("node")?;
                    let fields: Vec<&str> = node.split_whitespace().collect();
                    if fields.len() < 4 {
                        return Err(MeshError::parse(n, "node needs a tag and three coordinates"));
                    }
                    let tag: u64 = parse_field(n, fields[0], "node tag")?;
                    let mut p = Point::<D>::origin();
                    for d in 0..D {
                        p[d] = parse_field(n, fields[1 + d], "coordinate")?;
                    }
                    node_index.insert(tag, vertices.len());
                    vertices.push(p);
                }
                lines.skip_to("$EndNodes")?;
            }
            "$Elements" => {
                let count = lines.expect_count("element count")?;
                for _ in 0..count {
                    let (n, element) = lines.expect_line("element")?;
                    let fields: Vec<u64> = element
                        .split_whitespace()
                        .map(|f| parse_field(n, f, "element field"))
                        .collect::<MeshResult<_>>()?;
                    if fields.len() < 3 {
                        return Err(MeshError::parse(n, "truncated element"));
                    }

                    let kind = u32::try_from(fields[1])
                        .map_err(|_| MeshError::parse(n, "invalid element type"))?;
                    let first_node = usize::try_from(fields[2])
                        .ok()
                        .and_then(|n_tags| n_tags.checked_add(3))
                        .filter(|&first| first <= fields.len())
                        .ok_or_else(|| MeshError::parse(n, "missing element tags"))?;
                    let physical = if first_node > 3 { fields[3] } else { 0 };
                    let nodes = &fields[first_node..];

                    let resolve = |tags: &[u64]| -> MeshResult<Vec<usize>> {
                        tags.iter()
                            .map(|t| {
                                node_index.get(t).copied().ok_or_else(|| {
                                    MeshError::parse(n, format!("unknown node {}", t))
                                })
                            })
                            .collect()
                    };

                    if kind == cell_type {
                        if nodes.len() != cell_order.len() {
                            return Err(MeshError::parse(n, "wrong number of cell nodes"));
                        }
                        let gmsh = resolve(nodes)?;
                        cells.push(cell_order.iter().map(|&i| gmsh[i]).collect());
                    } else if kind == face_type {
                        let expected = if D == 2 { 2 } else { 4 };
                        if nodes.len() != expected {
                            return Err(MeshError::parse(n, "wrong number of face nodes"));
                        }
                        let id = BoundaryId::try_from(physical).map_err(|_| {
                            MeshError::parse(n, format!("physical tag {} out of range", physical))
                        })?;
                        faces.push((resolve(nodes)?, id));
                    }
                }
                lines.skip_to("$EndElements")?;
            }
            other if other.starts_with('$') && !other.starts_with("$End") => {
                // $PhysicalNames, $NodeData and friends carry nothing we need
                let end = format!("$End{}", &other[1..]);
                lines.skip_to(&end)?;
            }
            "" => {}
            _ => {
                return Err(MeshError::parse(line_no, format!("unexpected line: {}", line)));
            }
        }
    }

    if !seen_format {
        return Err(MeshError::parse(0, "missing $MeshFormat section"));
    }
    if cells.is_empty() {
        return Err(MeshError::InvalidGeometry("no cells in gmsh file".into()));
    }

    for cell in &mut cells {
        orient_cell(&vertices, cell);
    }

    let mut tria = Triangulation::new(vertices, cells)?;
    for (face, id) in faces {
        tria.set_boundary_id(face, id);
    }

    Ok(tria)
}

fn parse_format(line_no: usize, fmt: &str) -> MeshResult<()> {
    let mut fields = fmt.split_whitespace();
    let version: f64 = parse_field(line_no, fields.next().unwrap_or(""), "format version")?;
    let file_type: u32 = parse_field(line_no, fields.next().unwrap_or(""), "file type")?;

    if !(2.0..3.0).contains(&version) {
        return Err(MeshError::parse(
            line_no,
            format!("unsupported gmsh format version {}", version),
        ));
    }
    if file_type != 0 {
        return Err(MeshError::parse(line_no, "binary gmsh files are not supported"));
    }
    Ok(())
}

/// Flip a cell with negative orientation by mirroring its last axis
///
/// Lexicographic order makes that a swap of the low and high vertex groups
/// along axis `D - 1`.
fn orient_cell<const D: usize>(vertices: &[Point<D>], cell: &mut [usize]) {
    let corners: Vec<Point<D>> = cell.iter().map(|&v| vertices[v]).collect();
    if lexicographic_orientation(&corners) < 0.0 {
        let half = cell.len() / 2;
        let (low, high) = cell.split_at_mut(half);
        low.swap_with_slice(high);
    }
}

fn parse_field<T: std::str::FromStr>(line_no: usize, field: &str, what: &str) -> MeshResult<T> {
    field
        .parse()
        .map_err(|_| MeshError::parse(line_no, format!("invalid {}: '{}'", what, field)))
}

/// Line reader that tracks 1-based line numbers
struct Lines<R> {
    inner: std::io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R) -> Self {
        Self {
            inner: reader.lines(),
            line_no: 0,
        }
    }

    fn next_line(&mut self) -> MeshResult<Option<(usize, String)>> {
        match self.inner.next() {
            Some(line) => {
                self.line_no += 1;
                Ok(Some((self.line_no, line?)))
            }
            None => Ok(None),
        }
    }

    fn expect_line(&mut self, what: &str) -> MeshResult<(usize, String)> {
        self.next_line()?.ok_or_else(|| {
            MeshError::parse(self.line_no, format!("unexpected end of file, expected {}", what))
        })
    }

    fn expect_count(&mut self, what: &str) -> MeshResult<usize> {
        let (n, line) = self.expect_line(what)?;
        parse_field(n, line.trim(), what)
    }

    fn skip_to(&mut self, marker: &str) -> MeshResult<()> {
        while let Some((_, line)) = self.next_line()? {
            if line.trim() == marker {
                return Ok(());
            }
        }
        Err(MeshError::parse(self.line_no, format!("missing {}", marker)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use crate::mesh::validate_mesh;
    use std::io::Cursor;

    const TWO_QUADS: &str = "\
$MeshFormat
2.2 0 8
$EndMeshFormat
$PhysicalNames
1
1 5 \"inlet\"
$EndPhysicalNames
$Nodes
6
1 0 0 0
2 1 0 0
3 2 0 0
4 2 1 0
5 1 1 0
6 0 1 0
$EndNodes
$Elements
4
1 1 2 5 1 6 1
2 1 2 7 2 3 4
3 3 2 0 1 1 2 5 6
4 3 2 0 1 2 3 4 5
$EndElements
";

    fn tally(tria: &Triangulation<2>) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for (_, _, id) in tria.boundary_faces() {
            *counts.entry(id).or_insert(0) += 1;
        }
        counts
    }

    fn tally3(tria: &Triangulation<3>) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for (_, _, id) in tria.boundary_faces() {
            *counts.entry(id).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_read_two_quads() {
        let tria: Triangulation<2> = read_msh(Cursor::new(TWO_QUADS)).unwrap();

        assert_eq!(tria.n_vertices(), 6);
        assert_eq!(tria.n_active_cells(), 2);
        assert_eq!(tally(&tria), BTreeMap::from([(0, 4), (5, 1), (7, 1)]));
        // gmsh 1 2 5 6 is lexicographic 1 2 6 5
        assert_eq!(tria.cells()[0].vertices(), &[0, 1, 5, 4]);
    }

    #[test]
    fn test_reorients_clockwise_quads() {
        let input = TWO_QUADS.replace("3 3 2 0 1 1 2 5 6", "3 3 2 0 1 1 6 5 2");
        let tria: Triangulation<2> = read_msh(Cursor::new(input)).unwrap();
        assert!(tria.cell_measure(0) > 0.0);
        let p = tria.cell_vertices(0);
        let a = p[1] - p[0];
        let b = p[2] - p[0];
        assert!(a[0] * b[1] - a[1] * b[0] > 0.0);
    }

    #[test]
    fn test_reorients_upside_down_hex() {
        let input = "\
$MeshFormat
2.2 0 8
$EndMeshFormat
$Nodes
8
1 0 0 1
2 1 0 1
3 1 1 1
4 0 1 1
5 0 0 0
6 1 0 0
7 1 1 0
8 0 1 0
$EndNodes
$Elements
2
1 3 2 4 1 5 6 7 8
2 5 2 0 1 1 2 3 4 5 6 7 8
$EndElements
";
        let tria: Triangulation<3> = read_msh(Cursor::new(input)).unwrap();

        assert_eq!(validate_mesh(&tria).inverted, 0);
        assert!((tria.cell_measure(0) - 1.0).abs() < 1e-12);
        assert_eq!(tria.cell_vertex(0, 0)[2], 0.0);
        assert_eq!(tally3(&tria), BTreeMap::from([(0, 5), (4, 1)]));
    }

    #[test]
    fn test_huge_tag_count() {
        let input = TWO_QUADS.replace("1 1 2 5 1 6 1", "1 3 18446744073709551615 1");
        let err = read_msh::<2, _>(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 19, .. }));
    }

    #[test]
    fn test_tag_count_past_end_of_line() {
        let input = TWO_QUADS.replace("1 1 2 5 1 6 1", "1 1 9 5 1 6 1");
        let err = read_msh::<2, _>(Cursor::new(input)).unwrap_err();
        assert!(err.to_string().contains("missing element tags"));
    }

    #[test]
    fn test_out_of_range_numbers() {
        let input = TWO_QUADS.replace("1 1 2 5 1 6 1", "1 4294967297 2 5 1 6 1");
        let err = read_msh::<2, _>(Cursor::new(input)).unwrap_err();
        assert!(err.to_string().contains("invalid element type"));

        let input = TWO_QUADS.replace("1 1 2 5 1 6 1", "1 1 2 4294967301 1 6 1");
        let err = read_msh::<2, _>(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 19, .. }));
        assert!(err.to_string().contains("physical tag 4294967301"));
    }

    #[test]
    fn test_rejects_version_4() {
        let input = TWO_QUADS.replace("2.2 0 8", "4.1 0 8");
        let err = read_msh::<2, _>(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_unknown_node() {
        let input = TWO_QUADS.replace("4 3 2 0 1 2 3 4 5", "4 3 2 0 1 2 3 4 9");
        let err = read_msh::<2, _>(Cursor::new(input)).unwrap_err();
        assert!(err.to_string().contains("unknown node 9"));
    }

    #[test]
    fn test_bad_coordinate() {
        let input = TWO_QUADS.replace("3 2 0 0", "3 two 0 0");
        let err = read_msh::<2, _>(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 12, .. }));
    }

    #[test]
    fn test_no_cells() {
        let input = "$MeshFormat\n2.2 0 8\n$EndMeshFormat\n$Nodes\n1\n1 0 0 0\n$EndNodes\n";
        let err = read_msh::<2, _>(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, MeshError::InvalidGeometry(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = read_msh_file::<2>(Path::new("does-not-exist.msh")).unwrap_err();
        assert!(matches!(err, MeshError::Io(_)));
    }
}
